use serde_json::json;

use crate::{
    client::Endpoint,
    models::{LoginResponse, RegisteredUser},
};

/// Exchange credentials for an access token
pub fn login(email: &str, password: &str) -> Endpoint<LoginResponse> {
    Endpoint::post("/auth/login")
        .with_body(json!({ "email": email, "password": password }))
        .public()
}

/// Create an account. The service answers with the new identity, not a token.
pub fn register(email: &str, password: &str) -> Endpoint<RegisteredUser> {
    Endpoint::post("/auth/register")
        .with_body(json!({ "email": email, "password": password }))
        .public()
}
