use serde_json::Value;

use crate::client::Endpoint;

/// Per-account revision settings, passed through as-is
pub fn get() -> Endpoint<Value> {
    Endpoint::get("/revision-settings")
}

pub fn set(settings: &Value) -> Endpoint<Value> {
    Endpoint::post("/revision-settings").with_body(settings.clone())
}
