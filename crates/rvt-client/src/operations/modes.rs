use serde_json::json;

use crate::{
    client::Endpoint,
    models::{ActiveMode, PriorityModes},
};

/// Names of the prioritization strategies the service knows
pub fn list() -> Endpoint<PriorityModes> {
    Endpoint::get("/priority-modes")
}

/// Make `mode` the default strategy for this account
pub fn set_active(mode: &str) -> Endpoint<ActiveMode> {
    Endpoint::post("/revisions/priority-mode").with_body(json!({ "mode": mode }))
}
