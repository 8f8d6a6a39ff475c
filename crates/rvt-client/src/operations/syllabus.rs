use serde_json::{Value, json};

use crate::{client::Endpoint, models::ParsedSyllabus};

/// Turn free text into candidate topics. Nothing is stored by this call.
///
/// A `null` answer decodes as `None`.
pub fn parse(text: &str, subject: Option<&str>) -> Endpoint<Option<ParsedSyllabus>> {
    Endpoint::post("/syllabus/parse").with_body(json!({ "text": text, "subject": subject }))
}

pub fn import(data: &Value) -> Endpoint<Value> {
    Endpoint::post("/syllabus/import").with_body(data.clone())
}

pub fn export() -> Endpoint<Value> {
    Endpoint::get("/syllabus/export")
}

pub fn reset() -> Endpoint<Value> {
    Endpoint::post("/syllabus/reset")
}
