use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    client::Endpoint,
    models::{Confidence, MarkedTopic, MarkedUnit, OrEmpty, Revision, RevisionUpdate},
};

/// Record one revision of a topic. Confidence defaults to 3.
pub fn record(topic_id: Uuid, confidence: Option<Confidence>) -> Endpoint<Value> {
    Endpoint::post("/revisions").with_body(json!({
        "topic_id": topic_id,
        "confidence": confidence.unwrap_or_default(),
    }))
}

/// Record `count` revisions of a topic at once
pub fn record_multiple(topic_id: Uuid, count: u32) -> Endpoint<Value> {
    Endpoint::post(format!("/topics/{topic_id}/add-multiple-revisions"))
        .with_body(json!({ "count": count }))
}

pub fn get(revision_id: Uuid) -> Endpoint<Revision> {
    Endpoint::get(format!("/revisions/{revision_id}"))
}

pub fn edit(revision_id: Uuid, update: &RevisionUpdate) -> Endpoint<Value> {
    Endpoint::put(format!("/revisions/{revision_id}")).with_body(json!(update))
}

pub fn delete(revision_id: Uuid) -> Endpoint<Value> {
    Endpoint::delete(format!("/revisions/{revision_id}"))
}

pub fn search(query: &str) -> Endpoint<OrEmpty<Revision>> {
    Endpoint::get("/revisions/search").with_param("q", query)
}

/// Stamp a topic as revised now, without a confidence rating
pub fn mark_topic(topic_id: Uuid) -> Endpoint<MarkedTopic> {
    Endpoint::post(format!("/revisions/{topic_id}/mark"))
}

/// Stamp every topic of a unit as revised now
pub fn mark_unit(subject: &str, unit: &str) -> Endpoint<MarkedUnit> {
    Endpoint::post("/revisions/unit/mark").with_body(json!({ "subject": subject, "unit": unit }))
}

pub fn export() -> Endpoint<Value> {
    Endpoint::get("/revisions/export")
}

/// Load data previously produced by [`export`]
pub fn import(data: &Value) -> Endpoint<Value> {
    Endpoint::post("/revisions/import").with_body(data.clone())
}

pub fn reset() -> Endpoint<Value> {
    Endpoint::post("/revisions/reset")
}

pub fn clear_completed() -> Endpoint<Value> {
    Endpoint::post("/revisions/clear-completed")
}
