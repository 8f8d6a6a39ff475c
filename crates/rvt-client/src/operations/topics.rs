use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    client::Endpoint,
    models::{BulkCreated, NewTopic, OrEmpty, Topic},
};

pub fn list() -> Endpoint<OrEmpty<Topic>> {
    Endpoint::get("/topics")
}

pub fn get(topic_id: Uuid) -> Endpoint<Topic> {
    Endpoint::get(format!("/topics/{topic_id}"))
}

pub fn add(topic: &NewTopic) -> Endpoint<Topic> {
    Endpoint::post("/topics").with_body(json!(topic))
}

pub fn edit(topic_id: Uuid, topic: &NewTopic) -> Endpoint<Value> {
    Endpoint::put(format!("/topics/{topic_id}")).with_body(json!(topic))
}

pub fn delete(topic_id: Uuid) -> Endpoint<Value> {
    Endpoint::delete(format!("/topics/{topic_id}"))
}

/// Free-text search, sent as `?q=` even when the query is empty
pub fn search(query: &str) -> Endpoint<OrEmpty<Topic>> {
    Endpoint::get("/topics/search").with_param("q", query)
}

/// Insert many topics in one call; the body is the bare array
pub fn bulk_create(topics: &[NewTopic]) -> Endpoint<BulkCreated> {
    Endpoint::post("/topics/bulk").with_body(json!(topics))
}
