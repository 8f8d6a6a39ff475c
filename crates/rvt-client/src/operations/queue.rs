use crate::{
    client::Endpoint,
    models::{OrEmpty, QueueItem, UnitWiseQueue},
};

/// Flat queue, highest priority first. `mode` selects a prioritization
/// strategy; `None` leaves the choice to the service.
pub fn revision_queue(mode: Option<&str>) -> Endpoint<OrEmpty<QueueItem>> {
    Endpoint::get("/revision-queue").with_query("mode", mode)
}

/// Queue grouped by subject and unit into overdue, due and fresh buckets
pub fn unit_wise(mode: Option<&str>) -> Endpoint<UnitWiseQueue> {
    Endpoint::get("/revision-queue/unit-wise").with_query("mode", mode)
}
