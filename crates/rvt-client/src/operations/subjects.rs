use crate::{
    client::{Endpoint, segment},
    models::{OrEmpty, SubjectUnits, Subjects, UnitTopic},
};

pub fn list() -> Endpoint<Subjects> {
    Endpoint::get("/subjects")
}

pub fn units(subject: &str) -> Endpoint<SubjectUnits> {
    Endpoint::get(format!("/subjects/{}/units", segment(subject)))
}

/// Topics of one unit within a subject
pub fn unit_topics(subject: &str, unit: &str) -> Endpoint<OrEmpty<UnitTopic>> {
    Endpoint::get(format!(
        "/subjects/{}/units/{}/topics",
        segment(subject),
        segment(unit)
    ))
}
