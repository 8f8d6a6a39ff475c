use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// Default rating for difficulty, importance and confidence
pub const DEFAULT_RATING: u8 = 3;

const fn default_rating() -> u8 {
    DEFAULT_RATING
}

/// Self-rated recall strength at the time of a revision, 1 to 5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Confidence(u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Confidence must be between 1 and 5, got {0}")]
pub struct InvalidConfidence(pub u8);

impl Confidence {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub const fn new(value: u8) -> Result<Self, InvalidConfidence> {
        if value >= Self::MIN && value <= Self::MAX {
            Ok(Self(value))
        } else {
            Err(InvalidConfidence(value))
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Self(DEFAULT_RATING)
    }
}

impl TryFrom<u8> for Confidence {
    type Error = InvalidConfidence;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Confidence> for u8 {
    fn from(confidence: Confidence) -> Self {
        confidence.0
    }
}

/// Topic as stored by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub id: Uuid,
    pub name: String,
    pub subject: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default = "default_rating")]
    pub difficulty: u8,
    #[serde(default = "default_rating")]
    pub importance: u8,
    #[serde(default, deserialize_with = "timestamp::optional")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::optional")]
    pub last_revised: Option<DateTime<Utc>>,
}

/// Topic fields without an identity: used to add or edit a topic, and as a
/// syllabus preview row before it is committed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTopic {
    pub name: String,
    pub subject: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default = "default_rating")]
    pub difficulty: u8,
    #[serde(default = "default_rating")]
    pub importance: u8,
}

impl NewTopic {
    pub fn new(name: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subject: subject.into(),
            unit: None,
            difficulty: DEFAULT_RATING,
            importance: DEFAULT_RATING,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

/// One recorded revision of a topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    pub id: Uuid,
    pub topic_id: Uuid,
    #[serde(default)]
    pub confidence: Confidence,
    #[serde(
        default,
        alias = "revised_at",
        alias = "created_at",
        deserialize_with = "timestamp::optional"
    )]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Editable fields of a revision; unset fields are left out of the request
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RevisionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Response of marking a single topic revised
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MarkedTopic {
    pub id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "timestamp::optional")]
    pub last_revised: Option<DateTime<Utc>>,
}

/// Response of marking every topic of a unit revised
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MarkedUnit {
    pub subject: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub updated_topics: u32,
    #[serde(default, deserialize_with = "timestamp::optional")]
    pub last_revised: Option<DateTime<Utc>>,
}

/// Read-only queue projection; `priority` is whatever the service reports
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QueueItem {
    pub id: Uuid,
    #[serde(alias = "topic")]
    pub name: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub priority: f64,
    #[serde(default, deserialize_with = "timestamp::optional")]
    pub last_revised: Option<DateTime<Utc>>,
}

impl QueueItem {
    /// Priority as a percentage in `0..=100`, for filling a bar
    pub fn priority_percent(&self) -> f64 {
        if self.priority.is_finite() {
            self.priority.clamp(0.0, 1.0) * 100.0
        } else {
            0.0
        }
    }
}

/// A list that tolerates the service answering with something other than an
/// array: any non-array body decodes to an empty list.
#[derive(Debug, Clone, PartialEq)]
pub struct OrEmpty<T>(pub Vec<T>);

impl<T> OrEmpty<T> {
    pub fn into_inner(self) -> Vec<T> {
        self.0
    }
}

impl<T> Default for OrEmpty<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for OrEmpty<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Array(items) => items
                .into_iter()
                .map(serde_json::from_value)
                .collect::<Result<Vec<T>, _>>()
                .map(Self)
                .map_err(serde::de::Error::custom),
            other => {
                tracing::debug!(body = %other, "Non-array response read as an empty list");
                Ok(Self::default())
            }
        }
    }
}

// Unit-wise queue

/// Bucket counts and the share of fresh topics
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct QueueProgress {
    pub total: u32,
    pub overdue: u32,
    pub due: u32,
    pub fresh: u32,
    pub progress: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BucketTopic {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub priority: f64,
    #[serde(default = "default_rating")]
    pub difficulty: u8,
    #[serde(default = "default_rating")]
    pub importance: u8,
    #[serde(default, deserialize_with = "timestamp::optional")]
    pub last_revised: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Buckets {
    pub overdue: Vec<BucketTopic>,
    pub due: Vec<BucketTopic>,
    pub fresh: Vec<BucketTopic>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UnitQueue {
    pub buckets: Buckets,
    pub progress: QueueProgress,
}

/// Units of one subject plus the subject-wide progress
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubjectQueue {
    pub units: BTreeMap<String, UnitQueue>,
    pub progress: Option<QueueProgress>,
}

const SUBJECT_META_KEY: &str = "_meta";

/// Subject maps mix unit entries with a `_meta` progress entry under the same object
impl<'de> Deserialize<'de> for SubjectQueue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
        let mut queue = Self::default();

        for (key, value) in raw {
            if key == SUBJECT_META_KEY {
                queue.progress =
                    Some(serde_json::from_value(value).map_err(serde::de::Error::custom)?);
            } else if !key.starts_with('_') {
                let unit = serde_json::from_value(value).map_err(serde::de::Error::custom)?;
                queue.units.insert(key, unit);
            }
        }

        Ok(queue)
    }
}

/// Subject name to its queue
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct UnitWiseQueue(pub BTreeMap<String, SubjectQueue>);

// Analytics

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Streak {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub active_today: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DailyGoal {
    pub goal: u32,
    pub revised_today: u32,
    pub remaining: u32,
    pub progress: f64,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubjectGoal {
    pub subject: String,
    pub today_goal: u32,
    #[serde(default)]
    pub overdue: u32,
    #[serde(default)]
    pub due: u32,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Today's goal split across subjects
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SubjectGoals {
    pub base_daily_goal: Option<u32>,
    #[serde(alias = "goals")]
    pub subjects: Vec<SubjectGoal>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WeeklySummary {
    pub total_revised: u32,
    pub average_per_day: f64,
    /// ISO date to revisions that day, last seven days
    pub days: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SubjectWeek {
    pub days: BTreeMap<String, u32>,
    pub total: u32,
    pub average_per_day: f64,
}

/// Subject name to its last seven days
pub type SubjectWeeklySummary = BTreeMap<String, SubjectWeek>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BalanceStatus {
    UnderRevised,
    OverFocused,
    Balanced,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BalanceSuggestion {
    pub subject: String,
    #[serde(default)]
    pub revised_this_week: u32,
    #[serde(default)]
    pub share: f64,
    pub status: BalanceStatus,
    #[serde(default)]
    pub suggestion: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SubjectBalance {
    pub message: Option<String>,
    pub total_revisions: u32,
    pub expected_share: f64,
    #[serde(alias = "suggestions")]
    pub subjects: Vec<BalanceSuggestion>,
}

// Priority modes

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PriorityModes {
    pub modes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ActiveMode {
    pub priority_mode: String,
}

// Auth

/// Login answer. A missing `access_token` means the login did not succeed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoginResponse {
    pub access_token: Option<String>,
    pub token_type: Option<String>,
}

/// Registration answer: the created identity, never a token
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RegisteredUser {
    pub id: Option<Uuid>,
    pub email: Option<String>,
    #[serde(deserialize_with = "timestamp::optional")]
    pub created_at: Option<DateTime<Utc>>,
}

// Syllabus, subjects

/// Candidate topics parsed from free text
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParsedSyllabus {
    pub count: Option<usize>,
    pub topics: Vec<NewTopic>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BulkCreated {
    pub created: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Subjects {
    pub count: usize,
    pub subjects: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubjectUnits {
    pub subject: String,
    /// Topics without a unit show up as `None`
    #[serde(default)]
    pub units: Vec<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UnitTopic {
    pub id: Uuid,
    pub name: String,
    #[serde(default = "default_rating")]
    pub difficulty: u8,
    #[serde(default = "default_rating")]
    pub importance: u8,
    #[serde(default, deserialize_with = "timestamp::optional")]
    pub last_revised: Option<DateTime<Utc>>,
}

/// The service emits both offset and naive (UTC) timestamps
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, de::Error};

    pub(super) fn optional<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp: {raw}"))))
            .transpose()
    }

    fn parse(raw: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_confidence_bounds_and_default() {
        assert_eq!(Confidence::default().get(), 3);
        assert!(Confidence::new(1).is_ok());
        assert!(Confidence::new(5).is_ok());
        assert_eq!(Confidence::new(0), Err(InvalidConfidence(0)));
        assert_eq!(Confidence::new(6), Err(InvalidConfidence(6)));
        assert!(serde_json::from_value::<Confidence>(json!(9)).is_err());
        assert_eq!(serde_json::to_value(Confidence::default()).unwrap(), json!(3));
    }

    #[test]
    fn test_topic_accepts_naive_and_offset_timestamps() {
        let topic: Topic = serde_json::from_value(json!({
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "name": "Algebra",
            "subject": "Math",
            "unit": null,
            "difficulty": 2,
            "importance": 4,
            "created_at": "2024-03-01T10:00:00.123456",
            "last_revised": "2024-03-02T08:30:00+00:00"
        }))
        .unwrap();

        assert_eq!(topic.unit, None);
        assert_eq!(topic.created_at.unwrap().to_rfc3339(), "2024-03-01T10:00:00.123456+00:00");
        assert!(topic.last_revised.is_some());
    }

    #[test]
    fn test_or_empty_coerces_non_arrays() {
        let items: OrEmpty<QueueItem> = serde_json::from_value(Value::Null).unwrap();
        assert!(items.0.is_empty());

        let items: OrEmpty<QueueItem> =
            serde_json::from_value(json!({ "detail": "Not authenticated" })).unwrap();
        assert!(items.0.is_empty());

        let items: OrEmpty<QueueItem> = serde_json::from_value(json!([{
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "topic": "Limits",
            "subject": "Math",
            "priority": 0.42
        }]))
        .unwrap();
        assert_eq!(items.0.len(), 1);
        assert_eq!(items.0[0].name, "Limits");
    }

    #[test]
    fn test_priority_percent_is_clamped() {
        let mut item = QueueItem {
            id: Uuid::nil(),
            name: "x".to_string(),
            subject: None,
            unit: None,
            priority: 0.25,
            last_revised: None,
        };
        assert_eq!(item.priority_percent(), 25.0);
        item.priority = 1.7;
        assert_eq!(item.priority_percent(), 100.0);
        item.priority = f64::NAN;
        assert_eq!(item.priority_percent(), 0.0);
    }

    #[test]
    fn test_unit_wise_queue_splits_meta() {
        let queue: UnitWiseQueue = serde_json::from_value(json!({
            "Math": {
                "Unit 1": {
                    "buckets": {
                        "overdue": [{
                            "id": "550e8400-e29b-41d4-a716-446655440000",
                            "name": "Algebra",
                            "priority": 0.8,
                            "difficulty": 4,
                            "importance": 5,
                            "last_revised": null
                        }],
                        "due": [],
                        "fresh": []
                    },
                    "progress": { "total": 1, "overdue": 1, "due": 0, "fresh": 0, "progress": 0.0 }
                },
                "_meta": { "total": 1, "overdue": 1, "due": 0, "fresh": 0, "progress": 0.0 }
            }
        }))
        .unwrap();

        let math = &queue.0["Math"];
        assert_eq!(math.units.len(), 1);
        assert_eq!(math.units["Unit 1"].buckets.overdue[0].name, "Algebra");
        assert_eq!(math.progress.as_ref().unwrap().overdue, 1);
    }

    #[test]
    fn test_empty_analytics_shapes() {
        let balance: SubjectBalance = serde_json::from_value(json!({
            "message": "No revisions yet this week",
            "suggestions": []
        }))
        .unwrap();
        assert!(balance.subjects.is_empty());
        assert_eq!(balance.message.as_deref(), Some("No revisions yet this week"));

        let goals: SubjectGoals =
            serde_json::from_value(json!({ "message": "No subjects yet", "goals": [] })).unwrap();
        assert!(goals.subjects.is_empty());
        assert_eq!(goals.base_daily_goal, None);

        let balance: SubjectBalance = serde_json::from_value(json!({
            "total_revisions": 4,
            "expected_share": 0.5,
            "subjects": [
                { "subject": "Math", "revised_this_week": 3, "share": 0.75, "status": "over-focused", "suggestion": "..." },
                { "subject": "Art", "revised_this_week": 1, "share": 0.25, "status": "under-revised", "suggestion": "..." }
            ]
        }))
        .unwrap();
        assert_eq!(balance.subjects[0].status, BalanceStatus::OverFocused);
        assert_eq!(balance.subjects[1].status, BalanceStatus::UnderRevised);
    }

    #[test]
    fn test_parsed_syllabus_defaults_to_no_topics() {
        let parsed: ParsedSyllabus = serde_json::from_value(json!({ "count": 0 })).unwrap();
        assert!(parsed.topics.is_empty());

        let parsed: ParsedSyllabus = serde_json::from_value(json!({
            "topics": [{ "name": "Algebra", "subject": "Math" }]
        }))
        .unwrap();
        assert_eq!(parsed.topics[0], NewTopic::new("Algebra", "Math"));
    }
}
