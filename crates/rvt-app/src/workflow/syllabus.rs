//! Syllabus import: parse free text into a preview, then commit the preview
//! as one bulk insert.
//!
//! The preview lives only here. It is replaced by every successful parse,
//! cleared by a failed parse and by a successful commit, and kept untouched
//! when a commit fails so it can be retried.

use rvt_client::{
    ApiClient, ApiResult,
    models::{BulkCreated, NewTopic, ParsedSyllabus},
    operations::{syllabus, topics},
};

use super::Notice;
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyllabusPhase {
    Editing,
    Parsing,
    Previewing,
    Committing,
}

/// Owned copy of the parse input, safe to move into a spawned task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRequest {
    pub text: String,
    pub subject: Option<String>,
}

impl ParseRequest {
    pub async fn send(&self, client: &ApiClient) -> ApiResult<Option<ParsedSyllabus>> {
        syllabus::parse(&self.text, self.subject.as_deref())
            .send(client)
            .await
    }
}

/// The preview as it was when commit started
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRequest {
    pub topics: Vec<NewTopic>,
}

impl CommitRequest {
    pub async fn send(&self, client: &ApiClient) -> ApiResult<BulkCreated> {
        topics::bulk_create(&self.topics).send(client).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyllabusWorkflow {
    text: String,
    subject: Option<String>,
    preview: Vec<NewTopic>,
    phase: SyllabusPhase,
    notice: Option<Notice>,
}

impl Default for SyllabusWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl SyllabusWorkflow {
    pub const fn new() -> Self {
        Self {
            text: String::new(),
            subject: None,
            preview: Vec::new(),
            phase: SyllabusPhase::Editing,
            notice: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn preview(&self) -> &[NewTopic] {
        &self.preview
    }

    pub const fn phase(&self) -> SyllabusPhase {
        self.phase
    }

    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    const fn is_busy(&self) -> bool {
        matches!(
            self.phase,
            SyllabusPhase::Parsing | SyllabusPhase::Committing
        )
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> Result<(), ValidationError> {
        if self.is_busy() {
            return Err(ValidationError::Busy);
        }
        self.text = text.into();
        Ok(())
    }

    /// Scope parsing to a subject; blank clears it
    pub fn set_subject(&mut self, subject: Option<String>) -> Result<(), ValidationError> {
        if self.is_busy() {
            return Err(ValidationError::Busy);
        }
        self.subject = subject.filter(|subject| !subject.trim().is_empty());
        Ok(())
    }

    pub fn begin_parse(&mut self) -> Result<ParseRequest, ValidationError> {
        if self.is_busy() {
            return Err(ValidationError::Busy);
        }
        if self.text.trim().is_empty() {
            let e = ValidationError::Empty("Syllabus text");
            self.notice = Some(Notice::Error(e.to_string()));
            return Err(e);
        }

        self.phase = SyllabusPhase::Parsing;
        self.notice = None;
        Ok(ParseRequest {
            text: self.text.clone(),
            subject: self.subject.clone(),
        })
    }

    pub fn finish_parse(&mut self, result: ApiResult<Option<ParsedSyllabus>>) {
        match result {
            Ok(parsed) => {
                self.preview = parsed.map(|parsed| parsed.topics).unwrap_or_default();
                if self.preview.is_empty() {
                    self.phase = SyllabusPhase::Editing;
                    self.notice = Some(Notice::Info("No topics found in that text".to_string()));
                } else {
                    self.phase = SyllabusPhase::Previewing;
                    self.notice = Some(Notice::Info(format!(
                        "Parsed {} topics, review them and commit",
                        self.preview.len()
                    )));
                }
                tracing::debug!(topics = self.preview.len(), "Syllabus parsed");
            }
            Err(failure) => {
                self.preview.clear();
                self.phase = SyllabusPhase::Editing;
                self.notice = Some(Notice::failure(&failure));
            }
        }
    }

    /// Freeze the preview for a bulk insert
    pub fn begin_commit(&mut self) -> Result<CommitRequest, ValidationError> {
        if self.is_busy() {
            return Err(ValidationError::Busy);
        }
        if self.preview.is_empty() {
            return Err(ValidationError::EmptyPreview);
        }

        self.phase = SyllabusPhase::Committing;
        self.notice = None;
        Ok(CommitRequest {
            topics: self.preview.clone(),
        })
    }

    pub fn finish_commit(&mut self, result: ApiResult<BulkCreated>) {
        match result {
            Ok(created) => {
                tracing::info!(created = created.created, "Syllabus committed");
                self.text.clear();
                self.preview.clear();
                self.phase = SyllabusPhase::Editing;
                self.notice = Some(Notice::Info(format!(
                    "Created {} topics",
                    created.created
                )));
            }
            Err(failure) => {
                self.phase = SyllabusPhase::Previewing;
                self.notice = Some(Notice::failure(&failure));
            }
        }
    }

    pub async fn parse(&mut self, client: &ApiClient) -> Result<(), ValidationError> {
        let request = self.begin_parse()?;
        let result = request.send(client).await;
        self.finish_parse(result);
        Ok(())
    }

    pub async fn commit(&mut self, client: &ApiClient) -> Result<(), ValidationError> {
        let request = self.begin_commit()?;
        let result = request.send(client).await;
        self.finish_commit(result);
        Ok(())
    }
}
