use rvt_client::{
    ApiClient, ApiResult,
    models::{Confidence, OrEmpty, Topic},
    operations::{revisions, topics},
};
use serde_json::Value;
use uuid::Uuid;

use super::Notice;
use crate::error::ValidationError;

/// One "mark revised" action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviseRequest {
    pub topic_id: Uuid,
    pub confidence: Option<Confidence>,
}

impl ReviseRequest {
    pub async fn send(self, client: &ApiClient) -> ApiResult<Value> {
        revisions::record(self.topic_id, self.confidence)
            .send(client)
            .await
    }
}

pub async fn fetch(client: &ApiClient) -> ApiResult<OrEmpty<Topic>> {
    topics::list().send(client).await
}

/// Topic list with revision recording.
///
/// A recorded revision is never patched into the list: the view reloads
/// everything from the service instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopicsView {
    topics: Vec<Topic>,
    loading: bool,
    pending: Option<Uuid>,
    notice: Option<Notice>,
}

impl TopicsView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Topic whose revision is being recorded
    pub const fn pending(&self) -> Option<Uuid> {
        self.pending
    }

    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn begin_load(&mut self) {
        self.loading = true;
    }

    pub fn finish_load(&mut self, result: ApiResult<OrEmpty<Topic>>) {
        self.loading = false;
        match result {
            Ok(topics) => self.topics = topics.into_inner(),
            Err(failure) => self.notice = Some(Notice::failure(&failure)),
        }
    }

    pub fn begin_revise(
        &mut self,
        topic_id: Uuid,
        confidence: Option<Confidence>,
    ) -> Result<ReviseRequest, ValidationError> {
        if self.loading || self.pending.is_some() {
            return Err(ValidationError::Busy);
        }

        self.pending = Some(topic_id);
        self.notice = None;
        Ok(ReviseRequest {
            topic_id,
            confidence,
        })
    }

    /// Returns `true` when the list must be reloaded
    pub fn finish_revise(&mut self, result: ApiResult<Value>) -> bool {
        let topic_id = self.pending.take();
        match result {
            Ok(_) => {
                tracing::debug!(?topic_id, "Revision recorded");
                self.notice = Some(Notice::Info("Revision recorded".to_string()));
                true
            }
            Err(failure) => {
                self.notice = Some(Notice::failure(&failure));
                false
            }
        }
    }

    pub async fn load(&mut self, client: &ApiClient) {
        self.begin_load();
        let result = fetch(client).await;
        self.finish_load(result);
    }

    pub async fn revise(
        &mut self,
        client: &ApiClient,
        topic_id: Uuid,
        confidence: Option<Confidence>,
    ) -> Result<(), ValidationError> {
        let request = self.begin_revise(topic_id, confidence)?;
        let result = request.send(client).await;
        if self.finish_revise(result) {
            self.load(client).await;
        }
        Ok(())
    }
}
