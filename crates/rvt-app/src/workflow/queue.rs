use rvt_client::{
    ApiClient, ApiResult,
    models::{ActiveMode, OrEmpty, PriorityModes, QueueItem},
    operations::{modes, queue},
};

use super::Notice;
use crate::error::ValidationError;

/// Results of one queue view entry: the queue, then the known modes
#[derive(Debug, Clone, PartialEq)]
pub struct QueueLoad {
    pub items: ApiResult<OrEmpty<QueueItem>>,
    pub modes: ApiResult<PriorityModes>,
}

pub async fn fetch(client: &ApiClient, mode: Option<&str>) -> QueueLoad {
    let items = queue::revision_queue(mode).send(client).await;
    let modes = modes::list().send(client).await;
    QueueLoad { items, modes }
}

pub async fn select_mode(client: &ApiClient, mode: &str) -> ApiResult<ActiveMode> {
    modes::set_active(mode).send(client).await
}

/// Revision queue as reported by the service, highest priority first.
/// Priorities are displayed, never computed or reordered here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueueView {
    items: Vec<QueueItem>,
    modes: Vec<String>,
    mode: Option<String>,
    loading: bool,
    selecting: bool,
    notice: Option<Notice>,
}

impl QueueView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a specific prioritization mode
    pub fn with_mode(mode: Option<String>) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn items(&self) -> &[QueueItem] {
        &self.items
    }

    pub fn modes(&self) -> &[String] {
        &self.modes
    }

    pub fn mode(&self) -> Option<&str> {
        self.mode.as_deref()
    }

    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// A queue load or a mode change is in flight
    pub const fn is_busy(&self) -> bool {
        self.loading || self.selecting
    }

    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn begin_load(&mut self) {
        self.loading = true;
    }

    /// A failed queue fetch empties the list instead of failing the view
    pub fn finish_load(&mut self, load: QueueLoad) {
        self.loading = false;

        match load.items {
            Ok(items) => self.items = items.into_inner(),
            Err(failure) => {
                self.items.clear();
                self.notice = Some(Notice::failure(&failure));
            }
        }

        match load.modes {
            Ok(modes) => self.modes = modes.modes,
            Err(failure) => tracing::warn!("Failed to list priority modes: {failure}"),
        }
    }

    pub fn begin_select_mode(&mut self, mode: &str) -> Result<String, ValidationError> {
        let mode = mode.trim();
        let checked = if self.is_busy() {
            Err(ValidationError::Busy)
        } else if mode.is_empty() {
            Err(ValidationError::Empty("Mode"))
        } else if !self.modes.is_empty() && !self.modes.iter().any(|known| known == mode) {
            Err(ValidationError::UnknownMode(mode.to_string()))
        } else {
            Ok(mode.to_string())
        };

        self.notice = checked
            .as_ref()
            .err()
            .map(|e| Notice::Error(e.to_string()));
        if checked.is_ok() {
            self.selecting = true;
        }
        checked
    }

    /// Returns `true` when the queue must be reloaded under the new mode
    pub fn finish_select_mode(&mut self, result: ApiResult<ActiveMode>) -> bool {
        self.selecting = false;
        match result {
            Ok(active) => {
                self.notice = Some(Notice::Info(format!(
                    "Priority mode set to {}",
                    active.priority_mode
                )));
                self.mode = Some(active.priority_mode);
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
        let load = fetch(client, self.mode.as_deref()).await;
        self.finish_load(load);
    }

    pub async fn choose_mode(
        &mut self,
        client: &ApiClient,
        mode: &str,
    ) -> Result<(), ValidationError> {
        let mode = self.begin_select_mode(mode)?;
        let result = select_mode(client, &mode).await;
        if self.finish_select_mode(result) {
            self.load(client).await;
        }
        Ok(())
    }
}
