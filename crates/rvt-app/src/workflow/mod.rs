//! Per-page controllers.
//!
//! Each controller is a small state machine with pure `begin_*` / `finish_*`
//! transitions and a free `fetch`-style function that performs the remote
//! chain. The shell spawns the chain and feeds its result back into the
//! matching `finish_*`; the async convenience methods do both in one call.

pub mod auth;
pub mod queue;
pub mod stats;
pub mod syllabus;
pub mod topics;

use rvt_client::Failure;

/// Inline message shown under a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

impl Notice {
    pub fn failure(failure: &Failure) -> Self {
        Self::Error(failure.detail())
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Info(text) | Self::Error(text) => text,
        }
    }

    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}
