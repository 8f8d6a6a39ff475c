//! Domain operations: one function per remote capability.
//!
//! Each function maps typed arguments to an [`Endpoint`](crate::Endpoint)
//! and does no I/O itself. Everything except [`auth`] is sent with the
//! session token.

pub mod analytics;
pub mod auth;
pub mod modes;
pub mod queue;
pub mod revisions;
pub mod settings;
pub mod subjects;
pub mod syllabus;
pub mod topics;
