use rvt_client::{SessionError, models::InvalidConfidence};
use thiserror::Error;

/// Startup failures, before the shell is running
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] envy::Error),
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Rejected locally, before any network call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} cannot be empty")]
    Empty(&'static str),
    #[error("Password must be at most {max} characters")]
    PasswordTooLong { max: usize },
    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error(transparent)]
    Confidence(#[from] InvalidConfidence),
    #[error("Confidence must be a number between 1 and 5")]
    ConfidenceNotANumber,
    #[error("Unknown priority mode '{0}'")]
    UnknownMode(String),
    #[error("Nothing to commit, parse a syllabus first")]
    EmptyPreview,
    #[error("Please wait for the current request to finish")]
    Busy,
}
