pub mod config;
pub mod error;
pub mod shell;
pub mod tracing;
pub mod validation;
pub mod workflow;

pub use config::{AppConfig, Environment};
pub use error::{AppError, ValidationError};
pub use shell::{Message, Page, Screen, Shell, ShellState};
