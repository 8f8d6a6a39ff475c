pub mod client;
pub mod gateway;
pub mod metrics;
pub mod models;
pub mod operations;
pub mod session;

pub use client::{ApiClient, Endpoint};
pub use gateway::{ApiResult, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, Failure, Gateway, RequestOptions};
pub use session::{FileTokenStore, MemoryTokenStore, Session, SessionError, TokenStore};
