use std::{path::PathBuf, time::Duration};

use rvt_client::{
    ApiClient, DEFAULT_BASE_URL, FileTokenStore, Gateway, Session,
};
use serde::Deserialize;

use crate::error::AppError;

/// Prefix of every environment variable read into [`AppConfig`]
pub const ENV_PREFIX: &str = "RVT_";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    #[serde(alias = "dev")]
    Development,
    #[serde(alias = "prod")]
    Production,
}

impl Environment {
    pub const fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Client configuration, read from `RVT_*` variables
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Where the session token is persisted; platform config dir when unset
    #[serde(default)]
    pub token_file: Option<PathBuf>,
    #[serde(default)]
    pub env: Environment,
    #[serde(default = "default_register_redirect_ms")]
    pub register_redirect_ms: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

const fn default_register_redirect_ms() -> u64 {
    1500
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_base_url(),
            request_timeout_secs: default_timeout_secs(),
            token_file: None,
            env: Environment::default(),
            register_redirect_ms: default_register_redirect_ms(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Ok(envy::prefixed(ENV_PREFIX).from_env::<Self>()?)
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub const fn register_redirect(&self) -> Duration {
        Duration::from_millis(self.register_redirect_ms)
    }

    /// Configured token file, falling back to the platform default
    pub fn token_file(&self) -> Option<PathBuf> {
        self.token_file.clone().or_else(FileTokenStore::default_path)
    }

    /// File-backed session, or a process-local one when no location is known
    pub fn session(&self) -> Session {
        match self.token_file() {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Using file session store");
                Session::new(FileTokenStore::new(path))
            }
            None => {
                tracing::warn!("No config directory found, the session will not be persisted");
                Session::in_memory()
            }
        }
    }

    pub fn client(&self) -> Result<ApiClient, AppError> {
        let gateway = Gateway::new(&self.api_base_url, self.timeout())?;
        Ok(ApiClient::new(gateway, self.session()))
    }
}
