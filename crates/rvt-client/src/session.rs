//! Session store for the opaque access token.
//!
//! The stored token is the single source of truth for whether a session is
//! active. A [`Session`] is an injectable handle over a [`TokenStore`]: clone
//! it freely, every clone sees the same token.

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
    sync::{Arc, PoisonError, RwLock},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session storage error: {0}")]
    Io(#[from] io::Error),
    #[error("Session file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("Refusing to store an empty token")]
    EmptyToken,
}

/// Backing storage for the credential token
pub trait TokenStore: Send + Sync + fmt::Debug {
    /// Read the stored token, `None` when nothing is stored
    fn load(&self) -> Result<Option<String>, SessionError>;

    /// Replace the stored token
    fn save(&self, token: &str) -> Result<(), SessionError>;

    /// Remove the stored token. Removing an absent token is not an error.
    fn clear(&self) -> Result<(), SessionError>;
}

/// Process-local token storage
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that starts out holding `token`
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        let token = self.token.read().unwrap_or_else(PoisonError::into_inner);
        Ok(token.clone().filter(|token| !token.is_empty()))
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        self.token
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        Ok(())
    }
}

/// On-disk document holding the one persisted key
#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    token: String,
}

/// Token storage in a small JSON file
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/revision-tracker/session.json`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("revision-tracker").join("session.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let stored: StoredSession = serde_json::from_slice(&bytes)?;
        Ok(Some(stored.token).filter(|token| !token.is_empty()))
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let document = serde_json::to_vec_pretty(&StoredSession {
            token: token.to_string(),
        })?;
        fs::write(&self.path, document)?;

        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Shared handle to the active session
#[derive(Debug, Clone)]
pub struct Session {
    store: Arc<dyn TokenStore>,
}

impl Session {
    pub fn new(store: impl TokenStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// A session that lives only as long as the process
    pub fn in_memory() -> Self {
        Self::new(MemoryTokenStore::new())
    }

    /// Startup read. Unlike [`Session::token`] this reports storage errors.
    pub fn restore(&self) -> Result<Option<String>, SessionError> {
        self.store.load()
    }

    /// Snapshot of the current token. Storage errors read as "no token".
    pub fn token(&self) -> Option<String> {
        match self.store.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Failed to read session token: {e}");
                None
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.token().is_some()
    }

    /// Persist a token; effective for every call issued afterwards
    pub fn set_token(&self, token: &str) -> Result<(), SessionError> {
        if token.is_empty() {
            return Err(SessionError::EmptyToken);
        }

        self.store.save(token)?;
        tracing::info!("Session token stored");
        Ok(())
    }

    /// Remove the token. Repeated calls are no-ops.
    pub fn clear(&self) {
        if let Err(e) = self.store.clear() {
            tracing::error!("Failed to clear session token: {e}");
        }
    }

    /// End the session
    pub fn logout(&self) {
        self.clear();
        tracing::info!("Logged out");
    }
}
