//! Session token storage: in-memory copy plus an on-disk vault.
//!
//! The in-memory copy is authoritative for the running process; the vault
//! lets a later invocation pick the session back up, the same way the web
//! dashboard recovers its token from a cookie after a page reload. Vault
//! entries carry a fixed 1-day expiry and the cookie-style `secure` /
//! `same_site` attributes. The token is stored as plain text; the vault is
//! a convenience, not a security boundary.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use zeroize::Zeroize;

/// Vault entries expire one day after they are written.
pub const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("token vault operation failed: {0}")]
    OperationFailed(String),
}

impl From<std::io::Error> for VaultError {
    fn from(err: std::io::Error) -> Self {
        VaultError::OperationFailed(err.to_string())
    }
}

/// Durable form of a stored token, mirroring the web cookie's attributes.
#[derive(Debug, Serialize, Deserialize)]
struct StoredToken {
    token: String,
    expires_at: DateTime<Utc>,
    secure: bool,
    same_site: String,
}

/// Holds the current auth token in memory and mirrors it to the vault file.
///
/// `token()` consults memory first and falls back to the vault, so a fresh
/// process recovers the session without logging in again. All writes go to
/// both places. No ambient singleton: callers construct one and share it
/// via `Arc`.
pub struct TokenStore {
    current: RwLock<Option<String>>,
    vault_path: PathBuf,
}

impl TokenStore {
    /// Create a store backed by the given vault file.
    pub fn new(vault_path: PathBuf) -> Self {
        Self {
            current: RwLock::new(None),
            vault_path,
        }
    }

    /// Default vault location under the user config directory.
    pub fn default_vault_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("guesthouse-admin")
            .join("token.json")
    }

    /// Resolve the effective token: memory first, then the vault.
    ///
    /// A valid vault entry is promoted into memory so subsequent calls skip
    /// the file read. An expired entry is deleted and treated as absent.
    pub async fn token(&self) -> Option<String> {
        if let Some(token) = self.current.read().await.clone() {
            return Some(token);
        }

        let stored = read_vault(&self.vault_path)?;
        if stored.expires_at <= Utc::now() {
            log::debug!("Stored token expired, removing vault entry");
            let _ = delete_vault(&self.vault_path);
            return None;
        }

        let mut guard = self.current.write().await;
        *guard = Some(stored.token.clone());
        Some(stored.token)
    }

    /// Store a new token in memory and in the vault with a 1-day expiry.
    pub async fn set_token(&self, token: String) -> Result<(), VaultError> {
        {
            let mut guard = self.current.write().await;
            *guard = Some(token.clone());
        }

        let stored = StoredToken {
            token,
            expires_at: Utc::now() + Duration::hours(TOKEN_TTL_HOURS),
            secure: true,
            same_site: "strict".to_string(),
        };
        write_vault(&self.vault_path, &stored)
    }

    /// Drop the token from memory (zeroized) and delete the vault entry.
    ///
    /// Idempotent: clearing an absent token is not an error.
    pub async fn clear_token(&self) -> Result<(), VaultError> {
        {
            let mut guard = self.current.write().await;
            if let Some(ref mut token) = *guard {
                token.zeroize();
            }
            *guard = None;
        }
        delete_vault(&self.vault_path)
    }
}

/// Read and parse the vault file. Returns `None` if missing or unreadable.
fn read_vault(path: &Path) -> Option<StoredToken> {
    let raw = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&raw) {
        Ok(stored) => Some(stored),
        Err(e) => {
            log::warn!("Corrupt token vault at {}: {}", path.display(), e);
            None
        }
    }
}

fn write_vault(path: &Path, stored: &StoredToken) -> Result<(), VaultError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let raw = serde_json::to_string_pretty(stored)
        .map_err(|e| VaultError::OperationFailed(e.to_string()))?;
    std::fs::write(path, raw)?;
    Ok(())
}

fn delete_vault(path: &Path) -> Result<(), VaultError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()), // Already gone, idempotent
        Err(e) => Err(VaultError::from(e)),
    }
}
