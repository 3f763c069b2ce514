//! Bearer token storage.
//!
//! One token per store, persisted as a plain file under the app home with
//! restricted permissions (0600). Token validity is decided entirely by the
//! server; there is no client-side expiry tracking. Tokens are never logged
//! in full.

use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Token filename under the app home.
const TOKEN_FILE: &str = "token";

/// File-backed store for the single bearer token.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The default token path, `~/.ambu/token`.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|home| home.join(".ambu").join(TOKEN_FILE))
            .unwrap_or_else(|| PathBuf::from(".ambu").join(TOKEN_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored token. A missing or empty file reads as absent. The
    /// token is otherwise opaque and returned byte-for-byte; only a single
    /// trailing newline, as left by hand editing, is ignored.
    pub fn get(&self) -> Option<String> {
        let contents = fs::read_to_string(&self.path).ok()?;
        let token = contents.strip_suffix('\n').unwrap_or(&contents);
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }

    /// Persist the token, creating the parent directory if needed.
    pub fn set(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)
                .with_context(|| format!("failed to open {} for writing", self.path.display()))?;
            file.write_all(token.as_bytes())
                .with_context(|| format!("failed to write to {}", self.path.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&self.path, token)
                .with_context(|| format!("failed to write to {}", self.path.display()))?;
        }

        Ok(())
    }

    /// Remove the stored token. Clearing an already-empty store is a no-op.
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("failed to remove {}", self.path.display()))?;
        }
        Ok(())
    }
}
