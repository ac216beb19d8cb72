//! Client-side session token storage.
//!
//! Which store a [`ShopSession`](super::ShopSession) uses is decided when it
//! is built, never at call time:
//!
//! - [`NoopTokenStore`] - server execution context; the browser owns the
//!   token, so every operation succeeds without doing anything
//! - [`MemoryTokenStore`] - process-local, forgotten on exit
//! - [`FileTokenStore`] - persistent, one file named
//!   [`TOKEN_STORAGE_KEY`] in a chosen directory

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use thiserror::Error;
use vendure_storefront_core::{SessionToken, TOKEN_STORAGE_KEY};

/// Errors from a persistent token store.
#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("token storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Where the client keeps its bearer token between calls.
pub trait TokenStore: Send + Sync {
    /// The stored token, if any.
    fn get_token(&self) -> Option<SessionToken>;

    /// Replace the stored token.
    ///
    /// # Errors
    ///
    /// Returns an error if a persistent store cannot be written.
    fn set_token(&self, token: &SessionToken) -> Result<(), TokenStoreError>;

    /// Forget the stored token. Clearing an empty store succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if a persistent store cannot be written.
    fn clear_token(&self) -> Result<(), TokenStoreError>;
}

// =============================================================================
// NoopTokenStore
// =============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTokenStore;

impl TokenStore for NoopTokenStore {
    fn get_token(&self) -> Option<SessionToken> {
        None
    }

    fn set_token(&self, _token: &SessionToken) -> Result<(), TokenStoreError> {
        Ok(())
    }

    fn clear_token(&self) -> Result<(), TokenStoreError> {
        Ok(())
    }
}

// =============================================================================
// MemoryTokenStore
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<SessionToken>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get_token(&self) -> Option<SessionToken> {
        // A poisoned lock still holds the last written token.
        self.token
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn set_token(&self, token: &SessionToken) -> Result<(), TokenStoreError> {
        *self
            .token
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(token.clone());
        Ok(())
    }

    fn clear_token(&self) -> Result<(), TokenStoreError> {
        *self
            .token
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = None;
        Ok(())
    }
}

// =============================================================================
// FileTokenStore
// =============================================================================

#[cfg(unix)]
const TOKEN_FILE_MODE: u32 = 0o600;

/// Token persisted as a single file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store the token in `dir`/[`TOKEN_STORAGE_KEY`].
    ///
    /// The directory is created on the first write.
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(TOKEN_STORAGE_KEY),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the file readable by the owner only.
    fn write_private(&self, contents: &[u8]) -> io::Result<()> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(TOKEN_FILE_MODE);

        let mut file = options.open(&self.path)?;
        // `mode` only applies on create; tighten a file left by older runs.
        #[cfg(unix)]
        file.set_permissions(fs::Permissions::from_mode(TOKEN_FILE_MODE))?;
        file.write_all(contents)
    }

    fn io_error(&self, source: io::Error) -> TokenStoreError {
        TokenStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl TokenStore for FileTokenStore {
    fn get_token(&self) -> Option<SessionToken> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                (!token.is_empty()).then(|| SessionToken::new(token))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read stored token");
                None
            }
        }
    }

    fn set_token(&self, token: &SessionToken) -> Result<(), TokenStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        self.write_private(token.expose().as_bytes())
            .map_err(|e| self.io_error(e))
    }

    fn clear_token(&self) -> Result<(), TokenStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}
