//! Durable home of the single credential token string.
//! Absence of the token means "logged out"; nothing else is persisted.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::AppResult;

pub trait TokenStorage: Send + Sync {
    /// Current token, or `None` when logged out.
    fn load(&self) -> AppResult<Option<String>>;
    /// Persist `token`, replacing whatever was there.
    fn store(&self, token: &str) -> AppResult<()>;
    /// Remove the token. Removing an absent token is not an error.
    fn clear(&self) -> AppResult<()>;
}

/// Token kept in a single file; the file's whole contents are the token.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self { Self { path: path.into() } }
    pub fn path(&self) -> &Path { &self.path }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> AppResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(s) => {
                let t = s.trim();
                if t.is_empty() { Ok(None) } else { Ok(Some(t.to_string())) }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, token: &str) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        // Readers see the old token or the new one, never a partial write
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, token)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local storage; the session ends with the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self { Self::default() }
    pub fn with_token<S: Into<String>>(token: S) -> Self { Self { slot: Mutex::new(Some(token.into())) } }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> AppResult<Option<String>> { Ok(self.slot.lock().clone()) }

    fn store(&self, token: &str) -> AppResult<()> {
        *self.slot.lock() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        self.slot.lock().take();
        Ok(())
    }
}
