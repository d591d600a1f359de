//! Token storage between CLI invocations.
//!
//! `mercado login` writes the token pair to a JSON file; authenticated
//! subcommands read it back. `logout` and `delete-user` remove it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Errors reading or writing the session file.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt session file: {0}")]
    Json(#[from] serde_json::Error),
}

/// A logged-in user's tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    pub access: String,
    pub refresh: String,
}

/// The session file on disk.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored session, if any.
    pub fn load(&self) -> Result<Option<Session>, SessionError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        let json = serde_json::to_vec_pretty(session)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    /// Remove the session file. A missing file is not an error.
    pub fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> SessionStore {
        let path = std::env::temp_dir().join(format!(
            "mercado-session-{}-{name}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        SessionStore::new(path)
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let store = temp_store("missing");
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let store = temp_store("save");
        let session = Session {
            username: "ana".to_string(),
            access: "a.b.c".to_string(),
            refresh: "d.e.f".to_string(),
        };

        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), Some(session));

        store.clear().unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let store = temp_store("clear");
        store.clear().unwrap();
        store.clear().unwrap();
    }

    #[test]
    fn test_corrupt_file() {
        let store = temp_store("corrupt");
        std::fs::write(store.path(), b"{not json").unwrap();
        assert!(matches!(store.load(), Err(SessionError::Json(_))));
        store.clear().unwrap();
    }
}
