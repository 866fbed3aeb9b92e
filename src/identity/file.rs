//! File-backed identity: the id survives process restarts.
//!
//! The file holds the bare id. A missing or blank file gets a freshly
//! generated id written to it. Read and write failures never surface: the
//! provider logs a warning and keeps an in-process id so at least the current
//! session buckets consistently.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::{generate_user_id, IdentityProvider};
use crate::Result;

/// Persists the user id in a single file.
#[derive(Debug)]
pub struct FileIdentityProvider {
    path: PathBuf,
    user_id: OnceLock<String>,
}

impl FileIdentityProvider {
    /// Create a provider backed by `path`. Nothing is read until first use.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            user_id: OnceLock::new(),
        }
    }

    /// Get the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_existing(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let id = contents.trim();
                Ok((!id.is_empty()).then(|| id.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn persist(&self, user_id: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, user_id)?;
        Ok(())
    }

    fn load_or_create(&self) -> String {
        match self.read_existing() {
            Ok(Some(id)) => return id,
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "unreadable identity file, using ephemeral id");
                return generate_user_id();
            }
        }

        let id = generate_user_id();
        if let Err(err) = self.persist(&id) {
            tracing::warn!(path = %self.path.display(), error = %err, "failed to persist user id");
        }
        id
    }
}

impl IdentityProvider for FileIdentityProvider {
    fn get_or_create_user_id(&self) -> String {
        self.user_id.get_or_init(|| self.load_or_create()).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_identity_creates_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("user_id");

        let id = FileIdentityProvider::new(&path).get_or_create_user_id();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), id);

        // A new provider, as after a restart, reads the same id back
        let reloaded = FileIdentityProvider::new(&path).get_or_create_user_id();
        assert_eq!(reloaded, id);
    }

    #[test]
    fn test_file_identity_reads_existing_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user_id");
        std::fs::write(&path, "user_existing\n").unwrap();

        let identity = FileIdentityProvider::new(&path);
        assert_eq!(identity.get_or_create_user_id(), "user_existing");
        assert_eq!(identity.path(), path.as_path());
    }

    #[test]
    fn test_file_identity_blank_file_regenerates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user_id");
        std::fs::write(&path, "   \n").unwrap();

        let id = FileIdentityProvider::new(&path).get_or_create_user_id();
        assert!(id.starts_with("user_"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), id);
    }

    #[test]
    fn test_file_identity_unwritable_path_stays_stable() {
        let dir = tempfile::tempdir().unwrap();
        // Parent is a regular file, so create_dir_all fails
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let identity = FileIdentityProvider::new(blocker.join("user_id"));

        let first = identity.get_or_create_user_id();
        assert!(!first.is_empty());
        assert_eq!(first, identity.get_or_create_user_id());
    }
}
