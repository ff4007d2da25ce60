//! File-backed session storage.
//!
//! Persists the durable session subset as `wms-auth.json` under the
//! platform data directory, with restrictive permissions on Unix.

use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;

use wms_core::error::StorageError;
use wms_core::{PersistedSession, SessionStorage};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Session storage backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Create a storage over an explicit file path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Open the storage at the platform's default location, creating the
    /// data directory if needed.
    pub fn open_default() -> Result<Self, StorageError> {
        let dirs = ProjectDirs::from("", "", "wms").ok_or_else(|| StorageError::Other {
            message: "could not determine data directory".to_string(),
        })?;

        let data_dir = dirs.data_dir();
        fs::create_dir_all(data_dir)?;

        Ok(Self::new(data_dir.join("wms-auth.json")))
    }

    /// The file this storage reads and writes.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl SessionStorage for FileStorage {
    fn save(&self, session: &PersistedSession) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, &json)?;

        // Set restrictive permissions (Unix only)
        #[cfg(unix)]
        {
            let mut perms = fs::metadata(&self.path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.path, perms)?;
        }

        Ok(())
    }

    fn load(&self) -> Result<Option<PersistedSession>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path)?;
        let session: PersistedSession = serde_json::from_str(&json)?;
        Ok(Some(session))
    }

    fn clear(&self) -> Result<(), StorageError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PersistedSession {
        PersistedSession {
            access_token: Some("A1".to_string()),
            refresh_token: Some("R1".to_string()),
            tenant_slug: Some("acme".to_string()),
            is_authenticated: true,
        }
    }

    #[test]
    fn save_load_clear_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("wms-auth.json"));

        assert!(storage.load().unwrap().is_none());

        storage.save(&record()).unwrap();
        assert_eq!(storage.load().unwrap(), Some(record()));

        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_none());
        // Clearing twice is fine.
        storage.clear().unwrap();
    }

    #[test]
    fn file_uses_storage_layout_field_names() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("wms-auth.json"));
        storage.save(&record()).unwrap();

        let raw = std::fs::read_to_string(storage.path()).unwrap();
        assert!(raw.contains("accessToken"));
        assert!(raw.contains("refreshToken"));
        assert!(raw.contains("tenantSlug"));
        assert!(raw.contains("isAuthenticated"));
    }

    #[cfg(unix)]
    #[test]
    fn file_is_owner_readable_only() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("wms-auth.json"));
        storage.save(&record()).unwrap();

        let mode = std::fs::metadata(storage.path())
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
