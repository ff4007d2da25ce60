//! Persisted session record, storage contract, and session events.

use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// The durable subset of session state.
///
/// Exactly these four fields survive process restarts; the identity record
/// is always refetched after rehydration and never persisted. Field names
/// match the `wms-auth` storage layout consumed by every wms client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    #[serde(rename = "accessToken")]
    pub access_token: Option<String>,
    #[serde(rename = "refreshToken")]
    pub refresh_token: Option<String>,
    #[serde(rename = "tenantSlug")]
    pub tenant_slug: Option<String>,
    #[serde(rename = "isAuthenticated")]
    pub is_authenticated: bool,
}

/// Durable storage for the persisted session subset.
///
/// Implementations must be synchronous: the session store commits every
/// mutation to storage before returning, so a crash immediately after any
/// operation cannot lose state beyond the last committed transition.
pub trait SessionStorage: Send + Sync {
    /// Persist the record, replacing any previous one.
    fn save(&self, session: &PersistedSession) -> Result<(), StorageError>;

    /// Load the previously persisted record, if any.
    fn load(&self) -> Result<Option<PersistedSession>, StorageError>;

    /// Remove any persisted record.
    fn clear(&self) -> Result<(), StorageError>;
}

// Shared handles are storages too, so a caller can keep one side to
// inspect what the store committed.
impl<T: SessionStorage + ?Sized> SessionStorage for std::sync::Arc<T> {
    fn save(&self, session: &PersistedSession) -> Result<(), StorageError> {
        (**self).save(session)
    }

    fn load(&self) -> Result<Option<PersistedSession>, StorageError> {
        (**self).load()
    }

    fn clear(&self) -> Result<(), StorageError> {
        (**self).clear()
    }
}

/// Terminal session-loss notifications.
///
/// Emitted by the session store so that navigation layers can subscribe,
/// rather than the request pipeline manipulating navigation directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The user (or client code) ended the session.
    LoggedOut,
    /// The session was cleared after an unrecoverable credential failure.
    Expired,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persisted_record_uses_storage_layout_field_names() {
        let record = PersistedSession {
            access_token: Some("A1".to_string()),
            refresh_token: Some("R1".to_string()),
            tenant_slug: Some("acme".to_string()),
            is_authenticated: true,
        };
        let json = serde_json::to_value(&record).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 4);
        for key in ["accessToken", "refreshToken", "tenantSlug", "isAuthenticated"] {
            assert!(obj.contains_key(key), "missing key {key}");
        }
    }

    #[test]
    fn persisted_record_round_trips() {
        let record = PersistedSession {
            access_token: None,
            refresh_token: None,
            tenant_slug: None,
            is_authenticated: false,
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: PersistedSession = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }
}
