//! User identity and tenant records.
//!
//! These mirror the backend's profile payloads. The identity record is
//! fetched lazily after authentication and is never persisted; it may be
//! refetched at any time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role code that bypasses all permission checks.
pub const ADMIN_ROLE: &str = "admin";

/// Brief role info attached to a user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleBrief {
    pub id: Uuid,
    pub code: String,
    pub name: String,
}

/// The authenticated user's profile, as returned by `GET /auth/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default)]
    pub roles: Vec<RoleBrief>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserIdentity {
    /// Returns true iff the profile carries a role with the given code.
    pub fn has_role(&self, code: &str) -> bool {
        self.roles.iter().any(|r| r.code == code)
    }

    /// The name to show in UI chrome: display name when set, else full name.
    pub fn preferred_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.full_name)
    }
}

/// Tenant organization summary, as returned by registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantSummary {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_with_roles(codes: &[&str]) -> UserIdentity {
        let now = Utc::now();
        UserIdentity {
            id: Uuid::new_v4(),
            email: "alice@acme.test".to_string(),
            username: "alice".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Smith".to_string(),
            full_name: "Alice Smith".to_string(),
            display_name: None,
            is_active: true,
            is_superuser: false,
            last_login: None,
            roles: codes
                .iter()
                .map(|c| RoleBrief {
                    id: Uuid::new_v4(),
                    code: c.to_string(),
                    name: c.to_string(),
                })
                .collect(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn has_role_matches_codes() {
        let identity = identity_with_roles(&["picker", "supervisor"]);
        assert!(identity.has_role("picker"));
        assert!(!identity.has_role(ADMIN_ROLE));
    }

    #[test]
    fn preferred_name_falls_back_to_full_name() {
        let mut identity = identity_with_roles(&[]);
        assert_eq!(identity.preferred_name(), "Alice Smith");
        identity.display_name = Some("Al".to_string());
        assert_eq!(identity.preferred_name(), "Al");
    }

    #[test]
    fn profile_deserializes_with_optional_fields_missing() {
        let json = serde_json::json!({
            "id": "5f2b0c52-6c7a-4a3e-9a34-5f0e6d9b8a21",
            "email": "bob@acme.test",
            "username": "bob",
            "first_name": "Bob",
            "last_name": "Jones",
            "full_name": "Bob Jones",
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-02T00:00:00Z"
        });
        let identity: UserIdentity = serde_json::from_value(json).unwrap();
        assert!(identity.roles.is_empty());
        assert!(identity.display_name.is_none());
    }
}
