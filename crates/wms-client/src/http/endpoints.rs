//! API endpoint definitions and request/response types.

use serde::{Deserialize, Serialize};
use std::fmt;

use wms_core::{TenantSummary, UserIdentity};

// ============================================================================
// Endpoint Paths
// ============================================================================

/// POST auth/login
pub const LOGIN: &str = "auth/login";

/// POST auth/refresh
pub const REFRESH: &str = "auth/refresh";

/// GET auth/me
pub const ME: &str = "auth/me";

/// POST auth/register
pub const REGISTER: &str = "auth/register";

/// POST auth/change-password
pub const CHANGE_PASSWORD: &str = "auth/change-password";

/// POST auth/logout
pub const LOGOUT: &str = "auth/logout";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for login.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_slug: Option<&'a str>,
}

/// Token pair returned by login, refresh, and registration.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Request body for token refresh.
#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Tenant self-registration payload: new organization plus its admin user.
#[derive(Clone, Serialize)]
pub struct TenantRegistration {
    pub tenant_name: String,
    pub tenant_slug: String,
    pub contact_email: String,
    pub admin_email: String,
    pub admin_username: String,
    pub admin_password: String,
    pub admin_first_name: String,
    pub admin_last_name: String,
}

// Intentionally hide the admin password in Debug output
impl fmt::Debug for TenantRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenantRegistration")
            .field("tenant_name", &self.tenant_name)
            .field("tenant_slug", &self.tenant_slug)
            .field("contact_email", &self.contact_email)
            .field("admin_email", &self.admin_email)
            .field("admin_username", &self.admin_username)
            .field("admin_password", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// Response from registration: the created tenant, its admin user, and a
/// fresh token pair.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationOutput {
    pub tenant: TenantSummary,
    pub user: UserIdentity,
    pub tokens: TokenResponse,
}

/// Request body for changing the current user's password.
#[derive(Serialize)]
pub struct ChangePasswordRequest<'a> {
    pub current_password: &'a str,
    pub new_password: &'a str,
}

impl fmt::Debug for ChangePasswordRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangePasswordRequest")
            .field("current_password", &"[REDACTED]")
            .field("new_password", &"[REDACTED]")
            .finish()
    }
}

/// Generic message response.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message: String,
}

/// Backend error body: a plain detail message or a list of field-level
/// validation failures.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub detail: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Text(String),
    Fields(Vec<FieldDetail>),
}

/// One entry of a validation-error detail list.
#[derive(Debug, Deserialize)]
pub struct FieldDetail {
    #[serde(default)]
    pub loc: Vec<serde_json::Value>,
    pub msg: String,
}

impl FieldDetail {
    /// The offending field name: the last string segment of `loc`,
    /// skipping the `body`/`query` location prefix.
    pub fn field_name(&self) -> String {
        self.loc
            .iter()
            .filter_map(|v| v.as_str())
            .filter(|s| *s != "body" && *s != "query")
            .next_back()
            .unwrap_or("request")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_detail_parses_plain_text() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"detail": "Invalid credentials or tenant"}"#).unwrap();
        match body.detail {
            Some(ErrorDetail::Text(msg)) => assert_eq!(msg, "Invalid credentials or tenant"),
            other => panic!("unexpected detail: {:?}", other),
        }
    }

    #[test]
    fn error_detail_parses_field_list() {
        let body: ApiErrorBody = serde_json::from_str(
            r#"{"detail": [{"loc": ["body", "admin_password"], "msg": "Password must contain at least one digit", "type": "value_error"}]}"#,
        )
        .unwrap();
        match body.detail {
            Some(ErrorDetail::Fields(fields)) => {
                assert_eq!(fields.len(), 1);
                assert_eq!(fields[0].field_name(), "admin_password");
            }
            other => panic!("unexpected detail: {:?}", other),
        }
    }

    #[test]
    fn registration_debug_redacts_password() {
        let registration = TenantRegistration {
            tenant_name: "Acme".to_string(),
            tenant_slug: "acme".to_string(),
            contact_email: "ops@acme.test".to_string(),
            admin_email: "alice@acme.test".to_string(),
            admin_username: "alice".to_string(),
            admin_password: "Sup3rSecret".to_string(),
            admin_first_name: "Alice".to_string(),
            admin_last_name: "Smith".to_string(),
        };
        let debug = format!("{:?}", registration);
        assert!(!debug.contains("Sup3rSecret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
