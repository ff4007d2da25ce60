//! Login credentials type.

use std::fmt;

use crate::types::TenantSlug;

/// Login credentials for backend authentication.
///
/// This type holds the username, password, and optional tenant slug
/// required to authenticate against one tenant's data partition.
///
/// # Security
///
/// The password is never exposed in Debug output to prevent accidental
/// logging.
///
/// # Example
///
/// ```
/// use wms_core::{Credentials, TenantSlug};
///
/// let tenant = TenantSlug::new("acme").unwrap();
/// let creds = Credentials::new("alice", "app-password-here").with_tenant(tenant);
/// assert_eq!(creds.username(), "alice");
/// ```
pub struct Credentials {
    username: String,
    password: String,
    tenant: Option<TenantSlug>,
}

impl Credentials {
    /// Create new credentials without a tenant selector.
    ///
    /// The tenant may be resolved server-side from a subdomain; API
    /// clients normally attach one via [`Credentials::with_tenant`].
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            tenant: None,
        }
    }

    /// Attach a tenant selector to these credentials.
    pub fn with_tenant(mut self, tenant: TenantSlug) -> Self {
        self.tenant = Some(tenant);
        self
    }

    /// Returns the username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password.
    ///
    /// # Security
    ///
    /// Use this only when constructing authentication requests.
    /// Never log or display this value.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Returns the tenant selector, if any.
    pub fn tenant(&self) -> Option<&TenantSlug> {
        self.tenant.as_ref()
    }
}

// Intentionally hide password in Debug output
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("tenant", &self.tenant)
            .finish()
    }
}

// Clone is intentionally derived to allow credentials to be reused,
// but the type is not Copy to make credential passing explicit.
impl Clone for Credentials {
    fn clone(&self) -> Self {
        Self {
            username: self.username.clone(),
            password: self.password.clone(),
            tenant: self.tenant.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_hides_password_in_debug() {
        let creds = Credentials::new("alice", "secret123");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("alice"));
        assert!(!debug.contains("secret123"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn tenant_is_carried_through() {
        let tenant = TenantSlug::new("acme").unwrap();
        let creds = Credentials::new("alice", "pw").with_tenant(tenant);
        assert_eq!(creds.tenant().unwrap().as_str(), "acme");
    }
}
