//! wms-core - Core types and contracts for the wms client toolkit.

pub mod credentials;
pub mod error;
pub mod identity;
pub mod session;
pub mod tokens;
pub mod types;

pub use credentials::Credentials;
pub use error::Error;
pub use identity::{ADMIN_ROLE, RoleBrief, TenantSummary, UserIdentity};
pub use session::{PersistedSession, SessionEvent, SessionStorage};
pub use tokens::{AccessToken, RefreshToken};
pub use types::{ApiUrl, TenantSlug};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
