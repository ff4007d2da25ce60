//! wms-client - Session lifecycle and authenticated-request pipeline.
//!
//! This library provides the client-side auth core for the wms backend:
//! a durable [`SessionStore`], an [`ApiClient`] request pipeline with
//! transparent credential refresh, and a [`RouteGuard`] for per-view
//! access decisions.
//!
//! # Example
//!
//! ```no_run
//! use wms_client::{ApiClient, MemoryStorage, RouteGuard, SessionStore, ViewClass};
//! use wms_core::{ApiUrl, Credentials, TenantSlug};
//!
//! # async fn example() -> Result<(), wms_core::Error> {
//! let store = SessionStore::new(MemoryStorage::new());
//! let api = ApiClient::new(ApiUrl::new("https://wms.acme.example")?, store.clone());
//!
//! let creds = Credentials::new("alice", "app-password")
//!     .with_tenant(TenantSlug::new("acme")?);
//! api.login(&creds).await?;
//!
//! let guard = RouteGuard::new(store, api.clone());
//! let outcome = guard.resolve(ViewClass::Protected, Some("/inventory")).await?;
//! println!("navigation outcome: {:?}", outcome);
//! # Ok(())
//! # }
//! ```

pub mod guard;
pub mod http;
pub mod pipeline;
pub mod store;

// Re-export primary types at crate root for convenience
pub use guard::{GuardDecision, GuardOutcome, RouteGuard, ViewClass};
pub use http::TENANT_HEADER;
pub use http::endpoints::{Message, RegistrationOutput, TenantRegistration, TokenResponse};
pub use pipeline::{ApiClient, IdentityProvider};
pub use store::{MemoryStorage, SessionStore};
