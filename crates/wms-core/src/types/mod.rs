//! Core wms types.
//!
//! These types enforce backend format rules at construction time,
//! ensuring invalid states are unrepresentable.

mod api_url;
mod tenant_slug;

pub use api_url::ApiUrl;
pub use tenant_slug::TenantSlug;
