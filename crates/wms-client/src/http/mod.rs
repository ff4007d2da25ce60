//! HTTP transport layer.
//!
//! This module provides the reqwest-backed client and the backend's
//! endpoint paths and payload types.

mod client;
pub mod endpoints;

pub use client::TENANT_HEADER;
pub(crate) use client::{HttpClient, decode};
