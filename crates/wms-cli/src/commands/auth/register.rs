//! Register command implementation.
//!
//! Registers a new tenant organization together with its admin user and
//! signs in as that user.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use wms_client::TenantRegistration;
use wms_core::TenantSlug;

use crate::output;

use super::build_client;

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Organization display name
    #[arg(long)]
    pub tenant_name: String,

    /// Organization slug (lowercase letters, digits, hyphens)
    #[arg(long)]
    pub tenant_slug: String,

    /// Organization contact email
    #[arg(long)]
    pub contact_email: String,

    /// Admin user email
    #[arg(long)]
    pub admin_email: String,

    /// Admin username
    #[arg(long)]
    pub admin_username: String,

    /// Admin password
    #[arg(long)]
    pub admin_password: String,

    /// Admin first name
    #[arg(long)]
    pub first_name: String,

    /// Admin last name
    #[arg(long)]
    pub last_name: String,

    /// API base URL
    #[arg(long, default_value = "http://localhost:8000")]
    pub api_url: String,
}

pub async fn run(args: RegisterArgs) -> Result<()> {
    // Validate the slug locally before any network traffic.
    TenantSlug::new(&args.tenant_slug).context("Invalid tenant slug")?;

    let api = build_client(&args.api_url)?;

    let registration = TenantRegistration {
        tenant_name: args.tenant_name,
        tenant_slug: args.tenant_slug,
        contact_email: args.contact_email,
        admin_email: args.admin_email,
        admin_username: args.admin_username,
        admin_password: args.admin_password,
        admin_first_name: args.first_name,
        admin_last_name: args.last_name,
    };

    eprintln!("{}", "Registering tenant...".dimmed());

    let created = api
        .register(&registration)
        .await
        .context("Failed to register tenant")?;

    output::success("Tenant registered successfully");
    println!();
    output::field("Tenant", &created.tenant.name);
    output::field("Slug", &created.tenant.slug);
    output::field("Admin", &created.user.username);

    Ok(())
}
