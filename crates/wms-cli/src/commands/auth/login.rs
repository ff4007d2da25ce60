//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use wms_core::{Credentials, TenantSlug};

use crate::output;

use super::build_client;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Username to authenticate with
    #[arg(long)]
    pub username: String,

    /// Account password
    #[arg(long)]
    pub password: String,

    /// Tenant slug identifying the organization
    #[arg(long)]
    pub tenant: Option<String>,

    /// API base URL
    #[arg(long, default_value = "http://localhost:8000")]
    pub api_url: String,
}

pub async fn run(args: LoginArgs) -> Result<()> {
    let api = build_client(&args.api_url)?;

    let mut credentials = Credentials::new(&args.username, &args.password);
    if let Some(tenant) = &args.tenant {
        let tenant = TenantSlug::new(tenant).context("Invalid tenant slug")?;
        credentials = credentials.with_tenant(tenant);
    }

    eprintln!("{}", "Logging in...".dimmed());

    let identity = api.login(&credentials).await.context("Failed to login")?;

    output::success("Logged in successfully");
    println!();
    output::field("User", identity.preferred_name());
    output::field("Email", &identity.email);
    if let Some(tenant) = api.store().tenant() {
        output::field("Tenant", tenant.as_str());
    }
    let roles: Vec<&str> = identity.roles.iter().map(|r| r.code.as_str()).collect();
    output::field("Roles", &roles.join(", "));

    Ok(())
}
