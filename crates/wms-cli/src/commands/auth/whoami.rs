//! Whoami command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;

use wms_client::{GuardOutcome, RouteGuard, ViewClass};

use crate::output;

use super::build_client;

#[derive(Args, Debug)]
pub struct WhoamiArgs {
    /// Print the full profile as JSON
    #[arg(long)]
    pub json: bool,

    /// API base URL
    #[arg(long, default_value = "http://localhost:8000")]
    pub api_url: String,
}

pub async fn run(args: WhoamiArgs) -> Result<()> {
    let api = build_client(&args.api_url)?;
    let store = api.store().clone();

    // Resolve exactly as a protected view would: a rehydrated session has
    // credentials but no identity, so the guard fetches the profile.
    let guard = RouteGuard::new(store.clone(), api);
    let outcome = guard
        .resolve(ViewClass::Protected, Some("/whoami"))
        .await
        .context("Failed to resolve session")?;

    match outcome {
        GuardOutcome::Rendered => {}
        GuardOutcome::RedirectedToLogin { .. } | GuardOutcome::RedirectedHome => {
            bail!("No active session. Run 'wms auth login' first.");
        }
    }

    let identity = store
        .identity()
        .context("Session resolved without an identity")?;

    if args.json {
        return output::json_pretty(&identity);
    }

    output::field("User", identity.preferred_name());
    output::field("Username", &identity.username);
    output::field("Email", &identity.email);
    if let Some(tenant) = store.tenant() {
        output::field("Tenant", tenant.as_str());
    }
    let roles: Vec<&str> = identity.roles.iter().map(|r| r.code.as_str()).collect();
    output::field("Roles", &roles.join(", "));

    Ok(())
}
