//! Logout command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::output;

use super::build_client;

#[derive(Args, Debug)]
pub struct LogoutArgs {
    /// API base URL
    #[arg(long, default_value = "http://localhost:8000")]
    pub api_url: String,
}

pub async fn run(args: LogoutArgs) -> Result<()> {
    let api = build_client(&args.api_url)?;

    if !api.store().is_authenticated() {
        output::field("Session", "none active");
        return Ok(());
    }

    api.logout().await.context("Failed to clear session")?;

    output::success("Logged out");
    Ok(())
}
