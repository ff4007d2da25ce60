//! Refresh command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::output;

use super::build_client;

#[derive(Args, Debug)]
pub struct RefreshArgs {
    /// API base URL
    #[arg(long, default_value = "http://localhost:8000")]
    pub api_url: String,
}

pub async fn run(args: RefreshArgs) -> Result<()> {
    let api = build_client(&args.api_url)?;

    eprintln!("{}", "Refreshing session...".dimmed());

    api.refresh().await.context("Failed to refresh session")?;

    // The store persists rotated tokens as part of the refresh itself.
    output::success("Session refreshed successfully");
    Ok(())
}
