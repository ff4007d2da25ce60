//! Change password command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::output;

use super::build_client;

#[derive(Args, Debug)]
pub struct ChangePasswordArgs {
    /// Current password
    #[arg(long)]
    pub current: String,

    /// New password
    #[arg(long)]
    pub new: String,

    /// API base URL
    #[arg(long, default_value = "http://localhost:8000")]
    pub api_url: String,
}

pub async fn run(args: ChangePasswordArgs) -> Result<()> {
    let api = build_client(&args.api_url)?;

    eprintln!("{}", "Changing password...".dimmed());

    let message = api
        .change_password(&args.current, &args.new)
        .await
        .context("Failed to change password")?;

    output::success(&message.message);
    Ok(())
}
