//! Auth subcommand implementations.

mod change_password;
mod login;
mod logout;
mod refresh;
mod register;
mod whoami;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use wms_client::{ApiClient, SessionStore};
use wms_core::ApiUrl;

use crate::storage::FileStorage;

#[derive(Args, Debug)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthSubcommand {
    /// Create a new session (login)
    Login(login::LoginArgs),

    /// End the active session
    Logout(logout::LogoutArgs),

    /// Display the active session's user
    Whoami(whoami::WhoamiArgs),

    /// Refresh the session tokens
    Refresh(refresh::RefreshArgs),

    /// Register a new tenant with its admin user
    Register(register::RegisterArgs),

    /// Change the current user's password
    ChangePassword(change_password::ChangePasswordArgs),
}

pub async fn handle(cmd: AuthCommand) -> Result<()> {
    match cmd.command {
        AuthSubcommand::Login(args) => login::run(args).await,
        AuthSubcommand::Logout(args) => logout::run(args).await,
        AuthSubcommand::Whoami(args) => whoami::run(args).await,
        AuthSubcommand::Refresh(args) => refresh::run(args).await,
        AuthSubcommand::Register(args) => register::run(args).await,
        AuthSubcommand::ChangePassword(args) => change_password::run(args).await,
    }
}

/// Build a client over the file-backed session, rehydrating any session
/// persisted by an earlier invocation.
pub(crate) fn build_client(api_url: &str) -> Result<ApiClient> {
    let base = ApiUrl::new(api_url).context("Invalid API URL")?;
    let storage = FileStorage::open_default().context("Failed to open session storage")?;
    tracing::debug!(path = %storage.path().display(), "Using session storage");
    let store = SessionStore::open(storage).context("Failed to load session")?;
    Ok(ApiClient::new(base, store))
}
