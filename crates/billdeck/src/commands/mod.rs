//! Command dispatch: bridges CLI args -> workspace calls -> output formatting.

pub mod auth;
pub mod bookings;
pub mod cache;
pub mod clients;
pub mod config_cmd;
pub mod dashboard;
pub mod deck;
pub mod reference;
pub mod reports;
pub mod sites;
pub mod util;

use tokio_util::sync::CancellationToken;

use billdeck_core::Workspace;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a workspace-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    ws: &Workspace,
    global: &GlobalOpts,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    match cmd {
        Command::Sites(args) => sites::handle(ws, args, global).await,
        Command::Bookings(args) => bookings::handle(ws, args, global).await,
        Command::Clients(args) => clients::handle(ws, args, global).await,
        Command::Reports(args) => reports::handle(ws, args, global).await,
        Command::Dashboard => dashboard::handle(ws, global).await,
        Command::Deck(args) => deck::handle(ws, args, global, cancel).await,
        Command::Cache(args) => cache::handle(ws, args, global, cancel).await,
        Command::Reference(args) => reference::handle(ws, args, global).await,
        Command::Whoami => auth::whoami(ws, global).await,
        // Handled before a workspace exists
        Command::Login(_) | Command::Logout | Command::Config(_) | Command::Completions(_) => {
            Err(CliError::Internal("command dispatched without a handler".into()))
        }
    }
}
