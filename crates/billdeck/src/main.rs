mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use billdeck_core::Workspace;

use crate::cli::{CacheCommand, Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    // Ctrl-C cancels in-flight media fetches and the command itself
    let cancel = CancellationToken::new();
    let signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal.cancel();
        }
    });

    if let Err(err) = run(cli, cancel).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Commands that only touch the local cache and work without a session.
fn works_offline(cmd: &Command) -> bool {
    matches!(
        cmd,
        Command::Cache(args)
            if matches!(args.command, CacheCommand::Status | CacheCommand::Purge | CacheCommand::Clear)
    )
}

async fn run(cli: Cli, cancel: CancellationToken) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a backend connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "billdeck", &mut std::io::stdout());
            Ok(())
        }

        Command::Login(args) => commands::auth::login(args, &cli.global).await,
        Command::Logout => commands::auth::logout(&cli.global),

        cmd => {
            let (server, profile_name) = config::build_server_config(&cli.global)?;
            if server.token.is_none() && !works_offline(&cmd) {
                return Err(CliError::NoToken {
                    profile: profile_name,
                });
            }
            let ws = Workspace::new(server).map_err(|e| CliError::from(e).for_profile(&profile_name))?;

            tracing::debug!(command = ?cmd, profile = %profile_name, "dispatching command");
            tokio::select! {
                result = commands::dispatch(cmd, &ws, &cli.global, &cancel) => {
                    result.map_err(|e| e.for_profile(&profile_name))
                }
                () = cancel.cancelled() => Err(CliError::Interrupted),
            }
        }
    }
}
