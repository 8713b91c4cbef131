//! Session handlers: login, logout and whoami.

use secrecy::{ExposeSecret, SecretString};

use billdeck_core::{User, Workspace};

use crate::cli::{GlobalOpts, LoginArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

fn detail(u: &User) -> String {
    [
        format!("Username:  {}", u.username),
        format!("Name:      {}", util::or_dash(u.full_name.as_deref())),
        format!("Email:     {}", util::or_dash(u.email.as_deref())),
        format!("ID:        {}", u.id),
    ]
    .join("\n")
}

pub async fn whoami(ws: &Workspace, global: &GlobalOpts) -> Result<(), CliError> {
    let user = ws.current_user().await?;
    let out = output::render_single(&global.output, &user, detail, |u| u.username.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn prompt_username() -> Result<String, CliError> {
    if !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        return Err(CliError::validation("username", "pass --username when not on a terminal"));
    }
    dialoguer::Input::<String>::new()
        .with_prompt("Username")
        .interact_text()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

/// Exchange a username and password for a token, then keep it in the keyring.
pub async fn login(args: LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (server, profile_name) = config::build_server_config(global)?;
    let cfg = config::load_config_or_default();
    let profile_username = cfg.profiles.get(&profile_name).and_then(|p| p.username.clone());

    let username = match args.username.or(profile_username) {
        Some(name) => name,
        None => prompt_username()?,
    };
    let password = rpassword::prompt_password(format!("Password for {username}: "))?;
    if password.is_empty() {
        return Err(CliError::validation("password", "cannot be empty"));
    }

    let progress = util::spinner("Logging in", global.quiet);
    let result = Workspace::login(&server, &username, &SecretString::from(password)).await;
    progress.finish_and_clear();
    let outcome = result.map_err(|e| CliError::from(e).for_profile(&profile_name))?;

    if args.print_token {
        println!("{}", outcome.token.expose_secret());
        return Ok(());
    }

    config::store_token(&profile_name, &outcome.token)?;
    let who = outcome
        .user
        .as_ref()
        .and_then(|u| u.full_name.clone())
        .unwrap_or(username);
    output::notice(
        &format!("✓ Logged in as {who}; token stored for profile '{profile_name}'"),
        global.quiet,
    );
    Ok(())
}

pub fn logout(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load_config_or_default();
    let profile_name = config::active_profile_name(global, &cfg);
    let message = if config::forget_token(&profile_name)? {
        format!("✓ Token removed for profile '{profile_name}'")
    } else {
        format!("No stored token for profile '{profile_name}'")
    };
    output::notice(&message, global.quiet);
    Ok(())
}
