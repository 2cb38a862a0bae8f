use inquire::Password;

use super::credentials::{Credentials, delete_credentials, load_credentials, save_credentials};
use super::user_error;
use crate::config::ClientConfig;
use crate::store::GitHubStore;

pub async fn run_auth_login(
    config: &ClientConfig,
    token: Option<String>,
    non_interactive: bool,
) -> anyhow::Result<()> {
    let token = if let Some(t) = token {
        t
    } else if non_interactive {
        anyhow::bail!("--token is required in non-interactive mode");
    } else {
        Password::new("GitHub token:")
            .without_confirmation()
            .with_help_message("Needs the 'repo' scope (or contents read/write on one repository)")
            .prompt()?
    };

    let token = token.trim().to_string();
    if token.is_empty() {
        anyhow::bail!("Token cannot be empty");
    }

    let username = GitHubStore::whoami(config, &token)
        .await
        .map_err(user_error)?;

    save_credentials(&Credentials {
        username: username.clone(),
        token,
    })?;

    println!();
    println!("Logged in as {username}");
    println!();

    Ok(())
}

pub fn run_auth_logout() -> anyhow::Result<()> {
    if delete_credentials()? {
        println!();
        println!("Logged out successfully.");
        println!();
    } else {
        println!();
        println!("No credentials found.");
        println!();
    }
    Ok(())
}

pub fn run_auth_status(config: &ClientConfig) -> anyhow::Result<()> {
    match load_credentials() {
        Ok(creds) => {
            println!("Logged in as {}", creds.username);
            println!("Library: {}/{}", creds.username, config.repo_name);
        }
        Err(_) => println!("Not logged in."),
    }
    Ok(())
}
