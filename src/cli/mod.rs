mod auth;
mod commands;
pub mod credentials;
mod init;
pub mod pickers;
mod prompt;
mod settings;

pub use auth::{run_auth_login, run_auth_logout, run_auth_status};
pub use commands::{AuthCommands, PromptFields, SortArg};
pub use init::run_init;
pub use prompt::{
    ListOptions, run_prompt_add, run_prompt_edit, run_prompt_list, run_prompt_models, run_prompt_rm,
    run_prompt_show,
};
pub use settings::run_config;

use tracing::debug;

use crate::config::ClientConfig;
use crate::error::Error;
use crate::session::Session;
use crate::provision::check_exists;
use crate::store::{GitHubStore, RepoStatus};
use crate::sync::PromptSync;
use credentials::{TOKEN_ENV, config_path, load_credentials};

/// Loads the config file and applies command-line overrides.
pub fn load_config(api_url: Option<String>, repo: Option<String>) -> anyhow::Result<ClientConfig> {
    let config = ClientConfig::load(&config_path()?)?.with_overrides(api_url, repo);
    config.validate()?;
    Ok(config)
}

/// Session from `PROMPTSHELF_TOKEN` when set, else from the credentials file.
pub async fn resolve_session(config: &ClientConfig) -> anyhow::Result<Session> {
    if let Ok(token) = std::env::var(TOKEN_ENV) {
        let token = token.trim().to_string();
        if !token.is_empty() {
            let username = GitHubStore::whoami(config, &token)
                .await
                .map_err(user_error)?;
            return Ok(Session::new(username, token));
        }
    }
    Ok(load_credentials()?.into())
}

/// Opens the library, refusing to go on when the repository is missing so that
/// an unprovisioned account is not mistaken for an empty library.
pub async fn connect(config: &ClientConfig) -> anyhow::Result<PromptSync<GitHubStore>> {
    let session = resolve_session(config).await?;
    let store = GitHubStore::new(config, &session)?;
    if check_exists(&store).await.map_err(user_error)? == RepoStatus::Missing {
        anyhow::bail!(
            "Prompt library {}/{} does not exist. Run 'promptshelf init'.",
            store.owner(),
            store.repo()
        );
    }
    Ok(PromptSync::new(store))
}

/// Turns a library error into the message shown on the terminal.
pub fn user_error(err: Error) -> anyhow::Error {
    debug!(error = %err, "operation failed");
    match err {
        Error::Conflict(msg) => anyhow::anyhow!(
            "{msg}\nThe prompt library changed while this command ran. Run it again."
        ),
        other => anyhow::anyhow!(other.user_message()),
    }
}
