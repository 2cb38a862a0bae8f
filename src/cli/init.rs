use super::{resolve_session, user_error};
use crate::config::ClientConfig;
use crate::provision::{Provisioned, ensure_repo};
use crate::store::GitHubStore;

pub async fn run_init(config: &ClientConfig) -> anyhow::Result<()> {
    let session = resolve_session(config).await?;
    let store = GitHubStore::new(config, &session)?;

    let outcome = ensure_repo(&store).await.map_err(user_error)?;

    println!();
    match outcome {
        Provisioned::AlreadyPresent => {
            println!("Prompt library {}/{} already exists.", store.owner(), store.repo());
        }
        Provisioned::Created => {
            println!("Created prompt library {}/{}.", store.owner(), store.repo());
        }
    }
    println!();

    Ok(())
}
