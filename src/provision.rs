use tracing::info;

use crate::error::Result;
use crate::store::{RepoHost, RepoStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioned {
    AlreadyPresent,
    Created,
}

/// Single existence probe; a missing repository is `Ok(RepoStatus::Missing)`.
pub async fn check_exists<H: RepoHost>(host: &H) -> Result<RepoStatus> {
    host.repo_status().await
}

pub async fn create<H: RepoHost>(host: &H) -> Result<()> {
    host.create_repo().await?;
    info!("created prompts repository");
    Ok(())
}

/// Creates the prompts repository unless it already exists. No retries.
pub async fn ensure_repo<H: RepoHost>(host: &H) -> Result<Provisioned> {
    match check_exists(host).await? {
        RepoStatus::Present => Ok(Provisioned::AlreadyPresent),
        RepoStatus::Missing => {
            create(host).await?;
            Ok(Provisioned::Created)
        }
    }
}
