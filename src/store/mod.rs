mod github;
mod memory;
pub mod path;

pub use github::GitHubStore;
pub use memory::{MemoryStore, StoreOp};

use std::future::Future;

use crate::error::Result;
use crate::types::RevisionToken;

/// A file read from the remote store together with the token needed to
/// change it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub path: String,
    pub content: String,
    pub token: RevisionToken,
}

/// RemoteStore defines the versioned file interface of the code host.
///
/// Writes are conditional: updating or deleting an existing file requires
/// the token from the latest read, and a stale token fails with
/// [`crate::error::Error::Conflict`].
pub trait RemoteStore: Send + Sync {
    /// Returns `None` when the file does not exist.
    fn read_with_token(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<Option<RemoteFile>>> + Send;

    /// Creates the file when `token` is `None`, otherwise updates it.
    /// Returns the new revision token.
    fn write_if_token(
        &self,
        path: &str,
        content: &str,
        message: &str,
        token: Option<&RevisionToken>,
    ) -> impl Future<Output = Result<RevisionToken>> + Send;

    fn delete_if_token(
        &self,
        path: &str,
        message: &str,
        token: &RevisionToken,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Outcome of probing for the prompts repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoStatus {
    Missing,
    Present,
}

/// RepoHost covers the repository container itself.
pub trait RepoHost: Send + Sync {
    fn repo_status(&self) -> impl Future<Output = Result<RepoStatus>> + Send;

    /// Creates a public, auto-initialized repository.
    fn create_repo(&self) -> impl Future<Output = Result<()>> + Send;
}
