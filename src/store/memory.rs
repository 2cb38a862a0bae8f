use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use sha2::{Digest, Sha256};
use tracing::debug;

use super::path::normalize_path;
use super::{RemoteFile, RemoteStore, RepoHost, RepoStatus};
use crate::error::{Error, Result};
use crate::types::RevisionToken;

/// Operation recorded by [`MemoryStore`], in the order it was attempted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Read(String),
    Create(String),
    Update(String),
    Delete(String),
}

#[derive(Debug)]
struct StoredFile {
    content: String,
    token: RevisionToken,
}

type Fault = Box<dyn Fn(&StoreOp) -> bool + Send>;

#[derive(Default)]
struct Inner {
    repo_present: bool,
    files: BTreeMap<String, StoredFile>,
    revision: u64,
    log: Vec<StoreOp>,
    faults: Vec<Fault>,
}

impl Inner {
    fn record(&mut self, op: StoreOp) -> Result<()> {
        self.log.push(op.clone());
        if let Some(pos) = self.faults.iter().position(|f| f(&op)) {
            drop(self.faults.remove(pos));
            return Err(Error::Remote {
                status: 500,
                message: format!("injected failure for {op:?}"),
            });
        }
        Ok(())
    }

    fn next_token(&mut self, content: &str) -> RevisionToken {
        self.revision += 1;
        let mut hasher = Sha256::new();
        hasher.update(self.revision.to_be_bytes());
        hasher.update(content.as_bytes());
        RevisionToken::new(hex::encode(hasher.finalize()))
    }
}

/// In-process store with the same conditional-write rules as the code host.
///
/// Mostly useful for exercising the sync protocol without a network: every
/// call is logged and any single call can be made to fail.
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                repo_present: true,
                ..Default::default()
            }),
        }
    }

    /// A store whose repository has not been created yet.
    #[must_use]
    pub fn without_repo() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes the next operation equal to `op` fail with a remote error.
    pub fn fail_next(&self, op: StoreOp) {
        self.fail_when(move |candidate| *candidate == op);
    }

    /// Makes the next operation matching `predicate` fail with a remote error.
    pub fn fail_when(&self, predicate: impl Fn(&StoreOp) -> bool + Send + 'static) {
        self.lock().faults.push(Box::new(predicate));
    }

    /// Writes a file directly, bypassing the token check and the log.
    pub fn seed(&self, path: &str, content: &str) -> Result<RevisionToken> {
        let path = normalize_path(path)?;
        let mut inner = self.lock();
        let token = inner.next_token(content);
        inner.files.insert(
            path,
            StoredFile {
                content: content.to_string(),
                token: token.clone(),
            },
        );
        Ok(token)
    }

    #[must_use]
    pub fn content(&self, path: &str) -> Option<String> {
        let path = normalize_path(path).ok()?;
        self.lock().files.get(&path).map(|f| f.content.clone())
    }

    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.lock().files.keys().cloned().collect()
    }

    #[must_use]
    pub fn log(&self) -> Vec<StoreOp> {
        self.lock().log.clone()
    }

    pub fn clear_log(&self) {
        self.lock().log.clear();
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteStore for MemoryStore {
    async fn read_with_token(&self, path: &str) -> Result<Option<RemoteFile>> {
        let path = normalize_path(path)?;
        let mut inner = self.lock();
        inner.record(StoreOp::Read(path.clone()))?;
        Ok(inner.files.get(&path).map(|f| RemoteFile {
            path: path.clone(),
            content: f.content.clone(),
            token: f.token.clone(),
        }))
    }

    async fn write_if_token(
        &self,
        path: &str,
        content: &str,
        message: &str,
        token: Option<&RevisionToken>,
    ) -> Result<RevisionToken> {
        let path = normalize_path(path)?;
        let mut inner = self.lock();
        let op = if token.is_some() {
            StoreOp::Update(path.clone())
        } else {
            StoreOp::Create(path.clone())
        };
        inner.record(op)?;

        match (inner.files.get(&path), token) {
            (Some(_), None) => {
                return Err(Error::Conflict(format!(
                    "{path} already exists; a revision token is required to update it"
                )));
            }
            (Some(existing), Some(expected)) if existing.token != *expected => {
                return Err(Error::Conflict(format!(
                    "{path} is at {} but expected {expected}",
                    existing.token
                )));
            }
            (None, Some(_)) => return Err(Error::NotFound),
            _ => {}
        }

        let new_token = inner.next_token(content);
        inner.files.insert(
            path.clone(),
            StoredFile {
                content: content.to_string(),
                token: new_token.clone(),
            },
        );
        debug!(path = %path, message, "memory store write");
        Ok(new_token)
    }

    async fn delete_if_token(&self, path: &str, message: &str, token: &RevisionToken) -> Result<()> {
        let path = normalize_path(path)?;
        let mut inner = self.lock();
        inner.record(StoreOp::Delete(path.clone()))?;

        let current = inner.files.get(&path).ok_or(Error::NotFound)?;
        if current.token != *token {
            return Err(Error::Conflict(format!(
                "{path} is at {} but expected {token}",
                current.token
            )));
        }
        inner.files.remove(&path);
        debug!(path = %path, message, "memory store delete");
        Ok(())
    }
}

impl RepoHost for MemoryStore {
    async fn repo_status(&self) -> Result<RepoStatus> {
        Ok(if self.lock().repo_present {
            RepoStatus::Present
        } else {
            RepoStatus::Missing
        })
    }

    async fn create_repo(&self) -> Result<()> {
        let mut inner = self.lock();
        if inner.repo_present {
            return Err(Error::Remote {
                status: 422,
                message: "name already exists on this account".to_string(),
            });
        }
        inner.repo_present = true;
        Ok(())
    }
}
