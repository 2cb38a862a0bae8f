//! Keeps `metadata.json` and the per-prompt content files in step.
//!
//! Every mutation reads the index fresh, writes the index with the token it
//! just read, then touches the content file. There is no multi-file
//! transaction: a failure after the index write leaves the pair out of step
//! until the next successful mutation of that record.

pub mod filename;
pub mod index;

use chrono::Utc;
use futures::future::join_all;
use tracing::{info, warn};
use uuid::Uuid;

pub use filename::{derive_filename, slugify};
pub use index::{IndexSnapshot, parse_index, read_index, serialize_index, write_index};

use crate::error::{Error, Result};
use crate::store::RemoteStore;
use crate::types::{Prompt, PromptInput, PromptRecord, content_path};

const INDEX_MESSAGE: &str = "Update metadata";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated(PromptRecord),
    /// No record with that id; nothing was written.
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(PromptRecord),
    /// No record with that id; nothing was written.
    Absent,
}

/// Required-field checks shared by create and update.
pub fn validate_input(input: &PromptInput) -> Result<()> {
    if input.title.trim().is_empty() {
        return Err(Error::BadRequest("Title is required".to_string()));
    }
    if input.model.trim().is_empty() {
        return Err(Error::BadRequest("Model is required".to_string()));
    }
    if input.content.trim().is_empty() {
        return Err(Error::BadRequest("Prompt content is required".to_string()));
    }
    Ok(())
}

pub struct PromptSync<S> {
    store: S,
}

impl<S: RemoteStore> PromptSync<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn read_index(&self) -> Result<IndexSnapshot> {
        read_index(&self.store).await
    }

    /// Reads every record with its body. A body that cannot be read leaves
    /// that prompt with `content: None` instead of failing the listing.
    pub async fn fetch_all(&self) -> Result<Vec<Prompt>> {
        let snapshot = self.read_index().await?;
        let bodies = join_all(snapshot.index.prompts.iter().map(|r| self.read_body(r))).await;

        Ok(snapshot
            .index
            .prompts
            .into_iter()
            .zip(bodies)
            .map(|(record, content)| Prompt { record, content })
            .collect())
    }

    pub async fn get(&self, id: &str) -> Result<Option<Prompt>> {
        let snapshot = self.read_index().await?;
        let Some(record) = snapshot.index.find(id).cloned() else {
            return Ok(None);
        };
        let content = self.read_body(&record).await;
        Ok(Some(Prompt { record, content }))
    }

    async fn read_body(&self, record: &PromptRecord) -> Option<String> {
        let path = content_path(&record.filename);
        match self.store.read_with_token(&path).await {
            Ok(Some(file)) => Some(file.content),
            Ok(None) => {
                warn!(id = %record.id, path = %path, "content file missing");
                None
            }
            Err(e) => {
                warn!(id = %record.id, path = %path, error = %e, "failed to read content file");
                None
            }
        }
    }

    pub async fn create(&self, input: &PromptInput) -> Result<PromptRecord> {
        validate_input(input)?;
        let snapshot = self.read_index().await?;
        self.create_from(snapshot, input).await
    }

    /// Create against a snapshot the caller already holds.
    pub async fn create_from(
        &self,
        snapshot: IndexSnapshot,
        input: &PromptInput,
    ) -> Result<PromptRecord> {
        validate_input(input)?;
        let IndexSnapshot { mut index, token } = snapshot;

        let now = Utc::now();
        let title = input.title.trim().to_string();
        let filename = derive_filename(&title, &index.prompts, None, now);
        let record = PromptRecord {
            id: Uuid::now_v7().to_string(),
            title,
            description: input.description.trim().to_string(),
            tags: input.normalized_tags(),
            provider: input.provider,
            model: input.model.trim().to_string(),
            filename,
            created_at: now,
            updated_at: now,
        };
        index.prompts.push(record.clone());

        write_index(&self.store, &index, token.as_ref(), INDEX_MESSAGE).await?;

        let path = content_path(&record.filename);
        let message = format!("Add prompt: {}", record.title);
        if let Err(e) = self
            .store
            .write_if_token(&path, &input.content, &message, None)
            .await
        {
            warn!(id = %record.id, path = %path, "index lists a prompt whose content was not written");
            return Err(e);
        }

        info!(id = %record.id, filename = %record.filename, "created prompt");
        Ok(record)
    }

    pub async fn update(&self, id: &str, input: &PromptInput) -> Result<UpdateOutcome> {
        validate_input(input)?;
        let snapshot = self.read_index().await?;
        self.update_from(snapshot, id, input).await
    }

    /// Update against a snapshot the caller already holds. A changed title
    /// moves the body to a freshly derived file name.
    pub async fn update_from(
        &self,
        snapshot: IndexSnapshot,
        id: &str,
        input: &PromptInput,
    ) -> Result<UpdateOutcome> {
        validate_input(input)?;
        let IndexSnapshot { mut index, token } = snapshot;

        let Some(pos) = index.position(id) else {
            info!(id, "nothing to update");
            return Ok(UpdateOutcome::NotFound);
        };
        let existing = index.prompts[pos].clone();

        let now = Utc::now();
        let title = input.title.trim().to_string();
        let message = format!("Update prompt: {title}");
        let renamed = title != existing.title;

        let filename = if renamed {
            let filename = derive_filename(&title, &index.prompts, Some(id), now);
            let old_path = content_path(&existing.filename);
            match self.store.read_with_token(&old_path).await? {
                Some(old) => {
                    self.store
                        .delete_if_token(&old_path, &message, &old.token)
                        .await?;
                }
                None => warn!(id, path = %old_path, "old content file already gone"),
            }
            filename
        } else {
            existing.filename.clone()
        };

        let record = PromptRecord {
            id: existing.id,
            title,
            description: input.description.trim().to_string(),
            tags: input.normalized_tags(),
            provider: input.provider,
            model: input.model.trim().to_string(),
            filename,
            created_at: existing.created_at,
            updated_at: now.max(existing.updated_at),
        };
        index.prompts[pos] = record.clone();

        write_index(&self.store, &index, token.as_ref(), INDEX_MESSAGE).await?;

        let path = content_path(&record.filename);
        let content_token = if renamed {
            None
        } else {
            match self.store.read_with_token(&path).await? {
                Some(file) => Some(file.token),
                None => {
                    warn!(id, path = %path, "content file missing, recreating it");
                    None
                }
            }
        };
        self.store
            .write_if_token(&path, &input.content, &message, content_token.as_ref())
            .await?;

        info!(id, filename = %record.filename, renamed, "updated prompt");
        Ok(UpdateOutcome::Updated(record))
    }

    pub async fn delete(&self, id: &str) -> Result<DeleteOutcome> {
        let snapshot = self.read_index().await?;
        self.delete_from(snapshot, id).await
    }

    /// Delete against a snapshot the caller already holds.
    pub async fn delete_from(&self, snapshot: IndexSnapshot, id: &str) -> Result<DeleteOutcome> {
        let IndexSnapshot { mut index, token } = snapshot;

        let Some(pos) = index.position(id) else {
            info!(id, "nothing to delete");
            return Ok(DeleteOutcome::Absent);
        };
        let removed = index.prompts.remove(pos);

        write_index(&self.store, &index, token.as_ref(), INDEX_MESSAGE).await?;

        let path = content_path(&removed.filename);
        let message = format!("Delete prompt: {}", removed.title);
        match self.store.read_with_token(&path).await? {
            Some(file) => {
                self.store
                    .delete_if_token(&path, &message, &file.token)
                    .await?;
            }
            None => warn!(id, path = %path, "content file already gone"),
        }

        info!(id, "deleted prompt");
        Ok(DeleteOutcome::Deleted(removed))
    }
}
