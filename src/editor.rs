//! Form state for creating and editing a prompt.

use crate::error::{Error, Result};
use crate::store::RemoteStore;
use crate::sync::{DeleteOutcome, PromptSync, UpdateOutcome, validate_input};
use crate::types::{Prompt, PromptInput, PromptRecord, Provider};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    Idle,
    Saving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteState {
    Idle,
    Confirming,
}

/// Result of a successful submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Saved {
    Created(PromptRecord),
    Updated(PromptRecord),
    /// The record disappeared before the edit landed.
    Missing,
}

#[derive(Debug, Clone)]
pub struct PromptEditor {
    mode: EditorMode,
    pub draft: PromptInput,
    save: SaveState,
    delete: DeleteState,
}

impl PromptEditor {
    /// Blank draft for the create flow.
    #[must_use]
    pub fn create() -> Self {
        let provider = Provider::default();
        Self {
            mode: EditorMode::Create,
            draft: PromptInput {
                provider,
                model: provider.default_model().to_string(),
                ..Default::default()
            },
            save: SaveState::Idle,
            delete: DeleteState::Idle,
        }
    }

    /// Draft seeded from an existing prompt for the edit flow.
    #[must_use]
    pub fn edit(prompt: &Prompt) -> Self {
        let record = &prompt.record;
        Self {
            mode: EditorMode::Edit {
                id: record.id.clone(),
            },
            draft: PromptInput {
                title: record.title.clone(),
                description: record.description.clone(),
                tags: record.tags.clone(),
                provider: record.provider,
                model: record.model.clone(),
                content: prompt.content.clone().unwrap_or_default(),
            },
            save: SaveState::Idle,
            delete: DeleteState::Idle,
        }
    }

    #[must_use]
    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    #[must_use]
    pub fn save_state(&self) -> SaveState {
        self.save
    }

    #[must_use]
    pub fn delete_state(&self) -> DeleteState {
        self.delete
    }

    /// Switches provider. Create mode always picks the provider's first
    /// model; edit mode keeps the current model if the new provider lists it.
    pub fn set_provider(&mut self, provider: Provider) {
        self.draft.provider = provider;
        let keep = matches!(self.mode, EditorMode::Edit { .. }) && provider.supports(&self.draft.model);
        if !keep {
            self.draft.model = provider.default_model().to_string();
        }
    }

    /// Models the picker should offer for the current provider.
    #[must_use]
    pub fn model_choices(&self) -> &'static [&'static str] {
        self.draft.provider.models()
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.save == SaveState::Idle && validate_input(&self.draft).is_ok()
    }

    /// Marks a write as in flight and hands out the input to persist.
    pub fn begin_submit(&mut self) -> Result<PromptInput> {
        if self.save == SaveState::Saving {
            return Err(Error::Busy);
        }
        validate_input(&self.draft)?;
        self.save = SaveState::Saving;
        Ok(self.draft.clone())
    }

    pub fn finish_submit(&mut self) {
        self.save = SaveState::Idle;
    }

    /// Persists the draft. A successful create switches the editor to edit
    /// mode for the new record.
    pub async fn submit<S: RemoteStore>(&mut self, sync: &PromptSync<S>) -> Result<Saved> {
        let input = self.begin_submit()?;
        let result = match &self.mode {
            EditorMode::Create => sync.create(&input).await.map(Saved::Created),
            EditorMode::Edit { id } => sync.update(id, &input).await.map(|outcome| match outcome {
                UpdateOutcome::Updated(record) => Saved::Updated(record),
                UpdateOutcome::NotFound => Saved::Missing,
            }),
        };
        self.finish_submit();

        if let Ok(Saved::Created(record)) = &result {
            self.mode = EditorMode::Edit {
                id: record.id.clone(),
            };
        }
        result
    }

    /// First phase of delete; only meaningful for an existing record.
    pub fn request_delete(&mut self) -> Result<()> {
        if self.mode == EditorMode::Create {
            return Err(Error::BadRequest(
                "Nothing to delete: this prompt has not been saved".to_string(),
            ));
        }
        self.delete = DeleteState::Confirming;
        Ok(())
    }

    pub fn cancel_delete(&mut self) {
        self.delete = DeleteState::Idle;
    }

    /// Second phase of delete. Fails with [`Error::NotConfirmed`] unless
    /// [`request_delete`](Self::request_delete) came first.
    pub async fn confirm_delete<S: RemoteStore>(
        &mut self,
        sync: &PromptSync<S>,
    ) -> Result<DeleteOutcome> {
        let EditorMode::Edit { id } = &self.mode else {
            return Err(Error::NotConfirmed);
        };
        let id = id.clone();
        if self.delete != DeleteState::Confirming {
            return Err(Error::NotConfirmed);
        }
        if self.save == SaveState::Saving {
            return Err(Error::Busy);
        }

        self.save = SaveState::Saving;
        let result = sync.delete(&id).await;
        self.save = SaveState::Idle;
        self.delete = DeleteState::Idle;
        result
    }
}
