//! CRUD operations for notes on top of a [`NoteContext`].

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::entity::Note;
use crate::error::{NotekeeperError, Result};
use crate::storage::NoteContext;

/// Note repository scoped to one persistence context.
pub struct NoteRepository {
    context: NoteContext,
    cancel: CancellationToken,
}

impl NoteRepository {
    pub fn new(context: NoteContext, cancel: CancellationToken) -> Self {
        Self { context, cancel }
    }

    pub fn list(&self) -> Result<Vec<Note>> {
        self.context.all()
    }

    pub fn get(&mut self, id: Uuid) -> Result<Option<Note>> {
        self.context.find(id)
    }

    /// Create and persist a note. The returned note carries its creation time.
    pub fn create(&mut self, message: impl Into<String>) -> Result<Note> {
        let note = Note::new(message)?;
        let id = note.id();
        self.context.add(note)?;
        self.context.save_changes(&self.cancel)?;

        let saved = self.saved(id)?;
        tracing::info!(id = %id, "created note");
        Ok(saved)
    }

    /// Replace a note's message. Returns `None` if the note does not exist.
    pub fn update(&mut self, id: Uuid, message: impl Into<String>) -> Result<Option<Note>> {
        let Some(mut note) = self.context.find(id)? else {
            return Ok(None);
        };
        note.set_message(message)?;
        self.context.update(note);
        self.context.save_changes(&self.cancel)?;

        let saved = self.saved(id)?;
        tracing::info!(id = %id, "updated note");
        Ok(Some(saved))
    }

    /// Delete a note. Returns `false` if the note does not exist.
    pub fn delete(&mut self, id: Uuid) -> Result<bool> {
        if !self.context.remove(id)? {
            return Ok(false);
        }
        self.context.save_changes(&self.cancel)?;

        tracing::info!(id = %id, "deleted note");
        Ok(true)
    }

    fn saved(&self, id: Uuid) -> Result<Note> {
        self.context
            .tracked(id)
            .cloned()
            .ok_or(NotekeeperError::NotFound(id))
    }
}
