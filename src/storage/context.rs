use chrono::Utc;
use rusqlite::{Connection, TransactionBehavior};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::sqlite_store::{delete_note, insert_note, select_all, select_note, update_note};
use super::stamp_pending;
use crate::entity::{Note, Timestamped};
use crate::error::{NotekeeperError, Result};

/// Change kind of a tracked entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Unchanged,
    Inserted,
    Modified,
    Deleted,
}

#[derive(Debug)]
struct TrackedNote {
    note: Note,
    state: EntryState,
}

/// Unit of work over the notes table.
///
/// A context owns one connection and the set of notes it has loaded or been
/// handed. Changes stay in memory until [`NoteContext::save_changes`], which
/// stamps timestamps and writes everything in a single transaction.
pub struct NoteContext {
    conn: Connection,
    entries: Vec<TrackedNote>,
}

impl NoteContext {
    pub(crate) fn new(conn: Connection) -> Self {
        Self {
            conn,
            entries: Vec::new(),
        }
    }

    /// Track a new note for insertion.
    pub fn add(&mut self, note: Note) -> Result<()> {
        if self.position(note.id()).is_some() {
            return Err(NotekeeperError::validation(
                "id",
                format!("Note {} is already tracked", note.id()),
            ));
        }
        self.entries.push(TrackedNote {
            note,
            state: EntryState::Inserted,
        });
        Ok(())
    }

    /// Find a note by id, loading and tracking it if needed.
    pub fn find(&mut self, id: Uuid) -> Result<Option<Note>> {
        if let Some(pos) = self.position(id) {
            let entry = &self.entries[pos];
            return Ok(match entry.state {
                EntryState::Deleted => None,
                _ => Some(entry.note.clone()),
            });
        }

        let Some(note) = select_note(&self.conn, id)? else {
            return Ok(None);
        };
        self.entries.push(TrackedNote {
            note: note.clone(),
            state: EntryState::Unchanged,
        });
        Ok(Some(note))
    }

    /// All stored notes, oldest first. Pending changes are not included.
    pub fn all(&self) -> Result<Vec<Note>> {
        select_all(&self.conn)
    }

    /// Mark a note as modified.
    ///
    /// A note that is still pending insertion stays pending insertion with
    /// the new content.
    pub fn update(&mut self, note: Note) {
        match self.position(note.id()) {
            Some(pos) => {
                let entry = &mut self.entries[pos];
                if entry.state != EntryState::Inserted {
                    entry.state = EntryState::Modified;
                }
                entry.note = note;
            }
            None => self.entries.push(TrackedNote {
                note,
                state: EntryState::Modified,
            }),
        }
    }

    /// Mark a note for deletion. Returns false if no such note exists.
    pub fn remove(&mut self, id: Uuid) -> Result<bool> {
        if self.find(id)?.is_none() {
            return Ok(false);
        }

        let Some(pos) = self.position(id) else {
            return Ok(false);
        };
        if self.entries[pos].state == EntryState::Inserted {
            self.entries.remove(pos);
        } else {
            self.entries[pos].state = EntryState::Deleted;
        }
        Ok(true)
    }

    pub fn state(&self, id: Uuid) -> Option<EntryState> {
        self.position(id).map(|pos| self.entries[pos].state)
    }

    /// The tracked copy of a note, including any stamped timestamps.
    pub fn tracked(&self, id: Uuid) -> Option<&Note> {
        self.position(id).map(|pos| &self.entries[pos].note)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&Note, EntryState)> {
        self.entries.iter().map(|e| (&e.note, e.state))
    }

    pub fn has_changes(&self) -> bool {
        self.entries
            .iter()
            .any(|e| e.state != EntryState::Unchanged)
    }

    /// Stamp pending notes and commit them.
    ///
    /// One timestamp is taken per call and shared by every note stamped in
    /// it. The token is checked before the transaction starts and before each
    /// statement; a cancelled or failed commit rolls back, leaves tracking
    /// states as they were and keeps the stamped values in memory.
    ///
    /// Returns the number of rows written.
    pub fn save_changes(&mut self, cancel: &CancellationToken) -> Result<usize> {
        let now = Utc::now();
        stamp_pending(
            self.entries
                .iter_mut()
                .map(|e| (e.state, &mut e.note as &mut dyn Timestamped)),
            now,
        );

        if cancel.is_cancelled() {
            return Err(NotekeeperError::Cancelled);
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut written = 0;
        for entry in &self.entries {
            if cancel.is_cancelled() {
                return Err(NotekeeperError::Cancelled);
            }

            let id = entry.note.id();
            written += match entry.state {
                EntryState::Unchanged => continue,
                EntryState::Inserted => insert_note(&tx, &entry.note)?,
                EntryState::Modified => match update_note(&tx, &entry.note)? {
                    0 => return Err(NotekeeperError::NotFound(id)),
                    n => n,
                },
                EntryState::Deleted => match delete_note(&tx, id)? {
                    0 => return Err(NotekeeperError::NotFound(id)),
                    n => n,
                },
            };
        }

        if cancel.is_cancelled() {
            return Err(NotekeeperError::Cancelled);
        }
        tx.commit()?;

        self.entries.retain(|e| e.state != EntryState::Deleted);
        for entry in &mut self.entries {
            entry.state = EntryState::Unchanged;
        }

        tracing::debug!(written, "saved changes");
        Ok(written)
    }

    fn position(&self, id: Uuid) -> Option<usize> {
        self.entries.iter().position(|e| e.note.id() == id)
    }
}
