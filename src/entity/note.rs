// src/entity/note.rs
use serde::Serialize;
use uuid::Uuid;

use super::{Timestamped, Timestamps};
use crate::error::{NotekeeperError, Result};

/// Maximum message length, counted in UTF-16 code units.
pub const MAX_MESSAGE_LENGTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    id: Uuid,
    message: String,
    #[serde(flatten)]
    timestamps: Timestamps,
}

impl Note {
    /// Create an unsaved note with a fresh id. Timestamps stay unset until the
    /// note is first persisted.
    pub fn new(message: impl Into<String>) -> Result<Self> {
        let message = message.into();
        validate_message(&message)?;
        Ok(Self {
            id: Uuid::new_v4(),
            message,
            timestamps: Timestamps::default(),
        })
    }

    pub(crate) fn from_row(id: Uuid, message: String, timestamps: Timestamps) -> Self {
        Self {
            id,
            message,
            timestamps,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn set_message(&mut self, message: impl Into<String>) -> Result<()> {
        let message = message.into();
        validate_message(&message)?;
        self.message = message;
        Ok(())
    }
}

impl Timestamped for Note {
    fn timestamps(&self) -> &Timestamps {
        &self.timestamps
    }

    fn timestamps_mut(&mut self) -> &mut Timestamps {
        &mut self.timestamps
    }
}

fn validate_message(message: &str) -> Result<()> {
    if message.trim().is_empty() {
        return Err(NotekeeperError::validation("message", "Message is required"));
    }

    let length = message.encode_utf16().count();
    if length > MAX_MESSAGE_LENGTH {
        return Err(NotekeeperError::validation(
            "message",
            format!(
                "Message too long: {} characters (max {})",
                length, MAX_MESSAGE_LENGTH
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_assigns_id_and_leaves_timestamps_unset() {
        let a = Note::new("Note A").unwrap();
        let b = Note::new("Note A").unwrap();

        assert_ne!(a.id(), b.id());
        assert_eq!(a.message(), "Note A");
        assert!(a.created_at().is_none());
        assert!(a.changed_at().is_none());
    }

    #[test]
    fn test_empty_message_rejected() {
        assert!(matches!(
            Note::new(""),
            Err(NotekeeperError::Validation { ref field, .. }) if field == "message"
        ));
        assert!(Note::new("   \n\t").is_err());
    }

    #[test]
    fn test_message_length_limit() {
        assert!(Note::new("a".repeat(MAX_MESSAGE_LENGTH)).is_ok());

        let err = Note::new("a".repeat(MAX_MESSAGE_LENGTH + 1)).unwrap_err();
        assert!(err.to_string().contains("257"));
    }

    #[test]
    fn test_length_counts_utf16_code_units() {
        // Each of these is one char but two UTF-16 code units.
        let emoji = "\u{1F600}";
        assert!(Note::new(emoji.repeat(128)).is_ok());
        assert!(Note::new(emoji.repeat(129)).is_err());

        // Multi-byte UTF-8 but a single code unit each.
        assert!(Note::new("é".repeat(256)).is_ok());
    }

    #[test]
    fn test_set_message_validates_and_keeps_old_value_on_error() {
        let mut note = Note::new("Note A").unwrap();
        note.set_message("Note A - modified").unwrap();
        assert_eq!(note.message(), "Note A - modified");

        assert!(note.set_message("").is_err());
        assert_eq!(note.message(), "Note A - modified");
    }

    #[test]
    fn test_serializes_camel_case() {
        let note = Note::new("Note A").unwrap();
        let json = serde_json::to_value(&note).unwrap();

        assert_eq!(json["id"], note.id().to_string());
        assert_eq!(json["message"], "Note A");
        assert!(json["createdAt"].is_null());
        assert!(json["changedAt"].is_null());
        assert!(json.get("created_at").is_none());
    }
}
