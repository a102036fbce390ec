mod note;

pub use note::{Note, MAX_MESSAGE_LENGTH};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Creation and change timestamps owned by the persistence layer.
///
/// Both fields are readable by anyone, but only code inside this crate can
/// write them. Application code never sets a timestamp directly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timestamps {
    created_at: Option<DateTime<Utc>>,
    changed_at: Option<DateTime<Utc>>,
}

impl Timestamps {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn changed_at(&self) -> Option<DateTime<Utc>> {
        self.changed_at
    }

    pub(crate) fn stamp_created(&mut self, at: DateTime<Utc>) {
        self.created_at = Some(at);
    }

    pub(crate) fn stamp_changed(&mut self, at: DateTime<Utc>) {
        self.changed_at = Some(at);
    }

    /// Rebuild timestamps from a stored row.
    pub(crate) fn restore(created_at: DateTime<Utc>, changed_at: Option<DateTime<Utc>>) -> Self {
        Self {
            created_at: Some(created_at),
            changed_at,
        }
    }
}

/// Capability implemented by every entity that wants automatic timestamping.
pub trait Timestamped {
    fn timestamps(&self) -> &Timestamps;

    fn timestamps_mut(&mut self) -> &mut Timestamps;

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.timestamps().created_at()
    }

    fn changed_at(&self) -> Option<DateTime<Utc>> {
        self.timestamps().changed_at()
    }
}
