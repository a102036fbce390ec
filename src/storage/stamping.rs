use chrono::{DateTime, Utc};

use super::EntryState;
use crate::entity::Timestamped;

/// Stamp pending entities ahead of a commit.
///
/// Inserted entities get `created_at = now`, modified entities get
/// `changed_at = now`, overwriting whatever value they held. Unchanged and
/// deleted entities are left alone. Returns how many entities were stamped.
pub fn stamp_pending<'a, I>(entries: I, now: DateTime<Utc>) -> usize
where
    I: IntoIterator<Item = (EntryState, &'a mut dyn Timestamped)>,
{
    let mut stamped = 0;
    for (state, entity) in entries {
        match state {
            EntryState::Inserted => entity.timestamps_mut().stamp_created(now),
            EntryState::Modified => entity.timestamps_mut().stamp_changed(now),
            EntryState::Unchanged | EntryState::Deleted => continue,
        }
        stamped += 1;
    }

    tracing::debug!(stamped, at = %now, "stamped pending changes");
    stamped
}
