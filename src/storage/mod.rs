mod context;
mod sqlite_store;
mod stamping;

pub use context::{EntryState, NoteContext};
pub use sqlite_store::Database;
pub use stamping::stamp_pending;
