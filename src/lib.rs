pub mod cli;
pub mod config;
pub mod entity;
pub mod error;
pub mod http;
pub mod logging;
pub mod repository;
pub mod storage;

pub use entity::{Note, Timestamped, Timestamps};
pub use error::{NotekeeperError, Result};
pub use repository::NoteRepository;
pub use storage::{Database, EntryState, NoteContext};
