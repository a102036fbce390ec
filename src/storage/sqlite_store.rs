use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::NoteContext;
use crate::entity::{Note, Timestamped, Timestamps};
use crate::error::{NotekeeperError, Result};

const SCHEMA_VERSION: &str = "1";
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

/// Handle to the notes database file.
///
/// The handle itself holds no connection. Every call to [`Database::context`]
/// opens its own connection, so each request works in its own scope.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    /// Open or create the database and bring its schema up to date
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(&path)?;
        init_schema(&conn)?;

        tracing::info!(path = %path.display(), "database ready");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a new persistence context with its own connection
    pub fn context(&self) -> Result<NoteContext> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(NoteContext::new(conn))
    }

    /// Get the schema version recorded in the meta table
    pub fn schema_version(&self) -> Result<Option<String>> {
        let conn = Connection::open(&self.path)?;
        let version: Option<String> = conn
            .query_row(
                "SELECT value FROM meta WHERE key = 'schema_version'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(version)
    }
}

/// Initialize the database schema
fn init_schema(conn: &Connection) -> Result<()> {
    // WAL lets readers proceed while one request holds the write lock
    let _mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;

    // Metadata table for version tracking
    conn.execute(
        "CREATE TABLE IF NOT EXISTS meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS notes (
            id TEXT PRIMARY KEY,
            message TEXT NOT NULL,
            created_at TEXT NOT NULL,
            changed_at TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_notes_created_at ON notes(created_at)",
        [],
    )?;

    conn.execute(
        "INSERT OR REPLACE INTO meta (key, value) VALUES ('schema_version', ?1)",
        [SCHEMA_VERSION],
    )?;

    Ok(())
}

pub(crate) fn select_note(conn: &Connection, id: Uuid) -> Result<Option<Note>> {
    let note = conn
        .query_row(
            "SELECT id, message, created_at, changed_at FROM notes WHERE id = ?1",
            [id.to_string()],
            note_from_row,
        )
        .optional()?;
    Ok(note)
}

pub(crate) fn select_all(conn: &Connection) -> Result<Vec<Note>> {
    let mut stmt = conn.prepare(
        "SELECT id, message, created_at, changed_at
         FROM notes
         ORDER BY created_at, id",
    )?;

    let notes = stmt
        .query_map([], note_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(notes)
}

pub(crate) fn insert_note(conn: &Connection, note: &Note) -> Result<usize> {
    let created_at = note.created_at().ok_or_else(|| {
        NotekeeperError::Storage(format!("Note {} has no creation timestamp", note.id()))
    })?;

    let rows = conn.execute(
        "INSERT INTO notes (id, message, created_at, changed_at) VALUES (?1, ?2, ?3, ?4)",
        params![
            note.id().to_string(),
            note.message(),
            format_timestamp(created_at),
            note.changed_at().map(format_timestamp),
        ],
    )?;
    Ok(rows)
}

/// Write the message and change time. `created_at` is never rewritten.
pub(crate) fn update_note(conn: &Connection, note: &Note) -> Result<usize> {
    let rows = conn.execute(
        "UPDATE notes SET message = ?2, changed_at = ?3 WHERE id = ?1",
        params![
            note.id().to_string(),
            note.message(),
            note.changed_at().map(format_timestamp),
        ],
    )?;
    Ok(rows)
}

pub(crate) fn delete_note(conn: &Connection, id: Uuid) -> Result<usize> {
    let rows = conn.execute("DELETE FROM notes WHERE id = ?1", [id.to_string()])?;
    Ok(rows)
}

fn note_from_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    let id: String = row.get(0)?;
    let id = Uuid::parse_str(&id)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;
    let message: String = row.get(1)?;
    let created_at = parse_timestamp(2, &row.get::<_, String>(2)?)?;
    let changed_at = row
        .get::<_, Option<String>>(3)?
        .map(|s| parse_timestamp(3, &s))
        .transpose()?;

    Ok(Note::from_row(
        id,
        message,
        Timestamps::restore(created_at, changed_at),
    ))
}

/// Fixed-width RFC 3339 so stored values sort in time order.
fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn stored_note(message: &str, created_at: DateTime<Utc>) -> Note {
        let mut note = Note::new(message).unwrap();
        note.timestamps_mut().stamp_created(created_at);
        note
    }

    #[test]
    fn test_open_creates_db_and_records_version() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data").join("notes.db");

        let db = Database::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(db.schema_version().unwrap(), Some("1".to_string()));

        // Reopening an existing database is fine
        let db = Database::open(&path).unwrap();
        assert_eq!(db.path(), path.as_path());
    }

    #[test]
    fn test_open_enables_wal() {
        let tmp = TempDir::new().unwrap();
        let db = Database::open(tmp.path().join("notes.db")).unwrap();

        let conn = Connection::open(db.path()).unwrap();
        let mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }

    #[test]
    fn test_insert_and_select_round_trip() {
        let tmp = TempDir::new().unwrap();
        let db = Database::open(tmp.path().join("notes.db")).unwrap();
        let conn = Connection::open(db.path()).unwrap();

        let created = Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap()
            + chrono::Duration::nanoseconds(123_456_789);
        let note = stored_note("Note A", created);
        assert_eq!(insert_note(&conn, &note).unwrap(), 1);

        let loaded = select_note(&conn, note.id()).unwrap().unwrap();
        assert_eq!(loaded, note);
        assert!(loaded.changed_at().is_none());

        assert!(select_note(&conn, Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn test_insert_without_created_at_fails() {
        let tmp = TempDir::new().unwrap();
        let db = Database::open(tmp.path().join("notes.db")).unwrap();
        let conn = Connection::open(db.path()).unwrap();

        let note = Note::new("unsaved").unwrap();
        assert!(matches!(
            insert_note(&conn, &note),
            Err(NotekeeperError::Storage(_))
        ));
    }

    #[test]
    fn test_update_keeps_created_at() {
        let tmp = TempDir::new().unwrap();
        let db = Database::open(tmp.path().join("notes.db")).unwrap();
        let conn = Connection::open(db.path()).unwrap();

        let created = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let mut note = stored_note("before", created);
        insert_note(&conn, &note).unwrap();

        let changed = Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap();
        note.set_message("after").unwrap();
        note.timestamps_mut().stamp_changed(changed);
        assert_eq!(update_note(&conn, &note).unwrap(), 1);

        let loaded = select_note(&conn, note.id()).unwrap().unwrap();
        assert_eq!(loaded.message(), "after");
        assert_eq!(loaded.created_at(), Some(created));
        assert_eq!(loaded.changed_at(), Some(changed));
    }

    #[test]
    fn test_select_all_orders_by_created_at() {
        let tmp = TempDir::new().unwrap();
        let db = Database::open(tmp.path().join("notes.db")).unwrap();
        let conn = Connection::open(db.path()).unwrap();

        let later = stored_note("later", Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());
        let earlier = stored_note("earlier", Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap());
        insert_note(&conn, &later).unwrap();
        insert_note(&conn, &earlier).unwrap();

        let all = select_all(&conn).unwrap();
        let messages: Vec<&str> = all.iter().map(|n| n.message()).collect();
        assert_eq!(messages, vec!["earlier", "later"]);
    }

    #[test]
    fn test_delete_reports_missing_rows() {
        let tmp = TempDir::new().unwrap();
        let db = Database::open(tmp.path().join("notes.db")).unwrap();
        let conn = Connection::open(db.path()).unwrap();

        let note = stored_note("gone", Utc::now());
        insert_note(&conn, &note).unwrap();

        assert_eq!(delete_note(&conn, note.id()).unwrap(), 1);
        assert_eq!(delete_note(&conn, note.id()).unwrap(), 0);
    }
}
