use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use super::error::ApiError;
use super::AppState;
use crate::entity::Note;
use crate::error::Result;
use crate::repository::NoteRepository;

/// Body of `POST /api/notes`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNoteRequest {
    pub message: String,
}

/// Body of `PUT /api/notes`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateNoteRequest {
    pub id: Uuid,
    pub message: String,
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn list_notes(
    State(state): State<AppState>,
) -> std::result::Result<Json<Vec<Note>>, ApiError> {
    let notes = with_repository(&state, |repo| repo.list()).await?;
    Ok(Json(notes))
}

pub async fn get_note(
    State(state): State<AppState>,
    path: std::result::Result<Path<Uuid>, PathRejection>,
) -> std::result::Result<Json<Note>, ApiError> {
    let Path(id) = path?;
    with_repository(&state, move |repo| repo.get(id))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound { id })
}

pub async fn create_note(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateNoteRequest>, JsonRejection>,
) -> std::result::Result<(StatusCode, Json<Note>), ApiError> {
    let Json(request) = payload?;
    let note = with_repository(&state, move |repo| repo.create(request.message)).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn update_note(
    State(state): State<AppState>,
    payload: std::result::Result<Json<UpdateNoteRequest>, JsonRejection>,
) -> std::result::Result<Json<Note>, ApiError> {
    let Json(request) = payload?;
    let id = request.id;
    with_repository(&state, move |repo| repo.update(request.id, request.message))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound { id })
}

pub async fn delete_note(
    State(state): State<AppState>,
    path: std::result::Result<Path<Uuid>, PathRejection>,
) -> std::result::Result<StatusCode, ApiError> {
    let Path(id) = path?;
    if with_repository(&state, move |repo| repo.delete(id)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound { id })
    }
}

/// Run one unit of work against a fresh repository on the blocking pool.
///
/// The context (and its connection) lives for exactly this call. The token
/// handed to the repository is cancelled on server shutdown and also when
/// this future is dropped, e.g. because the client went away.
async fn with_repository<T, F>(state: &AppState, op: F) -> std::result::Result<T, ApiError>
where
    F: FnOnce(&mut NoteRepository) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let database = state.database.clone();
    let cancel = state.shutdown.child_token();
    let _request_guard = cancel.clone().drop_guard();

    let result = tokio::task::spawn_blocking(move || {
        let mut repo = NoteRepository::new(database.context()?, cancel);
        op(&mut repo)
    })
    .await
    .map_err(|e| ApiError::InternalError {
        message: format!("Request task failed: {}", e),
    })?;

    result.map_err(ApiError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotekeeperError;
    use crate::storage::Database;
    use std::sync::mpsc;
    use tempfile::TempDir;
    use tokio_util::sync::CancellationToken;

    fn setup_state() -> (AppState, TempDir) {
        let tmp = TempDir::new().unwrap();
        let database = Database::open(tmp.path().join("notes.db")).unwrap();
        (AppState::new(database, CancellationToken::new()), tmp)
    }

    #[tokio::test]
    async fn test_dropped_request_does_not_commit() {
        let (state, _tmp) = setup_state();
        let (start_tx, start_rx) = mpsc::channel::<()>();
        let (done_tx, done_rx) = mpsc::channel();

        let mut request = Box::pin(with_repository(&state, move |repo| {
            // Hold the blocking work until the request has been dropped
            start_rx.recv().unwrap();
            let result = repo.create("orphan");
            let cancelled = matches!(result, Err(NotekeeperError::Cancelled));
            done_tx.send(cancelled).unwrap();
            result
        }));

        tokio::select! {
            biased;
            _ = &mut request => panic!("request finished before the work was released"),
            _ = std::future::ready(()) => {}
        }
        drop(request);

        start_tx.send(()).unwrap();
        assert!(done_rx.recv().unwrap());

        let notes = with_repository(&state, |repo| repo.list()).await.unwrap();
        assert!(notes.is_empty());
    }

    #[tokio::test]
    async fn test_completed_request_commits() {
        let (state, _tmp) = setup_state();

        let note = with_repository(&state, |repo| repo.create("kept"))
            .await
            .unwrap();

        let id = note.id();
        let fetched = with_repository(&state, move |repo| repo.get(id))
            .await
            .unwrap();
        assert_eq!(fetched, Some(note));
    }
}
