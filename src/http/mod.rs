//! REST surface for notes.
//!
//! Routes:
//! - `GET    /api/notes`        list all notes
//! - `GET    /api/notes/{id}`   one note, 404 if absent
//! - `POST   /api/notes`        create from `{message}`, 201
//! - `PUT    /api/notes`        update from `{id, message}`, 404 if absent
//! - `DELETE /api/notes/{id}`   204, 404 if absent
//! - `GET    /health`           liveness check

pub mod error;
mod handlers;

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;
use crate::error::Result;
use crate::storage::Database;

pub use error::ApiError;
pub use handlers::{CreateNoteRequest, UpdateNoteRequest};

/// State shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub database: Database,
    /// Cancelled when the server shuts down. Each request gets a child token.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(database: Database, shutdown: CancellationToken) -> Self {
        Self { database, shutdown }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/notes",
            get(handlers::list_notes)
                .post(handlers::create_note)
                .put(handlers::update_note),
        )
        .route(
            "/api/notes/{id}",
            get(handlers::get_note).delete(handlers::delete_note),
        )
        .route("/health", get(handlers::health))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

/// Open the database, bind and serve until `shutdown` is cancelled.
///
/// Schema failures surface here, before the listener is bound.
pub async fn serve(config: &ServerConfig, shutdown: CancellationToken) -> Result<()> {
    let database = Database::open(&config.database)?;
    let listener = TcpListener::bind(config.bind).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    let app = router(AppState::new(database, shutdown.clone()));
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "handled request"
    );
    response
}
