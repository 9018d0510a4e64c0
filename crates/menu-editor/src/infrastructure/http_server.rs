//! HTTP server for the editor UI.
//!
//! # Routes
//!
//! | Method | Path            | Handler         | Body                      |
//! |--------|-----------------|-----------------|---------------------------|
//! | GET    | `{base}`        | [`get_menu`]    | `MenuResponse`            |
//! | POST   | `{base}`        | [`post_menu`]   | form → `SavedResponse`    |
//! | GET    | `{base}/search` | [`search_menu`] | `SearchResponse`          |
//!
//! # Why spawn_blocking? (for beginners)
//!
//! The store reads and writes files with `std::fs` and calls `fsync`.  Those
//! calls block the thread they run on.  Running them directly inside an async
//! handler would stall every other request scheduled on that runtime worker,
//! so each handler moves the work to tokio's blocking thread pool and awaits
//! the result.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Form, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use menu_store::ErrorKind;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinError;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::application::{EditorError, EditorService};
use crate::domain::{ErrorResponse, MenuResponse, SaveForm, SavedResponse, SearchQuery, SearchResponse};

/// Shared handler state.
pub type SharedService = Arc<EditorService>;

/// Error returned by the HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Editor(#[from] EditorError),

    /// The blocking task panicked or was cancelled.
    #[error("worker task failed: {0}")]
    Worker(#[from] JoinError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Editor(EditorError::Decode(_)) => StatusCode::BAD_REQUEST,
            ApiError::Editor(EditorError::Store(e)) => match e.kind() {
                ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::StorageRead | ErrorKind::StorageWrite | ErrorKind::Backup => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::Editor(e) => e.kind(),
            ApiError::Worker(_) => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "menu editor request failed");
        }
        (status, Json(ErrorResponse::new(self.kind(), self.to_string()))).into_response()
    }
}

/// Builds the router for `service`, mounted at its configured base path.
pub fn router(service: SharedService) -> Router {
    // `parse_config` rejects relative base paths; fall back to the root for
    // hand-built configs.
    let prefix = service.config().route_prefix().unwrap_or("").to_string();
    let base = if prefix.is_empty() { "/".to_string() } else { prefix.clone() };

    Router::new()
        .route(&base, get(get_menu).post(post_menu))
        .route(&format!("{prefix}/search"), get(search_menu))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// `GET {base}`: the current tree and editor settings.
pub async fn get_menu(State(service): State<SharedService>) -> Result<Json<MenuResponse>, ApiError> {
    let response = tokio::task::spawn_blocking(move || service.load()).await?;
    Ok(Json(response))
}

/// `POST {base}`: save the posted tree.
pub async fn post_menu(
    State(service): State<SharedService>,
    Form(form): Form<SaveForm>,
) -> Result<Json<SavedResponse>, ApiError> {
    let saved = tokio::task::spawn_blocking(move || service.save(&form)).await??;
    Ok(Json(saved))
}

/// `GET {base}/search?q=term`: nodes matching `term`.
pub async fn search_menu(
    State(service): State<SharedService>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let response = tokio::task::spawn_blocking(move || service.search(&query.q)).await??;
    Ok(Json(response))
}

/// Binds `bind_addr` and serves the editor until `shutdown` completes.
///
/// # Errors
///
/// Returns the I/O error if the address cannot be bound or the server fails.
pub async fn run_server<S>(service: SharedService, bind_addr: SocketAddr, shutdown: S) -> std::io::Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(bind_addr).await?;
    info!(
        addr = %listener.local_addr()?,
        base = %service.config().base_path,
        menu_file = %service.config().menu_file.display(),
        "menu editor listening"
    );

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown)
        .await
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EditorConfig;
    use menu_core::{DecodeError, ValidationError};
    use menu_store::{Revision, StoreError};

    fn decode_error() -> EditorError {
        let json_err = serde_json::from_str::<serde_json::Value>("[").expect_err("malformed");
        EditorError::Decode(DecodeError::from(json_err))
    }

    #[test]
    fn test_decode_error_is_bad_request() {
        assert_eq!(ApiError::from(decode_error()).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_conflict_is_409() {
        let err = ApiError::from(EditorError::Store(StoreError::Conflict {
            expected: Revision::missing(),
            actual: Revision::of(b"x"),
        }));
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.kind(), "conflict");
    }

    #[tokio::test]
    async fn test_validation_error_renders_422_body() {
        // Arrange
        let err = ApiError::from(EditorError::Store(StoreError::Validation(
            ValidationError::RoundTripMismatch,
        )));

        // Act
        let response = err.into_response();

        // Assert
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(body["status"], "error");
        assert_eq!(body["kind"], "validation");
    }

    #[test]
    fn test_every_store_error_kind_has_a_status() {
        let io = || std::io::Error::new(std::io::ErrorKind::Other, "x");
        let cases = [
            (StoreError::Read { path: "m".into(), source: io() }, StatusCode::INTERNAL_SERVER_ERROR),
            (StoreError::Validation(ValidationError::RoundTripMismatch), StatusCode::UNPROCESSABLE_ENTITY),
            (
                StoreError::Conflict { expected: Revision::missing(), actual: Revision::of(b"x") },
                StatusCode::CONFLICT,
            ),
        ];
        for (store_err, expected) in cases {
            assert_eq!(ApiError::from(EditorError::Store(store_err)).status(), expected);
        }
    }

    #[test]
    fn test_write_error_is_500() {
        let err = ApiError::from(EditorError::Store(StoreError::Write {
            path: "menu.yml".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        }));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.kind(), "write");
    }

    #[tokio::test]
    async fn test_run_server_stops_on_shutdown() {
        // Arrange: port 0 lets the OS pick a free port
        let dir = tempfile::tempdir().expect("tempdir");
        let service = Arc::new(EditorService::new(EditorConfig {
            menu_file: dir.path().join("menu.yml"),
            ..EditorConfig::default()
        }));
        let addr: SocketAddr = "127.0.0.1:0".parse().expect("addr");

        // Act: shutdown future is already complete
        let result = run_server(service, addr, async {}).await;

        // Assert
        assert!(result.is_ok());
    }
}
