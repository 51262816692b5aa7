//! Router configuration for Web API.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use super::dto::{
    DeleteResponse, FileResponse, StatsResponse, SyncResponse, UpdateFileRequest,
};
use super::handlers::{self, AppState};
use super::middleware::create_cors_layer;

/// Room for multipart boundaries and text fields on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[derive(OpenApi)]
#[openapi(
    info(title = "filekeep API", description = "File storage with a metadata index"),
    paths(
        handlers::file::list_files,
        handlers::file::get_file,
        handlers::file::upload_file,
        handlers::file::update_file,
        handlers::file::delete_file,
        handlers::file::download_file,
        handlers::file::actualize,
        handlers::file::get_stats,
    ),
    components(schemas(
        FileResponse,
        UpdateFileRequest,
        DeleteResponse,
        SyncResponse,
        StatsResponse,
    )),
    tags(
        (name = "files", description = "Stored files and their metadata"),
        (name = "maintenance", description = "Reconciliation and statistics")
    )
)]
pub struct ApiDoc;

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let upload_limit =
        usize::try_from(app_state.max_upload_size).unwrap_or(usize::MAX - MULTIPART_OVERHEAD);

    let file_routes = Router::new()
        .route("/", get(handlers::list_files))
        .route(
            "/upload",
            post(handlers::upload_file)
                .layer(DefaultBodyLimit::max(upload_limit + MULTIPART_OVERHEAD)),
        )
        .route(
            "/:id",
            get(handlers::get_file)
                .put(handlers::update_file)
                .delete(handlers::delete_file),
        )
        .route("/:id/download", get(handlers::download_file));

    let api_routes = Router::new()
        .nest("/files", file_routes)
        .route("/actualize", post(handlers::actualize))
        .route("/stats", get(handlers::get_stats))
        .route("/openapi.json", get(openapi_json));

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
