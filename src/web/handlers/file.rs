//! File handlers for Web API.

use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use std::io;
use std::sync::Arc;

use crate::file::UploadRequest;
use crate::web::dto::validation::strip_control_chars;
use crate::web::dto::{
    ApiResponse, DeleteFileQuery, DeleteResponse, FileResponse, StatsResponse, SyncResponse,
    UpdateFileRequest, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Generate a safe Content-Disposition header value for file downloads.
///
/// Control characters are dropped and quotes/backslashes replaced in the
/// plain `filename` parameter. Non-ASCII names additionally get an RFC 5987
/// `filename*` parameter.
fn content_disposition_header(filename: &str) -> String {
    let needs_escaping = filename
        .chars()
        .any(|c| c.is_control() || c == '"' || c == '\\');
    if filename.is_ascii() && !needs_escaping {
        return format!("attachment; filename=\"{filename}\"");
    }

    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            _ => c,
        })
        .collect();
    let encoded = urlencoding::encode(filename);

    format!("attachment; filename=\"{sanitized}\"; filename*=UTF-8''{encoded}")
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::unprocessable("File exceeds maximum upload size");
    }
    tracing::warn!("Failed to read multipart data: {}", err);
    ApiError::bad_request("Invalid multipart data")
}

async fn read_text_field(
    field: axum::extract::multipart::Field<'_>,
    name: &str,
) -> Result<String, ApiError> {
    let text = field.text().await.map_err(|e| {
        tracing::debug!(field = name, "Unreadable text field");
        multipart_error(e)
    })?;
    Ok(strip_control_chars(&text))
}

/// GET /api/files - List all files.
#[utoipa::path(
    get,
    path = "/api/files",
    tag = "files",
    responses(
        (status = 200, description = "All files ordered by path and name", body = Vec<FileResponse>)
    )
)]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<FileResponse>>>, ApiError> {
    let files = state.file_service().list().await?;
    let responses = files.into_iter().map(FileResponse::from).collect();
    Ok(Json(ApiResponse::new(responses)))
}

/// GET /api/files/:id - Get file metadata.
#[utoipa::path(
    get,
    path = "/api/files/{id}",
    tag = "files",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File metadata", body = FileResponse),
        (status = 404, description = "File not found")
    )
)]
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<i64>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let file = state.file_service().get(file_id).await?;
    Ok(Json(ApiResponse::new(file.into())))
}

/// POST /api/files/upload - Upload a file.
///
/// Request body: multipart/form-data with a "file" part and optional
/// "filename", "path" and "comment" text fields.
#[utoipa::path(
    post,
    path = "/api/files/upload",
    tag = "files",
    responses(
        (status = 201, description = "File uploaded", body = FileResponse),
        (status = 400, description = "Malformed form or path outside the storage root"),
        (status = 409, description = "A file with this name already exists"),
        (status = 422, description = "Invalid name, comment or size")
    )
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<FileResponse>>), ApiError> {
    let mut original_filename: Option<String> = None;
    let mut content: Option<Vec<u8>> = None;
    let mut name = String::new();
    let mut path = String::new();
    let mut comment: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                original_filename = Some(field.file_name().unwrap_or("").to_string());
                content = Some(field.bytes().await.map_err(multipart_error)?.to_vec());
            }
            "filename" => name = read_text_field(field, "filename").await?,
            "path" => path = read_text_field(field, "path").await?,
            "comment" => {
                let text = read_text_field(field, "comment").await?;
                if !text.trim().is_empty() {
                    comment = Some(text);
                }
            }
            _ => {}
        }
    }

    let content = content.ok_or_else(|| ApiError::bad_request("No file provided"))?;
    let original_filename = original_filename.unwrap_or_default();

    let mut request = UploadRequest::new(original_filename, content)
        .with_name(name)
        .with_path(path);
    if let Some(comment) = comment {
        request = request.with_comment(comment);
    }

    let file = state.file_service().upload(&request).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new(file.into()))))
}

/// PUT /api/files/:id - Rename, move or re-comment a file.
#[utoipa::path(
    put,
    path = "/api/files/{id}",
    tag = "files",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    request_body = UpdateFileRequest,
    responses(
        (status = 200, description = "Updated file", body = FileResponse),
        (status = 400, description = "Path outside the storage root"),
        (status = 404, description = "File not found"),
        (status = 409, description = "Target name already taken"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn update_file(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateFileRequest>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let file = state.file_service().rename(file_id, &req.into()).await?;
    Ok(Json(ApiResponse::new(file.into())))
}

/// DELETE /api/files/:id - Delete a file and its metadata.
#[utoipa::path(
    delete,
    path = "/api/files/{id}",
    tag = "files",
    params(
        ("id" = i64, Path, description = "File ID"),
        DeleteFileQuery
    ),
    responses(
        (status = 200, description = "File deleted", body = DeleteResponse),
        (status = 404, description = "File or record not found")
    )
)]
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<i64>,
    Query(query): Query<DeleteFileQuery>,
) -> Result<Json<ApiResponse<DeleteResponse>>, ApiError> {
    state.file_service().delete(file_id, query.silent).await?;
    Ok(Json(ApiResponse::new(DeleteResponse::deleted())))
}

/// GET /api/files/:id/download - Download file content.
#[utoipa::path(
    get,
    path = "/api/files/{id}/download",
    tag = "files",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File content as an attachment"),
        (status = 404, description = "File not found")
    )
)]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<i64>,
) -> Result<Response<Body>, ApiError> {
    let (file, path) = state.file_service().download_path(file_id).await?;
    let filename = file.file_name();

    let content = match tokio::fs::read(&path).await {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ApiError::not_found(format!("File {filename} not found")));
        }
        Err(e) => return Err(crate::FilekeepError::from_io(e, &path).into()),
    };

    let content_type = mime_guess::from_path(&filename)
        .first_or_octet_stream()
        .to_string();

    Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(&filename),
        )
        .header(header::CONTENT_LENGTH, content.len())
        .body(Body::from(content))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })
}

/// POST /api/actualize - Reconcile metadata with the storage tree.
#[utoipa::path(
    post,
    path = "/api/actualize",
    tag = "maintenance",
    responses(
        (status = 200, description = "Sync report", body = SyncResponse)
    )
)]
pub async fn actualize(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SyncResponse>>, ApiError> {
    let report = state.file_service().sync().await?;
    Ok(Json(ApiResponse::new(report.into())))
}

/// GET /api/stats - File count and total size.
#[utoipa::path(
    get,
    path = "/api/stats",
    tag = "maintenance",
    responses(
        (status = 200, description = "Storage statistics", body = StatsResponse)
    )
)]
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<StatsResponse>>, ApiError> {
    let stats = state.file_service().stats().await?;
    Ok(Json(ApiResponse::new(stats.into())))
}
