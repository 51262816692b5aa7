//! Request DTOs for Web API.

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::validation::no_control_chars;
use crate::file::RenameRequest;

/// Body of `PUT /api/files/{id}`. Absent fields keep their current value.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateFileRequest {
    /// New name without extension.
    #[validate(
        length(max = 255, message = "Name must be at most 255 characters"),
        custom(function = "no_control_chars")
    )]
    pub name: Option<String>,
    /// New directory relative to the storage root; `""`, `.` or `/` for the root.
    #[validate(
        length(max = 1024, message = "Path must be at most 1024 characters"),
        custom(function = "no_control_chars")
    )]
    pub path: Option<String>,
    /// New comment.
    #[validate(length(max = 1000, message = "Comment must be at most 1000 characters"))]
    pub comment: Option<String>,
}

impl From<UpdateFileRequest> for RenameRequest {
    fn from(req: UpdateFileRequest) -> Self {
        RenameRequest {
            name: req.name,
            path: req.path,
            comment: req.comment,
        }
    }
}

/// Query parameters for `DELETE /api/files/{id}`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteFileQuery {
    /// Succeed even if the file is already missing from disk.
    #[serde(default)]
    pub silent: bool,
}
