use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dotedit_core::error::{EditorError, ErrorCode};
use dotedit_core::mutate::MutateError;
use thiserror::Error;
use tracing::error;

/// Request-scoped failure. Nothing here is fatal to the process; the
/// error is mapped to a status code and the request ends.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Session(#[from] session::SessionError),
    #[error(transparent)]
    Format(#[from] format::FormatError),
    #[error(transparent)]
    Mutate(#[from] MutateError),
    #[error(transparent)]
    Render(#[from] render::RenderError),
    #[error("missing parameter `{0}`")]
    MissingParam(&'static str),
    #[error("parameter `{0}` must not be empty")]
    EmptyParam(&'static str),
    #[error("no rendered image for session `{0}`")]
    ImageMissing(String),
    #[error("render task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl EditorError for AppError {
    fn error_code(&self) -> ErrorCode {
        match self {
            AppError::Session(e) => e.error_code(),
            AppError::Format(e) => e.error_code(),
            AppError::Mutate(e) => e.error_code(),
            AppError::Render(e) => e.error_code(),
            AppError::MissingParam(_) | AppError::EmptyParam(_) => ErrorCode::MalformedInput,
            AppError::ImageMissing(_) => ErrorCode::NotFound,
            AppError::TaskJoin(_) => ErrorCode::Internal,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.error_code();
        let status = match code {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::MalformedInput => StatusCode::BAD_REQUEST,
            ErrorCode::InvariantViolation => StatusCode::CONFLICT,
            ErrorCode::IoFailure | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error!(%code, %status, "{self}");
        (status, format!("{code}: {self}")).into_response()
    }
}
