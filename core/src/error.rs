use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    MalformedInput,
    IoFailure,
    InvariantViolation,
    Internal,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::MalformedInput => "MALFORMED_INPUT",
            ErrorCode::IoFailure => "IO_FAILURE",
            ErrorCode::InvariantViolation => "INVARIANT_VIOLATION",
            ErrorCode::Internal => "INTERNAL",
        };
        write!(f, "{}", s)
    }
}

pub trait EditorError: std::error::Error {
    fn error_code(&self) -> ErrorCode;
}
