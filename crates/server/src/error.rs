//! Error types for the greet MCP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Main error type for key storage, request gating and tool registration.
#[derive(Error, Debug)]
pub enum Error {
    /// Credential header missing or not present in the key store.
    #[error("Unauthorized: Invalid or missing API Key")]
    Unauthorized,

    /// Backing store unreachable, corrupt, or a statement failed.
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// The OS random generator could not produce a default key.
    #[error("Key generation failed: {0}")]
    KeyGeneration(#[from] rand_core::OsError),

    /// Two tools were registered under the same name.
    #[error("Duplicate tool registration: {0}")]
    DuplicateTool(String),
}

impl Error {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Error::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Error::Storage(_) | Error::KeyGeneration(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR")
            }
            Error::DuplicateTool(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorBody {
            error: String,
            code: &'static str,
        }

        let (status, code) = self.status_and_code();

        // Storage details stay in the server log.
        let error = match &self {
            Error::Storage(_) | Error::KeyGeneration(_) => "Key store unavailable".to_string(),
            other => other.to_string(),
        };

        (status, axum::Json(ErrorBody { error, code })).into_response()
    }
}

/// Result type alias for server operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_maps_to_401() {
        let resp = Error::Unauthorized.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn storage_errors_map_to_500() {
        let resp = Error::Storage(sqlx::Error::PoolClosed).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
