// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types and handling for the server.

use axum::{
    extract::rejection::PathRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use footprints_core::ParseError;
use serde::Serialize;
use thiserror::Error;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    InvalidParameter(#[from] ParseError),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Unexpected row shape: {0}")]
    RowDecode(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::InvalidParameter(err) => (
                StatusCode::BAD_REQUEST,
                match err {
                    ParseError::InvalidYearFormat(_) => "INVALID_YEAR_FORMAT",
                    ParseError::InvalidIdFormat(_) => "INVALID_ID_FORMAT",
                    ParseError::InvalidRangeFormat(_) => "INVALID_RANGE_FORMAT",
                    ParseError::UnknownGroup(_) => "UNKNOWN_GROUP",
                },
            ),
            ApiError::InvalidPath(_) => (StatusCode::BAD_REQUEST, "INVALID_PATH"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "STORE_UNAVAILABLE"),
            ApiError::Query(_) => (StatusCode::INTERNAL_SERVER_ERROR, "QUERY_ERROR"),
            ApiError::RowDecode(_) => (StatusCode::INTERNAL_SERVER_ERROR, "ROW_DECODE_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if status.is_server_error() {
            tracing::error!(error = %self, code, "Request failed");
        } else {
            tracing::debug!(error = %self, code, "Request rejected");
        }

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        if rejection.status().is_server_error() {
            ApiError::Internal(rejection.body_text())
        } else {
            ApiError::InvalidPath(rejection.body_text())
        }
    }
}

impl From<footprints_core::Error> for ApiError {
    fn from(err: footprints_core::Error) -> Self {
        use footprints_core::Error;

        match err {
            Error::Parse(err) => ApiError::InvalidParameter(err),
            Error::NotFound(what) => ApiError::NotFound(what),
            Error::Connectivity(msg) => ApiError::Unavailable(msg),
            Error::QueryExecution(msg) => ApiError::Query(msg),
            Error::RowDecode(msg) => ApiError::RowDecode(msg),
            Error::Configuration(msg) | Error::Migration(msg) => ApiError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                ApiError::from(footprints_core::Error::Parse(ParseError::UnknownGroup(
                    "height".into(),
                ))),
                StatusCode::BAD_REQUEST,
            ),
            (
                footprints_core::Error::NotFound("building 9".into()).into(),
                StatusCode::NOT_FOUND,
            ),
            (
                footprints_core::Error::Connectivity("refused".into()).into(),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                footprints_core::Error::QueryExecution("syntax".into()).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                footprints_core::Error::RowDecode("type mismatch".into()).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
