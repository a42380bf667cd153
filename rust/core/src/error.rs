// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for feed decoding, ingestion and store queries.

use crate::model::DimensionKind;
use thiserror::Error;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while talking to the store or mapping a query.
#[derive(Debug, Error)]
pub enum Error {
    /// The store could not be reached (I/O, TLS, pool exhausted or closed).
    #[error("Store connectivity error: {0}")]
    Connectivity(String),

    /// A request parameter was malformed. Raised before any store access.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The store rejected a statement.
    #[error("Query execution error: {0}")]
    QueryExecution(String),

    /// A result row did not have the expected shape.
    #[error("Row decode error: {0}")]
    RowDecode(String),

    /// A single-row lookup matched nothing.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Connection settings could not be turned into connect options.
    #[error("Invalid database configuration: {0}")]
    Configuration(String),

    /// Schema migrations failed to apply.
    #[error("Migration error: {0}")]
    Migration(String),
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Error::Connectivity(err.to_string()),
            sqlx::Error::Configuration(_) => Error::Configuration(err.to_string()),
            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnIndexOutOfBounds { .. }
            | sqlx::Error::TypeNotFound { .. }
            | sqlx::Error::Decode(_) => Error::RowDecode(err.to_string()),
            sqlx::Error::Migrate(_) => Error::Migration(err.to_string()),
            _ => Error::QueryExecution(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for Error {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Error::Migration(err.to_string())
    }
}

/// Malformed request parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Incorrect year format (integer required): {0:?}")]
    InvalidYearFormat(String),

    #[error("Incorrect building id format (integer required): {0:?}")]
    InvalidIdFormat(String),

    #[error("Incorrect range format (\"min,max\" required): {0:?}")]
    InvalidRangeFormat(String),

    #[error("Unknown group {0:?} (expected \"source\" or \"type\")")]
    UnknownGroup(String),
}

/// Failures that abort a feed fetch as a whole.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Feed request failed: {0}")]
    Fetch(String),

    #[error("Feed body could not be read: {0}")]
    Read(String),

    #[error("Feed is not a JSON array: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A single feed element that could not be turned into a footprint record.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("record shape mismatch: {0}")]
    Shape(#[from] serde_json::Error),

    #[error("field `{field}` is not a valid number: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("geometry has fewer than two coordinates")]
    MissingCoordinates,
}

/// Per-row write failures during ingestion. None of these stop the run.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("insert into {kind} failed for label {label:?}: {source}")]
    DimensionInsert {
        kind: DimensionKind,
        label: String,
        source: Error,
    },

    #[error("building {building}: buildings insert failed: {source}")]
    BuildingInsert { building: i64, source: Error },

    #[error("building {building}: building_dimensions insert failed: {source}")]
    DimensionRowInsert { building: i64, source: Error },

    #[error("building {building}: building_geom insert failed: {source}")]
    GeometryInsert { building: i64, source: Error },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_timeout_is_connectivity() {
        let err = Error::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, Error::Connectivity(_)));
    }

    #[test]
    fn test_missing_column_is_row_decode() {
        let err = Error::from(sqlx::Error::ColumnNotFound("roof_height".into()));
        assert!(matches!(err, Error::RowDecode(_)));
    }

    #[test]
    fn test_row_not_found_is_query_execution() {
        let err = Error::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, Error::QueryExecution(_)));
    }
}
