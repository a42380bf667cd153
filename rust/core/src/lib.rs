// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Footprints Core
//!
//! Normalization and query mapping for building-footprint records.
//!
//! ## Overview
//!
//! - **Feed decoding**: the open-data JSON array is decoded element by
//!   element into [`FootprintRecord`]s ([`decode_feed`]).
//! - **Normalization**: [`Normalizer`] assigns sequential surrogate ids to
//!   geometry sources, last-state types and geometry types in order of first
//!   appearance and splits each record into `buildings`,
//!   `building_dimensions` and `building_geom` rows.
//! - **Ingestion**: [`ingest`] writes those rows through a [`FootprintSink`],
//!   logging and collecting per-row failures without stopping.
//! - **Query mapping**: [`BuildingQuery`] parses request parameters and
//!   [`execute`] maps each query shape onto a [`BuildingRepository`] call.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use footprints_core::{decode_feed, ingest, execute, BuildingQuery, MemoryStore, Normalizer};
//!
//! let batch = decode_feed(&body)?;
//! let store = MemoryStore::new();
//! let report = ingest(&store, &mut Normalizer::new(), &batch).await;
//!
//! let query = BuildingQuery::by_year("1990")?;
//! let response = execute(&store, &query).await?;
//! ```
//!
//! ## Stores
//!
//! - [`PgStore`]: PostgreSQL through a sqlx pool; ships the schema as
//!   [`MIGRATOR`].
//! - [`MemoryStore`]: in-process tables with the same constraints, used by
//!   tests.

pub mod config;
pub mod dimension;
pub mod error;
pub mod feed;
pub mod ingest;
pub mod model;
pub mod normalize;
pub mod query;
pub mod store;

pub use config::DatabaseConfig;
pub use dimension::{DimensionId, DimensionIndex, Resolution};
pub use error::{DecodeError, Error, FetchError, IngestError, ParseError, Result};
pub use feed::{decode_feed, FeedBatch, FeedFootprint, FootprintRecord, RejectedRecord};
pub use ingest::{ingest, IngestReport};
pub use model::{
    Building, BuildingCoordinate, BuildingDimension, BuildingDimensionRow, BuildingGeometryRow,
    BuildingRow, DimensionKind, DimensionRow, GroupCounts, RangeResult, SourceCount, TypeCount,
};
pub use normalize::{NormalizedFootprint, Normalizer};
pub use query::{execute, BuildingQuery, CoordinateBox, Grouping, QueryResponse};
pub use store::{BuildingRepository, FootprintSink, MemoryStore, PgStore, MIGRATOR};
