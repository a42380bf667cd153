// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Store access traits and their implementations.
//!
//! [`BuildingRepository`] has one method per read query shape;
//! [`FootprintSink`] has one method per table written during ingestion.
//! [`PgStore`] implements both against PostgreSQL, [`MemoryStore`] against
//! in-process tables with the same semantics.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::{PgStore, MIGRATOR};

use crate::error::Result;
use crate::model::{
    Building, BuildingCoordinate, BuildingDimension, BuildingDimensionRow, BuildingGeometryRow,
    BuildingRow, DimensionRow, GroupCounts,
};
use crate::query::{CoordinateBox, Grouping};
use async_trait::async_trait;

/// Read side: one method per query shape.
#[async_trait]
pub trait BuildingRepository: Send + Sync {
    /// Check that the store is reachable.
    async fn ping(&self) -> Result<()>;

    async fn all_buildings(&self) -> Result<Vec<Building>>;

    async fn buildings_by_year(&self, year: i32) -> Result<Vec<Building>>;

    /// `None` when no building with this id has a dimensions row.
    async fn building_dimensions(&self, id: i64) -> Result<Option<BuildingDimension>>;

    /// Buildings whose ground elevation is strictly above the mean.
    async fn above_average_elevation(&self) -> Result<Vec<BuildingDimension>>;

    async fn count_by(&self, grouping: Grouping) -> Result<GroupCounts>;

    /// Buildings with a geometry row inside `bounds` (inclusive).
    async fn count_in_range(&self, bounds: &CoordinateBox) -> Result<i64>;

    async fn buildings_in_range(&self, bounds: &CoordinateBox) -> Result<Vec<BuildingCoordinate>>;
}

/// Write side: one independent insert per table.
#[async_trait]
pub trait FootprintSink: Send + Sync {
    async fn insert_dimension(&self, row: &DimensionRow) -> Result<()>;

    async fn insert_building(&self, row: &BuildingRow) -> Result<()>;

    async fn insert_building_dimension(&self, row: &BuildingDimensionRow) -> Result<()>;

    async fn insert_building_geometry(&self, row: &BuildingGeometryRow) -> Result<()>;
}
