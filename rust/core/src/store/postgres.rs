// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! PostgreSQL store over a sqlx connection pool.

use super::{BuildingRepository, FootprintSink};
use crate::config::DatabaseConfig;
use crate::error::Result;
use crate::model::{
    Building, BuildingCoordinate, BuildingDimension, BuildingDimensionRow, BuildingGeometryRow,
    BuildingRow, DimensionKind, DimensionRow, GroupCounts, SourceCount, TypeCount,
};
use crate::query::{CoordinateBox, Grouping};
use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::PgPool;

/// Schema migrations for the footprint tables.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const INSERT_GEOM_SOURCE: &str = "INSERT INTO geom_source (id, source) VALUES ($1, $2)";
const INSERT_STATE_TYPE: &str = "INSERT INTO state_type (id, type) VALUES ($1, $2)";
const INSERT_GEOM_TYPE: &str = "INSERT INTO geom_type (id, type) VALUES ($1, $2)";

/// PostgreSQL-backed store.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect eagerly; fails if the database cannot be reached.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = config
            .pool_options()
            .connect_with(config.connect_options()?)
            .await?;
        Ok(Self::new(pool))
    }

    /// Build a pool that opens connections on first use.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<Self> {
        let pool = config
            .pool_options()
            .connect_lazy_with(config.connect_options()?);
        Ok(Self::new(pool))
    }

    /// Apply pending schema migrations.
    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await?;
        tracing::info!("Schema migrations applied");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl FootprintSink for PgStore {
    async fn insert_dimension(&self, row: &DimensionRow) -> Result<()> {
        let statement = match row.kind {
            DimensionKind::GeometrySource => INSERT_GEOM_SOURCE,
            DimensionKind::LastStateType => INSERT_STATE_TYPE,
            DimensionKind::GeometryType => INSERT_GEOM_TYPE,
        };
        sqlx::query(statement)
            .bind(row.id.get())
            .bind(&row.label)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_building(&self, row: &BuildingRow) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO buildings (id, name, construct_year, geom_source, last_state_type)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(row.id)
        .bind(&row.name)
        .bind(row.construct_year)
        .bind(row.geom_source.get())
        .bind(row.last_state_type.get())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_building_dimension(&self, row: &BuildingDimensionRow) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO building_dimensions (building, ground_elevation, roof_height)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(row.building)
        .bind(row.ground_elevation)
        .bind(row.roof_height)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_building_geometry(&self, row: &BuildingGeometryRow) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO building_geom (building, geom, coordinate_x, coordinate_y)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(row.building)
        .bind(row.geom.get())
        .bind(row.coordinate_x)
        .bind(row.coordinate_y)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl BuildingRepository for PgStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn all_buildings(&self) -> Result<Vec<Building>> {
        let buildings = sqlx::query_as::<_, Building>(
            r#"
            SELECT id, name, construct_year
            FROM buildings
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(buildings)
    }

    async fn buildings_by_year(&self, year: i32) -> Result<Vec<Building>> {
        let buildings = sqlx::query_as::<_, Building>(
            r#"
            SELECT id, name, construct_year
            FROM buildings
            WHERE construct_year = $1
            ORDER BY id
            "#,
        )
        .bind(year)
        .fetch_all(&self.pool)
        .await?;
        Ok(buildings)
    }

    async fn building_dimensions(&self, id: i64) -> Result<Option<BuildingDimension>> {
        let building = sqlx::query_as::<_, BuildingDimension>(
            r#"
            SELECT b.id, b.name, b.construct_year, bd.ground_elevation, bd.roof_height
            FROM buildings AS b
            JOIN building_dimensions AS bd ON b.id = bd.building
            WHERE b.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(building)
    }

    async fn above_average_elevation(&self) -> Result<Vec<BuildingDimension>> {
        let buildings = sqlx::query_as::<_, BuildingDimension>(
            r#"
            SELECT b.id, b.name, b.construct_year, bd.ground_elevation, bd.roof_height
            FROM buildings AS b
            JOIN building_dimensions AS bd ON b.id = bd.building
            WHERE bd.ground_elevation > (
                SELECT avg(ground_elevation) FROM building_dimensions
            )
            ORDER BY b.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(buildings)
    }

    async fn count_by(&self, grouping: Grouping) -> Result<GroupCounts> {
        let counts = match grouping {
            Grouping::Source => GroupCounts::Source(
                sqlx::query_as::<_, SourceCount>(
                    r#"
                    SELECT gs.source, count(b.id) AS buildings
                    FROM buildings AS b
                    JOIN geom_source AS gs ON b.geom_source = gs.id
                    GROUP BY gs.id, gs.source
                    ORDER BY gs.source
                    "#,
                )
                .fetch_all(&self.pool)
                .await?,
            ),
            Grouping::Type => GroupCounts::Type(
                sqlx::query_as::<_, TypeCount>(
                    r#"
                    SELECT gt.type AS geom_type, count(bg.building) AS buildings
                    FROM geom_type AS gt
                    JOIN building_geom AS bg ON gt.id = bg.geom
                    GROUP BY gt.id, gt.type
                    ORDER BY gt.type
                    "#,
                )
                .fetch_all(&self.pool)
                .await?,
            ),
        };
        Ok(counts)
    }

    async fn count_in_range(&self, bounds: &CoordinateBox) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT count(b.id)
            FROM buildings AS b
            JOIN building_geom AS bg ON b.id = bg.building
            WHERE bg.coordinate_x BETWEEN $1 AND $2
              AND bg.coordinate_y BETWEEN $3 AND $4
            "#,
        )
        .bind(bounds.x_min)
        .bind(bounds.x_max)
        .bind(bounds.y_min)
        .bind(bounds.y_max)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn buildings_in_range(&self, bounds: &CoordinateBox) -> Result<Vec<BuildingCoordinate>> {
        let buildings = sqlx::query_as::<_, BuildingCoordinate>(
            r#"
            SELECT b.id, b.name, b.construct_year,
                   bd.ground_elevation, bd.roof_height,
                   gt.type AS geom_type, bg.coordinate_x, bg.coordinate_y
            FROM buildings AS b
            JOIN building_dimensions AS bd ON b.id = bd.building
            JOIN building_geom AS bg ON b.id = bg.building
            JOIN geom_type AS gt ON bg.geom = gt.id
            WHERE bg.coordinate_x BETWEEN $1 AND $2
              AND bg.coordinate_y BETWEEN $3 AND $4
            ORDER BY b.id
            "#,
        )
        .bind(bounds.x_min)
        .bind(bounds.x_max)
        .bind(bounds.y_min)
        .bind(bounds.y_max)
        .fetch_all(&self.pool)
        .await?;
        Ok(buildings)
    }
}
