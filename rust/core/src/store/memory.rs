// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-process store with the same constraints and query semantics as the
//! PostgreSQL schema.

use super::{BuildingRepository, FootprintSink};
use crate::error::{Error, Result};
use crate::model::{
    Building, BuildingCoordinate, BuildingDimension, BuildingDimensionRow, BuildingGeometryRow,
    BuildingRow, DimensionKind, DimensionRow, GroupCounts, SourceCount, TypeCount,
};
use crate::query::{CoordinateBox, Grouping};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    geom_source: BTreeMap<i32, String>,
    state_type: BTreeMap<i32, String>,
    geom_type: BTreeMap<i32, String>,
    buildings: BTreeMap<i64, BuildingRow>,
    building_dimensions: BTreeMap<i64, BuildingDimensionRow>,
    building_geom: BTreeMap<i64, BuildingGeometryRow>,
}

impl Tables {
    fn dimension(&self, kind: DimensionKind) -> &BTreeMap<i32, String> {
        match kind {
            DimensionKind::GeometrySource => &self.geom_source,
            DimensionKind::LastStateType => &self.state_type,
            DimensionKind::GeometryType => &self.geom_type,
        }
    }

    fn dimension_mut(&mut self, kind: DimensionKind) -> &mut BTreeMap<i32, String> {
        match kind {
            DimensionKind::GeometrySource => &mut self.geom_source,
            DimensionKind::LastStateType => &mut self.state_type,
            DimensionKind::GeometryType => &mut self.geom_type,
        }
    }

    fn building(&self, row: &BuildingRow) -> Building {
        Building {
            id: row.id,
            name: row.name.clone(),
            construct_year: row.construct_year,
        }
    }

    fn with_dimensions(&self, row: &BuildingRow) -> Option<BuildingDimension> {
        let dimensions = self.building_dimensions.get(&row.id)?;
        Some(BuildingDimension {
            id: row.id,
            name: row.name.clone(),
            construct_year: row.construct_year,
            ground_elevation: dimensions.ground_elevation,
            roof_height: dimensions.roof_height,
        })
    }
}

fn duplicate_key(table: &str, key: impl std::fmt::Display) -> Error {
    Error::QueryExecution(format!(
        "duplicate key value violates unique constraint \"{table}_pkey\": ({key})"
    ))
}

fn missing_reference(table: &str, column: &str, key: impl std::fmt::Display) -> Error {
    Error::QueryExecution(format!(
        "insert on table \"{table}\" violates foreign key on \"{column}\": ({key}) is not present"
    ))
}

/// Store backed by ordered in-memory tables.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Row counts of `buildings`, `building_dimensions` and `building_geom`.
    pub async fn row_counts(&self) -> (usize, usize, usize) {
        let tables = self.tables.read().await;
        (
            tables.buildings.len(),
            tables.building_dimensions.len(),
            tables.building_geom.len(),
        )
    }

    /// Contents of one dimension table ordered by id.
    pub async fn dimension_labels(&self, kind: DimensionKind) -> Vec<(i32, String)> {
        let tables = self.tables.read().await;
        tables
            .dimension(kind)
            .iter()
            .map(|(&id, label)| (id, label.clone()))
            .collect()
    }
}

#[async_trait]
impl FootprintSink for MemoryStore {
    async fn insert_dimension(&self, row: &DimensionRow) -> Result<()> {
        let mut tables = self.tables.write().await;
        let table = tables.dimension_mut(row.kind);
        if table.contains_key(&row.id.get()) {
            return Err(duplicate_key(row.kind.table(), row.id));
        }
        if table.values().any(|label| *label == row.label) {
            return Err(duplicate_key(row.kind.table(), &row.label));
        }
        table.insert(row.id.get(), row.label.clone());
        Ok(())
    }

    async fn insert_building(&self, row: &BuildingRow) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.buildings.contains_key(&row.id) {
            return Err(duplicate_key("buildings", row.id));
        }
        if !tables.geom_source.contains_key(&row.geom_source.get()) {
            return Err(missing_reference("buildings", "geom_source", row.geom_source));
        }
        if !tables.state_type.contains_key(&row.last_state_type.get()) {
            return Err(missing_reference(
                "buildings",
                "last_state_type",
                row.last_state_type,
            ));
        }
        tables.buildings.insert(row.id, row.clone());
        Ok(())
    }

    async fn insert_building_dimension(&self, row: &BuildingDimensionRow) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.building_dimensions.contains_key(&row.building) {
            return Err(duplicate_key("building_dimensions", row.building));
        }
        if !tables.buildings.contains_key(&row.building) {
            return Err(missing_reference(
                "building_dimensions",
                "building",
                row.building,
            ));
        }
        tables.building_dimensions.insert(row.building, row.clone());
        Ok(())
    }

    async fn insert_building_geometry(&self, row: &BuildingGeometryRow) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.building_geom.contains_key(&row.building) {
            return Err(duplicate_key("building_geom", row.building));
        }
        if !tables.buildings.contains_key(&row.building) {
            return Err(missing_reference("building_geom", "building", row.building));
        }
        if !tables.geom_type.contains_key(&row.geom.get()) {
            return Err(missing_reference("building_geom", "geom", row.geom));
        }
        tables.building_geom.insert(row.building, row.clone());
        Ok(())
    }
}

#[async_trait]
impl BuildingRepository for MemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn all_buildings(&self) -> Result<Vec<Building>> {
        let tables = self.tables.read().await;
        Ok(tables
            .buildings
            .values()
            .map(|row| tables.building(row))
            .collect())
    }

    async fn buildings_by_year(&self, year: i32) -> Result<Vec<Building>> {
        let tables = self.tables.read().await;
        Ok(tables
            .buildings
            .values()
            .filter(|row| row.construct_year == year)
            .map(|row| tables.building(row))
            .collect())
    }

    async fn building_dimensions(&self, id: i64) -> Result<Option<BuildingDimension>> {
        let tables = self.tables.read().await;
        Ok(tables
            .buildings
            .get(&id)
            .and_then(|row| tables.with_dimensions(row)))
    }

    async fn above_average_elevation(&self) -> Result<Vec<BuildingDimension>> {
        let tables = self.tables.read().await;
        let elevations = &tables.building_dimensions;
        if elevations.is_empty() {
            return Ok(Vec::new());
        }

        let average = elevations
            .values()
            .map(|row| f64::from(row.ground_elevation))
            .sum::<f64>()
            / elevations.len() as f64;

        Ok(tables
            .buildings
            .values()
            .filter_map(|row| tables.with_dimensions(row))
            .filter(|building| f64::from(building.ground_elevation) > average)
            .collect())
    }

    async fn count_by(&self, grouping: Grouping) -> Result<GroupCounts> {
        let tables = self.tables.read().await;
        let mut counts: BTreeMap<i32, i64> = BTreeMap::new();

        let (labels, references): (&BTreeMap<i32, String>, Vec<i32>) = match grouping {
            Grouping::Source => (
                &tables.geom_source,
                tables
                    .buildings
                    .values()
                    .map(|row| row.geom_source.get())
                    .collect(),
            ),
            Grouping::Type => (
                &tables.geom_type,
                tables
                    .building_geom
                    .values()
                    .map(|row| row.geom.get())
                    .collect(),
            ),
        };
        for id in references {
            *counts.entry(id).or_default() += 1;
        }

        let mut rows: Vec<(String, i64)> = counts
            .into_iter()
            .filter_map(|(id, buildings)| Some((labels.get(&id)?.clone(), buildings)))
            .collect();
        rows.sort();

        Ok(match grouping {
            Grouping::Source => GroupCounts::Source(
                rows.into_iter()
                    .map(|(source, buildings)| SourceCount { source, buildings })
                    .collect(),
            ),
            Grouping::Type => GroupCounts::Type(
                rows.into_iter()
                    .map(|(geom_type, buildings)| TypeCount {
                        geom_type,
                        buildings,
                    })
                    .collect(),
            ),
        })
    }

    async fn count_in_range(&self, bounds: &CoordinateBox) -> Result<i64> {
        let tables = self.tables.read().await;
        let count = tables
            .building_geom
            .values()
            .filter(|geom| tables.buildings.contains_key(&geom.building))
            .filter(|geom| bounds.contains(geom.coordinate_x, geom.coordinate_y))
            .count();
        Ok(count as i64)
    }

    async fn buildings_in_range(&self, bounds: &CoordinateBox) -> Result<Vec<BuildingCoordinate>> {
        let tables = self.tables.read().await;
        Ok(tables
            .buildings
            .values()
            .filter_map(|row| {
                let dimensions = tables.with_dimensions(row)?;
                let geom = tables.building_geom.get(&row.id)?;
                if !bounds.contains(geom.coordinate_x, geom.coordinate_y) {
                    return None;
                }
                let geom_type = tables.geom_type.get(&geom.geom.get())?;
                Some(BuildingCoordinate {
                    id: dimensions.id,
                    name: dimensions.name,
                    construct_year: dimensions.construct_year,
                    ground_elevation: dimensions.ground_elevation,
                    roof_height: dimensions.roof_height,
                    geom_type: geom_type.clone(),
                    coordinate_x: geom.coordinate_x,
                    coordinate_y: geom.coordinate_y,
                })
            })
            .collect())
    }
}
