// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Relational rows written by the ingestor and projections returned by queries.

use crate::dimension::DimensionId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three lookup dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DimensionKind {
    GeometrySource,
    LastStateType,
    GeometryType,
}

impl DimensionKind {
    pub const ALL: [DimensionKind; 3] = [
        DimensionKind::GeometrySource,
        DimensionKind::LastStateType,
        DimensionKind::GeometryType,
    ];

    /// Table holding this dimension.
    pub fn table(self) -> &'static str {
        match self {
            DimensionKind::GeometrySource => "geom_source",
            DimensionKind::LastStateType => "state_type",
            DimensionKind::GeometryType => "geom_type",
        }
    }
}

impl fmt::Display for DimensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// A newly allocated lookup label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionRow {
    pub kind: DimensionKind,
    pub id: DimensionId,
    pub label: String,
}

/// Row of `buildings`.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingRow {
    pub id: i64,
    pub name: String,
    pub construct_year: i32,
    pub geom_source: DimensionId,
    pub last_state_type: DimensionId,
}

/// Row of `building_dimensions`.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingDimensionRow {
    pub building: i64,
    pub ground_elevation: f32,
    pub roof_height: f32,
}

/// Row of `building_geom`.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingGeometryRow {
    pub building: i64,
    pub geom: DimensionId,
    pub coordinate_x: f32,
    pub coordinate_y: f32,
}

/// Building identity and construction year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    pub id: i64,
    pub name: String,
    pub construct_year: i32,
}

/// Building joined with its elevation and roof height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BuildingDimension {
    pub id: i64,
    pub name: String,
    pub construct_year: i32,
    pub ground_elevation: f32,
    pub roof_height: f32,
}

/// Number of buildings per geometry source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SourceCount {
    pub source: String,
    pub buildings: i64,
}

/// Number of buildings per geometry type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TypeCount {
    pub geom_type: String,
    pub buildings: i64,
}

/// Grouped counts, shaped by the selected dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum GroupCounts {
    Source(Vec<SourceCount>),
    Type(Vec<TypeCount>),
}

/// Building with dimensions, geometry type and planar coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BuildingCoordinate {
    pub id: i64,
    pub name: String,
    pub construct_year: i32,
    pub ground_elevation: f32,
    pub roof_height: f32,
    pub geom_type: String,
    #[serde(rename = "xCoordinate")]
    pub coordinate_x: f32,
    #[serde(rename = "yCoordinate")]
    pub coordinate_y: f32,
}

/// Buildings inside a coordinate box.
///
/// `count` comes from the geometry table alone and can exceed
/// `buildings.len()` when a building lacks a dimensions row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeResult {
    pub count: i64,
    pub buildings: Vec<BuildingCoordinate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_building_serializes_camel_case() {
        let building = Building {
            id: 42,
            name: "X".into(),
            construct_year: 1990,
        };
        let json = serde_json::to_value(&building).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "id": 42, "name": "X", "constructYear": 1990 })
        );
    }

    #[test]
    fn test_coordinate_field_names() {
        let building = BuildingCoordinate {
            id: 1,
            name: String::new(),
            construct_year: 2000,
            ground_elevation: 1.0,
            roof_height: 2.0,
            geom_type: "Polygon".into(),
            coordinate_x: -73.5,
            coordinate_y: 40.5,
        };
        let json = serde_json::to_value(&building).unwrap();
        assert_eq!(json["geomType"], "Polygon");
        assert_eq!(json["xCoordinate"], -73.5);
        assert_eq!(json["yCoordinate"], 40.5);
        assert_eq!(json["groundElevation"], 1.0);
    }

    #[test]
    fn test_group_counts_serialize_as_plain_arrays() {
        let counts = GroupCounts::Type(vec![TypeCount {
            geom_type: "Polygon".into(),
            buildings: 3,
        }]);
        let json = serde_json::to_value(&counts).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{ "geomType": "Polygon", "buildings": 3 }])
        );
    }
}
