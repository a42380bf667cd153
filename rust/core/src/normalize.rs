// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversion of feed records into the four-table relational form.

use crate::dimension::{DimensionIndex, Resolution};
use crate::feed::FootprintRecord;
use crate::model::{
    BuildingDimensionRow, BuildingGeometryRow, BuildingRow, DimensionKind, DimensionRow,
};

/// Rows produced for one footprint record.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedFootprint {
    /// Dimension labels first seen in this record, in source, state type,
    /// geometry type order.
    pub new_dimensions: Vec<DimensionRow>,
    pub building: BuildingRow,
    pub dimensions: BuildingDimensionRow,
    pub geometry: BuildingGeometryRow,
}

/// Owns the label -> id maps for one ingestion run.
///
/// Records must be fed in encounter order; ids depend on it.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    sources: DimensionIndex,
    state_types: DimensionIndex,
    geometry_types: DimensionIndex,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self, kind: DimensionKind) -> &DimensionIndex {
        match kind {
            DimensionKind::GeometrySource => &self.sources,
            DimensionKind::LastStateType => &self.state_types,
            DimensionKind::GeometryType => &self.geometry_types,
        }
    }

    fn index_mut(&mut self, kind: DimensionKind) -> &mut DimensionIndex {
        match kind {
            DimensionKind::GeometrySource => &mut self.sources,
            DimensionKind::LastStateType => &mut self.state_types,
            DimensionKind::GeometryType => &mut self.geometry_types,
        }
    }

    fn resolve(
        &mut self,
        kind: DimensionKind,
        label: &str,
        new_dimensions: &mut Vec<DimensionRow>,
    ) -> Resolution {
        let resolution = self.index_mut(kind).resolve(label);
        if let Resolution::New(id) = resolution {
            tracing::trace!(%kind, id = id.get(), label, "New dimension label");
            new_dimensions.push(DimensionRow {
                kind,
                id,
                label: label.to_owned(),
            });
        }
        resolution
    }

    /// Normalize one record, allocating ids for unseen labels.
    pub fn normalize(&mut self, record: &FootprintRecord) -> NormalizedFootprint {
        let mut new_dimensions = Vec::new();

        let source = self.resolve(
            DimensionKind::GeometrySource,
            &record.geometry_source,
            &mut new_dimensions,
        );
        let state_type = self.resolve(
            DimensionKind::LastStateType,
            &record.last_state_type,
            &mut new_dimensions,
        );
        let geometry_type = self.resolve(
            DimensionKind::GeometryType,
            &record.geometry_type,
            &mut new_dimensions,
        );

        NormalizedFootprint {
            new_dimensions,
            building: BuildingRow {
                id: record.id,
                name: record.name.clone(),
                construct_year: record.construct_year,
                geom_source: source.id(),
                last_state_type: state_type.id(),
            },
            dimensions: BuildingDimensionRow {
                building: record.id,
                ground_elevation: record.ground_elevation,
                roof_height: record.roof_height,
            },
            geometry: BuildingGeometryRow {
                building: record.id,
                geom: geometry_type.id(),
                coordinate_x: record.coordinate_x,
                coordinate_y: record.coordinate_y,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::DimensionId;

    fn record(id: i64, source: &str, state: &str, geometry: &str) -> FootprintRecord {
        FootprintRecord {
            id,
            name: format!("building {id}"),
            construct_year: 1950,
            geometry_source: source.into(),
            ground_elevation: 12.0,
            roof_height: 40.0,
            last_state_type: state.into(),
            geometry_type: geometry.into(),
            coordinate_x: -73.9,
            coordinate_y: 40.7,
        }
    }

    fn id(raw: i32) -> DimensionId {
        DimensionId::new(raw).unwrap()
    }

    #[test]
    fn test_first_record_allocates_all_three_dimensions() {
        let mut normalizer = Normalizer::new();
        let rows = normalizer.normalize(&record(1, "Photogrammetry", "Constructed", "Polygon"));

        let kinds: Vec<_> = rows.new_dimensions.iter().map(|row| row.kind).collect();
        assert_eq!(kinds, DimensionKind::ALL.to_vec());
        assert!(rows.new_dimensions.iter().all(|row| row.id == DimensionId::FIRST));
        assert_eq!(rows.building.geom_source, DimensionId::FIRST);
        assert_eq!(rows.building.last_state_type, DimensionId::FIRST);
        assert_eq!(rows.geometry.geom, DimensionId::FIRST);
    }

    #[test]
    fn test_counters_are_independent_per_dimension() {
        let mut normalizer = Normalizer::new();
        normalizer.normalize(&record(1, "Photogrammetry", "Constructed", "Polygon"));
        let rows = normalizer.normalize(&record(2, "DTM", "Constructed", "MultiPolygon"));

        assert_eq!(
            rows.new_dimensions,
            vec![
                DimensionRow {
                    kind: DimensionKind::GeometrySource,
                    id: id(2),
                    label: "DTM".into(),
                },
                DimensionRow {
                    kind: DimensionKind::GeometryType,
                    id: id(2),
                    label: "MultiPolygon".into(),
                },
            ]
        );
        assert_eq!(rows.building.last_state_type, id(1));
    }

    #[test]
    fn test_repeated_labels_emit_no_dimension_rows() {
        let mut normalizer = Normalizer::new();
        normalizer.normalize(&record(1, "DTM", "Constructed", "Polygon"));
        let rows = normalizer.normalize(&record(2, "DTM", "Constructed", "Polygon"));

        assert!(rows.new_dimensions.is_empty());
        assert_eq!(normalizer.index(DimensionKind::GeometrySource).len(), 1);
    }

    #[test]
    fn test_rows_carry_record_values() {
        let mut normalizer = Normalizer::new();
        let rows = normalizer.normalize(&record(42, "DTM", "Demolition", "Polygon"));

        assert_eq!(rows.building.id, 42);
        assert_eq!(rows.building.name, "building 42");
        assert_eq!(rows.building.construct_year, 1950);
        assert_eq!(rows.dimensions.building, 42);
        assert_eq!(rows.dimensions.ground_elevation, 12.0);
        assert_eq!(rows.dimensions.roof_height, 40.0);
        assert_eq!(rows.geometry.building, 42);
        assert_eq!(rows.geometry.coordinate_x, -73.9);
        assert_eq!(rows.geometry.coordinate_y, 40.7);
    }
}
