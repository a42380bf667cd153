// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ingestion pass: normalize each record and write its rows.
//!
//! Every write is independent. A failed write is logged, recorded in the
//! [`IngestReport`], and the pass moves on to the next write.

use crate::error::IngestError;
use crate::feed::FeedBatch;
use crate::model::DimensionKind;
use crate::normalize::Normalizer;
use crate::store::FootprintSink;
use std::time::Instant;

/// Outcome of an ingestion pass.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Records processed.
    pub records: usize,
    /// Feed elements rejected at decode.
    pub rejected: usize,
    /// Records whose building, dimensions and geometry rows were all written.
    pub complete: usize,
    /// Dimension labels allocated, per kind, in source/state/geometry order.
    pub dimension_labels: [usize; 3],
    /// Failed writes, in the order they happened.
    pub errors: Vec<IngestError>,
    /// Wall time of the pass in milliseconds.
    pub elapsed_ms: u64,
}

impl IngestReport {
    pub fn failed_writes(&self) -> usize {
        self.errors.len()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Write the records of `batch` to `sink` in order, using `normalizer` for
/// dimension ids.
pub async fn ingest<S>(sink: &S, normalizer: &mut Normalizer, batch: &FeedBatch) -> IngestReport
where
    S: FootprintSink + ?Sized,
{
    let start = Instant::now();
    let mut report = IngestReport {
        rejected: batch.rejected.len(),
        ..IngestReport::default()
    };

    for record in &batch.records {
        let rows = normalizer.normalize(record);
        report.records += 1;

        for dimension in &rows.new_dimensions {
            if let Err(source) = sink.insert_dimension(dimension).await {
                tracing::warn!(
                    kind = %dimension.kind,
                    id = dimension.id.get(),
                    label = %dimension.label,
                    error = %source,
                    "Dimension insert failed"
                );
                report.errors.push(IngestError::DimensionInsert {
                    kind: dimension.kind,
                    label: dimension.label.clone(),
                    source,
                });
            }
        }

        let building = record.id;
        let mut complete = true;

        if let Err(source) = sink.insert_building(&rows.building).await {
            tracing::warn!(building, error = %source, "Building insert failed");
            report.errors.push(IngestError::BuildingInsert { building, source });
            complete = false;
        }

        if let Err(source) = sink.insert_building_dimension(&rows.dimensions).await {
            tracing::warn!(building, error = %source, "Building dimension insert failed");
            report.errors.push(IngestError::DimensionRowInsert { building, source });
            complete = false;
        }

        if let Err(source) = sink.insert_building_geometry(&rows.geometry).await {
            tracing::warn!(building, error = %source, "Building geometry insert failed");
            report.errors.push(IngestError::GeometryInsert { building, source });
            complete = false;
        }

        if complete {
            report.complete += 1;
        }
    }

    for (slot, kind) in DimensionKind::ALL.into_iter().enumerate() {
        report.dimension_labels[slot] = normalizer.index(kind).len();
    }
    report.elapsed_ms = start.elapsed().as_millis() as u64;

    tracing::info!(
        records = report.records,
        rejected = report.rejected,
        complete = report.complete,
        failed_writes = report.failed_writes(),
        geom_sources = report.dimension_labels[0],
        state_types = report.dimension_labels[1],
        geom_types = report.dimension_labels[2],
        elapsed_ms = report.elapsed_ms,
        "Ingestion pass finished"
    );

    report
}
