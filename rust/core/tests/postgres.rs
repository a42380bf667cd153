// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ingestion and query tests against PostgreSQL.
//!
//! Each test gets a fresh database with the footprint migrations applied.
//! Run with: DATABASE_URL=postgres://... cargo test -p footprints-core --test postgres -- --ignored

use approx::assert_relative_eq;
use footprints_core::{
    execute, ingest, BuildingQuery, Error, FeedBatch, FootprintRecord, GroupCounts, IngestError,
    Normalizer, PgStore, QueryResponse, SourceCount, TypeCount,
};
use sqlx::PgPool;

fn record(id: i64, year: i32, elevation: f32, source: &str, geometry: &str) -> FootprintRecord {
    FootprintRecord {
        id,
        name: format!("B{id}"),
        construct_year: year,
        geometry_source: source.into(),
        ground_elevation: elevation,
        roof_height: elevation * 2.0,
        last_state_type: "Constructed".into(),
        geometry_type: geometry.into(),
        coordinate_x: -73.9,
        coordinate_y: 40.7,
    }
}

async fn store_with(pool: &PgPool, records: Vec<FootprintRecord>) -> PgStore {
    let store = PgStore::new(pool.clone());
    let batch = FeedBatch {
        records,
        rejected: Vec::new(),
    };
    let report = ingest(&store, &mut Normalizer::new(), &batch).await;
    assert!(report.is_clean(), "unexpected write errors: {:?}", report.errors);
    store
}

fn ids(response: &QueryResponse) -> Vec<i64> {
    match response {
        QueryResponse::Buildings(buildings) => buildings.iter().map(|b| b.id).collect(),
        QueryResponse::Elevated(buildings) => buildings.iter().map(|b| b.id).collect(),
        QueryResponse::Range(range) => range.buildings.iter().map(|b| b.id).collect(),
        other => panic!("response has no building list: {other:?}"),
    }
}

#[sqlx::test(migrator = "footprints_core::MIGRATOR")]
#[ignore = "needs DATABASE_URL"]
async fn test_dimension_ids_follow_first_occurrence(pool: PgPool) {
    store_with(
        &pool,
        vec![
            record(1, 2000, 10.0, "Photogrammetry", "Polygon"),
            record(2, 2000, 10.0, "DTM", "Polygon"),
            record(3, 2000, 10.0, "Photogrammetry", "MultiPolygon"),
        ],
    )
    .await;

    let sources: Vec<(i32, String)> =
        sqlx::query_as("SELECT id, source FROM geom_source ORDER BY id")
            .fetch_all(&pool)
            .await
            .unwrap();
    assert_eq!(
        sources,
        vec![(1, "Photogrammetry".to_string()), (2, "DTM".to_string())]
    );

    let types: Vec<(i32, String)> = sqlx::query_as("SELECT id, type FROM geom_type ORDER BY id")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(
        types,
        vec![(1, "Polygon".to_string()), (2, "MultiPolygon".to_string())]
    );
}

#[sqlx::test(migrator = "footprints_core::MIGRATOR")]
#[ignore = "needs DATABASE_URL"]
async fn test_dimensions_round_trip_and_not_found(pool: PgPool) {
    let mut building = record(42, 1990, 10.5, "DTM", "Polygon");
    building.name = "X".into();
    building.roof_height = 30.2;
    let store = store_with(&pool, vec![building]).await;

    let response = execute(&store, &BuildingQuery::Dimensions(42)).await.unwrap();
    let QueryResponse::Dimensions(dimension) = response else {
        panic!("expected a dimensions response");
    };
    assert_eq!(dimension.name, "X");
    assert_eq!(dimension.construct_year, 1990);
    assert_relative_eq!(dimension.ground_elevation, 10.5);
    assert_relative_eq!(dimension.roof_height, 30.2);

    let err = execute(&store, &BuildingQuery::Dimensions(43)).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[sqlx::test(migrator = "footprints_core::MIGRATOR")]
#[ignore = "needs DATABASE_URL"]
async fn test_year_filter_and_listing(pool: PgPool) {
    let store = store_with(
        &pool,
        vec![
            record(3, 2000, 10.0, "DTM", "Polygon"),
            record(1, 2000, 10.0, "DTM", "Polygon"),
            record(2, 1999, 10.0, "DTM", "Polygon"),
        ],
    )
    .await;

    let y2000 = execute(&store, &BuildingQuery::ByYear(2000)).await.unwrap();
    assert_eq!(ids(&y2000), vec![1, 3]);

    let all = execute(&store, &BuildingQuery::All).await.unwrap();
    assert_eq!(ids(&all), vec![1, 2, 3]);
}

#[sqlx::test(migrator = "footprints_core::MIGRATOR")]
#[ignore = "needs DATABASE_URL"]
async fn test_above_average_elevation(pool: PgPool) {
    let store = PgStore::new(pool.clone());
    let empty = execute(&store, &BuildingQuery::AboveAverageElevation)
        .await
        .unwrap();
    assert!(ids(&empty).is_empty());

    let store = store_with(
        &pool,
        vec![
            record(1, 2000, 10.0, "DTM", "Polygon"),
            record(2, 2000, 20.0, "DTM", "Polygon"),
            record(3, 2000, 30.0, "DTM", "Polygon"),
        ],
    )
    .await;
    let response = execute(&store, &BuildingQuery::AboveAverageElevation)
        .await
        .unwrap();
    assert_eq!(ids(&response), vec![3]);
}

#[sqlx::test(migrator = "footprints_core::MIGRATOR")]
#[ignore = "needs DATABASE_URL"]
async fn test_group_counts(pool: PgPool) {
    let store = store_with(
        &pool,
        vec![
            record(1, 2000, 10.0, "DTM", "Polygon"),
            record(2, 2000, 10.0, "Photogrammetry", "Polygon"),
            record(3, 2000, 10.0, "DTM", "MultiPolygon"),
        ],
    )
    .await;

    let by_source = execute(&store, &BuildingQuery::count_by("source").unwrap())
        .await
        .unwrap();
    assert_eq!(
        by_source,
        QueryResponse::Counts(GroupCounts::Source(vec![
            SourceCount {
                source: "DTM".into(),
                buildings: 2,
            },
            SourceCount {
                source: "Photogrammetry".into(),
                buildings: 1,
            },
        ]))
    );

    let by_type = execute(&store, &BuildingQuery::count_by("type").unwrap())
        .await
        .unwrap();
    assert_eq!(
        by_type,
        QueryResponse::Counts(GroupCounts::Type(vec![
            TypeCount {
                geom_type: "MultiPolygon".into(),
                buildings: 1,
            },
            TypeCount {
                geom_type: "Polygon".into(),
                buildings: 2,
            },
        ]))
    );
}

#[sqlx::test(migrator = "footprints_core::MIGRATOR")]
#[ignore = "needs DATABASE_URL"]
async fn test_range_filter_is_inclusive(pool: PgPool) {
    let store = store_with(&pool, vec![record(7, 2000, 10.0, "DTM", "Polygon")]).await;

    let inside = execute(&store, &BuildingQuery::in_range("-75,-70", "35,45").unwrap())
        .await
        .unwrap();
    let QueryResponse::Range(range) = &inside else {
        panic!("expected a range response");
    };
    assert_eq!(range.count, 1);
    assert_eq!(range.buildings[0].geom_type, "Polygon");

    let edge = execute(&store, &BuildingQuery::in_range("-73.9,-73.9", "40.7,40.7").unwrap())
        .await
        .unwrap();
    assert_eq!(ids(&edge), vec![7]);

    let outside = execute(&store, &BuildingQuery::in_range("-70,-60", "35,45").unwrap())
        .await
        .unwrap();
    let QueryResponse::Range(range) = &outside else {
        panic!("expected a range response");
    };
    assert_eq!(range.count, 0);
    assert!(range.buildings.is_empty());
}

#[sqlx::test(migrator = "footprints_core::MIGRATOR")]
#[ignore = "needs DATABASE_URL"]
async fn test_duplicate_building_is_rejected_by_constraints(pool: PgPool) {
    let store = PgStore::new(pool.clone());
    let batch = FeedBatch {
        records: vec![
            record(1, 2000, 10.0, "DTM", "Polygon"),
            record(1, 2001, 11.0, "DTM", "Polygon"),
        ],
        rejected: Vec::new(),
    };
    let report = ingest(&store, &mut Normalizer::new(), &batch).await;

    assert_eq!(report.complete, 1);
    assert!(matches!(
        report.errors[0],
        IngestError::BuildingInsert { building: 1, .. }
    ));

    let year: i32 = sqlx::query_scalar("SELECT construct_year FROM buildings WHERE id = 1")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(year, 2000);
}
