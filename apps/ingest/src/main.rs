// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Footprints Ingest - one-shot load of the building footprint feed.
//!
//! Downloads the feed, normalizes every decodable record and writes the rows
//! in feed order. Individual write failures are logged and counted; only a
//! failed download or an unreachable database stops the run.

use anyhow::Context;
use footprints_core::{ingest, Normalizer, PgStore};
use std::time::Duration;

mod config;
mod feed;

use config::Config;
use feed::FeedClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    // Initialize logging
    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info,footprints_ingest=debug,sqlx=warn".into());
    if config.log_json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).pretty().init();
    }

    tracing::info!(
        feed_url = %config.feed_url,
        db_host = %config.database.host,
        db_name = %config.database.name,
        "Starting Footprints Ingest"
    );

    let client = FeedClient::new(
        &config.feed_url,
        config.feed_limit,
        Duration::from_secs(config.fetch_timeout_secs),
    )?;
    let batch = client.fetch().await.context("feed download failed")?;
    tracing::info!(
        records = batch.records.len(),
        rejected = batch.rejected.len(),
        "Feed decoded"
    );

    let store = PgStore::connect(&config.database)
        .await
        .context("database unreachable")?;
    if config.run_migrations {
        store.migrate().await.context("schema migration failed")?;
    }

    let mut normalizer = Normalizer::new();
    let report = ingest(&store, &mut normalizer, &batch).await;

    if report.is_clean() {
        tracing::info!(
            records = report.records,
            rejected = report.rejected,
            "Ingest complete"
        );
    } else {
        tracing::warn!(
            records = report.records,
            complete = report.complete,
            rejected = report.rejected,
            failed_writes = report.failed_writes(),
            "Ingest finished with failed writes"
        );
    }

    store.close().await;
    Ok(())
}
