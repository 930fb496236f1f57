//! Batch sync pipeline: warehouse extract, file export, SQLite load.
//!
//! One `run` rebuilds the whole snapshot. There is no incremental path; the
//! dataset is small enough that a full rebuild takes seconds.

use std::path::Path;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::database::WarehouseClient;

pub mod export;
pub mod extract;
pub mod load;

pub use extract::Extracted;
pub use load::LoadSummary;

/// Open (or create) the snapshot file for writing. The facade opens the same
/// file read-only; the sync job is the only writer.
pub async fn open_snapshot_for_write(path: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open snapshot for writing at {path}"))
}

pub async fn run(
    warehouse: &WarehouseClient,
    pool: &SqlitePool,
    export_dir: &Path,
) -> Result<LoadSummary> {
    tracing::info!("Starting snapshot sync");
    let extracted = extract::extract(warehouse).await?;

    export::export_all(&extracted, export_dir)?;

    load::create_schema(pool).await?;
    load::load_snapshot(pool, &extracted).await?;
    load::create_indexes(pool).await?;

    let summary = load::summary(pool).await?;
    tracing::info!(?summary, "Snapshot sync complete");
    Ok(summary)
}
