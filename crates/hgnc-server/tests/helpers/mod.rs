//! Shared setup for the integration tests
#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use hgnc_server::db::{create_pool, DbConfig};
use hgnc_server::ingest::{HgncPipeline, ImportConfig, ImportSummary};
use serde_json::Value;
use sqlx::SqlitePool;
use std::path::PathBuf;

pub const GENE_COUNT: i64 = 3;
pub const ORTHOLOGS_MATCHED: usize = 7;
pub const ORTHOLOGS_UNMATCHED: usize = 1;

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

pub async fn memory_pool() -> SqlitePool {
    create_pool(&DbConfig::new("sqlite::memory:"))
        .await
        .expect("in-memory pool")
}

pub fn fixture_config(low_memory: bool) -> ImportConfig {
    ImportConfig::builder()
        .hgnc_json_path(fixture("hgnc_test.json"))
        .hcop_path(fixture("hcop_test.txt"))
        .low_memory(low_memory)
        .silent(true)
        .build()
}

pub async fn import(pool: &SqlitePool, config: ImportConfig) -> ImportSummary {
    HgncPipeline::new(pool.clone(), config)
        .run()
        .await
        .expect("fixture import")
}

/// A pool holding the three fixture genes and their orthologs
pub async fn imported_pool() -> SqlitePool {
    let pool = memory_pool().await;
    import(&pool, fixture_config(false)).await;
    pool
}

/// Every row of `table` as JSON, ordered by the given columns
pub async fn dump_table(pool: &SqlitePool, table: &str, order_by: &str) -> Vec<Value> {
    let columns: Vec<String> = sqlx::query_scalar(&format!(
        "SELECT name FROM pragma_table_info('{}') ORDER BY cid",
        table
    ))
    .fetch_all(pool)
    .await
    .unwrap();

    let pairs = columns
        .iter()
        .map(|c| format!("'{0}', {0}", c))
        .collect::<Vec<_>>()
        .join(", ");
    let rows: Vec<String> = sqlx::query_scalar(&format!(
        "SELECT json_object({}) FROM {} ORDER BY {}",
        pairs, table, order_by
    ))
    .fetch_all(pool)
    .await
    .unwrap();

    rows.iter().map(|row| serde_json::from_str(row).unwrap()).collect()
}
