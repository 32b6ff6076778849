// HGNC Pipeline Orchestration
//
// 1. Reset the schema
// 2. Fetch and parse the HGNC document
// 3. Normalize and store genes
// 4. Load ortholog predictions against the stored genes
// 5. Count rows and commit
//
// All steps share one transaction: a failed run leaves the previous snapshot.

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::dedup::IdSequence;
use super::models::{HcopRow, RawGeneRecord};
use super::normalizer::Normalizer;
use super::parser::{hcop_int, hcop_text, parse_hcop, parse_hgnc_document, parse_prefixed_id};
use super::storage::{HgncStorage, StagedBatch};
use super::{HgncDownloader, ImportConfig, ImportError, Result};
use crate::db::schema;
use crate::models::OrthologyPrediction;

const TOTAL_STEPS: usize = 5;

/// Outcome of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    /// Gene records imported
    pub genes: usize,
    pub orthologs_inserted: usize,
    /// HCOP rows whose gene is not in the imported set
    pub orthologs_skipped: usize,
    pub table_counts: BTreeMap<String, i64>,
    pub low_memory: bool,
    pub elapsed: Duration,
}

impl ImportSummary {
    /// Row count of `table`, 0 for unknown tables
    pub fn count(&self, table: &str) -> i64 {
        self.table_counts.get(table).copied().unwrap_or(0)
    }
}

/// HGNC ingestion pipeline
pub struct HgncPipeline {
    pool: SqlitePool,
    config: ImportConfig,
    storage: HgncStorage,
}

impl HgncPipeline {
    pub fn new(pool: SqlitePool, config: ImportConfig) -> Self {
        let storage = HgncStorage::with_chunk_sizes(
            config.gene_chunk_size,
            config.row_chunk_size,
            config.ortholog_chunk_size,
        );
        Self {
            pool,
            config,
            storage,
        }
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Replace the stored snapshot with a fresh import
    pub async fn run(&self) -> Result<ImportSummary> {
        let started = Instant::now();
        info!(
            low_memory = self.config.low_memory,
            skip_orthology = self.config.skip_orthology,
            "Starting HGNC import"
        );

        let downloader = HgncDownloader::new(self.config.clone()).map_err(abort("configure"))?;
        let mut tx = self.pool.begin().await.map_err(abort("connect"))?;

        // 1. Reset
        info!("Step 1/{}: Resetting schema...", TOTAL_STEPS);
        schema::reset(&mut tx).await.map_err(abort("reset schema"))?;

        // 2. Fetch and parse
        info!("Step 2/{}: Fetching HGNC document from {}...", TOTAL_STEPS, self.config.hgnc_source());
        let json = downloader.fetch_hgnc_json().await.map_err(abort("download"))?;
        let docs = parse_hgnc_document(&json).map_err(abort("parse"))?;
        drop(json);
        info!("Parsed {} HGNC records", docs.len());

        // 3. Genes
        info!("Step 3/{}: Normalizing and storing {} records...", TOTAL_STEPS, docs.len());
        let genes = self
            .store_genes(&mut tx, &docs)
            .await
            .map_err(abort("store genes"))?;
        drop(docs);

        // 4. Orthologs
        let (orthologs_inserted, orthologs_skipped) = if self.config.skip_orthology {
            info!("Step 4/{}: Skipping ortholog predictions", TOTAL_STEPS);
            (0, 0)
        } else {
            info!("Step 4/{}: Loading ortholog predictions from {}...", TOTAL_STEPS, self.config.hcop_source());
            let hcop = downloader.fetch_hcop().await.map_err(abort("download"))?;
            self.store_orthologs(&mut tx, &hcop)
                .await
                .map_err(abort("store orthologs"))?
        };

        // 5. Counts
        info!("Step 5/{}: Counting rows and committing...", TOTAL_STEPS);
        let table_counts = schema::table_counts(&mut tx).await.map_err(abort("count rows"))?;
        tx.commit().await.map_err(abort("commit"))?;

        let summary = ImportSummary {
            genes,
            orthologs_inserted,
            orthologs_skipped,
            table_counts,
            low_memory: self.config.low_memory,
            elapsed: started.elapsed(),
        };

        info!(
            genes = summary.genes,
            orthologs = summary.orthologs_inserted,
            skipped = summary.orthologs_skipped,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "HGNC import completed"
        );

        Ok(summary)
    }

    async fn store_genes(&self, conn: &mut SqliteConnection, docs: &[RawGeneRecord]) -> Result<usize> {
        let progress = self.progress_bar(docs.len() as u64, "Importing HGNC records");
        let mut normalizer = Normalizer::new();
        let mut batch = StagedBatch::new();

        for raw in docs {
            let record = normalizer.normalize(raw)?;
            batch.stage(record);

            if self.config.low_memory {
                self.flush(conn, &mut batch, &mut normalizer).await?;
            }
            progress.inc(1);
        }
        self.flush(conn, &mut batch, &mut normalizer).await?;
        progress.finish_and_clear();

        Ok(normalizer.genes() as usize)
    }

    async fn flush(
        &self,
        conn: &mut SqliteConnection,
        batch: &mut StagedBatch,
        normalizer: &mut Normalizer,
    ) -> Result<()> {
        batch.take_shared(normalizer.cache_mut());
        if batch.is_empty() {
            return Ok(());
        }
        let staged = std::mem::take(batch);
        self.storage.write_batch(conn, &staged).await
    }

    /// Second phase: resolve every HCOP row's gene through the stored identifiers
    async fn store_orthologs(&self, conn: &mut SqliteConnection, bytes: &[u8]) -> Result<(usize, usize)> {
        let identifiers = self.storage.identifier_map(conn).await?;
        debug!("Resolving orthologs against {} genes", identifiers.len());

        let chunk_size = self.config.ortholog_chunk_size.max(1);
        let progress = self.spinner("Loading ortholog predictions");
        let mut ids = IdSequence::default();
        let mut pending = Vec::with_capacity(chunk_size);
        let mut inserted = 0;
        let mut skipped = 0;

        for row in parse_hcop(bytes)? {
            let row = row?;
            match resolve_gene(&row, &identifiers)? {
                Some(gene_id) => pending.push(to_prediction(&row, ids.next_id(), gene_id)?),
                None => {
                    debug!(hgnc_id = %row.hgnc_id, "Skipping ortholog for unknown gene");
                    skipped += 1;
                },
            }

            if pending.len() >= chunk_size {
                inserted += self.storage.insert_orthologs(conn, &pending).await?;
                pending.clear();
                progress.set_position(inserted as u64);
            }
        }
        inserted += self.storage.insert_orthologs(conn, &pending).await?;
        progress.finish_and_clear();

        if skipped > 0 {
            warn!("Skipped {} HCOP rows referencing genes outside the imported set", skipped);
        }
        info!("Stored {} ortholog predictions", inserted);

        Ok((inserted, skipped))
    }

    fn progress_bar(&self, len: u64, message: &str) -> ProgressBar {
        if self.config.silent {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::with_template(
            "{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
        ) {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message(message.to_string());
        pb
    }

    fn spinner(&self, message: &str) -> ProgressBar {
        if self.config.silent {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg} ({pos} rows)") {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb
    }
}

fn abort<E: Into<ImportError>>(step: &'static str) -> impl FnOnce(E) -> ImportError {
    move |err| ImportError::Aborted {
        step,
        source: Box::new(err.into()),
    }
}

/// Gene id for the row's `HGNC:<n>` cell, `None` when blank or unknown
fn resolve_gene(row: &HcopRow, identifiers: &HashMap<i64, i64>) -> Result<Option<i64>> {
    match hcop_text(&row.hgnc_id) {
        None => Ok(None),
        Some(hgnc_id) => {
            let identifier = parse_prefixed_id(&hgnc_id)?;
            Ok(identifiers.get(&identifier).copied())
        },
    }
}

fn to_prediction(row: &HcopRow, id: i64, hgnc_id: i64) -> Result<OrthologyPrediction> {
    Ok(OrthologyPrediction {
        id,
        ortholog_species: hcop_int("ortholog_species", &row.ortholog_species)?,
        human_entrez_gene: hcop_int("human_entrez_gene", &row.human_entrez_gene)?,
        human_ensembl_gene: hcop_text(&row.human_ensembl_gene),
        human_name: hcop_text(&row.human_name),
        human_symbol: hcop_text(&row.human_symbol),
        human_chr: hcop_text(&row.human_chr),
        human_assert_ids: hcop_text(&row.human_assert_ids),
        ortholog_species_entrez_gene: hcop_int(
            "ortholog_species_entrez_gene",
            &row.ortholog_species_entrez_gene,
        )?,
        ortholog_species_ensembl_gene: hcop_text(&row.ortholog_species_ensembl_gene),
        ortholog_species_db_id: hcop_text(&row.ortholog_species_db_id),
        ortholog_species_name: hcop_text(&row.ortholog_species_name),
        ortholog_species_symbol: hcop_text(&row.ortholog_species_symbol),
        ortholog_species_chr: hcop_text(&row.ortholog_species_chr),
        ortholog_species_assert_ids: hcop_text(&row.ortholog_species_assert_ids),
        support: hcop_text(&row.support),
        hgnc_id,
    })
}
