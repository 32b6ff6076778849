// HGNC Storage Layer
//
// Writes staged rows with chunked multi-row INSERTs. All methods take the
// caller's connection so a whole run can share one transaction.

use sqlx::query_builder::Separated;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

use super::dedup::DedupCache;
use super::models::GeneRecord;
use super::{
    Result, DEFAULT_GENE_CHUNK_SIZE, DEFAULT_ORTHOLOG_CHUNK_SIZE, DEFAULT_ROW_CHUNK_SIZE,
};
use crate::db::schema::tables;
use crate::models::{
    AliasName, AliasSymbol, Ccds, Ena, Enzyme, GeneFamily, Hgnc, Lsdb, Mgd, Omim,
    OrthologyPrediction, PubMed, RefSeq, Rgd, SharedKind, UniProt,
};

/// Rows waiting to be written
///
/// Shared rows appear here only once, in the batch that first saw them.
/// Link rows reference shared ids that may have been written by an earlier batch.
#[derive(Debug, Default)]
pub struct StagedBatch {
    pub genes: Vec<Hgnc>,
    pub alias_symbols: Vec<AliasSymbol>,
    pub alias_names: Vec<AliasName>,
    pub omims: Vec<Omim>,
    pub ccds: Vec<Ccds>,
    pub lsdbs: Vec<Lsdb>,

    pub gene_families: Vec<Arc<GeneFamily>>,
    pub ref_seqs: Vec<Arc<RefSeq>>,
    pub rgds: Vec<Arc<Rgd>>,
    pub mgds: Vec<Arc<Mgd>>,
    pub uniprots: Vec<Arc<UniProt>>,
    pub pubmeds: Vec<Arc<PubMed>>,
    pub enas: Vec<Arc<Ena>>,
    pub enzymes: Vec<Arc<Enzyme>>,

    /// (hgnc_id, shared id) pairs per kind
    pub links: BTreeMap<SharedKind, Vec<(i64, i64)>>,
}

impl StagedBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move a normalized record's rows into the batch
    pub fn stage(&mut self, record: GeneRecord) {
        let gene_id = record.id();

        let mut link = |kind: SharedKind, ids: Vec<i64>| {
            if !ids.is_empty() {
                self.links
                    .entry(kind)
                    .or_default()
                    .extend(ids.into_iter().map(|id| (gene_id, id)));
            }
        };
        link(SharedKind::GeneFamily, record.gene_families.iter().map(|e| e.id).collect());
        link(SharedKind::RefSeq, record.ref_seqs.iter().map(|e| e.id).collect());
        link(SharedKind::Rgd, record.rgds.iter().map(|e| e.id).collect());
        link(SharedKind::Mgd, record.mgds.iter().map(|e| e.id).collect());
        link(SharedKind::UniProt, record.uniprots.iter().map(|e| e.id).collect());
        link(SharedKind::PubMed, record.pubmeds.iter().map(|e| e.id).collect());
        link(SharedKind::Ena, record.enas.iter().map(|e| e.id).collect());
        link(SharedKind::Enzyme, record.enzymes.iter().map(|e| e.id).collect());

        self.genes.push(record.hgnc);
        self.alias_symbols.extend(record.alias_symbols);
        self.alias_names.extend(record.alias_names);
        self.omims.extend(record.omims);
        self.ccds.extend(record.ccds);
        self.lsdbs.extend(record.lsdbs);
    }

    /// Pull shared instances created since the last flush out of the cache
    pub fn take_shared(&mut self, cache: &mut DedupCache) {
        self.gene_families.extend(cache.gene_families.take_pending());
        self.ref_seqs.extend(cache.ref_seqs.take_pending());
        self.rgds.extend(cache.rgds.take_pending());
        self.mgds.extend(cache.mgds.take_pending());
        self.uniprots.extend(cache.uniprots.take_pending());
        self.pubmeds.extend(cache.pubmeds.take_pending());
        self.enas.extend(cache.enas.take_pending());
        self.enzymes.extend(cache.enzymes.take_pending());
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty() && self.shared_rows() == 0 && self.links.is_empty()
    }

    pub fn shared_rows(&self) -> usize {
        self.gene_families.len()
            + self.ref_seqs.len()
            + self.rgds.len()
            + self.mgds.len()
            + self.uniprots.len()
            + self.pubmeds.len()
            + self.enas.len()
            + self.enzymes.len()
    }

    pub fn link_rows(&self) -> usize {
        self.links.values().map(Vec::len).sum()
    }
}

/// Storage handler for the hgnc_* tables
#[derive(Debug, Clone)]
pub struct HgncStorage {
    gene_chunk_size: usize,
    row_chunk_size: usize,
    ortholog_chunk_size: usize,
}

impl Default for HgncStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl HgncStorage {
    /// Create storage handler with default chunk sizes
    pub fn new() -> Self {
        Self::with_chunk_sizes(
            DEFAULT_GENE_CHUNK_SIZE,
            DEFAULT_ROW_CHUNK_SIZE,
            DEFAULT_ORTHOLOG_CHUNK_SIZE,
        )
    }

    /// Create storage handler with custom chunk sizes
    pub fn with_chunk_sizes(
        gene_chunk_size: usize,
        row_chunk_size: usize,
        ortholog_chunk_size: usize,
    ) -> Self {
        Self {
            gene_chunk_size: gene_chunk_size.max(1),
            row_chunk_size: row_chunk_size.max(1),
            ortholog_chunk_size: ortholog_chunk_size.max(1),
        }
    }

    /// Write one batch: shared rows, then genes, then owned rows, then links
    pub async fn write_batch(&self, conn: &mut SqliteConnection, batch: &StagedBatch) -> Result<()> {
        let rows = self.row_chunk_size;

        bulk_insert(
            conn,
            "INSERT INTO hgnc_gene_family (id, family_identifier, family_name) ",
            &batch.gene_families,
            rows,
            |mut b, e| {
                b.push_bind(e.id).push_bind(e.family_identifier).push_bind(&e.family_name);
            },
        )
        .await?;
        bulk_insert(conn, "INSERT INTO hgnc_ref_seq (id, accession) ", &batch.ref_seqs, rows, |mut b, e| {
            b.push_bind(e.id).push_bind(&e.accession);
        })
        .await?;
        bulk_insert(conn, "INSERT INTO hgnc_rgd (id, rgdid) ", &batch.rgds, rows, |mut b, e| {
            b.push_bind(e.id).push_bind(e.rgdid);
        })
        .await?;
        bulk_insert(conn, "INSERT INTO hgnc_mgd (id, mgdid) ", &batch.mgds, rows, |mut b, e| {
            b.push_bind(e.id).push_bind(e.mgdid);
        })
        .await?;
        bulk_insert(conn, "INSERT INTO hgnc_uniprot (id, uniprotid) ", &batch.uniprots, rows, |mut b, e| {
            b.push_bind(e.id).push_bind(&e.uniprotid);
        })
        .await?;
        bulk_insert(conn, "INSERT INTO hgnc_pubmed (id, pubmedid) ", &batch.pubmeds, rows, |mut b, e| {
            b.push_bind(e.id).push_bind(e.pubmedid);
        })
        .await?;
        bulk_insert(conn, "INSERT INTO hgnc_ena (id, enaid) ", &batch.enas, rows, |mut b, e| {
            b.push_bind(e.id).push_bind(&e.enaid);
        })
        .await?;
        bulk_insert(conn, "INSERT INTO hgnc_enzyme (id, ec_number) ", &batch.enzymes, rows, |mut b, e| {
            b.push_bind(e.id).push_bind(&e.ec_number);
        })
        .await?;

        self.insert_genes(conn, &batch.genes).await?;

        bulk_insert(
            conn,
            "INSERT INTO hgnc_alias_symbol (id, alias_symbol, is_previous_symbol, hgnc_id) ",
            &batch.alias_symbols,
            rows,
            |mut b, r| {
                b.push_bind(r.id)
                    .push_bind(&r.alias_symbol)
                    .push_bind(r.is_previous_symbol)
                    .push_bind(r.hgnc_id);
            },
        )
        .await?;
        bulk_insert(
            conn,
            "INSERT INTO hgnc_alias_name (id, alias_name, is_previous_name, hgnc_id) ",
            &batch.alias_names,
            rows,
            |mut b, r| {
                b.push_bind(r.id)
                    .push_bind(&r.alias_name)
                    .push_bind(r.is_previous_name)
                    .push_bind(r.hgnc_id);
            },
        )
        .await?;
        bulk_insert(conn, "INSERT INTO hgnc_omim (id, omimid, hgnc_id) ", &batch.omims, rows, |mut b, r| {
            b.push_bind(r.id).push_bind(r.omimid).push_bind(r.hgnc_id);
        })
        .await?;
        bulk_insert(conn, "INSERT INTO hgnc_ccds (id, ccdsid, hgnc_id) ", &batch.ccds, rows, |mut b, r| {
            b.push_bind(r.id).push_bind(&r.ccdsid).push_bind(r.hgnc_id);
        })
        .await?;
        bulk_insert(
            conn,
            "INSERT INTO hgnc_lsdb (id, lsdb, url, hgnc_id) ",
            &batch.lsdbs,
            rows,
            |mut b, r| {
                b.push_bind(r.id).push_bind(&r.lsdb).push_bind(&r.url).push_bind(r.hgnc_id);
            },
        )
        .await?;

        for (kind, links) in &batch.links {
            let head = format!(
                "INSERT INTO {} (hgnc_id, {}) ",
                kind.link_table(),
                kind.link_column()
            );
            bulk_insert(conn, &head, links, rows, |mut b, (hgnc_id, entity_id)| {
                b.push_bind(*hgnc_id).push_bind(*entity_id);
            })
            .await?;
        }

        debug!(
            genes = batch.genes.len(),
            shared = batch.shared_rows(),
            links = batch.link_rows(),
            "Wrote staged batch"
        );

        Ok(())
    }

    async fn insert_genes(&self, conn: &mut SqliteConnection, genes: &[Hgnc]) -> Result<()> {
        bulk_insert(
            conn,
            r#"
            INSERT INTO hgnc_hgnc (
                id, identifier, symbol, name, status, uuid, locus_group, locus_type,
                orphanet, date_name_changed, date_modified, date_symbol_changed,
                date_approved_reserved, ensembl_gene, vega, lncrnadb, horde, entrez,
                mirbase, iuphar, ucsc, snornabase, intermediatefilamentdb, pseudogeneorg,
                bioparadigmsslc, locationsortable, merops, location, cosmic, imgt
            )
            "#,
            genes,
            self.gene_chunk_size,
            |mut b, g| {
                b.push_bind(g.id)
                    .push_bind(g.identifier)
                    .push_bind(&g.symbol)
                    .push_bind(&g.name)
                    .push_bind(&g.status)
                    .push_bind(&g.uuid)
                    .push_bind(&g.locus_group)
                    .push_bind(&g.locus_type)
                    .push_bind(g.orphanet)
                    .push_bind(g.date_name_changed)
                    .push_bind(g.date_modified)
                    .push_bind(g.date_symbol_changed)
                    .push_bind(g.date_approved_reserved)
                    .push_bind(&g.ensembl_gene)
                    .push_bind(&g.vega)
                    .push_bind(&g.lncrnadb)
                    .push_bind(&g.horde)
                    .push_bind(&g.entrez)
                    .push_bind(&g.mirbase)
                    .push_bind(&g.iuphar)
                    .push_bind(&g.ucsc)
                    .push_bind(&g.snornabase)
                    .push_bind(&g.intermediatefilamentdb)
                    .push_bind(&g.pseudogeneorg)
                    .push_bind(&g.bioparadigmsslc)
                    .push_bind(&g.locationsortable)
                    .push_bind(&g.merops)
                    .push_bind(&g.location)
                    .push_bind(&g.cosmic)
                    .push_bind(&g.imgt);
            },
        )
        .await?;
        Ok(())
    }

    /// HGNC identifier -> gene id for every stored gene
    pub async fn identifier_map(&self, conn: &mut SqliteConnection) -> Result<HashMap<i64, i64>> {
        let pairs: Vec<(i64, i64)> = sqlx::query_as("SELECT identifier, id FROM hgnc_hgnc")
            .fetch_all(&mut *conn)
            .await?;
        Ok(pairs.into_iter().collect())
    }

    /// Insert resolved ortholog predictions
    pub async fn insert_orthologs(
        &self,
        conn: &mut SqliteConnection,
        rows: &[OrthologyPrediction],
    ) -> Result<usize> {
        let inserted = bulk_insert(
            conn,
            r#"
            INSERT INTO hgnc_orthology_prediction (
                id, ortholog_species, human_entrez_gene, human_ensembl_gene, human_name,
                human_symbol, human_chr, human_assert_ids, ortholog_species_entrez_gene,
                ortholog_species_ensembl_gene, ortholog_species_db_id, ortholog_species_name,
                ortholog_species_symbol, ortholog_species_chr, ortholog_species_assert_ids,
                support, hgnc_id
            )
            "#,
            rows,
            self.ortholog_chunk_size,
            |mut b, o| {
                b.push_bind(o.id)
                    .push_bind(o.ortholog_species)
                    .push_bind(o.human_entrez_gene)
                    .push_bind(&o.human_ensembl_gene)
                    .push_bind(&o.human_name)
                    .push_bind(&o.human_symbol)
                    .push_bind(&o.human_chr)
                    .push_bind(&o.human_assert_ids)
                    .push_bind(o.ortholog_species_entrez_gene)
                    .push_bind(&o.ortholog_species_ensembl_gene)
                    .push_bind(&o.ortholog_species_db_id)
                    .push_bind(&o.ortholog_species_name)
                    .push_bind(&o.ortholog_species_symbol)
                    .push_bind(&o.ortholog_species_chr)
                    .push_bind(&o.ortholog_species_assert_ids)
                    .push_bind(&o.support)
                    .push_bind(o.hgnc_id);
            },
        )
        .await?;

        debug!(table = tables::ORTHOLOGY_PREDICTION, rows = inserted, "Inserted orthologs");
        Ok(inserted)
    }
}

/// Multi-row INSERT of `rows`, `chunk_size` rows per statement
/// Highest bound-parameter number SQLite accepts in one statement
const SQLITE_MAX_VARIABLES: usize = 32_766;

/// Chunk size clamped so one statement binds at most `SQLITE_MAX_VARIABLES`
///
/// `head` is `INSERT INTO table (a, b, ...) `; its commas count the columns.
fn rows_per_statement(head: &str, chunk_size: usize) -> usize {
    let columns = head.matches(',').count() + 1;
    chunk_size.clamp(1, SQLITE_MAX_VARIABLES / columns)
}

async fn bulk_insert<'a, T, F>(
    conn: &mut SqliteConnection,
    head: &str,
    rows: &'a [T],
    chunk_size: usize,
    mut bind: F,
) -> Result<usize>
where
    F: FnMut(Separated<'_, 'a, Sqlite, &'static str>, &'a T),
{
    for chunk in rows.chunks(rows_per_statement(head, chunk_size)) {
        let mut builder: QueryBuilder<'a, Sqlite> = QueryBuilder::new(head);
        builder.push_values(chunk, |b, row| bind(b, row));
        builder.build().execute(&mut *conn).await?;
    }
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, schema, DbConfig};
    use crate::ingest::hgnc::{Normalizer, RawGeneRecord};
    use serde_json::json;

    fn gene(hgnc_id: &str, symbol: &str, enzymes: &[&str]) -> RawGeneRecord {
        serde_json::from_value(json!({
            "hgnc_id": hgnc_id,
            "symbol": symbol,
            "name": symbol,
            "status": "Approved",
            "uuid": symbol,
            "locus_group": "protein-coding gene",
            "locus_type": "gene with protein product",
            "enzyme_id": enzymes,
            "alias_symbol": [format!("{}-alias", symbol)]
        }))
        .unwrap()
    }

    async fn setup() -> sqlx::pool::PoolConnection<Sqlite> {
        let pool = create_pool(&DbConfig::new("sqlite::memory:")).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        schema::create_all(&mut conn).await.unwrap();
        conn
    }

    #[tokio::test]
    async fn test_shared_row_written_once_across_batches() {
        let mut conn = setup().await;
        let storage = HgncStorage::with_chunk_sizes(1, 1, 1);
        let mut normalizer = Normalizer::new();

        for (id, symbol) in [("HGNC:249", "ADH1A"), ("HGNC:250", "ADH1B")] {
            let record = normalizer.normalize(&gene(id, symbol, &["1.1.1.1"])).unwrap();
            let mut batch = StagedBatch::new();
            batch.stage(record);
            batch.take_shared(normalizer.cache_mut());
            storage.write_batch(&mut conn, &batch).await.unwrap();
        }

        let counts = schema::table_counts(&mut conn).await.unwrap();
        assert_eq!(counts[tables::HGNC], 2);
        assert_eq!(counts[tables::ENZYME], 1);
        assert_eq!(counts[tables::HGNC_ENZYME], 2);
        assert_eq!(counts[tables::ALIAS_SYMBOL], 2);
    }

    #[test]
    fn test_rows_per_statement() {
        let head = "INSERT INTO hgnc_rgd (id, rgdid) ";
        assert_eq!(rows_per_statement(head, 500), 500);
        assert_eq!(rows_per_statement(head, 0), 1);
        assert_eq!(rows_per_statement(head, 1_000_000), SQLITE_MAX_VARIABLES / 2);
    }

    #[tokio::test]
    async fn test_oversized_chunks_stay_under_the_variable_limit() {
        let mut conn = setup().await;
        let storage = HgncStorage::with_chunk_sizes(100_000, 100_000, 100_000);
        let mut normalizer = Normalizer::new();

        let mut batch = StagedBatch::new();
        for n in 1..=1_500 {
            let record = normalizer
                .normalize(&gene(&format!("HGNC:{}", n), &format!("G{}", n), &[]))
                .unwrap();
            batch.stage(record);
        }
        batch.take_shared(normalizer.cache_mut());
        storage.write_batch(&mut conn, &batch).await.unwrap();

        let counts = schema::table_counts(&mut conn).await.unwrap();
        assert_eq!(counts[tables::HGNC], 1_500);
        assert_eq!(counts[tables::ALIAS_SYMBOL], 1_500);
    }

    #[tokio::test]
    async fn test_identifier_map() {
        let mut conn = setup().await;
        let storage = HgncStorage::new();
        let mut normalizer = Normalizer::new();

        let mut batch = StagedBatch::new();
        batch.stage(normalizer.normalize(&gene("HGNC:5", "A1BG", &[])).unwrap());
        batch.stage(normalizer.normalize(&gene("HGNC:250", "ADH1B", &[])).unwrap());
        batch.take_shared(normalizer.cache_mut());
        assert_eq!(batch.shared_rows(), 0);
        storage.write_batch(&mut conn, &batch).await.unwrap();

        let map = storage.identifier_map(&mut conn).await.unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map[&5], 1);
        assert_eq!(map[&250], 2);
    }

    #[tokio::test]
    async fn test_empty_batch_is_noop() {
        let mut conn = setup().await;
        let batch = StagedBatch::new();
        assert!(batch.is_empty());
        HgncStorage::new().write_batch(&mut conn, &batch).await.unwrap();

        let counts = schema::table_counts(&mut conn).await.unwrap();
        assert!(counts.values().all(|c| *c == 0));
    }

    #[tokio::test]
    async fn test_insert_orthologs_in_chunks() {
        let mut conn = setup().await;
        let storage = HgncStorage::with_chunk_sizes(10, 10, 2);
        let mut normalizer = Normalizer::new();

        let mut batch = StagedBatch::new();
        batch.stage(normalizer.normalize(&gene("HGNC:5", "A1BG", &[])).unwrap());
        storage.write_batch(&mut conn, &batch).await.unwrap();

        let rows: Vec<OrthologyPrediction> = (1..=5)
            .map(|id| OrthologyPrediction {
                id,
                ortholog_species: Some(10090),
                human_entrez_gene: Some(1),
                human_ensembl_gene: None,
                human_name: None,
                human_symbol: Some("A1BG".to_string()),
                human_chr: None,
                human_assert_ids: None,
                ortholog_species_entrez_gene: None,
                ortholog_species_ensembl_gene: None,
                ortholog_species_db_id: None,
                ortholog_species_name: None,
                ortholog_species_symbol: None,
                ortholog_species_chr: None,
                ortholog_species_assert_ids: None,
                support: Some("Ensembl".to_string()),
                hgnc_id: 1,
            })
            .collect();

        assert_eq!(storage.insert_orthologs(&mut conn, &rows).await.unwrap(), 5);

        let counts = schema::table_counts(&mut conn).await.unwrap();
        assert_eq!(counts[tables::ORTHOLOGY_PREDICTION], 5);
    }
}
