//! Relational schema for the HGNC snapshot
//!
//! Every entity kind has one `<prefix><entity>` table. Shared entities are
//! linked to genes through `<prefix>hgnc_<entity>` join tables. An import run
//! drops and recreates everything, so there is no migration path.

use sqlx::SqliteConnection;
use std::collections::BTreeMap;

use super::DbResult;

/// Table names
pub mod tables {
    pub const TABLE_PREFIX: &str = "hgnc_";

    pub const HGNC: &str = "hgnc_hgnc";

    pub const ALIAS_SYMBOL: &str = "hgnc_alias_symbol";
    pub const ALIAS_NAME: &str = "hgnc_alias_name";
    pub const OMIM: &str = "hgnc_omim";
    pub const CCDS: &str = "hgnc_ccds";
    pub const LSDB: &str = "hgnc_lsdb";
    pub const ORTHOLOGY_PREDICTION: &str = "hgnc_orthology_prediction";

    pub const GENE_FAMILY: &str = "hgnc_gene_family";
    pub const REF_SEQ: &str = "hgnc_ref_seq";
    pub const RGD: &str = "hgnc_rgd";
    pub const MGD: &str = "hgnc_mgd";
    pub const UNIPROT: &str = "hgnc_uniprot";
    pub const PUBMED: &str = "hgnc_pubmed";
    pub const ENA: &str = "hgnc_ena";
    pub const ENZYME: &str = "hgnc_enzyme";

    pub const HGNC_GENE_FAMILY: &str = "hgnc_hgnc_gene_family";
    pub const HGNC_REF_SEQ: &str = "hgnc_hgnc_ref_seq";
    pub const HGNC_RGD: &str = "hgnc_hgnc_rgd";
    pub const HGNC_MGD: &str = "hgnc_hgnc_mgd";
    pub const HGNC_UNIPROT: &str = "hgnc_hgnc_uniprot";
    pub const HGNC_PUBMED: &str = "hgnc_hgnc_pubmed";
    pub const HGNC_ENA: &str = "hgnc_hgnc_ena";
    pub const HGNC_ENZYME: &str = "hgnc_hgnc_enzyme";

    /// All tables in drop order: join tables, owned, shared, root
    pub const ALL: [&str; 23] = [
        HGNC_GENE_FAMILY,
        HGNC_REF_SEQ,
        HGNC_RGD,
        HGNC_MGD,
        HGNC_UNIPROT,
        HGNC_PUBMED,
        HGNC_ENA,
        HGNC_ENZYME,
        ORTHOLOGY_PREDICTION,
        ALIAS_SYMBOL,
        ALIAS_NAME,
        OMIM,
        CCDS,
        LSDB,
        GENE_FAMILY,
        REF_SEQ,
        RGD,
        MGD,
        UNIPROT,
        PUBMED,
        ENA,
        ENZYME,
        HGNC,
    ];
}

const CREATE_STATEMENTS: &[&str] = &[
    // Root
    r#"
    CREATE TABLE IF NOT EXISTS hgnc_hgnc (
        id INTEGER PRIMARY KEY,
        identifier INTEGER NOT NULL UNIQUE,
        symbol TEXT NOT NULL,
        name TEXT NOT NULL,
        status TEXT NOT NULL,
        uuid TEXT NOT NULL,
        locus_group TEXT NOT NULL,
        locus_type TEXT NOT NULL,
        orphanet INTEGER,
        date_name_changed DATE,
        date_modified DATE,
        date_symbol_changed DATE,
        date_approved_reserved DATE,
        ensembl_gene TEXT,
        vega TEXT,
        lncrnadb TEXT,
        horde TEXT,
        entrez TEXT,
        mirbase TEXT,
        iuphar TEXT,
        ucsc TEXT,
        snornabase TEXT,
        intermediatefilamentdb TEXT,
        pseudogeneorg TEXT,
        bioparadigmsslc TEXT,
        locationsortable TEXT,
        merops TEXT,
        location TEXT,
        cosmic TEXT,
        imgt TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_hgnc_hgnc_symbol ON hgnc_hgnc (symbol)",
    // Owned
    r#"
    CREATE TABLE IF NOT EXISTS hgnc_alias_symbol (
        id INTEGER PRIMARY KEY,
        alias_symbol TEXT NOT NULL,
        is_previous_symbol BOOLEAN NOT NULL,
        hgnc_id INTEGER NOT NULL REFERENCES hgnc_hgnc (id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS hgnc_alias_name (
        id INTEGER PRIMARY KEY,
        alias_name TEXT NOT NULL,
        is_previous_name BOOLEAN NOT NULL,
        hgnc_id INTEGER NOT NULL REFERENCES hgnc_hgnc (id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS hgnc_omim (
        id INTEGER PRIMARY KEY,
        omimid INTEGER NOT NULL,
        hgnc_id INTEGER NOT NULL REFERENCES hgnc_hgnc (id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS hgnc_ccds (
        id INTEGER PRIMARY KEY,
        ccdsid TEXT NOT NULL,
        hgnc_id INTEGER NOT NULL REFERENCES hgnc_hgnc (id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS hgnc_lsdb (
        id INTEGER PRIMARY KEY,
        lsdb TEXT NOT NULL,
        url TEXT,
        hgnc_id INTEGER NOT NULL REFERENCES hgnc_hgnc (id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS hgnc_orthology_prediction (
        id INTEGER PRIMARY KEY,
        ortholog_species INTEGER,
        human_entrez_gene INTEGER,
        human_ensembl_gene TEXT,
        human_name TEXT,
        human_symbol TEXT,
        human_chr TEXT,
        human_assert_ids TEXT,
        ortholog_species_entrez_gene INTEGER,
        ortholog_species_ensembl_gene TEXT,
        ortholog_species_db_id TEXT,
        ortholog_species_name TEXT,
        ortholog_species_symbol TEXT,
        ortholog_species_chr TEXT,
        ortholog_species_assert_ids TEXT,
        support TEXT,
        hgnc_id INTEGER NOT NULL REFERENCES hgnc_hgnc (id) ON DELETE CASCADE
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_hgnc_alias_symbol_hgnc ON hgnc_alias_symbol (hgnc_id)",
    "CREATE INDEX IF NOT EXISTS idx_hgnc_alias_name_hgnc ON hgnc_alias_name (hgnc_id)",
    "CREATE INDEX IF NOT EXISTS idx_hgnc_omim_hgnc ON hgnc_omim (hgnc_id)",
    "CREATE INDEX IF NOT EXISTS idx_hgnc_ccds_hgnc ON hgnc_ccds (hgnc_id)",
    "CREATE INDEX IF NOT EXISTS idx_hgnc_lsdb_hgnc ON hgnc_lsdb (hgnc_id)",
    "CREATE INDEX IF NOT EXISTS idx_hgnc_orthology_prediction_hgnc ON hgnc_orthology_prediction (hgnc_id)",
    // Shared
    r#"
    CREATE TABLE IF NOT EXISTS hgnc_gene_family (
        id INTEGER PRIMARY KEY,
        family_identifier INTEGER NOT NULL UNIQUE,
        family_name TEXT NOT NULL
    )
    "#,
    "CREATE TABLE IF NOT EXISTS hgnc_ref_seq (id INTEGER PRIMARY KEY, accession TEXT NOT NULL UNIQUE)",
    "CREATE TABLE IF NOT EXISTS hgnc_rgd (id INTEGER PRIMARY KEY, rgdid INTEGER NOT NULL UNIQUE)",
    "CREATE TABLE IF NOT EXISTS hgnc_mgd (id INTEGER PRIMARY KEY, mgdid INTEGER NOT NULL UNIQUE)",
    "CREATE TABLE IF NOT EXISTS hgnc_uniprot (id INTEGER PRIMARY KEY, uniprotid TEXT NOT NULL UNIQUE)",
    "CREATE TABLE IF NOT EXISTS hgnc_pubmed (id INTEGER PRIMARY KEY, pubmedid INTEGER NOT NULL UNIQUE)",
    "CREATE TABLE IF NOT EXISTS hgnc_ena (id INTEGER PRIMARY KEY, enaid TEXT NOT NULL UNIQUE)",
    "CREATE TABLE IF NOT EXISTS hgnc_enzyme (id INTEGER PRIMARY KEY, ec_number TEXT NOT NULL UNIQUE)",
    // Join tables
    r#"
    CREATE TABLE IF NOT EXISTS hgnc_hgnc_gene_family (
        hgnc_id INTEGER NOT NULL REFERENCES hgnc_hgnc (id) ON DELETE CASCADE,
        gene_family_id INTEGER NOT NULL REFERENCES hgnc_gene_family (id) ON DELETE CASCADE,
        PRIMARY KEY (hgnc_id, gene_family_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS hgnc_hgnc_ref_seq (
        hgnc_id INTEGER NOT NULL REFERENCES hgnc_hgnc (id) ON DELETE CASCADE,
        ref_seq_id INTEGER NOT NULL REFERENCES hgnc_ref_seq (id) ON DELETE CASCADE,
        PRIMARY KEY (hgnc_id, ref_seq_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS hgnc_hgnc_rgd (
        hgnc_id INTEGER NOT NULL REFERENCES hgnc_hgnc (id) ON DELETE CASCADE,
        rgd_id INTEGER NOT NULL REFERENCES hgnc_rgd (id) ON DELETE CASCADE,
        PRIMARY KEY (hgnc_id, rgd_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS hgnc_hgnc_mgd (
        hgnc_id INTEGER NOT NULL REFERENCES hgnc_hgnc (id) ON DELETE CASCADE,
        mgd_id INTEGER NOT NULL REFERENCES hgnc_mgd (id) ON DELETE CASCADE,
        PRIMARY KEY (hgnc_id, mgd_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS hgnc_hgnc_uniprot (
        hgnc_id INTEGER NOT NULL REFERENCES hgnc_hgnc (id) ON DELETE CASCADE,
        uniprot_id INTEGER NOT NULL REFERENCES hgnc_uniprot (id) ON DELETE CASCADE,
        PRIMARY KEY (hgnc_id, uniprot_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS hgnc_hgnc_pubmed (
        hgnc_id INTEGER NOT NULL REFERENCES hgnc_hgnc (id) ON DELETE CASCADE,
        pubmed_id INTEGER NOT NULL REFERENCES hgnc_pubmed (id) ON DELETE CASCADE,
        PRIMARY KEY (hgnc_id, pubmed_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS hgnc_hgnc_ena (
        hgnc_id INTEGER NOT NULL REFERENCES hgnc_hgnc (id) ON DELETE CASCADE,
        ena_id INTEGER NOT NULL REFERENCES hgnc_ena (id) ON DELETE CASCADE,
        PRIMARY KEY (hgnc_id, ena_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS hgnc_hgnc_enzyme (
        hgnc_id INTEGER NOT NULL REFERENCES hgnc_hgnc (id) ON DELETE CASCADE,
        enzyme_id INTEGER NOT NULL REFERENCES hgnc_enzyme (id) ON DELETE CASCADE,
        PRIMARY KEY (hgnc_id, enzyme_id)
    )
    "#,
];

/// Create every table and index that does not exist yet
pub async fn create_all(conn: &mut SqliteConnection) -> DbResult<()> {
    for statement in CREATE_STATEMENTS {
        sqlx::query(statement).execute(&mut *conn).await?;
    }
    Ok(())
}

/// Drop every table, children before parents
pub async fn drop_all(conn: &mut SqliteConnection) -> DbResult<()> {
    for table in tables::ALL {
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

/// Drop and recreate the whole schema
pub async fn reset(conn: &mut SqliteConnection) -> DbResult<()> {
    drop_all(conn).await?;
    create_all(conn).await?;
    tracing::debug!(tables = tables::ALL.len(), "Schema reset");
    Ok(())
}

/// Row count of every table, keyed by table name
pub async fn table_counts(conn: &mut SqliteConnection) -> DbResult<BTreeMap<String, i64>> {
    let mut counts = BTreeMap::new();
    for table in tables::ALL {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&mut *conn)
            .await?;
        counts.insert(table.to_string(), count);
    }
    Ok(counts)
}
