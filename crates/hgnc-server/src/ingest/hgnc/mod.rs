// HGNC Ingestion Module
//
// Imports the HGNC complete set (JSON, `response.docs`) and the HCOP ortholog
// prediction table (TSV) into the hgnc_* tables. Every run replaces the whole
// snapshot inside one transaction.
//
// - Download: local override path, HTTP(S) or FTP, optional gzip
// - Parse: JSON document into raw records, HCOP rows via csv
// - Normalize: raw record -> GeneRecord, shared entities through the DedupCache
// - Store: chunked bulk inserts with run-assigned ids
// - Pipeline: orchestration and the two-phase ortholog load

pub mod config;
pub mod dedup;
pub mod downloader;
pub mod models;
pub mod normalizer;
pub mod parser;
pub mod pipeline;
pub mod storage;

pub use config::ImportConfig;
pub use dedup::{DedupCache, IdSequence, SharedCache};
pub use downloader::HgncDownloader;
pub use models::{GeneRecord, HcopRow, RawGeneRecord};
pub use normalizer::Normalizer;
pub use parser::{parse_hcop, parse_hgnc_document, parse_prefixed_id};
pub use pipeline::{HgncPipeline, ImportSummary};
pub use storage::{HgncStorage, StagedBatch};

// Batch size constants
pub const DEFAULT_GENE_CHUNK_SIZE: usize = 500;
pub const DEFAULT_ROW_CHUNK_SIZE: usize = 2000;
pub const DEFAULT_ORTHOLOG_CHUNK_SIZE: usize = 1000;

/// Result type for HGNC import operations
pub type Result<T> = std::result::Result<T, ImportError>;

/// Error types for HGNC import
///
/// Every variant is fatal to a run. [`HgncPipeline::run`] reports failures as
/// [`ImportError::Aborted`] wrapping the underlying cause.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Download error: {0}")]
    Download(#[from] reqwest::Error),

    #[error("FTP download error: {0}")]
    Ftp(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required field '{field}' in record {record}")]
    MissingField { field: &'static str, record: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Import aborted during '{step}': {source}")]
    Aborted {
        step: &'static str,
        #[source]
        source: Box<ImportError>,
    },
}

impl ImportError {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// The cause of an aborted run, or `self` for any other variant
    pub fn root_cause(&self) -> &ImportError {
        match self {
            ImportError::Aborted { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Whether the error is (or wraps) malformed input data
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self.root_cause(),
            ImportError::Parse(_) | ImportError::Json(_) | ImportError::Csv(_)
        )
    }

    /// Whether the error is (or wraps) a failed remote fetch
    pub fn is_download_error(&self) -> bool {
        matches!(
            self.root_cause(),
            ImportError::Download(_) | ImportError::Ftp(_)
        )
    }
}

impl From<std::num::ParseIntError> for ImportError {
    fn from(err: std::num::ParseIntError) -> Self {
        ImportError::Parse(err.to_string())
    }
}

impl From<crate::db::DbError> for ImportError {
    fn from(err: crate::db::DbError) -> Self {
        match err {
            crate::db::DbError::Sqlx(e) => ImportError::Database(e),
            other => ImportError::Connection(other.to_string()),
        }
    }
}
