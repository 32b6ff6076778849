// HGNC Import Configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::{DEFAULT_GENE_CHUNK_SIZE, DEFAULT_ORTHOLOG_CHUNK_SIZE, DEFAULT_ROW_CHUNK_SIZE};

/// Default location of the HGNC complete set
pub const DEFAULT_HGNC_JSON_URL: &str =
    "https://ftp.ebi.ac.uk/pub/databases/genenames/new/json/hgnc_complete_set.json";

/// Default location of the HCOP sixteen column ortholog file
pub const DEFAULT_HCOP_URL: &str =
    "https://ftp.ebi.ac.uk/pub/databases/genenames/hcop/human_all_hcop_sixteen_column.txt.gz";

/// Configuration for one import run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Remote location of the HGNC JSON document
    pub hgnc_json_url: String,

    /// Remote location of the HCOP TSV (plain or gzipped)
    pub hcop_url: String,

    /// Local HGNC JSON file used instead of the download
    pub hgnc_json_path: Option<PathBuf>,

    /// Local HCOP file used instead of the download
    pub hcop_path: Option<PathBuf>,

    /// Flush staged rows after every record instead of once at the end
    pub low_memory: bool,

    /// Hide the progress bar
    pub silent: bool,

    /// Leave hgnc_orthology_prediction empty
    pub skip_orthology: bool,

    /// HTTP/FTP timeout in seconds
    pub timeout_secs: u64,

    pub gene_chunk_size: usize,
    pub row_chunk_size: usize,
    pub ortholog_chunk_size: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            hgnc_json_url: DEFAULT_HGNC_JSON_URL.to_string(),
            hcop_url: DEFAULT_HCOP_URL.to_string(),
            hgnc_json_path: None,
            hcop_path: None,
            low_memory: false,
            silent: false,
            skip_orthology: false,
            timeout_secs: 600,
            gene_chunk_size: DEFAULT_GENE_CHUNK_SIZE,
            row_chunk_size: DEFAULT_ROW_CHUNK_SIZE,
            ortholog_chunk_size: DEFAULT_ORTHOLOG_CHUNK_SIZE,
        }
    }
}

impl ImportConfig {
    pub fn builder() -> ImportConfigBuilder {
        ImportConfigBuilder::default()
    }

    /// Read `HGNC_*` import variables, falling back to defaults
    ///
    /// - `HGNC_JSON_URL`, `HGNC_HCOP_URL`: remote sources
    /// - `HGNC_JSON_PATH`, `HGNC_HCOP_PATH`: local overrides
    /// - `HGNC_LOW_MEMORY`, `HGNC_SILENT`, `HGNC_SKIP_ORTHOLOGY`: flags
    /// - `HGNC_DOWNLOAD_TIMEOUT`: seconds
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let flag = |key: &str| {
            std::env::var(key)
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false)
        };

        Self {
            hgnc_json_url: std::env::var("HGNC_JSON_URL").unwrap_or(defaults.hgnc_json_url),
            hcop_url: std::env::var("HGNC_HCOP_URL").unwrap_or(defaults.hcop_url),
            hgnc_json_path: std::env::var("HGNC_JSON_PATH").ok().map(PathBuf::from),
            hcop_path: std::env::var("HGNC_HCOP_PATH").ok().map(PathBuf::from),
            low_memory: flag("HGNC_LOW_MEMORY"),
            silent: flag("HGNC_SILENT"),
            skip_orthology: flag("HGNC_SKIP_ORTHOLOGY"),
            timeout_secs: std::env::var("HGNC_DOWNLOAD_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.timeout_secs),
            ..defaults
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.hgnc_json_path.is_none() && self.hgnc_json_url.is_empty() {
            return Err("HGNC JSON URL cannot be empty without a local path".to_string());
        }

        if !self.skip_orthology && self.hcop_path.is_none() && self.hcop_url.is_empty() {
            return Err("HCOP URL cannot be empty without a local path".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("Timeout must be greater than 0".to_string());
        }

        if self.gene_chunk_size == 0 || self.row_chunk_size == 0 || self.ortholog_chunk_size == 0
        {
            return Err("Chunk sizes must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Human-readable source of the HGNC document, for logging
    pub fn hgnc_source(&self) -> String {
        match self.hgnc_json_path {
            Some(ref path) => path.display().to_string(),
            None => self.hgnc_json_url.clone(),
        }
    }

    /// Human-readable source of the HCOP table, for logging
    pub fn hcop_source(&self) -> String {
        match self.hcop_path {
            Some(ref path) => path.display().to_string(),
            None => self.hcop_url.clone(),
        }
    }
}

/// Builder for ImportConfig
#[derive(Debug, Default)]
pub struct ImportConfigBuilder {
    config: ImportConfig,
}

impl ImportConfigBuilder {
    pub fn hgnc_json_url(mut self, url: impl Into<String>) -> Self {
        self.config.hgnc_json_url = url.into();
        self
    }

    pub fn hcop_url(mut self, url: impl Into<String>) -> Self {
        self.config.hcop_url = url.into();
        self
    }

    pub fn hgnc_json_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.hgnc_json_path = Some(path.into());
        self
    }

    pub fn hcop_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.hcop_path = Some(path.into());
        self
    }

    pub fn low_memory(mut self, low_memory: bool) -> Self {
        self.config.low_memory = low_memory;
        self
    }

    pub fn silent(mut self, silent: bool) -> Self {
        self.config.silent = silent;
        self
    }

    pub fn skip_orthology(mut self, skip: bool) -> Self {
        self.config.skip_orthology = skip;
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    pub fn chunk_sizes(mut self, genes: usize, rows: usize, orthologs: usize) -> Self {
        self.config.gene_chunk_size = genes;
        self.config.row_chunk_size = rows;
        self.config.ortholog_chunk_size = orthologs;
        self
    }

    pub fn build(self) -> ImportConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = ImportConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.low_memory);
        assert!(config.hcop_url.ends_with(".gz"));
    }

    #[test]
    fn test_builder() {
        let config = ImportConfig::builder()
            .hgnc_json_path("/tmp/hgnc.json")
            .hcop_path("/tmp/hcop.txt")
            .low_memory(true)
            .silent(true)
            .chunk_sizes(10, 20, 30)
            .build();

        assert_eq!(config.hgnc_source(), "/tmp/hgnc.json");
        assert_eq!(config.hcop_source(), "/tmp/hcop.txt");
        assert!(config.low_memory);
        assert!(config.silent);
        assert_eq!(config.row_chunk_size, 20);
    }

    #[test]
    fn test_invalid_config() {
        let config = ImportConfig::builder().hgnc_json_url("").build();
        assert!(config.validate().is_err());

        let config = ImportConfig::builder().chunk_sizes(0, 1, 1).build();
        assert!(config.validate().is_err());

        let config = ImportConfig::builder().hcop_url("").skip_orthology(true).build();
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_from_env() {
        std::env::set_var("HGNC_JSON_PATH", "/data/hgnc_complete_set.json");
        std::env::set_var("HGNC_SILENT", "yes");

        let config = ImportConfig::from_env();
        assert_eq!(
            config.hgnc_json_path,
            Some(PathBuf::from("/data/hgnc_complete_set.json"))
        );
        assert!(config.silent);
        assert!(!config.low_memory);

        std::env::remove_var("HGNC_JSON_PATH");
        std::env::remove_var("HGNC_SILENT");
    }
}
