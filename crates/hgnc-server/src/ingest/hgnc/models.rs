// HGNC Ingestion Models

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;

use super::{ImportError, Result};
use crate::models::{
    AliasName, AliasSymbol, Ccds, Ena, Enzyme, GeneFamily, Hgnc, Lsdb, Mgd, Omim, PubMed, RefSeq,
    Rgd, UniProt,
};

/// External date format of the HGNC document
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// Raw record
// ============================================================================

/// One element of `response.docs`, kept as the untyped JSON object
///
/// Accessors distinguish "absent" (key missing or null) from "malformed"
/// (present with the wrong shape), which is a parse error.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct RawGeneRecord(Map<String, Value>);

impl RawGeneRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Short label for error messages: the HGNC id, else the symbol
    pub fn label(&self) -> String {
        self.0
            .get("hgnc_id")
            .or_else(|| self.0.get("symbol"))
            .and_then(Value::as_str)
            .unwrap_or("<unidentified record>")
            .to_string()
    }

    /// Present and not null
    pub fn has(&self, field: &str) -> bool {
        self.0.get(field).is_some_and(|v| !v.is_null())
    }

    fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|v| !v.is_null())
    }

    pub fn required_str(&self, field: &'static str) -> Result<String> {
        self.optional_str(field)?
            .ok_or_else(|| ImportError::MissingField {
                field,
                record: self.label(),
            })
    }

    /// Strings are taken as-is, numbers are rendered as text
    pub fn optional_str(&self, field: &str) -> Result<Option<String>> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(other) => Err(self.malformed(field, "a string", other)),
        }
    }

    /// Integers, or text holding an integer
    pub fn optional_int(&self, field: &str) -> Result<Option<i64>> {
        match self.get(field) {
            None => Ok(None),
            Some(value) => scalar_to_int(value)
                .map(Some)
                .ok_or_else(|| self.malformed(field, "an integer", value)),
        }
    }

    /// A blank date string counts as absent
    pub fn optional_date(&self, field: &str) -> Result<Option<NaiveDate>> {
        match self.optional_str(field)? {
            None => Ok(None),
            Some(text) if text.trim().is_empty() => Ok(None),
            Some(text) => NaiveDate::parse_from_str(&text, DATE_FORMAT)
                .map(Some)
                .map_err(|e| {
                    ImportError::parse(format!(
                        "field '{}' of {}: invalid date '{}': {}",
                        field,
                        self.label(),
                        text,
                        e
                    ))
                }),
        }
    }

    /// List of strings; a lone scalar counts as a one-element list
    pub fn str_list(&self, field: &str) -> Result<Vec<String>> {
        self.list(field)?
            .into_iter()
            .map(|value| match value {
                Value::String(s) => Ok(s.clone()),
                Value::Number(n) => Ok(n.to_string()),
                other => Err(self.malformed(field, "a list of strings", other)),
            })
            .collect()
    }

    /// List of integers; integer text is accepted
    pub fn int_list(&self, field: &str) -> Result<Vec<i64>> {
        self.list(field)?
            .into_iter()
            .map(|value| {
                scalar_to_int(value)
                    .ok_or_else(|| self.malformed(field, "a list of integers", value))
            })
            .collect()
    }

    fn list(&self, field: &str) -> Result<Vec<&Value>> {
        match self.get(field) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items.iter().filter(|v| !v.is_null()).collect()),
            Some(Value::Object(_)) => Err(ImportError::parse(format!(
                "field '{}' of {}: expected a list, found an object",
                field,
                self.label()
            ))),
            Some(scalar) => Ok(vec![scalar]),
        }
    }

    fn malformed(&self, field: &str, expected: &str, found: &Value) -> ImportError {
        ImportError::parse(format!(
            "field '{}' of {}: expected {}, found {}",
            field,
            self.label(),
            expected,
            found
        ))
    }
}

fn scalar_to_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// ============================================================================
// Normalized record
// ============================================================================

/// A gene with everything it owns and references
///
/// Shared entities are the cache's instances: two genes referencing the same
/// EC number hold clones of one `Arc<Enzyme>`.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneRecord {
    pub hgnc: Hgnc,

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
}

impl GeneRecord {
    pub fn id(&self) -> i64 {
        self.hgnc.id
    }
}

// ============================================================================
// HCOP row
// ============================================================================

/// One line of the HCOP sixteen column file
///
/// Columns other than `hgnc_id` may be missing from the file; `-` and empty
/// cells are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HcopRow {
    pub hgnc_id: String,
    pub ortholog_species: String,
    pub human_entrez_gene: String,
    pub human_ensembl_gene: String,
    pub human_name: String,
    pub human_symbol: String,
    pub human_chr: String,
    pub human_assert_ids: String,
    pub ortholog_species_entrez_gene: String,
    pub ortholog_species_ensembl_gene: String,
    pub ortholog_species_db_id: String,
    pub ortholog_species_name: String,
    pub ortholog_species_symbol: String,
    pub ortholog_species_chr: String,
    pub ortholog_species_assert_ids: String,
    pub support: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> RawGeneRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_required_field_missing() {
        let raw = record(json!({"hgnc_id": "HGNC:5"}));
        let err = raw.required_str("symbol").unwrap_err();
        match err {
            ImportError::MissingField { field, record } => {
                assert_eq!(field, "symbol");
                assert_eq!(record, "HGNC:5");
            },
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_null_is_absent() {
        let raw = record(json!({"vega_id": null, "alias_symbol": null}));
        assert_eq!(raw.optional_str("vega_id").unwrap(), None);
        assert!(!raw.has("alias_symbol"));
        assert!(raw.str_list("alias_symbol").unwrap().is_empty());
    }

    #[test]
    fn test_scalar_coercions() {
        let raw = record(json!({"entrez_id": 1, "orphanet": "140", "pubmed_id": [2591067, "123"]}));
        assert_eq!(raw.optional_str("entrez_id").unwrap().as_deref(), Some("1"));
        assert_eq!(raw.optional_int("orphanet").unwrap(), Some(140));
        assert_eq!(raw.int_list("pubmed_id").unwrap(), vec![2591067, 123]);
    }

    #[test]
    fn test_scalar_as_single_element_list() {
        let raw = record(json!({"ccds_id": "CCDS12976"}));
        assert_eq!(raw.str_list("ccds_id").unwrap(), vec!["CCDS12976"]);
    }

    #[test]
    fn test_malformed_values() {
        let raw = record(json!({"orphanet": "many", "ccds_id": {"a": 1}, "symbol": ["A1BG"]}));
        assert!(raw.optional_int("orphanet").unwrap_err().is_parse_error());
        assert!(raw.str_list("ccds_id").unwrap_err().is_parse_error());
        assert!(raw.required_str("symbol").unwrap_err().is_parse_error());
    }

    #[test]
    fn test_dates() {
        let raw = record(json!({"date_modified": "2015-07-13", "date_name_changed": "13/07/2015"}));
        assert_eq!(
            raw.optional_date("date_modified").unwrap(),
            NaiveDate::from_ymd_opt(2015, 7, 13)
        );
        assert_eq!(raw.optional_date("date_approved_reserved").unwrap(), None);
        assert!(raw.optional_date("date_name_changed").is_err());
    }

    #[test]
    fn test_blank_date_is_absent() {
        let raw = record(json!({"date_symbol_changed": "", "date_modified": "  "}));
        assert_eq!(raw.optional_date("date_symbol_changed").unwrap(), None);
        assert_eq!(raw.optional_date("date_modified").unwrap(), None);
    }
}
