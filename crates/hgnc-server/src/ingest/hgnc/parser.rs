// HGNC Document Parsers
//
// - HGNC complete set: JSON object, records under `response.docs`
// - HCOP: tab separated with a header line, genes referenced as `HGNC:<int>`

use serde::Deserialize;
use std::io::Read;

use super::models::{HcopRow, RawGeneRecord};
use super::{ImportError, Result};

/// Cell value HCOP uses for "no data"
pub const HCOP_MISSING: &str = "-";

#[derive(Debug, Deserialize)]
struct HgncDocument {
    response: HgncResponse,
}

#[derive(Debug, Deserialize)]
struct HgncResponse {
    docs: Vec<RawGeneRecord>,
}

/// Parse the HGNC JSON document into raw records
pub fn parse_hgnc_document(bytes: &[u8]) -> Result<Vec<RawGeneRecord>> {
    let document: HgncDocument = serde_json::from_slice(bytes)?;
    Ok(document.response.docs)
}

/// Integer after the last `:` of a prefixed identifier
///
/// `"MGI:1234"` and `"1234"` both give 1234. `"HGNC:5"` gives 5.
pub fn parse_prefixed_id(raw: &str) -> Result<i64> {
    let suffix = raw.rsplit(':').next().unwrap_or(raw).trim();
    suffix
        .parse()
        .map_err(|_| ImportError::parse(format!("invalid identifier '{}': non-numeric suffix", raw)))
}

/// Split an `lsdb` entry of the form `name|url`
pub fn split_lsdb(entry: &str) -> (String, Option<String>) {
    match entry.split_once('|') {
        Some((name, url)) => {
            let url = url.trim();
            (
                name.trim().to_string(),
                (!url.is_empty()).then(|| url.to_string()),
            )
        },
        None => (entry.trim().to_string(), None),
    }
}

/// Streaming reader over HCOP rows
///
/// Unknown columns are ignored. Only `hgnc_id` has to be present in the header.
pub fn parse_hcop<R: Read>(reader: R) -> Result<impl Iterator<Item = Result<HcopRow>>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let headers = reader.headers()?;
    if !headers.iter().any(|h| h == "hgnc_id") {
        return Err(ImportError::parse("HCOP header has no 'hgnc_id' column"));
    }

    Ok(reader
        .into_deserialize::<HcopRow>()
        .map(|row| row.map_err(ImportError::from)))
}

/// `None` for HCOP's empty or `-` cells
pub fn hcop_text(cell: &str) -> Option<String> {
    let cell = cell.trim();
    (!cell.is_empty() && cell != HCOP_MISSING).then(|| cell.to_string())
}

/// Integer HCOP cell, `None` when empty or `-`
pub fn hcop_int(column: &str, cell: &str) -> Result<Option<i64>> {
    match hcop_text(cell) {
        None => Ok(None),
        Some(text) => text.parse().map(Some).map_err(|_| {
            ImportError::parse(format!("HCOP column '{}': '{}' is not an integer", column, text))
        }),
    }
}
