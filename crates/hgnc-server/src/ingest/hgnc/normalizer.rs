// HGNC Record Normalizer
//
// Turns one raw `response.docs` element into a GeneRecord. Owned rows get
// fresh ids from per-table sequences; shared rows come from the DedupCache.

use std::collections::HashSet;
use std::sync::Arc;

use super::dedup::{DedupCache, IdSequence};
use super::models::{GeneRecord, RawGeneRecord};
use super::parser::{parse_prefixed_id, split_lsdb};
use super::{ImportError, Result};
use crate::models::{AliasName, AliasSymbol, Ccds, Hgnc, Lsdb, Omim};

/// Stateful normalizer for one import run
#[derive(Debug, Default)]
pub struct Normalizer {
    cache: DedupCache,
    gene_ids: IdSequence,
    alias_symbol_ids: IdSequence,
    alias_name_ids: IdSequence,
    omim_ids: IdSequence,
    ccds_ids: IdSequence,
    lsdb_ids: IdSequence,
    seen_identifiers: HashSet<i64>,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(&self) -> &DedupCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut DedupCache {
        &mut self.cache
    }

    /// Number of genes normalized so far
    pub fn genes(&self) -> i64 {
        self.gene_ids.issued()
    }

    /// Normalize one record
    ///
    /// Fails on a missing required field, a malformed value, or an HGNC
    /// identifier already seen in this run.
    pub fn normalize(&mut self, raw: &RawGeneRecord) -> Result<GeneRecord> {
        let hgnc_id = raw.required_str("hgnc_id")?;
        let identifier = parse_prefixed_id(&hgnc_id)?;

        let mut hgnc = Hgnc {
            id: 0,
            identifier,
            symbol: raw.required_str("symbol")?,
            name: raw.required_str("name")?,
            status: raw.required_str("status")?,
            uuid: raw.required_str("uuid")?,
            locus_group: raw.required_str("locus_group")?,
            locus_type: raw.required_str("locus_type")?,
            orphanet: raw.optional_int("orphanet")?,
            date_name_changed: raw.optional_date("date_name_changed")?,
            date_modified: raw.optional_date("date_modified")?,
            date_symbol_changed: raw.optional_date("date_symbol_changed")?,
            date_approved_reserved: raw.optional_date("date_approved_reserved")?,
            ensembl_gene: raw.optional_str("ensembl_gene_id")?,
            vega: raw.optional_str("vega_id")?,
            lncrnadb: raw.optional_str("lncrnadb")?,
            horde: raw.optional_str("horde_id")?,
            entrez: raw.optional_str("entrez_id")?,
            mirbase: raw.optional_str("mirbase")?,
            iuphar: raw.optional_str("iuphar")?,
            ucsc: raw.optional_str("ucsc_id")?,
            snornabase: raw.optional_str("snornabase")?,
            intermediatefilamentdb: raw.optional_str("intermediate_filament_db")?,
            pseudogeneorg: raw.optional_str("pseudogene.org")?,
            bioparadigmsslc: raw.optional_str("bioparadigms_slc")?,
            locationsortable: raw.optional_str("location_sortable")?,
            merops: raw.optional_str("merops")?,
            location: raw.optional_str("location")?,
            cosmic: raw.optional_str("cosmic")?,
            imgt: raw.optional_str("imgt")?,
        };

        // Checked last so a record that fails validation does not consume an id.
        let families = self.family_pairs(raw)?;
        if !self.seen_identifiers.insert(identifier) {
            return Err(ImportError::Validation(format!(
                "duplicate HGNC identifier {} ({})",
                identifier, hgnc.symbol
            )));
        }
        hgnc.id = self.gene_ids.next_id();
        let gene_id = hgnc.id;

        let mut record = GeneRecord {
            hgnc,
            alias_symbols: Vec::new(),
            alias_names: Vec::new(),
            omims: Vec::new(),
            ccds: Vec::new(),
            lsdbs: Vec::new(),
            gene_families: Vec::new(),
            ref_seqs: Vec::new(),
            rgds: Vec::new(),
            mgds: Vec::new(),
            uniprots: Vec::new(),
            pubmeds: Vec::new(),
            enas: Vec::new(),
            enzymes: Vec::new(),
        };

        // Aliases: the previous list is used only when the current one is absent.
        let (symbols, is_previous_symbol) = if raw.has("alias_symbol") {
            (raw.str_list("alias_symbol")?, false)
        } else {
            (raw.str_list("prev_symbol")?, true)
        };
        for alias_symbol in symbols {
            record.alias_symbols.push(AliasSymbol {
                id: self.alias_symbol_ids.next_id(),
                alias_symbol,
                is_previous_symbol,
                hgnc_id: gene_id,
            });
        }

        let (names, is_previous_name) = if raw.has("alias_name") {
            (raw.str_list("alias_name")?, false)
        } else {
            (raw.str_list("prev_name")?, true)
        };
        for alias_name in names {
            record.alias_names.push(AliasName {
                id: self.alias_name_ids.next_id(),
                alias_name,
                is_previous_name,
                hgnc_id: gene_id,
            });
        }

        for omim in raw.str_list("omim_id")? {
            record.omims.push(Omim {
                id: self.omim_ids.next_id(),
                omimid: parse_prefixed_id(&omim)?,
                hgnc_id: gene_id,
            });
        }

        for ccdsid in raw.str_list("ccds_id")? {
            record.ccds.push(Ccds {
                id: self.ccds_ids.next_id(),
                ccdsid,
                hgnc_id: gene_id,
            });
        }

        for entry in raw.str_list("lsdb")? {
            let (lsdb, url) = split_lsdb(&entry);
            record.lsdbs.push(Lsdb {
                id: self.lsdb_ids.next_id(),
                lsdb,
                url,
                hgnc_id: gene_id,
            });
        }

        // Shared entities
        for (family_identifier, family_name) in families {
            push_unique(
                &mut record.gene_families,
                self.cache.gene_family(family_identifier, &family_name),
            );
        }
        for accession in raw.str_list("refseq_accession")? {
            push_unique(&mut record.ref_seqs, self.cache.ref_seq(&accession));
        }
        for rgd in raw.str_list("rgd_id")? {
            push_unique(&mut record.rgds, self.cache.rgd(&rgd)?);
        }
        for mgd in raw.str_list("mgd_id")? {
            push_unique(&mut record.mgds, self.cache.mgd(&mgd)?);
        }
        for accession in raw.str_list("uniprot_ids")? {
            push_unique(&mut record.uniprots, self.cache.uniprot(&accession));
        }
        for pubmedid in raw.int_list("pubmed_id")? {
            push_unique(&mut record.pubmeds, self.cache.pubmed(pubmedid));
        }
        for accession in raw.str_list("ena")? {
            push_unique(&mut record.enas, self.cache.ena(&accession));
        }
        for ec_number in raw.str_list("enzyme_id")? {
            push_unique(&mut record.enzymes, self.cache.enzyme(&ec_number));
        }

        Ok(record)
    }

    /// Zip family names with family identifiers
    ///
    /// `gene_group`/`gene_group_id` are read when the `gene_family` spelling
    /// is absent.
    fn family_pairs(&self, raw: &RawGeneRecord) -> Result<Vec<(i64, String)>> {
        let (names_field, ids_field) = if raw.has("gene_family") || raw.has("gene_family_id") {
            ("gene_family", "gene_family_id")
        } else {
            ("gene_group", "gene_group_id")
        };

        let names = raw.str_list(names_field)?;
        let ids = raw.int_list(ids_field)?;
        if names.len() != ids.len() {
            return Err(ImportError::Validation(format!(
                "{}: {} has {} entries but {} has {}",
                raw.label(),
                names_field,
                names.len(),
                ids_field,
                ids.len()
            )));
        }

        Ok(ids.into_iter().zip(names).collect())
    }
}

fn push_unique<E>(items: &mut Vec<Arc<E>>, item: Arc<E>) {
    if !items.iter().any(|existing| Arc::ptr_eq(existing, &item)) {
        items.push(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SharedKind;
    use serde_json::{json, Value};

    fn raw(value: Value) -> RawGeneRecord {
        serde_json::from_value(value).unwrap()
    }

    fn minimal(hgnc_id: &str, symbol: &str) -> Value {
        json!({
            "hgnc_id": hgnc_id,
            "symbol": symbol,
            "name": format!("{} name", symbol),
            "status": "Approved",
            "uuid": format!("uuid-{}", symbol),
            "locus_group": "protein-coding gene",
            "locus_type": "gene with protein product"
        })
    }

    fn with(mut base: Value, extra: Value) -> Value {
        if let (Value::Object(base), Value::Object(extra)) = (&mut base, extra) {
            base.extend(extra);
        }
        base
    }

    #[test]
    fn test_normalize_scalars() {
        let mut normalizer = Normalizer::new();
        let record = normalizer
            .normalize(&raw(with(
                minimal("HGNC:5", "A1BG"),
                json!({
                    "ensembl_gene_id": "ENSG00000121410",
                    "entrez_id": "1",
                    "location_sortable": "19q13.43",
                    "pseudogene.org": "PGOHUM00000001",
                    "orphanet": 140,
                    "date_approved_reserved": "1989-06-30"
                }),
            )))
            .unwrap();

        let hgnc = &record.hgnc;
        assert_eq!(hgnc.id, 1);
        assert_eq!(hgnc.identifier, 5);
        assert_eq!(hgnc.ensembl_gene.as_deref(), Some("ENSG00000121410"));
        assert_eq!(hgnc.entrez.as_deref(), Some("1"));
        assert_eq!(hgnc.locationsortable.as_deref(), Some("19q13.43"));
        assert_eq!(hgnc.pseudogeneorg.as_deref(), Some("PGOHUM00000001"));
        assert_eq!(hgnc.orphanet, Some(140));
        assert_eq!(
            hgnc.date_approved_reserved,
            chrono::NaiveDate::from_ymd_opt(1989, 6, 30)
        );
        assert_eq!(hgnc.date_modified, None);
        assert_eq!(hgnc.vega, None);
    }

    #[test]
    fn test_missing_required_field() {
        let mut normalizer = Normalizer::new();
        let mut value = minimal("HGNC:5", "A1BG");
        value.as_object_mut().unwrap().remove("locus_type");

        let err = normalizer.normalize(&raw(value)).unwrap_err();
        assert!(matches!(err, ImportError::MissingField { field: "locus_type", .. }));
        assert_eq!(normalizer.genes(), 0);
    }

    #[test]
    fn test_alias_present_drops_previous() {
        let mut normalizer = Normalizer::new();
        let record = normalizer
            .normalize(&raw(with(
                minimal("HGNC:16155", "ZSWIM1"),
                json!({
                    "alias_symbol": ["dJ337O18.5"],
                    "prev_symbol": ["C20orf162"],
                    "prev_name": ["chromosome 20 open reading frame 162"]
                }),
            )))
            .unwrap();

        assert_eq!(record.alias_symbols.len(), 1);
        assert_eq!(record.alias_symbols[0].alias_symbol, "dJ337O18.5");
        assert!(!record.alias_symbols[0].is_previous_symbol);

        assert_eq!(record.alias_names.len(), 1);
        assert!(record.alias_names[0].is_previous_name);
    }

    #[test]
    fn test_previous_used_without_alias() {
        let mut normalizer = Normalizer::new();
        let record = normalizer
            .normalize(&raw(with(
                minimal("HGNC:250", "ADH1B"),
                json!({"prev_symbol": ["ADH2"]}),
            )))
            .unwrap();

        assert_eq!(record.alias_symbols.len(), 1);
        assert_eq!(record.alias_symbols[0].alias_symbol, "ADH2");
        assert!(record.alias_symbols[0].is_previous_symbol);
        assert_eq!(record.alias_symbols[0].hgnc_id, record.id());
    }

    #[test]
    fn test_shared_entities_are_deduplicated() {
        let mut normalizer = Normalizer::new();
        let first = normalizer
            .normalize(&raw(with(
                minimal("HGNC:249", "ADH1A"),
                json!({"enzyme_id": ["1.1.1.1"], "pubmed_id": [2591067]}),
            )))
            .unwrap();
        let second = normalizer
            .normalize(&raw(with(
                minimal("HGNC:250", "ADH1B"),
                json!({"enzyme_id": ["1.1.1.1", "1.1.1.1"], "pubmed_id": [3000771]}),
            )))
            .unwrap();

        assert!(Arc::ptr_eq(&first.enzymes[0], &second.enzymes[0]));
        assert_eq!(second.enzymes.len(), 1);
        assert_eq!(normalizer.cache().count(SharedKind::Enzyme), 1);
        assert_eq!(normalizer.cache().count(SharedKind::PubMed), 2);
        assert_eq!(second.id(), 2);
    }

    #[test]
    fn test_gene_families_are_zipped() {
        let mut normalizer = Normalizer::new();
        let record = normalizer
            .normalize(&raw(with(
                minimal("HGNC:5", "A1BG"),
                json!({
                    "gene_group": ["Immunoglobulin like domain containing"],
                    "gene_group_id": [594]
                }),
            )))
            .unwrap();

        assert_eq!(record.gene_families.len(), 1);
        assert_eq!(record.gene_families[0].family_identifier, 594);
        assert_eq!(
            record.gene_families[0].family_name,
            "Immunoglobulin like domain containing"
        );
    }

    #[test]
    fn test_gene_family_length_mismatch() {
        let mut normalizer = Normalizer::new();
        let err = normalizer
            .normalize(&raw(with(
                minimal("HGNC:5", "A1BG"),
                json!({"gene_family": ["a", "b"], "gene_family_id": [1]}),
            )))
            .unwrap_err();

        assert!(matches!(err, ImportError::Validation(_)));
    }

    #[test]
    fn test_owned_lists() {
        let mut normalizer = Normalizer::new();
        let record = normalizer
            .normalize(&raw(with(
                minimal("HGNC:250", "ADH1B"),
                json!({
                    "omim_id": ["103720"],
                    "ccds_id": ["CCDS3647", "CCDS54786"],
                    "lsdb": ["LRG_1|http://ftp.ebi.ac.uk/pub/databases/lrgex/LRG_1.xml"]
                }),
            )))
            .unwrap();

        assert_eq!(record.omims[0].omimid, 103720);
        assert_eq!(record.ccds.len(), 2);
        assert_eq!(record.ccds[1].id, 2);
        assert_eq!(record.lsdbs[0].lsdb, "LRG_1");
        assert!(record.lsdbs[0].url.as_deref().unwrap().ends_with("LRG_1.xml"));
    }

    #[test]
    fn test_duplicate_identifier_rejected() {
        let mut normalizer = Normalizer::new();
        normalizer.normalize(&raw(minimal("HGNC:5", "A1BG"))).unwrap();
        let err = normalizer.normalize(&raw(minimal("HGNC:5", "A1BG"))).unwrap_err();
        assert!(matches!(err, ImportError::Validation(_)));
    }

    #[test]
    fn test_malformed_identifier() {
        let mut normalizer = Normalizer::new();
        let err = normalizer.normalize(&raw(minimal("HGNC:five", "A1BG"))).unwrap_err();
        assert!(err.is_parse_error());

        let err = normalizer
            .normalize(&raw(with(minimal("HGNC:6", "A1BG"), json!({"mgd_id": ["MGI:x"]}))))
            .unwrap_err();
        assert!(err.is_parse_error());
    }
}
