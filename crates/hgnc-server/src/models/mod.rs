//! Row types for the persisted HGNC schema
//!
//! Field names match column names, so a record serialized to JSON has exactly
//! the keys of its table. Ids are assigned by the import run, not by the store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::db::schema::tables;

// ============================================================================
// Root entity
// ============================================================================

/// One HGNC gene record with its single-valued attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Hgnc {
    pub id: i64,
    /// Numeric part of the HGNC id, e.g. 5 for "HGNC:5"
    pub identifier: i64,
    pub symbol: String,
    pub name: String,
    pub status: String,
    pub uuid: String,
    pub locus_group: String,
    pub locus_type: String,
    pub orphanet: Option<i64>,
    pub date_name_changed: Option<NaiveDate>,
    pub date_modified: Option<NaiveDate>,
    pub date_symbol_changed: Option<NaiveDate>,
    pub date_approved_reserved: Option<NaiveDate>,
    pub ensembl_gene: Option<String>,
    pub vega: Option<String>,
    pub lncrnadb: Option<String>,
    pub horde: Option<String>,
    pub entrez: Option<String>,
    pub mirbase: Option<String>,
    pub iuphar: Option<String>,
    pub ucsc: Option<String>,
    pub snornabase: Option<String>,
    pub intermediatefilamentdb: Option<String>,
    pub pseudogeneorg: Option<String>,
    pub bioparadigmsslc: Option<String>,
    pub locationsortable: Option<String>,
    pub merops: Option<String>,
    pub location: Option<String>,
    pub cosmic: Option<String>,
    pub imgt: Option<String>,
}

// ============================================================================
// Owned entities (one parent, cascade on delete)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AliasSymbol {
    pub id: i64,
    pub alias_symbol: String,
    pub is_previous_symbol: bool,
    pub hgnc_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AliasName {
    pub id: i64,
    pub alias_name: String,
    pub is_previous_name: bool,
    pub hgnc_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Omim {
    pub id: i64,
    pub omimid: i64,
    pub hgnc_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Ccds {
    pub id: i64,
    pub ccdsid: String,
    pub hgnc_id: i64,
}

/// Locus specific database entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Lsdb {
    pub id: i64,
    pub lsdb: String,
    pub url: Option<String>,
    pub hgnc_id: i64,
}

/// One HCOP ortholog prediction row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct OrthologyPrediction {
    pub id: i64,
    pub ortholog_species: Option<i64>,
    pub human_entrez_gene: Option<i64>,
    pub human_ensembl_gene: Option<String>,
    pub human_name: Option<String>,
    pub human_symbol: Option<String>,
    pub human_chr: Option<String>,
    pub human_assert_ids: Option<String>,
    pub ortholog_species_entrez_gene: Option<i64>,
    pub ortholog_species_ensembl_gene: Option<String>,
    pub ortholog_species_db_id: Option<String>,
    pub ortholog_species_name: Option<String>,
    pub ortholog_species_symbol: Option<String>,
    pub ortholog_species_chr: Option<String>,
    pub ortholog_species_assert_ids: Option<String>,
    pub support: Option<String>,
    pub hgnc_id: i64,
}

// ============================================================================
// Shared entities (many-to-many, one row per natural key)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct GeneFamily {
    pub id: i64,
    pub family_identifier: i64,
    pub family_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct RefSeq {
    pub id: i64,
    pub accession: String,
}

/// Rat Genome Database identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Rgd {
    pub id: i64,
    pub rgdid: i64,
}

/// Mouse Genome Database identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Mgd {
    pub id: i64,
    pub mgdid: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UniProt {
    pub id: i64,
    pub uniprotid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PubMed {
    pub id: i64,
    pub pubmedid: i64,
}

/// European Nucleotide Archive accession
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Ena {
    pub id: i64,
    pub enaid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Enzyme {
    pub id: i64,
    pub ec_number: String,
}

/// Kinds of shared entity, each with its own table and join table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SharedKind {
    GeneFamily,
    RefSeq,
    Rgd,
    Mgd,
    UniProt,
    PubMed,
    Ena,
    Enzyme,
}

impl SharedKind {
    pub const ALL: [SharedKind; 8] = [
        SharedKind::GeneFamily,
        SharedKind::RefSeq,
        SharedKind::Rgd,
        SharedKind::Mgd,
        SharedKind::UniProt,
        SharedKind::PubMed,
        SharedKind::Ena,
        SharedKind::Enzyme,
    ];

    pub const fn table(self) -> &'static str {
        match self {
            SharedKind::GeneFamily => tables::GENE_FAMILY,
            SharedKind::RefSeq => tables::REF_SEQ,
            SharedKind::Rgd => tables::RGD,
            SharedKind::Mgd => tables::MGD,
            SharedKind::UniProt => tables::UNIPROT,
            SharedKind::PubMed => tables::PUBMED,
            SharedKind::Ena => tables::ENA,
            SharedKind::Enzyme => tables::ENZYME,
        }
    }

    /// Join table linking `hgnc_hgnc` to this kind
    pub const fn link_table(self) -> &'static str {
        match self {
            SharedKind::GeneFamily => tables::HGNC_GENE_FAMILY,
            SharedKind::RefSeq => tables::HGNC_REF_SEQ,
            SharedKind::Rgd => tables::HGNC_RGD,
            SharedKind::Mgd => tables::HGNC_MGD,
            SharedKind::UniProt => tables::HGNC_UNIPROT,
            SharedKind::PubMed => tables::HGNC_PUBMED,
            SharedKind::Ena => tables::HGNC_ENA,
            SharedKind::Enzyme => tables::HGNC_ENZYME,
        }
    }

    /// Foreign key column of the join table pointing at this kind
    pub const fn link_column(self) -> &'static str {
        match self {
            SharedKind::GeneFamily => "gene_family_id",
            SharedKind::RefSeq => "ref_seq_id",
            SharedKind::Rgd => "rgd_id",
            SharedKind::Mgd => "mgd_id",
            SharedKind::UniProt => "uniprot_id",
            SharedKind::PubMed => "pubmed_id",
            SharedKind::Ena => "ena_id",
            SharedKind::Enzyme => "enzyme_id",
        }
    }
}

impl std::fmt::Display for SharedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table().trim_start_matches(tables::TABLE_PREFIX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_kind_names() {
        assert_eq!(SharedKind::Enzyme.table(), "hgnc_enzyme");
        assert_eq!(SharedKind::Enzyme.link_table(), "hgnc_hgnc_enzyme");
        assert_eq!(SharedKind::GeneFamily.to_string(), "gene_family");
        assert_eq!(SharedKind::ALL.len(), 8);
    }

    #[test]
    fn test_hgnc_serializes_dates_as_iso() {
        let gene = Hgnc {
            id: 1,
            identifier: 5,
            symbol: "A1BG".to_string(),
            name: "alpha-1-B glycoprotein".to_string(),
            status: "Approved".to_string(),
            uuid: "fe3e34f6-c539-4337-82c1-1b4e8c115992".to_string(),
            locus_group: "protein-coding gene".to_string(),
            locus_type: "gene with protein product".to_string(),
            orphanet: None,
            date_name_changed: None,
            date_modified: None,
            date_symbol_changed: None,
            date_approved_reserved: NaiveDate::from_ymd_opt(1989, 6, 30),
            ensembl_gene: None,
            vega: None,
            lncrnadb: None,
            horde: None,
            entrez: None,
            mirbase: None,
            iuphar: None,
            ucsc: None,
            snornabase: None,
            intermediatefilamentdb: None,
            pseudogeneorg: None,
            bioparadigmsslc: None,
            locationsortable: None,
            merops: None,
            location: None,
            cosmic: None,
            imgt: None,
        };

        let json = serde_json::to_value(&gene).unwrap();
        assert_eq!(json["date_approved_reserved"], "1989-06-30");
        assert!(json["date_modified"].is_null());
    }
}
