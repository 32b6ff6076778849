//! Per-entity filter descriptor tables
//!
//! Every queryable entity has one static [`EntityDescriptor`] listing its
//! table, its columns in schema order, how it relates to `hgnc_hgnc`, and the
//! filters it accepts. The query builder only ever iterates these tables.

use std::fmt;
use std::str::FromStr;

use super::QueryError;
use crate::db::schema::tables;

/// Queryable entity kinds, one per entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Entity {
    Hgnc,
    AliasSymbol,
    AliasName,
    GeneFamily,
    RefSeq,
    Rgd,
    Omim,
    Mgd,
    Uniprot,
    Ccds,
    Pubmed,
    Ena,
    Enzyme,
    Lsdb,
    OrthologyPrediction,
}

impl Entity {
    pub const ALL: [Entity; 15] = [
        Entity::Hgnc,
        Entity::AliasSymbol,
        Entity::AliasName,
        Entity::GeneFamily,
        Entity::RefSeq,
        Entity::Rgd,
        Entity::Omim,
        Entity::Mgd,
        Entity::Uniprot,
        Entity::Ccds,
        Entity::Pubmed,
        Entity::Ena,
        Entity::Enzyme,
        Entity::Lsdb,
        Entity::OrthologyPrediction,
    ];

    /// Entry point name, also the REST path segment
    pub fn name(self) -> &'static str {
        match self {
            Entity::Hgnc => "hgnc",
            Entity::AliasSymbol => "alias_symbol",
            Entity::AliasName => "alias_name",
            Entity::GeneFamily => "gene_family",
            Entity::RefSeq => "ref_seq",
            Entity::Rgd => "rgd",
            Entity::Omim => "omim",
            Entity::Mgd => "mgd",
            Entity::Uniprot => "uniprot",
            Entity::Ccds => "ccds",
            Entity::Pubmed => "pubmed",
            Entity::Ena => "ena",
            Entity::Enzyme => "enzyme",
            Entity::Lsdb => "lsdb",
            Entity::OrthologyPrediction => "orthology_prediction",
        }
    }

    pub fn descriptor(self) -> &'static EntityDescriptor {
        match self {
            Entity::Hgnc => &HGNC,
            Entity::AliasSymbol => &ALIAS_SYMBOL,
            Entity::AliasName => &ALIAS_NAME,
            Entity::GeneFamily => &GENE_FAMILY,
            Entity::RefSeq => &REF_SEQ,
            Entity::Rgd => &RGD,
            Entity::Omim => &OMIM,
            Entity::Mgd => &MGD,
            Entity::Uniprot => &UNIPROT,
            Entity::Ccds => &CCDS,
            Entity::Pubmed => &PUBMED,
            Entity::Ena => &ENA,
            Entity::Enzyme => &ENZYME,
            Entity::Lsdb => &LSDB,
            Entity::OrthologyPrediction => &ORTHOLOGY_PREDICTION,
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Entity {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Entity::ALL
            .into_iter()
            .find(|entity| entity.name() == s)
            .ok_or_else(|| QueryError::UnknownEntity(s.to_string()))
    }
}

/// Storage type of a filtered column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Integer,
    Boolean,
}

impl FieldType {
    pub fn describe(self) -> &'static str {
        match self {
            FieldType::Text => "a string",
            FieldType::Integer => "an integer",
            FieldType::Boolean => "a boolean",
        }
    }
}

/// How a filter value is compared against its column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// `column = ?`
    Equals,
    /// `column LIKE ?`, `%` and `_` are wildcards
    Like,
    /// `column IN (?, ...)`
    Membership,
}

/// Table a filter's column lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinTarget {
    /// The queried entity's own table
    Base,
    /// The related `hgnc_hgnc` row
    Hgnc,
}

/// How an entity reaches `hgnc_hgnc`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// The entity is `hgnc_hgnc` itself
    Root,
    /// One-to-many through the entity's own `hgnc_id` column
    Owned,
    /// Many-to-many through a join table
    Shared {
        link_table: &'static str,
        link_column: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterDescriptor {
    pub name: &'static str,
    pub column: &'static str,
    pub join: JoinTarget,
    pub field_type: FieldType,
    /// Match kind for a scalar value; sets always use Membership
    pub kind: MatchKind,
}

impl FilterDescriptor {
    const fn text(name: &'static str) -> Self {
        Self {
            name,
            column: name,
            join: JoinTarget::Base,
            field_type: FieldType::Text,
            kind: MatchKind::Like,
        }
    }

    const fn integer(name: &'static str) -> Self {
        Self {
            name,
            column: name,
            join: JoinTarget::Base,
            field_type: FieldType::Integer,
            kind: MatchKind::Equals,
        }
    }

    const fn boolean(name: &'static str) -> Self {
        Self {
            name,
            column: name,
            join: JoinTarget::Base,
            field_type: FieldType::Boolean,
            kind: MatchKind::Equals,
        }
    }
}

const HGNC_SYMBOL: FilterDescriptor = FilterDescriptor {
    name: "hgnc_symbol",
    column: "symbol",
    join: JoinTarget::Hgnc,
    field_type: FieldType::Text,
    kind: MatchKind::Like,
};

const HGNC_IDENTIFIER: FilterDescriptor = FilterDescriptor {
    name: "hgnc_identifier",
    column: "identifier",
    join: JoinTarget::Hgnc,
    field_type: FieldType::Integer,
    kind: MatchKind::Equals,
};

#[derive(Debug)]
pub struct EntityDescriptor {
    pub entity: Entity,
    pub table: &'static str,
    /// Columns in schema order
    pub columns: &'static [&'static str],
    pub relation: Relation,
    pub filters: &'static [FilterDescriptor],
}

impl EntityDescriptor {
    pub fn filter(&self, name: &str) -> Option<&'static FilterDescriptor> {
        self.filters.iter().find(|f| f.name == name)
    }

    pub fn filter_names(&self) -> impl Iterator<Item = &'static str> {
        self.filters.iter().map(|f| f.name)
    }
}

const fn shared(kind: crate::models::SharedKind) -> Relation {
    Relation::Shared {
        link_table: kind.link_table(),
        link_column: kind.link_column(),
    }
}

use FilterDescriptor as F;

static HGNC: EntityDescriptor = EntityDescriptor {
    entity: Entity::Hgnc,
    table: tables::HGNC,
    columns: &[
        "id",
        "identifier",
        "symbol",
        "name",
        "status",
        "uuid",
        "locus_group",
        "locus_type",
        "orphanet",
        "date_name_changed",
        "date_modified",
        "date_symbol_changed",
        "date_approved_reserved",
        "ensembl_gene",
        "vega",
        "lncrnadb",
        "horde",
        "entrez",
        "mirbase",
        "iuphar",
        "ucsc",
        "snornabase",
        "intermediatefilamentdb",
        "pseudogeneorg",
        "bioparadigmsslc",
        "locationsortable",
        "merops",
        "location",
        "cosmic",
        "imgt",
    ],
    relation: Relation::Root,
    filters: &[
        F::text("name"),
        F::text("symbol"),
        F::integer("identifier"),
        F::text("status"),
        F::text("uuid"),
        F::integer("orphanet"),
        F::text("locus_group"),
        F::text("locus_type"),
        F::text("date_name_changed"),
        F::text("date_modified"),
        F::text("date_symbol_changed"),
        F::text("date_approved_reserved"),
        F::text("ensembl_gene"),
        F::text("vega"),
        F::text("lncrnadb"),
        F::text("horde"),
        F::text("entrez"),
        F::text("mirbase"),
        F::text("iuphar"),
        F::text("ucsc"),
        F::text("snornabase"),
        F::text("intermediatefilamentdb"),
        F::text("pseudogeneorg"),
        F::text("bioparadigmsslc"),
        F::text("locationsortable"),
        F::text("merops"),
        F::text("location"),
        F::text("cosmic"),
        F::text("imgt"),
    ],
};

static ALIAS_SYMBOL: EntityDescriptor = EntityDescriptor {
    entity: Entity::AliasSymbol,
    table: tables::ALIAS_SYMBOL,
    columns: &["id", "alias_symbol", "is_previous_symbol", "hgnc_id"],
    relation: Relation::Owned,
    filters: &[
        F::text("alias_symbol"),
        F::boolean("is_previous_symbol"),
        HGNC_SYMBOL,
        HGNC_IDENTIFIER,
    ],
};

static ALIAS_NAME: EntityDescriptor = EntityDescriptor {
    entity: Entity::AliasName,
    table: tables::ALIAS_NAME,
    columns: &["id", "alias_name", "is_previous_name", "hgnc_id"],
    relation: Relation::Owned,
    filters: &[
        F::text("alias_name"),
        F::boolean("is_previous_name"),
        HGNC_SYMBOL,
        HGNC_IDENTIFIER,
    ],
};

static GENE_FAMILY: EntityDescriptor = EntityDescriptor {
    entity: Entity::GeneFamily,
    table: tables::GENE_FAMILY,
    columns: &["id", "family_identifier", "family_name"],
    relation: shared(crate::models::SharedKind::GeneFamily),
    filters: &[
        F::integer("family_identifier"),
        F::text("family_name"),
        HGNC_SYMBOL,
        HGNC_IDENTIFIER,
    ],
};

static REF_SEQ: EntityDescriptor = EntityDescriptor {
    entity: Entity::RefSeq,
    table: tables::REF_SEQ,
    columns: &["id", "accession"],
    relation: shared(crate::models::SharedKind::RefSeq),
    filters: &[F::text("accession"), HGNC_SYMBOL, HGNC_IDENTIFIER],
};

static RGD: EntityDescriptor = EntityDescriptor {
    entity: Entity::Rgd,
    table: tables::RGD,
    columns: &["id", "rgdid"],
    relation: shared(crate::models::SharedKind::Rgd),
    filters: &[F::integer("rgdid"), HGNC_SYMBOL, HGNC_IDENTIFIER],
};

static OMIM: EntityDescriptor = EntityDescriptor {
    entity: Entity::Omim,
    table: tables::OMIM,
    columns: &["id", "omimid", "hgnc_id"],
    relation: Relation::Owned,
    filters: &[F::integer("omimid"), HGNC_SYMBOL, HGNC_IDENTIFIER],
};

static MGD: EntityDescriptor = EntityDescriptor {
    entity: Entity::Mgd,
    table: tables::MGD,
    columns: &["id", "mgdid"],
    relation: shared(crate::models::SharedKind::Mgd),
    filters: &[F::integer("mgdid"), HGNC_SYMBOL, HGNC_IDENTIFIER],
};

static UNIPROT: EntityDescriptor = EntityDescriptor {
    entity: Entity::Uniprot,
    table: tables::UNIPROT,
    columns: &["id", "uniprotid"],
    relation: shared(crate::models::SharedKind::UniProt),
    filters: &[F::text("uniprotid"), HGNC_SYMBOL, HGNC_IDENTIFIER],
};

static CCDS: EntityDescriptor = EntityDescriptor {
    entity: Entity::Ccds,
    table: tables::CCDS,
    columns: &["id", "ccdsid", "hgnc_id"],
    relation: Relation::Owned,
    filters: &[F::text("ccdsid"), HGNC_SYMBOL, HGNC_IDENTIFIER],
};

static PUBMED: EntityDescriptor = EntityDescriptor {
    entity: Entity::Pubmed,
    table: tables::PUBMED,
    columns: &["id", "pubmedid"],
    relation: shared(crate::models::SharedKind::PubMed),
    filters: &[F::integer("pubmedid"), HGNC_SYMBOL, HGNC_IDENTIFIER],
};

static ENA: EntityDescriptor = EntityDescriptor {
    entity: Entity::Ena,
    table: tables::ENA,
    columns: &["id", "enaid"],
    relation: shared(crate::models::SharedKind::Ena),
    filters: &[F::text("enaid"), HGNC_SYMBOL, HGNC_IDENTIFIER],
};

static ENZYME: EntityDescriptor = EntityDescriptor {
    entity: Entity::Enzyme,
    table: tables::ENZYME,
    columns: &["id", "ec_number"],
    relation: shared(crate::models::SharedKind::Enzyme),
    filters: &[F::text("ec_number"), HGNC_SYMBOL, HGNC_IDENTIFIER],
};

static LSDB: EntityDescriptor = EntityDescriptor {
    entity: Entity::Lsdb,
    table: tables::LSDB,
    columns: &["id", "lsdb", "url", "hgnc_id"],
    relation: Relation::Owned,
    filters: &[F::text("lsdb"), F::text("url"), HGNC_SYMBOL, HGNC_IDENTIFIER],
};

static ORTHOLOGY_PREDICTION: EntityDescriptor = EntityDescriptor {
    entity: Entity::OrthologyPrediction,
    table: tables::ORTHOLOGY_PREDICTION,
    columns: &[
        "id",
        "ortholog_species",
        "human_entrez_gene",
        "human_ensembl_gene",
        "human_name",
        "human_symbol",
        "human_chr",
        "human_assert_ids",
        "ortholog_species_entrez_gene",
        "ortholog_species_ensembl_gene",
        "ortholog_species_db_id",
        "ortholog_species_name",
        "ortholog_species_symbol",
        "ortholog_species_chr",
        "ortholog_species_assert_ids",
        "support",
        "hgnc_id",
    ],
    relation: Relation::Owned,
    filters: &[
        F::integer("ortholog_species"),
        F::integer("human_entrez_gene"),
        F::text("human_ensembl_gene"),
        F::text("human_name"),
        F::text("human_symbol"),
        F::text("human_chr"),
        F::text("human_assert_ids"),
        F::integer("ortholog_species_entrez_gene"),
        F::text("ortholog_species_ensembl_gene"),
        F::text("ortholog_species_db_id"),
        F::text("ortholog_species_name"),
        F::text("ortholog_species_symbol"),
        F::text("ortholog_species_chr"),
        F::text("ortholog_species_assert_ids"),
        F::text("support"),
        HGNC_SYMBOL,
        HGNC_IDENTIFIER,
    ],
};
