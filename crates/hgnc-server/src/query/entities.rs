//! Typed filter inputs, one per entry point
//!
//! Each struct has one optional field per filter of its entity descriptor,
//! plus `limit` and `as_table`.

use serde::Deserialize;
use sqlx::sqlite::SqliteRow;
use sqlx::FromRow;

use super::descriptor::Entity;
use super::limit::Limit;
use super::value::{FilterValue, Filters};
use crate::models::{
    AliasName, AliasSymbol, Ccds, Ena, Enzyme, GeneFamily, Hgnc, Lsdb, Mgd, Omim,
    OrthologyPrediction, PubMed, RefSeq, Rgd, UniProt,
};

/// A typed query input for one entity
pub trait EntityFilter {
    /// Row type returned by the query
    type Record: serde::Serialize + for<'r> FromRow<'r, SqliteRow> + Send + Unpin;

    const ENTITY: Entity;

    /// Filter field names, in declaration order
    const FIELDS: &'static [&'static str];

    /// The set filters as a name -> value map
    fn filters(&self) -> Filters;

    fn limit(&self) -> Limit;

    fn as_table(&self) -> bool;
}

macro_rules! entity_filter {
    ($(#[$meta:meta])* $name:ident => $record:ty, $entity:expr, [$($field:ident),+ $(,)?]) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Deserialize)]
        #[serde(default, deny_unknown_fields)]
        pub struct $name {
            $(pub $field: Option<FilterValue>,)+
            pub limit: Option<Limit>,
            pub as_table: bool,
        }

        impl EntityFilter for $name {
            type Record = $record;

            const ENTITY: Entity = $entity;

            const FIELDS: &'static [&'static str] = &[$(stringify!($field)),+];

            fn filters(&self) -> Filters {
                let mut filters = Filters::new();
                $(
                    if let Some(ref value) = self.$field {
                        filters.insert(stringify!($field).to_string(), value.clone());
                    }
                )+
                filters
            }

            fn limit(&self) -> Limit {
                self.limit.unwrap_or_default()
            }

            fn as_table(&self) -> bool {
                self.as_table
            }
        }
    };
}

entity_filter!(
    /// Filters for gene records
    HgncFilter => Hgnc, Entity::Hgnc, [
        name, symbol, identifier, status, uuid, orphanet, locus_group, locus_type,
        date_name_changed, date_modified, date_symbol_changed, date_approved_reserved,
        ensembl_gene, vega, lncrnadb, horde, entrez, mirbase, iuphar, ucsc, snornabase,
        intermediatefilamentdb, pseudogeneorg, bioparadigmsslc, locationsortable, merops,
        location, cosmic, imgt,
    ]
);

entity_filter!(
    AliasSymbolFilter => AliasSymbol, Entity::AliasSymbol,
    [alias_symbol, is_previous_symbol, hgnc_symbol, hgnc_identifier]
);

entity_filter!(
    AliasNameFilter => AliasName, Entity::AliasName,
    [alias_name, is_previous_name, hgnc_symbol, hgnc_identifier]
);

entity_filter!(
    GeneFamilyFilter => GeneFamily, Entity::GeneFamily,
    [family_identifier, family_name, hgnc_symbol, hgnc_identifier]
);

entity_filter!(RefSeqFilter => RefSeq, Entity::RefSeq, [accession, hgnc_symbol, hgnc_identifier]);

entity_filter!(RgdFilter => Rgd, Entity::Rgd, [rgdid, hgnc_symbol, hgnc_identifier]);

entity_filter!(OmimFilter => Omim, Entity::Omim, [omimid, hgnc_symbol, hgnc_identifier]);

entity_filter!(MgdFilter => Mgd, Entity::Mgd, [mgdid, hgnc_symbol, hgnc_identifier]);

entity_filter!(UniProtFilter => UniProt, Entity::Uniprot, [uniprotid, hgnc_symbol, hgnc_identifier]);

entity_filter!(CcdsFilter => Ccds, Entity::Ccds, [ccdsid, hgnc_symbol, hgnc_identifier]);

entity_filter!(PubMedFilter => PubMed, Entity::Pubmed, [pubmedid, hgnc_symbol, hgnc_identifier]);

entity_filter!(EnaFilter => Ena, Entity::Ena, [enaid, hgnc_symbol, hgnc_identifier]);

entity_filter!(EnzymeFilter => Enzyme, Entity::Enzyme, [ec_number, hgnc_symbol, hgnc_identifier]);

entity_filter!(LsdbFilter => Lsdb, Entity::Lsdb, [lsdb, url, hgnc_symbol, hgnc_identifier]);

entity_filter!(
    /// Filters for HCOP ortholog predictions
    OrthologyPredictionFilter => OrthologyPrediction, Entity::OrthologyPrediction, [
        ortholog_species, human_entrez_gene, human_ensembl_gene, human_name, human_symbol,
        human_chr, human_assert_ids, ortholog_species_entrez_gene, ortholog_species_ensembl_gene,
        ortholog_species_db_id, ortholog_species_name, ortholog_species_symbol,
        ortholog_species_chr, ortholog_species_assert_ids, support, hgnc_symbol, hgnc_identifier,
    ]
);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields_match_descriptor<F: EntityFilter>() {
        let descriptor = F::ENTITY.descriptor();
        let names: Vec<&str> = descriptor.filter_names().collect();
        assert_eq!(F::FIELDS, names.as_slice(), "{}", F::ENTITY);
    }

    #[test]
    fn test_every_struct_matches_its_descriptor() {
        fields_match_descriptor::<HgncFilter>();
        fields_match_descriptor::<AliasSymbolFilter>();
        fields_match_descriptor::<AliasNameFilter>();
        fields_match_descriptor::<GeneFamilyFilter>();
        fields_match_descriptor::<RefSeqFilter>();
        fields_match_descriptor::<RgdFilter>();
        fields_match_descriptor::<OmimFilter>();
        fields_match_descriptor::<MgdFilter>();
        fields_match_descriptor::<UniProtFilter>();
        fields_match_descriptor::<CcdsFilter>();
        fields_match_descriptor::<PubMedFilter>();
        fields_match_descriptor::<EnaFilter>();
        fields_match_descriptor::<EnzymeFilter>();
        fields_match_descriptor::<LsdbFilter>();
        fields_match_descriptor::<OrthologyPredictionFilter>();
    }

    #[test]
    fn test_filters_skip_unset_fields() {
        let filter = HgncFilter {
            symbol: Some("A1BG".into()),
            limit: Some(Limit::Rows(1)),
            ..Default::default()
        };

        let filters = filter.filters();
        assert_eq!(filters.len(), 1);
        assert_eq!(filters["symbol"], FilterValue::from("A1BG"));
        assert_eq!(filter.limit(), Limit::Rows(1));
        assert!(!filter.as_table());
    }

    #[test]
    fn test_deserialize() {
        let filter: EnzymeFilter = serde_json::from_value(json!({
            "ec_number": ["1.1.1.1", "1.1.1.71"],
            "hgnc_symbol": null,
            "limit": [0, 10],
            "as_table": true
        }))
        .unwrap();

        assert_eq!(filter.ec_number, Some(FilterValue::from(vec!["1.1.1.1", "1.1.1.71"])));
        assert_eq!(filter.hgnc_symbol, None);
        assert_eq!(filter.limit(), Limit::Page { page: 0, page_size: 10 });
        assert!(filter.as_table());

        assert!(serde_json::from_value::<EnzymeFilter>(json!({"symbol": "A1BG"})).is_err());
    }
}
