//! Dynamic queries over the imported HGNC tables
//!
//! Every entity kind has one entry point on [`HgncQuery`]. Filters are
//! validated against the entity's descriptor table, then compiled into a
//! single parameterized `SELECT DISTINCT` ordered by id.
//!
//! ```no_run
//! # async fn example(pool: sqlx::SqlitePool) -> Result<(), hgnc_server::query::QueryError> {
//! use hgnc_server::query::{EnzymeFilter, HgncQuery};
//!
//! let query = HgncQuery::new(pool);
//! let enzymes = query
//!     .enzyme(&EnzymeFilter {
//!         hgnc_symbol: Some("ADH1%".into()),
//!         ..Default::default()
//!     })
//!     .await?;
//! println!("{} enzymes", enzymes.len());
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod descriptor;
pub mod entities;
pub mod limit;
pub mod table;
pub mod value;

pub use descriptor::{Entity, EntityDescriptor, FieldType, FilterDescriptor, MatchKind};
pub use entities::{
    AliasNameFilter, AliasSymbolFilter, CcdsFilter, EnaFilter, EntityFilter, EnzymeFilter,
    GeneFamilyFilter, HgncFilter, LsdbFilter, MgdFilter, OmimFilter, OrthologyPredictionFilter,
    PubMedFilter, RefSeqFilter, RgdFilter, UniProtFilter,
};
pub use limit::Limit;
pub use table::{QueryOutput, Table};
pub use value::{FilterValue, Filters};

use serde::Serialize;
use serde_json::Value;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::FromRow;
use thiserror::Error;

use crate::models::{
    AliasName, AliasSymbol, Ccds, Ena, Enzyme, GeneFamily, Hgnc, Lsdb, Mgd, Omim,
    OrthologyPrediction, PubMed, RefSeq, Rgd, UniProt,
};

/// Query-side errors
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Unknown entity '{0}'")]
    UnknownEntity(String),

    #[error("Unknown filter '{0}'")]
    UnknownFilter(String),

    #[error("Invalid value for filter '{filter}': expected {expected}, found {found}")]
    InvalidFilterValue {
        filter: String,
        expected: &'static str,
        found: String,
    },

    #[error("Invalid limit: {0}")]
    InvalidLimit(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl QueryError {
    /// Whether the caller's input caused the error
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            QueryError::UnknownEntity(_)
                | QueryError::UnknownFilter(_)
                | QueryError::InvalidFilterValue { .. }
                | QueryError::InvalidLimit(_)
                | QueryError::InvalidRequest(_)
        )
    }
}

/// Read-only query façade over a pool
#[derive(Debug, Clone)]
pub struct HgncQuery {
    pool: SqlitePool,
}

impl HgncQuery {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run a typed entity query
    pub async fn query<F: EntityFilter>(
        &self,
        filter: &F,
    ) -> Result<QueryOutput<F::Record>, QueryError> {
        let descriptor = F::ENTITY.descriptor();
        let records: Vec<F::Record> =
            self.fetch(descriptor, &filter.filters(), &filter.limit()).await?;

        if filter.as_table() {
            Ok(QueryOutput::Table(Table::from_records(descriptor.columns, &records)?))
        } else {
            Ok(QueryOutput::Records(records))
        }
    }

    pub async fn hgnc(&self, filter: &HgncFilter) -> Result<QueryOutput<Hgnc>, QueryError> {
        self.query(filter).await
    }

    pub async fn alias_symbol(
        &self,
        filter: &AliasSymbolFilter,
    ) -> Result<QueryOutput<AliasSymbol>, QueryError> {
        self.query(filter).await
    }

    pub async fn alias_name(
        &self,
        filter: &AliasNameFilter,
    ) -> Result<QueryOutput<AliasName>, QueryError> {
        self.query(filter).await
    }

    pub async fn gene_family(
        &self,
        filter: &GeneFamilyFilter,
    ) -> Result<QueryOutput<GeneFamily>, QueryError> {
        self.query(filter).await
    }

    pub async fn ref_seq(&self, filter: &RefSeqFilter) -> Result<QueryOutput<RefSeq>, QueryError> {
        self.query(filter).await
    }

    pub async fn rgd(&self, filter: &RgdFilter) -> Result<QueryOutput<Rgd>, QueryError> {
        self.query(filter).await
    }

    pub async fn omim(&self, filter: &OmimFilter) -> Result<QueryOutput<Omim>, QueryError> {
        self.query(filter).await
    }

    pub async fn mgd(&self, filter: &MgdFilter) -> Result<QueryOutput<Mgd>, QueryError> {
        self.query(filter).await
    }

    pub async fn uniprot(&self, filter: &UniProtFilter) -> Result<QueryOutput<UniProt>, QueryError> {
        self.query(filter).await
    }

    pub async fn ccds(&self, filter: &CcdsFilter) -> Result<QueryOutput<Ccds>, QueryError> {
        self.query(filter).await
    }

    pub async fn pubmed(&self, filter: &PubMedFilter) -> Result<QueryOutput<PubMed>, QueryError> {
        self.query(filter).await
    }

    pub async fn ena(&self, filter: &EnaFilter) -> Result<QueryOutput<Ena>, QueryError> {
        self.query(filter).await
    }

    pub async fn enzyme(&self, filter: &EnzymeFilter) -> Result<QueryOutput<Enzyme>, QueryError> {
        self.query(filter).await
    }

    pub async fn lsdb(&self, filter: &LsdbFilter) -> Result<QueryOutput<Lsdb>, QueryError> {
        self.query(filter).await
    }

    pub async fn orthology_prediction(
        &self,
        filter: &OrthologyPredictionFilter,
    ) -> Result<QueryOutput<OrthologyPrediction>, QueryError> {
        self.query(filter).await
    }

    /// Run a query from an untyped filter map
    ///
    /// Records come back as JSON objects keyed by column name.
    pub async fn run(
        &self,
        entity: Entity,
        filters: &Filters,
        limit: Limit,
        as_table: bool,
    ) -> Result<QueryOutput<Value>, QueryError> {
        match entity {
            Entity::Hgnc => self.run_as::<Hgnc>(entity, filters, limit, as_table).await,
            Entity::AliasSymbol => {
                self.run_as::<AliasSymbol>(entity, filters, limit, as_table).await
            },
            Entity::AliasName => self.run_as::<AliasName>(entity, filters, limit, as_table).await,
            Entity::GeneFamily => {
                self.run_as::<GeneFamily>(entity, filters, limit, as_table).await
            },
            Entity::RefSeq => self.run_as::<RefSeq>(entity, filters, limit, as_table).await,
            Entity::Rgd => self.run_as::<Rgd>(entity, filters, limit, as_table).await,
            Entity::Omim => self.run_as::<Omim>(entity, filters, limit, as_table).await,
            Entity::Mgd => self.run_as::<Mgd>(entity, filters, limit, as_table).await,
            Entity::Uniprot => self.run_as::<UniProt>(entity, filters, limit, as_table).await,
            Entity::Ccds => self.run_as::<Ccds>(entity, filters, limit, as_table).await,
            Entity::Pubmed => self.run_as::<PubMed>(entity, filters, limit, as_table).await,
            Entity::Ena => self.run_as::<Ena>(entity, filters, limit, as_table).await,
            Entity::Enzyme => self.run_as::<Enzyme>(entity, filters, limit, as_table).await,
            Entity::Lsdb => self.run_as::<Lsdb>(entity, filters, limit, as_table).await,
            Entity::OrthologyPrediction => {
                self.run_as::<OrthologyPrediction>(entity, filters, limit, as_table)
                    .await
            },
        }
    }

    async fn run_as<T>(
        &self,
        entity: Entity,
        filters: &Filters,
        limit: Limit,
        as_table: bool,
    ) -> Result<QueryOutput<Value>, QueryError>
    where
        T: Serialize + for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let descriptor = entity.descriptor();
        let records: Vec<T> = self.fetch(descriptor, filters, &limit).await?;

        if as_table {
            return Ok(QueryOutput::Table(Table::from_records(descriptor.columns, &records)?));
        }

        let values = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(QueryOutput::Records(values))
    }

    async fn fetch<T>(
        &self,
        descriptor: &'static EntityDescriptor,
        filters: &Filters,
        limit: &Limit,
    ) -> Result<Vec<T>, QueryError>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let mut builder = builder::select(descriptor, filters, limit)?;
        tracing::debug!(entity = %descriptor.entity, sql = builder.sql(), "Executing query");

        let records = builder.build_query_as::<T>().fetch_all(&self.pool).await?;

        tracing::debug!(entity = %descriptor.entity, rows = records.len(), "Query complete");
        Ok(records)
    }
}
