//! HGNC Server Library
//!
//! Imports the HGNC complete set and the HCOP ortholog predictions into a
//! normalized SQLite schema, and serves filtered queries over it.
//!
//! # Overview
//!
//! - **Import**: [`ingest::HgncPipeline`] replaces the stored snapshot in one
//!   transaction. Shared cross references (gene families, RefSeq, UniProt and
//!   the like) are stored once and linked to every gene that cites them.
//! - **Query**: [`query::HgncQuery`] has one entry point per entity kind. Filters
//!   are validated against static descriptor tables before any SQL is built.
//! - **REST**: `/api/v1/query/:entity` exposes the same queries over HTTP.
//!
//! # Example
//!
//! ```no_run
//! use hgnc_server::{config::Config, db, ingest::HgncPipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let pool = db::create_pool(&config.db_config()).await?;
//!     let summary = HgncPipeline::new(pool, config.import).run().await?;
//!     println!("{} genes imported", summary.genes);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod ingest;
pub mod middleware;
pub mod models;
pub mod query;

pub use config::Config;
pub use error::AppError;
