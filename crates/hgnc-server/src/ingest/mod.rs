//! Data ingestion
//!
//! - **hgnc**: full snapshot import of the HGNC complete set plus HCOP
//!   ortholog predictions into the relational schema

pub mod hgnc;

pub use hgnc::{HgncPipeline, ImportConfig, ImportError, ImportSummary};
