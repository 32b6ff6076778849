//! HGNC Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared error handling and logging for the HGNC workspace members.
//!
//! # Example
//!
//! ```no_run
//! use hgnc_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> hgnc_common::Result<()> {
//!     let _guard = init_logging(&LogConfig::from_env()?)?;
//!     tracing::info!("ready");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;

pub use error::{HgncError, Result};
