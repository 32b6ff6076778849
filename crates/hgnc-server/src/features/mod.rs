//! Feature modules implementing the HGNC API
//!
//! Each feature is a vertical slice with its own `queries/` and `routes.rs`.
//!
//! - **query**: filtered reads over every imported entity kind

pub mod query;

use axum::Router;
use sqlx::SqlitePool;

/// Create the API router with all feature routes mounted
///
/// - `/query/:entity` - entity queries, GET with a query string or POST with a JSON body
pub fn router(pool: SqlitePool) -> Router<()> {
    Router::new().nest("/query", query::query_routes().with_state(pool))
}
