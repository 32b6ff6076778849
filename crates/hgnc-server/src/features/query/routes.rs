use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;

use super::queries::{self, QueryRequest};
use crate::api::response::ApiResponse;
use crate::error::AppError;
use crate::query::Entity;

pub fn query_routes() -> Router<SqlitePool> {
    Router::new().route("/:entity", get(query_get_handler).post(query_post_handler))
}

#[tracing::instrument(skip(pool, params))]
async fn query_get_handler(
    State(pool): State<SqlitePool>,
    Path(entity): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let entity: Entity = entity.parse()?;
    let request = QueryRequest::from_pairs(entity, params)?;
    execute(pool, request).await
}

#[tracing::instrument(skip(pool, body))]
async fn query_post_handler(
    State(pool): State<SqlitePool>,
    Path(entity): Path<String>,
    Json(body): Json<Value>,
) -> Result<Response, AppError> {
    let entity: Entity = entity.parse()?;
    let request = QueryRequest::from_json(entity, body)?;
    execute(pool, request).await
}

async fn execute(pool: SqlitePool, request: QueryRequest) -> Result<Response, AppError> {
    let entity = request.entity;
    let output = queries::handle(pool, request).await?;

    tracing::info!(%entity, rows = output.len(), "Query executed successfully");

    let meta = json!({ "entity": entity.name(), "rows": output.len() });
    Ok(ApiResponse::success_with_meta(output, meta).into_response())
}
