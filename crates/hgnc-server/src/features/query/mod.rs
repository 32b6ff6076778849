pub mod queries;
pub mod routes;

pub use queries::QueryRequest;

pub use routes::query_routes;
