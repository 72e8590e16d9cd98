//! Custom extractors for Axum handlers.
//!
//! Each extractor rejects with an [`AppError`](crate::errors::AppError) so
//! malformed input gets the same JSON error body as domain failures.

pub mod id_path;
pub mod query_params;
pub mod validated_json;

pub use id_path::IdPath;
pub use query_params::QueryParams;
pub use validated_json::ValidatedJson;
