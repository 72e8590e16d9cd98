//! Application state management.
//!
//! The state shared by the `/ready` handler and route construction holds the
//! configuration and, for the postgres store, the database pool.

use database::postgres::DatabaseConnection;

/// Shared application state.
///
/// Cloning is cheap: `DatabaseConnection` is a handle to a shared pool.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// PostgreSQL connection pool, `None` when users are kept in memory
    pub db: Option<DatabaseConnection>,
}
