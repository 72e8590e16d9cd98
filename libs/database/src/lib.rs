//! PostgreSQL connection management for the users service.
//!
//! Pool configuration, startup connection retry, readiness checks and a
//! generic migration runner. Table definitions live in the `migration`
//! crate; the running logic is here.
//!
//! ```ignore
//! use core_config::FromEnv;
//! use database::postgres::{self, PostgresConfig};
//!
//! let config = PostgresConfig::from_env()?;
//! let db = postgres::connect_from_config_with_retry(config, None).await?;
//! postgres::check_health(&db).await?;
//! ```

pub mod common;
pub mod postgres;

pub use common::{DatabaseError, DatabaseResult};
