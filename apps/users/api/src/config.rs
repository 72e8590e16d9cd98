use core_config::{AppInfo, FromEnv, app_info, env_parse_or, server::ServerConfig};
use database::postgres::PostgresConfig;
use std::fmt;
use std::str::FromStr;

pub use core_config::Environment;

/// Backing store for user records, selected with `USERS_STORE`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StoreKind {
    #[default]
    Postgres,
    Memory,
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreKind::Postgres),
            "memory" | "in-memory" => Ok(StoreKind::Memory),
            other => Err(format!(
                "unknown store '{}', expected 'postgres' or 'memory'",
                other
            )),
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::Postgres => write!(f, "postgres"),
            StoreKind::Memory => write!(f, "memory"),
        }
    }
}

/// Application-specific configuration
/// Composes shared config components from the `core_config` and `database` libraries
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub store: StoreKind,
    /// Present only for the postgres store
    pub database: Option<PostgresConfig>,
    pub server: ServerConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?; // HOST=0.0.0.0, PORT=3000 unless set
        let store = env_parse_or("USERS_STORE", StoreKind::default())?;
        let database = match store {
            StoreKind::Postgres => Some(PostgresConfig::from_env()?), // DATABASE_URL is required
            StoreKind::Memory => None,
        };

        Ok(Self {
            app: app_info!(),
            store,
            database,
            server,
            environment,
        })
    }
}
