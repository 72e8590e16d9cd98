use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};
use tracing::debug;

use crate::common::{DatabaseError, DatabaseResult};

/// Runs `SELECT 1` to verify the pool can reach PostgreSQL.
///
/// Backs the `/ready` endpoint.
pub async fn check_health(db: &DatabaseConnection) -> DatabaseResult<()> {
    debug!("Running PostgreSQL health check");

    let stmt = Statement::from_string(DatabaseBackend::Postgres, "SELECT 1".to_owned());
    db.query_one_raw(stmt)
        .await?
        .ok_or_else(|| DatabaseError::HealthCheckFailed("SELECT 1 returned no row".to_string()))?;

    debug!("PostgreSQL health check passed");
    Ok(())
}
