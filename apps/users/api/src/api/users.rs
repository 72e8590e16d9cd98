use axum::Router;
use domain_users::{InMemoryUserRepository, PgUserRepository, UserService, handlers};

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    match &state.db {
        Some(db) => {
            let repository = PgUserRepository::new(db.clone());
            handlers::router(UserService::new(repository))
        }
        None => {
            tracing::warn!("Users are kept in memory and will be lost on restart");
            handlers::router(UserService::new(InMemoryUserRepository::new()))
        }
    }
}
