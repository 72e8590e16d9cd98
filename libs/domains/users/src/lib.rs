//! Users Domain
//!
//! Record management for a single `User` entity: create, fetch by id,
//! filtered search with pagination, partial update and delete.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Id checks, store error translation
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │    Query    │  ← OR predicate, page/limit → offset/limit
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + implementations)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_users::{
//!     handlers,
//!     repository::InMemoryUserRepository,
//!     service::UserService,
//! };
//!
//! // Create repository and service
//! let repository = InMemoryUserRepository::new();
//! let service = UserService::new(repository);
//!
//! // Create Axum router, nested under /users by the application
//! let router = handlers::router(service);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod query;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{StoreError, StoreErrorKind, StoreResult, UserError, UserResult};
pub use handlers::ApiDoc;
pub use models::{CreateUser, QueryResult, UpdateUser, User, UserFilter};
pub use postgres::PgUserRepository;
pub use query::{Pagination, UserClause, UserPredicate, UserQuery};
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
