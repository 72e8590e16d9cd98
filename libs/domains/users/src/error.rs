use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

/// What a store failure means, independent of the storage engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    UniqueViolation,
    RecordNotFound,
    Other,
}

/// Failure reported by a [`UserRepository`](crate::repository::UserRepository)
#[derive(Debug, Error)]
#[error("{message}")]
pub struct StoreError {
    pub kind: StoreErrorKind,
    /// Engine-specific code, e.g. a SQLSTATE
    pub code: Option<String>,
    pub message: String,
}

impl StoreError {
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: None,
            message: message.into(),
        }
    }

    pub fn unique_violation(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::UniqueViolation, message)
    }

    pub fn record_not_found(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::RecordNotFound, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Other, message)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("User with such id does not exist {0}")]
    NotFound(i32),

    #[error("User with such email already exists {0}")]
    DuplicateKey(String),

    #[error("Store failure: {0}")]
    StoreUnavailable(#[source] StoreError),
}

pub type UserResult<T> = Result<T, UserError>;

impl UserError {
    /// Translates a store failure using the id/email of the failed operation.
    ///
    /// Recognized kinds become `NotFound`/`DuplicateKey`; everything else,
    /// including a recognized kind without the context to report it, is passed
    /// through unchanged as `StoreUnavailable`.
    pub fn from_store(err: StoreError, id: Option<i32>, email: Option<&str>) -> Self {
        match (err.kind, id, email) {
            (StoreErrorKind::RecordNotFound, Some(id), _) => UserError::NotFound(id),
            (StoreErrorKind::UniqueViolation, _, Some(email)) => {
                UserError::DuplicateKey(email.to_string())
            }
            _ => UserError::StoreUnavailable(err),
        }
    }
}

/// Convert UserError to AppError for standardized error responses
impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::InvalidArgument(msg) => AppError::BadRequest(msg),
            err @ UserError::NotFound(_) => AppError::NotFound(err.to_string()),
            err @ UserError::DuplicateKey(_) => AppError::UnprocessableEntity(err.to_string()),
            UserError::StoreUnavailable(source) => {
                tracing::error!(
                    kind = ?source.kind,
                    code = source.code.as_deref().unwrap_or("-"),
                    error = %source,
                    "User store failure"
                );
                AppError::InternalServerError("User store request failed".to_string())
            }
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
