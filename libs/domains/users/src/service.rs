use std::sync::Arc;
use tracing::instrument;

use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, QueryResult, UpdateUser, User, UserFilter};
use crate::query::UserQuery;
use crate::repository::UserRepository;

/// Service layer for User business logic
///
/// Checks id preconditions before touching the store and translates store
/// failures into [`UserError`]s. Failures are reported once, never retried.
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a new user
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create_user(&self, input: CreateUser) -> UserResult<User> {
        let email = input.email.clone();

        self.repository
            .create(input)
            .await
            .map_err(|e| UserError::from_store(e, None, Some(&email)))
    }

    /// Get a user by ID
    #[instrument(skip(self))]
    pub async fn get_user(&self, id: i32) -> UserResult<User> {
        ensure_valid_id(id, "find")?;

        self.repository
            .find_by_id(id)
            .await
            .map_err(|e| UserError::from_store(e, Some(id), None))
    }

    /// Search users; matches on any populated filter list
    ///
    /// `count` and `data` are fetched concurrently from the same predicate,
    /// without a shared snapshot.
    #[instrument(skip(self))]
    pub async fn search_users(&self, filter: UserFilter) -> UserResult<QueryResult<User>> {
        let query = UserQuery::from(filter);

        let (count, data) = tokio::try_join!(
            self.repository.count(&query.predicate),
            self.repository.find_many(&query),
        )
        .map_err(UserError::StoreUnavailable)?;

        if count == 0 {
            return Ok(QueryResult::empty());
        }

        Ok(QueryResult { count, data })
    }

    /// Update the supplied fields of a user
    ///
    /// An update without fields writes nothing and returns the stored user.
    #[instrument(skip(self, input))]
    pub async fn update_user(&self, id: i32, input: UpdateUser) -> UserResult<User> {
        ensure_valid_id(id, "update")?;

        if input.is_empty() {
            return self
                .repository
                .find_by_id(id)
                .await
                .map_err(|e| UserError::from_store(e, Some(id), None));
        }

        let email = input.email.clone();

        self.repository
            .update(id, input)
            .await
            .map_err(|e| UserError::from_store(e, Some(id), email.as_deref()))
    }

    /// Delete a user, returning a confirmation message
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: i32) -> UserResult<String> {
        ensure_valid_id(id, "delete")?;

        self.repository
            .delete(id)
            .await
            .map_err(|e| UserError::from_store(e, Some(id), None))?;

        Ok(format!("User with id {} was deleted successfully", id))
    }
}

fn ensure_valid_id(id: i32, action: &str) -> UserResult<()> {
    if id <= 0 {
        return Err(UserError::InvalidArgument(format!(
            "Provided invalid User ID which is required to {} User",
            action
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{StoreError, StoreErrorKind};
    use crate::query::{Pagination, UserPredicate};
    use crate::repository::MockUserRepository;
    use chrono::Utc;
    use mockall::predicate::eq;

    fn user(id: i32, email: &str) -> User {
        let now = Utc::now();
        User {
            id,
            email: email.to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_zero_id_never_reaches_the_store() {
        // No expectations: any repository call would panic
        let service = UserService::new(MockUserRepository::new());

        let err = service.get_user(0).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Provided invalid User ID which is required to find User"
        );

        let err = service.update_user(0, UpdateUser::default()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Provided invalid User ID which is required to update User"
        );

        let err = service.delete_user(-4).await.unwrap_err();
        assert!(matches!(err, UserError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_find_by_id()
            .with(eq(7))
            .times(1)
            .returning(|_| Err(StoreError::record_not_found("no rows")));

        let service = UserService::new(mock_repo);
        let err = service.get_user(7).await.unwrap_err();

        assert!(matches!(err, UserError::NotFound(7)));
        assert_eq!(err.to_string(), "User with such id does not exist 7");
    }

    #[tokio::test]
    async fn test_empty_update_skips_the_write() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_find_by_id()
            .with(eq(4))
            .times(1)
            .returning(|id| Ok(user(id, "d@x.com")));

        let service = UserService::new(mock_repo);
        let unchanged = service.update_user(4, UpdateUser::default()).await.unwrap();

        assert_eq!(unchanged.email, "d@x.com");
    }

    #[tokio::test]
    async fn test_empty_update_of_missing_user() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_find_by_id()
            .returning(|_| Err(StoreError::record_not_found("no rows")));

        let service = UserService::new(mock_repo);
        let err = service
            .update_user(9, UpdateUser::default())
            .await
            .unwrap_err();

        assert!(matches!(err, UserError::NotFound(9)));
    }

    #[tokio::test]
    async fn test_create_duplicate_email() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_create()
            .times(1)
            .returning(|_| Err(StoreError::unique_violation("duplicate key").with_code("23505")));

        let service = UserService::new(mock_repo);
        let err = service
            .create_user(CreateUser {
                email: "a@x.com".to_string(),
                first_name: "Ann".to_string(),
                last_name: "Smith".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, UserError::DuplicateKey(ref email) if email == "a@x.com"));
    }

    #[tokio::test]
    async fn test_unrecognized_store_error_is_passed_through() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_delete()
            .returning(|_| Err(StoreError::other("connection reset").with_code("08006")));

        let service = UserService::new(mock_repo);
        let err = service.delete_user(3).await.unwrap_err();

        match err {
            UserError::StoreUnavailable(source) => {
                assert_eq!(source.kind, StoreErrorKind::Other);
                assert_eq!(source.message, "connection reset");
            }
            other => panic!("expected StoreUnavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_search_uses_one_query_for_count_and_data() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_count()
            .withf(|predicate: &UserPredicate| predicate.clauses().len() == 2)
            .times(1)
            .returning(|_| Ok(2));
        mock_repo
            .expect_find_many()
            .withf(|query: &UserQuery| {
                query.predicate.clauses().len() == 2
                    && query.pagination == Some(Pagination { offset: 1, limit: 1 })
            })
            .times(1)
            .returning(|_| Ok(vec![user(2, "b@x.com")]));

        let service = UserService::new(mock_repo);
        let result = service
            .search_users(UserFilter {
                emails: vec!["a@x.com".to_string()],
                last_names: vec!["Doe".to_string()],
                page: Some(2),
                limit: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(result.count, 2);
        assert_eq!(result.data.len(), 1);
        assert_eq!(result.data[0].id, 2);
    }

    #[tokio::test]
    async fn test_search_with_no_matches_is_empty_success() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_count().returning(|_| Ok(0));
        mock_repo.expect_find_many().returning(|_| Ok(vec![]));

        let service = UserService::new(mock_repo);
        let result = service
            .search_users(UserFilter {
                ids: vec![99],
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(result, QueryResult::empty());
    }

    #[tokio::test]
    async fn test_search_store_failure() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_count()
            .returning(|_| Err(StoreError::other("timeout")));
        mock_repo.expect_find_many().returning(|_| Ok(vec![]));

        let service = UserService::new(mock_repo);
        let err = service.search_users(UserFilter::default()).await.unwrap_err();

        assert!(matches!(err, UserError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_delete_returns_confirmation() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_delete()
            .with(eq(12))
            .times(1)
            .returning(|_| Ok(()));

        let service = UserService::new(mock_repo);
        let message = service.delete_user(12).await.unwrap();

        assert_eq!(message, "User with id 12 was deleted successfully");
    }
}
