use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::models::{CreateUser, UpdateUser, User};
use crate::query::{UserPredicate, UserQuery};

/// Repository trait for User persistence
///
/// Implementations report failures as [`StoreError`]s; translating them into
/// domain errors is the service's job.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user, failing with a unique violation on a taken email
    async fn create(&self, input: CreateUser) -> StoreResult<User>;

    /// Get a user by ID, failing with record-not-found when absent
    async fn find_by_id(&self, id: i32) -> StoreResult<User>;

    /// Users matching the query, ordered by id
    async fn find_many(&self, query: &UserQuery) -> StoreResult<Vec<User>>;

    /// Number of users matching the predicate, ignoring pagination
    async fn count(&self, predicate: &UserPredicate) -> StoreResult<u64>;

    /// Merge the present fields of `input` into the stored user
    async fn update(&self, id: i32, input: UpdateUser) -> StoreResult<User>;

    /// Remove a user, failing with record-not-found when absent
    async fn delete(&self, id: i32) -> StoreResult<()>;
}

#[derive(Debug, Default)]
struct InMemoryState {
    users: BTreeMap<i32, User>,
    last_id: i32,
}

impl InMemoryState {
    fn email_taken(&self, email: &str, except: Option<i32>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }
}

/// In-memory implementation of UserRepository (for development/testing)
///
/// Mirrors the store contract of the PostgreSQL repository: sequential ids,
/// unique emails and id-ordered reads.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    state: Arc<RwLock<InMemoryState>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, input: CreateUser) -> StoreResult<User> {
        let mut state = self.state.write().await;

        if state.email_taken(&input.email, None) {
            return Err(StoreError::unique_violation(format!(
                "email {} is already taken",
                input.email
            )));
        }

        let id = state
            .last_id
            .checked_add(1)
            .ok_or_else(|| StoreError::other("user id sequence exhausted"))?;
        let now = Utc::now();
        let user = User {
            id,
            email: input.email,
            first_name: input.first_name,
            last_name: input.last_name,
            created_at: now,
            updated_at: now,
        };

        state.last_id = id;
        state.users.insert(id, user.clone());

        tracing::info!(user_id = id, "Created user");
        Ok(user)
    }

    async fn find_by_id(&self, id: i32) -> StoreResult<User> {
        let state = self.state.read().await;
        state
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::record_not_found(format!("no user with id {}", id)))
    }

    async fn find_many(&self, query: &UserQuery) -> StoreResult<Vec<User>> {
        let state = self.state.read().await;

        let matching = state
            .users
            .values()
            .filter(|u| query.predicate.matches(u))
            .cloned();

        let users = match query.pagination {
            Some(window) => matching
                .skip(usize::try_from(window.offset).unwrap_or(usize::MAX))
                .take(usize::try_from(window.limit).unwrap_or(usize::MAX))
                .collect(),
            None => matching.collect(),
        };

        Ok(users)
    }

    async fn count(&self, predicate: &UserPredicate) -> StoreResult<u64> {
        let state = self.state.read().await;
        let count = state.users.values().filter(|u| predicate.matches(u)).count();
        Ok(count as u64)
    }

    async fn update(&self, id: i32, input: UpdateUser) -> StoreResult<User> {
        let mut state = self.state.write().await;

        if !state.users.contains_key(&id) {
            return Err(StoreError::record_not_found(format!("no user with id {}", id)));
        }

        if let Some(ref email) = input.email {
            if state.email_taken(email, Some(id)) {
                return Err(StoreError::unique_violation(format!(
                    "email {} is already taken",
                    email
                )));
            }
        }

        let user = state
            .users
            .get_mut(&id)
            .ok_or_else(|| StoreError::record_not_found(format!("no user with id {}", id)))?;
        user.apply_update(input);
        let updated = user.clone();

        tracing::info!(user_id = id, "Updated user");
        Ok(updated)
    }

    async fn delete(&self, id: i32) -> StoreResult<()> {
        let mut state = self.state.write().await;

        match state.users.remove(&id) {
            Some(_) => {
                tracing::info!(user_id = id, "Deleted user");
                Ok(())
            }
            None => Err(StoreError::record_not_found(format!("no user with id {}", id))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreErrorKind;
    use crate::models::UserFilter;

    fn input(email: &str, first_name: &str, last_name: &str) -> CreateUser {
        CreateUser {
            email: email.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let repo = InMemoryUserRepository::new();

        let first = repo.create(input("a@x.com", "Ann", "Smith")).await.unwrap();
        let second = repo.create(input("b@x.com", "Bob", "Doe")).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);

        let fetched = repo.find_by_id(second.id).await.unwrap();
        assert_eq!(fetched, second);
    }

    #[tokio::test]
    async fn test_duplicate_email_error() {
        let repo = InMemoryUserRepository::new();
        repo.create(input("a@x.com", "Ann", "Smith")).await.unwrap();

        let err = repo
            .create(input("a@x.com", "Other", "Person"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::UniqueViolation);
        assert_eq!(repo.count(&UserPredicate::match_all()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_user_is_record_not_found() {
        let repo = InMemoryUserRepository::new();

        let err = repo.find_by_id(42).await.unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::RecordNotFound);

        let err = repo.update(42, UpdateUser::default()).await.unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::RecordNotFound);

        let err = repo.delete(42).await.unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::RecordNotFound);
    }

    #[tokio::test]
    async fn test_update_to_own_email_is_allowed() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(input("a@x.com", "Ann", "Smith")).await.unwrap();

        let updated = repo
            .update(
                user.id,
                UpdateUser {
                    email: Some("a@x.com".to_string()),
                    first_name: Some("Anna".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.first_name, "Anna");
        assert_eq!(updated.last_name, "Smith");
    }

    #[tokio::test]
    async fn test_find_many_is_id_ordered_and_paginated() {
        let repo = InMemoryUserRepository::new();
        for i in 1..=5 {
            repo.create(input(&format!("u{}@x.com", i), "Same", "Name"))
                .await
                .unwrap();
        }

        let query = UserQuery::from(UserFilter {
            first_names: vec!["Same".to_string()],
            page: Some(2),
            limit: Some(2),
            ..Default::default()
        });

        let page = repo.find_many(&query).await.unwrap();
        let ids: Vec<i32> = page.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![3, 4]);
        assert_eq!(repo.count(&query.predicate).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let repo = InMemoryUserRepository::new();
        let first = repo.create(input("a@x.com", "Ann", "Smith")).await.unwrap();
        repo.delete(first.id).await.unwrap();

        let second = repo.create(input("a@x.com", "Ann", "Smith")).await.unwrap();
        assert_eq!(second.id, 2);
    }
}
