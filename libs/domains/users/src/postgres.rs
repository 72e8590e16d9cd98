use async_trait::async_trait;
use sea_orm::ActiveValue::{Set, Unchanged};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, SqlErr,
};

use crate::{
    entity,
    error::{StoreError, StoreResult},
    models::{CreateUser, UpdateUser, User},
    query::{UserClause, UserPredicate, UserQuery},
    repository::UserRepository,
};

const UNIQUE_VIOLATION: &str = "23505";

pub struct PgUserRepository {
    db: DatabaseConnection,
}

impl PgUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// OR of `IN (...)` conditions, one per clause
fn condition(predicate: &UserPredicate) -> Condition {
    predicate
        .clauses()
        .iter()
        .fold(Condition::any(), |condition, clause| match clause {
            UserClause::Ids(ids) => condition.add(entity::Column::Id.is_in(ids.iter().copied())),
            UserClause::Emails(emails) => {
                condition.add(entity::Column::Email.is_in(emails.iter().cloned()))
            }
            UserClause::FirstNames(names) => {
                condition.add(entity::Column::FirstName.is_in(names.iter().cloned()))
            }
            UserClause::LastNames(names) => {
                condition.add(entity::Column::LastName.is_in(names.iter().cloned()))
            }
        })
}

fn filtered(predicate: &UserPredicate) -> Select<entity::Entity> {
    let query = entity::Entity::find();

    if predicate.is_match_all() {
        query
    } else {
        query.filter(condition(predicate))
    }
}

fn select(query: &UserQuery) -> Select<entity::Entity> {
    let select = filtered(&query.predicate).order_by_asc(entity::Column::Id);

    match query.pagination {
        Some(window) => select.offset(window.offset).limit(window.limit),
        None => select,
    }
}

/// Classifies a sea-orm error for the service layer
fn store_error(err: DbErr) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) => {
            StoreError::unique_violation(message).with_code(UNIQUE_VIOLATION)
        }
        _ => match err {
            DbErr::RecordNotFound(message) => StoreError::record_not_found(message),
            DbErr::RecordNotUpdated => StoreError::record_not_found("no row was updated"),
            other => StoreError::other(other.to_string()),
        },
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, input: CreateUser) -> StoreResult<User> {
        let active_model: entity::ActiveModel = input.into();

        let model = active_model.insert(&self.db).await.map_err(store_error)?;

        tracing::info!(user_id = model.id, "Created user");
        Ok(model.into())
    }

    async fn find_by_id(&self, id: i32) -> StoreResult<User> {
        entity::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(store_error)?
            .map(Into::into)
            .ok_or_else(|| StoreError::record_not_found(format!("no user with id {}", id)))
    }

    async fn find_many(&self, query: &UserQuery) -> StoreResult<Vec<User>> {
        let models = select(query).all(&self.db).await.map_err(store_error)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn count(&self, predicate: &UserPredicate) -> StoreResult<u64> {
        filtered(predicate)
            .count(&self.db)
            .await
            .map_err(store_error)
    }

    async fn update(&self, id: i32, input: UpdateUser) -> StoreResult<User> {
        let mut active_model = entity::ActiveModel {
            id: Unchanged(id),
            updated_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        if let Some(email) = input.email {
            active_model.email = Set(email);
        }
        if let Some(first_name) = input.first_name {
            active_model.first_name = Set(first_name);
        }
        if let Some(last_name) = input.last_name {
            active_model.last_name = Set(last_name);
        }

        let model = active_model.update(&self.db).await.map_err(store_error)?;

        tracing::info!(user_id = id, "Updated user");
        Ok(model.into())
    }

    async fn delete(&self, id: i32) -> StoreResult<()> {
        let result = entity::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(store_error)?;

        if result.rows_affected == 0 {
            return Err(StoreError::record_not_found(format!(
                "no user with id {}",
                id
            )));
        }

        tracing::info!(user_id = id, "Deleted user");
        Ok(())
    }
}
