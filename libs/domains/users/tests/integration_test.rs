//! Integration tests for the Users domain
//!
//! These tests use real PostgreSQL via testcontainers to ensure:
//! - The OR predicate and pagination are translated to working SQL
//! - The unique email constraint surfaces as `DuplicateKey`
//! - Missing rows surface as `NotFound` on read, update and delete

use domain_users::*;
use test_utils::{TestDataBuilder, TestDatabase, assertions::*};

fn create_input(email: String, first_name: &str, last_name: &str) -> CreateUser {
    CreateUser {
        email,
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
    }
}

// ============================================================================
// Repository Tests
// ============================================================================

#[tokio::test]
async fn test_create_and_get_user() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("create_and_get");

    let created = repo
        .create(create_input(builder.email("jane"), "Jane", "Doe"))
        .await
        .unwrap();

    assert!(created.id > 0);
    assert_eq!(created.email, builder.email("jane"));

    let fetched = repo.find_by_id(created.id).await.unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.first_name, "Jane");
}

#[tokio::test]
async fn test_unique_email_is_a_unique_violation() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("unique_email");

    repo.create(create_input(builder.email("dup"), "First", "User"))
        .await
        .unwrap();

    let err = repo
        .create(create_input(builder.email("dup"), "Second", "User"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, StoreErrorKind::UniqueViolation);
    assert_eq!(err.code.as_deref(), Some("23505"));
    assert_eq!(repo.count(&UserPredicate::match_all()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_find_many_or_filter_and_pagination() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("or_filter");

    let ann = repo
        .create(create_input(builder.email("ann"), "Ann", "Smith"))
        .await
        .unwrap();
    let bob = repo
        .create(create_input(builder.email("bob"), "Bob", "Doe"))
        .await
        .unwrap();
    repo.create(create_input(builder.email("cid"), "Cid", "Roe"))
        .await
        .unwrap();

    let query = UserQuery::from(UserFilter {
        emails: vec![builder.email("ann")],
        last_names: vec!["Doe".to_string()],
        ..Default::default()
    });

    let users = repo.find_many(&query).await.unwrap();
    let ids: Vec<i32> = users.iter().map(|u| u.id).collect();
    assert_same_elements(&ids, &[ann.id, bob.id], "OR match");
    assert_eq!(repo.count(&query.predicate).await.unwrap(), 2);

    let page = repo
        .find_many(&UserQuery::from(UserFilter {
            page: Some(2),
            limit: Some(2),
            ..Default::default()
        }))
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].first_name, "Cid");
}

#[tokio::test]
async fn test_huge_page_is_empty_not_an_error() {
    let db = TestDatabase::new().await;
    let service = UserService::new(PgUserRepository::new(db.connection()));
    let builder = TestDataBuilder::from_test_name("huge_page");

    service
        .create_user(create_input(builder.email("only"), "Only", "User"))
        .await
        .unwrap();

    let result = service
        .search_users(UserFilter {
            page: Some(3),
            limit: Some(i64::MAX),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(result.count, 1);
    assert!(result.data.is_empty());
}

#[tokio::test]
async fn test_missing_rows_are_record_not_found() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());

    let err = repo.find_by_id(12345).await.unwrap_err();
    assert_eq!(err.kind, StoreErrorKind::RecordNotFound);

    let err = repo
        .update(
            12345,
            UpdateUser {
                first_name: Some("Ghost".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, StoreErrorKind::RecordNotFound);

    let err = repo.delete(12345).await.unwrap_err();
    assert_eq!(err.kind, StoreErrorKind::RecordNotFound);
}

// ============================================================================
// Service Tests
// ============================================================================

#[tokio::test]
async fn test_service_update_email_collision() {
    let db = TestDatabase::new().await;
    let service = UserService::new(PgUserRepository::new(db.connection()));
    let builder = TestDataBuilder::from_test_name("update_collision");

    let first = service
        .create_user(create_input(builder.email("first"), "First", "User"))
        .await
        .unwrap();
    service
        .create_user(create_input(builder.email("second"), "Second", "User"))
        .await
        .unwrap();

    let err = service
        .update_user(
            first.id,
            UpdateUser {
                email: Some(builder.email("second")),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, UserError::DuplicateKey(_)));

    let unchanged = service.get_user(first.id).await.unwrap();
    assert_eq!(unchanged.email, builder.email("first"));
}

#[tokio::test]
async fn test_service_partial_update_and_delete() {
    let db = TestDatabase::new().await;
    let service = UserService::new(PgUserRepository::new(db.connection()));
    let builder = TestDataBuilder::from_test_name("partial_update");

    let created = service
        .create_user(create_input(builder.email("pat"), "Pat", "Lee"))
        .await
        .unwrap();

    let updated = service
        .update_user(
            created.id,
            UpdateUser {
                last_name: Some("Kim".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.first_name, "Pat");
    assert_eq!(updated.last_name, "Kim");
    assert!(updated.updated_at >= created.updated_at);

    let message = service.delete_user(created.id).await.unwrap();
    assert_eq!(
        message,
        format!("User with id {} was deleted successfully", created.id)
    );

    let result = service.search_users(UserFilter::default()).await.unwrap();
    assert_eq!(result, QueryResult::empty());
}
