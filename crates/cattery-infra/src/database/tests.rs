use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult, RuntimeErr, Value};

use cattery_core::domain::{Cat, CatField, CatPatch, NewCat};
use cattery_core::error::RepoError;
use cattery_core::ports::{BaseRepository, CatRepository, SessionRepository};

use crate::database::entity::{cat, session, user};
use crate::database::postgres_base::map_db_err;
use crate::database::postgres_repo::{PostgresCatRepository, PostgresSessionRepository};

fn cat_model(id: i32, name: &str) -> cat::Model {
    cat::Model {
        id,
        name: name.to_owned(),
        tag: Some("tabby".to_owned()),
        pfp: None,
    }
}

fn exec_result(rows_affected: u64) -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected,
    }
}

#[tokio::test]
async fn test_find_cat_by_id() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![cat_model(3, "Miso")]])
        .into_connection();

    let repo = PostgresCatRepository::new(db);

    let result: Option<Cat> = repo.find_by_id(3).await.unwrap();

    let cat = result.unwrap();
    assert_eq!(cat.id, 3);
    assert_eq!(cat.name, "Miso");
    assert_eq!(cat.tag.as_deref(), Some("tabby"));
}

#[tokio::test]
async fn test_insert_cat_returns_stored_row() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![cat_model(1, "Tofu")]])
        .into_connection();

    let repo = PostgresCatRepository::new(db);

    let cat = repo
        .insert(NewCat {
            name: "Tofu".to_owned(),
            tag: Some("tabby".to_owned()),
            pfp: None,
        })
        .await
        .unwrap();

    assert_eq!(cat.id, 1);
    assert_eq!(cat.name, "Tofu");
}

#[tokio::test]
async fn test_count_cats() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![BTreeMap::from([(
            "num_items",
            Value::BigInt(Some(25)),
        )])]])
        .into_connection();

    let repo = PostgresCatRepository::new(db);

    assert_eq!(repo.count().await.unwrap(), 25);
}

#[tokio::test]
async fn test_update_missing_cat_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([exec_result(0)])
        .into_connection();

    let repo = PostgresCatRepository::new(db);
    let patch = CatPatch::new()
        .set(CatField::Name, Some("Nori".to_owned()))
        .unwrap();

    let result = repo.update(42, &patch).await;

    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_delete_cat() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([exec_result(1), exec_result(0)])
        .into_connection();

    let repo = PostgresCatRepository::new(db);

    assert!(BaseRepository::<Cat, i32>::delete(&repo, 1).await.is_ok());
    assert!(matches!(
        BaseRepository::<Cat, i32>::delete(&repo, 1).await,
        Err(RepoError::NotFound)
    ));
}

#[tokio::test]
async fn test_find_session_with_user() {
    let now = Utc::now();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![(
            session::Model {
                id: "abc123".to_owned(),
                user_id: 9,
                expires_at: (now + Duration::days(7)).into(),
                created_at: now.into(),
            },
            user::Model {
                id: 9,
                username: "alice".to_owned(),
                email: None,
                password_hash: "$argon2id$hash".to_owned(),
                created_at: now.into(),
            },
        )]])
        .into_connection();

    let repo = PostgresSessionRepository::new(db);

    let (session, owner) = repo.find_with_user("abc123").await.unwrap().unwrap();

    assert_eq!(session.user_id, 9);
    assert_eq!(owner.username, "alice");
    assert!(!session.is_expired_at(now));
}

#[tokio::test]
async fn test_purge_expired_sessions_reports_count() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([exec_result(4)])
        .into_connection();

    let repo = PostgresSessionRepository::new(db);

    assert_eq!(repo.purge_expired(Utc::now()).await.unwrap(), 4);
}

#[test]
fn test_connection_errors_are_classified() {
    let err = map_db_err(DbErr::Conn(RuntimeErr::Internal("refused".to_owned())));
    assert!(matches!(err, RepoError::Connection(_)));

    let err = map_db_err(DbErr::Custom("boom".to_owned()));
    assert!(matches!(err, RepoError::Query(_)));
}
