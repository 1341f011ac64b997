//! PostgreSQL link store tests.
//!
//! Each test gets a fresh database from `#[sqlx::test]`; `DATABASE_URL` must
//! point at a reachable server.

mod common;

use linkshort::domain::repositories::LinkRepository;
use linkshort::error::AppError;
use linkshort::infrastructure::persistence::PgLinkRepository;
use sqlx::PgPool;
use std::sync::Arc;

async fn repository(pool: PgPool) -> PgLinkRepository {
    common::migrate(&pool).await;
    PgLinkRepository::new(Arc::new(pool))
}

#[sqlx::test(migrations = false)]
async fn test_insert_and_find(pool: PgPool) {
    let repo = repository(pool).await;

    let created = repo
        .insert("test123", "https://example.com/a/b?c=1")
        .await
        .unwrap();
    assert_eq!(created.short_code, "test123");
    assert_eq!(created.hit_count, 0);

    let found = repo.find_by_code("test123").await.unwrap();
    assert_eq!(found, created);
}

#[sqlx::test(migrations = false)]
async fn test_insert_duplicate_code(pool: PgPool) {
    let repo = repository(pool).await;

    repo.insert("dup1234", "https://one.example.com")
        .await
        .unwrap();
    let result = repo.insert("dup1234", "https://two.example.com").await;

    assert!(matches!(result, Err(AppError::DuplicateCode { code }) if code == "dup1234"));
    assert_eq!(
        repo.find_by_code("dup1234").await.unwrap().original_url,
        "https://one.example.com"
    );
}

#[sqlx::test(migrations = false)]
async fn test_find_by_code_not_found(pool: PgPool) {
    let repo = repository(pool).await;

    let result = repo.find_by_code("missing").await;

    assert!(matches!(result, Err(AppError::NotFound { .. })));
}

#[sqlx::test(migrations = false)]
async fn test_find_by_url(pool: PgPool) {
    let repo = repository(pool).await;
    repo.insert("url0001", "https://unique-url.com").await.unwrap();

    let found = repo.find_by_url("https://unique-url.com").await.unwrap();
    assert_eq!(found.unwrap().short_code, "url0001");

    let missing = repo.find_by_url("https://other-url.com").await.unwrap();
    assert!(missing.is_none());
}

#[sqlx::test(migrations = false)]
async fn test_resolve_and_increment(pool: PgPool) {
    let repo = repository(pool).await;
    repo.insert("hit0001", "https://example.com").await.unwrap();

    let first = repo.resolve_and_increment("hit0001").await.unwrap();
    let second = repo.resolve_and_increment("hit0001").await.unwrap();

    assert_eq!(first.hit_count, 1);
    assert_eq!(second.hit_count, 2);
    assert_eq!(second.original_url, "https://example.com");
}

#[sqlx::test(migrations = false)]
async fn test_increment_unknown_code(pool: PgPool) {
    let repo = repository(pool).await;

    assert!(matches!(
        repo.increment_hit("missing").await,
        Err(AppError::NotFound { .. })
    ));
    assert!(matches!(
        repo.resolve_and_increment("missing").await,
        Err(AppError::NotFound { .. })
    ));
}

#[sqlx::test(migrations = false)]
async fn test_concurrent_increments(pool: PgPool) {
    let repo = Arc::new(repository(pool).await);
    repo.insert("conc001", "https://example.com").await.unwrap();

    let handles: Vec<_> = (0..100)
        .map(|_| {
            let repo = repo.clone();
            tokio::spawn(async move { repo.increment_hit("conc001").await })
        })
        .collect();

    let mut values = Vec::with_capacity(100);
    for handle in handles {
        values.push(handle.await.unwrap().unwrap());
    }
    values.sort_unstable();

    assert_eq!(values, (1..=100).collect::<Vec<i64>>());
    assert_eq!(repo.find_by_code("conc001").await.unwrap().hit_count, 100);
}

#[sqlx::test(migrations = false)]
async fn test_ping(pool: PgPool) {
    let repo = repository(pool).await;

    assert!(repo.ping().await.is_ok());
}
