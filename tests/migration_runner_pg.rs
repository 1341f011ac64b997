//! Migration runner against a real PostgreSQL history table.
//!
//! Each test gets a fresh database from `#[sqlx::test]`; `DATABASE_URL` must
//! point at a reachable server.

use linkshort::application::services::MigrationRunner;
use linkshort::domain::entities::{MigrationState, RollbackOutcome};
use linkshort::error::MigrationError;
use linkshort::infrastructure::migrations::MIGRATIONS;
use linkshort::infrastructure::persistence::PgMigrationRepository;
use sqlx::PgPool;
use std::sync::Arc;

fn runner(pool: &PgPool) -> MigrationRunner<PgMigrationRepository> {
    let repository = Arc::new(PgMigrationRepository::new(Arc::new(pool.clone())));
    MigrationRunner::new(repository, MIGRATIONS).unwrap()
}

async fn table_exists(pool: &PgPool, name: &str) -> bool {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM information_schema.tables WHERE table_name = $1)",
    )
    .bind(name)
    .fetch_one(pool)
    .await
    .unwrap()
}

#[sqlx::test(migrations = false)]
async fn test_run_from_empty_then_noop(pool: PgPool) {
    let runner = runner(&pool);

    let first = runner.run().await.unwrap();
    assert_eq!(first.applied, vec![1, 2, 3]);
    assert!(table_exists(&pool, "links").await);

    let second = runner.run().await.unwrap();
    assert!(second.is_noop());
    assert_eq!(second.skipped, vec![1, 2, 3]);

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_migrations")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 3);
}

#[sqlx::test(migrations = false)]
async fn test_status_reports_applied(pool: PgPool) {
    let runner = runner(&pool);

    let before = runner.status().await.unwrap();
    assert!(before.iter().all(|s| s.state == MigrationState::Pending));

    runner.run().await.unwrap();

    let after = runner.status().await.unwrap();
    assert!(after.iter().all(|s| s.state == MigrationState::Applied));
    assert!(after.iter().all(|s| s.applied_at.is_some()));
}

#[sqlx::test(migrations = false)]
async fn test_rollback_latest_then_reapply(pool: PgPool) {
    let runner = runner(&pool);
    runner.run().await.unwrap();

    let outcome = runner.rollback(3).await.unwrap();
    assert_eq!(outcome, RollbackOutcome::RolledBack { version: 3 });

    let report = runner.run().await.unwrap();
    assert_eq!(report.applied, vec![3]);
}

#[sqlx::test(migrations = false)]
async fn test_rollback_out_of_order(pool: PgPool) {
    let runner = runner(&pool);
    runner.run().await.unwrap();

    let result = runner.rollback(1).await;

    assert!(matches!(
        result,
        Err(MigrationError::RollbackOutOfOrder {
            requested: 1,
            latest: 3
        })
    ));
    assert!(table_exists(&pool, "links").await);
}

#[sqlx::test(migrations = false)]
async fn test_gap_in_history_is_fatal(pool: PgPool) {
    let runner = runner(&pool);
    runner.run().await.unwrap();

    sqlx::query("DELETE FROM schema_migrations WHERE version = 2")
        .execute(&pool)
        .await
        .unwrap();

    let result = runner.run().await;

    assert!(matches!(
        result,
        Err(MigrationError::Gap {
            missing: 2,
            later: 3
        })
    ));
}

#[sqlx::test(migrations = false)]
async fn test_renamed_migration_is_fatal(pool: PgPool) {
    let runner = runner(&pool);
    runner.run().await.unwrap();

    sqlx::query("UPDATE schema_migrations SET name = 'renamed' WHERE version = 1")
        .execute(&pool)
        .await
        .unwrap();

    let result = runner.run().await;

    assert!(matches!(
        result,
        Err(MigrationError::NameMismatch { version: 1, .. })
    ));
}

#[sqlx::test(migrations = false)]
async fn test_failed_step_leaves_no_history_row(pool: PgPool) {
    let runner = runner(&pool);

    // Pre-create the table so the first step fails inside its transaction.
    sqlx::query("CREATE TABLE links (id INT)")
        .execute(&pool)
        .await
        .unwrap();

    let result = runner.run().await;
    assert!(matches!(result, Err(MigrationError::Failed { version: 1, .. })));

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_migrations")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 0);
}

#[sqlx::test(migrations = false)]
async fn test_concurrent_runners_on_empty_database(pool: PgPool) {
    let first = runner(&pool);
    let second = runner(&pool);

    let (a, b) = tokio::join!(first.run(), second.run());

    let mut applied = Vec::new();
    for result in [a, b] {
        match result {
            Ok(report) => applied.extend(report.applied),
            Err(MigrationError::Conflict { .. }) => {}
            Err(other) => panic!("unexpected migration error: {other}"),
        }
    }
    applied.sort_unstable();
    assert_eq!(applied, vec![1, 2, 3]);

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_migrations")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 3);
    assert!(table_exists(&pool, "links").await);
}
