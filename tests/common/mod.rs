#![allow(dead_code)]

use async_trait::async_trait;
use axum::{Router, routing::get};
use axum_test::TestServer;
use sqlx::PgPool;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use linkshort::api::handlers::{health_handler, redirect_handler};
use linkshort::api::routes::api_routes;
use linkshort::application::services::{LinkService, MigrationRunner};
use linkshort::domain::entities::LinkRecord;
use linkshort::domain::repositories::LinkRepository;
use linkshort::error::AppError;
use linkshort::infrastructure::migrations::MIGRATIONS;
use linkshort::infrastructure::persistence::{MemoryLinkRepository, PgMigrationRepository};
use linkshort::state::AppState;
use linkshort::utils::code_generator::CodeGenerator;

pub const BASE_URL: &str = "http://s.test";

/// State over a fresh in-memory store; the store handle is returned for
/// direct inspection.
pub fn create_test_state() -> (AppState, MemoryLinkRepository) {
    let repo = MemoryLinkRepository::new();
    let state = state_with_repository(Arc::new(repo.clone()));
    (state, repo)
}

pub fn state_with_repository(repo: Arc<dyn LinkRepository>) -> AppState {
    let link_service = Arc::new(LinkService::new(
        repo,
        CodeGenerator::default(),
        BASE_URL.to_string(),
    ));
    AppState::new(link_service)
}

/// All application routes, without the outer middleware stack.
pub fn test_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/{code}", get(redirect_handler))
        .nest("/api", api_routes())
        .with_state(state)
}

pub fn create_test_server(state: AppState) -> TestServer {
    TestServer::new(test_router(state)).unwrap()
}

/// Link store whose every call fails with a transient error.
#[derive(Default)]
pub struct UnavailableRepository {
    calls: AtomicUsize,
}

impl UnavailableRepository {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail<T>(&self) -> Result<T, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(AppError::unavailable("timed out acquiring a connection"))
    }
}

#[async_trait]
impl LinkRepository for UnavailableRepository {
    async fn insert(&self, _short_code: &str, _original_url: &str) -> Result<LinkRecord, AppError> {
        self.fail()
    }

    async fn find_by_code(&self, _short_code: &str) -> Result<LinkRecord, AppError> {
        self.fail()
    }

    async fn find_by_url(&self, _original_url: &str) -> Result<Option<LinkRecord>, AppError> {
        self.fail()
    }

    async fn increment_hit(&self, _short_code: &str) -> Result<i64, AppError> {
        self.fail()
    }

    async fn resolve_and_increment(&self, _short_code: &str) -> Result<LinkRecord, AppError> {
        self.fail()
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.fail()
    }
}

/// Applies the full migration registry to a fresh test database.
pub async fn migrate(pool: &PgPool) {
    let repository = Arc::new(PgMigrationRepository::new(Arc::new(pool.clone())));
    MigrationRunner::new(repository, MIGRATIONS)
        .unwrap()
        .run()
        .await
        .unwrap();
}
