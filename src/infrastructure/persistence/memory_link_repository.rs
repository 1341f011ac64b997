//! In-process implementation of link repository.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;

use crate::domain::entities::LinkRecord;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Link storage backed by a concurrent hash map.
///
/// Per-key atomicity comes from the map's shard locks: `insert` uses the
/// entry API so two inserts of the same code cannot both succeed, and the
/// counter is bumped while holding the entry's write guard. No guard is held
/// across an `.await`.
///
/// Data lives only as long as the process. Intended for local runs without
/// PostgreSQL and for tests.
#[derive(Default, Clone)]
pub struct MemoryLinkRepository {
    inner: Arc<DashMap<String, LinkRecord>>,
}

impl MemoryLinkRepository {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
        }
    }

    /// Number of stored links.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[async_trait]
impl LinkRepository for MemoryLinkRepository {
    async fn insert(&self, short_code: &str, original_url: &str) -> Result<LinkRecord, AppError> {
        match self.inner.entry(short_code.to_string()) {
            Entry::Occupied(_) => Err(AppError::DuplicateCode {
                code: short_code.to_string(),
            }),
            Entry::Vacant(slot) => {
                let record = LinkRecord::new(
                    short_code.to_string(),
                    original_url.to_string(),
                    Utc::now(),
                );
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn find_by_code(&self, short_code: &str) -> Result<LinkRecord, AppError> {
        self.inner
            .get(short_code)
            .map(|r| r.value().clone())
            .ok_or_else(|| AppError::not_found(short_code))
    }

    async fn find_by_url(&self, original_url: &str) -> Result<Option<LinkRecord>, AppError> {
        Ok(self
            .inner
            .iter()
            .filter(|r| r.original_url == original_url)
            .min_by_key(|r| r.created_at)
            .map(|r| r.value().clone()))
    }

    async fn increment_hit(&self, short_code: &str) -> Result<i64, AppError> {
        let mut record = self
            .inner
            .get_mut(short_code)
            .ok_or_else(|| AppError::not_found(short_code))?;
        record.hit_count += 1;
        Ok(record.hit_count)
    }

    async fn resolve_and_increment(&self, short_code: &str) -> Result<LinkRecord, AppError> {
        let mut record = self
            .inner
            .get_mut(short_code)
            .ok_or_else(|| AppError::not_found(short_code))?;
        record.hit_count += 1;
        Ok(record.clone())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
