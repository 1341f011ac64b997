//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::LinkService;
use crate::domain::repositories::LinkRepository;

/// Service handle shared across requests.
///
/// Cloning is cheap; the service and its store sit behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService<dyn LinkRepository>>,
}

impl AppState {
    pub fn new(link_service: Arc<LinkService<dyn LinkRepository>>) -> Self {
        Self { link_service }
    }
}
