//! Shared state for the HTTP handlers.

use crate::config::QueryConfig;
use crate::evaluate::Evaluator;
use crate::query::CollectionStore;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Shared application state. Clones share everything.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    evaluator: Arc<Evaluator>,
    collections: Arc<dyn CollectionStore>,
    query_config: QueryConfig,
    /// Bounds how many evaluations run at once.
    upload_permits: Semaphore,
}

impl AppState {
    pub fn new(
        evaluator: Arc<Evaluator>,
        collections: Arc<dyn CollectionStore>,
        query_config: QueryConfig,
        max_concurrent_uploads: usize,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                evaluator,
                collections,
                query_config,
                upload_permits: Semaphore::new(max_concurrent_uploads.max(1)),
            }),
        }
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.inner.evaluator
    }

    pub fn collections(&self) -> &dyn CollectionStore {
        self.inner.collections.as_ref()
    }

    pub fn query_config(&self) -> &QueryConfig {
        &self.inner.query_config
    }

    pub fn upload_permits(&self) -> &Semaphore {
        &self.inner.upload_permits
    }
}
