//! Application state

use std::sync::Arc;

use tasks_core::task::TaskRepository;

use crate::config::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    task_store: Arc<dyn TaskRepository>,
    config: Config,
}

impl AppState {
    pub fn new(task_store: Arc<dyn TaskRepository>, config: Config) -> Self {
        Self {
            inner: Arc::new(AppStateInner { task_store, config }),
        }
    }

    /// Get reference to the task store
    pub fn task_store(&self) -> &dyn TaskRepository {
        self.inner.task_store.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }
}
