//! Task repository trait
//!
//! Defines the interface for task storage operations.

use async_trait::async_trait;

use super::model::{NewTask, Task, TaskDraft};
use crate::Result;

/// Repository interface for task CRUD operations.
///
/// Implementations must be safe to share between concurrent requests.
/// Callers bound each call with their own deadline; dropping a returned
/// future must abandon the underlying store operation.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Get every task in the collection, in store order
    async fn find_all(&self) -> Result<Vec<Task>>;

    /// Get a task by ID
    async fn find_by_id(&self, id: &str) -> Result<Option<Task>>;

    /// Insert a new task and return the store-assigned ID
    async fn insert(&self, task: &NewTask) -> Result<String>;

    /// Overwrite the mutable fields of a task, keeping `created_at`.
    ///
    /// Returns `None` when no task has that ID.
    async fn replace_by_id(&self, id: &str, draft: &TaskDraft) -> Result<Option<Task>>;

    /// Delete a task by ID, returning whether one was removed
    async fn delete_by_id(&self, id: &str) -> Result<bool>;

    /// Short name of the backing store
    fn backend(&self) -> &'static str;

    /// Release connections held by the store
    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}
