//! In-memory task storage
//!
//! Keeps tasks in a map for the lifetime of the process. Used for local
//! development without a database and as a stand-in store in tests.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::model::{NewTask, Task, TaskDraft};
use super::repository::TaskRepository;
use crate::Result;

/// Process-local task store
#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: RwLock<HashMap<String, Task>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRepository for MemoryTaskStore {
    async fn find_all(&self) -> Result<Vec<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.values().cloned().collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.get(id).cloned())
    }

    async fn insert(&self, task: &NewTask) -> Result<String> {
        let id = Uuid::new_v4().simple().to_string();
        let mut tasks = self.tasks.write().await;
        tasks.insert(id.clone(), task.clone().into_task(id.clone()));
        Ok(id)
    }

    async fn replace_by_id(&self, id: &str, draft: &TaskDraft) -> Result<Option<Task>> {
        let mut tasks = self.tasks.write().await;
        Ok(tasks.get_mut(id).map(|task| {
            task.apply(draft);
            task.clone()
        }))
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool> {
        let mut tasks = self.tasks.write().await;
        Ok(tasks.remove(id).is_some())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = MemoryTaskStore::new();

        let new_task = TaskDraft::new("Test task").stamp();
        let id = store.insert(&new_task).await.unwrap();
        assert!(!id.is_empty());

        let found = store.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(found, new_task.into_task(id));

        assert!(store.find_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_assigns_unique_ids() {
        let store = MemoryTaskStore::new();
        let task = TaskDraft::new("same").stamp();

        let first = store.insert(&task).await.unwrap();
        let second = store.insert(&task).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(store.find_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_find_all_empty() {
        let store = MemoryTaskStore::new();
        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_replace_keeps_created_at() {
        let store = MemoryTaskStore::new();
        let new_task = TaskDraft::new("Original").stamp();
        let id = store.insert(&new_task).await.unwrap();

        let replaced = store
            .replace_by_id(&id, &TaskDraft::new("Updated").with_completed(true))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(replaced.id, id);
        assert_eq!(replaced.name, "Updated");
        assert!(replaced.completed);
        assert_eq!(replaced.created_at, new_task.created_at);
        assert_eq!(store.find_by_id(&id).await.unwrap(), Some(replaced));
    }

    #[tokio::test]
    async fn test_replace_missing_task() {
        let store = MemoryTaskStore::new();
        let result = store
            .replace_by_id("missing", &TaskDraft::new("x"))
            .await
            .unwrap();
        assert!(result.is_none());
        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_task() {
        let store = MemoryTaskStore::new();
        let id = store.insert(&TaskDraft::new("Task to delete").stamp()).await.unwrap();

        assert!(store.delete_by_id(&id).await.unwrap());
        assert!(store.find_by_id(&id).await.unwrap().is_none());

        // Delete again should return false
        assert!(!store.delete_by_id(&id).await.unwrap());
    }
}
