//! Task model definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A persisted task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Task fields a client may set.
///
/// Any `id` or `createdAt` in a request body is ignored; both are owned by
/// the server. Missing or `null` fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TaskDraft {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub completed: bool,
}

/// A draft stamped with its creation time, ready to insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub name: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl TaskDraft {
    /// Create a draft with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            completed: false,
        }
    }

    /// Set the completed flag
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    /// Stamp the draft with the current server time
    pub fn stamp(self) -> NewTask {
        self.stamp_at(Utc::now())
    }

    /// Stamp the draft with `at`, truncated to whole milliseconds
    pub fn stamp_at(self, at: DateTime<Utc>) -> NewTask {
        NewTask {
            name: self.name,
            completed: self.completed,
            created_at: truncate_to_millis(at),
        }
    }
}

impl NewTask {
    /// Attach the store-assigned ID
    pub fn into_task(self, id: impl Into<String>) -> Task {
        Task {
            id: id.into(),
            name: self.name,
            completed: self.completed,
            created_at: self.created_at,
        }
    }
}

impl Task {
    /// Apply a draft's fields, leaving `id` and `created_at` alone
    pub fn apply(&mut self, draft: &TaskDraft) {
        self.name = draft.name.clone();
        self.completed = draft.completed;
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Stores keep millisecond precision, so timestamps are cut down before
/// they are handed out.
fn truncate_to_millis(at: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(at.timestamp_millis()).unwrap_or(at)
}
