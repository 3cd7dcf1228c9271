/// Task observations (comments)
///
/// Append-only free-text notes attached to a task, shown alongside the
/// audit trail. Author names are denormalized like history entries.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::task_history::actor_display_name;
use crate::store::RecordsStore;

/// One comment on a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskObservation {
    /// Unique observation ID
    pub id: Uuid,

    /// Task this observation belongs to
    pub task_id: Uuid,

    /// User who wrote it
    pub author_id: Uuid,

    /// Author display name at write time
    pub author_name: String,

    /// Text body
    pub body: String,

    /// When it was written
    pub created_at: DateTime<Utc>,
}

/// Input for adding an observation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddObservation {
    /// Task to comment on
    pub task_id: Uuid,

    /// User writing the comment
    pub author_id: Uuid,

    /// Text body
    pub body: String,
}

impl TaskObservation {
    /// Appends an observation to a task
    ///
    /// Returns `None` if the task id does not resolve.
    pub fn add(store: &RecordsStore, data: AddObservation) -> Option<Self> {
        let mut inner = store.write();
        if !inner.tasks.contains_key(&data.task_id) {
            return None;
        }

        let observation = TaskObservation {
            id: Uuid::new_v4(),
            task_id: data.task_id,
            author_id: data.author_id,
            author_name: actor_display_name(&inner, data.author_id),
            body: data.body,
            created_at: Utc::now(),
        };
        inner
            .observations
            .entry(data.task_id)
            .or_default()
            .push(observation.clone());
        Some(observation)
    }

    /// Returns a task's observations, oldest first
    ///
    /// Empty (not an error) for unknown tasks or tasks without comments.
    pub fn for_task(store: &RecordsStore, task_id: Uuid) -> Vec<Self> {
        store
            .read()
            .observations
            .get(&task_id)
            .cloned()
            .unwrap_or_default()
    }
}
