/// Task audit trail
///
/// This module provides the TaskHistoryEntry model: an append-only,
/// per-task, chronological log of changes used to render a human-readable
/// history feed. Entries are never mutated or deleted once written — not
/// even when the task itself is archived.
///
/// The actor's display name is denormalized onto each entry on purpose:
/// audit rows must stay readable after the actor is renamed or deactivated.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{RecordsStore, StoreInner};

/// Kind of change an audit entry documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    /// Task was created
    Created,

    /// Title and/or description edited, or the task archived
    Updated,

    /// Status moved to a non-terminal state
    StatusChanged,

    /// Task was handed to a different assignee
    AssigneeChanged,

    /// Priority raised or lowered
    PriorityChanged,

    /// Due date set or moved
    DueDateChanged,

    /// Status reached Completed
    Completed,

    /// Status reached Cancelled
    Cancelled,
}

impl HistoryAction {
    /// Converts action to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryAction::Created => "created",
            HistoryAction::Updated => "updated",
            HistoryAction::StatusChanged => "status_changed",
            HistoryAction::AssigneeChanged => "assignee_changed",
            HistoryAction::PriorityChanged => "priority_changed",
            HistoryAction::DueDateChanged => "due_date_changed",
            HistoryAction::Completed => "completed",
            HistoryAction::Cancelled => "cancelled",
        }
    }

    /// Parses action from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "created" => Some(HistoryAction::Created),
            "updated" => Some(HistoryAction::Updated),
            "status_changed" => Some(HistoryAction::StatusChanged),
            "assignee_changed" => Some(HistoryAction::AssigneeChanged),
            "priority_changed" => Some(HistoryAction::PriorityChanged),
            "due_date_changed" => Some(HistoryAction::DueDateChanged),
            "completed" => Some(HistoryAction::Completed),
            "cancelled" => Some(HistoryAction::Cancelled),
            _ => None,
        }
    }
}

/// One audit entry in a task's history feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskHistoryEntry {
    /// Unique entry ID
    pub id: Uuid,

    /// Task this entry documents
    pub task_id: Uuid,

    /// Kind of change
    pub action: HistoryAction,

    /// Name of the changed field, when a single field changed
    pub field: Option<String>,

    /// Rendered value before the change
    pub old_value: Option<String>,

    /// Rendered value after the change
    pub new_value: Option<String>,

    /// Free-text note
    pub note: Option<String>,

    /// User who made the change
    pub actor_id: Uuid,

    /// Actor display name at the time of the change
    pub actor_name: String,

    /// When the change happened
    pub ts: DateTime<Utc>,
}

impl TaskHistoryEntry {
    /// Returns the ordered history for a task, oldest first
    ///
    /// Empty (not an error) for unknown tasks or tasks without recorded
    /// history.
    pub fn for_task(store: &RecordsStore, task_id: Uuid) -> Vec<Self> {
        store
            .read()
            .history
            .get(&task_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Appends one entry to a task's feed
    ///
    /// Internal: every mutating task operation calls this exactly once per
    /// logical change, under the same write lock as the mutation itself.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn record(
        inner: &mut StoreInner,
        task_id: Uuid,
        actor_id: Uuid,
        action: HistoryAction,
        field: Option<&str>,
        old_value: Option<String>,
        new_value: Option<String>,
        note: Option<String>,
    ) {
        let entry = TaskHistoryEntry {
            id: Uuid::new_v4(),
            task_id,
            action,
            field: field.map(str::to_string),
            old_value,
            new_value,
            note,
            actor_id,
            actor_name: actor_display_name(inner, actor_id),
            ts: Utc::now(),
        };
        inner.history.entry(task_id).or_default().push(entry);
    }
}

/// Resolves an actor's display name, falling back to the raw id
pub(crate) fn actor_display_name(inner: &StoreInner, actor_id: Uuid) -> String {
    inner
        .users
        .get(&actor_id)
        .map(|u| u.name.clone())
        .unwrap_or_else(|| actor_id.to_string())
}
