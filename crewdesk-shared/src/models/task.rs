/// Task model and store operations
///
/// This module provides the Task model: work items created by leaders and
/// owners, assigned to employees, and moved through an explicit status
/// lifecycle. Every mutating operation appends to the task's audit trail
/// (see `task_history`) exactly once per logical change.
///
/// # State Machine
///
/// ```text
/// pending     → in_progress → completed
///             → cancelled     → cancelled
/// ```
///
/// Terminal states admit no further transitions, and same-state or backward
/// writes are rejected. Status can only change through
/// [`Task::update_status`]; it is deliberately absent from [`UpdateTask`] so
/// the machine cannot be bypassed by a field update.
///
/// # Example
///
/// ```
/// use crewdesk_shared::models::task::{CreateTask, Task, TaskPriority, TaskStatus};
/// use crewdesk_shared::models::task_history::TaskHistoryEntry;
/// use crewdesk_shared::store::RecordsStore;
/// use uuid::Uuid;
///
/// let store = RecordsStore::new();
/// let leader_id = Uuid::new_v4();
///
/// let task = Task::create(&store, CreateTask {
///     title: "Fix login bug".to_string(),
///     description: "Session expires too early".to_string(),
///     priority: TaskPriority::High,
///     company_id: Uuid::new_v4(),
///     assignee_id: None,
///     created_by: leader_id,
///     due_date: None,
/// });
///
/// let task = Task::update_status(&store, task.id, TaskStatus::InProgress, leader_id).unwrap();
/// assert_eq!(task.status, TaskStatus::InProgress);
/// assert_eq!(TaskHistoryEntry::for_task(&store, task.id).len(), 2);
/// ```
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::task_history::{actor_display_name, HistoryAction, TaskHistoryEntry};
use crate::store::{RecordsStore, StoreInner};

/// Task urgency level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    /// Converts priority to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }

    /// Parses priority from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "low" => Some(TaskPriority::Low),
            "medium" => Some(TaskPriority::Medium),
            "high" => Some(TaskPriority::High),
            _ => None,
        }
    }
}

/// Task lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Created, nobody has started work yet
    Pending,

    /// Actively being worked
    InProgress,

    /// Finished successfully (terminal)
    Completed,

    /// Abandoned (terminal)
    Cancelled,
}

impl TaskStatus {
    /// Converts status to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    /// Parses status from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TaskStatus::Pending),
            "in_progress" => Some(TaskStatus::InProgress),
            "completed" => Some(TaskStatus::Completed),
            "cancelled" => Some(TaskStatus::Cancelled),
            _ => None,
        }
    }

    /// Checks if state is terminal (task has finished)
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Cancelled)
    }

    /// Checks if transition to target state is valid
    pub fn can_transition_to(&self, target: TaskStatus) -> bool {
        match (self, target) {
            (TaskStatus::Pending, TaskStatus::InProgress) => true,
            (TaskStatus::Pending, TaskStatus::Cancelled) => true,
            (TaskStatus::InProgress, TaskStatus::Completed) => true,
            (TaskStatus::InProgress, TaskStatus::Cancelled) => true,
            _ => false,
        }
    }
}

/// Error type for task workflow operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    /// Task id does not resolve
    #[error("task not found")]
    NotFound,

    /// Requested status write violates the state machine
    #[error("invalid status transition: {} -> {}", from.as_str(), to.as_str())]
    InvalidTransition { from: TaskStatus, to: TaskStatus },
}

/// Task model representing one work item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Short title
    pub title: String,

    /// Longer description of the work
    pub description: String,

    /// Urgency level
    pub priority: TaskPriority,

    /// Current lifecycle state
    pub status: TaskStatus,

    /// Company this task belongs to
    pub company_id: Uuid,

    /// User currently responsible, if assigned
    pub assignee_id: Option<Uuid>,

    /// User who created the task
    pub created_by: Uuid,

    /// Calendar due date, if set
    pub due_date: Option<NaiveDate>,

    /// False once the task has been archived
    pub active: bool,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// Set exactly when status becomes Completed
    pub completed_at: Option<DateTime<Utc>>,
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Short title
    pub title: String,

    /// Longer description of the work
    pub description: String,

    /// Urgency level
    pub priority: TaskPriority,

    /// Company this task belongs to
    pub company_id: Uuid,

    /// Initial assignee, if any
    pub assignee_id: Option<Uuid>,

    /// User creating the task
    pub created_by: Uuid,

    /// Calendar due date, if any
    pub due_date: Option<NaiveDate>,
}

/// Input for updating an existing task
///
/// `None` fields are left unchanged. Status is intentionally not here; use
/// [`Task::update_status`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New urgency level
    pub priority: Option<TaskPriority>,

    /// Hand the task to a different assignee
    pub assignee_id: Option<Uuid>,

    /// Set or move the due date
    pub due_date: Option<NaiveDate>,
}

impl Task {
    /// Creates a new task in pending state
    ///
    /// Appends the `created` audit entry attributed to `created_by`.
    /// Cannot fail.
    pub fn create(store: &RecordsStore, data: CreateTask) -> Self {
        let task = Task {
            id: Uuid::new_v4(),
            title: data.title,
            description: data.description,
            priority: data.priority,
            status: TaskStatus::Pending,
            company_id: data.company_id,
            assignee_id: data.assignee_id,
            created_by: data.created_by,
            due_date: data.due_date,
            active: true,
            created_at: Utc::now(),
            completed_at: None,
        };

        let mut inner = store.write();
        inner.tasks.insert(task.id, task.clone());
        TaskHistoryEntry::record(
            &mut inner,
            task.id,
            task.created_by,
            HistoryAction::Created,
            None,
            None,
            None,
            None,
        );
        task
    }

    /// Finds a task by id
    ///
    /// Resolves archived tasks too.
    pub fn find_by_id(store: &RecordsStore, id: Uuid) -> Option<Self> {
        store.read().tasks.get(&id).cloned()
    }

    /// Lists active tasks in a company, most recently created first
    pub fn list_by_company(store: &RecordsStore, company_id: Uuid) -> Vec<Self> {
        Self::list_where(store, |t| t.company_id == company_id)
    }

    /// Lists active tasks currently assigned to a user
    pub fn list_by_assignee(store: &RecordsStore, assignee_id: Uuid) -> Vec<Self> {
        Self::list_where(store, |t| t.assignee_id == Some(assignee_id))
    }

    /// Lists all active tasks, most recently created first
    pub fn list(store: &RecordsStore) -> Vec<Self> {
        Self::list_where(store, |_| true)
    }

    fn list_where(store: &RecordsStore, predicate: impl Fn(&Task) -> bool) -> Vec<Self> {
        let inner = store.read();
        let mut tasks: Vec<Task> = inner
            .tasks
            .values()
            .filter(|t| t.active && predicate(t))
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        tasks
    }

    /// Updates a task's fields, auditing each recognized change
    ///
    /// Emits one history entry per semantic field that actually changed
    /// (assignee, priority, due date, with rendered before/after values)
    /// plus a single generic `updated` entry when the title and/or
    /// description changed. Fields whose new value equals the old produce
    /// no entry. Returns the updated task, or `None` if the id does not
    /// resolve.
    pub fn update(store: &RecordsStore, id: Uuid, data: UpdateTask, actor_id: Uuid) -> Option<Self> {
        let mut inner = store.write();
        let before = inner.tasks.get(&id)?.clone();

        let assignee_change = match data.assignee_id {
            Some(new_assignee) if before.assignee_id != Some(new_assignee) => Some((
                render_assignee(&inner, before.assignee_id),
                render_assignee(&inner, Some(new_assignee)),
            )),
            _ => None,
        };

        let task = inner.tasks.get_mut(&id)?;
        let mut text_changed = false;

        if let Some(title) = data.title {
            if task.title != title {
                task.title = title;
                text_changed = true;
            }
        }
        if let Some(description) = data.description {
            if task.description != description {
                task.description = description;
                text_changed = true;
            }
        }
        let priority_change = match data.priority {
            Some(new_priority) if task.priority != new_priority => {
                let old = task.priority;
                task.priority = new_priority;
                Some((old, new_priority))
            }
            _ => None,
        };
        if let Some(new_assignee) = data.assignee_id {
            task.assignee_id = Some(new_assignee);
        }
        let due_change = match data.due_date {
            Some(new_due) if task.due_date != Some(new_due) => {
                let old = task.due_date;
                task.due_date = Some(new_due);
                Some((old, new_due))
            }
            _ => None,
        };
        let updated = task.clone();

        if let Some((old, new)) = assignee_change {
            TaskHistoryEntry::record(
                &mut inner,
                id,
                actor_id,
                HistoryAction::AssigneeChanged,
                Some("assignee"),
                old,
                new,
                None,
            );
        }
        if let Some((old, new)) = priority_change {
            TaskHistoryEntry::record(
                &mut inner,
                id,
                actor_id,
                HistoryAction::PriorityChanged,
                Some("priority"),
                Some(old.as_str().to_string()),
                Some(new.as_str().to_string()),
                None,
            );
        }
        if let Some((old, new)) = due_change {
            TaskHistoryEntry::record(
                &mut inner,
                id,
                actor_id,
                HistoryAction::DueDateChanged,
                Some("due_date"),
                old.map(|d| d.to_string()),
                Some(new.to_string()),
                None,
            );
        }
        if text_changed {
            TaskHistoryEntry::record(
                &mut inner,
                id,
                actor_id,
                HistoryAction::Updated,
                None,
                None,
                None,
                None,
            );
        }

        Some(updated)
    }

    /// Moves a task through the status state machine
    ///
    /// Validates the transition; a move to Completed stamps `completed_at`.
    /// Appends one audit entry: `completed` or `cancelled` for terminal
    /// moves, `status_changed` otherwise, always carrying the old and new
    /// status.
    ///
    /// # Errors
    ///
    /// - [`TaskError::NotFound`] if the id does not resolve
    /// - [`TaskError::InvalidTransition`] for same-state, backward, or
    ///   out-of-terminal writes
    pub fn update_status(
        store: &RecordsStore,
        id: Uuid,
        new_status: TaskStatus,
        actor_id: Uuid,
    ) -> Result<Self, TaskError> {
        let mut inner = store.write();
        let current = inner.tasks.get(&id).ok_or(TaskError::NotFound)?.status;
        if !current.can_transition_to(new_status) {
            return Err(TaskError::InvalidTransition {
                from: current,
                to: new_status,
            });
        }

        let task = inner.tasks.get_mut(&id).ok_or(TaskError::NotFound)?;
        task.status = new_status;
        if new_status == TaskStatus::Completed {
            task.completed_at = Some(Utc::now());
        }
        let updated = task.clone();

        let action = match new_status {
            TaskStatus::Completed => HistoryAction::Completed,
            TaskStatus::Cancelled => HistoryAction::Cancelled,
            _ => HistoryAction::StatusChanged,
        };
        TaskHistoryEntry::record(
            &mut inner,
            id,
            actor_id,
            action,
            Some("status"),
            Some(current.as_str().to_string()),
            Some(new_status.as_str().to_string()),
            None,
        );

        Ok(updated)
    }

    /// Assigns a batch of tasks to one user, best-effort
    ///
    /// Ids that do not resolve to an active task are skipped silently; the
    /// batch never aborts. Returns the number of tasks actually updated.
    /// Each affected task gets one `assignee_changed` audit entry.
    pub fn assign_many(
        store: &RecordsStore,
        task_ids: &[Uuid],
        assignee_id: Uuid,
        actor_id: Uuid,
    ) -> usize {
        let mut assigned = 0;
        for task_id in task_ids {
            match Self::find_by_id(store, *task_id) {
                Some(task) if task.active => {
                    let result = Self::update(
                        store,
                        *task_id,
                        UpdateTask {
                            assignee_id: Some(assignee_id),
                            ..Default::default()
                        },
                        actor_id,
                    );
                    if result.is_some() {
                        assigned += 1;
                    }
                }
                _ => {}
            }
        }
        assigned
    }

    /// Archives a task (soft delete)
    ///
    /// The task disappears from listings but stays resolvable by id, and its
    /// history is preserved. Appends an `updated` entry noting the archival.
    /// Returns the updated task, or `None` if the id does not resolve.
    pub fn archive(store: &RecordsStore, id: Uuid, actor_id: Uuid) -> Option<Self> {
        let mut inner = store.write();
        let task = inner.tasks.get_mut(&id)?;
        task.active = false;
        let updated = task.clone();
        TaskHistoryEntry::record(
            &mut inner,
            id,
            actor_id,
            HistoryAction::Updated,
            None,
            None,
            None,
            Some("archived".to_string()),
        );
        Some(updated)
    }
}

fn render_assignee(inner: &StoreInner, assignee_id: Option<Uuid>) -> Option<String> {
    assignee_id.map(|id| actor_display_name(inner, id))
}
