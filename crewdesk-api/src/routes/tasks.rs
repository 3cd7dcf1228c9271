/// Task endpoints
///
/// # Endpoints
///
/// - `POST /v1/tasks` - Create a task
/// - `GET /v1/tasks?company_id=&assignee_id=` - List active tasks
/// - `GET /v1/tasks/:id` - Fetch one task
/// - `PUT /v1/tasks/:id` - Update task fields (not status)
/// - `POST /v1/tasks/:id/status` - Move through the status machine
/// - `POST /v1/tasks/assign` - Bulk-assign tasks to one user
/// - `DELETE /v1/tasks/:id?actor_id=` - Archive (soft delete)
/// - `GET /v1/tasks/:id/history` - Audit trail, oldest first
/// - `GET /v1/tasks/:id/observations` - Comment feed, oldest first
/// - `POST /v1/tasks/:id/observations` - Add a comment
///
/// There is no session model; mutating requests carry the acting user's id
/// so the audit trail can attribute the change.
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use crewdesk_shared::models::company::Company;
use crewdesk_shared::models::observation::{AddObservation, TaskObservation};
use crewdesk_shared::models::task::{CreateTask, Task, TaskPriority, TaskStatus, UpdateTask};
use crewdesk_shared::models::task_history::TaskHistoryEntry;
use crewdesk_shared::models::user::User;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Short title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Longer description of the work
    #[validate(length(max = 4000, message = "Description must be at most 4000 characters"))]
    pub description: String,

    /// Urgency level
    pub priority: TaskPriority,

    /// Company this task belongs to
    pub company_id: Uuid,

    /// Initial assignee, if any
    pub assignee_id: Option<Uuid>,

    /// User creating the task (must be allowed to create tasks)
    pub created_by: Uuid,

    /// Calendar due date, if any
    pub due_date: Option<NaiveDate>,
}

/// Update task request
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    /// New title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    /// New description
    #[validate(length(max = 4000, message = "Description must be at most 4000 characters"))]
    pub description: Option<String>,

    /// New urgency level
    pub priority: Option<TaskPriority>,

    /// Hand the task to a different assignee
    pub assignee_id: Option<Uuid>,

    /// Set or move the due date
    pub due_date: Option<NaiveDate>,

    /// User making the change
    pub actor_id: Uuid,
}

/// Status update request
#[derive(Debug, Deserialize)]
pub struct UpdateTaskStatusRequest {
    /// Target state
    pub status: TaskStatus,

    /// User making the change
    pub actor_id: Uuid,
}

/// Bulk assignment request
#[derive(Debug, Deserialize, Validate)]
pub struct AssignTasksRequest {
    /// Tasks to assign; unknown ids are skipped
    #[validate(length(min = 1, message = "task_ids must not be empty"))]
    pub task_ids: Vec<Uuid>,

    /// User receiving the tasks
    pub assignee_id: Uuid,

    /// User making the change
    pub actor_id: Uuid,
}

/// Bulk assignment response
#[derive(Debug, Serialize)]
pub struct AssignTasksResponse {
    /// Number of tasks requested
    pub requested: usize,

    /// Number of tasks actually assigned
    pub assigned: usize,
}

/// Add observation request
#[derive(Debug, Deserialize, Validate)]
pub struct AddObservationRequest {
    /// User writing the comment
    pub author_id: Uuid,

    /// Text body
    #[validate(length(min = 1, max = 2000, message = "Body must be 1-2000 characters"))]
    pub body: String,
}

/// List tasks query
#[derive(Debug, Default, Deserialize)]
pub struct ListTasksQuery {
    /// Restrict to one company
    pub company_id: Option<Uuid>,

    /// Restrict to one assignee
    pub assignee_id: Option<Uuid>,
}

/// Archive query
#[derive(Debug, Deserialize)]
pub struct ArchiveQuery {
    /// User archiving the task
    pub actor_id: Uuid,
}

/// Creates a new task
///
/// # Errors
///
/// - `422` validation failure
/// - `400` unknown company, creator, or assignee
/// - `403` creator's role may not create tasks
pub async fn create_task(
    State(state): State<AppState>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate()?;

    if Company::find_by_id(&state.store, req.company_id).is_none() {
        return Err(ApiError::BadRequest("Unknown company".to_string()));
    }

    let creator = User::find_by_id(&state.store, req.created_by)
        .ok_or_else(|| ApiError::BadRequest("Unknown creator".to_string()))?;
    if !creator.role.can_create_tasks() {
        return Err(ApiError::Forbidden(
            "Only leaders, owners, and admins may create tasks".to_string(),
        ));
    }

    if let Some(assignee_id) = req.assignee_id {
        let assignee = User::find_by_id(&state.store, assignee_id)
            .ok_or_else(|| ApiError::BadRequest("Unknown assignee".to_string()))?;
        if assignee.company_id != Some(req.company_id) {
            return Err(ApiError::BadRequest(
                "Assignee must belong to the task's company".to_string(),
            ));
        }
    }

    let task = Task::create(
        &state.store,
        CreateTask {
            title: req.title,
            description: req.description,
            priority: req.priority,
            company_id: req.company_id,
            assignee_id: req.assignee_id,
            created_by: req.created_by,
            due_date: req.due_date,
        },
    );

    tracing::info!(
        task_id = %task.id,
        company_id = %task.company_id,
        created_by = %task.created_by,
        "Task created"
    );
    Ok(Json(task))
}

/// Lists active tasks, filtered by company and/or assignee
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = match (query.company_id, query.assignee_id) {
        (Some(company_id), None) => Task::list_by_company(&state.store, company_id),
        (None, Some(assignee_id)) => Task::list_by_assignee(&state.store, assignee_id),
        (Some(company_id), Some(assignee_id)) => {
            Task::list_by_company(&state.store, company_id)
                .into_iter()
                .filter(|t| t.assignee_id == Some(assignee_id))
                .collect()
        }
        (None, None) => Task::list(&state.store),
    };
    Ok(Json(tasks))
}

/// Fetches one task by id
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    Task::find_by_id(&state.store, id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))
}

/// Updates a task's fields
///
/// Status is not updatable here; see `POST /v1/tasks/:id/status`.
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate()?;

    if let Some(assignee_id) = req.assignee_id {
        if User::find_by_id(&state.store, assignee_id).is_none() {
            return Err(ApiError::BadRequest("Unknown assignee".to_string()));
        }
    }

    Task::update(
        &state.store,
        id,
        UpdateTask {
            title: req.title,
            description: req.description,
            priority: req.priority,
            assignee_id: req.assignee_id,
            due_date: req.due_date,
        },
        req.actor_id,
    )
    .map(Json)
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))
}

/// Moves a task through the status state machine
///
/// # Errors
///
/// - `404` unknown task
/// - `409` transition violates the state machine
pub async fn update_task_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskStatusRequest>,
) -> ApiResult<Json<Task>> {
    let task = Task::update_status(&state.store, id, req.status, req.actor_id)?;

    tracing::info!(
        task_id = %task.id,
        status = task.status.as_str(),
        actor_id = %req.actor_id,
        "Task status changed"
    );
    Ok(Json(task))
}

/// Bulk-assigns tasks to one user, best-effort
///
/// Unknown task ids are skipped silently; the response reports how many of
/// the requested tasks were actually assigned.
pub async fn assign_tasks(
    State(state): State<AppState>,
    Json(req): Json<AssignTasksRequest>,
) -> ApiResult<Json<AssignTasksResponse>> {
    req.validate()?;

    let actor = User::find_by_id(&state.store, req.actor_id)
        .ok_or_else(|| ApiError::BadRequest("Unknown actor".to_string()))?;
    if !actor.role.can_create_tasks() {
        return Err(ApiError::Forbidden(
            "Only leaders, owners, and admins may assign tasks".to_string(),
        ));
    }
    if User::find_by_id(&state.store, req.assignee_id).is_none() {
        return Err(ApiError::BadRequest("Unknown assignee".to_string()));
    }

    let assigned = Task::assign_many(&state.store, &req.task_ids, req.assignee_id, req.actor_id);

    tracing::info!(
        requested = req.task_ids.len(),
        assigned,
        assignee_id = %req.assignee_id,
        "Bulk assignment applied"
    );
    Ok(Json(AssignTasksResponse {
        requested: req.task_ids.len(),
        assigned,
    }))
}

/// Archives a task (soft delete)
pub async fn archive_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ArchiveQuery>,
) -> ApiResult<Json<Task>> {
    Task::archive(&state.store, id, query.actor_id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))
}

/// Returns a task's audit trail, oldest first
///
/// The history of an archived task remains readable.
pub async fn get_task_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<TaskHistoryEntry>>> {
    if Task::find_by_id(&state.store, id).is_none() {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }
    Ok(Json(TaskHistoryEntry::for_task(&state.store, id)))
}

/// Returns a task's comment feed, oldest first
pub async fn list_observations(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<TaskObservation>>> {
    if Task::find_by_id(&state.store, id).is_none() {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }
    Ok(Json(TaskObservation::for_task(&state.store, id)))
}

/// Adds a comment to a task
pub async fn add_observation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddObservationRequest>,
) -> ApiResult<Json<TaskObservation>> {
    req.validate()?;

    if User::find_by_id(&state.store, req.author_id).is_none() {
        return Err(ApiError::BadRequest("Unknown author".to_string()));
    }

    TaskObservation::add(
        &state.store,
        AddObservation {
            task_id: id,
            author_id: req.author_id,
            body: req.body,
        },
    )
    .map(Json)
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))
}
