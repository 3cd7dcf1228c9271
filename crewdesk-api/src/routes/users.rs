/// User endpoints
///
/// # Endpoints
///
/// - `POST /v1/users` - Create a user
/// - `GET /v1/users?company_id=` - List active users
/// - `GET /v1/users/:id` - Fetch one user
/// - `PUT /v1/users/:id` - Update a user
/// - `POST /v1/users/:id/deactivate` - Soft-delete a user
///
/// Passwords are hashed before the record is stored and never leave the
/// server; responses use [`UserResponse`], which has no hash field.
use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use crewdesk_shared::auth::password;
use crewdesk_shared::models::company::Company;
use crewdesk_shared::models::user::{CreateUser, UpdateUser, User, UserRole};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create user request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Display name
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub name: String,

    /// Email address (unique)
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (hashed before storage)
    pub password: String,

    /// Role within the system
    pub role: UserRole,

    /// Company the user belongs to (required except for system admins)
    pub company_id: Option<Uuid>,

    /// Department name
    #[validate(length(max = 120, message = "Department must be at most 120 characters"))]
    pub department: String,

    /// Job title
    #[validate(length(max = 120, message = "Job title must be at most 120 characters"))]
    pub job_title: String,

    /// Leader this user reports to, if any
    pub leader_id: Option<Uuid>,
}

/// Update user request
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    /// New display name
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub name: Option<String>,

    /// New department
    #[validate(length(max = 120, message = "Department must be at most 120 characters"))]
    pub department: Option<String>,

    /// New job title
    #[validate(length(max = 120, message = "Job title must be at most 120 characters"))]
    pub job_title: Option<String>,

    /// Move the user under a different leader
    pub leader_id: Option<Uuid>,
}

/// List users query
#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    /// Restrict to one company
    pub company_id: Option<Uuid>,
}

/// User representation returned by the API
///
/// Everything on the record except the password hash.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub company_id: Option<Uuid>,
    pub department: String,
    pub job_title: String,
    pub active: bool,
    pub leader_id: Option<Uuid>,
    pub team: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            company_id: user.company_id,
            department: user.department,
            job_title: user.job_title,
            active: user.active,
            leader_id: user.leader_id,
            team: user.team,
            created_at: user.created_at,
        }
    }
}

/// Creates a new user
///
/// # Errors
///
/// - `422` validation failure (including the password length rule)
/// - `409` email already registered
/// - `400` missing/unknown company, or a leader reference that is not an
///   active leader in the same company
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    req.validate()?;

    password::validate_password_strength(&req.password).map_err(|e| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "password".to_string(),
            message: e,
        }])
    })?;

    if User::find_by_email(&state.store, &req.email).is_some() {
        return Err(ApiError::Conflict("Email already exists".to_string()));
    }

    // System admins are the only users without a company
    if req.role != UserRole::SystemAdmin {
        let company_id = req
            .company_id
            .ok_or_else(|| ApiError::BadRequest("company_id is required for this role".to_string()))?;
        if Company::find_by_id(&state.store, company_id).is_none() {
            return Err(ApiError::BadRequest("Unknown company".to_string()));
        }
    }

    if let Some(leader_id) = req.leader_id {
        validate_leader_reference(&state, leader_id, req.company_id)?;
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.store,
        CreateUser {
            name: req.name,
            email: req.email,
            password_hash,
            role: req.role,
            company_id: req.company_id,
            department: req.department,
            job_title: req.job_title,
            leader_id: req.leader_id,
        },
    );

    tracing::info!(user_id = %user.id, role = user.role.as_str(), "User created");
    Ok(Json(user.into()))
}

/// Lists active users, optionally restricted to one company
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = match query.company_id {
        Some(company_id) => User::list_by_company(&state.store, company_id),
        None => User::list(&state.store),
    };
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Fetches one user by id
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserResponse>> {
    User::find_by_id(&state.store, id)
        .map(|u| Json(u.into()))
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

/// Updates a user
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    req.validate()?;

    if let Some(leader_id) = req.leader_id {
        let company_id = User::find_by_id(&state.store, id)
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?
            .company_id;
        validate_leader_reference(&state, leader_id, company_id)?;
    }

    User::update(
        &state.store,
        id,
        UpdateUser {
            name: req.name,
            department: req.department,
            job_title: req.job_title,
            leader_id: req.leader_id,
        },
    )
    .map(|u| Json(u.into()))
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

/// Deactivates a user (soft delete)
pub async fn deactivate_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserResponse>> {
    let user = User::deactivate(&state.store, id)
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = %user.id, "User deactivated");
    Ok(Json(user.into()))
}

/// Checks that a leader reference points at an active leader in the same
/// company
fn validate_leader_reference(
    state: &AppState,
    leader_id: Uuid,
    company_id: Option<Uuid>,
) -> Result<(), ApiError> {
    let leader = User::find_by_id(&state.store, leader_id)
        .ok_or_else(|| ApiError::BadRequest("Unknown leader".to_string()))?;
    if !leader.active || leader.role != UserRole::Leader {
        return Err(ApiError::BadRequest(
            "leader_id must reference an active leader".to_string(),
        ));
    }
    if leader.company_id != company_id {
        return Err(ApiError::BadRequest(
            "Leader must belong to the same company".to_string(),
        ));
    }
    Ok(())
}
