/// Leave endpoints
///
/// # Endpoints
///
/// - `POST /v1/leave/requests` - Submit a leave request
/// - `GET /v1/leave/requests?employee_id=` - List requests
/// - `GET /v1/leave/requests/:id` - Fetch one request
/// - `POST /v1/leave/requests/:id/approve` - Approve
/// - `POST /v1/leave/requests/:id/reject` - Reject (reason required)
/// - `GET /v1/leave/balance/:user_id` - Current day counters
///
/// Range and balance rules live here, on the caller side of the store: a
/// request must cover 5 to 30 days inclusive, start today or later, end
/// after it starts, and fit the employee's available balance. The store
/// reserves the days the moment the request is created and restores them
/// on rejection.
use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use crewdesk_shared::models::leave::{
    inclusive_days, CreateLeaveRequest, LeaveBalance, LeaveRequest,
};
use crewdesk_shared::models::user::User;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Shortest leave a request may cover, in days
const MIN_LEAVE_DAYS: i64 = 5;

/// Longest leave a request may cover, in days
const MAX_LEAVE_DAYS: i64 = 30;

/// Submit leave request
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitLeaveRequest {
    /// Employee requesting leave
    pub employee_id: Uuid,

    /// First day of leave
    pub start_date: NaiveDate,

    /// Last day of leave (inclusive)
    pub end_date: NaiveDate,

    /// Free-text notes
    #[validate(length(max = 1000, message = "Notes must be at most 1000 characters"))]
    pub notes: Option<String>,
}

/// Approve request body
#[derive(Debug, Deserialize)]
pub struct ApproveLeaveRequest {
    /// User approving
    pub approver_id: Uuid,
}

/// Reject request body
#[derive(Debug, Deserialize, Validate)]
pub struct RejectLeaveRequest {
    /// User rejecting
    pub approver_id: Uuid,

    /// Why the request was denied (required)
    #[validate(length(min = 1, max = 1000, message = "Reason must be 1-1000 characters"))]
    pub reason: String,
}

/// List requests query
#[derive(Debug, Default, Deserialize)]
pub struct ListLeaveQuery {
    /// Restrict to one employee
    pub employee_id: Option<Uuid>,
}

/// Submits a leave request
///
/// # Errors
///
/// - `404` unknown employee
/// - `422` date-range or balance rule violation, with per-field details
pub async fn create_leave_request(
    State(state): State<AppState>,
    Json(req): Json<SubmitLeaveRequest>,
) -> ApiResult<Json<LeaveRequest>> {
    req.validate()?;

    if User::find_by_id(&state.store, req.employee_id).is_none() {
        return Err(ApiError::NotFound("Employee not found".to_string()));
    }

    let mut violations = Vec::new();
    let today = Utc::now().date_naive();
    if req.start_date < today {
        violations.push(ValidationErrorDetail {
            field: "start_date".to_string(),
            message: "Leave cannot start in the past".to_string(),
        });
    }
    if req.end_date <= req.start_date {
        violations.push(ValidationErrorDetail {
            field: "end_date".to_string(),
            message: "End date must be after the start date".to_string(),
        });
    } else {
        let days = inclusive_days(req.start_date, req.end_date);
        if !(MIN_LEAVE_DAYS..=MAX_LEAVE_DAYS).contains(&days) {
            violations.push(ValidationErrorDetail {
                field: "end_date".to_string(),
                message: format!(
                    "Leave must cover between {} and {} days",
                    MIN_LEAVE_DAYS, MAX_LEAVE_DAYS
                ),
            });
        } else {
            let available = LeaveBalance::for_user(&state.store, req.employee_id)
                .map(|b| b.available)
                .unwrap_or(0);
            if days > available {
                violations.push(ValidationErrorDetail {
                    field: "end_date".to_string(),
                    message: format!("Only {} leave days available", available),
                });
            }
        }
    }
    if !violations.is_empty() {
        return Err(ApiError::ValidationError(violations));
    }

    let request = LeaveRequest::create(
        &state.store,
        CreateLeaveRequest {
            employee_id: req.employee_id,
            start_date: req.start_date,
            end_date: req.end_date,
            notes: req.notes,
        },
    )
    .ok_or_else(|| ApiError::NotFound("Employee not found".to_string()))?;

    tracing::info!(
        request_id = %request.id,
        employee_id = %request.employee_id,
        days = request.days,
        "Leave request submitted"
    );
    Ok(Json(request))
}

/// Lists leave requests, optionally for one employee
pub async fn list_leave_requests(
    State(state): State<AppState>,
    Query(query): Query<ListLeaveQuery>,
) -> ApiResult<Json<Vec<LeaveRequest>>> {
    let requests = match query.employee_id {
        Some(employee_id) => LeaveRequest::list_by_employee(&state.store, employee_id),
        None => LeaveRequest::list(&state.store),
    };
    Ok(Json(requests))
}

/// Fetches one leave request by id
pub async fn get_leave_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<LeaveRequest>> {
    LeaveRequest::find_by_id(&state.store, id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Leave request not found".to_string()))
}

/// Approves a pending leave request
///
/// # Errors
///
/// - `400` unknown approver
/// - `403` approver's role may not decide leave
/// - `404` unknown request
/// - `409` request already resolved
pub async fn approve_leave_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ApproveLeaveRequest>,
) -> ApiResult<Json<LeaveRequest>> {
    check_approver(&state, req.approver_id)?;

    let request = LeaveRequest::approve(&state.store, id, req.approver_id)?;

    tracing::info!(request_id = %request.id, approver_id = %req.approver_id, "Leave approved");
    Ok(Json(request))
}

/// Rejects a pending leave request, restoring the reserved days
pub async fn reject_leave_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<RejectLeaveRequest>,
) -> ApiResult<Json<LeaveRequest>> {
    req.validate()?;
    if req.reason.trim().is_empty() {
        return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "reason".to_string(),
            message: "Reason must not be blank".to_string(),
        }]));
    }
    check_approver(&state, req.approver_id)?;

    let request = LeaveRequest::reject(&state.store, id, req.approver_id, req.reason)?;

    tracing::info!(request_id = %request.id, approver_id = %req.approver_id, "Leave rejected");
    Ok(Json(request))
}

/// Returns an employee's day counters
pub async fn get_leave_balance(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<LeaveBalance>> {
    LeaveBalance::for_user(&state.store, user_id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

fn check_approver(state: &AppState, approver_id: Uuid) -> Result<(), ApiError> {
    let approver = User::find_by_id(&state.store, approver_id)
        .ok_or_else(|| ApiError::BadRequest("Unknown approver".to_string()))?;
    if !approver.role.can_approve_leave() {
        return Err(ApiError::Forbidden(
            "Only leaders, owners, and admins may decide leave requests".to_string(),
        ));
    }
    Ok(())
}
