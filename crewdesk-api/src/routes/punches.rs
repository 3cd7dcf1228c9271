/// Time-clock endpoints
///
/// # Endpoints
///
/// - `POST /v1/punches` - Record a punch
/// - `GET /v1/punches/:user_id?date=` - List one day's punches
///
/// Punch directions must alternate within a day: the first punch is an
/// `in`, and no two consecutive punches may share a direction.
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use crewdesk_shared::models::punch::{PunchKind, RecordPunch, TimePunch};
use crewdesk_shared::models::user::User;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Record punch request
#[derive(Debug, Deserialize, Validate)]
pub struct RecordPunchRequest {
    /// User punching
    pub user_id: Uuid,

    /// Direction
    pub kind: PunchKind,

    /// Optional free-text note (e.g. a location hint)
    #[validate(length(max = 255, message = "Note must be at most 255 characters"))]
    pub note: Option<String>,
}

/// List punches query
#[derive(Debug, Default, Deserialize)]
pub struct ListPunchesQuery {
    /// Calendar day to list; defaults to today
    pub date: Option<NaiveDate>,
}

/// Records a punch
///
/// # Errors
///
/// - `404` unknown user
/// - `409` out-of-order direction (two `in`s in a row, or an `out` with no
///   open `in`)
pub async fn record_punch(
    State(state): State<AppState>,
    Json(req): Json<RecordPunchRequest>,
) -> ApiResult<Json<TimePunch>> {
    req.validate()?;

    if User::find_by_id(&state.store, req.user_id).is_none() {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    let today = Utc::now().date_naive();
    let last_kind = TimePunch::list_for_day(&state.store, req.user_id, today)
        .last()
        .map(|p| p.kind);
    match (last_kind, req.kind) {
        (None, PunchKind::Out) => {
            return Err(ApiError::Conflict(
                "Cannot punch out before punching in".to_string(),
            ));
        }
        (Some(last), kind) if last == kind => {
            return Err(ApiError::Conflict(format!(
                "Consecutive '{}' punches are not allowed",
                kind.as_str()
            )));
        }
        _ => {}
    }

    let punch = TimePunch::record(
        &state.store,
        RecordPunch {
            user_id: req.user_id,
            kind: req.kind,
            note: req.note,
        },
    )
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = %punch.user_id, kind = punch.kind.as_str(), "Punch recorded");
    Ok(Json(punch))
}

/// Lists one user's punches for a day (default: today), chronological
pub async fn list_punches(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<ListPunchesQuery>,
) -> ApiResult<Json<Vec<TimePunch>>> {
    if User::find_by_id(&state.store, user_id).is_none() {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    Ok(Json(TimePunch::list_for_day(&state.store, user_id, date)))
}
