/// Integration tests for the CrewDesk API
///
/// These drive the full HTTP surface against an isolated in-memory store:
/// task lifecycle with its audit trail, role checks, leave workflow with
/// balance bookkeeping, and the time clock.
mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{get_request, json_request, TestContext};
use crewdesk_shared::models::leave::DEFAULT_ANNUAL_DAYS;
use serde_json::json;

async fn create_task(ctx: &TestContext, title: &str) -> String {
    let (status, body) = ctx
        .send(json_request(
            "POST",
            "/v1/tasks",
            json!({
                "title": title,
                "description": "integration test task",
                "priority": "high",
                "company_id": ctx.company.id,
                "assignee_id": ctx.employee.id,
                "created_by": ctx.leader.id,
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "create failed: {body}");
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new();
    let (status, body) = ctx.send(get_request("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["companies"], 1);
}

#[tokio::test]
async fn test_create_task_starts_pending() {
    let ctx = TestContext::new();
    // The company owner may create tasks too
    let (status, body) = ctx
        .send(json_request(
            "POST",
            "/v1/tasks",
            json!({
                "title": "Fix bug",
                "description": "crash on login",
                "priority": "medium",
                "company_id": ctx.company.id,
                "created_by": ctx.owner.id,
            }),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "pending");
    assert!(body["completed_at"].is_null());
}

#[tokio::test]
async fn test_employee_cannot_create_tasks() {
    let ctx = TestContext::new();
    let (status, body) = ctx
        .send(json_request(
            "POST",
            "/v1/tasks",
            json!({
                "title": "Sneaky",
                "description": "",
                "priority": "low",
                "company_id": ctx.company.id,
                "created_by": ctx.employee.id,
            }),
        ))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
}

#[tokio::test]
async fn test_task_lifecycle_and_history() {
    let ctx = TestContext::new();
    let task_id = create_task(&ctx, "Fix bug").await;

    let (status, _) = ctx
        .send(json_request(
            "POST",
            &format!("/v1/tasks/{task_id}/status"),
            json!({"status": "in_progress", "actor_id": ctx.leader.id}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = ctx
        .send(json_request(
            "POST",
            &format!("/v1/tasks/{task_id}/status"),
            json!({"status": "completed", "actor_id": ctx.employee.id}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["completed_at"].is_null());

    let (status, history) = ctx
        .send(get_request(&format!("/v1/tasks/{task_id}/history")))
        .await;
    assert_eq!(status, StatusCode::OK);
    let entries = history.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["action"], "created");
    assert_eq!(entries[1]["action"], "status_changed");
    assert_eq!(entries[2]["action"], "completed");
    assert_eq!(entries[2]["actor_name"], "emp");
}

#[tokio::test]
async fn test_completed_task_rejects_further_transitions() {
    let ctx = TestContext::new();
    let task_id = create_task(&ctx, "Fix bug").await;

    for (target, actor) in [("in_progress", ctx.leader.id), ("completed", ctx.employee.id)] {
        let (status, _) = ctx
            .send(json_request(
                "POST",
                &format!("/v1/tasks/{task_id}/status"),
                json!({"status": target, "actor_id": actor}),
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = ctx
        .send(json_request(
            "POST",
            &format!("/v1/tasks/{task_id}/status"),
            json!({"status": "cancelled", "actor_id": ctx.leader.id}),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn test_update_task_audits_semantic_fields() {
    let ctx = TestContext::new();
    let task_id = create_task(&ctx, "Fix bug").await;

    let (status, _) = ctx
        .send(json_request(
            "PUT",
            &format!("/v1/tasks/{task_id}"),
            json!({
                "priority": "low",
                "due_date": "2026-12-01",
                "actor_id": ctx.leader.id,
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, history) = ctx
        .send(get_request(&format!("/v1/tasks/{task_id}/history")))
        .await;
    let actions: Vec<&str> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["action"].as_str().unwrap())
        .collect();
    assert_eq!(actions, vec!["created", "priority_changed", "due_date_changed"]);
}

#[tokio::test]
async fn test_bulk_assign_skips_unknown_ids() {
    let ctx = TestContext::new();
    let first = create_task(&ctx, "One").await;
    let second = create_task(&ctx, "Two").await;

    let (status, body) = ctx
        .send(json_request(
            "POST",
            "/v1/tasks/assign",
            json!({
                "task_ids": [first, second, uuid::Uuid::new_v4()],
                "assignee_id": ctx.employee.id,
                "actor_id": ctx.leader.id,
            }),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["requested"], 3);
    assert_eq!(body["assigned"], 2);

    let task = crewdesk_shared::models::task::Task::find_by_id(
        &ctx.store,
        first.parse().unwrap(),
    )
    .unwrap();
    assert_eq!(task.assignee_id, Some(ctx.employee.id));
}

#[tokio::test]
async fn test_archived_task_leaves_listings_but_keeps_history() {
    let ctx = TestContext::new();
    let task_id = create_task(&ctx, "Short-lived").await;

    let (status, _) = ctx
        .send(json_request(
            "DELETE",
            &format!("/v1/tasks/{task_id}?actor_id={}", ctx.leader.id),
            json!({}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, tasks) = ctx
        .send(get_request(&format!(
            "/v1/tasks?company_id={}",
            ctx.company.id
        )))
        .await;
    assert!(tasks.as_array().unwrap().is_empty());

    let (status, history) = ctx
        .send(get_request(&format!("/v1/tasks/{task_id}/history")))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_get_unknown_task_is_404() {
    let ctx = TestContext::new();
    let (status, body) = ctx
        .send(get_request(&format!("/v1/tasks/{}", uuid::Uuid::new_v4())))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_observations_feed() {
    let ctx = TestContext::new();
    let task_id = create_task(&ctx, "Discussed").await;

    let (status, _) = ctx
        .send(json_request(
            "POST",
            &format!("/v1/tasks/{task_id}/observations"),
            json!({"author_id": ctx.employee.id, "body": "working on it"}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, observations) = ctx
        .send(get_request(&format!("/v1/tasks/{task_id}/observations")))
        .await;
    let list = observations.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["body"], "working on it");
    assert_eq!(list[0]["author_name"], "emp");
}

#[tokio::test]
async fn test_create_user_rejects_duplicate_email() {
    let ctx = TestContext::new();
    let (status, body) = ctx
        .send(json_request(
            "POST",
            "/v1/users",
            json!({
                "name": "Impostor",
                "email": "emp@acme.com",
                "password": "secret-1",
                "role": "employee",
                "company_id": ctx.company.id,
                "department": "Support",
                "job_title": "Analyst",
            }),
        ))
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Email already exists");
}

#[tokio::test]
async fn test_create_user_rejects_short_password() {
    let ctx = TestContext::new();
    let (status, body) = ctx
        .send(json_request(
            "POST",
            "/v1/users",
            json!({
                "name": "New Hire",
                "email": "new@acme.com",
                "password": "12345",
                "role": "employee",
                "company_id": ctx.company.id,
                "department": "Support",
                "job_title": "Analyst",
            }),
        ))
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "password");
}

#[tokio::test]
async fn test_create_user_rejects_bad_leader_reference() {
    let ctx = TestContext::new();
    // The employee is not a leader, so reporting to them is rejected
    let (status, _) = ctx
        .send(json_request(
            "POST",
            "/v1/users",
            json!({
                "name": "New Hire",
                "email": "new@acme.com",
                "password": "secret-1",
                "role": "employee",
                "company_id": ctx.company.id,
                "department": "Support",
                "job_title": "Analyst",
                "leader_id": ctx.employee.id,
            }),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_created_user_response_never_contains_hash() {
    let ctx = TestContext::new();
    let (status, body) = ctx
        .send(json_request(
            "POST",
            "/v1/users",
            json!({
                "name": "New Hire",
                "email": "new@acme.com",
                "password": "secret-1",
                "role": "employee",
                "company_id": ctx.company.id,
                "department": "Support",
                "job_title": "Analyst",
            }),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("password_hash").is_none());
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn test_leave_request_reserves_and_rejection_restores_balance() {
    let ctx = TestContext::new();
    let start = Utc::now().date_naive() + Duration::days(10);
    let end = start + Duration::days(9);

    let (status, request) = ctx
        .send(json_request(
            "POST",
            "/v1/leave/requests",
            json!({
                "employee_id": ctx.employee.id,
                "start_date": start,
                "end_date": end,
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "submit failed: {request}");
    assert_eq!(request["days"], 10);
    assert_eq!(request["status"], "pending");

    let (_, balance) = ctx
        .send(get_request(&format!("/v1/leave/balance/{}", ctx.employee.id)))
        .await;
    assert_eq!(balance["available"], DEFAULT_ANNUAL_DAYS - 10);
    assert_eq!(balance["used"], 10);

    let request_id = request["id"].as_str().unwrap();
    let (status, rejected) = ctx
        .send(json_request(
            "POST",
            &format!("/v1/leave/requests/{request_id}/reject"),
            json!({"approver_id": ctx.leader.id, "reason": "busy season"}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rejected["status"], "rejected");

    let (_, balance) = ctx
        .send(get_request(&format!("/v1/leave/balance/{}", ctx.employee.id)))
        .await;
    assert_eq!(balance["available"], DEFAULT_ANNUAL_DAYS);
    assert_eq!(balance["used"], 0);

    // A second decision on the same request is a conflict
    let (status, _) = ctx
        .send(json_request(
            "POST",
            &format!("/v1/leave/requests/{request_id}/approve"),
            json!({"approver_id": ctx.leader.id}),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_leave_request_window_rules() {
    let ctx = TestContext::new();
    let start = Utc::now().date_naive() + Duration::days(10);

    // Too short: 3 days
    let (status, body) = ctx
        .send(json_request(
            "POST",
            "/v1/leave/requests",
            json!({
                "employee_id": ctx.employee.id,
                "start_date": start,
                "end_date": start + Duration::days(2),
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");

    // Starts in the past
    let past = Utc::now().date_naive() - Duration::days(5);
    let (status, _) = ctx
        .send(json_request(
            "POST",
            "/v1/leave/requests",
            json!({
                "employee_id": ctx.employee.id,
                "start_date": past,
                "end_date": past + Duration::days(9),
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Nothing was reserved by the refused attempts
    let (_, balance) = ctx
        .send(get_request(&format!("/v1/leave/balance/{}", ctx.employee.id)))
        .await;
    assert_eq!(balance["available"], DEFAULT_ANNUAL_DAYS);
}

#[tokio::test]
async fn test_leave_request_rejects_overdraw() {
    let ctx = TestContext::new();
    let start = Utc::now().date_naive() + Duration::days(10);

    // First request takes 25 of the 30 days
    let (status, _) = ctx
        .send(json_request(
            "POST",
            "/v1/leave/requests",
            json!({
                "employee_id": ctx.employee.id,
                "start_date": start,
                "end_date": start + Duration::days(24),
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    // A second 10-day request exceeds what is left
    let later = start + Duration::days(60);
    let (status, body) = ctx
        .send(json_request(
            "POST",
            "/v1/leave/requests",
            json!({
                "employee_id": ctx.employee.id,
                "start_date": later,
                "end_date": later + Duration::days(9),
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");

    let (_, balance) = ctx
        .send(get_request(&format!("/v1/leave/balance/{}", ctx.employee.id)))
        .await;
    assert_eq!(balance["available"], DEFAULT_ANNUAL_DAYS - 25);
}

#[tokio::test]
async fn test_employee_cannot_decide_leave() {
    let ctx = TestContext::new();
    let start = Utc::now().date_naive() + Duration::days(10);

    let (_, request) = ctx
        .send(json_request(
            "POST",
            "/v1/leave/requests",
            json!({
                "employee_id": ctx.employee.id,
                "start_date": start,
                "end_date": start + Duration::days(9),
            }),
        ))
        .await;
    let request_id = request["id"].as_str().unwrap();

    let (status, _) = ctx
        .send(json_request(
            "POST",
            &format!("/v1/leave/requests/{request_id}/approve"),
            json!({"approver_id": ctx.employee.id}),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_punch_directions_must_alternate() {
    let ctx = TestContext::new();

    // Out before any in
    let (status, _) = ctx
        .send(json_request(
            "POST",
            "/v1/punches",
            json!({"user_id": ctx.employee.id, "kind": "out"}),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = ctx
        .send(json_request(
            "POST",
            "/v1/punches",
            json!({"user_id": ctx.employee.id, "kind": "in"}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    // Second in without an out
    let (status, _) = ctx
        .send(json_request(
            "POST",
            "/v1/punches",
            json!({"user_id": ctx.employee.id, "kind": "in"}),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = ctx
        .send(json_request(
            "POST",
            "/v1/punches",
            json!({"user_id": ctx.employee.id, "kind": "out"}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, punches) = ctx
        .send(get_request(&format!("/v1/punches/{}", ctx.employee.id)))
        .await;
    assert_eq!(punches.as_array().unwrap().len(), 2);
}
