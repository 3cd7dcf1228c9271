/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - An isolated in-memory store per test
/// - A seeded company with an owner, a leader, and an employee
/// - Request building and JSON response helpers
use axum::body::Body;
use axum::http::{Request, StatusCode};
use crewdesk_api::app::{build_router, AppState};
use crewdesk_api::config::{ApiConfig, Config, SnapshotConfig};
use crewdesk_shared::models::company::{Company, CreateCompany};
use crewdesk_shared::models::user::{CreateUser, User, UserRole};
use crewdesk_shared::store::RecordsStore;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tower::util::ServiceExt;

/// Test context containing the router and the seeded records
pub struct TestContext {
    pub app: axum::Router,
    pub store: Arc<RecordsStore>,
    pub company: Company,
    pub owner: User,
    pub leader: User,
    pub employee: User,
}

impl TestContext {
    /// Creates a fresh context with an isolated store
    pub fn new() -> Self {
        let store = Arc::new(RecordsStore::new());

        let company = Company::create(
            &store,
            CreateCompany {
                name: "Acme".to_string(),
                registration_code: "EMP001".to_string(),
                tax_id: "12.345.678/0001-00".to_string(),
                address: "1 Main St".to_string(),
                phone: "+1 555 0100".to_string(),
                contact_email: "hello@acme.example".to_string(),
            },
        );

        let owner = seed_user(&store, company.id, "owner@acme.com", UserRole::CompanyOwner, None);
        let leader = seed_user(&store, company.id, "leader@acme.com", UserRole::Leader, None);
        let employee = seed_user(
            &store,
            company.id,
            "emp@acme.com",
            UserRole::Employee,
            Some(leader.id),
        );

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
            },
            snapshot: SnapshotConfig {
                path: PathBuf::from("unused-in-tests.json"),
                flush_seconds: 0,
            },
        };

        let app = build_router(AppState::new(store.clone(), config));

        Self {
            app,
            store,
            company,
            owner,
            leader,
            employee,
        }
    }

    /// Sends a request and returns the status plus parsed JSON body
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }
}

fn seed_user(
    store: &RecordsStore,
    company_id: uuid::Uuid,
    email: &str,
    role: UserRole,
    leader_id: Option<uuid::Uuid>,
) -> User {
    User::create(
        store,
        CreateUser {
            name: email.split('@').next().unwrap_or("user").to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            role,
            company_id: Some(company_id),
            department: "Engineering".to_string(),
            job_title: "Developer".to_string(),
            leader_id,
        },
    )
}

/// Builds a JSON request
pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Builds a bodyless request
pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}
