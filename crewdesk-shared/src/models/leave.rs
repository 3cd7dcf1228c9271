/// Leave requests and balance bookkeeping
///
/// This module provides the LeaveRequest model — the vacation workflow — and
/// the per-employee LeaveBalance running totals.
///
/// # State Machine
///
/// ```text
/// pending → approved
///         → rejected
/// ```
///
/// Approve and reject are mutually exclusive terminal transitions; either
/// one on an already-resolved request is an error, not a no-op.
///
/// # Balance policy
///
/// The requested days are moved from `available` to `used` when the request
/// is **created**, not when it is approved. Approval therefore changes
/// nothing on the balance; rejection restores the days in full. Reserving
/// eagerly keeps overlapping pending requests from oversubscribing the
/// balance.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use crewdesk_shared::models::leave::inclusive_days;
///
/// let start = NaiveDate::from_ymd_opt(2026, 8, 10).unwrap();
/// let end = NaiveDate::from_ymd_opt(2026, 8, 19).unwrap();
/// assert_eq!(inclusive_days(start, end), 10);
/// ```
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::task_history::actor_display_name;
use crate::store::RecordsStore;

/// Vacation days allocated to every new user
pub const DEFAULT_ANNUAL_DAYS: i64 = 30;

/// Leave request lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    /// Waiting for a decision
    Pending,

    /// Granted (terminal)
    Approved,

    /// Denied with a reason (terminal)
    Rejected,
}

impl LeaveStatus {
    /// Converts status to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveStatus::Pending => "pending",
            LeaveStatus::Approved => "approved",
            LeaveStatus::Rejected => "rejected",
        }
    }

    /// Parses status from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(LeaveStatus::Pending),
            "approved" => Some(LeaveStatus::Approved),
            "rejected" => Some(LeaveStatus::Rejected),
            _ => None,
        }
    }

    /// Checks if a decision has been made
    pub fn is_resolved(&self) -> bool {
        !matches!(self, LeaveStatus::Pending)
    }
}

/// Error type for leave workflow operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LeaveError {
    /// Request id does not resolve
    #[error("leave request not found")]
    NotFound,

    /// Request was already approved or rejected
    #[error("leave request already {}", status.as_str())]
    AlreadyResolved { status: LeaveStatus },
}

/// Per-employee vacation day counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveBalance {
    /// Employee this balance belongs to
    pub user_id: Uuid,

    /// Days still available to request
    pub available: i64,

    /// Days reserved by pending or approved requests
    pub used: i64,

    /// Days sold back instead of taken
    pub sold: i64,
}

impl LeaveBalance {
    /// The balance every new user starts with
    pub fn annual_allocation(user_id: Uuid) -> Self {
        LeaveBalance {
            user_id,
            available: DEFAULT_ANNUAL_DAYS,
            used: 0,
            sold: 0,
        }
    }

    /// Looks up an employee's balance
    pub fn for_user(store: &RecordsStore, user_id: Uuid) -> Option<Self> {
        store.read().balances.get(&user_id).cloned()
    }
}

/// Leave request model
///
/// Employee name and job title are denormalized at request time so the
/// approval queue stays readable after the employee record changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRequest {
    /// Unique request ID
    pub id: Uuid,

    /// Employee requesting leave
    pub employee_id: Uuid,

    /// Employee display name at request time
    pub employee_name: String,

    /// Employee job title at request time
    pub job_title: String,

    /// First day of leave
    pub start_date: NaiveDate,

    /// Last day of leave (inclusive)
    pub end_date: NaiveDate,

    /// Inclusive day count
    pub days: i64,

    /// Free-text notes from the employee
    pub notes: Option<String>,

    /// Current lifecycle state
    pub status: LeaveStatus,

    /// When the request was submitted
    pub requested_at: DateTime<Utc>,

    /// User who decided, once resolved
    pub approver_id: Option<Uuid>,

    /// Approver display name at decision time
    pub approver_name: Option<String>,

    /// When the decision was made
    pub resolved_at: Option<DateTime<Utc>>,

    /// Required on rejection
    pub rejection_reason: Option<String>,
}

/// Input for submitting a leave request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLeaveRequest {
    /// Employee requesting leave
    pub employee_id: Uuid,

    /// First day of leave
    pub start_date: NaiveDate,

    /// Last day of leave (inclusive)
    pub end_date: NaiveDate,

    /// Free-text notes
    pub notes: Option<String>,
}

/// Counts calendar days between two dates, inclusive of both ends
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

impl LeaveRequest {
    /// Submits a leave request, reserving the days immediately
    ///
    /// Computes the inclusive day count and moves it from the employee's
    /// `available` to `used` right away (see the module docs for the
    /// policy). Range and balance validation is the caller's job and is
    /// deliberately not repeated here. Returns `None` if the employee id
    /// does not resolve.
    pub fn create(store: &RecordsStore, data: CreateLeaveRequest) -> Option<Self> {
        let mut inner = store.write();
        let employee = inner.users.get(&data.employee_id)?.clone();
        let days = inclusive_days(data.start_date, data.end_date);

        let request = LeaveRequest {
            id: Uuid::new_v4(),
            employee_id: employee.id,
            employee_name: employee.name,
            job_title: employee.job_title,
            start_date: data.start_date,
            end_date: data.end_date,
            days,
            notes: data.notes,
            status: LeaveStatus::Pending,
            requested_at: Utc::now(),
            approver_id: None,
            approver_name: None,
            resolved_at: None,
            rejection_reason: None,
        };

        let balance = inner
            .balances
            .entry(employee.id)
            .or_insert_with(|| LeaveBalance::annual_allocation(employee.id));
        balance.available -= days;
        balance.used += days;

        inner.leave_requests.insert(request.id, request.clone());
        Some(request)
    }

    /// Finds a request by id
    pub fn find_by_id(store: &RecordsStore, id: Uuid) -> Option<Self> {
        store.read().leave_requests.get(&id).cloned()
    }

    /// Lists all requests, most recent first
    pub fn list(store: &RecordsStore) -> Vec<Self> {
        Self::list_where(store, |_| true)
    }

    /// Lists one employee's requests, most recent first
    pub fn list_by_employee(store: &RecordsStore, employee_id: Uuid) -> Vec<Self> {
        Self::list_where(store, |r| r.employee_id == employee_id)
    }

    fn list_where(store: &RecordsStore, predicate: impl Fn(&LeaveRequest) -> bool) -> Vec<Self> {
        let inner = store.read();
        let mut requests: Vec<LeaveRequest> = inner
            .leave_requests
            .values()
            .filter(|r| predicate(r))
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.requested_at.cmp(&a.requested_at).then(a.id.cmp(&b.id)));
        requests
    }

    /// Approves a pending request
    ///
    /// The days were already reserved at creation, so the balance is
    /// untouched.
    ///
    /// # Errors
    ///
    /// - [`LeaveError::NotFound`] if the id does not resolve
    /// - [`LeaveError::AlreadyResolved`] if a decision was already made
    pub fn approve(store: &RecordsStore, id: Uuid, approver_id: Uuid) -> Result<Self, LeaveError> {
        let mut inner = store.write();
        let status = inner
            .leave_requests
            .get(&id)
            .ok_or(LeaveError::NotFound)?
            .status;
        if status.is_resolved() {
            return Err(LeaveError::AlreadyResolved { status });
        }

        let approver_name = actor_display_name(&inner, approver_id);
        let request = inner.leave_requests.get_mut(&id).ok_or(LeaveError::NotFound)?;
        request.status = LeaveStatus::Approved;
        request.approver_id = Some(approver_id);
        request.approver_name = Some(approver_name);
        request.resolved_at = Some(Utc::now());
        Ok(request.clone())
    }

    /// Rejects a pending request, restoring the reserved days
    ///
    /// A non-empty `reason` is the caller's contract; the store records
    /// whatever it is given.
    ///
    /// # Errors
    ///
    /// - [`LeaveError::NotFound`] if the id does not resolve
    /// - [`LeaveError::AlreadyResolved`] if a decision was already made
    pub fn reject(
        store: &RecordsStore,
        id: Uuid,
        approver_id: Uuid,
        reason: String,
    ) -> Result<Self, LeaveError> {
        let mut inner = store.write();
        let status = inner
            .leave_requests
            .get(&id)
            .ok_or(LeaveError::NotFound)?
            .status;
        if status.is_resolved() {
            return Err(LeaveError::AlreadyResolved { status });
        }

        let approver_name = actor_display_name(&inner, approver_id);
        let request = inner.leave_requests.get_mut(&id).ok_or(LeaveError::NotFound)?;
        request.status = LeaveStatus::Rejected;
        request.approver_id = Some(approver_id);
        request.approver_name = Some(approver_name);
        request.resolved_at = Some(Utc::now());
        request.rejection_reason = Some(reason);
        let (employee_id, days) = (request.employee_id, request.days);
        let rejected = request.clone();

        if let Some(balance) = inner.balances.get_mut(&employee_id) {
            balance.available += days;
            balance.used -= days;
        }
        Ok(rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::{CreateUser, User, UserRole};

    fn seed_employee(store: &RecordsStore) -> User {
        User::create(
            store,
            CreateUser {
                name: "Bob Lima".to_string(),
                email: "bob@acme.example".to_string(),
                password_hash: "$argon2id$stub".to_string(),
                role: UserRole::Employee,
                company_id: Some(Uuid::new_v4()),
                department: "Support".to_string(),
                job_title: "Analyst".to_string(),
                leader_id: None,
            },
        )
    }

    fn request_input(employee_id: Uuid, from: (i32, u32, u32), to: (i32, u32, u32)) -> CreateLeaveRequest {
        CreateLeaveRequest {
            employee_id,
            start_date: NaiveDate::from_ymd_opt(from.0, from.1, from.2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(to.0, to.1, to.2).unwrap(),
            notes: None,
        }
    }

    #[test]
    fn test_inclusive_days() {
        let start = NaiveDate::from_ymd_opt(2026, 8, 10).unwrap();
        assert_eq!(inclusive_days(start, start), 1);
        let end = NaiveDate::from_ymd_opt(2026, 8, 14).unwrap();
        assert_eq!(inclusive_days(start, end), 5);
    }

    #[test]
    fn test_create_reserves_days_immediately() {
        let store = RecordsStore::new();
        let employee = seed_employee(&store);

        let request = LeaveRequest::create(
            &store,
            request_input(employee.id, (2026, 8, 10), (2026, 8, 19)),
        )
        .unwrap();

        assert_eq!(request.days, 10);
        assert_eq!(request.status, LeaveStatus::Pending);
        assert_eq!(request.employee_name, "Bob Lima");

        let balance = LeaveBalance::for_user(&store, employee.id).unwrap();
        assert_eq!(balance.available, DEFAULT_ANNUAL_DAYS - 10);
        assert_eq!(balance.used, 10);
    }

    #[test]
    fn test_create_for_unknown_employee_is_none() {
        let store = RecordsStore::new();
        let result = LeaveRequest::create(
            &store,
            request_input(Uuid::new_v4(), (2026, 8, 10), (2026, 8, 19)),
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_approve_keeps_balance() {
        let store = RecordsStore::new();
        let employee = seed_employee(&store);
        let approver = Uuid::new_v4();
        let request = LeaveRequest::create(
            &store,
            request_input(employee.id, (2026, 8, 10), (2026, 8, 16)),
        )
        .unwrap();

        let approved = LeaveRequest::approve(&store, request.id, approver).unwrap();
        assert_eq!(approved.status, LeaveStatus::Approved);
        assert!(approved.resolved_at.is_some());

        let balance = LeaveBalance::for_user(&store, employee.id).unwrap();
        assert_eq!(balance.available, DEFAULT_ANNUAL_DAYS - 7);
        assert_eq!(balance.used, 7);
    }

    #[test]
    fn test_reject_restores_balance() {
        let store = RecordsStore::new();
        let employee = seed_employee(&store);
        let request = LeaveRequest::create(
            &store,
            request_input(employee.id, (2026, 8, 10), (2026, 8, 16)),
        )
        .unwrap();

        let rejected =
            LeaveRequest::reject(&store, request.id, Uuid::new_v4(), "busy season".to_string())
                .unwrap();
        assert_eq!(rejected.status, LeaveStatus::Rejected);
        assert_eq!(rejected.rejection_reason.as_deref(), Some("busy season"));

        let balance = LeaveBalance::for_user(&store, employee.id).unwrap();
        assert_eq!(balance.available, DEFAULT_ANNUAL_DAYS);
        assert_eq!(balance.used, 0);
    }

    #[test]
    fn test_approve_and_reject_are_mutually_exclusive() {
        let store = RecordsStore::new();
        let employee = seed_employee(&store);
        let request = LeaveRequest::create(
            &store,
            request_input(employee.id, (2026, 8, 10), (2026, 8, 16)),
        )
        .unwrap();

        LeaveRequest::approve(&store, request.id, Uuid::new_v4()).unwrap();

        let rejected =
            LeaveRequest::reject(&store, request.id, Uuid::new_v4(), "late".to_string());
        assert_eq!(
            rejected,
            Err(LeaveError::AlreadyResolved {
                status: LeaveStatus::Approved,
            })
        );

        let again = LeaveRequest::approve(&store, request.id, Uuid::new_v4());
        assert!(matches!(again, Err(LeaveError::AlreadyResolved { .. })));
    }

    #[test]
    fn test_resolve_unknown_request() {
        let store = RecordsStore::new();
        assert_eq!(
            LeaveRequest::approve(&store, Uuid::new_v4(), Uuid::new_v4()),
            Err(LeaveError::NotFound)
        );
    }
}
