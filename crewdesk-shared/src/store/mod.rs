/// The records store
///
/// This module provides [`RecordsStore`], the single handle every model
/// operation takes. It owns id-indexed maps for all entities plus the
/// per-task history and observation feeds. The store is an explicit object
/// handed to whatever serves requests, never a global, so tests can
/// instantiate isolated stores per case.
///
/// # Semantics
///
/// - All operations are synchronous and in-memory.
/// - The only failure mode is "record not found", signaled by `Option::None`
///   from lookups, never by an error.
/// - Writers take the lock exclusively; the observable behavior for
///   concurrent callers is last-write-wins per record.
///
/// # Example
///
/// ```
/// use crewdesk_shared::models::company::{Company, CreateCompany};
/// use crewdesk_shared::store::RecordsStore;
///
/// let store = RecordsStore::new();
///
/// let company = Company::create(&store, CreateCompany {
///     name: "Acme".to_string(),
///     registration_code: "EMP001".to_string(),
///     tax_id: "12.345.678/0001-00".to_string(),
///     address: "1 Main St".to_string(),
///     phone: "+1 555 0100".to_string(),
///     contact_email: "hello@acme.example".to_string(),
/// });
///
/// assert_eq!(Company::find_by_id(&store, company.id), Some(company));
/// ```
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use uuid::Uuid;

use crate::models::company::Company;
use crate::models::leave::{LeaveBalance, LeaveRequest};
use crate::models::observation::TaskObservation;
use crate::models::punch::TimePunch;
use crate::models::task::Task;
use crate::models::task_history::TaskHistoryEntry;
use crate::models::user::User;
use crate::persist::snapshot::StoreSnapshot;

/// Canonical record collections, keyed by id
///
/// History, observations, and punches are keyed by their owning entity
/// (task or user) and kept in insertion order inside each `Vec`.
#[derive(Debug, Default)]
pub(crate) struct StoreInner {
    pub(crate) companies: HashMap<Uuid, Company>,
    pub(crate) users: HashMap<Uuid, User>,
    pub(crate) tasks: HashMap<Uuid, Task>,
    pub(crate) history: HashMap<Uuid, Vec<TaskHistoryEntry>>,
    pub(crate) observations: HashMap<Uuid, Vec<TaskObservation>>,
    pub(crate) leave_requests: HashMap<Uuid, LeaveRequest>,
    pub(crate) balances: HashMap<Uuid, LeaveBalance>,
    pub(crate) punches: HashMap<Uuid, Vec<TimePunch>>,
}

/// Shared handle to the canonical record collections
///
/// Clonable via `Arc` at the call site; model operations borrow it.
#[derive(Debug, Default)]
pub struct RecordsStore {
    inner: RwLock<StoreInner>,
}

impl RecordsStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the read lock
    ///
    /// A poisoned lock is recovered rather than propagated: the store has no
    /// invariant a panicking reader could have broken mid-flight that a later
    /// caller must not observe.
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, StoreInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquires the write lock, recovering from poisoning
    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, StoreInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Captures a serializable copy of every collection
    pub fn snapshot(&self) -> StoreSnapshot {
        let inner = self.read();
        StoreSnapshot {
            companies: inner.companies.values().cloned().collect(),
            users: inner.users.values().cloned().collect(),
            tasks: inner.tasks.values().cloned().collect(),
            history: inner.history.values().flatten().cloned().collect(),
            observations: inner.observations.values().flatten().cloned().collect(),
            leave_requests: inner.leave_requests.values().cloned().collect(),
            balances: inner.balances.values().cloned().collect(),
            punches: inner.punches.values().flatten().cloned().collect(),
        }
    }

    /// Replaces the store contents with a previously captured snapshot
    ///
    /// Existing records are discarded. Feeds are re-bucketed by owner and
    /// re-sorted chronologically so insertion order survives the round trip.
    pub fn restore(&self, snapshot: StoreSnapshot) {
        let mut inner = self.write();
        *inner = StoreInner::default();

        for company in snapshot.companies {
            inner.companies.insert(company.id, company);
        }
        for user in snapshot.users {
            inner.users.insert(user.id, user);
        }
        for task in snapshot.tasks {
            inner.tasks.insert(task.id, task);
        }
        for entry in snapshot.history {
            inner.history.entry(entry.task_id).or_default().push(entry);
        }
        for observation in snapshot.observations {
            inner
                .observations
                .entry(observation.task_id)
                .or_default()
                .push(observation);
        }
        for request in snapshot.leave_requests {
            inner.leave_requests.insert(request.id, request);
        }
        for balance in snapshot.balances {
            inner.balances.insert(balance.user_id, balance);
        }
        for punch in snapshot.punches {
            inner.punches.entry(punch.user_id).or_default().push(punch);
        }

        for feed in inner.history.values_mut() {
            feed.sort_by_key(|e| e.ts);
        }
        for feed in inner.observations.values_mut() {
            feed.sort_by_key(|o| o.created_at);
        }
        for feed in inner.punches.values_mut() {
            feed.sort_by_key(|p| p.ts);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_store_is_empty() {
        let store = RecordsStore::new();
        let snapshot = store.snapshot();
        assert!(snapshot.companies.is_empty());
        assert!(snapshot.users.is_empty());
        assert!(snapshot.tasks.is_empty());
    }
}
