/// Snapshot file format
///
/// One JSON document holding every collection as a flat list. The feeds
/// (history, observations, punches) are re-bucketed by their owning entity
/// on restore, so the on-disk shape stays simple.
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::models::company::Company;
use crate::models::leave::{LeaveBalance, LeaveRequest};
use crate::models::observation::TaskObservation;
use crate::models::punch::TimePunch;
use crate::models::task::Task;
use crate::models::task_history::TaskHistoryEntry;
use crate::models::user::User;

/// Error type for snapshot IO
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Filesystem read/write failed
    #[error("snapshot io failed: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed
    #[error("snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Serializable copy of the whole records store
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub companies: Vec<Company>,
    pub users: Vec<User>,
    pub tasks: Vec<Task>,
    pub history: Vec<TaskHistoryEntry>,
    pub observations: Vec<TaskObservation>,
    pub leave_requests: Vec<LeaveRequest>,
    pub balances: Vec<LeaveBalance>,
    pub punches: Vec<TimePunch>,
}

impl StoreSnapshot {
    /// Serializes the snapshot to a JSON file
    pub fn write_to(&self, path: &Path) -> Result<(), SnapshotError> {
        let json = serde_json::to_vec_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Reads a snapshot back from a JSON file
    pub fn read_from(path: &Path) -> Result<Self, SnapshotError> {
        let bytes = fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
