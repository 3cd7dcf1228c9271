/// Snapshot persistence
///
/// The store optionally mirrors itself to a JSON file — the device-local
/// storage analog. Writes are best-effort and fire-and-forget: a failed
/// flush is logged at warn and never surfaces to callers, and a missing or
/// unreadable file at startup simply means starting empty. There is no
/// schema versioning, compaction, or encryption.
use std::path::Path;

use crate::store::RecordsStore;

pub mod snapshot;

pub use snapshot::{SnapshotError, StoreSnapshot};

/// Flushes the store to `path`, best-effort
///
/// Failures are logged and swallowed.
pub fn flush(store: &RecordsStore, path: &Path) {
    match store.snapshot().write_to(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "store snapshot flushed"),
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "store snapshot flush failed"),
    }
}

/// Loads a snapshot from `path` if one exists
///
/// A missing file is normal (first run); an unreadable one is logged at
/// warn and treated as absent.
pub fn load(path: &Path) -> Option<StoreSnapshot> {
    if !path.exists() {
        return None;
    }
    match StoreSnapshot::read_from(path) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "store snapshot unreadable, starting empty");
            None
        }
    }
}
