/// Time-clock punches
///
/// Clock-in/clock-out records, kept per user in chronological order. The
/// alternation rule (an `in` must be followed by an `out`) is enforced by
/// the caller against `list_for_day`; the store just records.
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::RecordsStore;

/// Direction of a punch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PunchKind {
    /// Start of a work period
    In,

    /// End of a work period
    Out,
}

impl PunchKind {
    /// Converts kind to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            PunchKind::In => "in",
            PunchKind::Out => "out",
        }
    }

    /// Parses kind from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "in" => Some(PunchKind::In),
            "out" => Some(PunchKind::Out),
            _ => None,
        }
    }
}

/// One time-clock punch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePunch {
    /// Unique punch ID
    pub id: Uuid,

    /// User who punched
    pub user_id: Uuid,

    /// Direction
    pub kind: PunchKind,

    /// When the punch happened
    pub ts: DateTime<Utc>,

    /// Optional free-text note (e.g. a location hint)
    pub note: Option<String>,
}

/// Input for recording a punch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordPunch {
    /// User punching
    pub user_id: Uuid,

    /// Direction
    pub kind: PunchKind,

    /// Optional free-text note
    pub note: Option<String>,
}

impl TimePunch {
    /// Records a punch for a user
    ///
    /// Returns `None` if the user id does not resolve.
    pub fn record(store: &RecordsStore, data: RecordPunch) -> Option<Self> {
        let mut inner = store.write();
        if !inner.users.contains_key(&data.user_id) {
            return None;
        }

        let punch = TimePunch {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            kind: data.kind,
            ts: Utc::now(),
            note: data.note,
        };
        inner
            .punches
            .entry(data.user_id)
            .or_default()
            .push(punch.clone());
        Some(punch)
    }

    /// Returns one user's punches for a calendar day, chronological
    pub fn list_for_day(store: &RecordsStore, user_id: Uuid, date: NaiveDate) -> Vec<Self> {
        store
            .read()
            .punches
            .get(&user_id)
            .map(|feed| {
                feed.iter()
                    .filter(|p| p.ts.date_naive() == date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::{CreateUser, User, UserRole};

    fn seed_user(store: &RecordsStore) -> User {
        User::create(
            store,
            CreateUser {
                name: "Bob".to_string(),
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

    #[test]
    fn test_kind_round_trip() {
        assert_eq!(PunchKind::from_str("in"), Some(PunchKind::In));
        assert_eq!(PunchKind::from_str("out"), Some(PunchKind::Out));
        assert_eq!(PunchKind::from_str("lunch"), None);
    }

    #[test]
    fn test_record_and_list_today() {
        let store = RecordsStore::new();
        let user = seed_user(&store);

        TimePunch::record(
            &store,
            RecordPunch {
                user_id: user.id,
                kind: PunchKind::In,
                note: None,
            },
        )
        .unwrap();
        TimePunch::record(
            &store,
            RecordPunch {
                user_id: user.id,
                kind: PunchKind::Out,
                note: Some("lunch".to_string()),
            },
        )
        .unwrap();

        let today = Utc::now().date_naive();
        let punches = TimePunch::list_for_day(&store, user.id, today);
        assert_eq!(punches.len(), 2);
        assert_eq!(punches[0].kind, PunchKind::In);
        assert_eq!(punches[1].kind, PunchKind::Out);
    }

    #[test]
    fn test_record_for_unknown_user_is_none() {
        let store = RecordsStore::new();
        let result = TimePunch::record(
            &store,
            RecordPunch {
                user_id: Uuid::new_v4(),
                kind: PunchKind::In,
                note: None,
            },
        );
        assert!(result.is_none());
    }
}
