/// User model and store operations
///
/// This module provides the User model for everyone who appears in the
/// system: system admins, company owners, leaders, and employees. Users form
/// a two-level reporting tree inside a company — a leader owns a team of
/// employees, and each employee optionally points back at a leader.
///
/// # Roles
///
/// - **system_admin**: Cross-company administrator, not tied to one company
/// - **company_owner**: Top-level administrator of one company's data
/// - **leader**: Manager of a team; can create and assign tasks
/// - **employee**: Regular collaborator; works tasks and requests leave
///
/// # Example
///
/// ```
/// use crewdesk_shared::models::user::{CreateUser, User, UserRole};
/// use crewdesk_shared::store::RecordsStore;
/// use uuid::Uuid;
///
/// let store = RecordsStore::new();
/// let company_id = Uuid::new_v4();
///
/// let user = User::create(&store, CreateUser {
///     name: "Ana Souza".to_string(),
///     email: "ana@acme.example".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     role: UserRole::Leader,
///     company_id: Some(company_id),
///     department: "Engineering".to_string(),
///     job_title: "Tech Lead".to_string(),
///     leader_id: None,
/// });
///
/// assert!(user.role.can_create_tasks());
/// assert_eq!(User::find_by_email(&store, "ana@acme.example"), Some(user));
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::leave::LeaveBalance;
use crate::store::RecordsStore;

/// Role a user holds within the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Cross-company administrator with no single company
    SystemAdmin,

    /// Top-level administrator of one company
    CompanyOwner,

    /// Manager of a team of employees
    Leader,

    /// Regular collaborator
    Employee,
}

impl UserRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::SystemAdmin => "system_admin",
            UserRole::CompanyOwner => "company_owner",
            UserRole::Leader => "leader",
            UserRole::Employee => "employee",
        }
    }

    /// Parses role from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "system_admin" => Some(UserRole::SystemAdmin),
            "company_owner" => Some(UserRole::CompanyOwner),
            "leader" => Some(UserRole::Leader),
            "employee" => Some(UserRole::Employee),
            _ => None,
        }
    }

    /// Can create and assign tasks
    pub fn can_create_tasks(&self) -> bool {
        matches!(
            self,
            UserRole::SystemAdmin | UserRole::CompanyOwner | UserRole::Leader
        )
    }

    /// Can approve or reject leave requests
    pub fn can_approve_leave(&self) -> bool {
        matches!(
            self,
            UserRole::SystemAdmin | UserRole::CompanyOwner | UserRole::Leader
        )
    }

    /// Can edit company registration data and deactivate records
    pub fn can_manage_company(&self) -> bool {
        matches!(self, UserRole::SystemAdmin | UserRole::CompanyOwner)
    }

    /// Checks if this role has at least the permission level of `required`
    ///
    /// Hierarchy: SystemAdmin > CompanyOwner > Leader > Employee
    pub fn has_permission(&self, required: &UserRole) -> bool {
        self.permission_level() >= required.permission_level()
    }

    /// Returns numeric permission level for comparison
    fn permission_level(&self) -> u8 {
        match self {
            UserRole::SystemAdmin => 4,
            UserRole::CompanyOwner => 3,
            UserRole::Leader => 2,
            UserRole::Employee => 1,
        }
    }
}

/// User model representing one person
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Argon2id password hash (PHC string format)
    pub password_hash: String,

    /// Role within the system
    pub role: UserRole,

    /// Company the user belongs to (None only for system admins)
    pub company_id: Option<Uuid>,

    /// Department name
    pub department: String,

    /// Job title
    pub job_title: String,

    /// False once the user has been deactivated
    pub active: bool,

    /// Leader this user reports to, if any
    pub leader_id: Option<Uuid>,

    /// Direct reports, maintained when employees are attached or moved
    pub team: Vec<Uuid>,

    /// When the user was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Argon2id password hash (see `auth::password::hash_password`)
    pub password_hash: String,

    /// Role within the system
    pub role: UserRole,

    /// Company the user belongs to (None only for system admins)
    pub company_id: Option<Uuid>,

    /// Department name
    pub department: String,

    /// Job title
    pub job_title: String,

    /// Leader this user reports to, if any
    pub leader_id: Option<Uuid>,
}

/// Input for updating an existing user
///
/// `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    /// New display name
    pub name: Option<String>,

    /// New department
    pub department: Option<String>,

    /// New job title
    pub job_title: Option<String>,

    /// Move the user under a different leader
    pub leader_id: Option<Uuid>,
}

impl User {
    /// Creates a new user
    ///
    /// Assigns a fresh id, stamps the creation time, allocates the annual
    /// leave balance, and — when a leader is given — attaches the user to
    /// that leader's team. Cannot fail; referential checks on `leader_id`
    /// are the caller's responsibility.
    pub fn create(store: &RecordsStore, data: CreateUser) -> Self {
        let user = User {
            id: Uuid::new_v4(),
            name: data.name,
            email: data.email,
            password_hash: data.password_hash,
            role: data.role,
            company_id: data.company_id,
            department: data.department,
            job_title: data.job_title,
            active: true,
            leader_id: data.leader_id,
            team: Vec::new(),
            created_at: Utc::now(),
        };

        let mut inner = store.write();
        if let Some(leader_id) = user.leader_id {
            if let Some(leader) = inner.users.get_mut(&leader_id) {
                leader.team.push(user.id);
            }
        }
        inner
            .balances
            .insert(user.id, LeaveBalance::annual_allocation(user.id));
        inner.users.insert(user.id, user.clone());
        user
    }

    /// Finds a user by id
    ///
    /// Resolves deactivated users too.
    pub fn find_by_id(store: &RecordsStore, id: Uuid) -> Option<Self> {
        store.read().users.get(&id).cloned()
    }

    /// Finds a user by email address
    pub fn find_by_email(store: &RecordsStore, email: &str) -> Option<Self> {
        store.read().users.values().find(|u| u.email == email).cloned()
    }

    /// Lists active users in a company, most recently created first
    pub fn list_by_company(store: &RecordsStore, company_id: Uuid) -> Vec<Self> {
        let inner = store.read();
        let mut users: Vec<User> = inner
            .users
            .values()
            .filter(|u| u.active && u.company_id == Some(company_id))
            .cloned()
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        users
    }

    /// Lists all active users, most recently created first
    pub fn list(store: &RecordsStore) -> Vec<Self> {
        let inner = store.read();
        let mut users: Vec<User> = inner.users.values().filter(|u| u.active).cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        users
    }

    /// Updates a user, merging the provided fields
    ///
    /// A leader change detaches the user from the previous leader's team and
    /// attaches them to the new one. Returns the updated record, or `None`
    /// if the id does not resolve.
    pub fn update(store: &RecordsStore, id: Uuid, data: UpdateUser) -> Option<Self> {
        let mut inner = store.write();
        if !inner.users.contains_key(&id) {
            return None;
        }

        if let Some(new_leader) = data.leader_id {
            let old_leader = inner.users.get(&id).and_then(|u| u.leader_id);
            if old_leader != Some(new_leader) {
                if let Some(previous) = old_leader.and_then(|l| inner.users.get_mut(&l)) {
                    previous.team.retain(|member| *member != id);
                }
                if let Some(leader) = inner.users.get_mut(&new_leader) {
                    leader.team.push(id);
                }
            }
        }

        let user = inner.users.get_mut(&id)?;
        if let Some(name) = data.name {
            user.name = name;
        }
        if let Some(department) = data.department {
            user.department = department;
        }
        if let Some(job_title) = data.job_title {
            user.job_title = job_title;
        }
        if let Some(leader_id) = data.leader_id {
            user.leader_id = Some(leader_id);
        }

        Some(user.clone())
    }

    /// Deactivates a user (soft delete)
    ///
    /// The user is detached from their leader's team; their own historical
    /// records (tasks, history entries, leave requests) are untouched.
    /// Returns the updated record, or `None` if the id does not resolve.
    pub fn deactivate(store: &RecordsStore, id: Uuid) -> Option<Self> {
        let mut inner = store.write();
        let leader_id = inner.users.get(&id)?.leader_id;
        if let Some(leader) = leader_id.and_then(|l| inner.users.get_mut(&l)) {
            leader.team.retain(|member| *member != id);
        }

        let user = inner.users.get_mut(&id)?;
        user.active = false;
        Some(user.clone())
    }
}
