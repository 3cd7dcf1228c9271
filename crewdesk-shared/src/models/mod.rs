/// Domain models for CrewDesk
///
/// This module contains all record types and their store operations.
///
/// # Models
///
/// - `company`: Registered companies
/// - `user`: People — owners, leaders, and employees — with roles
/// - `task`: Work items with a validated status lifecycle
/// - `task_history`: Append-only audit trail per task
/// - `observation`: Free-text comment feed per task
/// - `leave`: Vacation requests and per-employee day balances
/// - `punch`: Time-clock punches
///
/// # Example
///
/// ```
/// use crewdesk_shared::models::company::{Company, CreateCompany};
/// use crewdesk_shared::store::RecordsStore;
///
/// let store = RecordsStore::new();
/// let company = Company::create(&store, CreateCompany {
///     name: "Acme".to_string(),
///     registration_code: "EMP001".to_string(),
///     tax_id: "12.345.678/0001-00".to_string(),
///     address: "1 Main St".to_string(),
///     phone: "+1 555 0100".to_string(),
///     contact_email: "hello@acme.example".to_string(),
/// });
/// assert!(company.active);
/// ```
pub mod company;
pub mod leave;
pub mod observation;
pub mod punch;
pub mod task;
pub mod task_history;
pub mod user;
