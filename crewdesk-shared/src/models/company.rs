/// Company model and store operations
///
/// This module provides the Company model, the top-level entity every other
/// record hangs off. A company is created once at registration and is never
/// physically deleted — deactivation flips the `active` flag and the record
/// stays resolvable by id.
///
/// # Example
///
/// ```
/// use crewdesk_shared::models::company::{Company, CreateCompany, UpdateCompany};
/// use crewdesk_shared::store::RecordsStore;
///
/// let store = RecordsStore::new();
///
/// let company = Company::create(&store, CreateCompany {
///     name: "Acme Corp".to_string(),
///     registration_code: "EMP001".to_string(),
///     tax_id: "12.345.678/0001-00".to_string(),
///     address: "1 Main St".to_string(),
///     phone: "+1 555 0100".to_string(),
///     contact_email: "hello@acme.example".to_string(),
/// });
///
/// let renamed = Company::update(&store, company.id, UpdateCompany {
///     name: Some("Acme Inc".to_string()),
///     ..Default::default()
/// });
/// assert_eq!(renamed.unwrap().name, "Acme Inc");
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::RecordsStore;

/// Company model representing one registered organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    /// Unique company ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Company registration code
    pub registration_code: String,

    /// Tax identifier
    pub tax_id: String,

    /// Postal address
    pub address: String,

    /// Contact phone number
    pub phone: String,

    /// Contact email address
    pub contact_email: String,

    /// False once the company has been deactivated
    pub active: bool,

    /// When the company was registered
    pub created_at: DateTime<Utc>,
}

/// Input for registering a new company
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCompany {
    /// Display name
    pub name: String,

    /// Company registration code
    pub registration_code: String,

    /// Tax identifier
    pub tax_id: String,

    /// Postal address
    pub address: String,

    /// Contact phone number
    pub phone: String,

    /// Contact email address
    pub contact_email: String,
}

/// Input for updating an existing company
///
/// `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCompany {
    /// New display name
    pub name: Option<String>,

    /// New postal address
    pub address: Option<String>,

    /// New contact phone number
    pub phone: Option<String>,

    /// New contact email address
    pub contact_email: Option<String>,
}

impl Company {
    /// Registers a new company
    ///
    /// Assigns a fresh id, stamps the creation time, and inserts the record.
    /// Cannot fail.
    pub fn create(store: &RecordsStore, data: CreateCompany) -> Self {
        let company = Company {
            id: Uuid::new_v4(),
            name: data.name,
            registration_code: data.registration_code,
            tax_id: data.tax_id,
            address: data.address,
            phone: data.phone,
            contact_email: data.contact_email,
            active: true,
            created_at: Utc::now(),
        };

        store.write().companies.insert(company.id, company.clone());
        company
    }

    /// Finds a company by id
    ///
    /// Resolves deactivated companies too, so historical references stay
    /// navigable.
    pub fn find_by_id(store: &RecordsStore, id: Uuid) -> Option<Self> {
        store.read().companies.get(&id).cloned()
    }

    /// Lists active companies, most recently registered first
    pub fn list(store: &RecordsStore) -> Vec<Self> {
        let inner = store.read();
        let mut companies: Vec<Company> = inner
            .companies
            .values()
            .filter(|c| c.active)
            .cloned()
            .collect();
        companies.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        companies
    }

    /// Updates a company, merging the provided fields
    ///
    /// Returns the updated record, or `None` if the id does not resolve.
    pub fn update(store: &RecordsStore, id: Uuid, data: UpdateCompany) -> Option<Self> {
        let mut inner = store.write();
        let company = inner.companies.get_mut(&id)?;

        if let Some(name) = data.name {
            company.name = name;
        }
        if let Some(address) = data.address {
            company.address = address;
        }
        if let Some(phone) = data.phone {
            company.phone = phone;
        }
        if let Some(contact_email) = data.contact_email {
            company.contact_email = contact_email;
        }

        Some(company.clone())
    }

    /// Deactivates a company (soft delete)
    ///
    /// Returns the updated record, or `None` if the id does not resolve.
    pub fn deactivate(store: &RecordsStore, id: Uuid) -> Option<Self> {
        let mut inner = store.write();
        let company = inner.companies.get_mut(&id)?;
        company.active = false;
        Some(company.clone())
    }
}
