/// Company endpoints
///
/// # Endpoints
///
/// - `POST /v1/companies` - Register a company
/// - `GET /v1/companies` - List active companies
/// - `GET /v1/companies/:id` - Fetch one company
/// - `PUT /v1/companies/:id` - Update registration data
/// - `POST /v1/companies/:id/deactivate` - Soft-delete a company
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Json,
};
use crewdesk_shared::models::company::{Company, CreateCompany, UpdateCompany};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Register company request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCompanyRequest {
    /// Display name
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub name: String,

    /// Company registration code
    #[validate(length(min = 1, max = 40, message = "Registration code must be 1-40 characters"))]
    pub registration_code: String,

    /// Tax identifier
    #[validate(length(min = 1, max = 40, message = "Tax id must be 1-40 characters"))]
    pub tax_id: String,

    /// Postal address
    #[validate(length(max = 255, message = "Address must be at most 255 characters"))]
    pub address: String,

    /// Contact phone number
    #[validate(length(max = 40, message = "Phone must be at most 40 characters"))]
    pub phone: String,

    /// Contact email address
    #[validate(email(message = "Invalid email format"))]
    pub contact_email: String,
}

/// Update company request
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateCompanyRequest {
    /// New display name
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub name: Option<String>,

    /// New postal address
    #[validate(length(max = 255, message = "Address must be at most 255 characters"))]
    pub address: Option<String>,

    /// New contact phone number
    #[validate(length(max = 40, message = "Phone must be at most 40 characters"))]
    pub phone: Option<String>,

    /// New contact email address
    #[validate(email(message = "Invalid email format"))]
    pub contact_email: Option<String>,
}

/// Registers a new company
pub async fn create_company(
    State(state): State<AppState>,
    Json(req): Json<CreateCompanyRequest>,
) -> ApiResult<Json<Company>> {
    req.validate()?;

    let company = Company::create(
        &state.store,
        CreateCompany {
            name: req.name,
            registration_code: req.registration_code,
            tax_id: req.tax_id,
            address: req.address,
            phone: req.phone,
            contact_email: req.contact_email,
        },
    );

    tracing::info!(company_id = %company.id, name = %company.name, "Company registered");
    Ok(Json(company))
}

/// Lists active companies
pub async fn list_companies(State(state): State<AppState>) -> ApiResult<Json<Vec<Company>>> {
    Ok(Json(Company::list(&state.store)))
}

/// Fetches one company by id
pub async fn get_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Company>> {
    Company::find_by_id(&state.store, id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Company not found".to_string()))
}

/// Updates a company's registration data
pub async fn update_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCompanyRequest>,
) -> ApiResult<Json<Company>> {
    req.validate()?;

    Company::update(
        &state.store,
        id,
        UpdateCompany {
            name: req.name,
            address: req.address,
            phone: req.phone,
            contact_email: req.contact_email,
        },
    )
    .map(Json)
    .ok_or_else(|| ApiError::NotFound("Company not found".to_string()))
}

/// Deactivates a company (soft delete)
pub async fn deactivate_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Company>> {
    let company = Company::deactivate(&state.store, id)
        .ok_or_else(|| ApiError::NotFound("Company not found".to_string()))?;

    tracing::info!(company_id = %company.id, "Company deactivated");
    Ok(Json(company))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_company_request_validation() {
        let valid = CreateCompanyRequest {
            name: "Acme".to_string(),
            registration_code: "EMP001".to_string(),
            tax_id: "12.345.678/0001-00".to_string(),
            address: "1 Main St".to_string(),
            phone: "+1 555 0100".to_string(),
            contact_email: "hello@acme.example".to_string(),
        };
        assert!(valid.validate().is_ok());

        let empty_name = CreateCompanyRequest {
            name: "".to_string(),
            ..valid_base()
        };
        assert!(empty_name.validate().is_err());

        let bad_email = CreateCompanyRequest {
            contact_email: "not-an-email".to_string(),
            ..valid_base()
        };
        assert!(bad_email.validate().is_err());
    }

    fn valid_base() -> CreateCompanyRequest {
        CreateCompanyRequest {
            name: "Acme".to_string(),
            registration_code: "EMP001".to_string(),
            tax_id: "12.345.678/0001-00".to_string(),
            address: "1 Main St".to_string(),
            phone: "+1 555 0100".to_string(),
            contact_email: "hello@acme.example".to_string(),
        }
    }
}
