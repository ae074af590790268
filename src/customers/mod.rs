use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use log::warn;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::activity;
use crate::auth::AuthSession;
use crate::shared::schema::{companies, contact_persons, locations};
use crate::shared::state::AppState;

/// Company-level account classification.
pub const COMPANY_STATUSES: [&str; 3] = ["existing", "lead", "inactive"];

/// Location-level sales-tracking status, independent of the company status.
pub const CUSTOMER_STATUSES: [&str; 3] = ["active", "closed", "inactive"];

#[derive(Debug, Clone)]
pub enum CustomerError {
    InvalidCompanyStatus(String),
    InvalidCustomerStatus(String),
    NoteRequired(String),
    NotFound,
    DatabaseConnection,
    Database(String),
}

impl std::fmt::Display for CustomerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCompanyStatus(s) => write!(f, "Unknown company status: {s}"),
            Self::InvalidCustomerStatus(s) => write!(f, "Unknown customer status: {s}"),
            Self::NoteRequired(s) => {
                write!(f, "A status note is required when marking a location {s}")
            }
            Self::NotFound => write!(f, "Record not found"),
            Self::DatabaseConnection => write!(f, "Database connection failed"),
            Self::Database(e) => write!(f, "Database error: {e}"),
        }
    }
}

impl std::error::Error for CustomerError {}

impl From<diesel::result::Error> for CustomerError {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::NotFound => Self::NotFound,
            other => Self::Database(other.to_string()),
        }
    }
}

impl IntoResponse for CustomerError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            Self::InvalidCompanyStatus(_)
            | Self::InvalidCustomerStatus(_)
            | Self::NoteRequired(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

/// Terminal transitions need an explanation; reopening does not.
pub fn validate_status_change(new_status: &str, note: Option<&str>) -> Result<(), CustomerError> {
    if !CUSTOMER_STATUSES.contains(&new_status) {
        return Err(CustomerError::InvalidCustomerStatus(new_status.to_string()));
    }

    if new_status == "closed" || new_status == "inactive" {
        let has_note = note.map(|n| !n.trim().is_empty()).unwrap_or(false);
        if !has_note {
            return Err(CustomerError::NoteRequired(new_status.to_string()));
        }
    }

    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = companies)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub tax_id: Option<String>,
    pub logo_url: Option<String>,
    pub grade: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = locations)]
pub struct Location {
    pub id: Uuid,
    pub company_id: Uuid,
    pub code: String,
    pub name: String,
    pub address: String,
    pub district: String,
    pub province: String,
    pub postal_code: String,
    pub region: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub customer_type: Option<String>,
    pub customer_status: String,
    pub status_note: Option<String>,
    pub owner_name: Option<String>,
    pub owner_phone: Option<String>,
    pub credit_term: Option<i32>,
    pub vat_type: Option<String>,
    pub notes: Option<String>,
    pub assigned_to: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = contact_persons)]
pub struct ContactPerson {
    pub id: Uuid,
    pub location_id: Uuid,
    pub name: String,
    pub role: String,
    pub phone: String,
    pub line_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct LocationWithContacts {
    pub location: Location,
    pub contacts: Vec<ContactPerson>,
}

#[derive(Debug, Serialize)]
pub struct CompanyWithLocations {
    pub company: Company,
    pub locations: Vec<LocationWithContacts>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCompanyRequest {
    pub name: String,
    pub tax_id: Option<String>,
    pub logo_url: Option<String>,
    pub grade: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCompanyRequest {
    pub name: Option<String>,
    pub tax_id: Option<String>,
    pub grade: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateLocationRequest {
    pub code: String,
    pub name: String,
    pub address: String,
    pub district: String,
    pub province: String,
    pub postal_code: String,
    pub region: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub customer_type: Option<String>,
    pub owner_name: Option<String>,
    pub owner_phone: Option<String>,
    pub credit_term: Option<i32>,
    pub vat_type: Option<String>,
    pub notes: Option<String>,
    pub assigned_to: Option<Vec<Uuid>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateLocationRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub district: Option<String>,
    pub province: Option<String>,
    pub postal_code: Option<String>,
    pub region: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub customer_type: Option<String>,
    pub owner_name: Option<String>,
    pub owner_phone: Option<String>,
    pub credit_term: Option<i32>,
    pub vat_type: Option<String>,
    pub notes: Option<String>,
    pub assigned_to: Option<Vec<Uuid>>,
}

#[derive(Debug, Deserialize)]
pub struct ChangeLocationStatusRequest {
    pub status: String,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateContactRequest {
    pub name: String,
    pub role: String,
    pub phone: String,
    pub line_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn create_company(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Json(req): Json<CreateCompanyRequest>,
) -> Result<Json<Company>, CustomerError> {
    let status = req.status.unwrap_or_else(|| "lead".to_string());
    if !COMPANY_STATUSES.contains(&status.as_str()) {
        return Err(CustomerError::InvalidCompanyStatus(status));
    }

    let mut conn = state
        .conn
        .get()
        .map_err(|_| CustomerError::DatabaseConnection)?;

    let now = Utc::now();
    let company = Company {
        id: Uuid::new_v4(),
        name: req.name,
        tax_id: req.tax_id,
        logo_url: req.logo_url,
        grade: req.grade,
        status,
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(companies::table)
        .values(&company)
        .execute(&mut conn)?;

    if let Err(e) = activity::record(
        &mut conn,
        session.employee_id,
        &session.name,
        "customer_added",
        &format!("Added company {}", company.name),
        serde_json::json!({ "companyId": company.id }),
    ) {
        warn!("Failed to record customer_added activity: {e}");
    }

    Ok(Json(company))
}

pub async fn list_companies(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Company>>, CustomerError> {
    let mut conn = state
        .conn
        .get()
        .map_err(|_| CustomerError::DatabaseConnection)?;

    let limit = query.limit.unwrap_or(50);
    let offset = query.offset.unwrap_or(0);

    let mut q = companies::table.into_boxed();

    if let Some(status) = query.status {
        q = q.filter(companies::status.eq(status));
    }

    if let Some(search) = query.search {
        let pattern = format!("%{search}%");
        q = q.filter(companies::name.ilike(pattern));
    }

    let rows: Vec<Company> = q
        .order(companies::name.asc())
        .limit(limit)
        .offset(offset)
        .load(&mut conn)?;

    Ok(Json(rows))
}

pub async fn get_company(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<CompanyWithLocations>, CustomerError> {
    let mut conn = state
        .conn
        .get()
        .map_err(|_| CustomerError::DatabaseConnection)?;

    let company: Company = companies::table
        .filter(companies::id.eq(id))
        .first(&mut conn)?;

    let locs: Vec<Location> = locations::table
        .filter(locations::company_id.eq(id))
        .order(locations::name.asc())
        .load(&mut conn)
        .unwrap_or_default();

    let mut with_contacts = Vec::with_capacity(locs.len());
    for location in locs {
        let contacts: Vec<ContactPerson> = contact_persons::table
            .filter(contact_persons::location_id.eq(location.id))
            .order(contact_persons::name.asc())
            .load(&mut conn)
            .unwrap_or_default();
        with_contacts.push(LocationWithContacts { location, contacts });
    }

    Ok(Json(CompanyWithLocations {
        company,
        locations: with_contacts,
    }))
}

pub async fn update_company(
    State(state): State<Arc<AppState>>,
    _session: AuthSession,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCompanyRequest>,
) -> Result<Json<Company>, CustomerError> {
    if let Some(status) = req.status.as_deref() {
        if !COMPANY_STATUSES.contains(&status) {
            return Err(CustomerError::InvalidCompanyStatus(status.to_string()));
        }
    }

    let mut conn = state
        .conn
        .get()
        .map_err(|_| CustomerError::DatabaseConnection)?;

    let now = Utc::now();

    diesel::update(companies::table.filter(companies::id.eq(id)))
        .set(companies::updated_at.eq(now))
        .execute(&mut conn)?;

    if let Some(name) = req.name {
        diesel::update(companies::table.filter(companies::id.eq(id)))
            .set(companies::name.eq(name))
            .execute(&mut conn)?;
    }

    if let Some(tax_id) = req.tax_id {
        diesel::update(companies::table.filter(companies::id.eq(id)))
            .set(companies::tax_id.eq(Some(tax_id)))
            .execute(&mut conn)?;
    }

    if let Some(grade) = req.grade {
        diesel::update(companies::table.filter(companies::id.eq(id)))
            .set(companies::grade.eq(Some(grade)))
            .execute(&mut conn)?;
    }

    if let Some(status) = req.status {
        diesel::update(companies::table.filter(companies::id.eq(id)))
            .set(companies::status.eq(status))
            .execute(&mut conn)?;
    }

    let company: Company = companies::table
        .filter(companies::id.eq(id))
        .first(&mut conn)?;

    Ok(Json(company))
}

pub async fn delete_company(
    State(state): State<Arc<AppState>>,
    _session: AuthSession,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, CustomerError> {
    let mut conn = state
        .conn
        .get()
        .map_err(|_| CustomerError::DatabaseConnection)?;

    diesel::delete(companies::table.filter(companies::id.eq(id))).execute(&mut conn)?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_location(
    State(state): State<Arc<AppState>>,
    _session: AuthSession,
    Path(company_id): Path<Uuid>,
    Json(req): Json<CreateLocationRequest>,
) -> Result<Json<Location>, CustomerError> {
    let mut conn = state
        .conn
        .get()
        .map_err(|_| CustomerError::DatabaseConnection)?;

    companies::table
        .filter(companies::id.eq(company_id))
        .select(companies::id)
        .first::<Uuid>(&mut conn)?;

    let now = Utc::now();
    let location = Location {
        id: Uuid::new_v4(),
        company_id,
        code: req.code,
        name: req.name,
        address: req.address,
        district: req.district,
        province: req.province,
        postal_code: req.postal_code,
        region: req.region,
        lat: req.lat,
        lng: req.lng,
        customer_type: req.customer_type,
        customer_status: "active".to_string(),
        status_note: None,
        owner_name: req.owner_name,
        owner_phone: req.owner_phone,
        credit_term: req.credit_term,
        vat_type: req.vat_type,
        notes: req.notes,
        assigned_to: req.assigned_to.unwrap_or_default(),
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(locations::table)
        .values(&location)
        .execute(&mut conn)?;

    Ok(Json(location))
}

pub async fn get_location(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<LocationWithContacts>, CustomerError> {
    let mut conn = state
        .conn
        .get()
        .map_err(|_| CustomerError::DatabaseConnection)?;

    let location: Location = locations::table
        .filter(locations::id.eq(id))
        .first(&mut conn)?;

    let contacts: Vec<ContactPerson> = contact_persons::table
        .filter(contact_persons::location_id.eq(id))
        .order(contact_persons::name.asc())
        .load(&mut conn)
        .unwrap_or_default();

    Ok(Json(LocationWithContacts { location, contacts }))
}

pub async fn update_location(
    State(state): State<Arc<AppState>>,
    _session: AuthSession,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateLocationRequest>,
) -> Result<Json<Location>, CustomerError> {
    let mut conn = state
        .conn
        .get()
        .map_err(|_| CustomerError::DatabaseConnection)?;

    let now = Utc::now();

    diesel::update(locations::table.filter(locations::id.eq(id)))
        .set(locations::updated_at.eq(now))
        .execute(&mut conn)?;

    if let Some(name) = req.name {
        diesel::update(locations::table.filter(locations::id.eq(id)))
            .set(locations::name.eq(name))
            .execute(&mut conn)?;
    }

    if let Some(address) = req.address {
        diesel::update(locations::table.filter(locations::id.eq(id)))
            .set(locations::address.eq(address))
            .execute(&mut conn)?;
    }

    if let Some(district) = req.district {
        diesel::update(locations::table.filter(locations::id.eq(id)))
            .set(locations::district.eq(district))
            .execute(&mut conn)?;
    }

    if let Some(province) = req.province {
        diesel::update(locations::table.filter(locations::id.eq(id)))
            .set(locations::province.eq(province))
            .execute(&mut conn)?;
    }

    if let Some(postal_code) = req.postal_code {
        diesel::update(locations::table.filter(locations::id.eq(id)))
            .set(locations::postal_code.eq(postal_code))
            .execute(&mut conn)?;
    }

    if let Some(region) = req.region {
        diesel::update(locations::table.filter(locations::id.eq(id)))
            .set(locations::region.eq(Some(region)))
            .execute(&mut conn)?;
    }

    if let Some(lat) = req.lat {
        diesel::update(locations::table.filter(locations::id.eq(id)))
            .set(locations::lat.eq(Some(lat)))
            .execute(&mut conn)?;
    }

    if let Some(lng) = req.lng {
        diesel::update(locations::table.filter(locations::id.eq(id)))
            .set(locations::lng.eq(Some(lng)))
            .execute(&mut conn)?;
    }

    if let Some(customer_type) = req.customer_type {
        diesel::update(locations::table.filter(locations::id.eq(id)))
            .set(locations::customer_type.eq(Some(customer_type)))
            .execute(&mut conn)?;
    }

    if let Some(owner_name) = req.owner_name {
        diesel::update(locations::table.filter(locations::id.eq(id)))
            .set(locations::owner_name.eq(Some(owner_name)))
            .execute(&mut conn)?;
    }

    if let Some(owner_phone) = req.owner_phone {
        diesel::update(locations::table.filter(locations::id.eq(id)))
            .set(locations::owner_phone.eq(Some(owner_phone)))
            .execute(&mut conn)?;
    }

    if let Some(credit_term) = req.credit_term {
        diesel::update(locations::table.filter(locations::id.eq(id)))
            .set(locations::credit_term.eq(Some(credit_term)))
            .execute(&mut conn)?;
    }

    if let Some(vat_type) = req.vat_type {
        diesel::update(locations::table.filter(locations::id.eq(id)))
            .set(locations::vat_type.eq(Some(vat_type)))
            .execute(&mut conn)?;
    }

    if let Some(notes) = req.notes {
        diesel::update(locations::table.filter(locations::id.eq(id)))
            .set(locations::notes.eq(Some(notes)))
            .execute(&mut conn)?;
    }

    if let Some(assigned_to) = req.assigned_to {
        diesel::update(locations::table.filter(locations::id.eq(id)))
            .set(locations::assigned_to.eq(assigned_to))
            .execute(&mut conn)?;
    }

    let location: Location = locations::table
        .filter(locations::id.eq(id))
        .first(&mut conn)?;

    Ok(Json(location))
}

/// Status workflow for a location. Transitions into closed/inactive carry a
/// mandatory note, validated here on the server.
pub async fn change_location_status(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Path(id): Path<Uuid>,
    Json(req): Json<ChangeLocationStatusRequest>,
) -> Result<Json<Location>, CustomerError> {
    validate_status_change(&req.status, req.note.as_deref())?;

    let mut conn = state
        .conn
        .get()
        .map_err(|_| CustomerError::DatabaseConnection)?;

    let location: Location = locations::table
        .filter(locations::id.eq(id))
        .first(&mut conn)?;

    diesel::update(locations::table.filter(locations::id.eq(id)))
        .set((
            locations::customer_status.eq(&req.status),
            locations::status_note.eq(req.note.clone()),
            locations::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;

    if let Err(e) = activity::record(
        &mut conn,
        session.employee_id,
        &session.name,
        "customer_status_changed",
        &format!(
            "Changed status of {} from {} to {}",
            location.name, location.customer_status, req.status
        ),
        serde_json::json!({
            "locationId": id,
            "previousStatus": location.customer_status,
            "newStatus": req.status,
            "note": req.note,
        }),
    ) {
        warn!("Failed to record status change activity: {e}");
    }

    let updated: Location = locations::table
        .filter(locations::id.eq(id))
        .first(&mut conn)?;

    Ok(Json(updated))
}

pub async fn delete_location(
    State(state): State<Arc<AppState>>,
    _session: AuthSession,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, CustomerError> {
    let mut conn = state
        .conn
        .get()
        .map_err(|_| CustomerError::DatabaseConnection)?;

    diesel::delete(locations::table.filter(locations::id.eq(id))).execute(&mut conn)?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_contact(
    State(state): State<Arc<AppState>>,
    _session: AuthSession,
    Path(location_id): Path<Uuid>,
    Json(req): Json<CreateContactRequest>,
) -> Result<Json<ContactPerson>, CustomerError> {
    let mut conn = state
        .conn
        .get()
        .map_err(|_| CustomerError::DatabaseConnection)?;

    locations::table
        .filter(locations::id.eq(location_id))
        .select(locations::id)
        .first::<Uuid>(&mut conn)?;

    let contact = ContactPerson {
        id: Uuid::new_v4(),
        location_id,
        name: req.name,
        role: req.role,
        phone: req.phone,
        line_id: req.line_id,
        created_at: Utc::now(),
    };

    diesel::insert_into(contact_persons::table)
        .values(&contact)
        .execute(&mut conn)?;

    Ok(Json(contact))
}

pub async fn remove_contact(
    State(state): State<Arc<AppState>>,
    _session: AuthSession,
    Path((location_id, contact_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, CustomerError> {
    let mut conn = state
        .conn
        .get()
        .map_err(|_| CustomerError::DatabaseConnection)?;

    diesel::delete(
        contact_persons::table
            .filter(contact_persons::id.eq(contact_id))
            .filter(contact_persons::location_id.eq(location_id)),
    )
    .execute(&mut conn)?;

    Ok(StatusCode::NO_CONTENT)
}

pub fn configure_customer_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/companies", get(list_companies).post(create_company))
        .route(
            "/api/companies/:id",
            get(get_company).put(update_company).delete(delete_company),
        )
        .route("/api/companies/:id/locations", post(create_location))
        .route(
            "/api/locations/:id",
            get(get_location).put(update_location).delete(delete_location),
        )
        .route("/api/locations/:id/status", put(change_location_status))
        .route("/api/locations/:id/contacts", post(add_contact))
        .route(
            "/api/locations/:id/contacts/:contact_id",
            delete(remove_contact),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_requires_note() {
        assert!(matches!(
            validate_status_change("closed", None),
            Err(CustomerError::NoteRequired(_))
        ));
        assert!(matches!(
            validate_status_change("closed", Some("")),
            Err(CustomerError::NoteRequired(_))
        ));
        assert!(matches!(
            validate_status_change("closed", Some("   ")),
            Err(CustomerError::NoteRequired(_))
        ));
        assert!(validate_status_change("closed", Some("Owner retired")).is_ok());
    }

    #[test]
    fn test_inactive_requires_note() {
        assert!(matches!(
            validate_status_change("inactive", None),
            Err(CustomerError::NoteRequired(_))
        ));
        assert!(validate_status_change("inactive", Some("No orders this year")).is_ok());
    }

    #[test]
    fn test_reopen_needs_no_note() {
        assert!(validate_status_change("active", None).is_ok());
        assert!(validate_status_change("active", Some("back in business")).is_ok());
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert!(matches!(
            validate_status_change("terminated", Some("x")),
            Err(CustomerError::InvalidCustomerStatus(_))
        ));
    }
}
