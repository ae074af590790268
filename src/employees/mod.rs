use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::{hash_password, AuthSession};
use crate::shared::schema::{employees, leave_requests};
use crate::shared::state::AppState;

pub const ROLES: [&str; 4] = ["sales", "manager", "maintenance", "rnd"];

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = employees)]
pub struct Employee {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub avatar_url: Option<String>,
    pub portfolio_size: i32,
    pub is_active: bool,
    pub created_at: chrono::DateTime<Utc>,
    pub updated_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateEmployeeRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub avatar_url: Option<String>,
    pub portfolio_size: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEmployeeRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub password: Option<String>,
    pub avatar_url: Option<String>,
    pub portfolio_size: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct EmployeeStats {
    pub total_employees: i64,
    pub active_employees: i64,
    pub sales_reps: i64,
    pub managers: i64,
    pub pending_leave_requests: i64,
}

pub fn valid_role(role: &str) -> bool {
    ROLES.contains(&role)
}

pub async fn create_employee(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Json(req): Json<CreateEmployeeRequest>,
) -> Result<Json<Employee>, (StatusCode, String)> {
    if !session.is_manager() {
        return Err((StatusCode::FORBIDDEN, "Manager role required".to_string()));
    }

    if !valid_role(&req.role) {
        return Err((StatusCode::BAD_REQUEST, format!("Invalid role: {}", req.role)));
    }

    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let password_hash = match req.password.as_deref() {
        Some(plain) => Some(hash_password(plain).map_err(|e| {
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Hash error: {e}"))
        })?),
        None => None,
    };

    let now = Utc::now();
    let employee = Employee {
        id: Uuid::new_v4(),
        name: req.name,
        email: req.email,
        phone: req.phone,
        role: req.role,
        username: req.username,
        password_hash,
        avatar_url: req.avatar_url,
        portfolio_size: req.portfolio_size.unwrap_or(0),
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(employees::table)
        .values(&employee)
        .execute(&mut conn)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Insert error: {e}")))?;

    Ok(Json(employee))
}

pub async fn list_employees(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Employee>>, (StatusCode, String)> {
    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let limit = query.limit.unwrap_or(50);
    let offset = query.offset.unwrap_or(0);

    let mut q = employees::table.into_boxed();

    if let Some(is_active) = query.is_active {
        q = q.filter(employees::is_active.eq(is_active));
    }

    if let Some(role) = query.role {
        q = q.filter(employees::role.eq(role));
    }

    if let Some(search) = query.search {
        let pattern = format!("%{search}%");
        q = q.filter(
            employees::name
                .ilike(pattern.clone())
                .or(employees::email.ilike(pattern.clone()))
                .or(employees::username.ilike(pattern)),
        );
    }

    let rows: Vec<Employee> = q
        .order(employees::name.asc())
        .limit(limit)
        .offset(offset)
        .load(&mut conn)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query error: {e}")))?;

    Ok(Json(rows))
}

pub async fn get_employee(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Employee>, (StatusCode, String)> {
    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let employee: Employee = employees::table
        .filter(employees::id.eq(id))
        .first(&mut conn)
        .map_err(|_| (StatusCode::NOT_FOUND, "Employee not found".to_string()))?;

    Ok(Json(employee))
}

pub async fn update_employee(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateEmployeeRequest>,
) -> Result<Json<Employee>, (StatusCode, String)> {
    // Employees may edit their own profile; everything else is manager-only.
    if !session.is_manager() && session.employee_id != id {
        return Err((StatusCode::FORBIDDEN, "Manager role required".to_string()));
    }

    if let Some(role) = &req.role {
        if !valid_role(role) {
            return Err((StatusCode::BAD_REQUEST, format!("Invalid role: {role}")));
        }
    }

    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let now = Utc::now();

    diesel::update(employees::table.filter(employees::id.eq(id)))
        .set(employees::updated_at.eq(now))
        .execute(&mut conn)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;

    if let Some(name) = req.name {
        diesel::update(employees::table.filter(employees::id.eq(id)))
            .set(employees::name.eq(name))
            .execute(&mut conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;
    }

    if let Some(email) = req.email {
        diesel::update(employees::table.filter(employees::id.eq(id)))
            .set(employees::email.eq(email))
            .execute(&mut conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;
    }

    if let Some(phone) = req.phone {
        diesel::update(employees::table.filter(employees::id.eq(id)))
            .set(employees::phone.eq(phone))
            .execute(&mut conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;
    }

    if let Some(role) = req.role {
        if !session.is_manager() {
            return Err((StatusCode::FORBIDDEN, "Manager role required".to_string()));
        }
        diesel::update(employees::table.filter(employees::id.eq(id)))
            .set(employees::role.eq(role))
            .execute(&mut conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;
    }

    if let Some(plain) = req.password {
        let hash = hash_password(&plain)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Hash error: {e}")))?;
        diesel::update(employees::table.filter(employees::id.eq(id)))
            .set(employees::password_hash.eq(Some(hash)))
            .execute(&mut conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;
    }

    if let Some(avatar_url) = req.avatar_url {
        diesel::update(employees::table.filter(employees::id.eq(id)))
            .set(employees::avatar_url.eq(Some(avatar_url)))
            .execute(&mut conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;
    }

    if let Some(portfolio_size) = req.portfolio_size {
        diesel::update(employees::table.filter(employees::id.eq(id)))
            .set(employees::portfolio_size.eq(portfolio_size))
            .execute(&mut conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;
    }

    if let Some(is_active) = req.is_active {
        if !session.is_manager() {
            return Err((StatusCode::FORBIDDEN, "Manager role required".to_string()));
        }
        diesel::update(employees::table.filter(employees::id.eq(id)))
            .set(employees::is_active.eq(is_active))
            .execute(&mut conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;
    }

    let employee: Employee = employees::table
        .filter(employees::id.eq(id))
        .first(&mut conn)
        .map_err(|_| (StatusCode::NOT_FOUND, "Employee not found".to_string()))?;

    Ok(Json(employee))
}

/// Employees are never hard-deleted; delete deactivates the record.
pub async fn delete_employee(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    if !session.is_manager() {
        return Err((StatusCode::FORBIDDEN, "Manager role required".to_string()));
    }

    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    diesel::update(employees::table.filter(employees::id.eq(id)))
        .set((
            employees::is_active.eq(false),
            employees::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_employee_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<EmployeeStats>, (StatusCode, String)> {
    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let total_employees: i64 = employees::table
        .count()
        .get_result(&mut conn)
        .unwrap_or(0);

    let active_employees: i64 = employees::table
        .filter(employees::is_active.eq(true))
        .count()
        .get_result(&mut conn)
        .unwrap_or(0);

    let sales_reps: i64 = employees::table
        .filter(employees::role.eq("sales"))
        .filter(employees::is_active.eq(true))
        .count()
        .get_result(&mut conn)
        .unwrap_or(0);

    let managers: i64 = employees::table
        .filter(employees::role.eq("manager"))
        .filter(employees::is_active.eq(true))
        .count()
        .get_result(&mut conn)
        .unwrap_or(0);

    let pending_leave_requests: i64 = leave_requests::table
        .filter(leave_requests::status.eq("pending"))
        .count()
        .get_result(&mut conn)
        .unwrap_or(0);

    Ok(Json(EmployeeStats {
        total_employees,
        active_employees,
        sales_reps,
        managers,
        pending_leave_requests,
    }))
}

pub fn configure_employee_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/employees", get(list_employees).post(create_employee))
        .route("/api/employees/stats", get(get_employee_stats))
        .route(
            "/api/employees/:id",
            get(get_employee).put(update_employee).delete(delete_employee),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_role() {
        assert!(valid_role("sales"));
        assert!(valid_role("manager"));
        assert!(valid_role("maintenance"));
        assert!(valid_role("rnd"));
        assert!(!valid_role("admin"));
        assert!(!valid_role(""));
    }
}
