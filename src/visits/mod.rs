use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
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
use crate::shared::schema::{locations, visits};
use crate::shared::state::AppState;

pub const VISIT_OBJECTIVES: [&str; 8] = [
    "sales",
    "delivery",
    "collect_payment",
    "survey",
    "support",
    "promotion",
    "relationship",
    "other",
];

pub fn valid_objective(objective: &str) -> bool {
    VISIT_OBJECTIVES.contains(&objective)
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = visits)]
pub struct Visit {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub location_id: Uuid,
    pub check_in_time: DateTime<Utc>,
    pub check_out_time: Option<DateTime<Utc>>,
    pub objectives: Vec<String>,
    pub notes: Option<String>,
    pub images: Vec<String>,
    pub met_owner: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CheckInRequest {
    pub location_id: Uuid,
    pub objectives: Vec<String>,
    pub notes: Option<String>,
    pub images: Option<Vec<String>>,
    pub met_owner: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CheckOutRequest {
    pub check_out_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub employee_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn check_in(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Json(req): Json<CheckInRequest>,
) -> Result<Json<Visit>, (StatusCode, String)> {
    for objective in &req.objectives {
        if !valid_objective(objective) {
            return Err((
                StatusCode::BAD_REQUEST,
                format!("Unknown visit objective: {objective}"),
            ));
        }
    }

    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let location_name: String = locations::table
        .filter(locations::id.eq(req.location_id))
        .select(locations::name)
        .first(&mut conn)
        .map_err(|_| (StatusCode::NOT_FOUND, "Location not found".to_string()))?;

    let now = Utc::now();
    let visit = Visit {
        id: Uuid::new_v4(),
        employee_id: session.employee_id,
        location_id: req.location_id,
        check_in_time: now,
        check_out_time: None,
        objectives: req.objectives,
        notes: req.notes,
        images: req.images.unwrap_or_default(),
        met_owner: req.met_owner.unwrap_or(false),
        created_at: now,
    };

    diesel::insert_into(visits::table)
        .values(&visit)
        .execute(&mut conn)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Insert error: {e}")))?;

    if let Err(e) = activity::record(
        &mut conn,
        session.employee_id,
        &session.name,
        "visit",
        &format!("Checked in at {location_name}"),
        serde_json::json!({
            "visitId": visit.id,
            "locationId": visit.location_id,
            "objectives": visit.objectives,
        }),
    ) {
        warn!("Failed to record visit activity: {e}");
    }

    Ok(Json(visit))
}

/// Records the check-out time once. A visit that already has one is
/// immutable.
pub async fn check_out(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Path(id): Path<Uuid>,
    Json(req): Json<CheckOutRequest>,
) -> Result<Json<Visit>, (StatusCode, String)> {
    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let visit: Visit = visits::table
        .filter(visits::id.eq(id))
        .first(&mut conn)
        .map_err(|_| (StatusCode::NOT_FOUND, "Visit not found".to_string()))?;

    if visit.employee_id != session.employee_id && !session.is_manager() {
        return Err((
            StatusCode::FORBIDDEN,
            "Visit belongs to another employee".to_string(),
        ));
    }

    if visit.check_out_time.is_some() {
        return Err((
            StatusCode::CONFLICT,
            "Visit is already checked out".to_string(),
        ));
    }

    let check_out_time = req.check_out_time.unwrap_or_else(Utc::now);
    if check_out_time < visit.check_in_time {
        return Err((
            StatusCode::BAD_REQUEST,
            "Check-out time cannot precede check-in time".to_string(),
        ));
    }

    diesel::update(visits::table.filter(visits::id.eq(id)))
        .set(visits::check_out_time.eq(Some(check_out_time)))
        .execute(&mut conn)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;

    let updated: Visit = visits::table
        .filter(visits::id.eq(id))
        .first(&mut conn)
        .map_err(|_| (StatusCode::NOT_FOUND, "Visit not found".to_string()))?;

    Ok(Json(updated))
}

pub async fn list_visits(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Visit>>, (StatusCode, String)> {
    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let limit = query.limit.unwrap_or(100);
    let offset = query.offset.unwrap_or(0);

    let mut q = visits::table.into_boxed();

    if let Some(employee_id) = query.employee_id {
        q = q.filter(visits::employee_id.eq(employee_id));
    }

    if let Some(location_id) = query.location_id {
        q = q.filter(visits::location_id.eq(location_id));
    }

    if let Some(from) = query.from {
        q = q.filter(visits::check_in_time.ge(from));
    }

    if let Some(to) = query.to {
        q = q.filter(visits::check_in_time.lt(to));
    }

    let rows: Vec<Visit> = q
        .order(visits::check_in_time.desc())
        .limit(limit)
        .offset(offset)
        .load(&mut conn)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query error: {e}")))?;

    Ok(Json(rows))
}

pub async fn get_visit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Visit>, (StatusCode, String)> {
    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let visit: Visit = visits::table
        .filter(visits::id.eq(id))
        .first(&mut conn)
        .map_err(|_| (StatusCode::NOT_FOUND, "Visit not found".to_string()))?;

    Ok(Json(visit))
}

pub fn configure_visit_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/visits", get(list_visits).post(check_in))
        .route("/api/visits/:id", get(get_visit))
        .route("/api/visits/:id/checkout", put(check_out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_objective() {
        for objective in VISIT_OBJECTIVES {
            assert!(valid_objective(objective));
        }
        assert!(!valid_objective("golf"));
        assert!(!valid_objective(""));
    }
}
