use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::shared::schema::activity_logs;
use crate::shared::state::AppState;

/// Append-only audit trail. Rows are written as a side effect of other
/// mutations and never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = activity_logs)]
pub struct ActivityLog {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub employee_name: String,
    pub activity_type: String,
    pub description: String,
    pub metadata: serde_json::Value,
    pub recorded_at: DateTime<Utc>,
}

pub fn record(
    conn: &mut PgConnection,
    employee_id: Uuid,
    employee_name: &str,
    activity_type: &str,
    description: &str,
    metadata: serde_json::Value,
) -> QueryResult<()> {
    let entry = ActivityLog {
        id: Uuid::new_v4(),
        employee_id,
        employee_name: employee_name.to_string(),
        activity_type: activity_type.to_string(),
        description: description.to_string(),
        metadata,
        recorded_at: Utc::now(),
    };

    diesel::insert_into(activity_logs::table)
        .values(&entry)
        .execute(conn)?;

    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub employee_id: Option<Uuid>,
    pub activity_type: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn list_activity_logs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ActivityLog>>, (StatusCode, String)> {
    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let limit = query.limit.unwrap_or(100).min(500);
    let offset = query.offset.unwrap_or(0);

    let mut q = activity_logs::table.into_boxed();

    if let Some(employee_id) = query.employee_id {
        q = q.filter(activity_logs::employee_id.eq(employee_id));
    }

    if let Some(activity_type) = query.activity_type {
        q = q.filter(activity_logs::activity_type.eq(activity_type));
    }

    let entries: Vec<ActivityLog> = q
        .order(activity_logs::recorded_at.desc())
        .limit(limit)
        .offset(offset)
        .load(&mut conn)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query error: {e}")))?;

    Ok(Json(entries))
}

pub fn configure_activity_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/activity-logs", get(list_activity_logs))
}
