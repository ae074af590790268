//! Combines the API routes of all domain modules into a unified router.

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use std::sync::Arc;

use crate::shared::state::AppState;

pub fn configure_api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(crate::auth::configure_auth_routes())
        .merge(crate::employees::configure_employee_routes())
        .merge(crate::customers::configure_customer_routes())
        .merge(crate::visits::configure_visit_routes())
        .merge(crate::tasks::configure_task_routes())
        .merge(crate::leave::configure_leave_routes())
        .merge(crate::assets::configure_asset_routes())
        .merge(crate::maintenance::configure_maintenance_routes())
        .merge(crate::rnd::configure_rnd_routes())
        .merge(crate::activity::configure_activity_routes())
        .merge(crate::reports::configure_report_routes())
        .route("/api/health", get(handle_health))
}

async fn handle_health(
    State(_state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    Ok(Json(
        serde_json::json!({"status": "healthy", "timestamp": chrono::Utc::now().to_rfc3339()}),
    ))
}
