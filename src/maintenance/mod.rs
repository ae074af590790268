use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::activity;
use crate::auth::AuthSession;
use crate::shared::schema::{maintenance_tasks, spare_parts, task_part_usage};
use crate::shared::state::AppState;
use crate::shared::utils::DbPool;

pub const MAINTENANCE_PRIORITIES: [&str; 4] = ["low", "medium", "high", "urgent"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceStatus {
    Pending,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

impl MaintenanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Assigned => "assigned",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "assigned" => Some(Self::Assigned),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Completed and cancelled tasks freeze their parts usage.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Pending and assigned form the initial group a task can be started from.
    pub fn can_start(&self) -> bool {
        matches!(self, Self::Pending | Self::Assigned)
    }
}

impl std::fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub enum MaintenanceError {
    InvalidStatus(String),
    InvalidPriority(String),
    IllegalTransition {
        from: MaintenanceStatus,
        to: MaintenanceStatus,
    },
    PartsFrozen(MaintenanceStatus),
    InsufficientStock {
        requested: i32,
        available: i32,
    },
    InvalidQuantity(i32),
    UsageMismatch,
    NotFound,
    PartNotFound,
    UsageNotFound,
    DatabaseConnection,
    Database(String),
}

impl std::fmt::Display for MaintenanceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidStatus(s) => write!(f, "Unknown maintenance status: {s}"),
            Self::InvalidPriority(p) => write!(f, "Unknown maintenance priority: {p}"),
            Self::IllegalTransition { from, to } => {
                write!(f, "Illegal status transition: {from} -> {to}")
            }
            Self::PartsFrozen(status) => {
                write!(f, "Parts usage is frozen on a {status} task")
            }
            Self::InsufficientStock { requested, available } => write!(
                f,
                "Insufficient stock: requested {requested}, {available} available"
            ),
            Self::InvalidQuantity(q) => write!(f, "Quantity must be positive, got {q}"),
            Self::UsageMismatch => write!(f, "Usage record belongs to another task"),
            Self::NotFound => write!(f, "Maintenance task not found"),
            Self::PartNotFound => write!(f, "Spare part not found"),
            Self::UsageNotFound => write!(f, "Usage record not found"),
            Self::DatabaseConnection => write!(f, "Database connection failed"),
            Self::Database(e) => write!(f, "Database error: {e}"),
        }
    }
}

impl std::error::Error for MaintenanceError {}

impl From<diesel::result::Error> for MaintenanceError {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::NotFound => Self::NotFound,
            other => Self::Database(other.to_string()),
        }
    }
}

impl IntoResponse for MaintenanceError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            Self::InvalidStatus(_) | Self::InvalidPriority(_) | Self::InvalidQuantity(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::IllegalTransition { .. }
            | Self::PartsFrozen(_)
            | Self::InsufficientStock { .. }
            | Self::UsageMismatch => StatusCode::CONFLICT,
            Self::NotFound | Self::PartNotFound | Self::UsageNotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = maintenance_tasks)]
pub struct MaintenanceTask {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: String,
    pub status: String,
    pub assigned_to: Option<Uuid>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub started_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
    pub estimated_hours: Option<f64>,
    pub actual_hours: Option<f64>,
    pub notes: Option<String>,
    pub total_cost: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Join row capturing a spare part consumed by a task. The price is
/// snapshotted at the time of use so later price changes do not rewrite
/// historical cost.
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = task_part_usage)]
pub struct PartUsage {
    pub id: Uuid,
    pub task_id: Uuid,
    pub part_id: Uuid,
    pub quantity: i32,
    pub price_at_time: f64,
    pub created_at: DateTime<Utc>,
}

/// Sum of quantity x snapshotted price over the current usage rows.
pub fn total_cost(usage: &[PartUsage]) -> f64 {
    usage
        .iter()
        .map(|u| u.quantity as f64 * u.price_at_time)
        .sum()
}

pub fn check_stock(available: i32, requested: i32) -> Result<(), MaintenanceError> {
    if requested <= 0 {
        return Err(MaintenanceError::InvalidQuantity(requested));
    }
    if requested > available {
        return Err(MaintenanceError::InsufficientStock {
            requested,
            available,
        });
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct PartUsageDetail {
    pub usage: PartUsage,
    pub part_name: String,
    pub part_number: String,
}

#[derive(Debug, Serialize)]
pub struct MaintenanceTaskDetail {
    pub task: MaintenanceTask,
    pub parts_usage: Vec<PartUsageDetail>,
    pub total_cost: f64,
}

pub struct MaintenanceService {
    pool: DbPool,
}

impl MaintenanceService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn recompute_total(conn: &mut PgConnection, task_id: Uuid) -> QueryResult<f64> {
        let usage: Vec<PartUsage> = task_part_usage::table
            .filter(task_part_usage::task_id.eq(task_id))
            .load(conn)?;

        let total = total_cost(&usage);

        diesel::update(maintenance_tasks::table.filter(maintenance_tasks::id.eq(task_id)))
            .set((
                maintenance_tasks::total_cost.eq(total),
                maintenance_tasks::updated_at.eq(Utc::now()),
            ))
            .execute(conn)?;

        Ok(total)
    }

    pub fn assign(
        &self,
        task_id: Uuid,
        employee_id: Uuid,
    ) -> Result<MaintenanceTask, MaintenanceError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|_| MaintenanceError::DatabaseConnection)?;

        conn.transaction::<_, MaintenanceError, _>(|conn| {
            let task: MaintenanceTask = maintenance_tasks::table
                .filter(maintenance_tasks::id.eq(task_id))
                .for_update()
                .first(conn)?;

            let status = MaintenanceStatus::parse(&task.status)
                .ok_or_else(|| MaintenanceError::InvalidStatus(task.status.clone()))?;

            if !status.can_start() {
                return Err(MaintenanceError::IllegalTransition {
                    from: status,
                    to: MaintenanceStatus::Assigned,
                });
            }

            diesel::update(maintenance_tasks::table.filter(maintenance_tasks::id.eq(task_id)))
                .set((
                    maintenance_tasks::status.eq(MaintenanceStatus::Assigned.as_str()),
                    maintenance_tasks::assigned_to.eq(Some(employee_id)),
                    maintenance_tasks::updated_at.eq(Utc::now()),
                ))
                .execute(conn)?;

            let updated: MaintenanceTask = maintenance_tasks::table
                .filter(maintenance_tasks::id.eq(task_id))
                .first(conn)?;

            Ok(updated)
        })
    }

    pub fn start(&self, task_id: Uuid) -> Result<MaintenanceTask, MaintenanceError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|_| MaintenanceError::DatabaseConnection)?;

        conn.transaction::<_, MaintenanceError, _>(|conn| {
            let task: MaintenanceTask = maintenance_tasks::table
                .filter(maintenance_tasks::id.eq(task_id))
                .for_update()
                .first(conn)?;

            let status = MaintenanceStatus::parse(&task.status)
                .ok_or_else(|| MaintenanceError::InvalidStatus(task.status.clone()))?;

            if !status.can_start() {
                return Err(MaintenanceError::IllegalTransition {
                    from: status,
                    to: MaintenanceStatus::InProgress,
                });
            }

            let now = Utc::now();
            diesel::update(maintenance_tasks::table.filter(maintenance_tasks::id.eq(task_id)))
                .set((
                    maintenance_tasks::status.eq(MaintenanceStatus::InProgress.as_str()),
                    maintenance_tasks::started_date.eq(Some(now)),
                    maintenance_tasks::updated_at.eq(now),
                ))
                .execute(conn)?;

            let updated: MaintenanceTask = maintenance_tasks::table
                .filter(maintenance_tasks::id.eq(task_id))
                .first(conn)?;

            Ok(updated)
        })
    }

    pub fn complete(
        &self,
        task_id: Uuid,
        actual_hours: Option<f64>,
        notes: Option<String>,
    ) -> Result<MaintenanceTask, MaintenanceError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|_| MaintenanceError::DatabaseConnection)?;

        conn.transaction::<_, MaintenanceError, _>(|conn| {
            let task: MaintenanceTask = maintenance_tasks::table
                .filter(maintenance_tasks::id.eq(task_id))
                .for_update()
                .first(conn)?;

            let status = MaintenanceStatus::parse(&task.status)
                .ok_or_else(|| MaintenanceError::InvalidStatus(task.status.clone()))?;

            if status != MaintenanceStatus::InProgress {
                return Err(MaintenanceError::IllegalTransition {
                    from: status,
                    to: MaintenanceStatus::Completed,
                });
            }

            let now = Utc::now();
            diesel::update(maintenance_tasks::table.filter(maintenance_tasks::id.eq(task_id)))
                .set((
                    maintenance_tasks::status.eq(MaintenanceStatus::Completed.as_str()),
                    maintenance_tasks::completed_date.eq(Some(now)),
                    maintenance_tasks::actual_hours.eq(actual_hours),
                    maintenance_tasks::notes.eq(notes),
                    maintenance_tasks::updated_at.eq(now),
                ))
                .execute(conn)?;

            Self::recompute_total(conn, task_id)?;

            let updated: MaintenanceTask = maintenance_tasks::table
                .filter(maintenance_tasks::id.eq(task_id))
                .first(conn)?;

            Ok(updated)
        })
    }

    pub fn cancel(&self, task_id: Uuid) -> Result<MaintenanceTask, MaintenanceError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|_| MaintenanceError::DatabaseConnection)?;

        conn.transaction::<_, MaintenanceError, _>(|conn| {
            let task: MaintenanceTask = maintenance_tasks::table
                .filter(maintenance_tasks::id.eq(task_id))
                .for_update()
                .first(conn)?;

            let status = MaintenanceStatus::parse(&task.status)
                .ok_or_else(|| MaintenanceError::InvalidStatus(task.status.clone()))?;

            if status.is_terminal() {
                return Err(MaintenanceError::IllegalTransition {
                    from: status,
                    to: MaintenanceStatus::Cancelled,
                });
            }

            diesel::update(maintenance_tasks::table.filter(maintenance_tasks::id.eq(task_id)))
                .set((
                    maintenance_tasks::status.eq(MaintenanceStatus::Cancelled.as_str()),
                    maintenance_tasks::updated_at.eq(Utc::now()),
                ))
                .execute(conn)?;

            let updated: MaintenanceTask = maintenance_tasks::table
                .filter(maintenance_tasks::id.eq(task_id))
                .first(conn)?;

            Ok(updated)
        })
    }

    /// Consumes stock for a task: snapshots the current part price, decrements
    /// stock and recomputes the task total, all under row locks so two
    /// concurrent additions cannot both pass the stock check.
    pub fn add_part(
        &self,
        task_id: Uuid,
        part_id: Uuid,
        quantity: i32,
    ) -> Result<PartUsage, MaintenanceError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|_| MaintenanceError::DatabaseConnection)?;

        conn.transaction::<_, MaintenanceError, _>(|conn| {
            let task: MaintenanceTask = maintenance_tasks::table
                .filter(maintenance_tasks::id.eq(task_id))
                .for_update()
                .first(conn)?;

            let status = MaintenanceStatus::parse(&task.status)
                .ok_or_else(|| MaintenanceError::InvalidStatus(task.status.clone()))?;

            if status.is_terminal() {
                return Err(MaintenanceError::PartsFrozen(status));
            }

            let part: (i32, f64) = spare_parts::table
                .filter(spare_parts::id.eq(part_id))
                .select((spare_parts::stock, spare_parts::price))
                .for_update()
                .first(conn)
                .map_err(|e| match e {
                    diesel::result::Error::NotFound => MaintenanceError::PartNotFound,
                    other => MaintenanceError::Database(other.to_string()),
                })?;

            let (stock, price) = part;
            check_stock(stock, quantity)?;

            let usage = PartUsage {
                id: Uuid::new_v4(),
                task_id,
                part_id,
                quantity,
                price_at_time: price,
                created_at: Utc::now(),
            };

            diesel::insert_into(task_part_usage::table)
                .values(&usage)
                .execute(conn)?;

            diesel::update(spare_parts::table.filter(spare_parts::id.eq(part_id)))
                .set((
                    spare_parts::stock.eq(stock - quantity),
                    spare_parts::updated_at.eq(Utc::now()),
                ))
                .execute(conn)?;

            Self::recompute_total(conn, task_id)?;

            Ok(usage)
        })
    }

    /// Removes a usage row, refunding the consumed quantity back to stock.
    pub fn remove_part(&self, task_id: Uuid, usage_id: Uuid) -> Result<(), MaintenanceError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|_| MaintenanceError::DatabaseConnection)?;

        conn.transaction::<_, MaintenanceError, _>(|conn| {
            let task: MaintenanceTask = maintenance_tasks::table
                .filter(maintenance_tasks::id.eq(task_id))
                .for_update()
                .first(conn)?;

            let status = MaintenanceStatus::parse(&task.status)
                .ok_or_else(|| MaintenanceError::InvalidStatus(task.status.clone()))?;

            if status.is_terminal() {
                return Err(MaintenanceError::PartsFrozen(status));
            }

            let usage: PartUsage = task_part_usage::table
                .filter(task_part_usage::id.eq(usage_id))
                .for_update()
                .first(conn)
                .map_err(|e| match e {
                    diesel::result::Error::NotFound => MaintenanceError::UsageNotFound,
                    other => MaintenanceError::Database(other.to_string()),
                })?;

            if usage.task_id != task_id {
                return Err(MaintenanceError::UsageMismatch);
            }

            let stock: i32 = spare_parts::table
                .filter(spare_parts::id.eq(usage.part_id))
                .select(spare_parts::stock)
                .for_update()
                .first(conn)
                .map_err(|e| match e {
                    diesel::result::Error::NotFound => MaintenanceError::PartNotFound,
                    other => MaintenanceError::Database(other.to_string()),
                })?;

            diesel::update(spare_parts::table.filter(spare_parts::id.eq(usage.part_id)))
                .set((
                    spare_parts::stock.eq(stock + usage.quantity),
                    spare_parts::updated_at.eq(Utc::now()),
                ))
                .execute(conn)?;

            diesel::delete(task_part_usage::table.filter(task_part_usage::id.eq(usage_id)))
                .execute(conn)?;

            Self::recompute_total(conn, task_id)?;

            Ok(())
        })
    }

    pub fn detail(&self, task_id: Uuid) -> Result<MaintenanceTaskDetail, MaintenanceError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|_| MaintenanceError::DatabaseConnection)?;

        let task: MaintenanceTask = maintenance_tasks::table
            .filter(maintenance_tasks::id.eq(task_id))
            .first(&mut conn)?;

        let usage: Vec<PartUsage> = task_part_usage::table
            .filter(task_part_usage::task_id.eq(task_id))
            .order(task_part_usage::created_at.asc())
            .load(&mut conn)?;

        let total = total_cost(&usage);

        let mut parts_usage = Vec::with_capacity(usage.len());
        for u in usage {
            let (part_name, part_number): (String, String) = spare_parts::table
                .filter(spare_parts::id.eq(u.part_id))
                .select((spare_parts::name, spare_parts::part_number))
                .first(&mut conn)
                .unwrap_or_else(|_| ("unknown".to_string(), String::new()));
            parts_usage.push(PartUsageDetail {
                usage: u,
                part_name,
                part_number,
            });
        }

        Ok(MaintenanceTaskDetail {
            task,
            parts_usage,
            total_cost: total,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateMaintenanceTaskRequest {
    pub asset_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub assigned_to: Option<Uuid>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub estimated_hours: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub employee_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct CompleteRequest {
    pub actual_hours: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddPartRequest {
    pub part_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assigned_to: Option<Uuid>,
    pub asset_id: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn create_maintenance_task(
    State(state): State<Arc<AppState>>,
    _session: AuthSession,
    Json(req): Json<CreateMaintenanceTaskRequest>,
) -> Result<Json<MaintenanceTask>, MaintenanceError> {
    let priority = req.priority.unwrap_or_else(|| "medium".to_string());
    if !MAINTENANCE_PRIORITIES.contains(&priority.as_str()) {
        return Err(MaintenanceError::InvalidPriority(priority));
    }

    let mut conn = state
        .conn
        .get()
        .map_err(|_| MaintenanceError::DatabaseConnection)?;

    let status = if req.assigned_to.is_some() {
        MaintenanceStatus::Assigned
    } else {
        MaintenanceStatus::Pending
    };

    let now = Utc::now();
    let task = MaintenanceTask {
        id: Uuid::new_v4(),
        asset_id: req.asset_id,
        title: req.title,
        description: req.description,
        priority,
        status: status.as_str().to_string(),
        assigned_to: req.assigned_to,
        scheduled_date: req.scheduled_date,
        started_date: None,
        completed_date: None,
        estimated_hours: req.estimated_hours,
        actual_hours: None,
        notes: None,
        total_cost: 0.0,
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(maintenance_tasks::table)
        .values(&task)
        .execute(&mut conn)?;

    info!("Created maintenance task {} for asset {}", task.id, task.asset_id);

    Ok(Json(task))
}

pub async fn list_maintenance_tasks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<MaintenanceTask>>, MaintenanceError> {
    let mut conn = state
        .conn
        .get()
        .map_err(|_| MaintenanceError::DatabaseConnection)?;

    let limit = query.limit.unwrap_or(100);
    let offset = query.offset.unwrap_or(0);

    let mut q = maintenance_tasks::table.into_boxed();

    if let Some(status) = query.status {
        q = q.filter(maintenance_tasks::status.eq(status));
    }

    if let Some(priority) = query.priority {
        q = q.filter(maintenance_tasks::priority.eq(priority));
    }

    if let Some(assigned_to) = query.assigned_to {
        q = q.filter(maintenance_tasks::assigned_to.eq(assigned_to));
    }

    if let Some(asset_id) = query.asset_id {
        q = q.filter(maintenance_tasks::asset_id.eq(asset_id));
    }

    let rows: Vec<MaintenanceTask> = q
        .order(maintenance_tasks::created_at.desc())
        .limit(limit)
        .offset(offset)
        .load(&mut conn)?;

    Ok(Json(rows))
}

pub async fn get_maintenance_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<MaintenanceTaskDetail>, MaintenanceError> {
    let service = MaintenanceService::new(state.conn.clone());
    let detail = service.detail(id)?;
    Ok(Json(detail))
}

pub async fn assign_maintenance_task(
    State(state): State<Arc<AppState>>,
    _session: AuthSession,
    Path(id): Path<Uuid>,
    Json(req): Json<AssignRequest>,
) -> Result<Json<MaintenanceTask>, MaintenanceError> {
    let service = MaintenanceService::new(state.conn.clone());
    let task = service.assign(id, req.employee_id)?;
    Ok(Json(task))
}

pub async fn start_maintenance_task(
    State(state): State<Arc<AppState>>,
    _session: AuthSession,
    Path(id): Path<Uuid>,
) -> Result<Json<MaintenanceTask>, MaintenanceError> {
    let service = MaintenanceService::new(state.conn.clone());
    let task = service.start(id)?;
    Ok(Json(task))
}

pub async fn complete_maintenance_task(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Path(id): Path<Uuid>,
    Json(req): Json<CompleteRequest>,
) -> Result<Json<MaintenanceTask>, MaintenanceError> {
    let service = MaintenanceService::new(state.conn.clone());
    let task = service.complete(id, req.actual_hours, req.notes)?;

    if let Ok(mut conn) = state.conn.get() {
        if let Err(e) = activity::record(
            &mut conn,
            session.employee_id,
            &session.name,
            "maintenance_completed",
            &format!("Completed maintenance task: {}", task.title),
            serde_json::json!({
                "taskId": task.id,
                "assetId": task.asset_id,
                "actualHours": task.actual_hours,
                "totalCost": task.total_cost,
            }),
        ) {
            warn!("Failed to record maintenance_completed activity: {e}");
        }
    }

    Ok(Json(task))
}

pub async fn cancel_maintenance_task(
    State(state): State<Arc<AppState>>,
    _session: AuthSession,
    Path(id): Path<Uuid>,
) -> Result<Json<MaintenanceTask>, MaintenanceError> {
    let service = MaintenanceService::new(state.conn.clone());
    let task = service.cancel(id)?;
    Ok(Json(task))
}

pub async fn add_part_to_task(
    State(state): State<Arc<AppState>>,
    _session: AuthSession,
    Path(id): Path<Uuid>,
    Json(req): Json<AddPartRequest>,
) -> Result<Json<PartUsage>, MaintenanceError> {
    let service = MaintenanceService::new(state.conn.clone());
    let usage = service.add_part(id, req.part_id, req.quantity)?;
    Ok(Json(usage))
}

pub async fn remove_part_from_task(
    State(state): State<Arc<AppState>>,
    _session: AuthSession,
    Path((id, usage_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, MaintenanceError> {
    let service = MaintenanceService::new(state.conn.clone());
    service.remove_part(id, usage_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn configure_maintenance_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/maintenance-tasks",
            get(list_maintenance_tasks).post(create_maintenance_task),
        )
        .route("/api/maintenance-tasks/:id", get(get_maintenance_task))
        .route("/api/maintenance-tasks/:id/assign", put(assign_maintenance_task))
        .route("/api/maintenance-tasks/:id/start", post(start_maintenance_task))
        .route(
            "/api/maintenance-tasks/:id/complete",
            post(complete_maintenance_task),
        )
        .route("/api/maintenance-tasks/:id/cancel", post(cancel_maintenance_task))
        .route("/api/maintenance-tasks/:id/parts", post(add_part_to_task))
        .route(
            "/api/maintenance-tasks/:id/parts/:usage_id",
            axum::routing::delete(remove_part_from_task),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(quantity: i32, price_at_time: f64) -> PartUsage {
        PartUsage {
            id: Uuid::new_v4(),
            task_id: Uuid::new_v4(),
            part_id: Uuid::new_v4(),
            quantity,
            price_at_time,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_total_cost_sums_snapshotted_prices() {
        let rows = vec![usage(2, 150.0), usage(1, 80.0), usage(3, 10.5)];
        assert_eq!(total_cost(&rows), 2.0 * 150.0 + 80.0 + 3.0 * 10.5);
    }

    #[test]
    fn test_total_cost_empty() {
        assert_eq!(total_cost(&[]), 0.0);
    }

    #[test]
    fn test_total_cost_after_removal() {
        let mut rows = vec![usage(2, 150.0), usage(1, 80.0)];
        rows.remove(0);
        assert_eq!(total_cost(&rows), 80.0);
    }

    #[test]
    fn test_check_stock() {
        assert!(check_stock(5, 5).is_ok());
        assert!(check_stock(5, 1).is_ok());
        assert!(matches!(
            check_stock(5, 6),
            Err(MaintenanceError::InsufficientStock {
                requested: 6,
                available: 5
            })
        ));
        assert!(matches!(
            check_stock(5, 0),
            Err(MaintenanceError::InvalidQuantity(0))
        ));
        assert!(matches!(
            check_stock(5, -2),
            Err(MaintenanceError::InvalidQuantity(-2))
        ));
    }

    #[test]
    fn test_status_groups() {
        assert!(MaintenanceStatus::Pending.can_start());
        assert!(MaintenanceStatus::Assigned.can_start());
        assert!(!MaintenanceStatus::InProgress.can_start());
        assert!(!MaintenanceStatus::Completed.can_start());

        assert!(MaintenanceStatus::Completed.is_terminal());
        assert!(MaintenanceStatus::Cancelled.is_terminal());
        assert!(!MaintenanceStatus::InProgress.is_terminal());
        assert!(!MaintenanceStatus::Pending.is_terminal());
    }

    #[test]
    fn test_status_parse_roundtrip() {
        for status in [
            MaintenanceStatus::Pending,
            MaintenanceStatus::Assigned,
            MaintenanceStatus::InProgress,
            MaintenanceStatus::Completed,
            MaintenanceStatus::Cancelled,
        ] {
            assert_eq!(MaintenanceStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(MaintenanceStatus::parse("on_hold"), None);
    }

    #[test]
    fn test_insufficient_stock_message() {
        let err = MaintenanceError::InsufficientStock {
            requested: 4,
            available: 1,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock: requested 4, 1 available"
        );
    }
}
