use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use log::warn;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::sync::Arc;
use uuid::Uuid;

use crate::activity;
use crate::auth::AuthSession;
use crate::shared::schema::sales_tasks;
use crate::shared::state::AppState;
use crate::visits::valid_objective;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    /// Sort weight for list ordering only.
    pub fn weight(&self) -> i32 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }
}

/// Transition table for sales tasks. Terminal states have no outgoing edges;
/// backward transitions are rejected.
pub fn can_transition(from: TaskStatus, to: TaskStatus) -> bool {
    use TaskStatus::*;
    matches!(
        (from, to),
        (Pending, InProgress)
            | (Pending, Completed)
            | (Pending, Cancelled)
            | (InProgress, Completed)
            | (InProgress, Cancelled)
    )
}

/// Overdue is a display state derived on every read, never stored.
pub fn effective_status(
    status: TaskStatus,
    due_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> &'static str {
    if !status.is_terminal() && due_date < now {
        "overdue"
    } else {
        status.as_str()
    }
}

#[derive(Debug, Clone)]
pub enum TaskError {
    InvalidStatus(String),
    InvalidPriority(String),
    InvalidObjective(String),
    IllegalTransition { from: TaskStatus, to: TaskStatus },
    ManagerRequired,
    NotFound,
    DatabaseConnection,
    Database(String),
}

impl std::fmt::Display for TaskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidStatus(s) => write!(f, "Unknown task status: {s}"),
            Self::InvalidPriority(p) => write!(f, "Unknown task priority: {p}"),
            Self::InvalidObjective(o) => write!(f, "Unknown visit objective: {o}"),
            Self::IllegalTransition { from, to } => {
                write!(f, "Illegal status transition: {from} -> {to}")
            }
            Self::ManagerRequired => write!(f, "Manager role required"),
            Self::NotFound => write!(f, "Task not found"),
            Self::DatabaseConnection => write!(f, "Database connection failed"),
            Self::Database(e) => write!(f, "Database error: {e}"),
        }
    }
}

impl std::error::Error for TaskError {}

impl From<diesel::result::Error> for TaskError {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::NotFound => Self::NotFound,
            other => Self::Database(other.to_string()),
        }
    }
}

impl IntoResponse for TaskError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            Self::InvalidStatus(_) | Self::InvalidPriority(_) | Self::InvalidObjective(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::IllegalTransition { .. } => StatusCode::CONFLICT,
            Self::ManagerRequired => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = sales_tasks)]
pub struct SalesTask {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub objectives: Vec<String>,
    pub assignee_id: Uuid,
    pub company_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub due_date: DateTime<Utc>,
    pub priority: String,
    pub status: String,
    pub completion_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// API shape: `status` carries the effective (possibly overdue) status.
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub objectives: Vec<String>,
    pub assignee_id: Uuid,
    pub company_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub due_date: DateTime<Utc>,
    pub priority: String,
    pub status: String,
    pub completion_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskResponse {
    fn from_task(task: SalesTask, now: DateTime<Utc>) -> Self {
        let status = match TaskStatus::parse(&task.status) {
            Some(parsed) => effective_status(parsed, task.due_date, now).to_string(),
            None => task.status.clone(),
        };
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            objectives: task.objectives,
            assignee_id: task.assignee_id,
            company_id: task.company_id,
            location_id: task.location_id,
            due_date: task.due_date,
            priority: task.priority,
            status,
            completion_note: task.completion_note,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub objectives: Option<Vec<String>>,
    pub assignee_id: Uuid,
    pub company_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub due_date: DateTime<Utc>,
    pub priority: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub objectives: Option<Vec<String>>,
    pub assignee_id: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangeStatusRequest {
    pub status: String,
    pub completion_note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub assignee_id: Option<Uuid>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn create_task(
    State(state): State<Arc<AppState>>,
    _session: AuthSession,
    Json(req): Json<CreateTaskRequest>,
) -> Result<Json<TaskResponse>, TaskError> {
    let priority = match req.priority.as_deref() {
        Some(p) => {
            TaskPriority::parse(p).ok_or_else(|| TaskError::InvalidPriority(p.to_string()))?
        }
        None => TaskPriority::Medium,
    };

    let objectives = req.objectives.unwrap_or_default();
    for objective in &objectives {
        if !valid_objective(objective) {
            return Err(TaskError::InvalidObjective(objective.clone()));
        }
    }

    let mut conn = state.conn.get().map_err(|_| TaskError::DatabaseConnection)?;

    let now = Utc::now();
    let task = SalesTask {
        id: Uuid::new_v4(),
        title: req.title,
        description: req.description,
        objectives,
        assignee_id: req.assignee_id,
        company_id: req.company_id,
        location_id: req.location_id,
        due_date: req.due_date,
        priority: priority.as_str().to_string(),
        status: TaskStatus::Pending.as_str().to_string(),
        completion_note: None,
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(sales_tasks::table)
        .values(&task)
        .execute(&mut conn)?;

    Ok(Json(TaskResponse::from_task(task, now)))
}

pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<TaskResponse>>, TaskError> {
    let mut conn = state.conn.get().map_err(|_| TaskError::DatabaseConnection)?;

    let limit = query.limit.unwrap_or(100);
    let offset = query.offset.unwrap_or(0);

    let mut q = sales_tasks::table.into_boxed();

    if let Some(assignee_id) = query.assignee_id {
        q = q.filter(sales_tasks::assignee_id.eq(assignee_id));
    }

    if let Some(priority) = query.priority {
        q = q.filter(sales_tasks::priority.eq(priority));
    }

    let rows: Vec<SalesTask> = q
        .order(sales_tasks::due_date.asc())
        .limit(limit)
        .offset(offset)
        .load(&mut conn)?;

    let now = Utc::now();
    let mut tasks: Vec<TaskResponse> = rows
        .into_iter()
        .map(|t| TaskResponse::from_task(t, now))
        .collect();

    // Filtering happens after the overdue derivation so `status=overdue`
    // works and `status=pending` excludes overdue tasks.
    if let Some(status) = query.status {
        tasks.retain(|t| t.status == status);
    }

    tasks.sort_by_key(|t| {
        let weight = TaskPriority::parse(&t.priority)
            .map(|p| p.weight())
            .unwrap_or(0);
        (Reverse(weight), t.due_date)
    });

    Ok(Json(tasks))
}

pub async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<TaskResponse>, TaskError> {
    let mut conn = state.conn.get().map_err(|_| TaskError::DatabaseConnection)?;

    let task: SalesTask = sales_tasks::table
        .filter(sales_tasks::id.eq(id))
        .first(&mut conn)?;

    Ok(Json(TaskResponse::from_task(task, Utc::now())))
}

pub async fn update_task(
    State(state): State<Arc<AppState>>,
    _session: AuthSession,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>, TaskError> {
    if let Some(priority) = req.priority.as_deref() {
        if TaskPriority::parse(priority).is_none() {
            return Err(TaskError::InvalidPriority(priority.to_string()));
        }
    }

    if let Some(objectives) = &req.objectives {
        for objective in objectives {
            if !valid_objective(objective) {
                return Err(TaskError::InvalidObjective(objective.clone()));
            }
        }
    }

    let mut conn = state.conn.get().map_err(|_| TaskError::DatabaseConnection)?;
    let now = Utc::now();

    diesel::update(sales_tasks::table.filter(sales_tasks::id.eq(id)))
        .set(sales_tasks::updated_at.eq(now))
        .execute(&mut conn)?;

    if let Some(title) = req.title {
        diesel::update(sales_tasks::table.filter(sales_tasks::id.eq(id)))
            .set(sales_tasks::title.eq(title))
            .execute(&mut conn)?;
    }

    if let Some(description) = req.description {
        diesel::update(sales_tasks::table.filter(sales_tasks::id.eq(id)))
            .set(sales_tasks::description.eq(Some(description)))
            .execute(&mut conn)?;
    }

    if let Some(objectives) = req.objectives {
        diesel::update(sales_tasks::table.filter(sales_tasks::id.eq(id)))
            .set(sales_tasks::objectives.eq(objectives))
            .execute(&mut conn)?;
    }

    if let Some(assignee_id) = req.assignee_id {
        diesel::update(sales_tasks::table.filter(sales_tasks::id.eq(id)))
            .set(sales_tasks::assignee_id.eq(assignee_id))
            .execute(&mut conn)?;
    }

    if let Some(due_date) = req.due_date {
        diesel::update(sales_tasks::table.filter(sales_tasks::id.eq(id)))
            .set(sales_tasks::due_date.eq(due_date))
            .execute(&mut conn)?;
    }

    if let Some(priority) = req.priority {
        diesel::update(sales_tasks::table.filter(sales_tasks::id.eq(id)))
            .set(sales_tasks::priority.eq(priority))
            .execute(&mut conn)?;
    }

    let task: SalesTask = sales_tasks::table
        .filter(sales_tasks::id.eq(id))
        .first(&mut conn)?;

    Ok(Json(TaskResponse::from_task(task, now)))
}

pub async fn change_task_status(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Path(id): Path<Uuid>,
    Json(req): Json<ChangeStatusRequest>,
) -> Result<Json<TaskResponse>, TaskError> {
    let to = TaskStatus::parse(&req.status)
        .ok_or_else(|| TaskError::InvalidStatus(req.status.clone()))?;

    let mut conn = state.conn.get().map_err(|_| TaskError::DatabaseConnection)?;

    let task = conn.transaction::<SalesTask, TaskError, _>(|conn| {
        let task: SalesTask = sales_tasks::table
            .filter(sales_tasks::id.eq(id))
            .for_update()
            .first(conn)?;

        let from = TaskStatus::parse(&task.status)
            .ok_or_else(|| TaskError::InvalidStatus(task.status.clone()))?;

        if from == to {
            return Ok(task);
        }

        if !can_transition(from, to) {
            return Err(TaskError::IllegalTransition { from, to });
        }

        let now = Utc::now();
        diesel::update(sales_tasks::table.filter(sales_tasks::id.eq(id)))
            .set((
                sales_tasks::status.eq(to.as_str()),
                sales_tasks::completion_note.eq(req.completion_note.clone()),
                sales_tasks::updated_at.eq(now),
            ))
            .execute(conn)?;

        let updated: SalesTask = sales_tasks::table
            .filter(sales_tasks::id.eq(id))
            .first(conn)?;

        Ok(updated)
    })?;

    if to == TaskStatus::Completed {
        if let Err(e) = activity::record(
            &mut conn,
            session.employee_id,
            &session.name,
            "task_completed",
            &format!("Completed task: {}", task.title),
            serde_json::json!({ "taskId": task.id }),
        ) {
            warn!("Failed to record task_completed activity: {e}");
        }
    }

    Ok(Json(TaskResponse::from_task(task, Utc::now())))
}

pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, TaskError> {
    if !session.is_manager() {
        return Err(TaskError::ManagerRequired);
    }

    let mut conn = state.conn.get().map_err(|_| TaskError::DatabaseConnection)?;

    diesel::delete(sales_tasks::table.filter(sales_tasks::id.eq(id))).execute(&mut conn)?;

    Ok(StatusCode::NO_CONTENT)
}

pub fn configure_task_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route(
            "/api/tasks/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/api/tasks/:id/status", put(change_task_status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_transition_table() {
        use TaskStatus::*;
        assert!(can_transition(Pending, InProgress));
        assert!(can_transition(Pending, Completed));
        assert!(can_transition(Pending, Cancelled));
        assert!(can_transition(InProgress, Completed));
        assert!(can_transition(InProgress, Cancelled));

        assert!(!can_transition(InProgress, Pending));
        assert!(!can_transition(Completed, Pending));
        assert!(!can_transition(Completed, InProgress));
        assert!(!can_transition(Completed, Cancelled));
        assert!(!can_transition(Cancelled, Pending));
        assert!(!can_transition(Cancelled, InProgress));
    }

    #[test]
    fn test_effective_status_overdue() {
        let now = Utc::now();
        let past = now - Duration::hours(1);
        let future = now + Duration::hours(1);

        assert_eq!(effective_status(TaskStatus::Pending, past, now), "overdue");
        assert_eq!(
            effective_status(TaskStatus::InProgress, past, now),
            "overdue"
        );
        assert_eq!(effective_status(TaskStatus::Pending, future, now), "pending");
        assert_eq!(
            effective_status(TaskStatus::Completed, past, now),
            "completed"
        );
        assert_eq!(
            effective_status(TaskStatus::Cancelled, past, now),
            "cancelled"
        );
    }

    #[test]
    fn test_priority_weights() {
        assert_eq!(TaskPriority::High.weight(), 3);
        assert_eq!(TaskPriority::Medium.weight(), 2);
        assert_eq!(TaskPriority::Low.weight(), 1);
    }

    #[test]
    fn test_status_parse_rejects_overdue() {
        // Overdue is derived, never accepted as a stored status.
        assert_eq!(TaskStatus::parse("overdue"), None);
    }
}
