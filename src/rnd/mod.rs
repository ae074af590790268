use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;
use log::info;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::AuthSession;
use crate::shared::schema::{products, projects, rnd_tasks, sample_feedback, samples};
use crate::shared::state::AppState;
use crate::shared::utils::DbPool;
use crate::tasks::{can_transition, TaskStatus};

pub const PROJECT_STATUSES: [&str; 4] = ["active", "on_hold", "completed", "cancelled"];
pub const PRODUCT_STATUSES: [&str; 4] = ["development", "sampling", "production", "discontinued"];
pub const SAMPLE_STATUSES: [&str; 5] = [
    "sent",
    "pending_feedback",
    "feedback_received",
    "approved",
    "rejected",
];
pub const CUSTOMER_REACTIONS: [&str; 5] = [
    "very_positive",
    "positive",
    "neutral",
    "negative",
    "very_negative",
];

pub const TASK_TYPE_SAMPLE_FOLLOWUP: &str = "sample_followup";
pub const TASK_TYPE_GENERAL: &str = "general";

/// Sample status resulting from a customer reaction.
pub fn status_from_reaction(reaction: Option<&str>) -> &'static str {
    match reaction {
        Some("very_positive") | Some("positive") => "approved",
        Some("very_negative") => "rejected",
        _ => "feedback_received",
    }
}

#[derive(Debug, Clone)]
pub enum RndError {
    InvalidStatus(String),
    InvalidReaction(String),
    IllegalTransition { from: TaskStatus, to: TaskStatus },
    FeedbackExists,
    ProjectNotFound,
    ProductNotFound,
    SampleNotFound,
    TaskNotFound,
    DatabaseConnection,
    Database(String),
}

impl std::fmt::Display for RndError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidStatus(s) => write!(f, "Unknown status: {s}"),
            Self::InvalidReaction(r) => write!(f, "Unknown customer reaction: {r}"),
            Self::IllegalTransition { from, to } => {
                write!(f, "Illegal status transition: {from} -> {to}")
            }
            Self::FeedbackExists => write!(f, "Feedback was already submitted for this sample"),
            Self::ProjectNotFound => write!(f, "Project not found"),
            Self::ProductNotFound => write!(f, "Product not found"),
            Self::SampleNotFound => write!(f, "Sample not found"),
            Self::TaskNotFound => write!(f, "Task not found"),
            Self::DatabaseConnection => write!(f, "Database connection failed"),
            Self::Database(e) => write!(f, "Database error: {e}"),
        }
    }
}

impl std::error::Error for RndError {}

impl From<diesel::result::Error> for RndError {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::NotFound => Self::SampleNotFound,
            other => Self::Database(other.to_string()),
        }
    }
}

impl IntoResponse for RndError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            Self::InvalidStatus(_) | Self::InvalidReaction(_) => StatusCode::BAD_REQUEST,
            Self::IllegalTransition { .. } | Self::FeedbackExists => StatusCode::CONFLICT,
            Self::ProjectNotFound
            | Self::ProductNotFound
            | Self::SampleNotFound
            | Self::TaskNotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = projects)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub company_id: Option<Uuid>,
    pub description: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = products)]
pub struct Product {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = samples)]
pub struct Sample {
    pub id: Uuid,
    pub product_id: Uuid,
    pub sample_number: String,
    pub version: i32,
    pub status: String,
    pub sent_by: Uuid,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = sample_feedback)]
pub struct SampleFeedback {
    pub id: Uuid,
    pub sample_id: Uuid,
    pub feedback_by: Uuid,
    pub visit_id: Option<Uuid>,
    pub rating: Option<i32>,
    pub customer_reaction: Option<String>,
    pub comments: Option<String>,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = rnd_tasks)]
pub struct RndTask {
    pub id: Uuid,
    pub project_id: Uuid,
    pub sample_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub task_type: String,
    pub assignee_id: Uuid,
    pub created_by: Uuid,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SampleWithFollowUp {
    pub sample: Sample,
    pub follow_up_task: Option<RndTask>,
    pub feedback: Option<SampleFeedback>,
}

pub struct RndService {
    pool: DbPool,
}

impl RndService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Creates the sample, its follow-up task for the assigned sales rep, and
    /// bumps the product out of development, atomically.
    pub fn create_sample(
        &self,
        product_id: Uuid,
        sample_number: String,
        version: i32,
        due_date: Option<NaiveDate>,
        sent_by: Uuid,
        assignee_id: Uuid,
        notes: Option<String>,
        images: Vec<String>,
    ) -> Result<SampleWithFollowUp, RndError> {
        let mut conn = self.pool.get().map_err(|_| RndError::DatabaseConnection)?;

        conn.transaction::<_, RndError, _>(|conn| {
            let product: Product = products::table
                .filter(products::id.eq(product_id))
                .for_update()
                .first(conn)
                .map_err(|e| match e {
                    diesel::result::Error::NotFound => RndError::ProductNotFound,
                    other => RndError::Database(other.to_string()),
                })?;

            let now = Utc::now();
            let sample = Sample {
                id: Uuid::new_v4(),
                product_id,
                sample_number: sample_number.clone(),
                version,
                status: "sent".to_string(),
                sent_by,
                due_date,
                notes,
                images,
                created_at: now,
                updated_at: now,
            };

            diesel::insert_into(samples::table)
                .values(&sample)
                .execute(conn)?;

            let follow_up = RndTask {
                id: Uuid::new_v4(),
                project_id: product.project_id,
                sample_id: Some(sample.id),
                title: format!("Collect feedback: {} - {}", product.name, sample_number),
                description: Some(format!(
                    "Visit the customer and collect feedback for sample {} of {}.",
                    sample_number, product.name
                )),
                task_type: TASK_TYPE_SAMPLE_FOLLOWUP.to_string(),
                assignee_id,
                created_by: sent_by,
                due_date: due_date
                    .map(|d| DateTime::from_naive_utc_and_offset(d.and_time(NaiveTime::MIN), Utc)),
                priority: "medium".to_string(),
                status: TaskStatus::Pending.as_str().to_string(),
                created_at: now,
                updated_at: now,
            };

            diesel::insert_into(rnd_tasks::table)
                .values(&follow_up)
                .execute(conn)?;

            if product.status == "development" {
                diesel::update(products::table.filter(products::id.eq(product_id)))
                    .set((
                        products::status.eq("sampling"),
                        products::updated_at.eq(now),
                    ))
                    .execute(conn)?;
            }

            info!(
                "Created sample {} with follow-up task {}",
                sample.id, follow_up.id
            );

            Ok(SampleWithFollowUp {
                sample,
                follow_up_task: Some(follow_up),
                feedback: None,
            })
        })
    }

    /// Records customer feedback for a sample (1:1), derives the new sample
    /// status from the reaction, and completes the follow-up task, atomically.
    pub fn submit_feedback(
        &self,
        sample_id: Uuid,
        feedback_by: Uuid,
        visit_id: Option<Uuid>,
        rating: Option<i32>,
        customer_reaction: Option<String>,
        comments: Option<String>,
        images: Vec<String>,
    ) -> Result<SampleWithFollowUp, RndError> {
        if let Some(reaction) = customer_reaction.as_deref() {
            if !CUSTOMER_REACTIONS.contains(&reaction) {
                return Err(RndError::InvalidReaction(reaction.to_string()));
            }
        }

        let mut conn = self.pool.get().map_err(|_| RndError::DatabaseConnection)?;

        conn.transaction::<_, RndError, _>(|conn| {
            samples::table
                .filter(samples::id.eq(sample_id))
                .select(samples::id)
                .for_update()
                .first::<Uuid>(conn)
                .map_err(|e| match e {
                    diesel::result::Error::NotFound => RndError::SampleNotFound,
                    other => RndError::Database(other.to_string()),
                })?;

            let existing: i64 = sample_feedback::table
                .filter(sample_feedback::sample_id.eq(sample_id))
                .count()
                .get_result(conn)?;
            if existing > 0 {
                return Err(RndError::FeedbackExists);
            }

            let now = Utc::now();
            let feedback = SampleFeedback {
                id: Uuid::new_v4(),
                sample_id,
                feedback_by,
                visit_id,
                rating,
                customer_reaction: customer_reaction.clone(),
                comments,
                images,
                created_at: now,
            };

            diesel::insert_into(sample_feedback::table)
                .values(&feedback)
                .execute(conn)?;

            let new_status = status_from_reaction(customer_reaction.as_deref());
            diesel::update(samples::table.filter(samples::id.eq(sample_id)))
                .set((samples::status.eq(new_status), samples::updated_at.eq(now)))
                .execute(conn)?;

            diesel::update(
                rnd_tasks::table
                    .filter(rnd_tasks::sample_id.eq(Some(sample_id)))
                    .filter(rnd_tasks::task_type.eq(TASK_TYPE_SAMPLE_FOLLOWUP)),
            )
            .set((
                rnd_tasks::status.eq(TaskStatus::Completed.as_str()),
                rnd_tasks::updated_at.eq(now),
            ))
            .execute(conn)?;

            let updated: Sample = samples::table
                .filter(samples::id.eq(sample_id))
                .first(conn)?;

            let follow_up: Option<RndTask> = rnd_tasks::table
                .filter(rnd_tasks::sample_id.eq(Some(sample_id)))
                .filter(rnd_tasks::task_type.eq(TASK_TYPE_SAMPLE_FOLLOWUP))
                .first(conn)
                .optional()?;

            Ok(SampleWithFollowUp {
                sample: updated,
                follow_up_task: follow_up,
                feedback: Some(feedback),
            })
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub company_id: Option<Uuid>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSampleRequest {
    pub product_id: Uuid,
    pub sample_number: String,
    pub version: Option<i32>,
    pub due_date: Option<NaiveDate>,
    pub assignee_id: Uuid,
    pub notes: Option<String>,
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitFeedbackRequest {
    pub visit_id: Option<Uuid>,
    pub rating: Option<i32>,
    pub customer_reaction: Option<String>,
    pub comments: Option<String>,
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct ChangeRndTaskStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct SampleListQuery {
    pub product_id: Option<Uuid>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RndTaskListQuery {
    pub assignee_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub status: Option<String>,
    pub task_type: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ProjectWithProducts {
    pub project: Project,
    pub products: Vec<Product>,
}

pub async fn create_project(
    State(state): State<Arc<AppState>>,
    _session: AuthSession,
    Json(req): Json<CreateProjectRequest>,
) -> Result<Json<Project>, RndError> {
    let mut conn = state.conn.get().map_err(|_| RndError::DatabaseConnection)?;

    let now = Utc::now();
    let project = Project {
        id: Uuid::new_v4(),
        name: req.name,
        company_id: req.company_id,
        description: req.description,
        status: "active".to_string(),
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(projects::table)
        .values(&project)
        .execute(&mut conn)?;

    Ok(Json(project))
}

pub async fn list_projects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Project>>, RndError> {
    let mut conn = state.conn.get().map_err(|_| RndError::DatabaseConnection)?;

    let rows: Vec<Project> = projects::table
        .order(projects::created_at.desc())
        .load(&mut conn)?;

    Ok(Json(rows))
}

pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProjectWithProducts>, RndError> {
    let mut conn = state.conn.get().map_err(|_| RndError::DatabaseConnection)?;

    let project: Project = projects::table
        .filter(projects::id.eq(id))
        .first(&mut conn)
        .map_err(|e| match e {
            diesel::result::Error::NotFound => RndError::ProjectNotFound,
            other => RndError::Database(other.to_string()),
        })?;

    let product_rows: Vec<Product> = products::table
        .filter(products::project_id.eq(id))
        .order(products::name.asc())
        .load(&mut conn)
        .unwrap_or_default();

    Ok(Json(ProjectWithProducts {
        project,
        products: product_rows,
    }))
}

pub async fn create_product(
    State(state): State<Arc<AppState>>,
    _session: AuthSession,
    Path(project_id): Path<Uuid>,
    Json(req): Json<CreateProductRequest>,
) -> Result<Json<Product>, RndError> {
    let mut conn = state.conn.get().map_err(|_| RndError::DatabaseConnection)?;

    projects::table
        .filter(projects::id.eq(project_id))
        .select(projects::id)
        .first::<Uuid>(&mut conn)
        .map_err(|e| match e {
            diesel::result::Error::NotFound => RndError::ProjectNotFound,
            other => RndError::Database(other.to_string()),
        })?;

    let now = Utc::now();
    let product = Product {
        id: Uuid::new_v4(),
        project_id,
        name: req.name,
        description: req.description,
        status: "development".to_string(),
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(products::table)
        .values(&product)
        .execute(&mut conn)?;

    Ok(Json(product))
}

pub async fn create_sample(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Json(req): Json<CreateSampleRequest>,
) -> Result<Json<SampleWithFollowUp>, RndError> {
    let service = RndService::new(state.conn.clone());
    let created = service.create_sample(
        req.product_id,
        req.sample_number,
        req.version.unwrap_or(1),
        req.due_date,
        session.employee_id,
        req.assignee_id,
        req.notes,
        req.images.unwrap_or_default(),
    )?;
    Ok(Json(created))
}

pub async fn list_samples(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SampleListQuery>,
) -> Result<Json<Vec<Sample>>, RndError> {
    let mut conn = state.conn.get().map_err(|_| RndError::DatabaseConnection)?;

    let limit = query.limit.unwrap_or(100);
    let offset = query.offset.unwrap_or(0);

    let mut q = samples::table.into_boxed();

    if let Some(product_id) = query.product_id {
        q = q.filter(samples::product_id.eq(product_id));
    }

    if let Some(status) = query.status {
        q = q.filter(samples::status.eq(status));
    }

    let rows: Vec<Sample> = q
        .order(samples::created_at.desc())
        .limit(limit)
        .offset(offset)
        .load(&mut conn)?;

    Ok(Json(rows))
}

pub async fn get_sample(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SampleWithFollowUp>, RndError> {
    let mut conn = state.conn.get().map_err(|_| RndError::DatabaseConnection)?;

    let sample: Sample = samples::table
        .filter(samples::id.eq(id))
        .first(&mut conn)
        .map_err(|e| match e {
            diesel::result::Error::NotFound => RndError::SampleNotFound,
            other => RndError::Database(other.to_string()),
        })?;

    let follow_up: Option<RndTask> = rnd_tasks::table
        .filter(rnd_tasks::sample_id.eq(Some(id)))
        .filter(rnd_tasks::task_type.eq(TASK_TYPE_SAMPLE_FOLLOWUP))
        .first(&mut conn)
        .optional()?;

    let feedback: Option<SampleFeedback> = sample_feedback::table
        .filter(sample_feedback::sample_id.eq(id))
        .first(&mut conn)
        .optional()?;

    Ok(Json(SampleWithFollowUp {
        sample,
        follow_up_task: follow_up,
        feedback,
    }))
}

pub async fn submit_sample_feedback(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Path(id): Path<Uuid>,
    Json(req): Json<SubmitFeedbackRequest>,
) -> Result<Json<SampleWithFollowUp>, RndError> {
    let service = RndService::new(state.conn.clone());
    let result = service.submit_feedback(
        id,
        session.employee_id,
        req.visit_id,
        req.rating,
        req.customer_reaction,
        req.comments,
        req.images.unwrap_or_default(),
    )?;
    Ok(Json(result))
}

pub async fn list_rnd_tasks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RndTaskListQuery>,
) -> Result<Json<Vec<RndTask>>, RndError> {
    let mut conn = state.conn.get().map_err(|_| RndError::DatabaseConnection)?;

    let limit = query.limit.unwrap_or(100);
    let offset = query.offset.unwrap_or(0);

    let mut q = rnd_tasks::table.into_boxed();

    if let Some(assignee_id) = query.assignee_id {
        q = q.filter(rnd_tasks::assignee_id.eq(assignee_id));
    }

    if let Some(project_id) = query.project_id {
        q = q.filter(rnd_tasks::project_id.eq(project_id));
    }

    if let Some(status) = query.status {
        q = q.filter(rnd_tasks::status.eq(status));
    }

    if let Some(task_type) = query.task_type {
        q = q.filter(rnd_tasks::task_type.eq(task_type));
    }

    let rows: Vec<RndTask> = q
        .order(rnd_tasks::created_at.desc())
        .limit(limit)
        .offset(offset)
        .load(&mut conn)?;

    Ok(Json(rows))
}

/// Follow-up tasks share the sales-task transition table.
pub async fn change_rnd_task_status(
    State(state): State<Arc<AppState>>,
    _session: AuthSession,
    Path(id): Path<Uuid>,
    Json(req): Json<ChangeRndTaskStatusRequest>,
) -> Result<Json<RndTask>, RndError> {
    let to = TaskStatus::parse(&req.status)
        .ok_or_else(|| RndError::InvalidStatus(req.status.clone()))?;

    let mut conn = state.conn.get().map_err(|_| RndError::DatabaseConnection)?;

    let task = conn.transaction::<RndTask, RndError, _>(|conn| {
        let task: RndTask = rnd_tasks::table
            .filter(rnd_tasks::id.eq(id))
            .for_update()
            .first(conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => RndError::TaskNotFound,
                other => RndError::Database(other.to_string()),
            })?;

        let from = TaskStatus::parse(&task.status)
            .ok_or_else(|| RndError::InvalidStatus(task.status.clone()))?;

        if from == to {
            return Ok(task);
        }

        if !can_transition(from, to) {
            return Err(RndError::IllegalTransition { from, to });
        }

        diesel::update(rnd_tasks::table.filter(rnd_tasks::id.eq(id)))
            .set((
                rnd_tasks::status.eq(to.as_str()),
                rnd_tasks::updated_at.eq(Utc::now()),
            ))
            .execute(conn)?;

        let updated: RndTask = rnd_tasks::table.filter(rnd_tasks::id.eq(id)).first(conn)?;
        Ok(updated)
    })?;

    Ok(Json(task))
}

pub fn configure_rnd_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/projects", get(list_projects).post(create_project))
        .route("/api/projects/:id", get(get_project))
        .route("/api/projects/:id/products", post(create_product))
        .route("/api/samples", get(list_samples).post(create_sample))
        .route("/api/samples/:id", get(get_sample))
        .route("/api/samples/:id/feedback", post(submit_sample_feedback))
        .route("/api/rnd-tasks", get(list_rnd_tasks))
        .route("/api/rnd-tasks/:id/status", put(change_rnd_task_status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_reaction() {
        assert_eq!(status_from_reaction(Some("very_positive")), "approved");
        assert_eq!(status_from_reaction(Some("positive")), "approved");
        assert_eq!(status_from_reaction(Some("very_negative")), "rejected");
        assert_eq!(status_from_reaction(Some("negative")), "feedback_received");
        assert_eq!(status_from_reaction(Some("neutral")), "feedback_received");
        assert_eq!(status_from_reaction(None), "feedback_received");
    }

    #[test]
    fn test_reaction_table() {
        assert_eq!(CUSTOMER_REACTIONS.len(), 5);
        assert!(CUSTOMER_REACTIONS.contains(&"neutral"));
    }
}
