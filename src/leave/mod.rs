use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::dsl::sum;
use diesel::prelude::*;
use log::warn;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::activity;
use crate::auth::AuthSession;
use crate::shared::schema::{employees, leave_requests};
use crate::shared::state::AppState;
use crate::shared::utils::DbPool;

/// Days an approved request must still be out for the requester to cancel it.
pub const APPROVED_CANCEL_WINDOW_DAYS: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    Sick,
    Personal,
    Vacation,
    Other,
}

impl LeaveType {
    pub fn all() -> [Self; 4] {
        [Self::Sick, Self::Personal, Self::Vacation, Self::Other]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sick => "sick",
            Self::Personal => "personal",
            Self::Vacation => "vacation",
            Self::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "sick" => Some(Self::Sick),
            "personal" => Some(Self::Personal),
            "vacation" => Some(Self::Vacation),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    /// Annual allotment in days. `None` means unbounded.
    pub fn annual_quota(&self) -> Option<f64> {
        match self {
            Self::Sick => Some(30.0),
            Self::Personal => Some(3.0),
            Self::Vacation => Some(6.0),
            Self::Other => None,
        }
    }
}

impl std::fmt::Display for LeaveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = leave_requests)]
pub struct LeaveRequest {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub leave_type: String,
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: f64,
    pub half_day_period: Option<String>,
    pub is_paid: bool,
    pub reason: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub enum LeaveError {
    QuotaExceeded { requested: f64, remaining: f64 },
    InvalidType(String),
    InvalidDateRange,
    InvalidDayCount { days: f64, expected: f64 },
    InvalidHalfDayPeriod(String),
    AlreadyReviewed(String),
    CancelWindowClosed,
    NotCancellable(String),
    NotOwner,
    NotFound,
    EmployeeNotFound,
    DatabaseConnection,
    Database(String),
}

impl std::fmt::Display for LeaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QuotaExceeded { requested, remaining } => write!(
                f,
                "Insufficient leave balance: requested {requested} day(s), {remaining} remaining"
            ),
            Self::InvalidType(t) => write!(f, "Unknown leave type: {t}"),
            Self::InvalidDateRange => write!(f, "End date must not be before start date"),
            Self::InvalidDayCount { days, expected } => write!(
                f,
                "Day count {days} does not match the requested date span of {expected} day(s)"
            ),
            Self::InvalidHalfDayPeriod(p) => write!(f, "Unknown half-day period: {p}"),
            Self::AlreadyReviewed(status) => {
                write!(f, "Leave request was already reviewed (status: {status})")
            }
            Self::CancelWindowClosed => write!(
                f,
                "Approved leave can only be cancelled at least {APPROVED_CANCEL_WINDOW_DAYS} days before it starts"
            ),
            Self::NotCancellable(status) => {
                write!(f, "A {status} leave request cannot be cancelled")
            }
            Self::NotOwner => write!(f, "Leave request belongs to another employee"),
            Self::NotFound => write!(f, "Leave request not found"),
            Self::EmployeeNotFound => write!(f, "Employee not found"),
            Self::DatabaseConnection => write!(f, "Database connection failed"),
            Self::Database(e) => write!(f, "Database error: {e}"),
        }
    }
}

impl std::error::Error for LeaveError {}

impl From<diesel::result::Error> for LeaveError {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::NotFound => Self::NotFound,
            other => Self::Database(other.to_string()),
        }
    }
}

impl IntoResponse for LeaveError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            Self::QuotaExceeded { .. }
            | Self::InvalidType(_)
            | Self::InvalidDateRange
            | Self::InvalidDayCount { .. }
            | Self::InvalidHalfDayPeriod(_) => StatusCode::BAD_REQUEST,
            Self::AlreadyReviewed(_) | Self::CancelWindowClosed | Self::NotCancellable(_) => {
                StatusCode::CONFLICT
            }
            Self::NotOwner => StatusCode::FORBIDDEN,
            Self::NotFound | Self::EmployeeNotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

/// Inclusive day span between two dates.
pub fn span_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// Applies the half-day rule: a half-day request always collapses to a single
/// date at 0.5 days. Full-day requests must have a day count matching the
/// inclusive span.
pub fn normalize_request(
    start: NaiveDate,
    end: NaiveDate,
    days: f64,
    half_day_period: Option<&str>,
) -> Result<(NaiveDate, NaiveDate, f64), LeaveError> {
    if let Some(period) = half_day_period {
        if period != "morning" && period != "afternoon" {
            return Err(LeaveError::InvalidHalfDayPeriod(period.to_string()));
        }
        return Ok((start, start, 0.5));
    }

    if end < start {
        return Err(LeaveError::InvalidDateRange);
    }

    let expected = span_days(start, end) as f64;
    if days != expected {
        return Err(LeaveError::InvalidDayCount { days, expected });
    }

    Ok((start, end, days))
}

/// Quota gate shared by submission and approval.
pub fn check_quota(quota: Option<f64>, used: f64, requested: f64) -> Result<(), LeaveError> {
    let Some(quota) = quota else {
        return Ok(());
    };
    let remaining = quota - used;
    if requested > remaining {
        return Err(LeaveError::QuotaExceeded {
            requested,
            remaining,
        });
    }
    Ok(())
}

/// Cancellation rule: pending requests are always cancellable; approved ones
/// only while the start date is far enough out; rejected ones never.
pub fn cancellable(status: LeaveStatus, start_date: NaiveDate, today: NaiveDate) -> bool {
    match status {
        LeaveStatus::Pending => true,
        LeaveStatus::Approved => (start_date - today).num_days() >= APPROVED_CANCEL_WINDOW_DAYS,
        LeaveStatus::Rejected => false,
    }
}

#[derive(Debug, Serialize)]
pub struct LeaveBalance {
    pub leave_type: LeaveType,
    pub quota: Option<f64>,
    pub used: f64,
    pub remaining: Option<f64>,
}

pub struct LeaveService {
    pool: DbPool,
}

impl LeaveService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn used_days(
        conn: &mut PgConnection,
        employee_id: Uuid,
        leave_type: LeaveType,
    ) -> QueryResult<f64> {
        let used: Option<f64> = leave_requests::table
            .filter(leave_requests::employee_id.eq(employee_id))
            .filter(leave_requests::leave_type.eq(leave_type.as_str()))
            .filter(leave_requests::status.eq(LeaveStatus::Approved.as_str()))
            .select(sum(leave_requests::days))
            .first(conn)?;
        Ok(used.unwrap_or(0.0))
    }

    pub fn balance(&self, employee_id: Uuid) -> Result<Vec<LeaveBalance>, LeaveError> {
        let mut conn = self.pool.get().map_err(|_| LeaveError::DatabaseConnection)?;

        let mut balances = Vec::new();
        for leave_type in LeaveType::all() {
            let used = Self::used_days(&mut conn, employee_id, leave_type)?;
            let quota = leave_type.annual_quota();
            balances.push(LeaveBalance {
                leave_type,
                quota,
                used,
                remaining: quota.map(|q| q - used),
            });
        }

        Ok(balances)
    }

    pub fn submit(
        &self,
        employee_id: Uuid,
        leave_type: LeaveType,
        start_date: NaiveDate,
        end_date: NaiveDate,
        days: f64,
        half_day_period: Option<String>,
        is_paid: bool,
        reason: Option<String>,
    ) -> Result<LeaveRequest, LeaveError> {
        let mut conn = self.pool.get().map_err(|_| LeaveError::DatabaseConnection)?;

        let (start_date, end_date, days) =
            normalize_request(start_date, end_date, days, half_day_period.as_deref())?;

        conn.transaction::<_, LeaveError, _>(|conn| {
            // Lock the employee row so concurrent submissions for the same
            // employee serialize their quota checks.
            employees::table
                .filter(employees::id.eq(employee_id))
                .select(employees::id)
                .for_update()
                .first::<Uuid>(conn)
                .map_err(|e| match e {
                    diesel::result::Error::NotFound => LeaveError::EmployeeNotFound,
                    other => LeaveError::Database(other.to_string()),
                })?;

            let used = Self::used_days(conn, employee_id, leave_type)?;
            check_quota(leave_type.annual_quota(), used, days)?;

            let now = Utc::now();
            let request = LeaveRequest {
                id: Uuid::new_v4(),
                employee_id,
                leave_type: leave_type.as_str().to_string(),
                status: LeaveStatus::Pending.as_str().to_string(),
                start_date,
                end_date,
                days,
                half_day_period,
                is_paid,
                reason,
                reviewed_by: None,
                reviewed_at: None,
                review_note: None,
                created_at: now,
                updated_at: now,
            };

            diesel::insert_into(leave_requests::table)
                .values(&request)
                .execute(conn)?;

            Ok(request)
        })
    }

    pub fn review(
        &self,
        request_id: Uuid,
        approve: bool,
        reviewer_id: Uuid,
        note: Option<String>,
    ) -> Result<LeaveRequest, LeaveError> {
        let mut conn = self.pool.get().map_err(|_| LeaveError::DatabaseConnection)?;

        conn.transaction::<_, LeaveError, _>(|conn| {
            let request: LeaveRequest = leave_requests::table
                .filter(leave_requests::id.eq(request_id))
                .for_update()
                .first(conn)?;

            if request.status != LeaveStatus::Pending.as_str() {
                return Err(LeaveError::AlreadyReviewed(request.status));
            }

            let leave_type = LeaveType::parse(&request.leave_type)
                .ok_or_else(|| LeaveError::InvalidType(request.leave_type.clone()))?;

            // Approving must not push the employee past the quota even when
            // several pending requests were submitted against the same balance.
            if approve {
                employees::table
                    .filter(employees::id.eq(request.employee_id))
                    .select(employees::id)
                    .for_update()
                    .first::<Uuid>(conn)?;

                let used = Self::used_days(conn, request.employee_id, leave_type)?;
                check_quota(leave_type.annual_quota(), used, request.days)?;
            }

            let now = Utc::now();
            let status = if approve {
                LeaveStatus::Approved
            } else {
                LeaveStatus::Rejected
            };

            diesel::update(leave_requests::table.filter(leave_requests::id.eq(request_id)))
                .set((
                    leave_requests::status.eq(status.as_str()),
                    leave_requests::reviewed_by.eq(Some(reviewer_id)),
                    leave_requests::reviewed_at.eq(Some(now)),
                    leave_requests::review_note.eq(note),
                    leave_requests::updated_at.eq(now),
                ))
                .execute(conn)?;

            let updated: LeaveRequest = leave_requests::table
                .filter(leave_requests::id.eq(request_id))
                .first(conn)?;

            Ok(updated)
        })
    }

    pub fn cancel(&self, request_id: Uuid, caller: &AuthSession) -> Result<LeaveRequest, LeaveError> {
        let mut conn = self.pool.get().map_err(|_| LeaveError::DatabaseConnection)?;

        conn.transaction::<_, LeaveError, _>(|conn| {
            let request: LeaveRequest = leave_requests::table
                .filter(leave_requests::id.eq(request_id))
                .for_update()
                .first(conn)?;

            if request.employee_id != caller.employee_id && !caller.is_manager() {
                return Err(LeaveError::NotOwner);
            }

            let status = LeaveStatus::parse(&request.status)
                .ok_or_else(|| LeaveError::NotCancellable(request.status.clone()))?;

            let today = Utc::now().date_naive();
            if !cancellable(status, request.start_date, today) {
                return Err(match status {
                    LeaveStatus::Approved => LeaveError::CancelWindowClosed,
                    _ => LeaveError::NotCancellable(request.status.clone()),
                });
            }

            diesel::delete(leave_requests::table.filter(leave_requests::id.eq(request_id)))
                .execute(conn)?;

            Ok(request)
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateLeaveRequest {
    pub employee_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub leave_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: f64,
    pub half_day_period: Option<String>,
    pub is_paid: Option<bool>,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewLeaveRequest {
    pub approve: bool,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub employee_id: Option<Uuid>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct BalanceQuery {
    pub employee_id: Option<Uuid>,
}

pub async fn create_leave_request(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Json(req): Json<CreateLeaveRequest>,
) -> Result<Json<LeaveRequest>, LeaveError> {
    let leave_type =
        LeaveType::parse(&req.leave_type).ok_or_else(|| LeaveError::InvalidType(req.leave_type.clone()))?;

    // Managers may file on behalf of an employee; everyone else files for
    // themselves regardless of what the body claims.
    let employee_id = match req.employee_id {
        Some(id) if session.is_manager() => id,
        _ => session.employee_id,
    };

    let service = LeaveService::new(state.conn.clone());
    let request = service.submit(
        employee_id,
        leave_type,
        req.start_date,
        req.end_date,
        req.days,
        req.half_day_period,
        req.is_paid.unwrap_or(true),
        req.reason,
    )?;

    if let Ok(mut conn) = state.conn.get() {
        if let Err(e) = activity::record(
            &mut conn,
            session.employee_id,
            &session.name,
            "leave_requested",
            &format!("Requested {} leave for {} day(s)", leave_type, request.days),
            serde_json::json!({
                "leaveId": request.id,
                "leaveType": request.leave_type,
                "days": request.days,
                "startDate": request.start_date,
                "endDate": request.end_date,
            }),
        ) {
            warn!("Failed to record leave_requested activity: {e}");
        }
    }

    Ok(Json(request))
}

pub async fn list_leave_requests(
    State(state): State<Arc<AppState>>,
    _session: AuthSession,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<LeaveRequest>>, (StatusCode, String)> {
    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let limit = query.limit.unwrap_or(50);
    let offset = query.offset.unwrap_or(0);

    let mut q = leave_requests::table.into_boxed();

    if let Some(employee_id) = query.employee_id {
        q = q.filter(leave_requests::employee_id.eq(employee_id));
    }

    if let Some(status) = query.status {
        q = q.filter(leave_requests::status.eq(status));
    }

    let rows: Vec<LeaveRequest> = q
        .order(leave_requests::created_at.desc())
        .limit(limit)
        .offset(offset)
        .load(&mut conn)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query error: {e}")))?;

    Ok(Json(rows))
}

pub async fn get_leave_balance(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Query(query): Query<BalanceQuery>,
) -> Result<Json<Vec<LeaveBalance>>, LeaveError> {
    let employee_id = match query.employee_id {
        Some(id) if session.is_manager() || id == session.employee_id => id,
        Some(_) => return Err(LeaveError::NotOwner),
        None => session.employee_id,
    };

    let service = LeaveService::new(state.conn.clone());
    let balances = service.balance(employee_id)?;
    Ok(Json(balances))
}

pub async fn review_leave_request(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Path(id): Path<Uuid>,
    Json(req): Json<ReviewLeaveRequest>,
) -> Result<Json<LeaveRequest>, LeaveError> {
    if !session.is_manager() {
        return Err(LeaveError::NotOwner);
    }

    let service = LeaveService::new(state.conn.clone());
    let request = service.review(id, req.approve, session.employee_id, req.note.clone())?;

    let action = if req.approve {
        "leave_approved"
    } else {
        "leave_rejected"
    };

    if let Ok(mut conn) = state.conn.get() {
        if let Err(e) = activity::record(
            &mut conn,
            session.employee_id,
            &session.name,
            action,
            &format!(
                "{} {} leave of {} day(s)",
                if req.approve { "Approved" } else { "Rejected" },
                request.leave_type,
                request.days
            ),
            serde_json::json!({
                "leaveId": request.id,
                "targetEmployeeId": request.employee_id,
                "newStatus": request.status,
                "note": req.note,
            }),
        ) {
            warn!("Failed to record {action} activity: {e}");
        }
    }

    Ok(Json(request))
}

pub async fn cancel_leave_request(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, LeaveError> {
    let service = LeaveService::new(state.conn.clone());
    let cancelled = service.cancel(id, &session)?;

    // The row is gone; the audit trail is the only remaining record.
    if let Ok(mut conn) = state.conn.get() {
        if let Err(e) = activity::record(
            &mut conn,
            session.employee_id,
            &session.name,
            "leave_cancelled",
            &format!(
                "Cancelled {} {} leave of {} day(s)",
                cancelled.status, cancelled.leave_type, cancelled.days
            ),
            serde_json::json!({
                "leaveId": cancelled.id,
                "targetEmployeeId": cancelled.employee_id,
                "previousStatus": cancelled.status,
                "startDate": cancelled.start_date,
                "endDate": cancelled.end_date,
            }),
        ) {
            warn!("Failed to record leave_cancelled activity: {e}");
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

pub fn configure_leave_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/leave-requests",
            get(list_leave_requests).post(create_leave_request),
        )
        .route("/api/leave-requests/balance", get(get_leave_balance))
        .route(
            "/api/leave-requests/:id",
            axum::routing::delete(cancel_leave_request),
        )
        .route("/api/leave-requests/:id/review", put(review_leave_request))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_annual_quotas() {
        assert_eq!(LeaveType::Vacation.annual_quota(), Some(6.0));
        assert_eq!(LeaveType::Sick.annual_quota(), Some(30.0));
        assert_eq!(LeaveType::Personal.annual_quota(), Some(3.0));
        assert_eq!(LeaveType::Other.annual_quota(), None);
    }

    #[test]
    fn test_leave_type_parse_roundtrip() {
        for t in LeaveType::all() {
            assert_eq!(LeaveType::parse(t.as_str()), Some(t));
        }
        assert_eq!(LeaveType::parse("sabbatical"), None);
    }

    #[test]
    fn test_span_days_inclusive() {
        assert_eq!(span_days(date(2025, 6, 2), date(2025, 6, 2)), 1);
        assert_eq!(span_days(date(2025, 6, 2), date(2025, 6, 6)), 5);
    }

    #[test]
    fn test_normalize_half_day_forces_single_date() {
        let (start, end, days) = normalize_request(
            date(2025, 6, 2),
            date(2025, 6, 6),
            3.0,
            Some("morning"),
        )
        .unwrap();
        assert_eq!(start, date(2025, 6, 2));
        assert_eq!(end, date(2025, 6, 2));
        assert_eq!(days, 0.5);
    }

    #[test]
    fn test_normalize_rejects_unknown_period() {
        let err = normalize_request(date(2025, 6, 2), date(2025, 6, 2), 0.5, Some("evening"))
            .unwrap_err();
        assert!(matches!(err, LeaveError::InvalidHalfDayPeriod(_)));
    }

    #[test]
    fn test_normalize_rejects_day_count_mismatch() {
        let err =
            normalize_request(date(2025, 6, 2), date(2025, 6, 6), 3.0, None).unwrap_err();
        assert!(matches!(
            err,
            LeaveError::InvalidDayCount { days: _, expected } if expected == 5.0
        ));
    }

    #[test]
    fn test_normalize_rejects_reversed_range() {
        let err =
            normalize_request(date(2025, 6, 6), date(2025, 6, 2), 5.0, None).unwrap_err();
        assert!(matches!(err, LeaveError::InvalidDateRange));
    }

    #[test]
    fn test_check_quota_rejects_over_balance() {
        // Vacation quota 6 with 3 approved days: asking for 4 more must fail
        // and report the 3 remaining.
        let err = check_quota(Some(6.0), 3.0, 4.0).unwrap_err();
        match err {
            LeaveError::QuotaExceeded { requested, remaining } => {
                assert_eq!(requested, 4.0);
                assert_eq!(remaining, 3.0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_check_quota_allows_exact_balance() {
        assert!(check_quota(Some(6.0), 3.0, 3.0).is_ok());
    }

    #[test]
    fn test_check_quota_unbounded_type() {
        assert!(check_quota(None, 100.0, 50.0).is_ok());
    }

    #[test]
    fn test_check_quota_half_day_granularity() {
        assert!(check_quota(Some(3.0), 2.5, 0.5).is_ok());
        assert!(check_quota(Some(3.0), 2.5, 1.0).is_err());
    }

    #[test]
    fn test_pending_always_cancellable() {
        let today = date(2025, 6, 10);
        assert!(cancellable(LeaveStatus::Pending, date(2025, 6, 10), today));
        assert!(cancellable(LeaveStatus::Pending, date(2025, 6, 1), today));
    }

    #[test]
    fn test_approved_cancellable_only_before_window() {
        let today = date(2025, 6, 10);
        assert!(cancellable(LeaveStatus::Approved, date(2025, 6, 12), today));
        assert!(cancellable(LeaveStatus::Approved, date(2025, 7, 1), today));
        assert!(!cancellable(LeaveStatus::Approved, date(2025, 6, 11), today));
        assert!(!cancellable(LeaveStatus::Approved, date(2025, 6, 10), today));
        assert!(!cancellable(LeaveStatus::Approved, date(2025, 6, 1), today));
    }

    #[test]
    fn test_rejected_never_cancellable() {
        let today = date(2025, 6, 10);
        assert!(!cancellable(LeaveStatus::Rejected, date(2025, 7, 1), today));
    }

    #[test]
    fn test_quota_error_reports_remaining() {
        let err = LeaveError::QuotaExceeded {
            requested: 4.0,
            remaining: 3.0,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient leave balance: requested 4 day(s), 3 remaining"
        );
    }
}
