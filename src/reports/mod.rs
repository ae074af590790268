use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::shared::schema::{employees, locations, visits};
use crate::shared::state::AppState;
use crate::visits::Visit;

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub employee_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct EmployeeVisitCount {
    pub employee_id: Uuid,
    pub employee_name: String,
    pub visit_count: i64,
}

/// One CSV line of the visits report.
#[derive(Debug, Serialize)]
pub struct VisitReportRow {
    pub date: String,
    pub time: String,
    pub employee: String,
    pub customer: String,
    pub province: String,
    pub status: String,
    pub objectives: String,
}

pub fn visit_rows_to_csv(rows: &[VisitReportRow]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["date", "time", "employee", "customer", "province", "status", "type"])?;

    for row in rows {
        writer.write_record([
            &row.date,
            &row.time,
            &row.employee,
            &row.customer,
            &row.province,
            &row.status,
            &row.objectives,
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(std::io::Error::new(std::io::ErrorKind::Other, e)))
}

/// Visits per employee over a date range.
pub async fn visit_summary(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Vec<EmployeeVisitCount>>, (StatusCode, String)> {
    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let mut q = visits::table.select(visits::employee_id).into_boxed();

    if let Some(from) = query.from {
        q = q.filter(visits::check_in_time.ge(from));
    }

    if let Some(to) = query.to {
        q = q.filter(visits::check_in_time.lt(to));
    }

    let visit_employees: Vec<Uuid> = q
        .load(&mut conn)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query error: {e}")))?;

    let mut counts: HashMap<Uuid, i64> = HashMap::new();
    for employee_id in visit_employees {
        *counts.entry(employee_id).or_insert(0) += 1;
    }

    let ids: Vec<Uuid> = counts.keys().copied().collect();
    let names: HashMap<Uuid, String> = employees::table
        .filter(employees::id.eq_any(&ids))
        .select((employees::id, employees::name))
        .load::<(Uuid, String)>(&mut conn)
        .unwrap_or_default()
        .into_iter()
        .collect();

    let mut summary: Vec<EmployeeVisitCount> = counts
        .into_iter()
        .map(|(employee_id, visit_count)| EmployeeVisitCount {
            employee_id,
            employee_name: names.get(&employee_id).cloned().unwrap_or_default(),
            visit_count,
        })
        .collect();

    summary.sort_by(|a, b| b.visit_count.cmp(&a.visit_count));

    Ok(Json(summary))
}

/// Visits report as a CSV attachment.
pub async fn export_visits_csv(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let mut q = visits::table.into_boxed();

    if let Some(from) = query.from {
        q = q.filter(visits::check_in_time.ge(from));
    }

    if let Some(to) = query.to {
        q = q.filter(visits::check_in_time.lt(to));
    }

    if let Some(employee_id) = query.employee_id {
        q = q.filter(visits::employee_id.eq(employee_id));
    }

    let visit_rows: Vec<Visit> = q
        .order(visits::check_in_time.desc())
        .load(&mut conn)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query error: {e}")))?;

    let employee_ids: Vec<Uuid> = visit_rows.iter().map(|v| v.employee_id).collect();
    let employee_names: HashMap<Uuid, String> = employees::table
        .filter(employees::id.eq_any(&employee_ids))
        .select((employees::id, employees::name))
        .load::<(Uuid, String)>(&mut conn)
        .unwrap_or_default()
        .into_iter()
        .collect();

    let location_ids: Vec<Uuid> = visit_rows.iter().map(|v| v.location_id).collect();
    let location_info: HashMap<Uuid, (String, String, String)> = locations::table
        .filter(locations::id.eq_any(&location_ids))
        .select((
            locations::id,
            locations::name,
            locations::province,
            locations::customer_status,
        ))
        .load::<(Uuid, String, String, String)>(&mut conn)
        .unwrap_or_default()
        .into_iter()
        .map(|(id, name, province, status)| (id, (name, province, status)))
        .collect();

    let rows: Vec<VisitReportRow> = visit_rows
        .iter()
        .map(|v| {
            let (customer, province, status) = location_info
                .get(&v.location_id)
                .cloned()
                .unwrap_or_default();
            VisitReportRow {
                date: v.check_in_time.format("%Y-%m-%d").to_string(),
                time: v.check_in_time.format("%H:%M").to_string(),
                employee: employee_names
                    .get(&v.employee_id)
                    .cloned()
                    .unwrap_or_default(),
                customer,
                province,
                status,
                objectives: v.objectives.join("/"),
            }
        })
        .collect();

    let csv_bytes = visit_rows_to_csv(&rows)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("CSV error: {e}")))?;

    let filename = format!(
        "visits_report_{}.csv",
        Utc::now().format("%Y-%m-%d")
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        csv_bytes,
    ))
}

pub fn configure_report_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/reports/visits/summary", get(visit_summary))
        .route("/api/reports/visits/export", get(export_visits_csv))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> VisitReportRow {
        VisitReportRow {
            date: "2025-06-02".to_string(),
            time: "09:30".to_string(),
            employee: "Nida Somjai".to_string(),
            customer: "Baan Suan Cafe, Nimman".to_string(),
            province: "Chiang Mai".to_string(),
            status: "active".to_string(),
            objectives: "sales/delivery".to_string(),
        }
    }

    #[test]
    fn test_csv_header_and_row() {
        let bytes = visit_rows_to_csv(&[row()]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("date,time,employee,customer,province,status,type")
        );
        let data = lines.next().unwrap();
        assert!(data.contains("Nida Somjai"));
        // Field with a comma must be quoted.
        assert!(data.contains("\"Baan Suan Cafe, Nimman\""));
    }

    #[test]
    fn test_csv_empty() {
        let bytes = visit_rows_to_csv(&[]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}
