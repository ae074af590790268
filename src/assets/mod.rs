use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::AuthSession;
use crate::shared::schema::{assets, spare_parts};
use crate::shared::state::AppState;

pub const ASSET_STATUSES: [&str; 7] = [
    "AVAILABLE",
    "RENTED",
    "MAINTENANCE",
    "RESERVED",
    "SPARE",
    "DISPOSAL",
    "LOST",
];

pub const ASSET_CONDITIONS: [&str; 4] = ["NEW", "USED", "REFURBISHED", "BROKEN"];

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = assets)]
pub struct Asset {
    pub id: Uuid,
    pub serial_number: String,
    pub model_name: String,
    pub status: String,
    pub condition: String,
    pub current_location_id: Option<Uuid>,
    pub cost: f64,
    pub purchase_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = spare_parts)]
pub struct SparePart {
    pub id: Uuid,
    pub name: String,
    pub part_number: String,
    pub stock: i32,
    pub min_stock: i32,
    pub price: f64,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SparePart {
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateAssetRequest {
    pub serial_number: String,
    pub model_name: String,
    pub status: Option<String>,
    pub condition: Option<String>,
    pub current_location_id: Option<Uuid>,
    pub cost: Option<f64>,
    pub purchase_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAssetRequest {
    pub model_name: Option<String>,
    pub status: Option<String>,
    pub condition: Option<String>,
    pub current_location_id: Option<Uuid>,
    pub cost: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePartRequest {
    pub name: String,
    pub part_number: String,
    pub stock: Option<i32>,
    pub min_stock: Option<i32>,
    pub price: f64,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePartRequest {
    pub name: Option<String>,
    pub stock: Option<i32>,
    pub min_stock: Option<i32>,
    pub price: Option<f64>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssetListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub condition: Option<String>,
    pub location_id: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PartListQuery {
    pub search: Option<String>,
    pub low_stock: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn create_asset(
    State(state): State<Arc<AppState>>,
    _session: AuthSession,
    Json(req): Json<CreateAssetRequest>,
) -> Result<Json<Asset>, (StatusCode, String)> {
    let status = req.status.unwrap_or_else(|| "AVAILABLE".to_string());
    if !ASSET_STATUSES.contains(&status.as_str()) {
        return Err((StatusCode::BAD_REQUEST, format!("Unknown asset status: {status}")));
    }

    let condition = req.condition.unwrap_or_else(|| "NEW".to_string());
    if !ASSET_CONDITIONS.contains(&condition.as_str()) {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("Unknown asset condition: {condition}"),
        ));
    }

    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let now = Utc::now();
    let asset = Asset {
        id: Uuid::new_v4(),
        serial_number: req.serial_number,
        model_name: req.model_name,
        status,
        condition,
        current_location_id: req.current_location_id,
        cost: req.cost.unwrap_or(0.0),
        purchase_date: req.purchase_date,
        notes: req.notes,
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(assets::table)
        .values(&asset)
        .execute(&mut conn)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Insert error: {e}")))?;

    Ok(Json(asset))
}

pub async fn list_assets(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AssetListQuery>,
) -> Result<Json<Vec<Asset>>, (StatusCode, String)> {
    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let limit = query.limit.unwrap_or(50);
    let offset = query.offset.unwrap_or(0);

    let mut q = assets::table.into_boxed();

    if let Some(status) = query.status {
        q = q.filter(assets::status.eq(status));
    }

    if let Some(condition) = query.condition {
        q = q.filter(assets::condition.eq(condition));
    }

    if let Some(location_id) = query.location_id {
        q = q.filter(assets::current_location_id.eq(location_id));
    }

    if let Some(search) = query.search {
        let pattern = format!("%{search}%");
        q = q.filter(
            assets::serial_number
                .ilike(pattern.clone())
                .or(assets::model_name.ilike(pattern)),
        );
    }

    let rows: Vec<Asset> = q
        .order(assets::serial_number.asc())
        .limit(limit)
        .offset(offset)
        .load(&mut conn)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query error: {e}")))?;

    Ok(Json(rows))
}

pub async fn get_asset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Asset>, (StatusCode, String)> {
    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let asset: Asset = assets::table
        .filter(assets::id.eq(id))
        .first(&mut conn)
        .map_err(|_| (StatusCode::NOT_FOUND, "Asset not found".to_string()))?;

    Ok(Json(asset))
}

pub async fn update_asset(
    State(state): State<Arc<AppState>>,
    _session: AuthSession,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateAssetRequest>,
) -> Result<Json<Asset>, (StatusCode, String)> {
    if let Some(status) = req.status.as_deref() {
        if !ASSET_STATUSES.contains(&status) {
            return Err((StatusCode::BAD_REQUEST, format!("Unknown asset status: {status}")));
        }
    }

    if let Some(condition) = req.condition.as_deref() {
        if !ASSET_CONDITIONS.contains(&condition) {
            return Err((
                StatusCode::BAD_REQUEST,
                format!("Unknown asset condition: {condition}"),
            ));
        }
    }

    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let now = Utc::now();

    diesel::update(assets::table.filter(assets::id.eq(id)))
        .set(assets::updated_at.eq(now))
        .execute(&mut conn)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;

    if let Some(model_name) = req.model_name {
        diesel::update(assets::table.filter(assets::id.eq(id)))
            .set(assets::model_name.eq(model_name))
            .execute(&mut conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;
    }

    if let Some(status) = req.status {
        diesel::update(assets::table.filter(assets::id.eq(id)))
            .set(assets::status.eq(status))
            .execute(&mut conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;
    }

    if let Some(condition) = req.condition {
        diesel::update(assets::table.filter(assets::id.eq(id)))
            .set(assets::condition.eq(condition))
            .execute(&mut conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;
    }

    if let Some(location_id) = req.current_location_id {
        diesel::update(assets::table.filter(assets::id.eq(id)))
            .set(assets::current_location_id.eq(Some(location_id)))
            .execute(&mut conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;
    }

    if let Some(cost) = req.cost {
        diesel::update(assets::table.filter(assets::id.eq(id)))
            .set(assets::cost.eq(cost))
            .execute(&mut conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;
    }

    if let Some(notes) = req.notes {
        diesel::update(assets::table.filter(assets::id.eq(id)))
            .set(assets::notes.eq(Some(notes)))
            .execute(&mut conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;
    }

    let asset: Asset = assets::table
        .filter(assets::id.eq(id))
        .first(&mut conn)
        .map_err(|_| (StatusCode::NOT_FOUND, "Asset not found".to_string()))?;

    Ok(Json(asset))
}

pub async fn create_part(
    State(state): State<Arc<AppState>>,
    _session: AuthSession,
    Json(req): Json<CreatePartRequest>,
) -> Result<Json<SparePart>, (StatusCode, String)> {
    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let now = Utc::now();
    let part = SparePart {
        id: Uuid::new_v4(),
        name: req.name,
        part_number: req.part_number,
        stock: req.stock.unwrap_or(0),
        min_stock: req.min_stock.unwrap_or(0),
        price: req.price,
        image_url: req.image_url,
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(spare_parts::table)
        .values(&part)
        .execute(&mut conn)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Insert error: {e}")))?;

    Ok(Json(part))
}

pub async fn list_parts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PartListQuery>,
) -> Result<Json<Vec<SparePart>>, (StatusCode, String)> {
    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let limit = query.limit.unwrap_or(100);
    let offset = query.offset.unwrap_or(0);

    let mut q = spare_parts::table.into_boxed();

    if let Some(search) = query.search {
        let pattern = format!("%{search}%");
        q = q.filter(
            spare_parts::name
                .ilike(pattern.clone())
                .or(spare_parts::part_number.ilike(pattern)),
        );
    }

    let mut rows: Vec<SparePart> = q
        .order(spare_parts::name.asc())
        .limit(limit)
        .offset(offset)
        .load(&mut conn)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Query error: {e}")))?;

    if query.low_stock.unwrap_or(false) {
        rows.retain(SparePart::is_low_stock);
    }

    Ok(Json(rows))
}

pub async fn update_part(
    State(state): State<Arc<AppState>>,
    _session: AuthSession,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePartRequest>,
) -> Result<Json<SparePart>, (StatusCode, String)> {
    if let Some(stock) = req.stock {
        if stock < 0 {
            return Err((StatusCode::BAD_REQUEST, "Stock cannot be negative".to_string()));
        }
    }

    let mut conn = state
        .conn
        .get()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {e}")))?;

    let now = Utc::now();

    diesel::update(spare_parts::table.filter(spare_parts::id.eq(id)))
        .set(spare_parts::updated_at.eq(now))
        .execute(&mut conn)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;

    if let Some(name) = req.name {
        diesel::update(spare_parts::table.filter(spare_parts::id.eq(id)))
            .set(spare_parts::name.eq(name))
            .execute(&mut conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;
    }

    if let Some(stock) = req.stock {
        diesel::update(spare_parts::table.filter(spare_parts::id.eq(id)))
            .set(spare_parts::stock.eq(stock))
            .execute(&mut conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;
    }

    if let Some(min_stock) = req.min_stock {
        diesel::update(spare_parts::table.filter(spare_parts::id.eq(id)))
            .set(spare_parts::min_stock.eq(min_stock))
            .execute(&mut conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;
    }

    if let Some(price) = req.price {
        diesel::update(spare_parts::table.filter(spare_parts::id.eq(id)))
            .set(spare_parts::price.eq(price))
            .execute(&mut conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;
    }

    if let Some(image_url) = req.image_url {
        diesel::update(spare_parts::table.filter(spare_parts::id.eq(id)))
            .set(spare_parts::image_url.eq(Some(image_url)))
            .execute(&mut conn)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Update error: {e}")))?;
    }

    let part: SparePart = spare_parts::table
        .filter(spare_parts::id.eq(id))
        .first(&mut conn)
        .map_err(|_| (StatusCode::NOT_FOUND, "Spare part not found".to_string()))?;

    Ok(Json(part))
}

pub fn configure_asset_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/assets", get(list_assets).post(create_asset))
        .route("/api/assets/:id", get(get_asset).put(update_asset))
        .route("/api/spare-parts", get(list_parts).post(create_part))
        .route("/api/spare-parts/:id", axum::routing::put(update_part))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(stock: i32, min_stock: i32) -> SparePart {
        let now = Utc::now();
        SparePart {
            id: Uuid::new_v4(),
            name: "Compressor valve".to_string(),
            part_number: "CV-100".to_string(),
            stock,
            min_stock,
            price: 120.0,
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_low_stock_boundary() {
        assert!(part(0, 0).is_low_stock());
        assert!(part(3, 3).is_low_stock());
        assert!(part(2, 3).is_low_stock());
        assert!(!part(4, 3).is_low_stock());
    }

    #[test]
    fn test_enum_tables() {
        assert!(ASSET_STATUSES.contains(&"AVAILABLE"));
        assert!(ASSET_STATUSES.contains(&"LOST"));
        assert_eq!(ASSET_STATUSES.len(), 7);
        assert_eq!(ASSET_CONDITIONS.len(), 4);
    }
}
