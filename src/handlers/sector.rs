// src/handlers/sector.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    common::{error::AppError, filters::parse_optional_id},
    config::AppState,
    models::sector::SectorPayload,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorListQuery {
    pub company_id: Option<String>,
    pub status: Option<String>,
}

// POST /api/sectors
pub async fn create_sector(
    State(app_state): State<AppState>,
    Json(payload): Json<SectorPayload>,
) -> Result<impl IntoResponse, AppError> {
    let sector = app_state.sector_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(sector)))
}

// GET /api/sectors
pub async fn list_sectors(
    State(app_state): State<AppState>,
    Query(query): Query<SectorListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let company_id = parse_optional_id(query.company_id.as_deref())?;
    let sectors = app_state
        .sector_service
        .list(company_id, query.status.as_deref())
        .await?;
    Ok(Json(sectors))
}

// GET /api/sectors/{id}
pub async fn get_sector_by_id(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let sector = app_state.sector_service.get_by_id(id).await?;
    Ok(Json(sector))
}

// PUT /api/sectors/{id}
pub async fn update_sector(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SectorPayload>,
) -> Result<impl IntoResponse, AppError> {
    let sector = app_state.sector_service.update(id, payload).await?;
    Ok(Json(sector))
}
