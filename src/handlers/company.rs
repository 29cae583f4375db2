// src/handlers/company.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{common::error::AppError, config::AppState, models::company::CompanyPayload};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyListQuery {
    pub status: Option<String>,
    pub search: Option<String>,
    pub q: Option<String>,
    pub is_matrix: Option<String>,
    pub matrix_only: Option<String>,
}

// POST /api/companies
pub async fn create_company(
    State(app_state): State<AppState>,
    Json(payload): Json<CompanyPayload>,
) -> Result<impl IntoResponse, AppError> {
    let company = app_state.company_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(company)))
}

// GET /api/companies
pub async fn list_companies(
    State(app_state): State<AppState>,
    Query(query): Query<CompanyListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let search = query.search.or(query.q);
    let matrix = query.is_matrix.or(query.matrix_only);
    let companies = app_state
        .company_service
        .list(query.status.as_deref(), search, matrix.as_deref())
        .await?;
    Ok(Json(companies))
}

// GET /api/companies/{id}
pub async fn get_company_by_id(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let company = app_state.company_service.get_by_id(id).await?;
    Ok(Json(company))
}

// PUT /api/companies/{id}
pub async fn update_company(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CompanyPayload>,
) -> Result<impl IntoResponse, AppError> {
    let company = app_state.company_service.update(id, payload).await?;
    Ok(Json(company))
}

// GET /api/companies/{id}/sectors
pub async fn list_company_sectors(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let sectors = app_state.sector_service.list_by_company(id).await?;
    Ok(Json(sectors))
}
