// src/handlers/address.rs

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
    models::address::AddressPayload,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressListQuery {
    pub company_id: Option<String>,
    pub status: Option<String>,
}

// POST /api/addresses
pub async fn create_address(
    State(app_state): State<AppState>,
    Json(payload): Json<AddressPayload>,
) -> Result<impl IntoResponse, AppError> {
    let address = app_state.address_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(address)))
}

// GET /api/addresses
pub async fn list_addresses(
    State(app_state): State<AppState>,
    Query(query): Query<AddressListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let company_id = parse_optional_id(query.company_id.as_deref())?;
    let addresses = app_state
        .address_service
        .list(company_id, query.status.as_deref())
        .await?;
    Ok(Json(addresses))
}

// GET /api/addresses/{id}
pub async fn get_address_by_id(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let address = app_state.address_service.get_by_id(id).await?;
    Ok(Json(address))
}

// PUT /api/addresses/{id}
pub async fn update_address(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddressPayload>,
) -> Result<impl IntoResponse, AppError> {
    let address = app_state.address_service.update(id, payload).await?;
    Ok(Json(address))
}
