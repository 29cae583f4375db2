// src/handlers/auth.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, filters::parse_optional_id},
    config::AppState,
    models::pessoa::{LoginPayload, RegisterPessoaPayload, UpdatePessoaPayload},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PessoaListQuery {
    pub company_id: Option<String>,
    pub branch_id: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub q: Option<String>,
}

// POST /api/auth/pessoas
pub async fn create_pessoa(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterPessoaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let pessoa = app_state.pessoa_service.register(payload).await?;
    Ok((StatusCode::CREATED, Json(pessoa)))
}

// GET /api/auth/pessoas
pub async fn list_pessoas(
    State(app_state): State<AppState>,
    Query(query): Query<PessoaListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let company_id = parse_optional_id(query.company_id.as_deref())?;
    let branch_id = parse_optional_id(query.branch_id.as_deref())?;
    let search = query.search.or(query.q);
    let pessoas = app_state
        .pessoa_service
        .list(company_id, branch_id, query.status.as_deref(), search)
        .await?;
    Ok(Json(pessoas))
}

// GET /api/auth/pessoa/{id}
pub async fn get_pessoa_by_id(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let pessoa = app_state.pessoa_service.get_by_id(id).await?;
    Ok(Json(pessoa))
}

// PUT /api/auth/pessoa/{id}
pub async fn update_pessoa(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePessoaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let pessoa = app_state.pessoa_service.update(id, payload).await?;
    Ok(Json(pessoa))
}

// POST /api/auth/login/{companyId}
pub async fn login(
    State(app_state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse, AppError> {
    let confirmation = app_state.pessoa_service.login(company_id, payload).await?;
    Ok(Json(confirmation))
}
