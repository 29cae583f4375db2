// src/handlers/notice.rs

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
    models::notice::NoticePayload,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticeListQuery {
    pub company_id: Option<String>,
    pub sector_id: Option<String>,
    pub viewed: Option<String>,
    pub status: Option<String>,
}

// POST /api/notices
pub async fn create_notice(
    State(app_state): State<AppState>,
    Json(payload): Json<NoticePayload>,
) -> Result<impl IntoResponse, AppError> {
    let notice = app_state.notice_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(notice)))
}

// GET /api/notices
pub async fn list_notices(
    State(app_state): State<AppState>,
    Query(query): Query<NoticeListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let company_id = parse_optional_id(query.company_id.as_deref())?;
    let sector_id = parse_optional_id(query.sector_id.as_deref())?;
    let notices = app_state
        .notice_service
        .list(company_id, sector_id, query.viewed.as_deref(), query.status.as_deref())
        .await?;
    Ok(Json(notices))
}

// GET /api/notices/{id}
pub async fn get_notice_by_id(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let notice = app_state.notice_service.get_by_id(id).await?;
    Ok(Json(notice))
}

// PUT /api/notices/{id}
pub async fn update_notice(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<NoticePayload>,
) -> Result<impl IntoResponse, AppError> {
    let notice = app_state.notice_service.update(id, payload).await?;
    Ok(Json(notice))
}
