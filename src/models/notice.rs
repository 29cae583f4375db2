// src/models/notice.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::common::{error::AppError, filters::{parse_optional_id, sanitize_status_value}};
use crate::models::{clean_text, company::CompanyBrief, double_option, sector::SectorBrief};

// Linha da tabela `notices`.
#[derive(Debug, Clone, FromRow)]
pub struct Notice {
    pub id: Uuid,
    pub message: String,
    pub company_id: Uuid,
    pub sector_id: Option<Uuid>,
    pub expires_at: Option<DateTime<Utc>>,
    pub viewed: bool,
    pub importance: Option<String>,
    pub status: Option<i16>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// Payload cru (criação e atualização usam a mesma forma)
// ---
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticePayload {
    pub message: Option<String>,
    #[serde(alias = "company")]
    pub company_id: Option<String>,
    #[serde(alias = "sector")]
    pub sector_id: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub expires_at: Option<Option<DateTime<Utc>>>,
    pub viewed: Option<bool>,
    pub importance: Option<String>,
    pub status: Option<Value>,
}

/// Payload canônico. O setor é sempre materializado: na atualização ele
/// sobrescreve o que existia (ausente limpa), como a API sempre fez.
#[derive(Debug, Clone)]
pub struct NormalizedNotice {
    pub message: Option<String>,
    pub company_id: Option<Uuid>,
    pub sector_id: Option<Uuid>,
    /// Ausente mantém, null limpa, valor substitui.
    pub expires_at: Option<Option<DateTime<Utc>>>,
    pub viewed: Option<bool>,
    pub importance: Option<String>,
    pub status: Option<i16>,
}

impl NormalizedNotice {
    pub fn from_payload(payload: NoticePayload) -> Result<Self, AppError> {
        Ok(Self {
            message: clean_text(payload.message),
            company_id: parse_optional_id(payload.company_id.as_deref())?,
            sector_id: parse_optional_id(payload.sector_id.as_deref())?,
            expires_at: payload.expires_at,
            viewed: payload.viewed,
            importance: clean_text(payload.importance),
            status: sanitize_status_value(payload.status.as_ref()),
        })
    }
}

// ---
// Resposta da API
// ---
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticeResponse {
    pub id: Uuid,
    pub message: String,
    pub company: Option<CompanyBrief>,
    pub sector: Option<SectorBrief>,
    pub expires_at: Option<DateTime<Utc>>,
    pub viewed: bool,
    pub importance: Option<String>,
    pub status: Option<i16>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NoticeResponse {
    pub fn from_row(
        notice: Notice,
        company: Option<CompanyBrief>,
        sector: Option<SectorBrief>,
    ) -> Self {
        Self {
            id: notice.id,
            message: notice.message,
            company,
            sector,
            expires_at: notice.expires_at,
            viewed: notice.viewed,
            importance: notice.importance,
            status: notice.status,
            created_at: notice.created_at,
            updated_at: notice.updated_at,
        }
    }
}
