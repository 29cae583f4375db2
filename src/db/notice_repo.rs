// src/db/notice_repo.rs

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{error::AppError, filters::StatusFilter},
    models::notice::{NormalizedNotice, Notice},
};

#[derive(Debug, Default)]
pub struct NoticeListFilter {
    pub company_id: Option<Uuid>,
    pub sector_id: Option<Uuid>,
    pub viewed: Option<bool>,
    pub status: StatusFilter,
}

#[async_trait]
pub trait NoticeRepo: Send + Sync {
    /// Insere; o serviço garante mensagem e empresa presentes antes de chamar.
    async fn insert(&self, data: &NormalizedNotice) -> Result<Notice, AppError>;
    async fn list(&self, filter: &NoticeListFilter) -> Result<Vec<Notice>, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Notice>, AppError>;
    async fn update(&self, id: Uuid, data: &NormalizedNotice) -> Result<Option<Notice>, AppError>;
}

#[derive(Clone)]
pub struct PgNoticeRepo {
    pool: PgPool,
}

impl PgNoticeRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NoticeRepo for PgNoticeRepo {
    async fn insert(&self, data: &NormalizedNotice) -> Result<Notice, AppError> {
        let notice = sqlx::query_as::<_, Notice>(
            r#"
            INSERT INTO notices
                (message, company_id, sector_id, expires_at, viewed, importance, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(data.message.as_deref())
        .bind(data.company_id)
        .bind(data.sector_id)
        .bind(data.expires_at.flatten())
        .bind(data.viewed.unwrap_or(false))
        .bind(data.importance.as_deref())
        .bind(data.status.unwrap_or(1))
        .fetch_one(&self.pool)
        .await?;
        Ok(notice)
    }

    async fn list(&self, filter: &NoticeListFilter) -> Result<Vec<Notice>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM notices WHERE 1 = 1");

        if let Some(company_id) = filter.company_id {
            qb.push(" AND company_id = ");
            qb.push_bind(company_id);
        }
        if let Some(sector_id) = filter.sector_id {
            qb.push(" AND sector_id = ");
            qb.push_bind(sector_id);
        }
        if let Some(viewed) = filter.viewed {
            qb.push(" AND viewed = ");
            qb.push_bind(viewed);
        }

        filter.status.push_sql(&mut qb);
        qb.push(" ORDER BY created_at");

        let notices = qb.build_query_as::<Notice>().fetch_all(&self.pool).await?;
        Ok(notices)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Notice>, AppError> {
        let notice = sqlx::query_as::<_, Notice>("SELECT * FROM notices WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(notice)
    }

    async fn update(&self, id: Uuid, data: &NormalizedNotice) -> Result<Option<Notice>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE notices SET updated_at = now()");

        if let Some(message) = &data.message {
            qb.push(", message = ");
            qb.push_bind(message);
        }
        if let Some(company_id) = data.company_id {
            qb.push(", company_id = ");
            qb.push_bind(company_id);
        }

        // O setor sobrescreve sempre: ausente no payload limpa a referência.
        qb.push(", sector_id = ");
        qb.push_bind(data.sector_id);

        if let Some(expires_at) = data.expires_at {
            qb.push(", expires_at = ");
            qb.push_bind(expires_at);
        }
        if let Some(viewed) = data.viewed {
            qb.push(", viewed = ");
            qb.push_bind(viewed);
        }
        if let Some(importance) = &data.importance {
            qb.push(", importance = ");
            qb.push_bind(importance);
        }
        if let Some(status) = data.status {
            qb.push(", status = ");
            qb.push_bind(status);
        }

        qb.push(" WHERE id = ");
        qb.push_bind(id);
        qb.push(" RETURNING *");

        let notice = qb.build_query_as::<Notice>().fetch_optional(&self.pool).await?;
        Ok(notice)
    }
}
