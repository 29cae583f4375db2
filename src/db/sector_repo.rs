// src/db/sector_repo.rs

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{error::AppError, filters::StatusFilter},
    models::sector::{NormalizedSector, PersonRef, Sector},
};

#[derive(Debug, Default)]
pub struct SectorListFilter {
    pub company_id: Option<Uuid>,
    pub status: StatusFilter,
}

#[async_trait]
pub trait SectorRepo: Send + Sync {
    /// Insere; o serviço garante nome e empresa presentes antes de chamar.
    async fn insert(&self, data: &NormalizedSector) -> Result<Sector, AppError>;
    async fn list(&self, filter: &SectorListFilter) -> Result<Vec<Sector>, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Sector>, AppError>;
    async fn find_active_by_id(&self, id: Uuid) -> Result<Option<Sector>, AppError>;
    async fn update(&self, id: Uuid, data: &NormalizedSector) -> Result<Option<Sector>, AppError>;
}

#[derive(Clone)]
pub struct PgSectorRepo {
    pool: PgPool,
}

impl PgSectorRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SectorRepo for PgSectorRepo {
    async fn insert(&self, data: &NormalizedSector) -> Result<Sector, AppError> {
        let technical_manager = data.technical_manager.clone().flatten();
        let responsible = data.responsible.clone().flatten();
        let manager = data.manager.clone().flatten();

        let sector = sqlx::query_as::<_, Sector>(
            r#"
            INSERT INTO sectors
                (name, technical_manager_id, technical_manager_name,
                 responsible_id, responsible_name, manager_id, manager_name,
                 phone, email, address, sector_type, description, company_id, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(data.name.as_deref())
        .bind(ref_id(&technical_manager))
        .bind(ref_nome(&technical_manager))
        .bind(ref_id(&responsible))
        .bind(ref_nome(&responsible))
        .bind(ref_id(&manager))
        .bind(ref_nome(&manager))
        .bind(data.phone.as_deref())
        .bind(data.email.as_deref())
        .bind(data.address.as_deref())
        .bind(data.sector_type.as_deref())
        .bind(data.description.as_deref())
        .bind(data.company_id)
        .bind(data.status.unwrap_or(1))
        .fetch_one(&self.pool)
        .await?;
        Ok(sector)
    }

    async fn list(&self, filter: &SectorListFilter) -> Result<Vec<Sector>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM sectors WHERE 1 = 1");

        if let Some(company_id) = filter.company_id {
            qb.push(" AND company_id = ");
            qb.push_bind(company_id);
        }

        filter.status.push_sql(&mut qb);
        qb.push(" ORDER BY created_at");

        let sectors = qb.build_query_as::<Sector>().fetch_all(&self.pool).await?;
        Ok(sectors)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Sector>, AppError> {
        let sector = sqlx::query_as::<_, Sector>("SELECT * FROM sectors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(sector)
    }

    async fn find_active_by_id(&self, id: Uuid) -> Result<Option<Sector>, AppError> {
        let sector = sqlx::query_as::<_, Sector>(
            "SELECT * FROM sectors WHERE id = $1 AND (status = 1 OR status IS NULL)",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(sector)
    }

    async fn update(&self, id: Uuid, data: &NormalizedSector) -> Result<Option<Sector>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE sectors SET updated_at = now()");

        if let Some(name) = &data.name {
            qb.push(", name = ");
            qb.push_bind(name);
        }
        push_person(&mut qb, "technical_manager", &data.technical_manager);
        push_person(&mut qb, "responsible", &data.responsible);
        push_person(&mut qb, "manager", &data.manager);
        if let Some(phone) = &data.phone {
            qb.push(", phone = ");
            qb.push_bind(phone);
        }
        if let Some(email) = &data.email {
            qb.push(", email = ");
            qb.push_bind(email);
        }
        if let Some(address) = &data.address {
            qb.push(", address = ");
            qb.push_bind(address);
        }
        if let Some(sector_type) = &data.sector_type {
            qb.push(", sector_type = ");
            qb.push_bind(sector_type);
        }
        if let Some(description) = &data.description {
            qb.push(", description = ");
            qb.push_bind(description);
        }
        if let Some(company_id) = data.company_id {
            qb.push(", company_id = ");
            qb.push_bind(company_id);
        }
        if let Some(status) = data.status {
            qb.push(", status = ");
            qb.push_bind(status);
        }

        qb.push(" WHERE id = ");
        qb.push_bind(id);
        qb.push(" RETURNING *");

        let sector = qb.build_query_as::<Sector>().fetch_optional(&self.pool).await?;
        Ok(sector)
    }
}

fn ref_id(person: &Option<PersonRef>) -> Option<Uuid> {
    person.as_ref().and_then(|p| p.id)
}

fn ref_nome(person: &Option<PersonRef>) -> Option<String> {
    person.as_ref().and_then(|p| p.nome.clone())
}

// Só toca nas duas colunas do par quando o campo veio no payload.
fn push_person(
    qb: &mut QueryBuilder<'_, Postgres>,
    column_prefix: &str,
    field: &Option<Option<PersonRef>>,
) {
    if let Some(person) = field {
        qb.push(format!(", {column_prefix}_id = "));
        qb.push_bind(ref_id(person));
        qb.push(format!(", {column_prefix}_name = "));
        qb.push_bind(ref_nome(person));
    }
}
