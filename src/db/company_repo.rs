// src/db/company_repo.rs

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{error::AppError, filters::{escape_like, StatusFilter}},
    models::company::{Company, NormalizedCompany},
};

#[derive(Debug, Default)]
pub struct CompanyListFilter {
    pub status: StatusFilter,
    pub search: Option<String>,
    pub is_matrix: Option<bool>,
}

/// Acesso à tabela de empresas. Trait para que os serviços recebam a
/// implementação por injeção e os testes usem a versão em memória.
#[async_trait]
pub trait CompanyRepo: Send + Sync {
    /// Insere; o serviço garante nome e CNPJ presentes antes de chamar.
    async fn insert(&self, data: &NormalizedCompany) -> Result<Company, AppError>;
    async fn list(&self, filter: &CompanyListFilter) -> Result<Vec<Company>, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Company>, AppError>;
    /// Só enxerga registros ativos ou sem status (cláusula de compatibilidade).
    async fn find_active_by_id(&self, id: Uuid) -> Result<Option<Company>, AppError>;
    async fn update(&self, id: Uuid, data: &NormalizedCompany) -> Result<Option<Company>, AppError>;
}

#[derive(Clone)]
pub struct PgCompanyRepo {
    pool: PgPool,
}

impl PgCompanyRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompanyRepo for PgCompanyRepo {
    async fn insert(&self, data: &NormalizedCompany) -> Result<Company, AppError> {
        sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies
                (name, legal_name, cnpj, state_registration, municipal_registration,
                 activity, phones, emails, matrix_company_id, matrix_company_name, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(data.name.as_deref())
        .bind(data.legal_name.as_deref())
        .bind(data.cnpj.as_deref())
        .bind(data.state_registration.as_deref())
        .bind(data.municipal_registration.as_deref())
        .bind(data.activity.as_deref())
        .bind(&data.phones)
        .bind(&data.emails)
        .bind(data.matrix.as_ref().and_then(|m| m.id))
        .bind(data.matrix.as_ref().and_then(|m| m.name.as_deref()))
        .bind(data.status.unwrap_or(1))
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)
    }

    async fn list(&self, filter: &CompanyListFilter) -> Result<Vec<Company>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM companies WHERE 1 = 1");

        if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", escape_like(term));
            qb.push(" AND (name ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR legal_name ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR cnpj ILIKE ");
            qb.push_bind(pattern);
            qb.push(")");
        }

        match filter.is_matrix {
            Some(true) => {
                qb.push(" AND matrix_company_id IS NULL");
            }
            Some(false) => {
                qb.push(" AND matrix_company_id IS NOT NULL");
            }
            None => {}
        }

        filter.status.push_sql(&mut qb);
        qb.push(" ORDER BY created_at");

        let companies = qb.build_query_as::<Company>().fetch_all(&self.pool).await?;
        Ok(companies)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Company>, AppError> {
        let company = sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(company)
    }

    async fn find_active_by_id(&self, id: Uuid) -> Result<Option<Company>, AppError> {
        let company = sqlx::query_as::<_, Company>(
            "SELECT * FROM companies WHERE id = $1 AND (status = 1 OR status IS NULL)",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(company)
    }

    async fn update(&self, id: Uuid, data: &NormalizedCompany) -> Result<Option<Company>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE companies SET updated_at = now()");

        if let Some(name) = &data.name {
            qb.push(", name = ");
            qb.push_bind(name);
        }
        if let Some(legal_name) = &data.legal_name {
            qb.push(", legal_name = ");
            qb.push_bind(legal_name);
        }
        if let Some(cnpj) = &data.cnpj {
            qb.push(", cnpj = ");
            qb.push_bind(cnpj);
        }
        if let Some(value) = &data.state_registration {
            qb.push(", state_registration = ");
            qb.push_bind(value);
        }
        if let Some(value) = &data.municipal_registration {
            qb.push(", municipal_registration = ");
            qb.push_bind(value);
        }
        if let Some(activity) = &data.activity {
            qb.push(", activity = ");
            qb.push_bind(activity);
        }

        // Listas e referência de matriz sobrescrevem sempre.
        qb.push(", phones = ");
        qb.push_bind(&data.phones);
        qb.push(", emails = ");
        qb.push_bind(&data.emails);
        qb.push(", matrix_company_id = ");
        qb.push_bind(data.matrix.as_ref().and_then(|m| m.id));
        qb.push(", matrix_company_name = ");
        qb.push_bind(data.matrix.as_ref().and_then(|m| m.name.clone()));

        if let Some(status) = data.status {
            qb.push(", status = ");
            qb.push_bind(status);
        }

        qb.push(" WHERE id = ");
        qb.push_bind(id);
        qb.push(" RETURNING *");

        qb.build_query_as::<Company>()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_unique_violation)
    }
}

fn map_unique_violation(e: sqlx::Error) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return match db_err.constraint() {
                // O índice criado na migration
                Some("companies_cnpj_key") | None => AppError::CnpjAlreadyExists,

                // Fallback (caso outras chaves únicas apareçam no futuro)
                Some(constraint) => AppError::UniqueConstraintViolation(constraint.to_string()),
            };
        }
    }
    e.into()
}
