// src/db/pessoa_repo.rs

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{error::AppError, filters::{escape_like, StatusFilter}},
    models::pessoa::{NewPessoa, Pessoa, PessoaUpdate},
};

#[derive(Debug, Default)]
pub struct PessoaListFilter {
    pub company_id: Option<Uuid>,
    /// Presente quando o cliente filtrou por filial; o valor interno já
    /// normalizado (None = registros da própria matriz).
    pub branch: Option<Option<Uuid>>,
    pub status: StatusFilter,
    pub search: Option<String>,
}

#[async_trait]
pub trait PessoaRepo: Send + Sync {
    /// Insere com status ativo; violação da tupla única vira Conflict.
    async fn insert(&self, data: &NewPessoa) -> Result<Pessoa, AppError>;
    async fn list(&self, filter: &PessoaListFilter) -> Result<Vec<Pessoa>, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Pessoa>, AppError>;
    async fn find_active_by_id(&self, id: Uuid) -> Result<Option<Pessoa>, AppError>;
    /// Busca exata de login: email + empresa + filial, ativos apenas.
    async fn find_active_by_login(
        &self,
        email: &str,
        company_id: Uuid,
        branch_id: Option<Uuid>,
    ) -> Result<Option<Pessoa>, AppError>;
    async fn update(&self, id: Uuid, data: &PessoaUpdate) -> Result<Option<Pessoa>, AppError>;
}

#[derive(Clone)]
pub struct PgPessoaRepo {
    pool: PgPool,
}

impl PgPessoaRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PessoaRepo for PgPessoaRepo {
    async fn insert(&self, data: &NewPessoa) -> Result<Pessoa, AppError> {
        sqlx::query_as::<_, Pessoa>(
            r#"
            INSERT INTO pessoas
                (nome, cargo, telefone, email, password_hash, company_id, branch_id, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 1)
            RETURNING *
            "#,
        )
        .bind(&data.nome)
        .bind(data.cargo.as_deref())
        .bind(data.telefone.as_deref())
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(data.company_id)
        .bind(data.branch_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)
    }

    async fn list(&self, filter: &PessoaListFilter) -> Result<Vec<Pessoa>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM pessoas WHERE 1 = 1");

        if let Some(company_id) = filter.company_id {
            qb.push(" AND company_id = ");
            qb.push_bind(company_id);
        }

        match filter.branch {
            Some(Some(branch_id)) => {
                qb.push(" AND branch_id = ");
                qb.push_bind(branch_id);
            }
            Some(None) => {
                qb.push(" AND branch_id IS NULL");
            }
            None => {}
        }

        if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", escape_like(term));
            qb.push(" AND (nome ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR email ILIKE ");
            qb.push_bind(pattern);
            qb.push(")");
        }

        filter.status.push_sql(&mut qb);
        qb.push(" ORDER BY created_at");

        let pessoas = qb.build_query_as::<Pessoa>().fetch_all(&self.pool).await?;
        Ok(pessoas)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Pessoa>, AppError> {
        let pessoa = sqlx::query_as::<_, Pessoa>("SELECT * FROM pessoas WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(pessoa)
    }

    async fn find_active_by_id(&self, id: Uuid) -> Result<Option<Pessoa>, AppError> {
        let pessoa = sqlx::query_as::<_, Pessoa>(
            "SELECT * FROM pessoas WHERE id = $1 AND (status = 1 OR status IS NULL)",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(pessoa)
    }

    async fn find_active_by_login(
        &self,
        email: &str,
        company_id: Uuid,
        branch_id: Option<Uuid>,
    ) -> Result<Option<Pessoa>, AppError> {
        let pessoa = sqlx::query_as::<_, Pessoa>(
            r#"
            SELECT * FROM pessoas
            WHERE email = $1
              AND company_id = $2
              AND branch_id IS NOT DISTINCT FROM $3
              AND (status = 1 OR status IS NULL)
            "#,
        )
        .bind(email)
        .bind(company_id)
        .bind(branch_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(pessoa)
    }

    async fn update(&self, id: Uuid, data: &PessoaUpdate) -> Result<Option<Pessoa>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE pessoas SET updated_at = now()");

        if let Some(nome) = &data.nome {
            qb.push(", nome = ");
            qb.push_bind(nome);
        }
        if let Some(cargo) = &data.cargo {
            qb.push(", cargo = ");
            qb.push_bind(cargo);
        }
        if let Some(telefone) = &data.telefone {
            qb.push(", telefone = ");
            qb.push_bind(telefone);
        }
        if let Some(email) = &data.email {
            qb.push(", email = ");
            qb.push_bind(email);
        }
        if let Some(password_hash) = &data.password_hash {
            qb.push(", password_hash = ");
            qb.push_bind(password_hash);
        }
        if let Some(company_id) = data.company_id {
            qb.push(", company_id = ");
            qb.push_bind(company_id);
        }
        if let Some(branch_id) = data.branch_id {
            qb.push(", branch_id = ");
            qb.push_bind(branch_id);
        }
        if let Some(status) = data.status {
            qb.push(", status = ");
            qb.push_bind(status);
        }

        qb.push(" WHERE id = ");
        qb.push_bind(id);
        qb.push(" RETURNING *");

        qb.build_query_as::<Pessoa>()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_unique_violation)
    }
}

fn map_unique_violation(e: sqlx::Error) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return match db_err.constraint() {
                // O índice da tupla email/empresa/filial/status da migration
                Some("pessoas_email_company_branch_status_key") | None => {
                    AppError::LoginAlreadyExists
                }
                Some(constraint) => AppError::UniqueConstraintViolation(constraint.to_string()),
            };
        }
    }
    e.into()
}
