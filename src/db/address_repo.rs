// src/db/address_repo.rs

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{error::AppError, filters::StatusFilter},
    models::address::{Address, NormalizedAddress},
};

#[derive(Debug, Default)]
pub struct AddressListFilter {
    pub company_id: Option<Uuid>,
    pub status: StatusFilter,
}

#[async_trait]
pub trait AddressRepo: Send + Sync {
    /// Insere; o serviço garante os campos obrigatórios antes de chamar.
    async fn insert(&self, data: &NormalizedAddress) -> Result<Address, AppError>;
    async fn list(&self, filter: &AddressListFilter) -> Result<Vec<Address>, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Address>, AppError>;
    async fn update(&self, id: Uuid, data: &NormalizedAddress) -> Result<Option<Address>, AppError>;
}

#[derive(Clone)]
pub struct PgAddressRepo {
    pool: PgPool,
}

impl PgAddressRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AddressRepo for PgAddressRepo {
    async fn insert(&self, data: &NormalizedAddress) -> Result<Address, AppError> {
        let address = sqlx::query_as::<_, Address>(
            r#"
            INSERT INTO addresses
                (street, number, cep, complement, city, state, district, company_id, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(data.street.as_deref())
        .bind(data.number.as_deref())
        .bind(data.cep.as_deref())
        .bind(data.complement.clone().flatten())
        .bind(data.city.as_deref())
        .bind(data.state.as_deref())
        .bind(data.district.as_deref())
        .bind(data.company_id)
        .bind(data.status.unwrap_or(1))
        .fetch_one(&self.pool)
        .await?;
        Ok(address)
    }

    async fn list(&self, filter: &AddressListFilter) -> Result<Vec<Address>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM addresses WHERE 1 = 1");

        if let Some(company_id) = filter.company_id {
            qb.push(" AND company_id = ");
            qb.push_bind(company_id);
        }

        filter.status.push_sql(&mut qb);
        qb.push(" ORDER BY created_at");

        let addresses = qb.build_query_as::<Address>().fetch_all(&self.pool).await?;
        Ok(addresses)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Address>, AppError> {
        let address = sqlx::query_as::<_, Address>("SELECT * FROM addresses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(address)
    }

    async fn update(&self, id: Uuid, data: &NormalizedAddress) -> Result<Option<Address>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE addresses SET updated_at = now()");

        if let Some(street) = &data.street {
            qb.push(", street = ");
            qb.push_bind(street);
        }
        if let Some(number) = &data.number {
            qb.push(", number = ");
            qb.push_bind(number);
        }
        if let Some(cep) = &data.cep {
            qb.push(", cep = ");
            qb.push_bind(cep);
        }
        if let Some(complement) = &data.complement {
            qb.push(", complement = ");
            qb.push_bind(complement.clone());
        }
        if let Some(city) = &data.city {
            qb.push(", city = ");
            qb.push_bind(city);
        }
        if let Some(state) = &data.state {
            qb.push(", state = ");
            qb.push_bind(state);
        }
        if let Some(district) = &data.district {
            qb.push(", district = ");
            qb.push_bind(district);
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

        let address = qb.build_query_as::<Address>().fetch_optional(&self.pool).await?;
        Ok(address)
    }
}
