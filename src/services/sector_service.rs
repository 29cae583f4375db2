// src/services/sector_service.rs

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::{error::AppError, filters::StatusFilter},
    db::{sector_repo::SectorListFilter, CompanyRepo, SectorRepo},
    models::{
        company::CompanyBrief,
        sector::{NormalizedSector, Sector, SectorPayload, SectorResponse},
    },
    services::ReferentialValidator,
};

#[derive(Clone)]
pub struct SectorService {
    repo: Arc<dyn SectorRepo>,
    companies: Arc<dyn CompanyRepo>,
    validator: ReferentialValidator,
}

impl SectorService {
    pub fn new(
        repo: Arc<dyn SectorRepo>,
        companies: Arc<dyn CompanyRepo>,
        validator: ReferentialValidator,
    ) -> Self {
        Self { repo, companies, validator }
    }

    pub async fn create(&self, payload: SectorPayload) -> Result<SectorResponse, AppError> {
        let data = NormalizedSector::from_payload(payload)?;
        let company = self.validator.ensure_company_active(data.company_id).await?;
        if data.name.is_none() {
            return Err(AppError::MissingFields("Nome do setor é obrigatório."));
        }
        let sector = self.repo.insert(&data).await?;
        Ok(SectorResponse::from_row(sector, Some(company.brief())))
    }

    pub async fn list(
        &self,
        company_id: Option<Uuid>,
        status: Option<&str>,
    ) -> Result<Vec<SectorResponse>, AppError> {
        let filter = SectorListFilter {
            company_id,
            status: StatusFilter::resolve(status),
        };
        let sectors = self.repo.list(&filter).await?;
        self.populate(sectors).await
    }

    /// Variante da rota aninhada: valida a empresa antes de listar.
    pub async fn list_by_company(&self, company_id: Uuid) -> Result<Vec<SectorResponse>, AppError> {
        self.validator.ensure_company_active(Some(company_id)).await?;
        let filter = SectorListFilter {
            company_id: Some(company_id),
            status: StatusFilter::ActiveOrUnset,
        };
        let sectors = self.repo.list(&filter).await?;
        self.populate(sectors).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<SectorResponse, AppError> {
        let sector = self.repo.find_by_id(id).await?.ok_or(AppError::SectorNotFound)?;
        let company = self.company_brief(sector.company_id).await?;
        Ok(SectorResponse::from_row(sector, company))
    }

    pub async fn update(&self, id: Uuid, payload: SectorPayload) -> Result<SectorResponse, AppError> {
        let data = NormalizedSector::from_payload(payload)?;
        if data.company_id.is_some() {
            self.validator.ensure_company_active(data.company_id).await?;
        }
        let sector = self
            .repo
            .update(id, &data)
            .await?
            .ok_or(AppError::SectorNotFound)?;
        let company = self.company_brief(sector.company_id).await?;
        Ok(SectorResponse::from_row(sector, company))
    }

    async fn company_brief(&self, id: Uuid) -> Result<Option<CompanyBrief>, AppError> {
        Ok(self.companies.find_by_id(id).await?.map(|c| c.brief()))
    }

    async fn populate(&self, sectors: Vec<Sector>) -> Result<Vec<SectorResponse>, AppError> {
        let mut briefs: HashMap<Uuid, Option<CompanyBrief>> = HashMap::new();
        let mut responses = Vec::with_capacity(sectors.len());
        for sector in sectors {
            if !briefs.contains_key(&sector.company_id) {
                let brief = self.company_brief(sector.company_id).await?;
                briefs.insert(sector.company_id, brief);
            }
            let company = briefs[&sector.company_id].clone();
            responses.push(SectorResponse::from_row(sector, company));
        }
        Ok(responses)
    }
}
