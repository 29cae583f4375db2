// src/services/notice_service.rs

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::{error::AppError, filters::StatusFilter},
    db::{notice_repo::NoticeListFilter, CompanyRepo, NoticeRepo, SectorRepo},
    models::{
        company::CompanyBrief,
        notice::{NormalizedNotice, Notice, NoticePayload, NoticeResponse},
        sector::SectorBrief,
    },
    services::ReferentialValidator,
};

#[derive(Clone)]
pub struct NoticeService {
    repo: Arc<dyn NoticeRepo>,
    companies: Arc<dyn CompanyRepo>,
    sectors: Arc<dyn SectorRepo>,
    validator: ReferentialValidator,
}

impl NoticeService {
    pub fn new(
        repo: Arc<dyn NoticeRepo>,
        companies: Arc<dyn CompanyRepo>,
        sectors: Arc<dyn SectorRepo>,
        validator: ReferentialValidator,
    ) -> Self {
        Self { repo, companies, sectors, validator }
    }

    pub async fn create(&self, payload: NoticePayload) -> Result<NoticeResponse, AppError> {
        let data = NormalizedNotice::from_payload(payload)?;
        if data.message.is_none() {
            return Err(AppError::MissingFields("O texto do aviso é obrigatório."));
        }
        let company = self.validator.ensure_company_active(data.company_id).await?;
        if let Some(sector_id) = data.sector_id {
            self.validator.ensure_sector_belongs(sector_id, company.id).await?;
        }
        let notice = self.repo.insert(&data).await?;
        let sector = self.sector_brief(notice.sector_id).await?;
        Ok(NoticeResponse::from_row(notice, Some(company.brief()), sector))
    }

    pub async fn list(
        &self,
        company_id: Option<Uuid>,
        sector_id: Option<Uuid>,
        viewed: Option<&str>,
        status: Option<&str>,
    ) -> Result<Vec<NoticeResponse>, AppError> {
        let filter = NoticeListFilter {
            company_id,
            sector_id,
            viewed: viewed.map(|v| v == "true"),
            status: StatusFilter::resolve(status),
        };
        let notices = self.repo.list(&filter).await?;
        self.populate(notices).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<NoticeResponse, AppError> {
        let notice = self.repo.find_by_id(id).await?.ok_or(AppError::NoticeNotFound)?;
        self.respond(notice).await
    }

    pub async fn update(&self, id: Uuid, payload: NoticePayload) -> Result<NoticeResponse, AppError> {
        let data = NormalizedNotice::from_payload(payload)?;
        if data.company_id.is_some() {
            self.validator.ensure_company_active(data.company_id).await?;
        }
        if let Some(sector_id) = data.sector_id {
            // Sem empresa no payload, a consistência é checada contra a
            // empresa gravada no próprio aviso.
            let company_id = match data.company_id {
                Some(company_id) => Some(company_id),
                None => self.repo.find_by_id(id).await?.map(|n| n.company_id),
            };
            let Some(company_id) = company_id else {
                return Err(AppError::NoticeCompanyUnresolved);
            };
            self.validator.ensure_sector_belongs(sector_id, company_id).await?;
        }
        let notice = self
            .repo
            .update(id, &data)
            .await?
            .ok_or(AppError::NoticeNotFound)?;
        self.respond(notice).await
    }

    async fn respond(&self, notice: Notice) -> Result<NoticeResponse, AppError> {
        let company = self.company_brief(notice.company_id).await?;
        let sector = self.sector_brief(notice.sector_id).await?;
        Ok(NoticeResponse::from_row(notice, company, sector))
    }

    async fn company_brief(&self, id: Uuid) -> Result<Option<CompanyBrief>, AppError> {
        Ok(self.companies.find_by_id(id).await?.map(|c| c.brief()))
    }

    async fn sector_brief(&self, id: Option<Uuid>) -> Result<Option<SectorBrief>, AppError> {
        let Some(id) = id else { return Ok(None) };
        Ok(self.sectors.find_by_id(id).await?.map(|s| s.brief()))
    }

    async fn populate(&self, notices: Vec<Notice>) -> Result<Vec<NoticeResponse>, AppError> {
        let mut companies: HashMap<Uuid, Option<CompanyBrief>> = HashMap::new();
        let mut sectors: HashMap<Uuid, Option<SectorBrief>> = HashMap::new();
        let mut responses = Vec::with_capacity(notices.len());
        for notice in notices {
            if !companies.contains_key(&notice.company_id) {
                let brief = self.company_brief(notice.company_id).await?;
                companies.insert(notice.company_id, brief);
            }
            if let Some(sector_id) = notice.sector_id {
                if !sectors.contains_key(&sector_id) {
                    let brief = self.sector_brief(Some(sector_id)).await?;
                    sectors.insert(sector_id, brief);
                }
            }
            let company = companies[&notice.company_id].clone();
            let sector = notice.sector_id.and_then(|id| sectors[&id].clone());
            responses.push(NoticeResponse::from_row(notice, company, sector));
        }
        Ok(responses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::{MemoryCompanyRepo, MemoryNoticeRepo, MemorySectorRepo};
    use crate::models::sector::{NormalizedSector, SectorPayload};
    use serde_json::json;

    fn setup() -> (NoticeService, Arc<MemoryCompanyRepo>, Arc<MemorySectorRepo>) {
        let companies = Arc::new(MemoryCompanyRepo::default());
        let sectors = Arc::new(MemorySectorRepo::default());
        let notices = Arc::new(MemoryNoticeRepo::default());
        let validator = ReferentialValidator::new(companies.clone(), sectors.clone());
        (
            NoticeService::new(notices, companies.clone(), sectors.clone(), validator),
            companies,
            sectors,
        )
    }

    fn payload(value: serde_json::Value) -> NoticePayload {
        serde_json::from_value(value).unwrap()
    }

    async fn seed_sector(sectors: &MemorySectorRepo, company_id: Uuid) -> Uuid {
        let mut data = NormalizedSector::from_payload(SectorPayload {
            name: Some("Compras".into()),
            ..Default::default()
        })
        .unwrap();
        data.company_id = Some(company_id);
        sectors.insert(&data).await.unwrap().id
    }

    #[tokio::test]
    async fn criar_exige_mensagem_antes_da_empresa() {
        let (service, _, _) = setup();
        let result = service.create(payload(json!({}))).await;
        assert!(matches!(result, Err(AppError::MissingFields(_))));
    }

    #[tokio::test]
    async fn criar_exige_empresa_ativa_e_nada_persiste() {
        let (service, companies, _) = setup();
        let inactive = companies.seed("Inativa", "11", 0);

        let result = service
            .create(payload(json!({
                "message": "Aviso", "companyId": inactive.id.to_string()
            })))
            .await;
        assert!(matches!(result, Err(AppError::ReferencedCompanyNotFound)));

        let result = service
            .create(payload(json!({
                "message": "Aviso", "companyId": Uuid::new_v4().to_string()
            })))
            .await;
        assert!(matches!(result, Err(AppError::ReferencedCompanyNotFound)));

        assert!(service.list(None, None, None, Some("all")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn setor_de_outra_empresa_e_rejeitado_antes_da_escrita() {
        let (service, companies, sectors) = setup();
        let dona = companies.seed("Dona", "11", 1);
        let outra = companies.seed("Outra", "22", 1);
        let sector_id = seed_sector(&sectors, dona.id).await;

        let result = service
            .create(payload(json!({
                "message": "Aviso geral",
                "companyId": outra.id.to_string(),
                "sectorId": sector_id.to_string()
            })))
            .await;
        assert!(matches!(result, Err(AppError::SectorCompanyMismatch)));
        assert!(service.list(None, None, None, Some("all")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn criar_valido_popula_empresa_e_setor() {
        let (service, companies, sectors) = setup();
        let company = companies.seed("Acme", "11", 1);
        let sector_id = seed_sector(&sectors, company.id).await;

        let notice = service
            .create(payload(json!({
                "message": "Reunião às 10h",
                "companyId": company.id.to_string(),
                "sectorId": sector_id.to_string(),
                "importance": "alta"
            })))
            .await
            .unwrap();
        assert_eq!(notice.company.unwrap().id, company.id);
        assert_eq!(notice.sector.unwrap().id, sector_id);
        assert!(!notice.viewed);
    }

    #[tokio::test]
    async fn atualizar_setor_sem_empresa_resolve_pela_gravada() {
        let (service, companies, sectors) = setup();
        let company = companies.seed("Acme", "11", 1);
        let sector_id = seed_sector(&sectors, company.id).await;
        let notice = service
            .create(payload(json!({
                "message": "Aviso", "companyId": company.id.to_string()
            })))
            .await
            .unwrap();

        let updated = service
            .update(notice.id, payload(json!({ "sectorId": sector_id.to_string() })))
            .await
            .unwrap();
        assert_eq!(updated.sector.unwrap().id, sector_id);

        // Aviso inexistente: sem empresa para resolver, 400 específico.
        let result = service
            .update(Uuid::new_v4(), payload(json!({ "sectorId": sector_id.to_string() })))
            .await;
        assert!(matches!(result, Err(AppError::NoticeCompanyUnresolved)));
    }

    #[tokio::test]
    async fn atualizar_sem_setor_limpa_a_referencia() {
        let (service, companies, sectors) = setup();
        let company = companies.seed("Acme", "11", 1);
        let sector_id = seed_sector(&sectors, company.id).await;
        let notice = service
            .create(payload(json!({
                "message": "Aviso",
                "companyId": company.id.to_string(),
                "sectorId": sector_id.to_string()
            })))
            .await
            .unwrap();

        let updated = service
            .update(notice.id, payload(json!({ "viewed": true })))
            .await
            .unwrap();
        assert!(updated.sector.is_none());
        assert!(updated.viewed);
    }

    #[tokio::test]
    async fn listagem_filtra_por_visto() {
        let (service, companies, _) = setup();
        let company = companies.seed("Acme", "11", 1);
        service
            .create(payload(json!({ "message": "A", "companyId": company.id.to_string() })))
            .await
            .unwrap();
        let seen = service
            .create(payload(json!({
                "message": "B", "companyId": company.id.to_string(), "viewed": true
            })))
            .await
            .unwrap();

        let viewed = service.list(None, None, Some("true"), None).await.unwrap();
        assert_eq!(viewed.len(), 1);
        assert_eq!(viewed[0].id, seen.id);

        let unviewed = service.list(None, None, Some("false"), None).await.unwrap();
        assert_eq!(unviewed.len(), 1);
    }
}
