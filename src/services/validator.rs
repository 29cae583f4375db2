// src/services/validator.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::{error::AppError, filters::normalize_branch},
    db::{CompanyRepo, SectorRepo},
    models::{company::Company, sector::Sector},
};

/// Checagens referenciais feitas antes de qualquer escrita. A primeira que
/// falhar interrompe a operação e é o único erro reportado.
#[derive(Clone)]
pub struct ReferentialValidator {
    companies: Arc<dyn CompanyRepo>,
    sectors: Arc<dyn SectorRepo>,
}

impl ReferentialValidator {
    pub fn new(companies: Arc<dyn CompanyRepo>, sectors: Arc<dyn SectorRepo>) -> Self {
        Self { companies, sectors }
    }

    /// Empresa obrigatória e ativa (ou sem status, para registros antigos).
    pub async fn ensure_company_active(&self, id: Option<Uuid>) -> Result<Company, AppError> {
        let id = id.ok_or(AppError::MissingFields("O ID da empresa é obrigatório."))?;
        self.companies
            .find_active_by_id(id)
            .await?
            .ok_or(AppError::ReferencedCompanyNotFound)
    }

    /// Filial ausente ou igual à empresa significa "a própria matriz":
    /// volta None sem consultar nada. Qualquer outra exige empresa ativa.
    pub async fn ensure_branch_active(
        &self,
        company_id: Uuid,
        branch_id: Option<Uuid>,
    ) -> Result<Option<Company>, AppError> {
        let Some(branch_id) = normalize_branch(company_id, branch_id) else {
            return Ok(None);
        };
        self.companies
            .find_active_by_id(branch_id)
            .await?
            .map(Some)
            .ok_or(AppError::ReferencedBranchNotFound)
    }

    /// Setor ativo e pertencente à empresa esperada. Pertencer a outra
    /// empresa é um erro distinto de "não encontrado".
    pub async fn ensure_sector_belongs(
        &self,
        sector_id: Uuid,
        company_id: Uuid,
    ) -> Result<Sector, AppError> {
        let sector = self
            .sectors
            .find_active_by_id(sector_id)
            .await?
            .ok_or(AppError::ReferencedSectorNotFound)?;
        if sector.company_id != company_id {
            return Err(AppError::SectorCompanyMismatch);
        }
        Ok(sector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::{MemoryCompanyRepo, MemorySectorRepo};
    use crate::models::sector::{NormalizedSector, SectorPayload};

    fn setup() -> (ReferentialValidator, Arc<MemoryCompanyRepo>, Arc<MemorySectorRepo>) {
        let companies = Arc::new(MemoryCompanyRepo::default());
        let sectors = Arc::new(MemorySectorRepo::default());
        let validator = ReferentialValidator::new(companies.clone(), sectors.clone());
        (validator, companies, sectors)
    }

    async fn seed_sector(sectors: &MemorySectorRepo, company_id: Uuid) -> Sector {
        let mut data = NormalizedSector::from_payload(SectorPayload {
            name: Some("Almoxarifado".into()),
            ..Default::default()
        })
        .unwrap();
        data.company_id = Some(company_id);
        sectors.insert(&data).await.unwrap()
    }

    #[tokio::test]
    async fn empresa_ausente_e_requisicao_invalida() {
        let (validator, _, _) = setup();
        assert!(matches!(
            validator.ensure_company_active(None).await,
            Err(AppError::MissingFields(_))
        ));
    }

    #[tokio::test]
    async fn empresa_inativa_nao_passa() {
        let (validator, companies, _) = setup();
        let company = companies.seed("Acme", "11", 0);
        assert!(matches!(
            validator.ensure_company_active(Some(company.id)).await,
            Err(AppError::ReferencedCompanyNotFound)
        ));
    }

    #[tokio::test]
    async fn filial_igual_a_empresa_resolve_para_matriz() {
        let (validator, companies, _) = setup();
        let company = companies.seed("Acme", "11", 1);
        let branch = validator
            .ensure_branch_active(company.id, Some(company.id))
            .await
            .unwrap();
        assert!(branch.is_none());

        let branch = validator.ensure_branch_active(company.id, None).await.unwrap();
        assert!(branch.is_none());
    }

    #[tokio::test]
    async fn filial_distinta_precisa_estar_ativa() {
        let (validator, companies, _) = setup();
        let company = companies.seed("Matriz", "11", 1);
        let filial = companies.seed("Filial", "22", 1);

        let found = validator
            .ensure_branch_active(company.id, Some(filial.id))
            .await
            .unwrap();
        assert_eq!(found.map(|c| c.id), Some(filial.id));

        companies.set_status(filial.id, 0);
        assert!(matches!(
            validator.ensure_branch_active(company.id, Some(filial.id)).await,
            Err(AppError::ReferencedBranchNotFound)
        ));
    }

    #[tokio::test]
    async fn setor_de_outra_empresa_e_erro_distinto() {
        let (validator, companies, sectors) = setup();
        let dona = companies.seed("Dona", "11", 1);
        let outra = companies.seed("Outra", "22", 1);
        let sector = seed_sector(&sectors, dona.id).await;

        assert!(validator.ensure_sector_belongs(sector.id, dona.id).await.is_ok());
        assert!(matches!(
            validator.ensure_sector_belongs(sector.id, outra.id).await,
            Err(AppError::SectorCompanyMismatch)
        ));
        assert!(matches!(
            validator.ensure_sector_belongs(Uuid::new_v4(), dona.id).await,
            Err(AppError::ReferencedSectorNotFound)
        ));
    }
}
