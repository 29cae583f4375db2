// src/services/address_service.rs

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::{error::AppError, filters::StatusFilter},
    db::{address_repo::AddressListFilter, AddressRepo, CompanyRepo},
    models::{
        address::{Address, AddressPayload, AddressResponse, NormalizedAddress},
        company::CompanyBrief,
    },
    services::ReferentialValidator,
};

#[derive(Clone)]
pub struct AddressService {
    repo: Arc<dyn AddressRepo>,
    companies: Arc<dyn CompanyRepo>,
    validator: ReferentialValidator,
}

impl AddressService {
    pub fn new(
        repo: Arc<dyn AddressRepo>,
        companies: Arc<dyn CompanyRepo>,
        validator: ReferentialValidator,
    ) -> Self {
        Self { repo, companies, validator }
    }

    pub async fn create(&self, payload: AddressPayload) -> Result<AddressResponse, AppError> {
        let data = NormalizedAddress::from_payload(payload)?;
        if !data.has_required_fields() {
            return Err(AppError::MissingFields(
                "Rua, número, CEP, cidade, estado e bairro são obrigatórios.",
            ));
        }
        let company = self.validator.ensure_company_active(data.company_id).await?;
        let address = self.repo.insert(&data).await?;
        Ok(AddressResponse::from_row(address, Some(company.brief())))
    }

    pub async fn list(
        &self,
        company_id: Option<Uuid>,
        status: Option<&str>,
    ) -> Result<Vec<AddressResponse>, AppError> {
        let filter = AddressListFilter {
            company_id,
            status: StatusFilter::resolve(status),
        };
        let addresses = self.repo.list(&filter).await?;
        self.populate(addresses).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<AddressResponse, AppError> {
        let address = self.repo.find_by_id(id).await?.ok_or(AppError::AddressNotFound)?;
        let company = self.company_brief(address.company_id).await?;
        Ok(AddressResponse::from_row(address, company))
    }

    pub async fn update(&self, id: Uuid, payload: AddressPayload) -> Result<AddressResponse, AppError> {
        let data = NormalizedAddress::from_payload(payload)?;
        if data.company_id.is_some() {
            self.validator.ensure_company_active(data.company_id).await?;
        }
        let address = self
            .repo
            .update(id, &data)
            .await?
            .ok_or(AppError::AddressNotFound)?;
        let company = self.company_brief(address.company_id).await?;
        Ok(AddressResponse::from_row(address, company))
    }

    async fn company_brief(&self, id: Uuid) -> Result<Option<CompanyBrief>, AppError> {
        Ok(self.companies.find_by_id(id).await?.map(|c| c.brief()))
    }

    async fn populate(&self, addresses: Vec<Address>) -> Result<Vec<AddressResponse>, AppError> {
        let mut briefs: HashMap<Uuid, Option<CompanyBrief>> = HashMap::new();
        let mut responses = Vec::with_capacity(addresses.len());
        for address in addresses {
            if !briefs.contains_key(&address.company_id) {
                let brief = self.company_brief(address.company_id).await?;
                briefs.insert(address.company_id, brief);
            }
            let company = briefs[&address.company_id].clone();
            responses.push(AddressResponse::from_row(address, company));
        }
        Ok(responses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::{MemoryAddressRepo, MemoryCompanyRepo, MemorySectorRepo};
    use serde_json::json;

    fn setup() -> (AddressService, Arc<MemoryCompanyRepo>) {
        let companies = Arc::new(MemoryCompanyRepo::default());
        let sectors = Arc::new(MemorySectorRepo::default());
        let addresses = Arc::new(MemoryAddressRepo::default());
        let validator = ReferentialValidator::new(companies.clone(), sectors);
        (
            AddressService::new(addresses, companies.clone(), validator),
            companies,
        )
    }

    fn payload(value: serde_json::Value) -> AddressPayload {
        serde_json::from_value(value).unwrap()
    }

    fn full_payload(company_id: Uuid) -> AddressPayload {
        payload(json!({
            "street": "Rua das Flores", "number": "100", "cep": "01000-000",
            "city": "São Paulo", "state": "SP", "district": "Centro",
            "companyId": company_id.to_string()
        }))
    }

    #[tokio::test]
    async fn criar_exige_todos_os_campos() {
        let (service, companies) = setup();
        let company = companies.seed("Acme", "11", 1);
        let result = service
            .create(payload(json!({
                "street": "Rua A", "number": "1",
                "companyId": company.id.to_string()
            })))
            .await;
        assert!(matches!(result, Err(AppError::MissingFields(_))));
    }

    #[tokio::test]
    async fn criar_exige_empresa_ativa_e_nada_persiste() {
        let (service, companies) = setup();
        let inactive = companies.seed("Inativa", "11", 0);
        let result = service.create(full_payload(inactive.id)).await;
        assert!(matches!(result, Err(AppError::ReferencedCompanyNotFound)));
        assert!(service.list(None, Some("all")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn resposta_traz_a_empresa_populada() {
        let (service, companies) = setup();
        let company = companies.seed("Acme", "11", 1);
        let address = service.create(full_payload(company.id)).await.unwrap();
        let brief = address.company.unwrap();
        assert_eq!(brief.id, company.id);
        assert_eq!(brief.name, "Acme");
    }

    #[tokio::test]
    async fn atualizar_mantem_ou_limpa_o_complemento() {
        let (service, companies) = setup();
        let company = companies.seed("Acme", "11", 1);
        let mut create = full_payload(company.id);
        create.complement = Some(Some("Sala 3".into()));
        let address = service.create(create).await.unwrap();
        assert_eq!(address.complement.as_deref(), Some("Sala 3"));

        let kept = service
            .update(address.id, payload(json!({ "number": "200" })))
            .await
            .unwrap();
        assert_eq!(kept.complement.as_deref(), Some("Sala 3"));
        assert_eq!(kept.number, "200");

        let cleared = service
            .update(address.id, payload(json!({ "complement": null })))
            .await
            .unwrap();
        assert!(cleared.complement.is_none());
    }

    #[tokio::test]
    async fn consulta_e_atualizacao_de_id_desconhecido_e_404() {
        let (service, _) = setup();
        assert!(matches!(
            service.get_by_id(Uuid::new_v4()).await,
            Err(AppError::AddressNotFound)
        ));
        assert!(matches!(
            service.update(Uuid::new_v4(), payload(json!({ "number": "1" }))).await,
            Err(AppError::AddressNotFound)
        ));
    }
}
