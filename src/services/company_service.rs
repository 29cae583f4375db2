// src/services/company_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::{error::AppError, filters::{parse_boolean_like, StatusFilter}},
    db::{company_repo::CompanyListFilter, CompanyRepo},
    models::company::{CompanyPayload, CompanyResponse, NormalizedCompany},
};

#[derive(Clone)]
pub struct CompanyService {
    repo: Arc<dyn CompanyRepo>,
}

impl CompanyService {
    pub fn new(repo: Arc<dyn CompanyRepo>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, payload: CompanyPayload) -> Result<CompanyResponse, AppError> {
        let data = NormalizedCompany::from_payload(payload)?;
        if data.name.is_none() || data.cnpj.is_none() {
            return Err(AppError::MissingFields("Nome e CNPJ da empresa são obrigatórios."));
        }
        let company = self.repo.insert(&data).await?;
        Ok(company.into())
    }

    pub async fn list(
        &self,
        status: Option<&str>,
        search: Option<String>,
        is_matrix: Option<&str>,
    ) -> Result<Vec<CompanyResponse>, AppError> {
        let filter = CompanyListFilter {
            status: StatusFilter::resolve(status),
            search,
            is_matrix: parse_boolean_like(is_matrix),
        };
        let companies = self.repo.list(&filter).await?;
        Ok(companies.into_iter().map(Into::into).collect())
    }

    // A consulta por id mantém a cláusula de status; a atualização não.
    pub async fn get_by_id(&self, id: Uuid) -> Result<CompanyResponse, AppError> {
        let company = self
            .repo
            .find_active_by_id(id)
            .await?
            .ok_or(AppError::CompanyNotFound)?;
        Ok(company.into())
    }

    pub async fn update(&self, id: Uuid, payload: CompanyPayload) -> Result<CompanyResponse, AppError> {
        let data = NormalizedCompany::from_payload(payload)?;
        let company = self
            .repo
            .update(id, &data)
            .await?
            .ok_or(AppError::CompanyNotFound)?;
        Ok(company.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryCompanyRepo;
    use serde_json::json;

    fn service() -> (CompanyService, Arc<MemoryCompanyRepo>) {
        let repo = Arc::new(MemoryCompanyRepo::default());
        (CompanyService::new(repo.clone()), repo)
    }

    fn payload(value: serde_json::Value) -> CompanyPayload {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn criar_exige_nome_e_cnpj() {
        let (service, _) = service();
        let result = service.create(payload(json!({ "name": "Sem CNPJ" }))).await;
        assert!(matches!(result, Err(AppError::MissingFields(_))));
    }

    #[tokio::test]
    async fn cnpj_duplicado_vira_conflito() {
        let (service, _) = service();
        service
            .create(payload(json!({ "name": "A", "cnpj": "11.222.333/0001-44" })))
            .await
            .unwrap();
        let result = service
            .create(payload(json!({ "name": "B", "cnpj": "11.222.333/0001-44" })))
            .await;
        assert!(matches!(result, Err(AppError::CnpjAlreadyExists)));
    }

    #[tokio::test]
    async fn matriz_por_id_volta_sem_nome_e_marca_filial() {
        let (service, _) = service();
        let parent = service
            .create(payload(json!({ "name": "Matriz", "cnpj": "11" })))
            .await
            .unwrap();
        assert!(parent.is_matrix);
        assert_eq!(parent.matrix_company, None);

        let branch = service
            .create(payload(json!({
                "name": "Filial", "cnpj": "22",
                "matrixCompany": parent.id.to_string()
            })))
            .await
            .unwrap();
        assert!(!branch.is_matrix);

        let fetched = service.get_by_id(branch.id).await.unwrap();
        let matrix = fetched.matrix_company.unwrap();
        assert_eq!(matrix.id, Some(parent.id));
        assert_eq!(matrix.name, None);
        assert!(!fetched.is_matrix);
    }

    #[tokio::test]
    async fn listagem_filtra_por_matriz_busca_e_status() {
        let (service, repo) = service();
        let parent = service
            .create(payload(json!({ "name": "Matriz Alfa", "cnpj": "11" })))
            .await
            .unwrap();
        service
            .create(payload(json!({
                "name": "Filial Beta", "cnpj": "22",
                "matrixCompany": parent.id.to_string()
            })))
            .await
            .unwrap();
        let inactive = service
            .create(payload(json!({ "name": "Gama", "cnpj": "33" })))
            .await
            .unwrap();
        repo.set_status(inactive.id, 0);

        let only_matrix = service.list(None, None, Some("true")).await.unwrap();
        assert_eq!(only_matrix.len(), 1);
        assert_eq!(only_matrix[0].id, parent.id);

        let by_search = service.list(None, Some("beta".into()), None).await.unwrap();
        assert_eq!(by_search.len(), 1);
        assert_eq!(by_search[0].name, "Filial Beta");

        // Ativo por padrão; "all" devolve inclusive a desativada.
        assert_eq!(service.list(None, None, None).await.unwrap().len(), 2);
        assert_eq!(service.list(Some("all"), None, None).await.unwrap().len(), 3);
        assert_eq!(service.list(Some("0"), None, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn atualizar_sobrescreve_listas_e_matriz_sempre() {
        let (service, _) = service();
        let parent = service
            .create(payload(json!({ "name": "Matriz", "cnpj": "11" })))
            .await
            .unwrap();
        let company = service
            .create(payload(json!({
                "name": "Filial", "cnpj": "22",
                "phones": ["11 1111-1111"],
                "matrixCompany": parent.id.to_string()
            })))
            .await
            .unwrap();

        // Payload sem phones nem matrixCompany: os dois são limpos,
        // o nome enviado é trocado, o cnpj ausente fica como estava.
        let updated = service
            .update(company.id, payload(json!({ "name": "Filial Renomeada" })))
            .await
            .unwrap();
        assert_eq!(updated.name, "Filial Renomeada");
        assert_eq!(updated.cnpj, "22");
        assert!(updated.phones.is_empty());
        assert_eq!(updated.matrix_company, None);
        assert!(updated.is_matrix);
    }

    #[tokio::test]
    async fn atualizar_id_desconhecido_e_404() {
        let (service, _) = service();
        let result = service
            .update(Uuid::new_v4(), payload(json!({ "name": "X" })))
            .await;
        assert!(matches!(result, Err(AppError::CompanyNotFound)));
    }
}
