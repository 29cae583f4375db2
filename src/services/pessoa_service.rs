// src/services/pessoa_service.rs

use std::collections::HashMap;
use std::sync::Arc;

use bcrypt::{hash, verify};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        filters::{normalize_branch, parse_optional_id, sanitize_status_value, StatusFilter},
    },
    db::{pessoa_repo::PessoaListFilter, CompanyRepo, PessoaRepo},
    models::{
        clean_text,
        company::CompanyBrief,
        pessoa::{
            LoginPayload, LoginResponse, NewPessoa, Pessoa, PessoaResponse, PessoaUpdate,
            RegisterPessoaPayload, UpdatePessoaPayload,
        },
    },
    services::ReferentialValidator,
};

#[derive(Clone)]
pub struct PessoaService {
    repo: Arc<dyn PessoaRepo>,
    companies: Arc<dyn CompanyRepo>,
    validator: ReferentialValidator,
    bcrypt_cost: u32,
}

impl PessoaService {
    pub fn new(
        repo: Arc<dyn PessoaRepo>,
        companies: Arc<dyn CompanyRepo>,
        validator: ReferentialValidator,
        bcrypt_cost: u32,
    ) -> Self {
        Self { repo, companies, validator, bcrypt_cost }
    }

    pub async fn register(&self, payload: RegisterPessoaPayload) -> Result<PessoaResponse, AppError> {
        let nome = clean_text(payload.nome);
        let email = clean_text(payload.email).map(|e| e.to_lowercase());
        let password = payload.password.filter(|p| !p.is_empty());
        let company_id = parse_optional_id(payload.company_id.as_deref())?;

        let (Some(nome), Some(email), Some(password), Some(company_id)) =
            (nome, email, password, company_id)
        else {
            return Err(AppError::MissingFields(
                "Nome, email, senha e o ID da empresa são obrigatórios.",
            ));
        };

        let company = self.validator.ensure_company_active(Some(company_id)).await?;
        let branch_id = parse_optional_id(payload.branch_id.as_deref())?;
        let branch = self.validator.ensure_branch_active(company.id, branch_id).await?;

        let password_hash = self.hash_password(password).await?;
        let pessoa = self
            .repo
            .insert(&NewPessoa {
                nome,
                cargo: clean_text(payload.cargo),
                telefone: clean_text(payload.telefone),
                email,
                password_hash,
                company_id: company.id,
                branch_id: branch.as_ref().map(|b| b.id),
            })
            .await?;

        Ok(PessoaResponse::from_row(
            pessoa,
            Some(company.brief()),
            branch.map(|b| b.brief()),
        ))
    }

    pub async fn list(
        &self,
        company_id: Option<Uuid>,
        branch_id: Option<Uuid>,
        status: Option<&str>,
        search: Option<String>,
    ) -> Result<Vec<PessoaResponse>, AppError> {
        // O filtro de filial só existe quando o cliente o mandou; filial
        // igual à empresa vira "somente os registros da própria matriz".
        let branch = match (company_id, branch_id) {
            (_, None) => None,
            (Some(company), Some(branch)) => Some(normalize_branch(company, Some(branch))),
            (None, Some(branch)) => Some(Some(branch)),
        };
        let filter = PessoaListFilter {
            company_id,
            branch,
            status: StatusFilter::resolve(status),
            search,
        };
        let pessoas = self.repo.list(&filter).await?;
        self.populate(pessoas).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<PessoaResponse, AppError> {
        let pessoa = self
            .repo
            .find_active_by_id(id)
            .await?
            .ok_or(AppError::PessoaNotFound)?;
        self.respond(pessoa).await
    }

    pub async fn update(&self, id: Uuid, payload: UpdatePessoaPayload) -> Result<PessoaResponse, AppError> {
        let existing = self.repo.find_by_id(id).await?.ok_or(AppError::PessoaNotFound)?;

        let mut update = PessoaUpdate {
            nome: clean_text(payload.nome),
            cargo: clean_text(payload.cargo),
            telefone: clean_text(payload.telefone),
            email: clean_text(payload.email).map(|e| e.to_lowercase()),
            status: sanitize_status_value(payload.status.as_ref()),
            ..Default::default()
        };

        // Empresa ou filial no payload: revalida o par inteiro, completando
        // o lado que faltar com o que está gravado.
        let company_supplied = parse_optional_id(payload.company_id.as_deref())?;
        if company_supplied.is_some() || payload.branch_id.is_some() {
            let company_id = company_supplied.unwrap_or(existing.company_id);
            let company = self.validator.ensure_company_active(Some(company_id)).await?;
            let branch_raw = match payload.branch_id.as_deref() {
                Some(raw) => parse_optional_id(Some(raw))?,
                None => existing.branch_id,
            };
            let branch = self.validator.ensure_branch_active(company.id, branch_raw).await?;
            update.company_id = Some(company.id);
            update.branch_id = Some(branch.map(|b| b.id));
        }

        if let Some(password) = payload.password.filter(|p| !p.is_empty()) {
            update.password_hash = Some(self.hash_password(password).await?);
        }

        let pessoa = self
            .repo
            .update(id, &update)
            .await?
            .ok_or(AppError::PessoaNotFound)?;
        self.respond(pessoa).await
    }

    pub async fn login(&self, company_id: Uuid, payload: LoginPayload) -> Result<LoginResponse, AppError> {
        let email = clean_text(payload.email).map(|e| e.to_lowercase());
        let password = payload.password.filter(|p| !p.is_empty());
        let (Some(email), Some(password)) = (email, password) else {
            return Err(AppError::MissingFields("Email e senha são obrigatórios."));
        };

        let branch_raw = parse_optional_id(payload.branch_id.as_deref())?;
        let branch_id = normalize_branch(company_id, branch_raw);

        let pessoa = self
            .repo
            .find_active_by_login(&email, company_id, branch_id)
            .await?
            .ok_or(AppError::InvalidCombination)?;

        // A credencial pode apontar para uma empresa/filial desativada
        // depois do cadastro; o login tem que falhar do mesmo jeito.
        if self.companies.find_active_by_id(company_id).await?.is_none() {
            return Err(AppError::InvalidCombination);
        }
        if let Some(branch_id) = branch_id {
            if self.companies.find_active_by_id(branch_id).await?.is_none() {
                return Err(AppError::InvalidCombination);
            }
        }

        if !self.verify_password(password, pessoa.password_hash.clone()).await? {
            return Err(AppError::WrongPassword);
        }

        Ok(LoginResponse {
            message: "Login efetuado com sucesso.".to_string(),
            company_id,
            branch_id: branch_id.unwrap_or(company_id),
            matriz: branch_id.is_none(),
        })
    }

    // bcrypt é custoso de propósito; roda fora do executor async.
    async fn hash_password(&self, password: String) -> Result<String, AppError> {
        let cost = self.bcrypt_cost;
        let hashed = tokio::task::spawn_blocking(move || hash(&password, cost))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
        Ok(hashed)
    }

    async fn verify_password(&self, password: String, password_hash: String) -> Result<bool, AppError> {
        let valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
        Ok(valid)
    }

    async fn respond(&self, pessoa: Pessoa) -> Result<PessoaResponse, AppError> {
        let company = self.company_brief(pessoa.company_id).await?;
        let branch = match pessoa.branch_id {
            Some(branch_id) => self.company_brief(branch_id).await?,
            None => None,
        };
        Ok(PessoaResponse::from_row(pessoa, company, branch))
    }

    async fn company_brief(&self, id: Uuid) -> Result<Option<CompanyBrief>, AppError> {
        Ok(self.companies.find_by_id(id).await?.map(|c| c.brief()))
    }

    async fn populate(&self, pessoas: Vec<Pessoa>) -> Result<Vec<PessoaResponse>, AppError> {
        let mut briefs: HashMap<Uuid, Option<CompanyBrief>> = HashMap::new();
        let mut responses = Vec::with_capacity(pessoas.len());
        for pessoa in pessoas {
            for id in [Some(pessoa.company_id), pessoa.branch_id].into_iter().flatten() {
                if !briefs.contains_key(&id) {
                    let brief = self.company_brief(id).await?;
                    briefs.insert(id, brief);
                }
            }
            let company = briefs[&pessoa.company_id].clone();
            let branch = pessoa.branch_id.and_then(|id| briefs[&id].clone());
            responses.push(PessoaResponse::from_row(pessoa, company, branch));
        }
        Ok(responses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::{MemoryCompanyRepo, MemoryPessoaRepo, MemorySectorRepo};
    use serde_json::json;

    // Custo mínimo do bcrypt: os testes só precisam do hash válido.
    const TEST_COST: u32 = 4;

    fn setup() -> (PessoaService, Arc<MemoryCompanyRepo>) {
        let companies = Arc::new(MemoryCompanyRepo::default());
        let sectors = Arc::new(MemorySectorRepo::default());
        let pessoas = Arc::new(MemoryPessoaRepo::default());
        let validator = ReferentialValidator::new(companies.clone(), sectors);
        (
            PessoaService::new(pessoas, companies.clone(), validator, TEST_COST),
            companies,
        )
    }

    fn register_payload(value: serde_json::Value) -> RegisterPessoaPayload {
        serde_json::from_value(value).unwrap()
    }

    fn login_payload(value: serde_json::Value) -> LoginPayload {
        serde_json::from_value(value).unwrap()
    }

    async fn register_default(
        service: &PessoaService,
        company_id: Uuid,
        email: &str,
    ) -> PessoaResponse {
        service
            .register(register_payload(json!({
                "nome": "Ana",
                "email": email,
                "password": "segredo1",
                "companyId": company_id.to_string()
            })))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn registro_exige_empresa_ativa_e_nada_persiste() {
        let (service, companies) = setup();
        let inactive = companies.seed("Inativa", "11", 0);

        let result = service
            .register(register_payload(json!({
                "nome": "Ana", "email": "ana@acme.com", "password": "segredo1",
                "companyId": inactive.id.to_string()
            })))
            .await;
        assert!(matches!(result, Err(AppError::ReferencedCompanyNotFound)));
        assert!(service.list(None, None, Some("all"), None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn registro_duplicado_conflita_e_reativa_depois_de_desativar() {
        let (service, companies) = setup();
        let company = companies.seed("Acme", "11", 1);

        let first = register_default(&service, company.id, "ana@acme.com").await;

        // Segundo registro idêntico enquanto o primeiro está ativo: 409.
        let duplicate = service
            .register(register_payload(json!({
                "nome": "Ana de Novo", "email": "ana@acme.com", "password": "segredo2",
                "companyId": company.id.to_string()
            })))
            .await;
        assert!(matches!(duplicate, Err(AppError::LoginAlreadyExists)));

        // Desativado o primeiro, o mesmo email volta a poder se registrar.
        service
            .update(first.id, serde_json::from_value(json!({ "status": 0 })).unwrap())
            .await
            .unwrap();
        let third = service
            .register(register_payload(json!({
                "nome": "Ana Terceira", "email": "ana@acme.com", "password": "segredo3",
                "companyId": company.id.to_string()
            })))
            .await;
        assert!(third.is_ok());
    }

    #[tokio::test]
    async fn filial_igual_a_empresa_registra_na_matriz() {
        let (service, companies) = setup();
        let company = companies.seed("Acme", "11", 1);
        let pessoa = service
            .register(register_payload(json!({
                "nome": "Ana", "email": "ana@acme.com", "password": "segredo1",
                "companyId": company.id.to_string(),
                "branchId": company.id.to_string()
            })))
            .await
            .unwrap();
        assert!(pessoa.branch.is_none());
    }

    #[tokio::test]
    async fn login_com_sucesso_resolve_matriz() {
        let (service, companies) = setup();
        let company = companies.seed("Acme", "11", 1);
        register_default(&service, company.id, "ana@acme.com").await;

        let login = service
            .login(
                company.id,
                login_payload(json!({ "email": "ana@acme.com", "password": "segredo1" })),
            )
            .await
            .unwrap();
        assert_eq!(login.message, "Login efetuado com sucesso.");
        assert_eq!(login.company_id, company.id);
        assert_eq!(login.branch_id, company.id);
        assert!(login.matriz);
    }

    #[tokio::test]
    async fn login_em_filial_resolve_a_filial() {
        let (service, companies) = setup();
        let company = companies.seed("Matriz", "11", 1);
        let filial = companies.seed("Filial", "22", 1);
        service
            .register(register_payload(json!({
                "nome": "Ana", "email": "ana@acme.com", "password": "segredo1",
                "companyId": company.id.to_string(),
                "branchId": filial.id.to_string()
            })))
            .await
            .unwrap();

        let login = service
            .login(
                company.id,
                login_payload(json!({
                    "email": "ana@acme.com", "password": "segredo1",
                    "branchId": filial.id.to_string()
                })),
            )
            .await
            .unwrap();
        assert_eq!(login.branch_id, filial.id);
        assert!(!login.matriz);
    }

    #[tokio::test]
    async fn falhas_de_login_usam_a_mensagem_generica_menos_a_senha() {
        let (service, companies) = setup();
        let company = companies.seed("Acme", "11", 1);
        register_default(&service, company.id, "ana@acme.com").await;

        // Email que não existe.
        let wrong_email = service
            .login(
                company.id,
                login_payload(json!({ "email": "outra@acme.com", "password": "segredo1" })),
            )
            .await;
        assert!(matches!(wrong_email, Err(AppError::InvalidCombination)));

        // Empresa desativada depois do cadastro: a credencial continua
        // ativa, mas o login falha com a mesma mensagem genérica.
        companies.set_status(company.id, 0);
        let inactive_company = service
            .login(
                company.id,
                login_payload(json!({ "email": "ana@acme.com", "password": "segredo1" })),
            )
            .await;
        assert!(matches!(inactive_company, Err(AppError::InvalidCombination)));
        companies.set_status(company.id, 1);

        // Senha errada: mensagem distinta (comportamento histórico).
        let wrong_password = service
            .login(
                company.id,
                login_payload(json!({ "email": "ana@acme.com", "password": "errada99" })),
            )
            .await;
        assert!(matches!(wrong_password, Err(AppError::WrongPassword)));
    }

    #[tokio::test]
    async fn login_com_filial_desativada_falha_generico() {
        let (service, companies) = setup();
        let company = companies.seed("Matriz", "11", 1);
        let filial = companies.seed("Filial", "22", 1);
        service
            .register(register_payload(json!({
                "nome": "Ana", "email": "ana@acme.com", "password": "segredo1",
                "companyId": company.id.to_string(),
                "branchId": filial.id.to_string()
            })))
            .await
            .unwrap();

        companies.set_status(filial.id, 0);
        let result = service
            .login(
                company.id,
                login_payload(json!({
                    "email": "ana@acme.com", "password": "segredo1",
                    "branchId": filial.id.to_string()
                })),
            )
            .await;
        assert!(matches!(result, Err(AppError::InvalidCombination)));
    }

    #[tokio::test]
    async fn atualizar_sem_senha_mantem_o_hash_antigo() {
        let (service, companies) = setup();
        let company = companies.seed("Acme", "11", 1);
        let pessoa = register_default(&service, company.id, "ana@acme.com").await;

        service
            .update(
                pessoa.id,
                serde_json::from_value(json!({ "nome": "Ana Atualizada" })).unwrap(),
            )
            .await
            .unwrap();

        // A senha original continua valendo no login.
        let login = service
            .login(
                company.id,
                login_payload(json!({ "email": "ana@acme.com", "password": "segredo1" })),
            )
            .await;
        assert!(login.is_ok());
    }

    #[tokio::test]
    async fn consulta_por_id_so_enxerga_ativos() {
        let (service, companies) = setup();
        let company = companies.seed("Acme", "11", 1);
        let pessoa = register_default(&service, company.id, "ana@acme.com").await;

        assert!(service.get_by_id(pessoa.id).await.is_ok());

        service
            .update(pessoa.id, serde_json::from_value(json!({ "status": 0 })).unwrap())
            .await
            .unwrap();
        assert!(matches!(
            service.get_by_id(pessoa.id).await,
            Err(AppError::PessoaNotFound)
        ));
    }
}
