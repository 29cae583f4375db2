// src/config.rs

use std::{env, sync::Arc, time::Duration};

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        AddressRepo, CompanyRepo, NoticeRepo, PessoaRepo, SectorRepo,
        PgAddressRepo, PgCompanyRepo, PgNoticeRepo, PgPessoaRepo, PgSectorRepo,
    },
    services::{
        AddressService, CompanyService, NoticeService, PessoaService, ReferentialValidator,
        SectorService,
    },
};

const DEFAULT_PORT: u16 = 4000;
// Piso do fator de custo do bcrypt; valores menores no ambiente são elevados.
const MIN_BCRYPT_COST: u32 = 10;

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub port: u16,
    pub company_service: CompanyService,
    pub sector_service: SectorService,
    pub pessoa_service: PessoaService,
    pub address_service: AddressService,
    pub notice_service: NoticeService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL deve ser definida"))?;
        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let bcrypt_cost = env::var("BCRYPT_COST")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(MIN_BCRYPT_COST)
            .max(MIN_BCRYPT_COST);

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let company_repo: Arc<dyn CompanyRepo> = Arc::new(PgCompanyRepo::new(db_pool.clone()));
        let sector_repo: Arc<dyn SectorRepo> = Arc::new(PgSectorRepo::new(db_pool.clone()));
        let pessoa_repo: Arc<dyn PessoaRepo> = Arc::new(PgPessoaRepo::new(db_pool.clone()));
        let address_repo: Arc<dyn AddressRepo> = Arc::new(PgAddressRepo::new(db_pool.clone()));
        let notice_repo: Arc<dyn NoticeRepo> = Arc::new(PgNoticeRepo::new(db_pool.clone()));

        let validator = ReferentialValidator::new(company_repo.clone(), sector_repo.clone());

        let company_service = CompanyService::new(company_repo.clone());
        let sector_service =
            SectorService::new(sector_repo.clone(), company_repo.clone(), validator.clone());
        let pessoa_service = PessoaService::new(
            pessoa_repo,
            company_repo.clone(),
            validator.clone(),
            bcrypt_cost,
        );
        let address_service =
            AddressService::new(address_repo, company_repo.clone(), validator.clone());
        let notice_service =
            NoticeService::new(notice_repo, company_repo, sector_repo, validator);

        Ok(Self {
            db_pool,
            port,
            company_service,
            sector_service,
            pessoa_service,
            address_service,
            notice_service,
        })
    }
}
