// src/services.rs

pub mod address_service;
pub use address_service::AddressService;
pub mod company_service;
pub use company_service::CompanyService;
pub mod notice_service;
pub use notice_service::NoticeService;
pub mod pessoa_service;
pub use pessoa_service::PessoaService;
pub mod sector_service;
pub use sector_service::SectorService;
pub mod validator;
pub use validator::ReferentialValidator;
