// src/db/memory.rs
//
// Implementações em memória dos repositórios, para os testes de serviço
// rodarem sem Postgres. Mesmas regras de filtro e de unicidade da versão
// SQL, sobre um Vec protegido por Mutex.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::{
    address_repo::{AddressListFilter, AddressRepo},
    company_repo::{CompanyListFilter, CompanyRepo},
    notice_repo::{NoticeListFilter, NoticeRepo},
    pessoa_repo::{PessoaListFilter, PessoaRepo},
    sector_repo::{SectorListFilter, SectorRepo},
};
use crate::models::{
    address::{Address, NormalizedAddress},
    company::{Company, NormalizedCompany},
    notice::{NormalizedNotice, Notice},
    pessoa::{NewPessoa, Pessoa, PessoaUpdate},
    sector::{NormalizedSector, Sector},
};

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

// ---
// Empresas
// ---

#[derive(Default)]
pub struct MemoryCompanyRepo {
    rows: Mutex<Vec<Company>>,
}

impl MemoryCompanyRepo {
    /// Atalho de teste: cadastra uma empresa mínima com o status dado.
    pub fn seed(&self, name: &str, cnpj: &str, status: i16) -> Company {
        let now = Utc::now();
        let company = Company {
            id: Uuid::new_v4(),
            name: name.to_string(),
            legal_name: None,
            cnpj: cnpj.to_string(),
            state_registration: None,
            municipal_registration: None,
            activity: None,
            phones: vec![],
            emails: vec![],
            matrix_company_id: None,
            matrix_company_name: None,
            status: Some(status),
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(company.clone());
        company
    }

    /// Atalho de teste: desativa/reativa direto no armazenamento.
    pub fn set_status(&self, id: Uuid, status: i16) {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|c| c.id == id) {
            row.status = Some(status);
        }
    }
}

#[async_trait]
impl CompanyRepo for MemoryCompanyRepo {
    async fn insert(&self, data: &NormalizedCompany) -> Result<Company, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let cnpj = data.cnpj.clone().unwrap_or_default();
        if rows.iter().any(|c| c.cnpj == cnpj) {
            return Err(AppError::CnpjAlreadyExists);
        }
        let now = Utc::now();
        let company = Company {
            id: Uuid::new_v4(),
            name: data.name.clone().unwrap_or_default(),
            legal_name: data.legal_name.clone(),
            cnpj,
            state_registration: data.state_registration.clone(),
            municipal_registration: data.municipal_registration.clone(),
            activity: data.activity.clone(),
            phones: data.phones.clone(),
            emails: data.emails.clone(),
            matrix_company_id: data.matrix.as_ref().and_then(|m| m.id),
            matrix_company_name: data.matrix.as_ref().and_then(|m| m.name.clone()),
            status: Some(data.status.unwrap_or(1)),
            created_at: now,
            updated_at: now,
        };
        rows.push(company.clone());
        Ok(company)
    }

    async fn list(&self, filter: &CompanyListFilter) -> Result<Vec<Company>, AppError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|c| {
                if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
                    let hit = contains_ci(&c.name, term)
                        || c.legal_name.as_deref().is_some_and(|l| contains_ci(l, term))
                        || contains_ci(&c.cnpj, term);
                    if !hit {
                        return false;
                    }
                }
                match filter.is_matrix {
                    Some(true) if c.matrix_company_id.is_some() => return false,
                    Some(false) if c.matrix_company_id.is_none() => return false,
                    _ => {}
                }
                filter.status.matches(c.status)
            })
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Company>, AppError> {
        Ok(self.rows.lock().unwrap().iter().find(|c| c.id == id).cloned())
    }

    async fn find_active_by_id(&self, id: Uuid) -> Result<Option<Company>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id && matches!(c.status, None | Some(1)))
            .cloned())
    }

    async fn update(&self, id: Uuid, data: &NormalizedCompany) -> Result<Option<Company>, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let Some(index) = rows.iter().position(|c| c.id == id) else {
            return Ok(None);
        };
        if let Some(cnpj) = &data.cnpj {
            if rows.iter().any(|c| c.id != id && &c.cnpj == cnpj) {
                return Err(AppError::CnpjAlreadyExists);
            }
        }
        let row = &mut rows[index];
        if let Some(name) = &data.name {
            row.name = name.clone();
        }
        if data.legal_name.is_some() {
            row.legal_name = data.legal_name.clone();
        }
        if let Some(cnpj) = &data.cnpj {
            row.cnpj = cnpj.clone();
        }
        if data.state_registration.is_some() {
            row.state_registration = data.state_registration.clone();
        }
        if data.municipal_registration.is_some() {
            row.municipal_registration = data.municipal_registration.clone();
        }
        if data.activity.is_some() {
            row.activity = data.activity.clone();
        }
        row.phones = data.phones.clone();
        row.emails = data.emails.clone();
        row.matrix_company_id = data.matrix.as_ref().and_then(|m| m.id);
        row.matrix_company_name = data.matrix.as_ref().and_then(|m| m.name.clone());
        if let Some(status) = data.status {
            row.status = Some(status);
        }
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }
}

// ---
// Setores
// ---

#[derive(Default)]
pub struct MemorySectorRepo {
    rows: Mutex<Vec<Sector>>,
}

#[async_trait]
impl SectorRepo for MemorySectorRepo {
    async fn insert(&self, data: &NormalizedSector) -> Result<Sector, AppError> {
        let now = Utc::now();
        let technical_manager = data.technical_manager.clone().flatten();
        let responsible = data.responsible.clone().flatten();
        let manager = data.manager.clone().flatten();
        let sector = Sector {
            id: Uuid::new_v4(),
            name: data.name.clone().unwrap_or_default(),
            technical_manager_id: technical_manager.as_ref().and_then(|p| p.id),
            technical_manager_name: technical_manager.and_then(|p| p.nome),
            responsible_id: responsible.as_ref().and_then(|p| p.id),
            responsible_name: responsible.and_then(|p| p.nome),
            manager_id: manager.as_ref().and_then(|p| p.id),
            manager_name: manager.and_then(|p| p.nome),
            phone: data.phone.clone(),
            email: data.email.clone(),
            address: data.address.clone(),
            sector_type: data.sector_type.clone(),
            description: data.description.clone(),
            company_id: data.company_id.unwrap_or_else(Uuid::nil),
            status: Some(data.status.unwrap_or(1)),
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(sector.clone());
        Ok(sector)
    }

    async fn list(&self, filter: &SectorListFilter) -> Result<Vec<Sector>, AppError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|s| {
                if let Some(company_id) = filter.company_id {
                    if s.company_id != company_id {
                        return false;
                    }
                }
                filter.status.matches(s.status)
            })
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Sector>, AppError> {
        Ok(self.rows.lock().unwrap().iter().find(|s| s.id == id).cloned())
    }

    async fn find_active_by_id(&self, id: Uuid) -> Result<Option<Sector>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id && matches!(s.status, None | Some(1)))
            .cloned())
    }

    async fn update(&self, id: Uuid, data: &NormalizedSector) -> Result<Option<Sector>, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        if let Some(name) = &data.name {
            row.name = name.clone();
        }
        if let Some(person) = &data.technical_manager {
            row.technical_manager_id = person.as_ref().and_then(|p| p.id);
            row.technical_manager_name = person.as_ref().and_then(|p| p.nome.clone());
        }
        if let Some(person) = &data.responsible {
            row.responsible_id = person.as_ref().and_then(|p| p.id);
            row.responsible_name = person.as_ref().and_then(|p| p.nome.clone());
        }
        if let Some(person) = &data.manager {
            row.manager_id = person.as_ref().and_then(|p| p.id);
            row.manager_name = person.as_ref().and_then(|p| p.nome.clone());
        }
        if data.phone.is_some() {
            row.phone = data.phone.clone();
        }
        if data.email.is_some() {
            row.email = data.email.clone();
        }
        if data.address.is_some() {
            row.address = data.address.clone();
        }
        if data.sector_type.is_some() {
            row.sector_type = data.sector_type.clone();
        }
        if data.description.is_some() {
            row.description = data.description.clone();
        }
        if let Some(company_id) = data.company_id {
            row.company_id = company_id;
        }
        if let Some(status) = data.status {
            row.status = Some(status);
        }
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }
}

// ---
// Pessoas
// ---

#[derive(Default)]
pub struct MemoryPessoaRepo {
    rows: Mutex<Vec<Pessoa>>,
}

// A tupla do índice único inclui o status: null de filial conta como valor.
fn login_tuple_conflict(rows: &[Pessoa], candidate: &Pessoa) -> bool {
    rows.iter().any(|p| {
        p.id != candidate.id
            && p.email == candidate.email
            && p.company_id == candidate.company_id
            && p.branch_id == candidate.branch_id
            && p.status == candidate.status
    })
}

#[async_trait]
impl PessoaRepo for MemoryPessoaRepo {
    async fn insert(&self, data: &NewPessoa) -> Result<Pessoa, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let now = Utc::now();
        let pessoa = Pessoa {
            id: Uuid::new_v4(),
            nome: data.nome.clone(),
            cargo: data.cargo.clone(),
            telefone: data.telefone.clone(),
            email: data.email.clone(),
            password_hash: data.password_hash.clone(),
            company_id: data.company_id,
            branch_id: data.branch_id,
            status: Some(1),
            created_at: now,
            updated_at: now,
        };
        if login_tuple_conflict(&rows, &pessoa) {
            return Err(AppError::LoginAlreadyExists);
        }
        rows.push(pessoa.clone());
        Ok(pessoa)
    }

    async fn list(&self, filter: &PessoaListFilter) -> Result<Vec<Pessoa>, AppError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|p| {
                if let Some(company_id) = filter.company_id {
                    if p.company_id != company_id {
                        return false;
                    }
                }
                if let Some(branch) = filter.branch {
                    if p.branch_id != branch {
                        return false;
                    }
                }
                if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
                    if !contains_ci(&p.nome, term) && !contains_ci(&p.email, term) {
                        return false;
                    }
                }
                filter.status.matches(p.status)
            })
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Pessoa>, AppError> {
        Ok(self.rows.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn find_active_by_id(&self, id: Uuid) -> Result<Option<Pessoa>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id && matches!(p.status, None | Some(1)))
            .cloned())
    }

    async fn find_active_by_login(
        &self,
        email: &str,
        company_id: Uuid,
        branch_id: Option<Uuid>,
    ) -> Result<Option<Pessoa>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|p| {
                p.email == email
                    && p.company_id == company_id
                    && p.branch_id == branch_id
                    && matches!(p.status, None | Some(1))
            })
            .cloned())
    }

    async fn update(&self, id: Uuid, data: &PessoaUpdate) -> Result<Option<Pessoa>, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let Some(index) = rows.iter().position(|p| p.id == id) else {
            return Ok(None);
        };
        let mut candidate = rows[index].clone();
        if let Some(nome) = &data.nome {
            candidate.nome = nome.clone();
        }
        if data.cargo.is_some() {
            candidate.cargo = data.cargo.clone();
        }
        if data.telefone.is_some() {
            candidate.telefone = data.telefone.clone();
        }
        if let Some(email) = &data.email {
            candidate.email = email.clone();
        }
        if let Some(password_hash) = &data.password_hash {
            candidate.password_hash = password_hash.clone();
        }
        if let Some(company_id) = data.company_id {
            candidate.company_id = company_id;
        }
        if let Some(branch_id) = data.branch_id {
            candidate.branch_id = branch_id;
        }
        if let Some(status) = data.status {
            candidate.status = Some(status);
        }
        candidate.updated_at = Utc::now();
        if login_tuple_conflict(&rows, &candidate) {
            return Err(AppError::LoginAlreadyExists);
        }
        rows[index] = candidate.clone();
        Ok(Some(candidate))
    }
}

// ---
// Endereços
// ---

#[derive(Default)]
pub struct MemoryAddressRepo {
    rows: Mutex<Vec<Address>>,
}

#[async_trait]
impl AddressRepo for MemoryAddressRepo {
    async fn insert(&self, data: &NormalizedAddress) -> Result<Address, AppError> {
        let now = Utc::now();
        let address = Address {
            id: Uuid::new_v4(),
            street: data.street.clone().unwrap_or_default(),
            number: data.number.clone().unwrap_or_default(),
            cep: data.cep.clone().unwrap_or_default(),
            complement: data.complement.clone().flatten(),
            city: data.city.clone().unwrap_or_default(),
            state: data.state.clone().unwrap_or_default(),
            district: data.district.clone().unwrap_or_default(),
            company_id: data.company_id.unwrap_or_else(Uuid::nil),
            status: Some(data.status.unwrap_or(1)),
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(address.clone());
        Ok(address)
    }

    async fn list(&self, filter: &AddressListFilter) -> Result<Vec<Address>, AppError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|a| {
                if let Some(company_id) = filter.company_id {
                    if a.company_id != company_id {
                        return false;
                    }
                }
                filter.status.matches(a.status)
            })
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Address>, AppError> {
        Ok(self.rows.lock().unwrap().iter().find(|a| a.id == id).cloned())
    }

    async fn update(&self, id: Uuid, data: &NormalizedAddress) -> Result<Option<Address>, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        if let Some(street) = &data.street {
            row.street = street.clone();
        }
        if let Some(number) = &data.number {
            row.number = number.clone();
        }
        if let Some(cep) = &data.cep {
            row.cep = cep.clone();
        }
        if let Some(complement) = &data.complement {
            row.complement = complement.clone();
        }
        if let Some(city) = &data.city {
            row.city = city.clone();
        }
        if let Some(state) = &data.state {
            row.state = state.clone();
        }
        if let Some(district) = &data.district {
            row.district = district.clone();
        }
        if let Some(company_id) = data.company_id {
            row.company_id = company_id;
        }
        if let Some(status) = data.status {
            row.status = Some(status);
        }
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }
}

// ---
// Avisos
// ---

#[derive(Default)]
pub struct MemoryNoticeRepo {
    rows: Mutex<Vec<Notice>>,
}

#[async_trait]
impl NoticeRepo for MemoryNoticeRepo {
    async fn insert(&self, data: &NormalizedNotice) -> Result<Notice, AppError> {
        let now = Utc::now();
        let notice = Notice {
            id: Uuid::new_v4(),
            message: data.message.clone().unwrap_or_default(),
            company_id: data.company_id.unwrap_or_else(Uuid::nil),
            sector_id: data.sector_id,
            expires_at: data.expires_at.flatten(),
            viewed: data.viewed.unwrap_or(false),
            importance: data.importance.clone(),
            status: Some(data.status.unwrap_or(1)),
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(notice.clone());
        Ok(notice)
    }

    async fn list(&self, filter: &NoticeListFilter) -> Result<Vec<Notice>, AppError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|n| {
                if let Some(company_id) = filter.company_id {
                    if n.company_id != company_id {
                        return false;
                    }
                }
                if let Some(sector_id) = filter.sector_id {
                    if n.sector_id != Some(sector_id) {
                        return false;
                    }
                }
                if let Some(viewed) = filter.viewed {
                    if n.viewed != viewed {
                        return false;
                    }
                }
                filter.status.matches(n.status)
            })
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Notice>, AppError> {
        Ok(self.rows.lock().unwrap().iter().find(|n| n.id == id).cloned())
    }

    async fn update(&self, id: Uuid, data: &NormalizedNotice) -> Result<Option<Notice>, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|n| n.id == id) else {
            return Ok(None);
        };
        if let Some(message) = &data.message {
            row.message = message.clone();
        }
        if let Some(company_id) = data.company_id {
            row.company_id = company_id;
        }
        row.sector_id = data.sector_id;
        if let Some(expires_at) = data.expires_at {
            row.expires_at = expires_at;
        }
        if let Some(viewed) = data.viewed {
            row.viewed = viewed;
        }
        if data.importance.is_some() {
            row.importance = data.importance.clone();
        }
        if let Some(status) = data.status {
            row.status = Some(status);
        }
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }
}
