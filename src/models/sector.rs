// src/models/sector.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::common::{error::AppError, filters::{parse_optional_id, sanitize_status_value}};
use crate::models::{clean_text, company::CompanyBrief};

// Linha da tabela `sectors`. As três referências de pessoal são pares
// id/nome desnormalizados, cada um em duas colunas.
#[derive(Debug, Clone, FromRow)]
pub struct Sector {
    pub id: Uuid,
    pub name: String,
    pub technical_manager_id: Option<Uuid>,
    pub technical_manager_name: Option<String>,
    pub responsible_id: Option<Uuid>,
    pub responsible_name: Option<String>,
    pub manager_id: Option<Uuid>,
    pub manager_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub sector_type: Option<String>,
    pub description: Option<String>,
    pub company_id: Uuid,
    pub status: Option<i16>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sector {
    pub fn technical_manager(&self) -> Option<PersonRef> {
        PersonRef::from_columns(self.technical_manager_id, self.technical_manager_name.clone())
    }

    pub fn responsible(&self) -> Option<PersonRef> {
        PersonRef::from_columns(self.responsible_id, self.responsible_name.clone())
    }

    pub fn manager(&self) -> Option<PersonRef> {
        PersonRef::from_columns(self.manager_id, self.manager_name.clone())
    }

    pub fn brief(&self) -> SectorBrief {
        SectorBrief { id: self.id, name: self.name.clone() }
    }
}

/// Referência desnormalizada a uma pessoa: id mais nome de exibição em cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonRef {
    pub id: Option<Uuid>,
    pub nome: Option<String>,
}

impl PersonRef {
    fn from_columns(id: Option<Uuid>, nome: Option<String>) -> Option<PersonRef> {
        if id.is_none() && nome.is_none() {
            return None;
        }
        Some(PersonRef { id, nome })
    }

    /// Aceita string (um id, ou um nome livre vindo dos cadastros antigos),
    /// objeto `{id, name|nome}` ou null.
    pub fn normalize(value: Option<&Value>) -> Result<Option<PersonRef>, AppError> {
        let value = match value {
            None | Some(Value::Null) => return Ok(None),
            Some(v) => v,
        };

        match value {
            Value::String(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                match Uuid::parse_str(trimmed) {
                    Ok(id) => Ok(Some(PersonRef { id: Some(id), nome: None })),
                    Err(_) => Ok(Some(PersonRef { id: None, nome: Some(trimmed.to_string()) })),
                }
            }
            Value::Object(map) => {
                let id = match map.get("id").or_else(|| map.get("_id")) {
                    Some(Value::String(s)) if !s.trim().is_empty() => {
                        Some(Uuid::parse_str(s.trim()).map_err(|_| AppError::InvalidId)?)
                    }
                    _ => None,
                };
                let nome = match map.get("nome").or_else(|| map.get("name")) {
                    Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
                    _ => None,
                };
                if id.is_none() && nome.is_none() {
                    return Ok(None);
                }
                Ok(Some(PersonRef { id, nome }))
            }
            _ => Ok(None),
        }
    }
}

/// Projeção `{id, name}` usada no populate dos avisos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorBrief {
    pub id: Uuid,
    pub name: String,
}

// ---
// Payload cru (criação e atualização usam a mesma forma)
// ---
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorPayload {
    pub name: Option<String>,
    pub technical_manager: Option<Value>,
    pub responsible: Option<Value>,
    pub manager: Option<Value>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub sector_type: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "company")]
    pub company_id: Option<String>,
    pub status: Option<Value>,
}

/// Payload canônico. As referências de pessoal têm três estados: ausente
/// (mantém), null (limpa) e valor (re-normaliza).
#[derive(Debug, Clone)]
pub struct NormalizedSector {
    pub name: Option<String>,
    pub technical_manager: Option<Option<PersonRef>>,
    pub responsible: Option<Option<PersonRef>>,
    pub manager: Option<Option<PersonRef>>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub sector_type: Option<String>,
    pub description: Option<String>,
    pub company_id: Option<Uuid>,
    pub status: Option<i16>,
}

impl NormalizedSector {
    pub fn from_payload(payload: SectorPayload) -> Result<Self, AppError> {
        Ok(Self {
            name: clean_text(payload.name),
            technical_manager: normalize_person_field(payload.technical_manager)?,
            responsible: normalize_person_field(payload.responsible)?,
            manager: normalize_person_field(payload.manager)?,
            phone: clean_text(payload.phone),
            email: clean_text(payload.email).map(|e| e.to_lowercase()),
            address: clean_text(payload.address),
            sector_type: clean_text(payload.sector_type),
            description: clean_text(payload.description),
            company_id: parse_optional_id(payload.company_id.as_deref())?,
            status: sanitize_status_value(payload.status.as_ref()),
        })
    }
}

fn normalize_person_field(value: Option<Value>) -> Result<Option<Option<PersonRef>>, AppError> {
    match value {
        None => Ok(None),
        Some(v) => Ok(Some(PersonRef::normalize(Some(&v))?)),
    }
}

// ---
// Resposta da API
// ---
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorResponse {
    pub id: Uuid,
    pub name: String,
    pub technical_manager: Option<PersonRef>,
    pub responsible: Option<PersonRef>,
    pub manager: Option<PersonRef>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub sector_type: Option<String>,
    pub description: Option<String>,
    pub company: Option<CompanyBrief>,
    pub status: Option<i16>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SectorResponse {
    pub fn from_row(sector: Sector, company: Option<CompanyBrief>) -> Self {
        Self {
            technical_manager: sector.technical_manager(),
            responsible: sector.responsible(),
            manager: sector.manager(),
            id: sector.id,
            name: sector.name,
            phone: sector.phone,
            email: sector.email,
            address: sector.address,
            sector_type: sector.sector_type,
            description: sector.description,
            company,
            status: sector.status,
            created_at: sector.created_at,
            updated_at: sector.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn referencia_como_id_vira_id_sem_nome() {
        let id = Uuid::new_v4();
        let person = PersonRef::normalize(Some(&json!(id.to_string()))).unwrap().unwrap();
        assert_eq!(person.id, Some(id));
        assert_eq!(person.nome, None);
    }

    #[test]
    fn referencia_como_nome_livre_vira_nome_sem_id() {
        let person = PersonRef::normalize(Some(&json!("Maria da Silva"))).unwrap().unwrap();
        assert_eq!(person.id, None);
        assert_eq!(person.nome.as_deref(), Some("Maria da Silva"));
    }

    #[test]
    fn referencia_como_objeto_preserva_os_dois() {
        let id = Uuid::new_v4();
        let value = json!({ "id": id.to_string(), "nome": "João" });
        let person = PersonRef::normalize(Some(&value)).unwrap().unwrap();
        assert_eq!(person.id, Some(id));
        assert_eq!(person.nome.as_deref(), Some("João"));
    }

    #[test]
    fn ausente_mantem_null_limpa_valor_normaliza() {
        assert_eq!(normalize_person_field(None).unwrap(), None);
        assert_eq!(normalize_person_field(Some(json!(null))).unwrap(), Some(None));
        let set = normalize_person_field(Some(json!("Maria"))).unwrap();
        assert!(matches!(set, Some(Some(_))));
    }
}
