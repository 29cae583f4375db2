// src/models/company.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::common::{error::AppError, filters::sanitize_status_value};
use crate::models::clean_text;

// Linha da tabela `companies`.
#[derive(Debug, Clone, FromRow)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub legal_name: Option<String>,
    pub cnpj: String,
    pub state_registration: Option<String>,
    pub municipal_registration: Option<String>,
    pub activity: Option<String>,
    pub phones: Vec<String>,
    pub emails: Vec<String>,
    pub matrix_company_id: Option<Uuid>,
    pub matrix_company_name: Option<String>,
    pub status: Option<i16>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Company {
    /// Uma empresa é matriz quando não referencia nenhuma matriz com id.
    pub fn is_matrix(&self) -> bool {
        self.matrix_company_id.is_none()
    }

    pub fn matrix_ref(&self) -> Option<MatrixRef> {
        if self.matrix_company_id.is_none() && self.matrix_company_name.is_none() {
            return None;
        }
        Some(MatrixRef {
            id: self.matrix_company_id,
            name: self.matrix_company_name.clone(),
        })
    }

    pub fn brief(&self) -> CompanyBrief {
        CompanyBrief {
            id: self.id,
            name: self.name.clone(),
            cnpj: self.cnpj.clone(),
        }
    }
}

/// Referência desnormalizada à matriz: id mais um nome de exibição em cache.
/// O nome só existe quando o cliente o enviou; id sozinho fica com name null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixRef {
    pub id: Option<Uuid>,
    pub name: Option<String>,
}

impl MatrixRef {
    /// Aceita string com o id, objeto `{id|_id, name|legalName}` ou null.
    pub fn normalize(value: Option<&Value>) -> Result<Option<MatrixRef>, AppError> {
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
                let id = Uuid::parse_str(trimmed).map_err(|_| AppError::InvalidId)?;
                Ok(Some(MatrixRef { id: Some(id), name: None }))
            }
            Value::Object(map) => {
                let id = match map.get("id").or_else(|| map.get("_id")) {
                    Some(Value::String(s)) if !s.trim().is_empty() => {
                        Some(Uuid::parse_str(s.trim()).map_err(|_| AppError::InvalidId)?)
                    }
                    _ => None,
                };
                let name = match map.get("name").or_else(|| map.get("legalName")) {
                    Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
                    _ => None,
                };
                if id.is_none() && name.is_none() {
                    return Ok(None);
                }
                Ok(Some(MatrixRef { id, name }))
            }
            _ => Ok(None),
        }
    }
}

/// Projeção `{id, name, cnpj}` usada no populate das outras entidades.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyBrief {
    pub id: Uuid,
    pub name: String,
    pub cnpj: String,
}

// ---
// Payload cru (criação e atualização usam a mesma forma)
// ---
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyPayload {
    pub name: Option<String>,
    pub legal_name: Option<String>,
    pub cnpj: Option<String>,
    pub state_registration: Option<String>,
    pub municipal_registration: Option<String>,
    pub activity: Option<String>,
    pub phones: Option<Vec<Value>>,
    pub emails: Option<Vec<Value>>,
    pub matrix_company: Option<Value>,
    pub status: Option<Value>,
}

/// Payload canônico, depois da normalização duck-typed.
///
/// `phones`, `emails` e `matrix` são sempre materializados (listas vazias e
/// null quando ausentes); na atualização eles sobrescrevem o que existia,
/// como a API sempre fez. Os demais campos só entram quando enviados.
#[derive(Debug, Clone)]
pub struct NormalizedCompany {
    pub name: Option<String>,
    pub legal_name: Option<String>,
    pub cnpj: Option<String>,
    pub state_registration: Option<String>,
    pub municipal_registration: Option<String>,
    pub activity: Option<String>,
    pub phones: Vec<String>,
    pub emails: Vec<String>,
    pub matrix: Option<MatrixRef>,
    pub status: Option<i16>,
}

impl NormalizedCompany {
    pub fn from_payload(payload: CompanyPayload) -> Result<Self, AppError> {
        Ok(Self {
            name: clean_text(payload.name),
            legal_name: clean_text(payload.legal_name),
            cnpj: clean_text(payload.cnpj),
            state_registration: clean_text(payload.state_registration),
            municipal_registration: clean_text(payload.municipal_registration),
            activity: clean_text(payload.activity),
            phones: sanitize_string_list(payload.phones),
            emails: sanitize_string_list(payload.emails),
            matrix: MatrixRef::normalize(payload.matrix_company.as_ref())?,
            status: sanitize_status_value(payload.status.as_ref()),
        })
    }
}

// Listas de telefone/email descartam entradas vazias; números viram texto.
fn sanitize_string_list(values: Option<Vec<Value>>) -> Vec<String> {
    values
        .unwrap_or_default()
        .into_iter()
        .filter_map(|value| match value {
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect()
}

// ---
// Resposta da API
// ---
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyResponse {
    pub id: Uuid,
    pub name: String,
    pub legal_name: Option<String>,
    pub cnpj: String,
    pub state_registration: Option<String>,
    pub municipal_registration: Option<String>,
    pub activity: Option<String>,
    pub phones: Vec<String>,
    pub emails: Vec<String>,
    pub matrix_company: Option<MatrixRef>,
    pub is_matrix: bool,
    pub status: Option<i16>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Company> for CompanyResponse {
    fn from(company: Company) -> Self {
        Self {
            is_matrix: company.is_matrix(),
            matrix_company: company.matrix_ref(),
            id: company.id,
            name: company.name,
            legal_name: company.legal_name,
            cnpj: company.cnpj,
            state_registration: company.state_registration,
            municipal_registration: company.municipal_registration,
            activity: company.activity,
            phones: company.phones,
            emails: company.emails,
            status: company.status,
            created_at: company.created_at,
            updated_at: company.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn matriz_como_string_vira_id_sem_nome() {
        let id = Uuid::new_v4();
        let value = json!(id.to_string());
        let matrix = MatrixRef::normalize(Some(&value)).unwrap().unwrap();
        assert_eq!(matrix.id, Some(id));
        assert_eq!(matrix.name, None);
    }

    #[test]
    fn matriz_como_objeto_preserva_nome() {
        let id = Uuid::new_v4();
        let value = json!({ "id": id.to_string(), "name": "Matriz Ltda" });
        let matrix = MatrixRef::normalize(Some(&value)).unwrap().unwrap();
        assert_eq!(matrix.id, Some(id));
        assert_eq!(matrix.name.as_deref(), Some("Matriz Ltda"));
    }

    #[test]
    fn matriz_vazia_ou_nula_vira_nenhuma() {
        assert_eq!(MatrixRef::normalize(None).unwrap(), None);
        assert_eq!(MatrixRef::normalize(Some(&json!(null))).unwrap(), None);
        assert_eq!(MatrixRef::normalize(Some(&json!(""))).unwrap(), None);
        assert_eq!(MatrixRef::normalize(Some(&json!({}))).unwrap(), None);
    }

    #[test]
    fn matriz_com_id_invalido_e_erro_de_identificador() {
        let value = json!("nao-e-uuid");
        assert!(matches!(
            MatrixRef::normalize(Some(&value)),
            Err(AppError::InvalidId)
        ));
    }

    #[test]
    fn listas_descartam_entradas_vazias() {
        let payload = CompanyPayload {
            phones: Some(vec![json!("11 99999-0000"), json!(""), json!(null), json!(4002)]),
            emails: Some(vec![json!("a@b.c"), json!(false)]),
            ..Default::default()
        };
        let normalized = NormalizedCompany::from_payload(payload).unwrap();
        assert_eq!(normalized.phones, vec!["11 99999-0000", "4002"]);
        assert_eq!(normalized.emails, vec!["a@b.c"]);
    }
}
