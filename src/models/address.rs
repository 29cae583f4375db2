// src/models/address.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::common::{error::AppError, filters::{parse_optional_id, sanitize_status_value}};
use crate::models::{clean_text, company::CompanyBrief, double_option};

// Linha da tabela `addresses`.
#[derive(Debug, Clone, FromRow)]
pub struct Address {
    pub id: Uuid,
    pub street: String,
    pub number: String,
    pub cep: String,
    pub complement: Option<String>,
    pub city: String,
    pub state: String,
    pub district: String,
    pub company_id: Uuid,
    pub status: Option<i16>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// Payload cru (criação e atualização usam a mesma forma)
// ---
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressPayload {
    pub street: Option<String>,
    pub number: Option<String>,
    pub cep: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub complement: Option<Option<String>>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub district: Option<String>,
    #[serde(alias = "company")]
    pub company_id: Option<String>,
    pub status: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct NormalizedAddress {
    pub street: Option<String>,
    pub number: Option<String>,
    pub cep: Option<String>,
    /// Ausente mantém, null limpa, valor substitui.
    pub complement: Option<Option<String>>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub district: Option<String>,
    pub company_id: Option<Uuid>,
    pub status: Option<i16>,
}

impl NormalizedAddress {
    pub fn from_payload(payload: AddressPayload) -> Result<Self, AppError> {
        Ok(Self {
            street: clean_text(payload.street),
            number: clean_text(payload.number),
            cep: clean_text(payload.cep),
            complement: payload.complement.map(clean_text),
            city: clean_text(payload.city),
            state: clean_text(payload.state),
            district: clean_text(payload.district),
            company_id: parse_optional_id(payload.company_id.as_deref())?,
            status: sanitize_status_value(payload.status.as_ref()),
        })
    }

    /// Todos os campos que o cadastro exige estão presentes?
    pub fn has_required_fields(&self) -> bool {
        self.street.is_some()
            && self.number.is_some()
            && self.cep.is_some()
            && self.city.is_some()
            && self.state.is_some()
            && self.district.is_some()
    }
}

// ---
// Resposta da API
// ---
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressResponse {
    pub id: Uuid,
    pub street: String,
    pub number: String,
    pub cep: String,
    pub complement: Option<String>,
    pub city: String,
    pub state: String,
    pub district: String,
    pub company: Option<CompanyBrief>,
    pub status: Option<i16>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AddressResponse {
    pub fn from_row(address: Address, company: Option<CompanyBrief>) -> Self {
        Self {
            id: address.id,
            street: address.street,
            number: address.number,
            cep: address.cep,
            complement: address.complement,
            city: address.city,
            state: address.state,
            district: address.district,
            company,
            status: address.status,
            created_at: address.created_at,
            updated_at: address.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn complemento_distingue_ausente_de_nulo() {
        let absent: AddressPayload = serde_json::from_value(json!({})).unwrap();
        assert_eq!(NormalizedAddress::from_payload(absent).unwrap().complement, None);

        let cleared: AddressPayload = serde_json::from_value(json!({ "complement": null })).unwrap();
        assert_eq!(NormalizedAddress::from_payload(cleared).unwrap().complement, Some(None));

        let set: AddressPayload = serde_json::from_value(json!({ "complement": "Sala 3" })).unwrap();
        assert_eq!(
            NormalizedAddress::from_payload(set).unwrap().complement,
            Some(Some("Sala 3".to_string()))
        );
    }

    #[test]
    fn campos_obrigatorios_do_endereco() {
        let payload: AddressPayload = serde_json::from_value(json!({
            "street": "Rua A", "number": "10", "cep": "01000-000",
            "city": "São Paulo", "state": "SP", "district": "Centro"
        }))
        .unwrap();
        assert!(NormalizedAddress::from_payload(payload).unwrap().has_required_fields());

        let missing: AddressPayload = serde_json::from_value(json!({
            "street": "Rua A", "number": "10",
            "city": "São Paulo", "state": "SP", "district": "Centro"
        }))
        .unwrap();
        assert!(!NormalizedAddress::from_payload(missing).unwrap().has_required_fields());
    }
}
