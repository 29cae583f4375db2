// src/models/pessoa.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::company::CompanyBrief;

// Linha da tabela `pessoas` (a identidade com login, unificando os
// cadastros históricos de pessoa e de credencial).
#[derive(Debug, Clone, FromRow)]
pub struct Pessoa {
    pub id: Uuid,
    pub nome: String,
    pub cargo: Option<String>,
    pub telefone: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub company_id: Uuid,
    pub branch_id: Option<Uuid>,
    pub status: Option<i16>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// Payloads
// ---

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPessoaPayload {
    #[serde(alias = "name")]
    pub nome: Option<String>,
    pub cargo: Option<String>,
    pub telefone: Option<String>,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: Option<String>,
    #[serde(alias = "company")]
    pub company_id: Option<String>,
    #[serde(alias = "branch")]
    pub branch_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePessoaPayload {
    #[serde(alias = "name")]
    pub nome: Option<String>,
    pub cargo: Option<String>,
    pub telefone: Option<String>,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: Option<String>,
    #[serde(alias = "company")]
    pub company_id: Option<String>,
    #[serde(alias = "branch")]
    pub branch_id: Option<String>,
    pub status: Option<Value>,
}

// O login mantém só as checagens de presença: qualquer formato estranho de
// email cai na mesma resposta genérica de combinação inválida.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(alias = "branch")]
    pub branch_id: Option<String>,
}

/// Registro pronto para persistir: referências já validadas e senha já
/// transformada em hash.
#[derive(Debug, Clone)]
pub struct NewPessoa {
    pub nome: String,
    pub cargo: Option<String>,
    pub telefone: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub company_id: Uuid,
    pub branch_id: Option<Uuid>,
}

/// Atualização parcial. `branch_id` externo = "recalcular a filial";
/// o interno é o valor resolvido (null = pertence à matriz).
#[derive(Debug, Clone, Default)]
pub struct PessoaUpdate {
    pub nome: Option<String>,
    pub cargo: Option<String>,
    pub telefone: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub company_id: Option<Uuid>,
    pub branch_id: Option<Option<Uuid>>,
    pub status: Option<i16>,
}

// ---
// Respostas: o hash de senha nunca aparece aqui, por construção.
// ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PessoaResponse {
    pub id: Uuid,
    pub nome: String,
    pub cargo: Option<String>,
    pub telefone: Option<String>,
    pub email: String,
    pub company: Option<CompanyBrief>,
    pub branch: Option<CompanyBrief>,
    pub status: Option<i16>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PessoaResponse {
    pub fn from_row(
        pessoa: Pessoa,
        company: Option<CompanyBrief>,
        branch: Option<CompanyBrief>,
    ) -> Self {
        Self {
            id: pessoa.id,
            nome: pessoa.nome,
            cargo: pessoa.cargo,
            telefone: pessoa.telefone,
            email: pessoa.email,
            company,
            branch,
            status: pessoa.status,
            created_at: pessoa.created_at,
            updated_at: pessoa.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub company_id: Uuid,
    /// Resolvida: igual ao id da empresa quando o login é da própria matriz.
    pub branch_id: Uuid,
    pub matriz: bool,
}
