// src/common/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// As mensagens em português são as mesmas que a API sempre devolveu.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Campos obrigatórios ausentes; cada recurso tem sua própria frase.
    #[error("{0}")]
    MissingFields(&'static str),

    #[error("Identificador inválido.")]
    InvalidId,

    #[error("O setor informado não pertence à empresa especificada.")]
    SectorCompanyMismatch,

    #[error("Informe o ID da empresa ao atualizar o setor do aviso.")]
    NoticeCompanyUnresolved,

    // Entidade referenciada por outra (validação antes da escrita)
    #[error("Empresa informada não encontrada.")]
    ReferencedCompanyNotFound,

    #[error("Filial informada não encontrada.")]
    ReferencedBranchNotFound,

    #[error("Setor informado não encontrado.")]
    ReferencedSectorNotFound,

    // Entidade alvo da própria rota
    #[error("Empresa não encontrada")]
    CompanyNotFound,

    #[error("Setor não encontrado.")]
    SectorNotFound,

    #[error("Pessoa não encontrada.")]
    PessoaNotFound,

    #[error("Endereço não encontrado.")]
    AddressNotFound,

    #[error("Aviso não encontrado.")]
    NoticeNotFound,

    #[error("Já existe um login cadastrado para esse email/empresa/filial.")]
    LoginAlreadyExists,

    #[error("CNPJ já cadastrado.")]
    CnpjAlreadyExists,

    // Fallback para outras chaves únicas que venham a existir
    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    #[error("Combinação de empresa/filial e credenciais inválida.")]
    InvalidCombination,

    // Mensagem distinta quando só a senha está errada (comportamento
    // histórico da API, mantido como está).
    #[error("Verifique os dados informado!")]
    WrongPassword,

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        use AppError::*;
        match self {
            ValidationError(_) | MissingFields(_) | InvalidId | SectorCompanyMismatch
            | NoticeCompanyUnresolved => StatusCode::BAD_REQUEST,

            ReferencedCompanyNotFound | ReferencedBranchNotFound | ReferencedSectorNotFound
            | CompanyNotFound | SectorNotFound | PessoaNotFound | AddressNotFound
            | NoticeNotFound => StatusCode::NOT_FOUND,

            LoginAlreadyExists | CnpjAlreadyExists | UniqueConstraintViolation(_) => {
                StatusCode::CONFLICT
            }

            InvalidCombination | WrongPassword => StatusCode::UNAUTHORIZED,

            DatabaseError(_) | BcryptError(_) | InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Detalhes de validação campo a campo, no mesmo formato de sempre.
        if let AppError::ValidationError(errors) = &self {
            let mut details = std::collections::HashMap::new();
            for (field, field_errors) in errors.field_errors() {
                let messages: Vec<String> = field_errors
                    .iter()
                    .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .collect();
                details.insert(field.to_string(), messages);
            }
            let body = Json(json!({
                "message": "Um ou mais campos são inválidos.",
                "details": details,
            }));
            return (StatusCode::BAD_REQUEST, body).into_response();
        }

        let status = self.status_code();

        // Tudo que é 500 é logado no servidor e vira uma mensagem genérica.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Erro interno do servidor: {}", self);
            "Erro interno do servidor.".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({ "message": message }));
        (status, body).into_response()
    }
}
