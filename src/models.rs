// src/models.rs

pub mod address;
pub mod company;
pub mod notice;
pub mod pessoa;
pub mod sector;

use serde::{Deserialize, Deserializer};

/// Distingue campo ausente (None) de campo presente com null (Some(None)).
/// Usado nos payloads de atualização em que "não veio" mantém o valor e
/// "veio null" limpa o campo.
pub(crate) fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

/// Texto vindo do cliente: aparado; vazio conta como ausente.
pub(crate) fn clean_text(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
