// src/common/filters.rs
//
// Helpers de filtro e normalização compartilhados por todos os recursos:
// resolução do filtro de status, normalização de filial, busca "contém" e
// leitura de valores booleanos vindos da query string.

use serde_json::Value;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::common::error::AppError;

pub const ACTIVE_STATUS: i64 = 1;

/// Filtro de status já resolvido, pronto para virar predicado.
///
/// `ActiveOrUnset` cobre registros criados antes do campo `status` existir:
/// eles ficam com a coluna NULL e contam como ativos.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// `status=all`: nenhuma restrição.
    Any,
    /// Ausente, vazio, "1" ou valor não numérico: ativo ou sem status.
    #[default]
    ActiveOrUnset,
    /// Qualquer outro número: igualdade exata.
    Exact(i64),
}

impl StatusFilter {
    /// Resolve o valor cru da query string (`?status=`).
    pub fn resolve(raw: Option<&str>) -> Self {
        let value = match raw {
            None => return StatusFilter::ActiveOrUnset,
            Some(v) => v.trim(),
        };

        if value.is_empty() {
            return StatusFilter::ActiveOrUnset;
        }
        if value == "all" {
            return StatusFilter::Any;
        }

        match value.parse::<i64>() {
            Ok(ACTIVE_STATUS) | Err(_) => StatusFilter::ActiveOrUnset,
            Ok(parsed) => StatusFilter::Exact(parsed),
        }
    }

    /// Avalia o predicado sobre o status de um registro.
    pub fn matches(&self, status: Option<i16>) -> bool {
        match self {
            StatusFilter::Any => true,
            StatusFilter::ActiveOrUnset => {
                status.is_none() || status.map(i64::from) == Some(ACTIVE_STATUS)
            }
            StatusFilter::Exact(expected) => status.map(i64::from) == Some(*expected),
        }
    }

    /// Acrescenta a cláusula correspondente (sempre em conjunção) a uma
    /// consulta em construção.
    pub fn push_sql(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        match self {
            StatusFilter::Any => {}
            StatusFilter::ActiveOrUnset => {
                builder.push(" AND (status = 1 OR status IS NULL)");
            }
            StatusFilter::Exact(expected) => {
                builder.push(" AND status = ");
                builder.push_bind(*expected);
            }
        }
    }
}

/// Status vindo do corpo da requisição: aceita número ou string numérica;
/// qualquer outra coisa é descartada (o registro fica com o default).
pub fn sanitize_status_value(value: Option<&Value>) -> Option<i16> {
    match value? {
        Value::Number(n) => n.as_i64().and_then(|v| i16::try_from(v).ok()),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<i16>().ok()
        }
        _ => None,
    }
}

/// `true/1/yes/y` e `false/0/no/n`, sem diferenciar maiúsculas; o resto não
/// aplica filtro nenhum.
pub fn parse_boolean_like(value: Option<&str>) -> Option<bool> {
    let normalized = value?.trim().to_lowercase();
    match normalized.as_str() {
        "true" | "1" | "yes" | "y" => Some(true),
        "false" | "0" | "no" | "n" => Some(false),
        _ => None,
    }
}

/// Filial igual à empresa (ou ausente) significa "a própria matriz".
pub fn normalize_branch(company_id: Uuid, branch_id: Option<Uuid>) -> Option<Uuid> {
    match branch_id {
        Some(branch) if branch != company_id => Some(branch),
        _ => None,
    }
}

/// Escapa curingas do LIKE para a busca "contém" literal.
pub fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

/// Id vindo do corpo ou da query string. Strings vazias contam como ausente.
pub fn parse_optional_id(value: Option<&str>) -> Result<Option<Uuid>, AppError> {
    match value {
        None => Ok(None),
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            Uuid::parse_str(trimmed).map(Some).map_err(|_| AppError::InvalidId)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_ausente_vazio_ou_um_viram_ativo_ou_sem_status() {
        assert_eq!(StatusFilter::resolve(None), StatusFilter::ActiveOrUnset);
        assert_eq!(StatusFilter::resolve(Some("")), StatusFilter::ActiveOrUnset);
        assert_eq!(StatusFilter::resolve(Some("1")), StatusFilter::ActiveOrUnset);
    }

    #[test]
    fn status_zero_vira_igualdade_exata() {
        assert_eq!(StatusFilter::resolve(Some("0")), StatusFilter::Exact(0));
    }

    #[test]
    fn status_all_nao_restringe() {
        assert_eq!(StatusFilter::resolve(Some("all")), StatusFilter::Any);
    }

    #[test]
    fn status_nao_numerico_cai_no_padrao_ativo() {
        assert_eq!(StatusFilter::resolve(Some("xyz")), StatusFilter::ActiveOrUnset);
    }

    #[test]
    fn predicado_ativo_ou_sem_status() {
        let filter = StatusFilter::ActiveOrUnset;
        assert!(filter.matches(Some(1)));
        assert!(filter.matches(None));
        assert!(!filter.matches(Some(0)));
    }

    #[test]
    fn predicado_exato_nao_aceita_sem_status() {
        let filter = StatusFilter::Exact(0);
        assert!(filter.matches(Some(0)));
        assert!(!filter.matches(Some(1)));
        assert!(!filter.matches(None));
    }

    #[test]
    fn sanitiza_status_do_corpo() {
        assert_eq!(sanitize_status_value(Some(&json!(0))), Some(0));
        assert_eq!(sanitize_status_value(Some(&json!("1"))), Some(1));
        assert_eq!(sanitize_status_value(Some(&json!(""))), None);
        assert_eq!(sanitize_status_value(Some(&json!("abc"))), None);
        assert_eq!(sanitize_status_value(Some(&json!(null))), None);
        assert_eq!(sanitize_status_value(None), None);
    }

    #[test]
    fn booleanos_flexiveis() {
        assert_eq!(parse_boolean_like(Some("true")), Some(true));
        assert_eq!(parse_boolean_like(Some("YES")), Some(true));
        assert_eq!(parse_boolean_like(Some("1")), Some(true));
        assert_eq!(parse_boolean_like(Some("0")), Some(false));
        assert_eq!(parse_boolean_like(Some("n")), Some(false));
        assert_eq!(parse_boolean_like(Some("talvez")), None);
        assert_eq!(parse_boolean_like(None), None);
    }

    #[test]
    fn filial_igual_a_empresa_ou_ausente_vira_matriz() {
        let company = Uuid::new_v4();
        let branch = Uuid::new_v4();
        assert_eq!(normalize_branch(company, None), None);
        assert_eq!(normalize_branch(company, Some(company)), None);
        assert_eq!(normalize_branch(company, Some(branch)), Some(branch));
    }

    #[test]
    fn escape_de_curingas_do_like() {
        assert_eq!(escape_like("50%_a\\b"), "50\\%\\_a\\\\b");
    }

    #[test]
    fn ids_opcionais() {
        let id = Uuid::new_v4();
        assert_eq!(parse_optional_id(None).unwrap(), None);
        assert_eq!(parse_optional_id(Some("  ")).unwrap(), None);
        assert_eq!(parse_optional_id(Some(&id.to_string())).unwrap(), Some(id));
        assert!(matches!(parse_optional_id(Some("nope")), Err(AppError::InvalidId)));
    }
}
