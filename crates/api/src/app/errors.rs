//! Consistent JSON error responses.
//!
//! One mapping per error family. Authentication failures (401) and
//! permission failures (403) go through different functions on purpose:
//! "you are not who you say you are" and "you are known but not allowed"
//! must stay distinguishable to callers.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use fluxo_auth::{AccountCreationError, AuthError, PermissionError};
use fluxo_core::DomainError;
use fluxo_infra::StoreError;
use fluxo_registros::CampoInvalido;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// 401, always. An invalid credential is never downgraded to anonymous.
pub fn auth_error_to_response(err: AuthError) -> axum::response::Response {
    json_error(StatusCode::UNAUTHORIZED, "auth_error", err.to_string())
}

/// 403 with the specific denial reason.
pub fn permission_error_to_response(err: PermissionError) -> axum::response::Response {
    json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string())
}

/// The account-creation table: format problems are 400, permission
/// problems 403, an unrecognized creator 401.
pub fn account_creation_error_to_response(err: AccountCreationError) -> axum::response::Response {
    let status = match err {
        AccountCreationError::SufixoInvalido => StatusCode::BAD_REQUEST,
        AccountCreationError::GestorSomenteVisitante | AccountCreationError::SemPermissao => {
            StatusCode::FORBIDDEN
        }
        AccountCreationError::NaoAutenticado => StatusCode::UNAUTHORIZED,
    };
    let code = match err {
        AccountCreationError::SufixoInvalido => "invalid_username",
        AccountCreationError::NaoAutenticado => "auth_required",
        _ => "forbidden",
    };
    json_error(status, code, err.to_string())
}

/// 400 listing *every* violated field, grouped by field name.
pub fn validation_errors_to_response(violacoes: Vec<CampoInvalido>) -> axum::response::Response {
    let mut campos: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();
    for violacao in violacoes {
        campos.entry(violacao.campo).or_default().push(violacao.mensagem);
    }

    (
        StatusCode::BAD_REQUEST,
        axum::Json(json!({
            "error": "validation_error",
            "campos": campos,
        })),
    )
        .into_response()
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
    }
}

/// Persistence failures surface as-is; nothing here retries.
pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        StoreError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        StoreError::Backend(msg) => {
            tracing::error!(error = %msg, "store backend failure");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                "persistence failure",
            )
        }
    }
}
