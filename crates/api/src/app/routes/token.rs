//! Credential exchange: username + password for a bearer token.
//!
//! Anonymous-accessible: the one route behind the middleware that does
//! not require an authenticated identity. A request that *presents* a
//! credential still has it verified by the middleware; only the absence
//! of one is tolerated here.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use chrono::{Duration, Utc};

use fluxo_auth::{JwtClaims, senha};
use fluxo_infra::{EntityKind, route};

use crate::app::{dto, errors, services::AppServices};
use crate::context::RequestIdentity;

/// Token lifetime. Clients are expected to re-authenticate afterwards.
const TOKEN_TTL_MINUTES: i64 = 60;

pub fn router() -> Router {
    Router::new().route("/token", post(emitir_token))
}

/// POST /auth/token - verify credentials against the primary store and
/// mint an HS256 bearer token.
pub async fn emitir_token(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ident): Extension<RequestIdentity>,
    Json(body): Json<dto::TokenRequest>,
) -> axum::response::Response {
    // Accounts are system-reserved; this always lands on the primary store.
    let store = route(ident.lookup(), EntityKind::Conta);

    let conta = match services
        .stores
        .contas
        .get_by_username(store, &body.username)
        .await
    {
        Ok(Some(conta)) => conta,
        Ok(None) => {
            return errors::json_error(
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                "Credenciais inválidas.",
            );
        }
        Err(error) => return errors::store_error_to_response(error),
    };

    if !senha::verificar(&conta.senha_hash, &body.senha) {
        return errors::json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "Credenciais inválidas.",
        );
    }

    let now = Utc::now();
    let claims = JwtClaims {
        sub: conta.id,
        username: conta.username.clone(),
        iat: now,
        exp: now + Duration::minutes(TOKEN_TTL_MINUTES),
    };

    match services.tokens.mint(&claims) {
        Ok(access) => (
            StatusCode::OK,
            Json(serde_json::json!({ "access": access, "username": conta.username })),
        )
            .into_response(),
        Err(error) => errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "token_error",
            error.to_string(),
        ),
    }
}
