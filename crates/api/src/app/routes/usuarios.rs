//! Account management.
//!
//! Creation is governed by the role table in `fluxo_auth::gate`: the
//! target-suffix format check runs before any role restriction, so a
//! malformed username is always a 400, never a 403.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use fluxo_auth::{
    AccountCreationError, AtualizaConta, Conta, NovaConta, Role, Verb,
    authorize_account_creation, senha,
};
use fluxo_core::ContaId;
use fluxo_infra::{EntityKind, route};

use crate::app::routes::common::gate;
use crate::app::{errors, services::AppServices};
use crate::context::RequestIdentity;
use crate::middleware::require_authenticated;

pub fn router() -> Router {
    Router::new()
        .route("/", get(listar).post(criar))
        .route("/:id", get(obter).patch(atualizar).delete(excluir))
}

pub async fn listar(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ident): Extension<RequestIdentity>,
) -> axum::response::Response {
    if let Err(response) = gate(&ident, Verb::Get) {
        return response;
    }

    let store = route(ident.lookup(), EntityKind::Conta);
    match services.stores.contas.list(store).await {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(error) => errors::store_error_to_response(error),
    }
}

pub async fn criar(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ident): Extension<RequestIdentity>,
    Json(body): Json<NovaConta>,
) -> axum::response::Response {
    let identity = match require_authenticated(&ident) {
        Ok(identity) => identity,
        Err(response) => return response,
    };

    let papel = Role::resolve(&identity);
    if let Err(error) = authorize_account_creation(papel, &body.username) {
        return errors::account_creation_error_to_response(error);
    }

    let senha_hash = match senha::hash(&body.senha) {
        Ok(hash) => hash,
        Err(error) => {
            return errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "hash_error",
                error.to_string(),
            );
        }
    };

    let conta = Conta::nova(body.username, senha_hash);

    // Accounts are system-reserved: this always selects the primary store.
    let store = route(ident.lookup(), EntityKind::Conta);
    match services.stores.contas.create(store, conta).await {
        Ok(conta) => (StatusCode::CREATED, Json(conta)).into_response(),
        Err(error) => errors::store_error_to_response(error),
    }
}

pub async fn obter(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ident): Extension<RequestIdentity>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(response) = gate(&ident, Verb::Get) {
        return response;
    }

    let id: ContaId = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid conta id");
        }
    };

    let store = route(ident.lookup(), EntityKind::Conta);
    match services.stores.contas.get(store, id).await {
        Ok(Some(conta)) => (StatusCode::OK, Json(conta)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "conta not found"),
        Err(error) => errors::store_error_to_response(error),
    }
}

pub async fn atualizar(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ident): Extension<RequestIdentity>,
    Path(id): Path<String>,
    Json(body): Json<AtualizaConta>,
) -> axum::response::Response {
    if let Err(response) = gate(&ident, Verb::Patch) {
        return response;
    }

    let id: ContaId = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid conta id");
        }
    };

    // A renamed account must still carry a recognized role suffix.
    if let Some(username) = &body.username {
        if Role::from_username(username) == Role::None {
            return errors::account_creation_error_to_response(
                AccountCreationError::SufixoInvalido,
            );
        }
    }

    let store = route(ident.lookup(), EntityKind::Conta);
    let mut conta = match services.stores.contas.get(store, id).await {
        Ok(Some(conta)) => conta,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "conta not found");
        }
        Err(error) => return errors::store_error_to_response(error),
    };

    if let Err(error) = conta.aplicar(body) {
        return errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "hash_error",
            error.to_string(),
        );
    }

    match services.stores.contas.update(store, conta).await {
        Ok(conta) => (StatusCode::OK, Json(conta)).into_response(),
        Err(error) => errors::store_error_to_response(error),
    }
}

pub async fn excluir(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ident): Extension<RequestIdentity>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(response) = gate(&ident, Verb::Delete) {
        return response;
    }

    let id: ContaId = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid conta id");
        }
    };

    let store = route(ident.lookup(), EntityKind::Conta);
    match services.stores.contas.delete(store, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => errors::store_error_to_response(error),
    }
}
