use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use fluxo_auth::Verb;
use fluxo_core::NotificacaoId;
use fluxo_infra::{EntityKind, route};
use fluxo_registros::{AtualizaNotificacao, NovaNotificacao, Notificacao};

use crate::app::routes::common::gate;
use crate::app::{errors, services::AppServices};
use crate::context::RequestIdentity;

pub fn router() -> Router {
    Router::new()
        .route("/", get(listar).post(criar))
        .route("/:id", get(obter).put(atualizar).delete(excluir))
}

/// Any authenticated identity reads all notifications; `alvo` is display
/// metadata, not an access filter.
pub async fn listar(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ident): Extension<RequestIdentity>,
) -> axum::response::Response {
    if let Err(response) = gate(&ident, Verb::Get) {
        return response;
    }

    let store = route(ident.lookup(), EntityKind::Notificacao);
    match services.stores.notificacoes.list(store).await {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(error) => errors::store_error_to_response(error),
    }
}

pub async fn criar(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ident): Extension<RequestIdentity>,
    Json(body): Json<NovaNotificacao>,
) -> axum::response::Response {
    if let Err(response) = gate(&ident, Verb::Post) {
        return response;
    }

    let notificacao = match Notificacao::criar(body) {
        Ok(notificacao) => notificacao,
        Err(error) => return errors::domain_error_to_response(error),
    };

    let store = route(ident.lookup(), EntityKind::Notificacao);
    match services.stores.notificacoes.create(store, notificacao).await {
        Ok(notificacao) => (StatusCode::CREATED, Json(notificacao)).into_response(),
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

    let id: NotificacaoId = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_id",
                "invalid notificacao id",
            );
        }
    };

    let store = route(ident.lookup(), EntityKind::Notificacao);
    match services.stores.notificacoes.get(store, id).await {
        Ok(Some(notificacao)) => (StatusCode::OK, Json(notificacao)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "notificacao not found"),
        Err(error) => errors::store_error_to_response(error),
    }
}

pub async fn atualizar(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ident): Extension<RequestIdentity>,
    Path(id): Path<String>,
    Json(body): Json<AtualizaNotificacao>,
) -> axum::response::Response {
    if let Err(response) = gate(&ident, Verb::Put) {
        return response;
    }

    let id: NotificacaoId = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_id",
                "invalid notificacao id",
            );
        }
    };

    let store = route(ident.lookup(), EntityKind::Notificacao);
    let mut notificacao = match services.stores.notificacoes.get(store, id).await {
        Ok(Some(notificacao)) => notificacao,
        Ok(None) => {
            return errors::json_error(
                StatusCode::NOT_FOUND,
                "not_found",
                "notificacao not found",
            );
        }
        Err(error) => return errors::store_error_to_response(error),
    };

    notificacao.aplicar(body);

    match services.stores.notificacoes.update(store, notificacao).await {
        Ok(notificacao) => (StatusCode::OK, Json(notificacao)).into_response(),
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

    let id: NotificacaoId = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_id",
                "invalid notificacao id",
            );
        }
    };

    let store = route(ident.lookup(), EntityKind::Notificacao);
    match services.stores.notificacoes.delete(store, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => errors::store_error_to_response(error),
    }
}
