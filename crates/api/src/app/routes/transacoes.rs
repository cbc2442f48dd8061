use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;

use fluxo_auth::Verb;
use fluxo_core::{EmpresaId, TransacaoId};
use fluxo_infra::{EntityKind, route};
use fluxo_registros::{AtualizaTransacao, NovaTransacao, Transacao, datas};

use crate::app::routes::common::gate;
use crate::app::{dto, errors, services::AppServices};
use crate::context::RequestIdentity;

pub fn router() -> Router {
    Router::new()
        .route("/", get(listar).post(criar))
        .route("/:id", get(obter).patch(atualizar).delete(excluir))
}

/// Company name shown alongside a transaction, when the reference resolves.
///
/// Routes on its own: the store decision is made per operation, never
/// carried over from the write that preceded it.
async fn nome_empresa(
    services: &AppServices,
    ident: &RequestIdentity,
    empresa: EmpresaId,
) -> Option<String> {
    let store = route(ident.lookup(), EntityKind::Empresa);
    services
        .stores
        .empresas
        .get(store, empresa)
        .await
        .ok()
        .flatten()
        .map(|e| e.nome)
}

pub async fn listar(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ident): Extension<RequestIdentity>,
) -> axum::response::Response {
    if let Err(response) = gate(&ident, Verb::Get) {
        return response;
    }

    let store = route(ident.lookup(), EntityKind::Transacao);
    let transacoes = match services.stores.transacoes.list(store).await {
        Ok(items) => items,
        Err(error) => return errors::store_error_to_response(error),
    };

    // One lookup for all names instead of one per transaction.
    let nomes: HashMap<EmpresaId, String> = match services.stores.empresas.list(store).await {
        Ok(empresas) => empresas.into_iter().map(|e| (e.id, e.nome)).collect(),
        Err(error) => return errors::store_error_to_response(error),
    };

    let items: Vec<_> = transacoes
        .iter()
        .map(|t| dto::transacao_to_json(t, nomes.get(&t.empresa).map(String::as_str)))
        .collect();

    (StatusCode::OK, Json(items)).into_response()
}

pub async fn criar(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ident): Extension<RequestIdentity>,
    Json(body): Json<NovaTransacao>,
) -> axum::response::Response {
    if let Err(response) = gate(&ident, Verb::Post) {
        return response;
    }

    let hoje = Utc::now().date_naive();
    if let Err(violacoes) = datas::validar_nova(&body, hoje) {
        return errors::validation_errors_to_response(violacoes);
    }

    let transacao = Transacao::criar(body, hoje);
    let store = route(ident.lookup(), EntityKind::Transacao);

    match services.stores.transacoes.create(store, transacao).await {
        Ok(transacao) => {
            let nome = nome_empresa(&services, &ident, transacao.empresa).await;
            (
                StatusCode::CREATED,
                Json(dto::transacao_to_json(&transacao, nome.as_deref())),
            )
                .into_response()
        }
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

    let id: TransacaoId = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_id",
                "invalid transacao id",
            );
        }
    };

    let store = route(ident.lookup(), EntityKind::Transacao);
    match services.stores.transacoes.get(store, id).await {
        Ok(Some(transacao)) => {
            let nome = nome_empresa(&services, &ident, transacao.empresa).await;
            (
                StatusCode::OK,
                Json(dto::transacao_to_json(&transacao, nome.as_deref())),
            )
                .into_response()
        }
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "transacao not found"),
        Err(error) => errors::store_error_to_response(error),
    }
}

pub async fn atualizar(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ident): Extension<RequestIdentity>,
    Path(id): Path<String>,
    Json(body): Json<AtualizaTransacao>,
) -> axum::response::Response {
    if let Err(response) = gate(&ident, Verb::Patch) {
        return response;
    }

    let id: TransacaoId = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_id",
                "invalid transacao id",
            );
        }
    };

    let store = route(ident.lookup(), EntityKind::Transacao);
    let mut transacao = match services.stores.transacoes.get(store, id).await {
        Ok(Some(transacao)) => transacao,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "transacao not found");
        }
        Err(error) => return errors::store_error_to_response(error),
    };

    // Dates absent from the payload are validated against the *stored*
    // values, never against today.
    let hoje = Utc::now().date_naive();
    if let Err(violacoes) = datas::validar_atualizacao(&body, &transacao, hoje) {
        return errors::validation_errors_to_response(violacoes);
    }

    transacao.aplicar(body);

    match services.stores.transacoes.update(store, transacao).await {
        Ok(transacao) => {
            let nome = nome_empresa(&services, &ident, transacao.empresa).await;
            (
                StatusCode::OK,
                Json(dto::transacao_to_json(&transacao, nome.as_deref())),
            )
                .into_response()
        }
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

    let id: TransacaoId = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_id",
                "invalid transacao id",
            );
        }
    };

    let store = route(ident.lookup(), EntityKind::Transacao);
    match services.stores.transacoes.delete(store, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => errors::store_error_to_response(error),
    }
}
