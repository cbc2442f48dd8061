use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use fluxo_auth::Verb;
use fluxo_core::EmpresaId;
use fluxo_infra::{EntityKind, route};
use fluxo_registros::{AtualizaEmpresa, Empresa, NovaEmpresa};

use crate::app::routes::common::gate;
use crate::app::{errors, services::AppServices};
use crate::context::RequestIdentity;

pub fn router() -> Router {
    Router::new()
        .route("/", get(listar).post(criar))
        .route("/:id", get(obter).put(atualizar).delete(excluir))
}

pub async fn listar(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ident): Extension<RequestIdentity>,
) -> axum::response::Response {
    if let Err(response) = gate(&ident, Verb::Get) {
        return response;
    }

    let store = route(ident.lookup(), EntityKind::Empresa);
    match services.stores.empresas.list(store).await {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(error) => errors::store_error_to_response(error),
    }
}

pub async fn criar(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ident): Extension<RequestIdentity>,
    Json(body): Json<NovaEmpresa>,
) -> axum::response::Response {
    if let Err(response) = gate(&ident, Verb::Post) {
        return response;
    }

    let empresa = match Empresa::criar(body) {
        Ok(empresa) => empresa,
        Err(error) => return errors::domain_error_to_response(error),
    };

    let store = route(ident.lookup(), EntityKind::Empresa);
    match services.stores.empresas.create(store, empresa).await {
        Ok(empresa) => (StatusCode::CREATED, Json(empresa)).into_response(),
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

    let id: EmpresaId = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid empresa id");
        }
    };

    let store = route(ident.lookup(), EntityKind::Empresa);
    match services.stores.empresas.get(store, id).await {
        Ok(Some(empresa)) => (StatusCode::OK, Json(empresa)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "empresa not found"),
        Err(error) => errors::store_error_to_response(error),
    }
}

pub async fn atualizar(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ident): Extension<RequestIdentity>,
    Path(id): Path<String>,
    Json(body): Json<AtualizaEmpresa>,
) -> axum::response::Response {
    if let Err(response) = gate(&ident, Verb::Put) {
        return response;
    }

    let id: EmpresaId = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid empresa id");
        }
    };

    let store = route(ident.lookup(), EntityKind::Empresa);
    let mut empresa = match services.stores.empresas.get(store, id).await {
        Ok(Some(empresa)) => empresa,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "empresa not found");
        }
        Err(error) => return errors::store_error_to_response(error),
    };

    if let Err(error) = empresa.aplicar(body) {
        return errors::domain_error_to_response(error);
    }

    match services.stores.empresas.update(store, empresa).await {
        Ok(empresa) => (StatusCode::OK, Json(empresa)).into_response(),
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

    let id: EmpresaId = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid empresa id");
        }
    };

    let store = route(ident.lookup(), EntityKind::Empresa);
    match services.stores.empresas.delete(store, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => errors::store_error_to_response(error),
    }
}
