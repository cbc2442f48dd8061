use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use fluxo_auth::Role;
use fluxo_infra::{EntityKind, route};

use crate::context::RequestIdentity;
use crate::middleware::require_authenticated;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// GET /whoami - echo the resolved identity, its role and where
/// non-system operations of this request would be routed.
pub async fn whoami(Extension(ident): Extension<RequestIdentity>) -> axum::response::Response {
    let identity = match require_authenticated(&ident) {
        Ok(identity) => identity,
        Err(response) => return response,
    };

    let papel = Role::resolve(&identity);
    let store = route(ident.lookup(), EntityKind::Transacao);

    Json(serde_json::json!({
        "id": identity.id().map(|id| id.to_string()),
        "username": identity.username(),
        "papel": papel.as_str(),
        "store": store.as_str(),
    }))
    .into_response()
}
