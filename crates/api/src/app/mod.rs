//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: infrastructure wiring (stores, identity context, tokens)
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use fluxo_auth::TokenVerifier;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(jwt_secret: String) -> Router {
    let services = Arc::new(services::build_services(jwt_secret).await);

    let auth_state = middleware::AuthState {
        verifier: Arc::clone(&services.tokens) as Arc<dyn TokenVerifier>,
        context: Arc::clone(&services.context),
    };

    // Everything behind the middleware gets an identity context entry,
    // including /auth/token, which accepts anonymous callers.
    let authenticated = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(authenticated)
        .layer(ServiceBuilder::new())
}
