use axum::{Router, routing::get};

pub mod common;
pub mod empresas;
pub mod notificacoes;
pub mod system;
pub mod token;
pub mod transacoes;
pub mod usuarios;

/// Router for everything that runs behind the auth middleware.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/auth", token::router())
        .nest("/empresas", empresas::router())
        .nest("/transacoes", transacoes::router())
        .nest("/notificacoes", notificacoes::router())
        .nest("/usuarios", usuarios::router())
}
