//! Infrastructure wiring for the API.

use std::sync::Arc;

use fluxo_auth::{Hs256Tokens, IdentityContext};
use fluxo_infra::{PostgresStores, StoreConfig, Stores};

/// Everything the handlers need, wired once at startup.
pub struct AppServices {
    pub stores: Stores,
    pub context: Arc<IdentityContext>,
    pub tokens: Arc<Hs256Tokens>,
}

/// Build services from the environment.
///
/// With both store URLs configured the API runs against Postgres;
/// otherwise it falls back to the in-memory stores (tests/dev).
pub async fn build_services(jwt_secret: String) -> AppServices {
    let stores = match StoreConfig::from_env() {
        Some(config) => match PostgresStores::connect(&config).await {
            Ok(pg) => {
                tracing::info!("connected to primary and tests stores");
                Stores::postgres(pg)
            }
            Err(error) => {
                // A broken store configuration must be loud, not a silent
                // downgrade to volatile storage.
                panic!("failed to connect configured stores: {error}");
            }
        },
        None => {
            tracing::info!("store URLs not configured; using in-memory stores");
            Stores::in_memory()
        }
    };

    AppServices {
        stores,
        context: Arc::new(IdentityContext::new()),
        tokens: Arc::new(Hs256Tokens::new(jwt_secret.as_bytes())),
    }
}
