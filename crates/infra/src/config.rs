//! Store connection configuration.

/// Connection parameters for the two physical stores.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub primario_url: String,
    pub testes_url: String,
}

impl StoreConfig {
    /// Read both store URLs from the environment.
    ///
    /// Returns `None` unless both `FLUXO_DATABASE_URL` and
    /// `FLUXO_TESTS_DATABASE_URL` are set; a half-configured pair would
    /// silently collapse the two stores into one.
    pub fn from_env() -> Option<Self> {
        let primario_url = std::env::var("FLUXO_DATABASE_URL").ok()?;
        let testes_url = std::env::var("FLUXO_TESTS_DATABASE_URL").ok()?;
        Some(Self {
            primario_url,
            testes_url,
        })
    }
}
