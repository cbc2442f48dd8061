//! The persistence collaborator.
//!
//! Per-entity-type operations, each parameterized by the [`StoreHandle`]
//! the router selected. Validation happens in the domain layer before
//! records get here; stores only create, read, replace and delete.
//! Implementations own whatever transaction semantics their backend
//! provides; this layer never retries a mutating operation; retrying a
//! create could duplicate a record.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use fluxo_auth::Conta;
use fluxo_core::{ContaId, EmpresaId, NotificacaoId, TransacaoId};
use fluxo_registros::{Empresa, Notificacao, Transacao};

use crate::store::StoreHandle;

mod in_memory;
mod postgres;

pub use in_memory::InMemoryStores;
pub use postgres::PostgresStores;

/// Opaque persistence failure. Surfaced to the caller as-is; never retried
/// automatically by this core.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage failure: {0}")]
    Backend(String),
}

#[async_trait]
pub trait EmpresaStore: Send + Sync {
    async fn create(&self, store: StoreHandle, empresa: Empresa) -> Result<Empresa, StoreError>;
    async fn get(&self, store: StoreHandle, id: EmpresaId) -> Result<Option<Empresa>, StoreError>;
    async fn list(&self, store: StoreHandle) -> Result<Vec<Empresa>, StoreError>;
    /// Replace the stored record with the same id.
    async fn update(&self, store: StoreHandle, empresa: Empresa) -> Result<Empresa, StoreError>;
    async fn delete(&self, store: StoreHandle, id: EmpresaId) -> Result<(), StoreError>;
}

#[async_trait]
pub trait TransacaoStore: Send + Sync {
    async fn create(
        &self,
        store: StoreHandle,
        transacao: Transacao,
    ) -> Result<Transacao, StoreError>;
    async fn get(
        &self,
        store: StoreHandle,
        id: TransacaoId,
    ) -> Result<Option<Transacao>, StoreError>;
    async fn list(&self, store: StoreHandle) -> Result<Vec<Transacao>, StoreError>;
    /// Replace the stored record with the same id.
    async fn update(
        &self,
        store: StoreHandle,
        transacao: Transacao,
    ) -> Result<Transacao, StoreError>;
    async fn delete(&self, store: StoreHandle, id: TransacaoId) -> Result<(), StoreError>;
}

#[async_trait]
pub trait NotificacaoStore: Send + Sync {
    async fn create(
        &self,
        store: StoreHandle,
        notificacao: Notificacao,
    ) -> Result<Notificacao, StoreError>;
    async fn get(
        &self,
        store: StoreHandle,
        id: NotificacaoId,
    ) -> Result<Option<Notificacao>, StoreError>;
    async fn list(&self, store: StoreHandle) -> Result<Vec<Notificacao>, StoreError>;
    /// Replace the stored record with the same id.
    async fn update(
        &self,
        store: StoreHandle,
        notificacao: Notificacao,
    ) -> Result<Notificacao, StoreError>;
    async fn delete(&self, store: StoreHandle, id: NotificacaoId) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ContaStore: Send + Sync {
    async fn create(&self, store: StoreHandle, conta: Conta) -> Result<Conta, StoreError>;
    async fn get(&self, store: StoreHandle, id: ContaId) -> Result<Option<Conta>, StoreError>;
    async fn get_by_username(
        &self,
        store: StoreHandle,
        username: &str,
    ) -> Result<Option<Conta>, StoreError>;
    async fn list(&self, store: StoreHandle) -> Result<Vec<Conta>, StoreError>;
    /// Replace the stored record with the same id.
    async fn update(&self, store: StoreHandle, conta: Conta) -> Result<Conta, StoreError>;
    async fn delete(&self, store: StoreHandle, id: ContaId) -> Result<(), StoreError>;
}

/// The bundle of per-entity stores the API wires in.
#[derive(Clone)]
pub struct Stores {
    pub empresas: Arc<dyn EmpresaStore>,
    pub transacoes: Arc<dyn TransacaoStore>,
    pub notificacoes: Arc<dyn NotificacaoStore>,
    pub contas: Arc<dyn ContaStore>,
}

impl Stores {
    /// All four entity stores backed by one shared in-memory instance.
    pub fn in_memory() -> Self {
        let inner = Arc::new(InMemoryStores::new());
        Self {
            empresas: inner.clone(),
            transacoes: inner.clone(),
            notificacoes: inner.clone(),
            contas: inner,
        }
    }

    /// All four entity stores backed by the two Postgres pools.
    pub fn postgres(stores: PostgresStores) -> Self {
        let inner = Arc::new(stores);
        Self {
            empresas: inner.clone(),
            transacoes: inner.clone(),
            notificacoes: inner.clone(),
            contas: inner,
        }
    }
}
