//! `fluxo-infra` — store selection and the persistence collaborator.
//!
//! The core never issues raw queries; it picks a [`StoreHandle`] per
//! operation and hands records to the per-entity store traits, which the
//! in-memory (tests/dev) and Postgres implementations satisfy.

pub mod config;
pub mod repository;
pub mod router;
pub mod store;

pub use config::StoreConfig;
pub use repository::{
    ContaStore, EmpresaStore, InMemoryStores, NotificacaoStore, PostgresStores, StoreError,
    Stores, TransacaoStore,
};
pub use router::{EntityKind, route};
pub use store::StoreHandle;
