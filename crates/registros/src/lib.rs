//! `fluxo-registros` — domain records: companies, transactions and
//! broadcast notifications.
//!
//! Pure data + deterministic validation; no HTTP, no storage.

pub mod datas;
pub mod empresa;
pub mod notificacao;
pub mod transacao;

pub use datas::{CampoInvalido, validar_datas};
pub use empresa::{AtualizaEmpresa, Empresa, NovaEmpresa};
pub use notificacao::{AlvoNotificacao, AtualizaNotificacao, NovaNotificacao, Notificacao, TipoNotificacao};
pub use transacao::{
    AtualizaTransacao, DestinoEntrada, NovaTransacao, StatusTransacao, TipoMaterial,
    TipoTransacao, Transacao,
};
