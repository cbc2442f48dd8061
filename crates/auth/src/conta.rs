//! User account records ("Conta").
//!
//! Accounts are system-reserved: they always live in the primary store,
//! whatever identity is driving the request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fluxo_core::ContaId;

use crate::senha::{self, SenhaError};

/// A stored user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conta {
    pub id: ContaId,
    pub username: String,

    /// Argon2 PHC string. Never serialized outward.
    #[serde(skip_serializing)]
    pub senha_hash: String,

    pub criado_em: DateTime<Utc>,
}

impl Conta {
    pub fn nova(username: impl Into<String>, senha_hash: impl Into<String>) -> Self {
        Self {
            id: ContaId::new(),
            username: username.into(),
            senha_hash: senha_hash.into(),
            criado_em: Utc::now(),
        }
    }

    /// Apply a typed update.
    ///
    /// Exactly two fields are mutable. A new password goes through a
    /// distinct re-hash step; the stored hash is never assigned from raw
    /// input.
    pub fn aplicar(&mut self, update: AtualizaConta) -> Result<(), SenhaError> {
        if let Some(username) = update.username {
            self.username = username;
        }
        if let Some(nova_senha) = update.senha {
            self.senha_hash = senha::hash(&nova_senha)?;
        }
        Ok(())
    }
}

/// Incoming account-creation payload.
#[derive(Debug, Clone, Deserialize)]
pub struct NovaConta {
    pub username: String,
    pub senha: String,
}

/// Typed account update: the only mutable fields, spelled out.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AtualizaConta {
    pub username: Option<String>,
    pub senha: Option<String>,
}
