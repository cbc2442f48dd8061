//! Broadcast notifications ("Notificacao").
//!
//! Read by any authenticated identity regardless of role; the `alvo`
//! field is display metadata for clients, not an access filter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fluxo_core::{DomainError, NotificacaoId};

/// Severity/category of the notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipoNotificacao {
    Aviso,
    Pendencia,
    Update,
}

/// Audience the notification addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlvoNotificacao {
    Todos,
    Gestor,
    View,
    Dev,
}

impl TipoNotificacao {
    pub fn as_str(self) -> &'static str {
        match self {
            TipoNotificacao::Aviso => "aviso",
            TipoNotificacao::Pendencia => "pendencia",
            TipoNotificacao::Update => "update",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "aviso" => Some(TipoNotificacao::Aviso),
            "pendencia" => Some(TipoNotificacao::Pendencia),
            "update" => Some(TipoNotificacao::Update),
            _ => None,
        }
    }
}

impl AlvoNotificacao {
    pub fn as_str(self) -> &'static str {
        match self {
            AlvoNotificacao::Todos => "todos",
            AlvoNotificacao::Gestor => "gestor",
            AlvoNotificacao::View => "view",
            AlvoNotificacao::Dev => "dev",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "todos" => Some(AlvoNotificacao::Todos),
            "gestor" => Some(AlvoNotificacao::Gestor),
            "view" => Some(AlvoNotificacao::View),
            "dev" => Some(AlvoNotificacao::Dev),
            _ => None,
        }
    }
}

/// A stored notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notificacao {
    pub id: NotificacaoId,
    pub titulo: String,
    pub mensagem: String,
    pub tipo: TipoNotificacao,
    pub alvo: AlvoNotificacao,
    pub ativo: bool,
    pub criado_em: DateTime<Utc>,
}

impl Notificacao {
    pub fn criar(nova: NovaNotificacao) -> Result<Notificacao, DomainError> {
        let titulo = nova.titulo.trim().to_string();
        if titulo.is_empty() {
            return Err(DomainError::validation("titulo não pode ser vazio"));
        }
        let mensagem = nova.mensagem.trim().to_string();
        if mensagem.is_empty() {
            return Err(DomainError::validation("mensagem não pode ser vazia"));
        }

        Ok(Notificacao {
            id: NotificacaoId::new(),
            titulo,
            mensagem,
            tipo: nova.tipo,
            alvo: nova.alvo,
            ativo: nova.ativo,
            criado_em: Utc::now(),
        })
    }

    pub fn aplicar(&mut self, update: AtualizaNotificacao) {
        if let Some(titulo) = update.titulo {
            self.titulo = titulo;
        }
        if let Some(mensagem) = update.mensagem {
            self.mensagem = mensagem;
        }
        if let Some(tipo) = update.tipo {
            self.tipo = tipo;
        }
        if let Some(alvo) = update.alvo {
            self.alvo = alvo;
        }
        if let Some(ativo) = update.ativo {
            self.ativo = ativo;
        }
    }
}

/// Creation payload.
#[derive(Debug, Clone, Deserialize)]
pub struct NovaNotificacao {
    pub titulo: String,
    pub mensagem: String,
    pub tipo: TipoNotificacao,
    pub alvo: AlvoNotificacao,
    #[serde(default = "ativo_default")]
    pub ativo: bool,
}

fn ativo_default() -> bool {
    true
}

/// Typed update payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AtualizaNotificacao {
    pub titulo: Option<String>,
    pub mensagem: Option<String>,
    pub tipo: Option<TipoNotificacao>,
    pub alvo: Option<AlvoNotificacao>,
    pub ativo: Option<bool>,
}
