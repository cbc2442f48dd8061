//! Postgres-backed store implementation.
//!
//! Two connection pools, one per physical store; [`StoreHandle`] selects
//! the pool per operation. Schema expected by this module:
//!
//! ```sql
//! CREATE TABLE empresas (
//!     id            UUID PRIMARY KEY,
//!     nome          TEXT NOT NULL,
//!     cnpj          TEXT NOT NULL UNIQUE,
//!     tipo          JSONB NOT NULL DEFAULT '[]'::jsonb,
//!     licitacao     BOOLEAN NOT NULL DEFAULT FALSE,
//!     emendas       JSONB NOT NULL DEFAULT '[]'::jsonb
//! );
//!
//! CREATE TABLE transacoes (
//!     id              UUID PRIMARY KEY,
//!     empresa         UUID NOT NULL REFERENCES empresas(id) ON DELETE CASCADE,
//!     tipo            TEXT NOT NULL,
//!     status          TEXT NOT NULL,
//!     nf              TEXT,
//!     descricao       TEXT,
//!     valor_centavos  BIGINT NOT NULL,
//!     data            DATE NOT NULL,
//!     data_entrada    DATE NOT NULL,
//!     data_saida      DATE,
//!     tipo_material   TEXT,
//!     destino_entrada TEXT,
//!     emenda_origem   TEXT
//! );
//!
//! CREATE TABLE notificacoes (
//!     id        UUID PRIMARY KEY,
//!     titulo    TEXT NOT NULL,
//!     mensagem  TEXT NOT NULL,
//!     tipo      TEXT NOT NULL,
//!     alvo      TEXT NOT NULL,
//!     ativo     BOOLEAN NOT NULL DEFAULT TRUE,
//!     criado_em TIMESTAMPTZ NOT NULL
//! );
//!
//! CREATE TABLE contas (
//!     id         UUID PRIMARY KEY,
//!     username   TEXT NOT NULL UNIQUE,
//!     senha_hash TEXT NOT NULL,
//!     criado_em  TIMESTAMPTZ NOT NULL
//! );
//! ```
//!
//! ## Error mapping
//!
//! | PostgreSQL error code | `StoreError` | Scenario |
//! |---|---|---|
//! | `23505` (unique violation) | `Conflict` | duplicate `cnpj`/`username` within one store |
//! | `23503` (foreign key violation) | `Conflict` | transaction referencing a company absent from this store |
//! | other database error | `Backend` | opaque storage failure |

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use fluxo_auth::Conta;
use fluxo_core::{ContaId, EmpresaId, NotificacaoId, TransacaoId};
use fluxo_registros::{
    AlvoNotificacao, DestinoEntrada, Empresa, Notificacao, StatusTransacao, TipoMaterial,
    TipoNotificacao, TipoTransacao, Transacao,
};

use crate::config::StoreConfig;
use crate::store::StoreHandle;

use super::{ContaStore, EmpresaStore, NotificacaoStore, StoreError, TransacaoStore};

#[derive(Debug, Clone)]
pub struct PostgresStores {
    primario: PgPool,
    testes: PgPool,
}

impl PostgresStores {
    pub fn new(primario: PgPool, testes: PgPool) -> Self {
        Self { primario, testes }
    }

    /// Connect both pools from configuration.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let primario = PgPoolOptions::new()
            .max_connections(8)
            .connect(&config.primario_url)
            .await
            .map_err(backend)?;
        let testes = PgPoolOptions::new()
            .max_connections(8)
            .connect(&config.testes_url)
            .await
            .map_err(backend)?;
        Ok(Self::new(primario, testes))
    }

    fn pool(&self, store: StoreHandle) -> &PgPool {
        match store {
            StoreHandle::Primario => &self.primario,
            StoreHandle::Testes => &self.testes,
        }
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

/// Map constraint violations to conflicts, everything else to `Backend`.
fn write_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if let Some(code) = db.code() {
            if code == "23505" || code == "23503" {
                return StoreError::Conflict(db.message().to_string());
            }
        }
    }
    backend(err)
}

fn corrupt(column: &str, value: &str) -> StoreError {
    StoreError::Backend(format!("corrupt {column} value in store: {value:?}"))
}

fn json_strings(value: serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Empresas
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, FromRow)]
struct EmpresaRow {
    id: Uuid,
    nome: String,
    cnpj: String,
    tipo: serde_json::Value,
    licitacao: bool,
    emendas: serde_json::Value,
}

impl EmpresaRow {
    fn into_domain(self) -> Empresa {
        Empresa {
            id: EmpresaId::from_uuid(self.id),
            nome: self.nome,
            cnpj: self.cnpj,
            tipo: json_strings(self.tipo),
            licitacao: self.licitacao,
            emendas: json_strings(self.emendas),
        }
    }
}

#[async_trait]
impl EmpresaStore for PostgresStores {
    async fn create(&self, store: StoreHandle, empresa: Empresa) -> Result<Empresa, StoreError> {
        sqlx::query(
            "INSERT INTO empresas (id, nome, cnpj, tipo, licitacao, emendas) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(empresa.id.as_uuid())
        .bind(&empresa.nome)
        .bind(&empresa.cnpj)
        .bind(serde_json::json!(empresa.tipo))
        .bind(empresa.licitacao)
        .bind(serde_json::json!(empresa.emendas))
        .execute(self.pool(store))
        .await
        .map_err(write_error)?;
        Ok(empresa)
    }

    async fn get(&self, store: StoreHandle, id: EmpresaId) -> Result<Option<Empresa>, StoreError> {
        let row = sqlx::query_as::<_, EmpresaRow>(
            "SELECT id, nome, cnpj, tipo, licitacao, emendas FROM empresas WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(self.pool(store))
        .await
        .map_err(backend)?;
        Ok(row.map(EmpresaRow::into_domain))
    }

    async fn list(&self, store: StoreHandle) -> Result<Vec<Empresa>, StoreError> {
        let rows = sqlx::query_as::<_, EmpresaRow>(
            "SELECT id, nome, cnpj, tipo, licitacao, emendas FROM empresas ORDER BY id",
        )
        .fetch_all(self.pool(store))
        .await
        .map_err(backend)?;
        Ok(rows.into_iter().map(EmpresaRow::into_domain).collect())
    }

    async fn update(&self, store: StoreHandle, empresa: Empresa) -> Result<Empresa, StoreError> {
        let result = sqlx::query(
            "UPDATE empresas SET nome = $2, cnpj = $3, tipo = $4, licitacao = $5, emendas = $6 \
             WHERE id = $1",
        )
        .bind(empresa.id.as_uuid())
        .bind(&empresa.nome)
        .bind(&empresa.cnpj)
        .bind(serde_json::json!(empresa.tipo))
        .bind(empresa.licitacao)
        .bind(serde_json::json!(empresa.emendas))
        .execute(self.pool(store))
        .await
        .map_err(write_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(empresa)
    }

    async fn delete(&self, store: StoreHandle, id: EmpresaId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM empresas WHERE id = $1")
            .bind(id.as_uuid())
            .execute(self.pool(store))
            .await
            .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Transações
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, FromRow)]
struct TransacaoRow {
    id: Uuid,
    empresa: Uuid,
    tipo: String,
    status: String,
    nf: Option<String>,
    descricao: Option<String>,
    valor_centavos: i64,
    data: NaiveDate,
    data_entrada: NaiveDate,
    data_saida: Option<NaiveDate>,
    tipo_material: Option<String>,
    destino_entrada: Option<String>,
    emenda_origem: Option<String>,
}

impl TransacaoRow {
    fn into_domain(self) -> Result<Transacao, StoreError> {
        let tipo =
            TipoTransacao::parse(&self.tipo).ok_or_else(|| corrupt("tipo", &self.tipo))?;
        let status =
            StatusTransacao::parse(&self.status).ok_or_else(|| corrupt("status", &self.status))?;
        let tipo_material = match self.tipo_material {
            Some(s) => Some(TipoMaterial::parse(&s).ok_or_else(|| corrupt("tipo_material", &s))?),
            None => None,
        };
        let destino_entrada = match self.destino_entrada {
            Some(s) => {
                Some(DestinoEntrada::parse(&s).ok_or_else(|| corrupt("destino_entrada", &s))?)
            }
            None => None,
        };

        Ok(Transacao {
            id: TransacaoId::from_uuid(self.id),
            empresa: EmpresaId::from_uuid(self.empresa),
            tipo,
            status,
            nf: self.nf,
            descricao: self.descricao,
            valor_centavos: self.valor_centavos,
            data: self.data,
            data_entrada: self.data_entrada,
            data_saida: self.data_saida,
            tipo_material,
            destino_entrada,
            emenda_origem: self.emenda_origem,
        })
    }
}

const TRANSACAO_COLUMNS: &str = "id, empresa, tipo, status, nf, descricao, valor_centavos, \
     data, data_entrada, data_saida, tipo_material, destino_entrada, emenda_origem";

#[async_trait]
impl TransacaoStore for PostgresStores {
    async fn create(
        &self,
        store: StoreHandle,
        transacao: Transacao,
    ) -> Result<Transacao, StoreError> {
        sqlx::query(
            "INSERT INTO transacoes \
             (id, empresa, tipo, status, nf, descricao, valor_centavos, data, data_entrada, \
              data_saida, tipo_material, destino_entrada, emenda_origem) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(transacao.id.as_uuid())
        .bind(transacao.empresa.as_uuid())
        .bind(transacao.tipo.as_str())
        .bind(transacao.status.as_str())
        .bind(&transacao.nf)
        .bind(&transacao.descricao)
        .bind(transacao.valor_centavos)
        .bind(transacao.data)
        .bind(transacao.data_entrada)
        .bind(transacao.data_saida)
        .bind(transacao.tipo_material.map(TipoMaterial::as_str))
        .bind(transacao.destino_entrada.map(DestinoEntrada::as_str))
        .bind(&transacao.emenda_origem)
        .execute(self.pool(store))
        .await
        .map_err(write_error)?;
        Ok(transacao)
    }

    async fn get(
        &self,
        store: StoreHandle,
        id: TransacaoId,
    ) -> Result<Option<Transacao>, StoreError> {
        let row = sqlx::query_as::<_, TransacaoRow>(&format!(
            "SELECT {TRANSACAO_COLUMNS} FROM transacoes WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(self.pool(store))
        .await
        .map_err(backend)?;
        row.map(TransacaoRow::into_domain).transpose()
    }

    async fn list(&self, store: StoreHandle) -> Result<Vec<Transacao>, StoreError> {
        let rows = sqlx::query_as::<_, TransacaoRow>(&format!(
            "SELECT {TRANSACAO_COLUMNS} FROM transacoes ORDER BY id"
        ))
        .fetch_all(self.pool(store))
        .await
        .map_err(backend)?;
        rows.into_iter().map(TransacaoRow::into_domain).collect()
    }

    async fn update(
        &self,
        store: StoreHandle,
        transacao: Transacao,
    ) -> Result<Transacao, StoreError> {
        let result = sqlx::query(
            "UPDATE transacoes SET empresa = $2, tipo = $3, status = $4, nf = $5, \
             descricao = $6, valor_centavos = $7, data = $8, data_entrada = $9, \
             data_saida = $10, tipo_material = $11, destino_entrada = $12, \
             emenda_origem = $13 WHERE id = $1",
        )
        .bind(transacao.id.as_uuid())
        .bind(transacao.empresa.as_uuid())
        .bind(transacao.tipo.as_str())
        .bind(transacao.status.as_str())
        .bind(&transacao.nf)
        .bind(&transacao.descricao)
        .bind(transacao.valor_centavos)
        .bind(transacao.data)
        .bind(transacao.data_entrada)
        .bind(transacao.data_saida)
        .bind(transacao.tipo_material.map(TipoMaterial::as_str))
        .bind(transacao.destino_entrada.map(DestinoEntrada::as_str))
        .bind(&transacao.emenda_origem)
        .execute(self.pool(store))
        .await
        .map_err(write_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(transacao)
    }

    async fn delete(&self, store: StoreHandle, id: TransacaoId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM transacoes WHERE id = $1")
            .bind(id.as_uuid())
            .execute(self.pool(store))
            .await
            .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Notificações
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, FromRow)]
struct NotificacaoRow {
    id: Uuid,
    titulo: String,
    mensagem: String,
    tipo: String,
    alvo: String,
    ativo: bool,
    criado_em: DateTime<Utc>,
}

impl NotificacaoRow {
    fn into_domain(self) -> Result<Notificacao, StoreError> {
        let tipo =
            TipoNotificacao::parse(&self.tipo).ok_or_else(|| corrupt("tipo", &self.tipo))?;
        let alvo = AlvoNotificacao::parse(&self.alvo).ok_or_else(|| corrupt("alvo", &self.alvo))?;

        Ok(Notificacao {
            id: NotificacaoId::from_uuid(self.id),
            titulo: self.titulo,
            mensagem: self.mensagem,
            tipo,
            alvo,
            ativo: self.ativo,
            criado_em: self.criado_em,
        })
    }
}

#[async_trait]
impl NotificacaoStore for PostgresStores {
    async fn create(
        &self,
        store: StoreHandle,
        notificacao: Notificacao,
    ) -> Result<Notificacao, StoreError> {
        sqlx::query(
            "INSERT INTO notificacoes (id, titulo, mensagem, tipo, alvo, ativo, criado_em) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(notificacao.id.as_uuid())
        .bind(&notificacao.titulo)
        .bind(&notificacao.mensagem)
        .bind(notificacao.tipo.as_str())
        .bind(notificacao.alvo.as_str())
        .bind(notificacao.ativo)
        .bind(notificacao.criado_em)
        .execute(self.pool(store))
        .await
        .map_err(write_error)?;
        Ok(notificacao)
    }

    async fn get(
        &self,
        store: StoreHandle,
        id: NotificacaoId,
    ) -> Result<Option<Notificacao>, StoreError> {
        let row = sqlx::query_as::<_, NotificacaoRow>(
            "SELECT id, titulo, mensagem, tipo, alvo, ativo, criado_em \
             FROM notificacoes WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(self.pool(store))
        .await
        .map_err(backend)?;
        row.map(NotificacaoRow::into_domain).transpose()
    }

    async fn list(&self, store: StoreHandle) -> Result<Vec<Notificacao>, StoreError> {
        let rows = sqlx::query_as::<_, NotificacaoRow>(
            "SELECT id, titulo, mensagem, tipo, alvo, ativo, criado_em \
             FROM notificacoes ORDER BY criado_em DESC",
        )
        .fetch_all(self.pool(store))
        .await
        .map_err(backend)?;
        rows.into_iter().map(NotificacaoRow::into_domain).collect()
    }

    async fn update(
        &self,
        store: StoreHandle,
        notificacao: Notificacao,
    ) -> Result<Notificacao, StoreError> {
        let result = sqlx::query(
            "UPDATE notificacoes SET titulo = $2, mensagem = $3, tipo = $4, alvo = $5, \
             ativo = $6 WHERE id = $1",
        )
        .bind(notificacao.id.as_uuid())
        .bind(&notificacao.titulo)
        .bind(&notificacao.mensagem)
        .bind(notificacao.tipo.as_str())
        .bind(notificacao.alvo.as_str())
        .bind(notificacao.ativo)
        .execute(self.pool(store))
        .await
        .map_err(write_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(notificacao)
    }

    async fn delete(&self, store: StoreHandle, id: NotificacaoId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM notificacoes WHERE id = $1")
            .bind(id.as_uuid())
            .execute(self.pool(store))
            .await
            .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Contas
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, FromRow)]
struct ContaRow {
    id: Uuid,
    username: String,
    senha_hash: String,
    criado_em: DateTime<Utc>,
}

impl ContaRow {
    fn into_domain(self) -> Conta {
        Conta {
            id: ContaId::from_uuid(self.id),
            username: self.username,
            senha_hash: self.senha_hash,
            criado_em: self.criado_em,
        }
    }
}

#[async_trait]
impl ContaStore for PostgresStores {
    async fn create(&self, store: StoreHandle, conta: Conta) -> Result<Conta, StoreError> {
        sqlx::query(
            "INSERT INTO contas (id, username, senha_hash, criado_em) VALUES ($1, $2, $3, $4)",
        )
        .bind(conta.id.as_uuid())
        .bind(&conta.username)
        .bind(&conta.senha_hash)
        .bind(conta.criado_em)
        .execute(self.pool(store))
        .await
        .map_err(write_error)?;
        Ok(conta)
    }

    async fn get(&self, store: StoreHandle, id: ContaId) -> Result<Option<Conta>, StoreError> {
        let row = sqlx::query_as::<_, ContaRow>(
            "SELECT id, username, senha_hash, criado_em FROM contas WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(self.pool(store))
        .await
        .map_err(backend)?;
        Ok(row.map(ContaRow::into_domain))
    }

    async fn get_by_username(
        &self,
        store: StoreHandle,
        username: &str,
    ) -> Result<Option<Conta>, StoreError> {
        let row = sqlx::query_as::<_, ContaRow>(
            "SELECT id, username, senha_hash, criado_em FROM contas WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(self.pool(store))
        .await
        .map_err(backend)?;
        Ok(row.map(ContaRow::into_domain))
    }

    async fn list(&self, store: StoreHandle) -> Result<Vec<Conta>, StoreError> {
        let rows = sqlx::query_as::<_, ContaRow>(
            "SELECT id, username, senha_hash, criado_em FROM contas ORDER BY id",
        )
        .fetch_all(self.pool(store))
        .await
        .map_err(backend)?;
        Ok(rows.into_iter().map(ContaRow::into_domain).collect())
    }

    async fn update(&self, store: StoreHandle, conta: Conta) -> Result<Conta, StoreError> {
        let result = sqlx::query(
            "UPDATE contas SET username = $2, senha_hash = $3 WHERE id = $1",
        )
        .bind(conta.id.as_uuid())
        .bind(&conta.username)
        .bind(&conta.senha_hash)
        .execute(self.pool(store))
        .await
        .map_err(write_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(conta)
    }

    async fn delete(&self, store: StoreHandle, id: ContaId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM contas WHERE id = $1")
            .bind(id.as_uuid())
            .execute(self.pool(store))
            .await
            .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
