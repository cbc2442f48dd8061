//! In-memory store implementation for tests and dev mode.
//!
//! One map per entity, keyed by `(StoreHandle, id)`; the same instance
//! holds both physical stores, which keeps the isolation property (a
//! record created under one handle is invisible under the other) cheap to
//! exercise in tests.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use fluxo_auth::Conta;
use fluxo_core::{ContaId, EmpresaId, NotificacaoId, TransacaoId};
use fluxo_registros::{Empresa, Notificacao, Transacao};

use crate::store::StoreHandle;

use super::{ContaStore, EmpresaStore, NotificacaoStore, StoreError, TransacaoStore};

#[derive(Debug, Default)]
pub struct InMemoryStores {
    empresas: RwLock<HashMap<(StoreHandle, EmpresaId), Empresa>>,
    transacoes: RwLock<HashMap<(StoreHandle, TransacaoId), Transacao>>,
    notificacoes: RwLock<HashMap<(StoreHandle, NotificacaoId), Notificacao>>,
    contas: RwLock<HashMap<(StoreHandle, ContaId), Conta>>,
}

impl InMemoryStores {
    pub fn new() -> Self {
        Self::default()
    }
}

fn read_poisoned() -> StoreError {
    StoreError::Backend("in-memory store lock poisoned".to_string())
}

#[async_trait]
impl EmpresaStore for InMemoryStores {
    async fn create(&self, store: StoreHandle, empresa: Empresa) -> Result<Empresa, StoreError> {
        let mut map = self.empresas.write().map_err(|_| read_poisoned())?;

        // CNPJ is unique per store; the same value in the other store is fine.
        let duplicate = map
            .iter()
            .any(|((s, _), e)| *s == store && e.cnpj == empresa.cnpj);
        if duplicate {
            return Err(StoreError::Conflict(format!(
                "cnpj {} já cadastrado",
                empresa.cnpj
            )));
        }

        map.insert((store, empresa.id), empresa.clone());
        Ok(empresa)
    }

    async fn get(&self, store: StoreHandle, id: EmpresaId) -> Result<Option<Empresa>, StoreError> {
        let map = self.empresas.read().map_err(|_| read_poisoned())?;
        Ok(map.get(&(store, id)).cloned())
    }

    async fn list(&self, store: StoreHandle) -> Result<Vec<Empresa>, StoreError> {
        let map = self.empresas.read().map_err(|_| read_poisoned())?;
        let mut items: Vec<Empresa> = map
            .iter()
            .filter_map(|((s, _), e)| (*s == store).then(|| e.clone()))
            .collect();
        items.sort_by_key(|e| *e.id.as_uuid());
        Ok(items)
    }

    async fn update(&self, store: StoreHandle, empresa: Empresa) -> Result<Empresa, StoreError> {
        let mut map = self.empresas.write().map_err(|_| read_poisoned())?;

        let duplicate = map
            .iter()
            .any(|((s, id), e)| *s == store && *id != empresa.id && e.cnpj == empresa.cnpj);
        if duplicate {
            return Err(StoreError::Conflict(format!(
                "cnpj {} já cadastrado",
                empresa.cnpj
            )));
        }

        match map.get_mut(&(store, empresa.id)) {
            Some(slot) => {
                *slot = empresa.clone();
                Ok(empresa)
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn delete(&self, store: StoreHandle, id: EmpresaId) -> Result<(), StoreError> {
        let mut map = self.empresas.write().map_err(|_| read_poisoned())?;
        match map.remove(&(store, id)) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound),
        }
    }
}

#[async_trait]
impl TransacaoStore for InMemoryStores {
    async fn create(
        &self,
        store: StoreHandle,
        transacao: Transacao,
    ) -> Result<Transacao, StoreError> {
        // The company reference must live in the same store.
        {
            let empresas = self.empresas.read().map_err(|_| read_poisoned())?;
            if !empresas.contains_key(&(store, transacao.empresa)) {
                return Err(StoreError::Conflict("empresa inexistente".to_string()));
            }
        }

        let mut map = self.transacoes.write().map_err(|_| read_poisoned())?;
        map.insert((store, transacao.id), transacao.clone());
        Ok(transacao)
    }

    async fn get(
        &self,
        store: StoreHandle,
        id: TransacaoId,
    ) -> Result<Option<Transacao>, StoreError> {
        let map = self.transacoes.read().map_err(|_| read_poisoned())?;
        Ok(map.get(&(store, id)).cloned())
    }

    async fn list(&self, store: StoreHandle) -> Result<Vec<Transacao>, StoreError> {
        let map = self.transacoes.read().map_err(|_| read_poisoned())?;
        let mut items: Vec<Transacao> = map
            .iter()
            .filter_map(|((s, _), t)| (*s == store).then(|| t.clone()))
            .collect();
        items.sort_by_key(|t| *t.id.as_uuid());
        Ok(items)
    }

    async fn update(
        &self,
        store: StoreHandle,
        transacao: Transacao,
    ) -> Result<Transacao, StoreError> {
        let mut map = self.transacoes.write().map_err(|_| read_poisoned())?;
        match map.get_mut(&(store, transacao.id)) {
            Some(slot) => {
                *slot = transacao.clone();
                Ok(transacao)
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn delete(&self, store: StoreHandle, id: TransacaoId) -> Result<(), StoreError> {
        let mut map = self.transacoes.write().map_err(|_| read_poisoned())?;
        match map.remove(&(store, id)) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound),
        }
    }
}

#[async_trait]
impl NotificacaoStore for InMemoryStores {
    async fn create(
        &self,
        store: StoreHandle,
        notificacao: Notificacao,
    ) -> Result<Notificacao, StoreError> {
        let mut map = self.notificacoes.write().map_err(|_| read_poisoned())?;
        map.insert((store, notificacao.id), notificacao.clone());
        Ok(notificacao)
    }

    async fn get(
        &self,
        store: StoreHandle,
        id: NotificacaoId,
    ) -> Result<Option<Notificacao>, StoreError> {
        let map = self.notificacoes.read().map_err(|_| read_poisoned())?;
        Ok(map.get(&(store, id)).cloned())
    }

    async fn list(&self, store: StoreHandle) -> Result<Vec<Notificacao>, StoreError> {
        let map = self.notificacoes.read().map_err(|_| read_poisoned())?;
        let mut items: Vec<Notificacao> = map
            .iter()
            .filter_map(|((s, _), n)| (*s == store).then(|| n.clone()))
            .collect();
        // Newest first, the order clients display them in.
        items.sort_by(|a, b| b.criado_em.cmp(&a.criado_em));
        Ok(items)
    }

    async fn update(
        &self,
        store: StoreHandle,
        notificacao: Notificacao,
    ) -> Result<Notificacao, StoreError> {
        let mut map = self.notificacoes.write().map_err(|_| read_poisoned())?;
        match map.get_mut(&(store, notificacao.id)) {
            Some(slot) => {
                *slot = notificacao.clone();
                Ok(notificacao)
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn delete(&self, store: StoreHandle, id: NotificacaoId) -> Result<(), StoreError> {
        let mut map = self.notificacoes.write().map_err(|_| read_poisoned())?;
        match map.remove(&(store, id)) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound),
        }
    }
}

#[async_trait]
impl ContaStore for InMemoryStores {
    async fn create(&self, store: StoreHandle, conta: Conta) -> Result<Conta, StoreError> {
        let mut map = self.contas.write().map_err(|_| read_poisoned())?;

        let duplicate = map
            .iter()
            .any(|((s, _), c)| *s == store && c.username == conta.username);
        if duplicate {
            return Err(StoreError::Conflict(format!(
                "username {} já cadastrado",
                conta.username
            )));
        }

        map.insert((store, conta.id), conta.clone());
        Ok(conta)
    }

    async fn get(&self, store: StoreHandle, id: ContaId) -> Result<Option<Conta>, StoreError> {
        let map = self.contas.read().map_err(|_| read_poisoned())?;
        Ok(map.get(&(store, id)).cloned())
    }

    async fn get_by_username(
        &self,
        store: StoreHandle,
        username: &str,
    ) -> Result<Option<Conta>, StoreError> {
        let map = self.contas.read().map_err(|_| read_poisoned())?;
        Ok(map
            .iter()
            .find(|((s, _), c)| *s == store && c.username == username)
            .map(|(_, c)| c.clone()))
    }

    async fn list(&self, store: StoreHandle) -> Result<Vec<Conta>, StoreError> {
        let map = self.contas.read().map_err(|_| read_poisoned())?;
        let mut items: Vec<Conta> = map
            .iter()
            .filter_map(|((s, _), c)| (*s == store).then(|| c.clone()))
            .collect();
        items.sort_by_key(|c| *c.id.as_uuid());
        Ok(items)
    }

    async fn update(&self, store: StoreHandle, conta: Conta) -> Result<Conta, StoreError> {
        let mut map = self.contas.write().map_err(|_| read_poisoned())?;

        let duplicate = map
            .iter()
            .any(|((s, id), c)| *s == store && *id != conta.id && c.username == conta.username);
        if duplicate {
            return Err(StoreError::Conflict(format!(
                "username {} já cadastrado",
                conta.username
            )));
        }

        match map.get_mut(&(store, conta.id)) {
            Some(slot) => {
                *slot = conta.clone();
                Ok(conta)
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn delete(&self, store: StoreHandle, id: ContaId) -> Result<(), StoreError> {
        let mut map = self.contas.write().map_err(|_| read_poisoned())?;
        match map.remove(&(store, id)) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluxo_registros::NovaEmpresa;

    fn empresa(cnpj: &str) -> Empresa {
        Empresa::criar(NovaEmpresa {
            nome: "Distribuidora Alfa".to_string(),
            cnpj: cnpj.to_string(),
            tipo: vec![],
            licitacao: false,
            emendas: vec![],
        })
        .unwrap()
    }

    #[tokio::test]
    async fn records_are_invisible_across_store_handles() {
        let stores = InMemoryStores::new();
        let e = EmpresaStore::create(&stores, StoreHandle::Testes, empresa("11.111.111/0001-11"))
            .await
            .unwrap();

        assert!(
            EmpresaStore::get(&stores, StoreHandle::Testes, e.id)
                .await
                .unwrap()
                .is_some()
        );
        assert!(
            EmpresaStore::get(&stores, StoreHandle::Primario, e.id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn same_cnpj_may_exist_in_both_stores() {
        let stores = InMemoryStores::new();
        let cnpj = "22.222.222/0001-22";

        EmpresaStore::create(&stores, StoreHandle::Primario, empresa(cnpj))
            .await
            .unwrap();
        EmpresaStore::create(&stores, StoreHandle::Testes, empresa(cnpj))
            .await
            .unwrap();

        // But within one store it is unique.
        let err = EmpresaStore::create(&stores, StoreHandle::Primario, empresa(cnpj)).await;
        assert!(matches!(err, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn transacao_requires_empresa_in_same_store() {
        let stores = InMemoryStores::new();
        let e = EmpresaStore::create(&stores, StoreHandle::Primario, empresa("33.333.333/0001-33"))
            .await
            .unwrap();

        let t = fluxo_registros::Transacao::criar(
            fluxo_registros::NovaTransacao {
                empresa: e.id,
                tipo: fluxo_registros::TipoTransacao::Entrada,
                status: None,
                nf: None,
                descricao: None,
                valor_centavos: 100,
                data_entrada: None,
                data_saida: None,
                tipo_material: None,
                destino_entrada: None,
                emenda_origem: None,
            },
            chrono::Utc::now().date_naive(),
        );

        // Same record against the other store: the reference is dangling there.
        let err = TransacaoStore::create(&stores, StoreHandle::Testes, t.clone()).await;
        assert!(matches!(err, Err(StoreError::Conflict(_))));

        TransacaoStore::create(&stores, StoreHandle::Primario, t)
            .await
            .unwrap();
    }
}
