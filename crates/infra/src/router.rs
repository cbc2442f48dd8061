//! Per-operation store routing.
//!
//! System-reserved entities always live in the primary store. Everything
//! else follows the identity that initiated the request: `.dev` callers
//! are redirected to the sandbox store, everyone else stays on primary.

use fluxo_auth::{ContextError, Identity, Role};

use crate::store::StoreHandle;

/// Entity type of the operation being routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Empresa,
    Transacao,
    Notificacao,
    /// Account/session bookkeeping. System-reserved.
    Conta,
}

impl EntityKind {
    /// System-reserved entities route to the primary store regardless of
    /// identity.
    pub fn is_system_reserved(self) -> bool {
        matches!(self, EntityKind::Conta)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Empresa => "empresa",
            EntityKind::Transacao => "transacao",
            EntityKind::Notificacao => "notificacao",
            EntityKind::Conta => "conta",
        }
    }
}

/// Decide which store handles one operation.
///
/// `lookup` is the result of the identity-context lookup for the current
/// request, consulted fresh on every call. Routing decisions are never
/// cached, because the context can change between operations of
/// overlapping request lifetimes.
///
/// A failed lookup falls back to the primary store. That fallback is a
/// deliberate, logged branch: it masks an authentication problem upstream
/// and must be visible in the logs, never swallowed.
pub fn route(
    lookup: Result<Option<Identity>, ContextError>,
    entity: EntityKind,
) -> StoreHandle {
    if entity.is_system_reserved() {
        return StoreHandle::Primario;
    }

    match lookup {
        Ok(Some(identity)) if Role::resolve(&identity) == Role::Dev => StoreHandle::Testes,
        Ok(_) => StoreHandle::Primario,
        Err(error) => {
            tracing::warn!(
                %error,
                entity = entity.as_str(),
                "identity lookup failed during store routing; falling back to primary store"
            );
            StoreHandle::Primario
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluxo_core::ContaId;

    fn dev() -> Identity {
        Identity::authenticated(ContaId::new(), "ana.dev")
    }

    #[test]
    fn dev_identities_route_to_the_sandbox_store() {
        assert_eq!(
            route(Ok(Some(dev())), EntityKind::Empresa),
            StoreHandle::Testes
        );
        assert_eq!(
            route(Ok(Some(dev())), EntityKind::Transacao),
            StoreHandle::Testes
        );
        assert_eq!(
            route(Ok(Some(dev())), EntityKind::Notificacao),
            StoreHandle::Testes
        );
    }

    #[test]
    fn everyone_else_routes_to_primary() {
        for username in ["bruno.gestor", "carla.view", "dora", "e.devops"] {
            let identity = Identity::authenticated(ContaId::new(), username);
            assert_eq!(
                route(Ok(Some(identity)), EntityKind::Empresa),
                StoreHandle::Primario,
                "username {username:?} must stay on primary"
            );
        }
    }

    #[test]
    fn anonymous_and_absent_route_to_primary() {
        assert_eq!(
            route(Ok(Some(Identity::anonymous())), EntityKind::Empresa),
            StoreHandle::Primario
        );
        assert_eq!(route(Ok(None), EntityKind::Empresa), StoreHandle::Primario);
    }

    #[test]
    fn system_reserved_entities_ignore_identity() {
        assert_eq!(
            route(Ok(Some(dev())), EntityKind::Conta),
            StoreHandle::Primario
        );
    }

    #[test]
    fn failed_lookup_falls_back_to_primary() {
        assert_eq!(
            route(Err(ContextError::Poisoned), EntityKind::Transacao),
            StoreHandle::Primario
        );
    }
}
