//! Authorization decisions.
//!
//! - No IO
//! - No panics
//! - No business logic beyond the policy itself
//!
//! Callers reject unauthenticated requests *before* consulting the gate, so
//! 401 (who are you?) and 403 (you may not) are never conflated.

use thiserror::Error;

use crate::role::Role;

/// HTTP-style verb, reduced to what the policy cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Head,
    Options,
    Post,
    Put,
    Patch,
    Delete,
}

impl Verb {
    /// Safe verbs never mutate state.
    pub fn is_safe(self) -> bool {
        matches!(self, Verb::Get | Verb::Head | Verb::Options)
    }
}

/// Role/verb mismatch. Always surfaced as a 403-equivalent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PermissionError {
    #[error("Sem permissão.")]
    EscritaNegada { papel: Role },
}

/// General CRUD rule: safe verbs are allowed for every authenticated role;
/// mutating verbs require Dev or Gestor.
pub fn authorize(role: Role, verb: Verb) -> Result<(), PermissionError> {
    if verb.is_safe() {
        return Ok(());
    }
    match role {
        Role::Dev | Role::Gestor => Ok(()),
        Role::View | Role::None => Err(PermissionError::EscritaNegada { papel: role }),
    }
}

/// Account-creation failure.
///
/// `SufixoInvalido` is a 400-equivalent (malformed target), the rest are
/// permission failures; the distinction matters to callers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountCreationError {
    #[error("O usuário deve terminar em .dev, .gestor ou .view")]
    SufixoInvalido,

    #[error("Gestores só podem criar usuários do tipo Visitante (.view).")]
    GestorSomenteVisitante,

    #[error("Sem permissão.")]
    SemPermissao,

    #[error("Autenticação necessária.")]
    NaoAutenticado,
}

/// Who may create accounts of which role.
///
/// The target-suffix format check runs first, so a malformed target
/// username is always reported as a format error, never a permission
/// error, whatever the creator's role. Then:
///
/// - Dev creates any recognized role;
/// - Gestor creates only `.view` accounts;
/// - View creates nothing;
/// - a caller with no recognized role creates nothing.
pub fn authorize_account_creation(
    creator: Role,
    target_username: &str,
) -> Result<Role, AccountCreationError> {
    let target = Role::from_username(target_username);
    if target == Role::None {
        return Err(AccountCreationError::SufixoInvalido);
    }

    match creator {
        Role::Dev => Ok(target),
        Role::Gestor if target == Role::View => Ok(target),
        Role::Gestor => Err(AccountCreationError::GestorSomenteVisitante),
        Role::View => Err(AccountCreationError::SemPermissao),
        Role::None => Err(AccountCreationError::NaoAutenticado),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_verbs_are_allowed_for_every_role() {
        for role in [Role::Dev, Role::Gestor, Role::View, Role::None] {
            for verb in [Verb::Get, Verb::Head, Verb::Options] {
                assert_eq!(authorize(role, verb), Ok(()));
            }
        }
    }

    #[test]
    fn mutations_require_dev_or_gestor() {
        for verb in [Verb::Post, Verb::Put, Verb::Patch, Verb::Delete] {
            assert_eq!(authorize(Role::Dev, verb), Ok(()));
            assert_eq!(authorize(Role::Gestor, verb), Ok(()));
            assert!(authorize(Role::View, verb).is_err());
            assert!(authorize(Role::None, verb).is_err());
        }
    }

    #[test]
    fn dev_creates_any_recognized_target() {
        assert_eq!(
            authorize_account_creation(Role::Dev, "bob.dev"),
            Ok(Role::Dev)
        );
        assert_eq!(
            authorize_account_creation(Role::Dev, "bob.gestor"),
            Ok(Role::Gestor)
        );
        assert_eq!(
            authorize_account_creation(Role::Dev, "bob.view"),
            Ok(Role::View)
        );
    }

    #[test]
    fn gestor_creates_only_visitors() {
        assert_eq!(
            authorize_account_creation(Role::Gestor, "bob.view"),
            Ok(Role::View)
        );
        assert_eq!(
            authorize_account_creation(Role::Gestor, "bob.dev"),
            Err(AccountCreationError::GestorSomenteVisitante)
        );
        assert_eq!(
            authorize_account_creation(Role::Gestor, "bob.gestor"),
            Err(AccountCreationError::GestorSomenteVisitante)
        );
    }

    #[test]
    fn view_creates_nothing() {
        assert_eq!(
            authorize_account_creation(Role::View, "bob.view"),
            Err(AccountCreationError::SemPermissao)
        );
    }

    #[test]
    fn roleless_creator_is_rejected_as_unauthenticated() {
        assert_eq!(
            authorize_account_creation(Role::None, "bob.view"),
            Err(AccountCreationError::NaoAutenticado)
        );
    }

    #[test]
    fn malformed_target_is_a_format_error_for_every_creator() {
        for creator in [Role::Dev, Role::Gestor, Role::View, Role::None] {
            assert_eq!(
                authorize_account_creation(creator, "bob.admin"),
                Err(AccountCreationError::SufixoInvalido)
            );
            assert_eq!(
                authorize_account_creation(creator, "bob"),
                Err(AccountCreationError::SufixoInvalido)
            );
        }
    }
}
