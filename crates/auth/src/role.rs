//! Access tier derived from the username-suffix convention.
//!
//! The suffix after the last `.` of a username is a load-bearing business
//! rule, not an incidental naming detail: it drives both coarse
//! authorization and the account-creation restrictions in [`crate::gate`].
//! It lives behind this single abstraction so that a future explicit role
//! field can replace the convention without touching call sites.

use serde::{Deserialize, Serialize};

use crate::identity::Identity;

/// Role of a request subject.
///
/// Derived, never stored, and recomputed on every use; roles must not be
/// cached across requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Dev,
    Gestor,
    View,
    None,
}

impl Role {
    /// Map a username to its role by the suffix after the last `.`.
    ///
    /// A username with no separator carries no role.
    pub fn from_username(username: &str) -> Role {
        match username.rsplit_once('.') {
            Some((_, "dev")) => Role::Dev,
            Some((_, "gestor")) => Role::Gestor,
            Some((_, "view")) => Role::View,
            _ => Role::None,
        }
    }

    /// Resolve the role of an identity.
    ///
    /// No role is ever granted to an unauthenticated identity, whatever its
    /// username claims.
    pub fn resolve(identity: &Identity) -> Role {
        if !identity.is_authenticated() {
            return Role::None;
        }
        identity.username().map(Role::from_username).unwrap_or(Role::None)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Dev => "dev",
            Role::Gestor => "gestor",
            Role::View => "view",
            Role::None => "none",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
