//! `fluxo-auth` — pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage. It owns the
//! request identity model, the username-suffix role convention, the
//! request-scoped identity context, and every authorization decision.

pub mod claims;
pub mod conta;
pub mod context;
pub mod gate;
pub mod identity;
pub mod role;
pub mod senha;
pub mod token;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use conta::{AtualizaConta, Conta, NovaConta};
pub use context::{ContextError, ContextScope, IdentityContext, RequestKey};
pub use gate::{AccountCreationError, PermissionError, Verb, authorize, authorize_account_creation};
pub use identity::Identity;
pub use role::Role;
pub use token::{AuthError, Hs256Tokens, TokenVerifier};
