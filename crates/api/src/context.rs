//! Request-scoped identity handle.
//!
//! The middleware owns the [`fluxo_auth::ContextScope`] for the lifetime
//! of the request; handlers get this cheap handle through request
//! extensions and consult the identity context with it. Nothing here is
//! ambient; the handle travels explicitly with the request.

use std::sync::Arc;

use fluxo_auth::{ContextError, Identity, IdentityContext, RequestKey};

/// Handle to the current request's entry in the identity context.
#[derive(Clone)]
pub struct RequestIdentity {
    ctx: Arc<IdentityContext>,
    key: RequestKey,
}

impl RequestIdentity {
    pub fn new(ctx: Arc<IdentityContext>, key: RequestKey) -> Self {
        Self { ctx, key }
    }

    pub fn key(&self) -> RequestKey {
        self.key
    }

    /// Fresh lookup against the identity context.
    ///
    /// `Ok(None)` (absent) and `Ok(Some(anonymous))` are distinct states;
    /// neither grants a role.
    pub fn lookup(&self) -> Result<Option<Identity>, ContextError> {
        self.ctx.get(self.key)
    }
}
