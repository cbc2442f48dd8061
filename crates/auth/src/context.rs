//! Request-scoped identity storage.
//!
//! One entry per in-flight request, keyed by [`RequestKey`]. The single
//! invariant that everything else here serves: **no entry is visible
//! outside the lifetime of the request that set it**. A stale entry on a
//! reused execution context would let a later request inherit another
//! caller's identity, and with it the wrong store and the wrong
//! permissions.
//!
//! Entries are therefore cleared through [`ContextScope`], an RAII guard
//! whose `Drop` runs on every exit path, panics included. There is no
//! thread-local or task-local storage involved; the handle travels
//! explicitly with the request.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;
use uuid::Uuid;

use crate::identity::Identity;

/// Key of one in-flight request. Never reused.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey(Uuid);

impl RequestKey {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RequestKey {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for RequestKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Unexpected failure while consulting the context.
///
/// Callers must treat this as "identity unknown", never as "anonymous":
/// the router recovers by picking the primary store and logging, everyone
/// else propagates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error("identity context storage poisoned")]
    Poisoned,
}

/// Process-wide identity storage, one entry per concurrently executing
/// request.
#[derive(Debug, Default)]
pub struct IdentityContext {
    inner: RwLock<HashMap<RequestKey, Identity>>,
}

impl IdentityContext {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Store the identity for a request.
    ///
    /// Recovers from lock poisoning: a request must always be able to
    /// record its own identity.
    pub fn set(&self, key: RequestKey, identity: Identity) {
        let mut map = match self.inner.write() {
            Ok(map) => map,
            Err(poisoned) => poisoned.into_inner(),
        };
        map.insert(key, identity);
    }

    /// Look up the identity for a request.
    ///
    /// `Ok(None)` means no identity was ever set under this key, a
    /// distinct state from an anonymous identity being present.
    pub fn get(&self, key: RequestKey) -> Result<Option<Identity>, ContextError> {
        let map = self.inner.read().map_err(|_| ContextError::Poisoned)?;
        Ok(map.get(&key).cloned())
    }

    /// Remove the entry for a request.
    ///
    /// Must succeed even when the lock is poisoned: a leftover entry is
    /// worse than a poisoned map.
    pub fn clear(&self, key: RequestKey) {
        let mut map = match self.inner.write() {
            Ok(map) => map,
            Err(poisoned) => poisoned.into_inner(),
        };
        map.remove(&key);
    }

    /// Set an identity under a fresh key and return the guard that owns the
    /// entry for the rest of the request.
    pub fn begin(self: &Arc<Self>, identity: Identity) -> ContextScope {
        let key = RequestKey::new();
        self.set(key, identity);
        ContextScope {
            ctx: Arc::clone(self),
            key,
        }
    }
}

/// RAII owner of one context entry.
///
/// Dropping the scope clears the entry: on normal return, on handled
/// errors, and during panic unwinding alike.
#[derive(Debug)]
pub struct ContextScope {
    ctx: Arc<IdentityContext>,
    key: RequestKey,
}

impl ContextScope {
    pub fn key(&self) -> RequestKey {
        self.key
    }

    pub fn lookup(&self) -> Result<Option<Identity>, ContextError> {
        self.ctx.get(self.key)
    }
}

impl Drop for ContextScope {
    fn drop(&mut self) {
        self.ctx.clear(self.key);
    }
}
