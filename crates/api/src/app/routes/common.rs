use fluxo_auth::{Role, Verb, authorize};

use crate::app::errors;
use crate::context::RequestIdentity;
use crate::middleware::require_authenticated;

/// Authenticate the caller and run the verb through the gate.
///
/// Authentication, role resolution and authorization all observe the same
/// identity snapshot for this request. The store-routing decision is *not*
/// made here: it happens per operation at the call site.
pub fn gate(ident: &RequestIdentity, verb: Verb) -> Result<(), axum::response::Response> {
    let identity = require_authenticated(ident)?;
    authorize(Role::resolve(&identity), verb).map_err(errors::permission_error_to_response)
}
