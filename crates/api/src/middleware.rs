//! Authentication middleware.
//!
//! Resolves the request identity exactly once, before any handler runs:
//!
//! - no `Authorization` header → the request proceeds as *anonymous*
//!   (only anonymous-accessible routes will accept it);
//! - header present but malformed, or token invalid/expired → the request
//!   is rejected with 401 right here. A bad credential never proceeds as
//!   anonymous.
//!
//! The resolved identity is stored in the identity context under a fresh
//! request key; the [`ContextScope`] guard held across the downstream call
//! clears the entry on every exit path, panics included.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use fluxo_auth::{AuthError, Identity, IdentityContext, TokenVerifier};

use crate::app::errors;
use crate::context::RequestIdentity;

#[derive(Clone)]
pub struct AuthState {
    pub verifier: Arc<dyn TokenVerifier>,
    pub context: Arc<IdentityContext>,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let identity = match extract_bearer(req.headers()) {
        Ok(Some(token)) => match state.verifier.verify(token, Utc::now()) {
            Ok(claims) => Identity::authenticated(claims.sub, claims.username),
            Err(error) => return errors::auth_error_to_response(error),
        },
        Ok(None) => Identity::anonymous(),
        Err(error) => return errors::auth_error_to_response(error),
    };

    let scope = state.context.begin(identity);
    req.extensions_mut().insert(RequestIdentity::new(
        Arc::clone(&state.context),
        scope.key(),
    ));

    let response = next.run(req).await;

    // scope drops here: the context entry dies with the request.
    drop(scope);
    response
}

/// Pull the bearer token out of the `Authorization` header.
///
/// `Ok(None)` means no header at all, the anonymous path. A header that
/// exists but is not a well-formed bearer credential is an error, never
/// anonymous.
fn extract_bearer(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    let Some(header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let header = header.to_str().map_err(|_| AuthError::MalformedHeader)?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::MalformedHeader)?
        .trim();
    if token.is_empty() {
        return Err(AuthError::MalformedHeader);
    }

    Ok(Some(token))
}

/// Resolve the caller or reject with the response to return.
///
/// Distinguishes 401 (absent/anonymous identity) from an internal context
/// failure; never conflates either with a permission problem.
pub fn require_authenticated(ident: &RequestIdentity) -> Result<Identity, Response> {
    match ident.lookup() {
        Ok(Some(identity)) if identity.is_authenticated() => Ok(identity),
        Ok(_) => Err(errors::json_error(
            StatusCode::UNAUTHORIZED,
            "auth_required",
            "Autenticação necessária.",
        )),
        Err(error) => Err(errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "context_error",
            error.to_string(),
        )),
    }
}
