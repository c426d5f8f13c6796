//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
    Extension,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use book_exchange_core::access::require_role;
use book_exchange_core::{AuthScheme, Credential, Identity, PortError, Role};
use std::sync::Arc;
use tracing::warn;

use crate::error::ApiError;
use crate::web::state::{blocking, AppState};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session";

/// Pulls the credential the deployment expects out of the request headers.
pub fn credential_from_headers(headers: &HeaderMap, scheme: AuthScheme) -> Option<Credential> {
    match scheme {
        AuthScheme::Session => session_token(headers).map(Credential::Session),
        AuthScheme::Basic => basic_credentials(headers),
    }
}

fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|c| {
            c.trim()
                .strip_prefix(SESSION_COOKIE)
                .and_then(|rest| rest.strip_prefix('='))
        })
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

fn basic_credentials(headers: &HeaderMap) -> Option<Credential> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = String::from_utf8(STANDARD.decode(encoded.trim()).ok()?).ok()?;
    let (email, password) = decoded.split_once(':')?;
    Some(Credential::Basic {
        email: email.to_string(),
        password: password.to_string(),
    })
}

/// Middleware that resolves the caller's credential into an `Identity`.
///
/// If valid, inserts the `Identity` into request extensions for handlers to use.
/// If missing or invalid, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let credential = credential_from_headers(req.headers(), state.identity.scheme())
        .ok_or(PortError::Unauthorized)?;

    let resolver = state.identity.clone();
    let identity = blocking(move || resolver.resolve(&credential))
        .await
        .map_err(|e| {
            warn!("Rejected credential: {}", e);
            e
        })?;

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

/// Middleware that only lets owners through. Must run after `require_auth`.
pub async fn require_owner(
    Extension(identity): Extension<Identity>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    require_role(&identity, Role::Owner)?;
    Ok(next.run(req).await)
}
