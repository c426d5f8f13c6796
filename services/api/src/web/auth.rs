//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for registration, login, and logout.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use book_exchange_core::{AuthSession, Identity};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::error::ApiError;
use crate::web::middleware::{credential_from_headers, SESSION_COOKIE};
use crate::web::protocol::{
    AuthResponse, LoginRequest, MeResponse, MessageResponse, RegisterRequest,
};
use crate::web::state::{blocking, AppState};

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/register - Create a new user account
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = AuthResponse),
        (status = 400, description = "Missing field or invalid role"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let market = state.marketplace.clone();
    let user = blocking(move || market.register(req.into())).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            user: user.into(),
        }),
    ))
}

/// POST /api/login - Login with an existing account
///
/// In session mode the response carries a `session` cookie; in basic mode the
/// client keeps sending its credentials instead.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let market = state.marketplace.clone();
    let resolver = state.identity.clone();
    let (user, session) = blocking(move || {
        let user = market.authenticate(&req.email, &req.password)?;
        let session = resolver.sign_in(&user)?;
        Ok((user, session))
    })
    .await?;

    info!("User {} logged in", user.id);

    let mut headers = HeaderMap::new();
    if let Some(session) = session {
        let cookie = session_cookie(&session, state.config.cookie_secure);
        headers.insert(
            header::SET_COOKIE,
            cookie
                .parse()
                .map_err(|_| ApiError::Internal("invalid session cookie".to_string()))?,
        );
    }

    Ok((
        StatusCode::OK,
        headers,
        Json(AuthResponse {
            message: "Login successful".to_string(),
            user: user.into(),
        }),
    ))
}

/// POST /api/logout - Logout and invalidate the session
#[utoipa::path(
    post,
    path = "/api/logout",
    responses(
        (status = 200, description = "Logout successful", body = MessageResponse)
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if let Some(credential) = credential_from_headers(&headers, state.identity.scheme()) {
        state.identity.sign_out(&credential);
    }

    let cookie = format!(
        "{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0",
        SESSION_COOKIE
    );
    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }),
    )
}

/// GET /api/me - The currently authenticated user
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<MeResponse>, ApiError> {
    let user = state.marketplace.profile(&identity)?;
    Ok(Json(MeResponse { user: user.into() }))
}

fn session_cookie(session: &AuthSession, secure: bool) -> String {
    let max_age = (session.expires_at - Utc::now()).num_seconds().max(0);
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE, session.token, max_age
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}
