//! services/api/src/web/users.rs
//!
//! Profile endpoints for the authenticated user.

use axum::{extract::State, Extension, Json};
use book_exchange_core::Identity;
use std::sync::Arc;

use crate::error::ApiError;
use crate::web::protocol::{AuthResponse, ProfileUpdateRequest, UserResponse};
use crate::web::state::{blocking, AppState};

/// GET /api/users/profile
#[utoipa::path(
    get,
    path = "/api/users/profile",
    responses(
        (status = 200, description = "The caller's profile", body = UserResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.marketplace.profile(&identity)?;
    Ok(Json(user.into()))
}

/// PUT /api/users/profile - Empty fields are left unchanged
#[utoipa::path(
    put,
    path = "/api/users/profile",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Profile updated", body = AuthResponse),
        (status = 401, description = "Not authenticated"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<ProfileUpdateRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let market = state.marketplace.clone();
    let user = blocking(move || market.update_profile(&identity, req.into())).await?;

    Ok(Json(AuthResponse {
        message: "Profile updated successfully".to_string(),
        user: user.into(),
    }))
}
