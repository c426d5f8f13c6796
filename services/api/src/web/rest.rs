//! services/api/src/web/rest.rs
//!
//! Assembles the REST router and the master definition for the OpenAPI
//! specification.

use crate::error::ErrorResponse;
use crate::web::{auth, books, middleware, protocol, state::AppState, users};
use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post, put},
    Router,
};
use std::sync::Arc;
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::me_handler,
        users::get_profile_handler,
        users::update_profile_handler,
        books::list_books_handler,
        books::search_books_handler,
        books::get_book_handler,
        books::my_books_handler,
        books::create_book_handler,
        books::update_book_handler,
        books::update_status_handler,
        books::delete_book_handler,
    ),
    components(
        schemas(
            protocol::RegisterRequest,
            protocol::LoginRequest,
            protocol::ProfileUpdateRequest,
            protocol::BookRequest,
            protocol::StatusRequest,
            protocol::UserResponse,
            protocol::BookResponse,
            protocol::AuthResponse,
            protocol::MeResponse,
            protocol::BookEnvelope,
            protocol::BooksResponse,
            protocol::MessageResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Book Exchange API", description = "Peer-to-peer book listing marketplace.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Router
//=========================================================================================

/// Builds the API router. Transport layers (CORS, tracing, Swagger UI) are
/// added by the binary.
pub fn router(state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/api/register", post(auth::register_handler))
        .route("/api/login", post(auth::login_handler))
        .route("/api/logout", post(auth::logout_handler))
        .route("/api/books", get(books::list_books_handler))
        .route("/api/books/search", get(books::search_books_handler))
        .route("/api/books/{id}", get(books::get_book_handler));

    // Owner-only routes
    let owner_routes = Router::new()
        .route("/api/books", post(books::create_book_handler))
        .route(
            "/api/books/{id}",
            put(books::update_book_handler).delete(books::delete_book_handler),
        )
        .layer(axum_middleware::from_fn(middleware::require_owner));

    // Protected routes (auth required); the owner routes sit inside.
    let protected_routes = Router::new()
        .route("/api/me", get(auth::me_handler))
        .route(
            "/api/users/profile",
            get(users::get_profile_handler).put(users::update_profile_handler),
        )
        .route("/api/books/mine", get(books::my_books_handler))
        .route("/api/books/{id}/status", patch(books::update_status_handler))
        .merge(owner_routes)
        .layer(axum_middleware::from_fn_with_state(state.clone(), middleware::require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
