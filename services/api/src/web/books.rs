//! services/api/src/web/books.rs
//!
//! Book listing endpoints. Reads are public; writes go through the auth
//! middleware, and the core re-checks ownership for every mutation.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use book_exchange_core::{BookFilter, Identity};
use std::sync::Arc;

use crate::error::ApiError;
use crate::web::protocol::{
    BookEnvelope, BookRequest, BooksResponse, MessageResponse, SearchParams, StatusRequest,
};
use crate::web::state::{blocking, AppState};

/// GET /api/books - Every listing
#[utoipa::path(
    get,
    path = "/api/books",
    responses((status = 200, description = "All books", body = BooksResponse))
)]
pub async fn list_books_handler(State(state): State<Arc<AppState>>) -> Json<BooksResponse> {
    Json(state.marketplace.list_books().into())
}

/// GET /api/books/search - Case-insensitive filtering, all criteria ANDed
#[utoipa::path(
    get,
    path = "/api/books/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching books", body = BooksResponse),
        (status = 400, description = "No search parameter supplied")
    )
)]
pub async fn search_books_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<BooksResponse>, ApiError> {
    let filter = BookFilter {
        query: params.q,
        location: params.location,
        genre: params.genre,
    };
    let books = state.marketplace.search_books(&filter)?;
    Ok(Json(books.into()))
}

/// GET /api/books/{id}
#[utoipa::path(
    get,
    path = "/api/books/{id}",
    params(("id" = String, Path, description = "Book id")),
    responses(
        (status = 200, description = "The book", body = BookEnvelope),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BookEnvelope>, ApiError> {
    let book = state.marketplace.get_book(&id)?;
    Ok(Json(BookEnvelope {
        message: None,
        book: book.into(),
    }))
}

/// GET /api/books/mine - The caller's own listings
#[utoipa::path(
    get,
    path = "/api/books/mine",
    responses(
        (status = 200, description = "The caller's books", body = BooksResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_books_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Json<BooksResponse> {
    Json(state.marketplace.books_by_owner(&identity).into())
}

/// POST /api/books - Owners only
#[utoipa::path(
    post,
    path = "/api/books",
    request_body = BookRequest,
    responses(
        (status = 201, description = "Book created", body = BookEnvelope),
        (status = 400, description = "Missing field"),
        (status = 403, description = "Owner access required")
    )
)]
pub async fn create_book_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<BookRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let market = state.marketplace.clone();
    let book = blocking(move || market.create_book(&identity, req.into())).await?;

    Ok((
        StatusCode::CREATED,
        Json(BookEnvelope {
            message: Some("Book created successfully".to_string()),
            book: book.into(),
        }),
    ))
}

/// PUT /api/books/{id} - Owners only, and only their own books
#[utoipa::path(
    put,
    path = "/api/books/{id}",
    params(("id" = String, Path, description = "Book id")),
    request_body = BookRequest,
    responses(
        (status = 200, description = "Book updated", body = BookEnvelope),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Json(req): Json<BookRequest>,
) -> Result<Json<BookEnvelope>, ApiError> {
    let market = state.marketplace.clone();
    let book = blocking(move || market.update_book(&identity, &id, req.into())).await?;

    Ok(Json(BookEnvelope {
        message: Some("Book updated successfully".to_string()),
        book: book.into(),
    }))
}

/// PATCH /api/books/{id}/status
#[utoipa::path(
    patch,
    path = "/api/books/{id}/status",
    params(("id" = String, Path, description = "Book id")),
    request_body = StatusRequest,
    responses(
        (status = 200, description = "Status updated", body = BookEnvelope),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_status_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<BookEnvelope>, ApiError> {
    let market = state.marketplace.clone();
    let book = blocking(move || market.update_book_status(&identity, &id, &req.status)).await?;

    Ok(Json(BookEnvelope {
        message: Some("Book status updated successfully".to_string()),
        book: book.into(),
    }))
}

/// DELETE /api/books/{id} - Owners only, and only their own books
#[utoipa::path(
    delete,
    path = "/api/books/{id}",
    params(("id" = String, Path, description = "Book id")),
    responses(
        (status = 200, description = "Book deleted", body = MessageResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let market = state.marketplace.clone();
    blocking(move || market.delete_book(&identity, &id)).await?;

    Ok(Json(MessageResponse {
        message: "Book deleted successfully".to_string(),
    }))
}
