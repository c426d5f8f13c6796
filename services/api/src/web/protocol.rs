//! services/api/src/web/protocol.rs
//!
//! Request and response bodies of the REST API. Field names match the
//! browser client (camelCase); passwords never appear in a response.

use book_exchange_core::{Book, BookDraft, NewUser, ProfileUpdate, User};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

//=========================================================================================
// Requests
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub mobile_number: String,
    pub role: String,
}

impl From<RegisterRequest> for NewUser {
    fn from(req: RegisterRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            password: req.password,
            mobile_number: req.mobile_number,
            role: req.role,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub mobile_number: Option<String>,
}

impl From<ProfileUpdateRequest> for ProfileUpdate {
    fn from(req: ProfileUpdateRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            password: req.password,
            mobile_number: req.mobile_number,
        }
    }
}

/// The owner-editable fields of a listing.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookRequest {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub contact_info: String,
    pub status: Option<String>,
    pub image_url: Option<String>,
}

impl From<BookRequest> for BookDraft {
    fn from(req: BookRequest) -> Self {
        Self {
            title: req.title,
            author: req.author,
            genre: req.genre,
            location: req.location,
            contact_info: req.contact_info,
            status: req.status,
            image_url: req.image_url,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct StatusRequest {
    pub status: String,
}

#[derive(Deserialize, IntoParams, Default)]
pub struct SearchParams {
    /// Matches title or author.
    pub q: Option<String>,
    pub location: Option<String>,
    pub genre: Option<String>,
}

//=========================================================================================
// Responses
//=========================================================================================

/// A user as shown to clients.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub mobile_number: String,
    pub role: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            mobile_number: user.mobile_number,
            role: user.role.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    pub id: String,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub location: String,
    pub contact_info: String,
    pub owner_id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            genre: book.genre,
            location: book.location,
            contact_info: book.contact_info,
            owner_id: book.owner_id,
            status: book.status.into(),
            image_url: book.image_url,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub message: String,
    pub user: UserResponse,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct MeResponse {
    pub user: UserResponse,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct BookEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub book: BookResponse,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct BooksResponse {
    pub books: Vec<BookResponse>,
}

impl From<Vec<Book>> for BooksResponse {
    fn from(books: Vec<Book>) -> Self {
        Self {
            books: books.into_iter().map(BookResponse::from).collect(),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}
