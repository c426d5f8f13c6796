//! crates/book_exchange_core/src/domain.rs
//!
//! Defines the core data structures for the marketplace.
//! Users and Books serialize to the same camelCase field names used by the
//! durable snapshot files, so the store can write them as-is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::ports::PortError;

/// Returns a fresh record id: 32 lowercase hex characters.
pub fn new_record_id() -> String {
    Uuid::new_v4().simple().to_string()
}

//=========================================================================================
// Roles and Statuses
//=========================================================================================

/// The two mutually exclusive identity roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Seeker,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Seeker => "seeker",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "owner" => Ok(Role::Owner),
            "seeker" => Ok(Role::Seeker),
            other => Err(PortError::Validation(format!(
                "invalid role '{}': expected 'owner' or 'seeker'",
                other
            ))),
        }
    }
}

/// Availability of a listing. Anything other than the two known values is
/// kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BookStatus {
    #[default]
    Available,
    Rented,
    Other(String),
}

impl From<String> for BookStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "available" => BookStatus::Available,
            "rented" => BookStatus::Rented,
            _ => BookStatus::Other(value),
        }
    }
}

impl From<BookStatus> for String {
    fn from(status: BookStatus) -> Self {
        match status {
            BookStatus::Available => "available".to_string(),
            BookStatus::Rented => "rented".to_string(),
            BookStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookStatus::Available => f.write_str("available"),
            BookStatus::Rented => f.write_str("rented"),
            BookStatus::Other(s) => f.write_str(s),
        }
    }
}

//=========================================================================================
// Records
//=========================================================================================

/// A registered marketplace user.
///
/// `password` holds a PHC-formatted salted hash, never the plaintext secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub mobile_number: String,
    pub role: Role,
}

/// A book listed by an owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub contact_info: String,
    pub owner_id: String,
    #[serde(default)]
    pub status: BookStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

//=========================================================================================
// Inputs
//=========================================================================================

/// Registration input. The role arrives as a raw literal and is validated
/// during registration.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub mobile_number: String,
    pub role: String,
}

/// Partial profile change. Empty or absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub mobile_number: Option<String>,
}

/// The owner-editable fields of a listing, used for both create and update.
#[derive(Debug, Clone, Default)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub location: String,
    pub contact_info: String,
    pub status: Option<String>,
    pub image_url: Option<String>,
}

//=========================================================================================
// Identity and Sessions
//=========================================================================================

/// The resolved caller of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub role: Role,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            role: user.role,
        }
    }
}

/// A credential as presented by a caller.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Session(String),
    Basic { email: String, password: String },
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Session(_) => f.write_str("Credential::Session(..)"),
            Credential::Basic { email, .. } => f
                .debug_struct("Credential::Basic")
                .field("email", email)
                .finish_non_exhaustive(),
        }
    }
}

/// Which kind of credential a deployment expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    Session,
    Basic,
}

// Represents a login session issued by the session registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub token: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}
