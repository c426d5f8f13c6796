//! crates/book_exchange_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the marketplace core.
//! Storage, sessions, credential hashing and identity resolution are all
//! injected through these traits, so the core owns no global state.

use crate::domain::{AuthScheme, AuthSession, Book, Credential, Identity, User};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// The error type for all port and core operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Invalid or expired session")]
    SessionInvalid,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Records
//=========================================================================================

/// A keyed entity the record store can hold.
pub trait Record: Clone + Send + Sync + 'static {
    /// Human readable kind, used in error messages.
    const KIND: &'static str;

    fn id(&self) -> &str;

    /// The id of the identity allowed to mutate or delete this record.
    fn owner_id(&self) -> &str;

    /// Re-imposes the key and ownership of `original` after an update closure
    /// ran, so updates can never move or re-home a record.
    fn preserve_keys(&mut self, original: &Self);
}

impl Record for User {
    const KIND: &'static str = "user";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        &self.id
    }

    fn preserve_keys(&mut self, original: &Self) {
        self.id = original.id.clone();
    }
}

impl Record for Book {
    const KIND: &'static str = "book";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        &self.owner_id
    }

    fn preserve_keys(&mut self, original: &Self) {
        self.id = original.id.clone();
        self.owner_id = original.owner_id.clone();
    }
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The authoritative holder of one collection of records.
///
/// Every mutation is durable before it returns `Ok`; a mutation whose durable
/// write fails is not applied.
pub trait RecordStore<R: Record>: Send + Sync {
    /// Inserts or fully replaces the record keyed by its id.
    fn put(&self, record: R) -> PortResult<()>;

    /// Like `put`, but fails with `Conflict` if any other record satisfies
    /// `clashes`. The check and the write happen under one exclusive lock.
    fn put_unless(&self, record: R, clashes: &dyn Fn(&R) -> bool) -> PortResult<()>;

    fn get(&self, id: &str) -> Option<R>;

    /// Returns an owned copy of every record.
    fn get_all(&self) -> Vec<R>;

    /// Applies `apply` to the record owned by `requester` and persists it.
    fn update(&self, id: &str, requester: &str, apply: &mut dyn FnMut(&mut R)) -> PortResult<R>;

    /// Like `update`, but fails with `Conflict` if the updated record clashes
    /// with any other record. `clashes(updated, other)` runs under the same
    /// exclusive lock as the write.
    fn update_unless(
        &self,
        id: &str,
        requester: &str,
        apply: &mut dyn FnMut(&mut R),
        clashes: &dyn Fn(&R, &R) -> bool,
    ) -> PortResult<R>;

    /// Removes the record owned by `requester`, returning it.
    fn delete(&self, id: &str, requester: &str) -> PortResult<R>;

    fn find_first(&self, predicate: &dyn Fn(&R) -> bool) -> Option<R>;

    fn find_all(&self, predicate: &dyn Fn(&R) -> bool) -> Vec<R>;
}

/// Maps opaque session tokens to user ids for the lifetime of the process.
pub trait SessionRegistry: Send + Sync {
    /// Issues a new random token for `user_id`.
    fn create(&self, user_id: &str) -> PortResult<AuthSession>;

    /// Returns the user id behind a live token.
    fn resolve(&self, token: &str) -> Option<String>;

    /// Forgets a token. Unknown tokens are ignored.
    fn revoke(&self, token: &str);

    /// Drops every expired session, returning how many were removed.
    fn purge_expired(&self) -> usize;
}

/// One-way salted hashing of credential secrets.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, secret: &str) -> PortResult<String>;

    /// Checks `secret` against a stored hash in constant time.
    fn verify(&self, secret: &str, hash: &str) -> PortResult<bool>;

    /// Does the work of one `verify` for a login with no stored hash, so an
    /// unknown account answers in the same time as a wrong password.
    fn verify_absent(&self, secret: &str) {
        let _ = self.hash(secret);
    }
}

/// Turns a presented credential into an `Identity`.
///
/// A deployment constructs exactly one implementation at startup.
pub trait IdentityResolver: Send + Sync {
    /// The credential kind this resolver accepts.
    fn scheme(&self) -> AuthScheme;

    fn resolve(&self, credential: &Credential) -> PortResult<Identity>;

    /// Called after a successful login. Session-based resolvers issue a
    /// session; stateless ones return `None`.
    fn sign_in(&self, user: &User) -> PortResult<Option<AuthSession>>;

    /// Ends whatever state `sign_in` created for this credential.
    fn sign_out(&self, credential: &Credential);
}
