//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and how it is assembled from the
//! configuration.

use crate::adapters::{Argon2Hasher, InMemorySessionRegistry, JsonFileStore};
use crate::config::Config;
use crate::error::ApiError;
use book_exchange_core::ports::{
    CredentialHasher, IdentityResolver, PortResult, RecordStore, SessionRegistry,
};
use book_exchange_core::{AuthScheme, Book, CredentialResolver, Marketplace, SessionResolver, User};
use std::sync::Arc;
use tracing::info;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub marketplace: Arc<Marketplace>,
    pub identity: Arc<dyn IdentityResolver>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Opens both record stores under `config.data_dir` and wires the identity
    /// resolver selected by `config.auth_mode`.
    ///
    /// The data directory must already exist.
    pub fn from_config(config: Arc<Config>) -> PortResult<Self> {
        let users: Arc<dyn RecordStore<User>> = Arc::new(JsonFileStore::open(config.users_path())?);
        let books: Arc<dyn RecordStore<Book>> = Arc::new(JsonFileStore::open(config.books_path())?);
        let hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2Hasher::new());

        let identity: Arc<dyn IdentityResolver> = match config.auth_mode {
            AuthScheme::Session => {
                let sessions: Arc<dyn SessionRegistry> =
                    Arc::new(InMemorySessionRegistry::new(config.session_ttl));
                Arc::new(SessionResolver::new(users.clone(), sessions))
            }
            AuthScheme::Basic => Arc::new(CredentialResolver::new(users.clone(), hasher.clone())),
        };
        info!("Identity resolution mode: {:?}", config.auth_mode);

        Ok(Self {
            marketplace: Arc::new(Marketplace::new(users, books, hasher)),
            identity,
            config,
        })
    }
}

/// Runs a synchronous core operation on the blocking thread pool.
///
/// Store mutations hold a lock across file I/O and password hashing is
/// CPU-bound, so neither may run on the async workers.
pub async fn blocking<T, F>(operation: F) -> Result<T, ApiError>
where
    F: FnOnce() -> PortResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(operation)
        .await
        .map_err(|e| ApiError::Internal(format!("blocking task failed: {}", e)))?
        .map_err(ApiError::from)
}
