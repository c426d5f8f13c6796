pub mod auth;
pub mod books;
pub mod middleware;
pub mod protocol;
pub mod rest;
pub mod state;
pub mod users;

// Re-export the router builder and shared state so the binaries and tests
// can assemble the server.
pub use middleware::{require_auth, require_owner};
pub use rest::{router, ApiDoc};
pub use state::AppState;
