pub mod hasher;
pub mod json_store;
pub mod sessions;

pub use hasher::Argon2Hasher;
pub use json_store::JsonFileStore;
pub use sessions::InMemorySessionRegistry;
