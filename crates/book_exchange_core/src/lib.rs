pub mod access;
pub mod domain;
pub mod identity;
pub mod marketplace;
pub mod ports;
pub mod search;

#[cfg(test)]
mod testing;

pub use domain::{
    AuthScheme, AuthSession, Book, BookDraft, BookStatus, Credential, Identity, NewUser,
    ProfileUpdate, Role, User,
};
pub use identity::{CredentialResolver, SessionResolver};
pub use marketplace::Marketplace;
pub use ports::{
    CredentialHasher, IdentityResolver, PortError, PortResult, Record, RecordStore,
    SessionRegistry,
};
pub use search::BookFilter;
