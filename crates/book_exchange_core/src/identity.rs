//! crates/book_exchange_core/src/identity.rs
//!
//! The two identity resolution policies. A deployment builds one of them at
//! startup and hands it to the web layer as an `Arc<dyn IdentityResolver>`.

use std::sync::Arc;

use tracing::debug;

use crate::domain::{AuthScheme, AuthSession, Credential, Identity, User};
use crate::ports::{
    CredentialHasher, IdentityResolver, PortError, PortResult, RecordStore, SessionRegistry,
};

//=========================================================================================
// Session Tokens
//=========================================================================================

/// Resolves session tokens issued at login through the session registry.
pub struct SessionResolver {
    users: Arc<dyn RecordStore<User>>,
    sessions: Arc<dyn SessionRegistry>,
}

impl SessionResolver {
    pub fn new(users: Arc<dyn RecordStore<User>>, sessions: Arc<dyn SessionRegistry>) -> Self {
        Self { users, sessions }
    }
}

impl IdentityResolver for SessionResolver {
    fn scheme(&self) -> AuthScheme {
        AuthScheme::Session
    }

    fn resolve(&self, credential: &Credential) -> PortResult<Identity> {
        let Credential::Session(token) = credential else {
            return Err(PortError::Unauthorized);
        };
        let user_id = self.sessions.resolve(token).ok_or(PortError::SessionInvalid)?;
        // A session may outlive its user record only if users can be removed.
        let user = self.users.get(&user_id).ok_or(PortError::SessionInvalid)?;
        Ok(Identity::from(&user))
    }

    fn sign_in(&self, user: &User) -> PortResult<Option<AuthSession>> {
        let session = self.sessions.create(&user.id)?;
        debug!("Issued session for user {}", user.id);
        Ok(Some(session))
    }

    fn sign_out(&self, credential: &Credential) {
        if let Credential::Session(token) = credential {
            self.sessions.revoke(token);
        }
    }
}

//=========================================================================================
// Per-request Credentials
//=========================================================================================

/// Checks email and password against the user store on every call.
pub struct CredentialResolver {
    users: Arc<dyn RecordStore<User>>,
    hasher: Arc<dyn CredentialHasher>,
}

impl CredentialResolver {
    pub fn new(users: Arc<dyn RecordStore<User>>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { users, hasher }
    }
}

impl IdentityResolver for CredentialResolver {
    fn scheme(&self) -> AuthScheme {
        AuthScheme::Basic
    }

    fn resolve(&self, credential: &Credential) -> PortResult<Identity> {
        let Credential::Basic { email, password } = credential else {
            return Err(PortError::Unauthorized);
        };
        let user = verify_credentials(self.users.as_ref(), self.hasher.as_ref(), email, password)?;
        Ok(Identity::from(&user))
    }

    fn sign_in(&self, _user: &User) -> PortResult<Option<AuthSession>> {
        Ok(None)
    }

    fn sign_out(&self, _credential: &Credential) {}
}

/// Looks a user up by email and checks the password. Unknown email and wrong
/// password fail identically.
pub fn verify_credentials(
    users: &dyn RecordStore<User>,
    hasher: &dyn CredentialHasher,
    email: &str,
    password: &str,
) -> PortResult<User> {
    let email = normalize_email(email);
    let Some(user) = users.find_first(&|u: &User| u.email == email) else {
        hasher.verify_absent(password);
        return Err(PortError::Unauthorized);
    };
    if hasher.verify(password, &user.password)? {
        Ok(user)
    } else {
        Err(PortError::Unauthorized)
    }
}

/// Emails are compared trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
