//! services/api/src/adapters/sessions.rs
//!
//! The in-memory session registry. Sessions live for the lifetime of the
//! process and expire after a fixed TTL.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use book_exchange_core::domain::AuthSession;
use book_exchange_core::ports::{PortError, PortResult, SessionRegistry};
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use rand::{rngs::OsRng, RngCore};
use std::collections::HashMap;
use tracing::debug;

/// Random bytes per token; 256 bits of entropy.
const TOKEN_BYTES: usize = 32;

struct SessionEntry {
    user_id: String,
    expires_at: DateTime<Utc>,
}

/// Token → user id map behind its own reader/writer lock.
pub struct InMemorySessionRegistry {
    ttl: Duration,
    sessions: RwLock<HashMap<String, SessionEntry>>,
}

impl InMemorySessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionRegistry for InMemorySessionRegistry {
    fn create(&self, user_id: &str) -> PortResult<AuthSession> {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
            PortError::Unexpected(format!("failed to generate session token: {}", e))
        })?;
        let token = URL_SAFE_NO_PAD.encode(bytes);

        let now = Utc::now();
        let expires_at = now.checked_add_signed(self.ttl).ok_or_else(|| {
            PortError::Unexpected("session lifetime overflows the clock".to_string())
        })?;

        let mut sessions = self.sessions.write();
        sessions.retain(|_, entry| entry.expires_at > now);
        sessions.insert(
            token.clone(),
            SessionEntry {
                user_id: user_id.to_string(),
                expires_at,
            },
        );

        Ok(AuthSession {
            token,
            user_id: user_id.to_string(),
            expires_at,
        })
    }

    fn resolve(&self, token: &str) -> Option<String> {
        let sessions = self.sessions.read();
        let entry = sessions.get(token)?;
        if entry.expires_at > Utc::now() {
            Some(entry.user_id.clone())
        } else {
            None
        }
    }

    fn revoke(&self, token: &str) {
        if self.sessions.write().remove(token).is_some() {
            debug!("Revoked session");
        }
    }

    fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, entry| entry.expires_at > now);
        before - sessions.len()
    }
}
