//! In-memory test doubles for the core ports.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use chrono::{Duration, Utc};

use crate::domain::AuthSession;
use crate::ports::{CredentialHasher, PortError, PortResult, Record, RecordStore, SessionRegistry};

pub struct MemoryStore<R> {
    records: RwLock<BTreeMap<String, R>>,
}

impl<R> Default for MemoryStore<R> {
    fn default() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<R: Record> RecordStore<R> for MemoryStore<R> {
    fn put(&self, record: R) -> PortResult<()> {
        self.records
            .write()
            .unwrap()
            .insert(record.id().to_string(), record);
        Ok(())
    }

    fn put_unless(&self, record: R, clashes: &dyn Fn(&R) -> bool) -> PortResult<()> {
        let mut records = self.records.write().unwrap();
        if records.values().any(|r| r.id() != record.id() && clashes(r)) {
            return Err(PortError::Conflict(format!("{} already exists", R::KIND)));
        }
        records.insert(record.id().to_string(), record);
        Ok(())
    }

    fn get(&self, id: &str) -> Option<R> {
        self.records.read().unwrap().get(id).cloned()
    }

    fn get_all(&self) -> Vec<R> {
        self.records.read().unwrap().values().cloned().collect()
    }

    fn update(&self, id: &str, requester: &str, apply: &mut dyn FnMut(&mut R)) -> PortResult<R> {
        self.update_unless(id, requester, apply, &|_, _| false)
    }

    fn update_unless(
        &self,
        id: &str,
        requester: &str,
        apply: &mut dyn FnMut(&mut R),
        clashes: &dyn Fn(&R, &R) -> bool,
    ) -> PortResult<R> {
        let mut records = self.records.write().unwrap();
        let mut updated = records
            .get(id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("{} {} not found", R::KIND, id)))?;
        if updated.owner_id() != requester {
            return Err(PortError::Forbidden("not the owner".into()));
        }
        let original = updated.clone();
        apply(&mut updated);
        updated.preserve_keys(&original);
        if records.values().any(|r| r.id() != id && clashes(&updated, r)) {
            return Err(PortError::Conflict(format!("{} already exists", R::KIND)));
        }
        records.insert(id.to_string(), updated.clone());
        Ok(updated)
    }

    fn delete(&self, id: &str, requester: &str) -> PortResult<R> {
        let mut records = self.records.write().unwrap();
        match records.get(id) {
            None => return Err(PortError::NotFound(format!("{} {} not found", R::KIND, id))),
            Some(r) if r.owner_id() != requester => {
                return Err(PortError::Forbidden("not the owner".into()))
            }
            Some(_) => {}
        }
        Ok(records.remove(id).unwrap())
    }

    fn find_first(&self, predicate: &dyn Fn(&R) -> bool) -> Option<R> {
        self.records.read().unwrap().values().find(|r| predicate(r)).cloned()
    }

    fn find_all(&self, predicate: &dyn Fn(&R) -> bool) -> Vec<R> {
        self.records
            .read()
            .unwrap()
            .values()
            .filter(|r| predicate(r))
            .cloned()
            .collect()
    }
}

#[derive(Default)]
pub struct MemorySessions {
    sessions: RwLock<HashMap<String, String>>,
    counter: RwLock<u64>,
}

impl SessionRegistry for MemorySessions {
    fn create(&self, user_id: &str) -> PortResult<AuthSession> {
        let mut counter = self.counter.write().unwrap();
        *counter += 1;
        let token = format!("token-{}", counter);
        self.sessions
            .write()
            .unwrap()
            .insert(token.clone(), user_id.to_string());
        Ok(AuthSession {
            token,
            user_id: user_id.to_string(),
            expires_at: Utc::now() + Duration::hours(1),
        })
    }

    fn resolve(&self, token: &str) -> Option<String> {
        self.sessions.read().unwrap().get(token).cloned()
    }

    fn revoke(&self, token: &str) {
        self.sessions.write().unwrap().remove(token);
    }

    fn purge_expired(&self) -> usize {
        0
    }
}

/// Reversible "hash" so tests stay fast.
pub struct PlainHasher;

impl CredentialHasher for PlainHasher {
    fn hash(&self, secret: &str) -> PortResult<String> {
        Ok(format!("plain${}", secret))
    }

    fn verify(&self, secret: &str, hash: &str) -> PortResult<bool> {
        Ok(hash.strip_prefix("plain$") == Some(secret))
    }
}
