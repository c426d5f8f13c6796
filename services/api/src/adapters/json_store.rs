//! services/api/src/adapters/json_store.rs
//!
//! The file-backed record store, the concrete implementation of the
//! `RecordStore` port from the `core` crate. Each collection lives in memory
//! behind its own reader/writer lock and is rewritten in full to a JSON file
//! on every mutation, while the write lock is still held.

use book_exchange_core::ports::{PortError, PortResult, Record, RecordStore};
use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{error, info};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A record store persisted as one pretty-printed JSON object keyed by id.
///
/// The map is ordered so that snapshots are byte-for-byte deterministic.
pub struct JsonFileStore<R> {
    path: PathBuf,
    records: RwLock<BTreeMap<String, R>>,
}

impl<R> JsonFileStore<R>
where
    R: Record + Serialize + DeserializeOwned,
{
    /// Opens the store at `path`, creating an empty snapshot if none exists.
    ///
    /// An empty file is treated as an empty collection; anything that does not
    /// parse fails with `Persistence` rather than being overwritten later.
    pub fn open(path: impl Into<PathBuf>) -> PortResult<Self> {
        let path = path.into();

        let records = if path.exists() {
            let data = fs::read(&path).map_err(|e| persistence(&path, e))?;
            if data.iter().all(u8::is_ascii_whitespace) {
                BTreeMap::new()
            } else {
                serde_json::from_slice(&data).map_err(|e| persistence(&path, e))?
            }
        } else {
            let empty = BTreeMap::new();
            write_snapshot(&path, &empty)?;
            empty
        };

        info!(
            "Loaded {} {} record(s) from {}",
            records.len(),
            R::KIND,
            path.display()
        );
        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the collection, or undoes the in-memory change on failure.
    fn commit(
        &self,
        records: &mut BTreeMap<String, R>,
        id: &str,
        previous: Option<R>,
    ) -> PortResult<()> {
        if let Err(e) = write_snapshot(&self.path, records) {
            error!("Failed to persist {} {}: {}", R::KIND, id, e);
            match previous {
                Some(record) => records.insert(id.to_string(), record),
                None => records.remove(id),
            };
            return Err(e);
        }
        Ok(())
    }
}

//=========================================================================================
// `RecordStore` Trait Implementation
//=========================================================================================

impl<R> RecordStore<R> for JsonFileStore<R>
where
    R: Record + Serialize + DeserializeOwned,
{
    fn put(&self, record: R) -> PortResult<()> {
        let mut records = self.records.write();
        let id = record.id().to_string();
        let previous = records.insert(id.clone(), record);
        self.commit(&mut records, &id, previous)
    }

    fn put_unless(&self, record: R, clashes: &dyn Fn(&R) -> bool) -> PortResult<()> {
        let mut records = self.records.write();
        let id = record.id().to_string();
        if records.values().any(|r| r.id() != id && clashes(r)) {
            return Err(PortError::Conflict(format!("{} already exists", R::KIND)));
        }
        let previous = records.insert(id.clone(), record);
        self.commit(&mut records, &id, previous)
    }

    fn get(&self, id: &str) -> Option<R> {
        self.records.read().get(id).cloned()
    }

    fn get_all(&self) -> Vec<R> {
        self.records.read().values().cloned().collect()
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
        let mut records = self.records.write();
        let original = records.get(id).cloned().ok_or_else(|| not_found::<R>(id))?;
        if original.owner_id() != requester {
            return Err(PortError::Forbidden(format!(
                "you can only modify your own {}s",
                R::KIND
            )));
        }

        let mut updated = original.clone();
        apply(&mut updated);
        updated.preserve_keys(&original);
        if records.values().any(|r| r.id() != id && clashes(&updated, r)) {
            return Err(PortError::Conflict(format!("{} already exists", R::KIND)));
        }

        records.insert(id.to_string(), updated.clone());
        self.commit(&mut records, id, Some(original))?;
        Ok(updated)
    }

    fn delete(&self, id: &str, requester: &str) -> PortResult<R> {
        let mut records = self.records.write();
        match records.get(id) {
            None => return Err(not_found::<R>(id)),
            Some(r) if r.owner_id() != requester => {
                return Err(PortError::Forbidden(format!(
                    "you can only delete your own {}s",
                    R::KIND
                )))
            }
            Some(_) => {}
        }

        let removed = records.remove(id).ok_or_else(|| not_found::<R>(id))?;
        self.commit(&mut records, id, Some(removed.clone()))?;
        Ok(removed)
    }

    fn find_first(&self, predicate: &dyn Fn(&R) -> bool) -> Option<R> {
        self.records.read().values().find(|r| predicate(r)).cloned()
    }

    fn find_all(&self, predicate: &dyn Fn(&R) -> bool) -> Vec<R> {
        self.records
            .read()
            .values()
            .filter(|r| predicate(r))
            .cloned()
            .collect()
    }
}

//=========================================================================================
// Snapshot Helpers
//=========================================================================================

/// Serializes the whole collection to a sibling temp file, syncs it, renames
/// it over `path`, then syncs the directory so the rename itself is durable.
fn write_snapshot<R: Serialize>(path: &Path, records: &BTreeMap<String, R>) -> PortResult<()> {
    let data = serde_json::to_vec_pretty(records).map_err(|e| persistence(path, e))?;

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let mut file = fs::File::create(&tmp_path).map_err(|e| persistence(&tmp_path, e))?;
    file.write_all(&data).map_err(|e| persistence(&tmp_path, e))?;
    file.sync_all().map_err(|e| persistence(&tmp_path, e))?;
    fs::rename(&tmp_path, path).map_err(|e| persistence(path, e))?;
    sync_parent_directory(path)
}

#[cfg(unix)]
fn sync_parent_directory(path: &Path) -> PortResult<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::File::open(parent)
        .and_then(|dir| dir.sync_all())
        .map_err(|e| persistence(parent, e))
}

// Directories cannot be opened for syncing here; the rename is all we get.
#[cfg(not(unix))]
fn sync_parent_directory(_path: &Path) -> PortResult<()> {
    Ok(())
}

fn persistence(path: &Path, e: impl std::fmt::Display) -> PortError {
    PortError::Persistence(format!("{}: {}", path.display(), e))
}

fn not_found<R: Record>(id: &str) -> PortError {
    PortError::NotFound(format!("{} {} not found", R::KIND, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use book_exchange_core::{Book, BookStatus};
    use tempfile::tempdir;

    fn book(id: &str, owner: &str) -> Book {
        Book {
            id: id.into(),
            title: "Dune".into(),
            author: "Frank Herbert".into(),
            genre: "SciFi".into(),
            location: "Pune".into(),
            contact_info: "555".into(),
            owner_id: owner.into(),
            status: BookStatus::Available,
            image_url: None,
        }
    }

    #[test]
    fn open_creates_an_empty_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("books.json");

        let store: JsonFileStore<Book> = JsonFileStore::open(&path).unwrap();
        assert!(store.get_all().is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn empty_file_loads_as_empty_collection() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("books.json");
        fs::write(&path, "").unwrap();

        let store: JsonFileStore<Book> = JsonFileStore::open(&path).unwrap();
        assert!(store.get_all().is_empty());
    }

    #[test]
    fn snapshot_replaces_the_file_and_syncs_its_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("books.json");
        let records = BTreeMap::from([("b1".to_string(), book("b1", "u1"))]);

        write_snapshot(&path, &records).unwrap();
        assert!(!dir.path().join("books.json.tmp").exists());
        assert!(fs::read_to_string(&path).unwrap().contains("\"b1\""));

        assert!(sync_parent_directory(&path).is_ok());
        // A bare file name syncs the working directory.
        assert!(sync_parent_directory(Path::new("books.json")).is_ok());
    }

    #[test]
    fn corrupt_file_fails_to_open() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("books.json");
        fs::write(&path, "{ not json").unwrap();

        let result: PortResult<JsonFileStore<Book>> = JsonFileStore::open(&path);
        assert!(matches!(result, Err(PortError::Persistence(_))));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn failed_write_rolls_back_memory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("books.json");
        let store: JsonFileStore<Book> = JsonFileStore::open(&path).unwrap();
        store.put(book("b1", "u1")).unwrap();

        // A directory squatting on the temp path makes the next snapshot fail.
        fs::create_dir(dir.path().join("books.json.tmp")).unwrap();

        assert!(matches!(store.put(book("b2", "u1")), Err(PortError::Persistence(_))));
        assert!(store.get("b2").is_none());

        assert!(matches!(store.delete("b1", "u1"), Err(PortError::Persistence(_))));
        assert!(store.get("b1").is_some());

        assert!(matches!(
            store.update("b1", "u1", &mut |b: &mut Book| b.title = "Changed".into()),
            Err(PortError::Persistence(_))
        ));
        assert_eq!(store.get("b1").unwrap().title, "Dune");
    }

    #[test]
    fn update_cannot_move_or_rehome_a_record() {
        let dir = tempdir().unwrap();
        let store: JsonFileStore<Book> =
            JsonFileStore::open(dir.path().join("books.json")).unwrap();
        store.put(book("b1", "u1")).unwrap();

        let updated = store
            .update("b1", "u1", &mut |b: &mut Book| {
                b.id = "elsewhere".into();
                b.owner_id = "thief".into();
                b.status = BookStatus::Rented;
            })
            .unwrap();
        assert_eq!(updated.id, "b1");
        assert_eq!(updated.owner_id, "u1");
        assert_eq!(updated.status, BookStatus::Rented);
        assert!(store.get("elsewhere").is_none());
    }

    #[test]
    fn update_unless_rejects_a_clash_without_writing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("books.json");
        let store: JsonFileStore<Book> = JsonFileStore::open(&path).unwrap();
        store.put(book("b1", "u1")).unwrap();
        let mut other = book("b2", "u1");
        other.title = "Emma".into();
        store.put(other).unwrap();
        let before = fs::read_to_string(&path).unwrap();

        let same_title = |updated: &Book, other: &Book| updated.title == other.title;
        let clash = store.update_unless(
            "b1",
            "u1",
            &mut |b: &mut Book| b.title = "Emma".into(),
            &same_title,
        );
        assert!(matches!(clash, Err(PortError::Conflict(_))));
        assert_eq!(store.get("b1").unwrap().title, "Dune");
        assert_eq!(fs::read_to_string(&path).unwrap(), before);

        // Keeping its own title never clashes with itself.
        let renamed = store
            .update_unless(
                "b1",
                "u1",
                &mut |b: &mut Book| b.genre = "Classic".into(),
                &same_title,
            )
            .unwrap();
        assert_eq!(renamed.genre, "Classic");
        let reopened: JsonFileStore<Book> = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get("b1").unwrap().genre, "Classic");
    }

    #[test]
    fn delete_checks_presence_then_ownership() {
        let dir = tempdir().unwrap();
        let store: JsonFileStore<Book> =
            JsonFileStore::open(dir.path().join("books.json")).unwrap();
        store.put(book("b1", "u1")).unwrap();

        assert!(matches!(store.delete("nope", "u1"), Err(PortError::NotFound(_))));
        assert!(matches!(store.delete("b1", "u2"), Err(PortError::Forbidden(_))));
        assert!(store.get("b1").is_some());

        assert_eq!(store.delete("b1", "u1").unwrap().id, "b1");
        assert!(store.get("b1").is_none());
    }
}
