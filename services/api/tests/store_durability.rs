//! Record store durability and concurrency tests:
//! - Snapshots survive a restart
//! - Snapshot file layout
//! - Read-after-write under concurrent writers
//! - Email uniqueness under concurrent registration

use api_lib::adapters::JsonFileStore;
use book_exchange_core::ports::{CredentialHasher, PortResult, RecordStore};
use book_exchange_core::{Book, BookStatus, Marketplace, NewUser, PortError, Role, User};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use tempfile::tempdir;

struct CheapHasher;

impl CredentialHasher for CheapHasher {
    fn hash(&self, secret: &str) -> PortResult<String> {
        Ok(format!("cheap${}", secret))
    }

    fn verify(&self, secret: &str, hash: &str) -> PortResult<bool> {
        Ok(hash.strip_prefix("cheap$") == Some(secret))
    }
}

fn book(id: &str, title: &str, owner: &str) -> Book {
    Book {
        id: id.to_string(),
        title: title.to_string(),
        author: "Author".to_string(),
        genre: "SciFi".to_string(),
        location: "Pune".to_string(),
        contact_info: "555-0100".to_string(),
        owner_id: owner.to_string(),
        status: BookStatus::Available,
        image_url: None,
    }
}

/// Test that every record comes back unchanged after a restart
#[test]
fn snapshot_round_trips_across_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("books.json");

    let written: Vec<Book> = {
        let store: JsonFileStore<Book> = JsonFileStore::open(&path).unwrap();
        store.put(book("b1", "Dune", "u1")).unwrap();
        let mut hobbit = book("b2", "Hobbit", "u2");
        hobbit.status = BookStatus::Other("lent to a friend".to_string());
        hobbit.image_url = Some("https://example.com/hobbit.png".to_string());
        store.put(hobbit).unwrap();
        store.put(book("b3", "Emma", "u1")).unwrap();
        store.delete("b3", "u1").unwrap();
        store.get_all()
    };

    let reopened: JsonFileStore<Book> = JsonFileStore::open(&path).unwrap();
    let mut reloaded = reopened.get_all();
    let mut expected = written;
    reloaded.sort_by(|a, b| a.id.cmp(&b.id));
    expected.sort_by(|a, b| a.id.cmp(&b.id));
    assert_eq!(reloaded, expected);
    assert_eq!(reloaded.len(), 2);
}

/// Test the on-disk layout: an object keyed by id with camelCase fields
#[test]
fn snapshot_file_layout() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("users.json");

    let store: JsonFileStore<User> = JsonFileStore::open(&path).unwrap();
    store
        .put(User {
            id: "u1".to_string(),
            name: "Ann".to_string(),
            email: "ann@example.com".to_string(),
            password: "hash".to_string(),
            mobile_number: "555".to_string(),
            role: Role::Owner,
        })
        .unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("{\n  \"u1\": {\n    \"id\": \"u1\""));

    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["u1"]["mobileNumber"], "555");
    assert_eq!(json["u1"]["role"], "owner");
}

/// Test read-after-write for many concurrent writers on one collection
#[test]
fn concurrent_puts_are_visible_to_later_gets() {
    let dir = tempdir().unwrap();
    let store: Arc<JsonFileStore<Book>> =
        Arc::new(JsonFileStore::open(dir.path().join("books.json")).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let store = store.clone();
            thread::spawn(move || {
                for n in 0..10 {
                    let id = format!("b-{}-{}", worker, n);
                    store.put(book(&id, "Title", "owner")).unwrap();
                    assert_eq!(store.get(&id).unwrap().id, id);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.get_all().len(), 80);
    let reopened: JsonFileStore<Book> = JsonFileStore::open(store.path()).unwrap();
    assert_eq!(reopened.get_all().len(), 80);
}

/// Test that racing registrations for one email leave exactly one user
#[test]
fn concurrent_registration_keeps_email_unique() {
    let dir = tempdir().unwrap();
    let users: Arc<JsonFileStore<User>> =
        Arc::new(JsonFileStore::open(dir.path().join("users.json")).unwrap());
    let books: Arc<JsonFileStore<Book>> =
        Arc::new(JsonFileStore::open(dir.path().join("books.json")).unwrap());
    let market = Arc::new(Marketplace::new(users.clone(), books, Arc::new(CheapHasher)));

    let handles: Vec<_> = (0..8)
        .map(|n| {
            let market = market.clone();
            thread::spawn(move || {
                market.register(NewUser {
                    name: format!("Racer {}", n),
                    email: "same@example.com".to_string(),
                    password: "pw".to_string(),
                    mobile_number: String::new(),
                    role: "seeker".to_string(),
                })
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, PortError::Conflict(_))));

    let emails: HashSet<String> = users.get_all().into_iter().map(|u| u.email).collect();
    assert_eq!(users.get_all().len(), 1);
    assert_eq!(emails.len(), 1);
}

/// Test the owner / seeker / delete scenario directly against durable stores
#[test]
fn only_the_owner_can_delete_a_listing() {
    let dir = tempdir().unwrap();
    let users: Arc<JsonFileStore<User>> =
        Arc::new(JsonFileStore::open(dir.path().join("users.json")).unwrap());
    let books: Arc<JsonFileStore<Book>> =
        Arc::new(JsonFileStore::open(dir.path().join("books.json")).unwrap());
    let market = Marketplace::new(users, books.clone(), Arc::new(CheapHasher));

    let register = |email: &str, role: &str| {
        market
            .register(NewUser {
                name: "Someone".to_string(),
                email: email.to_string(),
                password: "pw".to_string(),
                mobile_number: String::new(),
                role: role.to_string(),
            })
            .unwrap()
    };
    let owner = register("a@example.com", "owner");
    let seeker = register("c@example.com", "seeker");

    let signed_in = market.authenticate("a@example.com", "pw").unwrap();
    let owner_identity = book_exchange_core::Identity::from(&signed_in);
    let listing = market
        .create_book(
            &owner_identity,
            book_exchange_core::BookDraft {
                title: "Dune".to_string(),
                author: "Frank Herbert".to_string(),
                contact_info: "a@example.com".to_string(),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(listing.owner_id, owner.id);

    assert!(matches!(
        books.delete(&listing.id, &seeker.id),
        Err(PortError::Forbidden(_))
    ));
    assert!(books.get(&listing.id).is_some());

    books.delete(&listing.id, &owner.id).unwrap();
    assert!(books.get(&listing.id).is_none());
}
