//! crates/book_exchange_core/src/marketplace.rs
//!
//! The marketplace use cases: registration, login, profiles and book
//! listings. Every operation takes the caller's `Identity` explicitly and
//! returns typed `PortError`s; mapping them to a transport is the caller's job.

use std::sync::Arc;

use tracing::info;

use crate::access::{require_owner, require_role};
use crate::domain::{
    new_record_id, Book, BookDraft, BookStatus, Identity, NewUser, ProfileUpdate, Role, User,
};
use crate::identity::{normalize_email, verify_credentials};
use crate::ports::{CredentialHasher, PortError, PortResult, RecordStore};
use crate::search::{filter_books, BookFilter};

/// Composes the record stores and credential hasher into the marketplace
/// operations. Built once per process and shared behind an `Arc`.
pub struct Marketplace {
    users: Arc<dyn RecordStore<User>>,
    books: Arc<dyn RecordStore<Book>>,
    hasher: Arc<dyn CredentialHasher>,
}

impl Marketplace {
    pub fn new(
        users: Arc<dyn RecordStore<User>>,
        books: Arc<dyn RecordStore<Book>>,
        hasher: Arc<dyn CredentialHasher>,
    ) -> Self {
        Self {
            users,
            books,
            hasher,
        }
    }

    //=====================================================================================
    // Users
    //=====================================================================================

    pub fn register(&self, new_user: NewUser) -> PortResult<User> {
        let role: Role = new_user.role.parse()?;
        let name = required("name", &new_user.name)?;
        let email = normalize_email(required("email", &new_user.email)?);
        if !email.contains('@') {
            return Err(PortError::Validation(format!("'{}' is not an email address", email)));
        }
        if new_user.password.is_empty() {
            return Err(PortError::Validation("password is required".to_string()));
        }

        let user = User {
            id: new_record_id(),
            name: name.to_string(),
            email,
            password: self.hasher.hash(&new_user.password)?,
            mobile_number: new_user.mobile_number.trim().to_string(),
            role,
        };

        let email = user.email.clone();
        self.users
            .put_unless(user.clone(), &|other: &User| other.email == email)
            .map_err(email_taken)?;

        info!("Registered {} {}", user.role, user.id);
        Ok(user)
    }

    pub fn authenticate(&self, email: &str, password: &str) -> PortResult<User> {
        verify_credentials(self.users.as_ref(), self.hasher.as_ref(), email, password)
    }

    pub fn profile(&self, identity: &Identity) -> PortResult<User> {
        self.users
            .get(&identity.user_id)
            .ok_or_else(|| PortError::NotFound(format!("user {} not found", identity.user_id)))
    }

    /// Replaces the non-empty fields of the caller's profile.
    ///
    /// The new password is hashed before the users lock is taken; the field
    /// changes and the email uniqueness check then apply atomically.
    pub fn update_profile(&self, identity: &Identity, update: ProfileUpdate) -> PortResult<User> {
        let name = non_empty(update.name);
        let mobile_number = non_empty(update.mobile_number);
        let email = non_empty(update.email).map(|e| normalize_email(&e));
        if let Some(email) = email.as_deref().filter(|e| !e.contains('@')) {
            return Err(PortError::Validation(format!("'{}' is not an email address", email)));
        }
        let password = update
            .password
            .filter(|p| !p.is_empty())
            .map(|p| self.hasher.hash(&p))
            .transpose()?;

        self.users
            .update_unless(
                &identity.user_id,
                &identity.user_id,
                &mut |user: &mut User| {
                    if let Some(name) = &name {
                        user.name = name.clone();
                    }
                    if let Some(mobile_number) = &mobile_number {
                        user.mobile_number = mobile_number.clone();
                    }
                    if let Some(email) = &email {
                        user.email = email.clone();
                    }
                    if let Some(password) = &password {
                        user.password = password.clone();
                    }
                },
                &|updated: &User, other: &User| other.email == updated.email,
            )
            .map_err(email_taken)
    }

    //=====================================================================================
    // Books
    //=====================================================================================

    pub fn create_book(&self, identity: &Identity, draft: BookDraft) -> PortResult<Book> {
        require_role(identity, Role::Owner)?;
        // Unlocked read of users before writing books; users are never deleted.
        match self.users.get(&identity.user_id) {
            Some(owner) if owner.role == Role::Owner => {}
            _ => {
                return Err(PortError::Forbidden(
                    "only registered owners can list books".to_string(),
                ))
            }
        }
        validate_draft(&draft)?;

        let book = Book {
            id: new_record_id(),
            title: draft.title.trim().to_string(),
            author: draft.author.trim().to_string(),
            genre: draft.genre.trim().to_string(),
            location: draft.location.trim().to_string(),
            contact_info: draft.contact_info.trim().to_string(),
            owner_id: identity.user_id.clone(),
            status: status_or_default(draft.status),
            image_url: non_empty(draft.image_url),
        };
        self.books.put(book.clone())?;

        info!("User {} listed book {}", identity.user_id, book.id);
        Ok(book)
    }

    pub fn get_book(&self, id: &str) -> PortResult<Book> {
        self.books
            .get(id)
            .ok_or_else(|| PortError::NotFound(format!("book {} not found", id)))
    }

    pub fn list_books(&self) -> Vec<Book> {
        self.books.get_all()
    }

    pub fn books_by_owner(&self, identity: &Identity) -> Vec<Book> {
        let owner_id = identity.user_id.as_str();
        self.books.find_all(&|b: &Book| b.owner_id == owner_id)
    }

    /// Replaces every owner-editable field of a listing. The status is kept
    /// when the draft leaves it out.
    pub fn update_book(
        &self,
        identity: &Identity,
        id: &str,
        draft: BookDraft,
    ) -> PortResult<Book> {
        require_role(identity, Role::Owner)?;
        self.ensure_owns(identity, id)?;
        validate_draft(&draft)?;

        let status = non_empty(draft.status).map(BookStatus::from);
        let image_url = non_empty(draft.image_url);
        self.books.update(id, &identity.user_id, &mut |book: &mut Book| {
            book.title = draft.title.trim().to_string();
            book.author = draft.author.trim().to_string();
            book.genre = draft.genre.trim().to_string();
            book.location = draft.location.trim().to_string();
            book.contact_info = draft.contact_info.trim().to_string();
            if let Some(status) = &status {
                book.status = status.clone();
            }
            book.image_url = image_url.clone();
        })
    }

    pub fn update_book_status(
        &self,
        identity: &Identity,
        id: &str,
        status: &str,
    ) -> PortResult<Book> {
        let status = required("status", status)?;
        self.ensure_owns(identity, id)?;

        let status = BookStatus::from(status.to_string());
        self.books.update(id, &identity.user_id, &mut |book: &mut Book| {
            book.status = status.clone();
        })
    }

    pub fn delete_book(&self, identity: &Identity, id: &str) -> PortResult<()> {
        require_role(identity, Role::Owner)?;
        let book = self.books.delete(id, &identity.user_id)?;
        info!("User {} deleted book {}", identity.user_id, book.id);
        Ok(())
    }

    /// Searches the current listings. At least one criterion is required.
    pub fn search_books(&self, filter: &BookFilter) -> PortResult<Vec<Book>> {
        if filter.is_empty() {
            return Err(PortError::Validation(
                "at least one search parameter is required".to_string(),
            ));
        }
        Ok(filter_books(&self.books.get_all(), filter))
    }

    // Gives NotFound precedence over field validation; the store re-checks
    // ownership under its write lock.
    fn ensure_owns(&self, identity: &Identity, id: &str) -> PortResult<()> {
        let book = self.get_book(id)?;
        require_owner(identity, &book.owner_id)
    }
}

fn required<'a>(field: &str, value: &'a str) -> PortResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        Err(PortError::Validation(format!("{} is required", field)))
    } else {
        Ok(value)
    }
}

fn email_taken(e: PortError) -> PortError {
    match e {
        PortError::Conflict(_) => PortError::Conflict("email already registered".to_string()),
        other => other,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn status_or_default(status: Option<String>) -> BookStatus {
    non_empty(status).map(BookStatus::from).unwrap_or_default()
}

fn validate_draft(draft: &BookDraft) -> PortResult<()> {
    required("title", &draft.title)?;
    required("author", &draft.author)?;
    required("contactInfo", &draft.contact_info)?;
    Ok(())
}
