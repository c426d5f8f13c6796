//! crates/book_exchange_core/src/search.rs
//!
//! Case-insensitive filtering over a snapshot of books.

use crate::domain::Book;

/// Optional search criteria. `query` matches title or author.
#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    pub query: Option<String>,
    pub location: Option<String>,
    pub genre: Option<String>,
}

impl BookFilter {
    /// True when no criterion carries a non-empty value.
    pub fn is_empty(&self) -> bool {
        [&self.query, &self.location, &self.genre]
            .iter()
            .all(|f| needle(f).is_none())
    }

    pub fn matches(&self, book: &Book) -> bool {
        let query_ok = match needle(&self.query) {
            Some(q) => {
                contains_ignore_case(&book.title, &q) || contains_ignore_case(&book.author, &q)
            }
            None => true,
        };
        let location_ok = needle(&self.location)
            .map_or(true, |l| contains_ignore_case(&book.location, &l));
        let genre_ok = needle(&self.genre).map_or(true, |g| contains_ignore_case(&book.genre, &g));

        query_ok && location_ok && genre_ok
    }
}

/// Returns the books matching every supplied criterion, in input order.
pub fn filter_books(books: &[Book], filter: &BookFilter) -> Vec<Book> {
    books.iter().filter(|b| filter.matches(b)).cloned().collect()
}

fn needle(field: &Option<String>) -> Option<String> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

fn contains_ignore_case(haystack: &str, lowered_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowered_needle)
}
