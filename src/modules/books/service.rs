//! Book resource manager: validation and business rules over the store.

use std::sync::Arc;

use anyhow::Context;
use serde::Deserialize;
use serde_json::Value;

use library_db::{Collection, DocumentId};

use super::error::BookError;
use super::models::{Book, BookFilter, BookInput, BookPatch, BookRecord};

pub type BookResult<T> = Result<T, BookError>;

/// Applies the book rules before every store write.
///
/// Each operation reads current state once and writes at most once; rejected
/// mutations never reach the store.
pub struct BookService {
    store: Arc<dyn Collection<Book>>,
}

impl BookService {
    pub fn new(store: Arc<dyn Collection<Book>>) -> Self {
        Self { store }
    }

    pub async fn list(&self, filter: &BookFilter) -> BookResult<Vec<BookRecord>> {
        let books = self
            .store
            .find(&|book: &Book| filter.matches(book))
            .await
            .map_err(|e| BookError::from_store(e, "Server error fetching books"))?;

        tracing::debug!(?filter, count = books.len(), "books listed");
        Ok(books)
    }

    pub async fn get(&self, id: &str) -> BookResult<BookRecord> {
        let id: DocumentId = id.parse()?;
        self.fetch(&id, "Server error fetching book").await
    }

    pub async fn create(&self, input: BookInput) -> BookResult<BookRecord> {
        let book = input
            .complete()
            .ok_or(BookError::MissingFields { received: None })?;

        let record = self
            .store
            .insert(book)
            .await
            .map_err(|e| BookError::from_store(e, "Server error creating book"))?;

        tracing::info!(book_id = %record.id, title = %record.doc.title, "book created");
        Ok(record)
    }

    /// Apply a copies delta and/or category replacement.
    ///
    /// Both changes are validated before either is applied; the delta is
    /// checked first, so it wins when both are invalid.
    pub async fn update(&self, id: &str, patch: BookPatch) -> BookResult<BookRecord> {
        let id: DocumentId = id.parse()?;
        let mut record = self.fetch(&id, "Server error updating book").await?;

        record.doc = patched(&record.doc, &patch)?;

        let record = self
            .store
            .save(record)
            .await
            .map_err(|e| BookError::from_store(e, "Server error updating book"))?;

        tracing::info!(
            book_id = %record.id,
            copies = record.doc.available_copies,
            category = %record.doc.category,
            "book updated"
        );
        Ok(record)
    }

    /// Overwrite every business field, keeping id and creation time.
    ///
    /// `body` is the request body as sent; it is echoed back untouched when a
    /// field is missing.
    pub async fn replace(&self, id: &str, body: Value) -> BookResult<BookRecord> {
        let input =
            BookInput::deserialize(&body).map_err(|e| BookError::InvalidBody(e.to_string()))?;
        let Some(book) = input.complete() else {
            return Err(BookError::MissingFields {
                received: Some(body),
            });
        };

        if book.available_copies < 0 {
            return Err(BookError::InvalidField(
                "Available copies cannot be negative".to_string(),
            ));
        }

        let id: DocumentId = id.parse()?;
        let mut record = self.fetch(&id, "Server error updating book with PUT").await?;
        record.doc = book;

        let record = self
            .store
            .save(record)
            .await
            .map_err(|e| BookError::from_store(e, "Server error updating book with PUT"))?;

        tracing::info!(book_id = %record.id, "book replaced");
        Ok(record)
    }

    /// Remove a book that has no copies left, returning the removed record.
    pub async fn delete(&self, id: &str) -> BookResult<BookRecord> {
        let id: DocumentId = id.parse()?;
        let record = self.fetch(&id, "Server error deleting book").await?;

        if record.doc.available_copies != 0 {
            return Err(BookError::DeleteBlocked {
                current: record.doc.available_copies,
                id: record.id,
                title: record.doc.title,
                author: record.doc.author,
            });
        }

        self.store
            .delete(&id)
            .await
            .map_err(|e| BookError::from_store(e, "Server error deleting book"))?
            .ok_or(BookError::NotFound)?;

        tracing::info!(book_id = %record.id, title = %record.doc.title, "book deleted");
        Ok(record)
    }

    /// Flush and release the underlying store
    pub async fn close(&self) -> anyhow::Result<()> {
        self.store
            .close()
            .await
            .context("failed to close book store")
    }

    async fn fetch(&self, id: &DocumentId, context: &'static str) -> BookResult<BookRecord> {
        self.store
            .find_by_id(id)
            .await
            .map_err(|e| BookError::from_store(e, context))?
            .ok_or(BookError::NotFound)
    }
}

/// The book after `patch`, or the first rule it breaks.
fn patched(book: &Book, patch: &BookPatch) -> BookResult<Book> {
    let copies = match patch.delta {
        Some(delta) => {
            let resultant = book.available_copies.checked_add(delta).ok_or_else(|| {
                BookError::InvalidField(format!("Invalid update: delta {delta} is out of range"))
            })?;
            if resultant < 0 {
                return Err(BookError::NegativeStock {
                    current: book.available_copies,
                    delta,
                    resultant,
                });
            }
            resultant
        }
        None => book.available_copies,
    };

    let category = match patch.category.as_deref() {
        Some(category) => {
            let trimmed = category.trim();
            if trimmed.is_empty() {
                return Err(BookError::InvalidCategory);
            }
            trimmed.to_string()
        }
        None => book.category.clone(),
    };

    Ok(Book {
        available_copies: copies,
        category,
        ..book.clone()
    })
}
