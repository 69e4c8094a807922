use serde_json::{json, Value};
use thiserror::Error;

use library_db::{DocumentId, InvalidId, StoreError};
use library_http::AppError;

use super::models::REQUIRED_FIELDS;

/// Business-rule and lookup failures of the book operations.
#[derive(Debug, Error)]
pub enum BookError {
    /// Create or full replace without every required field
    #[error("Missing required fields")]
    MissingFields { received: Option<Value> },

    /// The store schema rejected the document
    #[error("Validation error: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Invalid book ID format")]
    InvalidIdentifier(#[from] InvalidId),

    #[error("Book not found")]
    NotFound,

    #[error("Invalid update: negative stock not allowed")]
    NegativeStock {
        current: i64,
        delta: i64,
        resultant: i64,
    },

    #[error("Invalid update: category must be non-empty string")]
    InvalidCategory,

    #[error("{0}")]
    InvalidField(String),

    /// A body field has the wrong JSON type
    #[error("{0}")]
    InvalidBody(String),

    #[error("Invalid delete: copies must be 0 to delete")]
    DeleteBlocked {
        current: i64,
        id: DocumentId,
        title: String,
        author: String,
    },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl BookError {
    /// Classify a store failure; anything unexpected becomes `Internal` with
    /// `context` as the client-facing message.
    pub(crate) fn from_store(error: StoreError, context: &'static str) -> Self {
        match error {
            StoreError::Validation(violations) => BookError::Validation(violations),
            StoreError::NotFound(_) => BookError::NotFound,
            other => BookError::Internal(anyhow::Error::new(other).context(context)),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            BookError::MissingFields { .. } => "missing_fields",
            BookError::Validation(_) => "validation_error",
            BookError::InvalidIdentifier(_) => "invalid_identifier",
            BookError::NotFound => "not_found",
            BookError::NegativeStock { .. } => "negative_stock",
            BookError::InvalidCategory => "invalid_category",
            BookError::InvalidField(_) => "invalid_field",
            BookError::InvalidBody(_) => "invalid_body",
            BookError::DeleteBlocked { .. } => "delete_blocked",
            BookError::Internal(_) => "internal_error",
        }
    }
}

impl From<BookError> for AppError {
    fn from(error: BookError) -> Self {
        let code = error.code();
        let message = error.to_string();

        match error {
            BookError::Internal(e) => AppError::Internal(e),
            BookError::NotFound => AppError::not_found(code, message),
            BookError::MissingFields { received } => {
                let error = AppError::bad_request(code, message)
                    .with_context("required", json!(REQUIRED_FIELDS));
                match received {
                    Some(received) => error.with_context("received", received),
                    None => error,
                }
            }
            BookError::NegativeStock {
                current,
                delta,
                resultant,
            } => AppError::bad_request(code, message)
                .with_context("currentCopies", current)
                .with_context("attemptedDelta", delta)
                .with_context("resultantCopies", resultant),
            BookError::DeleteBlocked {
                current,
                id,
                title,
                author,
            } => AppError::bad_request(code, message)
                .with_context("currentCopies", current)
                .with_context(
                    "bookDetails",
                    json!({ "id": id.to_string(), "title": title, "author": author }),
                ),
            BookError::Validation(_)
            | BookError::InvalidIdentifier(_)
            | BookError::InvalidCategory
            | BookError::InvalidField(_)
            | BookError::InvalidBody(_) => AppError::bad_request(code, message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn validation_message_aggregates_violations() {
        let error = BookError::from_store(
            StoreError::Validation(vec![
                "Title is required".to_string(),
                "Year cannot be negative".to_string(),
            ]),
            "Server error creating book",
        );
        assert_eq!(
            error.to_string(),
            "Validation error: Title is required, Year cannot be negative"
        );
    }

    #[test]
    fn missing_store_record_is_not_found() {
        let error = BookError::from_store(
            StoreError::NotFound(DocumentId::generate()),
            "Server error updating book",
        );
        assert!(matches!(error, BookError::NotFound));
    }

    #[test]
    fn snapshot_failure_is_internal_with_context() {
        let error = BookError::from_store(
            StoreError::Snapshot {
                path: "/data/books.json".to_string(),
                source: std::io::Error::other("disk full"),
            },
            "Server error deleting book",
        );
        assert_eq!(error.to_string(), "Server error deleting book");
        assert_eq!(AppError::from(error).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn negative_stock_carries_copy_counts() {
        let error = AppError::from(BookError::NegativeStock {
            current: 0,
            delta: -1,
            resultant: -1,
        });

        match error {
            AppError::BadRequest { code, context, .. } => {
                assert_eq!(code, "negative_stock");
                assert_eq!(context["currentCopies"], 0);
                assert_eq!(context["attemptedDelta"], -1);
                assert_eq!(context["resultantCopies"], -1);
            }
            other => panic!("expected bad request, got {other:?}"),
        }
    }

    #[test]
    fn status_codes_follow_error_kind() {
        let invalid_id = "nope".parse::<DocumentId>().unwrap_err();
        assert_eq!(
            AppError::from(BookError::from(invalid_id)).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(BookError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(BookError::InvalidCategory).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(BookError::InvalidBody("expected integer".to_string())).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
