//! HTTP handlers for `/api/books`.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;

use library_http::AppError;

use super::models::{BookInput, BookPatch, BookQuery, BookRecord};
use super::service::BookService;

type Books = State<Arc<BookService>>;

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub message: String,
    pub count: usize,
    pub data: Vec<BookRecord>,
}

#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub message: &'static str,
    pub data: BookRecord,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedResponse {
    pub message: &'static str,
    pub deleted_book: BookRecord,
}

pub fn router(service: Arc<BookService>) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route(
            "/{id}",
            get(get_book)
                .patch(update_book)
                .put(replace_book)
                .delete(delete_book),
        )
        .with_state(service)
}

/// Malformed JSON or wrongly typed fields
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::bad_request("invalid_body", rejection.body_text()))
}

async fn list_books(
    State(books): Books,
    query: Result<Query<BookQuery>, QueryRejection>,
) -> Result<Json<ListResponse>, AppError> {
    let Query(query) =
        query.map_err(|rejection| AppError::bad_request("invalid_query", rejection.body_text()))?;
    let filter = query.filter();
    let data = books.list(&filter).await?;

    Ok(Json(ListResponse {
        message: filter.describe(),
        count: data.len(),
        data,
    }))
}

async fn get_book(
    State(books): Books,
    Path(id): Path<String>,
) -> Result<Json<BookResponse>, AppError> {
    let data = books.get(&id).await?;
    Ok(Json(BookResponse {
        message: "Book found",
        data,
    }))
}

async fn create_book(
    State(books): Books,
    payload: Result<Json<BookInput>, JsonRejection>,
) -> Result<(StatusCode, Json<BookResponse>), AppError> {
    let data = books.create(body(payload)?).await?;
    Ok((
        StatusCode::CREATED,
        Json(BookResponse {
            message: "Book created successfully",
            data,
        }),
    ))
}

async fn update_book(
    State(books): Books,
    Path(id): Path<String>,
    payload: Result<Json<BookPatch>, JsonRejection>,
) -> Result<Json<BookResponse>, AppError> {
    let data = books.update(&id, body(payload)?).await?;
    Ok(Json(BookResponse {
        message: "Book updated successfully (PATCH)",
        data,
    }))
}

async fn replace_book(
    State(books): Books,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<BookResponse>, AppError> {
    let data = books.replace(&id, body(payload)?).await?;
    Ok(Json(BookResponse {
        message: "Book updated successfully (PUT)",
        data,
    }))
}

async fn delete_book(
    State(books): Books,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, AppError> {
    let deleted_book = books.delete(&id).await?;
    Ok(Json(DeletedResponse {
        message: "Book deleted successfully",
        deleted_book,
    }))
}
