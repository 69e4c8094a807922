use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use library_app::modules::{self, books::models::Book};
use library_db::MemoryCollection;
use library_kernel::{settings::Settings, ModuleRegistry};

fn app() -> Router {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, Arc::new(MemoryCollection::<Book>::new()));
    library_http::build_router(&registry, &Settings::default())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn create(app: &Router, body: Value) -> Value {
    let (status, body) = send(app, Method::POST, "/api/books", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"].clone()
}

fn book(title: &str, category: &str, year: i64, copies: i64) -> Value {
    json!({
        "title": title,
        "author": "Author",
        "category": category,
        "publishedYear": year,
        "availableCopies": copies
    })
}

#[tokio::test]
async fn create_drain_and_delete() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/books",
        Some(json!({
            "title": "X",
            "author": "Y",
            "category": "Z",
            "publishedYear": 2020,
            "availableCopies": 2
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Book created successfully");
    let id = body["data"]["id"].as_str().unwrap().to_string();
    assert!(body["data"]["createdAt"].is_string());

    let uri = format!("/api/books/{id}");
    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid delete: copies must be 0 to delete");
    assert_eq!(body["currentCopies"], 2);
    assert_eq!(body["bookDetails"]["id"], id);
    assert_eq!(body["bookDetails"]["title"], "X");

    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({"delta": -2}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Book updated successfully (PATCH)");
    assert_eq!(body["data"]["availableCopies"], 0);

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Book deleted successfully");
    assert_eq!(body["deletedBook"]["id"], id);

    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Book not found");
}

#[tokio::test]
async fn negative_stock_reports_counts() {
    let app = app();
    let created = create(&app, book("T", "C", 2000, 0)).await;
    let uri = format!("/api/books/{}", created["id"].as_str().unwrap());

    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({"delta": -1}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid update: negative stock not allowed");
    assert_eq!(body["currentCopies"], 0);
    assert_eq!(body["attemptedDelta"], -1);
    assert_eq!(body["resultantCopies"], -1);

    let (_, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(body["data"]["availableCopies"], 0);
}

#[tokio::test]
async fn malformed_and_unknown_ids_are_distinguished() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/api/books/123", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid book ID format");

    let unknown = "0192f1c4-7c2a-7b3e-9a41-5b0f3c2d1e00";
    let (status, body) = send(&app, Method::GET, &format!("/api/books/{unknown}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Book not found");
}

#[tokio::test]
async fn list_filters_and_messages() {
    let app = app();
    create(&app, book("Clean Code", "Programming", 2008, 3)).await;
    create(&app, book("Deep Learning", "AI", 2016, 4)).await;
    create(&app, book("Python Crash Course", "Programming", 2016, 7)).await;

    let (status, body) = send(&app, Method::GET, "/api/books", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "All books");
    assert_eq!(body["count"], 3);

    let (_, body) = send(&app, Method::GET, "/api/books?category=Programming", None).await;
    assert_eq!(body["message"], "Books in category: Programming");
    assert_eq!(body["count"], 2);

    let (_, body) = send(&app, Method::GET, "/api/books?category=programming", None).await;
    assert_eq!(body["count"], 0);
    assert_eq!(body["data"], json!([]));

    let (_, body) = send(&app, Method::GET, "/api/books?year=2015", None).await;
    assert_eq!(body["message"], "Books published after 2015");
    assert_eq!(body["count"], 2);

    let (_, body) = send(&app, Method::GET, "/api/books?category=AI&year=2000", None).await;
    assert_eq!(body["message"], "Books in category: AI");
    assert_eq!(body["count"], 1);

    let (_, body) = send(&app, Method::GET, "/api/books?year=2015abc", None).await;
    assert_eq!(body["message"], "Books published after 2015abc");
    assert_eq!(body["count"], 2);

    let (status, body) = send(&app, Method::GET, "/api/books?year=recent", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Books published after recent");
    assert_eq!(body["count"], 0);

    let (status, body) = send(&app, Method::GET, "/api/books?category=a&category=b", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_query");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn create_requires_every_field() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/books",
        Some(json!({"title": "Only a title"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields");
    assert_eq!(
        body["required"],
        json!(["title", "author", "category", "publishedYear", "availableCopies"])
    );

    let (status, body) = send(&app, Method::POST, "/api/books", Some(book("  ", "C", -1, 1))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Validation error: Title is required, Year cannot be negative"
    );

    let (_, body) = send(&app, Method::GET, "/api/books", None).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn put_replaces_fields_and_echoes_incomplete_bodies() {
    let app = app();
    let created = create(&app, book("Old", "C", 2000, 3)).await;
    let uri = format!("/api/books/{}", created["id"].as_str().unwrap());

    let sent = json!({"title": "New", "author": null, "isbn": "978-0"});
    let (status, body) = send(&app, Method::PUT, &uri, Some(sent.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields");
    assert_eq!(body["received"], sent);

    let (status, body) = send(&app, Method::PUT, &uri, Some(book("New", "AI", 2024, -1))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Available copies cannot be negative");

    let (status, body) = send(&app, Method::PUT, &uri, Some(book("New", "AI", 2024, 5))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Book updated successfully (PUT)");
    assert_eq!(body["data"]["id"], created["id"]);
    assert_eq!(body["data"]["title"], "New");
    assert_eq!(body["data"]["availableCopies"], 5);
    assert_eq!(body["data"]["createdAt"], created["createdAt"]);
}

#[tokio::test]
async fn patch_category_rules() {
    let app = app();
    let created = create(&app, book("T", "Old", 2000, 3)).await;
    let uri = format!("/api/books/{}", created["id"].as_str().unwrap());

    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({"category": "  "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid update: category must be non-empty string");

    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({"category": 7}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_body");

    let (status, body) = send(
        &app,
        Method::PATCH,
        &uri,
        Some(json!({"delta": 2, "category": " New "})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["category"], "New");
    assert_eq!(body["data"]["availableCopies"], 5);
}

#[tokio::test]
async fn unmatched_paths_are_json_404() {
    let (status, body) = send(&app(), Method::GET, "/api/unknown", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Endpoint not found");
    assert_eq!(body["path"], "/api/unknown");
}

#[tokio::test]
async fn unsupported_methods_are_json_404() {
    let app = app();
    let created = create(&app, book("T", "C", 2000, 1)).await;
    let uri = format!("/api/books/{}", created["id"].as_str().unwrap());

    for (method, path) in [(Method::POST, uri.as_str()), (Method::DELETE, "/api/books")] {
        let (status, body) = send(&app, method, path, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Endpoint not found");
        assert_eq!(body["path"], path);
    }
}

#[tokio::test]
async fn index_lists_book_endpoints() {
    let (status, body) = send(&app(), Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Library Book Management API");
    assert_eq!(body["version"], "1.0.0");

    let deletes = body["endpoints"]["DELETE"].as_array().unwrap();
    assert_eq!(
        deletes,
        &vec![json!("DELETE /api/books/{id} - Delete a book (only when copies = 0)")]
    );
    assert_eq!(body["examples"]["PATCH"]["body"], json!({"delta": -1}));
}
