pub mod error;
pub mod models;
pub mod routes;
pub mod service;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use serde_json::{json, Value};

use library_db::Collection;
use library_kernel::{InitCtx, Module};

use models::Book;
use service::BookService;

/// Book catalogue mounted under `/api/books`.
pub struct BooksModule {
    service: Arc<BookService>,
}

impl BooksModule {
    pub fn new(store: Arc<dyn Collection<Book>>) -> Self {
        Self {
            service: Arc::new(BookService::new(store)),
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            persistent = ctx.settings.store.snapshot_dir.is_some(),
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.service.clone())
    }

    fn openapi(&self) -> Option<Value> {
        Some(openapi_fragment())
    }

    fn examples(&self) -> Option<Value> {
        Some(json!({
            "PATCH": {
                "url": "/api/books/:id",
                "body": { "delta": -1 }
            },
            "PUT": {
                "url": "/api/books/:id",
                "body": {
                    "title": "Updated Title",
                    "author": "Updated Author",
                    "category": "Programming",
                    "publishedYear": 2024,
                    "availableCopies": 5
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        self.service.close().await?;
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn book_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": {
                    "type": "object",
                    "properties": {
                        "message": { "type": "string" },
                        "data": { "$ref": "#/components/schemas/Book" }
                    },
                    "required": ["message", "data"]
                }
            }
        }
    })
}

fn json_body(schema: &str) -> Value {
    json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": format!("#/components/schemas/{schema}") }
            }
        }
    })
}

fn id_parameter() -> Value {
    json!({
        "name": "id",
        "in": "path",
        "required": true,
        "description": "Book identifier",
        "schema": { "type": "string", "format": "uuid" }
    })
}

fn openapi_fragment() -> Value {
    json!({
        "paths": {
            "/": {
                "get": {
                    "summary": "Get all books (filter with ?category= or ?year=)",
                    "tags": ["Books"],
                    "parameters": [
                        {
                            "name": "category",
                            "in": "query",
                            "required": false,
                            "description": "Exact, case-sensitive category",
                            "schema": { "type": "string" }
                        },
                        {
                            "name": "year",
                            "in": "query",
                            "required": false,
                            "description": "Only books published strictly after the leading integer of this value",
                            "schema": { "type": "string" }
                        }
                    ],
                    "responses": {
                        "200": {
                            "description": "Matching books",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "object",
                                        "properties": {
                                            "message": { "type": "string" },
                                            "count": { "type": "integer" },
                                            "data": {
                                                "type": "array",
                                                "items": { "$ref": "#/components/schemas/Book" }
                                            }
                                        },
                                        "required": ["message", "count", "data"]
                                    }
                                }
                            }
                        },
                        "400": error_response("Malformed query string"),
                        "500": error_response("Internal server error")
                    }
                },
                "post": {
                    "summary": "Create a new book",
                    "tags": ["Books"],
                    "requestBody": json_body("BookInput"),
                    "responses": {
                        "201": book_response("Book created"),
                        "400": error_response("Missing fields or schema violation"),
                        "500": error_response("Internal server error")
                    }
                }
            },
            "/{id}": {
                "get": {
                    "summary": "Get a book by ID",
                    "tags": ["Books"],
                    "parameters": [id_parameter()],
                    "responses": {
                        "200": book_response("Book found"),
                        "400": error_response("Invalid book ID format"),
                        "404": error_response("Book not found"),
                        "500": error_response("Internal server error")
                    }
                },
                "patch": {
                    "summary": "Update copies (delta) and/or category",
                    "tags": ["Books"],
                    "parameters": [id_parameter()],
                    "requestBody": json_body("BookPatch"),
                    "responses": {
                        "200": book_response("Book updated"),
                        "400": error_response("Negative stock, empty category or invalid id"),
                        "404": error_response("Book not found"),
                        "500": error_response("Internal server error")
                    }
                },
                "put": {
                    "summary": "Replace all book fields",
                    "tags": ["Books"],
                    "parameters": [id_parameter()],
                    "requestBody": json_body("BookInput"),
                    "responses": {
                        "200": book_response("Book replaced"),
                        "400": error_response("Missing fields, negative copies or invalid id"),
                        "404": error_response("Book not found"),
                        "500": error_response("Internal server error")
                    }
                },
                "delete": {
                    "summary": "Delete a book (only when copies = 0)",
                    "tags": ["Books"],
                    "parameters": [id_parameter()],
                    "responses": {
                        "200": {
                            "description": "Book deleted",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "object",
                                        "properties": {
                                            "message": { "type": "string" },
                                            "deletedBook": { "$ref": "#/components/schemas/Book" }
                                        },
                                        "required": ["message", "deletedBook"]
                                    }
                                }
                            }
                        },
                        "400": error_response("Copies remain or invalid id"),
                        "404": error_response("Book not found"),
                        "500": error_response("Internal server error")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string", "format": "uuid" },
                        "title": { "type": "string" },
                        "author": { "type": "string" },
                        "category": { "type": "string" },
                        "publishedYear": { "type": "integer", "minimum": 0 },
                        "availableCopies": { "type": "integer", "minimum": 0 },
                        "createdAt": { "type": "string", "format": "date-time" },
                        "updatedAt": { "type": "string", "format": "date-time" }
                    },
                    "required": [
                        "id", "title", "author", "category",
                        "publishedYear", "availableCopies", "createdAt", "updatedAt"
                    ]
                },
                "BookInput": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string" },
                        "author": { "type": "string" },
                        "category": { "type": "string" },
                        "publishedYear": { "type": "integer", "minimum": 0 },
                        "availableCopies": { "type": "integer", "minimum": 0 }
                    },
                    "required": ["title", "author", "category", "publishedYear", "availableCopies"]
                },
                "BookPatch": {
                    "type": "object",
                    "properties": {
                        "delta": {
                            "type": "integer",
                            "description": "Signed change applied to availableCopies"
                        },
                        "category": {
                            "type": "string",
                            "description": "Replacement category, trimmed, non-empty"
                        }
                    }
                }
            }
        }
    })
}

/// Create the books module over `store`
pub fn create_module(store: Arc<dyn Collection<Book>>) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(store))
}
