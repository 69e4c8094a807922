//! Error handling for the HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

/// Application error types that map to HTTP responses.
///
/// Every variant renders as a JSON object carrying at least an `error`
/// message and a machine-readable `code`; `context` entries are merged into
/// the top level of the body.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("bad request: {message}")]
    BadRequest {
        code: String,
        message: String,
        context: Map<String, Value>,
    },

    #[error("not found: {message}")]
    NotFound {
        code: String,
        message: String,
        context: Map<String, Value>,
    },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a bad request error
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code: code.into(),
            message: message.into(),
            context: Map::new(),
        }
    }

    /// Create a not found error
    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            code: code.into(),
            message: message.into(),
            context: Map::new(),
        }
    }

    /// Attach a contextual field to the response body.
    ///
    /// Internal errors never expose context.
    pub fn with_context(mut self, key: &str, value: impl Into<Value>) -> Self {
        match &mut self {
            AppError::BadRequest { context, .. } | AppError::NotFound { context, .. } => {
                context.insert(key.to_string(), value.into());
            }
            AppError::Internal(_) => {}
        }
        self
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::now_v7();
        let status = self.status();

        let (code, message, context) = match self {
            AppError::BadRequest {
                code,
                message,
                context,
            }
            | AppError::NotFound {
                code,
                message,
                context,
            } => {
                tracing::warn!(
                    error_id = %error_id,
                    error_code = %code,
                    status_code = %status.as_u16(),
                    "{message}"
                );
                (code, message, context)
            }
            AppError::Internal(e) => {
                tracing::error!(
                    error_id = %error_id,
                    status_code = %status.as_u16(),
                    error = %format!("{e:#}"),
                    "Request error"
                );
                // Only the outermost context reaches the client
                ("internal_error".to_string(), e.to_string(), Map::new())
            }
        };

        let mut body = Map::new();
        body.insert("error".to_string(), Value::String(message));
        body.insert("code".to_string(), Value::String(code));
        for (key, value) in context {
            body.entry(key).or_insert(value);
        }

        (status, Json(Value::Object(body))).into_response()
    }
}
