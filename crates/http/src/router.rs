//! Router builder for the HTTP server

use std::collections::BTreeMap;
use std::time::Duration;

use axum::{
    extract::{OriginalUri, Request},
    http::{header, HeaderValue, Method, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use uuid::Uuid;

use library_kernel::{settings::ServiceSettings, ModuleRegistry};

use crate::error::AppError;

const HTTP_METHODS: &[&str] = &["get", "post", "put", "patch", "delete"];

/// Builder for constructing the main HTTP router.
///
/// Routes must be added before the middleware layers: a layer only wraps the
/// routes and fallback already present when it is applied.
pub struct RouterBuilder {
    router: Router,
}

impl RouterBuilder {
    /// Create a new router builder
    pub fn new() -> Self {
        Self {
            router: Router::new(),
        }
    }

    /// Add a route to the router
    pub fn route(mut self, path: &str, route: axum::routing::MethodRouter) -> Self {
        self.router = self.router.route(path, route);
        self
    }

    /// Mount a module's router under `/api/{module_name}`
    pub fn mount_module(mut self, module_name: &str, module_router: Router) -> Self {
        let api_path = format!("/api/{}", module_name);
        self.router = self.router.nest(&api_path, module_router);
        self
    }

    /// Serve the API index at `/`, listing every module endpoint by method
    pub fn with_index(mut self, service: &ServiceSettings, registry: &ModuleRegistry) -> Self {
        let index = api_index(service, &collect_openapi(registry), registry);
        self.router = self
            .router
            .route("/", get(move || async move { Json(index.clone()) }))
            // Browsers with devtools open probe this path on every page load
            .route(
                "/.well-known/appspecific/com.chrome.devtools.json",
                get(|| async { Json(json!({})) }),
            );
        self
    }

    /// Answer unmatched paths, and unsupported methods on known paths, with a JSON 404.
    ///
    /// Only routes registered before this call get the method fallback.
    pub fn with_fallback(mut self) -> Self {
        self.router = self
            .router
            .method_not_allowed_fallback(endpoint_not_found)
            .fallback(endpoint_not_found);
        self
    }

    /// Add tracing middleware
    pub fn with_tracing(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        );
        self
    }

    /// Add CORS middleware
    pub fn with_cors(mut self) -> Self {
        self.router = self.router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE]),
        );
        self
    }

    /// Add request ID middleware; the id is echoed on the response
    pub fn with_request_id(mut self) -> Self {
        self.router = self
            .router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));
        self
    }

    /// Add timeout middleware
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.router = self
            .router
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_millis(timeout_ms),
            ));
        self
    }

    /// Add OpenAPI documentation by collecting specs from all modules
    pub fn with_openapi(mut self, registry: &ModuleRegistry) -> Self {
        let openapi_spec = collect_openapi(registry);

        // Deserialize our JSON spec into a proper utoipa OpenApi object
        // so SwaggerUI can serve it
        let openapi_obj: utoipa::openapi::OpenApi = serde_json::from_value(openapi_spec.clone())
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "merged OpenAPI document rejected by utoipa");
                utoipa::openapi::OpenApiBuilder::new()
                    .info(
                        utoipa::openapi::InfoBuilder::new()
                            .title("Library API")
                            .version("1.0.0")
                            .build(),
                    )
                    .build()
            });

        self.router = self.router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi_obj),
        );

        // Also serve the raw JSON spec at /docs/openapi.json for external consumers
        self.router = self.router.route(
            "/docs/openapi.json",
            get(move || async move { Json(openapi_spec.clone()) }),
        );

        self
    }

    /// Build the final router
    pub fn build(self) -> Router {
        self.router
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Merge the base document with every module's OpenAPI fragment.
///
/// Module paths are prefixed with `/api/{module_name}`.
pub fn collect_openapi(registry: &ModuleRegistry) -> Value {
    let mut openapi_spec = json!({
        "openapi": "3.1.0",
        "info": {
            "title": "Library API",
            "version": "1.0.0",
            "description": "Library book management API"
        },
        "paths": {},
        "components": {
            "schemas": {}
        }
    });

    openapi_spec["components"]["schemas"]["ErrorResponse"] = json!({
        "type": "object",
        "properties": {
            "error": { "type": "string" },
            "code": { "type": "string" }
        },
        "required": ["error", "code"],
        "additionalProperties": true
    });

    openapi_spec["paths"]["/healthz"] = json!({
        "get": {
            "summary": "Health check",
            "responses": {
                "200": {
                    "description": "OK",
                    "content": {
                        "text/plain": {
                            "schema": { "type": "string" }
                        }
                    }
                }
            }
        }
    });

    for module in registry.modules() {
        let Some(module_spec) = module.openapi() else {
            continue;
        };

        if let Some(paths) = module_spec.get("paths").and_then(Value::as_object) {
            let base = format!("/api/{}", module.name());
            for (path, path_item) in paths {
                let prefixed_path = if path == "/" {
                    base.clone()
                } else {
                    format!("{base}{path}")
                };
                openapi_spec["paths"][prefixed_path] = path_item.clone();
            }
        }

        if let Some(schemas) = module_spec
            .get("components")
            .and_then(|components| components.get("schemas"))
            .and_then(Value::as_object)
        {
            for (schema_name, schema_def) in schemas {
                openapi_spec["components"]["schemas"][schema_name] = schema_def.clone();
            }
        }
    }

    openapi_spec
}

/// Static API index: endpoints grouped by method plus module request examples.
pub fn api_index(service: &ServiceSettings, openapi: &Value, registry: &ModuleRegistry) -> Value {
    let mut endpoints: BTreeMap<String, Vec<String>> = BTreeMap::new();

    if let Some(paths) = openapi.get("paths").and_then(Value::as_object) {
        for (path, item) in paths {
            for &method in HTTP_METHODS {
                let Some(operation) = item.get(method) else {
                    continue;
                };
                let verb = method.to_uppercase();
                let summary = operation
                    .get("summary")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                endpoints
                    .entry(verb.clone())
                    .or_default()
                    .push(format!("{verb} {path} - {summary}"));
            }
        }
    }

    let mut examples = serde_json::Map::new();
    for module in registry.modules() {
        if let Some(Value::Object(module_examples)) = module.examples() {
            examples.extend(module_examples);
        }
    }

    json!({
        "message": service.name,
        "version": service.version,
        "endpoints": endpoints,
        "examples": examples,
        "docs": "/swagger-ui"
    })
}

async fn endpoint_not_found(OriginalUri(uri): OriginalUri) -> AppError {
    AppError::not_found("endpoint_not_found", "Endpoint not found").with_context("path", uri.path())
}

/// Request ID generator producing time-ordered UUIDv7 ids
#[derive(Clone, Copy)]
struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let request_id = Uuid::now_v7()
            .to_string()
            .parse::<HeaderValue>()
            .ok()?;
        Some(RequestId::new(request_id))
    }
}
