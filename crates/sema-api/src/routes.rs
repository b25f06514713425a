//! HTTP routes.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use sema_core::{defaults, SearchQuery, SearchResponse};
use sema_search::QueryService;

use crate::error::ApiError;
use crate::request_id::MakeRequestUuidV7;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<QueryService>,
}

impl AppState {
    pub fn new(service: QueryService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Body of `POST /search`.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the embedder is unreachable.
    pub status: String,
    pub model: String,
    pub dimension: usize,
    pub embedder_reachable: bool,
}

/// Parse a comma-separated origin list, dropping entries that are not valid
/// header values. An empty list falls back to the default origin.
pub fn parse_allowed_origins(origins: &str) -> Vec<HeaderValue> {
    let parsed: Vec<HeaderValue> = origins
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("Invalid CORS origin '{}': {}", s, e);
                None
            }
        })
        .collect();

    if parsed.is_empty() {
        vec![HeaderValue::from_static(crate::config::DEFAULT_ALLOWED_ORIGINS)]
    } else {
        parsed
    }
}

/// Build the application router with its middleware stack.
pub fn router(state: AppState, allowed_origins: &str) -> Router {
    Router::new()
        .route("/search", post(search))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(parse_allowed_origins(allowed_origins)))
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .max_age(Duration::from_secs(3600)),
        )
        .layer(RequestBodyLimitLayer::new(defaults::MAX_BODY_SIZE_BYTES))
        .with_state(state)
}

#[instrument(skip_all, fields(subsystem = "api", op = "search"))]
async fn search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Json(request) = payload?;

    let mut query = SearchQuery::new(request.search.unwrap_or_default());
    if let Some(limit) = request.limit {
        query = query.with_limit(limit);
    }

    let response = state.service.search(query).await?;
    info!(result_count = response.result.len(), "Search served");
    Ok(Json(response))
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let reachable = state.service.embedder_reachable().await;
    let (code, status) = if reachable {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };
    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            model: state.service.model_name().to_string(),
            dimension: state.service.dimension(),
            embedder_reachable: reachable,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_allowed_origins() {
        let origins = parse_allowed_origins("https://app.example.com, http://localhost:3000 ,");
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[0], "https://app.example.com");
        assert_eq!(origins[1], "http://localhost:3000");
    }

    #[test]
    fn test_parse_allowed_origins_empty_uses_default() {
        let origins = parse_allowed_origins("  ");
        assert_eq!(origins, vec![HeaderValue::from_static("http://localhost:3000")]);
    }

    #[test]
    fn test_search_request_fields_optional() {
        let req: SearchRequest = serde_json::from_str("{}").unwrap();
        assert!(req.search.is_none());
        assert!(req.limit.is_none());

        let req: SearchRequest =
            serde_json::from_str(r#"{"search": "acme", "limit": 3}"#).unwrap();
        assert_eq!(req.search.as_deref(), Some("acme"));
        assert_eq!(req.limit, Some(3));
    }
}
