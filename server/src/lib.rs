use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::{HeaderMap, HeaderValue, StatusCode}, routing::{get, post}, Json, Router};
use catalog_core::loader::load_catalog;
use catalog_core::{query, DocId, EngineError, Filters, Hit, InvertedIndex, SharedIndex};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::PathBuf;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub type ApiError = (StatusCode, Json<Value>);

const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": msg.into() })))
}

fn engine_error(err: EngineError) -> ApiError {
    let status = match err {
        EngineError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    api_error(status, err.to_string())
}

/// Query string of `/recommend`. Values stay strings so that empty parameters
/// can be treated as absent and bad numbers reported as 400s.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendParams {
    pub q: Option<String>,
    pub size: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub limit: Option<String>,
}

impl RecommendParams {
    fn filters(&self) -> Result<Filters, EngineError> {
        Ok(Filters {
            size: non_empty(&self.size).map(str::to_string),
            category: non_empty(&self.category).map(str::to_string),
            min_price: parse_param(&self.min_price, "minPrice")?,
            max_price: parse_param(&self.max_price, "maxPrice")?,
        })
    }

    fn limit(&self) -> Result<Option<usize>, EngineError> { parse_param(&self.limit, "limit") }
}

fn non_empty(v: &Option<String>) -> Option<&str> { v.as_deref().map(str::trim).filter(|s| !s.is_empty()) }

fn parse_param<T: std::str::FromStr>(v: &Option<String>, name: &str) -> Result<Option<T>, EngineError> {
    non_empty(v)
        .map(|s| s.parse::<T>().map_err(|_| EngineError::invalid_argument(format!("{name} must be a number, got {s:?}"))))
        .transpose()
}

#[derive(Serialize)]
pub struct RecommendResponse<'a> {
    pub query: String,
    pub filters: Filters,
    pub count: usize,
    pub took_s: f64,
    pub results: Vec<Hit<'a>>,
}

/// Startup configuration for the HTTP layer.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub catalog: PathBuf,
    pub admin_token: Option<String>,
    /// Comma-separated list of allowed origins; any origin when unset.
    pub cors_allow_origin: Option<String>,
}

impl AppConfig {
    /// Reads `ADMIN_TOKEN` and `CORS_ALLOW_ORIGIN` from the environment.
    pub fn from_env(catalog: impl Into<PathBuf>) -> Self {
        Self {
            catalog: catalog.into(),
            admin_token: std::env::var("ADMIN_TOKEN").ok(),
            cors_allow_origin: std::env::var("CORS_ALLOW_ORIGIN").ok(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub index: SharedIndex,
    pub catalog: PathBuf,
    pub admin_token: Option<String>,
}

fn build_index(catalog: &std::path::Path) -> Result<InvertedIndex, EngineError> {
    InvertedIndex::build(load_catalog(catalog)?)
}

/// Origins come from a comma-separated list; unparsable entries are skipped and
/// an empty list allows any origin.
fn cors_layer(allow_origin: Option<&str>) -> CorsLayer {
    let origins: Vec<HeaderValue> = allow_origin
        .into_iter()
        .flat_map(|val| val.split(','))
        .filter_map(|s| s.trim().parse().ok())
        .collect();
    let allow = if origins.is_empty() { AllowOrigin::any() } else { AllowOrigin::list(origins) };
    CorsLayer::new().allow_origin(allow).allow_methods(Any).allow_headers(Any)
}

pub fn build_app(config: AppConfig) -> Result<Router> {
    // The index is built before the router exists; no request ever sees a partial index.
    let index = build_index(&config.catalog)?;
    tracing::info!(catalog = %config.catalog.display(), num_docs = index.num_docs(), "recommendation index loaded");
    let app_state = AppState { index: SharedIndex::new(index), catalog: config.catalog.clone(), admin_token: config.admin_token.clone() };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/recommend", get(recommend_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/index/reload", post(reload_handler))
        .with_state(app_state)
        .layer(cors_layer(config.cors_allow_origin.as_deref()))
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

pub async fn recommend_handler(State(state): State<AppState>, Query(params): Query<RecommendParams>) -> Result<Json<Value>, ApiError> {
    let start = std::time::Instant::now();
    let filters = params.filters().map_err(engine_error)?;
    let limit = params.limit().map_err(engine_error)?;
    let text = params.q.clone().unwrap_or_default();

    let index = state.index.current();
    let results = query(&index, &text, &filters, limit).map_err(engine_error)?;
    let body = RecommendResponse {
        query: text,
        filters,
        count: results.len(),
        took_s: start.elapsed().as_secs_f64(),
        results,
    };
    let body = serde_json::to_value(&body).map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(body))
}

pub async fn doc_handler(State(state): State<AppState>, Path(doc_id): Path<DocId>) -> Result<Json<Value>, ApiError> {
    let index = state.index.current();
    let doc = index.document(doc_id).ok_or_else(|| api_error(StatusCode::NOT_FOUND, "not found"))?;
    let body = serde_json::to_value(doc).map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(body))
}

// --- Admin endpoints ---
async fn reload_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Value>, ApiError> {
    authorize(state.admin_token.as_deref(), &headers)?;
    let catalog = state.catalog.clone();
    let index = tokio::task::spawn_blocking(move || build_index(&catalog))
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(engine_error)?;
    let (num_docs, num_terms) = (index.num_docs(), index.num_terms());
    state.index.replace(index);
    tracing::info!(num_docs, num_terms, "recommendation index rebuilt");
    Ok(Json(json!({ "num_docs": num_docs, "num_terms": num_terms })))
}

fn authorize(admin_token: Option<&str>, headers: &HeaderMap) -> Result<(), ApiError> {
    let provided = headers.get(ADMIN_TOKEN_HEADER).and_then(|v| v.to_str().ok());
    match (admin_token, provided) {
        (None, _) => Err(api_error(StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set")),
        (Some(required), Some(given)) if given == required => Ok(()),
        _ => Err(api_error(StatusCode::UNAUTHORIZED, "invalid admin token")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(token: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(ADMIN_TOKEN_HEADER, HeaderValue::from_str(token).unwrap());
        h
    }

    #[test]
    fn authorize_needs_a_configured_token() {
        let err = authorize(None, &headers("anything")).unwrap_err();
        assert_eq!(err.0, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn authorize_compares_header() {
        assert!(authorize(Some("secret"), &headers("secret")).is_ok());
        assert!(authorize(Some("secret"), &headers("guess")).is_err());
        assert!(authorize(Some("secret"), &HeaderMap::new()).is_err());
        // an empty configured token still requires the header
        assert!(authorize(Some(""), &HeaderMap::new()).is_err());
    }
}
