mod nearby;
mod pins;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use bftmap_core::AppConfig;
use bftmap_resolver::{AnyFetcher, NearbySession, ResolverError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{request_id, RequestId};

/// Upper bound on `limit` accepted by the nearby endpoint.
const MAX_LIMIT: usize = 200;

/// Query defaults applied when the client omits `radius` or `limit`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchDefaults {
    pub radius_meters: f64,
    pub max_count: usize,
}

impl SearchDefaults {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            radius_meters: config.default_radius_meters,
            max_count: config.default_max_count,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    /// The session lock serializes overlapping searches from different
    /// requests; viewport and pin calls queue behind a running search.
    pub session: Arc<Mutex<NearbySession<AnyFetcher>>>,
    pub defaults: SearchDefaults,
}

impl AppState {
    pub fn new(session: NearbySession<AnyFetcher>, defaults: SearchDefaults) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            defaults,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct HealthData {
    status: &'static str,
    data_source: String,
    cached_partitions: usize,
    pins: usize,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "data_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<usize>, default: usize) -> usize {
    limit.unwrap_or(default).clamp(1, MAX_LIMIT)
}

pub(super) fn validate_point(request_id: &str, lat: f64, lng: f64) -> Result<(), ApiError> {
    if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng) {
        Ok(())
    } else {
        Err(ApiError::new(
            request_id,
            "validation_error",
            format!("coordinates out of range: {lat}, {lng}"),
        ))
    }
}

/// Terminal load failures are a retryable 503, distinct from an empty result.
pub(super) fn map_resolver_error(request_id: String, error: &ResolverError) -> ApiError {
    match error {
        ResolverError::AllSourcesExhausted { .. } | ResolverError::IndexUnavailable { .. } => {
            tracing::warn!(error = %error, "facility data unavailable");
            ApiError::new(
                request_id,
                "data_unavailable",
                "could not load facility data; retry later",
            )
        }
        _ => {
            tracing::error!(error = %error, "nearby resolution failed");
            ApiError::new(request_id, "internal_error", "nearby resolution failed")
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/nearby", get(nearby::nearby))
        .route("/api/v1/classify", get(nearby::classify))
        .route("/api/v1/reload", post(nearby::reload))
        .route(
            "/api/v1/pins",
            get(pins::list_pins)
                .post(pins::create_pin)
                .delete(pins::clear_pins),
        )
        .route("/api/v1/viewport", post(pins::update_viewport))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let session = state.session.lock().await;
    let data = HealthData {
        status: "ok",
        data_source: session.source().fetcher().describe(),
        cached_partitions: session.source().cache_stats().entries,
        pins: session.registry().len(),
    };
    drop(session);

    Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    })
}
