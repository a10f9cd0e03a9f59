use axum::{
    extract::{Query, State},
    Extension, Json,
};
use bftmap_core::{AreaDescriptor, ResolvedFacility};
use bftmap_resolver::{
    IngestSummary, NearbyQuery, ResolveMode, ResolveOutcome, SearchReport, Tier,
};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{
    map_resolver_error, normalize_limit, validate_point, ApiError, ApiResponse, AppState,
    ResponseMeta,
};

#[derive(Debug, Deserialize)]
pub(super) struct NearbyParams {
    pub lat: f64,
    pub lng: f64,
    pub radius: Option<f64>,
    pub limit: Option<usize>,
    pub mode: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PointParams {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Serialize)]
pub(super) struct NearbyData {
    pub facilities: Vec<ResolvedFacility>,
    pub outcome: ResolveOutcome,
    pub message: &'static str,
    pub tier: Tier,
    pub area: Option<AreaDescriptor>,
    pub ingest: IngestSummary,
    /// Pin ids hidden by the visibility pass that followed the ingest.
    pub hidden: Vec<u64>,
}

impl From<SearchReport> for NearbyData {
    fn from(report: SearchReport) -> Self {
        let resolution = report.resolution;
        Self {
            message: resolution.outcome.message(),
            facilities: resolution.facilities,
            outcome: resolution.outcome,
            tier: resolution.tier,
            area: resolution.area,
            ingest: report.ingest,
            hidden: report.hidden,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct ClassifyData {
    pub area: AreaDescriptor,
    /// Expansion order used when the area alone is not enough.
    pub adjacent: Vec<AreaDescriptor>,
}

pub(super) async fn nearby(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<NearbyParams>,
) -> Result<Json<ApiResponse<NearbyData>>, ApiError> {
    validate_point(&req_id.0, params.lat, params.lng)?;

    let radius_meters = params.radius.unwrap_or(state.defaults.radius_meters);
    if !radius_meters.is_finite() || radius_meters <= 0.0 {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "radius must be a positive number of meters",
        ));
    }

    let mode = match params.mode.as_deref() {
        None => ResolveMode::default(),
        Some(raw) => raw
            .parse::<ResolveMode>()
            .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e))?,
    };

    let query = NearbyQuery {
        lat: params.lat,
        lng: params.lng,
        radius_meters,
        max_count: normalize_limit(params.limit, state.defaults.max_count),
    };

    let mut session = state.session.lock().await;
    let report = session
        .search(query, mode)
        .await
        .map_err(|e| map_resolver_error(req_id.0.clone(), &e))?;
    drop(session);

    Ok(Json(ApiResponse {
        data: report.into(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn classify(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<PointParams>,
) -> Result<Json<ApiResponse<ClassifyData>>, ApiError> {
    validate_point(&req_id.0, params.lat, params.lng)?;

    let session = state.session.lock().await;
    let source = session.source();
    let area = source.classify(params.lat, params.lng);
    let adjacent = source.strategy().adjacent_areas(&area);
    drop(session);

    Ok(Json(ApiResponse {
        data: ClassifyData { area, adjacent },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Drops facility pins and repeats the last search. `data` is `null` when
/// nothing has been searched yet.
pub(super) async fn reload(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Option<NearbyData>>>, ApiError> {
    let mut session = state.session.lock().await;
    let report = session
        .reload()
        .await
        .map_err(|e| map_resolver_error(req_id.0.clone(), &e))?;
    drop(session);

    Ok(Json(ApiResponse {
        data: report.map(NearbyData::from),
        meta: ResponseMeta::new(req_id.0),
    }))
}
