use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use bftmap_core::ViewportBounds;
use bftmap_resolver::{PinCandidate, PinCategory, PinEntry};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{validate_point, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct PinsParams {
    /// Only return pins the map should currently render.
    #[serde(default)]
    pub visible_only: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct ClearedData {
    pub cleared: usize,
}

#[derive(Debug, Serialize)]
pub(super) struct ViewportData {
    /// Facility pins whose markers should be removed.
    pub hidden: Vec<u64>,
}

pub(super) async fn list_pins(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<PinsParams>,
) -> Json<ApiResponse<Vec<PinEntry>>> {
    let session = state.session.lock().await;
    let registry = session.registry();
    let data: Vec<PinEntry> = if params.visible_only {
        registry.visible_entries().cloned().collect()
    } else {
        registry.entries().to_vec()
    };
    drop(session);

    Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    })
}

/// Adds a personal pin. A pin with the same name at (nearly) the same
/// coordinates already exists → 409.
pub(super) async fn create_pin(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(candidate): Json<PinCandidate>,
) -> Result<(StatusCode, Json<ApiResponse<PinEntry>>), ApiError> {
    validate_point(&req_id.0, candidate.lat, candidate.lng)?;
    if candidate.name.trim().is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "pin name must not be empty",
        ));
    }

    let mut session = state.session.lock().await;
    let added = session
        .registry_mut()
        .add(candidate, PinCategory::Personal);
    drop(session);

    let Some(entry) = added else {
        return Err(ApiError::new(
            req_id.0,
            "conflict",
            "a pin with this name already exists at this location",
        ));
    };
    tracing::info!(id = entry.id, name = %entry.name, "personal pin added");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: entry,
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

pub(super) async fn clear_pins(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<ClearedData>> {
    let cleared = state.session.lock().await.registry_mut().clear_all();

    Json(ApiResponse {
        data: ClearedData { cleared },
        meta: ResponseMeta::new(req_id.0),
    })
}

/// Runs the visibility pass for the new viewport. Never refetches.
pub(super) async fn update_viewport(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(bounds): Json<ViewportBounds>,
) -> Result<Json<ApiResponse<ViewportData>>, ApiError> {
    let finite = [bounds.north, bounds.south, bounds.east, bounds.west]
        .iter()
        .all(|v| v.is_finite());
    if !finite || bounds.north < bounds.south || bounds.east < bounds.west {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "viewport needs north >= south and east >= west",
        ));
    }

    let hidden = state.session.lock().await.on_viewport_change(bounds);

    Ok(Json(ApiResponse {
        data: ViewportData { hidden },
        meta: ResponseMeta::new(req_id.0),
    }))
}
