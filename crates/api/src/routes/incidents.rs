//! Incident catalog and incident reporting handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::incident::{
    CreateIncidentMasterRequest, ReportIncidentsRequest, UpdateIncidentMasterRequest,
};
use domain::models::{Incident, IncidentMaster};

use crate::app::AppState;
use crate::error::ApiError;

/// POST /api/v1/incident-masters
pub async fn create_master(
    State(state): State<AppState>,
    Json(request): Json<CreateIncidentMasterRequest>,
) -> Result<(StatusCode, Json<IncidentMaster>), ApiError> {
    let master = state.incidents.create_master(request).await?;
    Ok((StatusCode::CREATED, Json(master)))
}

/// GET /api/v1/incident-masters
pub async fn list_masters(
    State(state): State<AppState>,
) -> Result<Json<Vec<IncidentMaster>>, ApiError> {
    Ok(Json(state.incidents.list_masters().await?))
}

/// GET /api/v1/incident-masters/:code
pub async fn get_master(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<IncidentMaster>, ApiError> {
    Ok(Json(state.incidents.get_master(&code).await?))
}

/// PUT /api/v1/incident-masters/:code
pub async fn update_master(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(request): Json<UpdateIncidentMasterRequest>,
) -> Result<Json<IncidentMaster>, ApiError> {
    Ok(Json(state.incidents.update_master(&code, request).await?))
}

/// DELETE /api/v1/incident-masters/:code
///
/// Soft delete: the entry is deactivated and returned.
pub async fn delete_master(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<IncidentMaster>, ApiError> {
    Ok(Json(state.incidents.deactivate_master(&code).await?))
}

/// POST /api/v1/incidents
pub async fn report_incidents(
    State(state): State<AppState>,
    Json(request): Json<ReportIncidentsRequest>,
) -> Result<(StatusCode, Json<Vec<Incident>>), ApiError> {
    let incidents = state.incidents.report(request).await?;
    Ok((StatusCode::CREATED, Json(incidents)))
}
