//! Checklist lifecycle handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::checklist::{
    AssignChecklistsRequest, AssignedChecklistsQuery, BulkCompletion, CompleteChecklistsRequest,
    CreateChecklistRequest, OpenChecklistsQuery, UpdateChecklistRequest, WorkflowChecklists,
};
use domain::models::{Checklist, ChecklistStatus};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Principal;
use crate::middleware::metrics::record_checklist_transition;

/// POST /api/v1/checklists
pub async fn create_checklist(
    State(state): State<AppState>,
    Json(request): Json<CreateChecklistRequest>,
) -> Result<(StatusCode, Json<Checklist>), ApiError> {
    let checklist = state.checklists.create(request).await?;
    Ok((StatusCode::CREATED, Json(checklist)))
}

/// GET /api/v1/checklists/:checklist_id
pub async fn get_checklist(
    State(state): State<AppState>,
    Path(checklist_id): Path<String>,
) -> Result<Json<Checklist>, ApiError> {
    Ok(Json(state.checklists.get(&checklist_id).await?))
}

/// GET /api/v1/checklists/workflow/:workflow_id
pub async fn checklists_by_workflow(
    State(state): State<AppState>,
    Path(workflow_id): Path<String>,
) -> Result<Json<Vec<Checklist>>, ApiError> {
    Ok(Json(state.checklists.by_workflow(&workflow_id).await?))
}

/// PUT /api/v1/checklists/assign
///
/// All listed checklists are assigned, or none are.
pub async fn assign_checklists(
    State(state): State<AppState>,
    Json(request): Json<AssignChecklistsRequest>,
) -> Result<Json<Vec<Checklist>>, ApiError> {
    let assigned = state.checklists.bulk_assign(request).await?;
    record_checklist_transition(ChecklistStatus::Open.as_str(), assigned.len());
    Ok(Json(assigned))
}

/// PUT /api/v1/checklists/complete
///
/// Checklists that are not `Open` are skipped, not rejected.
pub async fn complete_checklists(
    State(state): State<AppState>,
    Json(request): Json<CompleteChecklistsRequest>,
) -> Result<Json<BulkCompletion>, ApiError> {
    request.validate()?;
    let outcome = state.checklists.bulk_complete(&request.checklist_ids).await?;
    record_checklist_transition(ChecklistStatus::Completed.as_str(), outcome.completed.len());
    Ok(Json(outcome))
}

/// PUT /api/v1/checklists/:checklist_id
pub async fn update_checklist(
    State(state): State<AppState>,
    principal: Principal,
    Path(checklist_id): Path<String>,
    Json(mut request): Json<UpdateChecklistRequest>,
) -> Result<Json<Checklist>, ApiError> {
    if request.modified_by.is_none() {
        request.modified_by = Some(principal.id);
    }
    Ok(Json(state.checklists.update(&checklist_id, request).await?))
}

/// PATCH /api/v1/checklists/:checklist_id/scan-end
pub async fn record_scan_end(
    State(state): State<AppState>,
    principal: Principal,
    Path(checklist_id): Path<String>,
) -> Result<Json<Checklist>, ApiError> {
    let checklist = state
        .checklists
        .record_scan_end(&checklist_id, Some(principal.id))
        .await?;
    Ok(Json(checklist))
}

/// GET /api/v1/checklists/assigned?assignedTo=&status=&isActive=
pub async fn assigned_checklists(
    State(state): State<AppState>,
    Query(query): Query<AssignedChecklistsQuery>,
) -> Result<Json<Vec<Checklist>>, ApiError> {
    Ok(Json(state.checklists.assigned(query).await?))
}

/// GET /api/v1/checklists/open?workflowId=&patrolId=
pub async fn open_checklists(
    State(state): State<AppState>,
    Query(query): Query<OpenChecklistsQuery>,
) -> Result<Json<Vec<Checklist>>, ApiError> {
    let checklists = state
        .checklists
        .open_for(&query.workflow_id, &query.patrol_id)
        .await?;
    Ok(Json(checklists))
}

/// GET /api/v1/checklists/grouped/:patrol_id
pub async fn grouped_checklists(
    State(state): State<AppState>,
    Path(patrol_id): Path<String>,
) -> Result<Json<Vec<WorkflowChecklists>>, ApiError> {
    Ok(Json(state.checklists.grouped_for_patrol(&patrol_id).await?))
}
