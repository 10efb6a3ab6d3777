//! Workflow lifecycle handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::checklist::WorkflowChecklists;
use domain::models::workflow::{
    CreateWorkflowRequest, StartWorkflowRequest, UpdateWorkflowRequest,
};
use domain::models::{Checklist, CompletionOutcome, Workflow, WorkflowStatus};
use domain::services::WorkflowFilter;
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Principal;
use crate::middleware::metrics::record_workflow_transition;

/// Query parameters for workflow listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListWorkflowsQuery {
    pub status: Option<WorkflowStatus>,
    pub is_active: Option<bool>,
}

/// Result of a completion attempt.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteWorkflowResponse {
    pub completed: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub outstanding_checklists: Vec<String>,
    pub workflow: Workflow,
}

impl From<CompletionOutcome> for CompleteWorkflowResponse {
    fn from(outcome: CompletionOutcome) -> Self {
        match outcome {
            CompletionOutcome::Completed(workflow)
            | CompletionOutcome::AlreadyCompleted(workflow) => Self {
                completed: true,
                outstanding_checklists: Vec::new(),
                workflow,
            },
            CompletionOutcome::Outstanding {
                workflow,
                outstanding,
            } => Self {
                completed: false,
                outstanding_checklists: outstanding,
                workflow,
            },
        }
    }
}

/// POST /api/v1/workflows
pub async fn create_workflow(
    State(state): State<AppState>,
    Json(request): Json<CreateWorkflowRequest>,
) -> Result<(StatusCode, Json<Workflow>), ApiError> {
    let workflow = state.workflows.create(request).await?;
    Ok((StatusCode::CREATED, Json(workflow)))
}

/// GET /api/v1/workflows?status=&isActive=
pub async fn list_workflows(
    State(state): State<AppState>,
    Query(query): Query<ListWorkflowsQuery>,
) -> Result<Json<Vec<Workflow>>, ApiError> {
    let workflows = state
        .workflows
        .list(WorkflowFilter {
            status: query.status,
            is_active: query.is_active,
        })
        .await?;
    Ok(Json(workflows))
}

/// GET /api/v1/workflows/completed
pub async fn list_completed(
    State(state): State<AppState>,
) -> Result<Json<Vec<Workflow>>, ApiError> {
    let workflows = state
        .workflows
        .list(WorkflowFilter {
            status: Some(WorkflowStatus::Completed),
            is_active: None,
        })
        .await?;
    Ok(Json(workflows))
}

/// GET /api/v1/workflows/completed/:patrol_id
pub async fn completed_for_patrol(
    State(state): State<AppState>,
    Path(patrol_id): Path<String>,
) -> Result<Json<Vec<WorkflowChecklists>>, ApiError> {
    Ok(Json(state.workflows.completed_for_patrol(&patrol_id).await?))
}

/// GET /api/v1/workflows/:workflow_id
pub async fn get_workflow(
    State(state): State<AppState>,
    Path(workflow_id): Path<String>,
) -> Result<Json<Workflow>, ApiError> {
    Ok(Json(state.workflows.get(&workflow_id).await?))
}

/// GET /api/v1/workflows/:workflow_id/checklists
pub async fn active_checklists(
    State(state): State<AppState>,
    Path(workflow_id): Path<String>,
) -> Result<Json<Vec<Checklist>>, ApiError> {
    Ok(Json(state.workflows.active_checklists(&workflow_id).await?))
}

/// PUT /api/v1/workflows/:workflow_id
pub async fn update_workflow(
    State(state): State<AppState>,
    principal: Principal,
    Path(workflow_id): Path<String>,
    Json(mut request): Json<UpdateWorkflowRequest>,
) -> Result<Json<Workflow>, ApiError> {
    if request.modified_by.is_none() {
        request.modified_by = Some(principal.id);
    }
    Ok(Json(state.workflows.update(&workflow_id, request).await?))
}

/// DELETE /api/v1/workflows/:workflow_id
pub async fn delete_workflow(
    State(state): State<AppState>,
    principal: Principal,
    Path(workflow_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.workflows.delete(&workflow_id, &principal.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/workflows/:workflow_id/start
pub async fn start_workflow(
    State(state): State<AppState>,
    Path(workflow_id): Path<String>,
    Json(request): Json<StartWorkflowRequest>,
) -> Result<Json<Workflow>, ApiError> {
    let workflow = state
        .workflows
        .start(&workflow_id, &request.start_date_time)
        .await?;
    record_workflow_transition(WorkflowStatus::Inprogress.as_str());
    Ok(Json(workflow))
}

/// POST /api/v1/workflows/:workflow_id/complete
///
/// Outstanding checklists are reported in the body, not as an error.
pub async fn complete_workflow(
    State(state): State<AppState>,
    Path(workflow_id): Path<String>,
) -> Result<Json<CompleteWorkflowResponse>, ApiError> {
    let outcome = state.workflows.attempt_complete(&workflow_id).await?;
    if matches!(outcome, CompletionOutcome::Completed(_)) {
        record_workflow_transition(WorkflowStatus::Completed.as_str());
    }
    Ok(Json(outcome.into()))
}
