//! Company, location and user directory handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::company::{CreateCompanyRequest, CreateLocationRequest};
use domain::models::user::{PatrolDetail, UpdateUserRequest};
use domain::models::{Company, Location, Role, User};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Principal;

/// POST /api/v1/companies
pub async fn create_company(
    State(state): State<AppState>,
    Json(request): Json<CreateCompanyRequest>,
) -> Result<(StatusCode, Json<Company>), ApiError> {
    let company = state.directory.create_company(request).await?;
    Ok((StatusCode::CREATED, Json(company)))
}

/// GET /api/v1/companies
pub async fn list_companies(State(state): State<AppState>) -> Result<Json<Vec<Company>>, ApiError> {
    Ok(Json(state.directory.list_companies().await?))
}

/// POST /api/v1/locations
pub async fn create_location(
    State(state): State<AppState>,
    Json(request): Json<CreateLocationRequest>,
) -> Result<(StatusCode, Json<Location>), ApiError> {
    let location = state.directory.create_location(request).await?;
    Ok((StatusCode::CREATED, Json(location)))
}

/// GET /api/v1/locations
pub async fn list_locations(
    State(state): State<AppState>,
) -> Result<Json<Vec<Location>>, ApiError> {
    Ok(Json(state.directory.list_locations().await?))
}

/// GET /api/v1/locations/:location_code
pub async fn get_location(
    State(state): State<AppState>,
    Path(location_code): Path<String>,
) -> Result<Json<Location>, ApiError> {
    Ok(Json(state.directory.get_location(&location_code).await?))
}

/// GET /api/v1/users
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.directory.list_users(None).await?))
}

/// GET /api/v1/patrols
pub async fn list_patrols(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.directory.list_users(Some(Role::Patrol)).await?))
}

/// GET /api/v1/patrols/:patrol_id
pub async fn patrol_detail(
    State(state): State<AppState>,
    Path(patrol_id): Path<String>,
) -> Result<Json<PatrolDetail>, ApiError> {
    Ok(Json(state.directory.patrol_detail(&patrol_id).await?))
}

/// PUT /api/v1/users/admins/:admin_id
pub async fn update_admin(
    State(state): State<AppState>,
    principal: Principal,
    Path(admin_id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .directory
        .update_user(Role::Admin, &admin_id, request, &principal.id)
        .await?;
    Ok(Json(user))
}

/// PUT /api/v1/users/patrols/:patrol_id
pub async fn update_patrol(
    State(state): State<AppState>,
    principal: Principal,
    Path(patrol_id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .directory
        .update_user(Role::Patrol, &patrol_id, request, &principal.id)
        .await?;
    Ok(Json(user))
}

/// DELETE /api/v1/users/admins/:admin_id
pub async fn delete_admin(
    State(state): State<AppState>,
    principal: Principal,
    Path(admin_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .directory
        .delete_user(Role::Admin, &admin_id, &principal.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/users/patrols/:patrol_id
pub async fn delete_patrol(
    State(state): State<AppState>,
    principal: Principal,
    Path(patrol_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .directory
        .delete_user(Role::Patrol, &patrol_id, &principal.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
