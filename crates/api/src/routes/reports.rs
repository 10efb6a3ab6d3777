//! Patrol report handler.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use domain::models::report::{MediaReport, RegularReport, ReportQuery, ReportType};
use domain::services::ReportWindow;
use serde::Serialize;

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PatrolReport {
    Regular(RegularReport),
    Media(MediaReport),
}

/// GET /api/v1/reports/:patrol_id?type=regular|media&startDateTime=&endDateTime=
///
/// Date bounds apply to regular reports only and are read as UTC.
pub async fn patrol_report(
    State(state): State<AppState>,
    Path(patrol_id): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<PatrolReport>, ApiError> {
    let report = match query.report_type {
        ReportType::Regular => {
            let window = ReportWindow::from_query(
                query.start_date_time.as_deref(),
                query.end_date_time.as_deref(),
                Utc::now(),
            )?;
            PatrolReport::Regular(state.reporting.regular_report(&patrol_id, window).await?)
        }
        ReportType::Media => PatrolReport::Media(state.reporting.media_report(&patrol_id).await?),
    };
    Ok(Json(report))
}
