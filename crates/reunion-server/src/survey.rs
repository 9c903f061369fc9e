use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;

use reunion_core::analytics::{self, CategoryCount, RangeCount, SurveySummary};
use reunion_core::survey::{NewSurvey, Survey};

use crate::error::AppError;
use crate::state::AppState;

/// POST /api/survey: store one survey response.
pub async fn submit_survey(
    State(state): State<AppState>,
    Json(body): Json<NewSurvey>,
) -> Result<(StatusCode, Json<Survey>), AppError> {
    let survey = state.store.insert_survey(body).await?;
    tracing::info!(id = survey.id, "Survey submitted");
    Ok((StatusCode::CREATED, Json(survey)))
}

/// GET /api/analytics/summary
pub async fn get_summary(State(state): State<AppState>) -> Result<Json<SurveySummary>, AppError> {
    let surveys = state.store.list_surveys().await?;
    Ok(Json(analytics::summary(&surveys)))
}

/// GET /api/analytics/event-types
pub async fn get_event_types(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryCount>>, AppError> {
    let surveys = state.store.list_surveys().await?;
    Ok(Json(analytics::event_type_distribution(&surveys)))
}

/// GET /api/analytics/current-status
pub async fn get_current_status(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryCount>>, AppError> {
    let surveys = state.store.list_surveys().await?;
    Ok(Json(analytics::academic_status_distribution(&surveys)))
}

/// GET /api/analytics/venues
pub async fn get_venues(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryCount>>, AppError> {
    let surveys = state.store.list_surveys().await?;
    Ok(Json(analytics::venue_distribution(&surveys)))
}

/// GET /api/analytics/budget
pub async fn get_budget(State(state): State<AppState>) -> Result<Json<Vec<RangeCount>>, AppError> {
    let surveys = state.store.list_surveys().await?;
    Ok(Json(analytics::budget_distribution(&surveys)))
}

/// GET /api/analytics/location
pub async fn get_location(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryCount>>, AppError> {
    let surveys = state.store.list_surveys().await?;
    Ok(Json(analytics::location_distribution(&surveys)))
}

/// GET /api/analytics/alcohol
pub async fn get_alcohol(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryCount>>, AppError> {
    let surveys = state.store.list_surveys().await?;
    Ok(Json(analytics::alcohol_distribution(&surveys)))
}
