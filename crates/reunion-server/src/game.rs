use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use reunion_core::geo::{Coordinate, round_km, score_guess};
use reunion_core::leaderboard::{GuessAttempt, rank_leaderboard};

use crate::error::AppError;
use crate::state::AppState;

/// Largest round number any store backend can hold (a signed 32-bit column).
pub const MAX_ATTEMPT: u32 = i32::MAX as u32;

/// Request body for a guess. Distance is computed server-side; any
/// client-supplied distance is ignored.
#[derive(Debug, Deserialize)]
pub struct GuessBody {
    pub latitude: f64,
    pub longitude: f64,
    pub attempt: u32,
}

/// A scored attempt as shown to players, distance rounded to 2dp.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptView {
    pub id: i64,
    pub distance_km: f64,
    pub attempt_number: u32,
    pub created_at: DateTime<Utc>,
}

impl From<&GuessAttempt> for AttemptView {
    fn from(a: &GuessAttempt) -> Self {
        Self {
            id: a.id,
            distance_km: round_km(a.distance_km),
            attempt_number: a.attempt_number,
            created_at: a.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuessResponse {
    #[serde(flatten)]
    pub attempt: AttemptView,
    pub target: TargetView,
}

#[derive(Debug, Serialize)]
pub struct TargetView {
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketView {
    pub attempt_number: u32,
    pub entries: Vec<AttemptView>,
}

/// POST /api/game/guess: score a guess against the target and record it.
pub async fn submit_guess(
    State(state): State<AppState>,
    Json(body): Json<GuessBody>,
) -> Result<(StatusCode, Json<GuessResponse>), AppError> {
    if body.attempt == 0 || body.attempt > MAX_ATTEMPT {
        return Err(AppError::BadRequest(format!(
            "attempt must be between 1 and {MAX_ATTEMPT}"
        )));
    }

    let guess = Coordinate {
        latitude: body.latitude,
        longitude: body.longitude,
    };
    let distance_km = score_guess(guess, &state.target)?;

    let attempt = state.store.save_attempt(distance_km, body.attempt).await?;
    tracing::info!(
        id = attempt.id,
        attempt = attempt.attempt_number,
        distance_km = round_km(distance_km),
        "Recorded guess"
    );

    Ok((
        StatusCode::CREATED,
        Json(GuessResponse {
            attempt: AttemptView::from(&attempt),
            target: TargetView {
                name: state.target.name.clone(),
            },
        }),
    ))
}

/// GET /api/game/leaderboard: ranked buckets for rounds 1 to 3.
pub async fn get_leaderboard(
    State(state): State<AppState>,
) -> Result<Json<Vec<BucketView>>, AppError> {
    let history = state.store.load_history().await?;
    let buckets = rank_leaderboard(&history)
        .iter()
        .map(|b| BucketView {
            attempt_number: b.attempt_number,
            entries: b.entries.iter().map(AttemptView::from).collect(),
        })
        .collect();
    Ok(Json(buckets))
}

/// GET /api/game/target: the target's name; its coordinate stays server-side.
pub async fn get_target(State(state): State<AppState>) -> Json<TargetView> {
    Json(TargetView {
        name: state.target.name.clone(),
    })
}
