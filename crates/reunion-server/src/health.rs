use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub version: &'static str,
    pub store: &'static str,
}

/// GET /health: 200 while the store answers a ping, 503 otherwise.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let reachable = match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Store ping failed");
            false
        },
    };

    let (code, report) = if reachable {
        (StatusCode::OK, HealthReport::new("healthy", "ok"))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            HealthReport::new("degraded", "unreachable"),
        )
    };
    (code, Json(report))
}

impl HealthReport {
    fn new(status: &'static str, store: &'static str) -> Self {
        Self {
            status,
            version: env!("CARGO_PKG_VERSION"),
            store,
        }
    }
}
