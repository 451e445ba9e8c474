//! Health check handlers
//!
//! Liveness and readiness probes.

use axum::{extract::State, http::StatusCode, Json};
use hearth_service::dto::{HealthChecks, HealthResponse, ReadinessResponse};

use crate::state::AppState;

/// GET /health, /health/live
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /health/ready
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let database = ping_database(&state).await;
    let redis = state.redis().health_check().await.is_ok();

    let (status, label) = if database && redis {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(ReadinessResponse {
            status: label,
            checks: HealthChecks { database, redis },
        }),
    )
}

async fn ping_database(state: &AppState) -> bool {
    match state.db().acquire().await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database readiness check failed");
            false
        }
    }
}
