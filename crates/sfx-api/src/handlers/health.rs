//! Status and health check handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

/// Service status with credential presence.
#[derive(Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub gemini_key_set: bool,
    pub mirelo_key_set: bool,
}

/// Root status endpoint.
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let settings = state.pipeline.settings();
    Json(StatusResponse {
        status: "online".to_string(),
        gemini_key_set: settings.gemini_key_set(),
        mirelo_key_set: settings.mirelo_key_set(),
    })
}

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Readiness check response.
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub checks: ReadinessChecks,
}

#[derive(Serialize)]
pub struct ReadinessChecks {
    pub gemini_key: CheckStatus,
    pub mirelo_key: CheckStatus,
}

#[derive(Serialize)]
pub struct CheckStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckStatus {
    fn from_presence(present: bool, missing_msg: &str) -> Self {
        if present {
            Self {
                status: "ok".to_string(),
                error: None,
            }
        } else {
            Self {
                status: "error".to_string(),
                error: Some(missing_msg.to_string()),
            }
        }
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Readiness check endpoint (readiness probe).
/// Ready once both provider credentials are configured.
pub async fn ready(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    let settings = state.pipeline.settings();

    let checks = ReadinessChecks {
        gemini_key: CheckStatus::from_presence(settings.gemini_key_set(), "GEMINI_API_KEY not set"),
        mirelo_key: CheckStatus::from_presence(settings.mirelo_key_set(), "MIRELO_API_KEY not set"),
    };
    let all_ok = checks.gemini_key.is_ok() && checks.mirelo_key.is_ok();

    let response = ReadinessResponse {
        status: if all_ok { "ready" } else { "degraded" }.to_string(),
        checks,
    };

    if all_ok {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}
