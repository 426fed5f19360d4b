//! Liveness and readiness probes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().to_rfc3339(),
    })
}

pub async fn healthz() -> &'static str {
    "ok"
}

#[derive(Serialize)]
pub struct CheckStatus {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl CheckStatus {
    fn ok() -> Self {
        Self {
            status: "ok",
            error: None,
        }
    }

    fn error(msg: impl Into<String>) -> Self {
        Self {
            status: "error",
            error: Some(msg.into()),
        }
    }
}

#[derive(Serialize)]
pub struct ReadinessChecks {
    question_bank: CheckStatus,
    gemini: CheckStatus,
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    status: &'static str,
    checks: ReadinessChecks,
}

/// Readiness: the question bank must hold at least one domain and the
/// Gemini key must be configured. The landmark detector is not checked,
/// builds without it legitimately serve no-face replies.
pub async fn ready(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    let question_bank = if state.question_bank.domain_count() > 0 {
        CheckStatus::ok()
    } else {
        CheckStatus::error("question bank is empty")
    };

    let gemini = if state.gemini.is_some() {
        CheckStatus::ok()
    } else {
        CheckStatus::error("GEMINI_API_KEY not configured")
    };

    let all_ok = question_bank.error.is_none() && gemini.error.is_none();
    let response = ReadinessResponse {
        status: if all_ok { "ready" } else { "degraded" },
        checks: ReadinessChecks {
            question_bank,
            gemini,
        },
    };

    if all_ok {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}
