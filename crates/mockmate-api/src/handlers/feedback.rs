//! Feedback composition endpoints.
//!
//! Both endpoints proxy the model's JSON through unchanged; the client
//! owns that contract and the server only guarantees fences are gone.

use axum::extract::State;
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use mockmate_models::{AnswerSubmission, FacialMetrics};
use mockmate_scoring::score_answer;
use std::sync::Arc;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::services::gemini::{facial_feedback_prompt, verbal_feedback_prompt, GeminiClient};
use crate::state::AppState;

fn gemini_or_unconfigured(state: &AppState) -> ApiResult<&Arc<GeminiClient>> {
    state
        .gemini
        .as_ref()
        .ok_or_else(|| ApiError::configuration("GEMINI_API_KEY is not configured"))
}

/// The model reply is already a JSON document; send it as the body
/// without re-encoding.
fn raw_json(body: String) -> Response {
    (
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        )],
        body,
    )
        .into_response()
}

/// `POST /api/feedback`: score the answer's keypoints, then have Gemini
/// grade it.
pub async fn verbal_feedback(
    State(state): State<AppState>,
    Json(submission): Json<AnswerSubmission>,
) -> ApiResult<Response> {
    let gemini = gemini_or_unconfigured(&state)?;

    let scored = score_answer(submission);
    debug!(
        question_id = scored.question_id,
        detected = scored.detected_keypoints.len(),
        missing = scored.missing_keypoints.len(),
        "scored answer"
    );

    let prompt = verbal_feedback_prompt(&scored)?;
    let reply = gemini.generate_json(&prompt).await?;
    Ok(raw_json(reply))
}

/// `POST /api/feedback/facial`: summarize the aggregated non-verbal
/// metrics the client collected from the analysis stream.
pub async fn facial_feedback(
    State(state): State<AppState>,
    Json(metrics): Json<FacialMetrics>,
) -> ApiResult<Response> {
    let gemini = gemini_or_unconfigured(&state)?;

    if !metrics.non_verbal_metrics.is_object() {
        return Err(ApiError::bad_request(
            "nonVerbalMetrics must be a JSON object",
        ));
    }

    let prompt = facial_feedback_prompt(&metrics)?;
    let reply = gemini.generate_json(&prompt).await?;
    Ok(raw_json(reply))
}
