//! Question retrieval.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::state::AppState;

fn default_question_count() -> usize {
    5
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionQuery {
    technical_domain: String,
    question_level: String,
    #[serde(default = "default_question_count")]
    no_of_questions: usize,
}

/// `GET /api/questions?technicalDomain=python&questionLevel=beginner&noOfQuestions=5`
///
/// The 400 body shape is pinned by the interview client, which matches
/// on the `error` field text.
pub async fn get_questions(
    State(state): State<AppState>,
    Query(query): Query<QuestionQuery>,
) -> Response {
    match state.question_bank.sample(
        &query.technical_domain,
        &query.question_level,
        query.no_of_questions,
    ) {
        Ok(questions) => Json(questions).into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}
