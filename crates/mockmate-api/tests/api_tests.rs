//! API integration tests.
//!
//! Drives the assembled router with tower's oneshot harness: no network,
//! real middleware stack. Gemini calls go to a wiremock server.

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use mockmate_api::config::ApiConfig;
use mockmate_api::routes::create_router;
use mockmate_api::services::{GeminiClient, QuestionBank};
use mockmate_api::state::AppState;
use mockmate_vision::default_detector;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn seed_bank(dir: &Path) {
    let body = r#"{
        "beginner": [
            {"question_id": 1, "question_level": "beginner", "question": "What is a list", "keypoints": ["ordered", "mutable"], "possible_answers": []},
            {"question_id": 2, "question_level": "beginner", "question": "What is a dict", "keypoints": ["mapping", "keys"], "possible_answers": []},
            {"question_id": 3, "question_level": "beginner", "question": "What is a tuple", "keypoints": ["immutable"], "possible_answers": []}
        ],
        "intermediate": [
            {"question_id": 4, "question_level": "intermediate", "question": "Explain decorators", "keypoints": ["wrapper"], "possible_answers": []}
        ],
        "advanced": []
    }"#;
    std::fs::write(dir.join("python.json"), body).unwrap();
}

fn test_config(bank_dir: &Path) -> ApiConfig {
    ApiConfig {
        question_bank_dir: bank_dir.to_path_buf(),
        ..ApiConfig::default()
    }
}

fn test_app(config: ApiConfig, gemini: Option<GeminiClient>) -> Router {
    let state = AppState {
        question_bank: Arc::new(QuestionBank::load(&config.question_bank_dir).unwrap()),
        detector: default_detector(),
        gemini: gemini.map(Arc::new),
        config,
    };
    create_router(state, None)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn mock_gemini(server: &MockServer, model: &str) -> GeminiClient {
    GeminiClient::with_base_url("test-key".to_string(), model.to_string(), server.uri())
}

fn gemini_reply(text: &str) -> Value {
    json!({
        "candidates": [
            {"content": {"parts": [{"text": text}]}}
        ]
    })
}

#[tokio::test]
async fn test_health_reports_healthy() {
    let dir = tempfile::tempdir().unwrap();
    seed_bank(dir.path());
    let app = test_app(test_config(dir.path()), None);

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_ready_degrades_without_gemini_key() {
    let dir = tempfile::tempdir().unwrap();
    seed_bank(dir.path());
    let app = test_app(test_config(dir.path()), None);

    let response = app.oneshot(get("/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = body_json(response).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["checks"]["question_bank"]["status"], "ok");
    assert_eq!(body["checks"]["gemini"]["status"], "error");
}

#[tokio::test]
async fn test_ready_when_fully_configured() {
    let dir = tempfile::tempdir().unwrap();
    seed_bank(dir.path());
    let gemini = GeminiClient::new("key".to_string(), "gemini-2.0-flash".to_string());
    let app = test_app(test_config(dir.path()), Some(gemini));

    let response = app.oneshot(get("/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ready");
}

#[tokio::test]
async fn test_questions_returns_requested_sample() {
    let dir = tempfile::tempdir().unwrap();
    seed_bank(dir.path());
    let app = test_app(test_config(dir.path()), None);

    let response = app
        .oneshot(get(
            "/api/questions?technicalDomain=python&questionLevel=beginner&noOfQuestions=2",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let questions = body.as_array().unwrap();
    assert_eq!(questions.len(), 2);
    for q in questions {
        assert!(q["question_id"].as_u64().unwrap() <= 3);
        assert_eq!(q["question_level"], "beginner");
    }
}

#[tokio::test]
async fn test_questions_small_pool_returns_everything() {
    let dir = tempfile::tempdir().unwrap();
    seed_bank(dir.path());
    let app = test_app(test_config(dir.path()), None);

    let response = app
        .oneshot(get(
            "/api/questions?technicalDomain=python&questionLevel=intermediate&noOfQuestions=40",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["question_id"], 4);
}

#[tokio::test]
async fn test_questions_unknown_domain_keeps_the_legacy_error_body() {
    let dir = tempfile::tempdir().unwrap();
    seed_bank(dir.path());
    let app = test_app(test_config(dir.path()), None);

    let response = app
        .oneshot(get(
            "/api/questions?technicalDomain=golf&questionLevel=beginner&noOfQuestions=2",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "There is no such question category" })
    );
}

#[tokio::test]
async fn test_questions_unknown_level_keeps_the_legacy_error_body() {
    let dir = tempfile::tempdir().unwrap();
    seed_bank(dir.path());
    let app = test_app(test_config(dir.path()), None);

    let response = app
        .oneshot(get(
            "/api/questions?technicalDomain=python&questionLevel=expert&noOfQuestions=2",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "There is no such question level!!" })
    );
}

fn sample_submission() -> Value {
    json!({
        "question_id": 1,
        "question_level": "beginner",
        "question": "What is a list",
        "keypoints": ["ordered", "mutable"],
        "possible_answers": [],
        "user_answer": "A list is an ordered and mutable collection"
    })
}

#[tokio::test]
async fn test_feedback_without_key_is_a_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    seed_bank(dir.path());
    let app = test_app(test_config(dir.path()), None);

    let response = app
        .oneshot(post_json("/api/feedback", sample_submission()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = body_json(response).await;
    assert_eq!(body["code"], "not_configured");
}

#[tokio::test]
async fn test_feedback_returns_the_model_json_without_fences() {
    let dir = tempfile::tempdir().unwrap();
    seed_bank(dir.path());

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(
            "```json\n{\"feedback\":\"Solid answer\",\"rating_average\":8.5}\n```",
        )))
        .mount(&server)
        .await;

    let app = test_app(
        test_config(dir.path()),
        Some(mock_gemini(&server, "gemini-2.0-flash")),
    );

    let response = app
        .oneshot(post_json("/api/feedback", sample_submission()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );

    let body = body_json(response).await;
    assert_eq!(body["feedback"], "Solid answer");
    assert_eq!(body["rating_average"], 8.5);
}

#[tokio::test]
async fn test_feedback_upstream_failure_maps_to_bad_gateway() {
    let dir = tempfile::tempdir().unwrap();
    seed_bank(dir.path());

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("quota exhausted"))
        .mount(&server)
        .await;

    let app = test_app(
        test_config(dir.path()),
        Some(mock_gemini(&server, "gemini-2.0-flash")),
    );

    let response = app
        .oneshot(post_json("/api/feedback", sample_submission()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = body_json(response).await;
    assert_eq!(body["code"], "upstream_error");
}

#[tokio::test]
async fn test_facial_feedback_passes_metrics_through() {
    let dir = tempfile::tempdir().unwrap();
    seed_bank(dir.path());

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(
            "{\"nonVerbalFeedback\":{\"Confident\":\"Steady gaze\",\"Distracted\":\"Rarely\",\"Nervous\":\"Some fidgeting\"},\"nonVerbalScore\":7.5}",
        )))
        .mount(&server)
        .await;

    let app = test_app(
        test_config(dir.path()),
        Some(mock_gemini(&server, "gemini-2.0-flash")),
    );

    let response = app
        .oneshot(post_json(
            "/api/feedback/facial",
            json!({
                "nonVerbalMetrics": {
                    "lookingCenter": 72.5,
                    "lookingLeft": 10.0,
                    "speaking": 40.0
                }
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["nonVerbalScore"], 7.5);
    assert_eq!(body["nonVerbalFeedback"]["Confident"], "Steady gaze");
}

#[tokio::test]
async fn test_facial_feedback_rejects_non_object_metrics() {
    let dir = tempfile::tempdir().unwrap();
    seed_bank(dir.path());
    let gemini = GeminiClient::new("key".to_string(), "gemini-2.0-flash".to_string());
    let app = test_app(test_config(dir.path()), Some(gemini));

    let response = app
        .oneshot(post_json(
            "/api/feedback/facial",
            json!({ "nonVerbalMetrics": 5 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_api_routes_are_rate_limited_per_ip() {
    let dir = tempfile::tempdir().unwrap();
    seed_bank(dir.path());
    let config = ApiConfig {
        rate_limit_rps: 1,
        rate_limit_burst: 2,
        ..test_config(dir.path())
    };
    let app = test_app(config, None);

    let uri = "/api/questions?technicalDomain=python&questionLevel=beginner&noOfQuestions=1";
    for _ in 0..2 {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.clone().oneshot(get(uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()["retry-after"], "1");

    // Health stays reachable while the API quota is exhausted.
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_responses_carry_request_id_and_security_headers() {
    let dir = tempfile::tempdir().unwrap();
    seed_bank(dir.path());
    let app = test_app(test_config(dir.path()), None);

    let response = app
        .clone()
        .oneshot(get("/health"))
        .await
        .unwrap();
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "trace-me-123")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "trace-me-123");
}
