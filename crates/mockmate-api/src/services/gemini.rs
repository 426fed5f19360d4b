//! Gemini REST client for feedback composition.
//!
//! The client asks for `application/json` replies, but models still wrap
//! output in markdown fences now and then; [`strip_code_fences`] undoes
//! that. Replies are passed through to the caller verbatim, the server
//! does not re-parse what the model produced.

use mockmate_models::{FacialMetrics, ScoredAnswer};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Tried in order after the configured model.
const FALLBACK_MODELS: &[&str] = &["gemini-2.5-flash", "gemini-2.0-flash-lite"];

pub struct GeminiClient {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Deserialize)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_base_url(api_key, model, GEMINI_BASE_URL.to_string())
    }

    /// Override the API host, for tests against a local mock.
    pub fn with_base_url(api_key: String, model: String, base_url: String) -> Self {
        Self {
            api_key,
            model,
            base_url,
            client: reqwest::Client::new(),
        }
    }

    /// Send `prompt` and return the model's JSON reply with any markdown
    /// fences removed. Falls through the model list on failure.
    pub async fn generate_json(&self, prompt: &str) -> ApiResult<String> {
        let mut last_error: Option<ApiError> = None;

        for model in self.candidate_models() {
            info!("Requesting Gemini completion with model {}", model);
            match self.try_model(&model, prompt).await {
                Ok(text) => return Ok(strip_code_fences(&text).to_string()),
                Err(e) => {
                    warn!("Gemini model {} failed: {}", model, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ApiError::upstream("no Gemini model available")))
    }

    fn candidate_models(&self) -> Vec<String> {
        let mut models = vec![self.model.clone()];
        for fallback in FALLBACK_MODELS {
            if *fallback != self.model {
                models.push((*fallback).to_string());
            }
        }
        models
    }

    async fn try_model(&self, model: &str, prompt: &str) -> ApiResult<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        );

        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::upstream(format!("Gemini request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::upstream(format!(
                "Gemini returned {status}: {body}"
            )));
        }

        let reply: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ApiError::upstream(format!("Gemini reply decode failed: {e}")))?;

        reply
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .ok_or_else(|| ApiError::upstream("Gemini reply contained no candidates"))
    }
}

/// Remove a wrapping ```json ... ``` (or bare ```) fence, if present.
/// Backticks inside the body are left alone.
pub fn strip_code_fences(text: &str) -> &str {
    let mut text = text.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Prompt for grading a spoken answer, built on the keypoint scoring
/// result so the model works from the same detected/missing split the
/// platform stores.
pub fn verbal_feedback_prompt(scored: &ScoredAnswer) -> ApiResult<String> {
    let record = serde_json::to_string_pretty(scored)
        .map_err(|e| ApiError::internal(format!("failed to encode scored answer: {e}")))?;

    Ok(format!(
        "You are grading a mock-interview answer. Here is the question record \
         with the candidate's transcribed answer and a keypoint scan:\n\n{record}\n\n\
         Review the answer yourself. Reply with strict JSON only (no markdown, \
         no commentary) in exactly this shape:\n\
         {{\n\
           \"detected_keypoints\": [string],\n\
           \"missing_keypoints\": [string],\n\
           \"feedback\": string,\n\
           \"rating\": {{\"length\": number, \"keypoints\": number}},\n\
           \"rating_average\": number\n\
         }}\n\
         `feedback` is plain text addressed to the candidate: what was covered, \
         what was missed, and how to improve. Both ratings are out of 10; \
         `length` judges whether the answer's length fits the question, \
         `keypoints` judges keypoint coverage. `rating_average` is their mean."
    ))
}

/// Prompt for summarizing aggregated non-verbal (facial) metrics.
pub fn facial_feedback_prompt(metrics: &FacialMetrics) -> ApiResult<String> {
    let record = serde_json::to_string_pretty(metrics)
        .map_err(|e| ApiError::internal(format!("failed to encode facial metrics: {e}")))?;

    Ok(format!(
        "These are aggregated non-verbal metrics from a mock interview: \
         per-signal percentages of eye direction, head direction, and mouth \
         activity over the whole session:\n\n{record}\n\n\
         Reply with strict JSON only (no markdown, no commentary) in exactly \
         this shape:\n\
         {{\n\
           \"nonVerbalFeedback\": {{\"Confident\": string, \"Distracted\": string, \"Nervous\": string}},\n\
           \"nonVerbalScore\": number\n\
         }}\n\
         Each feedback value is one or two plain-text sentences about that \
         trait as evidenced by the metrics. `nonVerbalScore` is an overall \
         score out of 10."
    ))
}
