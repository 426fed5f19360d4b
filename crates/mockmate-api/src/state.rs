//! Shared application state.

use std::sync::Arc;

use anyhow::Context;
use mockmate_vision::{default_detector, LandmarkDetector};
use tracing::{info, warn};

use crate::config::ApiConfig;
use crate::services::{GeminiClient, QuestionBank};

#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub detector: Arc<dyn LandmarkDetector>,
    pub question_bank: Arc<QuestionBank>,
    /// Absent when `GEMINI_API_KEY` is not configured.
    pub gemini: Option<Arc<GeminiClient>>,
}

impl AppState {
    pub fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let question_bank = QuestionBank::load(&config.question_bank_dir).with_context(|| {
            format!(
                "loading question bank from {}",
                config.question_bank_dir.display()
            )
        })?;
        info!("Question bank holds {} domains", question_bank.domain_count());

        let gemini = match &config.gemini_api_key {
            Some(key) => Some(Arc::new(GeminiClient::new(
                key.clone(),
                config.gemini_model.clone(),
            ))),
            None => {
                warn!("GEMINI_API_KEY not set; feedback endpoints are disabled");
                None
            }
        };

        let detector = default_detector();
        info!("Landmark detector: {}", detector.name());

        Ok(Self {
            config,
            detector,
            question_bank: Arc::new(question_bank),
            gemini,
        })
    }
}
