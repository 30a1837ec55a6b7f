use std::sync::Arc;

use crate::analysis::analyzer::ResumeAnalyzer;
use crate::config::Config;
use crate::llm_client::CompletionClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: ResumeAnalyzer,
    /// Same client the analyzer uses; handlers reach it for the model catalogue.
    pub llm: Arc<dyn CompletionClient>,
    pub config: Config,
}

impl AppState {
    pub fn new(llm: Arc<dyn CompletionClient>, config: Config) -> Self {
        let analyzer = ResumeAnalyzer::new(llm.clone(), config.candidate_models.clone());
        Self {
            analyzer,
            llm,
            config,
        }
    }
}
