//! Resume analyzer — builds the prompt, walks the candidate model list, and
//! hands the first usable completion to the extraction pipeline.
//!
//! Candidates are tried strictly in order, one call at a time, with no retries
//! beyond the list itself.

use std::sync::Arc;

use tracing::{info, warn};

use crate::analysis::extraction::extract_analysis;
use crate::analysis::models::{AnalysisReport, AnalysisRequest};
use crate::analysis::prompts::build_analysis_prompt;
use crate::llm_client::{CompletionClient, CompletionRequest, LlmError};

pub const TEMPERATURE: f32 = 0.7;
pub const MAX_TOKENS: u32 = 1500;

#[derive(Clone)]
pub struct ResumeAnalyzer {
    client: Arc<dyn CompletionClient>,
    candidate_models: Vec<String>,
}

impl ResumeAnalyzer {
    pub fn new(client: Arc<dyn CompletionClient>, candidate_models: Vec<String>) -> Self {
        Self {
            client,
            candidate_models,
        }
    }

    pub fn candidate_models(&self) -> &[String] {
        &self.candidate_models
    }

    /// Runs one analysis.
    ///
    /// Unavailable models are skipped. Any other failure moves on to the next
    /// candidate unless it was the last one, in which case that error is
    /// returned. A missing credential stops immediately. Once a completion
    /// arrives the call succeeds; parsing problems only change the outcome variant.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReport, LlmError> {
        let prompt = build_analysis_prompt(request);
        let last_index = self.candidate_models.len().saturating_sub(1);

        for (index, model) in self.candidate_models.iter().enumerate() {
            info!("Trying model: {model}");

            let completion = CompletionRequest {
                model,
                prompt: &prompt,
                temperature: TEMPERATURE,
                max_tokens: MAX_TOKENS,
            };

            match self.client.complete(&completion).await {
                Ok(text) => {
                    info!("Successfully used model: {model}");
                    let outcome = extract_analysis(&text, request.mode, model);
                    info!(
                        "Extracted {} fields ({:?} stage)",
                        outcome.fields().len(),
                        outcome.stage()
                    );
                    return Ok(AnalysisReport {
                        model_used: model.clone(),
                        mode: request.mode,
                        outcome,
                    });
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) if e.is_model_unavailable() => {
                    warn!("Model {model} is unavailable, trying next candidate");
                }
                Err(e) if index == last_index => {
                    warn!("Error with model {model}: {e}");
                    return Err(e);
                }
                Err(e) => {
                    warn!("Error with model {model}: {e}");
                }
            }
        }

        Err(LlmError::AllModelsFailed {
            attempted: self.candidate_models.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::analysis::models::{AnalysisMode, ParseStage};
    use crate::llm_client::{classify_completion, ModelInfo};

    /// Scripted client: each model maps to a (status, body) pair run through the
    /// real response classifier. Unscripted models answer 404.
    #[derive(Default)]
    struct ScriptedClient {
        responses: HashMap<String, (u16, String)>,
        calls: Mutex<Vec<String>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedClient {
        fn respond(mut self, model: &str, status: u16, body: &str) -> Self {
            self.responses
                .insert(model.to_string(), (status, body.to_string()));
            self
        }

        fn completion(mut self, model: &str, content: &str) -> Self {
            let body = json!({"choices": [{"message": {"role": "assistant", "content": content}}]});
            self.responses
                .insert(model.to_string(), (200, body.to_string()));
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError> {
            self.calls.lock().unwrap().push(request.model.to_string());
            self.prompts.lock().unwrap().push(request.prompt.to_string());
            assert!((request.temperature - TEMPERATURE).abs() < f32::EPSILON);
            assert_eq!(request.max_tokens, MAX_TOKENS);

            let (status, body) = self
                .responses
                .get(request.model)
                .cloned()
                .unwrap_or((404, "model not found".to_string()));
            classify_completion(request.model, status, &body)
        }

        async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError> {
            Ok(vec![])
        }
    }

    struct UnconfiguredClient;

    #[async_trait]
    impl CompletionClient for UnconfiguredClient {
        async fn complete(&self, _request: &CompletionRequest<'_>) -> Result<String, LlmError> {
            Err(LlmError::MissingApiKey)
        }

        async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError> {
            Err(LlmError::MissingApiKey)
        }
    }

    fn models() -> Vec<String> {
        vec!["first".to_string(), "second".to_string(), "third".to_string()]
    }

    fn general_request() -> AnalysisRequest {
        AnalysisRequest::new("Jane Doe\nRust engineer", None, AnalysisMode::General).unwrap()
    }

    #[tokio::test]
    async fn test_first_success_stops_the_loop() {
        let client = Arc::new(
            ScriptedClient::default()
                .completion("first", r#"{"overallScore": "8/10"}"#)
                .completion("second", r#"{"overallScore": "1/10"}"#),
        );
        let analyzer = ResumeAnalyzer::new(client.clone(), models());

        let report = analyzer.analyze(&general_request()).await.unwrap();

        assert_eq!(client.calls(), vec!["first"]);
        assert_eq!(report.model_used, "first");
        assert_eq!(report.outcome.stage(), ParseStage::Structured);
        assert_eq!(report.outcome.fields()["overallScore"], json!("8/10"));
    }

    #[tokio::test]
    async fn test_not_found_skips_to_next_candidate() {
        let client = Arc::new(
            ScriptedClient::default()
                .respond("first", 404, "")
                .completion("second", "Strengths:\n- Clear formatting\n"),
        );
        let analyzer = ResumeAnalyzer::new(client.clone(), models());

        let report = analyzer.analyze(&general_request()).await.unwrap();

        assert_eq!(client.calls(), vec!["first", "second"]);
        assert_eq!(report.model_used, "second");
        assert_eq!(report.outcome.stage(), ParseStage::Heuristic);
    }

    #[tokio::test]
    async fn test_all_not_found_is_exhaustion() {
        let client = Arc::new(ScriptedClient::default());
        let analyzer = ResumeAnalyzer::new(client.clone(), models());

        let err = analyzer.analyze(&general_request()).await.unwrap_err();

        assert!(matches!(err, LlmError::AllModelsFailed { attempted: 3 }));
        assert_eq!(client.calls(), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_transport_error_on_non_last_candidate_continues() {
        let client = Arc::new(
            ScriptedClient::default()
                .respond("first", 500, "<!DOCTYPE html><html>oops</html>")
                .respond("second", 200, r#"{"choices": []}"#)
                .completion("third", "The quick brown fox"),
        );
        let analyzer = ResumeAnalyzer::new(client.clone(), models());

        let report = analyzer.analyze(&general_request()).await.unwrap();

        assert_eq!(client.calls().len(), 3);
        assert_eq!(report.model_used, "third");
        assert_eq!(report.outcome.stage(), ParseStage::Raw);
        assert_eq!(report.outcome.fields()["modelUsed"], json!("third"));
    }

    #[tokio::test]
    async fn test_error_on_last_candidate_is_surfaced() {
        let client = Arc::new(
            ScriptedClient::default()
                .respond("first", 404, "")
                .respond("second", 404, "")
                .respond("third", 503, "upstream overloaded"),
        );
        let analyzer = ResumeAnalyzer::new(client, models());

        let err = analyzer.analyze(&general_request()).await.unwrap_err();

        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "upstream overloaded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_credential_stops_immediately() {
        let analyzer = ResumeAnalyzer::new(Arc::new(UnconfiguredClient), models());
        let err = analyzer.analyze(&general_request()).await.unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey));
    }

    #[tokio::test]
    async fn test_empty_candidate_list_is_exhaustion() {
        let analyzer = ResumeAnalyzer::new(Arc::new(ScriptedClient::default()), vec![]);
        let err = analyzer.analyze(&general_request()).await.unwrap_err();
        assert!(matches!(err, LlmError::AllModelsFailed { attempted: 0 }));
    }

    #[tokio::test]
    async fn test_targeted_prompt_sent_and_mode_recorded() {
        let client = Arc::new(
            ScriptedClient::default().completion("first", "Compatibility: 65%\nGap:\n- Terraform modules\n"),
        );
        let analyzer = ResumeAnalyzer::new(client.clone(), models());
        let request = AnalysisRequest::new(
            "Jane Doe\nRust engineer",
            Some("Platform engineer, Terraform required".to_string()),
            AnalysisMode::Targeted,
        )
        .unwrap();

        let report = analyzer.analyze(&request).await.unwrap();

        let prompts = client.prompts.lock().unwrap().clone();
        assert!(prompts[0].contains("Platform engineer, Terraform required"));
        assert_eq!(report.mode, AnalysisMode::Targeted);
        let fields = report.outcome.fields();
        assert_eq!(fields["jobMatch"]["matchScore"], json!("65%"));
        assert_eq!(fields["jobMatch"]["missingSkills"], json!(["Terraform modules"]));
    }
}
