//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::analysis::models::{AnalysisMode, AnalysisReport, AnalysisRequest, ParseStage};
use crate::analysis::resume_text::{
    extract_resume_text, text_preview, PDF_CONTENT_TYPE, TEXT_CONTENT_TYPE,
};
use crate::errors::AppError;
use crate::llm_client::{LlmError, ModelInfo};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeTextRequest {
    pub resume_text: String,
    #[serde(default)]
    pub job_description: Option<String>,
    #[serde(default)]
    pub analysis_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub success: bool,
    pub analysis: Value,
    pub analysis_type: AnalysisMode,
    pub model_used: String,
    pub parse_stage: ParseStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,
}

impl AnalyzeResponse {
    fn from_report(report: AnalysisReport, extracted_text: Option<String>) -> Self {
        Self {
            success: true,
            parse_stage: report.outcome.stage(),
            analysis: report.outcome.into_value(),
            analysis_type: report.mode,
            model_used: report.model_used,
            extracted_text,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelListResponse {
    pub success: bool,
    pub configured: bool,
    pub api_connected: bool,
    pub total_models: usize,
    pub free_models: Vec<ModelInfo>,
    pub qwen_models: Vec<ModelInfo>,
    pub available_qwen_models: Vec<String>,
    pub candidate_models: Vec<String>,
}

struct ResumeUpload {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/analyze-resume
///
/// Multipart form: `resume` (PDF or TXT file), optional `jobDescription`,
/// optional `analysisType` (`general` | `targeted`, default `general`).
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let mut upload: Option<ResumeUpload> = None;
    let mut job_description: Option<String> = None;
    let mut analysis_type: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" => {
                let file_name = field.file_name().unwrap_or("resume").to_string();
                let content_type = field
                    .content_type()
                    .map(String::from)
                    .unwrap_or_else(|| guess_content_type(&file_name).to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid file upload: {e}")))?;
                upload = Some(ResumeUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            "jobDescription" => job_description = Some(read_text_field(field).await?),
            "analysisType" => analysis_type = Some(read_text_field(field).await?),
            _ => {}
        }
    }

    let upload = upload.ok_or_else(|| AppError::Validation("No file uploaded".to_string()))?;
    let mode = parse_mode(analysis_type.as_deref())?;

    info!(
        "Analyzing upload {} ({} bytes, {}) in {} mode",
        upload.file_name,
        upload.bytes.len(),
        upload.content_type,
        mode
    );

    let resume_text = extract_resume_text(&upload.content_type, upload.bytes).await?;
    let preview = text_preview(&resume_text);
    let request = AnalysisRequest::new(resume_text, job_description, mode)?;

    let report = state.analyzer.analyze(&request).await?;

    Ok(Json(AnalyzeResponse::from_report(report, Some(preview))))
}

/// POST /api/analyze
///
/// Same analysis for callers that already hold the resume text.
pub async fn handle_analyze_text(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeTextRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let mode = parse_mode(body.analysis_type.as_deref())?;
    let request = AnalysisRequest::new(body.resume_text, body.job_description, mode)?;

    let report = state.analyzer.analyze(&request).await?;

    Ok(Json(AnalyzeResponse::from_report(report, None)))
}

/// GET /api/list-models
///
/// Queries the completion service's catalogue and reports which free models
/// it offers. An error status from the service is passed through as-is.
pub async fn handle_list_models(
    State(state): State<AppState>,
) -> Result<Json<ModelListResponse>, AppError> {
    let models = state.llm.list_models().await.map_err(|e| match e {
        LlmError::Api { status, message } => AppError::Upstream {
            status,
            details: message,
        },
        other => AppError::from(other),
    })?;

    let free_models: Vec<ModelInfo> = models
        .iter()
        .filter(|m| is_free_candidate(&m.id))
        .cloned()
        .collect();
    let qwen_models: Vec<ModelInfo> = models
        .iter()
        .filter(|m| m.id.contains("qwen"))
        .cloned()
        .collect();
    let available_qwen_models = qwen_models.iter().map(|m| m.id.clone()).collect();

    Ok(Json(ModelListResponse {
        success: true,
        configured: true,
        api_connected: true,
        total_models: models.len(),
        free_models,
        qwen_models,
        available_qwen_models,
        candidate_models: state.analyzer.candidate_models().to_vec(),
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Missing or blank means general.
fn parse_mode(raw: Option<&str>) -> Result<AnalysisMode, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(AnalysisMode::General),
        Some(s) => s
            .parse::<AnalysisMode>()
            .map_err(|e| AppError::Validation(e.to_string())),
    }
}

async fn read_text_field(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid form field: {e}")))
}

fn guess_content_type(file_name: &str) -> &'static str {
    let lower = file_name.to_ascii_lowercase();
    if lower.ends_with(".pdf") {
        PDF_CONTENT_TYPE
    } else if lower.ends_with(".txt") {
        TEXT_CONTENT_TYPE
    } else {
        "application/octet-stream"
    }
}

fn is_free_candidate(model_id: &str) -> bool {
    model_id.contains("free")
        && ["qwen", "llama", "phi", "gemma"]
            .iter()
            .any(|family| model_id.contains(family))
}
