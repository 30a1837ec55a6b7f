use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::errors::AppError;

/// Which prompt template to use and which job-match fields to look for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    #[default]
    General,
    Targeted,
}

impl AnalysisMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMode::General => "general",
            AnalysisMode::Targeted => "targeted",
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("Unknown analysis type '{0}'. Expected 'general' or 'targeted'.")]
pub struct UnknownModeError(pub String);

impl FromStr for AnalysisMode {
    type Err = UnknownModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "general" => Ok(AnalysisMode::General),
            "targeted" => Ok(AnalysisMode::Targeted),
            _ => Err(UnknownModeError(s.to_string())),
        }
    }
}

/// One analysis call. Built per request and dropped once the report is produced.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub resume_text: String,
    pub job_description: Option<String>,
    pub mode: AnalysisMode,
}

impl AnalysisRequest {
    /// Validates caller input: resume text must be non-blank and targeted mode
    /// needs a job description. A blank job description is treated as absent.
    pub fn new(
        resume_text: impl Into<String>,
        job_description: Option<String>,
        mode: AnalysisMode,
    ) -> Result<Self, AppError> {
        let resume_text = resume_text.into();
        if resume_text.trim().is_empty() {
            return Err(AppError::Validation(
                "No text content found in the resume".to_string(),
            ));
        }

        let job_description = job_description.filter(|jd| !jd.trim().is_empty());
        if mode == AnalysisMode::Targeted && job_description.is_none() {
            return Err(AppError::Validation(
                "A job description is required for targeted analysis".to_string(),
            ));
        }

        Ok(Self {
            resume_text,
            job_description,
            mode,
        })
    }
}

/// Which extraction stage produced the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseStage {
    Structured,
    Heuristic,
    Raw,
}

/// Result of the extraction pipeline, tagged by the stage that won.
///
/// The field set is free-form in every variant: consumers must treat each key
/// as optional and check its shape before use.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// The completion contained a (possibly repaired) JSON object.
    Structured(Map<String, Value>),
    /// Fields scraped from prose; always carries `analysisType` and `note`.
    Heuristic(Map<String, Value>),
    /// Nothing recognisable; the raw text under `analysis`.
    RawFallback(Map<String, Value>),
}

impl AnalysisOutcome {
    pub fn stage(&self) -> ParseStage {
        match self {
            AnalysisOutcome::Structured(_) => ParseStage::Structured,
            AnalysisOutcome::Heuristic(_) => ParseStage::Heuristic,
            AnalysisOutcome::RawFallback(_) => ParseStage::Raw,
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        match self {
            AnalysisOutcome::Structured(fields)
            | AnalysisOutcome::Heuristic(fields)
            | AnalysisOutcome::RawFallback(fields) => fields,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            AnalysisOutcome::Structured(fields)
            | AnalysisOutcome::Heuristic(fields)
            | AnalysisOutcome::RawFallback(fields) => Value::Object(fields),
        }
    }
}

/// What the analyzer hands back to callers.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub model_used: String,
    pub mode: AnalysisMode,
    pub outcome: AnalysisOutcome,
}
