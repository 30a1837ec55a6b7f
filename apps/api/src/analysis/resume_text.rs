//! Resume text extraction from uploaded files (PDF or plain text).

use tracing::error;

use crate::errors::AppError;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const TEXT_CONTENT_TYPE: &str = "text/plain";

const PREVIEW_CHARS: usize = 500;

/// Extracts text from an uploaded resume.
///
/// PDF parsing is CPU-bound and runs on the blocking pool.
pub async fn extract_resume_text(content_type: &str, bytes: Vec<u8>) -> Result<String, AppError> {
    let text = match normalize_content_type(content_type).as_str() {
        PDF_CONTENT_TYPE => tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&bytes)
        })
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in PDF parsing: {e}")))?
        .map_err(|e| {
            error!("PDF parsing error: {e}");
            AppError::Validation("Failed to parse PDF".to_string())
        })?,
        TEXT_CONTENT_TYPE => String::from_utf8_lossy(&bytes).into_owned(),
        _ => {
            return Err(AppError::UnsupportedMediaType(
                "Unsupported file type. Please upload PDF or TXT files.".to_string(),
            ))
        }
    };

    if text.trim().is_empty() {
        return Err(AppError::Validation(
            "No text content found in the file".to_string(),
        ));
    }

    Ok(text)
}

/// Strips parameters such as `; charset=utf-8`.
fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// First 500 characters followed by `...`, returned alongside results.
pub fn text_preview(text: &str) -> String {
    let head: String = text.chars().take(PREVIEW_CHARS).collect();
    format!("{head}...")
}
