// Prompt templates for resume analysis.
// Both templates get llm_client::prompts::JSON_ONLY_INSTRUCTION appended.

use crate::analysis::models::{AnalysisMode, AnalysisRequest};
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;

/// General critique. Replace `{resume_text}` before sending.
pub const GENERAL_PROMPT_TEMPLATE: &str = r#"As an expert career coach, analyze the following resume and provide comprehensive feedback:

RESUME CONTENT:
{resume_text}

Please provide a detailed analysis in the following JSON format:
{
  "overallScore": "Score out of 10",
  "strengths": ["List of key strengths"],
  "weaknesses": ["List of areas for improvement"],
  "skillsAnalysis": {
    "technical": ["technical skills found"],
    "soft": ["soft skills found"],
    "missing": ["important skills that are missing"]
  },
  "careerSuggestions": {
    "currentLevel": "Junior/Mid/Senior level assessment",
    "suitableRoles": ["List of job roles that match the profile"],
    "careerPath": ["Suggested career progression steps"],
    "industryFit": ["Industries where this profile would be strong"]
  },
  "improvements": {
    "format": ["formatting improvements"],
    "content": ["content improvements"],
    "keywords": ["important keywords to add"]
  },
  "actionItems": ["Specific actionable recommendations"],
  "marketability": "Assessment of how marketable this candidate is",
  "salaryRange": "Estimated salary range based on skills and experience"
}"#;

/// Critique against a specific job. Replace `{resume_text}` and `{job_description}` before sending.
pub const TARGETED_PROMPT_TEMPLATE: &str = r#"As an expert career coach, analyze this resume against the specific job description provided:

RESUME CONTENT:
{resume_text}

JOB DESCRIPTION:
{job_description}

Please provide a detailed targeted analysis in the following JSON format:
{
  "overallScore": "Score out of 10",
  "strengths": ["List of key strengths relevant to this job"],
  "weaknesses": ["List of areas for improvement for this role"],
  "skillsAnalysis": {
    "technical": ["technical skills found that match the job"],
    "soft": ["soft skills found that match the job"],
    "missing": ["important skills required by the job that are missing"]
  },
  "jobMatch": {
    "matchScore": "Percentage match for this specific job",
    "matchingSkills": ["Skills that directly match job requirements"],
    "missingSkills": ["Required skills not found in resume"],
    "recommendations": ["Specific steps to improve candidacy for this role"]
  },
  "careerSuggestions": {
    "currentLevel": "Assessment relative to job requirements",
    "readiness": "How ready the candidate is for this role",
    "preparationSteps": ["Steps to become job-ready"]
  },
  "improvements": {
    "resumeOptimization": ["How to optimize resume for this job"],
    "keywordsToAdd": ["Important keywords from job description to include"],
    "sectionsToEnhance": ["Resume sections that need improvement for this role"]
  },
  "actionItems": ["Specific actionable recommendations for this job application"],
  "interviewPrep": ["Key areas to focus on for interview preparation"],
  "salaryNegotiation": "Advice for salary negotiation based on match level"
}"#;

/// Builds the single user prompt for `request`.
///
/// The targeted template is only used when a job description is present.
pub fn build_analysis_prompt(request: &AnalysisRequest) -> String {
    let mut prompt = match (request.mode, request.job_description.as_deref()) {
        (AnalysisMode::Targeted, Some(job_description)) => TARGETED_PROMPT_TEMPLATE
            .replace("{resume_text}", &request.resume_text)
            .replace("{job_description}", job_description),
        _ => GENERAL_PROMPT_TEMPLATE.replace("{resume_text}", &request.resume_text),
    };
    prompt.push_str(JSON_ONLY_INSTRUCTION);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(mode: AnalysisMode, jd: Option<&str>) -> AnalysisRequest {
        AnalysisRequest {
            resume_text: "Jane Doe\nSenior Rust Engineer".to_string(),
            job_description: jd.map(String::from),
            mode,
        }
    }

    #[test]
    fn test_general_prompt_requests_career_suggestions() {
        let prompt = build_analysis_prompt(&request(AnalysisMode::General, None));
        assert!(prompt.contains("Jane Doe\nSenior Rust Engineer"));
        assert!(prompt.contains("suitableRoles"));
        assert!(prompt.contains("industryFit"));
        assert!(!prompt.contains("jobMatch"));
        assert!(!prompt.contains("{resume_text}"));
    }

    #[test]
    fn test_targeted_prompt_embeds_job_description() {
        let prompt = build_analysis_prompt(&request(
            AnalysisMode::Targeted,
            Some("Backend engineer, Kafka required"),
        ));
        assert!(prompt.contains("JOB DESCRIPTION:\nBackend engineer, Kafka required"));
        assert!(prompt.contains("\"matchScore\""));
        assert!(prompt.contains("interviewPrep"));
        assert!(prompt.contains("salaryNegotiation"));
        assert!(!prompt.contains("{job_description}"));
    }

    #[test]
    fn test_targeted_without_job_description_uses_general_template() {
        let prompt = build_analysis_prompt(&request(AnalysisMode::Targeted, None));
        assert!(prompt.contains("suitableRoles"));
        assert!(!prompt.contains("JOB DESCRIPTION:"));
    }

    #[test]
    fn test_both_templates_end_with_json_instruction() {
        for mode in [AnalysisMode::General, AnalysisMode::Targeted] {
            let prompt = build_analysis_prompt(&request(mode, Some("Any role")));
            assert!(prompt.contains("Respond with valid JSON only"));
            assert!(prompt.trim_end().ends_with('}'));
        }
    }
}
