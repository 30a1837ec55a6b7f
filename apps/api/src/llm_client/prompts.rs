// Cross-cutting prompt fragments shared by every prompt sent to the completion service.

/// Appended to every analysis prompt to bias the model toward parseable output.
pub const JSON_ONLY_INSTRUCTION: &str = r#"

IMPORTANT: Respond with valid JSON only. Do not include any text before or after the JSON. Ensure all strings are properly quoted and all arrays/objects are properly formatted. The JSON must be parseable.

Example format:
{
  "overallScore": "85/100",
  "strengths": ["Strong technical skills", "Good education background"],
  "weaknesses": ["Limited work experience", "Missing certifications"],
  "actionItems": ["Add more projects", "Get certified"],
  "marketability": "High potential with improvements"
}"#;
