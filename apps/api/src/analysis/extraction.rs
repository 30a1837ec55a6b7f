//! Extraction pipeline — turns a free-text completion into an `AnalysisOutcome`.
//!
//! Stages, first success wins:
//! 1. `parse_embedded_json` — the outermost `{...}` span, lightly repaired, parsed as JSON.
//! 2. `parse_heuristically` — ordered regex rules scrape scores and list sections.
//! 3. `raw_fallback` — the completion text verbatim. Never fails.
//!
//! Heuristic section boundaries overlap and depend on heading vocabulary; texts
//! that use other headings will be mis-segmented. There is no ground truth to
//! fix them against, so the rules stay as they are.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::analysis::list_items::extract_list_items;
use crate::analysis::models::{AnalysisMode, AnalysisOutcome};
use crate::llm_client::preview;

pub const HEURISTIC_NOTE: &str = "Parsed from unstructured AI response";
pub const RAW_FALLBACK_NOTE: &str = "Raw analysis provided due to parsing issues";
pub const RAW_FALLBACK_SCORE: &str = "Analysis completed";

static TRAILING_COMMA_OBJECT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s*\}").unwrap());
static TRAILING_COMMA_ARRAY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s*\]").unwrap());
static UNQUOTED_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([{,]\s*)([A-Za-z0-9_]+):").unwrap());

/// Numeric score, optionally followed by `%` or `/N`.
const SCORE_VALUE: &str = r"([0-9]+(?:\.[0-9]+)?(?:%|\s*/\s*[0-9]+)?)";

/// Runs the three stages over `text`. `model` is recorded only by the raw fallback.
pub fn extract_analysis(text: &str, mode: AnalysisMode, model: &str) -> AnalysisOutcome {
    if let Some(fields) = parse_embedded_json(text) {
        return AnalysisOutcome::Structured(fields);
    }

    if let Some(fields) = parse_heuristically(text, mode) {
        debug!("Heuristic extraction recovered {} fields", fields.len());
        return AnalysisOutcome::Heuristic(fields);
    }

    warn!(
        "No structure recovered from {} response, returning raw text: {}",
        model,
        preview(text, 500)
    );
    AnalysisOutcome::RawFallback(raw_fallback(text, mode, model))
}

// ────────────────────────────────────────────────────────────────────────────
// Stage 1: embedded JSON
// ────────────────────────────────────────────────────────────────────────────

/// Parses the span from the first `{` to the last `}`. Well-formed JSON is taken
/// as-is; only if that fails are trailing commas stripped and bare keys quoted.
/// `None` if there is no span or neither attempt parses to an object.
pub fn parse_embedded_json(text: &str) -> Option<Map<String, Value>> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }

    let span = &text[start..=end];
    if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(span) {
        return Some(fields);
    }

    match serde_json::from_str::<Value>(&repair_json(span)) {
        Ok(Value::Object(fields)) => {
            debug!("Recovered JSON object after repairs");
            Some(fields)
        }
        Ok(_) => None,
        Err(e) => {
            warn!(
                "JSON parsing error from AI response: {e}. Raw response: {}...",
                preview(text, 500)
            );
            None
        }
    }
}

fn repair_json(span: &str) -> String {
    let repaired = TRAILING_COMMA_OBJECT_RE.replace_all(span, "}");
    let repaired = TRAILING_COMMA_ARRAY_RE.replace_all(&repaired, "]");
    let repaired = UNQUOTED_KEY_RE.replace_all(&repaired, r#"${1}"${2}":"#);
    repaired.trim().to_string()
}

// ────────────────────────────────────────────────────────────────────────────
// Stage 2: heuristic rules
// ────────────────────────────────────────────────────────────────────────────

/// Where a rule writes its value.
#[derive(Debug, Clone, Copy)]
enum FieldTarget {
    Top(&'static str),
    JobMatch(&'static str),
}

impl FieldTarget {
    fn insert(self, analysis: &mut Map<String, Value>, value: Value) {
        match self {
            FieldTarget::Top(key) => {
                analysis.insert(key.to_string(), value);
            }
            FieldTarget::JobMatch(key) => {
                let job_match = analysis
                    .entry("jobMatch")
                    .or_insert_with(|| Value::Object(Map::new()));
                if let Value::Object(job_match) = job_match {
                    job_match.insert(key.to_string(), value);
                }
            }
        }
    }
}

#[derive(Debug)]
enum RuleKind {
    /// First capture group becomes a string value.
    Score(Regex),
    /// Text after `heading` up to the first `boundary` match (or end of text)
    /// becomes a list via `extract_list_items`.
    Section { heading: Regex, boundary: Regex },
}

#[derive(Debug)]
struct HeuristicRule {
    target: FieldTarget,
    kind: RuleKind,
    targeted_only: bool,
}

impl HeuristicRule {
    fn score(target: FieldTarget, label: &str, targeted_only: bool) -> Self {
        Self {
            target,
            kind: RuleKind::Score(case_insensitive(&format!("{label}:?\\s*{SCORE_VALUE}"))),
            targeted_only,
        }
    }

    fn section(target: FieldTarget, heading: &str, boundary: &str, targeted_only: bool) -> Self {
        Self {
            target,
            kind: RuleKind::Section {
                heading: case_insensitive(&format!("{heading}:?\\s*")),
                boundary: case_insensitive(boundary),
            },
            targeted_only,
        }
    }

    fn applies_to(&self, mode: AnalysisMode) -> bool {
        !self.targeted_only || mode == AnalysisMode::Targeted
    }

    fn apply(&self, text: &str) -> Option<Value> {
        match &self.kind {
            RuleKind::Score(pattern) => pattern
                .captures(text)
                .and_then(|caps| caps.get(1))
                .map(|m| Value::String(m.as_str().to_string())),
            RuleKind::Section { heading, boundary } => {
                section_body(text, heading, boundary).map(|body| Value::from(extract_list_items(body)))
            }
        }
    }
}

fn case_insensitive(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){pattern}")).unwrap()
}

/// Applied in order; later rules may extend `jobMatch` created by earlier ones.
static HEURISTIC_RULES: Lazy<Vec<HeuristicRule>> = Lazy::new(|| {
    vec![
        HeuristicRule::score(FieldTarget::Top("overallScore"), r"(?:overall score|score)", false),
        HeuristicRule::section(
            FieldTarget::Top("strengths"),
            r"strengths?",
            r"weaknesses?|areas?\s+for\s+improvement|recommendations?",
            false,
        ),
        HeuristicRule::section(
            FieldTarget::Top("weaknesses"),
            r"(?:weaknesses?|areas?\s+for\s+improvement)",
            r"recommendations?|suggestions?|career",
            false,
        ),
        HeuristicRule::section(
            FieldTarget::Top("actionItems"),
            r"(?:recommendations?|suggestions?|action\s+items?)",
            r"career|salary",
            false,
        ),
        HeuristicRule::score(
            FieldTarget::JobMatch("matchScore"),
            r"(?:match\s+score|compatibility)",
            true,
        ),
        HeuristicRule::section(
            FieldTarget::JobMatch("matchingSkills"),
            r"(?:matching\s+skills?|relevant\s+skills?)",
            r"missing|gap|lacking",
            true,
        ),
        HeuristicRule::section(
            FieldTarget::JobMatch("missingSkills"),
            r"(?:missing\s+skills?|gap|lacking|skills?\s+to\s+develop)",
            r"recommendations?",
            true,
        ),
    ]
});

fn section_body<'a>(text: &'a str, heading: &Regex, boundary: &Regex) -> Option<&'a str> {
    let rest = &text[heading.find(text)?.end()..];
    let end = boundary.find(rest).map(|m| m.start()).unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Scrapes named fields out of prose. A field is recorded whenever its heading
/// is found, even if the section yields no items. `None` if no rule fired.
pub fn parse_heuristically(text: &str, mode: AnalysisMode) -> Option<Map<String, Value>> {
    let mut analysis = Map::new();

    for rule in HEURISTIC_RULES.iter().filter(|rule| rule.applies_to(mode)) {
        if let Some(value) = rule.apply(text) {
            rule.target.insert(&mut analysis, value);
        }
    }

    if analysis.is_empty() {
        return None;
    }

    analysis.insert("analysisType".to_string(), Value::from(mode.as_str()));
    analysis.insert("note".to_string(), Value::from(HEURISTIC_NOTE));
    Some(analysis)
}

// ────────────────────────────────────────────────────────────────────────────
// Stage 3: raw passthrough
// ────────────────────────────────────────────────────────────────────────────

pub fn raw_fallback(text: &str, mode: AnalysisMode, model: &str) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("overallScore".to_string(), Value::from(RAW_FALLBACK_SCORE));
    fields.insert("analysis".to_string(), Value::from(text));
    fields.insert("modelUsed".to_string(), Value::from(model));
    fields.insert("analysisType".to_string(), Value::from(mode.as_str()));
    fields.insert("note".to_string(), Value::from(RAW_FALLBACK_NOTE));
    fields
}
