//! List-item extraction from loosely formatted section bodies.

use once_cell::sync::Lazy;
use regex::Regex;

pub const MAX_LIST_ITEMS: usize = 10;

/// Items this short are treated as noise.
const MIN_ITEM_CHARS: usize = 6;

/// Line patterns tried in order; the first that yields a usable item wins.
/// The last one accepts any non-empty line.
static LINE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?m)^\s*[-•*]\s*(.+)$").unwrap(),
        Regex::new(r"(?m)^\s*[0-9]+\.\s*(.+)$").unwrap(),
        Regex::new(r"(?m)^\s*[▪▫◦‣⁃]\s*(.+)$").unwrap(),
        Regex::new(r"(?m)^(.+)$").unwrap(),
    ]
});

/// Returns up to ten trimmed list items from `text`, in order of appearance.
///
/// Items containing a colon are dropped as stray headings.
pub fn extract_list_items(text: &str) -> Vec<String> {
    for pattern in LINE_PATTERNS.iter() {
        let items: Vec<String> = pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .filter(|item| is_list_item(item))
            .take(MAX_LIST_ITEMS)
            .map(String::from)
            .collect();

        if !items.is_empty() {
            return items;
        }
    }

    Vec::new()
}

fn is_list_item(item: &str) -> bool {
    item.chars().count() >= MIN_ITEM_CHARS && !item.contains(':')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hyphen_bullets_in_order() {
        let text = "- Strong communicator\n-   Detail oriented  \n- Ships on time\n";
        assert_eq!(
            extract_list_items(text),
            vec!["Strong communicator", "Detail oriented", "Ships on time"]
        );
    }

    #[test]
    fn test_star_and_dot_bullets() {
        let text = "* Led migration to Kubernetes\n• Mentored four engineers";
        assert_eq!(
            extract_list_items(text),
            vec!["Led migration to Kubernetes", "Mentored four engineers"]
        );
    }

    #[test]
    fn test_numbered_list() {
        let text = "1. Add quantified results\n2. Trim the summary\n10. Remove photo";
        assert_eq!(
            extract_list_items(text),
            vec!["Add quantified results", "Trim the summary", "Remove photo"]
        );
    }

    #[test]
    fn test_unicode_bullets() {
        let text = "▪ Clear formatting\n◦ Relevant keywords";
        assert_eq!(
            extract_list_items(text),
            vec!["Clear formatting", "Relevant keywords"]
        );
    }

    #[test]
    fn test_plain_lines_fallback() {
        let text = "Good use of action verbs\n\nConsistent tense throughout\n";
        assert_eq!(
            extract_list_items(text),
            vec!["Good use of action verbs", "Consistent tense throughout"]
        );
    }

    #[test]
    fn test_short_and_colon_items_excluded() {
        let text = "- Short\n- Tools: Rust, Go\n- Solid system design skills\n- abcde";
        assert_eq!(extract_list_items(text), vec!["Solid system design skills"]);
    }

    #[test]
    fn test_six_char_item_kept() {
        assert_eq!(extract_list_items("- Python"), vec!["Python"]);
        assert!(extract_list_items("Rusty").is_empty());
    }

    #[test]
    fn test_caps_at_ten_items() {
        let text: String = (1..=15).map(|i| format!("- Item number {i}\n")).collect();
        let items = extract_list_items(&text);
        assert_eq!(items.len(), MAX_LIST_ITEMS);
        assert_eq!(items[0], "Item number 1");
        assert_eq!(items[9], "Item number 10");
    }

    #[test]
    fn test_falls_through_when_bullets_all_filtered() {
        // The only bullet is too short, so plain lines are used instead.
        let text = "- Ok\nDemonstrated ownership of releases";
        assert_eq!(
            extract_list_items(text),
            vec!["Demonstrated ownership of releases"]
        );
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        assert!(extract_list_items("").is_empty());
        assert!(extract_list_items("\n\n  \n").is_empty());
    }
}
