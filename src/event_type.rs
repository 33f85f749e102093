//! `{event_type: ...}` override tag parsing.

use std::sync::OnceLock;

use regex::Regex;

fn re_event_type() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{event_type:\s*([a-zA-Z0-9_-]+)\s*\}").unwrap())
}

fn find_tag(text: Option<&str>) -> Option<&str> {
    let caps = re_event_type().captures(text?)?;
    caps.get(1).map(|m| m.as_str())
}

/// Resolve the dispatch event type for an item.
///
/// Priority: tag in title, then tag in description, then `default_value`.
/// The leftmost tag wins within a field.
pub fn extract_event_type(
    title: Option<&str>,
    description: Option<&str>,
    default_value: &str,
) -> String {
    find_tag(title)
        .or_else(|| find_tag(description))
        .unwrap_or(default_value)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_tag() {
        assert_eq!(
            extract_event_type(Some("Deploy {event_type: deploy-prod}"), None, "calendar-dispatch"),
            "deploy-prod"
        );
    }

    #[test]
    fn test_description_tag() {
        assert_eq!(
            extract_event_type(Some("Nightly"), Some("run {event_type:nightly_build}"), "x"),
            "nightly_build"
        );
    }

    #[test]
    fn test_title_wins_over_description() {
        assert_eq!(
            extract_event_type(
                Some("{event_type: from-title}"),
                Some("{event_type: from-description}"),
                "x"
            ),
            "from-title"
        );
    }

    #[test]
    fn test_leftmost_tag_wins() {
        assert_eq!(
            extract_event_type(Some("{event_type: first} {event_type: second}"), None, "x"),
            "first"
        );
    }

    #[test]
    fn test_interior_whitespace_trimmed() {
        assert_eq!(
            extract_event_type(Some("{event_type:   spaced   }"), None, "x"),
            "spaced"
        );
    }

    #[test]
    fn test_default_when_absent() {
        assert_eq!(extract_event_type(None, None, "calendar-dispatch"), "calendar-dispatch");
        assert_eq!(
            extract_event_type(Some("Standup"), Some("no tag here"), "calendar-dispatch"),
            "calendar-dispatch"
        );
    }

    #[test]
    fn test_invalid_token_characters_ignored() {
        // '.' is outside the token alphabet, so the tag does not match
        assert_eq!(extract_event_type(Some("{event_type: a.b}"), None, "fallback"), "fallback");
        assert_eq!(extract_event_type(Some("{event_type: }"), None, "fallback"), "fallback");
    }
}
