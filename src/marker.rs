//! Completion marker embedded in event descriptions and task notes.
//!
//! The marker is the only record that an item has been dispatched. It is
//! written back to the provider after a successful dispatch and detected by
//! plain substring search on the next run.

/// Prefix that identifies a processed item. Anything after it is informational.
pub const MARKER_PREFIX: &str = "--- google-calendar-dispatch-action";

/// Build the two-line marker recording the workflow run that dispatched the item.
pub fn build_marker(run_url: &str) -> String {
    format!("{}\n[GitHub Actions Run]: {}", MARKER_PREFIX, run_url)
}

/// Check whether a description/notes field already carries the marker.
pub fn has_marker(text: Option<&str>) -> bool {
    match text {
        Some(t) if !t.is_empty() => t.contains(MARKER_PREFIX),
        _ => false,
    }
}

/// Append the marker to existing free text.
///
/// Blank text is replaced by the marker alone. Callers must not call this
/// for items that already carry a marker.
pub fn append_marker(text: Option<&str>, run_url: &str) -> String {
    let marker = build_marker(run_url);
    match text {
        Some(t) if !t.trim().is_empty() => format!("{}\n\n{}", t, marker),
        _ => marker,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RUN_URL: &str = "https://github.com/owner/repo/actions/runs/123";

    #[test]
    fn test_build_marker_format() {
        assert_eq!(
            build_marker(RUN_URL),
            "--- google-calendar-dispatch-action\n\
             [GitHub Actions Run]: https://github.com/owner/repo/actions/runs/123"
        );
    }

    #[test]
    fn test_has_marker_missing_or_empty() {
        assert!(!has_marker(None));
        assert!(!has_marker(Some("")));
        assert!(!has_marker(Some("Weekly sync with the team")));
    }

    #[test]
    fn test_has_marker_anywhere_in_text() {
        assert!(has_marker(Some(MARKER_PREFIX)));
        assert!(has_marker(Some(&format!("notes\n\n{}", build_marker(RUN_URL)))));
        // Only the prefix matters, not what follows it
        assert!(has_marker(Some("before --- google-calendar-dispatch-action after")));
    }

    #[test]
    fn test_append_marker_to_text() {
        let result = append_marker(Some("Agenda: review"), RUN_URL);
        assert_eq!(result, format!("Agenda: review\n\n{}", build_marker(RUN_URL)));
    }

    #[test]
    fn test_append_marker_blank_text() {
        let marker = build_marker(RUN_URL);
        assert_eq!(append_marker(None, RUN_URL), marker);
        assert_eq!(append_marker(Some(""), RUN_URL), marker);
        assert_eq!(append_marker(Some("  \n\t "), RUN_URL), marker);
    }

    #[test]
    fn test_append_then_detect() {
        for text in [None, Some(""), Some("   "), Some("body"), Some("```json\n{}\n```")] {
            assert!(has_marker(Some(&append_marker(text, RUN_URL))));
        }
    }
}
