//! Normalized set difference between two catalogs.

use std::collections::HashSet;

use crate::models::{Catalog, DiffResult};

/// Every name in `source` whose match key does not occur in `reference`,
/// in the order the source catalog first saw them.
pub fn diff_catalogs(source: &Catalog, reference: &Catalog) -> DiffResult {
    let reference_keys: HashSet<&str> = reference.keys().collect();

    let missing = source
        .names()
        .iter()
        .filter(|name| !reference_keys.contains(name.key()))
        .cloned()
        .collect();

    DiffResult::new(missing)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(names: &[&str]) -> Catalog {
        Catalog::from_raw("test", "https://example.com", names.iter().copied())
    }

    #[test]
    fn test_both_empty() {
        let diff = diff_catalogs(&catalog(&[]), &catalog(&[]));
        assert!(diff.is_empty());
    }

    #[test]
    fn test_single_name_missing() {
        let diff = diff_catalogs(&catalog(&["Slack"]), &catalog(&[]));
        assert_eq!(diff.display_names(), vec!["Slack"]);
    }

    #[test]
    fn test_single_name_present() {
        let diff = diff_catalogs(&catalog(&["Slack"]), &catalog(&["Slack"]));
        assert!(diff.is_empty());
    }

    #[test]
    fn test_case_and_whitespace_are_equal() {
        let diff = diff_catalogs(
            &catalog(&["Slack", "Google Sheets", "Notion"]),
            &catalog(&["  SLACK", "google   sheets "]),
        );
        assert_eq!(diff.display_names(), vec!["Notion"]);
    }

    #[test]
    fn test_many_names_keep_source_order() {
        let diff = diff_catalogs(
            &catalog(&["Zoom", "Airtable", "Monday.com", "Asana", "HubSpot"]),
            &catalog(&["asana", "Trello"]),
        );
        assert_eq!(diff.display_names(), vec!["Zoom", "Airtable", "Monday.com", "HubSpot"]);
    }

    #[test]
    fn test_identical_catalogs_diff_empty() {
        let names = ["Slack", "Notion", "Gmail"];
        let diff = diff_catalogs(&catalog(&names), &catalog(&names));
        assert!(diff.is_empty());
    }

    #[test]
    fn test_empty_reference_returns_deduplicated_source() {
        let source = catalog(&["Slack", "slack ", "Notion", "NOTION"]);
        let diff = diff_catalogs(&source, &catalog(&[]));
        assert_eq!(diff.display_names(), vec!["Slack", "Notion"]);
        assert_eq!(diff.names(), source.names());
    }

    #[test]
    fn test_diff_is_idempotent() {
        let source = catalog(&["Slack", "Notion", "Linear"]);
        let reference = catalog(&["linear"]);
        assert_eq!(diff_catalogs(&source, &reference), diff_catalogs(&source, &reference));
    }

    #[test]
    fn test_end_to_end_example() {
        let source = catalog(&["Slack", "slack ", "Notion"]);
        assert_eq!(source.display_names(), vec!["Slack", "Notion"]);
        let diff = diff_catalogs(&source, &catalog(&["notion"]));
        assert_eq!(diff.display_names(), vec!["Slack"]);
    }
}
