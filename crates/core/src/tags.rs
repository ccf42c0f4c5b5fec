//! Tag normalization and expansion.
//!
//! Tags on medicine records are drawn from a small controlled vocabulary,
//! but upstream sources (OCR output, older exports, manual entry) spell
//! them inconsistently. Before a record is stored its tags pass through two
//! steps:
//!
//! 1. **Normalization**: known synonym spellings collapse to their canonical
//!    form. Unrecognised tags pass through unchanged (the vocabulary is
//!    open-world at this stage; allow-list filtering is a separate concern).
//! 2. **Expansion**: tags that imply other tags pull them in from a fixed
//!    implication table. A specific symptom implies the general symptom and
//!    the matching mechanism-of-action tag.
//!
//! Both tables are static lookup data rather than a rules engine. The
//! vocabulary is small and fixed, which keeps every function here total,
//! pure, and deterministic.

/// Synonym spellings mapped to their canonical tag.
///
/// Lookup is case-sensitive: the keys are the exact spellings emitted by
/// upstream sources.
const TAG_SYNONYMS: &[(&str, &str)] = &[
    ("p/bólowy", "przeciwbólowy"),
    ("p/gorączkowy", "przeciwgorączkowy"),
    ("p/zapalny", "przeciwzapalny"),
    ("p/alergiczny", "przeciwalergiczny"),
    ("przeciwbólowe", "przeciwbólowy"),
    ("przeciwgorączkowe", "przeciwgorączkowy"),
    ("przeciwzapalne", "przeciwzapalny"),
    ("na ból głowy", "ból głowy"),
    ("na gorączkę", "gorączka"),
    ("na kaszel", "kaszel"),
    ("na katar", "katar"),
];

/// Implied tags added during expansion.
///
/// Every entry is listed transitively closed (a specific symptom names the
/// general symptom and the mechanism tag directly), so a single expansion
/// pass reaches the closure.
const TAG_IMPLICATIONS: &[(&str, &[&str])] = &[
    ("ból głowy", &["ból", "przeciwbólowy"]),
    ("ból gardła", &["ból", "przeciwbólowy"]),
    ("ból brzucha", &["ból"]),
    ("migrena", &["ból głowy", "ból", "przeciwbólowy"]),
    ("gorączka", &["przeciwgorączkowy"]),
    ("kaszel suchy", &["kaszel", "przeciwkaszlowy"]),
    ("kaszel mokry", &["kaszel", "wykrztuśny"]),
    ("biegunka", &["przeciwbiegunkowy"]),
    ("alergia", &["przeciwalergiczny"]),
];

/// Canonicalises a single tag.
///
/// Trims surrounding whitespace, then looks the trimmed value up in the
/// synonym table. Returns the canonical form on a hit, the trimmed input
/// otherwise. Always succeeds.
pub fn normalize_tag(tag: &str) -> String {
    let trimmed = tag.trim();
    match TAG_SYNONYMS.iter().find(|(synonym, _)| *synonym == trimmed) {
        Some((_, canonical)) => (*canonical).to_string(),
        None => trimmed.to_string(),
    }
}

/// Canonicalises every tag in a list, preserving order and length.
///
/// No deduplication happens at this stage; a 1:1 mapping keeps the step
/// trivially composable with expansion.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    tags.iter().map(|tag| normalize_tag(tag)).collect()
}

/// Expands implied tags from the implication table.
///
/// The input is first deduplicated (first occurrence wins), then every tag
/// with implications contributes its implied tags. The result lists the
/// original tags first and newly implied tags in table order; callers must
/// not rely on the ordering beyond that.
pub fn expand_tags(tags: &[String]) -> Vec<String> {
    let mut expanded: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        if !expanded.contains(tag) {
            expanded.push(tag.clone());
        }
    }

    let originals = expanded.clone();
    for tag in &originals {
        if let Some((_, implied)) = TAG_IMPLICATIONS.iter().find(|(key, _)| *key == tag.as_str()) {
            for implied_tag in *implied {
                if !expanded.iter().any(|existing| existing == implied_tag) {
                    expanded.push((*implied_tag).to_string());
                }
            }
        }
    }

    expanded
}

/// Normalizes then expands a tag list.
///
/// The single entry point used by ingestion; the two steps are exposed
/// separately only for testability.
pub fn process_tags_for_import(tags: &[String]) -> Vec<String> {
    expand_tags(&normalize_tags(tags))
}

#[cfg(test)]
mod tag_tests {
    use super::*;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn normalize_collapses_synonym_spellings() {
        assert_eq!(normalize_tag("p/bólowy"), "przeciwbólowy");
        assert_eq!(normalize_tag("  na ból głowy "), "ból głowy");
    }

    #[test]
    fn normalize_passes_unknown_tags_through() {
        assert_eq!(normalize_tag(" witaminy "), "witaminy");
    }

    #[test]
    fn normalize_is_case_sensitive() {
        // The synonym table is keyed by exact casing from upstream sources.
        assert_eq!(normalize_tag("P/bólowy"), "P/bólowy");
    }

    #[test]
    fn normalize_tags_preserves_order_and_length() {
        let input = tags(&["p/zapalny", "syrop", "p/zapalny"]);
        let output = normalize_tags(&input);
        assert_eq!(output, tags(&["przeciwzapalny", "syrop", "przeciwzapalny"]));
    }

    #[test]
    fn normalize_tags_is_idempotent() {
        let input = tags(&["p/bólowy", "na kaszel", "witaminy"]);
        let once = normalize_tags(&input);
        assert_eq!(normalize_tags(&once), once);
    }

    #[test]
    fn expand_adds_implied_tags_without_duplicates() {
        let output = expand_tags(&tags(&["ból głowy"]));
        assert!(output.contains(&"ból głowy".to_string()));
        assert!(output.contains(&"ból".to_string()));
        assert!(output.contains(&"przeciwbólowy".to_string()));
        let mut deduped = output.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), output.len());
    }

    #[test]
    fn expand_reaches_closure_in_one_pass() {
        let once = expand_tags(&tags(&["migrena", "kaszel suchy"]));
        let twice = expand_tags(&once);
        let mut once_sorted = once.clone();
        let mut twice_sorted = twice.clone();
        once_sorted.sort();
        twice_sorted.sort();
        assert_eq!(once_sorted, twice_sorted);
    }

    #[test]
    fn expand_keeps_original_tags_first() {
        let output = expand_tags(&tags(&["syrop", "gorączka"]));
        assert_eq!(&output[..2], &tags(&["syrop", "gorączka"])[..]);
        assert_eq!(output[2], "przeciwgorączkowy");
    }

    #[test]
    fn process_empty_list_yields_empty_list() {
        assert!(process_tags_for_import(&[]).is_empty());
    }

    #[test]
    fn process_normalizes_before_expanding() {
        // The synonym form must expand the same way as its canonical tag.
        let output = process_tags_for_import(&tags(&["na ból głowy"]));
        assert!(output.contains(&"ból głowy".to_string()));
        assert!(output.contains(&"ból".to_string()));
        assert!(output.contains(&"przeciwbólowy".to_string()));
        assert!(!output.iter().any(|tag| tag == "na ból głowy"));
    }
}
