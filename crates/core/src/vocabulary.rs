//! Controlled tag vocabulary.
//!
//! Category-grouped tag lists used by outer surfaces (filter menus, the CLI
//! vocabulary listing). The normalizer does not enforce membership: unknown
//! tags pass through ingestion unchanged.

/// A named group of allowed tags.
#[derive(Clone, Copy, Debug)]
pub struct TagCategory {
    pub name: &'static str,
    pub tags: &'static [&'static str],
}

/// The fixed vocabulary, grouped by category.
pub const TAG_CATEGORIES: &[TagCategory] = &[
    TagCategory {
        name: "objaw",
        tags: &[
            "ból",
            "ból głowy",
            "ból gardła",
            "ból brzucha",
            "migrena",
            "gorączka",
            "kaszel",
            "kaszel suchy",
            "kaszel mokry",
            "katar",
            "biegunka",
            "zgaga",
            "alergia",
            "bezsenność",
        ],
    },
    TagCategory {
        name: "działanie",
        tags: &[
            "przeciwbólowy",
            "przeciwgorączkowy",
            "przeciwzapalny",
            "przeciwkaszlowy",
            "wykrztuśny",
            "przeciwbiegunkowy",
            "przeciwalergiczny",
            "nasenny",
        ],
    },
    TagCategory {
        name: "postać",
        tags: &[
            "tabletki",
            "kapsułki",
            "syrop",
            "maść",
            "żel",
            "krople",
            "aerozol",
            "saszetki",
            "czopki",
        ],
    },
];

/// Whether a tag belongs to the controlled vocabulary.
pub fn is_known_tag(tag: &str) -> bool {
    TAG_CATEGORIES
        .iter()
        .any(|category| category.tags.contains(&tag))
}

#[cfg(test)]
mod vocabulary_tests {
    use super::*;
    use crate::tags::normalize_tag;

    #[test]
    fn known_tags_are_recognised() {
        assert!(is_known_tag("ból głowy"));
        assert!(is_known_tag("syrop"));
        assert!(!is_known_tag("witaminy"));
    }

    #[test]
    fn expansion_only_produces_vocabulary_tags() {
        for category in TAG_CATEGORIES {
            for tag in category.tags {
                for expanded in crate::tags::expand_tags(&[(*tag).to_string()]) {
                    assert!(is_known_tag(&expanded), "unknown implied tag: {expanded}");
                }
            }
        }
    }

    #[test]
    fn synonyms_normalize_into_the_vocabulary() {
        // Spellings the normalizer knows about must land on known tags.
        for spelling in ["p/bólowy", "przeciwgorączkowe", "na katar"] {
            assert!(is_known_tag(&normalize_tag(spelling)));
        }
    }
}
