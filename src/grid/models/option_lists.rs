//! # Option Lists
//!
//! Controlled vocabularies from the schema payload. Lookups are total: before
//! the lists are loaded (or for unknown terms) they fall back to the raw term
//! instead of failing.

use crate::grid::models::column::OptionEntry;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Option lists whose name starts with this marker hold microbiology test names
pub const TEST_CATEGORY_PREFIX: &str = "micro_test_";

#[derive(Debug, Clone, Default)]
pub struct OptionLists {
    display_lists: BTreeMap<String, Vec<String>>,
    synonyms: HashMap<String, String>,
    test_names: Vec<String>,
    test_categories: HashMap<String, String>,
    loaded: bool,
}

impl OptionLists {
    /// Empty, not-yet-loaded lists
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_schema(lists: &BTreeMap<String, Vec<OptionEntry>>) -> Self {
        let mut option_lists = Self {
            loaded: true,
            ..Self::default()
        };

        for (name, entries) in lists {
            let mut display = BTreeSet::new();
            for (value, synonym) in entries {
                display.insert(value.clone());
                if let Some(synonym) = synonym.as_ref().filter(|s| !s.is_empty()) {
                    display.insert(synonym.clone());
                    option_lists
                        .synonyms
                        .entry(value.clone())
                        .or_insert_with(|| synonym.clone());
                }
            }
            option_lists
                .display_lists
                .insert(name.clone(), display.into_iter().collect());

            if let Some(category) = name.strip_prefix(TEST_CATEGORY_PREFIX) {
                for (value, _) in entries {
                    option_lists
                        .test_categories
                        .entry(value.clone())
                        .or_insert_with(|| category.to_string());
                }
            }
        }

        let mut test_names: Vec<String> = option_lists.test_categories.keys().cloned().collect();
        test_names.sort();
        option_lists.test_names = test_names;

        tracing::debug!(
            "Option lists loaded: {} lists, {} synonyms, {} test names",
            option_lists.display_lists.len(),
            option_lists.synonyms.len(),
            option_lists.test_names.len()
        );
        option_lists
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Sorted display values of one list; empty for unknown lists
    pub fn display_list(&self, name: &str) -> &[String] {
        self.display_lists
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Display synonym of a canonical value, or the term itself
    pub fn synonym<'a>(&'a self, term: &'a str) -> &'a str {
        self.synonyms.get(term).map(String::as_str).unwrap_or(term)
    }

    /// All test names across every test category, sorted
    pub fn test_names(&self) -> &[String] {
        &self.test_names
    }

    /// Category of the option list a test name came from
    pub fn test_category(&self, test: &str) -> Option<&str> {
        self.test_categories.get(test).map(String::as_str)
    }

    /// First display entry of `list` starting with `prefix` (case-insensitive)
    pub fn complete(&self, list: &str, prefix: &str) -> Option<&str> {
        if prefix.is_empty() {
            return None;
        }
        let needle = prefix.to_lowercase();
        self.display_list(list)
            .iter()
            .find(|entry| entry.to_lowercase().starts_with(&needle))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lists() -> BTreeMap<String, Vec<OptionEntry>> {
        let mut lists = BTreeMap::new();
        lists.insert(
            "condition".to_string(),
            vec![
                ("Pneumonia".to_string(), Some("Chest infection".to_string())),
                ("Sepsis".to_string(), None),
            ],
        );
        lists.insert(
            "micro_test_csf_pcr".to_string(),
            vec![("HSV".to_string(), None), ("Enterovirus".to_string(), None)],
        );
        lists.insert(
            "micro_test_stool".to_string(),
            vec![("C. difficile".to_string(), None)],
        );
        lists
    }

    #[test]
    fn lookups_before_load_should_fall_back_to_raw_terms() {
        let option_lists = OptionLists::new();
        assert!(!option_lists.is_loaded());
        assert_eq!(option_lists.synonym("Pneumonia"), "Pneumonia");
        assert_eq!(option_lists.test_category("HSV"), None);
        assert!(option_lists.display_list("condition").is_empty());
    }

    #[test]
    fn synonym_should_map_canonical_value_to_display_string() {
        let option_lists = OptionLists::from_schema(&lists());
        assert_eq!(option_lists.synonym("Pneumonia"), "Chest infection");
        assert_eq!(option_lists.synonym("Sepsis"), "Sepsis");
        assert_eq!(option_lists.synonym("unknown"), "unknown");
    }

    #[test]
    fn display_list_should_be_sorted_and_include_synonyms() {
        let option_lists = OptionLists::from_schema(&lists());
        assert_eq!(
            option_lists.display_list("condition"),
            &["Chest infection", "Pneumonia", "Sepsis"]
        );
    }

    #[test]
    fn test_names_should_merge_all_categories() {
        let option_lists = OptionLists::from_schema(&lists());
        assert_eq!(
            option_lists.test_names(),
            &["C. difficile", "Enterovirus", "HSV"]
        );
        assert_eq!(option_lists.test_category("HSV"), Some("csf_pcr"));
        assert_eq!(option_lists.test_category("C. difficile"), Some("stool"));
        assert_eq!(option_lists.test_category("Sepsis"), None);
    }

    #[test]
    fn complete_should_match_prefix_case_insensitively() {
        let option_lists = OptionLists::from_schema(&lists());
        assert_eq!(option_lists.complete("condition", "pn"), Some("Pneumonia"));
        assert_eq!(option_lists.complete("condition", "x"), None);
        assert_eq!(option_lists.complete("condition", ""), None);
    }
}
