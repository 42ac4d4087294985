use std::cmp::Ordering;
use std::collections::HashSet;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::model::PortRecord;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Name,
    Country,
}

impl Field {
    fn text(self, record: &PortRecord) -> &str {
        match self {
            Field::Name => record.name_text(),
            Field::Country => record.country_text(),
        }
    }
}

/// Comparison form of a label: trimmed and lower-cased. Never displayed.
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

pub fn labels_equal(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// Primary sort key: accents folded away so "Åland" sorts beside "Aland".
fn collation_key(value: &str) -> String {
    value
        .trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

struct IndexEntry {
    collation: String,
    normalized: String,
    order: usize,
    display: String,
}

impl IndexEntry {
    fn cmp_entry(&self, other: &Self) -> Ordering {
        self.collation
            .cmp(&other.collation)
            .then_with(|| self.normalized.cmp(&other.normalized))
            .then_with(|| self.order.cmp(&other.order))
    }
}

/// Sorted, duplicate-free display labels for `field`.
///
/// With `filter_country` set (and non-blank), only records of that country
/// contribute. The display form is the trimmed text of the first occurrence
/// in catalog order; blank labels are skipped.
pub fn build_index(
    records: &[PortRecord],
    field: Field,
    filter_country: Option<&str>,
) -> Vec<String> {
    let filter = filter_country.map(normalize).filter(|f| !f.is_empty());
    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    for (order, record) in records.iter().enumerate() {
        if let Some(filter) = filter.as_deref() {
            if normalize(record.country_text()) != filter {
                continue;
            }
        }
        let display = field.text(record).trim();
        if display.is_empty() {
            continue;
        }
        let normalized = normalize(display);
        if !seen.insert(normalized.clone()) {
            continue;
        }
        entries.push(IndexEntry {
            collation: collation_key(display),
            normalized,
            order,
            display: display.to_string(),
        });
    }

    entries.sort_by(|a, b| a.cmp_entry(b));
    entries.into_iter().map(|e| e.display).collect()
}

pub fn build_country_index(records: &[PortRecord]) -> Vec<String> {
    build_index(records, Field::Country, None)
}

pub fn build_port_index(records: &[PortRecord], country: Option<&str>) -> Vec<String> {
    build_index(records, Field::Name, country)
}

/// Exact, case-insensitive lookup of `typed` among `candidates`.
///
/// Blank input never matches. When several candidates normalize to the same
/// label the earliest one wins, so identical inputs give identical results.
pub fn resolve_exact<'a>(candidates: &'a [String], typed: &str) -> Option<&'a str> {
    let wanted = normalize(typed);
    if wanted.is_empty() {
        return None;
    }
    candidates
        .iter()
        .find(|candidate| normalize(candidate) == wanted)
        .map(String::as_str)
}

/// Options shown in an autocomplete dropdown for the text typed so far.
pub fn suggestions<'a>(options: &'a [String], typed: &str) -> Vec<&'a str> {
    let needle = normalize(typed);
    options
        .iter()
        .filter(|option| needle.is_empty() || normalize(option).contains(&needle))
        .map(String::as_str)
        .collect()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn record_strategy() -> impl Strategy<Value = PortRecord> {
        (
            "[A-Za-z ]{0,8}",
            prop_oneof![Just("Japan"), Just("japan "), Just("Chile"), Just(""), Just("PERU")],
        )
            .prop_map(|(name, country)| PortRecord {
                id: String::new(),
                name: Some(name),
                country: Some(country.to_string()),
                lat: Some(1.0),
                lng: Some(2.0),
            })
    }

    proptest! {
        #[test]
        fn index_has_no_normalized_duplicates(records in prop::collection::vec(record_strategy(), 0..40)) {
            for index in [
                build_country_index(&records),
                build_port_index(&records, None),
                build_port_index(&records, Some("japan")),
            ] {
                let mut seen = HashSet::new();
                for label in &index {
                    prop_assert!(!label.trim().is_empty());
                    prop_assert!(seen.insert(normalize(label)));
                }
                for pair in index.windows(2) {
                    prop_assert!(collation_key(&pair[0]) <= collation_key(&pair[1]));
                }
            }
        }

        #[test]
        fn resolve_returns_candidate_or_nothing(
            records in prop::collection::vec(record_strategy(), 0..40),
            typed in "[A-Za-z ]{0,8}",
        ) {
            let candidates = build_port_index(&records, None);
            match resolve_exact(&candidates, &typed) {
                Some(hit) => {
                    prop_assert!(candidates.iter().any(|c| c == hit));
                    prop_assert_eq!(normalize(hit), normalize(&typed));
                }
                None => {
                    let wanted = normalize(&typed);
                    prop_assert!(wanted.is_empty() || candidates.iter().all(|c| normalize(c) != wanted));
                }
            }
        }
    }
}
