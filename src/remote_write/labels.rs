//! Merging of default labels into series labels.

use crate::core::{Label, SeriesLabels};
use std::collections::BTreeMap;

/// Combine the configured default labels with a series' own labels.
///
/// Pre-built pairs keep their order and get the defaults appended without
/// de-duplication. Mapped labels are merged with series values winning on
/// collision; the output is sorted by label name.
pub fn merge_labels(defaults: &BTreeMap<String, String>, labels: &SeriesLabels) -> Vec<Label> {
    match labels {
        SeriesLabels::Pairs(pairs) => {
            let mut merged = Vec::with_capacity(pairs.len() + defaults.len());
            merged.extend(pairs.iter().cloned());
            merged.extend(defaults.iter().map(|(name, value)| Label::new(name, value)));
            merged
        },
        SeriesLabels::Map(map) => {
            let mut merged = defaults.clone();
            merged.extend(map.iter().map(|(name, value)| (name.clone(), value.clone())));
            merged
                .into_iter()
                .map(|(name, value)| Label { name, value })
                .collect()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_series_labels_win() {
        let defaults = map(&[("env", "prod")]);
        let series = SeriesLabels::Map(map(&[("env", "staging"), ("svc", "x")]));

        let merged = merge_labels(&defaults, &series);

        assert_eq!(merged, vec![Label::new("env", "staging"), Label::new("svc", "x")]);
    }

    #[test]
    fn test_defaults_fill_missing_names() {
        let defaults = map(&[("service", "sample-service")]);
        let series = SeriesLabels::Map(map(&[("__name__", "custom_counter")]));

        let merged = merge_labels(&defaults, &series);

        assert_eq!(
            merged,
            vec![
                Label::new("__name__", "custom_counter"),
                Label::new("service", "sample-service"),
            ]
        );
    }

    #[test]
    fn test_pairs_keep_order_and_duplicates() {
        let defaults = map(&[("env", "prod")]);
        let series = SeriesLabels::Pairs(vec![
            Label::new("zone", "b"),
            Label::new("__name__", "up"),
            Label::new("env", "dev"),
        ]);

        let merged = merge_labels(&defaults, &series);

        assert_eq!(
            merged,
            vec![
                Label::new("zone", "b"),
                Label::new("__name__", "up"),
                Label::new("env", "dev"),
                Label::new("env", "prod"),
            ]
        );
    }

    #[test]
    fn test_empty_sides() {
        let empty = BTreeMap::new();
        assert!(merge_labels(&empty, &SeriesLabels::default()).is_empty());
        assert!(merge_labels(&empty, &SeriesLabels::Pairs(Vec::new())).is_empty());

        let defaults = map(&[("a", "1")]);
        assert_eq!(
            merge_labels(&defaults, &SeriesLabels::default()),
            vec![Label::new("a", "1")]
        );
    }
}
