//! Property-based tests for hxl-core using proptest.

use std::collections::BTreeSet;

use hxl_core::{norm, Column, Dataset, Pattern, Source};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

const TAGS: [&str; 3] = ["#a", "#b", "#c"];
const ATTRIBUTES: [&str; 4] = ["x", "y", "z", "main"];

fn attribute_subset() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set(prop::sample::select(ATTRIBUTES.to_vec()), 0..=4)
        .prop_map(|set| set.into_iter().map(String::from).collect())
}

fn tagspec(tag: &str, attributes: &[String]) -> String {
    let mut spec = tag.to_string();
    for attribute in attributes {
        spec.push('+');
        spec.push_str(attribute);
    }
    spec
}

/// A dataset with 1-5 tagged columns and 0-30 rows of short values.
fn dataset_strategy() -> impl Strategy<Value = Vec<Vec<String>>> {
    let columns = prop::collection::vec(
        (prop::sample::select(TAGS.to_vec()), attribute_subset()),
        1..=5,
    );
    columns.prop_flat_map(|columns| {
        let width = columns.len();
        let tag_row: Vec<String> = columns
            .iter()
            .map(|(tag, attributes)| tagspec(tag, &attributes.iter().cloned().collect::<Vec<_>>()))
            .collect();
        prop::collection::vec(prop::collection::vec("([a-c]|[0-9]{1,2})?", width), 0..30).prop_map(
            move |rows| {
                let mut grid = vec![tag_row.clone()];
                grid.extend(rows);
                grid
            },
        )
    })
}

fn pattern_text() -> impl Strategy<Value = String> {
    (
        prop::sample::select(TAGS.to_vec()),
        attribute_subset(),
        attribute_subset(),
    )
        .prop_map(|(tag, include, exclude)| {
            let mut text = tag.to_string();
            for attribute in &include {
                text.push_str(&format!("+{attribute}"));
            }
            for attribute in exclude.difference(&include) {
                text.push_str(&format!("-{attribute}"));
            }
            text
        })
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Display tags list attributes in sorted order whatever the input order.
    #[test]
    fn display_tag_sorts_attributes(
        tag in "[a-z][a-z0-9_]{0,8}",
        attributes in prop::collection::vec("[a-z][a-z0-9]{0,6}", 0..6),
    ) {
        let spec = tagspec(&format!("#{tag}"), &attributes);
        let column = Column::parse(&spec, None).unwrap();

        let sorted: BTreeSet<&str> = attributes.iter().map(String::as_str).collect();
        let mut expected = format!("#{tag}");
        for attribute in sorted {
            expected.push('+');
            expected.push_str(attribute);
        }
        prop_assert_eq!(column.display_tag(), expected);
    }

    /// A pattern matches iff tags are equal, every included attribute is
    /// present and no excluded attribute is.
    #[test]
    fn pattern_match_characterisation(
        tag in prop::sample::select(TAGS.to_vec()),
        column_attributes in attribute_subset(),
        pattern in pattern_text(),
    ) {
        let column = Column::new(tag, column_attributes.iter().cloned(), None);
        let pattern = Pattern::parse(&pattern).unwrap();

        let expected = pattern.tag() == column.tag()
            && pattern.include_attributes().is_subset(column.attributes())
            && pattern.exclude_attributes().is_disjoint(column.attributes());
        prop_assert_eq!(pattern.matches(&column), expected);
    }

    /// Canonical pattern text parses back to the same pattern.
    #[test]
    fn pattern_display_parses_back(pattern in pattern_text()) {
        let parsed = Pattern::parse(&pattern).unwrap();
        prop_assert_eq!(Pattern::parse(&parsed.to_string()).unwrap(), parsed);
    }

    /// Normalisation is idempotent.
    #[test]
    fn norm_is_idempotent(value in "[ \tA-Za-z0-9]{0,20}") {
        let once = norm(Some(&value));
        prop_assert_eq!(norm(once.as_deref()), once.clone());
    }

    /// Selecting and deselecting with the same predicate partitions the rows.
    #[test]
    fn row_filters_partition_rows(
        grid in dataset_strategy(),
        tag in prop::sample::select(TAGS.to_vec()),
        value in "[a-c]",
    ) {
        let data = Dataset::new(grid).unwrap();
        let total = data.row_count().unwrap();
        let expression = format!("{tag}={value}");

        let kept = data.by_ref().with_rows(expression.as_str()).unwrap().row_count().unwrap();
        let dropped = data.by_ref().without_rows(expression.as_str()).unwrap().row_count().unwrap();
        prop_assert!(kept <= total);
        prop_assert_eq!(kept + dropped, total);
    }

    /// Whitelist and blacklist with the same pattern partition the columns.
    #[test]
    fn column_filters_partition_columns(
        grid in dataset_strategy(),
        pattern in pattern_text(),
    ) {
        let data = Dataset::new(grid).unwrap();
        let width = data.columns().unwrap().len();

        let kept = data.by_ref().with_columns(pattern.as_str());
        let dropped = data.by_ref().without_columns(pattern.as_str());
        prop_assert_eq!(kept.columns().unwrap().len() + dropped.columns().unwrap().len(), width);
        prop_assert_eq!(kept.row_count().unwrap(), data.row_count().unwrap());
    }

    /// Group counts add up to the number of input rows.
    #[test]
    fn counts_add_up(
        grid in dataset_strategy(),
        tag in prop::sample::select(TAGS.to_vec()),
    ) {
        let data = Dataset::new(grid).unwrap();
        let total = data.row_count().unwrap();
        let counted = data.by_ref().count(tag, None).unwrap();

        let rows = counted.rows().unwrap();
        prop_assert!(rows.len() <= total);
        let sum: usize = rows
            .iter()
            .map(|row| row.get("#meta+count").unwrap().unwrap().parse::<usize>().unwrap())
            .sum();
        prop_assert_eq!(sum, total);
    }

    /// Indexing adds exactly one distinct `+iN` per matching column.
    #[test]
    fn index_numbers_every_match(
        grid in dataset_strategy(),
        tag in prop::sample::select(TAGS.to_vec()),
    ) {
        let data = Dataset::new(grid).unwrap();
        let matches = data.matching_columns(tag).unwrap().len();
        let indexed = data.by_ref().index(tag);

        let numbered: Vec<String> = indexed
            .columns()
            .unwrap()
            .iter()
            .flatten()
            .filter(|column| column.tag() == tag)
            .map(|column| column.display_tag())
            .collect();
        prop_assert_eq!(numbered.len(), matches);
        for (n, display) in numbered.iter().enumerate() {
            let suffix = format!("i{n}");
            prop_assert!(display.split('+').any(|part| part == suffix));
        }
    }
}
