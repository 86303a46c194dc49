//! End-to-end tests for datasets and filter chains.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use hxl_core::{
    Column, Dataset, DatasetOptions, Diagnostics, HxlError, Pattern, Predicate, Source,
    Strictness,
};

// ============================================================================
// Helpers
// ============================================================================

fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

fn three_w() -> Dataset {
    Dataset::new(grid(&[
        &["3W report, March", "", "", "", ""],
        &["Organisation", "Donor", "Sector", "Region", "People"],
        &["#org+impl", "#org+funder", "#sector", "#adm1", "#affected"],
        &["UNICEF", "ECHO", "WASH", "Coast", "1200"],
        &["MSF", "ECHO", "Health", "Coast", "300"],
        &["UNICEF", "DFID", "Health", "Hills", "450"],
        &["IFRC", "", "Shelter", "Hills", "unknown"],
        &["MSF", "DFID", "Health", "Plains", "75.5"],
    ]))
    .unwrap()
}

/// Rows of a source keyed by the value of `key`.
fn keyed<S: Source>(source: &S, key: &str) -> BTreeMap<String, Vec<Option<String>>> {
    source
        .rows()
        .unwrap()
        .into_iter()
        .map(|row| {
            let k = row.get(key).unwrap().unwrap_or_default().to_string();
            (k, row.into_values())
        })
        .collect()
}

fn cell(value: &str) -> Option<String> {
    Some(value.to_string())
}

// ============================================================================
// Dataset round trip
// ============================================================================

#[test]
fn minimal_dataset_round_trip() {
    let data = Dataset::new(vec![vec!["h1", "h2"], vec!["#a", "#b"], vec!["v1", "v2"]]).unwrap();
    assert_eq!(data.columns().unwrap().len(), 2);
    assert_eq!(data.tags().unwrap(), vec![cell("#a"), cell("#b")]);
    assert_eq!(data.headers().unwrap(), vec![cell("h1"), cell("h2")]);
    let rows = data.rows().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("#a").unwrap(), Some("v1"));
}

#[test]
fn with_columns_keeps_values_addressable() {
    let data = Dataset::new(vec![vec!["h1", "h2"], vec!["#a", "#b"], vec!["v1", "v2"]]).unwrap();
    let projected = data.with_columns("#a");
    assert_eq!(projected.columns().unwrap().len(), 1);
    assert_eq!(projected.rows().unwrap()[0].get("#a").unwrap(), Some("v1"));
}

#[test]
fn preamble_and_headers() {
    let data = three_w();
    assert_eq!(data.tag_row(), 2);
    assert_eq!(data.headers().unwrap()[1], cell("Donor"));
    assert_eq!(data.row_count().unwrap(), 5);
}

#[test]
fn no_tag_row_is_fatal() {
    let result = Dataset::new(grid(&[&["a", "b"], &["#a", "b"]]));
    assert!(matches!(result, Err(HxlError::NoTagRow { scanned: 2 })));
}

// ============================================================================
// Derived queries
// ============================================================================

#[test]
fn derived_queries() {
    let data = three_w();
    assert!(data.has_column("#org").unwrap());
    assert_eq!(data.matching_columns("#org").unwrap().len(), 2);
    assert_eq!(data.min("#affected").unwrap(), cell("75.5"));
    // "unknown" is ignored once the column holds numbers
    assert_eq!(data.max("#affected").unwrap(), cell("1200"));
    assert_eq!(
        data.values("#adm1").unwrap(),
        vec!["Coast", "Hills", "Plains"]
    );
    // 4 of 5 numeric: 80% is below the threshold
    assert!(!data.is_numbery("#affected").unwrap());
    assert!(data
        .by_ref()
        .without_rows("#org+impl=ifrc")
        .unwrap()
        .is_numbery("#affected")
        .unwrap());
}

#[test]
fn is_numbery_edge_cases() {
    let numbery =
        Dataset::new(vec![vec!["#n"], vec!["1"], vec!["2"], vec!["3"], vec![""]]).unwrap();
    assert!(numbery.is_numbery("#n").unwrap());
    let texty = Dataset::new(vec![vec!["#n"], vec!["1"], vec!["a"], vec!["b"]]).unwrap();
    assert!(!texty.is_numbery("#n").unwrap());
    let empty = Dataset::new(vec![vec!["#n"], vec![""]]).unwrap();
    assert!(!empty.is_numbery("#n").unwrap());
}

// ============================================================================
// Chains
// ============================================================================

#[test]
fn select_then_count_then_cache() {
    let data = three_w();
    let chain = data
        .by_ref()
        .with_rows("#sector=health")
        .unwrap()
        .count("#org+impl", Some("#affected"))
        .unwrap()
        .cache();

    let report = keyed(&chain, "#org+impl");
    assert_eq!(report.len(), 2);
    assert_eq!(
        report["MSF"],
        vec![
            cell("MSF"),
            cell("2"),
            cell("375.5"),
            cell("187.75"),
            cell("75.5"),
            cell("300"),
        ]
    );
    assert_eq!(
        report["UNICEF"],
        vec![
            cell("UNICEF"),
            cell("1"),
            cell("450"),
            cell("450"),
            cell("450"),
            cell("450"),
        ]
    );
}

#[test]
fn count_matches_documented_example() {
    let data = Dataset::new(vec![vec!["#a"], vec!["x"], vec!["x"], vec!["y"]]).unwrap();
    let counts = keyed(&data.count("#a", None).unwrap(), "#a");
    assert_eq!(counts.len(), 2);
    assert_eq!(counts["x"], vec![cell("x"), cell("2")]);
    assert_eq!(counts["y"], vec![cell("y"), cell("1")]);
}

#[test]
fn count_aggregate_ignores_non_numbers() {
    let data = Dataset::new(vec![
        vec!["#a", "#n"],
        vec!["x", "1"],
        vec!["x", "2"],
        vec!["x", "bad"],
    ])
    .unwrap();
    let counts = keyed(&data.count("#a", Some("#n")).unwrap(), "#a");
    assert_eq!(
        counts["x"],
        vec![
            cell("x"),
            cell("3"),
            cell("3"),
            cell("1.5"),
            cell("1"),
            cell("2"),
        ]
    );
}

#[test]
fn rename_first_of_two() {
    let data = Dataset::new(vec![
        vec!["Old", "Other"],
        vec!["#a", "#a"],
        vec!["1", "2"],
    ])
    .unwrap();
    let renamed = data.rename("#a", "#c", Some("New"), Some(0)).unwrap();
    assert_eq!(renamed.tags().unwrap(), vec![cell("#c"), cell("#a")]);
    assert_eq!(renamed.headers().unwrap(), vec![cell("New"), cell("Other")]);
    let row = &renamed.rows().unwrap()[0];
    assert_eq!(row.get("#c").unwrap(), Some("1"));
    assert_eq!(row.get("#a").unwrap(), Some("2"));
}

#[test]
fn index_three_repeats() {
    let data = Dataset::new(vec![vec!["#a", "#a", "#a"], vec!["1", "2", "3"]]).unwrap();
    let indexed = data.index("#a");
    let attributes: Vec<Vec<String>> = indexed
        .columns()
        .unwrap()
        .iter()
        .map(|c| c.as_ref().unwrap().attributes().iter().cloned().collect())
        .collect();
    assert_eq!(attributes, vec![vec!["i0"], vec!["i1"], vec!["i2"]]);
}

#[test]
fn index_then_select_by_position() {
    let data = three_w();
    let second_org = data
        .by_ref()
        .index("#org")
        .with_columns("#org+i1")
        .cache();
    assert_eq!(
        second_org.values("#org").unwrap(),
        vec!["ECHO", "DFID", ""]
    );
}

#[test]
fn dynamic_chain_over_boxed_sources() {
    let mut source: Box<dyn Source> = Box::new(three_w());
    source = Box::new(source.with_rows("#adm1=coast").unwrap());
    source = Box::new(source.without_columns("#org+funder"));
    source = Box::new(
        source
            .rename("#affected", "#affected+total", None, None)
            .unwrap(),
    );

    assert_eq!(source.row_count().unwrap(), 2);
    assert_eq!(
        source.display_tags().unwrap(),
        vec![
            cell("#org+impl"),
            cell("#sector"),
            cell("#adm1"),
            cell("#affected+total"),
        ]
    );
}

#[test]
fn predicates_from_several_forms() {
    let data = three_w();
    let picked = data
        .by_ref()
        .with_rows(vec![
            Predicate::parse("#affected>=1000").unwrap(),
            Predicate::equals("#org+funder", "dfid").unwrap(),
            Predicate::row(|row| row.get("#sector").ok().flatten() == Some("Shelter")),
        ])
        .unwrap();
    assert_eq!(
        picked.values("#org+impl").unwrap(),
        vec!["UNICEF", "IFRC", "MSF"]
    );
    assert_eq!(picked.row_count().unwrap(), 4);
}

#[test]
fn regex_predicates() {
    let data = three_w();
    let coastal = data.by_ref().with_rows("#adm1~^co").unwrap();
    assert_eq!(coastal.row_count().unwrap(), 2);
    let elsewhere = data.by_ref().with_rows("#adm1!~^co").unwrap();
    assert_eq!(elsewhere.row_count().unwrap(), 3);
}

#[test]
fn each_visits_every_row_in_order() {
    let data = three_w();
    let mut seen = Vec::new();
    let total = data
        .each(|row, _, index| seen.push((index, row.get("#org+impl").unwrap().map(String::from))))
        .unwrap();
    assert_eq!(total, 5);
    assert_eq!(seen[4], (4, Some("MSF".to_string())));
}

// ============================================================================
// Diagnostics
// ============================================================================

#[test]
fn strict_and_lenient_pattern_parsing() {
    let diagnostics = Diagnostics::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    diagnostics.add_logger(move |err| sink.borrow_mut().push(err.to_string()));

    assert!(Pattern::parse_lenient("#bad tag!", &diagnostics).is_none());
    assert!(Pattern::parse("#bad tag!").is_err());
    assert!(Pattern::parse_with("#bad tag!", Strictness::Strict, &diagnostics).is_err());
    assert_eq!(seen.borrow().len(), 1);
    assert!(seen.borrow()[0].contains("#bad tag!"));
}

#[test]
fn chain_shares_dataset_diagnostics() {
    let diagnostics = Diagnostics::new();
    let count = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&count);
    diagnostics.add_logger(move |_| *sink.borrow_mut() += 1);

    let data = Dataset::with_options(
        grid(&[&["#org", "#sector"], &["MSF", "Health"]]),
        DatasetOptions::default(),
        diagnostics.clone(),
    )
    .unwrap();
    let chain = data
        .with_columns(["#org", "not a tag"])
        .index("#also bad")
        .cache();

    assert!(chain.diagnostics().same(&diagnostics));
    assert!(!chain.has_column("#bad!").unwrap());
    assert_eq!(*count.borrow(), 3);
    assert_eq!(chain.columns().unwrap().len(), 1);
}

#[test]
fn strict_sites_return_errors() {
    let data = three_w();
    assert!(data.rows().unwrap()[0].get("#bad tag").is_err());
    assert!(data.by_ref().count("#bad tag", None).is_err());
    assert!(data.by_ref().with_rows("#bad tag=x").is_err());
    assert!(data.by_ref().rename("#org", "org+x", None, None).is_err());
}

#[test]
fn columns_are_shared_handles() {
    let data = three_w();
    let upstream = data.columns().unwrap();
    let renamed = data
        .rename("#sector", "#sector+cluster", None, None)
        .unwrap();
    let columns = renamed.columns().unwrap();
    assert!(Column::same(
        columns[0].as_ref().unwrap(),
        upstream[0].as_ref().unwrap()
    ));
    assert!(!Column::same(
        columns[2].as_ref().unwrap(),
        upstream[2].as_ref().unwrap()
    ));
}
