//! End-to-end population: taxonomy document → skeleton → matched grid

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use signoff_core::{
    CompletionRecord, Grid, ReportPeriod, ReportType, TaxonomyIndex, UnmatchedEntry,
    UnmatchedKind,
};
use signoff_matcher::CompletionMatcher;
use signoff_parser::parse_taxonomy;
use signoff_render::build_grid;

const SCENARIO: &str =
    r#"{"Production":{"Weekly":{"description":"x","columns":["1.94,1.97","1.95"]}}}"#;

fn setup(json: &str) -> (TaxonomyIndex, Grid) {
    let taxonomy = parse_taxonomy(json).unwrap();
    let index = TaxonomyIndex::build(&taxonomy).unwrap();
    let grid = build_grid(ReportPeriod::new(2025, 1).unwrap(), &index);
    (index, grid)
}

fn record(date: (i32, u32, u32), name: &str, room: &str, frequency: &str, task_type: &str) -> CompletionRecord {
    let ts = NaiveDate::from_ymd_opt(date.0, date.1, date.2)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();
    CompletionRecord::new(ts, name, room, frequency, task_type)
}

#[test]
fn scenario_alice_lands_in_column_b() {
    let (index, mut grid) = setup(SCENARIO);
    let sheet = &grid.sheets()[0];
    assert_eq!(sheet.value(3, 1), Some("Wed, Jan 1 2025"));
    assert_eq!(sheet.value(33, 1), Some("Fri, Jan 31 2025"));
    assert_eq!(index.len(), 2);

    let report = CompletionMatcher::new(&index, ReportType::Production).populate(
        &mut grid,
        &[record((2025, 1, 6), "Alice", "1.94", "Weekly", "Production")],
    );

    assert_eq!(report.attempted, 1);
    assert_eq!(report.matched, 1);
    assert!(report.is_complete());
    let row = grid.find_day_row("Mon, Jan 6 2025").unwrap();
    assert_eq!(row, 8);
    assert_eq!(grid.sheets()[0].value(row, 2), Some("Alice"));
    assert_eq!(grid.sheets()[0].value(row, 3), None);
}

#[test]
fn every_room_of_a_compound_label_hits_the_same_column() {
    let (index, mut grid) = setup(SCENARIO);
    let matcher = CompletionMatcher::new(&index, ReportType::Production);
    let report = matcher.populate(
        &mut grid,
        &[
            record((2025, 1, 6), "Alice", "1.94", "Weekly", "Production"),
            record((2025, 1, 7), "Bob", "1.97", "weekly", "Production"),
            record((2025, 1, 8), "Cara", "1.97, 1.94", " WEEKLY ", "Production"),
            record((2025, 1, 9), "Dan", "1.95", "Weekly", "Production"),
        ],
    );
    assert_eq!(report.matched, 4);
    let sheet = &grid.sheets()[0];
    assert_eq!(sheet.value(8, 2), Some("Alice"));
    assert_eq!(sheet.value(9, 2), Some("Bob"));
    assert_eq!(sheet.value(10, 2), Some("Cara"));
    assert_eq!(sheet.value(11, 3), Some("Dan"));
}

#[test]
fn unknown_room_leaves_grid_untouched() {
    let (index, mut grid) = setup(SCENARIO);
    let before = grid.clone();
    let report = CompletionMatcher::new(&index, ReportType::Production).populate(
        &mut grid,
        &[record((2025, 1, 6), "Alice", "9.99", "Weekly", "Production")],
    );

    assert_eq!(report.attempted, 1);
    assert_eq!(report.matched, 0);
    assert_eq!(
        report.unmatched,
        vec![UnmatchedEntry::NoColumn {
            frequency: "Weekly".into(),
            room: "9.99".into(),
        }]
    );
    assert_eq!(grid, before);
}

#[test]
fn last_write_wins() {
    let (index, mut grid) = setup(SCENARIO);
    let report = CompletionMatcher::new(&index, ReportType::Production).populate(
        &mut grid,
        &[
            record((2025, 1, 6), "Alice", "1.94", "Weekly", "Production"),
            record((2025, 1, 6), "Bob", "1.97", "Weekly", "Production"),
        ],
    );
    assert_eq!(report.matched, 2);
    assert_eq!(grid.sheets()[0].value(8, 2), Some("Bob"));
}

#[test]
fn other_task_types_are_skipped_not_attempted() {
    let (index, mut grid) = setup(SCENARIO);
    let report = CompletionMatcher::new(&index, ReportType::Production).populate(
        &mut grid,
        &[
            record((2025, 1, 6), "Alice", "1.94", "Weekly", "Warehouse"),
            record((2025, 1, 6), "Bob", "1.94", "Weekly", "IDF"),
            record((2025, 1, 6), "Cara", "1.94", "Weekly", "production"),
        ],
    );
    assert_eq!(report.skipped, 2);
    assert_eq!(report.attempted, 1);
    assert_eq!(grid.sheets()[0].value(8, 2), Some("Cara"));
}

#[test]
fn dates_outside_the_grid_are_reported() {
    let (index, mut grid) = setup(SCENARIO);
    let report = CompletionMatcher::new(&index, ReportType::Production).populate(
        &mut grid,
        &[record((2025, 2, 1), "Alice", "1.94", "Weekly", "Production")],
    );
    assert_eq!(
        report.unmatched,
        vec![UnmatchedEntry::DateNotFound {
            date: "Sat, Feb 1 2025".into()
        }]
    );
}

#[test]
fn unknown_frequency_per_layout() {
    let (index, mut grid) = setup(SCENARIO);
    let report = CompletionMatcher::new(&index, ReportType::Production).populate(
        &mut grid,
        &[record((2025, 1, 6), "Alice", "1.94", "Quarterly", "Production")],
    );
    assert_eq!(report.count_of(UnmatchedKind::NoSheetForFrequency), 1);

    let combined = r#"{"layout": "combined",
        "Production":{"Weekly":{"description":"x","columns":["1.94,1.97","1.95"]}}}"#;
    let (index, mut grid) = setup(combined);
    let report = CompletionMatcher::new(&index, ReportType::Production).populate(
        &mut grid,
        &[record((2025, 1, 6), "Alice", "1.94", "Quarterly", "Production")],
    );
    assert_eq!(report.count_of(UnmatchedKind::NoColumn), 1);
}

#[test]
fn combined_layout_keys_on_frequency_and_room() {
    let json = r#"{
        "layout": "combined",
        "Warehouse": {
            "Daily": {"description": "Dust", "columns": ["8.72", "8.77A, 8.77B"]},
            "2x Weekly": {"description": "Scrub", "columns": ["8.72", "8.77A, 8.77B"]}
        }
    }"#;
    let (index, mut grid) = setup(json);
    assert_eq!(grid.sheets().len(), 1);

    let report = CompletionMatcher::new(&index, ReportType::Warehouse).populate(
        &mut grid,
        &[
            record((2025, 1, 6), "Alice", "8.72", "Daily", "Warehouse"),
            record((2025, 1, 6), "Bob", "8.72", "2x Weekly", "Warehouse"),
            record((2025, 1, 6), "Cara", "8.77", "2x  weekly", "Warehouse"),
        ],
    );
    assert_eq!(report.matched, 3);

    // three header rows: Jan 6 sits on row 9
    let sheet = &grid.sheets()[0];
    assert_eq!(sheet.value(9, 2), Some("Alice"));
    assert_eq!(sheet.value(9, 4), Some("Bob"));
    assert_eq!(sheet.value(9, 5), Some("Cara"));
}

#[test]
fn multiplier_frequency_does_not_match_plain_one() {
    let json = r#"{"Warehouse": {"2x Weekly": {"description": "Scrub", "columns": ["8.72"]}}}"#;
    let (index, mut grid) = setup(json);
    let report = CompletionMatcher::new(&index, ReportType::Warehouse).populate(
        &mut grid,
        &[record((2025, 1, 6), "Alice", "8.72", "Weekly", "Warehouse")],
    );
    assert_eq!(
        report.unmatched,
        vec![UnmatchedEntry::NoSheetForFrequency {
            frequency: "Weekly".into()
        }]
    );
}

#[test]
fn room_shared_by_two_labels_is_unmatched() {
    let (index, mut grid) = setup(
        r#"{"Production":{"Weekly":{"description":"x","columns":["1.94,1.97","1.97,1.98"]}}}"#,
    );
    assert_eq!(index.len(), 2);

    let report = CompletionMatcher::new(&index, ReportType::Production).populate(
        &mut grid,
        &[
            record((2025, 1, 6), "Alice", "1.97", "Weekly", "Production"),
            record((2025, 1, 7), "Bob", "1.98", "Weekly", "Production"),
        ],
    );

    assert_eq!(report.matched, 1);
    assert_eq!(
        report.unmatched,
        vec![UnmatchedEntry::NoColumn {
            frequency: "Weekly".into(),
            room: "1.97".into(),
        }]
    );
    let sheet = &grid.sheets()[0];
    assert_eq!(sheet.value(8, 2), None);
    assert_eq!(sheet.value(8, 3), None);
    assert_eq!(sheet.value(9, 3), Some("Bob"));
}
