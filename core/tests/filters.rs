use alert_desk_core::{
    config::DeskConfig,
    dataset::Dataset,
    filter::{apply, FilterSpec},
    schema::{detect_schema, RoleMap},
    types::{CellValue, Role},
};
use chrono::NaiveDate;

// ── Helpers ──────────────────────────────────────────────────────────────────

const SCENARIO: &str = "\
owner,priority,date
Al,High,2024-01-10
Bo,Low,2024-02-15
Al,Low,2024-03-20
";

fn load(csv: &str) -> (Dataset, RoleMap) {
    let _ = env_logger::builder().is_test(true).try_init();
    detect_schema(Dataset::from_csv_str(csv).unwrap(), &DeskConfig::default_test())
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn owners(view: &alert_desk_core::dataset::FilteredView<'_>) -> Vec<String> {
    view.column_values("owner").iter().map(|v| v.to_text()).collect()
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// With every predicate empty the full dataset comes back unchanged.
#[test]
fn empty_spec_returns_everything() {
    let (ds, roles) = load(SCENARIO);
    let spec = FilterSpec::new().with_values(Role::Owner, Vec::<CellValue>::new());

    let view = apply(&ds, &roles, &spec);
    assert_eq!(view.len(), 3);
    assert_eq!(view.to_table().rows, ds.rows().to_vec());
}

/// Owner filter keeps only member rows.
#[test]
fn owner_filter_keeps_members() {
    let (ds, roles) = load(SCENARIO);
    let view = apply(&ds, &roles, &FilterSpec::new().with_values(Role::Owner, ["Al"]));

    assert_eq!(view.len(), 2);
    assert_eq!(owners(&view), vec!["Al", "Al"]);
}

/// Role predicates combine with AND.
#[test]
fn role_predicates_are_anded() {
    let (ds, roles) = load(SCENARIO);
    let spec = FilterSpec::new()
        .with_values(Role::Owner, ["Al"])
        .with_values(Role::Priority, ["Low"]);

    let view = apply(&ds, &roles, &spec);
    assert_eq!(view.indices(), &[2]);
}

/// A predicate on an undetected role restricts nothing.
#[test]
fn undetected_role_is_exempt() {
    let (ds, roles) = load(SCENARIO);
    assert!(!roles.contains(Role::Change));

    let view = apply(&ds, &roles, &FilterSpec::new().with_values(Role::Change, ["CHG1"]));
    assert_eq!(view.len(), 3);
}

/// Q1 covers January, February and March.
#[test]
fn quarter_one_keeps_all_scenario_rows() {
    let (ds, roles) = load(SCENARIO);
    let view = apply(&ds, &roles, &FilterSpec::new().with_quarters([1]));
    assert_eq!(view.len(), 3);

    let view = apply(&ds, &roles, &FilterSpec::new().with_quarters([2, 3, 4]));
    assert!(view.is_empty());
}

/// Months match English full names, ignoring case.
#[test]
fn month_filter_matches_names() {
    let (ds, roles) = load(SCENARIO);
    let view = apply(&ds, &roles, &FilterSpec::new().with_months(["February", "march"]));
    assert_eq!(owners(&view), vec!["Bo", "Al"]);
}

/// Both ends of the date range are inclusive, and time of day is ignored.
#[test]
fn date_range_is_inclusive() {
    let csv = "\
owner,date
Al,2024-01-10
Bo,2024-02-15 23:59:00
Cy,2024-03-20
";
    let (ds, roles) = load(csv);
    let spec = FilterSpec::new().with_date_range(day(2024, 1, 10), day(2024, 2, 15));

    let view = apply(&ds, &roles, &spec);
    assert_eq!(owners(&view), vec!["Al", "Bo"]);
}

/// Start after end yields an empty result, never an error.
#[test]
fn inverted_date_range_is_empty() {
    let (ds, roles) = load(SCENARIO);
    let spec = FilterSpec::new().with_date_range(day(2024, 3, 31), day(2024, 1, 1));

    let view = apply(&ds, &roles, &spec);
    assert!(view.is_empty());
}

/// Rows with a null date drop out whenever a date predicate is active,
/// and stay in when none is.
#[test]
fn null_dates_fail_date_predicates() {
    let csv = "\
owner,date
Al,2024-01-10
Bo,garbage
Cy,
";
    let (ds, roles) = load(csv);

    let view = apply(&ds, &roles, &FilterSpec::new().with_quarters([1, 2, 3, 4]));
    assert_eq!(owners(&view), vec!["Al"]);

    let view = apply(&ds, &roles, &FilterSpec::new().with_values(Role::Owner, ["Bo", "Cy"]));
    assert_eq!(view.len(), 2);
}

/// Filters deserialize from the JSON a UI would send.
#[test]
fn spec_deserializes_from_json() {
    let (ds, roles) = load(SCENARIO);
    let spec: FilterSpec = serde_json::from_str(
        r#"{
            "values": { "owner": ["Al"], "priority": [] },
            "date_range": { "start": "2024-01-01", "end": "2024-02-28" },
            "quarters": [1]
        }"#,
    )
    .unwrap();

    let view = apply(&ds, &roles, &spec);
    assert_eq!(view.indices(), &[0]);
}

/// Alert filters reach the second of two headers that collide after normalization.
#[test]
fn alert_filter_uses_renamed_duplicate_column() {
    let (ds, roles) = load("Owner_Alert,owner_alert \nAl,Disk full\nBo,CPU high\n");
    let view = apply(&ds, &roles, &FilterSpec::new().with_values(Role::Alert, ["CPU high"]));
    assert_eq!(view.indices(), &[1]);
}

/// Offset timestamps are bucketed by the date written in the file, not by UTC.
#[test]
fn offset_timestamps_use_their_local_date() {
    let (ds, roles) = load("owner,date\nAl,2024-04-01T01:00:00+05:00\n");

    let view = apply(&ds, &roles, &FilterSpec::new().with_quarters([2]));
    assert_eq!(owners(&view), vec!["Al"]);
    let view = apply(&ds, &roles, &FilterSpec::new().with_months(["April"]));
    assert_eq!(view.len(), 1);
    let view = apply(&ds, &roles, &FilterSpec::new().with_date_range(day(2024, 4, 1), day(2024, 4, 1)));
    assert_eq!(view.len(), 1);
}
