use alert_desk_core::{
    config::DeskConfig,
    dataset::Dataset,
    schema::{detect_schema, normalize_column_name, RoleMap},
    types::{CellValue, Role},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn detect(columns: &[&str]) -> RoleMap {
    RoleMap::detect(columns)
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Each role takes the first column whose normalized name contains its keyword.
#[test]
fn roles_take_first_matching_column() {
    let roles = detect(&["Ticket", "Owner Name", "Backup Owner", "Alert Name", "Priority", "Change No", "Raised Date"]);

    assert_eq!(roles.column(Role::Owner), Some("owner name"));
    assert_eq!(roles.column(Role::Alert), Some("alert name"));
    assert_eq!(roles.column(Role::Priority), Some("priority"));
    assert_eq!(roles.column(Role::Change), Some("change no"));
    assert_eq!(roles.column(Role::Date), Some("raised date"));
}

/// A column matching several keywords goes to the earliest role in
/// owner, alert, priority, change, date order; later roles skip it.
#[test]
fn claimed_column_is_skipped_by_later_roles() {
    let roles = detect(&["priority_alert", "alert_text"]);

    assert_eq!(roles.alert.as_deref(), Some("priority_alert"));
    assert_eq!(roles.priority, None, "priority_alert already belongs to alert");
    assert!(roles.missing().any(|r| r == Role::Priority));
}

/// Roles with no matching column are absent, never an error.
#[test]
fn undetected_roles_are_absent() {
    let roles = detect(&["id", "description"]);
    assert_eq!(roles, RoleMap::default());
    assert_eq!(roles.present().count(), 0);
}

/// Re-running detection on already-normalized names yields the same map.
#[test]
fn detection_is_idempotent() {
    let raw = ["  Alert OWNER ", "ALERT", "Priority Level", "CHANGE#", "Date Opened", "Alert Date"];
    let first = detect(&raw);

    let normalized: Vec<String> = raw.iter().map(|c| normalize_column_name(c)).collect();
    let second = RoleMap::detect(&normalized);

    assert_eq!(first, second);
    assert_eq!(first.column(Role::Owner), Some("alert owner"));
    assert_eq!(first.column(Role::Alert), Some("alert"));
    assert_eq!(first.column(Role::Date), Some("date opened"));
}

/// Column names are lowercased and trimmed for the whole table, and the date
/// column is parsed with unparseable values turned into nulls.
#[test]
fn detect_schema_normalizes_names_and_dates() {
    let csv = "\
 Owner ,PRIORITY,Created Date,Notes
Al,High,2024-01-10,first
Bo,Low,not a date,second
Cy,Low,,third
";
    let dataset = Dataset::from_csv_str(csv).unwrap();
    let (dataset, roles) = detect_schema(dataset, &DeskConfig::default_test());

    assert_eq!(dataset.columns(), &["owner", "priority", "created date", "notes"]);
    assert_eq!(roles.column(Role::Date), Some("created date"));

    let idx = dataset.column_index("created date").unwrap();
    assert!(matches!(dataset.rows()[0][idx], CellValue::Date(_)));
    assert_eq!(dataset.rows()[1][idx], CellValue::Null);
    assert_eq!(dataset.rows()[2][idx], CellValue::Null);
    assert_eq!(dataset.len(), 3, "bad dates never drop rows");
}

/// Headers that only differ by case or padding stay separate columns,
/// and each keeps its own role.
#[test]
fn colliding_headers_get_distinct_roles() {
    let csv = "Owner_Alert,owner_alert \nAl,Disk full\nBo,CPU high\n";
    let (ds, roles) = detect_schema(Dataset::from_csv_str(csv).unwrap(), &DeskConfig::default_test());

    assert_eq!(ds.columns(), &["owner_alert".to_string(), "owner_alert_2".to_string()]);
    assert_eq!(roles.column(Role::Owner), Some("owner_alert"));
    assert_eq!(roles.column(Role::Alert), Some("owner_alert_2"));

    let alerts: Vec<String> = ds
        .full_view()
        .column_values("owner_alert_2")
        .iter()
        .map(|v| v.to_text())
        .collect();
    assert_eq!(alerts, vec!["Disk full", "CPU high"]);
}
