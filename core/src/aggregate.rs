//! The aggregation engine — KPI counts and chart series over a filtered view.

use crate::{
    dataset::FilteredView,
    schema::RoleMap,
    types::{CellValue, Role},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Roles that always get a chart series, in display order.
pub const CHART_ROLES: [Role; 2] = [Role::Owner, Role::Priority];

/// Roles that get a "Unique …" KPI card, in display order.
pub const KPI_ROLES: [Role; 4] = [Role::Owner, Role::Priority, Role::Alert, Role::Change];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupCount {
    pub value: CellValue,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub role:   Role,
    /// None when the role was not detected; the series is then empty.
    pub column: Option<String>,
    pub points: Vec<GroupCount>,
}

impl ChartSeries {
    pub fn count_for(&self, value: &CellValue) -> Option<usize> {
        self.points.iter().find(|p| &p.value == value).map(|p| p.count)
    }

    pub fn total(&self) -> usize {
        self.points.iter().map(|p| p.count).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpi {
    pub label: String,
    pub value: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub total:         usize,
    /// Distinct non-null values per detected role.
    pub unique_counts: BTreeMap<Role, usize>,
    /// One series per chart role, present or not.
    pub grouped:       BTreeMap<Role, ChartSeries>,
}

impl AggregateResult {
    pub fn unique(&self, role: Role) -> Option<usize> {
        self.unique_counts.get(&role).copied()
    }

    pub fn series(&self, role: Role) -> Option<&ChartSeries> {
        self.grouped.get(&role)
    }

    /// KPI cards: total first, then one per detected KPI role.
    pub fn kpis(&self) -> Vec<Kpi> {
        let mut cards = vec![Kpi { label: "Total Alerts".into(), value: self.total }];
        cards.extend(KPI_ROLES.iter().filter_map(|role| {
            self.unique(*role).map(|value| Kpi {
                label: format!("Unique {}", role.plural_label()),
                value,
            })
        }));
        cards
    }
}

/// Count rows, distinct values per role, and group the chart roles.
pub fn summarize(view: &FilteredView<'_>, roles: &RoleMap) -> AggregateResult {
    let unique_counts = roles
        .present()
        .map(|(role, column)| {
            let distinct: BTreeSet<&CellValue> = view
                .column_values(column)
                .into_iter()
                .filter(|v| !v.is_null())
                .collect();
            (role, distinct.len())
        })
        .collect();

    let grouped = CHART_ROLES
        .iter()
        .map(|role| {
            let column = roles.column(*role);
            let points = column.map(|c| group_counts(view, c)).unwrap_or_default();
            (
                *role,
                ChartSeries {
                    role: *role,
                    column: column.map(str::to_string),
                    points,
                },
            )
        })
        .collect();

    AggregateResult {
        total: view.len(),
        unique_counts,
        grouped,
    }
}

/// Distinct non-null value → row count, ordered by value.
pub fn group_counts(view: &FilteredView<'_>, column: &str) -> Vec<GroupCount> {
    let mut counts: BTreeMap<&CellValue, usize> = BTreeMap::new();
    for value in view.column_values(column) {
        if !value.is_null() {
            *counts.entry(value).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .map(|(value, count)| GroupCount { value: value.clone(), count })
        .collect()
}
