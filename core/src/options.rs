//! Selector contents for the filter panel.

use crate::{
    dataset::Dataset,
    filter::{month_name, quarter},
    schema::RoleMap,
    types::{CellValue, Role},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateBounds {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

/// Everything a UI needs to populate its selectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterPanel {
    pub roles:       RoleMap,
    /// Distinct values for each detected non-date role.
    pub options:     BTreeMap<Role, Vec<CellValue>>,
    pub date_bounds: Option<DateBounds>,
    pub months:      Vec<String>,
    pub quarters:    Vec<u32>,
}

impl FilterPanel {
    pub fn build(dataset: &Dataset, roles: &RoleMap) -> Self {
        let options = roles
            .present()
            .filter(|(role, _)| *role != Role::Date)
            .map(|(role, _)| (role, filter_options(dataset, roles, role)))
            .collect();
        Self {
            roles: roles.clone(),
            options,
            date_bounds: date_bounds(dataset, roles),
            months: month_options(dataset, roles),
            quarters: quarter_options(dataset, roles),
        }
    }
}

/// Distinct non-null values of the role's column, in first-appearance order.
pub fn filter_options(dataset: &Dataset, roles: &RoleMap, role: Role) -> Vec<CellValue> {
    let Some(idx) = roles.column(role).and_then(|c| dataset.column_index(c)) else {
        return Vec::new();
    };
    let mut out: Vec<CellValue> = Vec::new();
    for row in dataset.rows() {
        let value = &row[idx];
        if !value.is_null() && !out.contains(value) {
            out.push(value.clone());
        }
    }
    out
}

pub fn month_options(dataset: &Dataset, roles: &RoleMap) -> Vec<String> {
    let mut seen = HashSet::new();
    dates(dataset, roles)
        .map(month_name)
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect()
}

pub fn quarter_options(dataset: &Dataset, roles: &RoleMap) -> Vec<u32> {
    let mut seen = HashSet::new();
    dates(dataset, roles)
        .map(quarter)
        .filter(|q| seen.insert(*q))
        .collect()
}

pub fn date_bounds(dataset: &Dataset, roles: &RoleMap) -> Option<DateBounds> {
    dates(dataset, roles).fold(None, |acc, d| {
        let day = d.date();
        Some(match acc {
            None => DateBounds { min: day, max: day },
            Some(b) => DateBounds { min: b.min.min(day), max: b.max.max(day) },
        })
    })
}

fn dates<'a>(
    dataset: &'a Dataset,
    roles: &RoleMap,
) -> impl Iterator<Item = chrono::NaiveDateTime> + 'a {
    let idx = roles.column(Role::Date).and_then(|c| dataset.column_index(c));
    dataset
        .rows()
        .iter()
        .filter_map(move |row| idx.and_then(|i| row[i].as_date()))
}
