//! The filter engine.
//!
//! Every active predicate is ANDed. Absent or empty predicates impose no
//! restriction. Roles missing from the RoleMap are exempt from their
//! predicates, and a null date never satisfies an active date predicate.

use crate::{
    dataset::{Dataset, FilteredView},
    schema::RoleMap,
    types::{CellValue, Role},
};
use chrono::{Datelike, Month, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Inclusive calendar-date range. Time of day is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end:   NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// An inverted range (start after end) contains nothing.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }
}

/// The user's filter choices for one query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Allowed values per role. An empty list is no restriction.
    #[serde(default)]
    pub values:     BTreeMap<Role, Vec<CellValue>>,
    #[serde(default)]
    pub date_range: Option<DateRange>,
    /// English full month names, e.g. "January".
    #[serde(default)]
    pub months:     Vec<String>,
    /// Calendar quarters, 1 to 4.
    #[serde(default)]
    pub quarters:   Vec<u32>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<I, V>(mut self, role: Role, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        self.values.insert(role, values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.date_range = Some(DateRange::new(start, end));
        self
    }

    pub fn with_months<I, S>(mut self, months: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.months = months.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_quarters(mut self, quarters: impl IntoIterator<Item = u32>) -> Self {
        self.quarters = quarters.into_iter().collect();
        self
    }

    /// True when no predicate would remove a row.
    pub fn is_unrestricted(&self) -> bool {
        self.values.values().all(Vec::is_empty)
            && self.date_range.is_none()
            && self.months.is_empty()
            && self.quarters.is_empty()
    }

    fn has_date_predicate(&self) -> bool {
        self.date_range.is_some() || !self.months.is_empty() || !self.quarters.is_empty()
    }

    fn date_matches(&self, date: NaiveDateTime) -> bool {
        if let Some(range) = &self.date_range {
            if !range.contains(date.date()) {
                return false;
            }
        }
        if !self.months.is_empty() {
            let name = month_name(date);
            if !self.months.iter().any(|m| m.trim().eq_ignore_ascii_case(name)) {
                return false;
            }
        }
        if !self.quarters.is_empty() && !self.quarters.contains(&quarter(date)) {
            return false;
        }
        true
    }
}

/// English full month name of a date.
pub fn month_name(date: NaiveDateTime) -> &'static str {
    Month::try_from(date.month() as u8)
        .map(|m| m.name())
        .unwrap_or("")
}

/// Calendar quarter, ceil(month / 3).
pub fn quarter(date: NaiveDateTime) -> u32 {
    (date.month() + 2) / 3
}

/// Produce the rows of `dataset` satisfying every predicate in `spec`.
pub fn apply<'a>(dataset: &'a Dataset, roles: &RoleMap, spec: &FilterSpec) -> FilteredView<'a> {
    if spec.is_unrestricted() {
        return dataset.full_view();
    }

    // (column index, allowed values) for each active, detectable role predicate.
    let membership: Vec<(usize, &[CellValue])> = spec
        .values
        .iter()
        .filter(|(_, allowed)| !allowed.is_empty())
        .filter_map(|(role, allowed)| {
            let idx = roles.column(*role).and_then(|c| dataset.column_index(c))?;
            Some((idx, allowed.as_slice()))
        })
        .collect();

    let date_idx = if spec.has_date_predicate() {
        roles.column(Role::Date).and_then(|c| dataset.column_index(c))
    } else {
        None
    };

    let indices = dataset
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            membership
                .iter()
                .all(|(idx, allowed)| allowed.contains(&row[*idx]))
        })
        .filter(|(_, row)| match date_idx {
            Some(idx) => row[idx].as_date().is_some_and(|d| spec.date_matches(d)),
            None => true,
        })
        .map(|(i, _)| i)
        .collect::<Vec<_>>();

    log::debug!("Filter kept {} of {} rows", indices.len(), dataset.len());
    FilteredView::new(dataset, indices)
}
