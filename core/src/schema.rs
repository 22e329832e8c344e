//! Schema detection — which column plays which role.
//!
//! DETECTION ORDER (fixed, never reordered):
//!   owner, alert, priority, change, date
//!
//! RULES:
//!   - Each role scans columns in their original order; first match wins.
//!   - A column claimed by an earlier role is skipped by later roles.
//!   - Column names are lowercased and trimmed here, once, for the whole table.
//!     Names that collide after that get `_2`, `_3`, ... so each stays addressable.
//!   - Date values that fail to parse become nulls; they never fail the load.

use crate::{
    config::DeskConfig,
    dataset::Dataset,
    types::{CellValue, Role},
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The detected role → column assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMap {
    pub owner:    Option<String>,
    pub alert:    Option<String>,
    pub priority: Option<String>,
    pub change:   Option<String>,
    pub date:     Option<String>,
}

impl RoleMap {
    /// Assign roles from an ordered list of column names.
    pub fn detect<S: AsRef<str>>(columns: &[S]) -> Self {
        let normalized = normalize_columns(columns);
        let mut claimed = vec![false; normalized.len()];
        let mut map = RoleMap::default();

        for role in Role::ALL {
            let hit = normalized
                .iter()
                .enumerate()
                .find(|(i, name)| !claimed[*i] && name.contains(role.keyword()));
            if let Some((i, name)) = hit {
                claimed[i] = true;
                *map.slot_mut(role) = Some(name.clone());
            }
        }
        map
    }

    pub fn column(&self, role: Role) -> Option<&str> {
        match role {
            Role::Owner    => self.owner.as_deref(),
            Role::Alert    => self.alert.as_deref(),
            Role::Priority => self.priority.as_deref(),
            Role::Change   => self.change.as_deref(),
            Role::Date     => self.date.as_deref(),
        }
    }

    fn slot_mut(&mut self, role: Role) -> &mut Option<String> {
        match role {
            Role::Owner    => &mut self.owner,
            Role::Alert    => &mut self.alert,
            Role::Priority => &mut self.priority,
            Role::Change   => &mut self.change,
            Role::Date     => &mut self.date,
        }
    }

    pub fn contains(&self, role: Role) -> bool {
        self.column(role).is_some()
    }

    /// Detected roles with their columns, in detection order.
    pub fn present(&self) -> impl Iterator<Item = (Role, &str)> + '_ {
        Role::ALL
            .into_iter()
            .filter_map(move |role| self.column(role).map(|c| (role, c)))
    }

    pub fn missing(&self) -> impl Iterator<Item = Role> + '_ {
        Role::ALL.into_iter().filter(move |role| !self.contains(*role))
    }
}

pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Normalize every name, suffixing later duplicates until each name is unique.
pub fn normalize_columns<S: AsRef<str>>(columns: &[S]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(columns.len());
    let mut out = Vec::with_capacity(columns.len());
    for column in columns {
        let base = normalize_column_name(column.as_ref());
        let mut name = base.clone();
        let mut n = 2;
        while seen.contains(&name) {
            name = format!("{base}_{n}");
            n += 1;
        }
        seen.insert(name.clone());
        out.push(name);
    }
    out
}

/// Parses raw cells of the date column using the configured formats.
#[derive(Debug, Clone)]
pub struct DateParser {
    date_formats:     Vec<String>,
    datetime_formats: Vec<String>,
}

impl DateParser {
    pub fn from_config(config: &DeskConfig) -> Self {
        Self {
            date_formats:     config.date_formats.clone(),
            datetime_formats: config.datetime_formats.clone(),
        }
    }

    pub fn parse(&self, cell: &CellValue) -> Option<NaiveDateTime> {
        match cell {
            CellValue::Date(d) => Some(*d),
            CellValue::Text(s) => self.parse_str(s),
            _ => None,
        }
    }

    pub fn parse_str(&self, raw: &str) -> Option<NaiveDateTime> {
        let s = raw.trim();
        if s.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            // Keep the wall-clock time written in the file, not its UTC instant.
            return Some(dt.naive_local());
        }
        for fmt in &self.datetime_formats {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(dt);
            }
        }
        for fmt in &self.date_formats {
            if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
                return d.and_hms_opt(0, 0, 0);
            }
        }
        None
    }
}

/// Normalize column names, detect roles and parse the date column.
pub fn detect_schema(dataset: Dataset, config: &DeskConfig) -> (Dataset, RoleMap) {
    let (columns, mut rows) = dataset.into_parts();
    let renamed = normalize_columns(&columns);
    for (before, after) in columns.iter().zip(&renamed) {
        if normalize_column_name(before) != *after {
            log::warn!("Duplicate column '{before}' renamed to '{after}'");
        }
    }
    let columns = renamed;
    let roles = RoleMap::detect(&columns);

    for (role, column) in roles.present() {
        log::debug!("Role '{role}' -> column '{column}'");
    }
    for role in roles.missing() {
        log::warn!("No column detected for role '{role}'; its filters and charts are omitted");
    }

    let date_idx = roles
        .date
        .as_deref()
        .and_then(|name| columns.iter().position(|c| c == name));
    if let Some(idx) = date_idx {
        let parser = DateParser::from_config(config);
        let mut dropped = 0usize;
        for row in rows.iter_mut() {
            let parsed = parser.parse(&row[idx]);
            if parsed.is_none() && !row[idx].is_null() {
                dropped += 1;
            }
            row[idx] = parsed.map(CellValue::Date).unwrap_or(CellValue::Null);
        }
        if dropped > 0 {
            log::warn!("{dropped} value(s) in date column could not be parsed and were nulled");
        }
    }

    (Dataset::new(columns, rows), roles)
}
