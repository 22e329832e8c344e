//! Shared primitive types used across the entire desk.

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// One row of the dataset, positionally aligned with `Dataset::columns`.
pub type Row = Vec<CellValue>;

/// The semantic role a column can be detected as.
/// The variant order is the detection order — never reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Owner,
    Alert,
    Priority,
    Change,
    Date,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Owner,
        Role::Alert,
        Role::Priority,
        Role::Change,
        Role::Date,
    ];

    /// Substring a normalized column name must contain to take this role.
    pub fn keyword(self) -> &'static str {
        match self {
            Role::Owner    => "owner",
            Role::Alert    => "alert",
            Role::Priority => "priority",
            Role::Change   => "change",
            Role::Date     => "date",
        }
    }

    /// Plural label used on KPI cards.
    pub fn plural_label(self) -> &'static str {
        match self {
            Role::Owner    => "Owners",
            Role::Alert    => "Alerts",
            Role::Priority => "Priorities",
            Role::Change   => "Change Numbers",
            Role::Date     => "Dates",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A single typed cell.
///
/// Ordering is total: nulls first, then booleans, numbers (integers and
/// decimals compare exactly with each other), text, and dates last.
#[derive(Debug, Clone)]
pub enum CellValue {
    Null,
    Boolean(bool),
    /// An integer whose text is exactly its decimal form.
    Integer(i64),
    /// Any other number. `raw` is the source text and is what gets displayed.
    Number { value: f64, raw: String },
    Text(String),
    Date(NaiveDateTime),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Plain string form used by search and export. Nulls render empty.
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    /// Map a JSON value onto a cell. Arrays and objects keep their JSON text.
    pub fn from_json(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => CellValue::Null,
            Value::Bool(b) => CellValue::Boolean(b),
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => CellValue::Integer(i),
                (None, Some(value)) => CellValue::Number { value, raw: n.to_string() },
                (None, None) => CellValue::Text(n.to_string()),
            },
            Value::String(s) => CellValue::Text(s),
            other => CellValue::Text(other.to_string()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            CellValue::Null => 0,
            CellValue::Boolean(_) => 1,
            CellValue::Integer(_) | CellValue::Number { .. } => 2,
            CellValue::Text(_) => 3,
            CellValue::Date(_) => 4,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Boolean(b) => write!(f, "{b}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Number { raw, .. } => f.write_str(raw),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Date(d) => {
                if d.time().num_seconds_from_midnight() == 0 && d.time().nanosecond() == 0 {
                    write!(f, "{}", d.format("%Y-%m-%d"))
                } else {
                    write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S"))
                }
            }
        }
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use CellValue::*;
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Boolean(a), Boolean(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Integer(a), Number { value: b, .. }) => cmp_int_float(*a, *b),
            (Number { value: a, .. }, Integer(b)) => cmp_int_float(*b, *a).reverse(),
            (Number { value: a, .. }, Number { value: b, .. }) => {
                a.partial_cmp(b).unwrap_or_else(|| a.total_cmp(b))
            }
            (Text(a), Text(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Exact comparison of an integer with a float, without rounding the integer.
fn cmp_int_float(i: i64, f: f64) -> Ordering {
    const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;
    if f.is_nan() || f >= TWO_POW_63 {
        return Ordering::Less;
    }
    if f < -TWO_POW_63 {
        return Ordering::Greater;
    }
    let whole = f.trunc();
    i.cmp(&(whole as i64))
        .then_with(|| 0.0f64.partial_cmp(&(f - whole)).unwrap_or(Ordering::Equal))
}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CellValue {}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<f64> for CellValue {
    fn from(x: f64) -> Self {
        CellValue::Number { value: x, raw: x.to_string() }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Null => serializer.serialize_none(),
            CellValue::Boolean(b) => serializer.serialize_bool(*b),
            CellValue::Integer(i) => serializer.serialize_i64(*i),
            CellValue::Number { value, .. } => serializer.serialize_f64(*value),
            CellValue::Text(s) => serializer.serialize_str(s),
            CellValue::Date(_) => serializer.serialize_str(&self.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for CellValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(CellValue::from_json(value))
    }
}
