use crate::{
    desk::AnalysisReport,
    filter::FilterSpec,
    options::FilterPanel,
    table::TableView,
    types::{CellValue, Role},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// All requests a presentation layer can issue.
/// Variants are added, never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum DeskCommand {
    // ── Selectors ─────────────────────────────────
    Panel,
    Options { role: Role },

    // ── Analysis tab ──────────────────────────────
    Apply {
        #[serde(default)]
        filters: FilterSpec,
    },
    ExportFiltered {
        #[serde(default)]
        filters: FilterSpec,
    },

    // ── Search tab ────────────────────────────────
    Search {
        #[serde(default)]
        keyword: Option<String>,
    },
    ExportSearch {
        #[serde(default)]
        keyword: Option<String>,
    },

    // ── Lifecycle ─────────────────────────────────
    Refresh,
    Quit,
}

/// One reply per command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeskReply {
    Panel { panel: FilterPanel },
    Options { role: Role, values: Vec<CellValue> },
    Analysis { report: AnalysisReport },
    Table { table: TableView },
    Csv { content: String },
    Refreshed { rows: usize, loaded_at: DateTime<Utc> },
    Bye,
}
