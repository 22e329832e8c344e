//! The desk — the process-wide query handle.
//!
//! RULES:
//!   - The dataset and its RoleMap live together in one immutable snapshot.
//!   - Every query clones the snapshot Arc once and works on that alone.
//!   - Refresh builds a complete new snapshot first, then swaps the Arc.
//!     Nothing is ever mutated in place, so no query sees mixed rows.
//!   - A failed refresh keeps serving the previous snapshot.

use crate::{
    aggregate::{summarize, AggregateResult, Kpi},
    clock::RefreshClock,
    command::{DeskCommand, DeskReply},
    config::DeskConfig,
    dataset::Dataset,
    error::{DeskError, DeskResult},
    filter::{self, FilterSpec},
    options::{self, FilterPanel},
    schema::{detect_schema, RoleMap},
    search,
    table::TableView,
    types::{CellValue, Role},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, RwLock};

/// A loaded dataset together with its detected roles.
#[derive(Debug, Clone)]
pub struct DeskSnapshot {
    pub dataset:   Dataset,
    pub roles:     RoleMap,
    pub loaded_at: DateTime<Utc>,
}

impl DeskSnapshot {
    pub fn build(dataset: Dataset, config: &DeskConfig, loaded_at: DateTime<Utc>) -> Self {
        let (dataset, roles) = detect_schema(dataset, config);
        Self { dataset, roles, loaded_at }
    }

    pub fn load(config: &DeskConfig, loaded_at: DateTime<Utc>) -> DeskResult<Self> {
        let dataset = Dataset::load(&config.data_path)?;
        Ok(Self::build(dataset, config, loaded_at))
    }
}

/// Result of the analysis query: counts, KPI cards and the filtered rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub aggregate: AggregateResult,
    pub kpis:      Vec<Kpi>,
    pub table:     TableView,
}

pub struct AlertDesk {
    config:  DeskConfig,
    current: RwLock<Arc<DeskSnapshot>>,
    clock:   Mutex<RefreshClock>,
}

impl AlertDesk {
    /// Load the configured file and detect its schema.
    /// Any error here is fatal for the caller — there is no degraded mode.
    pub fn open(config: DeskConfig) -> DeskResult<Self> {
        let now = Utc::now();
        let snapshot = DeskSnapshot::load(&config, now)?;
        Ok(Self::with_snapshot(config, snapshot))
    }

    /// Build a desk over an already-loaded table.
    /// Refreshes still read `config.data_path`.
    pub fn from_dataset(dataset: Dataset, config: DeskConfig) -> Self {
        let snapshot = DeskSnapshot::build(dataset, &config, Utc::now());
        Self::with_snapshot(config, snapshot)
    }

    fn with_snapshot(config: DeskConfig, snapshot: DeskSnapshot) -> Self {
        let clock = RefreshClock::new(config.refresh_interval(), snapshot.loaded_at);
        Self {
            config,
            current: RwLock::new(Arc::new(snapshot)),
            clock: Mutex::new(clock),
        }
    }

    pub fn config(&self) -> &DeskConfig {
        &self.config
    }

    /// The snapshot every query in flight should use.
    pub fn snapshot(&self) -> DeskResult<Arc<DeskSnapshot>> {
        let guard = self
            .current
            .read()
            .map_err(|e| DeskError::LockPoisoned(e.to_string()))?;
        Ok(Arc::clone(&guard))
    }

    pub fn role_map(&self) -> DeskResult<RoleMap> {
        Ok(self.snapshot()?.roles.clone())
    }

    pub fn panel(&self) -> DeskResult<FilterPanel> {
        let snap = self.snapshot()?;
        Ok(FilterPanel::build(&snap.dataset, &snap.roles))
    }

    pub fn filter_options(&self, role: Role) -> DeskResult<Vec<CellValue>> {
        let snap = self.snapshot()?;
        Ok(options::filter_options(&snap.dataset, &snap.roles, role))
    }

    pub fn apply_filters(&self, spec: &FilterSpec) -> DeskResult<AnalysisReport> {
        let snap = self.snapshot()?;
        let view = filter::apply(&snap.dataset, &snap.roles, spec);
        let aggregate = summarize(&view, &snap.roles);
        Ok(AnalysisReport {
            kpis: aggregate.kpis(),
            aggregate,
            table: view.to_table(),
        })
    }

    pub fn search(&self, keyword: Option<&str>) -> DeskResult<TableView> {
        let snap = self.snapshot()?;
        Ok(search::search(&snap.dataset, keyword).to_table())
    }

    /// Reload the data file and swap the new snapshot in.
    pub fn refresh(&self, now: DateTime<Utc>) -> DeskResult<Arc<DeskSnapshot>> {
        let fresh = match DeskSnapshot::load(&self.config, now) {
            Ok(s) => Arc::new(s),
            Err(e) => {
                log::error!("Refresh failed, keeping previous dataset: {e}");
                return Err(e);
            }
        };
        {
            let mut slot = self
                .current
                .write()
                .map_err(|e| DeskError::LockPoisoned(e.to_string()))?;
            *slot = Arc::clone(&fresh);
        }
        let mut clock = self
            .clock
            .lock()
            .map_err(|e| DeskError::LockPoisoned(e.to_string()))?;
        clock.mark_loaded(now);
        log::info!(
            "Refreshed dataset: {} rows (reload #{})",
            fresh.dataset.len(),
            clock.reloads
        );
        Ok(fresh)
    }

    /// Refresh only when the schedule says so. Returns whether it ran.
    pub fn refresh_if_due(&self, now: DateTime<Utc>) -> DeskResult<bool> {
        let due = self
            .clock
            .lock()
            .map_err(|e| DeskError::LockPoisoned(e.to_string()))?
            .is_due(now);
        if !due {
            return Ok(false);
        }
        self.refresh(now)?;
        Ok(true)
    }

    pub fn next_refresh(&self) -> DeskResult<DateTime<Utc>> {
        let clock = self
            .clock
            .lock()
            .map_err(|e| DeskError::LockPoisoned(e.to_string()))?;
        Ok(clock.next_due())
    }

    pub fn execute(&self, command: &DeskCommand) -> DeskResult<DeskReply> {
        log::debug!("Executing {command:?}");
        let reply = match command {
            DeskCommand::Panel => DeskReply::Panel { panel: self.panel()? },
            DeskCommand::Options { role } => DeskReply::Options {
                role:   *role,
                values: self.filter_options(*role)?,
            },
            DeskCommand::Apply { filters } => DeskReply::Analysis {
                report: self.apply_filters(filters)?,
            },
            DeskCommand::ExportFiltered { filters } => DeskReply::Csv {
                content: self.apply_filters(filters)?.table.to_csv_string()?,
            },
            DeskCommand::Search { keyword } => DeskReply::Table {
                table: self.search(keyword.as_deref())?,
            },
            DeskCommand::ExportSearch { keyword } => DeskReply::Csv {
                content: self.search(keyword.as_deref())?.to_csv_string()?,
            },
            DeskCommand::Refresh => {
                let snap = self.refresh(Utc::now())?;
                DeskReply::Refreshed {
                    rows:      snap.dataset.len(),
                    loaded_at: snap.loaded_at,
                }
            }
            DeskCommand::Quit => DeskReply::Bye,
        };
        Ok(reply)
    }
}
