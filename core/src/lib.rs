//! Alert Desk — the query core behind an alert reporting dashboard.
//!
//! PIPELINE (fixed, documented, never reordered):
//!   1. Load      — `dataset`  reads one CSV/JSON file into memory
//!   2. Detect    — `schema`   normalizes names, assigns roles, parses dates
//!   3. Query     — `filter`   → `aggregate`, or `search`, per request
//!   4. Present   — `table`    rows/records/CSV for whatever UI drives us
//!
//! The `desk` module owns the loaded snapshot and the refresh schedule;
//! `command` is the JSON request/reply surface used by `desk-runner`.

pub mod aggregate;
pub mod clock;
pub mod command;
pub mod config;
pub mod dataset;
pub mod desk;
pub mod error;
pub mod filter;
pub mod options;
pub mod schema;
pub mod search;
pub mod table;
pub mod types;

pub use desk::AlertDesk;
pub use error::{DeskError, DeskResult};
