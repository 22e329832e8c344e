use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Hours between scheduled reloads of the dataset.
pub const DEFAULT_REFRESH_HOURS: u64 = 12;

/// Longest accepted reload interval: one year.
pub const MAX_REFRESH_HOURS: u64 = 24 * 366;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeskConfig {
    /// The tabular file loaded at startup and on every refresh.
    pub data_path: PathBuf,
    #[serde(default = "default_refresh_hours")]
    pub refresh_interval_hours: u64,
    /// `chrono` formats tried, in order, for date-only values.
    #[serde(default = "default_date_formats")]
    pub date_formats: Vec<String>,
    /// `chrono` formats tried, in order, for values carrying a time of day.
    #[serde(default = "default_datetime_formats")]
    pub datetime_formats: Vec<String>,
}

fn default_refresh_hours() -> u64 {
    DEFAULT_REFRESH_HOURS
}

fn default_date_formats() -> Vec<String> {
    ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%b-%Y"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_datetime_formats() -> Vec<String> {
    [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%m/%d/%Y %H:%M",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl DeskConfig {
    /// Config pointing at `data_path` with every other field defaulted.
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path:              data_path.into(),
            refresh_interval_hours: default_refresh_hours(),
            date_formats:           default_date_formats(),
            datetime_formats:       default_datetime_formats(),
        }
    }

    /// Load from a JSON config file.
    /// In tests, use DeskConfig::default_test().
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
        let config: DeskConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {e}", path.display()))?;
        anyhow::ensure!(
            config.refresh_interval_hours > 0,
            "refresh_interval_hours must be positive"
        );
        anyhow::ensure!(
            config.refresh_interval_hours <= MAX_REFRESH_HOURS,
            "refresh_interval_hours must be at most {MAX_REFRESH_HOURS}, got {}",
            config.refresh_interval_hours
        );
        Ok(config)
    }

    /// Config with hardcoded defaults for use in unit tests.
    pub fn default_test() -> Self {
        Self::new("data/alerts.csv")
    }

    /// The reload interval; saturates instead of overflowing for huge values.
    pub fn refresh_interval(&self) -> chrono::Duration {
        i64::try_from(self.refresh_interval_hours)
            .ok()
            .and_then(chrono::Duration::try_hours)
            .unwrap_or(chrono::Duration::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: DeskConfig =
            serde_json::from_str(r#"{ "data_path": "alerts.csv" }"#).unwrap();
        assert_eq!(config.refresh_interval_hours, 12);
        assert_eq!(config.date_formats[0], "%Y-%m-%d");
        assert_eq!(config.refresh_interval(), chrono::Duration::hours(12));
    }

    #[test]
    fn oversized_interval_saturates() {
        let mut config = DeskConfig::default_test();
        config.refresh_interval_hours = u64::MAX;
        assert_eq!(config.refresh_interval(), chrono::Duration::MAX);
    }

    #[test]
    fn load_rejects_out_of_range_intervals() {
        let path = std::env::temp_dir().join(format!("desk-config-{}.json", std::process::id()));
        for hours in [0u64, 1_000_000_000_000_000] {
            let body = format!(r#"{{ "data_path": "alerts.csv", "refresh_interval_hours": {hours} }}"#);
            std::fs::write(&path, body).unwrap();
            let err = DeskConfig::load(&path).unwrap_err();
            assert!(err.to_string().contains("refresh_interval_hours"), "{err}");
        }
        std::fs::write(&path, r#"{ "data_path": "alerts.csv", "refresh_interval_hours": 24 }"#)
            .unwrap();
        assert_eq!(DeskConfig::load(&path).unwrap().refresh_interval_hours, 24);
        let _ = std::fs::remove_file(&path);
    }
}
