//! Runtime settings loaded from `FUNDSHEET_*` environment variables.
//!
//! Nested keys use `__`: `FUNDSHEET_API__RETRY_BUDGET=3` sets
//! `api.retry_budget`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::adapters::cafci::{CafciConfig, DEFAULT_BASE_URL};
use crate::mapper::ClassFilter;
use crate::retry::RetryConfig;

const ENV_PREFIX: &str = "FUNDSHEET";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error("invalid setting '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Fund-data API connection and retry policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSettings {
    pub base_url: String,
    pub retry_budget: u32,
    pub backoff_step_secs: u64,
    pub timeout_ms: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_BASE_URL),
            retry_budget: 5,
            backoff_step_secs: 60,
            timeout_ms: 30_000,
        }
    }
}

/// Spreadsheet location and credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetsSettings {
    #[serde(default)]
    pub spreadsheet_id: Option<String>,
    #[serde(default, skip_serializing)]
    pub access_token: Option<String>,
    pub credentials_path: PathBuf,
}

impl Default for SheetsSettings {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            access_token: None,
            credentials_path: PathBuf::from("key.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSettings {
    pub workers: usize,
    pub append_chunk: usize,
    pub interval_days: u32,
    pub class_filter: ClassFilter,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            workers: 8,
            append_chunk: 10,
            interval_days: 7,
            class_filter: ClassFilter::All,
        }
    }
}

/// Immutable settings handed to each component at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub api: ApiSettings,
    pub sheets: SheetsSettings,
    pub pipeline: PipelineSettings,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api: ApiSettings::default(),
            sheets: SheetsSettings::default(),
            pipeline: PipelineSettings::default(),
            log_level: String::from("info"),
        }
    }
}

impl Settings {
    /// Loads settings from the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::load(None)
    }

    /// Loads settings from an explicit variable map instead of the environment.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, SettingsError> {
        Self::load(Some(vars))
    }

    fn load(vars: Option<HashMap<String, String>>) -> Result<Self, SettingsError> {
        let defaults = Self::default();

        let settings: Self = config::Config::builder()
            .set_default("api.base_url", defaults.api.base_url.clone())?
            .set_default("api.retry_budget", i64::from(defaults.api.retry_budget))?
            .set_default("api.backoff_step_secs", defaults.api.backoff_step_secs as i64)?
            .set_default("api.timeout_ms", defaults.api.timeout_ms as i64)?
            .set_default(
                "sheets.credentials_path",
                defaults.sheets.credentials_path.to_string_lossy().into_owned(),
            )?
            .set_default("pipeline.workers", defaults.pipeline.workers as i64)?
            .set_default("pipeline.append_chunk", defaults.pipeline.append_chunk as i64)?
            .set_default("pipeline.interval_days", i64::from(defaults.pipeline.interval_days))?
            .set_default("pipeline.class_filter", defaults.pipeline.class_filter.to_string())?
            .set_default("log_level", defaults.log_level.clone())?
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(vars),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let non_zero = [
            ("api.retry_budget", self.api.retry_budget as usize),
            ("pipeline.workers", self.pipeline.workers),
            ("pipeline.append_chunk", self.pipeline.append_chunk),
            ("pipeline.interval_days", self.pipeline.interval_days as usize),
        ];
        for (key, value) in non_zero {
            if value == 0 {
                return Err(SettingsError::Invalid {
                    key,
                    reason: String::from("must be greater than zero"),
                });
            }
        }
        if self.api.base_url.trim().is_empty() {
            return Err(SettingsError::Invalid {
                key: "api.base_url",
                reason: String::from("must not be empty"),
            });
        }
        Ok(())
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::linear(
            self.api.retry_budget,
            Duration::from_secs(self.api.backoff_step_secs),
        )
    }

    pub fn cafci_config(&self) -> CafciConfig {
        CafciConfig {
            base_url: self.api.base_url.clone(),
            timeout_ms: self.api.timeout_ms,
            retry: self.retry_config(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_without_variables() {
        let settings = Settings::from_vars(HashMap::new()).expect("settings");

        assert_eq!(settings.api.base_url, "https://api.cafci.org.ar");
        assert_eq!(settings.api.retry_budget, 5);
        assert_eq!(settings.api.backoff_step_secs, 60);
        assert_eq!(settings.pipeline.workers, 8);
        assert_eq!(settings.pipeline.append_chunk, 10);
        assert_eq!(settings.pipeline.interval_days, 7);
        assert_eq!(settings.pipeline.class_filter, ClassFilter::All);
        assert_eq!(settings.sheets.credentials_path, PathBuf::from("key.json"));
        assert_eq!(settings.sheets.spreadsheet_id, None);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn nested_variables_override_defaults() {
        let settings = Settings::from_vars(vars(&[
            ("FUNDSHEET_API__RETRY_BUDGET", "3"),
            ("FUNDSHEET_PIPELINE__WORKERS", "2"),
            ("FUNDSHEET_PIPELINE__CLASS_FILTER", "A"),
            ("FUNDSHEET_SHEETS__SPREADSHEET_ID", "abc123"),
            ("FUNDSHEET_LOG_LEVEL", "debug"),
        ]))
        .expect("settings");

        assert_eq!(settings.api.retry_budget, 3);
        assert_eq!(settings.pipeline.workers, 2);
        assert_eq!(settings.pipeline.class_filter, ClassFilter::OnlyCode(String::from("A")));
        assert_eq!(settings.sheets.spreadsheet_id.as_deref(), Some("abc123"));
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn zero_workers_are_rejected() {
        let result = Settings::from_vars(vars(&[("FUNDSHEET_PIPELINE__WORKERS", "0")]));
        assert!(matches!(
            result,
            Err(SettingsError::Invalid {
                key: "pipeline.workers",
                ..
            })
        ));
    }

    #[test]
    fn retry_config_uses_linear_step() {
        let settings = Settings::default();
        let retry = settings.retry_config();
        assert_eq!(retry.budget, 5);
        assert_eq!(retry.delay_for_attempt(2), Duration::from_secs(120));
    }
}
