//! Analyzer configuration management.
//!
//! Configuration is layered: defaults, then an optional TOML file, then
//! `ANALYZER_*` environment variables, then command-line arguments.
//!
//! ```toml
//! lookback_days = 90
//! stress_windows = [30, 60, 90]
//!
//! [portfolio]
//! AAPL = 0.6
//! MSFT = 0.4
//!
//! [source]
//! kind = "csv"
//! data_dir = "data/prices"
//!
//! [llm]
//! model = "gpt-4o"
//! ```

use chrono::NaiveDate;
use risk_core::market_risk::{
    DEFAULT_STRESS_LOOKBACK_YEARS, DEFAULT_STRESS_WINDOWS, DEFAULT_VAR_CONFIDENCE,
};
use risk_core::volatility::DEFAULT_RISK_FREE_RATE;
use risk_core::Portfolio;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Tolerance on the sum of portfolio weights.
const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Where closing prices come from.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Seeded GBM simulation
    #[default]
    Synthetic,
    /// One CSV file per asset
    Csv,
}

impl FromStr for SourceKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "synthetic" => Ok(Self::Synthetic),
            "csv" => Ok(Self::Csv),
            other => Err(ConfigError::Parse(format!(
                "unknown source '{other}'. Valid values: synthetic, csv"
            ))),
        }
    }
}

/// Price source settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Source kind
    pub kind: SourceKind,
    /// Directory of `<ASSET>.csv` files (csv source)
    pub data_dir: PathBuf,
    /// RNG seed (synthetic source)
    pub seed: u64,
    /// Last date of the lookback; today (synthetic) or latest file date (csv) if unset
    pub end_date: Option<NaiveDate>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            data_dir: PathBuf::from("data/prices"),
            seed: 42,
            end_date: None,
        }
    }
}

/// Text generator settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the chat-completions API
    pub endpoint: String,
    /// Model name
    pub model: String,
    /// Sampling temperature
    pub temperature: f64,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: adapter_llm::DEFAULT_ENDPOINT.to_string(),
            model: adapter_llm::DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Analyzer configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzerConfig {
    /// Asset → allocation weight
    #[serde(default = "default_portfolio")]
    pub portfolio: BTreeMap<String, f64>,

    /// Calendar days of history for VaR, volatility and correlation
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,

    /// Years of history for the stress test
    #[serde(default = "default_stress_lookback_years")]
    pub stress_lookback_years: u32,

    /// Stress-test window lengths in trading days
    #[serde(default = "default_stress_windows")]
    pub stress_windows: Vec<usize>,

    /// VaR confidence level
    #[serde(default = "default_var_confidence")]
    pub var_confidence: f64,

    /// Annual risk-free rate for the Sharpe ratio
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Price source
    #[serde(default)]
    pub source: SourceConfig,

    /// Text generator
    #[serde(default)]
    pub llm: LlmConfig,
}

fn default_portfolio() -> BTreeMap<String, f64> {
    [
        ("JPM", 0.10),
        ("XOM", 0.10),
        ("JNJ", 0.10),
        ("BRK-B", 0.10),
        ("GS", 0.10),
        ("TSLA", 0.10),
        ("AMZN", 0.10),
        ("MSFT", 0.10),
        ("AAPL", 0.10),
        ("GOOGL", 0.10),
    ]
    .into_iter()
    .map(|(k, w)| (k.to_string(), w))
    .collect()
}

fn default_lookback_days() -> u32 {
    90
}

fn default_stress_lookback_years() -> u32 {
    DEFAULT_STRESS_LOOKBACK_YEARS
}

fn default_stress_windows() -> Vec<usize> {
    DEFAULT_STRESS_WINDOWS.to_vec()
}

fn default_var_confidence() -> f64 {
    DEFAULT_VAR_CONFIDENCE
}

fn default_risk_free_rate() -> f64 {
    DEFAULT_RISK_FREE_RATE
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            portfolio: default_portfolio(),
            lookback_days: default_lookback_days(),
            stress_lookback_years: default_stress_lookback_years(),
            stress_windows: default_stress_windows(),
            var_confidence: default_var_confidence(),
            risk_free_rate: default_risk_free_rate(),
            log_level: default_log_level(),
            source: SourceConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

/// Command-line overrides; `None` leaves the lower layers untouched.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// Config file path
    pub config_file: Option<PathBuf>,
    /// Lookback override
    pub lookback_days: Option<u32>,
    /// Source kind override
    pub source: Option<SourceKind>,
    /// CSV directory override
    pub data_dir: Option<PathBuf>,
    /// Seed override
    pub seed: Option<u64>,
    /// Log level override
    pub log_level: Option<String>,
}

impl AnalyzerConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply `ANALYZER_*` environment variable overrides
    pub fn with_env_override(self) -> Result<Self, ConfigError> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply `ANALYZER_*` overrides read through `lookup`.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(days) = lookup("ANALYZER_LOOKBACK_DAYS") {
            self.lookback_days = parse_env("ANALYZER_LOOKBACK_DAYS", &days)?;
        }
        if let Some(level) = lookup("ANALYZER_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(kind) = lookup("ANALYZER_SOURCE") {
            self.source.kind = kind.parse()?;
        }
        if let Some(dir) = lookup("ANALYZER_DATA_DIR") {
            self.source.data_dir = PathBuf::from(dir);
        }
        if let Some(seed) = lookup("ANALYZER_SEED") {
            self.source.seed = parse_env("ANALYZER_SEED", &seed)?;
        }
        if let Some(model) = lookup("ANALYZER_LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(endpoint) = lookup("ANALYZER_LLM_ENDPOINT") {
            self.llm.endpoint = endpoint;
        }
        Ok(self)
    }

    /// Apply command-line overrides
    pub fn with_cli_override(mut self, cli: &CliOverrides) -> Self {
        if let Some(days) = cli.lookback_days {
            self.lookback_days = days;
        }
        if let Some(kind) = cli.source {
            self.source.kind = kind;
        }
        if let Some(dir) = &cli.data_dir {
            self.source.data_dir = dir.clone();
        }
        if let Some(seed) = cli.seed {
            self.source.seed = seed;
        }
        if let Some(level) = &cli.log_level {
            self.log_level = level.clone();
        }
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.portfolio.is_empty() {
            errors.push("portfolio cannot be empty".to_string());
        }
        for (asset, weight) in &self.portfolio {
            if !(0.0..=1.0).contains(weight) {
                errors.push(format!(
                    "portfolio weight for '{asset}' is {weight}, must be within [0, 1]"
                ));
            }
        }
        let total: f64 = self.portfolio.values().sum();
        if !self.portfolio.is_empty() && (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            errors.push(format!("portfolio weights sum to {total:.4}, expected 1.0"));
        }

        if self.lookback_days == 0 {
            errors.push("lookback_days must be greater than 0".to_string());
        }
        if self.stress_lookback_years == 0 {
            errors.push("stress_lookback_years must be greater than 0".to_string());
        }
        if self.stress_windows.is_empty() {
            errors.push("stress_windows cannot be empty".to_string());
        }
        if self.stress_windows.contains(&0) {
            errors.push("stress_windows entries must be greater than 0".to_string());
        }

        if !(self.var_confidence > 0.0 && self.var_confidence < 1.0) {
            errors.push(format!(
                "var_confidence {} must be within (0, 1)",
                self.var_confidence
            ));
        }

        if !VALID_LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            errors.push(format!(
                "Invalid log_level '{}'. Valid values: {:?}",
                self.log_level, VALID_LOG_LEVELS
            ));
        }

        if !self.llm.endpoint.starts_with("http://") && !self.llm.endpoint.starts_with("https://")
        {
            errors.push(format!(
                "Invalid llm.endpoint '{}'. Must start with http:// or https://",
                self.llm.endpoint
            ));
        }

        if self.source.kind == SourceKind::Csv && self.source.data_dir.as_os_str().is_empty() {
            errors.push("source.data_dir cannot be empty for the csv source".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Portfolio built from the configured weights.
    pub fn portfolio(&self) -> Portfolio {
        Portfolio::new(self.portfolio.iter().map(|(k, w)| (k.clone(), *w)))
    }
}

/// Build configuration from all sources and validate it.
///
/// Priority (lowest to highest):
/// 1. Defaults
/// 2. Config file (if provided)
/// 3. Environment variables
/// 4. CLI arguments
pub fn build_config(cli: &CliOverrides) -> Result<AnalyzerConfig, ConfigError> {
    let config = match &cli.config_file {
        Some(path) => AnalyzerConfig::load(path)?,
        None => AnalyzerConfig::default(),
    };
    let config = config.with_env_override()?.with_cli_override(cli);
    config.validate()?;
    Ok(config)
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Parse(format!("{key}='{value}' is not a valid value")))
}

/// Configuration error type
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("IO error: {0}")]
    Io(String),
    /// Parse error in config file or environment
    #[error("Parse error: {0}")]
    Parse(String),
    /// Validation error
    #[error("Validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn validation_errors(config: &AnalyzerConfig) -> Vec<String> {
        match config.validate() {
            Err(ConfigError::Validation(errors)) => errors,
            other => panic!("Expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_default_config_validates() {
        let config = AnalyzerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.portfolio.len(), 10);
        assert_eq!(config.lookback_days, 90);
        assert_eq!(config.stress_windows, vec![30, 60, 90]);
        assert_eq!(config.llm.model, "gpt-4o");
    }

    #[test]
    fn test_from_toml_partial() {
        let config = AnalyzerConfig::from_toml(
            r#"
            lookback_days = 60
            stress_windows = [20, 40]

            [portfolio]
            AAPL = 0.6
            MSFT = 0.4

            [source]
            kind = "csv"
            data_dir = "fixtures"
            end_date = "2024-06-28"
            "#,
        )
        .unwrap();
        assert_eq!(config.lookback_days, 60);
        assert_eq!(config.stress_windows, vec![20, 40]);
        assert_eq!(config.portfolio.len(), 2);
        assert_eq!(config.source.kind, SourceKind::Csv);
        assert_eq!(config.source.seed, 42);
        assert_eq!(config.source.end_date, NaiveDate::from_ymd_opt(2024, 6, 28));
        assert_eq!(config.var_confidence, 0.95);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_example_config_validates() {
        let config =
            AnalyzerConfig::from_toml(include_str!("../../../config/analyzer.example.toml"))
                .unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.portfolio.len(), 5);
    }

    #[test]
    fn test_from_toml_rejects_unknown_source() {
        let err = AnalyzerConfig::from_toml("[source]\nkind = \"bloomberg\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_env_override() {
        let env: HashMap<&str, &str> = [
            ("ANALYZER_LOOKBACK_DAYS", "30"),
            ("ANALYZER_SOURCE", "CSV"),
            ("ANALYZER_LLM_MODEL", "local-model"),
        ]
        .into_iter()
        .collect();
        let config = AnalyzerConfig::default()
            .with_overrides_from(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.lookback_days, 30);
        assert_eq!(config.source.kind, SourceKind::Csv);
        assert_eq!(config.llm.model, "local-model");
    }

    #[test]
    fn test_env_override_bad_number() {
        let result = AnalyzerConfig::default().with_overrides_from(|k| {
            (k == "ANALYZER_LOOKBACK_DAYS").then(|| "ninety".to_string())
        });
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_cli_takes_precedence() {
        let cli = CliOverrides {
            lookback_days: Some(45),
            seed: Some(7),
            ..CliOverrides::default()
        };
        let config = AnalyzerConfig::default()
            .with_overrides_from(|k| (k == "ANALYZER_LOOKBACK_DAYS").then(|| "30".to_string()))
            .unwrap()
            .with_cli_override(&cli);
        assert_eq!(config.lookback_days, 45);
        assert_eq!(config.source.seed, 7);
    }

    #[test]
    fn test_validate_portfolio_weights() {
        let mut config = AnalyzerConfig::default();
        config.portfolio = [("AAPL".to_string(), 1.5), ("MSFT".to_string(), 0.1)]
            .into_iter()
            .collect();
        let errors = validation_errors(&config);
        assert!(errors.iter().any(|e| e.contains("'AAPL'")));
        assert!(errors.iter().any(|e| e.contains("sum to")));
    }

    #[test]
    fn test_validate_empty_portfolio() {
        let mut config = AnalyzerConfig::default();
        config.portfolio.clear();
        let errors = validation_errors(&config);
        assert_eq!(errors, vec!["portfolio cannot be empty".to_string()]);
    }

    #[test]
    fn test_validate_windows_and_confidence() {
        let mut config = AnalyzerConfig::default();
        config.stress_windows = vec![30, 0];
        config.var_confidence = 1.0;
        let errors = validation_errors(&config);
        assert!(errors.iter().any(|e| e.contains("stress_windows")));
        assert!(errors.iter().any(|e| e.contains("var_confidence")));
    }

    #[test]
    fn test_validate_log_levels() {
        for level in ["trace", "debug", "info", "warn", "error", "INFO"] {
            let mut config = AnalyzerConfig::default();
            config.log_level = level.to_string();
            assert!(config.validate().is_ok(), "Log level '{level}' should be valid");
        }
        let mut config = AnalyzerConfig::default();
        config.log_level = "loud".to_string();
        assert!(validation_errors(&config).iter().any(|e| e.contains("log_level")));
    }

    #[test]
    fn test_validate_multiple_errors() {
        let mut config = AnalyzerConfig::default();
        config.lookback_days = 0;
        config.log_level = "invalid".to_string();
        config.llm.endpoint = "api.openai.com".to_string();
        assert!(validation_errors(&config).len() >= 3);
    }

    #[test]
    fn test_build_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analyzer.toml");
        std::fs::write(&path, "lookback_days = 120\n[portfolio]\nSPY = 1.0\n").unwrap();

        let cli = CliOverrides {
            config_file: Some(path),
            log_level: Some("debug".to_string()),
            ..CliOverrides::default()
        };
        let config = build_config(&cli).unwrap();
        assert_eq!(config.portfolio().weight("SPY"), Some(1.0));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = AnalyzerConfig::load(Path::new("/nonexistent/analyzer.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_config_error_display() {
        let error = ConfigError::Validation(vec!["Error 1".to_string(), "Error 2".to_string()]);
        let display = error.to_string();
        assert!(display.contains("Error 1"));
        assert!(display.contains("Error 2"));
    }
}
