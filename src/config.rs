use std::path::Path;

use error_stack::{Report, ResultExt};
use serde::Deserialize;

use crate::error::ConfigError;

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "text".into()
}

fn default_symbol() -> String {
    "KRW-BTC".into()
}

fn default_rsi_period() -> usize {
    14
}

fn default_bollinger_period() -> usize {
    20
}

fn default_std_dev_multiplier() -> f64 {
    2.0
}

fn default_oversold() -> f64 {
    30.0
}

fn default_overbought() -> f64 {
    70.0
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub indicators: IndicatorConfig,
    #[serde(default)]
    pub signal: SignalConfig,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Accepted values: `"text"` | `"json"`
    #[serde(default = "default_log_format")]
    pub log_format: String,
    /// Maximum closes kept in follow mode; 0 keeps everything.
    #[serde(default)]
    pub retention: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            retention: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MarketConfig {
    #[serde(default = "default_symbol")]
    pub symbol: String,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct IndicatorConfig {
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,
    #[serde(default = "default_bollinger_period")]
    pub bollinger_period: usize,
    #[serde(default = "default_std_dev_multiplier")]
    pub std_dev_multiplier: f64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: default_rsi_period(),
            bollinger_period: default_bollinger_period(),
            std_dev_multiplier: default_std_dev_multiplier(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SignalConfig {
    #[serde(default = "default_oversold")]
    pub oversold: f64,
    #[serde(default = "default_overbought")]
    pub overbought: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            oversold: default_oversold(),
            overbought: default_overbought(),
        }
    }
}

/// Load and validate an `AppConfig` from a TOML file at `path`.
pub fn load(path: &Path) -> Result<AppConfig, Report<ConfigError>> {
    let content = std::fs::read_to_string(path)
        .change_context(ConfigError::ReadFile)
        .attach_with(|| format!("path: {}", path.display()))?;

    parse(&content)
}

/// Parse and validate an `AppConfig` from TOML text.
pub fn parse(content: &str) -> Result<AppConfig, Report<ConfigError>> {
    let config: AppConfig = toml::from_str(content).change_context(ConfigError::Parse {
        reason: "invalid TOML syntax or schema mismatch".into(),
    })?;

    validate(&config)?;

    Ok(config)
}

const VALID_LOG_FORMATS: &[&str] = &["text", "json"];

pub fn validate(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    validate_general(config)?;
    validate_indicators(config)?;
    validate_retention(config)?;
    validate_thresholds(config)?;
    Ok(())
}

fn invalid(field: String) -> Report<ConfigError> {
    Report::new(ConfigError::Validation { field })
}

fn validate_general(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    let format = config.general.log_format.as_str();
    if !VALID_LOG_FORMATS.contains(&format) {
        return Err(invalid(format!(
            "general.log_format \"{format}\" must be \"text\" or \"json\""
        )));
    }
    Ok(())
}

fn validate_indicators(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    let indicators = &config.indicators;
    if indicators.rsi_period == 0 {
        return Err(invalid("indicators.rsi_period must be > 0".into()));
    }
    if indicators.bollinger_period == 0 {
        return Err(invalid("indicators.bollinger_period must be > 0".into()));
    }
    let multiplier = indicators.std_dev_multiplier;
    if !multiplier.is_finite() || multiplier <= 0.0 {
        return Err(invalid(format!(
            "indicators.std_dev_multiplier {multiplier} must be > 0"
        )));
    }
    Ok(())
}

/// A non-zero retention must keep enough closes for every indicator.
fn validate_retention(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    let retention = config.general.retention;
    let indicators = &config.indicators;
    let required = indicators
        .rsi_period
        .saturating_add(1)
        .max(indicators.bollinger_period);
    if retention != 0 && retention < required {
        return Err(invalid(format!(
            "general.retention {retention} must be 0 or at least {required}"
        )));
    }
    Ok(())
}

fn validate_thresholds(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    let SignalConfig {
        oversold,
        overbought,
    } = config.signal;
    let in_range = |v: f64| (0.0..=100.0).contains(&v);

    if !in_range(oversold) || !in_range(overbought) {
        return Err(invalid(format!(
            "signal thresholds ({oversold}, {overbought}) must lie in [0, 100]"
        )));
    }
    if oversold >= overbought {
        return Err(invalid(format!(
            "signal.oversold {oversold} must be below signal.overbought {overbought}"
        )));
    }
    Ok(())
}
