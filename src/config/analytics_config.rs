//! Analytics Configuration - cost tables, thresholds and financial assumptions
//!
//! Each section implements `Default` with the constants from `defaults`, so a
//! missing file or a partial file behaves exactly like the built-in tables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;
use crate::types::PlantType;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "CARBONWATCH_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "carbonwatch.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration.
///
/// Load with `AnalyticsConfig::load()` which searches:
/// 1. `$CARBONWATCH_CONFIG` env var
/// 2. `./carbonwatch.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Persistence and fetch limits
    #[serde(default)]
    pub storage: StorageConfig,

    /// Cost rates and shares
    #[serde(default)]
    pub costs: CostConfig,

    /// Recommendation and trend thresholds
    #[serde(default)]
    pub thresholds: ThresholdConfig,

    /// NPV assumptions
    #[serde(default)]
    pub finance: FinanceConfig,

    /// Regression forecast limits
    #[serde(default)]
    pub forecast: ForecastConfig,
}

impl AnalyticsConfig {
    /// Load configuration using the standard search order. A file that fails
    /// to load or validate is logged and skipped.
    pub fn load() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded config from {CONFIG_ENV_VAR}");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {CONFIG_ENV_VAR}, falling back");
                    }
                }
            } else {
                warn!(path = %path, "{CONFIG_ENV_VAR} points to non-existent file, falling back");
            }
        }

        // 2. Check ./carbonwatch.toml
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded config from ./{LOCAL_CONFIG_FILE}");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{LOCAL_CONFIG_FILE}, using defaults");
                }
            }
        }

        // 3. Defaults
        info!("No {LOCAL_CONFIG_FILE} found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate TOML text. Unknown keys are logged as warnings.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate ranges and internal consistency.
    ///
    /// Rules:
    /// - Rates, limits and thresholds must be finite and positive
    /// - Cost shares must each lie in 0-1 and sum to at most 1
    /// - Discount rate must be within (0, 1)
    /// - The default forecast horizon cannot exceed the maximum
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.server.addr.trim().is_empty() {
            errors.push("server.addr must not be empty".to_string());
        }
        if self.storage.recent_record_limit == 0 {
            errors.push("storage.recent_record_limit must be > 0".to_string());
        }
        if self.storage.trend_history_limit == 0 {
            errors.push("storage.trend_history_limit must be > 0".to_string());
        }

        let c = &self.costs;
        for (name, value) in [
            ("costs.coal", c.coal),
            ("costs.natural_gas", c.natural_gas),
            ("costs.oil", c.oil),
            ("costs.biomass", c.biomass),
            ("costs.default", c.default),
            ("costs.carbon_tax_per_ton", c.carbon_tax_per_ton),
            ("costs.maintenance_per_mw", c.maintenance_per_mw),
        ] {
            Self::check_positive(value, name, &mut errors);
        }
        if !c.maintenance_age_escalation.is_finite() || c.maintenance_age_escalation < 0.0 {
            errors.push(format!(
                "costs.maintenance_age_escalation must be >= 0 (got {})",
                c.maintenance_age_escalation
            ));
        }
        let shares = [
            ("costs.fuel_share", c.fuel_share),
            ("costs.operation_share", c.operation_share),
            ("costs.maintenance_share", c.maintenance_share),
        ];
        for (name, share) in shares {
            if !(0.0..=1.0).contains(&share) {
                errors.push(format!("{name} must be within 0-1 (got {share})"));
            }
        }
        let share_sum: f64 = shares.iter().map(|(_, s)| s).sum();
        if share_sum > 1.0 + 1e-9 {
            errors.push(format!(
                "costs: fuel + operation + maintenance shares must not exceed 1.0 (got {share_sum:.3})"
            ));
        }

        let t = &self.thresholds;
        for (name, value) in [
            ("thresholds.efficiency_alert_percent", t.efficiency_alert_percent),
            (
                "thresholds.carbon_intensity_alert_kg_per_mwh",
                t.carbon_intensity_alert_kg_per_mwh,
            ),
            ("thresholds.carbon_capture_co2_kg", t.carbon_capture_co2_kg),
            (
                "thresholds.coal_blending_intensity_kg_per_mwh",
                t.coal_blending_intensity_kg_per_mwh,
            ),
            ("thresholds.trend_change_percent", t.trend_change_percent),
            (
                "thresholds.benchmark_performance_alert_percent",
                t.benchmark_performance_alert_percent,
            ),
        ] {
            Self::check_positive(value, name, &mut errors);
        }
        if t.efficiency_alert_percent > 100.0 {
            errors.push(format!(
                "thresholds.efficiency_alert_percent must be <= 100 (got {})",
                t.efficiency_alert_percent
            ));
        }

        if !(self.finance.discount_rate > 0.0 && self.finance.discount_rate < 1.0) {
            errors.push(format!(
                "finance.discount_rate must be within (0, 1) (got {})",
                self.finance.discount_rate
            ));
        }
        if self.finance.npv_horizon_years == 0 {
            errors.push("finance.npv_horizon_years must be > 0".to_string());
        }

        let f = &self.forecast;
        if f.min_points < 2 {
            errors.push(format!(
                "forecast.min_points must be >= 2 for a regression (got {})",
                f.min_points
            ));
        }
        if f.max_horizon_days == 0 {
            errors.push("forecast.max_horizon_days must be > 0".to_string());
        }
        if f.default_horizon_days > f.max_horizon_days {
            errors.push(format!(
                "forecast.default_horizon_days ({}) must be <= max_horizon_days ({})",
                f.default_horizon_days, f.max_horizon_days
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_positive(value: f64, name: &str, errors: &mut Vec<String>) {
        // NaN comparisons silently pass, so test finiteness first
        if !value.is_finite() || value <= 0.0 {
            errors.push(format!("{name} must be a positive number (got {value})"));
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {e}"),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {e}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Server Config
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server bind address.
    ///
    /// Can be overridden by `CARBONWATCH_ADDR` env var or `--addr` CLI flag.
    #[serde(default = "default_server_addr")]
    pub addr: String,
}

fn default_server_addr() -> String {
    defaults::DEFAULT_SERVER_ADDR.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
        }
    }
}

// ============================================================================
// Storage Config
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// sled database directory
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Most recent records used for recommendation snapshots
    #[serde(default = "default_recent_record_limit")]
    pub recent_record_limit: usize,

    /// Most recent records fed to trend and forecast
    #[serde(default = "default_trend_history_limit")]
    pub trend_history_limit: usize,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(defaults::DEFAULT_DATA_DIR)
}
fn default_recent_record_limit() -> usize {
    defaults::RECENT_RECORD_LIMIT
}
fn default_trend_history_limit() -> usize {
    defaults::TREND_HISTORY_LIMIT
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            recent_record_limit: default_recent_record_limit(),
            trend_history_limit: default_trend_history_limit(),
        }
    }
}

// ============================================================================
// Cost Config
// ============================================================================

/// Generation cost per MWh by plant type, carbon tax and operating shares (USD).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    pub coal: f64,
    pub natural_gas: f64,
    pub oil: f64,
    pub biomass: f64,
    /// Rate for every other plant type
    pub default: f64,
    pub carbon_tax_per_ton: f64,
    pub fuel_share: f64,
    pub operation_share: f64,
    pub maintenance_share: f64,
    pub maintenance_per_mw: f64,
    pub maintenance_age_escalation: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            coal: defaults::COST_PER_MWH_COAL,
            natural_gas: defaults::COST_PER_MWH_NATURAL_GAS,
            oil: defaults::COST_PER_MWH_OIL,
            biomass: defaults::COST_PER_MWH_BIOMASS,
            default: defaults::COST_PER_MWH_DEFAULT,
            carbon_tax_per_ton: defaults::CARBON_TAX_PER_TON,
            fuel_share: defaults::FUEL_COST_SHARE,
            operation_share: defaults::OPERATION_COST_SHARE,
            maintenance_share: defaults::MAINTENANCE_COST_SHARE,
            maintenance_per_mw: defaults::MAINTENANCE_COST_PER_MW,
            maintenance_age_escalation: defaults::MAINTENANCE_AGE_ESCALATION,
        }
    }
}

impl CostConfig {
    pub fn cost_per_mwh(&self, plant_type: PlantType) -> f64 {
        match plant_type {
            PlantType::Coal => self.coal,
            PlantType::NaturalGas => self.natural_gas,
            PlantType::Oil => self.oil,
            PlantType::Biomass => self.biomass,
            PlantType::WasteToEnergy | PlantType::Unknown => self.default,
        }
    }
}

// ============================================================================
// Threshold Config
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub efficiency_alert_percent: f64,
    pub carbon_intensity_alert_kg_per_mwh: f64,
    pub carbon_capture_co2_kg: f64,
    pub coal_blending_intensity_kg_per_mwh: f64,
    pub trend_change_percent: f64,
    pub benchmark_performance_alert_percent: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            efficiency_alert_percent: defaults::EFFICIENCY_ALERT_PERCENT,
            carbon_intensity_alert_kg_per_mwh: defaults::CARBON_INTENSITY_ALERT_KG_PER_MWH,
            carbon_capture_co2_kg: defaults::CARBON_CAPTURE_CO2_KG,
            coal_blending_intensity_kg_per_mwh: defaults::COAL_BLENDING_INTENSITY_KG_PER_MWH,
            trend_change_percent: defaults::TREND_CHANGE_PERCENT,
            benchmark_performance_alert_percent: defaults::BENCHMARK_PERFORMANCE_ALERT_PERCENT,
        }
    }
}

// ============================================================================
// Finance Config
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinanceConfig {
    pub discount_rate: f64,
    pub npv_horizon_years: u32,
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self {
            discount_rate: defaults::DISCOUNT_RATE,
            npv_horizon_years: defaults::NPV_HORIZON_YEARS,
        }
    }
}

// ============================================================================
// Forecast Config
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub min_points: usize,
    pub default_horizon_days: u32,
    pub max_horizon_days: u32,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            min_points: defaults::FORECAST_MIN_POINTS,
            default_horizon_days: defaults::FORECAST_DEFAULT_HORIZON_DAYS,
            max_horizon_days: defaults::FORECAST_MAX_HORIZON_DAYS,
        }
    }
}

impl ForecastConfig {
    /// Requested horizon, defaulted and capped.
    pub fn horizon(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_horizon_days)
            .min(self.max_horizon_days)
    }
}

// ============================================================================
// Tests
// ============================================================================
