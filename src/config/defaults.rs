//! System-wide default constants.
//!
//! Every tunable in `AnalyticsConfig` defaults to one of these. Grouped by
//! subsystem for easy discovery.

// ============================================================================
// Server & Storage
// ============================================================================

/// HTTP bind address.
pub const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:8080";

/// sled database directory.
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Records used for the recent-performance snapshot behind recommendations.
pub const RECENT_RECORD_LIMIT: usize = 100;

/// Maximum records fed to trend and forecast computations.
pub const TREND_HISTORY_LIMIT: usize = 1_000;

// ============================================================================
// Emissions
// ============================================================================

/// 100-year global warming potential of methane.
pub const GWP_CH4: f64 = 25.0;

/// 100-year global warming potential of nitrous oxide.
pub const GWP_N2O: f64 = 298.0;

/// Availability reported whenever a plant has records (%).
pub const NOMINAL_AVAILABILITY_PERCENT: f64 = 95.0;

// ============================================================================
// Costs (USD)
// ============================================================================

pub const COST_PER_MWH_COAL: f64 = 45.0;
pub const COST_PER_MWH_NATURAL_GAS: f64 = 35.0;
pub const COST_PER_MWH_OIL: f64 = 55.0;
pub const COST_PER_MWH_BIOMASS: f64 = 40.0;

/// Used for plant types without a dedicated rate.
pub const COST_PER_MWH_DEFAULT: f64 = 45.0;

/// Carbon tax per metric ton of CO2.
pub const CARBON_TAX_PER_TON: f64 = 50.0;

/// Shares of the operating total. The remainder stays unallocated.
pub const FUEL_COST_SHARE: f64 = 0.60;
pub const OPERATION_COST_SHARE: f64 = 0.20;
pub const MAINTENANCE_COST_SHARE: f64 = 0.15;

/// Base annual maintenance cost per MW of capacity.
pub const MAINTENANCE_COST_PER_MW: f64 = 50.0;

/// Annual maintenance escalation per year of plant age.
pub const MAINTENANCE_AGE_ESCALATION: f64 = 0.02;

// ============================================================================
// Recommendation Thresholds
// ============================================================================

/// Average efficiency below which an efficiency recommendation fires (%).
pub const EFFICIENCY_ALERT_PERCENT: f64 = 40.0;

/// Average carbon intensity above which a reduction recommendation fires (kg/MWh).
pub const CARBON_INTENSITY_ALERT_KG_PER_MWH: f64 = 800.0;

/// Total CO2 above which carbon capture is suggested (kg).
pub const CARBON_CAPTURE_CO2_KG: f64 = 1_000_000.0;

/// Coal plants above this carbon intensity get a fuel-blending proposal (kg/MWh).
pub const COAL_BLENDING_INTENSITY_KG_PER_MWH: f64 = 900.0;

/// Relative change beyond which a trend is increasing or decreasing (%).
pub const TREND_CHANGE_PERCENT: f64 = 5.0;

/// Benchmark performance below which a comparison recommendation fires (%).
pub const BENCHMARK_PERFORMANCE_ALERT_PERCENT: f64 = 90.0;

// ============================================================================
// Finance
// ============================================================================

pub const DISCOUNT_RATE: f64 = 0.08;
pub const NPV_HORIZON_YEARS: u32 = 20;

// ============================================================================
// Forecast
// ============================================================================

/// Minimum samples for a regression forecast.
pub const FORECAST_MIN_POINTS: usize = 10;
pub const FORECAST_DEFAULT_HORIZON_DAYS: u32 = 30;
pub const FORECAST_MAX_HORIZON_DAYS: u32 = 365;
