//! Engine configuration
//!
//! Every model constant lives here rather than in the engines: isotherm
//! parameters, calibration envelopes, Thomas-model clamps, risk weights, fine
//! constants and Monte Carlo noise. Configurations are plain serde structs with
//! `Default` values, so a partial TOML document only overrides what it names.
//!
//! # Example
//!
//! ```rust
//! use pfas_rs::config::ScannerConfig;
//!
//! let config = ScannerConfig::from_toml_str(r#"
//!     [risk]
//!     fine_per_day = 50000.0
//!
//!     [economics]
//!     default_iterations = 2000
//! "#).unwrap();
//!
//! assert_eq!(config.economics.default_iterations, 2000);
//! assert_eq!(config.risk.enforcement_days, 90.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{PfasError, Result};
use crate::system::CompoundClass;

// =================================================================================================
// Shared building blocks
// =================================================================================================

/// Closed interval over which a model was calibrated
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationRange {
    pub min: f64,
    pub max: f64,
}

impl CalibrationRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Relative distance outside the range, `0` inside it
    ///
    /// Below the range the distance is relative to `min` (or absolute when
    /// `min == 0`), above it relative to `max`.
    pub fn deviation(&self, value: f64) -> f64 {
        if value < self.min {
            let scale = if self.min > 0.0 { self.min } else { 1.0 };
            (self.min - value) / scale
        } else if value > self.max {
            let scale = if self.max > 0.0 { self.max } else { 1.0 };
            (value - self.max) / scale
        } else {
            0.0
        }
    }

    fn validate(&self, name: &str) -> Result<()> {
        if !(self.min.is_finite() && self.max.is_finite()) || self.min > self.max {
            return Err(PfasError::invalid(format!(
                "{name} range must satisfy min <= max, got [{}, {}]",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Freundlich parameters `q = Kf · Ce^(1/n)` with `q` in µg/g and `Ce` in µg/L
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IsothermParams {
    /// Capacity constant Kf \[(µg/g)(L/µg)^(1/n)\]
    pub kf: f64,
    /// Heterogeneity exponent 1/n \[-\]
    pub inv_n: f64,
}

/// Isotherm parameters per compound class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IsothermTable {
    pub long_chain_sulfonate: IsothermParams,
    pub long_chain_carboxylate: IsothermParams,
    pub short_chain: IsothermParams,
}

impl Default for IsothermTable {
    fn default() -> Self {
        Self {
            long_chain_sulfonate: IsothermParams { kf: 60.0, inv_n: 0.35 },
            long_chain_carboxylate: IsothermParams { kf: 35.0, inv_n: 0.40 },
            short_chain: IsothermParams { kf: 8.0, inv_n: 0.55 },
        }
    }
}

impl IsothermTable {
    pub fn params(&self, class: CompoundClass) -> IsothermParams {
        match class {
            CompoundClass::LongChainSulfonate => self.long_chain_sulfonate,
            CompoundClass::LongChainCarboxylate => self.long_chain_carboxylate,
            CompoundClass::ShortChain => self.short_chain,
        }
    }

    fn validate(&self) -> Result<()> {
        for (name, p) in [
            ("long_chain_sulfonate", self.long_chain_sulfonate),
            ("long_chain_carboxylate", self.long_chain_carboxylate),
            ("short_chain", self.short_chain),
        ] {
            if !(p.kf.is_finite() && p.kf > 0.0) {
                return Err(PfasError::invalid(format!(
                    "isotherm {name}: Kf must be > 0, got {}",
                    p.kf
                )));
            }
            if !(p.inv_n > 0.0 && p.inv_n <= 1.0) {
                return Err(PfasError::invalid(format!(
                    "isotherm {name}: 1/n must be in ]0, 1], got {}",
                    p.inv_n
                )));
            }
        }
        Ok(())
    }
}

fn check_unit_interval(name: &str, value: f64) -> Result<()> {
    if !(value > 0.0 && value <= 1.0) {
        return Err(PfasError::invalid(format!(
            "{name} must be in ]0, 1], got {value}"
        )));
    }
    Ok(())
}

fn check_positive(name: &str, value: f64) -> Result<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(PfasError::invalid(format!(
            "{name} must be strictly positive, got {value}"
        )));
    }
    Ok(())
}

fn check_non_negative(name: &str, value: f64) -> Result<()> {
    if !(value.is_finite() && value >= 0.0) {
        return Err(PfasError::invalid(format!(
            "{name} must be non-negative, got {value}"
        )));
    }
    Ok(())
}

// =================================================================================================
// Capacity
// =================================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacityConfig {
    pub isotherms: IsothermTable,
    /// Class used when the total contains no listed compound
    pub default_class: CompoundClass,
    /// Concentrations below this are evaluated at this value \[ng/L\]
    pub detection_limit_ng_l: f64,

    /// Competition coefficients of `1 / (1 + a·x)` per mg/L of solute
    pub toc_coefficient: f64,
    pub sulfate_coefficient: f64,
    pub chloride_coefficient: f64,
    pub min_competition_factor: f64,

    pub reference_iodine_number: f64,
    pub min_media_factor: f64,
    pub max_media_factor: f64,

    pub toc_calibration: CalibrationRange,
    pub sulfate_calibration: CalibrationRange,
    pub ph_calibration: CalibrationRange,
    pub temperature_calibration: CalibrationRange,
    /// Superficial loading envelope \[m/h\]
    pub hydraulic_loading_range: CalibrationRange,

    pub base_confidence: f64,
    /// k in `exp(-k · deviation)`
    pub deviation_sensitivity: f64,
    pub min_confidence: f64,
    pub non_gac_confidence_factor: f64,
    pub unlisted_share_threshold: f64,
    pub unlisted_confidence_factor: f64,

    /// Characteristic contact time τ of the removal-efficiency model \[min\]
    pub contact_time_constant_min: f64,
    pub min_removal_pct: f64,
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            isotherms: IsothermTable::default(),
            default_class: CompoundClass::LongChainCarboxylate,
            detection_limit_ng_l: 1.0,
            toc_coefficient: 0.25,
            sulfate_coefficient: 0.002,
            chloride_coefficient: 0.0005,
            min_competition_factor: 0.05,
            reference_iodine_number: 1000.0,
            min_media_factor: 0.6,
            max_media_factor: 1.3,
            toc_calibration: CalibrationRange::new(0.3, 2.5),
            sulfate_calibration: CalibrationRange::new(0.0, 75.0),
            ph_calibration: CalibrationRange::new(6.0, 9.0),
            temperature_calibration: CalibrationRange::new(5.0, 30.0),
            hydraulic_loading_range: CalibrationRange::new(5.0, 30.0),
            base_confidence: 0.92,
            deviation_sensitivity: 0.5,
            min_confidence: 0.05,
            non_gac_confidence_factor: 0.5,
            unlisted_share_threshold: 0.25,
            unlisted_confidence_factor: 0.85,
            contact_time_constant_min: 2.0,
            min_removal_pct: 0.1,
        }
    }
}

impl CapacityConfig {
    pub fn validate(&self) -> Result<()> {
        self.isotherms.validate()?;
        check_positive("detection limit", self.detection_limit_ng_l)?;
        check_non_negative("TOC coefficient", self.toc_coefficient)?;
        check_non_negative("sulfate coefficient", self.sulfate_coefficient)?;
        check_non_negative("chloride coefficient", self.chloride_coefficient)?;
        check_unit_interval("minimum competition factor", self.min_competition_factor)?;
        check_positive("reference iodine number", self.reference_iodine_number)?;
        check_positive("minimum media factor", self.min_media_factor)?;
        if self.max_media_factor < self.min_media_factor {
            return Err(PfasError::invalid(
                "maximum media factor must not be below the minimum",
            ));
        }
        self.toc_calibration.validate("TOC calibration")?;
        self.sulfate_calibration.validate("sulfate calibration")?;
        self.ph_calibration.validate("pH calibration")?;
        self.temperature_calibration.validate("temperature calibration")?;
        self.hydraulic_loading_range.validate("hydraulic loading")?;
        check_unit_interval("capacity base confidence", self.base_confidence)?;
        check_non_negative("deviation sensitivity", self.deviation_sensitivity)?;
        check_unit_interval("capacity minimum confidence", self.min_confidence)?;
        check_unit_interval("non-GAC confidence factor", self.non_gac_confidence_factor)?;
        check_unit_interval("unlisted share threshold", self.unlisted_share_threshold)?;
        check_unit_interval("unlisted confidence factor", self.unlisted_confidence_factor)?;
        check_positive("contact time constant", self.contact_time_constant_min)?;
        if !(self.min_removal_pct > 0.0 && self.min_removal_pct <= 100.0) {
            return Err(PfasError::invalid(format!(
                "minimum removal must be in ]0, 100], got {}",
                self.min_removal_pct
            )));
        }
        Ok(())
    }
}

// =================================================================================================
// Breakthrough
// =================================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakthroughConfig {
    /// Thomas rate constant kTh \[L/(µg·day)\]
    pub thomas_rate_constant: f64,
    pub min_thomas_number: f64,
    pub max_thomas_number: f64,

    pub min_threshold_fraction: f64,
    /// Must stay below 0.5 so breakthrough precedes the midpoint
    pub max_threshold_fraction: f64,
    /// Threshold used for compounds without a regulatory limit
    pub unregulated_threshold_fraction: f64,
    pub exhaustion_fraction: f64,

    /// Number of sampling intervals over the horizon
    pub resolution: usize,
    pub default_horizon_days: f64,
    pub detection_limit_ng_l: f64,

    pub base_confidence: f64,
    pub beyond_horizon_factor: f64,
    pub detection_floor_factor: f64,
    pub clamped_front_factor: f64,
    pub min_confidence: f64,
}

impl Default for BreakthroughConfig {
    fn default() -> Self {
        Self {
            thomas_rate_constant: 1.0,
            min_thomas_number: 12.0,
            max_thomas_number: 400.0,
            min_threshold_fraction: 0.01,
            max_threshold_fraction: 0.45,
            unregulated_threshold_fraction: 0.10,
            exhaustion_fraction: 0.95,
            resolution: 500,
            default_horizon_days: 3650.0,
            detection_limit_ng_l: 1.0,
            base_confidence: 0.88,
            beyond_horizon_factor: 0.8,
            detection_floor_factor: 0.7,
            clamped_front_factor: 0.9,
            min_confidence: 0.05,
        }
    }
}

impl BreakthroughConfig {
    pub fn validate(&self) -> Result<()> {
        check_positive("Thomas rate constant", self.thomas_rate_constant)?;
        check_positive("minimum Thomas number", self.min_thomas_number)?;
        if !(self.max_thomas_number.is_finite() && self.max_thomas_number >= self.min_thomas_number)
        {
            return Err(PfasError::invalid(
                "maximum Thomas number must be finite and not below the minimum",
            ));
        }
        if !(self.min_threshold_fraction > 0.0
            && self.min_threshold_fraction <= self.max_threshold_fraction
            && self.max_threshold_fraction < 0.5)
        {
            return Err(PfasError::invalid(format!(
                "threshold fractions must satisfy 0 < min <= max < 0.5, got [{}, {}]",
                self.min_threshold_fraction, self.max_threshold_fraction
            )));
        }
        if !(self.unregulated_threshold_fraction >= self.min_threshold_fraction
            && self.unregulated_threshold_fraction <= self.max_threshold_fraction)
        {
            return Err(PfasError::invalid(
                "unregulated threshold fraction must lie within the threshold bounds",
            ));
        }
        if !(self.exhaustion_fraction > 0.5 && self.exhaustion_fraction < 1.0) {
            return Err(PfasError::invalid(format!(
                "exhaustion fraction must be in ]0.5, 1[, got {}",
                self.exhaustion_fraction
            )));
        }
        // Keeps the earliest milestone strictly after t = 0
        let logit = (1.0 / self.min_threshold_fraction - 1.0).ln();
        if self.min_thomas_number <= logit {
            return Err(PfasError::invalid(format!(
                "minimum Thomas number must exceed ln(1/f_min - 1) = {logit:.3}, got {}",
                self.min_thomas_number
            )));
        }
        if self.resolution < 10 {
            return Err(PfasError::invalid(format!(
                "breakthrough resolution must be at least 10 intervals, got {}",
                self.resolution
            )));
        }
        check_positive("default horizon", self.default_horizon_days)?;
        check_positive("breakthrough detection limit", self.detection_limit_ng_l)?;
        check_unit_interval("breakthrough base confidence", self.base_confidence)?;
        check_unit_interval("beyond-horizon factor", self.beyond_horizon_factor)?;
        check_unit_interval("detection floor factor", self.detection_floor_factor)?;
        check_unit_interval("clamped front factor", self.clamped_front_factor)?;
        check_unit_interval("breakthrough minimum confidence", self.min_confidence)?;
        Ok(())
    }
}

// =================================================================================================
// Risk
// =================================================================================================

/// Score boundaries of the four risk bands
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    pub low: f64,
    pub high: f64,
    pub critical: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    pub gap_base_score: f64,
    /// Weight of `log2(exceedance ratio)` per gap
    pub gap_severity_weight: f64,
    pub max_compliance_score: f64,
    pub hazard_index_score: f64,

    /// Fraction of a limit above which a compound counts as near the limit
    pub proximity_fraction: f64,
    pub proximity_score_per_compound: f64,
    pub max_proximity_score: f64,

    pub life_horizon_months: f64,
    pub max_life_score: f64,
    pub short_life_months: f64,

    pub efficiency_shortfall_scale_pct: f64,
    pub max_efficiency_score: f64,

    pub thresholds: RiskThresholds,

    pub fine_per_day: f64,
    pub enforcement_days: f64,

    pub base_confidence: f64,
    pub missing_regulated_penalty: f64,
    pub min_confidence: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            gap_base_score: 4.0,
            gap_severity_weight: 0.5,
            max_compliance_score: 7.0,
            hazard_index_score: 1.0,
            proximity_fraction: 0.5,
            proximity_score_per_compound: 0.25,
            max_proximity_score: 1.0,
            life_horizon_months: 24.0,
            max_life_score: 2.0,
            short_life_months: 6.0,
            efficiency_shortfall_scale_pct: 10.0,
            max_efficiency_score: 2.0,
            thresholds: RiskThresholds { low: 1.0, high: 4.0, critical: 7.0 },
            fine_per_day: 25_000.0,
            enforcement_days: 90.0,
            base_confidence: 0.95,
            missing_regulated_penalty: 0.05,
            min_confidence: 0.05,
        }
    }
}

impl RiskConfig {
    pub fn validate(&self) -> Result<()> {
        check_non_negative("gap base score", self.gap_base_score)?;
        check_non_negative("gap severity weight", self.gap_severity_weight)?;
        check_non_negative("maximum compliance score", self.max_compliance_score)?;
        check_non_negative("hazard index score", self.hazard_index_score)?;
        check_unit_interval("proximity fraction", self.proximity_fraction)?;
        check_non_negative("proximity score", self.proximity_score_per_compound)?;
        check_non_negative("maximum proximity score", self.max_proximity_score)?;
        check_positive("life horizon", self.life_horizon_months)?;
        check_non_negative("maximum life score", self.max_life_score)?;
        check_non_negative("short life threshold", self.short_life_months)?;
        check_positive("efficiency shortfall scale", self.efficiency_shortfall_scale_pct)?;
        check_non_negative("maximum efficiency score", self.max_efficiency_score)?;
        let t = self.thresholds;
        if !(t.low > 0.0 && t.low < t.high && t.high < t.critical && t.critical <= 10.0) {
            return Err(PfasError::invalid(format!(
                "risk thresholds must satisfy 0 < low < high < critical <= 10, got {} / {} / {}",
                t.low, t.high, t.critical
            )));
        }
        check_non_negative("fine per day", self.fine_per_day)?;
        check_non_negative("enforcement days", self.enforcement_days)?;
        check_unit_interval("risk base confidence", self.base_confidence)?;
        check_non_negative("missing regulated penalty", self.missing_regulated_penalty)?;
        check_unit_interval("risk minimum confidence", self.min_confidence)?;
        Ok(())
    }
}

// =================================================================================================
// Economics
// =================================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomicConfig {
    pub default_iterations: usize,
    /// Sample count above which evaluation runs on Rayon (feature `parallel`)
    pub parallel_threshold: usize,
    /// Log-space σ of the capacity multiplier at full confidence
    pub capacity_sigma: f64,
    /// Log-space σ of the influent multiplier at full confidence
    pub concentration_sigma: f64,
    pub max_sigma: f64,
    /// Annual discount rate used for capital avoidance
    pub discount_rate: f64,
    pub min_lifespan_months: f64,
    pub base_confidence: f64,
    pub beyond_horizon_factor: f64,
    pub min_confidence: f64,
}

impl Default for EconomicConfig {
    fn default() -> Self {
        Self {
            default_iterations: 5000,
            parallel_threshold: 2048,
            capacity_sigma: 0.15,
            concentration_sigma: 0.20,
            max_sigma: 0.6,
            discount_rate: 0.05,
            min_lifespan_months: 0.1,
            base_confidence: 0.95,
            beyond_horizon_factor: 0.85,
            min_confidence: 0.05,
        }
    }
}

impl EconomicConfig {
    pub fn validate(&self) -> Result<()> {
        if self.default_iterations == 0 {
            return Err(PfasError::invalid("default Monte Carlo iterations must be > 0"));
        }
        if self.parallel_threshold == 0 {
            return Err(PfasError::invalid("parallel threshold must be at least 1"));
        }
        check_non_negative("capacity sigma", self.capacity_sigma)?;
        check_non_negative("concentration sigma", self.concentration_sigma)?;
        check_positive("maximum sigma", self.max_sigma)?;
        check_positive("discount rate", self.discount_rate)?;
        check_positive("minimum lifespan", self.min_lifespan_months)?;
        check_unit_interval("economic base confidence", self.base_confidence)?;
        check_unit_interval("economic beyond-horizon factor", self.beyond_horizon_factor)?;
        check_unit_interval("economic minimum confidence", self.min_confidence)?;
        Ok(())
    }
}

// =================================================================================================
// Scanner
// =================================================================================================

/// Exponents of the weighted geometric mean behind `overall_confidence`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceWeights {
    pub capacity: f64,
    pub breakthrough: f64,
    pub risk: f64,
    pub economics: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self { capacity: 0.35, breakthrough: 0.25, risk: 0.20, economics: 0.20 }
    }
}

impl ConfidenceWeights {
    pub fn validate(&self) -> Result<()> {
        let weights = [self.capacity, self.breakthrough, self.risk, self.economics];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(PfasError::invalid("confidence weights must be non-negative"));
        }
        if weights.iter().sum::<f64>() <= 0.0 {
            return Err(PfasError::invalid("confidence weights must not all be zero"));
        }
        Ok(())
    }
}

/// Complete configuration of a [`ComplianceScanner`](crate::scanner::ComplianceScanner)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScannerConfig {
    pub capacity: CapacityConfig,
    pub breakthrough: BreakthroughConfig,
    pub risk: RiskConfig,
    pub economics: EconomicConfig,
    pub confidence_weights: ConfidenceWeights,
}

impl ScannerConfig {
    /// Parses and validates a TOML document; missing keys keep their defaults
    ///
    /// # Errors
    ///
    /// `ConfigParse` for malformed TOML, `InvalidConfiguration` when a value
    /// fails validation.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: ScannerConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.capacity.validate()?;
        self.breakthrough.validate()?;
        self.risk.validate()?;
        self.economics.validate()?;
        self.confidence_weights.validate()
    }
}
