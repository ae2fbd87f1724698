//! Capacity engine
//!
//! Estimates how much PFAS the carbon bed can hold before it is spent.
//!
//! # Pipeline
//!
//! 1. **Isotherm**: concentration-weighted Freundlich mixture over the
//!    detected compounds, evaluated at the influent total (µg/L) floored at
//!    the detection limit.
//! 2. **Competition**: background solutes occupy sites,
//!    $f_c = \frac{1}{1 + a\,TOC} \cdot \frac{1}{1 + b\,SO_4} \cdot \frac{1}{1 + c\,Cl}$,
//!    floored at `min_competition_factor`.
//! 3. **Media quality**: $f_m = \sqrt{I / I_{ref}}$ clamped, from the iodine number.
//! 4. **Safety**: division by the facility safety factor.
//!
//! $$q_{adj} = \frac{q_{base} \cdot f_c \cdot f_m}{SF}$$
//!
//! # Confidence
//!
//! Starts from `base_confidence` and is multiplied by `exp(-k · d)` for each
//! water-quality or hydraulic input at relative distance `d` outside its
//! calibration range, by `non_gac_confidence_factor` for non-GAC trains and by
//! `unlisted_confidence_factor` when too much of the total is unattributed.

use serde::{Deserialize, Serialize};

use crate::config::{CalibrationRange, CapacityConfig, IsothermParams};
use crate::error::{PfasError, Result};
use crate::models::{Freundlich, Isotherm};
use crate::system::{CompoundClass, GacMedia, SystemData, SystemType, WaterChemistry};

/// Equilibrium capacity of the bed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityResult {
    /// Actual empty-bed contact time \[min\]
    pub ebct_min: f64,
    /// Isotherm loading before adjustments \[µg/g\]
    pub base_capacity_ug_g: f64,
    /// Loading after competition, media quality and safety factor \[µg/g\]
    pub adjusted_capacity_ug_g: f64,
    pub competition_factor: f64,
    pub media_factor: f64,
    pub confidence: f64,
    pub evidence: Vec<String>,
}

/// Steady-state removal across the bed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovalEfficiency {
    /// Percentage removal in ]0, 100]
    pub percent: f64,
    pub confidence: f64,
    pub evidence: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CapacityEngine {
    config: CapacityConfig,
}

impl CapacityEngine {
    /// # Errors
    ///
    /// `InvalidConfiguration` when the configuration fails validation.
    pub fn new(config: CapacityConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CapacityConfig {
        &self.config
    }

    /// Empty-bed contact time `V_bed / Q × 60` \[min\]
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` when the flow rate is not strictly positive.
    pub fn calculate_ebct(&self, system: &SystemData) -> Result<f64> {
        let flow = system.hydraulics.flow_rate_m3_per_h;
        if !(flow.is_finite() && flow > 0.0) {
            return Err(PfasError::invalid(format!(
                "flow rate must be strictly positive, got {flow}"
            )));
        }
        Ok(system.hydraulics.bed_volume_m3 / flow * 60.0)
    }

    /// Class isotherm of a single compound
    pub fn isotherm_params(&self, class: CompoundClass) -> IsothermParams {
        self.config.isotherms.params(class)
    }

    /// Concentration-weighted isotherm of the detected compounds
    ///
    /// Falls back to the default class when nothing listed was detected.
    pub fn mixture_isotherm(&self, system: &SystemData) -> Freundlich {
        let components: Vec<(IsothermParams, f64)> = system
            .detected_compounds()
            .into_iter()
            .map(|(compound, c)| (self.isotherm_params(compound.class()), c))
            .collect();

        Freundlich::blend(&components).unwrap_or_else(|| {
            Freundlich::from_params(self.isotherm_params(self.config.default_class))
        })
    }

    /// Competitive-adsorption factor in `[min_competition_factor, 1]`
    ///
    /// Non-increasing in TOC, sulfate and chloride.
    pub fn competition_factor(&self, water: &WaterChemistry) -> f64 {
        let c = &self.config;
        let factor = 1.0 / (1.0 + c.toc_coefficient * water.toc_mg_l)
            * 1.0 / (1.0 + c.sulfate_coefficient * water.sulfate_mg_l)
            * 1.0 / (1.0 + c.chloride_coefficient * water.chloride_mg_l);
        factor.max(c.min_competition_factor)
    }

    pub fn media_factor(&self, media: &GacMedia) -> f64 {
        let c = &self.config;
        (media.iodine_number / c.reference_iodine_number)
            .sqrt()
            .clamp(c.min_media_factor, c.max_media_factor)
    }

    /// Adjusted adsorption capacity of the bed
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` when `system` fails validation.
    pub fn analyze_capacity(&self, system: &SystemData) -> Result<CapacityResult> {
        system.validate()?;
        let c = &self.config;
        let mut evidence = Vec::new();

        let ebct_min = self.calculate_ebct(system)?;
        evidence.push(format!(
            "EBCT {:.1} min from {:.1} m³ bed at {:.1} m³/h",
            ebct_min, system.hydraulics.bed_volume_m3, system.hydraulics.flow_rate_m3_per_h
        ));

        // ====== Isotherm ======

        let influent_ng_l = system.influent_total_ng_l();
        let ce_ng_l = influent_ng_l.max(c.detection_limit_ng_l);
        if influent_ng_l < c.detection_limit_ng_l {
            evidence.push(format!(
                "Influent PFAS {:.2} ng/L below detection limit, evaluated at {:.2} ng/L",
                influent_ng_l, c.detection_limit_ng_l
            ));
        }
        let isotherm = self.mixture_isotherm(system);
        let base_capacity = isotherm.loading(ce_ng_l / 1000.0);
        evidence.push(format!(
            "{} isotherm Kf = {:.2}, 1/n = {:.3} at Ce = {:.4} µg/L gives {:.3} µg/g",
            isotherm.name(),
            isotherm.kf(),
            isotherm.inv_n(),
            ce_ng_l / 1000.0,
            base_capacity
        ));

        // ====== Adjustments ======

        let competition = self.competition_factor(&system.water);
        evidence.push(format!(
            "Competitive adsorption (TOC {:.2} mg/L, sulfate {:.1} mg/L, chloride {:.1} mg/L) retains {:.1} % of capacity",
            system.water.toc_mg_l,
            system.water.sulfate_mg_l,
            system.water.chloride_mg_l,
            competition * 100.0
        ));

        let media = self.media_factor(&system.media);
        evidence.push(format!(
            "Media quality factor {:.2} from iodine number {:.0}",
            media, system.media.iodine_number
        ));

        let adjusted = base_capacity * competition * media / system.safety_factor;
        evidence.push(format!(
            "Safety factor {:.2} applied, adjusted capacity {:.3} µg/g",
            system.safety_factor, adjusted
        ));

        // ====== Confidence ======

        let confidence = self.capacity_confidence(system, &mut evidence);

        log::debug!(
            "capacity: q_base={:.3} q_adj={:.3} f_c={:.3} f_m={:.3} conf={:.3}",
            base_capacity,
            adjusted,
            competition,
            media,
            confidence
        );
        if confidence < c.base_confidence {
            log::warn!(
                "capacity estimate outside calibration envelope, confidence {:.2}",
                confidence
            );
        }

        Ok(CapacityResult {
            ebct_min,
            base_capacity_ug_g: base_capacity,
            adjusted_capacity_ug_g: adjusted,
            competition_factor: competition,
            media_factor: media,
            confidence,
            evidence,
        })
    }

    /// Steady-state removal `100 · (1 − exp(−EBCT/τ · f_c · f_m))`
    ///
    /// Uses the design EBCT, or the actual EBCT when no target is set.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` when `system` fails validation.
    pub fn calculate_removal_efficiency(&self, system: &SystemData) -> Result<RemovalEfficiency> {
        let capacity = self.analyze_capacity(system)?;
        Ok(self.removal_efficiency_from(system, &capacity))
    }

    /// Removal efficiency from a capacity result this engine already produced
    /// for `system`
    pub fn removal_efficiency_from(
        &self,
        system: &SystemData,
        capacity: &CapacityResult,
    ) -> RemovalEfficiency {
        let c = &self.config;
        let mut evidence = Vec::new();

        let target = system.hydraulics.target_ebct_min;
        let ebct_used = if target > 0.0 {
            target
        } else {
            evidence.push("No target EBCT set, using actual EBCT".to_string());
            capacity.ebct_min
        };

        let kinetic = capacity.competition_factor * capacity.media_factor;
        let percent = (100.0 * (1.0 - (-ebct_used / c.contact_time_constant_min * kinetic).exp()))
            .clamp(c.min_removal_pct, 100.0);
        evidence.push(format!(
            "EBCT {:.1} min with τ = {:.1} min and kinetic factor {:.3} gives {:.2} % removal",
            ebct_used, c.contact_time_constant_min, kinetic, percent
        ));

        let mut confidence = c.base_confidence;
        if target > 0.0 && capacity.ebct_min < target {
            confidence *= capacity.ebct_min / target;
            evidence.push(format!(
                "Actual EBCT {:.1} min is below the {:.1} min design target",
                capacity.ebct_min, target
            ));
        }
        if system.system_type != SystemType::Gac {
            confidence *= c.non_gac_confidence_factor;
            evidence.push(format!(
                "Removal model is calibrated for GAC, not {:?}",
                system.system_type
            ));
        }
        let confidence = confidence.clamp(c.min_confidence, 1.0);

        if percent < system.target_removal_efficiency_pct {
            log::warn!(
                "removal efficiency {:.2} % below target {:.2} %",
                percent,
                system.target_removal_efficiency_pct
            );
        }

        RemovalEfficiency { percent, confidence, evidence }
    }

    fn capacity_confidence(&self, system: &SystemData, evidence: &mut Vec<String>) -> f64 {
        let c = &self.config;
        let mut confidence = c.base_confidence;

        let checks: [(&str, f64, &CalibrationRange); 5] = [
            ("TOC", system.water.toc_mg_l, &c.toc_calibration),
            ("Sulfate", system.water.sulfate_mg_l, &c.sulfate_calibration),
            ("pH", system.water.ph, &c.ph_calibration),
            ("Temperature", system.water.temperature_c, &c.temperature_calibration),
            (
                "Hydraulic loading",
                system.hydraulic_loading_m_per_h(),
                &c.hydraulic_loading_range,
            ),
        ];
        for (name, value, range) in checks {
            let deviation = range.deviation(value);
            if deviation > 0.0 {
                confidence *= (-c.deviation_sensitivity * deviation).exp();
                evidence.push(format!(
                    "{name} {value:.2} outside calibration range [{}, {}]",
                    range.min, range.max
                ));
            }
        }

        if system.system_type != SystemType::Gac {
            confidence *= c.non_gac_confidence_factor;
            evidence.push(format!(
                "Isotherms are calibrated for GAC, not {:?}",
                system.system_type
            ));
        }

        let unlisted = system.unlisted_fraction();
        if unlisted > c.unlisted_share_threshold {
            confidence *= c.unlisted_confidence_factor;
            evidence.push(format!(
                "{:.0} % of total PFAS is not attributed to a listed compound",
                unlisted * 100.0
            ));
        }

        confidence.clamp(c.min_confidence, 1.0)
    }
}
