//! Risk engine
//!
//! Gap analysis against the regulatory table and a 0–10 risk score.
//!
//! # Score
//!
//! | Component        | Contribution                                                      |
//! |------------------|-------------------------------------------------------------------|
//! | compliance       | `base + w · Σ log2(C / limit)` over gaps, capped; 0 without gaps  |
//! | hazard index     | fixed step when `Σ C / HBWC > 1` for PFNA, PFHxS and PFBS         |
//! | proximity        | per regulated compound between `proximity_fraction` and its limit, capped |
//! | remaining life   | `max_life · clamp(1 − life / horizon, 0, 1)`                      |
//! | efficiency       | `min(max_eff, shortfall / scale)`                                 |
//!
//! The total is capped at 10 and bucketed into [`RiskLevel`] bands with the
//! configured thresholds (Clear `< 1`, Low `< 4`, High `< 7`, Critical otherwise
//! by default).
//!
//! Fines exposure is `Σ fine_per_day · enforcement_days · (1 + log10 ratio)`
//! over the gaps and exactly zero without gaps.

use serde::{Deserialize, Serialize};

use crate::config::{RiskConfig, RiskThresholds};
use crate::error::{PfasError, Result};
use crate::system::{PfasCompound, SystemData};

/// Ordered risk bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Clear,
    Low,
    High,
    Critical,
}

impl RiskLevel {
    /// Band of `score`; non-decreasing in `score`
    pub fn from_score(score: f64, thresholds: &RiskThresholds) -> Self {
        if score < thresholds.low {
            RiskLevel::Clear
        } else if score < thresholds.high {
            RiskLevel::Low
        } else if score < thresholds.critical {
            RiskLevel::High
        } else {
            RiskLevel::Critical
        }
    }
}

/// A compound measured above its regulatory limit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegulatoryGap {
    pub compound: PfasCompound,
    /// \[ng/L\]
    pub current_level: f64,
    /// \[ng/L\]
    pub regulatory_limit: f64,
    /// `current_level / regulatory_limit`, greater than 1
    pub exceedance_ratio: f64,
}

/// Individual score contributions, before the overall cap
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RiskComponents {
    pub compliance: f64,
    pub hazard_index: f64,
    pub proximity: f64,
    pub remaining_life: f64,
    pub efficiency: f64,
}

impl RiskComponents {
    fn total(&self) -> f64 {
        self.compliance + self.hazard_index + self.proximity + self.remaining_life + self.efficiency
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// In \[0, 10\]
    pub overall_risk_score: f64,
    pub risk_level: RiskLevel,
    pub components: RiskComponents,
    pub regulatory_gaps: Vec<RegulatoryGap>,
    pub hazard_index: f64,
    pub estimated_fines_exposure: f64,
    pub recommendations: Vec<String>,
    pub confidence: f64,
}

#[derive(Debug, Clone, Default)]
pub struct RiskEngine {
    config: RiskConfig,
}

impl RiskEngine {
    /// # Errors
    ///
    /// `InvalidConfiguration` when the configuration fails validation.
    pub fn new(config: RiskConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Mixture hazard index `Σ C / HBWC`
    pub fn hazard_index(&self, system: &SystemData) -> f64 {
        system
            .pfas
            .iter()
            .filter_map(|(compound, &c)| compound.hazard_index_reference_ng_l().map(|r| c / r))
            .sum()
    }

    /// Compounds measured above their regulatory limit, canonical order
    pub fn regulatory_gaps(&self, system: &SystemData) -> Vec<RegulatoryGap> {
        system
            .detected_compounds()
            .into_iter()
            .filter_map(|(compound, c)| {
                let limit = compound.regulatory_limit_ng_l()?;
                (c > limit).then(|| RegulatoryGap {
                    compound,
                    current_level: c,
                    regulatory_limit: limit,
                    exceedance_ratio: c / limit,
                })
            })
            .collect()
    }

    /// Regulatory risk of the facility
    ///
    /// A system without any detected compound is `Clear` with a zero score,
    /// whatever its remaining life or efficiency.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` when `system` is invalid or a number is NaN.
    pub fn assess_risk(
        &self,
        system: &SystemData,
        remaining_life_months: f64,
        removal_efficiency_pct: f64,
    ) -> Result<RiskAssessment> {
        system.validate()?;
        if remaining_life_months.is_nan() || removal_efficiency_pct.is_nan() {
            return Err(PfasError::invalid(
                "remaining life and removal efficiency must be numbers",
            ));
        }
        let c = &self.config;
        let confidence = self.confidence(system);

        if system.detected_compounds().is_empty() {
            log::debug!("risk: no PFAS detected");
            return Ok(RiskAssessment {
                overall_risk_score: 0.0,
                risk_level: RiskLevel::Clear,
                components: RiskComponents::default(),
                regulatory_gaps: Vec::new(),
                hazard_index: 0.0,
                estimated_fines_exposure: 0.0,
                recommendations: Vec::new(),
                confidence,
            });
        }

        let remaining_life = remaining_life_months.max(0.0);
        let removal = removal_efficiency_pct.clamp(0.0, 100.0);
        let mut recommendations = Vec::new();
        let mut components = RiskComponents::default();

        // ====== Compliance ======

        let gaps = self.regulatory_gaps(system);
        if !gaps.is_empty() {
            let severity: f64 = gaps.iter().map(|g| g.exceedance_ratio.log2()).sum();
            components.compliance =
                (c.gap_base_score + c.gap_severity_weight * severity).min(c.max_compliance_score);
        }
        for gap in &gaps {
            recommendations.push(format!(
                "{} at {:.1} ng/L exceeds the {:.1} ng/L limit by {:.1}x: treatment upgrade required",
                gap.compound, gap.current_level, gap.regulatory_limit, gap.exceedance_ratio
            ));
        }

        // ====== Hazard index ======

        let hazard_index = self.hazard_index(system);
        if hazard_index > 1.0 {
            components.hazard_index = c.hazard_index_score;
            recommendations.push(format!(
                "Hazard index {:.2} exceeds 1.0 for the PFNA/PFHxS/PFBS mixture",
                hazard_index
            ));
        }

        // ====== Proximity to limits ======

        let near_limit: Vec<(PfasCompound, f64)> = system
            .detected_compounds()
            .into_iter()
            .filter_map(|(compound, conc)| {
                let share = conc / compound.regulatory_limit_ng_l()?;
                (share >= c.proximity_fraction && share <= 1.0).then_some((compound, share))
            })
            .collect();
        components.proximity = (near_limit.len() as f64 * c.proximity_score_per_compound)
            .min(c.max_proximity_score);
        for (compound, share) in &near_limit {
            recommendations.push(format!(
                "{compound} at {:.0} % of its limit: increase monitoring frequency",
                share * 100.0
            ));
        }

        // ====== Remaining life ======

        components.remaining_life =
            c.max_life_score * (1.0 - remaining_life / c.life_horizon_months).clamp(0.0, 1.0);
        if remaining_life < c.short_life_months {
            recommendations.push(format!(
                "Media exhausted in {:.1} months: schedule change-out immediately",
                remaining_life
            ));
        } else if remaining_life < c.life_horizon_months {
            recommendations.push(format!(
                "Plan media replacement within {:.1} months",
                remaining_life
            ));
        }

        // ====== Removal efficiency ======

        let shortfall = system.target_removal_efficiency_pct - removal;
        if shortfall > 0.0 {
            components.efficiency =
                (shortfall / c.efficiency_shortfall_scale_pct).min(c.max_efficiency_score);
            recommendations.push(format!(
                "Removal efficiency {:.1} % below the {:.1} % target: increase EBCT or evaluate alternative media",
                removal, system.target_removal_efficiency_pct
            ));
        }

        // ====== Aggregate ======

        let overall_risk_score = components.total().clamp(0.0, 10.0);
        let risk_level = RiskLevel::from_score(overall_risk_score, &c.thresholds);
        if risk_level > RiskLevel::Clear && recommendations.is_empty() {
            recommendations.push("Continue routine PFAS monitoring".to_string());
        }

        let estimated_fines_exposure: f64 = gaps
            .iter()
            .map(|g| c.fine_per_day * c.enforcement_days * (1.0 + g.exceedance_ratio.log10()))
            .sum();

        log::debug!(
            "risk: score={:.2} level={:?} gaps={} hi={:.3} fines={:.0}",
            overall_risk_score,
            risk_level,
            gaps.len(),
            hazard_index,
            estimated_fines_exposure
        );

        Ok(RiskAssessment {
            overall_risk_score,
            risk_level,
            components,
            regulatory_gaps: gaps,
            hazard_index,
            estimated_fines_exposure,
            recommendations,
            confidence,
        })
    }

    /// Penalises regulated compounds that were not measured at all
    fn confidence(&self, system: &SystemData) -> f64 {
        let c = &self.config;
        let missing = PfasCompound::ALL
            .iter()
            .filter(|compound| compound.regulatory_limit_ng_l().is_some())
            .filter(|compound| !system.pfas.contains_key(*compound))
            .count();
        if missing > 0 {
            log::warn!("{missing} regulated compounds not reported, risk confidence lowered");
        }
        (c.base_confidence - c.missing_regulated_penalty * missing as f64)
            .clamp(c.min_confidence, 1.0)
    }
}
