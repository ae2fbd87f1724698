//! Breakthrough engine
//!
//! Turns an adjusted capacity into a breakthrough timeline with the
//! [`ThomasModel`].
//!
//! # Milestones
//!
//! | Milestone     | Effluent fraction `C/C0`                               |
//! |---------------|--------------------------------------------------------|
//! | breakthrough  | regulatory fraction, `min(limit / C)` over regulated compounds, clamped below 0.5 |
//! | fifty percent | 0.5                                                    |
//! | exhaustion    | `exhaustion_fraction` (0.95 by default)                |
//!
//! The curve is sampled at `resolution + 1` evenly spaced times over the
//! horizon. Each milestone is bracketed by the first sample at or above its
//! fraction, then solved with the closed-form inversion of the model clamped
//! into that interval. Milestones therefore do not depend on the horizon or
//! the resolution, however steep the front. A milestone the curve does not
//! reach within the horizon comes from the same inversion and lowers the
//! confidence.
//!
//! Because the thresholds are strictly ordered and the curve is strictly
//! increasing, `breakthrough < fifty_percent < exhaustion` always holds.
//!
//! # Per-compound curves
//!
//! [`BreakthroughEngine::calculate_multi_compound_breakthrough`] runs one
//! independent curve per detected compound. Each compound receives the share
//! `Kf_class / Kf_mixture` of the adjusted capacity and is evaluated at its own
//! concentration against its own limit. Curves do not share a capacity pool.

use std::collections::BTreeMap;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::config::{BreakthroughConfig, IsothermParams, IsothermTable};
use crate::error::{PfasError, Result};
use crate::models::{BreakthroughModel, Freundlich, ThomasInputs, ThomasModel};
use crate::system::{PfasCompound, SystemData};

/// Breakthrough timeline of the aggregate influent or of one compound
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakthroughResult {
    /// `None` for the aggregate curve
    pub compound: Option<PfasCompound>,
    /// `(operating day, C/C0)` samples, strictly increasing in time
    pub curve: Vec<(f64, f64)>,
    pub breakthrough_time_days: f64,
    pub fifty_percent_time_days: f64,
    pub exhaustion_time_days: f64,
    /// Effluent fraction defining breakthrough
    pub threshold_fraction: f64,
    pub stoichiometric_time_days: f64,
    pub thomas_number: f64,
    pub horizon_days: f64,
    /// `true` when breakthrough occurs inside the sampled horizon
    pub within_horizon: bool,
    pub confidence: f64,
    pub evidence: Vec<String>,
}

/// Per-compound breakthrough results in canonical compound order
pub type MultiCompoundBreakthrough = BTreeMap<PfasCompound, BreakthroughResult>;

/// How a milestone was obtained
#[derive(Debug, Clone, Copy, PartialEq)]
enum Milestone {
    Sampled(f64),
    Extrapolated(f64),
}

impl Milestone {
    fn time(self) -> f64 {
        match self {
            Milestone::Sampled(t) | Milestone::Extrapolated(t) => t,
        }
    }

    fn is_extrapolated(self) -> bool {
        matches!(self, Milestone::Extrapolated(_))
    }
}

#[derive(Debug, Clone, Default)]
pub struct BreakthroughEngine {
    config: BreakthroughConfig,
    isotherms: IsothermTable,
}

impl BreakthroughEngine {
    /// # Errors
    ///
    /// `InvalidConfiguration` when the configuration fails validation.
    pub fn new(config: BreakthroughConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, isotherms: IsothermTable::default() })
    }

    /// Class isotherms used to split capacity between compounds
    ///
    /// Should match the table of the capacity engine feeding this one.
    pub fn with_isotherms(mut self, isotherms: IsothermTable) -> Self {
        self.isotherms = isotherms;
        self
    }

    pub fn config(&self) -> &BreakthroughConfig {
        &self.config
    }

    pub fn default_horizon_days(&self) -> f64 {
        self.config.default_horizon_days
    }

    /// Aggregate breakthrough fraction `min(limit / C)` over the regulated
    /// compounds present, clamped to the configured bounds
    pub fn regulatory_fraction(&self, system: &SystemData) -> f64 {
        self.scaled_regulatory_fraction(system, 1.0)
    }

    /// Regulatory fraction after multiplying every concentration by `multiplier`
    pub fn scaled_regulatory_fraction(&self, system: &SystemData, multiplier: f64) -> f64 {
        system
            .detected_compounds()
            .into_iter()
            .filter_map(|(compound, c)| {
                compound.regulatory_limit_ng_l().map(|limit| limit / (c * multiplier))
            })
            .reduce(f64::min)
            .map(|f| self.clamp_fraction(f))
            .unwrap_or(self.config.unregulated_threshold_fraction)
    }

    /// Thomas curve of the bed for a given capacity and influent
    ///
    /// `influent_ng_l` is floored at the detection limit.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` when `capacity_ug_g` is non-positive or non-finite.
    pub fn thomas_model(
        &self,
        system: &SystemData,
        capacity_ug_g: f64,
        influent_ng_l: f64,
    ) -> Result<ThomasModel> {
        if !(capacity_ug_g.is_finite() && capacity_ug_g > 0.0) {
            return Err(PfasError::invalid(format!(
                "adjusted capacity must be strictly positive, got {capacity_ug_g}"
            )));
        }
        let inputs = ThomasInputs {
            capacity_ug_g,
            media_mass_kg: system.media_mass_kg(),
            daily_volume_l: system.daily_volume_l(),
            influent_ug_l: influent_ng_l.max(self.config.detection_limit_ng_l) / 1000.0,
            rate_constant: self.config.thomas_rate_constant,
        };
        Ok(ThomasModel::from_bed(
            inputs,
            self.config.min_thomas_number,
            self.config.max_thomas_number,
        ))
    }

    /// Aggregate breakthrough curve of the total influent
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` when `system` is invalid, `adjusted_capacity` is
    /// non-positive or `horizon_days` is non-positive.
    pub fn calculate_breakthrough(
        &self,
        system: &SystemData,
        adjusted_capacity: f64,
        horizon_days: f64,
    ) -> Result<BreakthroughResult> {
        system.validate()?;
        self.check_horizon(horizon_days)?;

        let influent = system.influent_total_ng_l();
        let model = self.thomas_model(system, adjusted_capacity, influent)?;
        let fraction = self.regulatory_fraction(system);

        let mut evidence = vec![format!(
            "Aggregate influent {:.2} ng/L against adjusted capacity {:.3} µg/g",
            influent, adjusted_capacity
        )];
        if system.detected_compounds().iter().all(|(c, _)| c.regulatory_limit_ng_l().is_none()) {
            evidence.push(format!(
                "No regulated compound detected, breakthrough defined at {:.0} % of influent",
                fraction * 100.0
            ));
        }

        let result = self.build_result(None, &model, fraction, influent, horizon_days, evidence);
        log::debug!(
            "breakthrough: t*={:.1} d N={:.1} t_b={:.1} d t_50={:.1} d t_ex={:.1} d",
            result.stoichiometric_time_days,
            result.thomas_number,
            result.breakthrough_time_days,
            result.fifty_percent_time_days,
            result.exhaustion_time_days
        );
        Ok(result)
    }

    /// One independent curve per detected compound
    ///
    /// Compounds at zero concentration are omitted.
    ///
    /// # Errors
    ///
    /// Same conditions as [`calculate_breakthrough`](Self::calculate_breakthrough).
    pub fn calculate_multi_compound_breakthrough(
        &self,
        system: &SystemData,
        adjusted_capacity: f64,
        horizon_days: f64,
    ) -> Result<MultiCompoundBreakthrough> {
        system.validate()?;
        self.check_horizon(horizon_days)?;

        let detected = system.detected_compounds();
        let components: Vec<(IsothermParams, f64)> = detected
            .iter()
            .map(|(compound, c)| (self.isotherms.params(compound.class()), *c))
            .collect();

        let mixture = match Freundlich::blend(&components) {
            Some(mixture) => mixture,
            None => {
                // Still reject a bad capacity even when there is nothing to plot
                self.thomas_model(system, adjusted_capacity, 0.0)?;
                return Ok(MultiCompoundBreakthrough::new());
            }
        };

        let mut results = MultiCompoundBreakthrough::new();
        for (compound, concentration) in detected {
            let affinity = self.isotherms.params(compound.class()).kf / mixture.kf();
            let capacity = adjusted_capacity * affinity;
            let model = self.thomas_model(system, capacity, concentration)?;

            let fraction = match compound.regulatory_limit_ng_l() {
                Some(limit) => self.clamp_fraction(limit / concentration),
                None => self.config.unregulated_threshold_fraction,
            };
            let evidence = vec![format!(
                "{compound} at {:.2} ng/L receives {:.0} % of mixture capacity ({:.3} µg/g)",
                concentration,
                affinity * 100.0,
                capacity
            )];

            let result = self.build_result(
                Some(compound),
                &model,
                fraction,
                concentration,
                horizon_days,
                evidence,
            );
            results.insert(compound, result);
        }

        log::debug!("multi-compound breakthrough: {} curves", results.len());
        Ok(results)
    }

    // =============================================================================================
    // Internals
    // =============================================================================================

    fn check_horizon(&self, horizon_days: f64) -> Result<()> {
        if !(horizon_days.is_finite() && horizon_days > 0.0) {
            return Err(PfasError::invalid(format!(
                "horizon must be strictly positive, got {horizon_days} days"
            )));
        }
        Ok(())
    }

    fn clamp_fraction(&self, fraction: f64) -> f64 {
        fraction.clamp(
            self.config.min_threshold_fraction,
            self.config.max_threshold_fraction,
        )
    }

    fn build_result(
        &self,
        compound: Option<PfasCompound>,
        model: &ThomasModel,
        threshold_fraction: f64,
        influent_ng_l: f64,
        horizon_days: f64,
        mut evidence: Vec<String>,
    ) -> BreakthroughResult {
        let c = &self.config;
        let steps = c.resolution;

        let times = DVector::from_fn(steps + 1, |i, _| horizon_days * i as f64 / steps as f64);
        let fractions = times.map(|t| model.effluent_fraction(t));

        let locate = |target: f64| -> Milestone {
            match fractions.iter().position(|&f| f >= target) {
                Some(0) => Milestone::Sampled(0.0),
                Some(i) => {
                    let (t0, t1) = (times[i - 1], times[i]);
                    Milestone::Sampled(model.time_at_fraction(target).clamp(t0, t1))
                }
                None => Milestone::Extrapolated(model.time_at_fraction(target)),
            }
        };

        let breakthrough = locate(threshold_fraction);
        let fifty = locate(0.5);
        let exhaustion = locate(c.exhaustion_fraction);

        evidence.push(format!(
            "Thomas model t* = {:.1} d, N = {:.1}, breakthrough at C/C0 = {:.3}",
            model.stoichiometric_time_days(),
            model.thomas_number(),
            threshold_fraction
        ));

        let mut confidence = c.base_confidence;
        if [breakthrough, fifty, exhaustion].iter().any(|m| m.is_extrapolated()) {
            confidence *= c.beyond_horizon_factor;
            evidence.push(format!(
                "Milestones beyond the {:.0} day horizon extrapolated in closed form",
                horizon_days
            ));
        }
        if influent_ng_l < c.detection_limit_ng_l {
            confidence *= c.detection_floor_factor;
            evidence.push(format!(
                "Influent below detection limit, evaluated at {:.2} ng/L",
                c.detection_limit_ng_l
            ));
        }
        if model.is_clamped() {
            confidence *= c.clamped_front_factor;
            evidence.push(format!(
                "Thomas number clamped to [{}, {}]",
                c.min_thomas_number, c.max_thomas_number
            ));
        }
        let confidence = confidence.clamp(c.min_confidence, 1.0);

        if breakthrough.is_extrapolated() {
            log::warn!(
                "breakthrough{} at {:.0} d lies beyond the {:.0} d horizon",
                compound.map(|c| format!(" of {c}")).unwrap_or_default(),
                breakthrough.time(),
                horizon_days
            );
        }

        BreakthroughResult {
            compound,
            curve: times.iter().copied().zip(fractions.iter().copied()).collect(),
            breakthrough_time_days: breakthrough.time(),
            fifty_percent_time_days: fifty.time(),
            exhaustion_time_days: exhaustion.time(),
            threshold_fraction,
            stoichiometric_time_days: model.stoichiometric_time_days(),
            thomas_number: model.thomas_number(),
            horizon_days,
            within_horizon: !breakthrough.is_extrapolated(),
            confidence,
            evidence,
        }
    }
}
