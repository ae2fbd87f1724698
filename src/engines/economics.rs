//! Economic analysis engine
//!
//! Projects the service life of the bed, its cost per volume treated and the
//! value of deferring the next change-out, with a Monte Carlo distribution of
//! the service life.
//!
//! # Monte Carlo
//!
//! Each sample multiplies the adjusted capacity and the influent by
//! independent mean-one lognormal factors
//!
//! $$m = \exp\left(\sigma z - \sigma^2 / 2\right), \qquad z \sim \mathcal{N}(0, 1)$$
//!
//! with $\sigma = \sigma_0 (2 - \text{confidence})$ capped at `max_sigma`, so a
//! less certain upstream estimate widens the spread. The breakthrough time of
//! each sample follows from the closed-form Thomas inversion of the
//! [`BreakthroughEngine`] that produced the deterministic curve, with the
//! regulatory fraction recomputed for the perturbed influent.
//!
//! Normal deviates are always drawn sequentially from the injected generator;
//! only their evaluation may run on Rayon (feature `parallel`, above
//! `EconomicConfig::parallel_threshold` samples). The same seed therefore
//! gives the same statistics with or without the feature.
//!
//! # Costs
//!
//! | Quantity                  | Formula                                                  |
//! |---------------------------|----------------------------------------------------------|
//! | change-out cost           | `M · (media + disposal) + replacement + labor`           |
//! | cost per million gallons  | `change-out cost / (gallons treated per life / 10⁶)`     |
//! | capital avoidance         | `change-out cost · (1 − (1 + r)^(−life / 12))`           |
//! | change-outs per year      | `12 / life`                                              |

use nalgebra::DVector;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::config::EconomicConfig;
use crate::engines::breakthrough::{BreakthroughEngine, BreakthroughResult};
use crate::engines::capacity::CapacityResult;
use crate::error::{PfasError, Result};
use crate::models::BreakthroughModel;
use crate::system::{SystemData, GALLONS_PER_M3};

/// Distribution of the simulated service life \[months\]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResult {
    pub iterations: usize,
    pub mean: f64,
    /// Sample standard deviation (n − 1)
    pub std_dev: f64,
    pub p5: f64,
    pub p10: f64,
    pub p50: f64,
    pub p90: f64,
    pub p95: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicAnalysis {
    pub projected_lifespan_months: f64,
    /// Life reached by 95 % of the samples (5th percentile)
    pub safe_lifespan_months: f64,
    pub cost_per_million_gallons: f64,
    pub capital_avoidance: f64,
    pub changeout_cost: f64,
    pub changeouts_per_year: f64,
    pub monte_carlo: MonteCarloResult,
    pub confidence: f64,
    pub evidence: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct EconomicAnalysisEngine {
    config: EconomicConfig,
}

impl EconomicAnalysisEngine {
    /// # Errors
    ///
    /// `InvalidConfiguration` when the configuration fails validation.
    pub fn new(config: EconomicConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EconomicConfig {
        &self.config
    }

    /// Breakthrough time converted from operating days to calendar months
    pub fn project_lifespan(&self, breakthrough: &BreakthroughResult, system: &SystemData) -> f64 {
        system.operating_days_to_months(breakthrough.breakthrough_time_days)
    }

    /// Cost of one media change-out
    pub fn changeout_cost(&self, system: &SystemData) -> f64 {
        let costs = &system.costs;
        system.media_mass_kg() * (costs.media_cost_per_kg + costs.disposal_cost_per_kg)
            + costs.replacement_cost
            + costs.labor_cost_per_changeout
    }

    pub fn cost_per_million_gallons(&self, system: &SystemData, lifespan_months: f64) -> f64 {
        let months = lifespan_months.max(self.config.min_lifespan_months);
        let gallons = system.annual_volume_m3() * months / 12.0 * GALLONS_PER_M3;
        self.changeout_cost(system) / (gallons / 1.0e6)
    }

    /// Present value of deferring the next change-out by `lifespan_months`
    pub fn capital_avoidance(&self, lifespan_months: f64, system: &SystemData) -> f64 {
        let years = lifespan_months.max(self.config.min_lifespan_months) / 12.0;
        self.changeout_cost(system) * (1.0 - (1.0 + self.config.discount_rate).powf(-years))
    }

    /// Simulated service-life distribution
    ///
    /// `engine` must be the breakthrough engine behind `breakthrough`, so the
    /// samples share its Thomas and threshold settings.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` when `iterations == 0` or the capacity is unusable.
    pub fn run_monte_carlo<R: Rng + ?Sized>(
        &self,
        system: &SystemData,
        capacity: &CapacityResult,
        engine: &BreakthroughEngine,
        breakthrough: &BreakthroughResult,
        iterations: usize,
        rng: &mut R,
    ) -> Result<MonteCarloResult> {
        if iterations == 0 {
            return Err(PfasError::invalid("Monte Carlo iterations must be > 0"));
        }
        let c = &self.config;
        let sigma_q = (c.capacity_sigma * (2.0 - capacity.confidence)).min(c.max_sigma);
        let sigma_c = (c.concentration_sigma * (2.0 - breakthrough.confidence)).min(c.max_sigma);

        let draws: Vec<(f64, f64)> = (0..iterations)
            .map(|_| {
                let z_q: f64 = rng.sample(StandardNormal);
                let z_c: f64 = rng.sample(StandardNormal);
                (z_q, z_c)
            })
            .collect();

        let parallel = iterations > c.parallel_threshold;
        let sigmas = (sigma_q, sigma_c);
        let lifespans =
            self.simulate_lifespans(system, capacity, engine, sigmas, &draws, parallel)?;

        let result = summarize(lifespans);
        log::debug!(
            "monte carlo: n={} mean={:.2} sd={:.2} p5={:.2} p95={:.2} months",
            result.iterations,
            result.mean,
            result.std_dev,
            result.p5,
            result.p95
        );
        Ok(result)
    }

    /// Service life \[months\] of every pre-drawn `(z_capacity, z_influent)` pair
    fn simulate_lifespans(
        &self,
        system: &SystemData,
        capacity: &CapacityResult,
        engine: &BreakthroughEngine,
        (sigma_q, sigma_c): (f64, f64),
        draws: &[(f64, f64)],
        parallel: bool,
    ) -> Result<Vec<f64>> {
        let q0 = capacity.adjusted_capacity_ug_g;
        let influent = system.influent_total_ng_l();
        let evaluate = |&(z_q, z_c): &(f64, f64)| -> Result<f64> {
            let m_q = (sigma_q * z_q - 0.5 * sigma_q * sigma_q).exp();
            let m_c = (sigma_c * z_c - 0.5 * sigma_c * sigma_c).exp();
            let model = engine.thomas_model(system, q0 * m_q, influent * m_c)?;
            let fraction = engine.scaled_regulatory_fraction(system, m_c);
            Ok(system.operating_days_to_months(model.time_at_fraction(fraction)))
        };

        if parallel {
            #[cfg(feature = "parallel")]
            {
                use rayon::prelude::*;
                return draws.par_iter().map(evaluate).collect();
            }
            // parallel feature not compiled in, fall through to sequential
        }
        draws.iter().map(evaluate).collect()
    }

    /// Complete economic projection
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` when `system` is invalid or `iterations == 0`.
    pub fn analyze<R: Rng + ?Sized>(
        &self,
        system: &SystemData,
        capacity: &CapacityResult,
        engine: &BreakthroughEngine,
        breakthrough: &BreakthroughResult,
        iterations: usize,
        rng: &mut R,
    ) -> Result<EconomicAnalysis> {
        system.validate()?;
        let c = &self.config;

        let projected = self.project_lifespan(breakthrough, system);
        let monte_carlo =
            self.run_monte_carlo(system, capacity, engine, breakthrough, iterations, rng)?;
        let changeout_cost = self.changeout_cost(system);
        let cost_per_million_gallons = self.cost_per_million_gallons(system, projected);
        let capital_avoidance = self.capital_avoidance(projected, system);
        let changeouts_per_year = 12.0 / projected.max(c.min_lifespan_months);

        let mut evidence = vec![
            format!(
                "Breakthrough after {:.0} operating days ({:.1} months)",
                breakthrough.breakthrough_time_days, projected
            ),
            format!(
                "{} Monte Carlo samples, 5th to 95th percentile {:.1} to {:.1} months",
                monte_carlo.iterations, monte_carlo.p5, monte_carlo.p95
            ),
            format!(
                "Change-out cost {:.0} for {:.0} kg of media",
                changeout_cost,
                system.media_mass_kg()
            ),
        ];

        let cv = if monte_carlo.mean > 0.0 { monte_carlo.std_dev / monte_carlo.mean } else { 1.0 };
        let mut confidence = c.base_confidence * (1.0 - 0.5 * cv);
        if !breakthrough.within_horizon {
            confidence *= c.beyond_horizon_factor;
            evidence.push("Projected life extends beyond the simulation horizon".to_string());
        }
        let confidence = confidence.clamp(c.min_confidence, 1.0);

        Ok(EconomicAnalysis {
            projected_lifespan_months: projected,
            safe_lifespan_months: monte_carlo.p5,
            cost_per_million_gallons,
            capital_avoidance,
            changeout_cost,
            changeouts_per_year,
            monte_carlo,
            confidence,
            evidence,
        })
    }
}

// =================================================================================================
// Statistics
// =================================================================================================

/// Linear-interpolation percentile of sorted data, `p` in \[0, 1\]
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let position = p * (sorted.len() - 1) as f64;
    let lo = position.floor() as usize;
    let hi = position.ceil() as usize;
    sorted[lo] + (position - lo as f64) * (sorted[hi] - sorted[lo])
}

fn summarize(mut samples: Vec<f64>) -> MonteCarloResult {
    samples.sort_by(f64::total_cmp);
    let n = samples.len();
    let values = DVector::from_column_slice(&samples);
    let mean = values.mean();
    let std_dev = if n > 1 {
        (values.map(|x| (x - mean) * (x - mean)).sum() / (n - 1) as f64).sqrt()
    } else {
        0.0
    };

    MonteCarloResult {
        iterations: n,
        mean,
        std_dev,
        p5: percentile(&samples, 0.05),
        p10: percentile(&samples, 0.10),
        p50: percentile(&samples, 0.50),
        p90: percentile(&samples, 0.90),
        p95: percentile(&samples, 0.95),
    }
}
