//! Compliance scanner
//!
//! The only component that knows all four engines. It validates the input,
//! runs the stages in order and assembles a [`ComplianceReport`]; every summary
//! field is derived from the stage results, never recomputed.
//!
//! ```text
//! SystemData ──► capacity ──► breakthrough ──► economics (Monte Carlo)
//!      │             │              │
//!      └─────────────┴──► risk ◄────┘ (projected life, removal efficiency)
//! ```
//!
//! # Overall confidence
//!
//! $$c = \exp\left(\frac{\sum_i w_i \ln c_i}{\sum_i w_i}\right)$$
//!
//! over the capacity, breakthrough, risk and economics confidences with the
//! configured weights (0.35, 0.25, 0.20, 0.20). Each stage confidence is in
//! ]0, 1], so the result is too.
//!
//! # Example
//!
//! ```rust,ignore
//! use pfas_rs::prelude::*;
//!
//! let scanner = ComplianceScanner::default();
//! let report = scanner.analyze_pfas_compliance(&system, &ScanOptions::default().with_seed(7))?;
//! println!("{:?} risk, {:.1} months", report.risk.risk_level, report.summary.predicted_system_life_months);
//! ```

mod report;

use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{ConfidenceWeights, ScannerConfig};
use crate::engines::{BreakthroughEngine, CapacityEngine, EconomicAnalysisEngine, RiskEngine};
use crate::error::Result;
use crate::system::SystemData;

pub use report::{ComplianceReport, QuickAnalysis, ReportSummary, ScanOptions, UrgencyLevel};

/// Orchestrates the four engines
///
/// Holds engines by value; build it once at the composition root and share it
/// by reference.
#[derive(Debug, Clone, Default)]
pub struct ComplianceScanner {
    capacity: CapacityEngine,
    breakthrough: BreakthroughEngine,
    risk: RiskEngine,
    economics: EconomicAnalysisEngine,
    weights: ConfidenceWeights,
}

impl ComplianceScanner {
    /// Scanner over explicitly constructed engines
    ///
    /// The breakthrough engine takes over the isotherm table of the capacity
    /// engine, and the economic stage re-evaluates its samples through it.
    pub fn new(
        capacity: CapacityEngine,
        breakthrough: BreakthroughEngine,
        risk: RiskEngine,
        economics: EconomicAnalysisEngine,
    ) -> Self {
        let breakthrough = breakthrough.with_isotherms(capacity.config().isotherms.clone());
        Self { capacity, breakthrough, risk, economics, weights: ConfidenceWeights::default() }
    }

    /// Scanner with engines built from one consistent configuration
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` when any section fails validation.
    pub fn from_config(config: &ScannerConfig) -> Result<Self> {
        config.validate()?;
        let capacity = CapacityEngine::new(config.capacity.clone())?;
        let breakthrough = BreakthroughEngine::new(config.breakthrough.clone())?;
        let risk = RiskEngine::new(config.risk.clone())?;
        let economics = EconomicAnalysisEngine::new(config.economics.clone())?;
        Self::new(capacity, breakthrough, risk, economics)
            .with_confidence_weights(config.confidence_weights)
    }

    /// # Errors
    ///
    /// `InvalidConfiguration` when the weights are negative or all zero.
    pub fn with_confidence_weights(mut self, weights: ConfidenceWeights) -> Result<Self> {
        weights.validate()?;
        self.weights = weights;
        Ok(self)
    }

    pub fn capacity_engine(&self) -> &CapacityEngine {
        &self.capacity
    }

    pub fn breakthrough_engine(&self) -> &BreakthroughEngine {
        &self.breakthrough
    }

    pub fn risk_engine(&self) -> &RiskEngine {
        &self.risk
    }

    pub fn economic_engine(&self) -> &EconomicAnalysisEngine {
        &self.economics
    }

    /// Full compliance scan
    ///
    /// Identical input, options and seed give an identical report.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` from the first stage that rejects the input; no
    /// partial report is returned.
    pub fn analyze_pfas_compliance(
        &self,
        system: &SystemData,
        options: &ScanOptions,
    ) -> Result<ComplianceReport> {
        system.validate()?;

        let seed = options.seed.unwrap_or_else(time_seed);
        let horizon_days = options
            .horizon_days
            .unwrap_or_else(|| self.breakthrough.default_horizon_days());
        let iterations = options
            .monte_carlo_iterations
            .unwrap_or(self.economics.config().default_iterations);
        let scan_id = match &options.scan_id {
            Some(id) => id.clone(),
            None => fingerprint(system, seed)?,
        };
        log::debug!("scan {scan_id}: seed={seed} horizon={horizon_days} d iterations={iterations}");

        // ====== Capacity ======

        let capacity = self.capacity.analyze_capacity(system)?;
        let removal_efficiency = self.capacity.removal_efficiency_from(system, &capacity);

        // ====== Breakthrough ======

        let breakthrough = self.breakthrough.calculate_breakthrough(
            system,
            capacity.adjusted_capacity_ug_g,
            horizon_days,
        )?;
        let multi_compound_breakthrough = if options.include_multi_compound {
            Some(self.breakthrough.calculate_multi_compound_breakthrough(
                system,
                capacity.adjusted_capacity_ug_g,
                horizon_days,
            )?)
        } else {
            None
        };

        // ====== Risk ======

        let projected_life = self.economics.project_lifespan(&breakthrough, system);
        let risk = self.risk.assess_risk(system, projected_life, removal_efficiency.percent)?;

        // ====== Economics ======

        let mut rng = StdRng::seed_from_u64(seed);
        let economics = self.economics.analyze(
            system,
            &capacity,
            &self.breakthrough,
            &breakthrough,
            iterations,
            &mut rng,
        )?;

        // ====== Report ======

        let overall_confidence = self.overall_confidence([
            capacity.confidence,
            breakthrough.confidence,
            risk.confidence,
            economics.confidence,
        ]);

        let detected_compounds: Vec<_> =
            system.detected_compounds().into_iter().map(|(compound, _)| compound).collect();
        let summary = ReportSummary {
            total_pfas_detected: detected_compounds.len(),
            detected_compounds,
            compounds_above_limit: risk.regulatory_gaps.iter().map(|g| g.compound).collect(),
            total_pfas_ng_l: system.influent_total_ng_l(),
            predicted_system_life_months: economics.projected_lifespan_months,
            urgency_level: UrgencyLevel::assess(
                risk.risk_level,
                economics.projected_lifespan_months,
            ),
        };

        if overall_confidence < 0.5 {
            log::warn!("scan {scan_id}: low overall confidence {overall_confidence:.2}");
        }
        log::debug!(
            "scan {scan_id}: {:?} risk, {:.1} months, confidence {:.2}",
            risk.risk_level,
            summary.predicted_system_life_months,
            overall_confidence
        );

        Ok(ComplianceReport {
            scan_id,
            seed,
            horizon_days,
            capacity,
            removal_efficiency,
            breakthrough,
            multi_compound_breakthrough,
            risk,
            economics,
            overall_confidence,
            summary,
        })
    }

    /// Risk level, projected life and urgent issue count without Monte Carlo
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` when `system` fails validation.
    pub fn quick_analysis(&self, system: &SystemData) -> Result<QuickAnalysis> {
        let capacity = self.capacity.analyze_capacity(system)?;
        let removal = self.capacity.removal_efficiency_from(system, &capacity);
        let breakthrough = self.breakthrough.calculate_breakthrough(
            system,
            capacity.adjusted_capacity_ug_g,
            self.breakthrough.default_horizon_days(),
        )?;
        let projected_life_months = self.economics.project_lifespan(&breakthrough, system);
        let risk = self.risk.assess_risk(system, projected_life_months, removal.percent)?;

        let urgent_issues = risk.regulatory_gaps.len()
            + usize::from(projected_life_months < self.risk.config().short_life_months)
            + usize::from(removal.percent < system.target_removal_efficiency_pct)
            + usize::from(risk.hazard_index > 1.0);

        Ok(QuickAnalysis { risk_level: risk.risk_level, projected_life_months, urgent_issues })
    }

    fn overall_confidence(&self, confidences: [f64; 4]) -> f64 {
        let w = &self.weights;
        let weights = [w.capacity, w.breakthrough, w.risk, w.economics];
        let total: f64 = weights.iter().sum();
        let log_mean: f64 = weights
            .iter()
            .zip(confidences)
            .map(|(w, c)| w * c.max(f64::MIN_POSITIVE).ln())
            .sum::<f64>()
            / total;
        log_mean.exp().clamp(f64::MIN_POSITIVE, 1.0)
    }
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// `scan-` followed by the FNV-1a hash of the input record, mixed with the seed
fn fingerprint(system: &SystemData, seed: u64) -> Result<String> {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let bytes = serde_json::to_vec(system)?;
    let hash = bytes
        .iter()
        .fold(OFFSET, |h, &b| (h ^ u64::from(b)).wrapping_mul(PRIME));
    Ok(format!("scan-{:016x}", hash ^ seed))
}
