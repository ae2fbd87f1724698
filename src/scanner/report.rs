//! Scan options and report records

use serde::{Deserialize, Serialize};

use crate::engines::{
    BreakthroughResult, CapacityResult, EconomicAnalysis, MultiCompoundBreakthrough,
    RemovalEfficiency, RiskAssessment, RiskLevel,
};
use crate::system::PfasCompound;

/// Per-call options of [`ComplianceScanner::analyze_pfas_compliance`](super::ComplianceScanner::analyze_pfas_compliance)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// Also compute one breakthrough curve per detected compound
    pub include_multi_compound: bool,
    /// Defaults to the economic configuration (5000)
    pub monte_carlo_iterations: Option<usize>,
    /// Defaults to a time-based seed
    pub seed: Option<u64>,
    /// Defaults to the breakthrough configuration (3650 days)
    pub horizon_days: Option<f64>,
    /// Defaults to a fingerprint of the input record and seed
    pub scan_id: Option<String>,
}

impl ScanOptions {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.monte_carlo_iterations = Some(iterations);
        self
    }

    pub fn with_horizon_days(mut self, horizon_days: f64) -> Self {
        self.horizon_days = Some(horizon_days);
        self
    }

    pub fn with_multi_compound(mut self) -> Self {
        self.include_multi_compound = true;
        self
    }
}

/// How soon the operator has to act
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyLevel {
    Routine,
    Monitor,
    Urgent,
    Immediate,
}

impl UrgencyLevel {
    /// Worst of the risk band and the remaining-life band
    ///
    /// | Urgency   | Risk level | or life below |
    /// |-----------|------------|---------------|
    /// | Immediate | Critical   | 3 months      |
    /// | Urgent    | High       | 6 months      |
    /// | Monitor   | Low        | 12 months     |
    /// | Routine   | Clear      | otherwise     |
    pub fn assess(risk_level: RiskLevel, life_months: f64) -> Self {
        if risk_level == RiskLevel::Critical || life_months < 3.0 {
            UrgencyLevel::Immediate
        } else if risk_level == RiskLevel::High || life_months < 6.0 {
            UrgencyLevel::Urgent
        } else if risk_level == RiskLevel::Low || life_months < 12.0 {
            UrgencyLevel::Monitor
        } else {
            UrgencyLevel::Routine
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Number of compounds with a non-zero concentration
    pub total_pfas_detected: usize,
    pub detected_compounds: Vec<PfasCompound>,
    pub compounds_above_limit: Vec<PfasCompound>,
    /// Influent total used by the models \[ng/L\]
    pub total_pfas_ng_l: f64,
    pub predicted_system_life_months: f64,
    pub urgency_level: UrgencyLevel,
}

/// Complete result of one compliance scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub scan_id: String,
    /// Seed of the Monte Carlo generator, reusable to reproduce the report
    pub seed: u64,
    pub horizon_days: f64,
    pub capacity: CapacityResult,
    pub removal_efficiency: RemovalEfficiency,
    pub breakthrough: BreakthroughResult,
    pub multi_compound_breakthrough: Option<MultiCompoundBreakthrough>,
    pub risk: RiskAssessment,
    pub economics: EconomicAnalysis,
    /// Weighted geometric mean of the stage confidences, in ]0, 1]
    pub overall_confidence: f64,
    pub summary: ReportSummary,
}

/// Reduced result of [`ComplianceScanner::quick_analysis`](super::ComplianceScanner::quick_analysis)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickAnalysis {
    pub risk_level: RiskLevel,
    pub projected_life_months: f64,
    pub urgent_issues: usize,
}
