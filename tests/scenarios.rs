//! End-to-end compliance scans of representative facilities
//!
//! Each test runs the full scanner with a fixed seed and checks the report
//! against values worked out by hand from the default configuration.

mod common;

use approx::assert_relative_eq;
use common::*;
use pfas_rs::prelude::*;

const SEED: u64 = 20_240_410;
const ITERATIONS: usize = 1000;

fn scan(system: &SystemData) -> ComplianceReport {
    let scanner = ComplianceScanner::default();
    let options = ScanOptions::default().with_seed(SEED).with_iterations(ITERATIONS);
    scanner
        .analyze_pfas_compliance(system, &options)
        .expect("reference facility scans")
}

// =================================================================================================
// Reference facility: two compounds above the MCL
// =================================================================================================

#[test]
fn test_reference_facility_is_high_risk() {
    let report = scan(&sample_system());

    assert_eq!(report.seed, SEED);
    assert_relative_eq!(report.capacity.ebct_min, 12.0, epsilon = 1e-9);
    assert_relative_eq!(report.capacity.adjusted_capacity_ug_g, 8.214, epsilon = 0.01);

    // t_b ≈ 780 operating days ≈ 25.6 months
    assert_relative_eq!(report.breakthrough.breakthrough_time_days, 779.9, epsilon = 1.0);
    assert_relative_eq!(report.summary.predicted_system_life_months, 25.64, epsilon = 0.1);
    assert!(report.breakthrough.within_horizon);
    assert_milestones_ordered(&report.breakthrough, "reference facility");

    assert_eq!(report.risk.risk_level, RiskLevel::High);
    assert_relative_eq!(report.risk.overall_risk_score, 6.27, epsilon = 0.05);
    assert_eq!(report.summary.urgency_level, UrgencyLevel::Urgent);
    assert_eq!(
        report.summary.compounds_above_limit,
        vec![PfasCompound::Pfoa, PfasCompound::Pfos]
    );
    assert_eq!(report.summary.total_pfas_detected, 2);
    assert_relative_eq!(report.summary.total_pfas_ng_l, 40.0);

    assert!(report.removal_efficiency.percent > 95.0);
    assert!(report.multi_compound_breakthrough.is_none());
    assert_confidence(report.overall_confidence, "reference facility");
}

#[test]
fn test_reference_facility_economics() {
    let report = scan(&sample_system());
    let economics = &report.economics;

    // 19 200 kg · (4.0 + 1.5) + 15 000 + 8 000
    assert_relative_eq!(economics.changeout_cost, 128_600.0, epsilon = 1e-6);
    assert_relative_eq!(
        economics.changeouts_per_year,
        12.0 / economics.projected_lifespan_months,
        epsilon = 1e-12
    );
    assert!(economics.capital_avoidance > 0.0);
    assert!(economics.capital_avoidance < economics.changeout_cost);
    assert!(economics.cost_per_million_gallons > 0.0);

    let mc = &economics.monte_carlo;
    assert_eq!(mc.iterations, ITERATIONS);
    assert!(mc.std_dev > 0.0);
    assert_percentiles_ordered(mc, "reference facility");
    assert_relative_eq!(economics.safe_lifespan_months, mc.p5);
    // The deterministic projection sits inside the simulated spread
    assert!(mc.p5 < economics.projected_lifespan_months);
    assert!(economics.projected_lifespan_months < mc.p95);
}

#[test]
fn test_quick_analysis_matches_full_scan() {
    let system = sample_system();
    let scanner = ComplianceScanner::default();
    let quick = scanner.quick_analysis(&system).unwrap();
    let report = scan(&system);

    assert_eq!(quick.risk_level, report.risk.risk_level);
    assert_relative_eq!(quick.projected_life_months, report.summary.predicted_system_life_months);
    // PFOA and PFOS above the limit, nothing else
    assert_eq!(quick.urgent_issues, 2);
}

// =================================================================================================
// Other facilities
// =================================================================================================

#[test]
fn test_low_level_facility_is_clear() {
    let report = scan(&low_level_system());

    assert!(report.risk.regulatory_gaps.is_empty());
    assert!(report.risk.hazard_index < 1.0);
    // PFOA at 75 % and PFOS at 62.5 % of the 4 ng/L limit
    assert_relative_eq!(report.risk.components.proximity, 0.5, epsilon = 1e-12);
    assert_eq!(report.risk.risk_level, RiskLevel::Clear);
    assert_eq!(report.summary.urgency_level, UrgencyLevel::Routine);
    assert_eq!(report.summary.total_pfas_detected, 5);
}

#[test]
fn test_single_compound_exceedance() {
    let report = scan(&system_with(&[(PfasCompound::Pfoa, 50.0)]));

    assert_eq!(report.summary.total_pfas_detected, 1);
    assert_eq!(report.summary.detected_compounds, vec![PfasCompound::Pfoa]);
    assert_eq!(report.risk.regulatory_gaps.len(), 1);

    let gap = &report.risk.regulatory_gaps[0];
    assert_eq!(gap.compound, PfasCompound::Pfoa);
    assert_relative_eq!(gap.regulatory_limit, 4.0);
    assert_relative_eq!(gap.exceedance_ratio, 12.5);
    assert!(report.risk.risk_level >= RiskLevel::High);
}

#[test]
fn test_contaminated_facility_is_critical() {
    let report = scan(&contaminated_system());

    assert!(report.summary.predicted_system_life_months < 3.0);
    assert_eq!(report.risk.risk_level, RiskLevel::Critical);
    assert_eq!(report.summary.urgency_level, UrgencyLevel::Immediate);
    assert!(report.risk.estimated_fines_exposure > 0.0);
    assert!(report
        .risk
        .recommendations
        .iter()
        .any(|r| r.contains("change-out immediately")));
    assert_milestones_ordered(&report.breakthrough, "contaminated facility");
}

#[test]
fn test_contaminated_life_independent_of_horizon() {
    let scanner = ComplianceScanner::default();
    let system = contaminated_system();
    let options = ScanOptions::default().with_seed(SEED).with_iterations(ITERATIONS);

    let decade = scanner.analyze_pfas_compliance(&system, &options).unwrap();
    let century = scanner
        .analyze_pfas_compliance(&system, &options.clone().with_horizon_days(36_500.0))
        .unwrap();

    // 51.3 operating days, whatever the sampling step
    assert_relative_eq!(century.breakthrough.breakthrough_time_days, 51.3, epsilon = 0.1);
    assert_relative_eq!(
        century.summary.predicted_system_life_months,
        decade.summary.predicted_system_life_months,
        max_relative = 1e-9
    );

    let mc = &century.economics.monte_carlo;
    let life = century.economics.projected_lifespan_months;
    assert!(mc.p5 < life && life < mc.p95, "life {life} outside {mc:?}");
    assert_milestones_ordered(&century.breakthrough, "contaminated facility, 100 years");
}

#[test]
fn test_pfas_free_facility() {
    let report = scan(&pfas_free_system());

    assert_eq!(report.summary.total_pfas_detected, 0);
    assert!(report.summary.compounds_above_limit.is_empty());
    assert_eq!(report.risk.risk_level, RiskLevel::Clear);
    assert_relative_eq!(report.risk.overall_risk_score, 0.0);
    assert_eq!(report.summary.urgency_level, UrgencyLevel::Routine);

    let life = report.summary.predicted_system_life_months;
    assert!(life.is_finite() && life > 0.0);
    assert!(!report.breakthrough.within_horizon);
    assert_confidence(report.overall_confidence, "PFAS-free facility");
}

#[test]
fn test_multi_compound_breakthrough_ordering() {
    let system = sample_system();
    let scanner = ComplianceScanner::default();
    let options = ScanOptions::default()
        .with_seed(SEED)
        .with_iterations(ITERATIONS)
        .with_multi_compound();
    let report = scanner.analyze_pfas_compliance(&system, &options).unwrap();

    let curves = report.multi_compound_breakthrough.expect("requested");
    assert_eq!(curves.len(), 2);
    let keys: Vec<_> = curves.keys().copied().collect();
    assert_eq!(keys, vec![PfasCompound::Pfoa, PfasCompound::Pfos]);

    let pfoa = &curves[&PfasCompound::Pfoa];
    let pfos = &curves[&PfasCompound::Pfos];
    assert_eq!(pfoa.compound, Some(PfasCompound::Pfoa));
    // Sulfonates adsorb more strongly and break through later
    assert!(pfos.breakthrough_time_days > pfoa.breakthrough_time_days);
    assert!(pfoa.within_horizon && pfos.within_horizon);
    for (compound, curve) in &curves {
        assert_milestones_ordered(curve, compound.name());
    }
}

// =================================================================================================
// Rejected inputs
// =================================================================================================

#[test]
fn test_invalid_system_is_rejected_without_report() {
    let mut system = sample_system();
    system.hydraulics.flow_rate_m3_per_h = -5.0;

    let scanner = ComplianceScanner::default();
    let err = scanner
        .analyze_pfas_compliance(&system, &ScanOptions::default().with_seed(SEED))
        .unwrap_err();
    assert!(matches!(err, PfasError::InvalidConfiguration(_)));
    assert!(scanner.quick_analysis(&system).is_err());
}

#[test]
fn test_zero_iterations_is_rejected() {
    let scanner = ComplianceScanner::default();
    let options = ScanOptions::default().with_seed(SEED).with_iterations(0);
    assert!(scanner.analyze_pfas_compliance(&sample_system(), &options).is_err());
}
