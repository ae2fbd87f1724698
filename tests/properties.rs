//! Invariants that must hold over the whole valid input space
//!
//! Sweeps flow, influent strength and background chemistry around the
//! reference facility instead of checking single points.

mod common;

use common::*;
use pfas_rs::config::{ConfidenceWeights, RiskConfig, ScannerConfig};
use pfas_rs::prelude::*;
use pfas_rs::system::SystemType;

const SEED: u64 = 7;

fn sweep() -> Vec<SystemData> {
    let mut systems = Vec::new();
    for &flow in &[50.0, 200.0, 600.0] {
        for &scale in &[0.1, 1.0, 10.0, 100.0] {
            for &toc in &[0.0, 1.0, 5.0] {
                let mut system = system_with(&[
                    (PfasCompound::Pfoa, 25.0 * scale),
                    (PfasCompound::Pfos, 15.0 * scale),
                    (PfasCompound::Pfbs, 5.0 * scale),
                ]);
                system.hydraulics.flow_rate_m3_per_h = flow;
                system.water.toc_mg_l = toc;
                systems.push(system);
            }
        }
    }
    systems
}

// =================================================================================================
// Breakthrough milestones
// =================================================================================================

#[test]
fn test_milestones_ordered_over_sweep() {
    let capacity = CapacityEngine::default();
    let breakthrough = BreakthroughEngine::default();

    for (i, system) in sweep().iter().enumerate() {
        let q = capacity.analyze_capacity(system).unwrap().adjusted_capacity_ug_g;
        let result = breakthrough.calculate_breakthrough(system, q, 3650.0).unwrap();
        assert_milestones_ordered(&result, &format!("sweep #{i}"));

        let curves = breakthrough
            .calculate_multi_compound_breakthrough(system, q, 3650.0)
            .unwrap();
        assert_eq!(curves.len(), 3);
        for (compound, curve) in &curves {
            assert_milestones_ordered(curve, &format!("sweep #{i} {compound}"));
        }
    }
}

#[test]
fn test_curve_is_monotone_and_bounded() {
    let system = sample_system();
    let q = CapacityEngine::default().analyze_capacity(&system).unwrap().adjusted_capacity_ug_g;
    let result = BreakthroughEngine::default().calculate_breakthrough(&system, q, 3650.0).unwrap();

    assert!(!result.curve.is_empty());
    for pair in result.curve.windows(2) {
        let (t0, c0) = pair[0];
        let (t1, c1) = pair[1];
        assert!(t1 > t0);
        assert!(c1 >= c0, "curve decreases between {t0} and {t1} days");
    }
    assert!(result.curve.iter().all(|&(_, c)| (0.0..=1.0).contains(&c)));
}

// =================================================================================================
// Confidence bounds
// =================================================================================================

#[test]
fn test_confidences_within_unit_interval() {
    let scanner = ComplianceScanner::default();
    let options = ScanOptions::default().with_seed(SEED).with_iterations(200);

    let mut systems = sweep();
    let mut ion_exchange = sample_system();
    ion_exchange.system_type = SystemType::IonExchange;
    systems.push(ion_exchange);
    let mut unlisted = sample_system();
    unlisted.total_pfas_ng_l = 400.0;
    systems.push(unlisted);
    systems.push(pfas_free_system());

    for (i, system) in systems.iter().enumerate() {
        let report = scanner.analyze_pfas_compliance(system, &options).unwrap();
        let label = format!("system #{i}");
        assert_confidence(report.capacity.confidence, &label);
        assert_confidence(report.removal_efficiency.confidence, &label);
        assert_confidence(report.breakthrough.confidence, &label);
        assert_confidence(report.risk.confidence, &label);
        assert_confidence(report.economics.confidence, &label);
        assert_confidence(report.overall_confidence, &label);
    }
}

#[test]
fn test_out_of_calibration_lowers_capacity_confidence() {
    let engine = CapacityEngine::default();
    let nominal = engine.analyze_capacity(&sample_system()).unwrap();

    let mut murky = sample_system();
    murky.water.toc_mg_l = 12.0;
    let murky = engine.analyze_capacity(&murky).unwrap();

    assert!(murky.confidence < nominal.confidence);
    assert!(murky.confidence > 0.0);
}

#[test]
fn test_single_weight_selects_stage_confidence() {
    let weights = ConfidenceWeights { capacity: 1.0, breakthrough: 0.0, risk: 0.0, economics: 0.0 };
    let scanner = ComplianceScanner::default().with_confidence_weights(weights).unwrap();
    let report = scanner
        .analyze_pfas_compliance(&sample_system(), &ScanOptions::default().with_seed(SEED))
        .unwrap();

    approx::assert_relative_eq!(
        report.overall_confidence,
        report.capacity.confidence,
        epsilon = 1e-12
    );
}

// =================================================================================================
// Competition monotonicity
// =================================================================================================

#[test]
fn test_capacity_non_increasing_in_toc() {
    let capacity = CapacityEngine::default();
    let breakthrough = BreakthroughEngine::default();
    let mut previous: Option<(f64, f64)> = None;

    for &toc in &[0.0, 0.5, 1.0, 2.0, 5.0, 20.0] {
        let mut system = sample_system();
        system.water.toc_mg_l = toc;
        let result = capacity.analyze_capacity(&system).unwrap();
        assert!(result.adjusted_capacity_ug_g <= result.base_capacity_ug_g);

        let life = breakthrough
            .calculate_breakthrough(&system, result.adjusted_capacity_ug_g, 3650.0)
            .unwrap()
            .breakthrough_time_days;

        if let Some((q_prev, life_prev)) = previous {
            assert!(result.adjusted_capacity_ug_g <= q_prev, "capacity rose at TOC {toc}");
            assert!(life <= life_prev, "life rose at TOC {toc}");
        }
        previous = Some((result.adjusted_capacity_ug_g, life));
    }
}

#[test]
fn test_capacity_non_increasing_in_sulfate() {
    let engine = CapacityEngine::default();
    let capacities: Vec<f64> = [0.0, 10.0, 50.0, 200.0, 1000.0]
        .iter()
        .map(|&so4| {
            let mut system = sample_system();
            system.water.sulfate_mg_l = so4;
            engine.analyze_capacity(&system).unwrap().adjusted_capacity_ug_g
        })
        .collect();

    for pair in capacities.windows(2) {
        assert!(pair[1] <= pair[0], "capacities {capacities:?}");
    }
}

// =================================================================================================
// Monte Carlo
// =================================================================================================

#[test]
fn test_percentiles_ordered_over_sweep() {
    let scanner = ComplianceScanner::default();
    let options = ScanOptions::default().with_seed(SEED).with_iterations(500);

    for (i, system) in sweep().iter().enumerate().step_by(3) {
        let report = scanner.analyze_pfas_compliance(system, &options).unwrap();
        let mc = &report.economics.monte_carlo;
        assert_percentiles_ordered(mc, &format!("sweep #{i}"));
        assert!(mc.std_dev > 0.0, "sweep #{i}: degenerate spread");
        assert!(mc.p50 >= mc.p10 && mc.p50 <= mc.p90);
    }
}

#[test]
fn test_two_iterations_have_spread() {
    let scanner = ComplianceScanner::default();
    let options = ScanOptions::default().with_seed(SEED).with_iterations(2);
    let report = scanner.analyze_pfas_compliance(&sample_system(), &options).unwrap();
    assert!(report.economics.monte_carlo.std_dev > 0.0);
}

// =================================================================================================
// Risk bands
// =================================================================================================

#[test]
fn test_risk_level_non_decreasing_in_score() {
    let thresholds = RiskConfig::default().thresholds;
    let levels: Vec<RiskLevel> = (0..=100)
        .map(|i| RiskLevel::from_score(i as f64 / 10.0, &thresholds))
        .collect();
    for pair in levels.windows(2) {
        assert!(pair[0] <= pair[1]);
    }
    assert_eq!(levels[0], RiskLevel::Clear);
    assert_eq!(levels[100], RiskLevel::Critical);
}

#[test]
fn test_assessed_levels_follow_scores() {
    let scanner = ComplianceScanner::default();
    let mut assessed: Vec<(f64, RiskLevel)> = sweep()
        .iter()
        .map(|system| {
            let quick = scanner.quick_analysis(system).unwrap();
            let removal = scanner.capacity_engine().calculate_removal_efficiency(system).unwrap();
            let risk = scanner
                .risk_engine()
                .assess_risk(system, quick.projected_life_months, removal.percent)
                .unwrap();
            assert_eq!(risk.risk_level, quick.risk_level);
            assert!((0.0..=10.0).contains(&risk.overall_risk_score));
            (risk.overall_risk_score, risk.risk_level)
        })
        .collect();

    assessed.sort_by(|a, b| a.0.total_cmp(&b.0));
    for pair in assessed.windows(2) {
        assert!(pair[0].1 <= pair[1].1, "{:?} then {:?}", pair[0], pair[1]);
    }
}

#[test]
fn test_pfas_free_is_clear_whatever_the_bed() {
    let engine = RiskEngine::default();
    let risk = engine.assess_risk(&pfas_free_system(), 0.5, 10.0).unwrap();
    assert_eq!(risk.risk_level, RiskLevel::Clear);
    assert!(risk.regulatory_gaps.is_empty());
    assert_eq!(risk.estimated_fines_exposure, 0.0);
}

// =================================================================================================
// Configuration
// =================================================================================================

#[test]
fn test_toml_configuration_reaches_engines() {
    let config = ScannerConfig::from_toml_str(
        r#"
        [economics]
        default_iterations = 250

        [risk.thresholds]
        low = 0.5
        high = 3.0
        critical = 6.0
        "#,
    )
    .unwrap();
    let scanner = ComplianceScanner::from_config(&config).unwrap();
    let report = scanner
        .analyze_pfas_compliance(&sample_system(), &ScanOptions::default().with_seed(SEED))
        .unwrap();

    assert_eq!(report.economics.monte_carlo.iterations, 250);
    // Score 6.27 crosses the lowered critical threshold
    assert_eq!(report.risk.risk_level, RiskLevel::Critical);
}

#[test]
fn test_invalid_toml_configuration_is_rejected() {
    let err = ScannerConfig::from_toml_str(
        r#"
        [economics]
        default_iterations = 0
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, PfasError::InvalidConfiguration(_)));
}
