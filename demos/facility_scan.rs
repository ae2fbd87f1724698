//! Example: compliance scan of a groundwater GAC plant
//!
//! Scans a well field treated by two lead/lag carbon vessels and prints the
//! report, then the full report as JSON.
//!
//! ```bash
//! cargo run --example facility_scan
//! cargo run --example facility_scan -- facility.json scanner.toml
//! ```
//!
//! **Physical System**:
//! - Flow: 200 m³/h through a 40 m³ bituminous bed (12 min EBCT)
//! - Water: TOC 1.0 mg/L, sulfate 20 mg/L, pH 7.4, 15 °C
//! - Influent: PFOA 25 ng/L, PFOS 15 ng/L, PFHxS 6 ng/L, PFBS 4 ng/L

use pfas_rs::config::ScannerConfig;
use pfas_rs::prelude::*;
use pfas_rs::system::{
    CostParameters, GacMedia, GacType, Hydraulics, OperatingSchedule, SystemType, VesselGeometry,
    WaterChemistry,
};

use std::time::Instant;

fn well_field() -> SystemData {
    SystemData {
        system_type: SystemType::Gac,
        vessel: VesselGeometry { diameter_m: 3.66, height_m: 6.0 },
        hydraulics: Hydraulics {
            flow_rate_m3_per_h: 200.0,
            bed_height_m: 3.8,
            bed_volume_m3: 40.0,
            target_ebct_min: 12.0,
        },
        water: WaterChemistry {
            toc_mg_l: 1.0,
            sulfate_mg_l: 20.0,
            chloride_mg_l: 30.0,
            alkalinity_mg_l: 100.0,
            hardness_mg_l: 120.0,
            ph: 7.4,
            temperature_c: 15.0,
        },
        pfas: [
            (PfasCompound::Pfoa, 25.0),
            (PfasCompound::Pfos, 15.0),
            (PfasCompound::Pfhxs, 6.0),
            (PfasCompound::Pfbs, 4.0),
        ]
        .into_iter()
        .collect(),
        total_pfas_ng_l: 52.0,
        media: GacMedia {
            media_type: GacType::Bituminous,
            density_kg_m3: 480.0,
            particle_size_mm: 1.0,
            iodine_number: 1000.0,
            surface_area_m2_g: 1000.0,
        },
        costs: CostParameters {
            media_cost_per_kg: 4.0,
            replacement_cost: 15_000.0,
            labor_cost_per_changeout: 8_000.0,
            disposal_cost_per_kg: 1.5,
        },
        schedule: OperatingSchedule { days_per_year: 365.0, hours_per_day: 24.0 },
        target_removal_efficiency_pct: 95.0,
        safety_factor: 1.2,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);

    let system = match args.next() {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => well_field(),
    };
    let config = match args.next() {
        Some(path) => ScannerConfig::from_toml_str(&std::fs::read_to_string(path)?)?,
        None => ScannerConfig::default(),
    };

    println!("═══════════════════════════════════════════════════════");
    println!("  PFAS Compliance Scan - GAC Treatment Train");
    println!("═══════════════════════════════════════════════════════\n");

    let scanner = ComplianceScanner::from_config(&config)?;
    let options = ScanOptions::default().with_seed(2026).with_multi_compound();

    let start = Instant::now();
    let report = scanner.analyze_pfas_compliance(&system, &options)?;
    let elapsed = start.elapsed();

    // ====== Capacity ======

    println!("Capacity:");
    println!("  EBCT               : {:.1} min", report.capacity.ebct_min);
    println!("  Base capacity      : {:.2} µg/g", report.capacity.base_capacity_ug_g);
    println!("  Adjusted capacity  : {:.2} µg/g", report.capacity.adjusted_capacity_ug_g);
    println!("  Removal efficiency : {:.1} %", report.removal_efficiency.percent);
    for line in &report.capacity.evidence {
        println!("    - {line}");
    }

    // ====== Breakthrough ======

    println!("\nBreakthrough (aggregate):");
    println!("  At MCL fraction    : {:.0} days", report.breakthrough.breakthrough_time_days);
    println!("  50 %               : {:.0} days", report.breakthrough.fifty_percent_time_days);
    println!("  Exhaustion         : {:.0} days", report.breakthrough.exhaustion_time_days);
    if let Some(curves) = &report.multi_compound_breakthrough {
        println!("\nBreakthrough per compound:");
        for (compound, curve) in curves {
            println!("  {:<7}: {:.0} days", compound.name(), curve.breakthrough_time_days);
        }
    }

    // ====== Risk ======

    println!("\nRisk:");
    println!(
        "  Score / level      : {:.2} / {:?}",
        report.risk.overall_risk_score, report.risk.risk_level
    );
    println!("  Hazard index       : {:.3}", report.risk.hazard_index);
    println!("  Fines exposure     : {:.0}", report.risk.estimated_fines_exposure);
    for recommendation in &report.risk.recommendations {
        println!("    - {recommendation}");
    }

    // ====== Economics ======

    let mc = &report.economics.monte_carlo;
    println!("\nEconomics:");
    println!("  Projected life     : {:.1} months", report.economics.projected_lifespan_months);
    println!("  Safe life (P95)    : {:.1} months", report.economics.safe_lifespan_months);
    println!("  Cost / Mgal        : {:.2}", report.economics.cost_per_million_gallons);
    println!("  Change-out cost    : {:.0}", report.economics.changeout_cost);
    println!(
        "  Monte Carlo        : n={} mean={:.1} sd={:.1} [{:.1}, {:.1}]",
        mc.iterations, mc.mean, mc.std_dev, mc.p5, mc.p95
    );

    println!("\nSummary:");
    println!("  Scan               : {}", report.scan_id);
    println!("  Urgency            : {:?}", report.summary.urgency_level);
    println!("  Overall confidence : {:.2}", report.overall_confidence);
    println!("  Elapsed            : {:.1} ms\n", elapsed.as_secs_f64() * 1000.0);

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
