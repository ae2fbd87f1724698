//! Facility records shared by the integration tests

use pfas_rs::system::{
    CostParameters, GacMedia, GacType, Hydraulics, OperatingSchedule, PfasCompound,
    PfasConcentrations, SystemData, SystemType, VesselGeometry, WaterChemistry,
};

/// Municipal groundwater well field on two lead/lag GAC vessels
///
/// 200 m³/h through 40 m³ of bituminous carbon (12 min EBCT), TOC 1 mg/L.
/// PFOA 25 ng/L and PFOS 15 ng/L, both above the 4 ng/L MCL.
pub fn sample_system() -> SystemData {
    let mut pfas = PfasConcentrations::new();
    pfas.insert(PfasCompound::Pfoa, 25.0);
    pfas.insert(PfasCompound::Pfos, 15.0);

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
        pfas,
        total_pfas_ng_l: 40.0,
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

/// Same facility with `pairs` as the only compounds and a matching total
pub fn system_with(pairs: &[(PfasCompound, f64)]) -> SystemData {
    let mut system = sample_system();
    system.pfas = pairs.iter().copied().collect();
    system.with_total_from_compounds()
}

/// Every compound at or below 3 ng/L, 14.5 ng/L in total
pub fn low_level_system() -> SystemData {
    system_with(&[
        (PfasCompound::Pfoa, 3.0),
        (PfasCompound::Pfos, 2.5),
        (PfasCompound::Pfhxs, 3.0),
        (PfasCompound::Pfbs, 3.0),
        (PfasCompound::Pfhxa, 3.0),
    ])
}

/// Fire-training-area plume, 3100 ng/L in total
pub fn contaminated_system() -> SystemData {
    system_with(&[
        (PfasCompound::Pfoa, 1500.0),
        (PfasCompound::Pfos, 1200.0),
        (PfasCompound::Pfbs, 400.0),
    ])
}

/// Every tracked compound reported at zero
pub fn pfas_free_system() -> SystemData {
    let pairs: Vec<(PfasCompound, f64)> = PfasCompound::ALL.iter().map(|&c| (c, 0.0)).collect();
    system_with(&pairs)
}
