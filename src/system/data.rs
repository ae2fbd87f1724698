//! Facility input record
//!
//! [`SystemData`] is everything a scan knows about one treatment train. It is
//! plain data: engines only ever borrow it, so the same record can be scanned
//! concurrently by any number of callers.
//!
//! # Units
//!
//! | Quantity            | Unit     |
//! |---------------------|----------|
//! | Flow                | m³/h     |
//! | Bed volume          | m³       |
//! | Lengths             | m        |
//! | Water chemistry     | mg/L     |
//! | PFAS concentrations | ng/L     |
//! | Media density       | kg/m³ (apparent bed density) |
//! | Costs               | currency units |

use std::collections::BTreeMap;
use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::{PfasError, Result};
use crate::system::compound::PfasCompound;

/// Litres per cubic metre
pub const LITRES_PER_M3: f64 = 1000.0;

/// US gallons per cubic metre
pub const GALLONS_PER_M3: f64 = 264.172;

/// Ordered compound → concentration \[ng/L\] mapping
pub type PfasConcentrations = BTreeMap<PfasCompound, f64>;

/// Treatment technology of the train
///
/// Only GAC has calibrated models; the other variants are accepted so that
/// callers can scan mixed fleets, and their results carry low confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SystemType {
    #[default]
    Gac,
    IonExchange,
    Membrane,
}

/// Raw material of the activated carbon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GacType {
    #[default]
    Bituminous,
    Coconut,
    Lignite,
    Reactivated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselGeometry {
    pub diameter_m: f64,
    pub height_m: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hydraulics {
    pub flow_rate_m3_per_h: f64,
    pub bed_height_m: f64,
    pub bed_volume_m3: f64,
    /// Design empty-bed contact time \[min\]; `0` means "use the actual EBCT"
    pub target_ebct_min: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterChemistry {
    pub toc_mg_l: f64,
    pub sulfate_mg_l: f64,
    pub chloride_mg_l: f64,
    pub alkalinity_mg_l: f64,
    pub hardness_mg_l: f64,
    pub ph: f64,
    pub temperature_c: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GacMedia {
    pub media_type: GacType,
    pub density_kg_m3: f64,
    pub particle_size_mm: f64,
    pub iodine_number: f64,
    pub surface_area_m2_g: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostParameters {
    pub media_cost_per_kg: f64,
    /// Fixed mobilisation cost of one changeout
    pub replacement_cost: f64,
    pub labor_cost_per_changeout: f64,
    pub disposal_cost_per_kg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatingSchedule {
    pub days_per_year: f64,
    pub hours_per_day: f64,
}

/// One treatment train as seen by a compliance scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemData {
    #[serde(default)]
    pub system_type: SystemType,
    pub vessel: VesselGeometry,
    pub hydraulics: Hydraulics,
    pub water: WaterChemistry,
    /// Measured influent concentrations \[ng/L\]
    pub pfas: PfasConcentrations,
    /// Reported total PFAS \[ng/L\], may include unlisted compounds
    pub total_pfas_ng_l: f64,
    pub media: GacMedia,
    pub costs: CostParameters,
    pub schedule: OperatingSchedule,
    pub target_removal_efficiency_pct: f64,
    pub safety_factor: f64,
}

fn require_positive(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PfasError::invalid(format!(
            "{name} must be strictly positive, got {value}"
        )));
    }
    Ok(())
}

fn require_non_negative(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(PfasError::invalid(format!(
            "{name} must be non-negative, got {value}"
        )));
    }
    Ok(())
}

impl SystemData {
    /// Replace one compound concentration (builder style)
    pub fn with_concentration(mut self, compound: PfasCompound, ng_l: f64) -> Self {
        self.pfas.insert(compound, ng_l);
        self
    }

    /// Set the total to the sum of the listed compounds
    pub fn with_total_from_compounds(mut self) -> Self {
        self.total_pfas_ng_l = self.listed_sum_ng_l();
        self
    }

    /// Checks every physical and economic field
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        require_positive("flow rate", self.hydraulics.flow_rate_m3_per_h)?;
        require_positive("bed volume", self.hydraulics.bed_volume_m3)?;
        require_non_negative("bed height", self.hydraulics.bed_height_m)?;
        require_non_negative("target EBCT", self.hydraulics.target_ebct_min)?;
        require_positive("vessel diameter", self.vessel.diameter_m)?;
        require_non_negative("vessel height", self.vessel.height_m)?;

        require_non_negative("TOC", self.water.toc_mg_l)?;
        require_non_negative("sulfate", self.water.sulfate_mg_l)?;
        require_non_negative("chloride", self.water.chloride_mg_l)?;
        require_non_negative("alkalinity", self.water.alkalinity_mg_l)?;
        require_non_negative("hardness", self.water.hardness_mg_l)?;
        if !(0.0..=14.0).contains(&self.water.ph) {
            return Err(PfasError::invalid(format!(
                "pH must be in [0, 14], got {}",
                self.water.ph
            )));
        }
        if !self.water.temperature_c.is_finite() {
            return Err(PfasError::invalid("water temperature must be finite"));
        }

        for (compound, &value) in &self.pfas {
            if !value.is_finite() || value < 0.0 {
                return Err(PfasError::invalid(format!(
                    "concentration of {compound} must be non-negative, got {value}"
                )));
            }
        }
        require_non_negative("total PFAS", self.total_pfas_ng_l)?;
        let listed = self.listed_sum_ng_l();
        let tolerance = (0.05 * listed).max(1.0);
        if self.total_pfas_ng_l + tolerance < listed {
            return Err(PfasError::invalid(format!(
                "total PFAS {} ng/L is below the sum of listed compounds {listed} ng/L",
                self.total_pfas_ng_l
            )));
        }

        require_positive("media density", self.media.density_kg_m3)?;
        require_non_negative("particle size", self.media.particle_size_mm)?;
        require_non_negative("iodine number", self.media.iodine_number)?;
        require_non_negative("surface area", self.media.surface_area_m2_g)?;

        require_non_negative("media cost", self.costs.media_cost_per_kg)?;
        require_non_negative("replacement cost", self.costs.replacement_cost)?;
        require_non_negative("labor cost", self.costs.labor_cost_per_changeout)?;
        require_non_negative("disposal cost", self.costs.disposal_cost_per_kg)?;

        if !(self.schedule.days_per_year > 0.0 && self.schedule.days_per_year <= 366.0) {
            return Err(PfasError::invalid(format!(
                "days per year must be in ]0, 366], got {}",
                self.schedule.days_per_year
            )));
        }
        if !(self.schedule.hours_per_day > 0.0 && self.schedule.hours_per_day <= 24.0) {
            return Err(PfasError::invalid(format!(
                "hours per day must be in ]0, 24], got {}",
                self.schedule.hours_per_day
            )));
        }
        if !(self.target_removal_efficiency_pct > 0.0
            && self.target_removal_efficiency_pct <= 100.0)
        {
            return Err(PfasError::invalid(format!(
                "target removal efficiency must be in ]0, 100], got {}",
                self.target_removal_efficiency_pct
            )));
        }
        require_positive("safety factor", self.safety_factor)?;
        Ok(())
    }

    /// Sum of the listed compound concentrations \[ng/L\]
    pub fn listed_sum_ng_l(&self) -> f64 {
        self.pfas.values().sum()
    }

    /// Influent total used by the models: the larger of reported and listed totals
    pub fn influent_total_ng_l(&self) -> f64 {
        self.total_pfas_ng_l.max(self.listed_sum_ng_l())
    }

    /// Share of the influent total not attributed to a listed compound
    pub fn unlisted_fraction(&self) -> f64 {
        let total = self.influent_total_ng_l();
        if total <= 0.0 {
            0.0
        } else {
            ((total - self.listed_sum_ng_l()) / total).clamp(0.0, 1.0)
        }
    }

    /// Compounds with a strictly positive concentration, canonical order
    pub fn detected_compounds(&self) -> Vec<(PfasCompound, f64)> {
        self.pfas
            .iter()
            .filter(|(_, &c)| c > 0.0)
            .map(|(&compound, &c)| (compound, c))
            .collect()
    }

    /// `true` when no PFAS at all was measured
    pub fn is_pfas_free(&self) -> bool {
        self.influent_total_ng_l() <= 0.0
    }

    /// Carbon inventory of the bed \[kg\]
    pub fn media_mass_kg(&self) -> f64 {
        self.hydraulics.bed_volume_m3 * self.media.density_kg_m3
    }

    /// Water treated per operating day \[L/day\]
    pub fn daily_volume_l(&self) -> f64 {
        self.hydraulics.flow_rate_m3_per_h * self.schedule.hours_per_day * LITRES_PER_M3
    }

    /// Water treated per year \[m³/year\]
    pub fn annual_volume_m3(&self) -> f64 {
        let schedule = &self.schedule;
        self.hydraulics.flow_rate_m3_per_h * schedule.hours_per_day * schedule.days_per_year
    }

    /// Superficial hydraulic loading \[m/h\]
    pub fn hydraulic_loading_m_per_h(&self) -> f64 {
        let area = PI * self.vessel.diameter_m * self.vessel.diameter_m / 4.0;
        self.hydraulics.flow_rate_m3_per_h / area
    }

    /// Converts operating days into calendar months
    pub fn operating_days_to_months(&self, operating_days: f64) -> f64 {
        operating_days / self.schedule.days_per_year * 12.0
    }

    /// Converts calendar months into operating days
    pub fn months_to_operating_days(&self, months: f64) -> f64 {
        months / 12.0 * self.schedule.days_per_year
    }
}

// =================================================================================================
// Test fixture
// =================================================================================================

/// Reference facility used by the unit tests of every engine
///
/// Two 40 m³ beds' worth of bituminous carbon at 200 m³/h (12 min EBCT), low
/// TOC groundwater, PFOA 25 ng/L and PFOS 15 ng/L.
#[cfg(test)]
pub(crate) fn test_system() -> SystemData {
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
