//! Input record and compound catalogue
//!
//! - [`SystemData`]: the validated facility description every engine borrows
//! - [`PfasCompound`]: the tracked compounds with their class and limits

pub mod compound;
pub mod data;

pub use compound::{CompoundClass, PfasCompound};
pub use data::{
    CostParameters, GacMedia, GacType, Hydraulics, OperatingSchedule, PfasConcentrations,
    SystemData, SystemType, VesselGeometry, WaterChemistry, GALLONS_PER_M3, LITRES_PER_M3,
};

#[cfg(test)]
pub(crate) use data::test_system;
