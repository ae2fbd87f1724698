//! Computational engines of the compliance pipeline
//!
//! Each engine owns its configuration and nothing else. Every operation is a
//! pure function of the borrowed [`SystemData`](crate::system::SystemData) and
//! the configuration, so engines are `Send + Sync` and one instance can serve
//! any number of concurrent scans.
//!
//! | Engine                       | Consumes                         | Produces              |
//! |------------------------------|----------------------------------|-----------------------|
//! | [`CapacityEngine`]           | system                           | `CapacityResult`, `RemovalEfficiency` |
//! | [`BreakthroughEngine`]       | system, adjusted capacity        | `BreakthroughResult`  |
//! | [`RiskEngine`]               | system, life, removal efficiency | `RiskAssessment`      |
//! | [`EconomicAnalysisEngine`]   | system, capacity, breakthrough   | `EconomicAnalysis`    |

pub mod breakthrough;
pub mod capacity;
pub mod economics;
pub mod risk;

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use breakthrough::{BreakthroughEngine, BreakthroughResult, MultiCompoundBreakthrough};
pub use capacity::{CapacityEngine, CapacityResult, RemovalEfficiency};
pub use economics::{EconomicAnalysis, EconomicAnalysisEngine, MonteCarloResult};
pub use risk::{RegulatoryGap, RiskAssessment, RiskEngine, RiskLevel};

// =================================================================================================
// Tests
// =================================================================================================
