//! pfas-rs: PFAS compliance analysis for GAC treatment systems
//!
//! Estimates whether a granular-activated-carbon train keeps PFAS below the
//! regulatory limits over time, and what failing to do so would cost.
//!
//! # Architecture
//!
//! pfas-rs is built on two principles:
//!
//! 1. **Separation of Models and Engines**
//!    - Models define equations (Freundlich isotherm, Thomas curve)
//!    - Engines apply them to a facility and attach confidence and evidence
//!
//! 2. **Pure, Injectable Stages**
//!    - Every engine is an immutable value built from its configuration
//!    - Randomness is an explicit, seedable generator
//!    - The scanner receives its engines instead of reaching for globals
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pfas_rs::prelude::*;
//!
//! # fn main() -> Result<(), PfasError> {
//! let json = std::fs::read_to_string("facility.json").unwrap();
//! let system: SystemData = serde_json::from_str(&json).unwrap();
//!
//! // 1. Build the scanner once
//! let scanner = ComplianceScanner::from_config(&ScannerConfig::default())?;
//!
//! // 2. Run a reproducible scan
//! let options = ScanOptions::default().with_seed(42).with_multi_compound();
//! let report = scanner.analyze_pfas_compliance(&system, &options)?;
//!
//! // 3. Read the results
//! println!("risk: {:?}", report.risk.risk_level);
//! println!("life: {:.1} months", report.summary.predicted_system_life_months);
//! println!("P95 life: {:.1} months", report.economics.safe_lifespan_months);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`system`]: Input record and compound catalogue
//! - [`models`]: Isotherm and breakthrough equations
//! - [`engines`]: Capacity, breakthrough, risk and economic engines
//! - [`scanner`]: Orchestrator and report
//! - [`config`]: Engine configuration, TOML loadable
//! - [`error`]: Error taxonomy
//!
//! # Features
//!
//! - `parallel`: evaluate Monte Carlo samples with Rayon above
//!   `economics.parallel_threshold` samples (2048 by default)

// Core modules
pub mod config;
pub mod error;
pub mod system;

pub mod engines;
pub mod models;
pub mod scanner;

pub mod prelude {
    //! Convenient imports for common usage
    //!
    //! ```rust
    //! use pfas_rs::prelude::*;
    //! ```
    pub use crate::config::ScannerConfig;
    pub use crate::engines::{
        BreakthroughEngine, BreakthroughResult, CapacityEngine, CapacityResult,
        EconomicAnalysis, EconomicAnalysisEngine, MonteCarloResult, RegulatoryGap,
        RemovalEfficiency, RiskAssessment, RiskEngine, RiskLevel,
    };
    pub use crate::error::PfasError;
    pub use crate::scanner::{
        ComplianceReport, ComplianceScanner, QuickAnalysis, ScanOptions, UrgencyLevel,
    };
    pub use crate::system::{PfasCompound, SystemData};
}
