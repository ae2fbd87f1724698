//! PFAS compound catalogue and regulatory reference values
//!
//! # Regulatory table
//!
//! | Compound | Class                   | MCL \[ng/L\] | Hazard-index reference \[ng/L\] |
//! |----------|-------------------------|--------------|---------------------------------|
//! | PFOA     | long-chain carboxylate  | 4            | -                               |
//! | PFOS     | long-chain sulfonate    | 4            | -                               |
//! | PFNA     | long-chain carboxylate  | 10           | 10                              |
//! | PFHxS    | long-chain sulfonate    | 10           | 10                              |
//! | PFBS     | short-chain             | 2000 (HBWC)  | 2000                            |
//! | others   | -                       | -            | -                               |
//!
//! Values follow the 2024 National Primary Drinking Water Regulation. PFBS has
//! no standalone MCL; its health-based water concentration is used as the limit.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PfasError;

/// Isotherm family of a compound
///
/// GAC affinity grows with perfluorinated chain length and is higher for
/// sulfonates than for carboxylates of the same length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompoundClass {
    LongChainSulfonate,
    LongChainCarboxylate,
    ShortChain,
}

/// The ten PFAS compounds tracked by a scan
///
/// Declaration order is the canonical report order (`Ord` is derived).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PfasCompound {
    #[serde(rename = "PFOA")]
    Pfoa,
    #[serde(rename = "PFOS")]
    Pfos,
    #[serde(rename = "PFNA")]
    Pfna,
    #[serde(rename = "PFHxA")]
    Pfhxa,
    #[serde(rename = "PFHxS")]
    Pfhxs,
    #[serde(rename = "PFDA")]
    Pfda,
    #[serde(rename = "PFBS")]
    Pfbs,
    #[serde(rename = "PFHpA")]
    Pfhpa,
    #[serde(rename = "PFUnDA")]
    Pfunda,
    #[serde(rename = "PFDoA")]
    Pfdoa,
}

impl PfasCompound {
    /// Every tracked compound in canonical order
    pub const ALL: [PfasCompound; 10] = [
        PfasCompound::Pfoa,
        PfasCompound::Pfos,
        PfasCompound::Pfna,
        PfasCompound::Pfhxa,
        PfasCompound::Pfhxs,
        PfasCompound::Pfda,
        PfasCompound::Pfbs,
        PfasCompound::Pfhpa,
        PfasCompound::Pfunda,
        PfasCompound::Pfdoa,
    ];

    /// Conventional abbreviation, e.g. `"PFHxS"`
    pub fn name(&self) -> &'static str {
        match self {
            PfasCompound::Pfoa => "PFOA",
            PfasCompound::Pfos => "PFOS",
            PfasCompound::Pfna => "PFNA",
            PfasCompound::Pfhxa => "PFHxA",
            PfasCompound::Pfhxs => "PFHxS",
            PfasCompound::Pfda => "PFDA",
            PfasCompound::Pfbs => "PFBS",
            PfasCompound::Pfhpa => "PFHpA",
            PfasCompound::Pfunda => "PFUnDA",
            PfasCompound::Pfdoa => "PFDoA",
        }
    }

    pub fn class(&self) -> CompoundClass {
        match self {
            PfasCompound::Pfos | PfasCompound::Pfhxs => CompoundClass::LongChainSulfonate,
            PfasCompound::Pfoa
            | PfasCompound::Pfna
            | PfasCompound::Pfda
            | PfasCompound::Pfunda
            | PfasCompound::Pfdoa => CompoundClass::LongChainCarboxylate,
            PfasCompound::Pfhxa | PfasCompound::Pfhpa | PfasCompound::Pfbs => {
                CompoundClass::ShortChain
            }
        }
    }

    /// Enforceable limit in ng/L, `None` for unregulated compounds
    pub fn regulatory_limit_ng_l(&self) -> Option<f64> {
        match self {
            PfasCompound::Pfoa | PfasCompound::Pfos => Some(4.0),
            PfasCompound::Pfna | PfasCompound::Pfhxs => Some(10.0),
            PfasCompound::Pfbs => Some(2000.0),
            _ => None,
        }
    }

    /// Health-based reference used in the mixture hazard index
    pub fn hazard_index_reference_ng_l(&self) -> Option<f64> {
        match self {
            PfasCompound::Pfna | PfasCompound::Pfhxs => Some(10.0),
            PfasCompound::Pfbs => Some(2000.0),
            _ => None,
        }
    }
}

impl fmt::Display for PfasCompound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PfasCompound {
    type Err = PfasError;

    /// Case-insensitive lookup by abbreviation
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        PfasCompound::ALL
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| PfasError::invalid(format!("unknown PFAS compound '{s}'")))
    }
}
