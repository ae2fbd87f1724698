//! Adsorption models
//!
//! Models provide the equations, engines apply them to a facility. Engines
//! never evaluate an exponent or a logistic directly; they go through these
//! traits, so an alternative isotherm or breakthrough curve only has to
//! implement the trait.
//!
//! # Available Models
//!
//! ## [`Freundlich`]: equilibrium capacity
//!
//! Empirical power-law isotherm used by the capacity engine, with parameters
//! per compound class and concentration-weighted blending for mixtures.
//!
//! ## [`ThomasModel`]: fixed-bed breakthrough
//!
//! Logistic breakthrough curve parameterised by the stoichiometric time and
//! the Thomas number, with closed-form milestone inversion used both for
//! curve post-processing and for every Monte Carlo sample.

// =================================================================================================
// Module Declarations
// =================================================================================================

pub mod isotherm;
pub mod thomas;

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use isotherm::{Freundlich, Isotherm};
pub use thomas::{BreakthroughModel, ThomasInputs, ThomasModel};
