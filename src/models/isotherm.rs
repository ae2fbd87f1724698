//! Equilibrium isotherms
//!
//! An isotherm maps the equilibrium liquid concentration `Ce` to the loading
//! of the carbon `q`. That single mapping is all the capacity engine uses.
//!
//! # Freundlich
//!
//! $$q = K_f \cdot C_e^{1/n}$$
//!
//! | Symbol | Unit                      |
//! |--------|---------------------------|
//! | `q`    | µg/g                      |
//! | `Ce`   | µg/L                      |
//! | `Kf`   | (µg/g)(L/µg)^(1/n)        |
//! | `1/n`  | dimensionless, in ]0, 1]  |
//!
//! A mixture is represented by a single [`Freundlich`] whose `Kf` and `1/n`
//! are concentration-weighted averages of the component classes (see
//! [`Freundlich::blend`]).

use crate::config::IsothermParams;

/// Equilibrium loading as a function of liquid concentration
pub trait Isotherm: Send + Sync {
    /// Carbon loading \[µg/g\] at equilibrium concentration `ce_ug_l` \[µg/L\]
    fn loading(&self, ce_ug_l: f64) -> f64;

    fn name(&self) -> &str;
}

/// Freundlich isotherm `q = Kf · Ce^(1/n)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Freundlich {
    kf: f64,
    inv_n: f64,
}

impl Freundlich {
    /// # Panics
    ///
    /// Panics when `kf <= 0` or `inv_n ∉ ]0, 1]`; configurations are validated
    /// before they reach this constructor.
    pub fn new(kf: f64, inv_n: f64) -> Self {
        assert!(kf > 0.0 && kf.is_finite(), "Kf must be positive, got {}", kf);
        assert!(
            inv_n > 0.0 && inv_n <= 1.0,
            "1/n must be in ]0, 1], got {}",
            inv_n
        );
        Self { kf, inv_n }
    }

    pub fn from_params(params: IsothermParams) -> Self {
        Self::new(params.kf, params.inv_n)
    }

    /// Concentration-weighted mixture isotherm
    ///
    /// Returns `None` when the weights sum to zero (nothing to blend).
    ///
    /// ```rust
    /// use pfas_rs::config::IsothermParams;
    /// use pfas_rs::models::Freundlich;
    ///
    /// let strong = IsothermParams { kf: 60.0, inv_n: 0.35 };
    /// let weak = IsothermParams { kf: 8.0, inv_n: 0.55 };
    ///
    /// let mix = Freundlich::blend(&[(strong, 3.0), (weak, 1.0)]).unwrap();
    /// assert!((mix.kf() - 47.0).abs() < 1e-12);
    /// assert!((mix.inv_n() - 0.40).abs() < 1e-12);
    /// ```
    pub fn blend(components: &[(IsothermParams, f64)]) -> Option<Self> {
        let total: f64 = components.iter().map(|(_, w)| w.max(0.0)).sum();
        if total <= 0.0 {
            return None;
        }
        let (kf, inv_n) = components.iter().fold((0.0, 0.0), |(kf, inv_n), (p, w)| {
            let share = w.max(0.0) / total;
            (kf + share * p.kf, inv_n + share * p.inv_n)
        });
        Some(Self::new(kf, inv_n))
    }

    pub fn kf(&self) -> f64 {
        self.kf
    }

    pub fn inv_n(&self) -> f64 {
        self.inv_n
    }
}

impl Isotherm for Freundlich {
    #[inline]
    fn loading(&self, ce_ug_l: f64) -> f64 {
        self.kf * ce_ug_l.max(0.0).powf(self.inv_n)
    }

    fn name(&self) -> &str {
        "Freundlich"
    }
}
