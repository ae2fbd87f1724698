//! Thomas fixed-bed breakthrough model
//!
//! # Dimensionless form
//!
//! $$\frac{C}{C_0} = \frac{1}{1 + \exp\left(N\left(1 - t/t^*\right)\right)}$$
//!
//! with the stoichiometric time and the Thomas number
//!
//! $$t^* = \frac{q_0 M}{Q C_0} \qquad N = \frac{k_{Th}\, q_0 M}{Q}$$
//!
//! | Symbol | Meaning                        | Unit            |
//! |--------|--------------------------------|-----------------|
//! | `q0`   | adjusted carbon capacity       | µg/g            |
//! | `M`    | carbon mass                    | g               |
//! | `Q`    | water treated per operating day| L/day           |
//! | `C0`   | influent concentration         | µg/L            |
//! | `kTh`  | Thomas rate constant           | L/(µg·day)      |
//! | `t`    | operating time                 | days            |
//!
//! `t*` is the time at which the bed has received exactly its capacity; the
//! curve passes through one half there. `N` sets the sharpness of the front and
//! is clamped to a configured interval, so extreme inputs cannot produce a
//! step function or an almost flat line.
//!
//! Inverting the curve gives every milestone in closed form:
//!
//! $$t_f = t^*\left(1 - \frac{\ln(1/f - 1)}{N}\right)$$

/// Effluent fraction as a function of operating time
pub trait BreakthroughModel: Send + Sync {
    /// `C/C0` after `t_days` operating days, in \[0, 1\]
    fn effluent_fraction(&self, t_days: f64) -> f64;

    /// Operating time at which `C/C0` reaches `fraction` (0 < fraction < 1)
    fn time_at_fraction(&self, fraction: f64) -> f64;

    fn name(&self) -> &str;
}

/// Bed-scale inputs of a Thomas curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThomasInputs {
    /// q0 \[µg/g\]
    pub capacity_ug_g: f64,
    /// M \[kg\]
    pub media_mass_kg: f64,
    /// Q \[L/day\]
    pub daily_volume_l: f64,
    /// C0 \[µg/L\]
    pub influent_ug_l: f64,
    /// kTh \[L/(µg·day)\]
    pub rate_constant: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThomasModel {
    stoichiometric_time_days: f64,
    thomas_number: f64,
    clamped: bool,
}

impl ThomasModel {
    /// # Panics
    ///
    /// Panics unless both parameters are finite and strictly positive.
    pub fn new(stoichiometric_time_days: f64, thomas_number: f64) -> Self {
        assert!(
            stoichiometric_time_days.is_finite() && stoichiometric_time_days > 0.0,
            "Stoichiometric time must be positive, got {}",
            stoichiometric_time_days
        );
        assert!(
            thomas_number.is_finite() && thomas_number > 0.0,
            "Thomas number must be positive, got {}",
            thomas_number
        );
        Self { stoichiometric_time_days, thomas_number, clamped: false }
    }

    /// Builds the curve of one bed, clamping `N` into `[n_min, n_max]`
    ///
    /// # Panics
    ///
    /// Panics when an input is non-positive; callers check capacity and
    /// influent first.
    pub fn from_bed(inputs: ThomasInputs, n_min: f64, n_max: f64) -> Self {
        let ThomasInputs {
            capacity_ug_g,
            media_mass_kg,
            daily_volume_l,
            influent_ug_l,
            rate_constant,
        } = inputs;

        // Bed loading per litre of daily throughput [µg/L]
        let loading = capacity_ug_g * media_mass_kg * 1000.0 / daily_volume_l;
        let t_star = loading / influent_ug_l;
        let raw_n = rate_constant * loading;
        let n = raw_n.clamp(n_min, n_max);

        let mut model = Self::new(t_star, n);
        model.clamped = n != raw_n;
        model
    }

    /// t* \[days\]
    pub fn stoichiometric_time_days(&self) -> f64 {
        self.stoichiometric_time_days
    }

    /// N \[-\]
    pub fn thomas_number(&self) -> f64 {
        self.thomas_number
    }

    /// `true` when the raw Thomas number fell outside the clamp interval
    pub fn is_clamped(&self) -> bool {
        self.clamped
    }
}

impl BreakthroughModel for ThomasModel {
    #[inline]
    fn effluent_fraction(&self, t_days: f64) -> f64 {
        let exponent = self.thomas_number * (1.0 - t_days / self.stoichiometric_time_days);
        1.0 / (1.0 + exponent.exp())
    }

    fn time_at_fraction(&self, fraction: f64) -> f64 {
        let logit = (1.0 / fraction - 1.0).ln();
        self.stoichiometric_time_days * (1.0 - logit / self.thomas_number)
    }

    fn name(&self) -> &str {
        "Thomas"
    }
}
