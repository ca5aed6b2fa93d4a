use serde::{Deserialize, Serialize};

/// Treatment of particles which leave the domain along one axis.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub enum ParticleBoundary {
    /// Particles outside of $[lo, hi)$ are removed.
    #[default]
    Absorbing,
    /// Particles are mirrored at the boundary and their momentum is flipped.
    Reflecting,
    /// Particles re-enter the domain on the opposite side.
    Periodic,
}

/// What happened to a particle when a [ParticleBoundary] was applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryOutcome {
    /// The particle was inside and has not been modified.
    Inside,
    /// The position was wrapped around.
    Wrapped,
    /// The position was mirrored. The momentum component along this axis must be flipped.
    Reflected,
    /// The particle has to be removed.
    Absorbed,
}

impl ParticleBoundary {
    /// Applies the boundary to a single position component.
    ///
    /// ```
    /// # use amrpic_core::{BoundaryOutcome, ParticleBoundary};
    /// let mut x = 1.25;
    /// let outcome = ParticleBoundary::Periodic.apply(&mut x, 0.0, 1.0);
    /// assert_eq!(outcome, BoundaryOutcome::Wrapped);
    /// assert_eq!(x, 0.25);
    /// ```
    pub fn apply(&self, x: &mut f64, lo: f64, hi: f64) -> BoundaryOutcome {
        match self {
            ParticleBoundary::Absorbing => {
                if *x >= lo && *x < hi {
                    BoundaryOutcome::Inside
                } else {
                    BoundaryOutcome::Absorbed
                }
            }
            ParticleBoundary::Reflecting => {
                if *x < lo {
                    *x = 2.0 * lo - *x;
                    BoundaryOutcome::Reflected
                } else if *x > hi {
                    *x = 2.0 * hi - *x;
                    BoundaryOutcome::Reflected
                } else {
                    BoundaryOutcome::Inside
                }
            }
            ParticleBoundary::Periodic => {
                if *x >= lo && *x < hi {
                    BoundaryOutcome::Inside
                } else {
                    *x = lo + (*x - lo).rem_euclid(hi - lo);
                    // Rounding of tiny negative offsets can land on the upper bound
                    if *x >= hi {
                        *x = lo;
                    }
                    BoundaryOutcome::Wrapped
                }
            }
        }
    }
}
