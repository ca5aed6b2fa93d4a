use amrpic_concepts::{SetupError, SpaceDim, UnitBoxSampler};
use serde::{Deserialize, Serialize};

use super::position::PositionSampler;

/// Axis-aligned box $[x_\text{min}, x_\text{max}) \times [y_\text{min}, y_\text{max})
/// \times [z_\text{min}, z_\text{max})$ in which an injector is active.
///
/// Bounds may be infinite, which is how inactive axes of lower-dimensional simulations
/// are usually specified.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct BoundingRegion {
    lo: [f64; 3],
    hi: [f64; 3],
}

impl BoundingRegion {
    /// Constructs a new region and checks that `lo < hi` along every axis.
    ///
    /// ```
    /// # use amrpic_building_blocks::BoundingRegion;
    /// assert!(BoundingRegion::new([0.0; 3], [1.0; 3]).is_ok());
    /// assert!(BoundingRegion::new([0.0; 3], [1.0, 0.0, 1.0]).is_err());
    /// ```
    pub fn new(lo: [f64; 3], hi: [f64; 3]) -> Result<Self, SetupError> {
        for i in 0..3 {
            // Also rejects NaN bounds
            if !(lo[i] < hi[i]) {
                return Err(SetupError(format!(
                    "Lower bound {lo:?} must be smaller than upper bound {hi:?} along every axis"
                )));
            }
        }
        Ok(Self { lo, hi })
    }

    /// A region which covers all of space.
    pub fn unbounded() -> Self {
        Self {
            lo: [f64::NEG_INFINITY; 3],
            hi: [f64::INFINITY; 3],
        }
    }

    /// Lower corner of the region
    pub fn lo(&self) -> [f64; 3] {
        self.lo
    }

    /// Upper corner of the region
    pub fn hi(&self) -> [f64; 3] {
        self.hi
    }

    /// Point lies inside the region or on its lower boundary.
    pub fn inside_bounds(&self, x: f64, y: f64, z: f64) -> bool {
        x < self.hi[0]
            && x >= self.lo[0]
            && y < self.hi[1]
            && y >= self.lo[1]
            && z < self.hi[2]
            && z >= self.lo[2]
    }

    /// Point lies inside the region or on its lower or upper boundary.
    pub fn inside_bounds_inclusive(&self, x: f64, y: f64, z: f64) -> bool {
        x <= self.hi[0]
            && x >= self.lo[0]
            && y <= self.hi[1]
            && y >= self.lo[1]
            && z <= self.hi[2]
            && z >= self.lo[2]
    }

    /// The box `[lo, hi]` overlaps with this region unless they are disjoint along some axis.
    pub fn overlaps_with(&self, lo: [f64; 3], hi: [f64; 3]) -> bool {
        !((0..3).any(|i| self.lo[i] > hi[i] || self.hi[i] < lo[i]))
    }
}

/// Combines a [PositionSampler] with the [BoundingRegion] in which it seeds particles.
///
/// Immutable after construction.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct InjectorPosition {
    sampler: PositionSampler,
    region: BoundingRegion,
    dim: SpaceDim,
}

impl InjectorPosition {
    /// Construct a new injector.
    pub fn new(sampler: PositionSampler, region: BoundingRegion, dim: SpaceDim) -> Self {
        Self {
            sampler,
            region,
            dim,
        }
    }

    /// Uniformly random positions inside `[lo, hi)`.
    pub fn random(lo: [f64; 3], hi: [f64; 3], dim: SpaceDim) -> Result<Self, SetupError> {
        Ok(Self::new(
            PositionSampler::random(),
            BoundingRegion::new(lo, hi)?,
            dim,
        ))
    }

    /// Random positions on the plane normal to `dir` inside `[lo, hi)`.
    pub fn random_plane(
        lo: [f64; 3],
        hi: [f64; 3],
        dir: usize,
        dim: SpaceDim,
    ) -> Result<Self, SetupError> {
        Ok(Self::new(
            PositionSampler::random_plane(dir, dim)?,
            BoundingRegion::new(lo, hi)?,
            dim,
        ))
    }

    /// Regularly spaced positions inside `[lo, hi)` with `ppc` particles per cell.
    pub fn regular(
        lo: [f64; 3],
        hi: [f64; 3],
        ppc: [usize; 3],
        dim: SpaceDim,
    ) -> Result<Self, SetupError> {
        Ok(Self::new(
            PositionSampler::regular(ppc, dim)?,
            BoundingRegion::new(lo, hi)?,
            dim,
        ))
    }

    /// The sampler used to place particles inside a cell.
    pub fn sampler(&self) -> &PositionSampler {
        &self.sampler
    }

    /// The region in which particles are injected.
    pub fn region(&self) -> &BoundingRegion {
        &self.region
    }

    /// Dimensionality this injector was built for.
    pub fn space_dim(&self) -> SpaceDim {
        self.dim
    }

    /// See [BoundingRegion::inside_bounds].
    pub fn inside_bounds(&self, x: f64, y: f64, z: f64) -> bool {
        self.region.inside_bounds(x, y, z)
    }

    /// See [BoundingRegion::inside_bounds_inclusive].
    pub fn inside_bounds_inclusive(&self, x: f64, y: f64, z: f64) -> bool {
        self.region.inside_bounds_inclusive(x, y, z)
    }

    /// See [BoundingRegion::overlaps_with].
    pub fn overlaps_with(&self, lo: [f64; 3], hi: [f64; 3]) -> bool {
        self.region.overlaps_with(lo, hi)
    }

    /// Natural number of particles per cell for this injector.
    ///
    /// For regular sampling this is the number of sub-cells, otherwise `None` is returned
    /// since the count has to be chosen by the caller.
    pub fn particles_per_cell(&self, ref_fac: [usize; 3]) -> Option<usize> {
        match &self.sampler {
            PositionSampler::Regular(r) => Some(r.n_sub_cells(ref_fac).iter().product()),
            _ => None,
        }
    }
}

impl UnitBoxSampler for InjectorPosition {
    fn position_unit_box<R>(&self, i_part: usize, ref_fac: [usize; 3], rng: &mut R) -> [f64; 3]
    where
        R: rand::Rng + ?Sized,
    {
        self.sampler.position_unit_box(i_part, ref_fac, rng)
    }
}
