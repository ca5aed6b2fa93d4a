use amrpic_concepts::{SetupError, SpaceDim, UnitBoxSampler};
use serde::{Deserialize, Serialize};

/// Uniformly distributed random position inside the unit cell.
///
/// Every component is drawn independently from $[0, 1)$.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct RandomPosition;

impl UnitBoxSampler for RandomPosition {
    fn position_unit_box<R>(&self, _i_part: usize, _ref_fac: [usize; 3], rng: &mut R) -> [f64; 3]
    where
        R: rand::Rng + ?Sized,
    {
        let a = rng.gen::<f64>();
        let b = rng.gen::<f64>();
        let c = rng.gen::<f64>();
        [a, b, c]
    }
}

/// Random position on a plane inside the unit cell.
///
/// One axis, specified by `dir`, is pinned to `0` while the remaining active axes are
/// drawn uniformly.
/// This is used to seed injection surfaces such as a laser antenna.
///
/// | `dir` | 3D | 2D (x-z) | 1D (z) |
/// | --- | --- | --- | --- |
/// | 0 | $(0, r, r)$ | $(0, r, 0)$ | $(r, 0, 0)$ |
/// | 1 | $(r, 0, r)$ | $(r, r, 0)$ | $(r, 0, 0)$ |
/// | 2 | $(r, r, 0)$ | $(r, 0, 0)$ | $(0, 0, 0)$ |
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct RandomPlanePosition {
    dir: usize,
    dim: SpaceDim,
}

impl RandomPlanePosition {
    /// Constructs a new [RandomPlanePosition] which is pinned along the `dir` axis.
    ///
    /// ```
    /// # use amrpic_building_blocks::RandomPlanePosition;
    /// # use amrpic_concepts::SpaceDim;
    /// assert!(RandomPlanePosition::new(2, SpaceDim::ThreeD).is_ok());
    /// assert!(RandomPlanePosition::new(3, SpaceDim::ThreeD).is_err());
    /// ```
    pub fn new(dir: usize, dim: SpaceDim) -> Result<Self, SetupError> {
        if dir > 2 {
            return Err(SetupError(format!(
                "Direction of injection plane must be one of 0, 1, 2 but got {dir}"
            )));
        }
        Ok(Self { dir, dim })
    }

    /// Axis which is pinned to `0`.
    pub fn dir(&self) -> usize {
        self.dir
    }
}

impl UnitBoxSampler for RandomPlanePosition {
    fn position_unit_box<R>(&self, _i_part: usize, _ref_fac: [usize; 3], rng: &mut R) -> [f64; 3]
    where
        R: rand::Rng + ?Sized,
    {
        let mut r = || rng.gen::<f64>();
        match (self.dim, self.dir) {
            (SpaceDim::ThreeD, 0) => [0.0, r(), r()],
            (SpaceDim::ThreeD, 1) => {
                let a = r();
                [a, 0.0, r()]
            }
            (SpaceDim::ThreeD, _) => {
                let a = r();
                [a, r(), 0.0]
            }
            (SpaceDim::TwoDXZ, 0) => [0.0, r(), 0.0],
            (SpaceDim::TwoDXZ, 1) => {
                let a = r();
                [a, r(), 0.0]
            }
            (SpaceDim::TwoDXZ, _) => [r(), 0.0, 0.0],
            (SpaceDim::OneDZ, 0) | (SpaceDim::OneDZ, 1) => [r(), 0.0, 0.0],
            (SpaceDim::OneDZ, _) => [0.0, 0.0, 0.0],
        }
    }
}

/// Particles placed on a regular sub-grid of the unit cell.
///
/// The cell is divided into `nx * ny * nz` sub-cells where `n = ppc * ref_fac` along every
/// active axis.
/// Each particle sits in the center of its sub-cell.
/// The particle number is decoded as
/// \\begin{align}
///     i_x &= i / (n_y n_z)\\\\
///     i_z &= (i - i_x n_y n_z) / n_y\\\\
///     i_y &= i - i_x n_y n_z - i_z n_y
/// \\end{align}
/// This ordering is kept fixed for reproducibility across restarts.
///
/// ```
/// # use amrpic_building_blocks::RegularPosition;
/// # use amrpic_concepts::{SpaceDim, UnitBoxSampler};
/// # use rand::SeedableRng;
/// let sampler = RegularPosition::new([2, 1, 1], SpaceDim::ThreeD)?;
/// let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(0);
/// assert_eq!(sampler.position_unit_box(0, [1; 3], &mut rng), [0.25, 0.5, 0.5]);
/// assert_eq!(sampler.position_unit_box(1, [1; 3], &mut rng), [0.75, 0.5, 0.5]);
/// # Ok::<(), amrpic_concepts::SetupError>(())
/// ```
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct RegularPosition {
    ppc: [usize; 3],
    dim: SpaceDim,
}

impl RegularPosition {
    /// Construct a new [RegularPosition] sampler from the number of particles per cell
    /// along each component of the unit box.
    pub fn new(ppc: [usize; 3], dim: SpaceDim) -> Result<Self, SetupError> {
        if ppc.iter().any(|n| *n == 0) {
            return Err(SetupError(format!(
                "Particles per cell must be positive along every axis but got {ppc:?}"
            )));
        }
        Ok(Self { ppc, dim })
    }

    /// Number of particles per cell along each component of the unit box.
    pub fn ppc(&self) -> [usize; 3] {
        self.ppc
    }

    /// Number of sub-cells along each component of the unit box for the given refinement.
    pub fn n_sub_cells(&self, ref_fac: [usize; 3]) -> [usize; 3] {
        let nx = ref_fac[0] * self.ppc[0];
        match self.dim {
            SpaceDim::ThreeD => [nx, ref_fac[1] * self.ppc[1], ref_fac[2] * self.ppc[2]],
            SpaceDim::TwoDXZ => [nx, ref_fac[1] * self.ppc[1], 1],
            SpaceDim::OneDZ => [nx, 1, 1],
        }
    }
}

impl UnitBoxSampler for RegularPosition {
    fn position_unit_box<R>(&self, i_part: usize, ref_fac: [usize; 3], _rng: &mut R) -> [f64; 3]
    where
        R: rand::Rng + ?Sized,
    {
        debug_assert!(ref_fac.iter().all(|r| *r > 0));
        let [nx, ny, nz] = self.n_sub_cells(ref_fac);
        let ix = i_part / (ny * nz);
        let iz = (i_part - ix * (ny * nz)) / ny;
        let iy = (i_part - ix * (ny * nz)) - ny * iz;
        [
            (0.5 + ix as f64) / nx as f64,
            (0.5 + iy as f64) / ny as f64,
            (0.5 + iz as f64) / nz as f64,
        ]
    }
}

/// Selects one of the position sampling policies at construction time.
///
/// Dispatching happens through a single `match` instead of dynamic dispatch such that
/// the sampler can be copied freely into parallel loops.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub enum PositionSampler {
    /// See [RandomPosition]
    Random(RandomPosition),
    /// See [RandomPlanePosition]
    RandomPlane(RandomPlanePosition),
    /// See [RegularPosition]
    Regular(RegularPosition),
}

impl PositionSampler {
    /// Shorthand for [PositionSampler::Random].
    pub fn random() -> Self {
        PositionSampler::Random(RandomPosition)
    }

    /// Shorthand for [RandomPlanePosition::new].
    pub fn random_plane(dir: usize, dim: SpaceDim) -> Result<Self, SetupError> {
        Ok(PositionSampler::RandomPlane(RandomPlanePosition::new(
            dir, dim,
        )?))
    }

    /// Shorthand for [RegularPosition::new].
    pub fn regular(ppc: [usize; 3], dim: SpaceDim) -> Result<Self, SetupError> {
        Ok(PositionSampler::Regular(RegularPosition::new(ppc, dim)?))
    }

    /// Returns true if the sampler does not consume random numbers.
    pub fn is_deterministic(&self) -> bool {
        matches!(self, PositionSampler::Regular(_))
    }
}

impl UnitBoxSampler for PositionSampler {
    fn position_unit_box<R>(&self, i_part: usize, ref_fac: [usize; 3], rng: &mut R) -> [f64; 3]
    where
        R: rand::Rng + ?Sized,
    {
        match self {
            PositionSampler::Random(s) => s.position_unit_box(i_part, ref_fac, rng),
            PositionSampler::RandomPlane(s) => s.position_unit_box(i_part, ref_fac, rng),
            PositionSampler::Regular(s) => s.position_unit_box(i_part, ref_fac, rng),
        }
    }
}
