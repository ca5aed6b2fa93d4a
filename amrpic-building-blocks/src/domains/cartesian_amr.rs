use amrpic_concepts::*;

use nalgebra::Vector3;
use num::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Iterates over all cells of the box $[lo, hi)$ with the `x` index varying slowest.
///
/// ```
/// # use amrpic_building_blocks::iter_cells;
/// let cells: Vec<_> = iter_cells([0, 0, 0], [2, 1, 2]).collect();
/// assert_eq!(cells, vec![[0, 0, 0], [0, 0, 1], [1, 0, 0], [1, 0, 1]]);
/// ```
pub fn iter_cells(lo: CellIndex, hi: CellIndex) -> impl Iterator<Item = CellIndex> {
    use itertools::*;
    (0..3)
        .map(move |i| lo[i]..hi[i])
        .multi_cartesian_product()
        .map(|x| [x[0], x[1], x[2]])
}

/// Cartesian mesh hierarchy with a fixed refinement ratio between consecutive levels.
///
/// Every level spans the complete domain $[\vec{x}_\text{min}, \vec{x}_\text{max})$.
/// Which part of a fine level is resolved by an actual fine patch is communicated
/// through [MaskGrid]s.
/// Each level is split into tiles of `tile_size` cells which own the particles inside them.
///
/// Axes which are not active for the chosen [SpaceDim] consist of a single cell which
/// spans the whole extent of the domain.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct CartesianAmrGeometry {
    dim: SpaceDim,
    min: Vector3<f64>,
    max: Vector3<f64>,
    dx: Vector3<f64>,
    n_cells: [usize; 3],
    n_levels: usize,
    ref_ratio: usize,
    tile_size: [usize; 3],
}

impl CartesianAmrGeometry {
    fn check_min_max(min: &[f64; 3], max: &[f64; 3]) -> Result<(), BoundaryError> {
        for i in 0..3 {
            if !(min[i] < max[i]) {
                return Err(BoundaryError(format!(
                    "Min {:?} must be smaller than Max {:?} for domain boundaries!",
                    min, max
                )));
            }
        }
        Ok(())
    }

    /// Builds a single-level geometry from given boundaries and the number of cells per
    /// dimension.
    ///
    /// ```
    /// # use amrpic_building_blocks::CartesianAmrGeometry;
    /// # use amrpic_concepts::{Geometry, SpaceDim};
    /// let geometry = CartesianAmrGeometry::from_boundaries_and_n_cells(
    ///     SpaceDim::TwoDXZ,
    ///     [0.0, 0.0, 0.0],
    ///     [4.0, 1.0, 2.0],
    ///     [8, 3, 4],
    /// )?;
    /// assert_eq!(geometry.cell_size(0), [0.5, 1.0, 0.5]);
    /// assert_eq!(geometry.cell_index(0, &[1.1, 0.7, 1.9]), [2, 0, 3]);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_boundaries_and_n_cells(
        dim: SpaceDim,
        min: impl Into<[f64; 3]>,
        max: impl Into<[f64; 3]>,
        n_cells: impl Into<[usize; 3]>,
    ) -> Result<Self, BoundaryError> {
        let min: [f64; 3] = min.into();
        let max: [f64; 3] = max.into();
        let mut n_cells: [usize; 3] = n_cells.into();
        Self::check_min_max(&min, &max)?;
        let active = dim.active_axes();
        let mut dx = [0.0; 3];
        for i in 0..3 {
            if !active[i] {
                n_cells[i] = 1;
            }
            if n_cells[i] == 0 {
                return Err(BoundaryError(format!(
                    "Number of cells must be positive along every active axis but got {:?}",
                    n_cells
                )));
            }
            dx[i] = (max[i] - min[i]) / n_cells[i] as f64;
        }
        Ok(Self {
            dim,
            min: min.into(),
            max: max.into(),
            dx: dx.into(),
            n_cells,
            n_levels: 1,
            ref_ratio: 2,
            tile_size: n_cells,
        })
    }

    /// Builds a single-level geometry from given boundaries and a desired cell size.
    ///
    /// The cell size is adjusted such that an integer number of cells fits into the domain.
    pub fn from_boundaries_and_cell_size(
        dim: SpaceDim,
        min: impl Into<[f64; 3]>,
        max: impl Into<[f64; 3]>,
        cell_size: f64,
    ) -> Result<Self, BoundaryError> {
        let min: [f64; 3] = min.into();
        let max: [f64; 3] = max.into();
        Self::check_min_max(&min, &max)?;
        let mut n_cells = [1; 3];
        for i in 0..3 {
            let n = ((max[i] - min[i]) / cell_size).floor().max(1.0);
            n_cells[i] = n.to_usize().ok_or(BoundaryError(
                amrpic_concepts::format_error_message!(
                    "conversion error during domain setup",
                    format!("Cannot convert float {:?} to usize", n)
                ),
            ))?;
        }
        Self::from_boundaries_and_n_cells(dim, min, max, n_cells)
    }

    /// Adds `n_levels - 1` refined levels, each refined by `ref_ratio` relative to the
    /// previous one.
    pub fn with_refinement(
        mut self,
        n_levels: usize,
        ref_ratio: usize,
    ) -> Result<Self, SetupError> {
        if n_levels == 0 || ref_ratio == 0 {
            return Err(SetupError(format!(
                "Need at least one level and a positive refinement ratio but got \
                n_levels={n_levels} ref_ratio={ref_ratio}"
            )));
        }
        self.n_levels = n_levels;
        self.ref_ratio = ref_ratio;
        Ok(self)
    }

    /// Splits every level into tiles of `tile_size` cells.
    pub fn with_tile_size(mut self, tile_size: [usize; 3]) -> Result<Self, SetupError> {
        if tile_size.iter().any(|t| *t == 0) {
            return Err(SetupError(format!(
                "Tile size must be positive but got {tile_size:?}"
            )));
        }
        let active = self.dim.active_axes();
        for i in 0..3 {
            self.tile_size[i] = if active[i] { tile_size[i] } else { 1 };
        }
        Ok(self)
    }

    /// Get the minimum point which defines the simulation domain
    pub fn get_min(&self) -> [f64; 3] {
        self.min.into()
    }

    /// Get the maximum point which defines the simulation domain
    pub fn get_max(&self) -> [f64; 3] {
        self.max.into()
    }

    /// Number of cells of the given level along each axis.
    pub fn n_cells(&self, level: usize) -> [usize; 3] {
        let r = self.refinement_factor(level);
        [
            self.n_cells[0] * r[0],
            self.n_cells[1] * r[1],
            self.n_cells[2] * r[2],
        ]
    }

    /// Number of tiles of the given level along each axis.
    pub fn n_tiles(&self, level: usize) -> [usize; 3] {
        let n = self.n_cells(level);
        [
            n[0].div_ceil(self.tile_size[0]),
            n[1].div_ceil(self.tile_size[1]),
            n[2].div_ceil(self.tile_size[2]),
        ]
    }
}

impl Geometry for CartesianAmrGeometry {
    fn space_dim(&self) -> SpaceDim {
        self.dim
    }

    fn n_levels(&self) -> usize {
        self.n_levels
    }

    fn cell_index(&self, level: usize, pos: &[f64; 3]) -> CellIndex {
        let active = self.dim.active_axes();
        let size = self.cell_size(level);
        let mut index = [0; 3];
        for i in 0..3 {
            if active[i] {
                index[i] = ((pos[i] - self.min[i]) / size[i]).floor() as i64;
            }
        }
        index
    }

    fn cell_size(&self, level: usize) -> [f64; 3] {
        let r = self.refinement_factor(level);
        [
            self.dx[0] / r[0] as f64,
            self.dx[1] / r[1] as f64,
            self.dx[2] / r[2] as f64,
        ]
    }

    fn cell_origin(&self, level: usize, cell: &CellIndex) -> [f64; 3] {
        let size = self.cell_size(level);
        [
            self.min[0] + cell[0] as f64 * size[0],
            self.min[1] + cell[1] as f64 * size[1],
            self.min[2] + cell[2] as f64 * size[2],
        ]
    }

    fn index_bounds(&self, level: usize) -> (CellIndex, CellIndex) {
        let n = self.n_cells(level);
        ([0; 3], [n[0] as i64, n[1] as i64, n[2] as i64])
    }

    fn tile_index(&self, level: usize, cell: &CellIndex) -> usize {
        let n_tiles = self.n_tiles(level);
        let mut t = [0usize; 3];
        for i in 0..3 {
            // Particles slightly outside of the domain belong to the boundary tiles
            let ti = cell[i].div_euclid(self.tile_size[i] as i64);
            t[i] = ti.clamp(0, n_tiles[i] as i64 - 1) as usize;
        }
        t[0] + n_tiles[0] * (t[1] + n_tiles[1] * t[2])
    }

    fn refinement_factor(&self, level: usize) -> [usize; 3] {
        let active = self.dim.active_axes();
        let r = self.ref_ratio.pow(level as u32);
        [
            if active[0] { r } else { 1 },
            if active[1] { r } else { 1 },
            if active[2] { r } else { 1 },
        ]
    }
}
