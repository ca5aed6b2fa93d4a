use serde::{Deserialize, Serialize};

/// Integer index of a cell on one refinement level.
///
/// Axes which are not active for the chosen [SpaceDim] always carry the index `0`.
pub type CellIndex = [i64; 3];

/// Spatial dimensionality of the simulation.
///
/// Positions are always stored with three components `(x, y, z)` and momenta are
/// always three-dimensional.
/// The dimensionality decides which position components are physically active.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Hash, Serialize)]
pub enum SpaceDim {
    /// One-dimensional along `z`.
    OneDZ,
    /// Two-dimensional in the `x-z` plane.
    TwoDXZ,
    /// Full three-dimensional cartesian geometry.
    #[default]
    ThreeD,
}

impl SpaceDim {
    /// Number of spatial axes which are resolved by the grid.
    pub fn n_dims(&self) -> usize {
        match self {
            SpaceDim::OneDZ => 1,
            SpaceDim::TwoDXZ => 2,
            SpaceDim::ThreeD => 3,
        }
    }

    /// Which of the `(x, y, z)` components are resolved by the grid and advanced by
    /// position pushers.
    ///
    /// ```
    /// # use amrpic_concepts::SpaceDim;
    /// assert_eq!(SpaceDim::OneDZ.active_axes(), [false, false, true]);
    /// assert_eq!(SpaceDim::TwoDXZ.active_axes(), [true, false, true]);
    /// ```
    pub fn active_axes(&self) -> [bool; 3] {
        match self {
            SpaceDim::OneDZ => [false, false, true],
            SpaceDim::TwoDXZ => [true, false, true],
            SpaceDim::ThreeD => [true, true, true],
        }
    }

    /// Maps a position relative to the unit cell, as produced by a
    /// [UnitBoxSampler](crate::UnitBoxSampler), onto the `(x, y, z)` axes.
    ///
    /// Components which do not belong to an active axis are set to `0`.
    pub fn unit_box_to_axes(&self, unit: [f64; 3]) -> [f64; 3] {
        match self {
            SpaceDim::OneDZ => [0.0, 0.0, unit[0]],
            SpaceDim::TwoDXZ => [unit[0], 0.0, unit[1]],
            SpaceDim::ThreeD => unit,
        }
    }
}

/// Read-only view on the mesh of every refinement level.
///
/// Implementors are owned by the mesh subsystem.
/// The particle core never caches results across calls since the mesh may be regridded
/// in between.
pub trait Geometry: Send + Sync {
    /// Dimensionality of the mesh.
    fn space_dim(&self) -> SpaceDim;

    /// Number of refinement levels. Level `0` is the coarsest.
    fn n_levels(&self) -> usize;

    /// Index of the cell which contains the given position.
    fn cell_index(&self, level: usize, pos: &[f64; 3]) -> CellIndex;

    /// Physical size of a single cell on the given level.
    fn cell_size(&self, level: usize) -> [f64; 3];

    /// Physical position of the lower corner of a cell.
    fn cell_origin(&self, level: usize, cell: &CellIndex) -> [f64; 3];

    /// Lower (inclusive) and upper (exclusive) index bounds of all valid cells on a level.
    fn index_bounds(&self, level: usize) -> (CellIndex, CellIndex);

    /// Index of the tile that owns the given cell.
    fn tile_index(&self, level: usize, cell: &CellIndex) -> usize;

    /// Refinement factor of the level relative to level `0`.
    fn refinement_factor(&self, level: usize) -> [usize; 3];
}

/// Per-cell integer mask marking the fine patch interior and the buffer region.
///
/// A non-zero value means that the cell lies inside the undisturbed fine patch,
/// a value of zero marks a buffer cell near a coarse-fine interface.
pub trait MaskGrid: Sync {
    /// Raw mask value of the given cell.
    fn mask_value(&self, cell: &CellIndex) -> i32;

    /// Determines if particles in this cell are resolved against the fine patch.
    fn is_fine(&self, cell: &CellIndex) -> bool {
        self.mask_value(cell) != 0
    }
}

impl<M> MaskGrid for &M
where
    M: MaskGrid,
{
    fn mask_value(&self, cell: &CellIndex) -> i32 {
        (*self).mask_value(cell)
    }
}
