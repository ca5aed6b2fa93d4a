use amrpic_concepts::{CellIndex, MaskGrid, SetupError, SpaceDim};
use ndarray::Array3;
use serde::{Deserialize, Serialize};

use super::iter_cells;

/// Dense integer mask over a box of cells on one refinement level.
///
/// Cells outside of the stored box read as `0` which marks them as buffer cells.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct MaskArray {
    lo: CellIndex,
    values: Array3<i32>,
}

impl MaskArray {
    /// Mask covering the cells $[lo, hi)$ with every entry set to `value`.
    pub fn filled(lo: CellIndex, hi: CellIndex, value: i32) -> Result<Self, SetupError> {
        let shape = Self::shape(&lo, &hi)?;
        Ok(Self {
            lo,
            values: Array3::from_elem(shape, value),
        })
    }

    /// Mask covering the cells $[lo, hi)$ whose values are given by `f`.
    pub fn from_fn<F>(lo: CellIndex, hi: CellIndex, f: F) -> Result<Self, SetupError>
    where
        F: Fn(&CellIndex) -> i32,
    {
        let shape = Self::shape(&lo, &hi)?;
        let values = Array3::from_shape_fn(shape, |(i, j, k)| {
            f(&[lo[0] + i as i64, lo[1] + j as i64, lo[2] + k as i64])
        });
        Ok(Self { lo, values })
    }

    /// Mask of a fine patch spanning the cells $[lo, hi)$.
    ///
    /// Cells within `buffer_width` cells of a face of the patch along an active axis
    /// are buffer cells (`0`), all others are fine cells (`1`).
    /// A `buffer_width` of `0` thus marks the whole patch as fine.
    ///
    /// ```
    /// # use amrpic_building_blocks::MaskArray;
    /// # use amrpic_concepts::{MaskGrid, SpaceDim};
    /// let mask = MaskArray::from_fine_patch([0, 0, 0], [6, 1, 6], 2, SpaceDim::TwoDXZ)?;
    /// assert!(mask.is_fine(&[2, 0, 3]));
    /// assert!(!mask.is_fine(&[1, 0, 3]));
    /// assert!(!mask.is_fine(&[3, 0, 4]));
    /// // Outside of the patch
    /// assert!(!mask.is_fine(&[7, 0, 3]));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_fine_patch(
        lo: CellIndex,
        hi: CellIndex,
        buffer_width: usize,
        dim: SpaceDim,
    ) -> Result<Self, SetupError> {
        let active = dim.active_axes();
        let w = buffer_width as i64;
        Self::from_fn(lo, hi, |cell| {
            let in_buffer = (0..3)
                .any(|i| active[i] && (cell[i] - lo[i] < w || hi[i] - 1 - cell[i] < w));
            if in_buffer {
                0
            } else {
                1
            }
        })
    }

    /// Overwrites the value of a single cell inside the mask box.
    pub fn set(&mut self, cell: &CellIndex, value: i32) -> Result<(), SetupError> {
        let index = self.local_index(cell).ok_or(SetupError(format!(
            "Cell {cell:?} lies outside of mask starting at {:?} with shape {:?}",
            self.lo,
            self.values.shape()
        )))?;
        self.values[index] = value;
        Ok(())
    }

    /// Lower corner of the mask box.
    pub fn lo(&self) -> CellIndex {
        self.lo
    }

    /// Upper (exclusive) corner of the mask box.
    pub fn hi(&self) -> CellIndex {
        let (nx, ny, nz) = self.values.dim();
        [
            self.lo[0] + nx as i64,
            self.lo[1] + ny as i64,
            self.lo[2] + nz as i64,
        ]
    }

    /// Number of cells which are marked as fine.
    pub fn count_fine(&self) -> usize {
        iter_cells(self.lo(), self.hi())
            .filter(|c| self.is_fine(c))
            .count()
    }

    fn shape(lo: &CellIndex, hi: &CellIndex) -> Result<(usize, usize, usize), SetupError> {
        let mut shape = [0usize; 3];
        for i in 0..3 {
            if hi[i] < lo[i] {
                return Err(SetupError(format!(
                    "Upper corner {hi:?} of mask must not be smaller than lower corner {lo:?}"
                )));
            }
            shape[i] = (hi[i] - lo[i]) as usize;
        }
        Ok((shape[0], shape[1], shape[2]))
    }

    fn local_index(&self, cell: &CellIndex) -> Option<(usize, usize, usize)> {
        let (nx, ny, nz) = self.values.dim();
        let n = [nx, ny, nz];
        let mut index = [0usize; 3];
        for i in 0..3 {
            let d = cell[i] - self.lo[i];
            if d < 0 || d as usize >= n[i] {
                return None;
            }
            index[i] = d as usize;
        }
        Some((index[0], index[1], index[2]))
    }
}

impl MaskGrid for MaskArray {
    fn mask_value(&self, cell: &CellIndex) -> i32 {
        self.local_index(cell)
            .map(|index| self.values[index])
            .unwrap_or(0)
    }
}
