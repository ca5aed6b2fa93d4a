use amrpic_concepts::{Geometry, MaskGrid, SetupError};
use itertools::{Either, Itertools};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::tile::ParticleTile;

/// Widths of the buffer regions near coarse-fine interfaces and flags which force
/// particles of refined levels onto the coarsest level.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct BufferSettings {
    /// Width (in cells) of the current deposition buffer
    pub n_current_deposition_buffer: i32,
    /// Width (in cells) of the field gather buffer
    pub n_field_gather_buffer: i32,
    /// Particles on refined levels deposit their current only on the coarsest level.
    pub deposit_on_main_grid: bool,
    /// Particles on refined levels gather fields only from the coarsest level.
    pub gather_from_main_grid: bool,
}

impl BufferSettings {
    /// Checks that both buffer widths are non-negative.
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.n_current_deposition_buffer < 0 || self.n_field_gather_buffer < 0 {
            return Err(SetupError(format!(
                "Buffer widths must be non-negative but got n_current_deposition_buffer={} \
                and n_field_gather_buffer={}",
                self.n_current_deposition_buffer, self.n_field_gather_buffer
            )));
        }
        Ok(())
    }
}

/// Number of leading particles of a tile which are resolved against the fine patch.
///
/// The remaining particles are resolved against the coarser buffer representation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BufferPartition {
    /// Split index for current deposition
    pub n_fine_current: usize,
    /// Split index for field gathering
    pub n_fine_gather: usize,
}

/// Splits the particles of a tile into fine-patch and buffer particles and reorders
/// the tile accordingly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferPartitioner {
    settings: BufferSettings,
}

/// Looks up the mask at the current position of every particle in `pids`.
fn classify<G, M>(
    tile: &ParticleTile,
    pids: &[usize],
    level: usize,
    geometry: &G,
    mask: &M,
) -> Vec<bool>
where
    G: Geometry + ?Sized,
    M: MaskGrid + ?Sized,
{
    pids.par_iter()
        .map(|&p| mask.is_fine(&geometry.cell_index(level, &tile.position(p))))
        .collect()
}

/// Moves all entries whose flag is set in front of the others while keeping the
/// relative order within both groups. Returns the number of flagged entries.
fn stable_partition(pids: &mut [usize], flags: &[bool]) -> usize {
    let (fine, buffer): (Vec<usize>, Vec<usize>) = pids
        .iter()
        .zip(flags)
        .partition_map(|(p, f)| {
            if *f {
                Either::Left(*p)
            } else {
                Either::Right(*p)
            }
        });
    let n_fine = fine.len();
    pids[..n_fine].copy_from_slice(&fine);
    pids[n_fine..].copy_from_slice(&buffer);
    n_fine
}

impl BufferPartitioner {
    /// Validates the settings and constructs a new partitioner.
    pub fn new(settings: BufferSettings) -> Result<Self, SetupError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    /// Settings used by this partitioner
    pub fn settings(&self) -> &BufferSettings {
        &self.settings
    }

    /// Partitions the particles of `tile` and reorders them in place.
    ///
    /// The larger of both buffers decides the first split (ties prefer the gather
    /// buffer).
    /// Particles which are buffer particles for the larger buffer are then split once more
    /// against the mask of the smaller buffer.
    /// Both splits are stable.
    /// When `deposit_on_main_grid` or `gather_from_main_grid` is set, refined levels
    /// report a split of `0` for the respective operation.
    ///
    /// If the buffer widths are equal, the `current_mask` is never consulted and both
    /// masks are expected to classify particles identically
    /// (see [BufferPartitioner::check_mask_consistency]).
    #[cfg_attr(feature = "tracing", instrument(skip_all, fields(level = level, np = tile.len())))]
    pub fn partition<G, M1, M2>(
        &self,
        tile: &mut ParticleTile,
        level: usize,
        geometry: &G,
        current_mask: &M1,
        gather_mask: &M2,
    ) -> BufferPartition
    where
        G: Geometry + ?Sized,
        M1: MaskGrid + ?Sized,
        M2: MaskGrid + ?Sized,
    {
        let np = tile.len();
        if np == 0 {
            return BufferPartition::default();
        }

        let n_current = self.settings.n_current_deposition_buffer;
        let n_gather = self.settings.n_field_gather_buffer;

        let mut pids: Vec<usize> = (0..np).collect();
        let flags = if n_gather >= n_current {
            classify(tile, &pids, level, geometry, gather_mask)
        } else {
            classify(tile, &pids, level, geometry, current_mask)
        };
        let n_fine = stable_partition(&mut pids, &flags);

        let (mut n_fine_current, mut n_fine_gather) = if n_current == n_gather {
            (n_fine, n_fine)
        } else if n_fine == np {
            (np, np)
        } else {
            let n_buf_other = n_current.min(n_gather);
            let n_fine_other = if n_buf_other > 0 {
                let suffix = &mut pids[n_fine..];
                let flags = if n_gather > n_current {
                    classify(tile, suffix, level, geometry, current_mask)
                } else {
                    classify(tile, suffix, level, geometry, gather_mask)
                };
                n_fine + stable_partition(suffix, &flags)
            } else {
                np
            };
            if n_gather > n_current {
                (n_fine_other, n_fine)
            } else {
                (n_fine, n_fine_other)
            }
        };

        if self.settings.deposit_on_main_grid && level > 0 {
            n_fine_current = 0;
        }
        if self.settings.gather_from_main_grid && level > 0 {
            n_fine_gather = 0;
        }

        if n_fine_current != np || n_fine_gather != np {
            #[cfg(feature = "tracing")]
            tracing::trace!(n_fine_current, n_fine_gather, "reordering tile");
            *tile = tile.gather(&pids);
        }

        BufferPartition {
            n_fine_current,
            n_fine_gather,
        }
    }

    /// Verifies that, for equal buffer widths, both masks classify every particle of the
    /// tile identically.
    ///
    /// Does nothing when the buffer widths differ.
    pub fn check_mask_consistency<G, M1, M2>(
        &self,
        tile: &ParticleTile,
        level: usize,
        geometry: &G,
        current_mask: &M1,
        gather_mask: &M2,
    ) -> Result<(), SetupError>
    where
        G: Geometry + ?Sized,
        M1: MaskGrid + ?Sized,
        M2: MaskGrid + ?Sized,
    {
        if self.settings.n_current_deposition_buffer != self.settings.n_field_gather_buffer {
            return Ok(());
        }
        let pids: Vec<usize> = (0..tile.len()).collect();
        let current = classify(tile, &pids, level, geometry, current_mask);
        let gather = classify(tile, &pids, level, geometry, gather_mask);
        let n_mismatch = current.iter().zip(&gather).filter(|(c, g)| c != g).count();
        if n_mismatch > 0 {
            return Err(SetupError(format!(
                "Buffer widths are equal ({}) but the current deposition and field gather \
                masks disagree for {n_mismatch} of {} particles on level {level}",
                self.settings.n_field_gather_buffer,
                tile.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tile::Particle;
    use amrpic_building_blocks::{CartesianAmrGeometry, MaskArray};
    use amrpic_concepts::{ParticleId, SpaceDim};

    fn geometry() -> CartesianAmrGeometry {
        CartesianAmrGeometry::from_boundaries_and_n_cells(
            SpaceDim::OneDZ,
            [0.0; 3],
            [1.0, 1.0, 8.0],
            [1, 1, 8],
        )
        .unwrap()
        .with_refinement(2, 2)
        .unwrap()
    }

    /// One particle per entry, placed in cell `z` of a 1D grid.
    fn tile_in_cells(cells: &[i64]) -> ParticleTile {
        let mut tile = ParticleTile::new(0, 0);
        for (i, z) in cells.iter().enumerate() {
            tile.push(Particle {
                id: ParticleId::new(i as u64, 0),
                pos: [0.0, 0.0, *z as f64 + 0.5],
                u: [0.0; 3],
                weight: 1.0,
                real_attribs: vec![],
                int_attribs: vec![],
            })
            .unwrap();
        }
        tile
    }

    /// 1D mask over cells `0..flags.len()`.
    fn mask(flags: &[bool]) -> MaskArray {
        MaskArray::from_fn([0, 0, 0], [1, 1, flags.len() as i64], |c| {
            flags[c[2] as usize] as i32
        })
        .unwrap()
    }

    fn ids(tile: &ParticleTile) -> Vec<u64> {
        tile.ids().iter().map(|p| p.id).collect()
    }

    fn settings(n_current: i32, n_gather: i32) -> BufferSettings {
        BufferSettings {
            n_current_deposition_buffer: n_current,
            n_field_gather_buffer: n_gather,
            deposit_on_main_grid: false,
            gather_from_main_grid: false,
        }
    }

    #[test]
    fn empty_tile() {
        let partitioner = BufferPartitioner::new(settings(2, 1)).unwrap();
        let mut tile = ParticleTile::new(0, 0);
        let m = mask(&[true]);
        let res = partitioner.partition(&mut tile, 0, &geometry(), &m, &m);
        assert_eq!(res, BufferPartition::default());
    }

    #[test]
    fn stable_partition_keeps_relative_order() {
        let mut pids = vec![0, 1, 2, 3, 4, 5];
        let n = stable_partition(&mut pids, &[false, true, false, true, true, false]);
        assert_eq!(n, 3);
        assert_eq!(pids, vec![1, 3, 4, 0, 2, 5]);
    }

    #[test]
    fn gather_buffer_larger() {
        // Particle i sits in cell i
        let mut tile = tile_in_cells(&[0, 1, 2, 3, 4]);
        let gather = mask(&[false, true, false, true, true]);
        let current = mask(&[false, true, true, true, true]);
        let partitioner = BufferPartitioner::new(settings(1, 2)).unwrap();
        let res = partitioner.partition(&mut tile, 0, &geometry(), &current, &gather);
        assert_eq!(res.n_fine_gather, 3);
        // Suffix [0, 2] is split against the current mask: particle 2 is fine
        assert_eq!(res.n_fine_current, 4);
        assert_eq!(ids(&tile), vec![1, 3, 4, 2, 0]);
    }

    #[test]
    fn smaller_buffer_with_zero_width() {
        let mut tile = tile_in_cells(&[0, 1, 2]);
        let current = mask(&[true, false, true]);
        let gather = mask(&[false, false, false]);
        let partitioner = BufferPartitioner::new(settings(3, 0)).unwrap();
        let res = partitioner.partition(&mut tile, 0, &geometry(), &current, &gather);
        assert_eq!(res.n_fine_current, 2);
        assert_eq!(res.n_fine_gather, 3);
        assert_eq!(ids(&tile), vec![0, 2, 1]);
    }

    #[test]
    fn all_fine_keeps_order() {
        let mut tile = tile_in_cells(&[3, 1, 2]);
        let m = mask(&[true; 4]);
        let partitioner = BufferPartitioner::new(settings(2, 1)).unwrap();
        let res = partitioner.partition(&mut tile, 0, &geometry(), &m, &m);
        assert_eq!(res.n_fine_current, 3);
        assert_eq!(res.n_fine_gather, 3);
        assert_eq!(ids(&tile), vec![0, 1, 2]);
    }

    #[test]
    fn overrides_only_apply_to_refined_levels() {
        let m = mask(&[true; 16]);
        let mut s = settings(1, 1);
        s.deposit_on_main_grid = true;
        let partitioner = BufferPartitioner::new(s).unwrap();

        let mut tile = tile_in_cells(&[0, 1]);
        let res = partitioner.partition(&mut tile, 0, &geometry(), &m, &m);
        assert_eq!((res.n_fine_current, res.n_fine_gather), (2, 2));

        let mut tile = tile_in_cells(&[0, 1]);
        let res = partitioner.partition(&mut tile, 1, &geometry(), &m, &m);
        assert_eq!((res.n_fine_current, res.n_fine_gather), (0, 2));
        assert_eq!(ids(&tile), vec![0, 1]);
    }

    #[test]
    fn negative_width_is_rejected() {
        assert!(BufferPartitioner::new(settings(-1, 2)).is_err());
    }

    #[test]
    fn inconsistent_masks_with_equal_widths() {
        let tile = tile_in_cells(&[0, 1]);
        let partitioner = BufferPartitioner::new(settings(2, 2)).unwrap();
        let current = mask(&[true, false]);
        let gather = mask(&[true, true]);
        assert!(partitioner
            .check_mask_consistency(&tile, 0, &geometry(), &current, &gather)
            .is_err());
        assert!(partitioner
            .check_mask_consistency(&tile, 0, &geometry(), &gather, &gather)
            .is_ok());
        let partitioner = BufferPartitioner::new(settings(2, 1)).unwrap();
        assert!(partitioner
            .check_mask_consistency(&tile, 0, &geometry(), &current, &gather)
            .is_ok());
    }
}
