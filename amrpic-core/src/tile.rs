use amrpic_building_blocks::{update_position, update_position_implicit, PushScheme};
use amrpic_concepts::{IndexError, ParticleId, SpaceDim};
use itertools::izip;
use serde::{Deserialize, Serialize};

use crate::boundary::{BoundaryOutcome, ParticleBoundary};

/// All properties of a single macro-particle.
///
/// Used to move particles in and out of a [ParticleTile] which stores them as
/// structure of arrays.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Particle {
    /// Stable identifier
    pub id: ParticleId,
    /// Position (m)
    pub pos: [f64; 3],
    /// Momentum `u = gamma * v` (m/s)
    pub u: [f64; 3],
    /// Number of physical particles represented
    pub weight: f64,
    /// Values of the runtime real attributes in the order in which they were added
    pub real_attribs: Vec<f64>,
    /// Values of the runtime integer attributes in the order in which they were added
    pub int_attribs: Vec<i32>,
}

/// Particles resident in one spatial tile of one refinement level.
///
/// Every component is stored in its own contiguous array.
/// The order of particles is meaningful: after partitioning, the first particles are
/// resolved against the fine patch.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ParticleTile {
    ids: Vec<ParticleId>,
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
    ux: Vec<f64>,
    uy: Vec<f64>,
    uz: Vec<f64>,
    weight: Vec<f64>,
    momentum_n: Option<[Vec<f64>; 3]>,
    real_attribs: Vec<Vec<f64>>,
    int_attribs: Vec<Vec<i32>>,
}

impl ParticleTile {
    /// Empty tile carrying the given number of runtime attributes.
    pub fn new(n_real_attribs: usize, n_int_attribs: usize) -> Self {
        Self {
            real_attribs: vec![Vec::new(); n_real_attribs],
            int_attribs: vec![Vec::new(); n_int_attribs],
            ..Default::default()
        }
    }

    /// Number of particles
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Tile holds no particles
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Appends a particle at the end of the tile.
    ///
    /// When the tile stores the momentum of the previous full step, the current
    /// momentum of the new particle is stored there as well.
    pub fn push(&mut self, particle: Particle) -> Result<(), IndexError> {
        if particle.real_attribs.len() != self.real_attribs.len()
            || particle.int_attribs.len() != self.int_attribs.len()
        {
            return Err(IndexError(format!(
                "Particle {} carries {} real and {} integer attributes but tile expects {} and {}",
                particle.id,
                particle.real_attribs.len(),
                particle.int_attribs.len(),
                self.real_attribs.len(),
                self.int_attribs.len(),
            )));
        }
        self.ids.push(particle.id);
        self.x.push(particle.pos[0]);
        self.y.push(particle.pos[1]);
        self.z.push(particle.pos[2]);
        self.ux.push(particle.u[0]);
        self.uy.push(particle.u[1]);
        self.uz.push(particle.u[2]);
        self.weight.push(particle.weight);
        if let Some(momentum_n) = &mut self.momentum_n {
            for i in 0..3 {
                momentum_n[i].push(particle.u[i]);
            }
        }
        for (attrib, value) in self.real_attribs.iter_mut().zip(particle.real_attribs) {
            attrib.push(value);
        }
        for (attrib, value) in self.int_attribs.iter_mut().zip(particle.int_attribs) {
            attrib.push(value);
        }
        Ok(())
    }

    /// Copies all properties of the particle at index `i`.
    pub fn get(&self, i: usize) -> Option<Particle> {
        if i >= self.len() {
            return None;
        }
        Some(Particle {
            id: self.ids[i],
            pos: self.position(i),
            u: self.momentum(i),
            weight: self.weight[i],
            real_attribs: self.real_attribs.iter().map(|a| a[i]).collect(),
            int_attribs: self.int_attribs.iter().map(|a| a[i]).collect(),
        })
    }

    /// Identifiers of all particles in storage order
    pub fn ids(&self) -> &[ParticleId] {
        &self.ids
    }

    /// Position of the particle at index `i`.
    ///
    /// # Panics
    /// If `i` is out of bounds.
    #[inline]
    pub fn position(&self, i: usize) -> [f64; 3] {
        [self.x[i], self.y[i], self.z[i]]
    }

    /// Momentum of the particle at index `i`.
    ///
    /// # Panics
    /// If `i` is out of bounds.
    #[inline]
    pub fn momentum(&self, i: usize) -> [f64; 3] {
        [self.ux[i], self.uy[i], self.uz[i]]
    }

    /// Positions of all particles in storage order
    pub fn positions(&self) -> impl Iterator<Item = [f64; 3]> + '_ {
        izip!(&self.x, &self.y, &self.z).map(|(x, y, z)| [*x, *y, *z])
    }

    /// Momenta of all particles in storage order
    pub fn momenta(&self) -> impl Iterator<Item = [f64; 3]> + '_ {
        izip!(&self.ux, &self.uy, &self.uz).map(|(ux, uy, uz)| [*ux, *uy, *uz])
    }

    /// Weights of all particles in storage order
    pub fn weights(&self) -> &[f64] {
        &self.weight
    }

    /// Values of the runtime real attribute with index `n`
    pub fn real_attrib(&self, n: usize) -> Option<&[f64]> {
        self.real_attribs.get(n).map(|a| a.as_slice())
    }

    /// Values of the runtime integer attribute with index `n`
    pub fn int_attrib(&self, n: usize) -> Option<&[i32]> {
        self.int_attribs.get(n).map(|a| a.as_slice())
    }

    /// Mutable values of the runtime real attribute with index `n`
    pub fn real_attrib_mut(&mut self, n: usize) -> Option<&mut [f64]> {
        self.real_attribs.get_mut(n).map(|a| a.as_mut_slice())
    }

    /// Mutable values of the runtime integer attribute with index `n`
    pub fn int_attrib_mut(&mut self, n: usize) -> Option<&mut [i32]> {
        self.int_attribs.get_mut(n).map(|a| a.as_mut_slice())
    }

    pub(crate) fn add_real_attrib(&mut self, default: f64) {
        self.real_attribs.push(vec![default; self.len()]);
    }

    pub(crate) fn add_int_attrib(&mut self, default: i32) {
        self.int_attribs.push(vec![default; self.len()]);
    }

    /// Stores the current momentum as momentum of the previous full step.
    ///
    /// Required before positions can be advanced with [PushScheme::Implicit].
    pub fn save_momentum(&mut self) {
        self.momentum_n = Some([self.ux.clone(), self.uy.clone(), self.uz.clone()]);
    }

    /// Determines if [ParticleTile::save_momentum] has been called.
    pub fn has_saved_momentum(&self) -> bool {
        self.momentum_n.is_some()
    }

    /// Momentum of the previous full step, if it was saved.
    pub fn saved_momentum(&self, i: usize) -> Option<[f64; 3]> {
        let m = self.momentum_n.as_ref()?;
        Some([*m[0].get(i)?, *m[1].get(i)?, *m[2].get(i)?])
    }

    /// Overwrites the momentum of the particle at index `i`.
    pub fn set_momentum(&mut self, i: usize, u: [f64; 3]) -> Result<(), IndexError> {
        if i >= self.len() {
            return Err(IndexError(format!(
                "Index {i} out of range for tile with {} particles",
                self.len()
            )));
        }
        self.ux[i] = u[0];
        self.uy[i] = u[1];
        self.uz[i] = u[2];
        Ok(())
    }

    /// Advances the position of every particle by one time step.
    pub fn advance_positions(
        &mut self,
        dt: f64,
        scheme: PushScheme,
        dim: SpaceDim,
    ) -> Result<(), IndexError> {
        match scheme {
            PushScheme::Explicit => {
                for (x, y, z, ux, uy, uz) in izip!(
                    &mut self.x,
                    &mut self.y,
                    &mut self.z,
                    &self.ux,
                    &self.uy,
                    &self.uz
                ) {
                    let mut pos = [*x, *y, *z];
                    update_position(&mut pos, [*ux, *uy, *uz], dt, dim);
                    [*x, *y, *z] = pos;
                }
            }
            PushScheme::Implicit => {
                let [ux_n, uy_n, uz_n] = self.momentum_n.as_ref().ok_or(IndexError(
                    "Implicit position update requires the momentum of the previous step \
                    but it was never saved"
                        .to_owned(),
                ))?;
                for (x, y, z, ux_n, uy_n, uz_n, ux, uy, uz) in izip!(
                    &mut self.x,
                    &mut self.y,
                    &mut self.z,
                    ux_n,
                    uy_n,
                    uz_n,
                    &self.ux,
                    &self.uy,
                    &self.uz
                ) {
                    let mut pos = [*x, *y, *z];
                    update_position_implicit(
                        &mut pos,
                        [*ux_n, *uy_n, *uz_n],
                        [*ux, *uy, *uz],
                        dt,
                        dim,
                    );
                    [*x, *y, *z] = pos;
                }
            }
        }
        Ok(())
    }

    /// Builds a new tile which contains the particles at the given indices in that order.
    pub fn gather(&self, indices: &[usize]) -> Self {
        fn pick<T: Copy>(values: &[T], indices: &[usize]) -> Vec<T> {
            indices.iter().map(|&i| values[i]).collect()
        }
        Self {
            ids: pick(&self.ids, indices),
            x: pick(&self.x, indices),
            y: pick(&self.y, indices),
            z: pick(&self.z, indices),
            ux: pick(&self.ux, indices),
            uy: pick(&self.uy, indices),
            uz: pick(&self.uz, indices),
            weight: pick(&self.weight, indices),
            momentum_n: self
                .momentum_n
                .as_ref()
                .map(|m| [pick(&m[0], indices), pick(&m[1], indices), pick(&m[2], indices)]),
            real_attribs: self.real_attribs.iter().map(|a| pick(a, indices)).collect(),
            int_attribs: self.int_attribs.iter().map(|a| pick(a, indices)).collect(),
        }
    }

    /// Keeps only particles for which `keep` is true while preserving their order.
    /// Returns the number of removed particles.
    pub fn retain(&mut self, keep: &[bool]) -> usize {
        let indices: Vec<usize> = keep
            .iter()
            .enumerate()
            .filter_map(|(i, k)| if *k { Some(i) } else { None })
            .collect();
        let n_removed = self.len() - indices.len();
        if n_removed > 0 {
            *self = self.gather(&indices);
        }
        n_removed
    }

    /// Applies per-axis boundary conditions on the box $[lo, hi)$ to all active axes.
    /// Returns the number of absorbed particles.
    pub fn apply_boundaries(
        &mut self,
        boundaries: &[ParticleBoundary; 3],
        lo: [f64; 3],
        hi: [f64; 3],
        dim: SpaceDim,
    ) -> usize {
        let active = dim.active_axes();
        let mut keep = vec![true; self.len()];
        for i in 0..self.len() {
            let mut pos = self.position(i);
            for axis in 0..3 {
                if !active[axis] {
                    continue;
                }
                match boundaries[axis].apply(&mut pos[axis], lo[axis], hi[axis]) {
                    BoundaryOutcome::Absorbed => keep[i] = false,
                    BoundaryOutcome::Reflected => {
                        let u = match axis {
                            0 => &mut self.ux,
                            1 => &mut self.uy,
                            _ => &mut self.uz,
                        };
                        u[i] = -u[i];
                        if let Some(m) = &mut self.momentum_n {
                            m[axis][i] = -m[axis][i];
                        }
                    }
                    BoundaryOutcome::Inside | BoundaryOutcome::Wrapped => (),
                }
            }
            [self.x[i], self.y[i], self.z[i]] = pos;
        }
        self.retain(&keep)
    }
}
