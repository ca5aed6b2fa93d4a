use std::collections::BTreeMap;

use amrpic_building_blocks::{
    iter_cells, lorentz_factor, InjectorPosition, MomentumDistribution, PushScheme,
};
use amrpic_concepts::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::boundary::ParticleBoundary;
use crate::errors::PicError;
use crate::partition::{BufferPartition, BufferPartitioner, BufferSettings};
use crate::species::{PhysicalSpecies, Species};
use crate::tile::{Particle, ParticleTile};

/// Identifies a tile by its refinement level and its index on that level.
pub type TileKey = (usize, usize);

/// Description of a particle which is added with [ParticleContainer::add_n_particles].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParticleInit {
    /// Explicit id. If `None`, the next free id of the container is used.
    pub id: Option<u64>,
    /// Position (m)
    pub pos: [f64; 3],
    /// Momentum `u = gamma * v` (m/s)
    pub u: [f64; 3],
    /// Number of physical particles represented
    pub weight: f64,
    /// Values of runtime real attributes. If empty, the defaults are used.
    pub real_attribs: Vec<f64>,
    /// Values of runtime integer attributes. If empty, the defaults are used.
    pub int_attribs: Vec<i32>,
}

/// Owns all particles of one species, bucketed by refinement level and tile.
///
/// Geometry and masks are owned by the mesh subsystem and passed to every call which
/// needs them.
#[derive(Clone, Debug)]
pub struct ParticleContainer {
    species: Species,
    dim: SpaceDim,
    boundaries: [ParticleBoundary; 3],
    partitioner: BufferPartitioner,
    tiles: BTreeMap<TileKey, ParticleTile>,
    rng: ChaCha8Rng,
    /// Next automatic id, `None` once every id was handed out
    next_id: Option<u64>,
    rank: u32,
    real_attrib_names: Vec<String>,
    real_attrib_defaults: Vec<f64>,
    int_attrib_names: Vec<String>,
    int_attrib_defaults: Vec<i32>,
}

/// Returns the tile with the given key and creates it if it does not exist yet.
fn tile_entry<'a>(
    tiles: &'a mut BTreeMap<TileKey, ParticleTile>,
    key: TileKey,
    n_real_attribs: usize,
    n_int_attribs: usize,
) -> &'a mut ParticleTile {
    tiles
        .entry(key)
        .or_insert_with(|| ParticleTile::new(n_real_attribs, n_int_attribs))
}

/// Takes the next automatic id from `counter`.
fn take_id(counter: &mut Option<u64>) -> Result<u64, IndexError> {
    let id = counter.ok_or(IndexError(
        "All particle ids of this container are in use".to_owned(),
    ))?;
    *counter = id.checked_add(1);
    Ok(id)
}

impl ParticleContainer {
    /// Creates an empty container.
    ///
    /// All randomness used by this container is drawn from a generator seeded with
    /// `rng_seed`.
    pub fn new(
        species: Species,
        dim: SpaceDim,
        buffers: BufferSettings,
        rng_seed: u64,
    ) -> Result<Self, SetupError> {
        Ok(Self {
            species,
            dim,
            boundaries: [ParticleBoundary::default(); 3],
            partitioner: BufferPartitioner::new(buffers)?,
            tiles: BTreeMap::new(),
            rng: ChaCha8Rng::seed_from_u64(rng_seed),
            next_id: Some(1),
            rank: 0,
            real_attrib_names: Vec::new(),
            real_attrib_defaults: Vec::new(),
            int_attrib_names: Vec::new(),
            int_attrib_defaults: Vec::new(),
        })
    }

    /// Sets the rank which is stored in the ids of newly created particles.
    pub fn with_rank(mut self, rank: u32) -> Self {
        self.rank = rank;
        self
    }

    /// Sets the boundary treatment along each axis.
    pub fn with_boundaries(mut self, boundaries: [ParticleBoundary; 3]) -> Self {
        self.boundaries = boundaries;
        self
    }

    /// Scalar properties of the species
    pub fn species(&self) -> &Species {
        &self.species
    }

    /// Charge (C) of a single physical particle
    pub fn charge(&self) -> f64 {
        self.species.charge()
    }

    /// Mass (kg) of a single physical particle
    pub fn mass(&self) -> f64 {
        self.species.mass()
    }

    /// Name of the [PhysicalSpecies] of this container.
    pub fn species_type_name(&self) -> &'static str {
        self.species.kind().name()
    }

    /// Determines if the particles of this container are of the given physical species.
    pub fn is_a(&self, kind: PhysicalSpecies) -> bool {
        self.species.kind() == kind
    }

    /// Dimensionality of the particle positions
    pub fn space_dim(&self) -> SpaceDim {
        self.dim
    }

    /// Rank stored in the ids of newly created particles
    pub fn rank(&self) -> u32 {
        self.rank
    }

    /// Boundary treatment along each axis
    pub fn boundaries(&self) -> &[ParticleBoundary; 3] {
        &self.boundaries
    }

    /// Buffer configuration used by [ParticleContainer::partition_for_buffers]
    pub fn buffer_settings(&self) -> &BufferSettings {
        self.partitioner.settings()
    }

    /// The tile with the given key if it exists.
    pub fn tile(&self, level: usize, tile: usize) -> Option<&ParticleTile> {
        self.tiles.get(&(level, tile))
    }

    /// Mutable access to the tile with the given key if it exists.
    pub fn tile_mut(&mut self, level: usize, tile: usize) -> Option<&mut ParticleTile> {
        self.tiles.get_mut(&(level, tile))
    }

    /// Iterates over all tiles ordered by level and tile index.
    pub fn tiles(&self) -> impl Iterator<Item = (&TileKey, &ParticleTile)> {
        self.tiles.iter()
    }

    fn tile_or_err(
        &mut self,
        level: usize,
        tile: usize,
    ) -> Result<&mut ParticleTile, IndexError> {
        self.tiles.get_mut(&(level, tile)).ok_or(IndexError(format!(
            "Tile {tile} on level {level} does not exist"
        )))
    }

    /// Total number of particles in all tiles
    pub fn total_particles(&self) -> usize {
        self.tiles.values().map(|t| t.len()).sum()
    }

    /// Advances the positions of all particles in one tile.
    #[cfg_attr(feature = "tracing", instrument(skip(self)))]
    pub fn advance_positions(
        &mut self,
        level: usize,
        tile: usize,
        dt: f64,
        scheme: PushScheme,
    ) -> Result<(), PicError> {
        let dim = self.dim;
        self.tile_or_err(level, tile)?
            .advance_positions(dt, scheme, dim)?;
        Ok(())
    }

    /// Advances the positions of all particles on every level.
    ///
    /// Tiles are processed in parallel.
    /// The implicit scheme fails without moving any particle if one tile has no saved
    /// momentum.
    #[cfg_attr(feature = "tracing", instrument(skip(self)))]
    pub fn advance_all_positions(&mut self, dt: f64, scheme: PushScheme) -> Result<(), PicError> {
        if scheme == PushScheme::Implicit {
            if let Some(((level, tile), _)) =
                self.tiles.iter().find(|(_, tile)| !tile.has_saved_momentum())
            {
                return Err(IndexError(format!(
                    "Tile {tile} on level {level} has no saved momentum for the implicit push"
                ))
                .into());
            }
        }
        let dim = self.dim;
        self.tiles
            .par_iter_mut()
            .try_for_each(|(_, tile)| tile.advance_positions(dt, scheme, dim))?;
        Ok(())
    }

    /// Stores the current momentum of every particle in one tile as momentum of the previous
    /// full step.
    pub fn save_momentum(&mut self, level: usize, tile: usize) -> Result<(), IndexError> {
        self.tile_or_err(level, tile)?.save_momentum();
        Ok(())
    }

    /// Calls [ParticleContainer::save_momentum] for every tile.
    pub fn save_all_momenta(&mut self) {
        self.tiles
            .par_iter_mut()
            .for_each(|(_, tile)| tile.save_momentum());
    }

    /// Partitions the particles of one tile into fine-patch and buffer particles.
    ///
    /// After this call, the first `n_fine_current` particles deposit their current on the
    /// fine patch and the first `n_fine_gather` particles gather their fields from it.
    /// See [BufferPartitioner::partition].
    #[cfg_attr(feature = "tracing", instrument(skip(self, geometry, current_mask, gather_mask)))]
    pub fn partition_for_buffers<G, M1, M2>(
        &mut self,
        level: usize,
        tile: usize,
        geometry: &G,
        current_mask: &M1,
        gather_mask: &M2,
    ) -> Result<BufferPartition, IndexError>
    where
        G: Geometry + ?Sized,
        M1: MaskGrid + ?Sized,
        M2: MaskGrid + ?Sized,
    {
        let partitioner = self.partitioner;
        let particles = self.tile_or_err(level, tile)?;
        Ok(partitioner.partition(particles, level, geometry, current_mask, gather_mask))
    }

    /// Checks that both masks agree for every particle of one tile when the buffer widths
    /// are equal. See [BufferPartitioner::check_mask_consistency].
    pub fn check_mask_consistency<G, M1, M2>(
        &self,
        level: usize,
        tile: usize,
        geometry: &G,
        current_mask: &M1,
        gather_mask: &M2,
    ) -> Result<(), PicError>
    where
        G: Geometry + ?Sized,
        M1: MaskGrid + ?Sized,
        M2: MaskGrid + ?Sized,
    {
        let particles = self.tile(level, tile).ok_or(IndexError(format!(
            "Tile {tile} on level {level} does not exist"
        )))?;
        self.partitioner
            .check_mask_consistency(particles, level, geometry, current_mask, gather_mask)?;
        Ok(())
    }

    fn check_level<G>(&self, level: usize, geometry: &G) -> Result<(), PicError>
    where
        G: Geometry + ?Sized,
    {
        if level >= geometry.n_levels() {
            return Err(IndexError(format!(
                "Level {level} requested but geometry only has {} levels",
                geometry.n_levels()
            ))
            .into());
        }
        if geometry.space_dim() != self.dim {
            return Err(SetupError(format!(
                "Geometry of dimension {:?} does not match particles of dimension {:?}",
                geometry.space_dim(),
                self.dim
            ))
            .into());
        }
        Ok(())
    }

    /// Creates `count_per_cell` particles in every cell of `level` which intersects the
    /// region of the injector.
    ///
    /// Positions inside each cell are obtained from the sampler of the injector.
    /// Particles whose position lies outside of the region (including its upper bound)
    /// are discarded.
    /// Every particle represents `density * cell_volume / count_per_cell` physical
    /// particles where the cell volume only includes active axes.
    /// Returns the number of created particles.
    #[cfg_attr(feature = "tracing", instrument(skip_all, fields(level = level)))]
    pub fn inject_particles<G>(
        &mut self,
        level: usize,
        geometry: &G,
        injector: &InjectorPosition,
        count_per_cell: usize,
        momentum: &MomentumDistribution,
        density: f64,
    ) -> Result<usize, PicError>
    where
        G: Geometry + ?Sized,
    {
        self.check_level(level, geometry)?;
        if injector.space_dim() != self.dim {
            return Err(SetupError(format!(
                "Injector of dimension {:?} does not match particles of dimension {:?}",
                injector.space_dim(),
                self.dim
            ))
            .into());
        }
        momentum.validate()?;
        if !density.is_finite() || density < 0.0 {
            return Err(SetupError(format!(
                "Density must be finite and non-negative but got {density}"
            ))
            .into());
        }
        if let Some(n_sub_cells) = injector.particles_per_cell([1; 3]) {
            if count_per_cell > n_sub_cells {
                return Err(SetupError(format!(
                    "Regular injector provides {n_sub_cells} positions per cell but \
                    {count_per_cell} particles were requested"
                ))
                .into());
            }
        }
        if count_per_cell == 0 {
            return Ok(0);
        }

        let active = self.dim.active_axes();
        let size = geometry.cell_size(level);
        let cell_volume: f64 = (0..3usize).filter(|i| active[*i]).map(|i| size[i]).product();
        let weight = density * cell_volume / count_per_cell as f64;

        // Only visit cells which can intersect the region
        let (bounds_lo, bounds_hi) = geometry.index_bounds(level);
        let region_lo = geometry.cell_index(level, &injector.region().lo());
        let region_hi = geometry.cell_index(level, &injector.region().hi());
        let lo = [0usize, 1, 2].map(|i| bounds_lo[i].max(region_lo[i]));
        let hi = [0usize, 1, 2].map(|i| bounds_hi[i].min(region_hi[i].saturating_add(1)));

        let n_real = self.real_attrib_names.len();
        let n_int = self.int_attrib_names.len();
        // Particles are only stored once every one of them was created
        let mut next_id = self.next_id;
        let mut staged = Vec::new();
        let mut n_rejected = 0;
        for cell in iter_cells(lo, hi) {
            let origin = geometry.cell_origin(level, &cell);
            let cell_hi = [0usize, 1, 2].map(|i| origin[i] + size[i]);
            if !injector.overlaps_with(origin, cell_hi) {
                continue;
            }
            let tile = geometry.tile_index(level, &cell);
            for i_part in 0..count_per_cell {
                let unit = injector.position_unit_box(i_part, [1; 3], &mut self.rng);
                let unit = self.dim.unit_box_to_axes(unit);
                let pos = [0usize, 1, 2].map(|i| origin[i] + unit[i] * size[i]);
                if !injector.inside_bounds(pos[0], pos[1], pos[2]) {
                    n_rejected += 1;
                    continue;
                }
                let u = momentum.sample(&mut self.rng)?;
                let id = ParticleId::new(take_id(&mut next_id)?, self.rank);
                staged.push((
                    (level, tile),
                    Particle {
                        id,
                        pos,
                        u,
                        weight,
                        real_attribs: self.real_attrib_defaults.clone(),
                        int_attribs: self.int_attrib_defaults.clone(),
                    },
                ));
            }
        }
        let n_injected = staged.len();
        for (key, particle) in staged {
            tile_entry(&mut self.tiles, key, n_real, n_int).push(particle)?;
        }
        self.next_id = next_id;
        #[cfg(feature = "tracing")]
        tracing::debug!(n_injected, n_rejected, "injected particles");
        #[cfg(not(feature = "tracing"))]
        let _ = n_rejected;
        Ok(n_injected)
    }

    /// Adds the given particles to `level`.
    ///
    /// Each particle is sorted into the tile which contains its position.
    /// Explicit ids are kept and the id counter of the container is advanced past them.
    /// If any particle is rejected, no particle is added and the id counter is unchanged.
    /// Returns the number of added particles.
    #[cfg_attr(feature = "tracing", instrument(skip_all, fields(level = level)))]
    pub fn add_n_particles<G, I>(
        &mut self,
        level: usize,
        geometry: &G,
        particles: I,
    ) -> Result<usize, PicError>
    where
        G: Geometry + ?Sized,
        I: IntoIterator<Item = ParticleInit>,
    {
        self.check_level(level, geometry)?;
        let n_real = self.real_attrib_names.len();
        let n_int = self.int_attrib_names.len();
        let mut next_id = self.next_id;
        let mut staged = Vec::new();
        for init in particles {
            let id = match init.id {
                Some(id) => {
                    next_id = id
                        .checked_add(1)
                        .and_then(|after| next_id.map(|n| n.max(after)));
                    id
                }
                None => take_id(&mut next_id)?,
            };
            let id = ParticleId::new(id, self.rank);
            let real_attribs = if init.real_attribs.is_empty() {
                self.real_attrib_defaults.clone()
            } else {
                init.real_attribs
            };
            let int_attribs = if init.int_attribs.is_empty() {
                self.int_attrib_defaults.clone()
            } else {
                init.int_attribs
            };
            if real_attribs.len() != n_real || int_attribs.len() != n_int {
                return Err(IndexError(format!(
                    "Particle {id} carries {} real and {} integer attributes but container \
                    expects {n_real} and {n_int}",
                    real_attribs.len(),
                    int_attribs.len(),
                ))
                .into());
            }
            let cell = geometry.cell_index(level, &init.pos);
            let tile = geometry.tile_index(level, &cell);
            staged.push((
                (level, tile),
                Particle {
                    id,
                    pos: init.pos,
                    u: init.u,
                    weight: init.weight,
                    real_attribs,
                    int_attribs,
                },
            ));
        }
        let n_added = staged.len();
        for (key, particle) in staged {
            tile_entry(&mut self.tiles, key, n_real, n_int).push(particle)?;
        }
        self.next_id = next_id;
        Ok(n_added)
    }

    /// Applies the boundary conditions of the container on the box $[lo, hi)$ to every
    /// particle. Returns the number of absorbed particles.
    #[cfg_attr(feature = "tracing", instrument(skip(self)))]
    pub fn apply_boundary_conditions(&mut self, lo: [f64; 3], hi: [f64; 3]) -> usize {
        let dim = self.dim;
        let boundaries = self.boundaries;
        let n_removed: usize = self
            .tiles
            .par_iter_mut()
            .map(|(_, tile)| tile.apply_boundaries(&boundaries, lo, hi, dim))
            .sum();
        #[cfg(feature = "tracing")]
        tracing::debug!(n_removed, "applied particle boundaries");
        n_removed
    }

    /// Total charge $\sum_p w_p q$ of all particles.
    pub fn sum_particle_charge(&self) -> f64 {
        let total_weight: f64 = self.tiles.values().flat_map(|t| t.weights()).sum();
        total_weight * self.charge()
    }

    /// Weighted mean of the velocity `u / gamma` of all particles.
    ///
    /// Returns zero if the total weight vanishes.
    pub fn mean_particle_velocity(&self) -> [f64; 3] {
        let mut sum = [0.0; 3];
        let mut total_weight = 0.0;
        for tile in self.tiles.values() {
            for (u, w) in tile.momenta().zip(tile.weights()) {
                let inv_gamma = 1.0 / lorentz_factor(u[0], u[1], u[2]);
                for i in 0..3 {
                    sum[i] += w * u[i] * inv_gamma;
                }
                total_weight += w;
            }
        }
        if total_weight == 0.0 {
            return [0.0; 3];
        }
        sum.map(|s| s / total_weight)
    }

    /// Largest speed $|u| / \gamma$ of all particles.
    pub fn max_particle_velocity(&self) -> f64 {
        self.tiles
            .values()
            .flat_map(|t| t.momenta())
            .map(|u| {
                let gamma = lorentz_factor(u[0], u[1], u[2]);
                (u[0] * u[0] + u[1] * u[1] + u[2] * u[2]).sqrt() / gamma
            })
            .fold(0.0, f64::max)
    }

    /// Adds a runtime real attribute which is initialized with `default` for all existing
    /// and future particles. Returns its index.
    pub fn add_real_attribute(
        &mut self,
        name: impl Into<String>,
        default: f64,
    ) -> Result<usize, SetupError> {
        let name = name.into();
        if self.real_attrib_names.contains(&name) {
            return Err(SetupError(format!("Real attribute {name} already exists")));
        }
        self.real_attrib_names.push(name);
        self.real_attrib_defaults.push(default);
        for tile in self.tiles.values_mut() {
            tile.add_real_attrib(default);
        }
        Ok(self.real_attrib_names.len() - 1)
    }

    /// Adds a runtime integer attribute which is initialized with `default` for all existing
    /// and future particles. Returns its index.
    pub fn add_int_attribute(
        &mut self,
        name: impl Into<String>,
        default: i32,
    ) -> Result<usize, SetupError> {
        let name = name.into();
        if self.int_attrib_names.contains(&name) {
            return Err(SetupError(format!("Integer attribute {name} already exists")));
        }
        self.int_attrib_names.push(name);
        self.int_attrib_defaults.push(default);
        for tile in self.tiles.values_mut() {
            tile.add_int_attrib(default);
        }
        Ok(self.int_attrib_names.len() - 1)
    }

    /// Index of the runtime real attribute with the given name
    pub fn real_attribute_index(&self, name: &str) -> Option<usize> {
        self.real_attrib_names.iter().position(|n| n == name)
    }

    /// Index of the runtime integer attribute with the given name
    pub fn int_attribute_index(&self, name: &str) -> Option<usize> {
        self.int_attrib_names.iter().position(|n| n == name)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use amrpic_building_blocks::{CartesianAmrGeometry, MaskArray};

    fn electrons() -> ParticleContainer {
        let species = Species::new("electrons", PhysicalSpecies::Electron, None, None).unwrap();
        ParticleContainer::new(species, SpaceDim::ThreeD, BufferSettings::default(), 0).unwrap()
    }

    fn geometry() -> CartesianAmrGeometry {
        CartesianAmrGeometry::from_boundaries_and_n_cells(
            SpaceDim::ThreeD,
            [0.0; 3],
            [4.0; 3],
            [4; 3],
        )
        .unwrap()
        .with_tile_size([2, 4, 4])
        .unwrap()
    }

    fn at(pos: [f64; 3]) -> ParticleInit {
        ParticleInit {
            pos,
            weight: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn species_identity() {
        let pc = electrons();
        assert_eq!(pc.species_type_name(), "electron");
        assert!(pc.is_a(PhysicalSpecies::Electron));
        assert!(!pc.is_a(PhysicalSpecies::Positron));
    }

    #[test]
    fn add_particles_sorts_into_tiles() {
        let mut pc = electrons();
        let n = pc
            .add_n_particles(0, &geometry(), vec![at([0.5; 3]), at([3.5, 0.5, 0.5])])
            .unwrap();
        assert_eq!(n, 2);
        assert_eq!(pc.tile(0, 0).unwrap().len(), 1);
        assert_eq!(pc.tile(0, 1).unwrap().len(), 1);
        assert_eq!(pc.total_particles(), 2);
    }

    #[test]
    fn explicit_ids_advance_counter() {
        let mut pc = electrons();
        let mut p = at([0.5; 3]);
        p.id = Some(41);
        pc.add_n_particles(0, &geometry(), vec![p, at([0.5; 3])])
            .unwrap();
        let ids: Vec<_> = pc.tile(0, 0).unwrap().ids().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![41, 42]);
    }

    #[test]
    fn rejected_particle_adds_nothing() {
        let mut pc = electrons();
        let mut bad = at([2.5; 3]);
        bad.real_attribs = vec![1.0];
        assert!(pc
            .add_n_particles(0, &geometry(), vec![at([0.5; 3]), bad])
            .is_err());
        assert_eq!(pc.total_particles(), 0);
        assert_eq!(pc.tiles().count(), 0);
        pc.add_n_particles(0, &geometry(), vec![at([0.5; 3])])
            .unwrap();
        assert_eq!(pc.tile(0, 0).unwrap().ids()[0].id, 1);
    }

    #[test]
    fn ids_run_out_without_overflow() {
        let mut pc = electrons();
        let mut p = at([0.5; 3]);
        p.id = Some(u64::MAX - 1);
        pc.add_n_particles(0, &geometry(), vec![p, at([0.5; 3])])
            .unwrap();
        let ids: Vec<_> = pc.tile(0, 0).unwrap().ids().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![u64::MAX - 1, u64::MAX]);
        assert!(pc.add_n_particles(0, &geometry(), vec![at([0.5; 3])]).is_err());

        let mut pc = electrons();
        let mut p = at([0.5; 3]);
        p.id = Some(u64::MAX);
        pc.add_n_particles(0, &geometry(), vec![p]).unwrap();
        assert!(pc.add_n_particles(0, &geometry(), vec![at([1.5; 3])]).is_err());
        // Explicit ids are still accepted
        let mut p = at([1.5; 3]);
        p.id = Some(7);
        pc.add_n_particles(0, &geometry(), vec![p]).unwrap();
        assert_eq!(pc.total_particles(), 2);
    }

    #[test]
    fn unknown_level_is_an_error() {
        let mut pc = electrons();
        assert!(pc.add_n_particles(1, &geometry(), vec![at([0.5; 3])]).is_err());
        assert!(pc
            .advance_positions(0, 5, 1.0, PushScheme::Explicit)
            .is_err());
    }

    #[test]
    fn attributes_reach_existing_and_new_particles() {
        let mut pc = electrons();
        pc.add_n_particles(0, &geometry(), vec![at([0.5; 3])]).unwrap();
        let n = pc.add_int_attribute("ionizationLevel", 1).unwrap();
        assert!(pc.add_int_attribute("ionizationLevel", 2).is_err());
        let mut p = at([1.5; 3]);
        p.int_attribs = vec![3];
        pc.add_n_particles(0, &geometry(), vec![p]).unwrap();
        assert_eq!(pc.int_attribute_index("ionizationLevel"), Some(n));
        assert_eq!(pc.tile(0, 0).unwrap().int_attrib(n), Some(&[1, 3][..]));
    }

    #[test]
    fn wrong_attribute_count_is_rejected() {
        let mut pc = electrons();
        let mut p = at([0.5; 3]);
        p.real_attribs = vec![1.0];
        assert!(pc.add_n_particles(0, &geometry(), vec![p]).is_err());
    }

    #[test]
    fn charge_and_velocity_diagnostics() {
        let mut pc = electrons();
        let mut p = at([0.5; 3]);
        p.weight = 2.0;
        p.u = [1e8, 0.0, 0.0];
        pc.add_n_particles(0, &geometry(), vec![p, at([0.5; 3])])
            .unwrap();
        assert_eq!(pc.sum_particle_charge(), 3.0 * pc.charge());
        let gamma = lorentz_factor(1e8, 0.0, 0.0);
        let mean = pc.mean_particle_velocity();
        approx::assert_relative_eq!(mean[0], 2.0 * 1e8 / gamma / 3.0, max_relative = 1e-12);
        approx::assert_relative_eq!(pc.max_particle_velocity(), 1e8 / gamma);
    }

    #[test]
    fn empty_container_diagnostics() {
        let pc = electrons();
        assert_eq!(pc.sum_particle_charge(), 0.0);
        assert_eq!(pc.mean_particle_velocity(), [0.0; 3]);
        assert_eq!(pc.max_particle_velocity(), 0.0);
    }

    #[test]
    fn absorbing_boundaries_remove_particles() {
        let mut pc = electrons();
        pc.add_n_particles(
            0,
            &geometry(),
            vec![at([0.5; 3]), at([1.0, 0.5, 0.5]), at([1.5; 3])],
        )
        .unwrap();
        let removed = pc.apply_boundary_conditions([0.0; 3], [1.0; 3]);
        assert_eq!(removed, 2);
        assert_eq!(pc.total_particles(), 1);
    }

    #[test]
    fn partition_missing_tile() {
        let mut pc = electrons();
        let mask = MaskArray::filled([0; 3], [4; 3], 1).unwrap();
        assert!(pc
            .partition_for_buffers(0, 0, &geometry(), &mask, &mask)
            .is_err());
    }
}
