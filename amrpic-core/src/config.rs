use std::path::Path;

use amrpic_concepts::{SetupError, SpaceDim};
use serde::{Deserialize, Serialize};

use crate::boundary::ParticleBoundary;
use crate::container::ParticleContainer;
use crate::errors::ConfigError;
use crate::partition::BufferSettings;
use crate::species::{PhysicalSpecies, Species};

/// Configuration of a single particle species.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SpeciesConfig {
    /// Unique name
    pub name: String,
    /// Physical identity which determines default charge and mass
    pub species: PhysicalSpecies,
    /// Overrides the default charge (C)
    #[serde(default)]
    pub charge: Option<f64>,
    /// Overrides the default mass (kg)
    #[serde(default)]
    pub mass: Option<f64>,
    /// Boundary treatment along each axis
    #[serde(default)]
    pub boundaries: [ParticleBoundary; 3],
}

/// All settings which are consumed by the particle core.
///
/// ```
/// # use amrpic_core::PicConfig;
/// let config = PicConfig::from_ron_str(
///     "(
///         space_dim: TwoDXZ,
///         rng_seed: 3,
///         buffers: (
///             n_current_deposition_buffer: 2,
///             n_field_gather_buffer: 1,
///             deposit_on_main_grid: false,
///             gather_from_main_grid: false,
///         ),
///         species: [(name: \"beam\", species: electron)],
///     )",
/// )?;
/// let containers = config.build_containers()?;
/// assert_eq!(containers[0].species_type_name(), "electron");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PicConfig {
    /// Dimensionality of the simulation
    pub space_dim: SpaceDim,
    /// Seed of the random number generators. Species `i` uses `rng_seed + i`.
    pub rng_seed: u64,
    /// Rank stored in the ids of newly created particles
    #[serde(default)]
    pub rank: u32,
    /// Widths of the buffer regions
    pub buffers: BufferSettings,
    /// All particle species
    pub species: Vec<SpeciesConfig>,
}

impl PicConfig {
    /// Parses a configuration in the [ron](https://docs.rs/ron) format.
    pub fn from_ron_str(s: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(s)?)
    }

    /// Parses a configuration in the json format.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Reads a configuration file. The format is chosen by the extension `.ron` or `.json`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("ron") => Self::from_ron_str(&contents),
            Some("json") => Self::from_json_str(&contents),
            _ => Err(ConfigError::UnknownFormat(format!(
                "Cannot determine configuration format of file {}",
                path.display()
            ))),
        }
    }

    /// Serializes the configuration in the [ron](https://docs.rs/ron) format.
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    /// Writes the configuration to a file. The format is chosen by the extension `.ron` or
    /// `.json`.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match path.extension().and_then(|e| e.to_str()) {
            Some("ron") => self.to_ron_string()?,
            Some("json") => serde_json::to_string_pretty(self)?,
            _ => {
                return Err(ConfigError::UnknownFormat(format!(
                    "Cannot determine configuration format of file {}",
                    path.display()
                )))
            }
        };
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Checks buffer settings and species.
    pub fn validate(&self) -> Result<(), SetupError> {
        self.buffers.validate()?;
        for (i, species) in self.species.iter().enumerate() {
            if self.species[..i].iter().any(|s| s.name == species.name) {
                return Err(SetupError(format!(
                    "Species name {} is used more than once",
                    species.name
                )));
            }
            species.build()?;
        }
        Ok(())
    }

    /// Creates one empty [ParticleContainer] per species.
    pub fn build_containers(&self) -> Result<Vec<ParticleContainer>, SetupError> {
        self.validate()?;
        self.species
            .iter()
            .enumerate()
            .map(|(i, s)| -> Result<ParticleContainer, SetupError> {
                Ok(ParticleContainer::new(
                    s.build()?,
                    self.space_dim,
                    self.buffers,
                    self.rng_seed.wrapping_add(i as u64),
                )?
                .with_rank(self.rank)
                .with_boundaries(s.boundaries))
            })
            .collect()
    }
}

impl SpeciesConfig {
    /// Resolves charge and mass of this species.
    pub fn build(&self) -> Result<Species, SetupError> {
        Species::new(self.name.clone(), self.species, self.charge, self.mass)
    }
}
