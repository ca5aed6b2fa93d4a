#![deny(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![cfg_attr(docsrs, feature(doc_cfg))]
//! This crate owns the particles of an adaptive mesh particle-in-cell simulation and
//! orchestrates the per-step operations acting on them with the help of the
//! [building blocks](amrpic_building_blocks).
//!
//! ## Storage
//! Particles of one species are stored in a [ParticleContainer].
//! They are bucketed by refinement level and spatial tile, each bucket being a
//! [ParticleTile] which stores every particle component in its own array.
//!
//! ## Buffers
//! Near coarse-fine interfaces, particles deposit their current and gather their fields
//! from a coarser representation.
//! The [BufferPartitioner] reorders every tile such that the particles which are resolved
//! against the fine patch come first.
//! ```
//! # use amrpic_core::*;
//! # use amrpic_building_blocks::{CartesianAmrGeometry, MaskArray};
//! # use amrpic_concepts::SpaceDim;
//! let geometry = CartesianAmrGeometry::from_boundaries_and_n_cells(
//!     SpaceDim::OneDZ,
//!     [0.0; 3],
//!     [1.0, 1.0, 8.0],
//!     [1, 1, 8],
//! )?;
//! let species = Species::new("electrons", PhysicalSpecies::Electron, None, None)?;
//! let buffers = BufferSettings {
//!     n_current_deposition_buffer: 2,
//!     n_field_gather_buffer: 2,
//!     ..Default::default()
//! };
//! let mut container = ParticleContainer::new(species, SpaceDim::OneDZ, buffers, 0)?;
//! let particles = [6.5, 3.5].map(|z| ParticleInit {
//!     pos: [0.0, 0.0, z],
//!     weight: 1.0,
//!     ..Default::default()
//! });
//! container.add_n_particles(0, &geometry, particles)?;
//!
//! let mask = MaskArray::from_fine_patch([0, 0, 0], [1, 1, 8], 2, SpaceDim::OneDZ)?;
//! let res = container.partition_for_buffers(0, 0, &geometry, &mask, &mask)?;
//! assert_eq!(res.n_fine_current, 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Configuration
//! All settings can be loaded from [ron](https://docs.rs/ron) or json files with
//! [PicConfig].

mod boundary;
mod config;
mod container;
mod errors;
/// Setup of structured logging
#[cfg(feature = "tracing")]
#[cfg_attr(docsrs, doc(cfg(feature = "tracing")))]
pub mod logging;
mod partition;
mod species;
mod tile;

pub use boundary::*;
pub use config::*;
pub use container::*;
pub use errors::*;
pub use partition::*;
pub use species::*;
pub use tile::*;

#[doc(hidden)]
pub use rayon;

#[cfg(feature = "tracing")]
#[doc(hidden)]
pub use tracing;
