#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
//! # amrpic - Building Blocks
//!
//! Concrete implementations of the concepts defined in
//! [amrpic-concepts](https://docs.rs/amrpic-concepts).
//! The particle core combines them to move, sort and create macro-particles.
//!
//! ```rust
//! # use amrpic_building_blocks::prelude::*;
//! # use rand::SeedableRng;
//! let geometry = CartesianAmrGeometry::from_boundaries_and_n_cells(
//!     SpaceDim::ThreeD,
//!     [0.0; 3],
//!     [1.0; 3],
//!     [4; 3],
//! )?;
//! let injector = InjectorPosition::regular([0.0; 3], [0.5; 3], [1, 1, 1], SpaceDim::ThreeD)?;
//! let mut rng = rand::rngs::SmallRng::seed_from_u64(0);
//!
//! // Place the particle of the first cell at its center
//! let unit = injector.position_unit_box(0, geometry.refinement_factor(0), &mut rng);
//! let origin = geometry.cell_origin(0, &[0, 0, 0]);
//! let size = geometry.cell_size(0);
//! let pos: Vec<f64> = (0..3).map(|i| origin[i] + unit[i] * size[i]).collect();
//! assert_eq!(pos, vec![0.125; 3]);
//! assert!(injector.inside_bounds(pos[0], pos[1], pos[2]));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod constants;

/// Meshes and buffer masks on which particles live
pub mod domains;

pub mod pushers;

/// Positions and momenta of newly created particles
pub mod sampling;

/// Handy re-exports of every building block.
pub mod prelude;

pub use domains::*;
pub use pushers::*;
pub use sampling::*;
