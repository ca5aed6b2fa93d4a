#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]
//! This crate encapsulates the concepts shared by all parts of
//! [amrpic](https://docs.rs/amrpic).
//!
//! It defines the vocabulary of the particle core: how the mesh and its buffer masks are
//! viewed ([Geometry], [MaskGrid]), how particles are identified ([ParticleId]),
//! how positions inside a cell are sampled ([UnitBoxSampler]) and which errors can occur.
//! Concrete implementations live in
//! [amrpic-building-blocks](https://docs.rs/amrpic-building-blocks).

mod errors;
mod geometry;
mod particle;
mod sampling;

pub use errors::*;
pub use geometry::*;
pub use particle::*;
pub use sampling::*;
