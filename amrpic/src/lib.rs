#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]
#![cfg_attr(docsrs, feature(doc_cfg))]
//! [amrpic](crate) moves, sorts and creates the macro-particles of a particle-in-cell
//! plasma simulation on an adaptively refined mesh.
//!
//! The field solver, the mesh hierarchy and the time stepping belong to the surrounding
//! simulation.
//! They are consumed through the [Geometry](concepts::Geometry) and
//! [MaskGrid](concepts::MaskGrid) concepts.

pub use amrpic_building_blocks as building_blocks;

pub use amrpic_concepts as concepts;

pub use amrpic_core as core;

/// Re-exports the default simulation types and traits.
pub mod prelude;
