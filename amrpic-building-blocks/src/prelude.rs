//! Re-exports of the most commonly used building blocks together with the concepts
//! they implement.

pub use crate::constants::*;
pub use crate::domains::*;
pub use crate::pushers::*;
pub use crate::sampling::*;

pub use amrpic_concepts::*;
