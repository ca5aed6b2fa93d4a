mod cartesian_amr;
mod mask_array;

pub use cartesian_amr::*;
pub use mask_array::*;
