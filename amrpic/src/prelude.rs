pub use amrpic_building_blocks::*;
pub use amrpic_concepts::*;

#[cfg(feature = "tracing")]
#[cfg_attr(docsrs, doc(cfg(feature = "tracing")))]
pub use amrpic_core::logging::*;

pub use amrpic_core::*;
