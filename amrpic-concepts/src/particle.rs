use serde::{Deserialize, Serialize};

/// Stable identifier of a macro-particle.
///
/// The identifier is composed of a counter which is unique on the rank where the particle
/// was created and the index of this rank.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ParticleId {
    /// Counter of particles created on the origin rank.
    pub id: u64,
    /// Rank on which the particle was created.
    pub rank: u32,
}

impl ParticleId {
    /// Construct a new [ParticleId].
    pub fn new(id: u64, rank: u32) -> Self {
        Self { id, rank }
    }
}

impl core::fmt::Display for ParticleId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}@{}", self.id, self.rank)
    }
}
