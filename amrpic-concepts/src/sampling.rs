/// Produces the position of a particle relative to its unit cell.
///
/// Every component of the returned position lies in `[0, 1)`.
/// Its components are ordered along the active axes of the simulation
/// (see [SpaceDim::unit_box_to_axes](crate::SpaceDim::unit_box_to_axes)).
pub trait UnitBoxSampler {
    /// Calculates the position of particle number `i_part` within one cell.
    ///
    /// The refinement factor `ref_fac` states in how many sub-cells each axis of the cell
    /// is split.
    /// Deterministic samplers ignore the random number generator.
    fn position_unit_box<R>(&self, i_part: usize, ref_fac: [usize; 3], rng: &mut R) -> [f64; 3]
    where
        R: rand::Rng + ?Sized;
}
