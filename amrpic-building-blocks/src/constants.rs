//! Physical constants in SI units.

/// Speed of light in vacuum (m/s)
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Inverse of the squared speed of light (s²/m²)
pub const INV_C2: f64 = 1.0 / (SPEED_OF_LIGHT * SPEED_OF_LIGHT);

/// Elementary charge (C)
pub const ELEMENTARY_CHARGE: f64 = 1.602_176_634e-19;

/// Electron mass (kg)
pub const ELECTRON_MASS: f64 = 9.109_383_701_5e-31;

/// Proton mass (kg)
pub const PROTON_MASS: f64 = 1.672_621_923_69e-27;

/// Unified atomic mass unit (kg)
pub const ATOMIC_MASS_UNIT: f64 = 1.660_539_066_60e-27;

/// Mass of a neutral hydrogen atom (kg)
pub const HYDROGEN_MASS: f64 = 1.007_825 * ATOMIC_MASS_UNIT;

/// Mass of a neutral helium-4 atom (kg)
pub const HELIUM_MASS: f64 = 4.002_602 * ATOMIC_MASS_UNIT;
