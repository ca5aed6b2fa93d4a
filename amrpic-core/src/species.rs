use amrpic_building_blocks::constants::*;
use amrpic_concepts::SetupError;
use serde::{Deserialize, Serialize};

/// Physical identity of a particle species.
///
/// The tag determines default values for charge and mass.
/// Ions are assumed to be fully ionized.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PhysicalSpecies {
    #[allow(missing_docs)]
    Electron,
    #[allow(missing_docs)]
    Positron,
    #[allow(missing_docs)]
    Proton,
    #[allow(missing_docs)]
    Photon,
    #[allow(missing_docs)]
    Hydrogen,
    #[allow(missing_docs)]
    Helium,
    /// Charge and mass have to be specified explicitly.
    #[default]
    Unspecified,
}

impl PhysicalSpecies {
    /// Lower-case name of the species type.
    pub fn name(&self) -> &'static str {
        match self {
            PhysicalSpecies::Electron => "electron",
            PhysicalSpecies::Positron => "positron",
            PhysicalSpecies::Proton => "proton",
            PhysicalSpecies::Photon => "photon",
            PhysicalSpecies::Hydrogen => "hydrogen",
            PhysicalSpecies::Helium => "helium",
            PhysicalSpecies::Unspecified => "unspecified",
        }
    }

    /// Charge (C) of a single physical particle.
    pub fn default_charge(&self) -> Option<f64> {
        match self {
            PhysicalSpecies::Electron => Some(-ELEMENTARY_CHARGE),
            PhysicalSpecies::Positron => Some(ELEMENTARY_CHARGE),
            PhysicalSpecies::Proton => Some(ELEMENTARY_CHARGE),
            PhysicalSpecies::Photon => Some(0.0),
            PhysicalSpecies::Hydrogen => Some(ELEMENTARY_CHARGE),
            PhysicalSpecies::Helium => Some(2.0 * ELEMENTARY_CHARGE),
            PhysicalSpecies::Unspecified => None,
        }
    }

    /// Mass (kg) of a single physical particle.
    pub fn default_mass(&self) -> Option<f64> {
        match self {
            PhysicalSpecies::Electron | PhysicalSpecies::Positron => Some(ELECTRON_MASS),
            PhysicalSpecies::Proton => Some(PROTON_MASS),
            PhysicalSpecies::Photon => Some(0.0),
            PhysicalSpecies::Hydrogen => Some(HYDROGEN_MASS),
            PhysicalSpecies::Helium => Some(HELIUM_MASS),
            PhysicalSpecies::Unspecified => None,
        }
    }
}

/// Scalar properties shared by all particles of one container.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Species {
    name: String,
    kind: PhysicalSpecies,
    charge: f64,
    mass: f64,
}

impl Species {
    /// Creates a new species.
    ///
    /// Explicit values for `charge` and `mass` take precedence over the defaults of the
    /// [PhysicalSpecies].
    ///
    /// ```
    /// # use amrpic_core::{PhysicalSpecies, Species};
    /// let electrons = Species::new("beam", PhysicalSpecies::Electron, None, None)?;
    /// assert!(electrons.charge() < 0.0);
    /// assert!(Species::new("dust", PhysicalSpecies::Unspecified, None, Some(1.0)).is_err());
    /// # Ok::<(), amrpic_concepts::SetupError>(())
    /// ```
    pub fn new(
        name: impl Into<String>,
        kind: PhysicalSpecies,
        charge: Option<f64>,
        mass: Option<f64>,
    ) -> Result<Self, SetupError> {
        let name = name.into();
        let charge = charge.or(kind.default_charge()).ok_or(SetupError(format!(
            "Species {name} of type {} requires an explicit charge",
            kind.name()
        )))?;
        let mass = mass.or(kind.default_mass()).ok_or(SetupError(format!(
            "Species {name} of type {} requires an explicit mass",
            kind.name()
        )))?;
        if !charge.is_finite() || !mass.is_finite() || mass < 0.0 {
            return Err(SetupError(format!(
                "Species {name} has invalid charge {charge} or mass {mass}"
            )));
        }
        Ok(Self {
            name,
            kind,
            charge,
            mass,
        })
    }

    /// Name given by the user
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Physical identity
    pub fn kind(&self) -> PhysicalSpecies {
        self.kind
    }

    /// Charge (C) of a single physical particle
    pub fn charge(&self) -> f64 {
        self.charge
    }

    /// Mass (kg) of a single physical particle
    pub fn mass(&self) -> f64 {
        self.mass
    }
}
