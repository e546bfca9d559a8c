//! Field classification: excitation symmetry, dump layout and stored components.

use std::fmt;

/// Azimuthal symmetry class of the excitation a database was computed for
///
/// The stored fields are single Fourier modes in the azimuth φ about the
/// symmetry axis; the class fixes the mode order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Excitation {
    /// Azimuthal order 0 (vertical force, explosion)
    Monopole,
    /// Azimuthal order 1 (horizontal force)
    Dipole,
    /// Azimuthal order 2
    Quadpole,
}

impl Excitation {
    /// Parse the excitation name stored in a database
    pub fn parse(name: &str) -> Option<Self> {
        match normalized(name).as_str() {
            "monopole" => Some(Excitation::Monopole),
            "dipole" => Some(Excitation::Dipole),
            "quadpole" | "quadrupole" => Some(Excitation::Quadpole),
            _ => None,
        }
    }

    /// Fourier mode order in φ
    pub fn order(&self) -> u32 {
        match self {
            Excitation::Monopole => 0,
            Excitation::Dipole => 1,
            Excitation::Quadpole => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Excitation::Monopole => "monopole",
            Excitation::Dipole => "dipole",
            Excitation::Quadpole => "quadpole",
        }
    }
}

impl fmt::Display for Excitation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Layout of the fields dumped into a database
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DumpType {
    /// Raw displacement at every spectral grid point
    DisplacementOnly,
    /// Full wavefields (displacement and velocity)
    FullFields,
    /// Precomputed strain only
    StrainOnly,
    /// Anything else, kept verbatim
    Other(String),
}

impl DumpType {
    pub fn parse(name: &str) -> Self {
        match normalized(name).as_str() {
            "displ_only" => DumpType::DisplacementOnly,
            "fullfields" => DumpType::FullFields,
            "strain_only" => DumpType::StrainOnly,
            _ => DumpType::Other(name.trim().to_string()),
        }
    }

    /// Name as stored in a database
    pub fn as_str(&self) -> &str {
        match self {
            DumpType::DisplacementOnly => "displ_only",
            DumpType::FullFields => "fullfields",
            DumpType::StrainOnly => "strain_only",
            DumpType::Other(name) => name,
        }
    }

    /// Only nodal displacement dumps can be interpolated
    pub fn is_supported(&self) -> bool {
        matches!(self, DumpType::DisplacementOnly)
    }
}

impl fmt::Display for DumpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Displacement component stored per spectral grid point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DisplacementComponent {
    /// Cylindrical radial component
    S,
    /// Azimuthal component
    Phi,
    /// Axial component
    Z,
}

impl DisplacementComponent {
    pub const ALL: [DisplacementComponent; 3] = [
        DisplacementComponent::S,
        DisplacementComponent::Phi,
        DisplacementComponent::Z,
    ];

    /// Variable name in the snapshot store
    pub fn var_name(&self) -> &'static str {
        match self {
            DisplacementComponent::S => "disp_s",
            DisplacementComponent::Phi => "disp_p",
            DisplacementComponent::Z => "disp_z",
        }
    }

    /// Position in (s, φ, z) ordered buffers
    pub fn index(&self) -> usize {
        match self {
            DisplacementComponent::S => 0,
            DisplacementComponent::Phi => 1,
            DisplacementComponent::Z => 2,
        }
    }

    pub fn from_var_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.var_name() == name)
    }
}

fn normalized(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}
