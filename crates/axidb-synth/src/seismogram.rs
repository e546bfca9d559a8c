//! Seismogram components, kinds and query results.

use std::collections::BTreeMap;
use std::fmt;

use ndarray::Array1;

use crate::error::{Result, SynthError};

/// Force orientation of a sub-database of a reciprocal database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SubDatabaseKind {
    /// Horizontal force at the receiver
    Px,
    /// Vertical force at the receiver
    Pz,
}

impl SubDatabaseKind {
    /// Directory name below the database folder
    pub fn dir_name(&self) -> &'static str {
        match self {
            SubDatabaseKind::Px => "PX",
            SubDatabaseKind::Pz => "PZ",
        }
    }
}

/// Seismogram component at the receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Component {
    /// Vertical, positive up
    Z,
    /// North
    N,
    /// East
    E,
}

impl Component {
    pub const ALL: [Component; 3] = [Component::Z, Component::N, Component::E];

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim() {
            "Z" | "z" => Some(Component::Z),
            "N" | "n" => Some(Component::N),
            "E" | "e" => Some(Component::E),
            _ => None,
        }
    }

    pub fn code(&self) -> char {
        match self {
            Component::Z => 'Z',
            Component::N => 'N',
            Component::E => 'E',
        }
    }

    /// Sub-database holding the reciprocal wavefield of this component
    pub fn sub_database(&self) -> SubDatabaseKind {
        match self {
            Component::Z => SubDatabaseKind::Pz,
            Component::N | Component::E => SubDatabaseKind::Px,
        }
    }

    /// Receiver force weights `[f0, f1, f2]` fed to [`azimuth_factor`]
    ///
    /// `f0` weights cos mφ and `f1` weights sin mφ in the even factor of the
    /// horizontal (PX) field, `f2` weights the vertical (PZ) field. E takes
    /// `f0`; N takes `f1` and is flipped by [`Component::sign`].
    ///
    /// [`azimuth_factor`]: crate::rotations::azimuth_factor
    pub fn receiver_force(&self) -> [f64; 3] {
        match self {
            Component::Z => [0.0, 0.0, 1.0],
            Component::N => [0.0, 1.0, 0.0],
            Component::E => [1.0, 0.0, 0.0],
        }
    }

    /// Overall sign applied to the contracted trace
    pub fn sign(&self) -> f64 {
        match self {
            Component::N => -1.0,
            Component::Z | Component::E => 1.0,
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Physical quantity of the returned traces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SeismogramKind {
    #[default]
    Displacement,
    Velocity,
    Acceleration,
}

impl SeismogramKind {
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "displacement" => Ok(SeismogramKind::Displacement),
            "velocity" => Ok(SeismogramKind::Velocity),
            "acceleration" => Ok(SeismogramKind::Acceleration),
            other => Err(SynthError::InvalidInput(format!("Unknown kind '{}'", other))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SeismogramKind::Displacement => "displacement",
            SeismogramKind::Velocity => "velocity",
            SeismogramKind::Acceleration => "acceleration",
        }
    }

    /// Number of time derivatives taken of a displacement trace
    pub fn derivative_order(&self) -> usize {
        match self {
            SeismogramKind::Displacement => 0,
            SeismogramKind::Velocity => 1,
            SeismogramKind::Acceleration => 2,
        }
    }

    /// Convert a displacement trace sampled at `dt` into this kind
    pub fn apply(&self, displacement: Array1<f64>, dt: f64) -> Array1<f64> {
        (0..self.derivative_order()).fold(displacement, |trace, _| time_derivative(&trace, dt))
    }
}

impl fmt::Display for SeismogramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Time derivative with second-order central differences inside and
/// first-order one-sided differences at both ends
pub fn time_derivative(trace: &Array1<f64>, dt: f64) -> Array1<f64> {
    let n = trace.len();
    let mut out = Array1::<f64>::zeros(n);
    if n < 2 {
        return out;
    }
    out[0] = (trace[1] - trace[0]) / dt;
    out[n - 1] = (trace[n - 1] - trace[n - 2]) / dt;
    for i in 1..n - 1 {
        out[i] = (trace[i + 1] - trace[i - 1]) / (2.0 * dt);
    }
    out
}

/// Non-fatal deviation between the request and what the database can serve
#[derive(Debug, Clone, PartialEq)]
pub enum PrecisionWarning {
    /// The receiver depth is fixed by a reciprocal database
    ReceiverDepthIgnored { requested_m: f64 },
}

impl fmt::Display for PrecisionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrecisionWarning::ReceiverDepthIgnored { requested_m } => write!(
                f,
                "Receiver depth cannot be changed when reading from a reciprocal database \
                 ({} m requested); using the depth of the database",
                requested_m
            ),
        }
    }
}

/// Where the receiver landed in the mesh of one sub-database
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshPosition {
    pub element: usize,
    pub xi: f64,
    pub eta: f64,
    pub s: f64,
    pub z: f64,
    pub phi: f64,
}

/// Traces of one query
#[derive(Debug, Clone, PartialEq)]
pub struct Seismograms {
    pub kind: SeismogramKind,
    /// Sample interval [s]
    pub dt: f64,
    pub traces: BTreeMap<Component, Array1<f64>>,
    pub warnings: Vec<PrecisionWarning>,
    pub positions: BTreeMap<SubDatabaseKind, MeshPosition>,
}

impl Seismograms {
    pub fn trace(&self, component: Component) -> Option<&Array1<f64>> {
        self.traces.get(&component)
    }

    /// Number of samples per trace
    pub fn npts(&self) -> usize {
        self.traces.values().next().map_or(0, |t| t.len())
    }
}
