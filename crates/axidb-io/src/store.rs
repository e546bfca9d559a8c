//! Store abstraction over one force-orientation sub-database.

use std::fmt;
use std::path::Path;

use axidb_model::{DisplacementComponent, ElementShape, Mesh, MeshPoint, SpectralElement};
use serde::{Deserialize, Serialize};

use crate::error::{IoError, Result};

/// Read access to the mesh, scalar attributes and displacement snapshots of a
/// sub-database.
///
/// Implementations must be safe for concurrent reads; a database handle shares one
/// store between any number of queries.
pub trait WavefieldStore: Send + Sync + fmt::Debug {
    /// Scalar attributes of the sub-database
    fn attributes(&self) -> &StoreAttributes;

    /// Raw mesh arrays
    fn mesh_arrays(&self) -> &MeshArrays;

    /// Whether the given displacement variable is stored at all
    fn has_component(&self, component: DisplacementComponent) -> bool;

    /// Full time history of one displacement component at one spectral grid point
    ///
    /// Returns `Ok(None)` when the variable is absent from the store, meaning the
    /// component is identically zero. Samples are upcast to `f64`.
    fn read_displacement(
        &self,
        component: DisplacementComponent,
        point_id: usize,
    ) -> Result<Option<Vec<f64>>>;

    /// Size of the backing storage, if known
    fn size_in_bytes(&self) -> Option<u64> {
        None
    }

    /// Location of the backing storage, if any
    fn location(&self) -> Option<&Path> {
        None
    }
}

fn default_amplitude() -> f64 {
    1.0
}

fn default_planet_radius() -> f64 {
    6_371_000.0
}

fn default_format_version() -> u32 {
    1
}

fn unknown() -> String {
    "unknown".to_string()
}

/// Scalar attributes of a sub-database
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreAttributes {
    /// Polynomial order of the spectral elements
    pub npol: usize,
    /// Number of stored time samples
    pub ndumps: usize,
    /// Dump layout name (`displ_only`, ...)
    pub dump_type: String,
    /// Excitation class name (`monopole`, `dipole`, `quadpole`)
    pub excitation_type: String,
    /// Normalisation amplitude of the simulated source
    #[serde(default = "default_amplitude")]
    pub amplitude: f64,
    /// Sample interval of the stored snapshots [s]
    pub dt: f64,
    /// Planet radius [m]
    #[serde(default = "default_planet_radius")]
    pub planet_radius: f64,
    /// Depth of the simulated source [m]
    #[serde(default)]
    pub source_depth: f64,
    #[serde(default = "unknown")]
    pub background_model: String,
    #[serde(default)]
    pub attenuation: bool,
    /// Dominant period of the simulation [s]
    #[serde(default)]
    pub dominant_period: f64,
    #[serde(default = "unknown")]
    pub source_time_function: String,
    /// Time shift of the source time function [s]
    #[serde(default)]
    pub source_shift: f64,
    #[serde(default = "unknown")]
    pub time_scheme: String,
    #[serde(default = "unknown")]
    pub solver_version: String,
    #[serde(default = "unknown")]
    pub datetime: String,
    #[serde(default = "unknown")]
    pub compiler: String,
    #[serde(default = "unknown")]
    pub user: String,
    #[serde(default = "default_format_version")]
    pub format_version: u32,
}

impl StoreAttributes {
    /// Minimal attribute set for a nodal displacement dump
    pub fn new(npol: usize, ndumps: usize, excitation_type: impl Into<String>, dt: f64) -> Self {
        Self {
            npol,
            ndumps,
            dump_type: "displ_only".to_string(),
            excitation_type: excitation_type.into(),
            amplitude: default_amplitude(),
            dt,
            planet_radius: default_planet_radius(),
            source_depth: 0.0,
            background_model: unknown(),
            attenuation: false,
            dominant_period: 0.0,
            source_time_function: unknown(),
            source_shift: 0.0,
            time_scheme: unknown(),
            solver_version: unknown(),
            datetime: unknown(),
            compiler: unknown(),
            user: unknown(),
            format_version: default_format_version(),
        }
    }
}

/// Mesh arrays as laid out in a database
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MeshArrays {
    /// s coordinate of every point
    #[serde(rename = "mesh_S")]
    pub mesh_s: Vec<f64>,
    /// z coordinate of every point
    #[serde(rename = "mesh_Z")]
    pub mesh_z: Vec<f64>,
    /// Corner point ids per element
    pub fem_mesh: Vec<[usize; 4]>,
    /// Element shape tag per element
    pub eltype: Vec<i32>,
    /// Axis flag per element (non-zero for axial elements)
    pub axis: Vec<i32>,
    /// Spectral grid point ids per element, `[element][i][j]` with i along ξ
    pub sem_mesh: Vec<Vec<Vec<usize>>>,
}

impl MeshArrays {
    /// Number of mesh points
    pub fn num_points(&self) -> usize {
        self.mesh_s.len()
    }

    /// Number of elements
    pub fn num_elements(&self) -> usize {
        self.fem_mesh.len()
    }

    /// Build and validate the mesh these arrays describe
    pub fn to_mesh(&self, npol: usize) -> Result<Mesh> {
        if self.mesh_s.len() != self.mesh_z.len() {
            return Err(IoError::InvalidData(format!(
                "mesh_S has {} entries but mesh_Z has {}",
                self.mesh_s.len(),
                self.mesh_z.len()
            )));
        }
        let nelem = self.fem_mesh.len();
        if self.eltype.len() != nelem || self.axis.len() != nelem || self.sem_mesh.len() != nelem {
            return Err(IoError::InvalidData(format!(
                "Element arrays disagree: fem_mesh={}, eltype={}, axis={}, sem_mesh={}",
                nelem,
                self.eltype.len(),
                self.axis.len(),
                self.sem_mesh.len()
            )));
        }

        let mut mesh = Mesh::new(npol);
        mesh.points = self
            .mesh_s
            .iter()
            .zip(&self.mesh_z)
            .map(|(&s, &z)| MeshPoint::new(s, z))
            .collect();

        for (elem_id, corners) in self.fem_mesh.iter().enumerate() {
            let shape = ElementShape::from_tag(self.eltype[elem_id]).ok_or_else(|| {
                IoError::InvalidData(format!(
                    "Element {} has unknown element type {}",
                    elem_id, self.eltype[elem_id]
                ))
            })?;
            let rows = &self.sem_mesh[elem_id];
            if rows.len() != npol + 1 || rows.iter().any(|row| row.len() != npol + 1) {
                return Err(IoError::InvalidData(format!(
                    "Element {} spectral grid is not {}x{}",
                    elem_id,
                    npol + 1,
                    npol + 1
                )));
            }
            let grid = rows.iter().flatten().copied().collect();
            let element = SpectralElement::new(*corners, shape, self.axis[elem_id] != 0, grid);
            mesh.add_element(element).map_err(IoError::InvalidData)?;
        }

        mesh.validate().map_err(IoError::InvalidData)?;
        Ok(mesh)
    }
}
