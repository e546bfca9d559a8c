//! JSON `ordered_output.json` store: one self-contained file per sub-database.
//!
//! Snapshots are kept in single precision, `snapshots[var][time][point]`, the
//! same point-major ordering a database writes its displacement dumps in.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use axidb_model::DisplacementComponent;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{IoError, Result};
use crate::store::{MeshArrays, StoreAttributes, WavefieldStore};

/// File name of a sub-database inside its `Data` directory
pub const ORDERED_OUTPUT_FILE: &str = "ordered_output.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderedOutput {
    pub attributes: StoreAttributes,
    pub mesh: MeshArrays,
    /// Displacement variables by name; an absent variable is identically zero
    #[serde(default)]
    pub snapshots: BTreeMap<String, Vec<Vec<f32>>>,
    #[serde(skip)]
    path: Option<PathBuf>,
    #[serde(skip)]
    file_size: Option<u64>,
}

impl OrderedOutput {
    /// Create an in-memory store without any snapshot variables
    pub fn new(attributes: StoreAttributes, mesh: MeshArrays) -> Self {
        Self {
            attributes,
            mesh,
            snapshots: BTreeMap::new(),
            path: None,
            file_size: None,
        }
    }

    /// Insert one displacement variable, `data[time][point]`
    pub fn insert_component(&mut self, component: DisplacementComponent, data: Vec<Vec<f32>>) {
        self.snapshots.insert(component.var_name().to_string(), data);
    }

    /// Check that every snapshot variable matches `ndumps` x `npoints`
    pub fn validate(&self) -> Result<()> {
        let npoints = self.mesh.num_points();
        for (name, rows) in &self.snapshots {
            if DisplacementComponent::from_var_name(name).is_none() {
                return Err(IoError::InvalidData(format!(
                    "Unknown snapshot variable '{}'",
                    name
                )));
            }
            if rows.len() != self.attributes.ndumps {
                return Err(IoError::InvalidData(format!(
                    "Variable '{}' has {} time samples but ndumps={}",
                    name,
                    rows.len(),
                    self.attributes.ndumps
                )));
            }
            if let Some(row) = rows.iter().find(|row| row.len() != npoints) {
                return Err(IoError::InvalidData(format!(
                    "Variable '{}' has a snapshot of {} points but the mesh has {}",
                    name,
                    row.len(),
                    npoints
                )));
            }
        }
        Ok(())
    }

    /// Load and validate a store from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(IoError::FileNotFound(path.display().to_string()));
        }
        let bytes = fs::read(path)?;
        let mut store: OrderedOutput = serde_json::from_slice(&bytes)?;
        store.validate()?;
        store.path = Some(path.to_path_buf());
        store.file_size = Some(bytes.len() as u64);
        debug!(
            path = %path.display(),
            npoints = store.mesh.num_points(),
            nelem = store.mesh.num_elements(),
            "loaded wavefield store"
        );
        Ok(store)
    }

    /// Write the store to disk, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec(self)?;
        fs::write(path, bytes)?;
        Ok(())
    }
}

impl WavefieldStore for OrderedOutput {
    fn attributes(&self) -> &StoreAttributes {
        &self.attributes
    }

    fn mesh_arrays(&self) -> &MeshArrays {
        &self.mesh
    }

    fn has_component(&self, component: DisplacementComponent) -> bool {
        self.snapshots.contains_key(component.var_name())
    }

    fn read_displacement(
        &self,
        component: DisplacementComponent,
        point_id: usize,
    ) -> Result<Option<Vec<f64>>> {
        let Some(rows) = self.snapshots.get(component.var_name()) else {
            return Ok(None);
        };
        let npoints = self.mesh.num_points();
        if point_id >= npoints {
            return Err(IoError::PointOutOfBounds {
                point: point_id,
                npoints,
            });
        }
        rows.iter()
            .map(|row| {
                row.get(point_id).map(|&v| f64::from(v)).ok_or_else(|| {
                    IoError::InvalidData(format!(
                        "Snapshot of '{}' is shorter than point {}",
                        component.var_name(),
                        point_id
                    ))
                })
            })
            .collect::<Result<Vec<f64>>>()
            .map(Some)
    }

    fn size_in_bytes(&self) -> Option<u64> {
        self.file_size
    }

    fn location(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
