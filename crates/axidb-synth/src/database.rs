//! Reciprocal database handle: open, query, close.
//!
//! A reciprocal database holds two sub-databases computed for a unit force at
//! the receiver: `PX` (horizontal force, dipole excitation) and `PZ` (vertical
//! force, monopole excitation). A seismogram component at the receiver is the
//! source contracted against the strain (moment sources) or displacement
//! (force sources) of the matching sub-database at the source location.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use axidb_io::{ORDERED_OUTPUT_FILE, OrderedOutput, WavefieldStore};
use axidb_model::{DisplacementComponent, DumpType, Excitation, Mesh};
use nalgebra::Vector3;
use ndarray::{Array1, Array2, Array4, ArrayView1, s};
use tracing::{debug, info, warn};

use crate::basis::SpectralBasis;
use crate::config::SynthConfig;
use crate::contraction::{contract_displacement, contract_strain};
use crate::error::{Result, SynthError};
use crate::info::DatabaseInfo;
use crate::locate::{ElementLocation, build_element_index, locate_element};
use crate::mapping::ElementGeometry;
use crate::rotations::{AzimuthalKind, FrameChain, azimuth_factor, rotate_frame};
use crate::seismogram::{
    Component, MeshPosition, PrecisionWarning, SeismogramKind, Seismograms, SubDatabaseKind,
};
use crate::source::{Receiver, SeismicSource};
use crate::spatial_index::KdTree;
use crate::strain::{derive_strain, interpolate_components};

/// One force orientation of a reciprocal database with its mesh, element
/// index and spectral basis
#[derive(Debug)]
pub struct SubDatabase {
    kind: SubDatabaseKind,
    store: Box<dyn WavefieldStore>,
    mesh: Mesh,
    index: KdTree,
    basis: SpectralBasis,
    excitation: Option<Excitation>,
    dump_type: DumpType,
    amplitude: f64,
}

impl SubDatabase {
    /// Build the mesh, element index and basis of a store
    pub fn new(kind: SubDatabaseKind, store: Box<dyn WavefieldStore>) -> Result<Self> {
        let attrs = store.attributes();
        let mesh = store.mesh_arrays().to_mesh(attrs.npol)?;
        if !attrs.amplitude.is_finite() || attrs.amplitude == 0.0 {
            return Err(SynthError::Configuration(format!(
                "{} sub-database has invalid amplitude {}",
                kind.dir_name(),
                attrs.amplitude
            )));
        }
        if attrs.ndumps == 0 || !attrs.dt.is_finite() || attrs.dt <= 0.0 {
            return Err(SynthError::Configuration(format!(
                "{} sub-database needs ndumps > 0 and dt > 0 (ndumps={}, dt={})",
                kind.dir_name(),
                attrs.ndumps,
                attrs.dt
            )));
        }

        let excitation = Excitation::parse(&attrs.excitation_type);
        let dump_type = DumpType::parse(&attrs.dump_type);
        let amplitude = attrs.amplitude;
        let index = build_element_index(&mesh);
        let basis = SpectralBasis::new(attrs.npol);

        debug!(
            sub_database = kind.dir_name(),
            npol = attrs.npol,
            "built element index\n{}",
            mesh.statistics().format()
        );

        Ok(Self {
            kind,
            store,
            mesh,
            index,
            basis,
            excitation,
            dump_type,
            amplitude,
        })
    }

    pub fn kind(&self) -> SubDatabaseKind {
        self.kind
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn excitation(&self) -> Option<Excitation> {
        self.excitation
    }

    pub fn dump_type(&self) -> &DumpType {
        &self.dump_type
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    pub fn ndumps(&self) -> usize {
        self.store.attributes().ndumps
    }

    pub fn dt(&self) -> f64 {
        self.store.attributes().dt
    }

    /// Excitation class of the stored field, if this sub-database can be
    /// interpolated at all
    pub fn queryable_excitation(&self) -> Result<Excitation> {
        if !self.dump_type.is_supported() {
            return Err(SynthError::UnsupportedCapability(format!(
                "{} sub-database has dump type '{}', only 'displ_only' can be interpolated",
                self.kind.dir_name(),
                self.dump_type
            )));
        }
        self.excitation.ok_or_else(|| {
            SynthError::UnsupportedCapability(format!(
                "{} sub-database has excitation type '{}' without a strain formula",
                self.kind.dir_name(),
                self.store.attributes().excitation_type
            ))
        })
    }

    pub fn locate(&self, s: f64, z: f64, config: &SynthConfig) -> ElementLocation {
        locate_element(&self.mesh, &self.index, s, z, config)
    }

    /// Nodal displacement history `(ndumps, npol+1 [ξ], npol+1 [η], 3)` of an element
    pub fn element_displacement(&self, element_id: usize) -> Result<Array4<f64>> {
        let element = self.mesh.element(element_id).ok_or_else(|| {
            SynthError::InvalidInput(format!("Element {} does not exist", element_id))
        })?;
        let npol = self.mesh.npol;
        let ndumps = self.ndumps();
        let mut buffer = Array4::<f64>::zeros((ndumps, npol + 1, npol + 1, 3));

        for component in DisplacementComponent::ALL {
            if !self.store.has_component(component) {
                continue;
            }
            for i in 0..=npol {
                for j in 0..=npol {
                    let point_id = element.grid_point(npol, i, j);
                    let Some(trace) = self.store.read_displacement(component, point_id)? else {
                        continue;
                    };
                    if trace.len() != ndumps {
                        return Err(SynthError::Store(axidb_io::IoError::InvalidData(format!(
                            "{} at point {} has {} samples, expected {}",
                            component.var_name(),
                            point_id,
                            trace.len(),
                            ndumps
                        ))));
                    }
                    buffer
                        .slice_mut(s![.., i, j, component.index()])
                        .assign(&ArrayView1::from(trace.as_slice()));
                }
            }
        }
        Ok(buffer)
    }

    fn element_geometry(&self, element_id: usize) -> Result<(ElementGeometry, bool)> {
        let element = self.mesh.element(element_id).ok_or_else(|| {
            SynthError::InvalidInput(format!("Element {} does not exist", element_id))
        })?;
        let corners = self.mesh.corner_points(element);
        Ok((ElementGeometry::new(corners, element.shape), element.axial))
    }

    /// Strain `(ndumps, 6)` at (ξ, η) of an element
    pub fn strain_at(
        &self,
        excitation: Excitation,
        element_id: usize,
        xi: f64,
        eta: f64,
    ) -> Result<Array2<f64>> {
        let (geometry, axial) = self.element_geometry(element_id)?;
        let (xi_points, eta_points) = self.basis.element_point_sets(axial);
        let displacement = self.element_displacement(element_id)?;
        let strain = derive_strain(
            excitation,
            displacement.view(),
            &geometry,
            xi_points,
            eta_points,
            axial,
        )?;
        Ok(interpolate_components(strain.view(), xi_points, eta_points, xi, eta))
    }

    /// Displacement `(ndumps, 3)` at (ξ, η) of an element
    pub fn displacement_at(&self, element_id: usize, xi: f64, eta: f64) -> Result<Array2<f64>> {
        let (_, axial) = self.element_geometry(element_id)?;
        let (xi_points, eta_points) = self.basis.element_point_sets(axial);
        let displacement = self.element_displacement(element_id)?;
        Ok(interpolate_components(displacement.view(), xi_points, eta_points, xi, eta))
    }
}

/// Field interpolated at the source position in one sub-database
enum SourceField {
    /// Strain `(ndumps, 6)`
    Strain(Array2<f64>),
    /// Displacement `(ndumps, 3)`
    Displacement(Array2<f64>),
}

/// Handle on a reciprocal database
///
/// Read-only after open; queries may run concurrently from any number of
/// threads.
#[derive(Debug)]
pub struct ReciprocalDb {
    px: SubDatabase,
    pz: SubDatabase,
    config: SynthConfig,
    info: DatabaseInfo,
}

impl ReciprocalDb {
    /// Open the database in `folder` with default settings
    ///
    /// Expects `PX/Data/ordered_output.json` and `PZ/Data/ordered_output.json`.
    pub fn open(folder: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(folder, SynthConfig::default())
    }

    pub fn open_with_config(folder: impl AsRef<Path>, config: SynthConfig) -> Result<Self> {
        config.validate()?;
        let folder = folder.as_ref();

        let mut files = Vec::with_capacity(2);
        for kind in [SubDatabaseKind::Px, SubDatabaseKind::Pz] {
            let dir = folder.join(kind.dir_name());
            if !dir.is_dir() {
                return Err(SynthError::Configuration(format!(
                    "Expecting the 'PX' and 'PZ' sub-databases in {}",
                    folder.display()
                )));
            }
            let file = dir.join("Data").join(ORDERED_OUTPUT_FILE);
            if !file.is_file() {
                return Err(SynthError::Configuration(format!(
                    "{} must exist in the PX/Data and PZ/Data directories of {}",
                    ORDERED_OUTPUT_FILE,
                    folder.display()
                )));
            }
            files.push(file);
        }

        let px = OrderedOutput::load(&files[0])?;
        let pz = OrderedOutput::load(&files[1])?;
        Self::build(Box::new(px), Box::new(pz), config, Some(folder.to_path_buf()))
    }

    /// Wrap already opened stores
    pub fn from_stores(
        px: Box<dyn WavefieldStore>,
        pz: Box<dyn WavefieldStore>,
        config: SynthConfig,
    ) -> Result<Self> {
        config.validate()?;
        Self::build(px, pz, config, None)
    }

    fn build(
        px: Box<dyn WavefieldStore>,
        pz: Box<dyn WavefieldStore>,
        config: SynthConfig,
        directory: Option<PathBuf>,
    ) -> Result<Self> {
        let px = SubDatabase::new(SubDatabaseKind::Px, px)?;
        let pz = SubDatabase::new(SubDatabaseKind::Pz, pz)?;

        let (a, b) = (px.store.attributes(), pz.store.attributes());
        if a.ndumps != b.ndumps || (a.dt - b.dt).abs() > 1e-9 * a.dt.abs() {
            return Err(SynthError::Configuration(format!(
                "PX and PZ sub-databases disagree on sampling: ndumps {} vs {}, dt {} vs {}",
                a.ndumps, b.ndumps, a.dt, b.dt
            )));
        }

        let filesize = px.store.size_in_bytes().unwrap_or(0) + pz.store.size_in_bytes().unwrap_or(0);
        let info = DatabaseInfo::reciprocal(a, b, &px.mesh, directory, filesize);

        info!(
            elements = px.mesh.elements.len(),
            npol = a.npol,
            ndumps = a.ndumps,
            px_excitation = %a.excitation_type,
            pz_excitation = %b.excitation_type,
            "opened reciprocal database"
        );

        Ok(Self {
            px,
            pz,
            config,
            info,
        })
    }

    pub fn info(&self) -> &DatabaseInfo {
        &self.info
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    pub fn sub_database(&self, kind: SubDatabaseKind) -> &SubDatabase {
        match kind {
            SubDatabaseKind::Px => &self.px,
            SubDatabaseKind::Pz => &self.pz,
        }
    }

    /// Single displacement trace of one component
    pub fn get_seismogram(
        &self,
        source: impl Into<SeismicSource>,
        receiver: &Receiver,
        component: Component,
    ) -> Result<Array1<f64>> {
        let mut seismograms =
            self.get_seismograms(source, receiver, &[component], SeismogramKind::Displacement)?;
        seismograms.traces.remove(&component).ok_or_else(|| {
            SynthError::InvalidInput(format!("No trace computed for component {}", component))
        })
    }

    /// Traces of the requested components at the receiver for the source
    pub fn get_seismograms(
        &self,
        source: impl Into<SeismicSource>,
        receiver: &Receiver,
        components: &[Component],
        kind: SeismogramKind,
    ) -> Result<Seismograms> {
        let source = source.into();
        source.validate()?;
        receiver.validate()?;
        let components: BTreeSet<Component> = components.iter().copied().collect();
        if components.is_empty() {
            return Err(SynthError::InvalidInput(
                "At least one component must be requested".to_string(),
            ));
        }

        // capability guards before any geometry work
        let kinds: BTreeSet<SubDatabaseKind> =
            components.iter().map(Component::sub_database).collect();
        let mut excitations = BTreeMap::new();
        for &sub_kind in &kinds {
            let excitation = self.sub_database(sub_kind).queryable_excitation()?;
            excitations.insert(sub_kind, excitation);
        }

        let mut warnings = Vec::new();
        if let Some(depth) = receiver.depth_in_m {
            let warning = PrecisionWarning::ReceiverDepthIgnored { requested_m: depth };
            warn!("{}", warning);
            warnings.push(warning);
        }

        let planet_radius = self.px.store.attributes().planet_radius;
        if source.depth_in_m() >= planet_radius {
            return Err(SynthError::InvalidInput(format!(
                "Source depth {} m exceeds the planet radius {} m",
                source.depth_in_m(),
                planet_radius
            )));
        }

        let [x, y, z] = source.cartesian(planet_radius);
        let coords = rotate_frame(x, y, z, receiver.longitude, receiver.colatitude());
        let chain = FrameChain {
            source_longitude: source.longitude().to_radians(),
            source_colatitude: source.colatitude().to_radians(),
            receiver_longitude: receiver.longitude.to_radians(),
            receiver_colatitude: receiver.colatitude().to_radians(),
            azimuth: coords.phi,
        };

        let mut positions = BTreeMap::new();
        let mut fields = BTreeMap::new();
        for (&sub_kind, &excitation) in &excitations {
            let sub = self.sub_database(sub_kind);
            let (element, xi, eta) = match sub.locate(coords.s, coords.z, &self.config) {
                ElementLocation::Found { element, xi, eta } => (element, xi, eta),
                ElementLocation::NotFound => {
                    return Err(SynthError::GeometryNotFound {
                        s: coords.s,
                        z: coords.z,
                        candidates: self.config.k_nearest.min(sub.mesh.elements.len()),
                    });
                }
            };
            positions.insert(
                sub_kind,
                MeshPosition {
                    element,
                    xi,
                    eta,
                    s: coords.s,
                    z: coords.z,
                    phi: coords.phi,
                },
            );
            let field = match source {
                SeismicSource::Moment(_) => {
                    SourceField::Strain(sub.strain_at(excitation, element, xi, eta)?)
                }
                SeismicSource::Force(_) => {
                    SourceField::Displacement(sub.displacement_at(element, xi, eta)?)
                }
            };
            fields.insert(sub_kind, field);
        }

        let dt = self.px.dt();
        let mut traces = BTreeMap::new();
        for &component in &components {
            let sub_kind = component.sub_database();
            let sub = self.sub_database(sub_kind);
            let (Some(field), Some(&excitation)) = (fields.get(&sub_kind), excitations.get(&sub_kind))
            else {
                continue;
            };

            let f = component.receiver_force();
            let fac_even = azimuth_factor(coords.phi, &f, excitation, AzimuthalKind::Even);
            let fac_odd = azimuth_factor(coords.phi, &f, excitation, AzimuthalKind::Odd);

            let trace = match (&source, field) {
                (SeismicSource::Moment(moment), SourceField::Strain(strain)) => {
                    let mut mij = chain.forward_tensor(&moment.tensor_voigt());
                    mij.iter_mut().for_each(|m| *m /= sub.amplitude);
                    contract_strain(strain.view(), &mij, fac_even, fac_odd)
                }
                (SeismicSource::Force(force), SourceField::Displacement(displacement)) => {
                    let rotated = chain.forward_vector(&Vector3::from(force.force_cartesian()))
                        / sub.amplitude;
                    contract_displacement(
                        displacement.view(),
                        &[rotated.x, rotated.y, rotated.z],
                        fac_even,
                        fac_odd,
                    )
                }
                _ => {
                    return Err(SynthError::InvalidInput(
                        "Source type does not match the interpolated field".to_string(),
                    ));
                }
            };
            traces.insert(component, kind.apply(trace * component.sign(), dt));
        }

        Ok(Seismograms {
            kind,
            dt,
            traces,
            warnings,
            positions,
        })
    }

    /// Release the stores, meshes and indices
    pub fn close(self) {
        info!(
            directory = ?self.info.directory,
            "closed reciprocal database"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn handle_is_shareable_across_threads() {
        assert_send_sync::<ReciprocalDb>();
        assert_send_sync::<SubDatabase>();
    }
}
