//! Synthetic meshes and stores shared by the integration tests.

#![allow(dead_code)]

use std::path::Path;

use axidb_io::{MeshArrays, OrderedOutput, StoreAttributes};
use axidb_model::{DisplacementComponent, ElementShape, MeshPoint};
use axidb_synth::{ElementGeometry, SpectralBasis};

/// Element description before its spectral grid is laid out
pub struct ElementSpec {
    pub corners: [MeshPoint; 4],
    pub shape: ElementShape,
    pub axial: bool,
}

/// Lay out mesh arrays with an independent spectral grid per element
///
/// Corner ids point at the grid nodes sitting on the element corners.
pub fn mesh_arrays(npol: usize, elements: &[ElementSpec]) -> MeshArrays {
    let basis = SpectralBasis::new(npol);
    let mut arrays = MeshArrays::default();
    for spec in elements {
        let geometry = ElementGeometry::new(spec.corners, spec.shape);
        let (xi_points, eta_points) = basis.element_point_sets(spec.axial);
        let mut rows = Vec::with_capacity(npol + 1);
        for &xi in xi_points.nodes() {
            let mut row = Vec::with_capacity(npol + 1);
            for &eta in eta_points.nodes() {
                let [s, z] = geometry.map(xi, eta);
                // pin axis nodes exactly onto the axis
                let s = if spec.axial && xi == -1.0 { 0.0 } else { s };
                row.push(arrays.mesh_s.len());
                arrays.mesh_s.push(s);
                arrays.mesh_z.push(z);
            }
            rows.push(row);
        }
        arrays
            .fem_mesh
            .push([rows[0][0], rows[npol][0], rows[npol][npol], rows[0][npol]]);
        arrays.eltype.push(spec.shape.tag());
        arrays.axis.push(i32::from(spec.axial));
        arrays.sem_mesh.push(rows);
    }
    arrays
}

/// Linear elements on the rectangular grid spanned by `s_edges` x `z_edges`;
/// the column starting at s = 0 is axial
pub fn linear_grid(npol: usize, s_edges: &[f64], z_edges: &[f64]) -> MeshArrays {
    let mut elements = Vec::new();
    for z in z_edges.windows(2) {
        for s in s_edges.windows(2) {
            elements.push(ElementSpec {
                corners: [
                    MeshPoint::new(s[0], z[0]),
                    MeshPoint::new(s[1], z[0]),
                    MeshPoint::new(s[1], z[1]),
                    MeshPoint::new(s[0], z[1]),
                ],
                shape: ElementShape::Linear,
                axial: s[0] == 0.0,
            });
        }
    }
    mesh_arrays(npol, &elements)
}

/// Spheroidal elements covering colatitudes [0, 90] deg between the given radii;
/// the column touching θ = 0 is axial
pub fn quarter_annulus(npol: usize, radii: &[f64], ntheta: usize) -> MeshArrays {
    let polar = |r: f64, theta: f64| MeshPoint::new(r * theta.sin(), r * theta.cos());
    let dtheta = std::f64::consts::FRAC_PI_2 / ntheta as f64;
    let mut elements = Vec::new();
    for r in radii.windows(2) {
        for k in 0..ntheta {
            let (ta, tb) = (k as f64 * dtheta, (k + 1) as f64 * dtheta);
            let mut corners = [polar(r[0], ta), polar(r[0], tb), polar(r[1], tb), polar(r[1], ta)];
            if k == 0 {
                corners[0].s = 0.0;
                corners[3].s = 0.0;
            }
            elements.push(ElementSpec {
                corners,
                shape: ElementShape::Spheroidal,
                axial: k == 0,
            });
        }
    }
    mesh_arrays(npol, &elements)
}

/// Store sampling `field(s, z, t) -> (U_s, U_φ, U_z)` at every grid point
///
/// Components listed in `stored` are written, the others are left absent.
pub fn store_with_field(
    mesh: MeshArrays,
    npol: usize,
    ndumps: usize,
    excitation: &str,
    stored: &[DisplacementComponent],
    field: impl Fn(f64, f64, usize) -> [f64; 3],
) -> OrderedOutput {
    let attributes = StoreAttributes::new(npol, ndumps, excitation, 0.5);
    let mut store = OrderedOutput::new(attributes, mesh);
    for &component in stored {
        let data = (0..ndumps)
            .map(|t| {
                store
                    .mesh
                    .mesh_s
                    .iter()
                    .zip(&store.mesh.mesh_z)
                    .map(|(&s, &z)| field(s, z, t)[component.index()] as f32)
                    .collect()
            })
            .collect();
        store.insert_component(component, data);
    }
    store
}

/// Store with no displacement variables (identically zero field)
pub fn empty_store(mesh: MeshArrays, npol: usize, ndumps: usize, excitation: &str) -> OrderedOutput {
    store_with_field(mesh, npol, ndumps, excitation, &[], |_, _, _| [0.0; 3])
}

/// Write a PX/PZ database layout below `root`
pub fn write_database(root: &Path, px: &OrderedOutput, pz: &OrderedOutput) {
    px.save(root.join("PX").join("Data").join("ordered_output.json"))
        .expect("write PX store");
    pz.save(root.join("PZ").join("Data").join("ordered_output.json"))
        .expect("write PZ store");
}

/// Latitude [deg] and depth [m] that put a source at meridional position
/// (s, z) of a receiver at the north pole, for a planet of the given radius
pub fn source_position(s: f64, z: f64, planet_radius: f64) -> (f64, f64) {
    let colatitude = s.atan2(z).to_degrees();
    (90.0 - colatitude, planet_radius - s.hypot(z))
}
