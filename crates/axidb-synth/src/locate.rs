//! Element lookup: nearest candidates from the spatial index, first containing
//! element wins.

use axidb_model::Mesh;
use tracing::debug;

use crate::config::SynthConfig;
use crate::mapping::{ElementGeometry, inside_element};
use crate::spatial_index::KdTree;

/// Outcome of an element lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElementLocation {
    Found { element: usize, xi: f64, eta: f64 },
    NotFound,
}

impl ElementLocation {
    pub fn is_found(&self) -> bool {
        matches!(self, ElementLocation::Found { .. })
    }
}

/// Spatial index over the element centroids of a mesh
pub fn build_element_index(mesh: &Mesh) -> KdTree {
    KdTree::new(mesh.element_centroids())
}

/// Find the element containing (s, z) among the `config.k_nearest` elements
/// closest to it, trying them nearest-first.
///
/// `index` must have been built with [`build_element_index`] on the same mesh.
pub fn locate_element(
    mesh: &Mesh,
    index: &KdTree,
    s: f64,
    z: f64,
    config: &SynthConfig,
) -> ElementLocation {
    let candidates = index.nearest([s, z], config.k_nearest);
    let newton = config.newton();

    for &elem_id in &candidates {
        let Some(element) = mesh.element(elem_id) else {
            continue;
        };
        let geometry = ElementGeometry::new(mesh.corner_points(element), element.shape);
        let hit = inside_element(s, z, &geometry, config.tolerance, &newton);
        if hit.inside {
            debug!(
                candidates = candidates.len(),
                element = elem_id,
                xi = hit.xi,
                eta = hit.eta,
                "located element"
            );
            return ElementLocation::Found {
                element: elem_id,
                xi: hit.xi,
                eta: hit.eta,
            };
        }
    }

    debug!(s, z, candidates = candidates.len(), "no element contains point");
    ElementLocation::NotFound
}
