//! Mesh data structures for axisymmetric spectral-element databases.
//!
//! This module provides the core data structures describing the 2-D (s, z)
//! meridional mesh a wavefield database was computed on: mesh points, spectral
//! elements and their connectivity.

use std::collections::HashMap;

/// A point of the meridional mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshPoint {
    /// Cylindrical radius (distance from the symmetry axis)
    pub s: f64,
    /// Coordinate along the symmetry axis
    pub z: f64,
}

impl MeshPoint {
    /// Create a new mesh point
    pub fn new(s: f64, z: f64) -> Self {
        Self { s, z }
    }

    /// Get coordinates as an array
    pub fn coords(&self) -> [f64; 2] {
        [self.s, self.z]
    }

    /// Spherical radius of the point
    pub fn radius(&self) -> f64 {
        self.s.hypot(self.z)
    }
}

/// Geometry class of a spectral element
///
/// Corner `k` of an element sits at reference corner
/// `(-1,-1), (1,-1), (1,1), (-1,1)` for `k = 0..3`. The "bottom" edge joins
/// corners 0 and 1 (η = -1), the "top" edge joins corners 3 and 2 (η = +1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementShape {
    /// Both bottom and top edges are arcs about the mesh origin
    Spheroidal,
    /// Bilinear quadrilateral
    Linear,
    /// Top (outer) edge is an arc, bottom edge is straight
    SemiCurvedOuter,
    /// Bottom (inner) edge is an arc, top edge is straight
    SemiCurvedInner,
}

impl ElementShape {
    /// Parse the numeric tag stored in a database
    pub fn from_tag(tag: i32) -> Option<Self> {
        match tag {
            0 => Some(ElementShape::Spheroidal),
            1 => Some(ElementShape::Linear),
            2 => Some(ElementShape::SemiCurvedOuter),
            3 => Some(ElementShape::SemiCurvedInner),
            _ => None,
        }
    }

    /// Numeric tag as stored in a database
    pub fn tag(&self) -> i32 {
        match self {
            ElementShape::Spheroidal => 0,
            ElementShape::Linear => 1,
            ElementShape::SemiCurvedOuter => 2,
            ElementShape::SemiCurvedInner => 3,
        }
    }

    /// Whether the bottom edge (corners 0 -> 1) is curved
    pub fn curved_bottom(&self) -> bool {
        matches!(self, ElementShape::Spheroidal | ElementShape::SemiCurvedInner)
    }

    /// Whether the top edge (corners 3 -> 2) is curved
    pub fn curved_top(&self) -> bool {
        matches!(self, ElementShape::Spheroidal | ElementShape::SemiCurvedOuter)
    }
}

/// A spectral element of the mesh
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralElement {
    /// Corner point ids in reference order
    pub corners: [usize; 4],
    /// Element geometry class
    pub shape: ElementShape,
    /// True if the element touches the symmetry axis (along ξ = -1)
    pub axial: bool,
    /// Spectral grid point ids, row-major with ξ index first: `grid[i * (npol + 1) + j]`
    pub grid: Vec<usize>,
}

impl SpectralElement {
    /// Create a new element
    pub fn new(corners: [usize; 4], shape: ElementShape, axial: bool, grid: Vec<usize>) -> Self {
        Self {
            corners,
            shape,
            axial,
            grid,
        }
    }

    /// Point id of the spectral grid node at (ξ index `i`, η index `j`)
    pub fn grid_point(&self, npol: usize, i: usize, j: usize) -> usize {
        self.grid[i * (npol + 1) + j]
    }

    /// Validate that the element carries a full spectral grid
    pub fn validate(&self, npol: usize) -> Result<(), String> {
        let expected = (npol + 1) * (npol + 1);
        if self.grid.len() != expected {
            return Err(format!(
                "Element has {} spectral grid points but npol={} requires {}",
                self.grid.len(),
                npol,
                expected
            ));
        }
        Ok(())
    }
}

/// Complete meridional mesh of one sub-database
#[derive(Debug, Clone)]
pub struct Mesh {
    /// All mesh points, indexed by point id
    pub points: Vec<MeshPoint>,
    /// All elements, indexed by element id
    pub elements: Vec<SpectralElement>,
    /// Polynomial order of the spectral elements
    pub npol: usize,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new(npol: usize) -> Self {
        Self {
            points: Vec::new(),
            elements: Vec::new(),
            npol,
        }
    }

    /// Add a point, returning its id
    pub fn add_point(&mut self, point: MeshPoint) -> usize {
        self.points.push(point);
        self.points.len() - 1
    }

    /// Add an element, returning its id
    pub fn add_element(&mut self, element: SpectralElement) -> Result<usize, String> {
        element.validate(self.npol)?;
        self.elements.push(element);
        Ok(self.elements.len() - 1)
    }

    /// Get a point by id
    pub fn point(&self, id: usize) -> Option<&MeshPoint> {
        self.points.get(id)
    }

    /// Get an element by id
    pub fn element(&self, id: usize) -> Option<&SpectralElement> {
        self.elements.get(id)
    }

    /// Corner coordinates of an element in reference order
    ///
    /// Only valid on a mesh that passed [`Mesh::validate`].
    pub fn corner_points(&self, element: &SpectralElement) -> [MeshPoint; 4] {
        element.corners.map(|id| self.points[id])
    }

    /// Representative point of each element (centroid of its corners)
    pub fn element_centroids(&self) -> Vec<[f64; 2]> {
        self.elements
            .iter()
            .map(|element| {
                let corners = self.corner_points(element);
                let s = corners.iter().map(|p| p.s).sum::<f64>() / 4.0;
                let z = corners.iter().map(|p| p.z).sum::<f64>() / 4.0;
                [s, z]
            })
            .collect()
    }

    /// Validate the mesh
    pub fn validate(&self) -> Result<(), String> {
        if self.npol == 0 {
            return Err("Polynomial order must be at least 1".to_string());
        }
        let num_points = self.points.len();
        for (elem_id, element) in self.elements.iter().enumerate() {
            element
                .validate(self.npol)
                .map_err(|msg| format!("Element {}: {}", elem_id, msg))?;
            for &point_id in element.corners.iter().chain(element.grid.iter()) {
                if point_id >= num_points {
                    return Err(format!(
                        "Element {} references non-existent point {}",
                        elem_id, point_id
                    ));
                }
            }
            // only axial elements may carry nodes on the symmetry axis
            if !element.axial
                && let Some(&point_id) = element.grid.iter().find(|&&id| self.points[id].s <= 0.0)
            {
                return Err(format!(
                    "Element {} is not flagged axial but grid point {} lies on the axis (s = {})",
                    elem_id, point_id, self.points[point_id].s
                ));
            }
        }
        Ok(())
    }

    /// Get mesh statistics
    pub fn statistics(&self) -> MeshStatistics {
        let mut shape_counts = HashMap::new();
        for element in &self.elements {
            *shape_counts.entry(element.shape).or_insert(0) += 1;
        }

        let (min_radius, max_radius) = self
            .points
            .iter()
            .map(MeshPoint::radius)
            .fold((f64::INFINITY, 0.0_f64), |(lo, hi), r| (lo.min(r), hi.max(r)));

        MeshStatistics {
            num_points: self.points.len(),
            num_elements: self.elements.len(),
            num_axial: self.elements.iter().filter(|e| e.axial).count(),
            min_radius: if self.points.is_empty() { 0.0 } else { min_radius },
            max_radius,
            shape_counts,
        }
    }
}

/// Mesh statistics for reporting
#[derive(Debug, Clone)]
pub struct MeshStatistics {
    /// Total number of points
    pub num_points: usize,
    /// Total number of elements
    pub num_elements: usize,
    /// Number of elements touching the axis
    pub num_axial: usize,
    /// Smallest spherical radius of any mesh point
    pub min_radius: f64,
    /// Largest spherical radius of any mesh point
    pub max_radius: f64,
    /// Count of each element shape
    pub shape_counts: HashMap<ElementShape, usize>,
}

impl MeshStatistics {
    /// Format as a human-readable string
    pub fn format(&self) -> String {
        let mut lines = vec![
            format!("Points: {}", self.num_points),
            format!("Elements: {}", self.num_elements),
            format!("Axial elements: {}", self.num_axial),
            format!("Radius: {:.1} - {:.1}", self.min_radius, self.max_radius),
        ];

        if !self.shape_counts.is_empty() {
            lines.push("Element shapes:".to_string());
            let mut shapes: Vec<_> = self.shape_counts.iter().collect();
            shapes.sort_by_key(|(k, _)| k.tag());
            for (shape, count) in shapes {
                lines.push(format!("  {:?}: {}", shape, count));
            }
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square(npol: usize) -> Mesh {
        let mut mesh = Mesh::new(npol);
        let ids = [
            mesh.add_point(MeshPoint::new(0.0, 0.0)),
            mesh.add_point(MeshPoint::new(1.0, 0.0)),
            mesh.add_point(MeshPoint::new(1.0, 1.0)),
            mesh.add_point(MeshPoint::new(0.0, 1.0)),
        ];
        // npol = 1: the spectral grid is the corners, [i][j] with i along ξ
        let grid = vec![ids[0], ids[3], ids[1], ids[2]];
        mesh.add_element(SpectralElement::new(ids, ElementShape::Linear, true, grid))
            .unwrap();
        mesh
    }

    #[test]
    fn point_radius() {
        let p = MeshPoint::new(3.0, 4.0);
        assert_eq!(p.coords(), [3.0, 4.0]);
        assert!((p.radius() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn shape_tags_roundtrip() {
        for tag in 0..4 {
            let shape = ElementShape::from_tag(tag).unwrap();
            assert_eq!(shape.tag(), tag);
        }
        assert_eq!(ElementShape::from_tag(7), None);
        assert!(ElementShape::Spheroidal.curved_bottom());
        assert!(ElementShape::Spheroidal.curved_top());
        assert!(!ElementShape::SemiCurvedOuter.curved_bottom());
        assert!(ElementShape::SemiCurvedInner.curved_bottom());
        assert!(!ElementShape::Linear.curved_top());
    }

    #[test]
    fn grid_point_lookup() {
        let mesh = unit_square(1);
        let element = &mesh.elements[0];
        assert_eq!(element.grid_point(1, 0, 0), 0);
        assert_eq!(element.grid_point(1, 0, 1), 3);
        assert_eq!(element.grid_point(1, 1, 0), 1);
        assert_eq!(element.grid_point(1, 1, 1), 2);
    }

    #[test]
    fn element_rejects_short_grid() {
        let mut mesh = Mesh::new(2);
        let bad = SpectralElement::new([0, 1, 2, 3], ElementShape::Linear, false, vec![0; 4]);
        assert!(mesh.add_element(bad).is_err());
    }

    #[test]
    fn mesh_validates_point_references() {
        let mut mesh = unit_square(1);
        mesh.elements[0].corners[2] = 9;
        let err = mesh.validate().unwrap_err();
        assert!(err.contains("non-existent point 9"));
    }

    #[test]
    fn mesh_rejects_axis_nodes_in_non_axial_element() {
        let mut mesh = unit_square(1);
        assert!(mesh.validate().is_ok());
        mesh.elements[0].axial = false;
        let err = mesh.validate().unwrap_err();
        assert!(err.contains("not flagged axial"));
    }

    #[test]
    fn mesh_rejects_zero_order() {
        let mesh = Mesh::new(0);
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn centroids_and_statistics() {
        let mesh = unit_square(1);
        assert_eq!(mesh.element_centroids(), vec![[0.5, 0.5]]);

        let stats = mesh.statistics();
        assert_eq!(stats.num_points, 4);
        assert_eq!(stats.num_elements, 1);
        assert_eq!(stats.num_axial, 1);
        assert!((stats.max_radius - 2.0_f64.sqrt()).abs() < 1e-12);
        assert_eq!(stats.min_radius, 0.0);
        assert_eq!(stats.shape_counts.get(&ElementShape::Linear), Some(&1));
        assert!(stats.format().contains("Elements: 1"));
    }
}
