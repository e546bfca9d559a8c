//! Finite-element mapping between reference (ξ, η) and meridional (s, z) coordinates.
//!
//! An element is the linear blend in η of its bottom edge (corners 0 -> 1, η = -1)
//! and its top edge (corners 3 -> 2, η = +1):
//!
//! ```text
//!   x(ξ, η) = ½ (1 - η) bottom(ξ) + ½ (1 + η) top(ξ)
//! ```
//!
//! Straight edges interpolate their end points linearly, so a fully linear
//! element is the bilinear quadrilateral. Curved edges interpolate colatitude
//! θ = atan2(s, z) and radius linearly in ξ; an edge whose end points share a
//! radius is an exact circular arc about the mesh origin.

use axidb_model::{ElementShape, MeshPoint};
use nalgebra::{Matrix2, Vector2};
use tracing::trace;

/// One edge of an element, parametrised by ξ ∈ [-1, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
enum Edge {
    Straight {
        start: [f64; 2],
        end: [f64; 2],
    },
    Arc {
        theta_mid: f64,
        theta_half: f64,
        r_mid: f64,
        r_half: f64,
    },
}

impl Edge {
    fn new(start: MeshPoint, end: MeshPoint, curved: bool) -> Self {
        if !curved {
            return Edge::Straight {
                start: start.coords(),
                end: end.coords(),
            };
        }
        let (theta_a, theta_b) = (start.s.atan2(start.z), end.s.atan2(end.z));
        let (r_a, r_b) = (start.radius(), end.radius());
        Edge::Arc {
            theta_mid: 0.5 * (theta_a + theta_b),
            theta_half: 0.5 * (theta_b - theta_a),
            r_mid: 0.5 * (r_a + r_b),
            r_half: 0.5 * (r_b - r_a),
        }
    }

    fn point(&self, xi: f64) -> Vector2<f64> {
        match *self {
            Edge::Straight { start, end } => Vector2::new(
                0.5 * (1.0 - xi) * start[0] + 0.5 * (1.0 + xi) * end[0],
                0.5 * (1.0 - xi) * start[1] + 0.5 * (1.0 + xi) * end[1],
            ),
            Edge::Arc {
                theta_mid,
                theta_half,
                r_mid,
                r_half,
            } => {
                let theta = theta_mid + xi * theta_half;
                let r = r_mid + xi * r_half;
                Vector2::new(r * theta.sin(), r * theta.cos())
            }
        }
    }

    fn tangent(&self, xi: f64) -> Vector2<f64> {
        match *self {
            Edge::Straight { start, end } => {
                Vector2::new(0.5 * (end[0] - start[0]), 0.5 * (end[1] - start[1]))
            }
            Edge::Arc {
                theta_mid,
                theta_half,
                r_mid,
                r_half,
            } => {
                let theta = theta_mid + xi * theta_half;
                let r = r_mid + xi * r_half;
                let (sin, cos) = theta.sin_cos();
                Vector2::new(
                    r_half * sin + r * cos * theta_half,
                    r_half * cos - r * sin * theta_half,
                )
            }
        }
    }
}

/// Forward mapping of one element
#[derive(Debug, Clone, PartialEq)]
pub struct ElementGeometry {
    corners: [MeshPoint; 4],
    shape: ElementShape,
    bottom: Edge,
    top: Edge,
}

impl ElementGeometry {
    pub fn new(corners: [MeshPoint; 4], shape: ElementShape) -> Self {
        Self {
            corners,
            shape,
            bottom: Edge::new(corners[0], corners[1], shape.curved_bottom()),
            top: Edge::new(corners[3], corners[2], shape.curved_top()),
        }
    }

    pub fn corners(&self) -> &[MeshPoint; 4] {
        &self.corners
    }

    /// Meridional coordinates (s, z) of the reference point (ξ, η)
    pub fn map(&self, xi: f64, eta: f64) -> [f64; 2] {
        let p = self.map_vector(xi, eta);
        [p.x, p.y]
    }

    fn map_vector(&self, xi: f64, eta: f64) -> Vector2<f64> {
        self.bottom.point(xi) * (0.5 * (1.0 - eta)) + self.top.point(xi) * (0.5 * (1.0 + eta))
    }

    /// Jacobian of the mapping
    ///
    /// ```text
    ///   J = [ds/dξ  ds/dη]
    ///       [dz/dξ  dz/dη]
    /// ```
    pub fn jacobian(&self, xi: f64, eta: f64) -> Matrix2<f64> {
        let d_xi =
            self.bottom.tangent(xi) * (0.5 * (1.0 - eta)) + self.top.tangent(xi) * (0.5 * (1.0 + eta));
        let d_eta = (self.top.point(xi) - self.bottom.point(xi)) * 0.5;
        Matrix2::new(d_xi.x, d_eta.x, d_xi.y, d_eta.y)
    }

    /// Reference coordinates (ξ, η) of the meridional point (s, z)
    ///
    /// Linear elements are inverted in closed form; curved ones by Newton
    /// iteration from the element centre. Returns `None` when the inversion
    /// breaks down (degenerate element or no convergence), which callers treat
    /// as "not inside".
    pub fn inverse(&self, s: f64, z: f64, newton: &NewtonSettings) -> Option<[f64; 2]> {
        match self.shape {
            ElementShape::Linear => self.inverse_bilinear(s, z),
            _ => self.inverse_newton(s, z, newton),
        }
    }

    fn inverse_bilinear(&self, s: f64, z: f64) -> Option<[f64; 2]> {
        let [p0, p1, p2, p3] = self.corners.map(|p| Vector2::new(p.s, p.z));
        // x(ξ, η) = a + b ξ + c η + d ξη
        let a = (p0 + p1 + p2 + p3) * 0.25;
        let b = (-p0 + p1 + p2 - p3) * 0.25;
        let c = (-p0 - p1 + p2 + p3) * 0.25;
        let d = (p0 - p1 + p2 - p3) * 0.25;
        let q = Vector2::new(s, z) - a;

        // (q - c η) x (b + d η) = 0 is quadratic in η
        let cross = |u: &Vector2<f64>, v: &Vector2<f64>| u.x * v.y - u.y * v.x;
        let qa = -cross(&c, &d);
        let qb = cross(&q, &d) - cross(&c, &b);
        let qc = cross(&q, &b);

        let scale = b.norm().max(c.norm()).max(f64::MIN_POSITIVE);
        let eta = if qa.abs() <= 1e-12 * scale * scale {
            if qb == 0.0 {
                return None;
            }
            -qc / qb
        } else {
            let disc = qb * qb - 4.0 * qa * qc;
            if disc < 0.0 {
                return None;
            }
            let root = disc.sqrt();
            let t = -0.5 * (qb + qb.signum() * root);
            let mut roots = vec![t / qa];
            if t != 0.0 {
                roots.push(qc / t);
            }
            roots
                .into_iter()
                .min_by(|x, y| distance_outside(*x).total_cmp(&distance_outside(*y)))?
        };

        let denom = b + d * eta;
        let num = q - c * eta;
        let xi = if denom.x.abs() >= denom.y.abs() {
            if denom.x == 0.0 {
                return None;
            }
            num.x / denom.x
        } else {
            num.y / denom.y
        };
        Some([xi, eta])
    }

    fn inverse_newton(&self, s: f64, z: f64, settings: &NewtonSettings) -> Option<[f64; 2]> {
        let target = Vector2::new(s, z);
        let mut x = Vector2::new(0.0, 0.0);
        let scale = self.characteristic_length();

        for iteration in 0..settings.max_iterations {
            let residual = self.map_vector(x.x, x.y) - target;
            let jac_inv = self.jacobian(x.x, x.y).try_inverse()?;
            let step = jac_inv * residual;
            x -= step;
            trace!(iteration, xi = x.x, eta = x.y, residual = residual.norm(), "newton step");
            if !x.x.is_finite() || !x.y.is_finite() {
                return None;
            }
            if step.norm() < settings.tolerance || residual.norm() < settings.tolerance * scale {
                return Some([x.x, x.y]);
            }
        }
        None
    }

    fn characteristic_length(&self) -> f64 {
        let [p0, _, p2, _] = self.corners;
        (p2.s - p0.s).hypot(p2.z - p0.z).max(f64::MIN_POSITIVE)
    }
}

/// Distance of a reference coordinate from [-1, 1]
fn distance_outside(x: f64) -> f64 {
    (x.abs() - 1.0).max(0.0)
}

/// Newton solver controls for curved elements
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonSettings {
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for NewtonSettings {
    fn default() -> Self {
        Self {
            max_iterations: 25,
            tolerance: 1e-12,
        }
    }
}

/// Outcome of a containment test against one element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Containment {
    pub inside: bool,
    pub xi: f64,
    pub eta: f64,
}

/// Whether (s, z) lies inside the element, within `tolerance` of [-1, 1]²
pub fn inside_element(
    s: f64,
    z: f64,
    geometry: &ElementGeometry,
    tolerance: f64,
    newton: &NewtonSettings,
) -> Containment {
    match geometry.inverse(s, z, newton) {
        Some([xi, eta]) => {
            let bound = 1.0 + tolerance;
            Containment {
                inside: xi.abs() <= bound && eta.abs() <= bound,
                xi,
                eta,
            }
        }
        None => Containment {
            inside: false,
            xi: f64::NAN,
            eta: f64::NAN,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE_CORNERS: [[f64; 2]; 4] = [[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]];

    fn unit_square() -> ElementGeometry {
        ElementGeometry::new(
            [
                MeshPoint::new(0.0, 0.0),
                MeshPoint::new(1.0, 0.0),
                MeshPoint::new(1.0, 1.0),
                MeshPoint::new(0.0, 1.0),
            ],
            ElementShape::Linear,
        )
    }

    fn skewed_quad() -> ElementGeometry {
        ElementGeometry::new(
            [
                MeshPoint::new(1.0, 0.5),
                MeshPoint::new(3.0, 0.0),
                MeshPoint::new(3.5, 2.0),
                MeshPoint::new(0.8, 2.5),
            ],
            ElementShape::Linear,
        )
    }

    fn polar(r: f64, theta_deg: f64) -> MeshPoint {
        let theta = theta_deg.to_radians();
        MeshPoint::new(r * theta.sin(), r * theta.cos())
    }

    fn spheroidal(shape: ElementShape) -> ElementGeometry {
        ElementGeometry::new(
            [polar(5.0, 20.0), polar(5.0, 35.0), polar(6.0, 35.0), polar(6.0, 20.0)],
            shape,
        )
    }

    #[test]
    fn corners_map_to_reference_corners() {
        for geometry in [
            unit_square(),
            skewed_quad(),
            spheroidal(ElementShape::Spheroidal),
            spheroidal(ElementShape::SemiCurvedOuter),
            spheroidal(ElementShape::SemiCurvedInner),
        ] {
            for (k, [xi, eta]) in REFERENCE_CORNERS.iter().enumerate() {
                let [s, z] = geometry.map(*xi, *eta);
                let corner = geometry.corners()[k];
                assert!((s - corner.s).abs() < 1e-12 && (z - corner.z).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn arcs_keep_constant_radius() {
        let geometry = spheroidal(ElementShape::Spheroidal);
        for xi in [-0.7, 0.0, 0.4] {
            let [s, z] = geometry.map(xi, -1.0);
            assert!((s.hypot(z) - 5.0).abs() < 1e-12);
            let [s, z] = geometry.map(xi, 1.0);
            assert!((s.hypot(z) - 6.0).abs() < 1e-12);
        }
        // semi-curved outer: bottom is a chord, strictly inside the circle
        let [s, z] = spheroidal(ElementShape::SemiCurvedOuter).map(0.0, -1.0);
        assert!(s.hypot(z) < 5.0);
    }

    #[test]
    fn jacobian_matches_finite_differences() {
        let h = 1e-6;
        for geometry in [skewed_quad(), spheroidal(ElementShape::Spheroidal)] {
            let (xi, eta) = (0.3, -0.45);
            let jac = geometry.jacobian(xi, eta);
            let [s_p, z_p] = geometry.map(xi + h, eta);
            let [s_m, z_m] = geometry.map(xi - h, eta);
            assert!((jac[(0, 0)] - (s_p - s_m) / (2.0 * h)).abs() < 1e-6);
            assert!((jac[(1, 0)] - (z_p - z_m) / (2.0 * h)).abs() < 1e-6);
            let [s_p, z_p] = geometry.map(xi, eta + h);
            let [s_m, z_m] = geometry.map(xi, eta - h);
            assert!((jac[(0, 1)] - (s_p - s_m) / (2.0 * h)).abs() < 1e-6);
            assert!((jac[(1, 1)] - (z_p - z_m) / (2.0 * h)).abs() < 1e-6);
        }
    }

    #[test]
    fn bilinear_inverse_recovers_reference_point() {
        let newton = NewtonSettings::default();
        for geometry in [unit_square(), skewed_quad()] {
            for (xi, eta) in [(0.0, 0.0), (-0.8, 0.35), (0.99, -0.99), (0.5, 0.75)] {
                let [s, z] = geometry.map(xi, eta);
                let [xi_r, eta_r] = geometry.inverse(s, z, &newton).expect("inversion");
                assert!((xi_r - xi).abs() < 1e-10 && (eta_r - eta).abs() < 1e-10);
            }
        }
    }

    #[test]
    fn newton_inverse_recovers_reference_point() {
        let newton = NewtonSettings::default();
        for shape in [
            ElementShape::Spheroidal,
            ElementShape::SemiCurvedOuter,
            ElementShape::SemiCurvedInner,
        ] {
            let geometry = spheroidal(shape);
            for (xi, eta) in [(0.0, 0.0), (-0.95, 0.6), (1.0, 1.0), (0.2, -0.999)] {
                let [s, z] = geometry.map(xi, eta);
                let [xi_r, eta_r] = geometry.inverse(s, z, &newton).expect("inversion");
                assert!((xi_r - xi).abs() < 1e-9 && (eta_r - eta).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn containment_accepts_inside_and_edges() {
        let newton = NewtonSettings::default();
        let square = unit_square();
        let centre = inside_element(0.5, 0.5, &square, 1e-3, &newton);
        assert!(centre.inside);
        assert!(centre.xi.abs() < 1e-12 && centre.eta.abs() < 1e-12);

        let edge = inside_element(1.0, 0.3, &square, 1e-3, &newton);
        assert!(edge.inside);
        assert!((edge.xi - 1.0).abs() < 1e-12);

        let corner = inside_element(0.0, 1.0, &square, 1e-3, &newton);
        assert!(corner.inside);
        assert!((corner.xi + 1.0).abs() < 1e-12 && (corner.eta - 1.0).abs() < 1e-12);
    }

    #[test]
    fn containment_rejects_outside_points() {
        let newton = NewtonSettings::default();
        assert!(!inside_element(1.01, 0.5, &unit_square(), 1e-3, &newton).inside);
        assert!(!inside_element(-3.0, 7.0, &skewed_quad(), 1e-3, &newton).inside);

        let curved = spheroidal(ElementShape::Spheroidal);
        let outside = polar(6.5, 27.0);
        assert!(!inside_element(outside.s, outside.z, &curved, 1e-3, &newton).inside);
        let inside = polar(5.5, 27.0);
        assert!(inside_element(inside.s, inside.z, &curved, 1e-3, &newton).inside);
    }

    #[test]
    fn tolerance_absorbs_boundary_roundoff() {
        let newton = NewtonSettings::default();
        let square = unit_square();
        assert!(inside_element(1.0 + 1e-5, 0.5, &square, 1e-3, &newton).inside);
        assert!(!inside_element(1.0 + 1e-5, 0.5, &square, 0.0, &newton).inside);
    }
}
