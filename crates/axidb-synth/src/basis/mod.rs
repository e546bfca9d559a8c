//! Spectral basis: collocation points, Lagrange interpolation and differentiation.

pub mod lagrange;
pub mod quadrature;

pub use lagrange::{PointSet, interpolate_2d, interpolate_2d_td};
pub use quadrature::{glj_points, gll_points};

/// GLL and GLJ point sets for one polynomial order, built once per mesh
#[derive(Debug, Clone)]
pub struct SpectralBasis {
    npol: usize,
    gll: PointSet,
    glj: PointSet,
}

impl SpectralBasis {
    pub fn new(npol: usize) -> Self {
        Self {
            npol,
            gll: PointSet::new(gll_points(npol)),
            glj: PointSet::new(glj_points(npol)),
        }
    }

    pub fn npol(&self) -> usize {
        self.npol
    }

    pub fn gll(&self) -> &PointSet {
        &self.gll
    }

    pub fn glj(&self) -> &PointSet {
        &self.glj
    }

    /// Point sets along (ξ, η) for an element
    ///
    /// Axial elements carry the axis at ξ = -1 and use GLJ points along ξ.
    pub fn element_point_sets(&self, axial: bool) -> (&PointSet, &PointSet) {
        if axial {
            (&self.glj, &self.gll)
        } else {
            (&self.gll, &self.gll)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axial_elements_use_glj_along_xi() {
        let basis = SpectralBasis::new(4);
        let (xi, eta) = basis.element_point_sets(true);
        assert_eq!(xi.nodes(), basis.glj().nodes());
        assert_eq!(eta.nodes(), basis.gll().nodes());

        let (xi, eta) = basis.element_point_sets(false);
        assert_eq!(xi.nodes(), basis.gll().nodes());
        assert_eq!(eta.nodes(), basis.gll().nodes());
        assert_eq!(basis.npol(), 4);
    }
}
