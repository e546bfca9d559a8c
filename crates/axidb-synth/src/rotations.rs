//! Frame rotations between earth-centred, source-centred and mesh frames.
//!
//! Symmetric tensors use Voigt order (xx, yy, zz, yz, xz, xy). Angles are in
//! radians unless a name says otherwise.

use std::f64::consts::TAU;

use axidb_model::Excitation;
use nalgebra::{Matrix3, Vector3};

/// Symmetric tensor in Voigt notation (xx, yy, zz, yz, xz, xy)
pub type Voigt = [f64; 6];

/// Position of a Cartesian point in the mesh frame of a source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshFrameCoords {
    /// Distance from the symmetry axis
    pub s: f64,
    /// Azimuth about the symmetry axis, in [0, 2π)
    pub phi: f64,
    /// Position along the symmetry axis
    pub z: f64,
}

/// Rotate the Cartesian point (x, y, z) into the frame whose pole sits at
/// (`lon_deg`, `colat_deg`) and return its cylindrical coordinates there
pub fn rotate_frame(x: f64, y: f64, z: f64, lon_deg: f64, colat_deg: f64) -> MeshFrameCoords {
    let (sin_phi, cos_phi) = lon_deg.to_radians().sin_cos();
    let (sin_theta, cos_theta) = colat_deg.to_radians().sin_cos();

    // rotation about z by -lon, then about y by -colat
    let x_lon = x * cos_phi + y * sin_phi;
    let y_lon = -x * sin_phi + y * cos_phi;
    let x_rot = x_lon * cos_theta - z * sin_theta;
    let z_rot = x_lon * sin_theta + z * cos_theta;

    let mut phi = y_lon.atan2(x_rot);
    if phi < 0.0 {
        phi += TAU;
    }
    if phi >= TAU {
        phi -= TAU;
    }

    MeshFrameCoords {
        s: x_rot.hypot(y_lon),
        phi,
        z: z_rot,
    }
}

pub fn voigt_to_matrix(v: &Voigt) -> Matrix3<f64> {
    Matrix3::new(v[0], v[5], v[4], v[5], v[1], v[3], v[4], v[3], v[2])
}

pub fn matrix_to_voigt(m: &Matrix3<f64>) -> Voigt {
    [m[(0, 0)], m[(1, 1)], m[(2, 2)], m[(1, 2)], m[(0, 2)], m[(0, 1)]]
}

/// M' = R M Rᵀ
pub fn rotate_voigt(v: &Voigt, r: &Matrix3<f64>) -> Voigt {
    matrix_to_voigt(&(r * voigt_to_matrix(v) * r.transpose()))
}

/// Rotation from the local frame at (φ, θ) = (longitude, colatitude) to the
/// earth-centred frame
pub fn source_to_earth_matrix(phi: f64, theta: f64) -> Matrix3<f64> {
    let (sp, cp) = phi.sin_cos();
    let (st, ct) = theta.sin_cos();
    Matrix3::new(
        ct * cp, -sp, st * cp, //
        ct * sp, cp, st * sp, //
        -st, 0.0, ct,
    )
}

/// Rotation about the symmetry axis into the mesh azimuth φ
pub fn azimuth_matrix(phi: f64) -> Matrix3<f64> {
    let (sp, cp) = phi.sin_cos();
    Matrix3::new(
        cp, sp, 0.0, //
        -sp, cp, 0.0, //
        0.0, 0.0, 1.0,
    )
}

pub fn rotate_tensor_src_to_earth(v: &Voigt, phi: f64, theta: f64) -> Voigt {
    rotate_voigt(v, &source_to_earth_matrix(phi, theta))
}

pub fn rotate_tensor_earth_to_src(v: &Voigt, phi: f64, theta: f64) -> Voigt {
    rotate_voigt(v, &source_to_earth_matrix(phi, theta).transpose())
}

pub fn rotate_tensor_xyz_to_azimuth(v: &Voigt, phi: f64) -> Voigt {
    rotate_voigt(v, &azimuth_matrix(phi))
}

pub fn rotate_tensor_azimuth_to_xyz(v: &Voigt, phi: f64) -> Voigt {
    rotate_voigt(v, &azimuth_matrix(phi).transpose())
}

pub fn rotate_vector_src_to_earth(v: &Vector3<f64>, phi: f64, theta: f64) -> Vector3<f64> {
    source_to_earth_matrix(phi, theta) * v
}

pub fn rotate_vector_earth_to_src(v: &Vector3<f64>, phi: f64, theta: f64) -> Vector3<f64> {
    source_to_earth_matrix(phi, theta).transpose() * v
}

pub fn rotate_vector_xyz_to_azimuth(v: &Vector3<f64>, phi: f64) -> Vector3<f64> {
    azimuth_matrix(phi) * v
}

/// Angles of one source/receiver pair used by the rotation chain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameChain {
    pub source_longitude: f64,
    pub source_colatitude: f64,
    pub receiver_longitude: f64,
    pub receiver_colatitude: f64,
    /// Mesh azimuth of the source as seen from the receiver
    pub azimuth: f64,
}

impl FrameChain {
    /// Source frame -> earth -> receiver frame -> mesh azimuth
    pub fn forward_tensor(&self, v: &Voigt) -> Voigt {
        let v = rotate_tensor_src_to_earth(v, self.source_longitude, self.source_colatitude);
        let v = rotate_tensor_earth_to_src(&v, self.receiver_longitude, self.receiver_colatitude);
        rotate_tensor_xyz_to_azimuth(&v, self.azimuth)
    }

    /// Exact inverse of [`FrameChain::forward_tensor`]
    pub fn inverse_tensor(&self, v: &Voigt) -> Voigt {
        let v = rotate_tensor_azimuth_to_xyz(v, self.azimuth);
        let v = rotate_tensor_src_to_earth(&v, self.receiver_longitude, self.receiver_colatitude);
        rotate_tensor_earth_to_src(&v, self.source_longitude, self.source_colatitude)
    }

    pub fn forward_vector(&self, v: &Vector3<f64>) -> Vector3<f64> {
        let v = rotate_vector_src_to_earth(v, self.source_longitude, self.source_colatitude);
        let v = rotate_vector_earth_to_src(&v, self.receiver_longitude, self.receiver_colatitude);
        rotate_vector_xyz_to_azimuth(&v, self.azimuth)
    }
}

/// Parity of a field in the azimuth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AzimuthalKind {
    /// Components that vary as cos(mφ) for a force along x
    Even,
    /// Components that vary as sin(mφ) for a force along x
    Odd,
}

/// Weight of a receiver force orientation `f` on the azimuthal mode of the
/// given excitation class
pub fn azimuth_factor(phi: f64, f: &[f64; 3], excitation: Excitation, kind: AzimuthalKind) -> f64 {
    match (excitation, kind) {
        (Excitation::Monopole, AzimuthalKind::Even) => f[2],
        (Excitation::Monopole, AzimuthalKind::Odd) => 0.0,
        (Excitation::Dipole | Excitation::Quadpole, kind) => {
            let (sin, cos) = (f64::from(excitation.order()) * phi).sin_cos();
            match kind {
                AzimuthalKind::Even => f[0] * cos + f[1] * sin,
                AzimuthalKind::Odd => -f[0] * sin + f[1] * cos,
            }
        }
    }
}
