//! Point sources and receivers on a spherical planet.
//!
//! Moment tensor and force components are given in the local spherical frame
//! (r, θ, φ) = (up, south, east) at the source. The local Cartesian frame used
//! by the rotation chain is (x, y, z) = (θ, φ, r).

use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthError};
use crate::rotations::Voigt;

fn check_coordinates(latitude: f64, longitude: f64) -> Result<()> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(SynthError::InvalidInput(format!(
            "Latitude {} is outside [-90, 90]",
            latitude
        )));
    }
    if !longitude.is_finite() || !(-180.0..=360.0).contains(&longitude) {
        return Err(SynthError::InvalidInput(format!(
            "Longitude {} is outside [-180, 360]",
            longitude
        )));
    }
    Ok(())
}

fn check_depth(depth_in_m: f64) -> Result<()> {
    if !depth_in_m.is_finite() || depth_in_m < 0.0 {
        return Err(SynthError::InvalidInput(format!(
            "Depth {} m must be a finite non-negative number",
            depth_in_m
        )));
    }
    Ok(())
}

/// Cartesian position [m] of a point at the given depth below the surface
fn cartesian_position(
    latitude: f64,
    longitude: f64,
    depth_in_m: f64,
    planet_radius: f64,
) -> [f64; 3] {
    let r = planet_radius - depth_in_m;
    let (sin_theta, cos_theta) = (90.0 - latitude).to_radians().sin_cos();
    let (sin_phi, cos_phi) = longitude.to_radians().sin_cos();
    [r * sin_theta * cos_phi, r * sin_theta * sin_phi, r * cos_theta]
}

/// Moment tensor source [Nm]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub depth_in_m: f64,
    #[serde(default)]
    pub m_rr: f64,
    #[serde(default)]
    pub m_tt: f64,
    #[serde(default)]
    pub m_pp: f64,
    #[serde(default)]
    pub m_rt: f64,
    #[serde(default)]
    pub m_rp: f64,
    #[serde(default)]
    pub m_tp: f64,
}

impl Source {
    /// Source with moment tensor `[Mrr, Mtt, Mpp, Mrt, Mrp, Mtp]`
    pub fn new(latitude: f64, longitude: f64, depth_in_m: f64, moment: [f64; 6]) -> Self {
        let [m_rr, m_tt, m_pp, m_rt, m_rp, m_tp] = moment;
        Self {
            latitude,
            longitude,
            depth_in_m,
            m_rr,
            m_tt,
            m_pp,
            m_rt,
            m_rp,
            m_tp,
        }
    }

    /// Isotropic source of scalar moment `m0`
    pub fn explosion(latitude: f64, longitude: f64, depth_in_m: f64, m0: f64) -> Self {
        Self::new(latitude, longitude, depth_in_m, [m0, m0, m0, 0.0, 0.0, 0.0])
    }

    pub fn colatitude(&self) -> f64 {
        90.0 - self.latitude
    }

    /// Moment tensor in the local Cartesian frame, Voigt order
    /// (Mtt, Mpp, Mrr, Mrp, Mrt, Mtp)
    pub fn tensor_voigt(&self) -> Voigt {
        [self.m_tt, self.m_pp, self.m_rr, self.m_rp, self.m_rt, self.m_tp]
    }

    /// Scalar moment M0 = sqrt(Σ Mij² / 2)
    pub fn scalar_moment(&self) -> f64 {
        let diag = self.m_rr.powi(2) + self.m_tt.powi(2) + self.m_pp.powi(2);
        let off = self.m_rt.powi(2) + self.m_rp.powi(2) + self.m_tp.powi(2);
        ((diag + 2.0 * off) / 2.0).sqrt()
    }

    /// Cartesian position [m] for a planet of the given radius
    pub fn cartesian(&self, planet_radius: f64) -> [f64; 3] {
        cartesian_position(self.latitude, self.longitude, self.depth_in_m, planet_radius)
    }

    pub fn validate(&self) -> Result<()> {
        check_coordinates(self.latitude, self.longitude)?;
        check_depth(self.depth_in_m)?;
        if self.tensor_voigt().iter().any(|m| !m.is_finite()) {
            return Err(SynthError::InvalidInput(
                "Moment tensor components must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Single force source [N]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForceSource {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub depth_in_m: f64,
    #[serde(default)]
    pub f_r: f64,
    #[serde(default)]
    pub f_t: f64,
    #[serde(default)]
    pub f_p: f64,
}

impl ForceSource {
    pub fn new(latitude: f64, longitude: f64, depth_in_m: f64, f_r: f64, f_t: f64, f_p: f64) -> Self {
        Self {
            latitude,
            longitude,
            depth_in_m,
            f_r,
            f_t,
            f_p,
        }
    }

    pub fn colatitude(&self) -> f64 {
        90.0 - self.latitude
    }

    /// Force in the local Cartesian frame (Ft, Fp, Fr)
    pub fn force_cartesian(&self) -> [f64; 3] {
        [self.f_t, self.f_p, self.f_r]
    }

    pub fn cartesian(&self, planet_radius: f64) -> [f64; 3] {
        cartesian_position(self.latitude, self.longitude, self.depth_in_m, planet_radius)
    }

    pub fn validate(&self) -> Result<()> {
        check_coordinates(self.latitude, self.longitude)?;
        check_depth(self.depth_in_m)?;
        if self.force_cartesian().iter().any(|f| !f.is_finite()) {
            return Err(SynthError::InvalidInput(
                "Force components must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Any source a database can be queried with
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeismicSource {
    Moment(Source),
    Force(ForceSource),
}

impl SeismicSource {
    pub fn latitude(&self) -> f64 {
        match self {
            SeismicSource::Moment(s) => s.latitude,
            SeismicSource::Force(f) => f.latitude,
        }
    }

    pub fn longitude(&self) -> f64 {
        match self {
            SeismicSource::Moment(s) => s.longitude,
            SeismicSource::Force(f) => f.longitude,
        }
    }

    pub fn colatitude(&self) -> f64 {
        90.0 - self.latitude()
    }

    pub fn depth_in_m(&self) -> f64 {
        match self {
            SeismicSource::Moment(s) => s.depth_in_m,
            SeismicSource::Force(f) => f.depth_in_m,
        }
    }

    pub fn cartesian(&self, planet_radius: f64) -> [f64; 3] {
        match self {
            SeismicSource::Moment(s) => s.cartesian(planet_radius),
            SeismicSource::Force(f) => f.cartesian(planet_radius),
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            SeismicSource::Moment(s) => s.validate(),
            SeismicSource::Force(f) => f.validate(),
        }
    }
}

impl From<Source> for SeismicSource {
    fn from(source: Source) -> Self {
        SeismicSource::Moment(source)
    }
}

impl From<ForceSource> for SeismicSource {
    fn from(source: ForceSource) -> Self {
        SeismicSource::Force(source)
    }
}

/// Receiver location
///
/// A reciprocal database fixes the receiver depth; a requested depth is only
/// reported back as a precision warning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receiver {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub depth_in_m: Option<f64>,
    #[serde(default)]
    pub network: String,
    #[serde(default)]
    pub station: String,
}

impl Receiver {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            depth_in_m: None,
            network: String::new(),
            station: String::new(),
        }
    }

    pub fn with_depth(mut self, depth_in_m: f64) -> Self {
        self.depth_in_m = Some(depth_in_m);
        self
    }

    pub fn colatitude(&self) -> f64 {
        90.0 - self.latitude
    }

    pub fn validate(&self) -> Result<()> {
        check_coordinates(self.latitude, self.longitude)?;
        if let Some(depth) = self.depth_in_m {
            check_depth(depth)?;
        }
        Ok(())
    }
}
