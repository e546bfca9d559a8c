//! Database metadata computed once at open.

use std::fmt;
use std::path::PathBuf;

use axidb_io::StoreAttributes;
use axidb_model::Mesh;

/// Summary of an opened database
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseInfo {
    pub is_reciprocal: bool,
    pub components: String,
    /// Source depth [km], fixed only for forward databases
    pub source_depth: Option<f64>,
    pub velocity_model: String,
    pub attenuation: bool,
    /// Dominant period [s]
    pub period: f64,
    pub dump_type: String,
    pub excitation_types: Vec<String>,
    /// Sample interval [s]
    pub dt: f64,
    /// Sampling rate [Hz]
    pub sampling_rate: f64,
    pub npts: usize,
    /// Seismogram length [s]
    pub length: f64,
    pub stf: String,
    /// Source time function shift [s]
    pub src_shift: f64,
    pub spatial_order: usize,
    /// Radius range of the mesh [km]
    pub min_radius: f64,
    pub max_radius: f64,
    /// Planet radius [km]
    pub planet_radius: f64,
    /// Epicentral distance range covered by the mesh [deg]
    pub min_d: f64,
    pub max_d: f64,
    pub time_scheme: String,
    pub directory: Option<PathBuf>,
    /// Combined size of the backing stores [bytes]
    pub filesize: u64,
    pub compiler: String,
    pub user: String,
    pub format_version: u32,
    pub solver_version: String,
    pub datetime: String,
}

impl DatabaseInfo {
    /// Info of a reciprocal database from its horizontal and vertical
    /// sub-databases
    pub fn reciprocal(
        px: &StoreAttributes,
        pz: &StoreAttributes,
        mesh: &Mesh,
        directory: Option<PathBuf>,
        filesize: u64,
    ) -> Self {
        let stats = mesh.statistics();
        let (min_d, max_d) = distance_range(mesh);
        let mut excitation_types = vec![px.excitation_type.trim().to_string()];
        if pz.excitation_type.trim() != px.excitation_type.trim() {
            excitation_types.push(pz.excitation_type.trim().to_string());
        }
        let sampling_rate = if px.dt > 0.0 { 1.0 / px.dt } else { 0.0 };

        Self {
            is_reciprocal: true,
            components: "vertical and horizontal".to_string(),
            source_depth: None,
            velocity_model: px.background_model.clone(),
            attenuation: px.attenuation,
            period: px.dominant_period,
            dump_type: px.dump_type.trim().to_string(),
            excitation_types,
            dt: px.dt,
            sampling_rate,
            npts: px.ndumps,
            length: px.dt * px.ndumps.saturating_sub(1) as f64,
            stf: px.source_time_function.clone(),
            src_shift: px.source_shift,
            spatial_order: px.npol,
            min_radius: stats.min_radius / 1000.0,
            max_radius: stats.max_radius / 1000.0,
            planet_radius: px.planet_radius / 1000.0,
            min_d,
            max_d,
            time_scheme: px.time_scheme.clone(),
            directory,
            filesize,
            compiler: px.compiler.clone(),
            user: px.user.clone(),
            format_version: px.format_version,
            solver_version: px.solver_version.clone(),
            datetime: px.datetime.clone(),
        }
    }

    /// SEED band code for the sampling rate, following SPECFEM
    pub fn band_code(&self) -> char {
        band_code(self.dt)
    }
}

/// Colatitude range of the mesh points [deg]
fn distance_range(mesh: &Mesh) -> (f64, f64) {
    let (lo, hi) = mesh
        .points
        .iter()
        .filter(|p| p.radius() > 0.0)
        .map(|p| p.s.atan2(p.z).to_degrees())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), d| {
            (lo.min(d), hi.max(d))
        });
    if lo > hi { (0.0, 0.0) } else { (lo, hi) }
}

/// SEED band code for a sample interval, following SPECFEM
pub fn band_code(dt: f64) -> char {
    let sr = 1.0 / dt;
    if sr <= 0.001 {
        'F'
    } else if sr <= 0.004 {
        'C'
    } else if sr <= 0.0125 {
        'H'
    } else if sr <= 0.1 {
        'B'
    } else if sr < 1.0 {
        'M'
    } else {
        'L'
    }
}

/// Human readable size, e.g. "1.5 MB"
pub fn sizeof_fmt(bytes: u64) -> String {
    let mut num = bytes as f64;
    for unit in ["bytes", "KB", "MB", "GB"] {
        if num < 1024.0 {
            return format!("{:3.1} {}", num, unit);
        }
        num /= 1024.0;
    }
    format!("{:3.1} TB", num)
}

impl fmt::Display for DatabaseInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "ReciprocalDb {} Green's function Database (v{}) generated with these parameters:",
            if self.is_reciprocal { "reciprocal" } else { "forward" },
            self.format_version
        )?;
        writeln!(f, "\tcomponents           : {}", self.components)?;
        if let Some(depth) = self.source_depth {
            writeln!(f, "\tsource depth         : {:.2} km", depth)?;
        }
        writeln!(f, "\tvelocity model       : {}", self.velocity_model)?;
        writeln!(f, "\tattenuation          : {}", self.attenuation)?;
        writeln!(f, "\tdominant period      : {:.3} s", self.period)?;
        writeln!(f, "\tdump type            : {}", self.dump_type)?;
        writeln!(f, "\texcitation type      : {}", self.excitation_types.join(", "))?;
        writeln!(f, "\ttime step            : {:.3} s", self.dt)?;
        writeln!(f, "\tsampling rate        : {:.3} Hz", self.sampling_rate)?;
        writeln!(f, "\tnumber of samples    : {}", self.npts)?;
        writeln!(f, "\tseismogram length    : {:.1} s", self.length)?;
        writeln!(f, "\tsource time function : {}", self.stf)?;
        writeln!(f, "\tsource shift         : {:.3} s", self.src_shift)?;
        writeln!(f, "\tspatial order        : {}", self.spatial_order)?;
        writeln!(
            f,
            "\tmin/max radius       : {:.1} - {:.1} km",
            self.min_radius, self.max_radius
        )?;
        writeln!(f, "\tPlanet radius        : {:.1} km", self.planet_radius)?;
        writeln!(
            f,
            "\tmin/max distance     : {:.1} - {:.1} deg",
            self.min_d, self.max_d
        )?;
        writeln!(f, "\ttime stepping scheme : {}", self.time_scheme)?;
        writeln!(f, "\tcompiler/user        : {} by {}", self.compiler, self.user)?;
        let directory = self
            .directory
            .as_ref()
            .map_or_else(|| "<in memory>".to_string(), |d| d.display().to_string());
        writeln!(f, "\tdirectory            : {}", directory)?;
        writeln!(f, "\tsize of store files  : {}", sizeof_fmt(self.filesize))?;
        writeln!(
            f,
            "\tgenerated by solver version {} at {}",
            self.solver_version, self.datetime
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axidb_model::{ElementShape, MeshPoint, SpectralElement};

    fn quarter_mesh() -> Mesh {
        let mut mesh = Mesh::new(1);
        mesh.add_point(MeshPoint::new(0.0, 3_000_000.0));
        mesh.add_point(MeshPoint::new(3_000_000.0, 0.0));
        mesh.add_point(MeshPoint::new(6_000_000.0, 0.0));
        mesh.add_point(MeshPoint::new(0.0, 6_000_000.0));
        mesh.add_element(SpectralElement::new(
            [0, 1, 2, 3],
            ElementShape::Spheroidal,
            true,
            vec![0, 3, 1, 2],
        ))
        .unwrap();
        mesh
    }

    fn attributes(excitation: &str) -> StoreAttributes {
        let mut attrs = StoreAttributes::new(1, 101, excitation, 0.5);
        attrs.background_model = "prem_iso".to_string();
        attrs.dominant_period = 10.0;
        attrs
    }

    #[test]
    fn band_codes() {
        assert_eq!(band_code(0.01), 'L');
        assert_eq!(band_code(2.0), 'M');
        assert_eq!(band_code(10.0), 'B');
        assert_eq!(band_code(100.0), 'H');
        assert_eq!(band_code(500.0), 'C');
        assert_eq!(band_code(5000.0), 'F');
    }

    #[test]
    fn human_readable_sizes() {
        assert_eq!(sizeof_fmt(0), "0.0 bytes");
        assert_eq!(sizeof_fmt(1536), "1.5 KB");
        assert_eq!(sizeof_fmt(3 * 1024 * 1024), "3.0 MB");
        assert_eq!(sizeof_fmt(2 * 1024_u64.pow(4)), "2.0 TB");
    }

    #[test]
    fn reciprocal_info_from_attributes() {
        let info = DatabaseInfo::reciprocal(
            &attributes("dipole"),
            &attributes("monopole"),
            &quarter_mesh(),
            None,
            2048,
        );
        assert!(info.is_reciprocal);
        assert_eq!(info.excitation_types, vec!["dipole", "monopole"]);
        assert_eq!(info.npts, 101);
        assert!((info.length - 50.0).abs() < 1e-12);
        assert!((info.sampling_rate - 2.0).abs() < 1e-12);
        assert!((info.min_radius - 3000.0).abs() < 1e-9);
        assert!((info.max_radius - 6000.0).abs() < 1e-9);
        assert!((info.planet_radius - 6371.0).abs() < 1e-9);
        assert!(info.min_d.abs() < 1e-9);
        assert!((info.max_d - 90.0).abs() < 1e-9);
        assert_eq!(info.band_code(), 'L');
    }

    #[test]
    fn display_lists_parameters() {
        let info = DatabaseInfo::reciprocal(
            &attributes("dipole"),
            &attributes("monopole"),
            &quarter_mesh(),
            Some(PathBuf::from("/data/prem_10s")),
            1536,
        );
        let text = info.to_string();
        assert!(text.starts_with("ReciprocalDb reciprocal Green's function Database (v1)"));
        assert!(text.contains("velocity model       : prem_iso"));
        assert!(text.contains("excitation type      : dipole, monopole"));
        assert!(text.contains("dominant period      : 10.000 s"));
        assert!(text.contains("/data/prem_10s"));
        assert!(text.contains("1.5 KB"));
        assert!(!text.contains("source depth"));
    }
}
