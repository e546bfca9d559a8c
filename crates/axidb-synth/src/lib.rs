//! Seismogram synthesis from reciprocal axisymmetric spectral-element
//! wavefield databases.
//!
//! A query rotates the source into the mesh frame of the receiver, finds the
//! element containing it, derives the strain from the nodal displacement
//! history of that element and contracts it with the rotated source.

pub mod basis;
pub mod config;
pub mod contraction;
pub mod database;
pub mod error;
pub mod info;
pub mod locate;
pub mod mapping;
pub mod rotations;
pub mod seismogram;
pub mod source;
pub mod spatial_index;
pub mod strain;

pub use basis::{PointSet, SpectralBasis, glj_points, gll_points};
pub use config::SynthConfig;
pub use contraction::{contract_displacement, contract_strain};
pub use database::{ReciprocalDb, SubDatabase};
pub use error::{Result, SynthError};
pub use info::{DatabaseInfo, band_code, sizeof_fmt};
pub use locate::{ElementLocation, build_element_index, locate_element};
pub use mapping::{Containment, ElementGeometry, NewtonSettings, inside_element};
pub use rotations::{AzimuthalKind, FrameChain, MeshFrameCoords, Voigt, azimuth_factor, rotate_frame};
pub use seismogram::{
    Component, MeshPosition, PrecisionWarning, SeismogramKind, Seismograms, SubDatabaseKind,
    time_derivative,
};
pub use source::{ForceSource, Receiver, SeismicSource, Source};
pub use spatial_index::KdTree;
pub use strain::{derive_strain, interpolate_components};
