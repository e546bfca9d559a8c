//! Data model for axisymmetric spectral-element wavefield databases.
//!
//! This crate provides:
//! - **Mesh** points, spectral elements and element shapes
//! - **Excitation** symmetry classes and storage **dump types**
//! - **Displacement components** as stored per spectral grid point

pub mod fields;
pub mod mesh;

pub use fields::{DisplacementComponent, DumpType, Excitation};
pub use mesh::{ElementShape, Mesh, MeshPoint, MeshStatistics, SpectralElement};
