//! I/O support for reciprocal wavefield databases.
//!
//! This crate provides:
//! - the **`WavefieldStore`** abstraction every sub-database (`PX`, `PZ`) is read through
//! - raw **mesh arrays** and scalar **attributes** as laid out in a database
//! - the JSON **`ordered_output.json`** store with load/save support

pub mod error;
pub mod ordered_output;
pub mod store;

pub use error::{IoError, Result};
pub use ordered_output::{ORDERED_OUTPUT_FILE, OrderedOutput};
pub use store::{MeshArrays, StoreAttributes, WavefieldStore};
