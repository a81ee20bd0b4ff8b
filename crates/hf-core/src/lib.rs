//! hf-core: shared foundation for the hydraulic-fracture post-processing tools.
//!
//! Contains:
//! - numeric (Real + float helpers)
//! - mesh (uniform Cartesian mesh centred on the origin)
//! - error (shared error types)

pub mod error;
pub mod mesh;
pub mod numeric;

pub use error::{HfError, HfResult};
pub use mesh::{CartesianMesh, Neighbors};
pub use numeric::*;
