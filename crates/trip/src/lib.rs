//! Trip model, per-leg path building and multi-leg stitching.

pub mod builder;
pub mod error;
pub mod model;
pub mod profile;
pub mod stitch;

pub use builder::*;
pub use error::*;
pub use model::*;
pub use profile::*;
pub use stitch::*;
