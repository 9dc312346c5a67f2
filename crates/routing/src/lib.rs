//! Road-routing collaborators for road legs.

pub mod error;
pub mod memory;
pub mod osrm;
pub mod router;

pub use error::*;
pub use memory::*;
pub use osrm::*;
pub use router::*;
