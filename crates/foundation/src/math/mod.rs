pub mod ecef;
pub mod geodesic;
pub mod geodesy;
pub mod local;
pub mod vec;

pub use ecef::*;
pub use geodesic::*;
pub use geodesy::*;
pub use local::*;
pub use vec::*;
