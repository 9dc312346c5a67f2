pub mod billboard;
pub mod color;
pub mod label;
pub mod point;
pub mod polyline;
pub mod transform;
pub mod visibility;

pub use billboard::*;
pub use color::*;
pub use label::*;
pub use point::*;
pub use polyline::*;
pub use transform::*;
pub use visibility::*;
