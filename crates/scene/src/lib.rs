pub mod camera;
pub mod components;
pub mod entity;
pub mod imagery;
pub mod raster;
pub mod render;
pub mod world;

pub use camera::*;
pub use imagery::*;
pub use render::*;
pub use world::*;
