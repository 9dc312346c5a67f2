//! Trip playback: timeline, per-frame renderer adapter and scene lifecycle.

pub mod camera;
pub mod controller;
pub mod ease;
pub mod error;
pub mod frame;
pub mod icons;
pub mod lifecycle;
pub mod profile;
pub mod stage;
pub mod timeline;

pub use camera::*;
pub use controller::*;
pub use ease::*;
pub use error::*;
pub use frame::*;
pub use icons::*;
pub use lifecycle::*;
pub use profile::*;
pub use stage::*;
pub use timeline::*;
