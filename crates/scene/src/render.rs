//! The rendering seam.
//!
//! The trip engine never talks to a concrete 3D engine; it drives anything
//! implementing [`Renderer`]. [`crate::World`] is the headless implementation
//! used by tests and the command-line player.

use foundation::math::{Ecef, Vec2};

use crate::camera::{CameraView, HeadingPitchRange};
use crate::components::{Billboard, Label, PointStyle, Polyline};
use crate::entity::EntityId;
use crate::imagery::Basemap;

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("renderer has been destroyed")]
    Destroyed,

    #[error("frame capture failed: {0}")]
    Capture(String),
}

/// Encoded snapshot of the current frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameImage {
    pub width: u32,
    pub height: u32,
    /// PNG-encoded pixels.
    pub png: Vec<u8>,
}

impl FrameImage {
    /// MIME type of [`FrameImage::png`].
    pub fn mime_type(&self) -> &'static str {
        "image/png"
    }
}

/// Everything the trip engine needs from a globe renderer.
///
/// Entity setters ignore ids they do not know. After [`Renderer::destroy`]
/// every call is a no-op and captures fail with [`RenderError::Destroyed`].
pub trait Renderer {
    fn add_polyline(&mut self, polyline: Polyline) -> EntityId;

    /// Replace a polyline's positions wholesale.
    fn set_polyline_positions(&mut self, entity: EntityId, positions: &[Ecef]);

    fn add_label(&mut self, position: Ecef, label: Label) -> EntityId;

    /// Point marker with an attached label; both toggle together.
    fn add_marker(&mut self, position: Ecef, point: PointStyle, label: Label) -> EntityId;

    fn add_billboard(&mut self, position: Ecef, billboard: Billboard) -> EntityId;

    fn set_position(&mut self, entity: EntityId, position: Ecef);

    fn set_visible(&mut self, entity: EntityId, visible: bool);

    fn set_billboard_image(&mut self, entity: EntityId, image: &str);

    fn set_billboard_rotation(&mut self, entity: EntityId, rotation_rad: f64);

    /// Window position of a geographic point, if it is on screen.
    fn screen_position(&self, position: Ecef) -> Option<Vec2>;

    fn set_camera_view(&mut self, view: CameraView);

    fn look_at(&mut self, focus: Ecef, offset: HeadingPitchRange);

    /// Leave any look-at frame and return to the world frame.
    fn detach_camera(&mut self);

    fn request_render(&mut self);

    fn set_imagery(&mut self, basemap: Basemap);

    fn capture_frame(&mut self) -> Result<FrameImage, RenderError>;

    /// Release every entity and resource. Safe to call repeatedly.
    fn destroy(&mut self);
}
