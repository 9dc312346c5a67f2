//! Frame Renderer Adapter.
//!
//! [`FrameAdapter::compute`] turns the progress value into a [`FrameState`];
//! [`FrameAdapter::apply`] is the only place that pushes it to the renderer.

use foundation::math::Ecef;
use scene::entity::EntityId;
use scene::{HeadingPitchRange, Renderer};
use trip::FlatPath;

use crate::camera::heading_between;
use crate::controller::PlaybackState;
use crate::profile::CameraProfile;

/// Renderer entities owned by one scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneEntities {
    pub trail: EntityId,
    pub vehicle: EntityId,
    /// One per leg, at the leg's middle point.
    pub distance_labels: Vec<EntityId>,
    /// One per stop.
    pub stop_markers: Vec<EntityId>,
}

/// Everything drawn for one progress value.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameState {
    pub t: f64,
    pub vehicle: Ecef,
    pub trail: Vec<Ecef>,
    pub focus: Ecef,
    pub camera: HeadingPitchRange,
    /// Billboard rotation; `None` keeps the previous one.
    pub vehicle_rotation_rad: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct FrameAdapter {
    camera: CameraProfile,
}

impl FrameAdapter {
    pub fn new(camera: CameraProfile) -> Self {
        Self { camera }
    }

    pub fn camera_profile(&self) -> &CameraProfile {
        &self.camera
    }

    /// Frame for `t`, easing the camera in `state` by `dt_s`.
    ///
    /// Vehicle position, trail and rotation depend on `t` alone.
    pub fn compute(
        &self,
        path: &FlatPath,
        state: &mut PlaybackState,
        t: f64,
        dt_s: f64,
    ) -> Option<FrameState> {
        let vehicle = path.position_at(t)?;
        let trail = path.trail_at(t);
        let last = path.last_index() as f64;

        let look_ahead = path.position_at((t + self.camera.look_ahead).min(last))?;
        state.t = t;
        state.camera.follow(look_ahead, dt_s, &self.camera);

        let next = path.position_at((t + self.camera.heading_look_ahead).min(last))?;
        let camera_heading = state.camera.heading_rad;
        let vehicle_rotation_rad =
            heading_between(vehicle, next).map(|path_heading| -(path_heading - camera_heading));

        Some(FrameState {
            t,
            vehicle,
            trail,
            focus: state.camera.focus,
            camera: state.camera.offset(),
            vehicle_rotation_rad,
        })
    }

    pub fn apply<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
        entities: &SceneEntities,
        frame: &FrameState,
    ) {
        renderer.set_position(entities.vehicle, frame.vehicle);
        renderer.set_polyline_positions(entities.trail, &frame.trail);
        renderer.look_at(frame.focus, frame.camera);
        if let Some(rotation) = frame.vehicle_rotation_rad {
            renderer.set_billboard_rotation(entities.vehicle, rotation);
        }
        renderer.request_render();
    }
}
