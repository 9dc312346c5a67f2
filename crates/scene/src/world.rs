use foundation::math::{Ecef, Vec2, ecef_to_geodetic};
use tracing::debug;

use crate::camera::{Camera, CameraView, HeadingPitchRange};
use crate::components::{Billboard, Label, PointStyle, Polyline, Transform, Visibility};
use crate::entity::EntityId;
use crate::imagery::Basemap;
use crate::raster;
use crate::render::{FrameImage, RenderError, Renderer};

/// Output size of the headless renderer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Headless, in-memory renderer.
///
/// Stores entities as parallel component columns indexed by entity, tracks
/// the camera, and rasterizes an equirectangular overview on capture.
#[derive(Debug, Default)]
pub struct World {
    next_index: u32,
    transforms: Vec<Option<Transform>>,
    visibility: Vec<Option<Visibility>>,
    polylines: Vec<Option<Polyline>>,
    labels: Vec<Option<Label>>,
    points: Vec<Option<PointStyle>>,
    billboards: Vec<Option<Billboard>>,
    camera: Camera,
    imagery: Basemap,
    viewport: Viewport,
    frames_rendered: u64,
    destroyed: bool,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_viewport(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn imagery(&self) -> Basemap {
        self.imagery
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn entity_count(&self) -> usize {
        self.transforms.iter().filter(|t| t.is_some()).count()
    }

    pub fn position(&self, entity: EntityId) -> Option<Ecef> {
        self.column(&self.transforms, entity).map(|t| t.position)
    }

    /// Entities without an explicit visibility are visible.
    pub fn is_visible(&self, entity: EntityId) -> bool {
        self.column(&self.visibility, entity)
            .unwrap_or_default()
            .visible
    }

    pub fn polyline(&self, entity: EntityId) -> Option<&Polyline> {
        self.column_ref(&self.polylines, entity)
    }

    pub fn label(&self, entity: EntityId) -> Option<&Label> {
        self.column_ref(&self.labels, entity)
    }

    pub fn point(&self, entity: EntityId) -> Option<PointStyle> {
        self.column(&self.points, entity)
    }

    pub fn billboard(&self, entity: EntityId) -> Option<&Billboard> {
        self.column_ref(&self.billboards, entity)
    }

    /// Visible polylines in spawn order.
    pub fn visible_polylines(&self) -> Vec<(EntityId, &Polyline)> {
        self.collect_visible(&self.polylines)
    }

    /// Visible labels with their anchor positions, in spawn order.
    pub fn visible_labels(&self) -> Vec<(EntityId, Ecef, &Label)> {
        self.collect_visible(&self.labels)
            .into_iter()
            .filter_map(|(id, label)| self.position(id).map(|p| (id, p, label)))
            .collect()
    }

    pub fn visible_points(&self) -> Vec<(EntityId, Ecef, PointStyle)> {
        self.collect_visible(&self.points)
            .into_iter()
            .filter_map(|(id, point)| self.position(id).map(|p| (id, p, *point)))
            .collect()
    }

    pub fn visible_billboards(&self) -> Vec<(EntityId, Ecef, &Billboard)> {
        self.collect_visible(&self.billboards)
            .into_iter()
            .filter_map(|(id, billboard)| self.position(id).map(|p| (id, p, billboard)))
            .collect()
    }

    fn spawn(&mut self, position: Ecef) -> EntityId {
        let id = EntityId::from_index(self.next_index);
        self.next_index += 1;
        self.ensure_capacity(id.index() as usize);
        self.transforms[id.index() as usize] = Some(Transform::translate(position));
        id
    }

    fn alive(&self, entity: EntityId) -> bool {
        !self.destroyed
            && self
                .transforms
                .get(entity.index() as usize)
                .is_some_and(|t| t.is_some())
    }

    fn column<T: Copy>(&self, column: &[Option<T>], entity: EntityId) -> Option<T> {
        column.get(entity.index() as usize).and_then(|v| *v)
    }

    fn column_ref<'a, T>(&self, column: &'a [Option<T>], entity: EntityId) -> Option<&'a T> {
        column.get(entity.index() as usize).and_then(|v| v.as_ref())
    }

    fn collect_visible<'a, T>(&self, column: &'a [Option<T>]) -> Vec<(EntityId, &'a T)> {
        let mut out = Vec::new();
        for (idx, component) in column.iter().enumerate() {
            let Some(component) = component else { continue };
            let id = EntityId::from_index(idx as u32);
            if !self.is_visible(id) {
                continue;
            }
            out.push((id, component));
        }
        out
    }

    fn ensure_capacity(&mut self, idx: usize) {
        if self.transforms.len() <= idx {
            let new_len = idx + 1;
            self.transforms.resize(new_len, None);
            self.visibility.resize(new_len, None);
            self.polylines.resize(new_len, None);
            self.labels.resize(new_len, None);
            self.points.resize(new_len, None);
            self.billboards.resize(new_len, None);
        }
    }
}

impl Renderer for World {
    fn add_polyline(&mut self, polyline: Polyline) -> EntityId {
        let anchor = polyline
            .positions
            .first()
            .copied()
            .unwrap_or(Ecef::new(0.0, 0.0, 0.0));
        let id = self.spawn(anchor);
        self.polylines[id.index() as usize] = Some(polyline);
        id
    }

    fn set_polyline_positions(&mut self, entity: EntityId, positions: &[Ecef]) {
        if !self.alive(entity) {
            return;
        }
        if let Some(Some(polyline)) = self.polylines.get_mut(entity.index() as usize) {
            polyline.positions.clear();
            polyline.positions.extend_from_slice(positions);
        }
    }

    fn add_label(&mut self, position: Ecef, label: Label) -> EntityId {
        let id = self.spawn(position);
        self.labels[id.index() as usize] = Some(label);
        id
    }

    fn add_marker(&mut self, position: Ecef, point: PointStyle, label: Label) -> EntityId {
        let id = self.spawn(position);
        self.points[id.index() as usize] = Some(point);
        self.labels[id.index() as usize] = Some(label);
        id
    }

    fn add_billboard(&mut self, position: Ecef, billboard: Billboard) -> EntityId {
        let id = self.spawn(position);
        self.billboards[id.index() as usize] = Some(billboard);
        id
    }

    fn set_position(&mut self, entity: EntityId, position: Ecef) {
        if !self.alive(entity) {
            return;
        }
        self.transforms[entity.index() as usize] = Some(Transform::translate(position));
    }

    fn set_visible(&mut self, entity: EntityId, visible: bool) {
        if !self.alive(entity) {
            return;
        }
        self.visibility[entity.index() as usize] = Some(Visibility::from(visible));
    }

    fn set_billboard_image(&mut self, entity: EntityId, image: &str) {
        if !self.alive(entity) {
            return;
        }
        if let Some(Some(billboard)) = self.billboards.get_mut(entity.index() as usize) {
            billboard.image.clear();
            billboard.image.push_str(image);
        }
    }

    fn set_billboard_rotation(&mut self, entity: EntityId, rotation_rad: f64) {
        if !self.alive(entity) {
            return;
        }
        if let Some(Some(billboard)) = self.billboards.get_mut(entity.index() as usize) {
            billboard.rotation_rad = rotation_rad;
        }
    }

    fn screen_position(&self, position: Ecef) -> Option<Vec2> {
        if self.destroyed || !position.is_finite() {
            return None;
        }
        let geo = ecef_to_geodetic(position);
        Some(raster::project(
            geo.lon_deg(),
            geo.lat_deg(),
            self.viewport.width,
            self.viewport.height,
        ))
    }

    fn set_camera_view(&mut self, view: CameraView) {
        if self.destroyed {
            return;
        }
        self.camera.set_view(view);
    }

    fn look_at(&mut self, focus: Ecef, offset: HeadingPitchRange) {
        if self.destroyed {
            return;
        }
        self.camera.look_at(focus, offset);
    }

    fn detach_camera(&mut self) {
        if self.destroyed {
            return;
        }
        self.camera.detach();
    }

    fn request_render(&mut self) {
        if self.destroyed {
            return;
        }
        self.frames_rendered += 1;
    }

    fn set_imagery(&mut self, basemap: Basemap) {
        if self.destroyed {
            return;
        }
        self.imagery = basemap;
    }

    fn capture_frame(&mut self) -> Result<FrameImage, RenderError> {
        if self.destroyed {
            return Err(RenderError::Destroyed);
        }
        let image = raster::rasterize(self);
        let png = raster::encode_png(&image)?;
        Ok(FrameImage {
            width: image.width(),
            height: image.height(),
            png,
        })
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        debug!(entities = self.entity_count(), "destroying headless world");
        let viewport = self.viewport;
        *self = Self {
            viewport,
            destroyed: true,
            ..Self::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::World;
    use crate::camera::{CameraFrame, HeadingPitchRange};
    use crate::components::{Billboard, Label, LabelStyle, PointStyle, Polyline, PolylineStyle};
    use crate::imagery::Basemap;
    use crate::render::{RenderError, Renderer};
    use foundation::math::{Ecef, Geodetic};

    fn pos(lon: f64, lat: f64) -> Ecef {
        Geodetic::from_degrees(lon, lat, 12_000.0).to_ecef()
    }

    #[test]
    fn spawn_and_collect_visible_labels() {
        let mut world = World::new();
        let shown = world.add_label(pos(0.0, 0.0), Label::new("+120 km", LabelStyle::default()));
        let hidden = world.add_label(pos(1.0, 1.0), Label::new("+80 km", LabelStyle::default()));
        world.set_visible(hidden, false);

        let labels = world.visible_labels();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].0, shown);
        assert_eq!(labels[0].2.text, "+120 km");
    }

    #[test]
    fn marker_carries_point_and_label() {
        let mut world = World::new();
        let marker = world.add_marker(
            pos(-74.0, 40.7),
            PointStyle::default(),
            Label::new("NOVA YORK", LabelStyle::default()),
        );
        assert!(world.point(marker).is_some());
        assert_eq!(world.label(marker).unwrap().text, "NOVA YORK");

        world.set_visible(marker, false);
        assert!(world.visible_points().is_empty());
        assert!(world.visible_labels().is_empty());
    }

    #[test]
    fn polyline_positions_are_replaced() {
        let mut world = World::new();
        let line = world.add_polyline(Polyline::new(vec![pos(0.0, 0.0)], PolylineStyle::default()));
        world.set_polyline_positions(line, &[pos(0.0, 0.0), pos(1.0, 0.0), pos(2.0, 0.0)]);
        assert_eq!(world.polyline(line).unwrap().positions.len(), 3);
        world.set_polyline_positions(line, &[pos(5.0, 5.0)]);
        assert_eq!(world.polyline(line).unwrap().positions, vec![pos(5.0, 5.0)]);
    }

    #[test]
    fn billboard_updates() {
        let mut world = World::new();
        let vehicle = world.add_billboard(pos(0.0, 0.0), Billboard::new("plane.svg", 46.0, 46.0));
        world.set_billboard_image(vehicle, "car.svg");
        world.set_billboard_rotation(vehicle, 0.5);
        world.set_position(vehicle, pos(3.0, 4.0));

        let billboard = world.billboard(vehicle).unwrap();
        assert_eq!(billboard.image, "car.svg");
        assert_eq!(billboard.rotation_rad, 0.5);
        assert_eq!(world.position(vehicle), Some(pos(3.0, 4.0)));
    }

    #[test]
    fn camera_follows_look_at_and_detach() {
        let mut world = World::new();
        let focus = pos(10.0, 10.0);
        world.look_at(focus, HeadingPitchRange::new(0.0, -0.8, 200_000.0));
        assert!(matches!(world.camera().frame, CameraFrame::LookAt { .. }));
        world.detach_camera();
        assert_eq!(world.camera().frame, CameraFrame::World);
    }

    #[test]
    fn screen_position_projects_equirectangular() {
        let world = World::new();
        let center = world.screen_position(pos(0.0, 0.0)).unwrap();
        assert!((center.x - 640.0).abs() < 1e-6);
        assert!((center.y - 360.0).abs() < 1e-6);
    }

    #[test]
    fn capture_produces_png() {
        let mut world = World::new();
        world.add_polyline(Polyline::new(
            vec![pos(-74.0, 40.7), pos(39.5, -6.4)],
            PolylineStyle::default(),
        ));
        let frame = world.capture_frame().unwrap();
        assert_eq!((frame.width, frame.height), (1280, 720));
        assert_eq!(&frame.png[1..4], b"PNG");
    }

    #[test]
    fn destroy_is_idempotent_and_final() {
        let mut world = World::new();
        let label = world.add_label(pos(0.0, 0.0), Label::new("x", LabelStyle::default()));
        world.request_render();
        world.destroy();
        world.destroy();

        assert!(world.is_destroyed());
        assert_eq!(world.entity_count(), 0);
        world.set_visible(label, true);
        world.set_imagery(Basemap::Dark);
        world.request_render();
        assert_eq!(world.frames_rendered(), 0);
        assert_eq!(world.imagery(), Basemap::Satellite);
        assert!(matches!(world.capture_frame(), Err(RenderError::Destroyed)));
        assert!(world.screen_position(pos(0.0, 0.0)).is_none());
    }
}
