//! Scene Lifecycle Manager.
//!
//! `Ready -> Playing <-> Paused -> Ready -> Destroyed`.
//! Building happens inside the [`TripScene::create`] future, so a scene the
//! caller can hold always starts `Ready`. The host owns the clock and calls
//! [`TripScene::tick`] once per animation frame; nothing here spawns tasks or
//! threads.

use std::time::Duration;

use foundation::math::{Ecef, Vec2};
use routing::RoadRouter;
use runtime::{Event, EventBus, Frame};
use scene::components::{Billboard, Label, LabelStyle, PointStyle, Polyline, PolylineStyle, Rgba8};
use scene::{Basemap, CameraView, FrameImage, HeadingPitchRange, Orientation, Renderer};
use tokio::sync::oneshot;
use tracing::{debug, info};
use trip::{FlatPath, Mode, Segment, Stop, build_segments, flatten, leg_mode, midpoint, validate_stops};

use crate::camera::{CameraRig, initial_heading, route_span_km};
use crate::controller::{DriveEvent, PlaybackController, PlaybackState};
use crate::error::SceneError;
use crate::frame::{FrameAdapter, SceneEntities};
use crate::icons::vehicle_icon;
use crate::profile::SceneOptions;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SceneState {
    Ready,
    Playing,
    Paused,
    Destroyed,
}

/// Passed to the arrival callback once per leg.
#[derive(Debug, Clone, PartialEq)]
pub struct Arrival {
    pub stop: Stop,
    pub km: f64,
    pub leg_index: usize,
    pub stop_index: usize,
}

pub type ArrivalCallback = Box<dyn FnMut(&Arrival) + Send>;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// The whole route was played.
    Completed,
    /// The drive was killed by `restart` or `destroy`.
    Cancelled,
    /// `play` was refused because a drive was active or the scene is gone.
    Rejected,
}

/// Resolves when the drive started by `play` ends.
#[derive(Debug)]
pub struct PlaybackCompletion {
    rx: oneshot::Receiver<PlaybackOutcome>,
    outcome: Option<PlaybackOutcome>,
}

impl PlaybackCompletion {
    fn channel() -> (oneshot::Sender<PlaybackOutcome>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx, outcome: None })
    }

    fn settled(outcome: PlaybackOutcome) -> Self {
        let (tx, completion) = Self::channel();
        let _ = tx.send(outcome);
        completion
    }

    /// A dropped scene counts as cancelled.
    pub async fn wait(self) -> PlaybackOutcome {
        if let Some(outcome) = self.outcome {
            return outcome;
        }
        self.rx.await.unwrap_or(PlaybackOutcome::Cancelled)
    }

    pub fn try_outcome(&mut self) -> Option<PlaybackOutcome> {
        if self.outcome.is_none() {
            self.outcome = match self.rx.try_recv() {
                Ok(outcome) => Some(outcome),
                Err(oneshot::error::TryRecvError::Empty) => None,
                Err(oneshot::error::TryRecvError::Closed) => Some(PlaybackOutcome::Cancelled),
            };
        }
        self.outcome
    }
}

/// Recorded on the scene's event bus.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    Ready { legs: usize, points: usize },
    Started,
    LegStarted { leg: usize, mode: Mode },
    Arrived { leg: usize, stop_index: usize, km: f64 },
    Paused,
    Resumed,
    Completed,
    Cancelled,
    BasemapChanged(Basemap),
    Destroyed,
}

struct ActiveDrive {
    controller: PlaybackController,
    on_arrival: ArrivalCallback,
    completion: Option<oneshot::Sender<PlaybackOutcome>>,
}

impl ActiveDrive {
    fn resolve(&mut self, outcome: PlaybackOutcome) {
        if let Some(tx) = self.completion.take() {
            let _ = tx.send(outcome);
        }
    }
}

/// A built trip bound to a renderer.
pub struct TripScene<R: Renderer> {
    renderer: R,
    stops: Vec<Stop>,
    modes: Vec<Mode>,
    segments: Vec<Segment>,
    path: FlatPath,
    origin: Ecef,
    options: SceneOptions,
    entities: SceneEntities,
    adapter: FrameAdapter,
    base_range_m: f64,
    initial_heading: f64,
    basemap: Basemap,
    drive: Option<ActiveDrive>,
    state: SceneState,
    frame: Frame,
    events: EventBus<PlaybackEvent>,
}

impl<R: Renderer> TripScene<R> {
    /// Build every leg, place the route's entities and settle the camera.
    ///
    /// Invalid stop lists fail before the renderer is touched. Road lookup
    /// failures never fail the build.
    pub async fn create<Q: RoadRouter + ?Sized>(
        mut renderer: R,
        stops: Vec<Stop>,
        modes: Vec<Mode>,
        options: SceneOptions,
        router: &Q,
    ) -> Result<Self, SceneError> {
        validate_stops(&stops)?;
        debug!(stops = stops.len(), router = router.name(), "building trip scene");

        let modes: Vec<Mode> = (0..stops.len() - 1).map(|i| leg_mode(&modes, i)).collect();
        let segments = build_segments(&stops, &modes, &options.route, router).await;
        let path = flatten(&segments);
        let origin = path.first().ok_or(SceneError::EmptyPath)?;

        renderer.set_imagery(options.basemap);
        let entities = spawn_entities(&mut renderer, &stops, &modes, &segments, origin, &options);

        let camera = &options.playback.camera;
        let base_range_m = camera.span_range.range_for(route_span_km(&stops));
        let initial_heading = initial_heading(&path.full, camera);
        renderer.set_camera_view(CameraView {
            destination: stops[0].position(base_range_m * camera.initial_range_factor),
            orientation: Orientation {
                heading_rad: initial_heading,
                pitch_rad: camera.pitch_rad(),
                roll_rad: 0.0,
            },
        });

        let mut scene = Self {
            renderer,
            basemap: options.basemap,
            adapter: FrameAdapter::new(options.playback.camera.clone()),
            stops,
            modes,
            segments,
            path,
            origin,
            options,
            entities,
            base_range_m,
            initial_heading,
            drive: None,
            state: SceneState::Ready,
            frame: Frame::origin(),
            events: EventBus::new(),
        };

        if scene.options.playback.warm_up.enabled {
            scene.warm_up().await;
        }
        scene.settle().await;

        let ready = PlaybackEvent::Ready {
            legs: scene.segments.len(),
            points: scene.path.len(),
        };
        scene.emit(ready);
        info!(
            legs = scene.segments.len(),
            points = scene.path.len(),
            base_range_m = scene.base_range_m,
            "trip scene ready"
        );
        Ok(scene)
    }

    pub fn state(&self) -> SceneState {
        self.state
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn modes(&self) -> &[Mode] {
        &self.modes
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn path(&self) -> &FlatPath {
        &self.path
    }

    pub fn entities(&self) -> &SceneEntities {
        &self.entities
    }

    pub fn base_range_m(&self) -> f64 {
        self.base_range_m
    }

    pub fn basemap(&self) -> Basemap {
        self.basemap
    }

    /// State of the active drive, if any.
    pub fn playback(&self) -> Option<&PlaybackState> {
        self.drive.as_ref().map(|d| d.controller.state())
    }

    pub fn drain_events(&mut self) -> Vec<Event<PlaybackEvent>> {
        self.events.drain()
    }

    /// Start a fresh drive from the first stop.
    ///
    /// Refused with [`PlaybackOutcome::Rejected`] while a drive is active or
    /// after `destroy`; use [`TripScene::restart`] to replace a running drive.
    pub fn play<F>(&mut self, on_arrival: F) -> PlaybackCompletion
    where
        F: FnMut(&Arrival) + Send + 'static,
    {
        match self.state {
            SceneState::Ready => self.start_drive(Box::new(on_arrival)),
            state => {
                debug!(?state, "play ignored");
                PlaybackCompletion::settled(PlaybackOutcome::Rejected)
            }
        }
    }

    /// Kill any active drive (it resolves as cancelled) and play again.
    pub fn restart<F>(&mut self, on_arrival: F) -> PlaybackCompletion
    where
        F: FnMut(&Arrival) + Send + 'static,
    {
        if self.state == SceneState::Destroyed {
            return PlaybackCompletion::settled(PlaybackOutcome::Rejected);
        }
        self.cancel_drive();
        self.start_drive(Box::new(on_arrival))
    }

    pub fn pause(&mut self) {
        if self.state != SceneState::Playing {
            return;
        }
        if let Some(drive) = self.drive.as_mut() {
            drive.controller.pause();
        }
        self.state = SceneState::Paused;
        self.emit(PlaybackEvent::Paused);
    }

    pub fn resume(&mut self) {
        if self.state != SceneState::Paused {
            return;
        }
        if let Some(drive) = self.drive.as_mut() {
            drive.controller.resume();
        }
        self.state = SceneState::Playing;
        self.emit(PlaybackEvent::Resumed);
    }

    /// Advance the active drive by `dt_s` seconds of host time.
    ///
    /// Returns whether a drive is still active (playing or paused).
    pub fn tick(&mut self, dt_s: f64) -> bool {
        match self.state {
            SceneState::Playing => {
                self.frame = self.frame.advance(dt_s);
                self.step(dt_s);
            }
            SceneState::Paused => self.frame = self.frame.advance(dt_s),
            _ => return false,
        }
        self.drive.is_some()
    }

    pub fn export_frame(&mut self) -> Result<FrameImage, SceneError> {
        if self.state == SceneState::Destroyed {
            return Err(SceneError::Destroyed);
        }
        Ok(self.renderer.capture_frame()?)
    }

    /// Switch imagery; unknown keys select satellite. Returns the active basemap.
    pub fn set_basemap(&mut self, key: &str) -> Basemap {
        if self.state == SceneState::Destroyed {
            return self.basemap;
        }
        let next = Basemap::from_key(key);
        if next != self.basemap {
            self.renderer.set_imagery(next);
            self.basemap = next;
            self.emit(PlaybackEvent::BasemapChanged(next));
        }
        self.basemap
    }

    /// Cancel playback and release the renderer. Idempotent.
    pub fn destroy(&mut self) {
        if self.state == SceneState::Destroyed {
            return;
        }
        self.cancel_drive();
        self.renderer.destroy();
        self.state = SceneState::Destroyed;
        self.emit(PlaybackEvent::Destroyed);
        info!("trip scene destroyed");
    }

    fn emit(&mut self, event: PlaybackEvent) {
        self.events.emit(self.frame, event);
    }

    fn camera_offset(&self, range_m: f64) -> HeadingPitchRange {
        HeadingPitchRange::new(
            self.initial_heading,
            self.options.playback.camera.pitch_rad(),
            range_m,
        )
    }

    async fn render_frames(&mut self, frames: usize) {
        let delay = Duration::from_millis(self.options.playback.warm_up.frame_delay_ms);
        for _ in 0..frames {
            self.renderer.request_render();
            tokio::time::sleep(delay).await;
        }
    }

    /// Visit sampled route points forwards then backwards so imagery along
    /// the whole route is requested before playback.
    async fn warm_up(&mut self) {
        let warm = self.options.playback.warm_up.clone();
        let offset = self.camera_offset(self.base_range_m);
        let samples: Vec<Ecef> = warm
            .sample_indices(self.path.len())
            .into_iter()
            .filter_map(|i| self.path.full.get(i).copied())
            .collect();
        debug!(samples = samples.len(), "warming up route imagery");

        for position in samples.iter().chain(samples.iter().rev()) {
            self.renderer.look_at(*position, offset);
            self.render_frames(warm.frames_per_sample).await;
        }
        self.renderer.look_at(self.origin, offset);
        self.render_frames(warm.final_frames).await;
        self.renderer.detach_camera();
    }

    async fn settle(&mut self) {
        self.render_frames(self.options.playback.warm_up.settle_frames)
            .await;
        let offset = self.camera_offset(self.base_range_m);
        self.renderer.look_at(self.origin, offset);
        self.renderer.detach_camera();
    }

    fn hide_reveals(&mut self) {
        for id in self
            .entities
            .stop_markers
            .iter()
            .chain(self.entities.distance_labels.iter())
        {
            self.renderer.set_visible(*id, false);
        }
    }

    fn start_drive(&mut self, on_arrival: ArrivalCallback) -> PlaybackCompletion {
        let origin = self.origin;
        self.renderer
            .set_polyline_positions(self.entities.trail, &[origin]);
        self.renderer.set_position(self.entities.vehicle, origin);
        let rig = CameraRig::new(
            origin,
            self.initial_heading,
            self.options.playback.camera.pitch_rad(),
            self.base_range_m,
        );
        self.renderer.look_at(origin, rig.offset());
        self.hide_reveals();

        let leg_km: Vec<f64> = self.segments.iter().map(|s| s.km).collect();
        let controller = PlaybackController::new(&self.path, &leg_km, &self.options.playback, rig);
        let (tx, completion) = PlaybackCompletion::channel();
        self.drive = Some(ActiveDrive {
            controller,
            on_arrival,
            completion: Some(tx),
        });
        self.state = SceneState::Playing;
        self.emit(PlaybackEvent::Started);
        info!(legs = self.segments.len(), "playback started");

        self.step(0.0);
        completion
    }

    fn cancel_drive(&mut self) {
        let Some(mut drive) = self.drive.take() else {
            return;
        };
        drive.controller.cancel();
        drive.resolve(PlaybackOutcome::Cancelled);
        self.state = SceneState::Ready;
        self.emit(PlaybackEvent::Cancelled);
        debug!("playback cancelled");
    }

    fn step(&mut self, dt_s: f64) {
        let Some(mut drive) = self.drive.take() else {
            return;
        };
        let events = drive.controller.advance(dt_s);
        // Only the newest progress value is drawn, so the camera eases once per tick.
        let drawn = events
            .iter()
            .rposition(|event| matches!(event, DriveEvent::Frame { .. }));
        for (index, event) in events.into_iter().enumerate() {
            if drive.controller.is_cancelled() {
                break;
            }
            match event {
                DriveEvent::LegStarted { leg } => self.leg_started(&mut drive, leg),
                DriveEvent::Frame { t, .. } if Some(index) == drawn => {
                    let frame =
                        self.adapter
                            .compute(&self.path, drive.controller.state_mut(), t, dt_s);
                    if let Some(frame) = frame {
                        self.adapter.apply(&mut self.renderer, &self.entities, &frame);
                    }
                }
                DriveEvent::Frame { .. } => {}
                DriveEvent::Arrived { leg } => self.arrived(&mut drive, leg),
                DriveEvent::Finished => {
                    self.finish(drive);
                    return;
                }
            }
        }
        self.drive = Some(drive);
    }

    fn leg_started(&mut self, drive: &mut ActiveDrive, leg: usize) {
        let mode = leg_mode(&self.modes, leg);
        self.renderer
            .set_billboard_image(self.entities.vehicle, &vehicle_icon(mode));
        let km = self.segments.get(leg).map(|s| s.km).unwrap_or(0.0);
        drive.controller.state_mut().camera.range_target_m =
            self.options.playback.camera.leg_range.range_for(km);
        self.hide_reveals();
        self.emit(PlaybackEvent::LegStarted { leg, mode });
        debug!(leg, %mode, km, "leg started");
    }

    fn arrived(&mut self, drive: &mut ActiveDrive, leg: usize) {
        let stop_index = leg + 1;
        if let Some(marker) = self.entities.stop_markers.get(stop_index) {
            self.renderer.set_visible(*marker, true);
        }
        if let Some(label) = self.entities.distance_labels.get(leg) {
            self.renderer.set_visible(*label, true);
        }
        let Some(stop) = self.stops.get(stop_index) else {
            return;
        };
        let km = self.segments.get(leg).map(|s| s.km).unwrap_or(0.0);
        let arrival = Arrival {
            stop: stop.clone(),
            km,
            leg_index: leg,
            stop_index,
        };
        (drive.on_arrival)(&arrival);
        self.emit(PlaybackEvent::Arrived {
            leg,
            stop_index,
            km,
        });
        debug!(leg, city = %arrival.stop.city, km, "arrived");
    }

    fn finish(&mut self, mut drive: ActiveDrive) {
        self.hide_reveals();
        self.renderer.detach_camera();
        self.renderer.request_render();
        drive.resolve(PlaybackOutcome::Completed);
        self.state = SceneState::Ready;
        self.emit(PlaybackEvent::Completed);
        info!("playback completed");
    }
}

fn spawn_entities<R: Renderer + ?Sized>(
    renderer: &mut R,
    stops: &[Stop],
    modes: &[Mode],
    segments: &[Segment],
    origin: Ecef,
    options: &SceneOptions,
) -> SceneEntities {
    let style = &options.style;
    let text = style.text_rgba();
    let label_style = |offset_px: f64| LabelStyle {
        font: style.label_font.clone(),
        fill: text,
        outline: Rgba8::WHITE,
        outline_width_px: 3.0,
        pixel_offset: Vec2::new(0.0, offset_px),
    };

    let trail = renderer.add_polyline(Polyline::new(
        vec![origin],
        PolylineStyle {
            width_px: style.trail_width_px,
            color: style.trail_rgba(),
            glow_power: style.trail_glow,
        },
    ));

    let distance_labels = segments
        .iter()
        .map(|segment| {
            let anchor = midpoint(&segment.points).unwrap_or(origin);
            let text = format!("+{} km", segment.km.round() as i64);
            let id = renderer.add_label(
                anchor,
                Label::new(text, label_style(style.distance_label_offset_px)),
            );
            renderer.set_visible(id, false);
            id
        })
        .collect();

    let stop_markers = stops
        .iter()
        .enumerate()
        .map(|(index, stop)| {
            let id = renderer.add_marker(
                stop.position(options.route.base_height_m),
                PointStyle {
                    pixel_size: style.marker_size_px,
                    color: text,
                    outline: Rgba8::WHITE,
                    outline_width_px: 2.0,
                },
                Label::new(stop.city.clone(), label_style(style.stop_label_offset_px)),
            );
            renderer.set_visible(id, index == 0);
            id
        })
        .collect();

    let vehicle = renderer.add_billboard(
        origin,
        Billboard::new(
            vehicle_icon(leg_mode(modes, 0)),
            style.vehicle_size_px,
            style.vehicle_size_px,
        ),
    );

    SceneEntities {
        trail,
        vehicle,
        distance_labels,
        stop_markers,
    }
}
