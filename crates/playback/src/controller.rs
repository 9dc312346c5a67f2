//! Playback Timeline Controller: turns timeline progress into leg starts,
//! frames and exactly-once arrivals.

use trip::{FlatPath, LegRange};

use crate::camera::CameraRig;
use crate::profile::PlaybackProfile;
use crate::timeline::{Timeline, TimelineEvent};

/// Mutable per-run state, created fresh by every `play()`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    /// Fractional index into the flat path.
    pub t: f64,
    pub leg: usize,
    pub camera: CameraRig,
    pub paused: bool,
    pub cancelled: bool,
    pub finished: bool,
}

impl PlaybackState {
    pub fn new(t: f64, camera: CameraRig) -> Self {
        Self {
            t,
            leg: 0,
            camera,
            paused: false,
            cancelled: false,
            finished: false,
        }
    }

    pub fn is_running(&self) -> bool {
        !self.cancelled && !self.finished
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum DriveEvent {
    LegStarted { leg: usize },
    Frame { leg: usize, t: f64 },
    /// The destination of `leg` was reached; fires once per leg.
    Arrived { leg: usize },
    Finished,
}

/// Single drive over a flat path.
#[derive(Debug, Clone)]
pub struct PlaybackController {
    timeline: Timeline,
    ranges: Vec<LegRange>,
    revealed: Vec<bool>,
    reveal_threshold: f64,
    state: PlaybackState,
}

impl PlaybackController {
    pub fn new(path: &FlatPath, leg_km: &[f64], profile: &PlaybackProfile, camera: CameraRig) -> Self {
        let timeline = Timeline::for_path(path, leg_km, profile);
        let state = PlaybackState::new(timeline.progress(), camera);
        Self {
            timeline,
            ranges: path.ranges.clone(),
            revealed: vec![false; path.ranges.len()],
            reveal_threshold: profile.reveal_threshold,
            state,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut PlaybackState {
        &mut self.state
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn is_paused(&self) -> bool {
        self.state.paused
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled
    }

    pub fn is_finished(&self) -> bool {
        self.state.finished
    }

    pub fn pause(&mut self) {
        self.timeline.pause();
        self.state.paused = true;
    }

    pub fn resume(&mut self) {
        self.timeline.resume();
        self.state.paused = false;
    }

    /// Stop producing events. The timeline is left where it was.
    pub fn cancel(&mut self) {
        self.state.cancelled = true;
    }

    /// `(t - start) / max(end - start, 1)` for `leg`.
    pub fn leg_progress(&self, leg: usize, t: f64) -> f64 {
        self.ranges
            .get(leg)
            .map(|r| (t - r.start as f64) / r.span().max(1) as f64)
            .unwrap_or(0.0)
    }

    pub fn advance(&mut self, dt_s: f64) -> Vec<DriveEvent> {
        let mut out = Vec::new();
        if self.state.cancelled {
            return out;
        }
        for event in self.timeline.advance(dt_s) {
            match event {
                TimelineEvent::LegStarted { leg } => {
                    if let Some(flag) = self.revealed.get_mut(leg) {
                        *flag = false;
                    }
                    self.state.leg = leg;
                    out.push(DriveEvent::LegStarted { leg });
                }
                TimelineEvent::Progress { leg, t } => {
                    self.state.t = t;
                    out.push(DriveEvent::Frame { leg, t });
                    if self.leg_progress(leg, t) >= self.reveal_threshold {
                        self.reveal(leg, &mut out);
                    }
                }
                TimelineEvent::LegCompleted { leg, t } => {
                    self.state.t = t;
                    self.reveal(leg, &mut out);
                }
                TimelineEvent::Finished => {
                    self.state.finished = true;
                    out.push(DriveEvent::Finished);
                }
            }
        }
        out
    }

    fn reveal(&mut self, leg: usize, out: &mut Vec<DriveEvent>) {
        let Some(flag) = self.revealed.get_mut(leg) else {
            return;
        };
        if *flag {
            return;
        }
        *flag = true;
        out.push(DriveEvent::Arrived { leg });
    }
}
