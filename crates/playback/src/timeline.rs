//! Sequenced drive of the progress value through each leg.
//!
//! A timeline is a list of steps laid out on one time axis: for every leg a
//! zero-length cue, an eased drive from the leg's first to last path index,
//! then a short hold. [`Timeline::advance`] moves the playhead and reports
//! what happened, in order, so callers never miss a cue or a leg completion
//! even when a single tick spans several steps.

use foundation::time::{Time, TimeSpan};
use trip::FlatPath;

use crate::ease::Ease;
use crate::profile::PlaybackProfile;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Step {
    Cue {
        leg: usize,
        at: Time,
    },
    Drive {
        leg: usize,
        from: f64,
        to: f64,
        span: TimeSpan,
        ease: Ease,
    },
    Hold {
        span: TimeSpan,
    },
}

impl Step {
    fn end(&self) -> Time {
        match *self {
            Step::Cue { at, .. } => at,
            Step::Drive { span, .. } | Step::Hold { span } => span.end,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TimelineEvent {
    /// A leg's cue was reached; its drive starts now.
    LegStarted { leg: usize },
    /// Progress value after this tick.
    Progress { leg: usize, t: f64 },
    /// The leg's drive reached its end index.
    LegCompleted { leg: usize, t: f64 },
    Finished,
}

#[derive(Debug, Clone)]
pub struct Timeline {
    steps: Vec<Step>,
    cursor: usize,
    playhead: Time,
    t: f64,
    paused: bool,
    finished: bool,
}

impl Timeline {
    pub fn new(steps: Vec<Step>, start_t: f64) -> Self {
        Self {
            steps,
            cursor: 0,
            playhead: Time(0.0),
            t: start_t,
            paused: false,
            finished: false,
        }
    }

    /// One cue, drive and hold per leg of `path`; `leg_km[i]` sizes leg `i`.
    pub fn for_path(path: &FlatPath, leg_km: &[f64], profile: &PlaybackProfile) -> Self {
        let mut steps = Vec::with_capacity(path.ranges.len() * 3);
        let mut at = Time(0.0);
        for (leg, range) in path.ranges.iter().enumerate() {
            let km = leg_km.get(leg).copied().unwrap_or(0.0);
            let duration = profile.timing.duration_s(km, range.span());
            steps.push(Step::Cue { leg, at });
            let drive = TimeSpan::starting_at(at, duration);
            steps.push(Step::Drive {
                leg,
                from: range.start as f64,
                to: range.end as f64,
                span: drive,
                ease: profile.ease,
            });
            let hold = TimeSpan::starting_at(drive.end, profile.leg_pause_s);
            steps.push(Step::Hold { span: hold });
            at = hold.end;
        }
        let start_t = path.ranges.first().map(|r| r.start as f64).unwrap_or(0.0);
        Self::new(steps, start_t)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn duration_s(&self) -> f64 {
        self.steps.last().map(|s| s.end().0).unwrap_or(0.0)
    }

    pub fn playhead(&self) -> Time {
        self.playhead
    }

    /// Current progress value, a fractional index into the flat path.
    pub fn progress(&self) -> f64 {
        self.t
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Move the playhead by `dt_s` and report what was crossed.
    ///
    /// Paused or finished timelines do not move. `advance(0.0)` on a fresh
    /// timeline fires the first cue and an initial progress event.
    pub fn advance(&mut self, dt_s: f64) -> Vec<TimelineEvent> {
        let mut events = Vec::new();
        if self.paused || self.finished {
            return events;
        }
        let dt_s = if dt_s.is_finite() { dt_s.max(0.0) } else { 0.0 };
        self.playhead = Time(self.playhead.0 + dt_s);
        let now = self.playhead;

        while let Some(step) = self.steps.get(self.cursor).copied() {
            match step {
                Step::Cue { leg, at } => {
                    if now < at {
                        break;
                    }
                    events.push(TimelineEvent::LegStarted { leg });
                }
                Step::Drive {
                    leg,
                    from,
                    to,
                    span,
                    ease,
                } => {
                    if now < span.start {
                        break;
                    }
                    let fraction = span.fraction_at(now);
                    self.t = from + (to - from) * ease.apply(fraction);
                    events.push(TimelineEvent::Progress { leg, t: self.t });
                    if fraction < 1.0 {
                        break;
                    }
                    self.t = to;
                    events.push(TimelineEvent::LegCompleted { leg, t: to });
                }
                Step::Hold { span } => {
                    if now < span.end {
                        break;
                    }
                }
            }
            self.cursor += 1;
        }

        if self.cursor >= self.steps.len() {
            self.finished = true;
            events.push(TimelineEvent::Finished);
        }
        events
    }
}
