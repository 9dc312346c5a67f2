use foundation::time::Time;

/// Host tick metadata.
///
/// The host's animation loop hands one of these to the engine per tick. Delta
/// times may vary between ticks; `time` accumulates them so a recorded run can
/// be replayed tick for tick.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Delta time since the previous frame (seconds).
    pub dt_s: f64,
    /// Engine time at the end of the frame (seconds).
    pub time: Time,
}

impl Frame {
    /// The frame that precedes any tick.
    pub fn origin() -> Self {
        Self {
            index: 0,
            dt_s: 0.0,
            time: Time(0.0),
        }
    }

    /// Fixed-rate frame; time is `index * dt_s`.
    pub fn new(index: u64, dt_s: f64) -> Self {
        Self {
            index,
            dt_s,
            time: Time(index as f64 * dt_s),
        }
    }

    pub fn next(self) -> Self {
        self.advance(self.dt_s)
    }

    /// Next frame with an explicit delta; negative or non-finite deltas count as zero.
    pub fn advance(self, dt_s: f64) -> Self {
        let dt_s = if dt_s.is_finite() { dt_s.max(0.0) } else { 0.0 };
        Self {
            index: self.index + 1,
            dt_s,
            time: Time(self.time.0 + dt_s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Frame;
    use foundation::time::Time;

    #[test]
    fn frame_time_is_deterministic() {
        let a = Frame::new(10, 1.0 / 60.0);
        let b = Frame::new(10, 1.0 / 60.0);
        assert_eq!(a, b);
        assert_eq!(a.time, Time(10.0 / 60.0));
    }

    #[test]
    fn next_advances_index_and_time() {
        let f0 = Frame::new(0, 0.5);
        let f1 = f0.next();
        assert_eq!(f1.index, 1);
        assert_eq!(f1.time, Time(0.5));
    }

    #[test]
    fn advance_accumulates_variable_deltas() {
        let f = Frame::origin().advance(0.25).advance(0.5);
        assert_eq!(f.index, 2);
        assert_eq!(f.dt_s, 0.5);
        assert_eq!(f.time, Time(0.75));
    }

    #[test]
    fn advance_ignores_bad_deltas() {
        let f = Frame::origin().advance(-1.0).advance(f64::NAN);
        assert_eq!(f.index, 2);
        assert_eq!(f.time, Time(0.0));
    }
}
