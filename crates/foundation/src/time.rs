/// Time primitives
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct Time(pub f64); // seconds

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TimeSpan {
    pub start: Time,
    pub end: Time,
}

impl TimeSpan {
    pub fn new(start: Time, end: Time) -> Self {
        Self { start, end }
    }

    /// Span of `duration_s` seconds starting at `start`; negative durations collapse to an instant.
    pub fn starting_at(start: Time, duration_s: f64) -> Self {
        Self {
            start,
            end: Time(start.0 + duration_s.max(0.0)),
        }
    }

    pub fn instant(t: Time) -> Self {
        Self { start: t, end: t }
    }

    pub fn duration(&self) -> f64 {
        (self.end.0 - self.start.0).max(0.0)
    }

    /// Fraction of the span elapsed at `t`, clamped to `[0, 1]`.
    ///
    /// Instants report `1.0` once reached.
    pub fn fraction_at(&self, t: Time) -> f64 {
        let duration = self.duration();
        if duration == 0.0 {
            return if t.0 >= self.start.0 { 1.0 } else { 0.0 };
        }
        ((t.0 - self.start.0) / duration).clamp(0.0, 1.0)
    }
}
