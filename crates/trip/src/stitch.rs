use foundation::math::Ecef;
use serde::{Deserialize, Serialize};

use crate::model::Segment;

/// Inclusive index span of one leg inside [`FlatPath::full`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegRange {
    pub start: usize,
    pub end: usize,
}

impl LegRange {
    /// Index distance covered by the leg; zero only for single-point legs.
    pub fn span(&self) -> usize {
        self.end - self.start
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.start..=self.end).contains(&index)
    }
}

/// All legs concatenated into one traversal.
///
/// Adjacent legs share their boundary point: `full[ranges[i].end]` is the
/// same index as `full[ranges[i + 1].start]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatPath {
    pub full: Vec<Ecef>,
    pub ranges: Vec<LegRange>,
}

pub fn flatten(segments: &[Segment]) -> FlatPath {
    let total = segments.iter().map(|s| s.points.len()).sum::<usize>();
    let mut full = Vec::with_capacity(total);
    let mut ranges = Vec::with_capacity(segments.len());

    for (i, segment) in segments.iter().enumerate() {
        let points = &segment.points;
        if points.is_empty() {
            let at = full.len().saturating_sub(1);
            ranges.push(LegRange { start: at, end: at });
            continue;
        }
        if i == 0 || full.is_empty() {
            full.extend_from_slice(points);
            ranges.push(LegRange {
                start: 0,
                end: points.len() - 1,
            });
        } else {
            let start = full.len() - 1;
            full.extend_from_slice(&points[1..]);
            ranges.push(LegRange {
                start,
                end: start + points.len() - 1,
            });
        }
    }

    FlatPath { full, ranges }
}

impl FlatPath {
    pub fn len(&self) -> usize {
        self.full.len()
    }

    pub fn is_empty(&self) -> bool {
        self.full.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.full.len().saturating_sub(1)
    }

    pub fn first(&self) -> Option<Ecef> {
        self.full.first().copied()
    }

    /// Interpolated position at fractional index `t`, clamped to the path.
    pub fn position_at(&self, t: f64) -> Option<Ecef> {
        lerp_position(&self.full, t)
    }

    /// Leg whose range contains `t`; boundary indices belong to the earlier leg.
    pub fn leg_at(&self, t: f64) -> Option<usize> {
        if self.ranges.is_empty() {
            return None;
        }
        let t = clamp_index(t, self.last_index());
        self.ranges
            .iter()
            .position(|r| t <= r.end as f64)
            .or(Some(self.ranges.len() - 1))
    }

    /// Trail drawn up to `t`: the path prefix before `floor(t)` (at least the
    /// first point) followed by the live position.
    pub fn trail_at(&self, t: f64) -> Vec<Ecef> {
        let Some(pos) = self.position_at(t) else {
            return Vec::new();
        };
        let end = (clamp_index(t, self.last_index()).floor() as usize).max(1);
        let end = end.min(self.full.len());
        let mut trail = Vec::with_capacity(end + 1);
        trail.extend_from_slice(&self.full[..end]);
        trail.push(pos);
        trail
    }
}

fn clamp_index(t: f64, last: usize) -> f64 {
    if t.is_nan() {
        return 0.0;
    }
    t.clamp(0.0, last as f64)
}

/// `lerp(points[floor(t)], points[floor(t) + 1], frac(t))`, indices clamped.
pub fn lerp_position(points: &[Ecef], t: f64) -> Option<Ecef> {
    let last = points.len().checked_sub(1)?;
    let t = clamp_index(t, last);
    let i = t.floor() as usize;
    let frac = t - i as f64;
    let a = points[i.min(last)];
    let b = points[(i + 1).min(last)];
    Some(a.lerp(b, frac))
}

/// Middle point of a leg, used to anchor its distance label.
pub fn midpoint(points: &[Ecef]) -> Option<Ecef> {
    points.get(points.len() / 2).copied()
}

#[cfg(test)]
mod tests {
    use super::{FlatPath, LegRange, flatten, lerp_position, midpoint};
    use crate::model::{Mode, PathSource, Segment};
    use foundation::math::Ecef;
    use pretty_assertions::assert_eq;

    fn segment(xs: &[f64]) -> Segment {
        Segment {
            mode: Mode::Plane,
            points: xs.iter().map(|x| Ecef::new(*x, 0.0, 0.0)).collect(),
            km: 1.0,
            source: PathSource::Arc,
        }
    }

    fn xs(path: &[Ecef]) -> Vec<f64> {
        path.iter().map(|p| p.x).collect()
    }

    #[test]
    fn single_leg_keeps_all_points() {
        let path = flatten(&[segment(&[0.0, 1.0, 2.0, 3.0])]);
        assert_eq!(path.len(), 4);
        assert_eq!(path.ranges, vec![LegRange { start: 0, end: 3 }]);
    }

    #[test]
    fn joins_share_boundary_point() {
        let path = flatten(&[
            segment(&[0.0, 1.0, 2.0]),
            segment(&[2.0, 3.0]),
            segment(&[3.0, 4.0, 5.0, 6.0]),
        ]);
        assert_eq!(xs(&path.full), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(
            path.ranges,
            vec![
                LegRange { start: 0, end: 2 },
                LegRange { start: 2, end: 3 },
                LegRange { start: 3, end: 6 },
            ]
        );
        for pair in path.ranges.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
            assert_eq!(path.full[pair[0].end], path.full[pair[1].start]);
        }
        assert_eq!(path.ranges[2].span() + 1, 4);
    }

    #[test]
    fn position_interpolates_and_clamps() {
        let points: Vec<Ecef> = [0.0, 10.0, 20.0].iter().map(|x| Ecef::new(*x, 0.0, 0.0)).collect();
        assert_eq!(lerp_position(&points, 0.5).unwrap().x, 5.0);
        assert_eq!(lerp_position(&points, 1.25).unwrap().x, 12.5);
        assert_eq!(lerp_position(&points, 2.0).unwrap().x, 20.0);
        assert_eq!(lerp_position(&points, 9.0).unwrap().x, 20.0);
        assert_eq!(lerp_position(&points, -1.0).unwrap().x, 0.0);
        assert_eq!(lerp_position(&points, f64::NAN).unwrap().x, 0.0);
        assert!(lerp_position(&[], 0.0).is_none());
    }

    #[test]
    fn trail_is_prefix_plus_live_point() {
        let path = flatten(&[segment(&[0.0, 10.0, 20.0, 30.0])]);
        assert_eq!(xs(&path.trail_at(0.0)), vec![0.0, 0.0]);
        assert_eq!(xs(&path.trail_at(0.5)), vec![0.0, 5.0]);
        assert_eq!(xs(&path.trail_at(2.5)), vec![0.0, 10.0, 25.0]);
        assert_eq!(xs(&path.trail_at(3.0)), vec![0.0, 10.0, 20.0, 30.0]);
        assert!(FlatPath::default().trail_at(1.0).is_empty());
    }

    #[test]
    fn leg_lookup_prefers_earlier_leg_at_boundary() {
        let path = flatten(&[segment(&[0.0, 1.0, 2.0]), segment(&[2.0, 3.0, 4.0])]);
        assert_eq!(path.leg_at(1.0), Some(0));
        assert_eq!(path.leg_at(2.0), Some(0));
        assert_eq!(path.leg_at(2.5), Some(1));
        assert_eq!(path.leg_at(99.0), Some(1));
    }

    #[test]
    fn midpoint_picks_middle_index() {
        let seg = segment(&[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(midpoint(&seg.points).unwrap().x, 2.0);
        assert!(midpoint(&[]).is_none());
    }
}
