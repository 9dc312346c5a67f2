use std::fmt;
use std::str::FromStr;

use foundation::math::{Ecef, Geodetic};
use serde::{Deserialize, Serialize};

use crate::error::TripError;

/// A place on the trip, lon/lat in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub city: String,
    #[serde(default)]
    pub country: String,
    pub lon: f64,
    pub lat: f64,
}

impl Stop {
    pub fn new(city: impl Into<String>, country: impl Into<String>, lon: f64, lat: f64) -> Self {
        Self {
            city: city.into(),
            country: country.into(),
            lon,
            lat,
        }
    }

    pub fn geodetic(&self, alt_m: f64) -> Geodetic {
        Geodetic::from_degrees(self.lon, self.lat, alt_m)
    }

    pub fn position(&self, alt_m: f64) -> Ecef {
        self.geodetic(alt_m).to_ecef()
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Car,
    Train,
    Bike,
    #[default]
    Plane,
    Ship,
    Walk,
}

impl Mode {
    pub const ALL: [Mode; 6] = [
        Mode::Car,
        Mode::Train,
        Mode::Bike,
        Mode::Plane,
        Mode::Ship,
        Mode::Walk,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Mode::Car => "car",
            Mode::Train => "train",
            Mode::Bike => "bike",
            Mode::Plane => "plane",
            Mode::Ship => "ship",
            Mode::Walk => "walk",
        }
    }

    /// Modes whose geometry comes from the road router.
    pub fn is_road(self) -> bool {
        matches!(self, Mode::Car | Mode::Train | Mode::Bike | Mode::Walk)
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Mode::Car => "\u{1F697}",
            Mode::Train => "\u{1F686}",
            Mode::Bike => "\u{1F6B2}",
            Mode::Plane => "\u{2708}\u{FE0F}",
            Mode::Ship => "\u{1F6A2}",
            Mode::Walk => "\u{1F6B6}",
        }
    }
}

impl FromStr for Mode {
    type Err = TripError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Mode::ALL
            .into_iter()
            .find(|mode| mode.key() == key)
            .ok_or_else(|| TripError::UnknownMode(s.to_string()))
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Mode of leg `index`; legs without an explicit mode fly.
pub fn leg_mode(modes: &[Mode], index: usize) -> Mode {
    modes.get(index).copied().unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leg<'a> {
    pub index: usize,
    pub from: &'a Stop,
    pub to: &'a Stop,
    pub mode: Mode,
}

/// Consecutive stop pairs with their modes.
pub fn legs<'a>(stops: &'a [Stop], modes: &[Mode]) -> Vec<Leg<'a>> {
    stops
        .windows(2)
        .enumerate()
        .map(|(index, pair)| Leg {
            index,
            from: &pair[0],
            to: &pair[1],
            mode: leg_mode(modes, index),
        })
        .collect()
}

/// Where a segment's geometry came from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathSource {
    Arc,
    Sea,
    Road,
    /// Road lookup failed; the leg flies a geodesic arc instead.
    ArcFallback,
}

/// Computed geometry of one leg. Always holds at least two points.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub mode: Mode,
    pub points: Vec<Ecef>,
    pub km: f64,
    pub source: PathSource,
}

impl Segment {
    pub fn summary(&self, index: usize) -> SegmentSummary {
        SegmentSummary {
            leg: index,
            mode: self.mode,
            km: self.km,
            points: self.points.len(),
            source: self.source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentSummary {
    pub leg: usize,
    pub mode: Mode,
    pub km: f64,
    pub points: usize,
    pub source: PathSource,
}

#[cfg(test)]
mod tests {
    use super::{Mode, Stop, leg_mode, legs};
    use crate::error::TripError;
    use pretty_assertions::assert_eq;

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("Car".parse::<Mode>(), Ok(Mode::Car));
        assert_eq!(" ship ".parse::<Mode>(), Ok(Mode::Ship));
        assert_eq!(
            "boat".parse::<Mode>(),
            Err(TripError::UnknownMode("boat".into()))
        );
    }

    #[test]
    fn only_ground_modes_use_roads() {
        let road: Vec<Mode> = Mode::ALL.into_iter().filter(|m| m.is_road()).collect();
        assert_eq!(road, vec![Mode::Car, Mode::Train, Mode::Bike, Mode::Walk]);
    }

    #[test]
    fn missing_modes_default_to_plane() {
        let stops = vec![
            Stop::new("A", "", 0.0, 0.0),
            Stop::new("B", "", 1.0, 0.0),
            Stop::new("C", "", 2.0, 0.0),
        ];
        let legs = legs(&stops, &[Mode::Car]);
        assert_eq!(legs.len(), 2);
        assert_eq!(legs[0].mode, Mode::Car);
        assert_eq!(legs[1].mode, Mode::Plane);
        assert_eq!(legs[1].from.city, "B");
        assert_eq!(leg_mode(&[], 5), Mode::Plane);
    }

    #[test]
    fn stop_deserializes_without_country() {
        let stop: Stop = serde_json::from_str(r#"{"city":"TOKYO","lon":139.6917,"lat":35.6895}"#)
            .unwrap();
        assert_eq!(stop, Stop::new("TOKYO", "", 139.6917, 35.6895));
        let mode: Mode = serde_json::from_str(r#""train""#).unwrap();
        assert_eq!(mode, Mode::Train);
    }
}
