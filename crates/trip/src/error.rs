use crate::model::Stop;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TripError {
    #[error("a trip needs at least two stops, got {count}")]
    TooFewStops { count: usize },

    #[error("stop {index} has an invalid coordinate ({lon}, {lat})")]
    InvalidCoordinate { index: usize, lon: f64, lat: f64 },

    #[error("unknown transport mode {0:?}")]
    UnknownMode(String),
}

/// Reject stop lists the path builder cannot work with.
pub fn validate_stops(stops: &[Stop]) -> Result<(), TripError> {
    if stops.len() < 2 {
        return Err(TripError::TooFewStops { count: stops.len() });
    }
    for (index, stop) in stops.iter().enumerate() {
        let lon_ok = stop.lon.is_finite() && (-180.0..=180.0).contains(&stop.lon);
        let lat_ok = stop.lat.is_finite() && (-90.0..=90.0).contains(&stop.lat);
        if !lon_ok || !lat_ok {
            return Err(TripError::InvalidCoordinate {
                index,
                lon: stop.lon,
                lat: stop.lat,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{TripError, validate_stops};
    use crate::model::Stop;

    #[test]
    fn needs_two_stops() {
        let one = vec![Stop::new("A", "X", 0.0, 0.0)];
        assert_eq!(
            validate_stops(&one),
            Err(TripError::TooFewStops { count: 1 })
        );
        assert_eq!(
            validate_stops(&[]),
            Err(TripError::TooFewStops { count: 0 })
        );
    }

    #[test]
    fn rejects_out_of_range_and_nan() {
        let stops = vec![
            Stop::new("A", "X", 0.0, 0.0),
            Stop::new("B", "Y", 200.0, 0.0),
        ];
        assert!(matches!(
            validate_stops(&stops),
            Err(TripError::InvalidCoordinate { index: 1, .. })
        ));

        let stops = vec![
            Stop::new("A", "X", 0.0, f64::NAN),
            Stop::new("B", "Y", 0.0, 0.0),
        ];
        assert!(matches!(
            validate_stops(&stops),
            Err(TripError::InvalidCoordinate { index: 0, .. })
        ));
    }

    #[test]
    fn accepts_boundaries() {
        let stops = vec![
            Stop::new("A", "X", -180.0, 90.0),
            Stop::new("B", "Y", 180.0, -90.0),
        ];
        assert_eq!(validate_stops(&stops), Ok(()));
    }
}
