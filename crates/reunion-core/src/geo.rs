use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeoError {
    #[error("invalid coordinate ({latitude}, {longitude})")]
    InvalidCoordinate { latitude: f64, longitude: f64 },
}

impl Coordinate {
    /// Build a coordinate, rejecting anything outside [-90, 90] / [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        let coord = Self {
            latitude,
            longitude,
        };
        coord.validate()?;
        Ok(coord)
    }

    /// Range check for coordinates that arrived through deserialization.
    pub fn validate(&self) -> Result<(), GeoError> {
        let lat_ok = self.latitude.is_finite() && (-90.0..=90.0).contains(&self.latitude);
        let lon_ok = self.longitude.is_finite() && (-180.0..=180.0).contains(&self.longitude);
        if lat_ok && lon_ok {
            Ok(())
        } else {
            Err(GeoError::InvalidCoordinate {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }
}

/// The single location every guess is scored against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetLocation {
    pub name: String,
    pub coordinate: Coordinate,
}

impl Default for TargetLocation {
    fn default() -> Self {
        Self {
            name: "SJTU Minhang Campus".to_string(),
            coordinate: Coordinate {
                latitude: 31.017969,
                longitude: 121.430860,
            },
        }
    }
}

/// Great-circle distance in kilometres (haversine, R = 6371 km).
///
/// Both inputs must already be range-checked. The intermediate term is
/// clamped to [0, 1] so floating-point drift near antipodes never produces NaN.
pub fn compute_distance_km(guess: Coordinate, target: Coordinate) -> f64 {
    let d_lat = (target.latitude - guess.latitude).to_radians();
    let d_lon = (target.longitude - guess.longitude).to_radians();
    let a = ((d_lat / 2.0).sin().powi(2)
        + guess.latitude.to_radians().cos()
            * target.latitude.to_radians().cos()
            * (d_lon / 2.0).sin().powi(2))
    .clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Validate a submitted guess and score it against the target.
///
/// The distance is always computed here, never taken from the client.
pub fn score_guess(guess: Coordinate, target: &TargetLocation) -> Result<f64, GeoError> {
    guess.validate()?;
    Ok(compute_distance_km(guess, target.coordinate))
}

/// Round to two decimals for display.
pub fn round_km(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
