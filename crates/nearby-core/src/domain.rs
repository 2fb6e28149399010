use crate::{errors::Error, Result};

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// A point on the WGS-84 ellipsoid, in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if !valid {
            return Err(Error::InvalidCoordinate {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Parse the upstream `"lat,lng"` pair.
    pub fn parse_lat_lng(raw: &str) -> Option<Self> {
        let (lat, lng) = raw.split_once(',')?;
        let lat = lat.trim().parse::<f64>().ok()?;
        let lng = lng.trim().parse::<f64>().ok()?;
        Self::new(lat, lng).ok()
    }
}
