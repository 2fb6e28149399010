//! Geodesy helpers: query extents and point-to-point distance.

use std::fmt;

use crate::domain::Coordinate;

/// Search radius used for every theme query.
pub const SEARCH_RADIUS_KM: f64 = 2.5;

// WGS-84 ellipsoid.
const WGS84_A: f64 = 6_378_137.0;
const WGS84_F: f64 = 1.0 / 298.257_223_563;
const WGS84_B: f64 = (1.0 - WGS84_F) * WGS84_A;
const MEAN_RADIUS_KM: f64 = 6_371.008_8;

const VINCENTY_MAX_ITERATIONS: usize = 200;
const VINCENTY_TOLERANCE: f64 = 1e-12;

/// Rectangular lat/lng region used to scope a theme query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lng_min: f64,
    pub lat_max: f64,
    pub lng_max: f64,
}

impl fmt::Display for BoundingBox {
    /// Upstream `extents` form: `latMin,lngMin,latMax,lngMax`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.lat_min, self.lng_min, self.lat_max, self.lng_max
        )
    }
}

/// Box of half-width `radius_km` around `center`.
///
/// The latitude delta is `radius_km / 100` degrees. This is not a metric
/// conversion; the upstream query shape depends on it, so keep it as is.
pub fn bounding_box(center: Coordinate, radius_km: f64) -> BoundingBox {
    let offset = radius_km / 100.0;
    let lng_offset = offset * center.latitude().to_radians().cos();

    BoundingBox {
        lat_min: center.latitude() - offset,
        lng_min: center.longitude() - lng_offset,
        lat_max: center.latitude() + offset,
        lng_max: center.longitude() + lng_offset,
    }
}

/// Ellipsoidal distance in kilometres (Vincenty inverse, WGS-84).
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    vincenty_km(a, b).unwrap_or_else(|| haversine_km(a, b))
}

fn vincenty_km(a: Coordinate, b: Coordinate) -> Option<f64> {
    let l = (b.longitude() - a.longitude()).to_radians();
    let u1 = ((1.0 - WGS84_F) * a.latitude().to_radians().tan()).atan();
    let u2 = ((1.0 - WGS84_F) * b.latitude().to_radians().tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    for _ in 0..VINCENTY_MAX_ITERATIONS {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let sin_sigma = ((cos_u2 * sin_lambda).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
        .sqrt();
        if sin_sigma == 0.0 {
            // Coincident points.
            return Some(0.0);
        }
        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        let sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        // Equatorial line: cos_sq_alpha == 0.
        let cos_2sigma_m = if cos_sq_alpha == 0.0 {
            0.0
        } else {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        };
        let c = WGS84_F / 16.0 * cos_sq_alpha * (4.0 + WGS84_F * (4.0 - 3.0 * cos_sq_alpha));

        let prev = lambda;
        lambda = l
            + (1.0 - c)
                * WGS84_F
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))));

        if (lambda - prev).abs() < VINCENTY_TOLERANCE {
            let u_sq = cos_sq_alpha * (WGS84_A.powi(2) - WGS84_B.powi(2)) / WGS84_B.powi(2);
            let big_a =
                1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
            let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
            let delta_sigma = big_b
                * sin_sigma
                * (cos_2sigma_m
                    + big_b / 4.0
                        * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))
                            - big_b / 6.0
                                * cos_2sigma_m
                                * (-3.0 + 4.0 * sin_sigma.powi(2))
                                * (-3.0 + 4.0 * cos_2sigma_m.powi(2))));
            let meters = WGS84_B * big_a * (sigma - delta_sigma);
            return Some(meters / 1000.0);
        }
    }

    // Nearly antipodal points may not converge.
    None
}

fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.latitude() - a.latitude()).to_radians();
    let d_lng = (b.longitude() - a.longitude()).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude().to_radians().cos()
            * b.latitude().to_radians().cos()
            * (d_lng / 2.0).sin().powi(2);
    2.0 * MEAN_RADIUS_KM * h.sqrt().min(1.0).asin()
}
