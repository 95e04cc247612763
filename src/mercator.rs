//! Spherical Web-Mercator reprojection.
//!
//! Stateless helpers used by the emitters, not by the decoder. Latitude
//! diverges towards the poles; callers should clamp |lat| below 90 degrees.

use std::f64::consts::PI;

/// Earth radius in meters (EPSG:3857 sphere).
pub const EARTH_RADIUS: f64 = 6378137.0;
/// Maximum x/y coordinate in Web Mercator.
pub const MAX_MERCATOR: f64 = 20037508.34;

/// Linear remap of `value` from one range onto another.
fn map(value: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    out_min + (value - in_min) * (out_max - out_min) / (in_max - in_min)
}

/// Degrees latitude/longitude to raw Web-Mercator meters.
pub fn lat_lon_to_mercator(lat: f64, lon: f64) -> (f64, f64) {
    let x = lon * EARTH_RADIUS * PI / 180.0;
    let y = EARTH_RADIUS * (PI / 4.0 + lat * PI / 360.0).tan().ln();
    (x, y)
}

/// Degrees latitude/longitude to map-frame coordinates: origin at the upper
/// left, +x right, +y down, so output fits SVG and typical computer
/// graphics. The frame spans `2 * MAX_MERCATOR` on both axes.
pub fn lat_lon_to_map(lat: f64, lon: f64) -> (f64, f64) {
    let (mx, my) = lat_lon_to_mercator(lat, lon);

    // shift x so negative longitudes start at 0
    let x = mx + MAX_MERCATOR;

    // flip and shift y so the north pole maps to y = 0
    let y = if my > 0.0 {
        map(my, 0.0, MAX_MERCATOR, MAX_MERCATOR, 0.0)
    } else {
        map(my, 0.0, -MAX_MERCATOR, MAX_MERCATOR, MAX_MERCATOR * 2.0)
    };

    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    #[test]
    fn equator_origin_maps_to_frame_center() {
        let (x, y) = lat_lon_to_map(0.0, 0.0);
        assert!((x - MAX_MERCATOR).abs() < EPS);
        assert!((y - MAX_MERCATOR).abs() < EPS);
    }

    #[test]
    fn monotonic_in_longitude() {
        let mut prev = f64::NEG_INFINITY;
        for lon in [-180.0, -90.0, -1.0, 0.0, 1.0, 90.0, 180.0] {
            let (x, _) = lat_lon_to_map(45.0, lon);
            assert!(x > prev);
            prev = x;
        }
    }

    #[test]
    fn north_is_up() {
        let (_, oslo) = lat_lon_to_map(59.9, 10.7);
        let (_, rome) = lat_lon_to_map(41.9, 12.5);
        assert!(oslo < rome);
        let (_, south) = lat_lon_to_map(-41.9, 12.5);
        assert!(south > MAX_MERCATOR);
    }

    #[test]
    fn frame_edges() {
        let (x, _) = lat_lon_to_map(0.0, -180.0);
        assert!(x.abs() < 1.0);
        let (x, _) = lat_lon_to_map(0.0, 180.0);
        assert!((x - 2.0 * MAX_MERCATOR).abs() < 1.0);
        // the Mercator truncation latitude sits at the top frame edge
        let (_, y) = lat_lon_to_map(85.051128, 0.0);
        assert!(y.abs() < 100.0);
    }
}
