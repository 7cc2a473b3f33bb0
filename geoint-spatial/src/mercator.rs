//! Closed-form spherical Web Mercator transform.
//!
//! The highest-frequency projection in this system is geographic WGS84
//! point data into Web Mercator. That case has a closed form, so it is
//! computed in-process instead of round-tripping through the external
//! geometry service.

use geo::MapCoords;
use geo_types::{coord, Coord, Geometry};

/// Earth's major axis radius in meters (WGS84 / spherical Mercator).
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Latitude bound of the Web Mercator square.
///
/// The transform diverges at the poles; the hosted projection services this
/// engine mirrors clamp to the square, and so do we. This is what makes the
/// whole-world extent project to finite bounds.
pub const MAX_LATITUDE: f64 = 85.051_128_78;

/// Half the extent of the Web Mercator square, in meters.
pub const MERCATOR_HALF_WIDTH_M: f64 = std::f64::consts::PI * EARTH_RADIUS_M;

/// Forward transform: geographic degrees to Web Mercator meters.
pub fn forward(lon: f64, lat: f64) -> (f64, f64) {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let x = lon.to_radians() * EARTH_RADIUS_M;
    let y = ((90.0 + lat).to_radians() / 2.0).tan().ln() * EARTH_RADIUS_M;
    (x, y)
}

/// Inverse transform: Web Mercator meters to geographic degrees.
pub fn inverse(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / EARTH_RADIUS_M).to_degrees();
    let lat = (2.0 * (y / EARTH_RADIUS_M).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
    (lon, lat)
}

/// Apply the forward transform to every coordinate of a geometry.
pub fn project_geometry_forward(geometry: &Geometry<f64>) -> Geometry<f64> {
    geometry.map_coords(|Coord { x, y }| {
        let (px, py) = forward(x, y);
        coord! { x: px, y: py }
    })
}

/// Apply the inverse transform to every coordinate of a geometry.
pub fn project_geometry_inverse(geometry: &Geometry<f64>) -> Geometry<f64> {
    geometry.map_coords(|Coord { x, y }| {
        let (lon, lat) = inverse(x, y);
        coord! { x: lon, y: lat }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_coordinate() {
        // Dessau-Roßlau, cross-checked against the delegated projection path.
        let (x, y) = forward(12.24555, 51.83864);
        assert!((x - 1_363_168.39).abs() < 1e-2, "x = {}", x);
        assert!((y - 6_771_001.92).abs() < 1e-2, "y = {}", y);
    }

    #[test]
    fn test_equator_and_meridian() {
        let (x, y) = forward(0.0, 0.0);
        assert!(x.abs() < 1e-9);
        assert!(y.abs() < 1e-9);

        let (x, _) = forward(180.0, 0.0);
        assert!((x - MERCATOR_HALF_WIDTH_M).abs() < 1e-6);
    }

    #[test]
    fn test_round_trip_idempotence() {
        let samples = [
            (12.24555, 51.83864),
            (-122.4194, 37.7749),
            (151.2093, -33.8688),
            (0.0, 0.0),
            (-179.99, 84.9),
        ];
        for (lon, lat) in samples {
            let (x, y) = forward(lon, lat);
            let (lon2, lat2) = inverse(x, y);
            assert!((lon - lon2).abs() < 1e-6, "lon {} -> {}", lon, lon2);
            assert!((lat - lat2).abs() < 1e-6, "lat {} -> {}", lat, lat2);
        }
    }

    #[test]
    fn test_poles_clamp_to_mercator_square() {
        let (_, y_north) = forward(0.0, 90.0);
        let (_, y_south) = forward(0.0, -90.0);
        assert!((y_north - MERCATOR_HALF_WIDTH_M).abs() < 1.0);
        assert!((y_south + MERCATOR_HALF_WIDTH_M).abs() < 1.0);
    }

    #[test]
    fn test_geometry_projection_preserves_shape() {
        let point = Geometry::Point(geo_types::Point::new(12.24555, 51.83864));
        let projected = project_geometry_forward(&point);
        match projected {
            Geometry::Point(p) => {
                assert!((p.x() - 1_363_168.39).abs() < 1e-2);
            }
            other => panic!("expected point, got {:?}", other),
        }
    }
}
