use std::f64::consts::PI;

use geo::{Coord, HaversineDistance, Point};

/// Volumetric earth radius used by the map projection
pub const EARTH_RADIUS_KM: f64 = 6371.0;

const KM_PER_DEGREE: f64 = PI / 180.0 * EARTH_RADIUS_KM;

/// Width and height of a raster, in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageSize {
    pub width: f64,
    pub height: f64,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as f64,
            height: height as f64,
        }
    }

    pub fn center(&self) -> Coord {
        Coord {
            x: self.width / 2.0,
            y: self.height / 2.0,
        }
    }
}

/// Projects a lat/lon `coordinate` onto the image, with `origin` at its center.
///
/// Flat equirectangular scale with no cos(latitude) correction on x, so east-west
/// distances are stretched as the map moves away from the equator. Good enough
/// for a schematic of a few tens of km. `km_across_width` is how much ground
/// the image width covers. Points use the geo convention (x = lon, y = lat);
/// y grows downward so north is up.
pub fn pixel_from_coordinate(
    image_size: ImageSize,
    coordinate: Point,
    origin: Point,
    km_across_width: f64,
) -> Coord {
    let pixels_per_km = image_size.width / km_across_width;
    let center = image_size.center();

    Coord {
        x: center.x + (coordinate.x() - origin.x()) * KM_PER_DEGREE * pixels_per_km,
        y: center.y - (coordinate.y() - origin.y()) * KM_PER_DEGREE * pixels_per_km,
    }
}

/// Great-circle distance, only used as a cut-off
pub fn haversine_distance_km(a: Point, b: Point) -> f64 {
    a.haversine_distance(&b) / 1000.0
}

/// Componentwise interpolation, `t` clamped to `[0, 1]`
pub fn lerp(start: Coord, end: Coord, t: f64) -> Coord {
    let t = t.clamp(0.0, 1.0);
    Coord {
        x: start.x * (1.0 - t) + end.x * t,
        y: start.y * (1.0 - t) + end.y * t,
    }
}

#[cfg(test)]
mod test {

    use super::*;

    fn image() -> ImageSize {
        ImageSize::new(400, 480)
    }

    #[test]
    fn test_origin_maps_to_center() {
        let origin = Point::new(-0.1246, 51.5308);
        let pixel = pixel_from_coordinate(image(), origin, origin, 20.0);

        assert_eq!(pixel, Coord { x: 200.0, y: 240.0 });
    }

    #[test]
    fn test_north_is_up_east_is_right() {
        let origin = Point::new(-0.1246, 51.5308);
        let north_east = Point::new(-0.1, 51.55);
        let pixel = pixel_from_coordinate(image(), north_east, origin, 20.0);

        assert!(pixel.x > 200.0);
        assert!(pixel.y < 240.0);
    }

    #[test]
    fn test_one_degree_scale() {
        // 400 px across 20 km is 20 px per km
        let origin = Point::new(0.0, 0.0);
        let pixel = pixel_from_coordinate(image(), Point::new(0.01, 0.0), origin, 20.0);

        let expected = 200.0 + 0.01 * KM_PER_DEGREE * 20.0;
        assert!((pixel.x - expected).abs() < 1e-9);
        assert_eq!(pixel.y, 240.0);
    }

    #[test]
    fn test_haversine_zero_and_symmetric() {
        let kings_cross = Point::new(-0.1233, 51.5320);
        let cambridge = Point::new(0.1376, 52.1942);

        assert_eq!(haversine_distance_km(kings_cross, kings_cross), 0.0);

        let there = haversine_distance_km(kings_cross, cambridge);
        let back = haversine_distance_km(cambridge, kings_cross);
        assert!((there - back).abs() < 1e-9);
        // roughly 75 km as the crow flies
        assert!(there > 70.0 && there < 80.0, "{}", there);
    }

    #[test]
    fn test_lerp_endpoints_and_clamp() {
        let a = Coord { x: 10.0, y: 300.0 };
        let b = Coord { x: 110.0, y: 100.0 };

        assert_eq!(lerp(a, b, 0.0), a);
        assert_eq!(lerp(a, b, 1.0), b);
        assert_eq!(lerp(a, b, -2.0), a);
        assert_eq!(lerp(a, b, 7.5), b);
        assert_eq!(lerp(a, b, 0.5), Coord { x: 60.0, y: 200.0 });
    }

    #[test]
    fn test_lerp_monotonic() {
        let a = Coord { x: 0.0, y: 50.0 };
        let b = Coord { x: 100.0, y: -50.0 };

        let mut previous = lerp(a, b, 0.0);
        for step in 1..=20 {
            let current = lerp(a, b, step as f64 / 20.0);
            assert!(current.x >= previous.x);
            assert!(current.y <= previous.y);
            previous = current;
        }
    }
}
