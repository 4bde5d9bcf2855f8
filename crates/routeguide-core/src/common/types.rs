//! # Location model
//!
//! The wire messages carry coordinates as optional sub-messages, which is
//! awkward to compare and hash. This module defines the in-process forms used
//! by the service:
//!
//! - [`GeoPoint`] - an exact integer coordinate pair, also used directly as a
//!   map key (two points are the same key iff both components are equal).
//! - [`BoundingBox`] - a rectangle with a strict containment test.
//!
//! Missing sub-messages follow proto3 defaults and read as the origin
//! `(0, 0)`.

use crate::proto::{Feature, Point, Rectangle, RouteNote};

/// Scale between degrees and the integer representation on the wire.
pub const E7: f64 = 10_000_000.0;

/// Latitude and longitude in degrees multiplied by 10^7.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeoPoint {
    pub lat: i32,
    pub lon: i32,
}

impl GeoPoint {
    pub const fn new(lat: i32, lon: i32) -> Self {
        Self { lat, lon }
    }

    /// Converts from floating point degrees, rounding to the nearest unit.
    pub fn from_degrees(lat: f64, lon: f64) -> Self {
        Self {
            lat: (lat * E7).round() as i32,
            lon: (lon * E7).round() as i32,
        }
    }

    /// Returns `(latitude, longitude)` in degrees.
    pub fn to_degrees(self) -> (f64, f64) {
        (f64::from(self.lat) / E7, f64::from(self.lon) / E7)
    }
}

impl From<Point> for GeoPoint {
    fn from(point: Point) -> Self {
        Self::new(point.latitude, point.longitude)
    }
}

impl From<&Point> for GeoPoint {
    fn from(point: &Point) -> Self {
        Self::new(point.latitude, point.longitude)
    }
}

impl From<Option<&Point>> for GeoPoint {
    fn from(point: Option<&Point>) -> Self {
        point.map(Self::from).unwrap_or_default()
    }
}

impl From<GeoPoint> for Point {
    fn from(point: GeoPoint) -> Self {
        Self {
            latitude: point.lat,
            longitude: point.lon,
        }
    }
}

/// Rectangle between a `low` (south-west) and a `high` (north-east) corner.
///
/// The corners are not validated. A box whose `low` is not strictly below
/// and left of `high` contains nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoundingBox {
    pub low: GeoPoint,
    pub high: GeoPoint,
}

impl BoundingBox {
    pub const fn new(low: GeoPoint, high: GeoPoint) -> Self {
        Self { low, high }
    }

    /// Strict containment: points on any edge are outside.
    pub const fn contains(&self, point: GeoPoint) -> bool {
        self.low.lat < point.lat
            && point.lat < self.high.lat
            && self.low.lon < point.lon
            && point.lon < self.high.lon
    }
}

impl From<&Rectangle> for BoundingBox {
    fn from(rect: &Rectangle) -> Self {
        Self::new(rect.lo.as_ref().into(), rect.hi.as_ref().into())
    }
}

impl From<BoundingBox> for Rectangle {
    fn from(bbox: BoundingBox) -> Self {
        Self {
            lo: Some(bbox.low.into()),
            hi: Some(bbox.high.into()),
        }
    }
}

impl Feature {
    /// A feature with an empty name at `location`, returned when nothing is
    /// known there.
    pub fn unnamed(location: GeoPoint) -> Self {
        Self {
            name: String::new(),
            location: Some(location.into()),
        }
    }

    pub fn named(name: impl Into<String>, location: GeoPoint) -> Self {
        Self {
            name: name.into(),
            location: Some(location.into()),
        }
    }

    pub fn point(&self) -> GeoPoint {
        self.location.as_ref().into()
    }
}

impl RouteNote {
    pub fn new(location: GeoPoint, message: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            message: message.into(),
        }
    }

    pub fn point(&self) -> GeoPoint {
        self.location.as_ref().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox() -> BoundingBox {
        BoundingBox::new(GeoPoint::new(10, 20), GeoPoint::new(30, 40))
    }

    #[test]
    fn contains_interior_point() {
        assert!(bbox().contains(GeoPoint::new(11, 21)));
        assert!(bbox().contains(GeoPoint::new(29, 39)));
    }

    #[test]
    fn excludes_every_edge() {
        let b = bbox();
        assert!(!b.contains(GeoPoint::new(10, 30)));
        assert!(!b.contains(GeoPoint::new(30, 30)));
        assert!(!b.contains(GeoPoint::new(20, 20)));
        assert!(!b.contains(GeoPoint::new(20, 40)));
        assert!(!b.contains(b.low));
        assert!(!b.contains(b.high));
    }

    #[test]
    fn inverted_box_contains_nothing() {
        let b = BoundingBox::new(GeoPoint::new(30, 40), GeoPoint::new(10, 20));
        assert!(!b.contains(GeoPoint::new(20, 30)));
    }

    #[test]
    fn missing_point_reads_as_origin() {
        let rect = Rectangle {
            lo: None,
            hi: Some(Point {
                latitude: 5,
                longitude: 5,
            }),
        };
        let b = BoundingBox::from(&rect);
        assert_eq!(b.low, GeoPoint::new(0, 0));
        assert!(b.contains(GeoPoint::new(1, 1)));

        let note = RouteNote {
            location: None,
            message: "hi".to_string(),
        };
        assert_eq!(note.point(), GeoPoint::default());
    }

    #[test]
    fn degrees_round_trip_to_nearest_unit() {
        let p = GeoPoint::from_degrees(40.7486500, -73.9885900);
        assert_eq!(p, GeoPoint::new(407_486_500, -739_885_900));
        let (lat, lon) = p.to_degrees();
        assert!((lat - 40.74865).abs() < 1e-9);
        assert!((lon + 73.98859).abs() < 1e-9);
    }

    #[test]
    fn points_are_keys_by_exact_components() {
        use std::collections::HashSet;

        let mut keys = HashSet::new();
        keys.insert(GeoPoint::new(1, 23));
        keys.insert(GeoPoint::new(12, 3));
        keys.insert(GeoPoint::new(1, 23));
        assert_eq!(keys.len(), 2);
    }
}
