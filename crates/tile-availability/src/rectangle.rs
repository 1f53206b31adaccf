//! Geographic rectangles in radians and the predicates the index is built on
//!
//! These rectangles never wrap: a rectangle crossing the antimeridian must be
//! split with [`GeoRectangle::split_at_antimeridian`] before it reaches any
//! predicate in this module.

use geo::Point;
use smallvec::{SmallVec, smallvec};
use std::f64::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Axis-aligned longitude/latitude bounds in radians
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeoRectangle {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

/// A longitude/latitude position in radians
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cartographic {
    pub longitude: f64,
    pub latitude: f64,
}

/// A rectangle tagged with the level from which its tiles are available
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvailabilityRecord {
    pub level: u32,
    pub rectangle: GeoRectangle,
}

impl Cartographic {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    pub fn from_degrees(longitude: f64, latitude: f64) -> Self {
        Self::new(longitude.to_radians(), latitude.to_radians())
    }
}

impl From<Point<f64>> for Cartographic {
    /// Interprets the point as `(longitude, latitude)` in degrees
    fn from(point: Point<f64>) -> Self {
        Self::from_degrees(point.x(), point.y())
    }
}

impl GeoRectangle {
    /// The whole globe, `[-π, π] × [-π/2, π/2]`
    pub const MAX_VALUE: GeoRectangle = GeoRectangle {
        west: -PI,
        south: -PI / 2.0,
        east: PI,
        north: PI / 2.0,
    };

    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    pub fn from_degrees(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self::new(
            west.to_radians(),
            south.to_radians(),
            east.to_radians(),
            north.to_radians(),
        )
    }

    /// True when the rectangle crosses the antimeridian (`east < west`)
    #[inline]
    pub fn crosses_antimeridian(&self) -> bool {
        self.east < self.west
    }

    /// Split a rectangle crossing the antimeridian into its two halves,
    /// `[-π, east]` and `[west, π]`. Other rectangles are returned as-is.
    pub fn split_at_antimeridian(&self) -> SmallVec<[GeoRectangle; 2]> {
        if self.crosses_antimeridian() {
            smallvec![
                GeoRectangle::new(-PI, self.south, self.east, self.north),
                GeoRectangle::new(self.west, self.south, PI, self.north),
            ]
        } else {
            smallvec![*self]
        }
    }

    /// Strict intersection test
    ///
    /// Rectangles that only share an edge or a corner do not overlap.
    #[inline]
    pub fn overlaps(&self, other: &GeoRectangle) -> bool {
        let west = self.west.max(other.west);
        let south = self.south.max(other.south);
        let east = self.east.min(other.east);
        let north = self.north.min(other.north);
        south < north && west < east
    }

    /// Containment test, inclusive on all four edges
    #[inline]
    pub fn fully_contains(&self, other: &GeoRectangle) -> bool {
        other.west >= self.west
            && other.east <= self.east
            && other.south >= self.south
            && other.north <= self.north
    }

    /// Point containment, inclusive on all four edges and without any
    /// antimeridian unwrapping
    #[inline]
    pub fn contains_position(&self, position: &Cartographic) -> bool {
        position.longitude >= self.west
            && position.longitude <= self.east
            && position.latitude >= self.south
            && position.latitude <= self.north
    }
}

/// Remove `subtrahend` from every rectangle in `rectangles`
///
/// Each overlapped rectangle is replaced by up to four strips: the parts left
/// and right of the subtrahend (full height), and the parts below and above it
/// (clamped to the horizontal overlap). The result may contain overlapping
/// rectangles; callers only rely on it being empty when everything is covered.
pub fn subtract_rectangle(
    rectangles: &[GeoRectangle],
    subtrahend: &GeoRectangle,
) -> Vec<GeoRectangle> {
    let mut result = Vec::with_capacity(rectangles.len());

    for rectangle in rectangles {
        if !rectangle.overlaps(subtrahend) {
            result.push(*rectangle);
            continue;
        }

        if rectangle.west < subtrahend.west {
            result.push(GeoRectangle::new(
                rectangle.west,
                rectangle.south,
                subtrahend.west,
                rectangle.north,
            ));
        }
        if rectangle.east > subtrahend.east {
            result.push(GeoRectangle::new(
                subtrahend.east,
                rectangle.south,
                rectangle.east,
                rectangle.north,
            ));
        }
        if rectangle.south < subtrahend.south {
            result.push(GeoRectangle::new(
                rectangle.west.max(subtrahend.west),
                rectangle.south,
                rectangle.east.min(subtrahend.east),
                subtrahend.south,
            ));
        }
        if rectangle.north > subtrahend.north {
            result.push(GeoRectangle::new(
                rectangle.west.max(subtrahend.west),
                subtrahend.north,
                rectangle.east.min(subtrahend.east),
                rectangle.north,
            ));
        }
    }

    result
}
