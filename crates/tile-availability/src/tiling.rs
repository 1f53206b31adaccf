//! Tile addressing and the tiling schemes that map tiles to geographic bounds
//!
//! Tiles are addressed by `(level, x, y)` where `x` grows eastwards and `y`
//! grows southwards from the north edge of the scheme. Every scheme here
//! subdivides each tile into 2×2 children at the next level.

use crate::rectangle::{Cartographic, GeoRectangle};
use crate::utils;
use geo::{Coord, Point, Rect};
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Address of a single tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TileKey {
    pub level: u32,
    /// Column, east-west index
    pub x: u32,
    /// Row, north-south index (0 at the north edge)
    pub y: u32,
}

/// One of the four children of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    NorthWest = 0,
    NorthEast = 1,
    SouthWest = 2,
    SouthEast = 3,
}

impl Quadrant {
    /// All quadrants in child-slot order
    pub const ALL: [Quadrant; 4] = [
        Quadrant::NorthWest,
        Quadrant::NorthEast,
        Quadrant::SouthWest,
        Quadrant::SouthEast,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl TileKey {
    pub fn new(level: u32, x: u32, y: u32) -> Self {
        Self { level, x, y }
    }

    /// The child tile at `level + 1` in the given quadrant, or `None` when
    /// its address does not fit in `u32`
    #[inline]
    pub fn child(&self, quadrant: Quadrant) -> Option<TileKey> {
        let (dx, dy) = match quadrant {
            Quadrant::NorthWest => (0, 0),
            Quadrant::NorthEast => (1, 0),
            Quadrant::SouthWest => (0, 1),
            Quadrant::SouthEast => (1, 1),
        };
        Some(TileKey::new(
            self.level.checked_add(1)?,
            self.x.checked_mul(2)?.checked_add(dx)?,
            self.y.checked_mul(2)?.checked_add(dy)?,
        ))
    }
}

/// An inclusive rectangle of tile indices at some level
///
/// The corners are not required to be ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TileRange {
    pub start_x: u32,
    pub start_y: u32,
    pub end_x: u32,
    pub end_y: u32,
}

impl TileRange {
    pub fn new(start_x: u32, start_y: u32, end_x: u32, end_y: u32) -> Self {
        Self {
            start_x,
            start_y,
            end_x,
            end_y,
        }
    }

    /// A range holding exactly one tile
    pub fn single(x: u32, y: u32) -> Self {
        Self::new(x, y, x, y)
    }

    /// Every tile of `level` in the given scheme
    pub fn whole_level<S: TilingScheme + ?Sized>(scheme: &S, level: u32) -> Self {
        Self::new(
            0,
            0,
            scheme.number_of_x_tiles_at_level(level).saturating_sub(1),
            scheme.number_of_y_tiles_at_level(level).saturating_sub(1),
        )
    }

    pub fn min_x(&self) -> u32 {
        self.start_x.min(self.end_x)
    }

    pub fn max_x(&self) -> u32 {
        self.start_x.max(self.end_x)
    }

    pub fn min_y(&self) -> u32 {
        self.start_y.min(self.end_y)
    }

    pub fn max_y(&self) -> u32 {
        self.start_y.max(self.end_y)
    }

    /// All `(x, y)` pairs in the range, row by row
    pub fn tiles(&self) -> impl Iterator<Item = (u32, u32)> + use<> {
        let (min_x, max_x) = (self.min_x(), self.max_x());
        (self.min_y()..=self.max_y()).flat_map(move |y| (min_x..=max_x).map(move |x| (x, y)))
    }
}

/// Geographic bounds of a tile in degrees (`x` = longitude, `y` = latitude)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeoBox(Rect<f64>);

impl GeoBox {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self(Rect::new(
            Coord { x: west, y: south },
            Coord { x: east, y: north },
        ))
    }

    pub fn west(&self) -> f64 {
        self.0.min().x
    }

    pub fn south(&self) -> f64 {
        self.0.min().y
    }

    pub fn east(&self) -> f64 {
        self.0.max().x
    }

    pub fn north(&self) -> f64 {
        self.0.max().y
    }

    pub fn southwest(&self) -> Point<f64> {
        self.0.min().into()
    }

    pub fn northeast(&self) -> Point<f64> {
        self.0.max().into()
    }

    pub fn center(&self) -> Point<f64> {
        self.0.center().into()
    }

    /// Grow the box in place so that it contains `point`
    pub fn grow_to_contain(&mut self, point: Point<f64>) {
        let min = self.0.min();
        let max = self.0.max();
        self.0 = Rect::new(
            Coord {
                x: min.x.min(point.x()),
                y: min.y.min(point.y()),
            },
            Coord {
                x: max.x.max(point.x()),
                y: max.y.max(point.y()),
            },
        );
    }

    /// Convert to the radian rectangle used by the availability index
    pub fn to_radians(&self) -> GeoRectangle {
        GeoRectangle::from_degrees(self.west(), self.south(), self.east(), self.north())
    }

    /// The center of the box in radians
    pub fn center_cartographic(&self) -> Cartographic {
        Cartographic::from(self.center())
    }
}

impl From<Rect<f64>> for GeoBox {
    fn from(rect: Rect<f64>) -> Self {
        Self(rect)
    }
}

/// Maps tile addresses to geographic bounds
///
/// Implementations must subdivide every tile into exactly 2×2 children, and
/// the four children must tile their parent's box without gaps.
pub trait TilingScheme {
    fn number_of_x_tiles_at_level(&self, level: u32) -> u32;

    fn number_of_y_tiles_at_level(&self, level: u32) -> u32;

    /// Bounds of a tile, in degrees
    fn geo_box(&self, key: TileKey) -> GeoBox;

    /// The tile at `level` containing `position` (degrees), or `None` when
    /// the position lies outside the scheme's extent
    fn tile_at(&self, level: u32, position: Point<f64>) -> Option<TileKey>;
}

impl<S: TilingScheme + ?Sized> TilingScheme for Box<S> {
    fn number_of_x_tiles_at_level(&self, level: u32) -> u32 {
        (**self).number_of_x_tiles_at_level(level)
    }

    fn number_of_y_tiles_at_level(&self, level: u32) -> u32 {
        (**self).number_of_y_tiles_at_level(level)
    }

    fn geo_box(&self, key: TileKey) -> GeoBox {
        (**self).geo_box(key)
    }

    fn tile_at(&self, level: u32, position: Point<f64>) -> Option<TileKey> {
        (**self).tile_at(level, position)
    }
}

impl<S: TilingScheme + ?Sized> TilingScheme for Arc<S> {
    fn number_of_x_tiles_at_level(&self, level: u32) -> u32 {
        (**self).number_of_x_tiles_at_level(level)
    }

    fn number_of_y_tiles_at_level(&self, level: u32) -> u32 {
        (**self).number_of_y_tiles_at_level(level)
    }

    fn geo_box(&self, key: TileKey) -> GeoBox {
        (**self).geo_box(key)
    }

    fn tile_at(&self, level: u32, position: Point<f64>) -> Option<TileKey> {
        (**self).tile_at(level, position)
    }
}

/// `root` tiles subdivided `level` times, as a float so that deep levels
/// neither overflow nor reach zero
#[inline(always)]
fn tile_count(root: u32, level: u32) -> f64 {
    f64::from(root) * 2f64.powi(i32::try_from(level).unwrap_or(i32::MAX))
}

/// `root << level`, saturating at `u32::MAX`
#[inline(always)]
fn saturating_tile_count(root: u32, level: u32) -> u32 {
    u32::try_from(u64::from(root) << level.min(32)).unwrap_or(u32::MAX)
}

/// Edge `index` of `count` equal divisions of `[start, start + span]`
///
/// Both edges of a tile go through this so that neighbouring tiles, and a
/// parent and its children, share bit-identical edges.
#[inline(always)]
fn edge(start: f64, span: f64, index: f64, count: f64) -> f64 {
    start + index * (span / count)
}

/// Index of the division of `[0, 1]` into `count` parts holding `fraction`,
/// with `1.0` itself falling in the last one
#[inline(always)]
fn division_index(fraction: f64, count: f64) -> u32 {
    // Float to int casts saturate
    ((fraction * count).floor().min(count - 1.0)) as u32
}

/// Equirectangular tiling of the whole globe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeographicTilingScheme {
    root_x_tiles: u32,
    root_y_tiles: u32,
}

impl Default for GeographicTilingScheme {
    /// Two square root tiles, west and east hemispheres
    fn default() -> Self {
        Self::with_root_tiles(2, 1)
    }
}

impl GeographicTilingScheme {
    pub fn with_root_tiles(root_x_tiles: u32, root_y_tiles: u32) -> Self {
        Self {
            root_x_tiles: root_x_tiles.max(1),
            root_y_tiles: root_y_tiles.max(1),
        }
    }
}

impl TilingScheme for GeographicTilingScheme {
    fn number_of_x_tiles_at_level(&self, level: u32) -> u32 {
        saturating_tile_count(self.root_x_tiles, level)
    }

    fn number_of_y_tiles_at_level(&self, level: u32) -> u32 {
        saturating_tile_count(self.root_y_tiles, level)
    }

    fn geo_box(&self, key: TileKey) -> GeoBox {
        let nx = tile_count(self.root_x_tiles, key.level);
        let ny = tile_count(self.root_y_tiles, key.level);
        let (x, y) = (f64::from(key.x), f64::from(key.y));

        let west = edge(-180.0, 360.0, x, nx);
        let east = edge(-180.0, 360.0, x + 1.0, nx);
        // Rows count downwards from the north pole
        let north = edge(90.0, -180.0, y, ny);
        let south = edge(90.0, -180.0, y + 1.0, ny);

        GeoBox::new(west, south, east, north)
    }

    fn tile_at(&self, level: u32, position: Point<f64>) -> Option<TileKey> {
        let (lon, lat) = (position.x(), position.y());
        if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
            return None;
        }

        let nx = tile_count(self.root_x_tiles, level);
        let ny = tile_count(self.root_y_tiles, level);
        Some(TileKey::new(
            level,
            division_index((lon + 180.0) / 360.0, nx),
            division_index((90.0 - lat) / 180.0, ny),
        ))
    }
}

/// Web Mercator (EPSG:3857) tiling with a single root tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WebMercatorTilingScheme;

impl TilingScheme for WebMercatorTilingScheme {
    fn number_of_x_tiles_at_level(&self, level: u32) -> u32 {
        saturating_tile_count(1, level)
    }

    fn number_of_y_tiles_at_level(&self, level: u32) -> u32 {
        saturating_tile_count(1, level)
    }

    fn geo_box(&self, key: TileKey) -> GeoBox {
        let n = tile_count(1, key.level);
        let (x, y) = (f64::from(key.x), f64::from(key.y));

        let min_x = edge(utils::EARTH_MERCATOR_MIN, utils::EARTH_SIZE_METERS, x, n);
        let max_x = edge(utils::EARTH_MERCATOR_MIN, utils::EARTH_SIZE_METERS, x + 1.0, n);
        let max_y = edge(utils::EARTH_MERCATOR_MAX, -utils::EARTH_SIZE_METERS, y, n);
        let min_y = edge(utils::EARTH_MERCATOR_MAX, -utils::EARTH_SIZE_METERS, y + 1.0, n);

        let (south, west) = utils::mercator_to_wgs84(min_x, min_y);
        let (north, east) = utils::mercator_to_wgs84(max_x, max_y);

        GeoBox::new(west, south, east, north)
    }

    fn tile_at(&self, level: u32, position: Point<f64>) -> Option<TileKey> {
        let (lon, lat) = (position.x(), position.y());
        if !(-180.0..=180.0).contains(&lon)
            || !(-utils::MAX_LATITUDE..=utils::MAX_LATITUDE).contains(&lat)
        {
            return None;
        }

        let meters = utils::wgs84_to_mercator(lat, lon);
        let n = tile_count(1, level);
        Some(TileKey::new(
            level,
            division_index((meters.x() - utils::EARTH_MERCATOR_MIN) / utils::EARTH_SIZE_METERS, n),
            division_index((utils::EARTH_MERCATOR_MAX - meters.y()) / utils::EARTH_SIZE_METERS, n),
        ))
    }
}
