//! Tile Availability - which zoom levels a tiled map source can serve, and where
//!
//! Tile-streaming and level-of-detail selection code must not request tiles a
//! data source does not have. This library keeps an index of the tile ranges a
//! source has reported as available and answers "what is the most detailed
//! level available at this position?" and "what is the most detailed level
//! available over this whole rectangle?".
//!
//! # Architecture
//!
//! - **[`TilingScheme`]**: Maps tile addresses to geographic bounds
//!   ([`GeographicTilingScheme`], [`WebMercatorTilingScheme`])
//! - **[`Quadtree`]**: Lazily materialized cells, each holding level-sorted
//!   availability rectangles
//! - **[`TileAvailability`]**: Range insertion plus point, tile, child-mask and
//!   rectangle-coverage queries
//! - **[`LayerAvailability`]**: Loads the `available` ranges of a terrain
//!   `layer.json` (requires the `serde` feature)
//!
//! # Performance Characteristics
//!
//! - **Insertion**: O(D) where D = maximum level - minimum level
//! - **Point query**: O(D + R) where R = records on the path
//! - **Coverage query**: visits every cell overlapping the rectangle
//! - **Memory**: grows monotonically; cells and records are never freed

mod availability;
#[cfg(feature = "serde")]
mod layer;
mod quadtree;
mod rectangle;
mod tiling;
pub mod utils;

// Public API exports
pub use availability::{AvailabilityConfig, TileAvailability};
#[cfg(feature = "serde")]
pub use layer::LayerAvailability;
pub use quadtree::{NodeId, Quadtree, QuadtreeNode};
pub use rectangle::{AvailabilityRecord, Cartographic, GeoRectangle, subtract_rectangle};
pub use tiling::{
    GeoBox, GeographicTilingScheme, Quadrant, TileKey, TileRange, TilingScheme,
    WebMercatorTilingScheme,
};

/// Error types for loading and configuring availability
#[derive(Debug, thiserror::Error)]
pub enum AvailabilityError {
    #[cfg(feature = "serde")]
    #[error("Layer document error: {0}")]
    Layer(#[from] serde_json::Error),

    #[error("Invalid levels: minimum {minimum} is above maximum {maximum}")]
    InvalidLevels { minimum: u32, maximum: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AvailabilityError>;
