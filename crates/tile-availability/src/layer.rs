//! Availability as published in a terrain `layer.json`
//!
//! ```json
//! {
//!   "minzoom": 0,
//!   "maxzoom": 2,
//!   "available": [
//!     [{ "startX": 0, "startY": 0, "endX": 1, "endY": 0 }],
//!     [{ "startX": 0, "startY": 0, "endX": 3, "endY": 1 }],
//!     [{ "startX": 2, "startY": 1, "endX": 5, "endY": 2 }]
//!   ]
//! }
//! ```
//!
//! `available[i]` lists the ranges available at level `i`. Other fields of the
//! document are ignored.

use crate::{AvailabilityConfig, Result, TileAvailability, TileRange, TilingScheme};
use serde::{Deserialize, Serialize};
use std::io::Read;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerAvailability {
    #[serde(default)]
    pub minzoom: u32,
    /// Defaults to the last level listed in `available`
    #[serde(default)]
    pub maxzoom: Option<u32>,
    #[serde(default)]
    pub available: Vec<Vec<TileRange>>,
}

impl LayerAvailability {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn config(&self) -> AvailabilityConfig {
        let maximum_level = self
            .maxzoom
            .unwrap_or_else(|| self.available.len().saturating_sub(1) as u32);
        AvailabilityConfig::new(self.minzoom, maximum_level)
    }

    /// Build an index from this document
    ///
    /// Roots are the ranges listed at `minzoom`, or every tile of that level
    /// when none are listed. Ranges are then added level by level, from the
    /// coarsest to the finest.
    pub fn to_availability<S: TilingScheme>(&self, scheme: S) -> Result<TileAvailability<S>> {
        self.to_availability_with_config(scheme, self.config())
    }

    /// Like [`Self::to_availability`], with the level bounds overridden
    pub fn to_availability_with_config<S: TilingScheme>(
        &self,
        scheme: S,
        config: AvailabilityConfig,
    ) -> Result<TileAvailability<S>> {
        let mut availability = TileAvailability::with_config(scheme, config)?;
        let minimum_level = config.minimum_level;

        match self.available.get(minimum_level as usize) {
            Some(roots) if !roots.is_empty() => {
                for range in roots {
                    availability.add_root_tiles(*range);
                }
            }
            _ => {
                let whole = TileRange::whole_level(availability.tiling_scheme(), minimum_level);
                availability.add_root_tiles(whole);
            }
        }

        let mut range_count = 0;
        for (level, ranges) in self.available.iter().enumerate() {
            range_count += ranges.len();
            availability.add_available_tile_ranges(level as u32, ranges.iter().copied());
        }

        tracing::info!(
            minimum_level = config.minimum_level,
            maximum_level = config.maximum_level,
            levels = self.available.len(),
            ranges = range_count,
            nodes = availability.node_count(),
            "Loaded layer availability"
        );
        Ok(availability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AvailabilityError, Cartographic, GeographicTilingScheme, TileKey};

    const LAYER: &str = r#"{
        "tilejson": "2.1.0",
        "format": "quantized-mesh-1.0",
        "minzoom": 0,
        "maxzoom": 8,
        "tiles": ["{z}/{x}/{y}.terrain"],
        "available": [
            [{ "startX": 0, "startY": 0, "endX": 1, "endY": 0 }],
            [{ "startX": 0, "startY": 0, "endX": 3, "endY": 1 }],
            [{ "startX": 4, "startY": 1, "endX": 7, "endY": 3 }],
            [],
            [{ "startX": 20, "startY": 5, "endX": 18, "endY": 3 }]
        ]
    }"#;

    #[test]
    fn test_parse_layer() {
        let layer = LayerAvailability::from_json_str(LAYER).unwrap();

        assert_eq!(layer.minzoom, 0);
        assert_eq!(layer.maxzoom, Some(8));
        assert_eq!(layer.available.len(), 5);
        assert_eq!(layer.available[2][0], TileRange::new(4, 1, 7, 3));
        assert!(layer.available[3].is_empty());
        assert_eq!(layer.config(), AvailabilityConfig::new(0, 8));
    }

    #[test]
    fn test_parse_error() {
        let err = LayerAvailability::from_json_str(r#"{ "available": [[{ "startX": 0 }]] }"#)
            .unwrap_err();
        assert!(matches!(err, AvailabilityError::Layer(_)));
    }

    #[test]
    fn test_maxzoom_defaults_to_last_listed_level() {
        let layer =
            LayerAvailability::from_json_str(r#"{ "available": [[], [], []] }"#).unwrap();
        assert_eq!(layer.config(), AvailabilityConfig::new(0, 2));
    }

    #[test]
    fn test_layer_to_availability() {
        let layer = LayerAvailability::from_json_str(LAYER).unwrap();
        let availability = layer
            .to_availability(GeographicTilingScheme::default())
            .unwrap();

        assert_eq!(availability.root_count(), 2);
        assert!(availability.is_tile_available(TileKey::new(1, 3, 1)));
        assert!(availability.is_tile_available(TileKey::new(2, 5, 2)));
        assert!(!availability.is_tile_available(TileKey::new(2, 0, 0)));
        // Corners given in reverse order
        assert!(availability.is_tile_available(TileKey::new(4, 19, 4)));
        assert!(!availability.is_tile_available(TileKey::new(4, 21, 4)));

        let position = Cartographic::from_degrees(-90.0, 45.0);
        assert_eq!(
            availability.compute_maximum_level_at_position(position),
            Some(1)
        );
    }

    #[test]
    fn test_roots_default_to_whole_level() {
        let layer = LayerAvailability::from_json_str(r#"{ "maxzoom": 4 }"#).unwrap();
        let availability = layer
            .to_availability(GeographicTilingScheme::default())
            .unwrap();
        assert_eq!(availability.root_count(), 2);
    }

    #[test]
    fn test_invalid_levels_rejected() {
        let layer =
            LayerAvailability::from_json_str(r#"{ "minzoom": 3, "maxzoom": 1 }"#).unwrap();
        let result = layer.to_availability(GeographicTilingScheme::default());
        assert!(matches!(
            result,
            Err(AvailabilityError::InvalidLevels {
                minimum: 3,
                maximum: 1
            })
        ));
    }
}
