//! Load a layer and answer one query against it

use crate::settings::{Query, Settings};
use geo::Point;
use std::fs::File;
use std::io::BufReader;
use tile_availability::{
    Cartographic, GeoRectangle, LayerAvailability, Result, TileAvailability, TileKey,
    TilingScheme, utils,
};

/// Run the query described by `settings`, returning the text to print
pub fn run(settings: &Settings) -> Result<String> {
    let file = File::open(&settings.layer)?;
    let layer = LayerAvailability::from_reader(BufReader::new(file))?;

    let mut config = layer.config();
    if let Some(minimum_level) = settings.min_level {
        config.minimum_level = minimum_level;
    }
    if let Some(maximum_level) = settings.max_level {
        config.maximum_level = maximum_level;
    }

    tracing::debug!(
        layer = %settings.layer.display(),
        ?config,
        scheme = ?settings.scheme,
        "Loading layer"
    );
    let availability = layer.to_availability_with_config(settings.scheme.build(), config)?;

    Ok(answer(&availability, &settings.query))
}

pub fn answer<S: TilingScheme>(availability: &TileAvailability<S>, query: &Query) -> String {
    match *query {
        Query::Point { lon, lat } => {
            let position = Cartographic::from_degrees(utils::normalize_longitude(lon), lat);
            match availability.compute_maximum_level_at_position(position) {
                Some(level) => level.to_string(),
                None => "uncovered".to_string(),
            }
        }
        Query::Locate { level, lon, lat } => {
            let position = Point::new(utils::normalize_longitude(lon), lat);
            match availability.tiling_scheme().tile_at(level, position) {
                Some(key) => format!(
                    "{}/{}/{} {}",
                    key.level,
                    key.x,
                    key.y,
                    availability.is_tile_available(key)
                ),
                None => "uncovered".to_string(),
            }
        }
        Query::Tile(tile) => availability.is_tile_available(TileKey::from(tile)).to_string(),
        Query::Exists(tile) => availability.is_exist_tile(TileKey::from(tile)).to_string(),
        Query::Mask(tile) => {
            let mask = availability.compute_child_mask_for_tile(TileKey::from(tile));
            format!("{mask} ({mask:04b})")
        }
        Query::Coverage {
            west,
            south,
            east,
            north,
        } => {
            let rectangle = GeoRectangle::from_degrees(
                utils::normalize_longitude(west),
                south,
                utils::normalize_longitude(east),
                north,
            );
            availability
                .compute_best_available_level_over_rectangle(&rectangle)
                .to_string()
        }
    }
}
