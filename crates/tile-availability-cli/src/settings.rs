use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tile_availability::{GeographicTilingScheme, TileKey, TilingScheme, WebMercatorTilingScheme};

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Tile Availability - query which zoom levels a terrain layer can serve
pub struct Settings {
    /// layer.json file listing the available tile ranges
    #[clap(short, long, value_name = "FILE")]
    pub layer: PathBuf,

    /// Tiling scheme the layer's tile indices refer to
    #[clap(short, long, value_enum, default_value = "geographic")]
    pub scheme: SchemeKind,

    /// Override the minimum (root) level of the layer
    #[clap(long)]
    pub min_level: Option<u32>,

    /// Override the maximum level of the layer
    #[clap(long)]
    pub max_level: Option<u32>,

    #[clap(subcommand)]
    pub query: Query,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemeKind {
    /// Equirectangular, two root tiles
    Geographic,
    /// EPSG:3857, one root tile
    WebMercator,
}

impl SchemeKind {
    pub fn build(self) -> Box<dyn TilingScheme> {
        match self {
            SchemeKind::Geographic => Box::new(GeographicTilingScheme::default()),
            SchemeKind::WebMercator => Box::new(WebMercatorTilingScheme),
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Query {
    /// Most detailed level available at a position
    Point {
        /// Longitude in degrees
        #[clap(long, allow_negative_numbers = true)]
        lon: f64,
        /// Latitude in degrees
        #[clap(long, allow_negative_numbers = true)]
        lat: f64,
    },
    /// The tile at a level containing a position, and whether it is available
    Locate {
        #[clap(long)]
        level: u32,
        /// Longitude in degrees
        #[clap(long, allow_negative_numbers = true)]
        lon: f64,
        /// Latitude in degrees
        #[clap(long, allow_negative_numbers = true)]
        lat: f64,
    },
    /// Whether a tile is available (sampled at its center)
    Tile(TileArgs),
    /// Like `tile`, but false outside the layer's level bounds
    Exists(TileArgs),
    /// Available children of a tile as a bit mask (1=SW, 2=SE, 4=NW, 8=NE)
    Mask(TileArgs),
    /// Most detailed level available over a whole rectangle
    Coverage {
        #[clap(long, allow_negative_numbers = true)]
        west: f64,
        #[clap(long, allow_negative_numbers = true)]
        south: f64,
        /// May be less than `west` for rectangles crossing the antimeridian
        #[clap(long, allow_negative_numbers = true)]
        east: f64,
        #[clap(long, allow_negative_numbers = true)]
        north: f64,
    },
}

#[derive(Args, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileArgs {
    #[clap(long)]
    pub level: u32,
    #[clap(short, long)]
    pub x: u32,
    #[clap(short, long)]
    pub y: u32,
}

impl From<TileArgs> for TileKey {
    fn from(args: TileArgs) -> Self {
        TileKey::new(args.level, args.x, args.y)
    }
}
