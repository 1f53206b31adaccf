//! TileAvailability - which levels of detail a tile source can serve, and where
//!
//! Ranges of available tiles are reported per level. Each range is turned
//! into a geographic rectangle and stored in the deepest quadtree cell that
//! still fully contains it, so that queries only need to look at the cells on
//! the path to a position.

use crate::quadtree::{NodeId, Quadtree};
use crate::rectangle::{AvailabilityRecord, Cartographic, GeoRectangle, subtract_rectangle};
use crate::tiling::{Quadrant, TileKey, TileRange, TilingScheme};
use crate::{AvailabilityError, Result};

use smallvec::SmallVec;
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Level bounds of an availability index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AvailabilityConfig {
    /// Level of the root tiles
    pub minimum_level: u32,
    /// Deepest level the quadtree is subdivided to and queries report
    pub maximum_level: u32,
}

impl Default for AvailabilityConfig {
    fn default() -> Self {
        Self {
            minimum_level: 0,
            maximum_level: 20,
        }
    }
}

impl AvailabilityConfig {
    pub fn new(minimum_level: u32, maximum_level: u32) -> Self {
        Self {
            minimum_level,
            maximum_level,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.minimum_level > self.maximum_level {
            return Err(AvailabilityError::InvalidLevels {
                minimum: self.minimum_level,
                maximum: self.maximum_level,
            });
        }
        Ok(())
    }
}

/// Quadtree index of reported tile availability
///
/// Availability only ever grows: there is no way to retract a range once it
/// has been added. Inputs are trusted. Levels outside
/// `[minimum_level, maximum_level]` and degenerate ranges are accepted without
/// complaint and simply never influence query results.
#[derive(Debug, Clone)]
pub struct TileAvailability<S> {
    tree: Quadtree<S>,
    minimum_level: u32,
    maximum_level: u32,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl<S: TilingScheme> TileAvailability<S> {
    /// Create an empty index without any root tiles
    ///
    /// Roots must be added with [`Self::add_root_tiles`] before any range can
    /// be recorded.
    pub fn new(scheme: S, minimum_level: u32, maximum_level: u32) -> Self {
        Self {
            tree: Quadtree::new(scheme),
            minimum_level,
            maximum_level,
        }
    }

    pub fn with_config(scheme: S, config: AvailabilityConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(scheme, config.minimum_level, config.maximum_level))
    }

    /// Create an index whose roots are exactly the tiles of `ranges` at
    /// `minimum_level`, each recorded as available at that level
    pub fn create_initial_ranges(
        scheme: S,
        minimum_level: u32,
        maximum_level: u32,
        ranges: &[TileRange],
    ) -> Self {
        #[cfg(feature = "profiling")]
        profiling::scope!("availability::create_initial_ranges");

        let mut availability = Self::new(scheme, minimum_level, maximum_level);
        for range in ranges {
            availability.add_root_tiles(*range);
        }
        for range in ranges {
            availability.add_available_tile_range(minimum_level, *range);
        }

        tracing::info!(
            minimum_level,
            maximum_level,
            roots = availability.root_count(),
            "Created tile availability from initial ranges"
        );
        availability
    }

    pub fn minimum_level(&self) -> u32 {
        self.minimum_level
    }

    pub fn maximum_level(&self) -> u32 {
        self.maximum_level
    }

    pub fn tiling_scheme(&self) -> &S {
        self.tree.scheme()
    }

    pub fn quadtree(&self) -> &Quadtree<S> {
        &self.tree
    }

    pub fn root_count(&self) -> usize {
        self.tree.roots().len()
    }

    /// Number of materialized quadtree cells
    pub fn node_count(&self) -> usize {
        self.tree.len()
    }

    /// Create a root cell for every tile of `range` at `minimum_level`
    ///
    /// Tiles that already have a root are skipped. This is the only way roots
    /// come into existence; [`Self::add_available_tile_range`] never creates
    /// them.
    pub fn add_root_tiles(&mut self, range: TileRange) {
        for (x, y) in range.tiles() {
            self.tree.add_root(TileKey::new(self.minimum_level, x, y));
        }
    }

    /// Record that every tile of `range` at `level` is available
    pub fn add_available_tile_range(&mut self, level: u32, range: TileRange) {
        let scheme = self.tree.scheme();
        let mut bounds = scheme.geo_box(TileKey::new(level, range.start_x, range.start_y));
        let end = scheme.geo_box(TileKey::new(level, range.end_x, range.end_y));
        bounds.grow_to_contain(end.southwest());
        bounds.grow_to_contain(end.northeast());

        let record = AvailabilityRecord {
            level,
            rectangle: bounds.to_radians(),
        };

        for index in 0..self.tree.roots().len() {
            let root = self.tree.roots()[index];
            if self.tree.node(root).extent().overlaps(&record.rectangle) {
                self.put_record_in_quadtree(root, record);
            }
        }
    }

    pub fn add_available_tile_ranges<I>(&mut self, level: u32, ranges: I)
    where
        I: IntoIterator<Item = TileRange>,
    {
        for range in ranges {
            self.add_available_tile_range(level, range);
        }
    }

    /// Push `record` down from `root` while exactly one child fully contains
    /// it, then store it in the cell where the descent stopped
    fn put_record_in_quadtree(&mut self, root: NodeId, record: AvailabilityRecord) {
        let mut node = root;

        while self.tree.node(node).level() < self.maximum_level {
            let mut containing: SmallVec<[NodeId; 4]> = SmallVec::new();
            for quadrant in Quadrant::ALL {
                let Some(child) = self.tree.get_or_create_child(node, quadrant) else {
                    continue;
                };
                if self
                    .tree
                    .node(child)
                    .extent()
                    .fully_contains(&record.rectangle)
                {
                    containing.push(child);
                }
            }

            match containing.as_slice() {
                [only] => node = *only,
                _ => break,
            }
        }

        let landing = self.tree.node_mut(node);
        tracing::trace!(
            level = record.level,
            node_level = landing.level(),
            x = landing.key().x,
            y = landing.key().y,
            "Stored availability record"
        );
        landing.insert_record(record);
    }

    /// The most detailed level available at `position`
    ///
    /// Returns `None` when no root tile contains the position, and `Some(0)`
    /// when a root does but no record covers the position.
    pub fn compute_maximum_level_at_position(&self, position: Cartographic) -> Option<u32> {
        // The first containing root wins, even on a shared root edge
        let root = self
            .tree
            .roots()
            .iter()
            .copied()
            .find(|&id| self.tree.node(id).extent().contains_position(&position))?;

        Some(self.find_max_level_from_node(None, root, &position))
    }

    /// Descend from `start` towards `position`, then walk the cells back up to
    /// (excluding) `stop`, keeping the best record level that contains it
    fn find_max_level_from_node(
        &self,
        stop: Option<NodeId>,
        start: NodeId,
        position: &Cartographic,
    ) -> u32 {
        let mut max_level = 0;
        let mut node = start;

        loop {
            let matching: SmallVec<[NodeId; 4]> = self
                .tree
                .node(node)
                .children()
                .filter(|&child| self.tree.node(child).extent().contains_position(position))
                .collect();

            match matching.as_slice() {
                [] => break,
                [only] => node = *only,
                // On a shared edge every side gets a say
                several => {
                    for &child in several {
                        max_level =
                            max_level.max(self.find_max_level_from_node(Some(node), child, position));
                    }
                    break;
                }
            }
        }

        let mut current = Some(node);
        while current != stop {
            let Some(id) = current else {
                break;
            };
            let cell = self.tree.node(id);

            for record in cell.records().iter().rev() {
                if record.level <= max_level {
                    break;
                }
                if record.rectangle.contains_position(position) {
                    max_level = record.level;
                    break;
                }
            }

            current = cell.parent();
        }

        max_level
    }

    /// Whether the tile is available, judged by sampling its center
    ///
    /// A tile that is only partly available may be reported either way.
    pub fn is_tile_available(&self, key: TileKey) -> bool {
        let center = self.tree.scheme().geo_box(key).center_cartographic();
        self.compute_maximum_level_at_position(center)
            .is_some_and(|level| level >= key.level)
    }

    /// Like [`Self::is_tile_available`], but false for levels outside
    /// `[minimum_level, maximum_level]`
    pub fn is_exist_tile(&self, key: TileKey) -> bool {
        if key.level < self.minimum_level || key.level > self.maximum_level {
            return false;
        }
        self.is_tile_available(key)
    }

    /// Bit mask of the available children of `key`
    ///
    /// Bits are `1` = SW, `2` = SE, `4` = NW, `8` = NE. Always 0 when the
    /// children would be at or beyond the maximum level.
    pub fn compute_child_mask_for_tile(&self, key: TileKey) -> u8 {
        let child_level = key.level.saturating_add(1);
        if child_level >= self.maximum_level {
            return 0;
        }

        [
            (Quadrant::SouthWest, 1u8),
            (Quadrant::SouthEast, 2),
            (Quadrant::NorthWest, 4),
            (Quadrant::NorthEast, 8),
        ]
        .into_iter()
        .filter(|&(quadrant, _)| {
            key.child(quadrant)
                .is_some_and(|child| self.is_tile_available(child))
        })
        .fold(0, |mask, (_, bit)| mask | bit)
    }

    /// The highest level at which all of `rectangle` is available
    ///
    /// Rectangles with `east < west` cross the antimeridian. Returns 0 when no
    /// level fully covers the rectangle. A level only qualifies if records
    /// exist at that very level; coverage by a more detailed level does not
    /// count for it.
    pub fn compute_best_available_level_over_rectangle(&self, rectangle: &GeoRectangle) -> u32 {
        #[cfg(feature = "profiling")]
        profiling::scope!("availability::coverage");

        let to_cover = rectangle.split_at_antimeridian();
        let mut remaining: BTreeMap<u32, Vec<GeoRectangle>> = BTreeMap::new();

        for &root in self.tree.roots() {
            self.update_coverage_with_node(&mut remaining, root, &to_cover);
        }

        remaining
            .range(..=self.maximum_level)
            .rev()
            .find(|(_, uncovered)| uncovered.is_empty())
            .map_or(0, |(&level, _)| level)
    }

    fn update_coverage_with_node(
        &self,
        remaining: &mut BTreeMap<u32, Vec<GeoRectangle>>,
        id: NodeId,
        to_cover: &[GeoRectangle],
    ) {
        let node = self.tree.node(id);
        if !to_cover.iter().any(|r| node.extent().overlaps(r)) {
            return;
        }

        for record in node.records() {
            let uncovered = remaining
                .entry(record.level)
                .or_insert_with(|| to_cover.to_vec());
            if !uncovered.is_empty() {
                *uncovered = subtract_rectangle(uncovered, &record.rectangle);
            }
        }

        for child in node.children() {
            self.update_coverage_with_node(remaining, child, to_cover);
        }
    }
}
