//! Lazily materialized quadtree of tile cells
//!
//! Nodes live in a `Vec` arena owned by [`Quadtree`] and refer to each other by
//! [`NodeId`]. A node owns its four child slots; the parent link is a plain
//! index and never owns anything. Nodes are never removed, so a `NodeId` stays
//! valid for the life of the tree.

use crate::rectangle::{AvailabilityRecord, GeoRectangle};
use crate::tiling::{Quadrant, TileKey, TilingScheme};
use std::collections::HashMap;

/// Index into the node arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single tile cell of the availability quadtree
#[derive(Debug, Clone)]
pub struct QuadtreeNode {
    /// Tile address of this cell
    key: TileKey,
    /// Geographic extent in radians
    extent: GeoRectangle,
    /// Parent cell, `None` for roots
    parent: Option<NodeId>,
    /// Child slots (NW, NE, SW, SE), filled on first use
    children: [Option<NodeId>; 4],
    /// Availability records, sorted ascending by level
    records: Vec<AvailabilityRecord>,
}

impl QuadtreeNode {
    fn new(key: TileKey, extent: GeoRectangle, parent: Option<NodeId>) -> Self {
        Self {
            key,
            extent,
            parent,
            children: [None; 4],
            records: Vec::new(),
        }
    }

    pub fn key(&self) -> TileKey {
        self.key
    }

    pub fn level(&self) -> u32 {
        self.key.level
    }

    pub fn extent(&self) -> &GeoRectangle {
        &self.extent
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The child in `quadrant` if it has already been materialized
    #[inline]
    pub fn child(&self, quadrant: Quadrant) -> Option<NodeId> {
        self.children[quadrant.index()]
    }

    /// Materialized children in slot order
    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children.iter().flatten().copied()
    }

    pub fn records(&self) -> &[AvailabilityRecord] {
        &self.records
    }

    /// Insert a record keeping `records` sorted by level
    ///
    /// Records arriving in non-decreasing level order are appended directly.
    /// Otherwise the record goes after every existing record of the same
    /// level.
    pub(crate) fn insert_record(&mut self, record: AvailabilityRecord) {
        match self.records.last() {
            Some(last) if last.level > record.level => {
                let index = self.records.partition_point(|r| r.level <= record.level);
                self.records.insert(index, record);
            }
            _ => self.records.push(record),
        }
    }
}

/// Arena of quadtree nodes plus the tiling scheme used to size new cells
#[derive(Debug, Clone)]
pub struct Quadtree<S> {
    scheme: S,
    nodes: Vec<QuadtreeNode>,
    roots: Vec<NodeId>,
    root_lookup: HashMap<TileKey, NodeId>,
}

impl<S: TilingScheme> Quadtree<S> {
    pub fn new(scheme: S) -> Self {
        Self {
            scheme,
            nodes: Vec::new(),
            roots: Vec::new(),
            root_lookup: HashMap::new(),
        }
    }

    pub fn scheme(&self) -> &S {
        &self.scheme
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Number of materialized nodes, roots included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every materialized node, in creation order
    pub fn nodes(&self) -> impl Iterator<Item = &QuadtreeNode> {
        self.nodes.iter()
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &QuadtreeNode {
        &self.nodes[id.index()]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut QuadtreeNode {
        &mut self.nodes[id.index()]
    }

    /// The root for `key`, created if no root with that address exists yet
    pub fn add_root(&mut self, key: TileKey) -> NodeId {
        if let Some(&existing) = self.root_lookup.get(&key) {
            return existing;
        }

        let id = self.push_node(key, None);
        self.roots.push(id);
        self.root_lookup.insert(key, id);
        tracing::debug!(
            level = key.level,
            x = key.x,
            y = key.y,
            "Created availability root"
        );
        id
    }

    /// The child of `id` in `quadrant`, computing its extent from the tiling
    /// scheme and storing it the first time it is requested
    ///
    /// Returns `None` when the child's tile address is not representable.
    pub fn get_or_create_child(&mut self, id: NodeId, quadrant: Quadrant) -> Option<NodeId> {
        if let Some(child) = self.node(id).child(quadrant) {
            return Some(child);
        }

        let key = self.node(id).key.child(quadrant)?;
        let child = self.push_node(key, Some(id));
        self.node_mut(id).children[quadrant.index()] = Some(child);
        Some(child)
    }

    fn push_node(&mut self, key: TileKey, parent: Option<NodeId>) -> NodeId {
        let extent = self.scheme.geo_box(key).to_radians();
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(QuadtreeNode::new(key, extent, parent));
        id
    }
}
