#![forbid(unsafe_code)]

//! Binary space-partitioning layout tree.
//!
//! The tree is an arena of [`LayoutNode`] records keyed by [`NodeId`], each
//! carrying a parent back-reference. A node is either a leaf holding one
//! region or a split holding a [`Divider`] and exactly two children. The root
//! covers the whole layout extent; a split partitions its extent between its
//! children along the divider's axis.
//!
//! # Invariants
//!
//! 1. Every split has exactly two children and every child points back at it.
//! 2. Every node is reachable from the root; the root has no parent.
//! 3. Region ids are unique within a tree. A copy gets a fresh id.
//! 4. Divider positions stay within `[0.01, 0.99]`.
//! 5. A rejected operation leaves the tree exactly as it was.
//!
//! Geometry is never cached: [`LayoutTree::visit_with_bounds`] and
//! [`LayoutTree::hit_test`] recompute extents from the current structure.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use tilewm_core::geometry::{Axis, Point, Rect};
use tilewm_core::theme::Theme;
use tracing::{debug, debug_span, trace, warn};

use crate::error::LayoutError;
use crate::region::Region;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        ///
        /// `0` is reserved/invalid so IDs are always non-zero.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u64);

        impl $name {
            /// Lowest valid ID.
            pub const MIN: Self = Self(1);

            /// Create an ID, rejecting 0.
            pub fn new(raw: u64) -> Result<Self, LayoutError> {
                if raw == 0 {
                    return Err(LayoutError::ZeroId);
                }
                Ok(Self(raw))
            }

            /// Get the raw numeric value.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }

            fn checked_next(self) -> Result<Self, LayoutError> {
                self.0.checked_add(1).map(Self).ok_or(LayoutError::IdOverflow)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

arena_id!(
    /// Stable identifier for layout nodes.
    NodeId
);

arena_id!(
    /// Handle naming a region within one tree.
    RegionId
);

/// Split line between two sibling subtrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Divider {
    pub axis: Axis,
    position: f32,
}

impl Divider {
    pub const MIN_POSITION: f32 = 0.01;
    pub const MAX_POSITION: f32 = 0.99;

    /// Create a divider; `position` is clamped into range (NaN becomes 0.5).
    #[must_use]
    pub fn new(axis: Axis, position: f32) -> Self {
        Self {
            axis,
            position: clamp_position(position),
        }
    }

    /// Fraction of the split's extent given to the first child.
    #[must_use]
    pub const fn position(&self) -> f32 {
        self.position
    }

    pub fn set_position(&mut self, position: f32) {
        self.position = clamp_position(position);
    }

    /// Move the divider by a pointer delta measured against the extent of
    /// the split it belongs to. Returns the new position.
    pub fn drag(&mut self, delta: Point, split_extent: Rect) -> f32 {
        let length = split_extent.extent_along(self.axis);
        if length > 0.0 {
            self.set_position(self.position + delta.along(self.axis) / length);
        }
        self.position
    }
}

fn clamp_position(position: f32) -> f32 {
    if position.is_nan() {
        return 0.5;
    }
    position.clamp(Divider::MIN_POSITION, Divider::MAX_POSITION)
}

/// Leaf payload: the region and the id the tree knows it by.
#[derive(Debug)]
pub struct Leaf {
    pub region_id: RegionId,
    pub region: Box<dyn Region>,
}

/// Interior payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Split {
    pub divider: Divider,
    /// Left or top child.
    pub first: NodeId,
    /// Right or bottom child.
    pub second: NodeId,
}

impl Split {
    #[must_use]
    pub const fn children(&self) -> [NodeId; 2] {
        [self.first, self.second]
    }

    #[must_use]
    pub const fn child(&self, index: usize) -> NodeId {
        if index == 0 { self.first } else { self.second }
    }
}

#[derive(Debug)]
pub enum NodeKind {
    Leaf(Leaf),
    Split(Split),
}

/// One arena record.
#[derive(Debug)]
pub struct LayoutNode {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub kind: NodeKind,
}

impl LayoutNode {
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    #[must_use]
    pub fn region_id(&self) -> Option<RegionId> {
        match &self.kind {
            NodeKind::Leaf(leaf) => Some(leaf.region_id),
            NodeKind::Split(_) => None,
        }
    }
}

/// Something the pointer can land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Region(RegionId),
    /// The divider strip of the split node with this id.
    Divider(NodeId),
}

impl Target {
    #[must_use]
    pub const fn region(self) -> Option<RegionId> {
        match self {
            Self::Region(id) => Some(id),
            Self::Divider(_) => None,
        }
    }

    #[must_use]
    pub const fn divider(self) -> Option<NodeId> {
        match self {
            Self::Divider(id) => Some(id),
            Self::Region(_) => None,
        }
    }
}

/// A target with the extent it occupies and the extent of its enclosing
/// split. For a divider, `parent_extent` is the extent of its own split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub target: Target,
    pub extent: Rect,
    pub parent_extent: Rect,
}

/// Outcome of replacing the region in a leaf.
#[derive(Debug)]
pub struct Replaced {
    /// Id of the region now in the leaf.
    pub region_id: RegionId,
    pub previous_id: RegionId,
    pub previous: Box<dyn Region>,
}

/// Arena-backed layout tree.
#[derive(Debug)]
pub struct LayoutTree {
    root: NodeId,
    nodes: BTreeMap<NodeId, LayoutNode>,
    next_node: NodeId,
    next_region: RegionId,
}

impl LayoutTree {
    /// Create a tree holding a single leaf.
    #[must_use]
    pub fn new(region: Box<dyn Region>) -> Self {
        let root = NodeId::MIN;
        let region_id = RegionId::MIN;
        let mut nodes = BTreeMap::new();
        nodes.insert(
            root,
            LayoutNode {
                id: root,
                parent: None,
                kind: NodeKind::Leaf(Leaf { region_id, region }),
            },
        );
        Self {
            root,
            nodes,
            next_node: NodeId(2),
            next_region: RegionId(2),
        }
    }

    /// An arena with no nodes; callers must insert a root before use.
    pub(crate) fn empty() -> Self {
        Self {
            root: NodeId::MIN,
            nodes: BTreeMap::new(),
            next_node: NodeId::MIN,
            next_region: RegionId::MIN,
        }
    }

    pub(crate) fn alloc_node(&mut self) -> Result<NodeId, LayoutError> {
        let id = self.next_node;
        self.next_node = id.checked_next()?;
        Ok(id)
    }

    pub(crate) fn alloc_region(&mut self) -> Result<RegionId, LayoutError> {
        let id = self.next_region;
        self.next_region = id.checked_next()?;
        Ok(id)
    }

    pub(crate) fn insert_node(&mut self, node: LayoutNode) {
        self.nodes.insert(node.id, node);
    }

    pub(crate) fn set_root(&mut self, root: NodeId) {
        self.root = root;
    }

    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&LayoutNode> {
        self.nodes.get(&id)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.nodes.values().filter(|n| n.is_leaf()).count()
    }

    /// Whether the tree has any interior node.
    #[must_use]
    pub fn has_splits(&self) -> bool {
        self.nodes.get(&self.root).is_some_and(|n| !n.is_leaf())
    }

    #[must_use]
    pub fn divider(&self, node: NodeId) -> Option<Divider> {
        match self.nodes.get(&node).map(|n| &n.kind) {
            Some(NodeKind::Split(split)) => Some(split.divider),
            _ => None,
        }
    }

    #[must_use]
    pub fn contains_region(&self, region: RegionId) -> bool {
        self.find_node(region).is_some()
    }

    #[must_use]
    pub fn region(&self, region: RegionId) -> Option<&dyn Region> {
        let node = self.find_node(region)?;
        match &self.nodes.get(&node)?.kind {
            NodeKind::Leaf(leaf) => Some(leaf.region.as_ref()),
            NodeKind::Split(_) => None,
        }
    }

    pub fn region_mut(&mut self, region: RegionId) -> Option<&mut dyn Region> {
        let node = self.find_node(region)?;
        match &mut self.nodes.get_mut(&node)?.kind {
            NodeKind::Leaf(leaf) => Some(leaf.region.as_mut()),
            NodeKind::Split(_) => None,
        }
    }

    /// Region ids in traversal order (left/top subtree first).
    #[must_use]
    pub fn regions(&self) -> Vec<RegionId> {
        let mut out = Vec::new();
        self.visit(|target| {
            if let Target::Region(id) = target {
                out.push(id);
            }
        });
        out
    }

    /// Depth-first search (first child before second) for the leaf holding
    /// `region`.
    #[must_use]
    pub fn find_node(&self, region: RegionId) -> Option<NodeId> {
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            match &node.kind {
                NodeKind::Leaf(leaf) if leaf.region_id == region => return Some(id),
                NodeKind::Leaf(_) => {}
                NodeKind::Split(split) => {
                    stack.push(split.second);
                    stack.push(split.first);
                }
            }
        }
        None
    }

    /// The split node directly above `region`'s leaf and which child slot
    /// (0 or 1) the leaf occupies. `None` for the root or an unknown region.
    #[must_use]
    pub fn find_parent(&self, region: RegionId) -> Option<(NodeId, usize)> {
        let node = self.find_node(region)?;
        let parent = self.nodes.get(&node)?.parent?;
        match &self.nodes.get(&parent)?.kind {
            NodeKind::Split(split) => Some((parent, usize::from(split.first != node))),
            NodeKind::Leaf(_) => None,
        }
    }

    /// In-order traversal: first subtree, the divider, then second subtree.
    pub fn visit(&self, mut f: impl FnMut(Target)) {
        self.walk(self.root, &mut f);
    }

    fn walk(&self, id: NodeId, f: &mut dyn FnMut(Target)) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        match &node.kind {
            NodeKind::Leaf(leaf) => f(Target::Region(leaf.region_id)),
            NodeKind::Split(split) => {
                self.walk(split.first, f);
                f(Target::Divider(id));
                self.walk(split.second, f);
            }
        }
    }

    /// In-order traversal of the subtree at `from` laid out inside `extent`,
    /// with divider strips `divider_width` wide.
    pub fn visit_with_bounds(
        &self,
        from: NodeId,
        extent: Rect,
        divider_width: f32,
        mut f: impl FnMut(Placement),
    ) {
        self.walk_bounds(from, extent, extent, divider_width, &mut f);
    }

    fn walk_bounds(
        &self,
        id: NodeId,
        extent: Rect,
        parent_extent: Rect,
        divider_width: f32,
        f: &mut dyn FnMut(Placement),
    ) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        match &node.kind {
            NodeKind::Leaf(leaf) => f(Placement {
                target: Target::Region(leaf.region_id),
                extent,
                parent_extent,
            }),
            NodeKind::Split(split) => {
                let parts = extent.split_along(
                    split.divider.axis,
                    split.divider.position(),
                    divider_width,
                );
                self.walk_bounds(split.first, parts.first, extent, divider_width, f);
                f(Placement {
                    target: Target::Divider(id),
                    extent: parts.divider,
                    parent_extent: extent,
                });
                self.walk_bounds(split.second, parts.second, extent, divider_width, f);
            }
        }
    }

    /// Collected form of [`visit_with_bounds`](Self::visit_with_bounds).
    #[must_use]
    pub fn placements(&self, from: NodeId, extent: Rect, divider_width: f32) -> Vec<Placement> {
        let mut out = Vec::with_capacity(self.nodes.len());
        self.visit_with_bounds(from, extent, divider_width, |p| out.push(p));
        out
    }

    /// The region or divider under `point`, or `None` if the point lies
    /// outside `extent`.
    #[must_use]
    pub fn hit_test(
        &self,
        from: NodeId,
        extent: Rect,
        point: Point,
        divider_width: f32,
    ) -> Option<Target> {
        if !extent.contains(point) {
            return None;
        }
        let mut hit = None;
        self.visit_with_bounds(from, extent, divider_width, |p| {
            if hit.is_none() && p.extent.contains(point) {
                hit = Some(p.target);
            }
        });
        if hit.is_none() {
            warn!(
                target: "tilewm.layout",
                x = point.x,
                y = point.y,
                "no target contains point inside layout extent"
            );
        }
        hit
    }

    /// Split the leaf `target` in place: it becomes a split node whose first
    /// child holds the original region and whose second child holds
    /// `new_region`, divided at 0.5. Returns the new region's id.
    pub fn split(
        &mut self,
        target: NodeId,
        axis: Axis,
        new_region: Box<dyn Region>,
    ) -> Result<RegionId, LayoutError> {
        let _span = debug_span!(
            target: "tilewm.layout",
            "layout.mutation",
            op = "split",
            node = target.get()
        )
        .entered();

        match self.nodes.get(&target) {
            None => return Err(LayoutError::MissingNode { node: target }),
            Some(node) if !node.is_leaf() => {
                warn!(target: "tilewm.layout", node = target.get(), "split target is not a leaf");
                return Err(LayoutError::NotALeaf { node: target });
            }
            Some(_) => {}
        }

        let first = self.alloc_node()?;
        let second = self.alloc_node()?;
        let new_region_id = self.alloc_region()?;

        let Some(node) = self.nodes.get_mut(&target) else {
            return Err(LayoutError::MissingNode { node: target });
        };
        let split = NodeKind::Split(Split {
            divider: Divider::new(axis, 0.5),
            first,
            second,
        });
        let original = match std::mem::replace(&mut node.kind, split) {
            NodeKind::Leaf(leaf) => leaf,
            other => {
                node.kind = other;
                return Err(LayoutError::NotALeaf { node: target });
            }
        };

        self.nodes.insert(
            first,
            LayoutNode {
                id: first,
                parent: Some(target),
                kind: NodeKind::Leaf(original),
            },
        );
        self.nodes.insert(
            second,
            LayoutNode {
                id: second,
                parent: Some(target),
                kind: NodeKind::Leaf(Leaf {
                    region_id: new_region_id,
                    region: new_region,
                }),
            },
        );

        debug!(
            target: "tilewm.layout",
            node = target.get(),
            axis = ?axis,
            new_region = new_region_id.get(),
            "split leaf"
        );
        trace!(target: "tilewm.layout", tree = %self, "layout after split");
        Ok(new_region_id)
    }

    /// [`split`](Self::split) addressed by region instead of node.
    pub fn split_region(
        &mut self,
        region: RegionId,
        axis: Axis,
        new_region: Box<dyn Region>,
    ) -> Result<RegionId, LayoutError> {
        let node = self
            .find_node(region)
            .ok_or(LayoutError::MissingRegion { region })?;
        self.split(node, axis, new_region)
    }

    /// Remove `region`'s leaf. Its parent split takes over the sibling's
    /// contents (keeping the parent's id) and the removed region is returned.
    pub fn delete(&mut self, region: RegionId) -> Result<Box<dyn Region>, LayoutError> {
        let _span = debug_span!(
            target: "tilewm.layout",
            "layout.mutation",
            op = "delete",
            region = region.get()
        )
        .entered();

        let node_id = self
            .find_node(region)
            .ok_or(LayoutError::MissingRegion { region })?;
        let Some(parent_id) = self.nodes.get(&node_id).and_then(|n| n.parent) else {
            warn!(target: "tilewm.layout", region = region.get(), "refusing to delete root region");
            return Err(LayoutError::CannotDeleteRoot { region });
        };
        let sibling_id = match self.nodes.get(&parent_id).map(|n| &n.kind) {
            Some(NodeKind::Split(split)) if split.first == node_id => split.second,
            Some(NodeKind::Split(split)) => split.first,
            _ => return Err(LayoutError::NotASplit { node: parent_id }),
        };
        if !self.nodes.contains_key(&sibling_id) {
            return Err(LayoutError::MissingNode { node: sibling_id });
        }

        let (Some(removed), Some(sibling)) =
            (self.nodes.remove(&node_id), self.nodes.remove(&sibling_id))
        else {
            return Err(LayoutError::Invalid(format!(
                "node {node_id} or {sibling_id} vanished during delete"
            )));
        };
        if let NodeKind::Split(split) = &sibling.kind {
            for child in split.children() {
                if let Some(child) = self.nodes.get_mut(&child) {
                    child.parent = Some(parent_id);
                }
            }
        }
        if let Some(parent) = self.nodes.get_mut(&parent_id) {
            parent.kind = sibling.kind;
        }

        debug!(
            target: "tilewm.layout",
            region = region.get(),
            collapsed_into = parent_id.get(),
            "deleted region"
        );
        trace!(target: "tilewm.layout", tree = %self, "layout after delete");
        match removed.kind {
            NodeKind::Leaf(leaf) => Ok(leaf.region),
            NodeKind::Split(_) => Err(LayoutError::NotALeaf { node: node_id }),
        }
    }

    /// Swap the regions (and their ids) held by two leaves. Exchanging a
    /// region with itself does nothing.
    pub fn exchange(&mut self, a: RegionId, b: RegionId) -> Result<(), LayoutError> {
        if a == b {
            return Ok(());
        }
        let _span = debug_span!(
            target: "tilewm.layout",
            "layout.mutation",
            op = "exchange",
            a = a.get(),
            b = b.get()
        )
        .entered();

        let na = self
            .find_node(a)
            .ok_or(LayoutError::MissingRegion { region: a })?;
        let nb = self
            .find_node(b)
            .ok_or(LayoutError::MissingRegion { region: b })?;

        let Some(mut node_a) = self.nodes.remove(&na) else {
            return Err(LayoutError::MissingNode { node: na });
        };
        let Some(mut node_b) = self.nodes.remove(&nb) else {
            self.nodes.insert(na, node_a);
            return Err(LayoutError::MissingNode { node: nb });
        };
        std::mem::swap(&mut node_a.kind, &mut node_b.kind);
        self.nodes.insert(na, node_a);
        self.nodes.insert(nb, node_b);

        debug!(target: "tilewm.layout", a = a.get(), b = b.get(), "exchanged regions");
        Ok(())
    }

    /// Put `new_region` in `target`'s leaf under a fresh id and hand back the
    /// region it displaced.
    pub fn replace_region(
        &mut self,
        target: RegionId,
        new_region: Box<dyn Region>,
    ) -> Result<Replaced, LayoutError> {
        let node = self
            .find_node(target)
            .ok_or(LayoutError::MissingRegion { region: target })?;
        let region_id = self.alloc_region()?;
        let Some(LayoutNode {
            kind: NodeKind::Leaf(leaf),
            ..
        }) = self.nodes.get_mut(&node)
        else {
            return Err(LayoutError::NotALeaf { node });
        };
        let previous = std::mem::replace(&mut leaf.region, new_region);
        leaf.region_id = region_id;

        debug!(
            target: "tilewm.layout",
            previous = target.get(),
            region = region_id.get(),
            "replaced region"
        );
        Ok(Replaced {
            region_id,
            previous_id: target,
            previous,
        })
    }

    /// Replace `destination`'s region with a named copy of `source`'s.
    pub fn copy_into(
        &mut self,
        source: RegionId,
        destination: RegionId,
    ) -> Result<Replaced, LayoutError> {
        let _span = debug_span!(
            target: "tilewm.layout",
            "layout.mutation",
            op = "copy",
            source = source.get(),
            destination = destination.get()
        )
        .entered();

        if !self.contains_region(destination) {
            return Err(LayoutError::MissingRegion {
                region: destination,
            });
        }
        let copy = self
            .region(source)
            .ok_or(LayoutError::MissingRegion { region: source })?
            .duplicate(true);
        self.replace_region(destination, copy)
    }

    /// Deep copy: same structure and ids, every region duplicated.
    #[must_use]
    pub fn duplicate(&self) -> LayoutTree {
        let nodes = self
            .nodes
            .iter()
            .map(|(id, node)| {
                let kind = match &node.kind {
                    NodeKind::Leaf(leaf) => NodeKind::Leaf(Leaf {
                        region_id: leaf.region_id,
                        region: leaf.region.duplicate(false),
                    }),
                    NodeKind::Split(split) => NodeKind::Split(*split),
                };
                (
                    *id,
                    LayoutNode {
                        id: node.id,
                        parent: node.parent,
                        kind,
                    },
                )
            })
            .collect();
        Self {
            root: self.root,
            nodes,
            next_node: self.next_node,
            next_region: self.next_region,
        }
    }

    /// Move the divider of split `node` by `delta`, measured against
    /// `split_extent` (the split's own extent). Returns the new position.
    pub fn drag_divider(
        &mut self,
        node: NodeId,
        delta: Point,
        split_extent: Rect,
    ) -> Result<f32, LayoutError> {
        match self.nodes.get_mut(&node).map(|n| &mut n.kind) {
            Some(NodeKind::Split(split)) => {
                let position = split.divider.drag(delta, split_extent);
                trace!(target: "tilewm.layout", node = node.get(), position, "dragged divider");
                Ok(position)
            }
            Some(NodeKind::Leaf(_)) => Err(LayoutError::NotASplit { node }),
            None => Err(LayoutError::MissingNode { node }),
        }
    }

    /// Call `activate` on every region.
    pub fn activate_all(&mut self, theme: &Theme) {
        for node in self.nodes.values_mut() {
            if let NodeKind::Leaf(leaf) = &mut node.kind {
                leaf.region.activate(theme);
            }
        }
    }

    /// Call `deactivate` on every region.
    pub fn deactivate_all(&mut self) {
        for node in self.nodes.values_mut() {
            if let NodeKind::Leaf(leaf) = &mut node.kind {
                leaf.region.deactivate();
            }
        }
    }

    /// Check every structural invariant.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let root = self
            .nodes
            .get(&self.root)
            .ok_or(LayoutError::MissingNode { node: self.root })?;
        if root.parent.is_some() {
            return Err(LayoutError::Invalid(format!(
                "root {} has a parent",
                self.root
            )));
        }

        let mut seen = BTreeSet::new();
        let mut regions = BTreeSet::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                return Err(LayoutError::Invalid(format!("node {id} reached twice")));
            }
            let node = self
                .nodes
                .get(&id)
                .ok_or(LayoutError::MissingNode { node: id })?;
            if node.id != id {
                return Err(LayoutError::Invalid(format!(
                    "node stored under {id} claims id {}",
                    node.id
                )));
            }
            if id >= self.next_node {
                return Err(LayoutError::Invalid(format!(
                    "node {id} not below allocator {}",
                    self.next_node
                )));
            }
            match &node.kind {
                NodeKind::Leaf(leaf) => {
                    if !regions.insert(leaf.region_id) {
                        return Err(LayoutError::Invalid(format!(
                            "region {} appears twice",
                            leaf.region_id
                        )));
                    }
                    if leaf.region_id >= self.next_region {
                        return Err(LayoutError::Invalid(format!(
                            "region {} not below allocator {}",
                            leaf.region_id, self.next_region
                        )));
                    }
                }
                NodeKind::Split(split) => {
                    if split.first == split.second {
                        return Err(LayoutError::Invalid(format!(
                            "split {id} has the same child twice"
                        )));
                    }
                    let position = split.divider.position();
                    if !(Divider::MIN_POSITION..=Divider::MAX_POSITION).contains(&position) {
                        return Err(LayoutError::Invalid(format!(
                            "split {id} divider at {position}"
                        )));
                    }
                    for child in split.children() {
                        let child_node = self
                            .nodes
                            .get(&child)
                            .ok_or(LayoutError::MissingNode { node: child })?;
                        if child_node.parent != Some(id) {
                            return Err(LayoutError::Invalid(format!(
                                "child {child} does not point back at split {id}"
                            )));
                        }
                        stack.push(child);
                    }
                }
            }
        }

        if seen.len() != self.nodes.len() {
            return Err(LayoutError::Invalid(format!(
                "{} of {} nodes unreachable from root",
                self.nodes.len() - seen.len(),
                self.nodes.len()
            )));
        }
        Ok(())
    }

    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, id: NodeId, depth: usize) -> fmt::Result {
        let indent = depth * 2;
        match self.nodes.get(&id).map(|n| &n.kind) {
            None => writeln!(f, "{:indent$}<missing {id}>", ""),
            Some(NodeKind::Leaf(leaf)) => writeln!(
                f,
                "{:indent$}leaf#{id} region={} {}",
                "",
                leaf.region_id,
                leaf.region.display_name()
            ),
            Some(NodeKind::Split(split)) => {
                writeln!(
                    f,
                    "{:indent$}split#{id} {:?}@{:.2}",
                    "",
                    split.divider.axis,
                    split.divider.position()
                )?;
                self.fmt_node(f, split.first, depth + 1)?;
                self.fmt_node(f, split.second, depth + 1)
            }
        }
    }
}

/// Indented dump of the tree, one node per line.
impl fmt::Display for LayoutTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(f, self.root, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::LabelRegion;

    fn label(name: &str) -> Box<dyn Region> {
        LabelRegion::new(name).boxed()
    }

    fn names(tree: &LayoutTree) -> Vec<String> {
        tree.regions()
            .into_iter()
            .map(|id| tree.region(id).expect("listed region exists").display_name())
            .collect()
    }

    /// A | (B / C): root split horizontally, right side split vertically.
    fn three_way() -> (LayoutTree, [RegionId; 3]) {
        let mut tree = LayoutTree::new(label("A"));
        let a = RegionId::MIN;
        let b = tree
            .split_region(a, Axis::Horizontal, label("B"))
            .expect("split root");
        let c = tree
            .split_region(b, Axis::Vertical, label("C"))
            .expect("split right");
        (tree, [a, b, c])
    }

    #[test]
    fn new_tree_is_single_leaf() {
        let tree = LayoutTree::new(label("A"));
        assert_eq!(tree.leaf_count(), 1);
        assert!(!tree.has_splits());
        assert!(tree.find_parent(RegionId::MIN).is_none());
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn zero_ids_are_rejected() {
        assert!(matches!(NodeId::new(0), Err(LayoutError::ZeroId)));
        assert_eq!(RegionId::new(5).expect("non-zero").get(), 5);
    }

    #[test]
    fn split_converts_leaf_in_place() {
        let mut tree = LayoutTree::new(label("A"));
        let root = tree.root();
        let b = tree
            .split(root, Axis::Horizontal, label("B"))
            .expect("split should succeed");

        assert_eq!(tree.root(), root);
        let Some(NodeKind::Split(split)) = tree.node(root).map(|n| &n.kind) else {
            unreachable!("root should be a split");
        };
        assert_eq!(split.divider.position(), 0.5);
        assert_eq!(split.divider.axis, Axis::Horizontal);
        assert_eq!(
            tree.node(split.first).and_then(LayoutNode::region_id),
            Some(RegionId::MIN)
        );
        assert_eq!(tree.node(split.second).and_then(LayoutNode::region_id), Some(b));
        assert_eq!(tree.find_parent(RegionId::MIN), Some((root, 0)));
        assert_eq!(tree.find_parent(b), Some((root, 1)));
        assert_eq!(names(&tree), ["A", "B"]);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn split_of_interior_node_is_rejected_without_mutation() {
        let (mut tree, _) = three_way();
        let before = tree.to_string();
        let err = tree
            .split(tree.root(), Axis::Vertical, label("X"))
            .expect_err("interior split must fail");
        assert!(matches!(err, LayoutError::NotALeaf { .. }));
        assert_eq!(tree.to_string(), before);
    }

    #[test]
    fn delete_collapses_parent_onto_sibling_subtree() {
        let (mut tree, [a, b, c]) = three_way();
        let root = tree.root();
        let removed = tree.delete(a).expect("delete should succeed");
        assert_eq!(removed.display_name(), "A");

        assert_eq!(tree.root(), root);
        assert_eq!(tree.leaf_count(), 2);
        assert_eq!(tree.divider(root).map(|d| d.axis), Some(Axis::Vertical));
        assert_eq!(tree.find_parent(b), Some((root, 0)));
        assert_eq!(tree.find_parent(c), Some((root, 1)));
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn delete_leaf_sibling_turns_parent_into_leaf() {
        let (mut tree, [a, b, c]) = three_way();
        tree.delete(c).expect("delete should succeed");
        assert_eq!(tree.leaf_count(), 2);
        assert_eq!(names(&tree), ["A", "B"]);
        assert_eq!(tree.find_parent(b), Some((tree.root(), 1)));
        assert!(tree.contains_region(a));
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn delete_root_is_rejected() {
        let mut tree = LayoutTree::new(label("A"));
        let err = tree
            .delete(RegionId::MIN)
            .expect_err("deleting root must fail");
        assert!(matches!(err, LayoutError::CannotDeleteRoot { .. }));
        assert_eq!(tree.leaf_count(), 1);
    }

    #[test]
    fn delete_unknown_region_is_rejected() {
        let (mut tree, _) = three_way();
        let missing = RegionId::new(99).expect("non-zero");
        assert!(matches!(
            tree.delete(missing),
            Err(LayoutError::MissingRegion { .. })
        ));
        assert_eq!(tree.leaf_count(), 3);
    }

    #[test]
    fn exchange_swaps_leaves() {
        let (mut tree, [a, _, c]) = three_way();
        let na = tree.find_node(a);
        let nc = tree.find_node(c);
        tree.exchange(a, c).expect("exchange should succeed");
        assert_eq!(tree.find_node(a), nc);
        assert_eq!(tree.find_node(c), na);
        assert_eq!(names(&tree), ["C", "B", "A"]);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn exchange_with_self_is_noop() {
        let (mut tree, [a, ..]) = three_way();
        let before = tree.to_string();
        tree.exchange(a, a).expect("self exchange is fine");
        assert_eq!(tree.to_string(), before);
    }

    #[test]
    fn copy_into_gives_destination_an_independent_copy() {
        let source_region = LabelRegion::new("A");
        let source_probe = source_region.probe();
        let mut tree = LayoutTree::new(source_region.boxed());
        let a = RegionId::MIN;
        let b = tree
            .split_region(a, Axis::Horizontal, label("B"))
            .expect("split");

        let replaced = tree.copy_into(a, b).expect("copy should succeed");
        assert_eq!(replaced.previous_id, b);
        assert_eq!(replaced.previous.display_name(), "B");
        let copy = replaced.region_id;
        assert_ne!(copy, a);
        assert!(!tree.contains_region(b));
        assert_eq!(
            tree.region(copy).map(|r| r.display_name()).as_deref(),
            Some("A Copy")
        );

        source_probe.borrow_mut().label = "A mutated".to_owned();
        assert_eq!(
            tree.region(copy).map(|r| r.display_name()).as_deref(),
            Some("A Copy")
        );
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn duplicate_preserves_structure_and_detaches_regions() {
        let region = LabelRegion::new("A");
        let probe = region.probe();
        let mut tree = LayoutTree::new(region.boxed());
        tree.split_region(RegionId::MIN, Axis::Vertical, label("B"))
            .expect("split");

        let copy = tree.duplicate();
        assert_eq!(copy.to_string(), tree.to_string());
        assert_eq!(copy.regions(), tree.regions());

        probe.borrow_mut().label = "changed".to_owned();
        assert_eq!(names(&copy), ["A", "B"]);
        assert_eq!(names(&tree), ["changed", "B"]);
    }

    #[test]
    fn visit_is_in_order_with_dividers_between_children() {
        let (tree, [a, b, c]) = three_way();
        let mut seen = Vec::new();
        tree.visit(|t| seen.push(t));
        let root = tree.root();
        let (right, _) = tree.find_parent(b).expect("b has parent");
        assert_eq!(
            seen,
            [
                Target::Region(a),
                Target::Divider(root),
                Target::Region(b),
                Target::Divider(right),
                Target::Region(c),
            ]
        );
    }

    #[test]
    fn placements_partition_extent() {
        let (tree, [a, b, c]) = three_way();
        let extent = Rect::from_size(200.0, 100.0);
        let placements = tree.placements(tree.root(), extent, 2.0);
        assert_eq!(placements.len(), 5);

        let find = |id| {
            placements
                .iter()
                .find(|p| p.target == Target::Region(id))
                .copied()
                .expect("placement exists")
        };
        assert_eq!(find(a).extent, Rect::new(0.0, 0.0, 99.0, 100.0));
        assert_eq!(find(a).parent_extent, extent);
        assert_eq!(find(b).extent, Rect::new(101.0, 0.0, 99.0, 49.0));
        assert_eq!(find(c).extent, Rect::new(101.0, 51.0, 99.0, 49.0));
        assert_eq!(find(c).parent_extent, Rect::new(101.0, 0.0, 99.0, 100.0));

        let divider = placements[1];
        assert_eq!(divider.target, Target::Divider(tree.root()));
        assert_eq!(divider.extent, Rect::new(99.0, 0.0, 2.0, 100.0));
        assert_eq!(divider.parent_extent, extent);
    }

    #[test]
    fn hit_test_resolves_regions_dividers_and_outside() {
        let (tree, [a, _, c]) = three_way();
        let extent = Rect::from_size(200.0, 100.0);
        let root = tree.root();
        assert_eq!(
            tree.hit_test(root, extent, Point::new(10.0, 10.0), 2.0),
            Some(Target::Region(a))
        );
        assert_eq!(
            tree.hit_test(root, extent, Point::new(100.0, 10.0), 2.0),
            Some(Target::Divider(root))
        );
        assert_eq!(
            tree.hit_test(root, extent, Point::new(150.0, 90.0), 2.0),
            Some(Target::Region(c))
        );
        assert_eq!(
            tree.hit_test(root, extent, Point::new(250.0, 10.0), 2.0),
            None
        );
    }

    #[test]
    fn hit_test_in_extent_narrower_than_divider() {
        let (tree, [a, ..]) = three_way();
        let root = tree.root();
        let extent = Rect::new(0.0137, 0.0, 0.0142, 10.0);
        assert_eq!(
            tree.hit_test(root, extent, Point::new(0.02, 5.0), 2.0),
            Some(Target::Divider(root))
        );
        let placements = tree.placements(root, extent, 2.0);
        assert!(placements.iter().all(|p| p.extent.width >= 0.0));
        assert!(placements.iter().any(|p| p.target == Target::Region(a)));
    }

    #[test]
    fn hit_test_from_subtree_uses_that_subtree_only() {
        let (tree, [_, b, c]) = three_way();
        let (right, _) = tree.find_parent(b).expect("b has parent");
        let extent = Rect::from_size(200.0, 100.0);
        assert_eq!(
            tree.hit_test(right, extent, Point::new(10.0, 10.0), 2.0),
            Some(Target::Region(b))
        );
        assert_eq!(
            tree.hit_test(right, extent, Point::new(10.0, 90.0), 2.0),
            Some(Target::Region(c))
        );
    }

    #[test]
    fn drag_divider_moves_and_clamps() {
        let (mut tree, _) = three_way();
        let root = tree.root();
        let extent = Rect::from_size(200.0, 100.0);
        let pos = tree
            .drag_divider(root, Point::new(20.0, 50.0), extent)
            .expect("root is a split");
        assert!((pos - 0.6).abs() < 1e-6);

        let pos = tree
            .drag_divider(root, Point::new(-1000.0, 0.0), extent)
            .expect("root is a split");
        assert_eq!(pos, Divider::MIN_POSITION);

        let pos = tree
            .drag_divider(root, Point::new(1000.0, 0.0), extent)
            .expect("root is a split");
        assert_eq!(pos, Divider::MAX_POSITION);
    }

    #[test]
    fn drag_divider_on_leaf_is_rejected() {
        let mut tree = LayoutTree::new(label("A"));
        let root = tree.root();
        assert!(matches!(
            tree.drag_divider(root, Point::new(1.0, 0.0), Rect::from_size(10.0, 10.0)),
            Err(LayoutError::NotASplit { .. })
        ));
    }

    #[test]
    fn divider_new_clamps_and_handles_nan() {
        assert_eq!(Divider::new(Axis::Vertical, 0.0).position(), 0.01);
        assert_eq!(Divider::new(Axis::Vertical, 2.0).position(), 0.99);
        assert_eq!(Divider::new(Axis::Vertical, f32::NAN).position(), 0.5);
    }

    #[test]
    fn activate_and_deactivate_reach_every_region() {
        let a = LabelRegion::new("A");
        let pa = a.probe();
        let b = LabelRegion::new("B");
        let pb = b.probe();
        let mut tree = LayoutTree::new(a.boxed());
        tree.split_region(RegionId::MIN, Axis::Horizontal, b.boxed())
            .expect("split");

        tree.activate_all(&Theme::default());
        assert!(pa.borrow().active && pb.borrow().active);
        tree.deactivate_all();
        assert!(!pa.borrow().active && !pb.borrow().active);
    }

    #[test]
    fn display_dumps_indented_tree() {
        let (tree, _) = three_way();
        let dump = tree.to_string();
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("split#1 Horizontal@0.50"));
        assert!(lines[1].starts_with("  leaf#"));
        assert!(lines[2].starts_with("  split#"));
        assert!(lines[4].starts_with("    leaf#"));
    }
}
