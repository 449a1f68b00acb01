#![forbid(unsafe_code)]

//! Persisted layout format and region registry.
//!
//! A layout is stored as nested JSON nodes:
//!
//! ```json
//! {
//!   "type": "",
//!   "divider": { "axis": "horizontal", "position": 0.5 },
//!   "children": [
//!     { "type": "radar", "divider": { "axis": "none", "position": 0 },
//!       "children": [null, null], "fields": { "range": 40 } },
//!     { "type": "console", "divider": { "axis": "none", "position": 0 },
//!       "children": [null, null] }
//!   ]
//! }
//! ```
//!
//! Decoding is forgiving about regions: an empty `type` on a leaf, an
//! unregistered `type`, fields a decoder rejects, or a split with a missing
//! child all degrade to the registry's placeholder region with a logged
//! diagnostic. Only malformed JSON fails the whole decode.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tilewm_core::geometry::Axis;
use tracing::{debug, error, warn};

use crate::error::LayoutError;
use crate::region::{EmptyRegion, Region};
use crate::tree::{Divider, LayoutNode, LayoutTree, Leaf, NodeId, NodeKind, Split};

/// Axis as written in the persisted form; `None` marks a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DividerAxis {
    #[default]
    None,
    Horizontal,
    Vertical,
}

impl DividerAxis {
    #[must_use]
    pub const fn axis(self) -> Option<Axis> {
        match self {
            Self::None => None,
            Self::Horizontal => Some(Axis::Horizontal),
            Self::Vertical => Some(Axis::Vertical),
        }
    }
}

impl From<Axis> for DividerAxis {
    fn from(axis: Axis) -> Self {
        match axis {
            Axis::Horizontal => Self::Horizontal,
            Axis::Vertical => Self::Vertical,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PersistedDivider {
    #[serde(default)]
    pub axis: DividerAxis,
    #[serde(default)]
    pub position: f32,
}

/// One node of a persisted layout.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PersistedNode {
    /// Registry tag of the region; empty for split nodes.
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub divider: PersistedDivider,
    #[serde(default)]
    pub children: [Option<Box<PersistedNode>>; 2],
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub fields: Value,
}

/// Builds a region from its persisted fields.
pub type DecodeFn = fn(&Value) -> Result<Box<dyn Region>, String>;

/// Builds a fresh default region.
pub type CreateFn = fn() -> Box<dyn Region>;

/// A registered region kind.
#[derive(Debug, Clone)]
pub struct RegionKind {
    pub tag: String,
    /// Name shown in "create new" menus.
    pub label: String,
    create: CreateFn,
    decode: DecodeFn,
}

impl RegionKind {
    #[must_use]
    pub fn create(&self) -> Box<dyn Region> {
        (self.create)()
    }
}

fn empty_region() -> Box<dyn Region> {
    Box::new(EmptyRegion)
}

fn decode_empty(_fields: &Value) -> Result<Box<dyn Region>, String> {
    Ok(Box::new(EmptyRegion))
}

/// Maps persisted type tags to region constructors.
///
/// The registry always knows the placeholder kind ([`EmptyRegion`] unless
/// replaced with [`set_placeholder`](Self::set_placeholder)).
#[derive(Debug, Clone)]
pub struct RegionRegistry {
    kinds: FxHashMap<String, RegionKind>,
    order: Vec<String>,
    placeholder: String,
}

impl Default for RegionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionRegistry {
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self {
            kinds: FxHashMap::default(),
            order: Vec::new(),
            placeholder: EmptyRegion::TAG.to_owned(),
        };
        registry.register(EmptyRegion::TAG, "Empty", empty_region, decode_empty);
        registry
    }

    /// Register (or re-register) a region kind.
    pub fn register(&mut self, tag: &str, label: &str, create: CreateFn, decode: DecodeFn) {
        let kind = RegionKind {
            tag: tag.to_owned(),
            label: label.to_owned(),
            create,
            decode,
        };
        if self.kinds.insert(tag.to_owned(), kind).is_none() {
            self.order.push(tag.to_owned());
        }
    }

    /// Make an already registered kind the placeholder. Returns `false` if
    /// `tag` is unknown.
    pub fn set_placeholder(&mut self, tag: &str) -> bool {
        if !self.kinds.contains_key(tag) {
            return false;
        }
        tag.clone_into(&mut self.placeholder);
        true
    }

    #[must_use]
    pub fn placeholder_tag(&self) -> &str {
        &self.placeholder
    }

    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.kinds.contains_key(tag)
    }

    /// Registered kinds in registration order.
    pub fn kinds(&self) -> impl Iterator<Item = &RegionKind> {
        self.order.iter().filter_map(|tag| self.kinds.get(tag))
    }

    /// A fresh default region of kind `tag`.
    #[must_use]
    pub fn create(&self, tag: &str) -> Option<Box<dyn Region>> {
        self.kinds.get(tag).map(RegionKind::create)
    }

    /// A fresh placeholder region.
    #[must_use]
    pub fn placeholder(&self) -> Box<dyn Region> {
        self.create(&self.placeholder).unwrap_or_else(empty_region)
    }

    /// Decode one region, degrading to the placeholder on any problem.
    #[must_use]
    pub fn decode(&self, tag: &str, fields: &Value) -> Box<dyn Region> {
        if tag.is_empty() {
            warn!(target: "tilewm.layout", "persisted leaf has no type; using placeholder");
            return self.placeholder();
        }
        let Some(kind) = self.kinds.get(tag) else {
            error!(target: "tilewm.layout", tag, "unhandled region type in persisted layout");
            return self.placeholder();
        };
        match (kind.decode)(fields) {
            Ok(region) => region,
            Err(reason) => {
                error!(
                    target: "tilewm.layout",
                    tag,
                    reason = %reason,
                    "region rejected its persisted fields"
                );
                self.placeholder()
            }
        }
    }
}

impl LayoutTree {
    /// Encode the whole tree.
    #[must_use]
    pub fn to_persisted(&self) -> PersistedNode {
        self.persist_node(self.root())
    }

    fn persist_node(&self, id: NodeId) -> PersistedNode {
        match self.node(id).map(|n| &n.kind) {
            Some(NodeKind::Leaf(leaf)) => PersistedNode {
                kind: leaf.region.type_tag().to_owned(),
                divider: PersistedDivider::default(),
                children: [None, None],
                fields: leaf.region.persisted_fields(),
            },
            Some(NodeKind::Split(split)) => PersistedNode {
                kind: String::new(),
                divider: PersistedDivider {
                    axis: split.divider.axis.into(),
                    position: split.divider.position(),
                },
                children: [
                    Some(Box::new(self.persist_node(split.first))),
                    Some(Box::new(self.persist_node(split.second))),
                ],
                fields: Value::Null,
            },
            None => PersistedNode::default(),
        }
    }

    /// Rebuild a tree from its persisted form with fresh ids.
    pub fn from_persisted(
        root: &PersistedNode,
        registry: &RegionRegistry,
    ) -> Result<Self, LayoutError> {
        let mut tree = Self::empty();
        let root_id = tree.build(root, None, registry)?;
        tree.set_root(root_id);
        tree.validate()?;
        debug!(
            target: "tilewm.layout",
            leaves = tree.leaf_count(),
            "decoded persisted layout"
        );
        Ok(tree)
    }

    pub fn to_json(&self) -> Result<String, LayoutError> {
        Ok(serde_json::to_string_pretty(&self.to_persisted())?)
    }

    pub fn from_json(json: &str, registry: &RegionRegistry) -> Result<Self, LayoutError> {
        let root: PersistedNode = serde_json::from_str(json)?;
        Self::from_persisted(&root, registry)
    }

    fn build(
        &mut self,
        node: &PersistedNode,
        parent: Option<NodeId>,
        registry: &RegionRegistry,
    ) -> Result<NodeId, LayoutError> {
        let Some(axis) = node.divider.axis.axis() else {
            if node.children.iter().any(Option::is_some) {
                debug!(target: "tilewm.layout", "ignoring children of persisted leaf");
            }
            let region = registry.decode(&node.kind, &node.fields);
            return self.build_leaf(region, parent);
        };

        match &node.children {
            [Some(first), Some(second)] => {
                let id = self.alloc_node()?;
                let first = self.build(first, Some(id), registry)?;
                let second = self.build(second, Some(id), registry)?;
                self.insert_node(LayoutNode {
                    id,
                    parent,
                    kind: NodeKind::Split(Split {
                        divider: Divider::new(axis, node.divider.position),
                        first,
                        second,
                    }),
                });
                Ok(id)
            }
            [Some(only), None] | [None, Some(only)] => {
                warn!(
                    target: "tilewm.layout",
                    "persisted split has one child; collapsing onto it"
                );
                self.build(only, parent, registry)
            }
            [None, None] => {
                warn!(
                    target: "tilewm.layout",
                    "persisted split has no children; using placeholder"
                );
                let region = registry.placeholder();
                self.build_leaf(region, parent)
            }
        }
    }

    fn build_leaf(
        &mut self,
        region: Box<dyn Region>,
        parent: Option<NodeId>,
    ) -> Result<NodeId, LayoutError> {
        let id = self.alloc_node()?;
        let region_id = self.alloc_region()?;
        self.insert_node(LayoutNode {
            id,
            parent,
            kind: NodeKind::Leaf(Leaf { region_id, region }),
        });
        Ok(id)
    }
}
