#![forbid(unsafe_code)]

//! Layout: the binary space-partitioning tree regions are tiled into.
//!
//! # Role in tilewm
//! `tilewm-layout` owns structure and geometry. It splits, deletes, swaps and
//! copies regions, derives every region's and divider's extent from the
//! current tree, answers "what is under this point", and reads and writes the
//! persisted layout format. It never decides *which* region gets input; that
//! is the runtime's focus router.

pub mod error;
pub mod persist;
pub mod region;
pub mod tree;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use error::LayoutError;
pub use persist::{DividerAxis, PersistedDivider, PersistedNode, RegionKind, RegionRegistry};
pub use region::{EmptyRegion, Region, RegionContext};
pub use tree::{
    Divider, LayoutNode, LayoutTree, Leaf, NodeId, NodeKind, Placement, RegionId, Replaced, Split,
    Target,
};
