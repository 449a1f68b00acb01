#![forbid(unsafe_code)]

use std::fmt;

use crate::tree::{NodeId, RegionId};

/// Structured reasons a layout operation was rejected.
///
/// Every operation that returns one of these leaves the tree untouched.
#[derive(Debug)]
pub enum LayoutError {
    /// `0` was used as a node or region identifier.
    ZeroId,
    /// The identifier allocator ran out of values.
    IdOverflow,
    MissingRegion {
        region: RegionId,
    },
    MissingNode {
        node: NodeId,
    },
    NotALeaf {
        node: NodeId,
    },
    NotASplit {
        node: NodeId,
    },
    CannotDeleteRoot {
        region: RegionId,
    },
    /// Structural invariant violated (reported by `validate`).
    Invalid(String),
    /// The persisted layout was not well-formed JSON.
    Decode(serde_json::Error),
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroId => write!(f, "identifier 0 is reserved"),
            Self::IdOverflow => write!(f, "identifier space exhausted"),
            Self::MissingRegion { region } => write!(f, "region {} not found", region.get()),
            Self::MissingNode { node } => write!(f, "node {} not found", node.get()),
            Self::NotALeaf { node } => write!(f, "node {} is not a leaf", node.get()),
            Self::NotASplit { node } => write!(f, "node {} is not a split", node.get()),
            Self::CannotDeleteRoot { region } => {
                write!(f, "cannot delete region {} at the root", region.get())
            }
            Self::Invalid(msg) => write!(f, "invalid layout tree: {msg}"),
            Self::Decode(e) => write!(f, "layout decode error: {e}"),
        }
    }
}

impl std::error::Error for LayoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for LayoutError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e)
    }
}
