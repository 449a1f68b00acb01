#![forbid(unsafe_code)]

//! Modal pick editing: choose an action, then click the regions it applies to.
//!
//! The controller is a plain state value the frame loop advances with
//! [`ModalEditController::handle_pick`]; nothing is captured in callbacks.
//! It also holds the snapshot for an edit session, so a run of edits can be
//! kept or thrown away as a unit.

use std::fmt;

use tilewm_core::geometry::Axis;
use tilewm_core::theme::Theme;
use tilewm_layout::{LayoutError, LayoutTree, RegionId, RegionRegistry, Target};
use tracing::{debug, info};

/// A structural edit the user can pick targets for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditAction {
    SplitHorizontal,
    SplitVertical,
    Copy,
    Exchange,
    Delete,
    /// Replace the picked region with a fresh region of this registered kind.
    Place(String),
}

impl EditAction {
    /// Whether the action takes a source and then a destination.
    #[must_use]
    pub const fn is_two_step(&self) -> bool {
        matches!(self, Self::Copy | Self::Exchange)
    }

    /// Whether the action needs more than one region to be meaningful.
    #[must_use]
    pub const fn needs_split(&self) -> bool {
        matches!(self, Self::Copy | Self::Exchange | Self::Delete)
    }

    /// Whether the action can be offered for `tree`.
    #[must_use]
    pub fn is_visible(&self, tree: &LayoutTree) -> bool {
        !self.needs_split() || tree.has_splits()
    }
}

impl fmt::Display for EditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SplitHorizontal => f.write_str("Split Horizontally"),
            Self::SplitVertical => f.write_str("Split Vertically"),
            Self::Copy => f.write_str("Copy"),
            Self::Exchange => f.write_str("Exchange"),
            Self::Delete => f.write_str("Delete"),
            Self::Place(tag) => write!(f, "Create {tag}"),
        }
    }
}

/// Where the pick protocol stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PickState {
    #[default]
    Idle,
    /// Single-step action waiting for its target.
    AwaitingPick(EditAction),
    /// Two-step action waiting for its source.
    AwaitingFirstPick(EditAction),
    /// Two-step action holding its source, waiting for the destination.
    AwaitingSecondPick { action: EditAction, first: RegionId },
}

impl PickState {
    #[must_use]
    pub const fn action(&self) -> Option<&EditAction> {
        match self {
            Self::Idle => None,
            Self::AwaitingPick(action)
            | Self::AwaitingFirstPick(action)
            | Self::AwaitingSecondPick { action, .. } => Some(action),
        }
    }
}

/// What a pick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    /// No pick in progress, or the pick landed on a divider.
    Ignored,
    /// First of two picks recorded.
    Advanced,
    /// The action ran; ids of regions that left the tree and joined it.
    Completed {
        action: EditAction,
        removed: Vec<RegionId>,
        added: Vec<RegionId>,
    },
}

/// Pick-mode state plus the edit-session snapshot.
#[derive(Debug, Default)]
pub struct ModalEditController {
    state: PickState,
    backup: Option<LayoutTree>,
}

impl ModalEditController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &PickState {
        &self.state
    }

    #[must_use]
    pub fn is_picking(&self) -> bool {
        self.state != PickState::Idle
    }

    #[must_use]
    pub fn active_action(&self) -> Option<&EditAction> {
        self.state.action()
    }

    /// Actions to offer for `tree`, in toolbar order.
    #[must_use]
    pub fn available_actions(tree: &LayoutTree, registry: &RegionRegistry) -> Vec<EditAction> {
        let mut actions = vec![
            EditAction::SplitHorizontal,
            EditAction::SplitVertical,
            EditAction::Copy,
            EditAction::Exchange,
            EditAction::Delete,
        ];
        actions.extend(registry.kinds().map(|k| EditAction::Place(k.tag.clone())));
        actions.retain(|a| a.is_visible(tree));
        actions
    }

    /// Instruction for the current state, if a pick is in progress.
    #[must_use]
    pub fn prompt(&self, registry: &RegionRegistry) -> Option<String> {
        let text = match &self.state {
            PickState::Idle => return None,
            PickState::AwaitingPick(EditAction::Place(tag)) => {
                let label = registry
                    .kinds()
                    .find(|k| k.tag == *tag)
                    .map_or(tag.as_str(), |k| k.label.as_str());
                return Some(format!("Select location for new {label} window"));
            }
            PickState::AwaitingPick(EditAction::SplitHorizontal | EditAction::SplitVertical) => {
                "Select window to split"
            }
            PickState::AwaitingPick(EditAction::Delete) => "Select window to delete",
            PickState::AwaitingFirstPick(EditAction::Copy) => "Select window to copy",
            PickState::AwaitingSecondPick {
                action: EditAction::Copy,
                ..
            } => "Select destination for copy",
            PickState::AwaitingFirstPick(EditAction::Exchange) => {
                "Select first window to exchange"
            }
            PickState::AwaitingSecondPick {
                action: EditAction::Exchange,
                ..
            } => "Select second window to exchange",
            PickState::AwaitingPick(_)
            | PickState::AwaitingFirstPick(_)
            | PickState::AwaitingSecondPick { .. } => "Select window",
        };
        Some(text.to_owned())
    }

    /// Start `action`. Selecting the action already in progress toggles it
    /// off; selecting a different one replaces it. Actions not visible for
    /// `tree` are refused.
    pub fn activate(&mut self, action: EditAction, tree: &LayoutTree) -> bool {
        if self.active_action() == Some(&action) {
            self.cancel();
            return false;
        }
        if !action.is_visible(tree) {
            debug!(target: "tilewm.edit", action = %action, "action not available for this layout");
            return false;
        }
        self.cancel();
        debug!(target: "tilewm.edit", action = %action, "pick started");
        self.state = if action.is_two_step() {
            PickState::AwaitingFirstPick(action)
        } else {
            PickState::AwaitingPick(action)
        };
        true
    }

    /// Abandon any pick in progress without touching the tree.
    pub fn cancel(&mut self) {
        if let Some(action) = self.state.action() {
            debug!(target: "tilewm.edit", action = %action, "pick cancelled");
        }
        self.state = PickState::Idle;
    }

    /// Feed a click on `target`. Divider clicks leave the state unchanged.
    ///
    /// On completion the controller returns to idle whether or not the tree
    /// operation succeeded; a failed operation leaves the tree untouched.
    pub fn handle_pick(
        &mut self,
        target: Target,
        tree: &mut LayoutTree,
        registry: &RegionRegistry,
        theme: &Theme,
    ) -> Result<PickOutcome, LayoutError> {
        let Target::Region(picked) = target else {
            return Ok(PickOutcome::Ignored);
        };
        match std::mem::take(&mut self.state) {
            PickState::Idle => Ok(PickOutcome::Ignored),
            PickState::AwaitingFirstPick(action) => {
                debug!(target: "tilewm.edit", action = %action, region = %picked, "source picked");
                self.state = PickState::AwaitingSecondPick {
                    action,
                    first: picked,
                };
                Ok(PickOutcome::Advanced)
            }
            PickState::AwaitingSecondPick { action, first } => {
                complete(action, first, picked, tree, registry, theme)
            }
            PickState::AwaitingPick(action) => {
                complete(action, picked, picked, tree, registry, theme)
            }
        }
    }

    /// Whether an edit session is open.
    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.backup.is_some()
    }

    /// Open an edit session by snapshotting `tree`. An open session keeps
    /// its original snapshot.
    pub fn begin_edit(&mut self, tree: &LayoutTree) {
        if self.backup.is_none() {
            debug!(target: "tilewm.edit", regions = tree.leaf_count(), "edit session started");
            self.backup = Some(tree.duplicate());
        }
    }

    /// Keep the edits made since [`begin_edit`](Self::begin_edit).
    pub fn save_edits(&mut self) {
        self.cancel();
        if self.backup.take().is_some() {
            info!(target: "tilewm.edit", "layout edits saved");
        }
    }

    /// Restore the snapshot into `tree`. Returns whether anything was
    /// restored.
    pub fn revert_edits(&mut self, tree: &mut LayoutTree, theme: &Theme) -> bool {
        self.cancel();
        let Some(mut backup) = self.backup.take() else {
            return false;
        };
        tree.deactivate_all();
        backup.activate_all(theme);
        *tree = backup;
        info!(target: "tilewm.edit", "layout edits reverted");
        true
    }
}

fn complete(
    action: EditAction,
    first: RegionId,
    second: RegionId,
    tree: &mut LayoutTree,
    registry: &RegionRegistry,
    theme: &Theme,
) -> Result<PickOutcome, LayoutError> {
    let (removed, added) = match &action {
        EditAction::SplitHorizontal | EditAction::SplitVertical => {
            let axis = if action == EditAction::SplitHorizontal {
                Axis::Horizontal
            } else {
                Axis::Vertical
            };
            let new_id = tree.split_region(first, axis, registry.placeholder())?;
            activate(tree, new_id, theme);
            (Vec::new(), vec![new_id])
        }
        EditAction::Delete => {
            let mut region = tree.delete(first)?;
            region.deactivate();
            (vec![first], Vec::new())
        }
        EditAction::Exchange => {
            tree.exchange(first, second)?;
            (Vec::new(), Vec::new())
        }
        EditAction::Copy => {
            let mut replaced = tree.copy_into(first, second)?;
            replaced.previous.deactivate();
            activate(tree, replaced.region_id, theme);
            (vec![replaced.previous_id], vec![replaced.region_id])
        }
        EditAction::Place(tag) => {
            let Some(region) = registry.create(tag) else {
                return Err(LayoutError::Invalid(format!("unknown region kind \"{tag}\"")));
            };
            let mut replaced = tree.replace_region(first, region)?;
            replaced.previous.deactivate();
            activate(tree, replaced.region_id, theme);
            (vec![replaced.previous_id], vec![replaced.region_id])
        }
    };
    info!(
        target: "tilewm.edit",
        action = %action,
        first = %first,
        second = %second,
        "edit applied"
    );
    Ok(PickOutcome::Completed {
        action,
        removed,
        added,
    })
}

fn activate(tree: &mut LayoutTree, region: RegionId, theme: &Theme) {
    if let Some(region) = tree.region_mut(region) {
        region.activate(theme);
    }
}
