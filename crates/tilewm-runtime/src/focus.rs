#![forbid(unsafe_code)]

//! Per-frame input routing: keyboard focus, mouse ownership, hover, and the
//! maximized view root.

use tilewm_core::draw::CursorShape;
use tilewm_core::geometry::{Axis, Point, Rect};
use tilewm_core::mouse::MouseSnapshot;
use tilewm_layout::{LayoutTree, NodeId, RegionId, Target};
use tracing::{debug, trace};

/// Who receives keyboard and mouse input this frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusRouter {
    focus: Option<RegionId>,
    stack: Vec<RegionId>,
    hover: Option<Target>,
    mouse_owner: Option<Target>,
    maximized: Option<NodeId>,
}

impl FocusRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn focus(&self) -> Option<RegionId> {
        self.focus
    }

    #[must_use]
    pub const fn hover(&self) -> Option<Target> {
        self.hover
    }

    /// Target that owns the mouse for the gesture in progress.
    #[must_use]
    pub const fn mouse_owner(&self) -> Option<Target> {
        self.mouse_owner
    }

    #[must_use]
    pub const fn maximized(&self) -> Option<NodeId> {
        self.maximized
    }

    /// Depth of the focus hand-off stack.
    #[must_use]
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Give `region` keyboard focus. A transient take remembers the current
    /// focus so [`release_focus`](Self::release_focus) can restore it; a
    /// permanent take forgets every remembered focus.
    pub fn take_focus(&mut self, region: RegionId, transient: bool) {
        if self.focus == Some(region) {
            return;
        }
        if transient {
            if let Some(current) = self.focus {
                self.stack.push(current);
            }
        } else {
            self.stack.clear();
        }
        debug!(
            target: "tilewm.focus",
            region = %region,
            transient,
            depth = self.stack.len(),
            "focus taken"
        );
        self.focus = Some(region);
    }

    /// Hand focus back to whoever held it before the last transient take.
    pub fn release_focus(&mut self) {
        if let Some(previous) = self.stack.pop() {
            debug!(target: "tilewm.focus", region = %previous, "focus restored");
            self.focus = Some(previous);
        }
    }

    /// Drop references to regions and nodes that left the tree, then pick a
    /// default focus if none is held.
    ///
    /// A focused region that disappeared is replaced by the default focus in
    /// the same call, so the frame that notices the removal already routes
    /// keys to the new default rather than dropping them for a frame.
    pub fn revalidate(&mut self, tree: &LayoutTree) {
        if let Some(focus) = self.focus
            && !tree.contains_region(focus)
        {
            debug!(target: "tilewm.focus", region = %focus, "focused region removed");
            self.focus = None;
        }
        self.stack.retain(|r| tree.contains_region(*r));

        if let Some(node) = self.maximized
            && tree.node(node).is_none()
        {
            debug!(target: "tilewm.focus", node = %node, "maximized node removed");
            self.maximized = None;
        }
        if let Some(owner) = self.mouse_owner
            && !target_exists(tree, owner)
        {
            self.mouse_owner = None;
        }

        if self.focus.is_none() {
            self.focus = default_focus(tree);
            if let Some(region) = self.focus {
                debug!(target: "tilewm.focus", region = %region, "default focus assigned");
            }
        }
    }

    /// Node the view is drawn from: the maximized node if any, else the root.
    #[must_use]
    pub fn view_root(&self, tree: &LayoutTree) -> NodeId {
        self.maximized
            .filter(|n| tree.node(*n).is_some())
            .unwrap_or_else(|| tree.root())
    }

    /// Recompute what lies under the pointer.
    pub fn update_hover(&mut self, tree: &LayoutTree, extent: Rect, point: Point, width: f32) {
        self.hover = tree.hit_test(self.view_root(tree), extent, point, width);
        trace!(target: "tilewm.focus", hover = ?self.hover, "hover");
    }

    /// Maximize the node holding the hovered region, or restore if already
    /// maximized. Divider or empty hover does nothing.
    pub fn toggle_maximize(&mut self, tree: &LayoutTree) {
        if self.maximized.take().is_some() {
            debug!(target: "tilewm.focus", "restored from maximized");
            return;
        }
        if let Some(Target::Region(region)) = self.hover
            && let Some(node) = tree.find_node(region)
        {
            debug!(target: "tilewm.focus", region = %region, node = %node, "maximized");
            self.maximized = Some(node);
        }
    }

    /// Claim the mouse for the hovered target when a click or drag begins.
    /// A host UI that captures the mouse cancels any claim.
    pub fn begin_gesture(&mut self, mouse: &MouseSnapshot, ui_captures_mouse: bool) {
        if ui_captures_mouse {
            self.mouse_owner = None;
            return;
        }
        if self.mouse_owner.is_none() && (mouse.any_clicked() || mouse.any_dragging()) {
            self.mouse_owner = self.hover;
            if let Some(owner) = self.mouse_owner {
                trace!(target: "tilewm.focus", owner = ?owner, "mouse claimed");
            }
        }
    }

    /// Release the mouse once no button is held and no drag is active.
    pub fn end_gesture(&mut self, mouse: &MouseSnapshot) {
        if !mouse.any_held() && !mouse.any_dragging() {
            self.mouse_owner = None;
        }
    }

    /// Whether `target` at `extent` receives mouse input this frame.
    #[must_use]
    pub fn routes_mouse_to(
        &self,
        target: Target,
        extent: Rect,
        mouse: &MouseSnapshot,
        ui_captures_mouse: bool,
    ) -> bool {
        match self.mouse_owner {
            Some(owner) => owner == target,
            None => !ui_captures_mouse && extent.contains(mouse.position),
        }
    }

    /// Cursor for the divider under (or owning) the mouse.
    #[must_use]
    pub fn cursor(&self, tree: &LayoutTree) -> CursorShape {
        let Some(Target::Divider(node)) = self.mouse_owner.or(self.hover) else {
            return CursorShape::Default;
        };
        match tree.divider(node).map(|d| d.axis) {
            Some(Axis::Horizontal) => CursorShape::ResizeHorizontal,
            Some(Axis::Vertical) => CursorShape::ResizeVertical,
            None => CursorShape::Default,
        }
    }

    /// Forget everything; used when the active layout is swapped.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn target_exists(tree: &LayoutTree, target: Target) -> bool {
    match target {
        Target::Region(region) => tree.contains_region(region),
        Target::Divider(node) => tree.divider(node).is_some(),
    }
}

/// First region preferring default focus in traversal order, else the
/// first that can take focus at all.
#[must_use]
pub fn default_focus(tree: &LayoutTree) -> Option<RegionId> {
    let regions = tree.regions();
    let pick = |want: fn(&dyn tilewm_layout::Region) -> bool| {
        regions
            .iter()
            .copied()
            .find(|r| tree.region(*r).is_some_and(want))
    };
    pick(|r| r.prefers_default_focus()).or_else(|| pick(|r| r.can_take_keyboard_focus()))
}
