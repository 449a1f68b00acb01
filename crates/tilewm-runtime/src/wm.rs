#![forbid(unsafe_code)]

//! The window manager: one context object owning the active layout and all
//! per-frame input state.
//!
//! Each call to [`WindowManager::frame`] folds the frame's events, decides
//! who gets keyboard and mouse input, applies pending pick edits and divider
//! drags, and emits a draw list for the host renderer.

use tilewm_core::draw::{CursorShape, DrawList};
use tilewm_core::event::{Event, KeyEvent, MouseButton};
use tilewm_core::geometry::Rect;
use tilewm_core::mouse::{MouseSnapshot, MouseTracker};
use tilewm_layout::{LayoutError, LayoutTree, RegionContext, RegionId, RegionRegistry, Target};
use tracing::{debug, info, trace_span, warn};

use crate::config::WmConfig;
use crate::console::{CommandConsole, CommandRegistry};
use crate::focus::FocusRouter;
use crate::modal_edit::{EditAction, ModalEditController, PickOutcome};
use crate::settings::SettingsPanel;

/// Mouse button that drags dividers.
pub const DIVIDER_DRAG_BUTTON: MouseButton = MouseButton::Secondary;

/// Everything the host provides for one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    pub events: &'a [Event],
    /// Area the layout tree is tiled into.
    pub extent: Rect,
    /// Area for the console status line, if shown.
    pub status_extent: Option<Rect>,
    /// The host UI (menus, dialogs) is consuming the mouse this frame.
    pub ui_captures_mouse: bool,
    /// The host UI is consuming the keyboard this frame.
    pub ui_captures_keyboard: bool,
}

impl<'a> FrameInput<'a> {
    #[must_use]
    pub const fn new(events: &'a [Event], extent: Rect) -> Self {
        Self {
            events,
            extent,
            status_extent: None,
            ui_captures_mouse: false,
            ui_captures_keyboard: false,
        }
    }

    #[must_use]
    pub const fn with_status_line(mut self, extent: Rect) -> Self {
        self.status_extent = Some(extent);
        self
    }

    #[must_use]
    pub const fn ui_captures_mouse(mut self, captures: bool) -> Self {
        self.ui_captures_mouse = captures;
        self
    }

    #[must_use]
    pub const fn ui_captures_keyboard(mut self, captures: bool) -> Self {
        self.ui_captures_keyboard = captures;
        self
    }
}

/// What the host should render and show after a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutput {
    pub draw: DrawList,
    pub cursor: CursorShape,
    /// Instruction for the pick in progress.
    pub prompt: Option<String>,
}

#[derive(Debug)]
pub struct WindowManager {
    config: WmConfig,
    tree: LayoutTree,
    registry: RegionRegistry,
    focus: FocusRouter,
    edit: ModalEditController,
    console: CommandConsole,
    settings: SettingsPanel,
    mouse: MouseTracker,
    selection: Option<String>,
}

impl WindowManager {
    /// Take ownership of `tree` and activate its regions.
    #[must_use]
    pub fn new(
        config: WmConfig,
        mut tree: LayoutTree,
        registry: RegionRegistry,
        commands: CommandRegistry,
    ) -> Self {
        tree.activate_all(&config.theme);
        let console = CommandConsole::new(commands, config.fkey_bindings());
        let mouse = MouseTracker::new(config.mouse_config());
        info!(
            target: "tilewm.wm",
            regions = tree.leaf_count(),
            bindings = console.bindings().len(),
            "window manager started"
        );
        Self {
            config,
            tree,
            registry,
            focus: FocusRouter::new(),
            edit: ModalEditController::new(),
            console,
            settings: SettingsPanel::new(),
            mouse,
            selection: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &WmConfig {
        &self.config
    }

    /// Apply a new configuration. Regions are re-activated so they pick up
    /// theme changes.
    pub fn set_config(&mut self, config: WmConfig) {
        self.mouse.set_config(config.mouse_config());
        self.console.set_bindings(config.fkey_bindings());
        self.tree.deactivate_all();
        self.tree.activate_all(&config.theme);
        self.config = config;
        debug!(target: "tilewm.wm", "configuration applied");
    }

    #[must_use]
    pub fn tree(&self) -> &LayoutTree {
        &self.tree
    }

    /// Mutable access for host-driven edits. Stale focus and panels are
    /// repaired on the next frame.
    pub fn tree_mut(&mut self) -> &mut LayoutTree {
        &mut self.tree
    }

    #[must_use]
    pub fn registry(&self) -> &RegionRegistry {
        &self.registry
    }

    #[must_use]
    pub fn focus(&self) -> &FocusRouter {
        &self.focus
    }

    #[must_use]
    pub fn edit(&self) -> &ModalEditController {
        &self.edit
    }

    #[must_use]
    pub fn console(&self) -> &CommandConsole {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut CommandConsole {
        &mut self.console
    }

    #[must_use]
    pub fn settings(&self) -> &SettingsPanel {
        &self.settings
    }

    pub fn toggle_settings(&mut self, region: RegionId) -> bool {
        self.settings.toggle(&self.tree, region)
    }

    #[must_use]
    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    /// Record an external selection (e.g. an aircraft clicked in a scope)
    /// and offer it to the active command.
    pub fn select(&mut self, callsign: Option<&str>) {
        self.selection = callsign.map(str::to_owned);
        if let Some(callsign) = callsign {
            self.console.on_selection(callsign);
        }
    }

    pub fn take_focus(&mut self, region: RegionId, transient: bool) {
        self.focus.take_focus(region, transient);
    }

    pub fn release_focus(&mut self) {
        self.focus.release_focus();
    }

    /// Start (or toggle off) a pick-mode edit.
    pub fn activate_action(&mut self, action: EditAction) -> bool {
        self.edit.activate(action, &self.tree)
    }

    pub fn cancel_pick(&mut self) {
        self.edit.cancel();
    }

    /// Actions to offer for the current layout.
    #[must_use]
    pub fn available_actions(&self) -> Vec<EditAction> {
        ModalEditController::available_actions(&self.tree, &self.registry)
    }

    pub fn begin_edit(&mut self) {
        self.edit.begin_edit(&self.tree);
    }

    pub fn save_edits(&mut self) {
        self.edit.save_edits();
    }

    /// Throw away the edits of the open session.
    pub fn revert_edits(&mut self) -> bool {
        let reverted = self.edit.revert_edits(&mut self.tree, &self.config.theme);
        if reverted {
            self.reset_transient_state();
        }
        reverted
    }

    /// Make `tree` the active layout and return the previous one, deactivated.
    pub fn swap_layout(&mut self, mut tree: LayoutTree) -> LayoutTree {
        self.tree.deactivate_all();
        tree.activate_all(&self.config.theme);
        let previous = std::mem::replace(&mut self.tree, tree);
        self.edit = ModalEditController::new();
        self.reset_transient_state();
        info!(target: "tilewm.wm", regions = self.tree.leaf_count(), "layout swapped");
        previous
    }

    /// Decode a persisted layout and make it active.
    pub fn load_layout_json(&mut self, json: &str) -> Result<LayoutTree, LayoutError> {
        let tree = LayoutTree::from_json(json, &self.registry)?;
        Ok(self.swap_layout(tree))
    }

    pub fn layout_json(&self) -> Result<String, LayoutError> {
        self.tree.to_json()
    }

    /// Forget focus, hover, mouse ownership, maximize, picks, the active
    /// command, and open settings panels.
    pub fn reset_transient_state(&mut self) {
        self.focus.reset();
        self.edit.cancel();
        self.console.cancel();
        self.settings.reset();
        self.mouse.reset();
        debug!(target: "tilewm.wm", "transient state reset");
    }

    /// Run one frame.
    pub fn frame(&mut self, input: &FrameInput<'_>) -> FrameOutput {
        let _span = trace_span!(target: "tilewm.wm", "wm.frame", events = input.events.len())
            .entered();

        let keys: Vec<KeyEvent> = input
            .events
            .iter()
            .filter_map(|e| match e {
                Event::Key(k) => Some(*k),
                _ => None,
            })
            .collect();
        let mouse = self.mouse.frame(input.events);
        let width = self.config.divider_width();
        let extent = input.extent;

        self.focus.revalidate(&self.tree);
        self.settings.prune(&self.tree);
        self.focus
            .update_hover(&self.tree, extent, mouse.position, width);

        if !input.ui_captures_keyboard && keys.iter().any(|k| self.config.maximize_key.matches(k)) {
            self.focus.toggle_maximize(&self.tree);
            self.focus
                .update_hover(&self.tree, extent, mouse.position, width);
        }

        let pick_taken = self.apply_pick(&mouse, input.ui_captures_mouse);
        if pick_taken {
            self.focus.revalidate(&self.tree);
            self.settings.prune(&self.tree);
            self.focus
                .update_hover(&self.tree, extent, mouse.position, width);
        } else {
            self.focus.begin_gesture(&mouse, input.ui_captures_mouse);
        }
        let cursor = self.focus.cursor(&self.tree);

        let mut out = DrawList::new();
        out.clear(self.config.theme.background);

        // Keys that start or finish a command this frame stay with the console.
        let console_had_focus = self.console.is_active();
        if !input.ui_captures_keyboard {
            self.console.handle_keys(&keys, self.selection.as_deref());
        }
        if let Some(status) = input.status_extent {
            self.console.draw(status, &self.config.theme, &mut out);
        }
        let console_focused = console_had_focus || self.console.is_active();

        self.draw_layout(input, &keys, &mouse, pick_taken, console_focused, &mut out);
        self.settings.draw(&mut self.tree, &mut out);

        self.focus.end_gesture(&mouse);

        FrameOutput {
            draw: out,
            cursor,
            prompt: self.edit.prompt(&self.registry),
        }
    }

    /// Route a primary click to the pick in progress. Returns whether the
    /// click was taken.
    fn apply_pick(&mut self, mouse: &MouseSnapshot, ui_captures_mouse: bool) -> bool {
        if !self.edit.is_picking() || ui_captures_mouse || !mouse.was_clicked(MouseButton::Primary)
        {
            return false;
        }
        let Some(target @ Target::Region(_)) = self.focus.hover() else {
            return false;
        };
        match self
            .edit
            .handle_pick(target, &mut self.tree, &self.registry, &self.config.theme)
        {
            Ok(PickOutcome::Completed { removed, .. }) => {
                for region in removed {
                    self.settings.close(region);
                }
            }
            Ok(PickOutcome::Advanced | PickOutcome::Ignored) => {}
            Err(e) => {
                warn!(target: "tilewm.wm", error = %e, "layout edit failed");
            }
        }
        true
    }

    fn draw_layout(
        &mut self,
        input: &FrameInput<'_>,
        keys: &[KeyEvent],
        mouse: &MouseSnapshot,
        pick_taken: bool,
        console_focused: bool,
        out: &mut DrawList,
    ) {
        let theme = &self.config.theme;
        let width = self.config.divider_width();
        let root = self.focus.view_root(&self.tree);
        let hover = self.focus.hover();
        let focus = self.focus.focus();
        let picking = self.edit.is_picking();

        for placement in self.tree.placements(root, input.extent, width) {
            let target = placement.target;
            let gets_mouse = !pick_taken
                && self.focus.routes_mouse_to(
                    target,
                    placement.extent,
                    mouse,
                    input.ui_captures_mouse,
                );
            match target {
                Target::Region(id) => {
                    let has_focus = focus == Some(id) && !console_focused;
                    let ctx = RegionContext {
                        extent: placement.extent,
                        parent_extent: placement.parent_extent,
                        theme,
                        keyboard: (has_focus && !input.ui_captures_keyboard).then_some(keys),
                        mouse: gets_mouse.then_some(mouse),
                        has_focus,
                    };
                    out.scissor(placement.extent);
                    if let Some(region) = self.tree.region_mut(id) {
                        region.draw(&ctx, out);
                    }
                    out.reset_state();

                    if picking && hover == Some(target) {
                        out.fill_rect(placement.extent, theme.pick_highlight);
                    }
                    if has_focus {
                        out.border(placement.extent.inset(1.0), theme.text_highlight, 1.0);
                    }
                }
                Target::Divider(node) => {
                    if gets_mouse
                        && self.focus.mouse_owner() == Some(target)
                        && mouse.is_dragging(DIVIDER_DRAG_BUTTON)
                        && let Err(e) =
                            self.tree
                                .drag_divider(node, mouse.drag_delta, placement.parent_extent)
                    {
                        warn!(target: "tilewm.wm", error = %e, "divider drag failed");
                    }
                    out.scissor(placement.extent);
                    out.clear(theme.ui_control);
                    out.reset_state();
                }
            }
        }
    }
}
