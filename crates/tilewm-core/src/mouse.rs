#![forbid(unsafe_code)]

//! Per-frame mouse state.
//!
//! [`MouseTracker`] folds the raw [`MouseEvent`]s delivered during one frame
//! into a [`MouseSnapshot`]: which buttons are held, which were clicked or
//! released this frame, and which are dragging.
//!
//! # Invariants
//!
//! 1. A button is dragging only while it is held and the pointer has moved at
//!    least `drag_threshold` (manhattan distance) from where it went down.
//! 2. `drag_delta` is zero unless some button is dragging.
//! 3. Losing application focus releases every button without emitting a
//!    release, so no region observes a dangling drag.

use crate::event::{Event, MouseButton, MouseEvent, MouseEventKind};
use crate::geometry::Point;

/// Thresholds for mouse tracking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseConfig {
    /// Minimum manhattan distance (display units) before a drag starts
    /// (default: 3).
    pub drag_threshold: f32,
}

impl Default for MouseConfig {
    fn default() -> Self {
        Self {
            drag_threshold: 3.0,
        }
    }
}

/// Mouse state for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MouseSnapshot {
    /// Pointer position at the end of the frame.
    pub position: Point,
    pub held: [bool; 3],
    pub clicked: [bool; 3],
    pub released: [bool; 3],
    pub dragging: [bool; 3],
    /// Pointer movement this frame while a drag is active.
    pub drag_delta: Point,
    /// Accumulated wheel movement this frame.
    pub wheel: Point,
}

impl MouseSnapshot {
    /// A snapshot with the pointer at `position` and no buttons involved.
    #[must_use]
    pub fn at(position: Point) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn is_held(&self, button: MouseButton) -> bool {
        self.held[button.index()]
    }

    #[must_use]
    pub const fn was_clicked(&self, button: MouseButton) -> bool {
        self.clicked[button.index()]
    }

    #[must_use]
    pub const fn was_released(&self, button: MouseButton) -> bool {
        self.released[button.index()]
    }

    #[must_use]
    pub const fn is_dragging(&self, button: MouseButton) -> bool {
        self.dragging[button.index()]
    }

    #[must_use]
    pub fn any_held(&self) -> bool {
        self.held.iter().any(|b| *b)
    }

    #[must_use]
    pub fn any_clicked(&self) -> bool {
        self.clicked.iter().any(|b| *b)
    }

    #[must_use]
    pub fn any_dragging(&self) -> bool {
        self.dragging.iter().any(|b| *b)
    }
}

/// Tracks an ongoing or potential drag for one button.
#[derive(Debug, Clone, Copy)]
struct DragTracker {
    start_pos: Point,
    last_pos: Point,
    started: bool,
}

/// Stateful mouse tracker; feed it each frame's events.
#[derive(Debug, Clone, Default)]
pub struct MouseTracker {
    config: MouseConfig,
    position: Point,
    buttons: [Option<DragTracker>; 3],
}

impl MouseTracker {
    #[must_use]
    pub fn new(config: MouseConfig) -> Self {
        Self {
            config,
            position: Point::default(),
            buttons: [None; 3],
        }
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &MouseConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: MouseConfig) {
        self.config = config;
    }

    /// Whether any button is currently dragging.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.buttons.iter().flatten().any(|d| d.started)
    }

    /// Fold one frame's events into a snapshot. Non-mouse events other than
    /// focus loss are ignored.
    pub fn frame(&mut self, events: &[Event]) -> MouseSnapshot {
        let mut snap = MouseSnapshot::default();
        for event in events {
            match event {
                Event::Mouse(mouse) => self.on_mouse(mouse, &mut snap),
                Event::Focus(false) => self.reset(),
                _ => {}
            }
        }

        snap.position = self.position;
        for button in MouseButton::ALL {
            let i = button.index();
            snap.held[i] = self.buttons[i].is_some();
            snap.dragging[i] = self.buttons[i].is_some_and(|d| d.started);
        }
        if !snap.any_dragging() {
            snap.drag_delta = Point::default();
        }
        snap
    }

    /// Forget all button state.
    pub fn reset(&mut self) {
        self.buttons = [None; 3];
    }

    fn on_mouse(&mut self, mouse: &MouseEvent, snap: &mut MouseSnapshot) {
        let pos = mouse.position;
        match mouse.kind {
            MouseEventKind::Down(button) => {
                snap.clicked[button.index()] = true;
                self.buttons[button.index()] = Some(DragTracker {
                    start_pos: pos,
                    last_pos: pos,
                    started: false,
                });
            }
            MouseEventKind::Up(button) => {
                snap.released[button.index()] = true;
                self.track_motion(pos, snap);
                self.buttons[button.index()] = None;
            }
            MouseEventKind::Moved => self.track_motion(pos, snap),
            MouseEventKind::Scroll { dx, dy } => {
                snap.wheel = snap.wheel + Point::new(dx, dy);
            }
        }
        self.position = pos;
    }

    fn track_motion(&mut self, pos: Point, snap: &mut MouseSnapshot) {
        let threshold = self.config.drag_threshold;
        let mut moved = Point::default();
        for drag in self.buttons.iter_mut().flatten() {
            if !drag.started && drag.start_pos.manhattan_distance(pos) >= threshold {
                drag.started = true;
                drag.last_pos = drag.start_pos;
            }
            if drag.started {
                moved = pos - drag.last_pos;
                drag.last_pos = pos;
            }
        }
        snap.drag_delta = snap.drag_delta + moved;
    }
}
