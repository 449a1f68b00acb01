#![forbid(unsafe_code)]

//! Backend-neutral draw list.
//!
//! The window manager never talks to a GPU. It records [`DrawCommand`]s into
//! a [`DrawList`] and the host replays them with whatever renderer it owns.
//! Regions append to the same list from their `draw` callbacks.

use crate::geometry::{Point, Rect};
use crate::theme::Rgba;

/// Mouse cursor shape requested for the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CursorShape {
    #[default]
    Default,
    /// Left/right resize arrows (dragging a horizontal-axis divider).
    ResizeHorizontal,
    /// Up/down resize arrows (dragging a vertical-axis divider).
    ResizeVertical,
}

/// A single recorded draw operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Restrict subsequent drawing to `rect` and set the viewport to it.
    Scissor(Rect),
    /// Fill the current scissor rectangle.
    Clear(Rgba),
    /// Fill `rect` with a (possibly translucent) color.
    FillRect { rect: Rect, color: Rgba },
    /// Outline `rect` with lines `width` units thick.
    Border { rect: Rect, color: Rgba, width: f32 },
    /// Draw a text run at `origin`.
    Text {
        text: String,
        origin: Point,
        color: Rgba,
    },
    /// Restore default render state after a region finishes drawing.
    ResetState,
}

/// Ordered list of draw commands for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cmd: DrawCommand) {
        self.commands.push(cmd);
    }

    pub fn scissor(&mut self, rect: Rect) {
        self.push(DrawCommand::Scissor(rect));
    }

    pub fn clear(&mut self, color: Rgba) {
        self.push(DrawCommand::Clear(color));
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.push(DrawCommand::FillRect { rect, color });
    }

    pub fn border(&mut self, rect: Rect, color: Rgba, width: f32) {
        self.push(DrawCommand::Border { rect, color, width });
    }

    pub fn text(&mut self, text: impl Into<String>, origin: Point, color: Rgba) {
        self.push(DrawCommand::Text {
            text: text.into(),
            origin,
            color,
        });
    }

    pub fn reset_state(&mut self) {
        self.push(DrawCommand::ResetState);
    }

    /// Append all commands from `other`.
    pub fn extend(&mut self, other: DrawList) {
        self.commands.extend(other.commands);
    }

    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drop all commands, keeping the allocation.
    pub fn reset(&mut self) {
        self.commands.clear();
    }
}
