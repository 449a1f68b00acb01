#![forbid(unsafe_code)]

//! Colors used by the window manager's own chrome.

use serde::{Deserialize, Serialize};

/// Linear RGBA color, components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "opaque")]
    pub a: f32,
}

fn opaque() -> f32 {
    1.0
}

impl Rgba {
    #[must_use]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    #[must_use]
    pub const fn with_alpha(mut self, a: f32) -> Self {
        self.a = a;
        self
    }

    /// Whether every component lies in `[0, 1]`.
    #[must_use]
    pub fn is_normalized(&self) -> bool {
        [self.r, self.g, self.b, self.a]
            .iter()
            .all(|c| (0.0..=1.0).contains(c))
    }
}

/// Chrome colors: background clears, divider strips, focus borders, pick
/// highlights and console text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub background: Rgba,
    /// Divider strips and the focus border.
    pub ui_control: Rgba,
    pub text: Rgba,
    pub text_highlight: Rgba,
    pub text_error: Rgba,
    /// Overlay drawn over the region under the pointer while picking.
    pub pick_highlight: Rgba,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Rgba::rgb(0.0, 0.0, 0.0),
            ui_control: Rgba::rgb(0.4, 0.4, 0.4),
            text: Rgba::rgb(0.85, 0.85, 0.85),
            text_highlight: Rgba::rgb(1.0, 1.0, 1.0),
            text_error: Rgba::rgb(0.9, 0.1, 0.1),
            pick_highlight: Rgba::rgb(0.5, 0.5, 0.5).with_alpha(0.5),
        }
    }
}

impl Theme {
    /// Names of colors with components outside `[0, 1]`.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let named = [
            ("background", self.background),
            ("ui_control", self.ui_control),
            ("text", self.text),
            ("text_highlight", self.text_highlight),
            ("text_error", self.text_error),
            ("pick_highlight", self.pick_highlight),
        ];
        named
            .iter()
            .filter(|(_, c)| !c.is_normalized())
            .map(|(name, _)| format!("theme.{name} has components outside [0, 1]"))
            .collect()
    }
}
