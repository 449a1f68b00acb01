#![forbid(unsafe_code)]

//! Window manager configuration loaded from TOML or JSON.
//!
//! ```toml
//! divider_width_px = 2.0
//! display_scale = 1.5
//!
//! [maximize_key]
//! key = "f"
//! ctrl = true
//!
//! [fkeys]
//! F1 = "contact"
//! F2 = "direct"
//!
//! [shift_fkeys]
//! F1 = "handoff"
//!
//! [theme.pick_highlight]
//! r = 0.9
//! g = 0.8
//! b = 0.1
//! a = 0.25
//! ```
//!
//! ```rust,ignore
//! let config = WmConfig::from_toml_file("tilewm.toml")?;
//! ```
//!
//! Every field defaults, so an empty document is a valid configuration.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tilewm_core::event::KeyEvent;
use tilewm_core::geometry;
use tilewm_core::mouse::MouseConfig;
use tilewm_core::theme::Theme;
use tracing::warn;

use crate::console::FKeyBindings;

/// A single-character hotkey with modifier requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hotkey {
    pub key: char,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl Default for Hotkey {
    fn default() -> Self {
        Self::ctrl('f')
    }
}

impl Hotkey {
    #[must_use]
    pub const fn ctrl(key: char) -> Self {
        Self {
            key,
            ctrl: true,
            alt: false,
            shift: false,
        }
    }

    /// Whether a key press triggers this hotkey. Letter case is ignored;
    /// Shift is only checked when the hotkey asks for it.
    #[must_use]
    pub fn matches(&self, event: &KeyEvent) -> bool {
        event.is_press()
            && event.is_char(self.key)
            && event.ctrl() == self.ctrl
            && event.alt() == self.alt
            && (!self.shift || event.shift())
    }
}

/// Top-level configuration for a [`WindowManager`](crate::WindowManager).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WmConfig {
    /// Divider thickness before display scaling, in pixels.
    pub divider_width_px: f32,
    /// Display scale factor applied to the divider width.
    pub display_scale: f32,
    /// Manhattan distance the pointer must travel before a press becomes a drag.
    pub drag_threshold_px: f32,
    /// Maximize/restore toggle for the hovered region.
    pub maximize_key: Hotkey,
    /// Unshifted function key bindings, keyed `"F1"`..`"F12"`.
    pub fkeys: BTreeMap<String, String>,
    /// Shift-modified function key bindings, keyed `"F1"`..`"F12"`.
    pub shift_fkeys: BTreeMap<String, String>,
    pub theme: Theme,
}

impl Default for WmConfig {
    fn default() -> Self {
        Self {
            divider_width_px: 2.0,
            display_scale: 1.0,
            drag_threshold_px: 3.0,
            maximize_key: Hotkey::default(),
            fkeys: BTreeMap::new(),
            shift_fkeys: BTreeMap::new(),
            theme: Theme::default(),
        }
    }
}

/// Parse `"F1"`..`"F12"` (either case) into the key number.
#[must_use]
pub fn parse_fkey_name(name: &str) -> Option<u8> {
    let digits = name.strip_prefix('F').or_else(|| name.strip_prefix('f'))?;
    let n: u8 = digits.parse().ok()?;
    (1..=12).contains(&n).then_some(n)
}

impl WmConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Parse and validate in one step, returning every problem at once.
    pub fn from_toml_str_validated(s: &str) -> Result<Self, ConfigError> {
        let config = Self::from_toml_str(s)?;
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !(self.divider_width_px.is_finite() && self.divider_width_px >= 0.0) {
            errors.push(format!(
                "divider_width_px must be finite and >= 0, got {}",
                self.divider_width_px
            ));
        }
        if !(self.display_scale.is_finite() && self.display_scale > 0.0) {
            errors.push(format!(
                "display_scale must be finite and > 0, got {}",
                self.display_scale
            ));
        }
        if !(self.drag_threshold_px.is_finite() && self.drag_threshold_px >= 0.0) {
            errors.push(format!(
                "drag_threshold_px must be finite and >= 0, got {}",
                self.drag_threshold_px
            ));
        }
        if self.maximize_key.key.is_control() {
            errors.push("maximize_key.key must be a printable character".to_owned());
        }

        for (table, map) in [("fkeys", &self.fkeys), ("shift_fkeys", &self.shift_fkeys)] {
            for (key, command) in map {
                if parse_fkey_name(key).is_none() {
                    errors.push(format!("{table}.{key} is not a function key F1..F12"));
                }
                if command.trim().is_empty() {
                    errors.push(format!("{table}.{key} names an empty command"));
                }
            }
        }

        errors.extend(self.theme.validate());
        errors
    }

    /// Divider thickness after display scaling, rounded to whole pixels.
    #[must_use]
    pub fn divider_width(&self) -> f32 {
        geometry::divider_width(self.divider_width_px, self.display_scale)
    }

    #[must_use]
    pub fn mouse_config(&self) -> MouseConfig {
        MouseConfig {
            drag_threshold: self.drag_threshold_px,
        }
    }

    /// Build the function key table. Entries that do not name F1..F12 are
    /// skipped with a warning.
    #[must_use]
    pub fn fkey_bindings(&self) -> FKeyBindings {
        let mut bindings = FKeyBindings::new();
        for (shift, map) in [(false, &self.fkeys), (true, &self.shift_fkeys)] {
            for (key, command) in map {
                match parse_fkey_name(key) {
                    Some(n) => bindings.bind(n, shift, command.clone()),
                    None => warn!(
                        target: "tilewm.config",
                        key = %key,
                        shift,
                        "ignoring binding for unknown function key"
                    ),
                }
            }
        }
        bindings
    }
}

/// Errors that can occur when loading a window manager configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    Toml(toml::de::Error),
    /// JSON parse error.
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Toml(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
