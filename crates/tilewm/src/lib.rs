#![forbid(unsafe_code)]

//! tilewm public facade crate.
//!
//! Re-exports the types a host needs from the internal crates, a
//! [`Builder`] that assembles a [`WindowManager`] from configuration, region
//! kinds, commands, and a persisted layout, and a prelude for day-to-day use.
//!
//! ```rust,ignore
//! use tilewm::prelude::*;
//!
//! let mut wm = tilewm::Builder::new()
//!     .config_toml_file("tilewm.toml")?
//!     .region_kind("scope", "Scope", Scope::create, Scope::decode)
//!     .command("contact", Rc::new(Contact::default()))
//!     .layout_json(&std::fs::read_to_string("layout.json")?)
//!     .build()?;
//! let out = wm.frame(&FrameInput::new(&events, extent));
//! ```

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use tilewm_core::draw::{CursorShape, DrawCommand, DrawList};
pub use tilewm_core::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, MouseButton, MouseEvent, MouseEventKind,
};
pub use tilewm_core::geometry::{Axis, Point, Rect};
pub use tilewm_core::logging;
pub use tilewm_core::mouse::{MouseConfig, MouseSnapshot, MouseTracker};
pub use tilewm_core::theme::{Rgba, Theme};

// --- Layout re-exports -----------------------------------------------------

pub use tilewm_layout::persist::{CreateFn, DecodeFn};
pub use tilewm_layout::{
    EmptyRegion, LayoutError, LayoutTree, NodeId, PersistedNode, Region, RegionContext, RegionId,
    RegionRegistry, Target,
};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "runtime")]
pub use tilewm_runtime::{
    ArgError, Command, CommandConsole, CommandError, CommandParam, CommandRegistry, ConfigError,
    EditAction, FocusRouter, FrameInput, FrameOutput, ModalEditController, PickState, Preview,
    WindowManager, WmConfig,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for tilewm hosts.
#[derive(Debug)]
pub enum Error {
    /// Layout structure or persisted layout decoding failed.
    Layout(LayoutError),
    /// Configuration could not be loaded or failed validation.
    #[cfg(feature = "runtime")]
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Layout(err) => write!(f, "layout: {err}"),
            #[cfg(feature = "runtime")]
            Self::Config(err) => write!(f, "config: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Layout(err) => Some(err),
            #[cfg(feature = "runtime")]
            Self::Config(err) => Some(err),
        }
    }
}

impl From<LayoutError> for Error {
    fn from(err: LayoutError) -> Self {
        Self::Layout(err)
    }
}

#[cfg(feature = "runtime")]
impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

/// Standard result type for tilewm APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Builder ----------------------------------------------------------------

#[cfg(feature = "runtime")]
#[derive(Debug)]
enum LayoutSource {
    Tree(LayoutTree),
    Json(String),
}

/// Assembles a [`WindowManager`].
#[cfg(feature = "runtime")]
#[derive(Debug, Default)]
pub struct Builder {
    config: WmConfig,
    registry: RegionRegistry,
    commands: CommandRegistry,
    placeholder: Option<String>,
    layout: Option<LayoutSource>,
}

#[cfg(feature = "runtime")]
impl Builder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn config(mut self, config: WmConfig) -> Self {
        self.config = config;
        self
    }

    /// Load the configuration from a TOML file.
    pub fn config_toml_file(mut self, path: impl AsRef<std::path::Path>) -> Result<Self> {
        self.config = WmConfig::from_toml_file(path)?;
        Ok(self)
    }

    /// Register a region kind for persisted layouts and "create new" edits.
    #[must_use]
    pub fn region_kind(mut self, tag: &str, label: &str, create: CreateFn, decode: DecodeFn) -> Self {
        self.registry.register(tag, label, create, decode);
        self
    }

    /// Use a registered kind as the placeholder for new splits and
    /// undecodable nodes.
    #[must_use]
    pub fn placeholder(mut self, tag: &str) -> Self {
        self.placeholder = Some(tag.to_owned());
        self
    }

    #[must_use]
    pub fn command(mut self, id: &str, command: std::rc::Rc<dyn Command>) -> Self {
        self.commands.register(id, command);
        self
    }

    #[must_use]
    pub fn layout(mut self, tree: LayoutTree) -> Self {
        self.layout = Some(LayoutSource::Tree(tree));
        self
    }

    /// Decode this persisted layout at [`build`](Self::build) time, once
    /// every region kind is registered.
    #[must_use]
    pub fn layout_json(mut self, json: &str) -> Self {
        self.layout = Some(LayoutSource::Json(json.to_owned()));
        self
    }

    /// Validate the configuration, decode the layout (a single placeholder
    /// region if none was given), and start the window manager.
    pub fn build(mut self) -> Result<WindowManager> {
        let errors = self.config.validate();
        if !errors.is_empty() {
            return Err(ConfigError::Validation(errors).into());
        }
        if let Some(tag) = &self.placeholder
            && !self.registry.set_placeholder(tag)
        {
            tracing::warn!(
                target: "tilewm.config",
                tag = %tag,
                "placeholder kind is not registered; keeping the default"
            );
        }
        let tree = match self.layout {
            Some(LayoutSource::Tree(tree)) => tree,
            Some(LayoutSource::Json(json)) => LayoutTree::from_json(&json, &self.registry)?,
            None => LayoutTree::new(self.registry.placeholder()),
        };
        Ok(WindowManager::new(
            self.config,
            tree,
            self.registry,
            self.commands,
        ))
    }
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Axis, CursorShape, DrawCommand, DrawList, Error, Event, KeyCode, KeyEvent, LayoutTree,
        Modifiers, MouseButton, MouseEvent, MouseEventKind, Point, Rect, Region, RegionContext,
        RegionId, RegionRegistry, Result, Rgba, Theme,
    };

    #[cfg(feature = "runtime")]
    pub use crate::{
        ArgError, Builder, Command, CommandError, CommandParam, EditAction, FrameInput,
        FrameOutput, WindowManager, WmConfig,
    };

    pub use crate::{core, layout};

    #[cfg(feature = "runtime")]
    pub use crate::runtime;
}

pub use tilewm_core as core;
pub use tilewm_layout as layout;
#[cfg(feature = "runtime")]
pub use tilewm_runtime as runtime;
