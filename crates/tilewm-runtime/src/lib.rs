#![forbid(unsafe_code)]

//! Runtime: everything that happens once per frame on top of the layout tree.
//!
//! # Role in tilewm
//! `tilewm-runtime` decides who receives input, runs the modal pick editor
//! and the function-key command console, and turns the tree into a draw list
//! each frame. [`WindowManager`] is the single context object a host drives.
//!
//! # Key components
//! - [`FocusRouter`]: keyboard focus with a hand-off stack, mouse ownership
//!   for gestures, hover, and the maximized view root.
//! - [`ModalEditController`]: split/copy/exchange/delete/place by picking
//!   regions, plus edit sessions that can be saved or reverted.
//! - [`CommandConsole`]: F-key bound commands collecting typed arguments.
//! - [`WmConfig`]: TOML/JSON configuration.

pub mod config;
pub mod console;
pub mod focus;
pub mod line_edit;
pub mod modal_edit;
pub mod settings;
pub mod wm;

pub use config::{ConfigError, Hotkey, WmConfig};
pub use console::{
    ArgError, Collecting, Command, CommandConsole, CommandError, CommandParam, CommandRegistry,
    CommandState, FKeyBindings, Preview, SpanKind, StatusSpan,
};
pub use focus::FocusRouter;
pub use line_edit::{EditOutcome, LineEdit};
pub use modal_edit::{EditAction, ModalEditController, PickOutcome, PickState};
pub use settings::{SettingsEntry, SettingsPanel};
pub use wm::{FrameInput, FrameOutput, WindowManager};
