#![forbid(unsafe_code)]

//! Core: geometry, input events, mouse tracking, draw lists and logging.
//!
//! # Role in tilewm
//! `tilewm-core` is the vocabulary shared by every other crate. It knows
//! nothing about layout trees or regions; it only defines the shapes that
//! flow between the host toolkit and the window manager.
//!
//! # Primary responsibilities
//! - **Geometry**: `Rect`/`Point` in display units and divider partitioning.
//! - **Event**: canonical key and mouse events.
//! - **MouseTracker**: per-frame click/drag/release snapshots.
//! - **DrawList**: backend-neutral draw commands plus the chrome `Theme`.
//! - **Logging**: `tracing-subscriber` setup driven by `TILEWM_LOG`.

pub mod draw;
pub mod event;
pub mod geometry;
pub mod logging;
pub mod mouse;
pub mod theme;

pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
