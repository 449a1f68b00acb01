#![forbid(unsafe_code)]

//! The capability every tiled content region implements.
//!
//! The layout tree treats regions as opaque boxes. It only asks them to draw
//! into their extent, describe themselves, duplicate themselves for copy and
//! edit snapshots, and serialize their own fields for persistence.

use std::fmt;

use serde_json::Value;
use tilewm_core::draw::DrawList;
use tilewm_core::event::KeyEvent;
use tilewm_core::geometry::Rect;
use tilewm_core::mouse::MouseSnapshot;
use tilewm_core::theme::Theme;

/// Per-frame context handed to [`Region::draw`].
///
/// `keyboard` and `mouse` are `Some` only for the region that owns that input
/// this frame; every other region draws passively.
#[derive(Debug, Clone, Copy)]
pub struct RegionContext<'a> {
    pub extent: Rect,
    /// Extent of the enclosing split (equal to `extent` for a lone root).
    pub parent_extent: Rect,
    pub theme: &'a Theme,
    pub keyboard: Option<&'a [KeyEvent]>,
    pub mouse: Option<&'a MouseSnapshot>,
    pub has_focus: bool,
}

/// A content region placed in a leaf of the layout tree.
pub trait Region: fmt::Debug {
    /// Registry tag used by the persisted layout format.
    fn type_tag(&self) -> &str;

    /// Human-readable name for menus and the settings panel.
    fn display_name(&self) -> String;

    fn draw(&mut self, ctx: &RegionContext<'_>, out: &mut DrawList);

    /// Return an independent copy. `as_named_copy` asks the region to mark
    /// its name as a copy where it has one.
    fn duplicate(&self, as_named_copy: bool) -> Box<dyn Region>;

    fn can_take_keyboard_focus(&self) -> bool {
        false
    }

    /// Whether this region should win default keyboard focus over other
    /// focusable regions (console-like regions answer `true`).
    fn prefers_default_focus(&self) -> bool {
        false
    }

    fn activate(&mut self, _theme: &Theme) {}

    fn deactivate(&mut self) {}

    fn has_settings_ui(&self) -> bool {
        false
    }

    fn draw_settings(&mut self, _out: &mut DrawList) {}

    /// Region-specific state for the persisted layout; `Null` if none.
    fn persisted_fields(&self) -> Value {
        Value::Null
    }
}

/// Region used wherever nothing else is available: fresh splits, unknown
/// persisted types, and degraded persisted nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmptyRegion;

impl EmptyRegion {
    pub const TAG: &'static str = "empty";
}

impl Region for EmptyRegion {
    fn type_tag(&self) -> &str {
        Self::TAG
    }

    fn display_name(&self) -> String {
        "(Empty)".to_owned()
    }

    fn draw(&mut self, ctx: &RegionContext<'_>, out: &mut DrawList) {
        out.clear(ctx.theme.background);
    }

    fn duplicate(&self, _as_named_copy: bool) -> Box<dyn Region> {
        Box::new(Self)
    }
}
