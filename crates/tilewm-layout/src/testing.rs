#![forbid(unsafe_code)]

//! Test helpers: a labelled region that records what it was asked to do.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{Value, json};
use tilewm_core::draw::DrawList;
use tilewm_core::event::KeyEvent;
use tilewm_core::theme::Theme;

use crate::region::{Region, RegionContext};

/// Observations shared between a [`LabelRegion`] and the test holding its
/// probe handle.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Probe {
    pub label: String,
    pub draws: usize,
    pub keys: Vec<KeyEvent>,
    pub mouse_frames: usize,
    pub focused_frames: usize,
    pub active: bool,
    pub deactivations: usize,
}

/// A region identified by its label.
///
/// [`duplicate`](Region::duplicate) produces a region with its own fresh
/// probe, so copies are observably independent.
#[derive(Debug, Clone)]
pub struct LabelRegion {
    probe: Rc<RefCell<Probe>>,
    focusable: bool,
    prefers_focus: bool,
}

impl LabelRegion {
    pub const TAG: &'static str = "label";

    #[must_use]
    pub fn new(label: &str) -> Self {
        Self {
            probe: Rc::new(RefCell::new(Probe {
                label: label.to_owned(),
                ..Probe::default()
            })),
            focusable: false,
            prefers_focus: false,
        }
    }

    #[must_use]
    pub fn focusable(mut self) -> Self {
        self.focusable = true;
        self
    }

    /// Focusable and preferred for default focus, like a console.
    #[must_use]
    pub fn console_like(mut self) -> Self {
        self.focusable = true;
        self.prefers_focus = true;
        self
    }

    /// Handle for inspecting the region after it has been boxed into a tree.
    #[must_use]
    pub fn probe(&self) -> Rc<RefCell<Probe>> {
        Rc::clone(&self.probe)
    }

    #[must_use]
    pub fn boxed(self) -> Box<dyn Region> {
        Box::new(self)
    }

    /// Decoder suitable for `RegionRegistry::register`.
    pub fn decode(fields: &Value) -> Result<Box<dyn Region>, String> {
        let label = fields
            .get("label")
            .and_then(Value::as_str)
            .ok_or_else(|| "missing label".to_owned())?;
        let focusable = fields
            .get("focusable")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let mut region = Self::new(label);
        region.focusable = focusable;
        Ok(Box::new(region))
    }

    /// Default constructor suitable for `RegionRegistry::register`.
    #[must_use]
    pub fn create() -> Box<dyn Region> {
        Box::new(Self::new("new"))
    }
}

impl Region for LabelRegion {
    fn type_tag(&self) -> &str {
        Self::TAG
    }

    fn display_name(&self) -> String {
        self.probe.borrow().label.clone()
    }

    fn draw(&mut self, ctx: &RegionContext<'_>, out: &mut DrawList) {
        let mut probe = self.probe.borrow_mut();
        probe.draws += 1;
        if let Some(keys) = ctx.keyboard {
            probe.keys.extend_from_slice(keys);
        }
        if ctx.mouse.is_some() {
            probe.mouse_frames += 1;
        }
        if ctx.has_focus {
            probe.focused_frames += 1;
        }
        out.text(probe.label.clone(), ctx.extent.origin(), ctx.theme.text);
    }

    fn duplicate(&self, as_named_copy: bool) -> Box<dyn Region> {
        let mut label = self.probe.borrow().label.clone();
        if as_named_copy {
            label.push_str(" Copy");
        }
        Box::new(Self {
            probe: Rc::new(RefCell::new(Probe {
                label,
                ..Probe::default()
            })),
            focusable: self.focusable,
            prefers_focus: self.prefers_focus,
        })
    }

    fn can_take_keyboard_focus(&self) -> bool {
        self.focusable
    }

    fn prefers_default_focus(&self) -> bool {
        self.prefers_focus
    }

    fn activate(&mut self, _theme: &Theme) {
        self.probe.borrow_mut().active = true;
    }

    fn deactivate(&mut self) {
        let mut probe = self.probe.borrow_mut();
        probe.active = false;
        probe.deactivations += 1;
    }

    fn has_settings_ui(&self) -> bool {
        self.focusable
    }

    fn persisted_fields(&self) -> Value {
        json!({
            "label": self.probe.borrow().label,
            "focusable": self.focusable,
        })
    }
}
