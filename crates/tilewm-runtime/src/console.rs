#![forbid(unsafe_code)]

//! Function-key command console.
//!
//! A function key starts a bound [`Command`]; the console then collects one
//! text argument per declared [`CommandParam`], previewing each argument's
//! expansion live, and executes on Enter once every argument validates.
//!
//! ```text
//! Idle --F-key (bound)--> Collecting --Enter, execute Ok--> Idle
//!                           |   ^  \--Enter, arg/exec error--/ (stays)
//!                           |   \--F-key (bound): restart
//!                           \--Escape--> Idle
//! ```

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use tilewm_core::draw::DrawList;
use tilewm_core::event::{KeyCode, KeyEvent};
use tilewm_core::geometry::{Point, Rect};
use tilewm_core::theme::{Rgba, Theme};
use tracing::{debug, error, info};
use unicode_segmentation::UnicodeSegmentation;

use crate::line_edit::{EditOutcome, LineEdit, end_cursor};

/// Argument validation failure, shown next to the offending slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgError(pub String);

impl ArgError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl fmt::Display for ArgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ArgError {}

/// Execution failure, shown once for the whole command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandError(pub String);

impl CommandError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for CommandError {}

/// One typed argument of a [`Command`].
pub trait CommandParam: fmt::Debug {
    fn prompt(&self) -> &str;

    /// Validate raw text and expand abbreviations into the final value.
    fn expand(&self, raw: &str) -> Result<String, ArgError>;

    /// Whether an externally selected callsign may be written into this slot.
    fn accepts_callsign(&self) -> bool {
        false
    }
}

/// A console command with ordered parameters.
pub trait Command: fmt::Debug {
    fn name(&self) -> &str;

    fn params(&self) -> &[Box<dyn CommandParam>];

    /// Run with every argument already expanded.
    fn execute(&self, args: &[String]) -> Result<(), CommandError>;
}

/// Commands addressable by id from function key bindings.
#[derive(Debug, Default, Clone)]
pub struct CommandRegistry {
    commands: FxHashMap<String, Rc<dyn Command>>,
}

impl CommandRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `command` under `id`, replacing any previous entry.
    pub fn register(&mut self, id: impl Into<String>, command: Rc<dyn Command>) {
        self.commands.insert(id.into(), command);
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<Rc<dyn Command>> {
        self.commands.get(id).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// `(F1..F12, shift)` to command id.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FKeyBindings {
    plain: [Option<String>; 12],
    shifted: [Option<String>; 12],
}

impl FKeyBindings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, key: u8, shift: bool) -> Option<&Option<String>> {
        let table = if shift { &self.shifted } else { &self.plain };
        table.get(usize::from(key).checked_sub(1)?)
    }

    /// Bind `key` (1..=12). Out-of-range keys are ignored.
    pub fn bind(&mut self, key: u8, shift: bool, command: impl Into<String>) {
        let table = if shift {
            &mut self.shifted
        } else {
            &mut self.plain
        };
        if let Some(slot) = usize::from(key)
            .checked_sub(1)
            .and_then(|i| table.get_mut(i))
        {
            *slot = Some(command.into());
        }
    }

    pub fn unbind(&mut self, key: u8, shift: bool) {
        let table = if shift {
            &mut self.shifted
        } else {
            &mut self.plain
        };
        if let Some(slot) = usize::from(key)
            .checked_sub(1)
            .and_then(|i| table.get_mut(i))
        {
            *slot = None;
        }
    }

    #[must_use]
    pub fn lookup(&self, key: u8, shift: bool) -> Option<&str> {
        self.slot(key, shift)?.as_deref()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.plain.iter().chain(&self.shifted).flatten().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Advisory display for one argument slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    /// Text is empty or already final.
    None,
    /// What the text would expand to on submit.
    Expansion(String),
    /// The text does not currently validate.
    Invalid,
}

/// Argument collection for an active command.
#[derive(Debug, Clone)]
pub struct Collecting {
    command: Rc<dyn Command>,
    args: Vec<String>,
    errors: Vec<Option<String>>,
    focus: usize,
    cursor: usize,
    command_error: Option<String>,
}

impl Collecting {
    fn new(command: Rc<dyn Command>) -> Self {
        let n = command.params().len();
        Self {
            command,
            args: vec![String::new(); n],
            errors: vec![None; n],
            focus: 0,
            cursor: 0,
            command_error: None,
        }
    }

    #[must_use]
    pub fn command(&self) -> &dyn Command {
        self.command.as_ref()
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    #[must_use]
    pub fn errors(&self) -> &[Option<String>] {
        &self.errors
    }

    #[must_use]
    pub const fn focus(&self) -> usize {
        self.focus
    }

    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn command_error(&self) -> Option<&str> {
        self.command_error.as_deref()
    }

    fn move_focus(&mut self, forward: bool) {
        let n = self.args.len();
        if n == 0 {
            return;
        }
        self.focus = if forward {
            (self.focus + 1) % n
        } else {
            (self.focus + n - 1) % n
        };
        self.cursor = end_cursor(&self.args[self.focus]);
    }

    /// Offer an externally selected callsign to the first slot that takes
    /// callsigns. Returns whether the slot was filled.
    fn offer_callsign(&mut self, callsign: &str) -> bool {
        let params = self.command.params();
        let Some(index) = params.iter().position(|p| p.accepts_callsign()) else {
            return false;
        };
        match params[index].expand(callsign) {
            Ok(expanded) if expanded == callsign => {}
            _ => return false,
        }
        self.args[index] = callsign.to_owned();
        self.errors[index] = None;
        if index == self.focus {
            self.focus = (self.focus + 1) % self.args.len();
            self.cursor = 0;
        }
        true
    }
}

/// Console state machine.
#[derive(Debug, Clone, Default)]
pub enum CommandState {
    #[default]
    Idle,
    Collecting(Collecting),
}

/// Role of a piece of the rendered status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    CommandName,
    Prompt,
    Value,
    FocusedValue,
    Placeholder,
    Preview,
    Invalid,
    Error,
    Notice,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSpan {
    pub text: String,
    pub kind: SpanKind,
}

impl StatusSpan {
    fn new(text: impl Into<String>, kind: SpanKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    #[must_use]
    pub fn color(&self, theme: &Theme) -> Rgba {
        match self.kind {
            SpanKind::CommandName | SpanKind::FocusedValue => theme.text_highlight,
            SpanKind::Invalid | SpanKind::Error => theme.text_error,
            SpanKind::Prompt
            | SpanKind::Value
            | SpanKind::Placeholder
            | SpanKind::Preview
            | SpanKind::Notice => theme.text,
        }
    }
}

/// The command console: bindings, registry, and the active command.
#[derive(Debug, Clone)]
pub struct CommandConsole {
    registry: CommandRegistry,
    bindings: FKeyBindings,
    state: CommandState,
    notice: Option<String>,
    glyph_advance: f32,
}

impl Default for CommandConsole {
    fn default() -> Self {
        Self::new(CommandRegistry::new(), FKeyBindings::new())
    }
}

impl CommandConsole {
    #[must_use]
    pub fn new(registry: CommandRegistry, bindings: FKeyBindings) -> Self {
        Self {
            registry,
            bindings,
            state: CommandState::Idle,
            notice: None,
            glyph_advance: 8.0,
        }
    }

    /// Horizontal advance per grapheme when laying out the status line.
    #[must_use]
    pub fn with_glyph_advance(mut self, advance: f32) -> Self {
        self.glyph_advance = advance;
        self
    }

    pub fn set_bindings(&mut self, bindings: FKeyBindings) {
        self.bindings = bindings;
    }

    #[must_use]
    pub fn bindings(&self) -> &FKeyBindings {
        &self.bindings
    }

    #[must_use]
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut CommandRegistry {
        &mut self.registry
    }

    #[must_use]
    pub fn state(&self) -> &CommandState {
        &self.state
    }

    #[must_use]
    pub fn collecting(&self) -> Option<&Collecting> {
        match &self.state {
            CommandState::Collecting(c) => Some(c),
            CommandState::Idle => None,
        }
    }

    /// Whether a command is collecting arguments. The console claims
    /// keyboard focus while this holds.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.state, CommandState::Collecting(_))
    }

    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// Start command `id`, replacing any active command. `selection` is
    /// offered to the fresh command as if it had just been selected.
    pub fn start(&mut self, id: &str, selection: Option<&str>) -> bool {
        let Some(command) = self.registry.get(id) else {
            error!(target: "tilewm.console", command = id, "bound command is not registered");
            self.notice = Some(format!("Unknown command \"{id}\""));
            return false;
        };
        debug!(
            target: "tilewm.console",
            command = id,
            params = command.params().len(),
            "command started"
        );
        let mut collecting = Collecting::new(command);
        if let Some(callsign) = selection {
            collecting.offer_callsign(callsign);
        }
        self.state = CommandState::Collecting(collecting);
        self.notice = None;
        true
    }

    /// Escape: discard the active command and any pending message.
    pub fn cancel(&mut self) {
        if self.is_active() {
            debug!(target: "tilewm.console", "command cancelled");
        }
        self.state = CommandState::Idle;
        self.notice = None;
    }

    /// Forward an external selection to the active command.
    pub fn on_selection(&mut self, callsign: &str) -> bool {
        match &mut self.state {
            CommandState::Collecting(c) => c.offer_callsign(callsign),
            CommandState::Idle => false,
        }
    }

    /// Process one frame's keystrokes.
    pub fn handle_keys(&mut self, keys: &[KeyEvent], selection: Option<&str>) {
        for key in keys {
            self.handle_key(key, selection);
        }
    }

    /// Returns whether the console consumed `key`.
    pub fn handle_key(&mut self, key: &KeyEvent, selection: Option<&str>) -> bool {
        if !key.is_press() {
            return false;
        }
        if let Some(n) = key.function_key()
            && (1..=12).contains(&n)
        {
            self.function_key(n, key.shift(), selection);
            return true;
        }
        if key.code == KeyCode::Escape {
            let consumed = self.is_active() || self.notice.is_some();
            self.cancel();
            return consumed;
        }

        let CommandState::Collecting(c) = &mut self.state else {
            return false;
        };
        if c.args.is_empty() {
            if key.code == KeyCode::Enter {
                self.submit();
                return true;
            }
            return false;
        }

        let focus = c.focus;
        let outcome = LineEdit::new(&mut c.args[focus], &mut c.cursor).handle_key(key);
        match outcome {
            EditOutcome::Ignored => return false,
            EditOutcome::Moved => {}
            EditOutcome::Changed => {
                c.errors[focus] = None;
                c.command_error = None;
            }
            EditOutcome::Next => c.move_focus(true),
            EditOutcome::Prev => c.move_focus(false),
            EditOutcome::Submit => self.submit(),
        }
        true
    }

    fn function_key(&mut self, n: u8, shift: bool, selection: Option<&str>) {
        let Some(id) = self.bindings.lookup(n, shift).map(str::to_owned) else {
            let name = if shift {
                format!("shift-F{n}")
            } else {
                format!("F{n}")
            };
            debug!(target: "tilewm.console", key = %name, "unbound function key");
            self.notice = Some(format!("No command bound to {name}"));
            return;
        };
        self.start(&id, selection);
    }

    /// Enter: validate every slot, then execute.
    pub fn submit(&mut self) {
        let CommandState::Collecting(c) = &mut self.state else {
            return;
        };
        let params = c.command.params();
        let mut expanded = Vec::with_capacity(params.len());
        let mut failed = false;
        for (i, param) in params.iter().enumerate() {
            match param.expand(&c.args[i]) {
                Ok(value) => {
                    c.errors[i] = None;
                    expanded.push(value);
                }
                Err(e) => {
                    c.errors[i] = Some(e.to_string());
                    failed = true;
                }
            }
        }
        if failed {
            debug!(
                target: "tilewm.console",
                command = c.command.name(),
                "argument validation failed"
            );
            return;
        }

        match c.command.execute(&expanded) {
            Ok(()) => {
                info!(
                    target: "tilewm.console",
                    command = c.command.name(),
                    args = ?expanded,
                    "command executed"
                );
                self.state = CommandState::Idle;
            }
            Err(e) => {
                info!(
                    target: "tilewm.console",
                    command = c.command.name(),
                    error = %e,
                    "command failed"
                );
                c.command_error = Some(e.to_string());
            }
        }
    }

    /// Live per-slot previews of what each argument would expand to.
    #[must_use]
    pub fn feedback(&self) -> Vec<Preview> {
        let Some(c) = self.collecting() else {
            return Vec::new();
        };
        c.command
            .params()
            .iter()
            .zip(&c.args)
            .map(|(param, raw)| {
                if raw.is_empty() {
                    return Preview::None;
                }
                match param.expand(raw) {
                    Ok(expanded) if expanded != *raw => Preview::Expansion(expanded),
                    Ok(_) => Preview::None,
                    Err(_) => Preview::Invalid,
                }
            })
            .collect()
    }

    /// The console rendered as styled pieces, left to right.
    #[must_use]
    pub fn status_line(&self) -> Vec<StatusSpan> {
        let mut spans = Vec::new();
        if let Some(c) = self.collecting() {
            spans.push(StatusSpan::new(c.command.name(), SpanKind::CommandName));
            let previews = self.feedback();
            for (i, param) in c.command.params().iter().enumerate() {
                spans.push(StatusSpan::new(
                    format!(" {}: ", param.prompt()),
                    SpanKind::Prompt,
                ));
                let raw = &c.args[i];
                if raw.is_empty() {
                    spans.push(StatusSpan::new("_", SpanKind::Placeholder));
                } else if i == c.focus {
                    spans.push(StatusSpan::new(raw.clone(), SpanKind::FocusedValue));
                } else {
                    spans.push(StatusSpan::new(raw.clone(), SpanKind::Value));
                }
                match &previews[i] {
                    Preview::Expansion(s) => {
                        spans.push(StatusSpan::new(format!(" ({s})"), SpanKind::Preview));
                    }
                    Preview::Invalid => spans.push(StatusSpan::new(" ?", SpanKind::Invalid)),
                    Preview::None => {}
                }
                if let Some(e) = &c.errors[i] {
                    spans.push(StatusSpan::new(format!(" [{e}]"), SpanKind::Error));
                }
            }
            if let Some(e) = &c.command_error {
                spans.push(StatusSpan::new(format!("  {e}"), SpanKind::Error));
            }
        }
        if let Some(notice) = &self.notice {
            spans.push(StatusSpan::new(notice.clone(), SpanKind::Notice));
        }
        spans
    }

    /// Draw the status line into `extent`, with a focus border while a
    /// command is collecting.
    pub fn draw(&self, extent: Rect, theme: &Theme, out: &mut DrawList) {
        out.scissor(extent);
        out.fill_rect(extent, theme.ui_control);
        let mut x = extent.x + self.glyph_advance * 0.5;
        for span in self.status_line() {
            out.text(span.text.clone(), Point::new(x, extent.y), span.color(theme));
            x += span.text.graphemes(true).count() as f32 * self.glyph_advance;
        }
        if self.is_active() {
            out.border(extent, theme.text_highlight, 1.0);
        }
        out.reset_state();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tilewm_core::draw::DrawCommand;
    use tilewm_core::event::Modifiers;

    #[derive(Debug)]
    struct Callsign {
        known: Rc<RefCell<Vec<String>>>,
    }

    impl CommandParam for Callsign {
        fn prompt(&self) -> &str {
            "callsign"
        }

        fn expand(&self, raw: &str) -> Result<String, ArgError> {
            let known = self.known.borrow();
            let matches: Vec<&String> = known.iter().filter(|c| c.ends_with(raw)).collect();
            match matches.as_slice() {
                [] => Err(ArgError::new(format!("no aircraft \"{raw}\""))),
                [one] => Ok((*one).clone()),
                _ => Err(ArgError::new(format!("\"{raw}\" is ambiguous"))),
            }
        }

        fn accepts_callsign(&self) -> bool {
            true
        }
    }

    #[derive(Debug)]
    struct Altitude;

    impl CommandParam for Altitude {
        fn prompt(&self) -> &str {
            "altitude"
        }

        fn expand(&self, raw: &str) -> Result<String, ArgError> {
            let n: u32 = raw.parse().map_err(|_| ArgError::new("not a number"))?;
            Ok(if n < 1000 { (n * 100).to_string() } else { raw.to_owned() })
        }
    }

    #[derive(Debug)]
    struct Recorder {
        params: Vec<Box<dyn CommandParam>>,
        calls: RefCell<Vec<Vec<String>>>,
        fail_with: RefCell<Option<String>>,
    }

    impl Command for Recorder {
        fn name(&self) -> &str {
            "climb"
        }

        fn params(&self) -> &[Box<dyn CommandParam>] {
            &self.params
        }

        fn execute(&self, args: &[String]) -> Result<(), CommandError> {
            if let Some(msg) = self.fail_with.borrow_mut().take() {
                return Err(CommandError::new(msg));
            }
            self.calls.borrow_mut().push(args.to_vec());
            Ok(())
        }
    }

    fn setup() -> (CommandConsole, Rc<Recorder>, Rc<RefCell<Vec<String>>>) {
        let known = Rc::new(RefCell::new(vec!["UAL12".to_owned(), "DAL345".to_owned()]));
        let recorder = Rc::new(Recorder {
            params: vec![
                Box::new(Callsign {
                    known: Rc::clone(&known),
                }),
                Box::new(Altitude),
            ],
            calls: RefCell::new(Vec::new()),
            fail_with: RefCell::new(None),
        });
        let mut registry = CommandRegistry::new();
        registry.register("climb", Rc::clone(&recorder) as Rc<dyn Command>);
        let mut bindings = FKeyBindings::new();
        bindings.bind(2, false, "climb");
        bindings.bind(5, true, "missing");
        (CommandConsole::new(registry, bindings), recorder, known)
    }

    fn press(console: &mut CommandConsole, code: KeyCode) {
        console.handle_key(&KeyEvent::new(code), None);
    }

    fn type_str(console: &mut CommandConsole, s: &str) {
        for c in s.chars() {
            press(console, KeyCode::Char(c));
        }
    }

    #[test]
    fn unbound_key_sets_notice_only() {
        let (mut console, _, _) = setup();
        press(&mut console, KeyCode::F(3));
        assert!(!console.is_active());
        assert_eq!(console.notice(), Some("No command bound to F3"));

        console.handle_key(
            &KeyEvent::new(KeyCode::F(2)).with_modifiers(Modifiers::SHIFT),
            None,
        );
        assert_eq!(console.notice(), Some("No command bound to shift-F2"));
    }

    #[test]
    fn binding_to_unknown_command_changes_nothing() {
        let (mut console, _, _) = setup();
        press(&mut console, KeyCode::F(2));
        type_str(&mut console, "12");
        console.handle_key(
            &KeyEvent::new(KeyCode::F(5)).with_modifiers(Modifiers::SHIFT),
            None,
        );
        let c = console.collecting().expect("still collecting");
        assert_eq!(c.args()[0], "12");
        assert!(console.notice().is_some_and(|n| n.contains("missing")));
    }

    #[test]
    fn bound_key_starts_fresh_collection() {
        let (mut console, _, _) = setup();
        press(&mut console, KeyCode::F(2));
        let c = console.collecting().expect("collecting");
        assert_eq!(c.args(), ["", ""]);
        assert_eq!(c.errors(), [None, None]);
        assert_eq!((c.focus(), c.cursor()), (0, 0));

        type_str(&mut console, "12");
        press(&mut console, KeyCode::F(2));
        let c = console.collecting().expect("collecting");
        assert_eq!(c.args(), ["", ""], "restart discards entered text");
    }

    #[test]
    fn focus_wraps_both_ways_with_cursor_at_end() {
        let (mut console, _, _) = setup();
        press(&mut console, KeyCode::F(2));
        type_str(&mut console, "12");
        press(&mut console, KeyCode::Tab);
        let c = console.collecting().expect("collecting");
        assert_eq!((c.focus(), c.cursor()), (1, 0));
        press(&mut console, KeyCode::Tab);
        let c = console.collecting().expect("collecting");
        assert_eq!((c.focus(), c.cursor()), (0, 2));
        press(&mut console, KeyCode::Up);
        assert_eq!(console.collecting().expect("collecting").focus(), 1);
    }

    #[test]
    fn submit_blocks_on_argument_errors() {
        let (mut console, recorder, _) = setup();
        press(&mut console, KeyCode::F(2));
        type_str(&mut console, "999");
        press(&mut console, KeyCode::Tab);
        type_str(&mut console, "x");
        press(&mut console, KeyCode::Enter);

        let c = console.collecting().expect("still collecting");
        assert!(c.errors()[0].as_deref().is_some_and(|e| e.contains("999")));
        assert_eq!(c.errors()[1].as_deref(), Some("not a number"));
        assert!(recorder.calls.borrow().is_empty());

        press(&mut console, KeyCode::Backspace);
        let c = console.collecting().expect("still collecting");
        assert_eq!(c.errors()[1], None, "editing clears the focused slot error");
        assert!(c.errors()[0].is_some(), "other slots keep theirs");
    }

    #[test]
    fn submit_executes_with_expanded_values() {
        let (mut console, recorder, _) = setup();
        press(&mut console, KeyCode::F(2));
        type_str(&mut console, "12");
        press(&mut console, KeyCode::Tab);
        type_str(&mut console, "80");
        press(&mut console, KeyCode::Enter);
        assert!(!console.is_active());
        assert_eq!(*recorder.calls.borrow(), vec![vec!["UAL12".to_owned(), "8000".to_owned()]]);
    }

    #[test]
    fn execution_failure_keeps_state_for_retry() {
        let (mut console, recorder, _) = setup();
        *recorder.fail_with.borrow_mut() = Some("unable".into());
        press(&mut console, KeyCode::F(2));
        type_str(&mut console, "12");
        press(&mut console, KeyCode::Tab);
        type_str(&mut console, "80");
        press(&mut console, KeyCode::Enter);
        let c = console.collecting().expect("still collecting");
        assert_eq!(c.command_error(), Some("unable"));
        assert_eq!(c.args(), ["12", "80"]);

        type_str(&mut console, "0");
        assert_eq!(console.collecting().expect("collecting").command_error(), None);
        press(&mut console, KeyCode::Enter);
        assert!(!console.is_active());
    }

    #[test]
    fn escape_returns_to_idle() {
        let (mut console, _, _) = setup();
        press(&mut console, KeyCode::F(2));
        type_str(&mut console, "12");
        press(&mut console, KeyCode::Escape);
        assert!(!console.is_active());
        assert!(console.status_line().is_empty());
    }

    #[test]
    fn selection_fills_callsign_slot_and_advances_focus() {
        let (mut console, _, _) = setup();
        press(&mut console, KeyCode::F(2));
        assert!(console.on_selection("DAL345"));
        let c = console.collecting().expect("collecting");
        assert_eq!(c.args()[0], "DAL345");
        assert_eq!((c.focus(), c.cursor()), (1, 0));

        // Focus is elsewhere now, so a new selection leaves it alone.
        assert!(console.on_selection("UAL12"));
        let c = console.collecting().expect("collecting");
        assert_eq!(c.args()[0], "UAL12");
        assert_eq!(c.focus(), 1);
    }

    #[test]
    fn selection_must_expand_to_itself() {
        let (mut console, _, known) = setup();
        press(&mut console, KeyCode::F(2));
        assert!(!console.on_selection("AAL1"));
        known.borrow_mut().push("AAL1".into());
        known.borrow_mut().push("XAAL1".into());
        assert!(!console.on_selection("AAL1"), "ambiguous expansions are rejected");
        assert_eq!(console.collecting().expect("collecting").args()[0], "");
    }

    #[test]
    fn selection_offered_on_start() {
        let (mut console, _, _) = setup();
        console.handle_key(&KeyEvent::new(KeyCode::F(2)), Some("UAL12"));
        let c = console.collecting().expect("collecting");
        assert_eq!(c.args()[0], "UAL12");
        assert_eq!(c.focus(), 1);
    }

    #[test]
    fn selection_ignored_when_idle() {
        let (mut console, _, _) = setup();
        assert!(!console.on_selection("UAL12"));
    }

    #[test]
    fn feedback_previews_expansion_and_invalid() {
        let (mut console, _, _) = setup();
        press(&mut console, KeyCode::F(2));
        type_str(&mut console, "12");
        press(&mut console, KeyCode::Tab);
        type_str(&mut console, "z");
        assert_eq!(
            console.feedback(),
            vec![Preview::Expansion("UAL12".into()), Preview::Invalid]
        );

        let spans = console.status_line();
        assert_eq!(spans[0].kind, SpanKind::CommandName);
        assert!(spans.iter().any(|s| s.kind == SpanKind::Preview && s.text.contains("UAL12")));
        assert!(spans.iter().any(|s| s.kind == SpanKind::Invalid));
    }

    #[test]
    fn idle_keys_are_not_consumed() {
        let (mut console, _, _) = setup();
        assert!(!console.handle_key(&KeyEvent::new(KeyCode::Char('a')), None));
        assert!(!console.handle_key(&KeyEvent::new(KeyCode::Escape), None));
    }

    #[test]
    fn draw_borders_only_while_collecting() {
        let (mut console, _, _) = setup();
        let theme = Theme::default();
        let extent = Rect::new(0.0, 0.0, 400.0, 20.0);
        let mut out = DrawList::new();
        console.draw(extent, &theme, &mut out);
        assert!(!out.commands().iter().any(|c| matches!(c, DrawCommand::Border { .. })));

        press(&mut console, KeyCode::F(2));
        let mut out = DrawList::new();
        console.draw(extent, &theme, &mut out);
        assert!(out.commands().iter().any(|c| matches!(c, DrawCommand::Border { .. })));
        assert_eq!(out.commands().last(), Some(&DrawCommand::ResetState));
    }

    #[test]
    fn bindings_ignore_out_of_range_keys() {
        let mut bindings = FKeyBindings::new();
        bindings.bind(0, false, "x");
        bindings.bind(13, true, "x");
        assert!(bindings.is_empty());
        bindings.bind(12, true, "x");
        assert_eq!(bindings.lookup(12, true), Some("x"));
        assert_eq!(bindings.len(), 1);
        bindings.unbind(12, true);
        assert!(bindings.is_empty());
    }
}
