//! Scripted multi-frame scenarios driven through `WindowManager::frame`.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use tilewm_core::event::{Event, KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use tilewm_core::geometry::{Axis, Rect};
use tilewm_layout::testing::LabelRegion;
use tilewm_layout::{LayoutTree, RegionRegistry};
use tilewm_runtime::{
    ArgError, Command, CommandError, CommandParam, CommandRegistry, CommandState, EditAction,
    FrameInput, Preview, WindowManager, WmConfig,
};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

const AREA: Rect = Rect::new(0.0, 0.0, 400.0, 300.0);

fn click(x: f32, y: f32) -> Vec<Event> {
    vec![Event::Mouse(MouseEvent::new(
        MouseEventKind::Down(MouseButton::Primary),
        x,
        y,
    ))]
}

fn release(x: f32, y: f32) -> Vec<Event> {
    vec![Event::Mouse(MouseEvent::new(
        MouseEventKind::Up(MouseButton::Primary),
        x,
        y,
    ))]
}

fn keys(text: &str) -> Vec<Event> {
    text.chars()
        .map(|c| Event::Key(KeyEvent::new(KeyCode::Char(c))))
        .collect()
}

fn key(code: KeyCode) -> Vec<Event> {
    vec![Event::Key(KeyEvent::new(code))]
}

fn registry() -> RegionRegistry {
    let mut registry = RegionRegistry::new();
    registry.register(
        LabelRegion::TAG,
        "Label",
        LabelRegion::create,
        LabelRegion::decode,
    );
    registry
}

#[test]
fn copy_flow_duplicates_source_into_destination() {
    // A | B, each 199 px wide with a 2 px divider.
    let mut tree = LayoutTree::new(LabelRegion::new("A").boxed());
    let a = tree.regions()[0];
    let b = tree
        .split_region(a, Axis::Horizontal, LabelRegion::new("B").boxed())
        .expect("split");
    let node_a = tree.find_node(a).expect("a");
    let node_b = tree.find_node(b).expect("b");
    let mut wm = WindowManager::new(
        WmConfig::default(),
        tree,
        registry(),
        CommandRegistry::new(),
    );

    assert!(wm.activate_action(EditAction::Copy));
    let out = wm.frame(&FrameInput::new(&click(50.0, 50.0), AREA));
    assert_eq!(out.prompt.as_deref(), Some("Select destination for copy"));
    assert!(wm.tree().contains_region(b), "source pick does not mutate");
    wm.frame(&FrameInput::new(&release(50.0, 50.0), AREA));

    let out = wm.frame(&FrameInput::new(&click(300.0, 50.0), AREA));
    assert_eq!(out.prompt, None);
    assert!(!wm.edit().is_picking());

    assert!(!wm.tree().contains_region(b), "destination region discarded");
    assert_eq!(wm.tree().find_node(a), Some(node_a), "source untouched");
    let copy = wm
        .tree()
        .regions()
        .into_iter()
        .find(|r| *r != a)
        .expect("copy present");
    assert_eq!(wm.tree().find_node(copy), Some(node_b));
    let tree = wm.tree();
    assert_eq!(tree.region(copy).expect("copy").display_name(), "A Copy");
    assert_eq!(tree.region(a).expect("source").display_name(), "A");
    assert!(tree.validate().is_ok());
}

#[derive(Debug)]
struct CallsignParam {
    traffic: Rc<RefCell<Vec<String>>>,
}

impl CommandParam for CallsignParam {
    fn prompt(&self) -> &str {
        "aircraft"
    }

    fn expand(&self, raw: &str) -> Result<String, ArgError> {
        let traffic = self.traffic.borrow();
        let matches: Vec<&String> = traffic.iter().filter(|c| c.contains(raw)).collect();
        match matches.as_slice() {
            [one] => Ok((*one).clone()),
            [] => Err(ArgError::new(format!("{raw}: no such aircraft"))),
            _ => Err(ArgError::new(format!("{raw}: ambiguous"))),
        }
    }

    fn accepts_callsign(&self) -> bool {
        true
    }
}

#[derive(Debug)]
struct Contact {
    params: Vec<Box<dyn CommandParam>>,
    executed: RefCell<Vec<String>>,
}

impl Command for Contact {
    fn name(&self) -> &str {
        "CONTACT"
    }

    fn params(&self) -> &[Box<dyn CommandParam>] {
        &self.params
    }

    fn execute(&self, args: &[String]) -> Result<(), CommandError> {
        self.executed.borrow_mut().push(args[0].clone());
        Ok(())
    }
}

#[test]
fn command_flow_blocks_on_bad_callsign_then_accepts_selection() {
    let traffic = Rc::new(RefCell::new(vec!["UAL9".to_owned()]));
    let contact = Rc::new(Contact {
        params: vec![Box::new(CallsignParam {
            traffic: Rc::clone(&traffic),
        })],
        executed: RefCell::new(Vec::new()),
    });
    let mut commands = CommandRegistry::new();
    commands.register("contact", Rc::clone(&contact) as Rc<dyn Command>);

    let mut config = WmConfig::default();
    config.fkeys.insert("F1".into(), "contact".into());

    let label = LabelRegion::new("scope").console_like();
    let probe = label.probe();
    let tree = LayoutTree::new(label.boxed());
    let mut wm = WindowManager::new(config, tree, registry(), commands);
    let status = Rect::new(0.0, 300.0, 400.0, 20.0);
    let frame = |wm: &mut WindowManager, events: Vec<Event>| {
        wm.frame(&FrameInput::new(&events, AREA).with_status_line(status))
    };

    frame(&mut wm, key(KeyCode::F(1)));
    assert!(wm.console().is_active());

    frame(&mut wm, keys("aal1"));
    assert!(probe.borrow().keys.is_empty(), "console holds the keyboard");
    assert_eq!(wm.console().feedback(), vec![Preview::Invalid]);

    frame(&mut wm, key(KeyCode::Enter));
    let collecting = wm.console().collecting().expect("still collecting");
    assert_eq!(collecting.args(), ["AAL1"]);
    assert!(
        collecting.errors()[0]
            .as_deref()
            .is_some_and(|e| e.contains("no such aircraft"))
    );
    assert!(contact.executed.borrow().is_empty());

    traffic.borrow_mut().push("AAL1".into());
    wm.select(Some("AAL1"));
    let collecting = wm.console().collecting().expect("still collecting");
    assert_eq!(collecting.args(), ["AAL1"]);
    assert_eq!(collecting.errors(), [None]);

    frame(&mut wm, key(KeyCode::Enter));
    assert!(matches!(wm.console().state(), CommandState::Idle));
    assert_eq!(*contact.executed.borrow(), vec!["AAL1".to_owned()]);

    frame(&mut wm, keys("x"));
    assert_eq!(probe.borrow().keys.len(), 1, "keyboard returns to the region");
}

#[test]
fn unbound_function_key_shows_notice() {
    let tree = LayoutTree::new(LabelRegion::new("A").boxed());
    let mut wm = WindowManager::new(
        WmConfig::default(),
        tree,
        registry(),
        CommandRegistry::new(),
    );
    wm.frame(&FrameInput::new(&key(KeyCode::F(7)), AREA));
    assert_eq!(wm.console().notice(), Some("No command bound to F7"));
    assert!(!wm.console().is_active());
}

#[derive(Clone, Default)]
struct MessageCapture {
    messages: Arc<Mutex<Vec<(String, String)>>>,
}

struct MessageVisitor(Option<String>);

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = Some(format!("{value:?}"));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.0 = Some(value.to_owned());
        }
    }
}

impl<S: tracing::Subscriber> Layer<S> for MessageCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(None);
        event.record(&mut visitor);
        if let Some(message) = visitor.0
            && let Ok(mut messages) = self.messages.lock()
        {
            messages.push((event.metadata().target().to_owned(), message));
        }
    }
}

#[test]
fn failed_pick_edit_is_logged_and_tree_survives() {
    let capture = MessageCapture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());

    tracing::subscriber::with_default(subscriber, || {
        let mut tree = LayoutTree::new(LabelRegion::new("A").boxed());
        let a = tree.regions()[0];
        tree.split_region(a, Axis::Vertical, LabelRegion::new("B").boxed())
            .expect("split");
        let mut wm = WindowManager::new(
            WmConfig::default(),
            tree,
            registry(),
            CommandRegistry::new(),
        );
        let before = wm.tree().to_string();
        assert!(wm.activate_action(EditAction::Place("radar".into())));
        wm.frame(&FrameInput::new(&click(50.0, 50.0), AREA));
        assert_eq!(wm.tree().to_string(), before);
        assert!(!wm.edit().is_picking());
    });

    let messages = capture.messages.lock().expect("lock");
    assert!(
        messages
            .iter()
            .any(|(target, msg)| target == "tilewm.wm" && msg.contains("layout edit failed")),
        "expected a warning, got {messages:?}"
    );
}
