#![allow(dead_code)]

//! Shared fixtures for the runtime integration tests.
//!
//! Geometry used throughout (no toolbar shadow, 100px toolbar, 600x1000
//! container): Peek 100, Half 550, Full 1000.

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Mutex, Once};

use fsheet::{
    BottomSheetController, ContentFlags, ContentHandle, ContentPriority, EventLog, SheetContent,
    SheetEvent, ViewId,
};
use fsheet_core::{GeometryConfig, ManualClock, SheetConfig};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

pub const PEEK: f32 = 100.0;
pub const HALF: f32 = 550.0;
pub const FULL: f32 = 1000.0;

/// One animation frame.
pub const FRAME_MS: u64 = 16;

static TRACING: Once = Once::new();

/// Route `tracing` output to the test writer, filtered by `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn config() -> SheetConfig {
    SheetConfig::default()
        .with_geometry(GeometryConfig::default().with_toolbar_shadow_height_px(0.0))
}

/// A measured controller on a manual clock, with an event log attached.
pub struct Harness {
    pub clock: ManualClock,
    pub controller: BottomSheetController,
    pub log: Rc<EventLog>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(config())
    }

    pub fn with_config(config: SheetConfig) -> Self {
        init_tracing();
        let clock = ManualClock::new();
        let mut controller = BottomSheetController::new(config, Box::new(clock.clone()));
        let log = EventLog::shared();
        controller.add_observer(log.clone());
        controller.update_toolbar_height(PEEK);
        controller.update_container(600.0, FULL);
        log.clear();
        Self {
            clock,
            controller,
            log,
        }
    }

    /// Tick frame by frame until no animation is running, including any
    /// settle started in reaction to the previous one.
    pub fn run_to_end(&mut self) {
        for _ in 0..1000 {
            if !self.controller.sheet().is_running_settle_animation() {
                return;
            }
            self.clock.advance_ms(FRAME_MS);
            self.controller.tick();
        }
        panic!("settle animation never finished");
    }

    /// Drag from the current offset to `to`, then release at `velocity`.
    pub fn drag(&mut self, to: f32, velocity: f32) -> fsheet::SheetState {
        let from = self.controller.sheet().offset();
        self.controller.begin_drag().expect("begin drag");
        for step in 1..=8 {
            let offset = from + (to - from) * step as f32 / 8.0;
            self.controller.drag_update(offset).expect("drag update");
        }
        self.controller
            .drag_released(to, velocity)
            .expect("drag release")
    }

    pub fn lifecycle(&self) -> Vec<SheetEvent> {
        self.log.lifecycle()
    }
}

pub fn content(view: u64, priority: ContentPriority) -> ContentHandle {
    SheetContent::builder(ViewId(view))
        .label(format!("content-{view}"))
        .priority(priority)
        .build()
}

pub fn content_with_flags(view: u64, priority: ContentPriority, flags: ContentFlags) -> ContentHandle {
    SheetContent::builder(ViewId(view))
        .label(format!("content-{view}"))
        .priority(priority)
        .flags(flags)
        .build()
}

pub fn is_current(controller: &BottomSheetController, content: &ContentHandle) -> bool {
    controller
        .current_content()
        .is_some_and(|c| Rc::ptr_eq(c, content))
}

// ---------------------------------------------------------------------------
// Tracing capture
// ---------------------------------------------------------------------------

/// A captured log event: target, level and string-formatted fields.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: tracing::Level,
    pub target: String,
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    pub fn message(&self) -> Option<&str> {
        self.fields.get("message").map(String::as_str)
    }
}

/// Layer that records every event it sees.
pub struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for EventCapture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let meta = event.metadata();
        self.events.lock().unwrap().push(CapturedEvent {
            level: *meta.level(),
            target: meta.target().to_string(),
            fields: visitor.0.into_iter().collect(),
        });
    }
}

/// Run `f` with a capturing subscriber installed and return what it logged.
pub fn with_captured_events<R>(f: impl FnOnce() -> R) -> (R, Vec<CapturedEvent>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let layer = EventCapture {
        events: events.clone(),
    };
    let subscriber = tracing_subscriber::registry().with(layer);
    let result = tracing::subscriber::with_default(subscriber, f);
    let captured = events.lock().unwrap().clone();
    (result, captured)
}
