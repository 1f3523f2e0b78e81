#![forbid(unsafe_code)]

//! Sheet observers and the recording [`EventLog`].
//!
//! Observers are shared `Rc<dyn SheetObserver>` handles held in registration
//! order. Dispatch always works on a snapshot of the list, so an observer
//! added or removed during a notification only affects later ones.
//!
//! Every method has an empty default body; implement only what you need.
//! Observers receive `&self` and have no handle back to the sheet, so they
//! cannot re-enter it. Anything that must react by driving the sheet reads
//! an [`EventLog`] after the call returns.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use fsheet_core::{SheetState, StateChangeReason};

use crate::content::{ContentHandle, ContentId};

/// Receives bottom sheet lifecycle notifications.
pub trait SheetObserver {
    /// The sheet crossed above Peek.
    fn on_sheet_opened(&self, _reason: StateChangeReason) {}

    /// The sheet came back down to Peek or below.
    fn on_sheet_closed(&self, _reason: StateChangeReason) {}

    /// The user let go of a drag; fired before the settle animation starts.
    fn on_sheet_released(&self) {}

    /// A stable state was committed.
    fn on_sheet_state_changed(&self, _state: SheetState, _reason: StateChangeReason) {}

    /// The sheet moved. `height_fraction` is the peek→full progress in `[0, 1]`.
    fn on_sheet_offset_changed(&self, _height_fraction: f32, _offset_px: f32) {}

    /// Peek→half progress in `[0, 1]`; the last value before reaching half is 1.
    fn on_transition_peek_to_half(&self, _fraction: f32) {}

    /// The sheet reached Peek coming up from Hidden.
    fn on_sheet_fully_peeked(&self) {}

    /// The sheet now shows `content` (or nothing).
    fn on_sheet_content_changed(&self, _content: Option<&ContentHandle>) {}
}

/// Ordered list of observers with snapshot dispatch.
#[derive(Default)]
pub struct ObserverList {
    observers: RefCell<Vec<Rc<dyn SheetObserver>>>,
}

impl ObserverList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer. Adding the same handle twice is a no-op.
    pub fn add(&self, observer: Rc<dyn SheetObserver>) {
        let mut observers = self.observers.borrow_mut();
        if !observers.iter().any(|o| same_observer(o, &observer)) {
            observers.push(observer);
        }
    }

    /// Unregister an observer. Returns whether it was present.
    pub fn remove(&self, observer: &Rc<dyn SheetObserver>) -> bool {
        let mut observers = self.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|o| !same_observer(o, observer));
        observers.len() != before
    }

    pub fn len(&self) -> usize {
        self.observers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.observers.borrow_mut().clear();
    }

    /// Copy of the current list, taken before every dispatch.
    pub fn snapshot(&self) -> Vec<Rc<dyn SheetObserver>> {
        self.observers.borrow().clone()
    }

    /// Call `f` on each observer registered at the time of the call.
    pub fn for_each(&self, mut f: impl FnMut(&dyn SheetObserver)) {
        for observer in self.snapshot() {
            f(observer.as_ref());
        }
    }
}

impl std::fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverList")
            .field("len", &self.len())
            .finish()
    }
}

fn same_observer(a: &Rc<dyn SheetObserver>, b: &Rc<dyn SheetObserver>) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

// ---------------------------------------------------------------------------
// Event log
// ---------------------------------------------------------------------------

/// Owned copy of one observer notification.
#[derive(Debug, Clone, PartialEq)]
pub enum SheetEvent {
    Opened(StateChangeReason),
    Closed(StateChangeReason),
    Released,
    StateChanged(SheetState, StateChangeReason),
    OffsetChanged { height_fraction: f32, offset_px: f32 },
    PeekToHalf(f32),
    FullyPeeked,
    ContentChanged(Option<ContentId>),
}

impl SheetEvent {
    /// Whether this is a lifecycle event rather than a per-frame one.
    pub fn is_lifecycle(&self) -> bool {
        !matches!(self, Self::OffsetChanged { .. } | Self::PeekToHalf(_))
    }
}

/// Observer that records every notification in order.
#[derive(Debug, Default)]
pub struct EventLog {
    events: RefCell<VecDeque<SheetEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle ready to register on a sheet.
    pub fn shared() -> Rc<Self> {
        Rc::new(Self::new())
    }

    fn push(&self, event: SheetEvent) {
        self.events.borrow_mut().push_back(event);
    }

    /// Oldest unread event.
    pub fn pop(&self) -> Option<SheetEvent> {
        self.events.borrow_mut().pop_front()
    }

    /// Remove and return all recorded events.
    pub fn drain(&self) -> Vec<SheetEvent> {
        self.events.borrow_mut().drain(..).collect()
    }

    /// Recorded events, left in place.
    pub fn snapshot(&self) -> Vec<SheetEvent> {
        self.events.borrow().iter().cloned().collect()
    }

    /// Recorded lifecycle events, skipping per-frame offset events.
    pub fn lifecycle(&self) -> Vec<SheetEvent> {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.is_lifecycle())
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl SheetObserver for EventLog {
    fn on_sheet_opened(&self, reason: StateChangeReason) {
        self.push(SheetEvent::Opened(reason));
    }

    fn on_sheet_closed(&self, reason: StateChangeReason) {
        self.push(SheetEvent::Closed(reason));
    }

    fn on_sheet_released(&self) {
        self.push(SheetEvent::Released);
    }

    fn on_sheet_state_changed(&self, state: SheetState, reason: StateChangeReason) {
        self.push(SheetEvent::StateChanged(state, reason));
    }

    fn on_sheet_offset_changed(&self, height_fraction: f32, offset_px: f32) {
        self.push(SheetEvent::OffsetChanged {
            height_fraction,
            offset_px,
        });
    }

    fn on_transition_peek_to_half(&self, fraction: f32) {
        self.push(SheetEvent::PeekToHalf(fraction));
    }

    fn on_sheet_fully_peeked(&self) {
        self.push(SheetEvent::FullyPeeked);
    }

    fn on_sheet_content_changed(&self, content: Option<&ContentHandle>) {
        self.push(SheetEvent::ContentChanged(content.map(|c| c.id())));
    }
}
