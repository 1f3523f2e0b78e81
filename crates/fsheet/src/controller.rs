#![forbid(unsafe_code)]

//! The public face of the bottom sheet.
//!
//! [`BottomSheetController`] owns the state machine, the content arbiter,
//! the suppression coordinator and the shared scrim, and is the only thing
//! features and hosts talk to.
//!
//! # Event pump
//!
//! The controller registers an [`EventLog`] on its sheet. After every
//! public call it drains the log and routes the lifecycle events the
//! arbiter cares about:
//!
//! | Event                      | Reaction                               |
//! |----------------------------|----------------------------------------|
//! | `StateChanged(Hidden, _)`  | [`ContentArbiter::on_sheet_hidden`]    |
//! | `Closed(_)`                | [`ContentArbiter::on_sheet_closed`]    |
//!
//! Reactions may drive the sheet again; their events are drained in the
//! next round. Nothing reacts from inside an observer callback.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use fsheet::{BottomSheetController, ContentPriority, SheetContent, ViewId};
//! use fsheet_core::{ManualClock, SheetConfig, SheetState};
//!
//! let clock = ManualClock::new();
//! let mut controller = BottomSheetController::new(SheetConfig::default(), Box::new(clock.clone()));
//! controller.update_toolbar_height(56.0);
//! controller.update_container(400.0, 800.0);
//!
//! let downloads = SheetContent::builder(ViewId(1))
//!     .label("downloads")
//!     .priority(ContentPriority::Low)
//!     .build();
//! assert!(controller.request_show(Rc::clone(&downloads), true));
//!
//! clock.advance_ms(300);
//! controller.tick();
//! assert_eq!(controller.sheet().state(), SheetState::Peek);
//! ```

use std::rc::Rc;

use fsheet_core::{FrameClock, SheetConfig, SheetState, StateChangeReason, SystemClock, TouchSample};

use crate::arbiter::ContentArbiter;
use crate::content::ContentHandle;
use crate::error::{SheetError, SheetResult};
use crate::observer::{EventLog, SheetEvent, SheetObserver};
use crate::scrim::Scrim;
use crate::sheet::BottomSheet;
use crate::suppression::{SuppressionCoordinator, SuppressionToken};

/// Upper bound on pump rounds; each round is one reaction to the previous.
const MAX_PUMP_ROUNDS: usize = 32;

/// Bottom sheet with content arbitration and suppression.
pub struct BottomSheetController {
    sheet: BottomSheet,
    arbiter: ContentArbiter,
    suppression: SuppressionCoordinator,
    events: Rc<EventLog>,
    scrim: Rc<Scrim>,
    destroyed: bool,
}

impl BottomSheetController {
    pub fn new(config: SheetConfig, clock: Box<dyn FrameClock>) -> Self {
        let sheet = BottomSheet::new(config, clock);
        let events = EventLog::shared();
        let scrim = Rc::new(Scrim::default());
        sheet.add_observer(events.clone());
        sheet.add_observer(scrim.clone());
        Self {
            sheet,
            arbiter: ContentArbiter::new(),
            suppression: SuppressionCoordinator::new(),
            events,
            scrim,
            destroyed: false,
        }
    }

    /// Controller driven by the wall clock.
    pub fn with_system_clock(config: SheetConfig) -> Self {
        Self::new(config, Box::new(SystemClock::new()))
    }

    pub fn sheet(&self) -> &BottomSheet {
        &self.sheet
    }

    pub fn scrim(&self) -> &Scrim {
        &self.scrim
    }

    pub fn current_content(&self) -> Option<&ContentHandle> {
        self.sheet.current_content()
    }

    /// Number of contents waiting for the sheet.
    pub fn queued_count(&self) -> usize {
        self.arbiter.queue().len()
    }

    /// Waiting contents in the order they will be shown.
    pub fn queued_contents(&self) -> impl Iterator<Item = &ContentHandle> {
        self.arbiter.queue().iter()
    }

    pub fn is_queued(&self, content: &ContentHandle) -> bool {
        self.arbiter.queue().contains(content)
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppression.is_suppressed()
    }

    /// Whether a content hide is waiting for the sheet to reach Hidden.
    pub fn is_hiding_content(&self) -> bool {
        self.arbiter.is_processing_hide()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn add_observer(&self, observer: Rc<dyn SheetObserver>) {
        self.sheet.add_observer(observer);
    }

    pub fn remove_observer(&self, observer: &Rc<dyn SheetObserver>) -> bool {
        self.sheet.remove_observer(observer)
    }

    // -- pump -----------------------------------------------------------------

    fn pump(&mut self) {
        self.drain_events();
        let suppressed = self.suppression.is_suppressed();
        self.arbiter.on_sheet_settled(&mut self.sheet, suppressed);
        self.drain_events();
    }

    fn drain_events(&mut self) {
        for _ in 0..MAX_PUMP_ROUNDS {
            let events = self.events.drain();
            if events.is_empty() {
                return;
            }
            for event in events {
                match event {
                    SheetEvent::StateChanged(SheetState::Hidden, _) => {
                        let suppressed = self.suppression.is_suppressed();
                        self.arbiter.on_sheet_hidden(&mut self.sheet, suppressed);
                    }
                    SheetEvent::Closed(_) => self.arbiter.on_sheet_closed(&mut self.sheet),
                    _ => {}
                }
            }
        }
        tracing::warn!(
            target: "fsheet.controller",
            pending = self.events.len(),
            "event pump did not settle"
        );
        self.events.clear();
    }

    // -- geometry -------------------------------------------------------------

    pub fn update_container(&mut self, width: f32, height: f32) {
        self.sheet.update_container(width, height);
        self.pump();
    }

    pub fn update_toolbar_height(&mut self, height: f32) {
        self.sheet.update_toolbar_height(height);
        self.pump();
    }

    // -- content --------------------------------------------------------------

    /// Ask for `content` to be shown. See [`ContentArbiter::request_show`].
    pub fn request_show(&mut self, content: ContentHandle, animate: bool) -> bool {
        if self.destroyed {
            return false;
        }
        let suppressed = self.suppression.is_suppressed();
        let shown = self
            .arbiter
            .request_show(&mut self.sheet, content, animate, suppressed);
        self.pump();
        shown
    }

    /// Withdraw `content`, hiding the sheet if it is the current one.
    pub fn hide_content(&mut self, content: &ContentHandle, animate: bool) {
        if self.destroyed {
            return;
        }
        let suppressed = self.suppression.is_suppressed();
        self.arbiter
            .hide_content(&mut self.sheet, content, animate, suppressed);
        self.pump();
    }

    /// Open the current content to Half.
    pub fn expand(&mut self) {
        if self.destroyed || self.suppression.is_suppressed() {
            return;
        }
        self.arbiter.expand(&mut self.sheet);
        self.pump();
    }

    /// Move the sheet directly. Ignored while suppressed, except for Hidden.
    pub fn set_state(&mut self, state: SheetState, animate: bool, reason: StateChangeReason) {
        if self.destroyed || (self.suppression.is_suppressed() && state != SheetState::Hidden) {
            return;
        }
        self.sheet.set_state(state, animate, reason);
        self.pump();
    }

    // -- frames and gestures --------------------------------------------------

    /// Advance the settle animation. Returns `true` while it is running.
    pub fn tick(&mut self) -> bool {
        let running = self.sheet.tick();
        self.pump();
        running
    }

    pub fn end_animation(&mut self) {
        self.sheet.end_animation();
        self.pump();
    }

    pub fn cancel_animation(&mut self) {
        self.sheet.cancel_animation();
        self.pump();
    }

    pub fn on_touch_down(&mut self) {
        self.sheet.on_touch_down();
    }

    pub fn should_gesture_move_sheet(&mut self, initial: TouchSample, current: TouchSample) -> bool {
        if self.suppression.is_suppressed() {
            return false;
        }
        self.sheet.should_gesture_move_sheet(initial, current)
    }

    pub fn begin_drag(&mut self) -> SheetResult<()> {
        self.check_interactive()?;
        let result = self.sheet.begin_drag();
        self.pump();
        result
    }

    pub fn drag_update(&mut self, offset_px: f32) -> SheetResult<()> {
        self.check_interactive()?;
        let result = self.sheet.on_drag_update(offset_px);
        self.pump();
        result
    }

    pub fn drag_released(&mut self, offset_px: f32, velocity_px_per_ms: f32) -> SheetResult<SheetState> {
        self.check_interactive()?;
        let result = self.sheet.on_drag_released(offset_px, velocity_px_per_ms);
        self.pump();
        result
    }

    fn check_interactive(&self) -> SheetResult<()> {
        if self.destroyed {
            return Err(SheetError::Destroyed);
        }
        if self.suppression.is_suppressed() {
            return Err(SheetError::Suppressed);
        }
        Ok(())
    }

    /// Back press. Returns whether the sheet consumed it.
    pub fn handle_back_press(&mut self) -> bool {
        if self.destroyed || self.suppression.is_suppressed() {
            return false;
        }
        let handled = self.sheet.handle_back_press();
        self.pump();
        handled
    }

    /// The scrim was tapped. A visible scrim settles the sheet to Peek.
    pub fn on_scrim_tapped(&mut self) -> bool {
        if self.destroyed || !self.scrim.is_visible() {
            return false;
        }
        self.sheet
            .set_state(SheetState::Peek, true, StateChangeReason::TapScrim);
        self.pump();
        true
    }

    // -- suppression ----------------------------------------------------------

    /// Force the sheet hidden until the token is handed back.
    pub fn suppress(&mut self, reason: StateChangeReason) -> SuppressionToken {
        let token = self.suppression.suppress(&mut self.sheet, reason);
        self.pump();
        token
    }

    /// Release a suppression token. Returns whether the sheet came back.
    pub fn unsuppress(&mut self, token: SuppressionToken) -> bool {
        if self.destroyed {
            return false;
        }
        let released = self
            .suppression
            .unsuppress(token, &mut self.sheet, &mut self.arbiter);
        self.pump();
        released
    }

    /// The anchor (active tab or host surface) appeared or went away.
    ///
    /// Losing it suppresses the sheet and refuses new requests; getting it
    /// back lifts that suppression if nothing else holds it.
    pub fn set_anchor_available(&mut self, available: bool) {
        if self.destroyed || available == self.arbiter.anchor_present() {
            return;
        }
        self.arbiter.set_anchor_present(available);
        if available {
            self.suppression
                .on_anchor_restored(&mut self.sheet, &mut self.arbiter);
        } else {
            self.suppression.on_anchor_lost(&mut self.sheet);
        }
        self.pump();
    }

    // -- teardown -------------------------------------------------------------

    /// Stop everything: no more notifications, contents without a custom
    /// lifecycle are destroyed. Later calls do nothing.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        let current = self.sheet.current_content().cloned();
        let current_id = current.as_ref().map(|c| c.id());
        self.sheet.destroy();
        self.events.clear();
        self.arbiter.evict_all(current);
        tracing::debug!(
            target: "fsheet.controller",
            current = ?current_id,
            "controller destroyed"
        );
    }
}

impl std::fmt::Debug for BottomSheetController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BottomSheetController")
            .field("sheet", &self.sheet)
            .field("queued", &self.arbiter.queue().len())
            .field("suppressed", &self.suppression.is_suppressed())
            .field("destroyed", &self.destroyed)
            .finish()
    }
}
