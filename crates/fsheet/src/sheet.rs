#![forbid(unsafe_code)]

//! The bottom sheet state machine.
//!
//! [`BottomSheet`] turns discrete target states and continuous drags into
//! offset transitions and notifies its observers as it goes.
//!
//! # States
//!
//! The sheet rests in one of `Hidden`, `Peek`, `Half` or `Full`. While a drag
//! or a settle animation moves it, the current state is `Scrolling`; that
//! state is never announced. A stable state is announced through
//! `on_sheet_state_changed` each time it is committed after being left.
//!
//! # Settle animation
//!
//! `set_state(target, animate = true, ..)` stores a [`SettleAnimation`]. The
//! host calls [`BottomSheet::tick`] once per frame; each tick samples the
//! [`FrameClock`] and moves the sheet. The last sample lands exactly on the
//! target height and commits the target state.
//!
//! # Invariants
//!
//! 1. `on_sheet_opened` and `on_sheet_closed` alternate; neither repeats.
//! 2. Offset notifications follow the physical position frame by frame.
//! 3. The peek→half fraction sent last before reaching half is exactly 1.
//! 4. A cancelled animation never commits, and restores the state the sheet
//!    had before it started.
//! 5. After [`BottomSheet::destroy`] no observer is called again.
//! 6. Until the container is measured, `set_state` is deferred (last call
//!    wins) and replayed once geometry is valid.

use std::rc::Rc;

use fsheet_core::{
    FrameClock, GeometryModel, GestureResolver, HeightModes, SettleAnimation, SheetConfig,
    SheetState, StateChangeReason, SwipeGate, TouchSample,
};

use crate::content::ContentHandle;
use crate::error::{SheetError, SheetResult};
use crate::observer::{ObserverList, SheetObserver};

/// Offsets closer than this are considered equal.
const OFFSET_EPSILON: f32 = 1e-3;
/// Fractions closer to 0 than this are reported as 0.
const FRACTION_EPSILON: f32 = 1e-5;

#[derive(Debug, Clone, Copy)]
struct PendingState {
    state: SheetState,
    animate: bool,
    reason: StateChangeReason,
}

/// The sliding bottom sheet.
pub struct BottomSheet {
    config: SheetConfig,
    geometry: GeometryModel,
    resolver: GestureResolver,
    swipe_gate: SwipeGate,
    clock: Box<dyn FrameClock>,
    observers: ObserverList,

    current: SheetState,
    target: Option<SheetState>,
    last_stable: SheetState,
    offset: f32,
    is_open: bool,
    dragging: bool,
    settle: Option<SettleAnimation>,
    pending: Option<PendingState>,
    last_peek_to_half_sent: f32,

    content: Option<ContentHandle>,
    destroyed: bool,
}

impl BottomSheet {
    /// Create a hidden, unmeasured sheet.
    pub fn new(config: SheetConfig, clock: Box<dyn FrameClock>) -> Self {
        let geometry = GeometryModel::new(config.geometry.clone());
        let resolver = GestureResolver::new(&config.gesture);
        let swipe_gate = SwipeGate::new(&config.gesture, config.geometry.density);
        Self {
            config,
            geometry,
            resolver,
            swipe_gate,
            clock,
            observers: ObserverList::new(),
            current: SheetState::Hidden,
            target: None,
            last_stable: SheetState::Hidden,
            offset: 0.0,
            is_open: false,
            dragging: false,
            settle: None,
            pending: None,
            last_peek_to_half_sent: 0.0,
            content: None,
            destroyed: false,
        }
    }

    // -- accessors ----------------------------------------------------------

    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    pub fn geometry(&self) -> &GeometryModel {
        &self.geometry
    }

    /// Current state. `Scrolling` while a drag or settle animation is running.
    pub fn state(&self) -> SheetState {
        self.current
    }

    /// State a settle animation is heading to, if one is running.
    pub fn target_state(&self) -> Option<SheetState> {
        self.target
    }

    /// Last stable state committed.
    pub fn last_stable_state(&self) -> SheetState {
        self.last_stable
    }

    /// Whether the sheet is above Peek (showing content).
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Current height of the sheet above the bottom of the container, px.
    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_running_settle_animation(&self) -> bool {
        self.settle.is_some()
    }

    /// Whether a `set_state` is waiting for the container to be measured.
    pub fn has_pending_state(&self) -> bool {
        self.pending.is_some()
    }

    /// The state a deferred `set_state` will apply once measured.
    pub fn pending_state(&self) -> Option<SheetState> {
        self.pending.as_ref().map(|p| p.state)
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn current_content(&self) -> Option<&ContentHandle> {
        self.content.as_ref()
    }

    /// The state the current content opens to.
    pub fn opening_state(&self) -> SheetState {
        self.geometry.opening_state()
    }

    // -- observers ------------------------------------------------------------

    pub fn add_observer(&self, observer: Rc<dyn SheetObserver>) {
        if self.destroyed {
            return;
        }
        self.observers.add(observer);
    }

    pub fn remove_observer(&self, observer: &Rc<dyn SheetObserver>) -> bool {
        self.observers.remove(observer)
    }

    fn notify(&self, mut f: impl FnMut(&dyn SheetObserver)) {
        if self.destroyed {
            return;
        }
        self.observers.for_each(|o| f(o));
    }

    // -- geometry inputs ------------------------------------------------------

    /// The container was laid out at a new size.
    pub fn update_container(&mut self, width: f32, height: f32) {
        if self.destroyed {
            return;
        }
        if width == self.geometry.container_width() && height == self.geometry.container_height()
        {
            return;
        }
        self.geometry.update_container(width, height);
        self.on_layout_changed();
    }

    /// The toolbar was laid out at a new height.
    pub fn update_toolbar_height(&mut self, height: f32) {
        if self.destroyed || height == self.geometry.toolbar_height() {
            return;
        }
        self.geometry.update_toolbar_height(height);
        self.on_layout_changed();
    }

    fn on_layout_changed(&mut self) {
        if !self.geometry.is_measured() {
            return;
        }
        if let Some(pending) = self.pending.take() {
            tracing::debug!(
                target: "fsheet.sheet",
                state = pending.state.as_str(),
                animate = pending.animate,
                "replaying deferred state"
            );
            self.set_state(pending.state, pending.animate, pending.reason);
            return;
        }
        // A drag in progress keeps positioning the sheet itself.
        if self.dragging {
            return;
        }
        self.reapply_state();
    }

    /// Jump to the current (or targeted) stable state at the current ratios.
    fn reapply_state(&mut self) {
        let state = match self.target {
            Some(target) => target,
            None if self.current.is_stable() => self.current,
            None => self.resolve_release(self.offset, 0.0),
        };
        self.settle = None;
        self.set_state(state, false, StateChangeReason::None);
    }

    // -- state transitions ----------------------------------------------------

    /// Move the sheet to a stable state, animated or not.
    ///
    /// `Scrolling` is internal to the sheet: passing it trips a debug
    /// assertion and is ignored in release builds. Half on a small screen
    /// becomes Full; a state disabled by the current content's height modes
    /// is replaced by the nearest enabled one.
    pub fn set_state(&mut self, state: SheetState, animate: bool, reason: StateChangeReason) {
        debug_assert!(
            state.is_stable(),
            "set_state called with the internal Scrolling state"
        );
        if self.destroyed || !state.is_stable() {
            return;
        }
        if !self.geometry.is_measured() {
            tracing::debug!(
                target: "fsheet.sheet",
                state = state.as_str(),
                reason = reason.as_str(),
                "geometry not measured, deferring state"
            );
            self.pending = Some(PendingState {
                state,
                animate,
                reason,
            });
            return;
        }

        let state = self.coerce_state(state);
        self.target = Some(state);
        if self.settle.take().is_some() {
            tracing::trace!(target: "fsheet.sheet", to = state.as_str(), "settle animation superseded");
        }

        if animate && state != self.current {
            self.start_settle(state, reason);
        } else {
            self.set_offset(self.geometry.height_for_state(state));
            self.commit(state, reason);
            self.target = None;
        }
    }

    fn coerce_state(&self, state: SheetState) -> SheetState {
        match state {
            SheetState::Half if !self.geometry.is_state_enabled(SheetState::Half) => {
                SheetState::Full
            }
            SheetState::Peek if !self.geometry.is_state_enabled(SheetState::Peek) => {
                SheetState::Hidden
            }
            SheetState::Full if !self.geometry.is_state_enabled(SheetState::Full) => {
                if self.geometry.is_state_enabled(SheetState::Half) {
                    SheetState::Half
                } else {
                    self.geometry.min_open_state()
                }
            }
            other => other,
        }
    }

    fn start_settle(&mut self, target: SheetState, reason: StateChangeReason) {
        let duration = self.config.animation.settle_duration();
        let to_offset = self.geometry.height_for_state(target);
        if duration.is_zero() {
            self.set_offset(to_offset);
            self.commit(target, reason);
            self.target = None;
            return;
        }

        let from_state = if self.current.is_stable() {
            self.current
        } else {
            self.last_stable
        };
        let animation = SettleAnimation::new(
            self.offset,
            to_offset,
            target,
            self.clock.now(),
            duration,
        )
        .with_interpolator(self.config.animation.interpolator)
        .with_reason(reason)
        .with_from_state(from_state);

        tracing::debug!(
            target: "fsheet.sheet",
            from = from_state.as_str(),
            to = target.as_str(),
            reason = reason.as_str(),
            from_offset = self.offset,
            to_offset,
            "settle animation started"
        );

        self.settle = Some(animation);
        self.current = SheetState::Scrolling;
        if target.is_open() {
            self.open(reason);
        }
    }

    /// Advance the settle animation to the clock's current time.
    ///
    /// Returns `true` while the animation is still running.
    pub fn tick(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        let Some(animation) = self.settle.as_ref() else {
            return false;
        };
        let sample = animation.sample(self.clock.now());
        let target = animation.target();
        let reason = animation.reason();

        tracing::trace!(
            target: "fsheet.sheet",
            to = target.as_str(),
            progress = sample.progress,
            offset = sample.offset,
            "settle frame"
        );
        self.set_offset(sample.offset);
        if !sample.finished {
            return true;
        }
        self.settle = None;
        self.commit(target, reason);
        self.target = None;
        false
    }

    /// Jump a running settle animation to its end and commit its target.
    pub fn end_animation(&mut self) {
        let Some(animation) = self.settle.take() else {
            return;
        };
        if self.destroyed {
            return;
        }
        self.set_offset(animation.final_sample().offset);
        self.commit(animation.target(), animation.reason());
        self.target = None;
    }

    /// Stop a running settle animation without committing its target.
    ///
    /// The sheet keeps its current offset and goes back to the state it was
    /// in before the animation started, open flag included: cancelling an
    /// opening settle from Peek closes the sheet again. Calling this with no
    /// animation running does nothing.
    pub fn cancel_animation(&mut self) {
        let Some(animation) = self.settle.take() else {
            return;
        };
        self.current = animation.from_state();
        self.target = None;
        tracing::debug!(
            target: "fsheet.sheet",
            target_state = animation.target().as_str(),
            restored = self.current.as_str(),
            offset = self.offset,
            "settle animation cancelled"
        );
        if self.current.is_open() {
            self.open(animation.reason());
        } else {
            self.close(animation.reason());
        }
    }

    fn commit(&mut self, state: SheetState, reason: StateChangeReason) {
        if state == self.current {
            return;
        }
        let previous_stable = self.last_stable;
        self.current = state;
        self.last_stable = state;

        tracing::debug!(
            target: "fsheet.sheet",
            state = state.as_str(),
            previous = previous_stable.as_str(),
            reason = reason.as_str(),
            "state committed"
        );

        self.notify(|o| o.on_sheet_state_changed(state, reason));
        if state == SheetState::Peek && previous_stable == SheetState::Hidden {
            self.notify(|o| o.on_sheet_fully_peeked());
        }
        if state.is_open() {
            self.open(reason);
        } else {
            self.close(reason);
        }
    }

    fn open(&mut self, reason: StateChangeReason) {
        if self.is_open {
            return;
        }
        self.is_open = true;
        tracing::debug!(target: "fsheet.sheet", reason = reason.as_str(), "sheet opened");
        self.notify(|o| o.on_sheet_opened(reason));
    }

    fn close(&mut self, reason: StateChangeReason) {
        if !self.is_open {
            return;
        }
        self.is_open = false;
        tracing::debug!(target: "fsheet.sheet", reason = reason.as_str(), "sheet closed");
        self.notify(|o| o.on_sheet_closed(reason));
    }

    // -- offset ---------------------------------------------------------------

    fn set_offset(&mut self, offset: f32) {
        if (offset - self.offset).abs() < OFFSET_EPSILON {
            return;
        }
        self.offset = offset;
        self.send_offset_events();
    }

    fn send_offset_events(&mut self) {
        let offset = self.offset;

        let mut full_fraction = self.geometry.peek_to_full_fraction(offset);
        if full_fraction < FRACTION_EPSILON {
            full_fraction = 0.0;
        }
        self.notify(|o| o.on_sheet_offset_changed(full_fraction, offset));

        let mut half_fraction = self.geometry.peek_to_half_fraction(offset);
        if half_fraction < FRACTION_EPSILON {
            half_fraction = 0.0;
        }
        // Past half the fraction stays at 1, so report it only once.
        if self.last_peek_to_half_sent < 1.0 || half_fraction < 1.0 {
            self.last_peek_to_half_sent = half_fraction;
            self.notify(|o| o.on_transition_peek_to_half(half_fraction));
        }
    }

    // -- drag -----------------------------------------------------------------

    fn check_usable(&self) -> SheetResult<()> {
        if self.destroyed {
            return Err(SheetError::Destroyed);
        }
        if !self.geometry.is_measured() {
            return Err(SheetError::NotMeasured);
        }
        Ok(())
    }

    /// A drag started. Any running settle animation is dropped.
    pub fn begin_drag(&mut self) -> SheetResult<()> {
        self.check_usable()?;
        if self.dragging {
            return Err(SheetError::DragAlreadyActive);
        }
        self.dragging = true;
        self.settle = None;
        self.target = None;
        tracing::trace!(target: "fsheet.sheet", offset = self.offset, "drag started");
        Ok(())
    }

    /// Abandon a drag without resolving a resting state. The sheet stays
    /// where the drag left it until the next `set_state`.
    pub fn cancel_drag(&mut self) {
        if !self.dragging {
            return;
        }
        self.dragging = false;
        tracing::debug!(target: "fsheet.sheet", offset = self.offset, "drag cancelled");
    }

    /// The drag moved the sheet to `offset_px` (clamped to the full height).
    pub fn on_drag_update(&mut self, offset_px: f32) -> SheetResult<()> {
        self.check_usable()?;
        if !self.dragging {
            return Err(SheetError::NoDragInProgress);
        }
        let offset = self.clamp_offset(offset_px);
        self.current = SheetState::Scrolling;
        if offset > self.geometry.height_for_state(SheetState::Peek) + OFFSET_EPSILON {
            self.open(StateChangeReason::Swipe);
        }
        self.set_offset(offset);
        Ok(())
    }

    /// The drag ended at `offset_px` moving at `velocity_px_per_ms`
    /// (positive is upward). Returns the state the sheet now settles to.
    pub fn on_drag_released(
        &mut self,
        offset_px: f32,
        velocity_px_per_ms: f32,
    ) -> SheetResult<SheetState> {
        self.check_usable()?;
        if !self.dragging {
            return Err(SheetError::NoDragInProgress);
        }
        self.dragging = false;
        let offset = self.clamp_offset(offset_px);
        self.current = SheetState::Scrolling;
        self.set_offset(offset);

        let target = self.coerce_state(self.resolve_release(offset, velocity_px_per_ms));
        tracing::debug!(
            target: "fsheet.sheet",
            offset,
            velocity = velocity_px_per_ms,
            resolved = target.as_str(),
            "drag released"
        );

        self.notify(|o| o.on_sheet_released());
        self.set_state(target, true, StateChangeReason::Swipe);
        Ok(target)
    }

    fn resolve_release(&self, offset: f32, velocity: f32) -> SheetState {
        let allow_hidden = self
            .content
            .as_ref()
            .is_some_and(|c| c.swipe_to_dismiss_enabled());
        let skip_half = GestureResolver::should_skip_half(velocity, &self.geometry);
        self.resolver
            .resolve_target(offset, velocity, &self.geometry, allow_hidden, skip_half)
    }

    fn clamp_offset(&self, offset: f32) -> f32 {
        let max = self.geometry.height_for_state(SheetState::Full);
        if offset.is_nan() {
            return self.offset;
        }
        offset.clamp(0.0, max)
    }

    /// A new touch sequence began on the sheet.
    pub fn on_touch_down(&mut self) {
        self.swipe_gate.on_touch_down();
    }

    /// Whether the gesture from `initial` to `current` may move the sheet.
    pub fn should_gesture_move_sheet(&mut self, initial: TouchSample, current: TouchSample) -> bool {
        if self.destroyed {
            return false;
        }
        // A scrolled content keeps the drag for itself.
        if self.is_open
            && self
                .content
                .as_ref()
                .is_some_and(|c| c.vertical_scroll_offset() > 0.0)
        {
            return false;
        }
        let width = self.geometry.container_width();
        self.swipe_gate
            .should_move(initial, current, width, self.is_open)
    }

    // -- content and input ----------------------------------------------------

    /// Swap the content shown in the sheet. Does not change the state.
    pub fn show_content(&mut self, content: Option<ContentHandle>) {
        if self.destroyed {
            return;
        }
        let unchanged = match (&self.content, &content) {
            (Some(shown), Some(next)) => Rc::ptr_eq(shown, next),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return;
        }
        let modes = content
            .as_ref()
            .map_or_else(HeightModes::default, |c| c.height_modes());
        tracing::debug!(
            target: "fsheet.sheet",
            content = ?content.as_ref().map(|c| c.id()),
            label = content.as_ref().map_or("", |c| c.label()),
            "content changed"
        );
        self.content = content;
        self.geometry.set_height_modes(modes);
        self.notify(|o| o.on_sheet_content_changed(self.content.as_ref()));

        // New ratios: move a resting sheet onto them.
        if self.geometry.is_measured()
            && !self.dragging
            && self.settle.is_none()
            && self.current.is_stable()
        {
            self.reapply_state();
        }
    }

    /// Back press: an open sheet settles back to Peek and consumes the press.
    pub fn handle_back_press(&mut self) -> bool {
        if self.destroyed || !self.is_open {
            return false;
        }
        self.set_state(SheetState::Peek, true, StateChangeReason::BackPress);
        true
    }

    /// Tear down: drop the animation without committing, clear observers.
    /// Later calls do nothing.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.dragging = false;
        self.settle = None;
        self.pending = None;
        self.target = None;
        self.observers.clear();
        tracing::debug!(target: "fsheet.sheet", state = self.current.as_str(), "sheet destroyed");
    }
}

impl std::fmt::Debug for BottomSheet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BottomSheet")
            .field("current", &self.current)
            .field("target", &self.target)
            .field("offset", &self.offset)
            .field("is_open", &self.is_open)
            .field("dragging", &self.dragging)
            .field("settling", &self.settle.is_some())
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{EventLog, SheetEvent};
    use fsheet_core::{GeometryConfig, ManualClock};

    fn sheet() -> (BottomSheet, ManualClock, Rc<EventLog>) {
        let clock = ManualClock::new();
        let config = SheetConfig::default()
            .with_geometry(GeometryConfig::default().with_toolbar_shadow_height_px(0.0));
        let mut sheet = BottomSheet::new(config, Box::new(clock.clone()));
        let log = EventLog::shared();
        sheet.add_observer(log.clone());
        sheet.update_toolbar_height(100.0);
        sheet.update_container(600.0, 1000.0);
        log.clear();
        (sheet, clock, log)
    }

    fn run_to_end(sheet: &mut BottomSheet, clock: &ManualClock) {
        while sheet.tick() {
            clock.advance_ms(16);
        }
    }

    #[test]
    fn starts_hidden_and_closed() {
        let (sheet, _, log) = sheet();
        assert_eq!(sheet.state(), SheetState::Hidden);
        assert_eq!(sheet.target_state(), None);
        assert!(!sheet.is_open());
        assert!(log.is_empty());
    }

    #[test]
    fn immediate_set_state_commits_synchronously() {
        let (mut sheet, _, log) = sheet();
        sheet.set_state(SheetState::Half, false, StateChangeReason::None);
        assert_eq!(sheet.state(), SheetState::Half);
        assert!((sheet.offset() - 550.0).abs() < 1e-3);
        assert_eq!(
            log.lifecycle(),
            vec![
                SheetEvent::StateChanged(SheetState::Half, StateChangeReason::None),
                SheetEvent::Opened(StateChangeReason::None),
            ]
        );
    }

    #[test]
    fn animated_set_state_scrolls_then_commits() {
        let (mut sheet, clock, log) = sheet();
        sheet.set_state(SheetState::Peek, true, StateChangeReason::Startup);
        assert_eq!(sheet.state(), SheetState::Scrolling);
        assert_eq!(sheet.target_state(), Some(SheetState::Peek));
        assert!(sheet.is_running_settle_animation());
        assert!(log.lifecycle().is_empty());

        clock.advance_ms(100);
        assert!(sheet.tick());
        assert!(sheet.offset() > 0.0 && sheet.offset() < 100.0);

        clock.advance_ms(200);
        assert!(!sheet.tick());
        assert_eq!(sheet.state(), SheetState::Peek);
        assert_eq!(sheet.offset(), sheet.geometry().height_for_state(SheetState::Peek));
        assert_eq!(sheet.target_state(), None);
        assert_eq!(
            log.lifecycle(),
            vec![
                SheetEvent::StateChanged(SheetState::Peek, StateChangeReason::Startup),
                SheetEvent::FullyPeeked,
            ]
        );
    }

    #[test]
    fn opening_animation_announces_open_at_start() {
        let (mut sheet, clock, log) = sheet();
        sheet.set_state(SheetState::Peek, false, StateChangeReason::None);
        log.clear();
        sheet.set_state(SheetState::Full, true, StateChangeReason::Swipe);
        assert!(sheet.is_open());
        assert_eq!(log.lifecycle(), vec![SheetEvent::Opened(StateChangeReason::Swipe)]);
        run_to_end(&mut sheet, &clock);
        assert_eq!(sheet.state(), SheetState::Full);
    }

    #[test]
    fn repeated_peek_never_refires_closed() {
        let (mut sheet, clock, log) = sheet();
        sheet.set_state(SheetState::Half, false, StateChangeReason::None);
        sheet.set_state(SheetState::Peek, false, StateChangeReason::None);
        sheet.set_state(SheetState::Peek, false, StateChangeReason::None);
        sheet.set_state(SheetState::Peek, true, StateChangeReason::None);
        run_to_end(&mut sheet, &clock);
        let closed = log
            .snapshot()
            .iter()
            .filter(|e| matches!(e, SheetEvent::Closed(_)))
            .count();
        assert_eq!(closed, 1);
    }

    #[test]
    fn small_screen_coerces_half_to_full() {
        let (mut sheet, _, _) = sheet();
        sheet.update_container(600.0, 300.0);
        sheet.set_state(SheetState::Half, false, StateChangeReason::None);
        assert_eq!(sheet.state(), SheetState::Full);
    }

    #[test]
    fn layout_change_moves_half_to_full_on_small_screen() {
        let (mut sheet, _, _) = sheet();
        sheet.set_state(SheetState::Half, false, StateChangeReason::None);
        sheet.update_container(600.0, 300.0);
        assert_eq!(sheet.state(), SheetState::Full);
        assert!((sheet.offset() - 300.0).abs() < 1e-3);
    }

    #[test]
    fn unmeasured_set_state_is_deferred() {
        let clock = ManualClock::new();
        let mut sheet = BottomSheet::new(SheetConfig::default(), Box::new(clock));
        sheet.set_state(SheetState::Half, false, StateChangeReason::Startup);
        assert!(sheet.has_pending_state());
        assert_eq!(sheet.state(), SheetState::Hidden);

        sheet.update_toolbar_height(56.0);
        assert!(sheet.has_pending_state());
        sheet.update_container(600.0, 1000.0);
        assert!(!sheet.has_pending_state());
        assert_eq!(sheet.state(), SheetState::Half);
    }

    #[test]
    fn unmeasured_drag_is_an_error() {
        let mut sheet = BottomSheet::new(SheetConfig::default(), Box::new(ManualClock::new()));
        assert_eq!(sheet.begin_drag(), Err(SheetError::NotMeasured));
    }

    #[test]
    fn drag_api_misuse_is_reported() {
        let (mut sheet, _, _) = sheet();
        assert_eq!(sheet.on_drag_update(10.0), Err(SheetError::NoDragInProgress));
        assert_eq!(
            sheet.on_drag_released(10.0, 0.0),
            Err(SheetError::NoDragInProgress)
        );
        sheet.begin_drag().unwrap();
        assert_eq!(sheet.begin_drag(), Err(SheetError::DragAlreadyActive));
    }

    #[test]
    fn cancel_restores_pre_animation_state() {
        let (mut sheet, clock, log) = sheet();
        sheet.set_state(SheetState::Peek, false, StateChangeReason::None);
        log.clear();
        sheet.set_state(SheetState::Full, true, StateChangeReason::None);
        clock.advance_ms(50);
        sheet.tick();
        sheet.cancel_animation();
        sheet.cancel_animation();

        assert_eq!(sheet.state(), SheetState::Peek);
        assert_eq!(sheet.target_state(), None);
        assert!(!sheet.is_running_settle_animation());
        assert!(!sheet.is_open());
        assert_eq!(
            log.lifecycle(),
            vec![
                SheetEvent::Opened(StateChangeReason::None),
                SheetEvent::Closed(StateChangeReason::None),
            ]
        );
        assert!(!sheet.handle_back_press());
    }

    #[test]
    fn cancelling_a_closing_settle_stays_open() {
        let (mut sheet, clock, log) = sheet();
        sheet.set_state(SheetState::Full, false, StateChangeReason::None);
        log.clear();
        sheet.set_state(SheetState::Peek, true, StateChangeReason::None);
        clock.advance_ms(50);
        sheet.tick();
        sheet.cancel_animation();

        assert_eq!(sheet.state(), SheetState::Full);
        assert!(sheet.is_open());
        assert!(log.lifecycle().is_empty());
    }

    #[test]
    fn cancel_drag_frees_the_gesture() {
        let (mut sheet, _, _) = sheet();
        sheet.set_state(SheetState::Peek, false, StateChangeReason::None);
        sheet.begin_drag().unwrap();
        sheet.on_drag_update(300.0).unwrap();
        sheet.cancel_drag();
        assert!(!sheet.is_dragging());
        assert_eq!(
            sheet.on_drag_released(300.0, 0.0),
            Err(SheetError::NoDragInProgress)
        );
        sheet.set_state(SheetState::Peek, false, StateChangeReason::None);
        assert_eq!(sheet.state(), SheetState::Peek);
        assert!(!sheet.is_open());
        assert_eq!(sheet.begin_drag(), Ok(()));
    }

    #[test]
    fn showing_the_same_content_again_is_silent() {
        let (mut sheet, _, log) = sheet();
        let content = crate::content::SheetContent::builder(crate::content::ViewId(3)).build();
        sheet.show_content(Some(Rc::clone(&content)));
        sheet.show_content(Some(Rc::clone(&content)));
        sheet.show_content(None);
        sheet.show_content(None);
        let changes: Vec<_> = log
            .snapshot()
            .into_iter()
            .filter(|e| matches!(e, SheetEvent::ContentChanged(_)))
            .collect();
        assert_eq!(
            changes,
            vec![
                SheetEvent::ContentChanged(Some(content.id())),
                SheetEvent::ContentChanged(None),
            ]
        );
    }

    #[test]
    fn end_animation_commits_target() {
        let (mut sheet, _, _) = sheet();
        sheet.set_state(SheetState::Half, true, StateChangeReason::None);
        sheet.end_animation();
        assert_eq!(sheet.state(), SheetState::Half);
        assert!((sheet.offset() - 550.0).abs() < 1e-3);
    }

    #[test]
    fn zero_duration_commits_immediately() {
        let config = SheetConfig::default().with_animation(
            fsheet_core::AnimationConfig::default().with_settle_duration_ms(0),
        );
        let mut sheet = BottomSheet::new(config, Box::new(ManualClock::new()));
        sheet.update_container(600.0, 1000.0);
        sheet.set_state(SheetState::Full, true, StateChangeReason::None);
        assert_eq!(sheet.state(), SheetState::Full);
        assert!(!sheet.is_running_settle_animation());
    }

    #[test]
    fn back_press_only_when_open() {
        let (mut sheet, clock, _) = sheet();
        sheet.set_state(SheetState::Peek, false, StateChangeReason::None);
        assert!(!sheet.handle_back_press());
        sheet.set_state(SheetState::Full, false, StateChangeReason::None);
        assert!(sheet.handle_back_press());
        run_to_end(&mut sheet, &clock);
        assert_eq!(sheet.state(), SheetState::Peek);
    }

    #[test]
    #[should_panic(expected = "Scrolling")]
    #[cfg(debug_assertions)]
    fn scrolling_target_asserts_in_debug() {
        let (mut sheet, _, _) = sheet();
        sheet.set_state(SheetState::Scrolling, false, StateChangeReason::None);
    }

    #[test]
    fn destroy_is_idempotent_and_silences_observers() {
        let (mut sheet, clock, log) = sheet();
        sheet.set_state(SheetState::Half, true, StateChangeReason::None);
        log.clear();
        sheet.destroy();
        sheet.destroy();
        clock.advance_ms(500);
        assert!(!sheet.tick());
        sheet.set_state(SheetState::Full, false, StateChangeReason::None);
        assert!(sheet.is_destroyed());
        assert!(log.lifecycle().is_empty());
    }
}
