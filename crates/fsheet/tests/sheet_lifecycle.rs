//! State machine lifecycle through the controller: settles, drags,
//! notifications and layout changes.

mod common;

use common::{FULL, HALF, Harness, PEEK, content, content_with_flags, is_current};
use fsheet::{
    BottomSheetController, ContentFlags, ContentPriority, SheetError, SheetEvent, SheetState,
    StateChangeReason, TouchSample,
};
use fsheet_core::ManualClock;
use std::time::Duration;

fn open_and_close_events(h: &Harness) -> Vec<SheetEvent> {
    h.log
        .snapshot()
        .into_iter()
        .filter(|e| matches!(e, SheetEvent::Opened(_) | SheetEvent::Closed(_)))
        .collect()
}

fn peek_to_half_values(h: &Harness) -> Vec<f32> {
    h.log
        .snapshot()
        .into_iter()
        .filter_map(|e| match e {
            SheetEvent::PeekToHalf(f) => Some(f),
            _ => None,
        })
        .collect()
}

/// Harness with one low-priority content resting at Peek and a clean log.
fn at_peek() -> Harness {
    let mut h = Harness::new();
    let a = content(1, ContentPriority::Low);
    assert!(h.controller.request_show(a, true));
    h.run_to_end();
    assert_eq!(h.controller.sheet().state(), SheetState::Peek);
    h.log.clear();
    h
}

#[test]
fn first_content_settles_to_peek() {
    let mut h = Harness::new();
    let a = content(1, ContentPriority::Low);
    h.controller.request_show(a.clone(), true);

    assert_eq!(h.controller.sheet().state(), SheetState::Scrolling);
    assert!(h.controller.sheet().is_running_settle_animation());
    h.run_to_end();

    let sheet = h.controller.sheet();
    assert_eq!(sheet.state(), SheetState::Peek);
    assert_eq!(sheet.offset(), PEEK);
    assert!(!sheet.is_open());
    assert_eq!(
        h.lifecycle(),
        vec![
            SheetEvent::ContentChanged(Some(a.id())),
            SheetEvent::StateChanged(SheetState::Peek, StateChangeReason::None),
            SheetEvent::FullyPeeked,
        ]
    );
}

#[test]
fn offsets_track_the_settle_frame_by_frame() {
    let mut h = at_peek();
    h.controller
        .set_state(SheetState::Full, true, StateChangeReason::None);
    h.run_to_end();

    let offsets: Vec<f32> = h
        .log
        .snapshot()
        .into_iter()
        .filter_map(|e| match e {
            SheetEvent::OffsetChanged { offset_px, .. } => Some(offset_px),
            _ => None,
        })
        .collect();
    assert!(offsets.len() > 2);
    assert!(offsets.windows(2).all(|w| w[0] < w[1]), "{offsets:?}");
    assert_eq!(offsets.last().copied(), Some(FULL));
}

#[test]
fn drag_from_peek_to_half_ends_on_exactly_one() {
    let mut h = at_peek();
    let target = h.drag(400.0, 0.0);
    assert_eq!(target, SheetState::Half);
    h.run_to_end();

    assert_eq!(h.controller.sheet().state(), SheetState::Half);
    assert_eq!(h.controller.sheet().offset(), HALF);
    let values = peek_to_half_values(&h);
    assert_eq!(values.last().copied(), Some(1.0));
    assert_eq!(
        h.lifecycle(),
        vec![
            SheetEvent::Opened(StateChangeReason::Swipe),
            SheetEvent::Released,
            SheetEvent::StateChanged(SheetState::Half, StateChangeReason::Swipe),
        ]
    );
}

#[test]
fn peek_to_half_reported_once_above_half() {
    let mut h = at_peek();
    h.controller
        .set_state(SheetState::Full, true, StateChangeReason::None);
    h.run_to_end();

    let values = peek_to_half_values(&h);
    let ones = values.iter().filter(|&&v| v == 1.0).count();
    assert_eq!(ones, 1, "{values:?}");
}

#[test]
fn opened_and_closed_alternate() {
    let mut h = at_peek();
    for state in [
        SheetState::Half,
        SheetState::Full,
        SheetState::Half,
        SheetState::Peek,
        SheetState::Full,
        SheetState::Peek,
    ] {
        h.controller.set_state(state, true, StateChangeReason::None);
        h.run_to_end();
    }
    let events = open_and_close_events(&h);
    assert_eq!(events.len(), 4);
    for pair in events.chunks(2) {
        assert!(matches!(pair[0], SheetEvent::Opened(_)));
        assert!(matches!(pair[1], SheetEvent::Closed(_)));
    }
}

#[test]
fn back_press_settles_open_sheet_to_peek() {
    let mut h = at_peek();
    assert!(!h.controller.handle_back_press());

    h.controller.expand();
    h.run_to_end();
    assert_eq!(h.controller.sheet().state(), SheetState::Half);

    assert!(h.controller.handle_back_press());
    h.run_to_end();
    assert_eq!(h.controller.sheet().state(), SheetState::Peek);
    assert!(
        h.log
            .snapshot()
            .contains(&SheetEvent::Closed(StateChangeReason::BackPress))
    );
}

#[test]
fn set_state_before_measurement_is_replayed_last_wins() {
    let clock = ManualClock::new();
    let mut controller = BottomSheetController::new(common::config(), Box::new(clock));
    controller.set_state(SheetState::Half, false, StateChangeReason::None);
    controller.set_state(SheetState::Full, false, StateChangeReason::Startup);
    assert!(controller.sheet().has_pending_state());
    assert_eq!(controller.sheet().state(), SheetState::Hidden);

    controller.update_toolbar_height(PEEK);
    assert!(controller.sheet().has_pending_state());
    controller.update_container(600.0, FULL);

    assert!(!controller.sheet().has_pending_state());
    assert_eq!(controller.sheet().state(), SheetState::Full);
    assert_eq!(controller.sheet().offset(), FULL);
}

#[test]
fn cancelled_settle_never_commits() {
    let mut h = at_peek();
    h.controller
        .set_state(SheetState::Full, true, StateChangeReason::None);
    h.clock.advance(Duration::from_millis(50));
    assert!(h.controller.tick());
    let mid = h.controller.sheet().offset();
    assert!(mid > PEEK && mid < FULL);

    h.controller.cancel_animation();
    assert_eq!(h.controller.sheet().state(), SheetState::Peek);
    assert_eq!(h.controller.sheet().offset(), mid);
    assert!(!h.controller.sheet().is_open());
    assert!(
        h.log
            .snapshot()
            .contains(&SheetEvent::Closed(StateChangeReason::None))
    );
    assert!(!h.controller.tick());
    assert!(
        !h.log
            .snapshot()
            .iter()
            .any(|e| matches!(e, SheetEvent::StateChanged(SheetState::Full, _)))
    );
}

#[test]
fn end_animation_commits_target() {
    let mut h = at_peek();
    h.controller
        .set_state(SheetState::Full, true, StateChangeReason::None);
    h.controller.end_animation();
    assert_eq!(h.controller.sheet().state(), SheetState::Full);
    assert_eq!(h.controller.sheet().offset(), FULL);
    assert!(!h.controller.sheet().is_running_settle_animation());
}

#[test]
fn layout_change_moves_resting_sheet_to_new_height() {
    let mut h = at_peek();
    h.controller.expand();
    h.run_to_end();

    h.controller.update_container(600.0, 2000.0);
    assert_eq!(h.controller.sheet().state(), SheetState::Half);
    assert_eq!(h.controller.sheet().offset(), 1100.0);
}

#[test]
fn half_becomes_full_on_small_screen() {
    let mut h = at_peek();
    h.controller.expand();
    h.run_to_end();

    // Full - Half = 0.45 * 300 = 135px, under the 160px minimum.
    h.controller.update_container(600.0, 300.0);
    assert!(h.controller.sheet().geometry().is_small_screen());
    assert_eq!(h.controller.sheet().state(), SheetState::Full);
    assert_eq!(h.controller.sheet().offset(), 300.0);
}

#[test]
fn swipe_to_dismiss_hides_and_retires_content() {
    let mut h = Harness::new();
    let a = content_with_flags(1, ContentPriority::Low, ContentFlags::SWIPE_TO_DISMISS);
    h.controller.request_show(a.clone(), false);
    assert_eq!(h.controller.sheet().state(), SheetState::Peek);

    assert_eq!(h.drag(40.0, -1.0), SheetState::Hidden);
    h.run_to_end();
    assert_eq!(h.controller.sheet().state(), SheetState::Hidden);
    assert!(a.is_destroyed());
    assert!(h.controller.current_content().is_none());
}

#[test]
fn downward_release_without_dismiss_stays_at_peek() {
    let mut h = at_peek();
    assert_eq!(h.drag(40.0, -1.0), SheetState::Peek);
    h.run_to_end();
    assert_eq!(h.controller.sheet().offset(), PEEK);
}

#[test]
fn drag_api_misuse_is_reported() {
    let mut h = at_peek();
    assert_eq!(
        h.controller.drag_update(200.0),
        Err(SheetError::NoDragInProgress)
    );
    h.controller.begin_drag().unwrap();
    assert_eq!(h.controller.begin_drag(), Err(SheetError::DragAlreadyActive));
    assert!(h.controller.sheet().is_dragging());
}

#[test]
fn scrolled_content_keeps_gesture_when_open() {
    let mut h = Harness::new();
    let a = content(1, ContentPriority::Low);
    h.controller.request_show(a.clone(), false);
    let down = TouchSample::new(300.0, 900.0, Duration::ZERO);
    let up = TouchSample::new(300.0, 800.0, Duration::from_millis(100));

    h.controller.on_touch_down();
    assert!(h.controller.should_gesture_move_sheet(down, up));

    h.controller.expand();
    h.run_to_end();
    a.set_vertical_scroll_offset(24.0);
    assert!(!h.controller.should_gesture_move_sheet(down, up));
    a.set_vertical_scroll_offset(0.0);
    assert!(h.controller.should_gesture_move_sheet(down, up));
    assert!(is_current(&h.controller, &a));
}
