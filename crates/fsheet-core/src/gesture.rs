#![forbid(unsafe_code)]

//! Gesture resolution: where a released drag settles, and whether a
//! gesture on a closed sheet may move it at all.
//!
//! # Sign convention
//!
//! Offsets are measured upward from the bottom of the container. A positive
//! velocity moves the sheet up (toward Full), a negative one moves it down.
//!
//! # Resolution
//!
//! [`GestureResolver::resolve_target`] brackets the release offset between
//! two adjacent candidate states and picks the upper one when the sheet is
//! past a direction-dependent threshold of the gap:
//!
//! ```text
//! fraction = (offset - h(prev)) / (h(next) - h(prev))
//! threshold = t          when velocity >= 0
//!           = 1 - t      when velocity <  0
//! t = 0.3 when Half is skipped, else 0.5
//! ```
//!
//! A velocity of exactly zero is not a downward movement, so it uses `t`.

use std::time::Duration;

use crate::config::{GestureConfig, SwipeLogic};
use crate::geometry::GeometryModel;
use crate::state::SheetState;

/// Picks the stable state a released drag settles into.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureResolver {
    threshold_three_states: f32,
    threshold_two_states: f32,
}

impl Default for GestureResolver {
    fn default() -> Self {
        Self::new(&GestureConfig::default())
    }
}

impl GestureResolver {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            threshold_three_states: config.threshold_three_states,
            threshold_two_states: config.threshold_two_states,
        }
    }

    /// Half is skipped when moving down, on a small screen, or when the
    /// current content disabled it.
    pub fn should_skip_half(velocity_px_per_ms: f32, geometry: &GeometryModel) -> bool {
        velocity_px_per_ms < 0.0 || !geometry.is_state_enabled(SheetState::Half)
    }

    /// Resolve the stable state for a drag released at `offset_px`.
    ///
    /// `allow_hidden` makes Hidden the lowest candidate (swipe to dismiss);
    /// otherwise the lowest enabled open state is. Disabled states are never
    /// returned.
    pub fn resolve_target(
        &self,
        offset_px: f32,
        velocity_px_per_ms: f32,
        geometry: &GeometryModel,
        allow_hidden: bool,
        skip_half: bool,
    ) -> SheetState {
        let mut candidates = [SheetState::Hidden; 4];
        let mut len = 0;
        for state in SheetState::STABLE {
            let allowed = match state {
                SheetState::Hidden => allow_hidden,
                // Half stays a candidate when it is the lowest open state.
                SheetState::Half => {
                    geometry.is_state_enabled(state)
                        && (!skip_half || !geometry.is_state_enabled(SheetState::Peek))
                }
                _ => geometry.is_state_enabled(state),
            };
            if allowed {
                candidates[len] = state;
                len += 1;
            }
        }
        let candidates = &candidates[..len];

        let (Some(&min), Some(&max)) = (candidates.first(), candidates.last()) else {
            return if allow_hidden { SheetState::Hidden } else { SheetState::Full };
        };
        if offset_px <= geometry.height_for_state(min) {
            return min;
        }
        if offset_px >= geometry.height_for_state(max) {
            return max;
        }

        // Bracket the offset. min < offset < max, so a pair always exists.
        let (prev, next) = candidates
            .windows(2)
            .map(|w| (w[0], w[1]))
            .find(|(prev, next)| {
                offset_px >= geometry.height_for_state(*prev)
                    && offset_px < geometry.height_for_state(*next)
            })
            .unwrap_or((min, max));

        let lower = geometry.height_for_state(prev);
        let distance = geometry.height_for_state(next) - lower;
        if !(distance > 0.0) {
            return prev;
        }

        let threshold = if skip_half {
            self.threshold_two_states
        } else {
            self.threshold_three_states
        };
        let threshold_to_next = if velocity_px_per_ms < 0.0 {
            1.0 - threshold
        } else {
            threshold
        };

        let fraction = (offset_px - lower) / distance;
        let target = if fraction > threshold_to_next { next } else { prev };

        #[cfg(feature = "tracing")]
        tracing::trace!(
            target: "fsheet.gesture",
            offset_px,
            velocity_px_per_ms,
            fraction,
            threshold_to_next,
            prev = prev.as_str(),
            next = next.as_str(),
            resolved = target.as_str(),
            "release resolved"
        );

        target
    }
}

// ---------------------------------------------------------------------------
// Swipe gate
// ---------------------------------------------------------------------------

/// A pointer position at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TouchSample {
    /// Horizontal position relative to the container's left edge, px.
    pub x: f32,
    pub y: f32,
    pub time: Duration,
}

impl TouchSample {
    pub fn new(x: f32, y: f32, time: Duration) -> Self {
        Self { x, y, time }
    }
}

/// Decides whether a gesture that started on a closed sheet may move it.
///
/// Under [`SwipeLogic::Velocity`] a gesture that is once judged too slow
/// stays rejected until [`SwipeGate::on_touch_down`] starts a new one.
#[derive(Debug, Clone)]
pub struct SwipeGate {
    logic: SwipeLogic,
    allowed_fraction: f32,
    min_velocity_dp_per_ms: f32,
    density: f32,
    blocked: bool,
}

impl SwipeGate {
    pub fn new(config: &GestureConfig, density: f32) -> Self {
        Self {
            logic: config.swipe_logic,
            allowed_fraction: config.swipe_allowed_fraction,
            min_velocity_dp_per_ms: config.min_swipe_velocity_dp_per_ms,
            density: if density > 0.0 { density } else { 1.0 },
            blocked: false,
        }
    }

    /// Start of a new gesture; clears a latched velocity rejection.
    pub fn on_touch_down(&mut self) {
        self.blocked = false;
    }

    /// Whether the gesture from `initial` to `current` may move the sheet.
    pub fn should_move(
        &mut self,
        initial: TouchSample,
        current: TouchSample,
        container_width: f32,
        sheet_open: bool,
    ) -> bool {
        if sheet_open {
            return true;
        }
        match self.logic {
            SwipeLogic::Default => current.x > 0.0 && current.x < container_width,
            SwipeLogic::RestrictArea => {
                let allowed = container_width * self.allowed_fraction;
                let start = (container_width - allowed) / 2.0;
                current.x > start && current.x < start + allowed
            }
            SwipeLogic::Velocity => {
                if self.blocked {
                    return false;
                }
                let elapsed_ms = current.time.saturating_sub(initial.time).as_secs_f32() * 1000.0;
                if elapsed_ms <= 0.0 {
                    return true;
                }
                let distance_dp = (current.x - initial.x).hypot(current.y - initial.y) / self.density;
                if distance_dp / elapsed_ms < self.min_velocity_dp_per_ms {
                    self.blocked = true;
                    return false;
                }
                true
            }
        }
    }
}
