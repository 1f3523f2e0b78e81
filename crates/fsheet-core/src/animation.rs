#![forbid(unsafe_code)]

//! Settle animation: the interpolated offset transition a released or
//! programmatically moved sheet runs until it rests on its target state.
//!
//! The animation is pure data. The sheet stores one, samples it with the
//! current [`FrameClock`](crate::clock::FrameClock) time on every frame tick
//! and applies the returned offset. The final sample always lands exactly
//! on `to_offset`, so a finished animation never leaves a rounding gap.

use std::time::Duration;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::state::{SheetState, StateChangeReason};

/// Progress curve for the settle animation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum Interpolator {
    Linear,
    /// `1 - (1 - t)^(2 * factor)`; fast start, slow finish.
    Decelerate { factor: f32 },
}

impl Default for Interpolator {
    fn default() -> Self {
        Self::Decelerate { factor: 1.0 }
    }
}

impl Interpolator {
    /// Map linear progress `t` in `[0, 1]` onto the curve.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Decelerate { factor } => {
                if factor == 1.0 {
                    1.0 - (1.0 - t) * (1.0 - t)
                } else {
                    1.0 - (1.0 - t).powf(2.0 * factor)
                }
            }
        }
    }
}

/// One frame of a running settle animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettleSample {
    /// Offset to apply this frame, in px.
    pub offset: f32,
    /// Linear progress in `[0, 1]`.
    pub progress: f32,
    /// Whether this is the last frame.
    pub finished: bool,
}

/// A settle transition from one offset to the height of a target state.
#[derive(Debug, Clone, PartialEq)]
pub struct SettleAnimation {
    from_offset: f32,
    to_offset: f32,
    start: Duration,
    duration: Duration,
    interpolator: Interpolator,
    target: SheetState,
    reason: StateChangeReason,
    from_state: SheetState,
}

impl SettleAnimation {
    /// Animate toward `target` (which sits at `to_offset`) starting at `start`.
    pub fn new(
        from_offset: f32,
        to_offset: f32,
        target: SheetState,
        start: Duration,
        duration: Duration,
    ) -> Self {
        Self {
            from_offset,
            to_offset,
            start,
            duration,
            interpolator: Interpolator::default(),
            target,
            reason: StateChangeReason::None,
            from_state: SheetState::Hidden,
        }
    }

    #[must_use]
    pub fn with_interpolator(mut self, interpolator: Interpolator) -> Self {
        self.interpolator = interpolator;
        self
    }

    #[must_use]
    pub fn with_reason(mut self, reason: StateChangeReason) -> Self {
        self.reason = reason;
        self
    }

    /// Record the state the sheet was in before the animation began.
    #[must_use]
    pub fn with_from_state(mut self, state: SheetState) -> Self {
        self.from_state = state;
        self
    }

    pub fn target(&self) -> SheetState {
        self.target
    }

    pub fn reason(&self) -> StateChangeReason {
        self.reason
    }

    pub fn from_state(&self) -> SheetState {
        self.from_state
    }

    pub fn from_offset(&self) -> f32 {
        self.from_offset
    }

    pub fn to_offset(&self) -> f32 {
        self.to_offset
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Sample the animation at clock time `now`.
    ///
    /// Times before `start` sample as progress 0. A zero duration finishes on
    /// the first sample.
    pub fn sample(&self, now: Duration) -> SettleSample {
        let elapsed = now.saturating_sub(self.start);
        if self.duration.is_zero() || elapsed >= self.duration {
            return SettleSample {
                offset: self.to_offset,
                progress: 1.0,
                finished: true,
            };
        }
        let progress = (elapsed.as_secs_f64() / self.duration.as_secs_f64()) as f32;
        let eased = self.interpolator.apply(progress);
        SettleSample {
            offset: self.from_offset + (self.to_offset - self.from_offset) * eased,
            progress,
            finished: false,
        }
    }

    /// The terminal sample, used when the animation is ended early.
    pub fn final_sample(&self) -> SettleSample {
        SettleSample {
            offset: self.to_offset,
            progress: 1.0,
            finished: true,
        }
    }
}
