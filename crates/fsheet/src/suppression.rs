#![forbid(unsafe_code)]

//! Suppression: external modes forcing the sheet out of the way.
//!
//! Each caller that needs the sheet hidden (an immersive mode, a composited
//! overview, a lost anchor) suppresses it and gets a [`SuppressionToken`]
//! back. The sheet stays hidden while any token is outstanding or the anchor
//! is missing. Suppression never touches the current content or the queue.
//!
//! When the last blocker goes away the sheet returns to the stable state it
//! had before the first suppression. If it was hidden or moving at the time,
//! it opens the current content to its opening state instead; with no current
//! content the arbiter shows its next queued one.

use std::collections::BTreeSet;

use fsheet_core::{SheetState, StateChangeReason};

use crate::arbiter::ContentArbiter;
use crate::sheet::BottomSheet;

/// Proof of one outstanding suppression. Hand it back to release it.
#[derive(Debug, PartialEq, Eq, Hash)]
#[must_use = "dropping a token leaves the sheet suppressed"]
pub struct SuppressionToken(u64);

impl SuppressionToken {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Tracks suppression requests and replays the sheet state on release.
#[derive(Debug, Default)]
pub struct SuppressionCoordinator {
    tokens: BTreeSet<u64>,
    next_token: u64,
    suppressed: bool,
    anchor_lost: bool,
    state_before: Option<SheetState>,
}

impl SuppressionCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    /// Number of outstanding tokens.
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// The state that will be replayed on release.
    pub fn state_before(&self) -> Option<SheetState> {
        self.state_before
    }

    /// Force the sheet hidden until the returned token is released.
    pub fn suppress(
        &mut self,
        sheet: &mut BottomSheet,
        reason: StateChangeReason,
    ) -> SuppressionToken {
        let id = self.next_token;
        self.next_token += 1;
        self.tokens.insert(id);
        tracing::debug!(
            target: "fsheet.suppression",
            token = id,
            reason = reason.as_str(),
            outstanding = self.tokens.len(),
            "sheet suppressed"
        );
        self.enter(sheet, reason);
        SuppressionToken(id)
    }

    /// Release one token. Returns `true` if the sheet came out of
    /// suppression as a result.
    pub fn unsuppress(
        &mut self,
        token: SuppressionToken,
        sheet: &mut BottomSheet,
        arbiter: &mut ContentArbiter,
    ) -> bool {
        if !self.tokens.remove(&token.0) {
            return false;
        }
        tracing::debug!(
            target: "fsheet.suppression",
            token = token.0,
            outstanding = self.tokens.len(),
            "suppression token released"
        );
        self.try_release(sheet, arbiter)
    }

    /// The anchor went away. The sheet is suppressed until it comes back.
    pub fn on_anchor_lost(&mut self, sheet: &mut BottomSheet) {
        if self.anchor_lost {
            return;
        }
        self.anchor_lost = true;
        tracing::debug!(target: "fsheet.suppression", outstanding = self.tokens.len(), "anchor lost");
        self.enter(sheet, StateChangeReason::Navigation);
    }

    /// The anchor came back. Returns `true` if the sheet left suppression.
    pub fn on_anchor_restored(
        &mut self,
        sheet: &mut BottomSheet,
        arbiter: &mut ContentArbiter,
    ) -> bool {
        if !self.anchor_lost {
            return false;
        }
        self.anchor_lost = false;
        tracing::debug!(target: "fsheet.suppression", outstanding = self.tokens.len(), "anchor restored");
        self.try_release(sheet, arbiter)
    }

    fn enter(&mut self, sheet: &mut BottomSheet, reason: StateChangeReason) {
        if !self.suppressed {
            self.suppressed = true;
            let before = match sheet.state() {
                SheetState::Scrolling => sheet.target_state().unwrap_or(sheet.last_stable_state()),
                stable => stable,
            };
            self.state_before = Some(before);
        }
        // The host can no longer release a drag while suppressed.
        sheet.cancel_drag();
        sheet.set_state(SheetState::Hidden, false, reason);
    }

    fn try_release(&mut self, sheet: &mut BottomSheet, arbiter: &mut ContentArbiter) -> bool {
        if !self.suppressed {
            return false;
        }
        if !self.tokens.is_empty() || self.anchor_lost || !arbiter.anchor_present() {
            return false;
        }
        self.suppressed = false;
        let before = self.state_before.take();

        if sheet.current_content().is_some() {
            let restore = match before {
                Some(state @ (SheetState::Peek | SheetState::Half | SheetState::Full)) => state,
                _ => sheet.opening_state(),
            };
            tracing::debug!(
                target: "fsheet.suppression",
                restore = restore.as_str(),
                "suppression lifted, restoring state"
            );
            sheet.set_state(restore, true, StateChangeReason::None);
        } else {
            tracing::debug!(
                target: "fsheet.suppression",
                queued = arbiter.queue().len(),
                "suppression lifted, showing next content"
            );
            arbiter.show_next(sheet, true, false);
        }
        true
    }
}
