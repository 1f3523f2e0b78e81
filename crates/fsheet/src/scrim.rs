#![forbid(unsafe_code)]

//! Background scrim drawn behind an open sheet.
//!
//! The scrim fades in with the peek→half transition and disappears when the
//! sheet closes. Content with a custom scrim lifecycle draws its own, so the
//! shared one stays hidden while such content is showing. Tapping a visible
//! scrim settles the sheet back to Peek (see the controller).

use std::cell::Cell;

use fsheet_core::StateChangeReason;

use crate::content::ContentHandle;
use crate::observer::SheetObserver;

/// Scrim visibility and opacity, driven by sheet notifications.
#[derive(Debug)]
pub struct Scrim {
    max_alpha: f32,
    alpha: Cell<f32>,
    visible: Cell<bool>,
    custom_content_scrim: Cell<bool>,
}

impl Default for Scrim {
    fn default() -> Self {
        Self::new(0.65)
    }
}

impl Scrim {
    /// `max_alpha` is the opacity at (and above) the half state.
    pub fn new(max_alpha: f32) -> Self {
        Self {
            max_alpha: max_alpha.clamp(0.0, 1.0),
            alpha: Cell::new(0.0),
            visible: Cell::new(false),
            custom_content_scrim: Cell::new(false),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    pub fn alpha(&self) -> f32 {
        self.alpha.get()
    }

    fn hide(&self) {
        self.visible.set(false);
        self.alpha.set(0.0);
    }
}

impl SheetObserver for Scrim {
    fn on_sheet_opened(&self, _reason: StateChangeReason) {
        if !self.custom_content_scrim.get() {
            self.visible.set(true);
        }
    }

    fn on_sheet_closed(&self, _reason: StateChangeReason) {
        self.hide();
    }

    fn on_transition_peek_to_half(&self, fraction: f32) {
        if self.custom_content_scrim.get() {
            return;
        }
        self.alpha.set(fraction.clamp(0.0, 1.0) * self.max_alpha);
    }

    fn on_sheet_content_changed(&self, content: Option<&ContentHandle>) {
        let custom = content.is_some_and(|c| c.has_custom_scrim_lifecycle());
        self.custom_content_scrim.set(custom);
        if custom {
            self.hide();
        }
    }
}
