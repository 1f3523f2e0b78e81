#![forbid(unsafe_code)]

//! Container geometry and per-state height ratios.
//!
//! The sheet's height in each stable state is stored as a ratio of the
//! container height:
//!
//! | State  | Default ratio                         |
//! |--------|---------------------------------------|
//! | Hidden | `0`                                   |
//! | Peek   | `(toolbar + shadow) / container`      |
//! | Half   | `0.55` (configurable)                 |
//! | Full   | `(container + shadow) / container`    |
//!
//! Full is above 1 so the toolbar shadow clears the top edge. Ratios are
//! only computed while the container has a positive height; otherwise the
//! model reports itself as unmeasured, keeps the last ratios, and every
//! height query returns 0.
//!
//! # Invariants
//!
//! 1. Once measured, `ratio(Hidden) <= ratio(Peek) <= ratio(Half) <= ratio(Full)`.
//! 2. A small screen (less than the configured distance between Half and
//!    Full) disables the Half state.
//! 3. Recomputation with a non-positive container height keeps the ratios.

use crate::config::GeometryConfig;
use crate::state::SheetState;

/// How a content wants one of its states sized.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum HeightMode {
    /// Use the sheet's default height for the state.
    #[default]
    Default,
    /// The state is unavailable for this content.
    Disabled,
    /// Custom height. For peek the value is in px; for half and full it is a
    /// ratio of the container height.
    Custom(f32),
}

/// Height modes for the peek, half and full states.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeightModes {
    pub peek: HeightMode,
    pub half: HeightMode,
    pub full: HeightMode,
}

impl HeightModes {
    #[must_use]
    pub fn with_peek(mut self, mode: HeightMode) -> Self {
        self.peek = mode;
        self
    }

    #[must_use]
    pub fn with_half(mut self, mode: HeightMode) -> Self {
        self.half = mode;
        self
    }

    #[must_use]
    pub fn with_full(mut self, mode: HeightMode) -> Self {
        self.full = mode;
        self
    }
}

/// Container dimensions and the derived height ratio of every stable state.
#[derive(Debug, Clone)]
pub struct GeometryModel {
    config: GeometryConfig,
    container_width: f32,
    container_height: f32,
    toolbar_height: f32,
    modes: HeightModes,
    /// Indexed by [`SheetState::rank`].
    ratios: [f32; 4],
    measured: bool,
}

impl GeometryModel {
    pub fn new(config: GeometryConfig) -> Self {
        Self {
            config,
            container_width: 0.0,
            container_height: 0.0,
            toolbar_height: 0.0,
            modes: HeightModes::default(),
            ratios: [0.0; 4],
            measured: false,
        }
    }

    pub fn config(&self) -> &GeometryConfig {
        &self.config
    }

    pub fn container_width(&self) -> f32 {
        self.container_width
    }

    pub fn container_height(&self) -> f32 {
        self.container_height
    }

    pub fn toolbar_height(&self) -> f32 {
        self.toolbar_height
    }

    pub fn height_modes(&self) -> HeightModes {
        self.modes
    }

    /// Whether ratios have been computed from a positive container height.
    pub fn is_measured(&self) -> bool {
        self.measured
    }

    /// Set the container size and recompute ratios.
    pub fn update_container(&mut self, width: f32, height: f32) {
        self.container_width = width;
        self.container_height = height;
        self.recompute_ratios();
    }

    /// Set the toolbar height and recompute ratios.
    pub fn update_toolbar_height(&mut self, height: f32) {
        self.toolbar_height = height;
        self.recompute_ratios();
    }

    /// Apply the height modes of newly shown content and recompute ratios.
    pub fn set_height_modes(&mut self, modes: HeightModes) {
        self.modes = modes;
        self.recompute_ratios();
    }

    /// Recompute the four ratios from the current dimensions.
    ///
    /// A non-positive container height leaves the ratios untouched and marks
    /// the model unmeasured.
    pub fn recompute_ratios(&mut self) {
        let h = self.container_height;
        if !(h > 0.0) {
            self.measured = false;
            return;
        }
        let shadow = self.config.toolbar_shadow_height_px;

        let peek_px = match self.modes.peek {
            HeightMode::Custom(px) => px.max(0.0),
            HeightMode::Default | HeightMode::Disabled => self.toolbar_height.max(0.0) + shadow,
        };
        let full = match self.modes.full {
            HeightMode::Custom(ratio) => ratio,
            HeightMode::Default | HeightMode::Disabled => (h + shadow) / h,
        };
        let peek = (peek_px / h).min(full);
        let half = match self.modes.half {
            HeightMode::Custom(ratio) => ratio,
            HeightMode::Default | HeightMode::Disabled => self.config.half_height_ratio,
        }
        .clamp(peek, full);

        self.ratios = [0.0, peek, half, full];
        self.measured = true;

        #[cfg(feature = "tracing")]
        tracing::trace!(
            target: "fsheet.geometry",
            container_height = h,
            toolbar_height = self.toolbar_height,
            peek,
            half,
            full,
            small_screen = self.is_small_screen(),
            "ratios recomputed"
        );
    }

    /// Height ratio of a stable state. `Scrolling` has no ratio and yields 0.
    pub fn ratio(&self, state: SheetState) -> f32 {
        match state.rank() {
            Some(rank) => self.ratios[usize::from(rank)],
            None => 0.0,
        }
    }

    /// Sheet height in px for a stable state: `ratio * container_height`.
    pub fn height_for_state(&self, state: SheetState) -> f32 {
        if !self.measured {
            return 0.0;
        }
        self.ratio(state) * self.container_height
    }

    /// Less than the configured minimum distance between Half and Full.
    pub fn is_small_screen(&self) -> bool {
        let diff = (self.ratio(SheetState::Full) - self.ratio(SheetState::Half)) * self.container_height;
        diff < self.config.min_half_full_distance_px()
    }

    /// Whether the resolver and `set_state` may land on `state`.
    pub fn is_state_enabled(&self, state: SheetState) -> bool {
        match state {
            SheetState::Hidden => true,
            SheetState::Peek => self.modes.peek != HeightMode::Disabled,
            SheetState::Half => self.modes.half != HeightMode::Disabled && !self.is_small_screen(),
            SheetState::Full => self.modes.full != HeightMode::Disabled,
            SheetState::Scrolling => false,
        }
    }

    /// The state content opens to: Peek, else Half, else Full.
    pub fn opening_state(&self) -> SheetState {
        [SheetState::Peek, SheetState::Half]
            .into_iter()
            .find(|s| self.is_state_enabled(*s))
            .unwrap_or(SheetState::Full)
    }

    /// Smallest enabled state above Hidden.
    pub fn min_open_state(&self) -> SheetState {
        [SheetState::Peek, SheetState::Half, SheetState::Full]
            .into_iter()
            .find(|s| self.is_state_enabled(*s))
            .unwrap_or(SheetState::Full)
    }

    /// Progress from peek to full height, clamped to `[0, 1]`.
    pub fn peek_to_full_fraction(&self, offset_px: f32) -> f32 {
        fraction_between(
            offset_px,
            self.height_for_state(SheetState::Peek),
            self.height_for_state(SheetState::Full),
        )
    }

    /// Progress from peek to half height, clamped to `[0, 1]`.
    pub fn peek_to_half_fraction(&self, offset_px: f32) -> f32 {
        fraction_between(
            offset_px,
            self.height_for_state(SheetState::Peek),
            self.height_for_state(SheetState::Half),
        )
    }
}

fn fraction_between(value: f32, low: f32, high: f32) -> f32 {
    let span = high - low;
    if !(span > 0.0) {
        return if value >= high { 1.0 } else { 0.0 };
    }
    ((value - low) / span).clamp(0.0, 1.0)
}
