#![forbid(unsafe_code)]

//! Sheet states and state-change reasons.
//!
//! The stable states are ordered by height: `Hidden < Peek < Half < Full`.
//! [`SheetState::Scrolling`] is the transient state the sheet is in while a
//! drag or a settle animation is moving it; it has no rank and is never a
//! rest state.
//!
//! "No pending target" is expressed as `Option<SheetState>::None` by the
//! state machine rather than as a variant, so it can never be passed in.

/// A state of the bottom sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SheetState {
    /// Fully offscreen.
    #[default]
    Hidden,
    /// Only the toolbar is showing.
    Peek,
    /// Expanded to roughly half of the container.
    Half,
    /// Expanded to the full container height.
    Full,
    /// Mid-drag or mid-animation.
    Scrolling,
}

impl SheetState {
    /// The stable states in ascending height order.
    pub const STABLE: [SheetState; 4] = [Self::Hidden, Self::Peek, Self::Half, Self::Full];

    /// Whether this is one of the four rest states.
    #[inline]
    pub const fn is_stable(self) -> bool {
        !matches!(self, Self::Scrolling)
    }

    /// Height rank of a stable state (`Hidden = 0` .. `Full = 3`).
    ///
    /// Returns `None` for [`SheetState::Scrolling`].
    #[inline]
    pub const fn rank(self) -> Option<u8> {
        match self {
            Self::Hidden => Some(0),
            Self::Peek => Some(1),
            Self::Half => Some(2),
            Self::Full => Some(3),
            Self::Scrolling => None,
        }
    }

    /// Whether the sheet counts as open in this state (above Peek).
    ///
    /// `Scrolling` is not open by itself; the state machine decides based on
    /// where the sheet is heading.
    #[inline]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Half | Self::Full)
    }

    /// Stable name used in log fields.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::Peek => "peek",
            Self::Half => "half",
            Self::Full => "full",
            Self::Scrolling => "scrolling",
        }
    }
}

impl std::fmt::Display for SheetState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a transition happened. Carried on every notification; it never
/// changes what the state machine does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StateChangeReason {
    #[default]
    None,
    Swipe,
    BackPress,
    TapScrim,
    Navigation,
    /// A composited UI (tab switcher, overview) covered the sheet.
    CompositedUiChange,
    /// An external immersive mode (e.g. VR) took over the screen.
    ExternalMode,
    Startup,
}

impl StateChangeReason {
    /// Stable name used in log fields.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Swipe => "swipe",
            Self::BackPress => "back_press",
            Self::TapScrim => "tap_scrim",
            Self::Navigation => "navigation",
            Self::CompositedUiChange => "composited_ui_change",
            Self::ExternalMode => "external_mode",
            Self::Startup => "startup",
        }
    }
}
