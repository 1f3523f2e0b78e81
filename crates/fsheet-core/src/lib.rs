#![forbid(unsafe_code)]

//! Core: sheet states, geometry, gesture resolution and settle animation.
//!
//! # Role in FrankenSheet
//! `fsheet-core` holds the leaf logic of the bottom sheet. Nothing in here
//! owns content or observers; every type is either plain data or a pure
//! function over plain data, so it can be tested without a running sheet.
//!
//! # Primary responsibilities
//! - **SheetState / StateChangeReason**: the discrete states and why they change.
//! - **GeometryModel**: container/toolbar dimensions and per-state height ratios.
//! - **GestureResolver**: picks the stable state a released drag settles into.
//! - **SettleAnimation**: interpolated offset transition driven by a [`clock::FrameClock`].
//! - **SheetConfig**: every tunable constant, optionally loaded from TOML/JSON.
//!
//! # How it fits in the system
//! The runtime crate (`fsheet`) owns the state machine, the observers and
//! the content arbiter. It feeds gestures and frame ticks through the types
//! in this crate and turns their results into notifications.

pub mod animation;
pub mod clock;
pub mod config;
pub mod geometry;
pub mod gesture;
pub mod state;

pub use animation::{Interpolator, SettleAnimation, SettleSample};
pub use clock::{FrameClock, ManualClock, SystemClock};
pub use config::{AnimationConfig, ConfigError, GeometryConfig, GestureConfig, SheetConfig, SwipeLogic};
pub use geometry::{GeometryModel, HeightMode, HeightModes};
pub use gesture::{GestureResolver, SwipeGate, TouchSample};
pub use state::{SheetState, StateChangeReason};
