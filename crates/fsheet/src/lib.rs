#![forbid(unsafe_code)]

//! Runtime: the bottom sheet state machine and the content it shows.
//!
//! # Role in FrankenSheet
//! `fsheet` turns the pure pieces of `fsheet-core` into a live sheet. It
//! owns the current state and offset, runs settle animations off a frame
//! clock, notifies observers, and decides which of several competing
//! contents gets to occupy the sheet.
//!
//! # Primary responsibilities
//! - **BottomSheet**: state machine, drag handling, offset notifications.
//! - **ContentArbiter**: priority queue admission, preemption and swaps.
//! - **SuppressionCoordinator**: token-based forced hiding and restore.
//! - **BottomSheetController**: the public entry point that ties them
//!   together and pumps sheet events back into the arbiter.
//! - **Scrim**: shared background dimming driven by sheet notifications.
//!
//! Everything here is single-threaded. Contents are shared as
//! [`ContentHandle`]s (`Rc<SheetContent>`) and compared by identity.

pub mod arbiter;
pub mod content;
pub mod controller;
pub mod error;
pub mod observer;
pub mod scrim;
pub mod sheet;
pub mod suppression;

pub use arbiter::ContentArbiter;
pub use content::{
    ContentFlags, ContentHandle, ContentId, ContentPriority, ContentQueue, SheetContent,
    SheetContentBuilder, ViewId,
};
pub use controller::BottomSheetController;
pub use error::{SheetError, SheetResult};
pub use observer::{EventLog, ObserverList, SheetEvent, SheetObserver};
pub use scrim::Scrim;
pub use sheet::BottomSheet;
pub use suppression::{SuppressionCoordinator, SuppressionToken};

pub use fsheet_core::{
    FrameClock, HeightMode, HeightModes, ManualClock, SheetConfig, SheetState, StateChangeReason,
    SystemClock, TouchSample,
};
