#![forbid(unsafe_code)]

use thiserror::Error;

/// Recoverable misuse of the sheet's drag API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SheetError {
    /// The sheet (or its controller) was destroyed.
    #[error("bottom sheet has been destroyed")]
    Destroyed,
    /// A drag update or release arrived without `begin_drag`.
    #[error("no drag in progress")]
    NoDragInProgress,
    /// `begin_drag` was called while a drag was already active.
    #[error("a drag is already in progress")]
    DragAlreadyActive,
    /// An external mode is suppressing the sheet.
    #[error("bottom sheet is suppressed")]
    Suppressed,
    /// The container has not been measured yet.
    #[error("sheet geometry has not been measured")]
    NotMeasured,
}

/// Result alias for sheet operations.
pub type SheetResult<T> = Result<T, SheetError>;
