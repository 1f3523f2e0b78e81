#![forbid(unsafe_code)]

//! Content arbitration: which content occupies the sheet.
//!
//! The arbiter owns the queue of pending contents. The content currently
//! shown lives in the [`BottomSheet`] itself, so there is one source of
//! truth for it.
//!
//! # Admission (`request_show`)
//!
//! 1. The current content is accepted as-is.
//! 2. Without an anchor (no active tab or host surface) the request is
//!    refused and nothing is queued.
//! 3. Otherwise the content is queued.
//! 4. An empty sheet immediately shows the queue head.
//! 5. A higher-priority content preempts the current one only while the
//!    sheet is closed (Peek or below). The current content goes back into
//!    the queue and the sheet hides; the swap happens on the Hidden commit.
//! 6. Anything else waits in the queue.
//!
//! # Reacting to the sheet
//!
//! The arbiter does not observe the sheet directly. The controller feeds it
//! Hidden commits ([`ContentArbiter::on_sheet_hidden`]) and close events
//! ([`ContentArbiter::on_sheet_closed`]) after each call into the sheet
//! returns, so a hide started from a reaction never nests inside another
//! notification. Once those are drained it calls
//! [`ContentArbiter::on_sheet_settled`] to drop a hide the sheet gave up on.
//!
//! The preemption rule (only while closed) and the close-time swap rule
//! (whenever the sheet comes back to Peek) are intentionally separate.

use std::rc::Rc;

use fsheet_core::{SheetState, StateChangeReason};

use crate::content::{ContentHandle, ContentQueue};
use crate::sheet::BottomSheet;

/// Priority admission controller for sheet contents.
#[derive(Debug)]
pub struct ContentArbiter {
    queue: ContentQueue,
    processing_hide: bool,
    anchor_present: bool,
}

impl Default for ContentArbiter {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentArbiter {
    /// A new arbiter with an empty queue and an anchor present.
    pub fn new() -> Self {
        Self {
            queue: ContentQueue::new(),
            processing_hide: false,
            anchor_present: true,
        }
    }

    pub fn queue(&self) -> &ContentQueue {
        &self.queue
    }

    pub fn is_processing_hide(&self) -> bool {
        self.processing_hide
    }

    pub fn anchor_present(&self) -> bool {
        self.anchor_present
    }

    pub fn set_anchor_present(&mut self, present: bool) {
        self.anchor_present = present;
    }

    /// Ask for `content` to be shown.
    ///
    /// Returns `true` if the content is showing or is guaranteed to show
    /// next, `false` if it was refused or has to wait behind the current one.
    /// While `suppressed`, contents are swapped in without opening the sheet.
    pub fn request_show(
        &mut self,
        sheet: &mut BottomSheet,
        content: ContentHandle,
        animate: bool,
        suppressed: bool,
    ) -> bool {
        let current = sheet.current_content().cloned();
        if current.as_ref().is_some_and(|c| Rc::ptr_eq(c, &content)) {
            return true;
        }
        if !self.anchor_present {
            tracing::debug!(
                target: "fsheet.arbiter",
                content = %content.id(),
                "no anchor, request refused"
            );
            return false;
        }

        self.queue.push(Rc::clone(&content));
        tracing::debug!(
            target: "fsheet.arbiter",
            content = %content.id(),
            label = content.label(),
            priority = content.priority().as_str(),
            queued = self.queue.len(),
            "content requested"
        );

        let Some(current) = current else {
            self.show_next(sheet, animate, suppressed);
            return true;
        };

        if content.priority() < current.priority() && !sheet.is_open() {
            tracing::debug!(
                target: "fsheet.arbiter",
                content = %content.id(),
                preempted = %current.id(),
                "preempting current content"
            );
            self.queue.push(current);
            if sheet.state() == SheetState::Hidden {
                // Nothing to animate away; swap right now.
                self.swap_to_next(sheet, animate, suppressed);
            } else {
                self.processing_hide = true;
                sheet.set_state(SheetState::Hidden, animate, StateChangeReason::None);
            }
            return true;
        }

        false
    }

    /// Withdraw `content`. A queued content is simply dequeued; the current
    /// one is hidden and replaced by the next queued content.
    pub fn hide_content(
        &mut self,
        sheet: &mut BottomSheet,
        content: &ContentHandle,
        animate: bool,
        suppressed: bool,
    ) {
        let is_current = sheet
            .current_content()
            .is_some_and(|c| Rc::ptr_eq(c, content));
        if !is_current {
            if self.queue.remove(content) {
                tracing::debug!(
                    target: "fsheet.arbiter",
                    content = %content.id(),
                    "queued content withdrawn"
                );
            }
            return;
        }
        if self.processing_hide {
            return;
        }

        tracing::debug!(target: "fsheet.arbiter", content = %content.id(), "hiding current content");
        self.processing_hide = true;
        if sheet.state() == SheetState::Hidden {
            self.on_sheet_hidden(sheet, suppressed);
        } else {
            sheet.set_state(SheetState::Hidden, animate, StateChangeReason::None);
        }
    }

    /// The sheet committed Hidden.
    ///
    /// After a requested hide, or whenever the sheet is not suppressed, the
    /// current content is retired and the queue head (if any) takes over.
    /// A suppression-forced hide keeps the current content.
    pub fn on_sheet_hidden(&mut self, sheet: &mut BottomSheet, suppressed: bool) {
        let was_processing = std::mem::replace(&mut self.processing_hide, false);
        if suppressed && !was_processing {
            return;
        }
        self.swap_to_next(sheet, true, suppressed);
    }

    /// Called once the controller has drained the sheet's notifications.
    ///
    /// A hide that is no longer heading to Hidden was abandoned: a drag
    /// dropped its settle, it was cancelled, or a later `set_state`
    /// superseded it. The current content keeps the sheet and stops being
    /// queued if a preemption had put it back. A hide cancelled back onto
    /// Hidden never commits, so it is finished here instead.
    pub fn on_sheet_settled(&mut self, sheet: &mut BottomSheet, suppressed: bool) {
        if !self.processing_hide {
            return;
        }
        if sheet.target_state() == Some(SheetState::Hidden)
            || sheet.pending_state() == Some(SheetState::Hidden)
        {
            return;
        }
        if sheet.state() == SheetState::Hidden {
            tracing::debug!(
                target: "fsheet.arbiter",
                suppressed,
                "hide ended on hidden without a commit"
            );
            self.on_sheet_hidden(sheet, suppressed);
            return;
        }
        self.processing_hide = false;
        let requeued = sheet
            .current_content()
            .is_some_and(|current| self.queue.remove(current));
        tracing::debug!(
            target: "fsheet.arbiter",
            state = sheet.state().as_str(),
            requeued,
            "hide abandoned"
        );
    }

    /// The sheet closed back to Peek. A queued content with higher priority
    /// than the current one takes over.
    pub fn on_sheet_closed(&mut self, sheet: &mut BottomSheet) {
        if sheet.state() != SheetState::Peek || self.processing_hide {
            return;
        }
        let Some(current) = sheet.current_content().cloned() else {
            return;
        };
        let head_wins = self
            .queue
            .peek()
            .is_some_and(|head| head.priority() < current.priority());
        if !head_wins {
            return;
        }
        tracing::debug!(
            target: "fsheet.arbiter",
            current = %current.id(),
            "higher priority content waiting, swapping on close"
        );
        self.queue.push(current);
        self.processing_hide = true;
        sheet.set_state(SheetState::Hidden, true, StateChangeReason::None);
    }

    /// Open the current content to Half. No-op without content.
    pub fn expand(&mut self, sheet: &mut BottomSheet) {
        if sheet.current_content().is_none() {
            return;
        }
        sheet.set_state(SheetState::Half, true, StateChangeReason::None);
    }

    /// Retire the current content and show the queue head.
    fn swap_to_next(&mut self, sheet: &mut BottomSheet, animate: bool, suppressed: bool) {
        if let Some(current) = sheet.current_content().cloned() {
            self.retire(&current);
        }
        self.show_next(sheet, animate, suppressed);
    }

    /// Destroy `content` unless it is requeued or manages its own lifecycle.
    fn retire(&self, content: &ContentHandle) {
        if self.queue.contains(content) || content.has_custom_lifecycle() {
            return;
        }
        tracing::debug!(target: "fsheet.arbiter", content = %content.id(), "content destroyed");
        content.destroy();
    }

    /// Show the queue head, opening the sheet unless suppressed. An empty
    /// queue clears the sheet.
    pub fn show_next(&mut self, sheet: &mut BottomSheet, animate: bool, suppressed: bool) {
        match self.queue.pop() {
            Some(next) => {
                tracing::debug!(
                    target: "fsheet.arbiter",
                    content = %next.id(),
                    label = next.label(),
                    suppressed,
                    "showing next content"
                );
                sheet.show_content(Some(next));
                if !suppressed {
                    let opening = sheet.opening_state();
                    sheet.set_state(opening, animate, StateChangeReason::None);
                }
            }
            None => {
                if sheet.current_content().is_some() {
                    sheet.show_content(None);
                }
            }
        }
    }

    /// Destroy every content without a custom lifecycle, queued or shown.
    pub fn evict_all(&mut self, current: Option<ContentHandle>) {
        let queued = self.queue.drain();
        for content in current.iter().chain(queued.iter()) {
            if !content.has_custom_lifecycle() {
                content.destroy();
            }
        }
        self.processing_hide = false;
        tracing::debug!(
            target: "fsheet.arbiter",
            evicted = queued.len() + usize::from(current.is_some()),
            "all contents evicted"
        );
    }
}
