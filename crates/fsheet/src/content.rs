#![forbid(unsafe_code)]

//! Sheet content and the pending-content queue.
//!
//! A [`SheetContent`] is plain data describing one panel: its views, its
//! priority, its capabilities and how tall it wants each state. Features
//! build one, hand the [`ContentHandle`] to the controller, and keep their
//! own clone. The controller only ever calls [`SheetContent::destroy`] when
//! the content is evicted for good.
//!
//! # Queue ordering
//!
//! [`ContentQueue`] keeps contents sorted by `(priority, insertion sequence)`.
//! High priority sorts first; equal priorities keep their arrival order.
//! Two requests in the same turn are therefore resolved by priority and then
//! by order, never by timing.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use bitflags::bitflags;
use fsheet_core::{HeightMode, HeightModes};

static NEXT_CONTENT_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identity of a [`SheetContent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentId(u64);

impl ContentId {
    fn next() -> Self {
        Self(NEXT_CONTENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "content#{}", self.0)
    }
}

/// Opaque handle to a view owned by the host's UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(pub u64);

/// Admission priority. `High` sorts before `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum ContentPriority {
    High,
    #[default]
    Low,
}

impl ContentPriority {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Low => "low",
        }
    }
}

bitflags! {
    /// Optional capabilities of a content.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ContentFlags: u8 {
        /// A downward swipe may hide the sheet entirely.
        const SWIPE_TO_DISMISS       = 0b001;
        /// The feature destroys the content itself; the controller never does.
        const CUSTOM_LIFECYCLE       = 0b010;
        /// The feature draws its own scrim; the shared scrim stays hidden.
        const CUSTOM_SCRIM_LIFECYCLE = 0b100;
    }
}

/// Shared handle to a content. Identity is pointer identity.
pub type ContentHandle = Rc<SheetContent>;

/// One panel that can occupy the bottom sheet.
pub struct SheetContent {
    id: ContentId,
    label: String,
    content_view: ViewId,
    toolbar_view: Option<ViewId>,
    vertical_scroll_offset: Cell<f32>,
    priority: ContentPriority,
    flags: ContentFlags,
    height_modes: HeightModes,
    on_destroy: RefCell<Option<Box<dyn FnOnce()>>>,
    destroyed: Cell<bool>,
}

impl SheetContent {
    /// Start building a content around its main view.
    pub fn builder(content_view: ViewId) -> SheetContentBuilder {
        SheetContentBuilder {
            label: String::new(),
            content_view,
            toolbar_view: None,
            priority: ContentPriority::default(),
            flags: ContentFlags::empty(),
            height_modes: HeightModes::default(),
            on_destroy: None,
        }
    }

    pub fn id(&self) -> ContentId {
        self.id
    }

    /// Human-readable name used in log fields.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn content_view(&self) -> ViewId {
        self.content_view
    }

    pub fn toolbar_view(&self) -> Option<ViewId> {
        self.toolbar_view
    }

    pub fn priority(&self) -> ContentPriority {
        self.priority
    }

    pub fn flags(&self) -> ContentFlags {
        self.flags
    }

    pub fn swipe_to_dismiss_enabled(&self) -> bool {
        self.flags.contains(ContentFlags::SWIPE_TO_DISMISS)
    }

    pub fn has_custom_lifecycle(&self) -> bool {
        self.flags.contains(ContentFlags::CUSTOM_LIFECYCLE)
    }

    pub fn has_custom_scrim_lifecycle(&self) -> bool {
        self.flags.contains(ContentFlags::CUSTOM_SCRIM_LIFECYCLE)
    }

    pub fn height_modes(&self) -> HeightModes {
        self.height_modes
    }

    pub fn peek_height_mode(&self) -> HeightMode {
        self.height_modes.peek
    }

    pub fn half_height_mode(&self) -> HeightMode {
        self.height_modes.half
    }

    pub fn full_height_mode(&self) -> HeightMode {
        self.height_modes.full
    }

    /// How far the content's own scroll view is scrolled, in px.
    pub fn vertical_scroll_offset(&self) -> f32 {
        self.vertical_scroll_offset.get()
    }

    /// Report the content's scroll position. A scrolled content keeps a drag
    /// inside itself instead of moving the sheet.
    pub fn set_vertical_scroll_offset(&self, offset: f32) {
        self.vertical_scroll_offset.set(offset);
    }

    /// Release the content. Runs the destroy hook once; later calls do nothing.
    pub fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }
        let hook = self.on_destroy.borrow_mut().take();
        if let Some(hook) = hook {
            hook();
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }
}

impl fmt::Debug for SheetContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetContent")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("priority", &self.priority)
            .field("flags", &self.flags)
            .field("destroyed", &self.destroyed.get())
            .finish_non_exhaustive()
    }
}

/// Builder for [`SheetContent`].
pub struct SheetContentBuilder {
    label: String,
    content_view: ViewId,
    toolbar_view: Option<ViewId>,
    priority: ContentPriority,
    flags: ContentFlags,
    height_modes: HeightModes,
    on_destroy: Option<Box<dyn FnOnce()>>,
}

impl SheetContentBuilder {
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub fn toolbar_view(mut self, view: ViewId) -> Self {
        self.toolbar_view = Some(view);
        self
    }

    #[must_use]
    pub fn priority(mut self, priority: ContentPriority) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn flags(mut self, flags: ContentFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn height_modes(mut self, modes: HeightModes) -> Self {
        self.height_modes = modes;
        self
    }

    /// Hook run by the first [`SheetContent::destroy`] call.
    #[must_use]
    pub fn on_destroy(mut self, hook: impl FnOnce() + 'static) -> Self {
        self.on_destroy = Some(Box::new(hook));
        self
    }

    pub fn build(self) -> ContentHandle {
        Rc::new(SheetContent {
            id: ContentId::next(),
            label: self.label,
            content_view: self.content_view,
            toolbar_view: self.toolbar_view,
            vertical_scroll_offset: Cell::new(0.0),
            priority: self.priority,
            flags: self.flags,
            height_modes: self.height_modes,
            on_destroy: RefCell::new(self.on_destroy),
            destroyed: Cell::new(false),
        })
    }
}

// ---------------------------------------------------------------------------
// Queue
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct QueueEntry {
    priority: ContentPriority,
    seq: u64,
    content: ContentHandle,
}

/// Pending contents ordered by `(priority, insertion sequence)`.
#[derive(Debug, Default)]
pub struct ContentQueue {
    entries: VecDeque<QueueEntry>,
    next_seq: u64,
}

impl ContentQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert behind every entry of equal or higher priority.
    ///
    /// Returns `false` (and leaves the queue unchanged) if the content is
    /// already queued.
    pub fn push(&mut self, content: ContentHandle) -> bool {
        if self.contains(&content) {
            return false;
        }
        let priority = content.priority();
        let seq = self.next_seq;
        self.next_seq += 1;
        let pos = self
            .entries
            .partition_point(|e| (e.priority, e.seq) < (priority, seq));
        self.entries.insert(
            pos,
            QueueEntry {
                priority,
                seq,
                content,
            },
        );
        true
    }

    /// Remove and return the head.
    pub fn pop(&mut self) -> Option<ContentHandle> {
        self.entries.pop_front().map(|e| e.content)
    }

    pub fn peek(&self) -> Option<&ContentHandle> {
        self.entries.front().map(|e| &e.content)
    }

    /// Remove a specific content. Returns whether it was queued.
    pub fn remove(&mut self, content: &ContentHandle) -> bool {
        match self
            .entries
            .iter()
            .position(|e| Rc::ptr_eq(&e.content, content))
        {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, content: &ContentHandle) -> bool {
        self.entries.iter().any(|e| Rc::ptr_eq(&e.content, content))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Queued contents in admission order.
    pub fn iter(&self) -> impl Iterator<Item = &ContentHandle> {
        self.entries.iter().map(|e| &e.content)
    }

    /// Remove and return everything, in admission order.
    pub fn drain(&mut self) -> Vec<ContentHandle> {
        self.entries.drain(..).map(|e| e.content).collect()
    }
}
