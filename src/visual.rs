//! The derived visual state and its single-writer store.
//!
//! Components that need scroll progress or the background color subscribe to
//! a [`VisualStore`] instead of reading loose global variables. The style
//! variables in [`vars`] are one such subscriber, kept for plain CSS rules.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::color::Rgb;
use crate::error::{PortfolioError, Result};
use crate::observe::{SubscriptionId, Subscribers};

/// CSS custom property names mirrored from [`VisualState`].
pub mod vars {
    pub const SCROLL_PERCENT: &str = "--scroll-percent";
    pub const SCROLL_PROGRESS: &str = "--scroll-progress";
    pub const ORB_R: &str = "--orb-r";
    pub const ORB_G: &str = "--orb-g";
    pub const ORB_B: &str = "--orb-b";
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct VisualState {
    /// Smoothed scroll fraction, `[0, 100]`.
    pub scroll_percent: f64,
    pub color: Rgb,
    pub current_section: usize,
}

impl VisualState {
    /// `scroll_percent` normalized to `[0, 1]`.
    pub fn scroll_progress(&self) -> f64 {
        self.scroll_percent / 100.0
    }

    /// `(name, value)` pairs for every style variable.
    pub fn style_vars(&self) -> [(&'static str, String); 5] {
        [
            (vars::SCROLL_PROGRESS, self.scroll_progress().to_string()),
            (vars::SCROLL_PERCENT, self.scroll_percent.to_string()),
            (vars::ORB_R, self.color.r.to_string()),
            (vars::ORB_G, self.color.g.to_string()),
            (vars::ORB_B, self.color.b.to_string()),
        ]
    }
}

#[derive(Default)]
struct Inner {
    state: Cell<VisualState>,
    writer_attached: Cell<bool>,
    subscribers: Subscribers<VisualState>,
    pending_section: RefCell<Option<usize>>,
}

/// Shared, observable [`VisualState`]. Cloning shares the same store.
#[derive(Clone, Default)]
pub struct VisualStore {
    inner: Rc<Inner>,
}

impl VisualStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> VisualState {
        self.inner.state.get()
    }

    pub fn subscribe(&self, callback: impl FnMut(&VisualState) + 'static) -> SubscriptionId {
        self.inner.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.subscribers.unsubscribe(id)
    }

    /// Claims the write side of the store. Only one [`Publisher`] may exist
    /// at a time; dropping it releases the claim.
    pub fn publisher(&self) -> Result<Publisher> {
        if self.inner.writer_attached.replace(true) {
            return Err(PortfolioError::PublisherActive);
        }
        Ok(Publisher {
            store: self.clone(),
            published: Cell::new(false),
        })
    }

    /// Queues a section change for the next publish. The section locator runs
    /// on scroll events while the color is only published per frame.
    pub fn request_section(&self, index: usize) {
        *self.inner.pending_section.borrow_mut() = Some(index);
    }

    pub fn has_pending_section(&self) -> bool {
        self.inner.pending_section.borrow().is_some()
    }
}

/// Exclusive write handle for a [`VisualStore`].
pub struct Publisher {
    store: VisualStore,
    published: Cell<bool>,
}

impl Publisher {
    /// Publishes the frame's smoothed fraction and color, folding in any
    /// queued section change, and notifies subscribers.
    pub fn publish(&self, scroll_percent: f64, color: Rgb) -> VisualState {
        let inner = &self.store.inner;
        let mut state = inner.state.get();
        state.scroll_percent = scroll_percent.clamp(0.0, 100.0);
        state.color = color;
        if let Some(section) = inner.pending_section.borrow_mut().take() {
            state.current_section = section;
        }
        inner.state.set(state);
        self.published.set(true);
        inner.subscribers.notify(&state);
        state
    }

    /// Per-frame publish. Skips the notification when the smoothed fraction
    /// did not move and no section change is queued, once the first state is
    /// out.
    pub fn publish_frame(&self, moved: bool, scroll_percent: f64, color: Rgb) -> Option<VisualState> {
        if moved || !self.published.get() || self.store.has_pending_section() {
            Some(self.publish(scroll_percent, color))
        } else {
            None
        }
    }

    pub fn store(&self) -> &VisualStore {
        &self.store
    }
}

impl Drop for Publisher {
    fn drop(&mut self) {
        self.store.inner.writer_attached.set(false);
    }
}
