//! Process-wide pointer/scroll signal.
//!
//! One [`SignalSource`] per page session owns the latest normalized pointer
//! position and scroll progress. The page's single pair of window listeners
//! feeds it; consumers hold cloned [`SignalReader`]s and can only read.
//! Consumers [`subscribe`](SignalReader::subscribe) for as long as they are
//! mounted so the host knows whether the listeners need to stay attached.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use glam::Vec2;

use super::queue::InputEvent;

/// Snapshot of the shared pointer/scroll state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerScrollSignal {
    /// Pointer position in `[0, 1]²`, origin top-left.
    pub pointer: Vec2,
    /// Vertical scroll progress in `[0, 1]`.
    pub scroll_progress: f32,
}

impl Default for PointerScrollSignal {
    fn default() -> Self {
        Self {
            pointer: Vec2::splat(0.5),
            scroll_progress: 0.0,
        }
    }
}

/// Normalize client coordinates against the viewport, clamped to `[0, 1]`.
/// A degenerate viewport yields the centre.
pub fn normalize_pointer(x: f32, y: f32, viewport_width: f32, viewport_height: f32) -> Vec2 {
    let nx = if viewport_width > 0.0 { x / viewport_width } else { 0.5 };
    let ny = if viewport_height > 0.0 { y / viewport_height } else { 0.5 };
    Vec2::new(nx, ny).clamp(Vec2::ZERO, Vec2::ONE)
}

/// `offset / (document_height - viewport_height)`, clamped to `[0, 1]`.
/// Zero when the document does not scroll.
pub fn scroll_progress(offset: f32, document_height: f32, viewport_height: f32) -> f32 {
    let scrollable = document_height - viewport_height;
    if scrollable <= 0.0 || !scrollable.is_finite() {
        return 0.0;
    }
    let progress = offset / scrollable;
    if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    }
}

/// Identifies one consumer's subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u32);

#[derive(Debug, Default)]
struct Shared {
    current: PointerScrollSignal,
    subscribers: Vec<SubscriptionId>,
    next_id: u32,
}

/// The single writer of the pointer/scroll signal. Not `Clone`.
#[derive(Debug)]
pub struct SignalSource {
    shared: Rc<RefCell<Shared>>,
}

impl SignalSource {
    pub fn new() -> Self {
        Self {
            shared: Rc::new(RefCell::new(Shared {
                next_id: 1,
                ..Shared::default()
            })),
        }
    }

    /// A read-only handle for consumers.
    pub fn reader(&self) -> SignalReader {
        SignalReader {
            shared: self.shared.clone(),
        }
    }

    /// Fold one input event into the signal. Returns true if the signal changed.
    pub fn apply(&mut self, event: &InputEvent) -> bool {
        let mut shared = self.shared.borrow_mut();
        let before = shared.current;
        match *event {
            InputEvent::PointerMove { x, y, viewport_width, viewport_height } => {
                shared.current.pointer = normalize_pointer(x, y, viewport_width, viewport_height);
            }
            InputEvent::Scroll { offset, document_height, viewport_height } => {
                shared.current.scroll_progress =
                    scroll_progress(offset, document_height, viewport_height);
            }
            _ => {}
        }
        shared.current != before
    }

    /// Latest snapshot.
    pub fn current(&self) -> PointerScrollSignal {
        self.shared.borrow().current
    }

    /// Whether any consumer currently needs the host listeners.
    pub fn has_subscribers(&self) -> bool {
        !self.shared.borrow().subscribers.is_empty()
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.borrow().subscribers.len()
    }
}

impl Default for SignalSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only, cloneable view of the signal.
#[derive(Debug, Clone)]
pub struct SignalReader {
    shared: Rc<RefCell<Shared>>,
}

impl SignalReader {
    /// Latest snapshot. Values are copied out, so a frame never observes a
    /// half-applied event.
    pub fn current(&self) -> PointerScrollSignal {
        self.shared.borrow().current
    }

    /// Register as a consumer. The subscription is released on drop.
    pub fn subscribe(&self) -> Subscription {
        let mut shared = self.shared.borrow_mut();
        let id = SubscriptionId(shared.next_id);
        shared.next_id += 1;
        shared.subscribers.push(id);
        log::debug!("signal: subscribe {:?} ({} total)", id, shared.subscribers.len());
        Subscription {
            shared: Rc::downgrade(&self.shared),
            id: Some(id),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.borrow().subscribers.len()
    }
}

/// A consumer's registration with the signal source.
#[derive(Debug)]
pub struct Subscription {
    shared: Weak<RefCell<Shared>>,
    id: Option<SubscriptionId>,
}

impl Subscription {
    /// Release the subscription. Idempotent: returns false if already released.
    pub fn release(&mut self) -> bool {
        let Some(id) = self.id.take() else {
            return false;
        };
        if let Some(shared) = self.shared.upgrade() {
            let mut shared = shared.borrow_mut();
            shared.subscribers.retain(|s| *s != id);
            log::debug!("signal: release {:?} ({} left)", id, shared.subscribers.len());
        }
        true
    }

    pub fn is_active(&self) -> bool {
        self.id.is_some()
    }

    pub fn id(&self) -> Option<SubscriptionId> {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}
