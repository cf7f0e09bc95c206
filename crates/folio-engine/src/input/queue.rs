/// Input event types the engines understand.
/// Coordinates are CSS pixels relative to the viewport; the engines normalize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// The cursor moved to client coordinates (x, y) in a viewport of the given size.
    PointerMove { x: f32, y: f32, viewport_width: f32, viewport_height: f32 },
    /// A mouse button was pressed.
    PointerDown,
    /// A mouse button was released.
    PointerUp,
    /// The cursor left the window.
    PointerLeave,
    /// The cursor re-entered the window.
    PointerEnter,
    /// The cursor moved onto (`true`) or off (`false`) a link or button.
    HoverInteractive(bool),
    /// The page scrolled. `offset` is the vertical scroll position.
    Scroll { offset: f32, document_height: f32, viewport_height: f32 },
}

/// A queue of input events.
/// Browser listeners push events into the queue; the page runner drains it each frame.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    /// Push a new input event (called from a host listener).
    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    /// Iterate over pending events without consuming them.
    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_drain() {
        let mut q = InputQueue::new();
        q.push(InputEvent::PointerMove { x: 10.0, y: 20.0, viewport_width: 100.0, viewport_height: 100.0 });
        q.push(InputEvent::PointerDown);
        assert_eq!(q.len(), 2);
        let events = q.drain();
        assert_eq!(events.len(), 2);
        assert!(q.is_empty());
    }

    #[test]
    fn drain_preserves_order() {
        let mut q = InputQueue::new();
        q.push(InputEvent::PointerEnter);
        q.push(InputEvent::Scroll { offset: 5.0, document_height: 2000.0, viewport_height: 800.0 });
        q.push(InputEvent::PointerLeave);
        let events = q.drain();
        assert_eq!(events[0], InputEvent::PointerEnter);
        assert!(matches!(events[1], InputEvent::Scroll { offset, .. } if offset == 5.0));
        assert_eq!(events[2], InputEvent::PointerLeave);
    }
}
