//! Decorative cursor dot/ring that follows the raw pointer.

use glam::Vec2;
use serde::Serialize;

use crate::input::queue::InputEvent;
use crate::input::signal::{SignalReader, Subscription};

const PRESSED_SCALE: f32 = 0.75;
const HOVER_SCALE: f32 = 1.5;

/// Render state for the cursor overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CursorState {
    /// Client position in CSS pixels.
    pub x: f32,
    pub y: f32,
    pub opacity: f32,
    pub scale: f32,
}

#[derive(Debug)]
pub struct CursorFollower {
    position: Vec2,
    hidden: bool,
    pressed: bool,
    hovering_interactive: bool,
    subscription: Subscription,
}

impl CursorFollower {
    /// Mount. The subscription keeps the page's pointer listeners attached.
    pub fn mount(signals: &SignalReader) -> Self {
        Self {
            position: Vec2::ZERO,
            hidden: true,
            pressed: false,
            hovering_interactive: false,
            subscription: signals.subscribe(),
        }
    }

    pub fn handle(&mut self, event: &InputEvent) {
        if !self.subscription.is_active() {
            return;
        }
        match *event {
            InputEvent::PointerMove { x, y, .. } => {
                self.position = Vec2::new(x, y);
                self.hidden = false;
            }
            InputEvent::PointerDown => self.pressed = true,
            InputEvent::PointerUp => self.pressed = false,
            InputEvent::PointerLeave => self.hidden = true,
            InputEvent::PointerEnter => self.hidden = false,
            InputEvent::HoverInteractive(hovering) => self.hovering_interactive = hovering,
            InputEvent::Scroll { .. } => {}
        }
    }

    pub fn state(&self) -> CursorState {
        let scale = if self.pressed {
            PRESSED_SCALE
        } else if self.hovering_interactive {
            HOVER_SCALE
        } else {
            1.0
        };
        CursorState {
            x: self.position.x,
            y: self.position.y,
            opacity: if self.hidden { 0.0 } else { 1.0 },
            scale,
        }
    }

    /// Release the listener subscription. Idempotent.
    pub fn unmount(&mut self) -> bool {
        self.subscription.release()
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.is_active()
    }
}
