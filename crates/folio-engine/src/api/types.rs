use serde::{Deserialize, Serialize};

/// Opaque handle to a host element (a DOM node in the browser bridge).
/// The host owns the mapping; the engine only passes it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementRef(pub u32);

/// Unique identifier for an observed section in the visibility controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectionId(pub u32);

/// Handle returned by the host intersection primitive for one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObservationId(pub u32);

/// Margin around the viewport used when testing intersection, in CSS pixels.
/// Negative values shrink the effective viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RootMargin {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl RootMargin {
    pub const ZERO: Self = Self { top: 0.0, right: 0.0, bottom: 0.0, left: 0.0 };

    pub fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self { top, right, bottom, left }
    }

    /// CSS shorthand in top/right/bottom/left order, e.g. `"0px 0px -100px 0px"`.
    pub fn to_css(&self) -> String {
        format!("{}px {}px {}px {}px", self.top, self.right, self.bottom, self.left)
    }
}

impl Default for RootMargin {
    /// Reveal a little before the bottom edge: sections start animating
    /// once they are 100px inside the viewport.
    fn default() -> Self {
        Self::new(0.0, 0.0, -100.0, 0.0)
    }
}
