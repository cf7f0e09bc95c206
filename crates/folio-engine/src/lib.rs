pub mod api;
pub mod core;
pub mod components;
pub mod systems;
pub mod input;

// Re-export key types at crate root for convenience
pub use api::error::FolioError;
pub use api::host::{
    HeadlessDocument, HeadlessObserver, IntersectionSource, KeyValueStore, MemoryStore,
    ObserverOptions, SectionScroller,
};
pub use api::page::{Page, PageConfig, TourConfig};
pub use api::types::{ElementRef, ObservationId, RootMargin, SectionId};
pub use components::avatar::{AvatarKinematics, AvatarPose};
pub use components::reveal::{AnimationVariant, PlayState, RevealConfig, RevealMarkup, RevealStyle};
pub use components::tour_step::{StepPlacement, TourManifest, TourStep};
pub use crate::core::lifecycle::Disposer;
pub use crate::core::time::{TimerId, TimerQueue};
pub use input::queue::{InputEvent, InputQueue};
pub use input::signal::{PointerScrollSignal, SignalReader, SignalSource, Subscription};
pub use systems::animator::{step, FrameAnimator};
pub use systems::cursor::{CursorFollower, CursorState};
pub use systems::tour::{PromptState, StepCard, TourEngine, TourView};
pub use systems::visibility::{ObservedSections, RevealChange, VisibilityController};
