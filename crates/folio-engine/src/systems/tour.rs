//! Guided tour: a state machine over a fixed list of section steps.
//!
//! States are `Idle` and `Active(step)`, with `minimized` as an overlay on
//! `Active` that never touches progress. Navigation calls that do not apply
//! to the current state are silent no-ops, since UI buttons can race the
//! tour ending.

use serde::Serialize;

use crate::api::host::{KeyValueStore, SectionScroller};
use crate::api::page::TourConfig;
use crate::components::tour_step::{StepPlacement, TourStep};
use crate::core::time::TimerQueue;

/// Lifecycle of the one-time "want a tour?" offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptState {
    /// The visitor has already seen the tour; never offered.
    Suppressed,
    /// Waiting for the offer delay.
    Pending,
    /// Visible and actionable.
    Offered,
    /// Accepted, dismissed, expired or made moot by starting the tour.
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TourTimer {
    OfferPrompt,
    ExpirePrompt,
}

/// Expanded step card contents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepCard {
    pub id: String,
    pub content: String,
    pub placement: StepPlacement,
    /// 1-based.
    pub step_number: usize,
    pub step_count: usize,
    pub prev_enabled: bool,
    pub next_label: &'static str,
}

/// What the tour UI should show.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TourView {
    /// Floating "Start Tour" button.
    Trigger,
    Card(StepCard),
    /// Collapsed bubble; clicking it expands the card again.
    Minimized { step_number: usize, step_count: usize },
}

pub struct TourEngine {
    steps: Vec<TourStep>,
    config: TourConfig,
    active: bool,
    current: usize,
    minimized: bool,
    has_seen_tour: bool,
    prompt: PromptState,
    timers: TimerQueue<TourTimer>,
    storage: Box<dyn KeyValueStore>,
    scroller: Box<dyn SectionScroller>,
}

impl TourEngine {
    /// Mount the tour. Reads the persisted flag once and, for a first-time
    /// visitor, arms the delayed prompt.
    pub fn mount(
        steps: Vec<TourStep>,
        config: TourConfig,
        storage: Box<dyn KeyValueStore>,
        scroller: Box<dyn SectionScroller>,
    ) -> Self {
        let has_seen_tour = storage
            .get(&config.storage_key)
            .is_some_and(|v| !v.is_empty());

        let mut timers = TimerQueue::new();
        let prompt = if has_seen_tour {
            PromptState::Suppressed
        } else {
            timers.schedule(config.prompt_delay_secs, TourTimer::OfferPrompt);
            PromptState::Pending
        };
        log::debug!("tour: mounted {} steps, seen={}", steps.len(), has_seen_tour);

        Self {
            steps,
            config,
            active: false,
            current: 0,
            minimized: false,
            has_seen_tour,
            prompt,
            timers,
            storage,
            scroller,
        }
    }

    /// Advance the prompt timers by `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        self.timers.advance(dt);
        while let Some(timer) = self.timers.pop_due() {
            match timer {
                TourTimer::OfferPrompt => {
                    if self.prompt == PromptState::Pending && !self.has_seen_tour {
                        self.prompt = PromptState::Offered;
                        self.timers
                            .schedule(self.config.prompt_duration_secs, TourTimer::ExpirePrompt);
                        log::info!("tour: offering tour");
                    }
                }
                TourTimer::ExpirePrompt => {
                    if self.prompt == PromptState::Offered {
                        self.prompt = PromptState::Closed;
                    }
                }
            }
        }
    }

    /// Start (or restart) the tour at the first step. Allowed from any state.
    pub fn start(&mut self) -> bool {
        if self.steps.is_empty() {
            log::warn!("tour: no steps, not starting");
            return false;
        }
        let changed = !self.active || self.current != 0;

        self.active = true;
        self.current = 0;
        self.minimized = false;
        self.persist_seen();
        self.close_prompt();

        if changed {
            self.scroll_to_current();
        }
        true
    }

    /// Go to the next step, or end the tour from the last one.
    pub fn next(&mut self) -> bool {
        if !self.active {
            return false;
        }
        if self.current + 1 < self.steps.len() {
            self.current += 1;
            self.scroll_to_current();
        } else {
            self.end();
        }
        true
    }

    /// Go back one step. No-op on the first step.
    pub fn prev(&mut self) -> bool {
        if !self.active || self.current == 0 {
            return false;
        }
        self.current -= 1;
        self.scroll_to_current();
        true
    }

    /// Leave the tour. `minimized` is left as it was.
    pub fn end(&mut self) -> bool {
        let was_active = self.active;
        self.active = false;
        self.current = 0;
        was_active
    }

    pub fn toggle_minimize(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.minimized = !self.minimized;
        true
    }

    /// Accept the offered prompt: starts the tour.
    pub fn accept_prompt(&mut self) -> bool {
        if self.prompt != PromptState::Offered {
            return false;
        }
        self.prompt = PromptState::Closed;
        self.start()
    }

    pub fn dismiss_prompt(&mut self) -> bool {
        if self.prompt != PromptState::Offered {
            return false;
        }
        self.prompt = PromptState::Closed;
        self.timers.cancel_all();
        true
    }

    /// Cancel everything pending. The engine keeps answering queries.
    pub fn unmount(&mut self) {
        self.timers.cancel_all();
        self.close_prompt();
        log::debug!("tour: unmounted");
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn current_step_index(&self) -> usize {
        self.current
    }

    /// The step on screen, while active.
    pub fn current_step(&self) -> Option<&TourStep> {
        if self.active {
            self.steps.get(self.current)
        } else {
            None
        }
    }

    pub fn is_minimized(&self) -> bool {
        self.minimized
    }

    pub fn has_seen_tour(&self) -> bool {
        self.has_seen_tour
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn steps(&self) -> &[TourStep] {
        &self.steps
    }

    pub fn prompt_state(&self) -> PromptState {
        self.prompt
    }

    /// Prompt text while the offer is visible.
    pub fn prompt_text(&self) -> Option<&str> {
        (self.prompt == PromptState::Offered).then_some(self.config.prompt_text.as_str())
    }

    pub fn view(&self) -> TourView {
        let Some(step) = self.current_step() else {
            return TourView::Trigger;
        };
        let step_number = self.current + 1;
        let step_count = self.steps.len();
        if self.minimized {
            return TourView::Minimized { step_number, step_count };
        }
        TourView::Card(StepCard {
            id: step.id.clone(),
            content: step.content.clone(),
            placement: step.placement,
            step_number,
            step_count,
            prev_enabled: self.current > 0,
            next_label: if step_number == step_count { "Finish" } else { "Next" },
        })
    }

    fn persist_seen(&mut self) {
        self.storage.set(&self.config.storage_key, "true");
        self.has_seen_tour = true;
    }

    fn close_prompt(&mut self) {
        if matches!(self.prompt, PromptState::Pending | PromptState::Offered) {
            self.prompt = PromptState::Closed;
            self.timers.cancel_all();
        }
    }

    fn scroll_to_current(&mut self) {
        let selector = &self.steps[self.current].target_selector;
        if !self.scroller.scroll_into_view(selector) {
            log::warn!("tour: target `{}` not found, showing step without scrolling", selector);
        }
    }
}

impl std::fmt::Debug for TourEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TourEngine")
            .field("steps", &self.steps.len())
            .field("active", &self.active)
            .field("current", &self.current)
            .field("minimized", &self.minimized)
            .field("has_seen_tour", &self.has_seen_tour)
            .field("prompt", &self.prompt)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::host::{HeadlessDocument, MemoryStore};

    const SECTIONS: [&str; 6] = ["#home", "#about", "#skills", "#story", "#projects", "#contact"];

    fn steps(n: usize) -> Vec<TourStep> {
        (0..n)
            .map(|i| {
                TourStep::new(
                    format!("step-{i}"),
                    SECTIONS[i % SECTIONS.len()],
                    format!("Step {i}"),
                    StepPlacement::Right,
                )
            })
            .collect()
    }

    fn mount_with(
        n: usize,
        store: &MemoryStore,
        doc: &HeadlessDocument,
    ) -> TourEngine {
        TourEngine::mount(
            steps(n),
            TourConfig::default(),
            Box::new(store.clone()),
            Box::new(doc.clone()),
        )
    }

    fn mount(n: usize) -> (TourEngine, MemoryStore, HeadlessDocument) {
        let store = MemoryStore::new();
        let doc = HeadlessDocument::with_sections(SECTIONS);
        (mount_with(n, &store, &doc), store, doc)
    }

    #[test]
    fn starts_idle_with_trigger() {
        let (tour, _, _) = mount(3);
        assert!(!tour.is_active());
        assert_eq!(tour.view(), TourView::Trigger);
        assert_eq!(tour.current_step(), None);
    }

    #[test]
    fn start_resets_from_any_state() {
        let (mut tour, store, doc) = mount(4);
        tour.start();
        tour.next();
        tour.next();
        tour.toggle_minimize();
        assert_eq!(tour.current_step_index(), 2);

        assert!(tour.start());
        assert!(tour.is_active());
        assert_eq!(tour.current_step_index(), 0);
        assert!(!tour.is_minimized());
        assert_eq!(store.get("has-seen-tour").as_deref(), Some("true"));
        assert_eq!(doc.last_scrolled().as_deref(), Some("#home"));
    }

    #[test]
    fn restart_on_first_step_does_not_rescroll() {
        let (mut tour, _, doc) = mount(3);
        tour.start();
        tour.start();
        assert_eq!(doc.scrolled().len(), 1);
    }

    #[test]
    fn next_walks_to_last_then_ends() {
        let (mut tour, _, doc) = mount(4);
        tour.start();
        for expected in 1..4 {
            assert!(tour.next());
            assert_eq!(tour.current_step_index(), expected);
        }
        assert!(tour.is_active());
        assert!(tour.next());
        assert!(!tour.is_active());
        assert_eq!(tour.current_step_index(), 0);
        assert_eq!(doc.scrolled(), vec!["#home", "#about", "#skills", "#story"]);
    }

    #[test]
    fn prev_on_first_step_is_noop() {
        let (mut tour, _, doc) = mount(3);
        tour.start();
        assert!(!tour.prev());
        assert_eq!(tour.current_step_index(), 0);

        tour.next();
        assert!(tour.prev());
        assert_eq!(tour.current_step_index(), 0);
        assert_eq!(doc.scrolled(), vec!["#home", "#about", "#home"]);
    }

    #[test]
    fn stale_calls_are_noops() {
        let (mut tour, _, doc) = mount(3);
        assert!(!tour.next());
        assert!(!tour.prev());
        assert!(!tour.toggle_minimize());
        assert!(!tour.end());
        assert!(!tour.is_active());
        assert!(doc.scrolled().is_empty());
    }

    #[test]
    fn minimize_keeps_progress() {
        let (mut tour, _, _) = mount(5);
        tour.start();
        tour.next();
        tour.next();

        assert!(tour.toggle_minimize());
        assert_eq!(tour.current_step_index(), 2);
        assert_eq!(tour.view(), TourView::Minimized { step_number: 3, step_count: 5 });

        tour.next();
        assert_eq!(tour.current_step_index(), 3);
        assert!(tour.is_minimized());

        assert!(tour.toggle_minimize());
        assert!(!tour.is_minimized());
        assert_eq!(tour.current_step_index(), 3);
    }

    #[test]
    fn end_leaves_minimized_alone() {
        let (mut tour, _, _) = mount(3);
        tour.start();
        tour.toggle_minimize();
        assert!(tour.end());
        assert!(tour.is_minimized());
        assert_eq!(tour.view(), TourView::Trigger);

        tour.start();
        assert!(!tour.is_minimized());
    }

    #[test]
    fn missing_target_still_shows_step() {
        let store = MemoryStore::new();
        let doc = HeadlessDocument::with_sections(["#home"]);
        let mut tour = mount_with(3, &store, &doc);
        tour.start();
        tour.next();
        assert_eq!(tour.current_step().unwrap().target_selector, "#about");
        assert_eq!(doc.scrolled(), vec!["#home"]);
        assert!(matches!(tour.view(), TourView::Card(_)));
    }

    #[test]
    fn card_labels() {
        let (mut tour, _, _) = mount(2);
        tour.start();
        let TourView::Card(card) = tour.view() else {
            panic!("expected card");
        };
        assert_eq!(card.step_number, 1);
        assert!(!card.prev_enabled);
        assert_eq!(card.next_label, "Next");

        tour.next();
        let TourView::Card(card) = tour.view() else {
            panic!("expected card");
        };
        assert_eq!(card.step_number, 2);
        assert!(card.prev_enabled);
        assert_eq!(card.next_label, "Finish");
    }

    #[test]
    fn view_serializes_with_kind_tag() {
        let (mut tour, _, _) = mount(2);
        let idle = serde_json::to_value(tour.view()).unwrap();
        assert_eq!(idle["kind"], "trigger");

        tour.start();
        let card = serde_json::to_value(tour.view()).unwrap();
        assert_eq!(card["kind"], "card");
        assert_eq!(card["step_number"], 1);
        assert_eq!(card["placement"], "right");
    }

    #[test]
    fn empty_tour_cannot_start() {
        let (mut tour, store, _) = mount(0);
        assert!(!tour.start());
        assert!(!tour.is_active());
        assert!(store.is_empty());
    }

    #[test]
    fn prompt_offered_after_delay_then_expires() {
        let (mut tour, _, _) = mount(3);
        assert_eq!(tour.prompt_state(), PromptState::Pending);

        tour.advance(2.5);
        assert_eq!(tour.prompt_text(), None);
        tour.advance(0.5);
        assert_eq!(tour.prompt_state(), PromptState::Offered);
        assert!(tour.prompt_text().unwrap().contains("tour"));

        tour.advance(8.0);
        assert_eq!(tour.prompt_state(), PromptState::Closed);
        assert!(!tour.accept_prompt());
        assert!(!tour.is_active());
    }

    #[test]
    fn dismissed_prompt_cannot_be_accepted() {
        let (mut tour, store, _) = mount(3);
        tour.advance(3.0);
        assert!(tour.dismiss_prompt());
        assert!(!tour.dismiss_prompt());
        assert!(!tour.accept_prompt());
        assert!(store.is_empty());
    }

    #[test]
    fn starting_manually_cancels_pending_prompt() {
        let (mut tour, _, _) = mount(3);
        tour.advance(1.0);
        tour.start();
        tour.end();
        tour.advance(5.0);
        assert_eq!(tour.prompt_state(), PromptState::Closed);
        assert_eq!(tour.prompt_text(), None);
    }

    #[test]
    fn seen_flag_suppresses_prompt_on_reload() {
        let store = MemoryStore::new();
        let doc = HeadlessDocument::with_sections(SECTIONS);

        let mut first = mount_with(3, &store, &doc);
        first.start();
        first.unmount();

        let mut reloaded = mount_with(3, &store, &doc);
        assert!(reloaded.has_seen_tour());
        assert_eq!(reloaded.prompt_state(), PromptState::Suppressed);
        reloaded.advance(60.0);
        assert_eq!(reloaded.prompt_text(), None);
    }

    #[test]
    fn unmount_cancels_pending_prompt() {
        let (mut tour, _, _) = mount(3);
        tour.advance(2.0);
        tour.unmount();
        tour.advance(5.0);
        assert_eq!(tour.prompt_text(), None);
    }
}
