//! Visibility controller: reveals sections as they scroll into view.
//!
//! Each observed section is independent: its own config, its own `revealed`
//! flag and at most one live registration with the host observer.
//!
//! Usage:
//!   let id = visibility.observe(element, RevealConfig::default(), &mut observer);
//!   // host callback:
//!   visibility.on_intersection(id, true, &mut observer);
//!   let style = visibility.style(id);
//!   // unmount:
//!   visibility.dispose(id, &mut observer);

use std::collections::HashMap;

use crate::api::host::{IntersectionSource, ObserverOptions};
use crate::api::types::{ElementRef, ObservationId, SectionId};
use crate::components::reveal::{validate_threshold, RevealConfig, RevealStyle};

/// A change of a section's `revealed` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealChange {
    Revealed,
    Hidden,
}

#[derive(Debug, Clone)]
struct Section {
    element: ElementRef,
    config: RevealConfig,
    revealed: bool,
    observation: Option<ObservationId>,
}

impl Section {
    fn options(&self) -> ObserverOptions {
        ObserverOptions {
            threshold: self.config.threshold,
            root_margin: self.config.root_margin,
        }
    }

    /// Permanently revealed: nothing can change this section any more.
    fn is_settled(&self) -> bool {
        self.config.once && self.revealed
    }
}

/// Manages every reveal section on the page.
#[derive(Debug)]
pub struct VisibilityController {
    sections: HashMap<SectionId, Section>,
    next_id: u32,
}

impl VisibilityController {
    pub fn new() -> Self {
        Self {
            sections: HashMap::new(),
            next_id: 1,
        }
    }

    /// Start observing `element`. If the host cannot observe, the section is
    /// revealed right away so its content is never stuck invisible.
    pub fn observe(
        &mut self,
        element: ElementRef,
        config: RevealConfig,
        source: &mut dyn IntersectionSource,
    ) -> SectionId {
        let id = SectionId(self.next_id);
        self.next_id += 1;

        let mut section = Section {
            element,
            config,
            revealed: false,
            observation: None,
        };
        section.observation = source.observe(id, element, &section.options());
        if section.observation.is_none() {
            log::warn!("visibility: observer unavailable, revealing {:?} immediately", id);
            section.revealed = true;
        }

        self.sections.insert(id, section);
        id
    }

    /// Host callback for one intersection entry.
    /// Returns the change it caused, if any. Callbacks for disposed or
    /// settled sections are ignored.
    pub fn on_intersection(
        &mut self,
        id: SectionId,
        is_intersecting: bool,
        source: &mut dyn IntersectionSource,
    ) -> Option<RevealChange> {
        let section = self.sections.get_mut(&id)?;
        if section.observation.is_none() {
            return None;
        }

        if is_intersecting {
            let changed = !section.revealed;
            section.revealed = true;
            if section.config.once {
                if let Some(observation) = section.observation.take() {
                    source.unobserve(observation);
                    log::debug!("visibility: {:?} revealed once, released", id);
                }
            }
            changed.then_some(RevealChange::Revealed)
        } else if !section.config.once && section.revealed {
            section.revealed = false;
            Some(RevealChange::Hidden)
        } else {
            None
        }
    }

    /// Change a section's threshold. The old registration is released and a
    /// new one made with the new options, unless the section is already
    /// permanently revealed. Values outside `[0, 1]` are rejected.
    pub fn set_threshold(
        &mut self,
        id: SectionId,
        threshold: f32,
        source: &mut dyn IntersectionSource,
    ) -> bool {
        let threshold = match validate_threshold(threshold) {
            Ok(threshold) => threshold,
            Err(err) => {
                log::warn!("visibility: {err}, keeping current threshold of {:?}", id);
                return false;
            }
        };
        let Some(section) = self.sections.get_mut(&id) else {
            return false;
        };
        if section.config.threshold == threshold {
            return false;
        }
        section.config.threshold = threshold;
        if section.is_settled() {
            return true;
        }

        if let Some(observation) = section.observation.take() {
            source.unobserve(observation);
        }
        section.observation = source.observe(id, section.element, &section.options());
        if section.observation.is_none() {
            section.revealed = true;
        }
        true
    }

    /// Stop observing and forget the section. Idempotent.
    pub fn dispose(&mut self, id: SectionId, source: &mut dyn IntersectionSource) -> bool {
        let Some(mut section) = self.sections.remove(&id) else {
            return false;
        };
        if let Some(observation) = section.observation.take() {
            source.unobserve(observation);
        }
        true
    }

    /// Dispose every section (page teardown).
    pub fn dispose_all(&mut self, source: &mut dyn IntersectionSource) {
        let ids: Vec<SectionId> = self.sections.keys().copied().collect();
        for id in ids {
            self.dispose(id, source);
        }
    }

    pub fn is_revealed(&self, id: SectionId) -> bool {
        self.sections.get(&id).is_some_and(|s| s.revealed)
    }

    /// Whether the section still holds a host registration.
    pub fn is_observing(&self, id: SectionId) -> bool {
        self.sections.get(&id).is_some_and(|s| s.observation.is_some())
    }

    pub fn config(&self, id: SectionId) -> Option<&RevealConfig> {
        self.sections.get(&id).map(|s| &s.config)
    }

    pub fn element(&self, id: SectionId) -> Option<ElementRef> {
        self.sections.get(&id).map(|s| s.element)
    }

    pub fn style(&self, id: SectionId) -> Option<RevealStyle> {
        self.sections
            .get(&id)
            .map(|s| RevealStyle::for_state(&s.config, s.revealed))
    }

    pub fn revealed_count(&self) -> usize {
        self.sections.values().filter(|s| s.revealed).count()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl Default for VisibilityController {
    fn default() -> Self {
        Self::new()
    }
}

/// A controller bundled with the intersection source it registers with.
///
/// Dropping it disposes every section, so no registration outlives the
/// page even when teardown is skipped.
#[derive(Debug)]
pub struct ObservedSections<S: IntersectionSource> {
    controller: VisibilityController,
    source: S,
}

impl<S: IntersectionSource> ObservedSections<S> {
    pub fn new(source: S) -> Self {
        Self {
            controller: VisibilityController::new(),
            source,
        }
    }

    pub fn observe(&mut self, element: ElementRef, config: RevealConfig) -> SectionId {
        self.controller.observe(element, config, &mut self.source)
    }

    pub fn on_intersection(&mut self, id: SectionId, is_intersecting: bool) -> Option<RevealChange> {
        self.controller.on_intersection(id, is_intersecting, &mut self.source)
    }

    pub fn set_threshold(&mut self, id: SectionId, threshold: f32) -> bool {
        self.controller.set_threshold(id, threshold, &mut self.source)
    }

    pub fn dispose(&mut self, id: SectionId) -> bool {
        self.controller.dispose(id, &mut self.source)
    }

    pub fn dispose_all(&mut self) {
        self.controller.dispose_all(&mut self.source);
    }

    pub fn controller(&self) -> &VisibilityController {
        &self.controller
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

impl<S: IntersectionSource> Drop for ObservedSections<S> {
    fn drop(&mut self) {
        if !self.controller.is_empty() {
            log::debug!("visibility: releasing {} sections on drop", self.controller.len());
            self.dispose_all();
        }
    }
}
