//! Host primitives the engines consume.
//!
//! The browser bridge implements these over `IntersectionObserver`,
//! `localStorage` and `Element.scrollIntoView`. The in-memory versions below
//! back headless runs and serve as the storage fallback when the browser
//! refuses `localStorage` (private mode, sandboxed iframes).

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use super::types::{ElementRef, ObservationId, RootMargin, SectionId};

/// Options passed to the intersection primitive for one registration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverOptions {
    pub threshold: f32,
    pub root_margin: RootMargin,
}

/// Viewport-intersection observation.
///
/// Callbacks are delivered back to the engine by the host, tagged with the
/// `SectionId` given at registration.
pub trait IntersectionSource {
    /// Start observing `element`. `None` means the primitive is unavailable.
    fn observe(
        &mut self,
        section: SectionId,
        element: ElementRef,
        options: &ObserverOptions,
    ) -> Option<ObservationId>;

    /// Stop observing. Called at most once per returned id.
    fn unobserve(&mut self, observation: ObservationId);
}

/// Durable string key-value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// Selector lookup plus smooth scroll-into-view, aligned to the viewport top.
pub trait SectionScroller {
    /// Returns false when the selector matches nothing; nothing scrolls then.
    fn scroll_into_view(&mut self, selector: &str) -> bool;
}

/// In-memory storage. Clones share the same map, which models several page
/// loads against one browser profile.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
    }
}

/// Headless document: a fixed set of selectors that exist, and a record of
/// every scroll request that found its target. Clones share the record.
#[derive(Debug, Clone, Default)]
pub struct HeadlessDocument {
    known: HashSet<String>,
    scrolled: Rc<RefCell<Vec<String>>>,
}

impl HeadlessDocument {
    pub fn with_sections<I, S>(selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known: selectors.into_iter().map(Into::into).collect(),
            scrolled: Rc::default(),
        }
    }

    /// Selectors scrolled to so far, oldest first.
    pub fn scrolled(&self) -> Vec<String> {
        self.scrolled.borrow().clone()
    }

    pub fn last_scrolled(&self) -> Option<String> {
        self.scrolled.borrow().last().cloned()
    }
}

impl SectionScroller for HeadlessDocument {
    fn scroll_into_view(&mut self, selector: &str) -> bool {
        if self.known.contains(selector) {
            self.scrolled.borrow_mut().push(selector.to_string());
            true
        } else {
            false
        }
    }
}

/// Headless intersection primitive that records registrations.
/// The test or driver delivers callbacks itself. Clones share the same
/// record, so a handle kept aside still sees releases made by its owner.
#[derive(Debug, Clone)]
pub struct HeadlessObserver {
    available: bool,
    record: Rc<RefCell<ObserverRecord>>,
}

#[derive(Debug, Default)]
struct ObserverRecord {
    next_id: u32,
    active: HashMap<ObservationId, (SectionId, ObserverOptions)>,
    unobserve_calls: usize,
}

impl HeadlessObserver {
    pub fn new() -> Self {
        Self {
            available: true,
            record: Rc::new(RefCell::new(ObserverRecord {
                next_id: 1,
                ..ObserverRecord::default()
            })),
        }
    }

    /// An observer whose primitive is missing: every `observe` fails.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// Sections currently observed.
    pub fn active_count(&self) -> usize {
        self.record.borrow().active.len()
    }

    pub fn is_observing(&self, section: SectionId) -> bool {
        self.record.borrow().active.values().any(|(s, _)| *s == section)
    }

    /// Options of the live registration for `section`, if any.
    pub fn options_for(&self, section: SectionId) -> Option<ObserverOptions> {
        self.record
            .borrow()
            .active
            .values()
            .find(|(s, _)| *s == section)
            .map(|(_, o)| *o)
    }

    pub fn unobserve_calls(&self) -> usize {
        self.record.borrow().unobserve_calls
    }
}

impl Default for HeadlessObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl IntersectionSource for HeadlessObserver {
    fn observe(
        &mut self,
        section: SectionId,
        _element: ElementRef,
        options: &ObserverOptions,
    ) -> Option<ObservationId> {
        if !self.available {
            return None;
        }
        let mut record = self.record.borrow_mut();
        let id = ObservationId(record.next_id);
        record.next_id += 1;
        record.active.insert(id, (section, *options));
        Some(id)
    }

    fn unobserve(&mut self, observation: ObservationId) {
        let mut record = self.record.borrow_mut();
        record.unobserve_calls += 1;
        record.active.remove(&observation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_clones_share_entries() {
        let mut a = MemoryStore::new();
        let b = a.clone();
        assert_eq!(b.get("has-seen-tour"), None);
        a.set("has-seen-tour", "true");
        assert_eq!(b.get("has-seen-tour").as_deref(), Some("true"));
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn headless_document_only_scrolls_known_targets() {
        let mut doc = HeadlessDocument::with_sections(["#home", "#about"]);
        assert!(doc.scroll_into_view("#about"));
        assert!(!doc.scroll_into_view("#missing"));
        assert_eq!(doc.scrolled(), vec!["#about".to_string()]);
    }

    #[test]
    fn headless_observer_clones_share_registrations() {
        let mut obs = HeadlessObserver::new();
        let watcher = obs.clone();
        let opts = ObserverOptions { threshold: 0.2, root_margin: RootMargin::default() };
        let id = obs.observe(SectionId(3), ElementRef(0), &opts).unwrap();
        assert!(watcher.is_observing(SectionId(3)));
        obs.unobserve(id);
        assert_eq!(watcher.active_count(), 0);
        assert_eq!(watcher.unobserve_calls(), 1);
    }

    #[test]
    fn unavailable_observer_refuses() {
        let mut obs = HeadlessObserver::unavailable();
        let opts = ObserverOptions { threshold: 0.2, root_margin: RootMargin::default() };
        assert!(obs.observe(SectionId(1), ElementRef(1), &opts).is_none());
        assert_eq!(obs.active_count(), 0);
    }
}
