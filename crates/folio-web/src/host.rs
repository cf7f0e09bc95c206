//! Browser implementations of the engine's host primitives.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use folio_engine::{
    ElementRef, FolioError, IntersectionSource, KeyValueStore, MemoryStore, ObservationId,
    ObserverOptions, RevealConfig, RevealMarkup, RevealStyle, SectionId, SectionScroller,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, HtmlCanvasElement, HtmlElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, ScrollBehavior, ScrollIntoViewOptions,
    ScrollLogicalPosition, Storage, Window,
};

pub(crate) fn js_error(what: &str, err: JsValue) -> FolioError {
    FolioError::HostUnavailable(format!("{what}: {err:?}"))
}

pub fn window() -> Result<Window, FolioError> {
    web_sys::window().ok_or_else(|| FolioError::HostUnavailable("window".into()))
}

pub fn document(window: &Window) -> Result<Document, FolioError> {
    window
        .document()
        .ok_or_else(|| FolioError::HostUnavailable("document".into()))
}

// ---- Storage ----

/// `localStorage`, or an in-memory map when the browser refuses it.
pub enum LocalStore {
    Browser(Storage),
    Memory(MemoryStore),
}

impl LocalStore {
    pub fn open(window: &Window) -> Self {
        match window.local_storage() {
            Ok(Some(storage)) => LocalStore::Browser(storage),
            Ok(None) => {
                log::warn!("storage: localStorage missing, tour flag will not persist");
                LocalStore::Memory(MemoryStore::new())
            }
            Err(err) => {
                log::warn!("storage: {}, tour flag will not persist", js_error("localStorage", err));
                LocalStore::Memory(MemoryStore::new())
            }
        }
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        match self {
            LocalStore::Browser(storage) => storage.get_item(key).ok().flatten(),
            LocalStore::Memory(memory) => memory.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) {
        match self {
            LocalStore::Browser(storage) => {
                if let Err(err) = storage.set_item(key, value) {
                    log::warn!("storage: write of `{key}` failed: {err:?}");
                }
            }
            LocalStore::Memory(memory) => memory.set(key, value),
        }
    }
}

// ---- Scrolling ----

pub struct DocumentScroller {
    document: Document,
}

impl DocumentScroller {
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

impl SectionScroller for DocumentScroller {
    fn scroll_into_view(&mut self, selector: &str) -> bool {
        let Ok(Some(element)) = self.document.query_selector(selector) else {
            return false;
        };
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        options.set_block(ScrollLogicalPosition::Start);
        element.scroll_into_view_with_scroll_into_view_options(&options);
        true
    }
}

// ---- Intersection ----

type EntryCallback = Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>;

struct Registration {
    observer: IntersectionObserver,
    element: ElementRef,
    _callback: EntryCallback,
}

/// One `IntersectionObserver` per registration, since threshold and root
/// margin are per-observer options. Entries land in an inbox drained by
/// the runner on its next tick.
pub struct DomIntersection {
    available: bool,
    elements: Vec<Element>,
    registrations: HashMap<ObservationId, Registration>,
    inbox: Rc<RefCell<VecDeque<(SectionId, bool)>>>,
    next_id: u32,
}

impl DomIntersection {
    pub fn new(window: Option<&Window>) -> Self {
        let available = window.is_some_and(|w| {
            js_sys::Reflect::has(w, &JsValue::from_str("IntersectionObserver")).unwrap_or(false)
        });
        if !available {
            log::warn!("visibility: IntersectionObserver unavailable");
        }
        Self {
            available,
            elements: Vec::new(),
            registrations: HashMap::new(),
            inbox: Rc::new(RefCell::new(VecDeque::new())),
            next_id: 1,
        }
    }

    /// Hand out a stable reference for a DOM element.
    pub fn register(&mut self, element: Element) -> ElementRef {
        self.elements.push(element);
        ElementRef(self.elements.len() as u32 - 1)
    }

    pub fn element(&self, element: ElementRef) -> Option<&Element> {
        self.elements.get(element.0 as usize)
    }

    /// Entries delivered since the last call, oldest first.
    pub fn take_entries(&mut self) -> Vec<(SectionId, bool)> {
        self.inbox.borrow_mut().drain(..).collect()
    }

    fn try_observe(
        &mut self,
        section: SectionId,
        element: ElementRef,
        options: &ObserverOptions,
    ) -> Result<ObservationId, FolioError> {
        let target = self
            .element(element)
            .cloned()
            .ok_or_else(|| FolioError::HostUnavailable(format!("element {element:?}")))?;

        let inbox = self.inbox.clone();
        let callback: EntryCallback = Closure::new(move |entries: js_sys::Array, _: IntersectionObserver| {
            let mut inbox = inbox.borrow_mut();
            for entry in entries.iter() {
                let entry: IntersectionObserverEntry = entry.unchecked_into();
                inbox.push_back((section, entry.is_intersecting()));
            }
        });

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(f64::from(options.threshold)));
        init.set_root_margin(&options.root_margin.to_css());

        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)
                .map_err(|err| js_error("IntersectionObserver", err))?;
        observer.observe(&target);

        let id = ObservationId(self.next_id);
        self.next_id += 1;
        self.registrations.insert(
            id,
            Registration {
                observer,
                element,
                _callback: callback,
            },
        );
        Ok(id)
    }
}

impl IntersectionSource for DomIntersection {
    fn observe(
        &mut self,
        section: SectionId,
        element: ElementRef,
        options: &ObserverOptions,
    ) -> Option<ObservationId> {
        if !self.available {
            return None;
        }
        match self.try_observe(section, element, options) {
            Ok(id) => Some(id),
            Err(err) => {
                log::warn!("visibility: {err}");
                None
            }
        }
    }

    fn unobserve(&mut self, observation: ObservationId) {
        let Some(registration) = self.registrations.remove(&observation) else {
            return;
        };
        if let Some(element) = self.element(registration.element) {
            registration.observer.unobserve(element);
        }
        registration.observer.disconnect();
    }
}

impl Drop for DomIntersection {
    fn drop(&mut self) {
        for (_, registration) in self.registrations.drain() {
            registration.observer.disconnect();
        }
    }
}

// ---- Markup ----

/// Section settings from the wrapper's `data-reveal*` attributes over `base`.
pub fn reveal_config(element: &Element, base: &RevealConfig) -> RevealConfig {
    let variant = element.get_attribute("data-reveal");
    let delay = element.get_attribute("data-reveal-delay");
    let threshold = element.get_attribute("data-reveal-threshold");
    let once = element.get_attribute("data-reveal-once");
    RevealMarkup {
        variant: variant.as_deref(),
        delay: delay.as_deref(),
        threshold: threshold.as_deref(),
        once: once.as_deref(),
    }
    .resolve(base)
}

/// Write a section's presentation onto its wrapper element.
pub fn apply_reveal_style(element: &Element, style: &RevealStyle, animation_class: &str) {
    let classes = element.class_list();
    let toggled = match &style.class {
        Some(class) => classes.add_1(class),
        None => classes.remove_1(animation_class),
    };
    if let Err(err) = toggled {
        log::warn!("visibility: class update failed: {err:?}");
    }

    let Some(html) = element.dyn_ref::<HtmlElement>() else {
        return;
    };
    let css = html.style();
    let properties = [
        ("opacity", style.opacity.to_string()),
        ("animation-delay", format!("{}ms", style.delay_ms)),
        ("animation-play-state", style.play_state.css().to_string()),
    ];
    for (name, value) in properties {
        if let Err(err) = css.set_property(name, &value) {
            log::warn!("visibility: set {name} failed: {err:?}");
        }
    }
}

// ---- Avatar ----

/// The avatar canvas exists and the browser can hand out a WebGL context.
/// Probed on a scratch canvas so the renderer's canvas stays unclaimed.
pub fn avatar_supported(document: &Document, canvas_selector: &str) -> Result<bool, FolioError> {
    let canvas = document
        .query_selector(canvas_selector)
        .map_err(|err| js_error("avatar canvas", err))?;
    if canvas.is_none() {
        return Ok(false);
    }

    let scratch: HtmlCanvasElement = document
        .create_element("canvas")
        .map_err(|err| js_error("canvas", err))?
        .dyn_into()
        .map_err(|_| FolioError::HostUnavailable("HtmlCanvasElement".into()))?;

    for kind in ["webgl2", "webgl"] {
        if let Ok(Some(_)) = scratch.get_context(kind) {
            return Ok(true);
        }
    }
    Ok(false)
}
