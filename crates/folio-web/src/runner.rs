use std::cell::RefCell;
use std::rc::Rc;

use folio_engine::{
    AvatarPose, CursorFollower, FolioError, FrameAnimator, InputQueue, ObservedSections, Page,
    PageConfig, SectionId, SignalSource, TourEngine,
};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Window};

use crate::host::{
    apply_reveal_style, avatar_supported, document, js_error, reveal_config, window,
    DocumentScroller, DomIntersection, LocalStore,
};
use crate::listeners::WindowListeners;

/// Generic page runner that wires the engines to the browser.
///
/// Each concrete page creates a `thread_local!` PageRunner and exports free
/// functions via `#[wasm_bindgen]` (see `export_page!`), because
/// wasm-bindgen cannot export generic structs directly.
///
/// Browser callbacks never touch the engines. They push into the input
/// queue or the intersection inbox, which `tick` drains in order.
pub struct PageRunner<P: Page> {
    page: P,
    config: PageConfig,
    input: Rc<RefCell<InputQueue>>,
    signals: SignalSource,
    sections: ObservedSections<DomIntersection>,
    animator: Option<FrameAnimator>,
    cursor: Option<CursorFollower>,
    tour: Option<TourEngine>,
    listeners: Option<WindowListeners>,
    window: Option<Window>,
    /// Last pose, kept here so its pointer stays valid between ticks.
    pose: AvatarPose,
    initialized: bool,
}

impl<P: Page> PageRunner<P> {
    pub fn new(page: P) -> Self {
        let config = page.config();
        let window = web_sys::window();
        Self {
            page,
            config,
            input: Rc::new(RefCell::new(InputQueue::new())),
            signals: SignalSource::new(),
            sections: ObservedSections::new(DomIntersection::new(window.as_ref())),
            animator: None,
            cursor: None,
            tour: None,
            listeners: None,
            window,
            pose: AvatarPose::default(),
            initialized: false,
        }
    }

    /// Mount every engine against the live document. Call once after construction.
    pub fn init(&mut self) {
        if let Err(err) = self.mount() {
            log::error!("page: mount failed: {err}");
            return;
        }
        self.initialized = true;
        self.sync_listeners();
    }

    fn mount(&mut self) -> Result<(), FolioError> {
        self.config = self.page.config();
        let window = window()?;
        let document = document(&window)?;

        self.mount_sections(&document);

        match avatar_supported(&document, &self.config.avatar_canvas) {
            Ok(true) => {
                let animator = FrameAnimator::start(&self.signals.reader());
                self.pose = animator.pose();
                self.animator = Some(animator);
            }
            Ok(false) => log::warn!("avatar: no canvas or WebGL, avatar disabled"),
            Err(err) => log::warn!("avatar: {err}, avatar disabled"),
        }

        self.cursor = Some(CursorFollower::mount(&self.signals.reader()));

        self.tour = Some(TourEngine::mount(
            self.page.tour_steps(),
            self.config.tour.clone(),
            Box::new(LocalStore::open(&window)),
            Box::new(DocumentScroller::new(document)),
        ));
        Ok(())
    }

    /// Observe every reveal wrapper. A bad selector leaves the page without
    /// reveal sections; the other engines still mount.
    fn mount_sections(&mut self, document: &Document) {
        let nodes = match document.query_selector_all(&self.config.reveal_selector) {
            Ok(nodes) => nodes,
            Err(err) => {
                log::error!(
                    "page: {}, no reveal sections",
                    js_error(&format!("reveal selector `{}`", self.config.reveal_selector), err)
                );
                return;
            }
        };

        for i in 0..nodes.length() {
            let Some(element) = nodes.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            let config = reveal_config(&element, &self.config.reveal);
            let element = self.sections.source_mut().register(element);
            let id = self.sections.observe(element, config);
            self.apply_style(id);
        }
        log::info!(
            "page: {} reveal sections, {} revealed up front",
            self.sections.controller().len(),
            self.sections.controller().revealed_count()
        );
    }

    /// Run one frame: drain input, then intersections, then animate and
    /// advance the tour clock.
    pub fn tick(&mut self, dt: f32) {
        if !self.initialized {
            return;
        }

        let events = self.input.borrow_mut().drain();
        for event in &events {
            self.signals.apply(event);
            if let Some(cursor) = self.cursor.as_mut() {
                cursor.handle(event);
            }
        }

        for (id, intersecting) in self.sections.source_mut().take_entries() {
            if self.sections.on_intersection(id, intersecting).is_some() {
                self.apply_style(id);
            }
        }

        if let Some(animator) = self.animator.as_mut() {
            animator.tick(dt);
            self.pose = animator.pose();
        }

        if let Some(tour) = self.tour.as_mut() {
            tour.advance(f64::from(dt));
        }

        self.sync_listeners();
    }

    /// Unmount everything. Safe to call more than once.
    pub fn teardown(&mut self) {
        if !self.initialized {
            return;
        }
        self.initialized = false;

        if let Some(mut animator) = self.animator.take() {
            animator.stop();
        }
        if let Some(mut cursor) = self.cursor.take() {
            cursor.unmount();
        }
        if let Some(tour) = self.tour.as_mut() {
            tour.unmount();
        }
        self.sections.dispose_all();
        self.sync_listeners();
        log::info!("page: torn down");
    }

    fn apply_style(&self, id: SectionId) {
        let visibility = self.sections.controller();
        let (Some(style), Some(config), Some(element)) = (
            visibility.style(id),
            visibility.config(id),
            visibility.element(id),
        ) else {
            return;
        };
        if let Some(element) = self.sections.source().element(element) {
            apply_reveal_style(element, &style, &config.variant.css_class());
        }
    }

    /// Keep the window listeners attached exactly while something subscribes.
    fn sync_listeners(&mut self) {
        let wanted = self.initialized && self.signals.has_subscribers();
        let attached = self.listeners.is_some();

        if wanted && !attached {
            let Some(window) = self.window.as_ref() else {
                return;
            };
            match WindowListeners::attach(window, self.input.clone()) {
                Ok(listeners) => self.listeners = Some(listeners),
                Err(err) => {
                    // Do not retry every frame.
                    log::warn!("listeners: {err}");
                    self.window = None;
                }
            }
        } else if !wanted && attached {
            if let Some(mut listeners) = self.listeners.take() {
                listeners.detach();
            }
            self.input.borrow_mut().drain();
        }
    }

    // ---- Tour ----

    pub fn tour(&mut self) -> Option<&mut TourEngine> {
        self.tour.as_mut()
    }

    pub fn tour_view_json(&self) -> String {
        self.tour
            .as_ref()
            .and_then(|t| serde_json::to_string(&t.view()).ok())
            .unwrap_or_default()
    }

    pub fn tour_prompt_text(&self) -> Option<String> {
        self.tour.as_ref()?.prompt_text().map(str::to_string)
    }

    // ---- Avatar accessors ----

    pub fn avatar_pose_ptr(&self) -> *const f32 {
        self.pose.as_floats().as_ptr()
    }

    /// Floats behind `avatar_pose_ptr`; zero when the avatar is disabled.
    pub fn avatar_pose_floats(&self) -> u32 {
        if self.animator.is_some() {
            AvatarPose::FLOATS as u32
        } else {
            0
        }
    }

    pub fn avatar_speech_text(&self) -> String {
        match &self.animator {
            Some(animator) if animator.is_greeting() => self.page.greeting().to_string(),
            _ => String::new(),
        }
    }

    // ---- Cursor / sections ----

    pub fn cursor_state_json(&self) -> String {
        self.cursor
            .as_ref()
            .and_then(|c| serde_json::to_string(&c.state()).ok())
            .unwrap_or_default()
    }

    pub fn revealed_section_count(&self) -> u32 {
        self.sections.controller().revealed_count() as u32
    }
}

impl<P: Page> Drop for PageRunner<P> {
    fn drop(&mut self) {
        self.teardown();
    }
}
