//! Pointer and scroll listeners feeding the runner's input queue.
//!
//! Attached while anything is subscribed to the pointer/scroll signal and
//! removed when the last subscriber goes. Each listener's removal is deferred
//! into one `Disposer`, so dropping `WindowListeners` detaches them all.

use std::cell::RefCell;
use std::rc::Rc;

use folio_engine::{Disposer, FolioError, InputEvent, InputQueue};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, EventTarget, MouseEvent, Window};

use crate::host::{document, js_error};

/// Elements that enlarge the cursor ring.
const INTERACTIVE: &str = "a, button";

type Shared = Rc<RefCell<InputQueue>>;

pub struct WindowListeners {
    bag: Disposer,
}

impl WindowListeners {
    pub fn attach(window: &Window, queue: Shared) -> Result<Self, FolioError> {
        let mut bag = Disposer::new();
        let doc = document(window)?;
        let root: EventTarget = doc
            .document_element()
            .ok_or_else(|| FolioError::HostUnavailable("documentElement".into()))?
            .into();
        let doc: EventTarget = doc.into();
        let win: EventTarget = window.clone().into();

        let w = window.clone();
        listen(&mut bag, &win, "pointermove", queue.clone(), move |event| {
            let mouse = event.dyn_ref::<MouseEvent>()?;
            let (width, height) = viewport(&w);
            Some(InputEvent::PointerMove {
                x: mouse.client_x() as f32,
                y: mouse.client_y() as f32,
                viewport_width: width,
                viewport_height: height,
            })
        })?;

        let w = window.clone();
        listen(&mut bag, &win, "scroll", queue.clone(), move |_| {
            let offset = w.scroll_y().unwrap_or(0.0) as f32;
            let document_height = w
                .document()
                .and_then(|d| d.document_element())
                .map_or(0.0, |root| root.scroll_height() as f32);
            let (_, viewport_height) = viewport(&w);
            Some(InputEvent::Scroll {
                offset,
                document_height,
                viewport_height,
            })
        })?;

        listen(&mut bag, &win, "mousedown", queue.clone(), |_| Some(InputEvent::PointerDown))?;
        listen(&mut bag, &win, "mouseup", queue.clone(), |_| Some(InputEvent::PointerUp))?;
        listen(&mut bag, &root, "mouseleave", queue.clone(), |_| Some(InputEvent::PointerLeave))?;
        listen(&mut bag, &root, "mouseenter", queue.clone(), |_| Some(InputEvent::PointerEnter))?;

        listen(&mut bag, &doc, "pointerover", queue, |event| {
            let hovering = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .and_then(|el| el.closest(INTERACTIVE).ok().flatten())
                .is_some();
            Some(InputEvent::HoverInteractive(hovering))
        })?;

        log::debug!("listeners: attached {}", bag.len());
        Ok(Self { bag })
    }

    pub fn detach(&mut self) -> bool {
        self.bag.dispose()
    }
}

fn viewport(window: &Window) -> (f32, f32) {
    let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;
    (dim(window.inner_width()), dim(window.inner_height()))
}

/// Add one listener that maps DOM events to input events, and defer its removal.
fn listen(
    bag: &mut Disposer,
    target: &EventTarget,
    kind: &'static str,
    queue: Shared,
    map: impl Fn(&Event) -> Option<InputEvent> + 'static,
) -> Result<(), FolioError> {
    let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        if let Some(input) = map(&event) {
            queue.borrow_mut().push(input);
        }
    });
    target
        .add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())
        .map_err(|err| js_error(kind, err))?;

    let target = target.clone();
    bag.defer(move || {
        let _ = target.remove_event_listener_with_callback(kind, callback.as_ref().unchecked_ref());
    });
    Ok(())
}
