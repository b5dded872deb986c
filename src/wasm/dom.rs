//! Thin helpers over `web_sys`: geometry queries, style variables, storage
//! and listener ownership.

use log::debug;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{Document, Element, Event, EventTarget, HtmlElement, Storage, Window};

use crate::error::{PortfolioError, Result};
use crate::scroll::ScrollGeometry;
use crate::sections::{SectionRect, SECTIONS};
use crate::storage::KeyValueStore;
use crate::triggers::VisitTime;

pub fn window() -> Result<Window> {
    web_sys::window().ok_or(PortfolioError::Unavailable("window"))
}

pub fn document() -> Result<Document> {
    window()?
        .document()
        .ok_or(PortfolioError::Unavailable("document"))
}

pub fn root_element(document: &Document) -> Result<HtmlElement> {
    document
        .document_element()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        .ok_or(PortfolioError::Unavailable("documentElement"))
}

pub fn body(document: &Document) -> Result<HtmlElement> {
    document.body().ok_or(PortfolioError::Unavailable("body"))
}

pub fn by_id<T: JsCast>(document: &Document, id: &str) -> Option<T> {
    document.get_element_by_id(id)?.dyn_into::<T>().ok()
}

pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

fn js_number(value: std::result::Result<JsValue, JsValue>) -> f64 {
    value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
}

pub fn viewport_width(window: &Window) -> f64 {
    js_number(window.inner_width())
}

pub fn viewport_height(window: &Window) -> f64 {
    js_number(window.inner_height())
}

pub fn scroll_geometry(window: &Window, document: &Document) -> ScrollGeometry {
    ScrollGeometry {
        scroll_top: window.scroll_y().unwrap_or(0.0).max(0.0),
        document_height: document
            .document_element()
            .map_or(0.0, |el| el.scroll_height() as f64),
        viewport_height: viewport_height(window),
    }
}

/// Bounding rects of every section anchor, `None` for anchors missing from
/// the page.
pub fn section_rects(document: &Document) -> Vec<Option<SectionRect>> {
    SECTIONS
        .iter()
        .map(|section| {
            let Some(el) = document.get_element_by_id(section.id) else {
                debug!("section anchor #{} not found", section.id);
                return None;
            };
            let rect = el.get_bounding_client_rect();
            Some(SectionRect {
                top: rect.top(),
                height: rect.height(),
            })
        })
        .collect()
}

pub fn section_element(document: &Document, index: usize) -> Result<Element> {
    let id = SECTIONS
        .get(index)
        .map(|s| s.id)
        .ok_or_else(|| PortfolioError::MissingSection(index.to_string()))?;
    document
        .get_element_by_id(id)
        .ok_or_else(|| PortfolioError::MissingSection(id.to_string()))
}

/// Upper-case tag name of the element the event was aimed at.
pub fn target_tag(event: &Event) -> Option<String> {
    event
        .target()
        .and_then(|t| t.dyn_into::<Element>().ok())
        .map(|el| el.tag_name())
}

/// The event was aimed at a form field the visitor is typing into.
pub fn is_text_input(event: &Event) -> bool {
    target_tag(event).map_or(false, |tag| matches!(tag.as_str(), "INPUT" | "TEXTAREA" | "SELECT"))
}

pub fn set_style_var(root: &HtmlElement, name: &str, value: &str) {
    if let Err(e) = root.style().set_property(name, value) {
        debug!("could not set {name}: {e:?}");
    }
}

pub fn visit_time() -> VisitTime {
    let date = js_sys::Date::new_0();
    VisitTime {
        hour: date.get_hours(),
        weekday: date.get_day(),
        month: date.get_month() + 1,
        day: date.get_date(),
    }
}

pub fn js_error(e: PortfolioError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// `localStorage` behind the [`KeyValueStore`] seam.
pub struct LocalStore {
    storage: Storage,
}

impl LocalStore {
    pub fn open(window: &Window) -> Result<Self> {
        let storage = window
            .local_storage()
            .ok()
            .flatten()
            .ok_or(PortfolioError::Unavailable("localStorage"))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.storage
            .set_item(key, value)
            .map_err(|e| PortfolioError::Storage(format!("{e:?}")))
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.storage
            .remove_item(key)
            .map_err(|e| PortfolioError::Storage(format!("{e:?}")))
    }
}

/// An event listener that is removed again when dropped.
pub struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    pub fn new(
        target: &EventTarget,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> std::result::Result<Self, JsValue> {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            event,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}

/// Runs `f` once after `delay_ms`.
pub fn after(window: &Window, delay_ms: i32, f: impl FnOnce() + 'static) {
    let callback = Closure::once_into_js(f);
    if let Err(e) = window
        .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay_ms)
    {
        debug!("setTimeout failed: {e:?}");
    }
}
