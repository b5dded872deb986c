//! Scroll tracking hookup plus the navigation chrome: section reveal, dots,
//! scroll-to-top button, mobile menu and keyboard stepping.

use std::cell::Cell;
use std::rc::Rc;

use log::{debug, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Event, HtmlElement, KeyboardEvent, ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition};

use crate::config::HIDDEN_SECTION_OPACITY;
use crate::sections::{self, key_navigation_allowed, stagger_delay_ms, NavIntent, SectionRect, SECTIONS};

use super::app::Page;
use super::dom::{self, Listener};

const ACTIVE_CLASS: &str = "active";
const OPEN_CLASS: &str = "open";

/// Open state of the mobile menu and the scroll position it pinned.
#[derive(Debug, Default)]
pub struct MobileMenu {
    open: Cell<bool>,
    saved_scroll_y: Cell<f64>,
}

impl MobileMenu {
    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    /// Pins the body in place and pauses scroll tracking while the menu
    /// covers the page.
    pub fn open(&self, page: &Page) {
        if self.open.replace(true) {
            return;
        }
        page.suppression.set(true);
        let y = page.window.scroll_y().unwrap_or(0.0);
        self.saved_scroll_y.set(y);

        if let Some(body) = page.document.body() {
            let style = body.style();
            let _ = style.set_property("position", "fixed");
            let _ = style.set_property("top", &format!("-{y}px"));
            let _ = style.set_property("width", "100%");
        }
        toggle_class(&page.document, "mobile-menu", OPEN_CLASS, true);
        debug!("mobile menu opened at y={y}");
    }

    /// Releases the body, restores the scroll position, then resumes
    /// tracking.
    pub fn close(&self, page: &Page) {
        if !self.open.replace(false) {
            return;
        }
        if let Some(body) = page.document.body() {
            let style = body.style();
            for property in ["position", "top", "width"] {
                let _ = style.remove_property(property);
            }
        }
        toggle_class(&page.document, "mobile-menu", OPEN_CLASS, false);
        let restored = self.saved_scroll_y.get();
        page.eggs.borrow_mut().rebase_scroll(restored);
        page.window.scroll_to_with_x_and_y(0.0, restored);
        page.suppression.set(false);
    }

    pub fn toggle(&self, page: &Page) {
        if self.is_open() {
            self.close(page);
        } else {
            self.open(page);
        }
    }
}

const STAGGER_SELECTOR: &str = "[data-stagger]";
const SHOWN_CLASS: &str = "shown";

fn toggle_class(document: &Document, id: &str, class: &str, on: bool) {
    if let Some(el) = document.get_element_by_id(id) {
        let _ = el.class_list().toggle_with_force(class, on);
    }
}

/// Smoothly scrolls section `index` to the top of the viewport.
pub fn scroll_to_section(document: &Document, index: usize) {
    match dom::section_element(document, index) {
        Ok(el) => {
            let options = ScrollIntoViewOptions::new();
            options.set_behavior(ScrollBehavior::Smooth);
            options.set_block(ScrollLogicalPosition::Start);
            el.scroll_into_view_with_scroll_into_view_options(&options);
        }
        Err(e) => debug!("cannot scroll: {e}"),
    }
}

fn set_opacity(document: &Document, index: usize, opacity: f64) {
    if let Some(el) = dom::section_element(document, index)
        .ok()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    {
        let _ = el.style().set_property("opacity", &opacity.to_string());
    }
}

fn reveal(document: &Document, rects: &[Option<SectionRect>], viewport_height: f64) {
    for (index, rect) in rects.iter().enumerate() {
        let Some(rect) = rect else { continue };
        let opacity = if index == 0 || rect.is_revealed(viewport_height) {
            1.0
        } else {
            HIDDEN_SECTION_OPACITY
        };
        set_opacity(document, index, opacity);
    }
}

/// Feeds the current scroll position to the tracker, then relocates the
/// current section and updates section reveal. Suppressed scrolls are
/// ignored.
pub fn sync(page: &Page) {
    let geometry = dom::scroll_geometry(&page.window, &page.document);
    if !page.tracker.on_scroll(&geometry, &mut page.scroll.borrow_mut()) {
        return;
    }

    let rects = dom::section_rects(&page.document);
    if let Some(index) = sections::locate_nearest(&rects, geometry.viewport_height) {
        page.visual.request_section(index);
    }
    reveal(&page.document, &rects, geometry.viewport_height);
    stagger(page, &rects, geometry.viewport_height);
}

/// Starts the one-time entry animation of `[data-stagger]` items in sections
/// that just came into view, each item delayed a little more than the last.
fn stagger(page: &Page, rects: &[Option<SectionRect>], viewport_height: f64) {
    let mut shown = page.stagger.borrow_mut();
    for (index, rect) in rects.iter().enumerate() {
        let Some(rect) = rect else { continue };
        if !shown.reveal(index, rect, viewport_height) {
            continue;
        }
        let Ok(items) = dom::section_element(&page.document, index)
            .map_err(|e| debug!("stagger: {e}"))
            .and_then(|el| el.query_selector_all(STAGGER_SELECTOR).map_err(|_| ()))
        else {
            continue;
        };
        for i in 0..items.length() {
            let Some(item) = items.item(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) else {
                continue;
            };
            let delay = format!("{}ms", stagger_delay_ms(i as usize));
            let _ = item.style().set_property("transition-delay", &delay);
            let _ = item.class_list().add_1(SHOWN_CLASS);
        }
    }
}

fn build_dots(page: &Rc<Page>, listeners: &mut Vec<Listener>) -> Result<(), JsValue> {
    let Some(container) = page.document.get_element_by_id("section-dots") else {
        return Ok(());
    };
    for (index, section) in SECTIONS.iter().enumerate() {
        let dot = page.document.create_element("button")?;
        dot.set_class_name("section-dot");
        dot.set_attribute("aria-label", section.name)?;
        dot.set_attribute("title", section.name)?;
        dot.set_attribute("data-section", &index.to_string())?;
        container.append_child(&dot)?;

        let page = page.clone();
        listeners.push(Listener::new(&dot, "click", move |_| {
            scroll_to_section(&page.document, index);
        })?);
    }
    Ok(())
}

fn build_menu(page: &Rc<Page>, listeners: &mut Vec<Listener>) -> Result<(), JsValue> {
    if let Some(list) = page.document.get_element_by_id("mobile-menu-list") {
        for (index, section) in SECTIONS.iter().enumerate() {
            let item = page.document.create_element("a")?;
            item.set_attribute("href", &format!("#{}", section.id))?;
            item.set_text_content(Some(section.name));
            list.append_child(&item)?;

            let page = page.clone();
            listeners.push(Listener::new(&item, "click", move |event: Event| {
                event.prevent_default();
                page.menu.close(&page);
                scroll_to_section(&page.document, index);
            })?);
        }
    }

    if let Some(button) = page.document.get_element_by_id("menu-toggle") {
        let page = page.clone();
        listeners.push(Listener::new(&button, "click", move |_| {
            page.menu.toggle(&page);
        })?);
    }
    Ok(())
}

fn on_key(page: &Page, event: &KeyboardEvent) {
    let key = event.key();
    if page.menu.is_open() {
        if key == "Escape" {
            page.menu.close(page);
        }
        return;
    }
    if dom::target_tag(event).map_or(false, |tag| !key_navigation_allowed(&tag)) {
        return;
    }
    let Some(intent) = NavIntent::from_key(&key) else {
        return;
    };
    event.prevent_default();
    let current = page.visual.get().current_section;
    scroll_to_section(&page.document, intent.target(current, SECTIONS.len()));
}

/// Installs the scroll, resize, keyboard and chrome listeners.
pub fn attach(page: &Rc<Page>) -> Result<Vec<Listener>, JsValue> {
    let mut listeners = Vec::new();

    {
        let page = page.clone();
        listeners.push(Listener::new(&page.window.clone(), "scroll", move |_| sync(&page))?);
    }
    {
        let page = page.clone();
        listeners.push(Listener::new(&page.window.clone(), "resize", move |_| {
            page.orbs_dirty.set(true);
            sync(&page);
        })?);
    }
    {
        let page = page.clone();
        listeners.push(Listener::new(&page.window.clone(), "keydown", move |event: Event| {
            if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                on_key(&page, event);
            }
        })?);
    }
    if let Some(button) = page.document.get_element_by_id("scroll-to-top") {
        let page = page.clone();
        listeners.push(Listener::new(&button, "click", move |_| {
            scroll_to_section(&page.document, 0);
        })?);
    }

    build_dots(page, &mut listeners)?;
    build_menu(page, &mut listeners)?;
    Ok(listeners)
}

fn dots(document: &Document) -> Vec<Element> {
    let Ok(list) = document.query_selector_all(".section-dot") else {
        warn!("section dots unavailable");
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

/// Keeps the active dot and the scroll-to-top button in step with the
/// current section. Only touches the DOM when the section changes.
pub fn subscribe(page: &Page) {
    let document = page.document.clone();
    let last = Cell::new(None);
    page.visual.subscribe(move |state| {
        let current = state.current_section;
        if last.replace(Some(current)) == Some(current) {
            return;
        }
        for (index, dot) in dots(&document).iter().enumerate() {
            let _ = dot.class_list().toggle_with_force(ACTIVE_CLASS, index == current);
        }
        toggle_class(
            &document,
            "scroll-to-top",
            "visible",
            sections::show_scroll_to_top(current),
        );
    });
}
