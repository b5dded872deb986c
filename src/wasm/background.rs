use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::warn;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{Document, HtmlElement};

use crate::color::Rgb;
use crate::orbs::{self, ORB_COUNT};
use crate::visual::Publisher;

use super::app::Page;
use super::dom;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn request_frame(callback: &Closure<dyn FnMut(f64)>) -> Result<i32, JsValue> {
    dom::window()
        .map_err(dom::js_error)?
        .request_animation_frame(callback.as_ref().unchecked_ref())
}

/// A self-rescheduling `requestAnimationFrame` chain. Stopping (or dropping)
/// cancels the pending frame and frees the callback.
pub struct FrameLoop {
    running: Rc<Cell<bool>>,
    pending: Rc<Cell<Option<i32>>>,
    callback: FrameCallback,
}

impl FrameLoop {
    pub fn start(mut tick: impl FnMut(f64) + 'static) -> Result<Self, JsValue> {
        // `f` holds the frame closure so it can hand itself to
        // `request_animation_frame` again from inside its own body.
        let f: FrameCallback = Rc::new(RefCell::new(None));
        let g = f.clone();
        let running = Rc::new(Cell::new(true));
        let pending = Rc::new(Cell::new(None));

        {
            let running = running.clone();
            let pending = pending.clone();
            *g.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
                pending.set(None);
                if !running.get() {
                    return;
                }
                tick(timestamp);

                let next = match f.borrow().as_ref() {
                    Some(callback) => request_frame(callback),
                    None => return,
                };
                match next {
                    Ok(id) => pending.set(Some(id)),
                    Err(e) => {
                        warn!("animation frame unavailable, background stays static: {e:?}");
                        running.set(false);
                    }
                }
            }) as Box<dyn FnMut(f64)>));
        }

        let first = match g.borrow().as_ref() {
            Some(callback) => request_frame(callback)?,
            None => return Err(JsValue::from_str("frame callback missing")),
        };
        pending.set(Some(first));

        Ok(Self {
            running,
            pending,
            callback: g,
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Must not be called from inside the frame callback itself.
    pub fn stop(&self) {
        self.running.set(false);
        if let Some(id) = self.pending.take() {
            if let Ok(window) = dom::window() {
                let _ = window.cancel_animation_frame(id);
            }
        }
        self.callback.borrow_mut().take();
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Background orb elements, restyled only when their inputs change.
pub struct Orbs {
    elements: Vec<HtmlElement>,
    last_color: Cell<Option<Rgb>>,
    dirty: Rc<Cell<bool>>,
}

impl Orbs {
    /// Creates the orb elements inside `#background`, if the page has one.
    pub fn mount(document: &Document) -> Result<Self, JsValue> {
        let mut elements = Vec::with_capacity(ORB_COUNT);
        if let Some(container) = document.get_element_by_id("background") {
            for i in 0..ORB_COUNT {
                let orb = document.create_element("div")?.dyn_into::<HtmlElement>()?;
                orb.set_class_name(&format!("orb orb-{}", i + 1));
                container.append_child(&orb)?;
                elements.push(orb);
            }
        }
        Ok(Self {
            elements,
            last_color: Cell::new(None),
            dirty: Rc::new(Cell::new(true)),
        })
    }

    /// Flag to raise when settings or the viewport change.
    pub fn dirty_flag(&self) -> Rc<Cell<bool>> {
        self.dirty.clone()
    }

    fn update(&self, page: &Page, color: Rgb) {
        if !self.dirty.replace(false) && self.last_color.get() == Some(color) {
            return;
        }
        self.last_color.set(Some(color));

        let width = dom::window().map_or(0.0, |w| dom::viewport_width(&w));
        let styles = orbs::layout(color, &page.settings.effective(), width);
        for (element, style) in self.elements.iter().zip(styles.iter()) {
            element.style().set_css_text(&style.css());
        }
    }
}

/// One animation frame: ease the scroll fraction, publish the derived state,
/// repaint the orbs and run the frame-polled easter eggs.
pub fn frame(page: &Page, publisher: &Publisher, orbs: &Orbs, now_ms: f64) {
    let (moved, current, target) = {
        let mut scroll = page.scroll.borrow_mut();
        let moved = page.filter.tick(&mut scroll);
        (moved, scroll.current, scroll.target)
    };

    let color = page.gradient.interpolate(current);
    let state = publisher
        .publish_frame(moved, current, color)
        .unwrap_or_else(|| publisher.store().get());
    orbs.update(page, state.color);

    page.eggs.borrow_mut().poll(page, now_ms, target);
    page.console.frame(page, &state, now_ms);
}
