//! The hidden developer console panel.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use log::{info, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, Event, HtmlElement, HtmlInputElement, KeyboardEvent, MouseEvent, TouchEvent, Window,
};

use crate::achievements::{AchievementRecord, AchievementStore};
use crate::devconsole::{self, DevConsole, Drag, FpsGrade, PanelLayout};
use crate::storage::KeyValueStore;
use crate::visual::VisualState;

use super::app::Page;
use super::dom::{self, Listener};

const TOGGLE_TOUCHES: u32 = 4;
const SETTING_ATTR: &str = "data-setting";

pub struct ConsolePanel {
    model: RefCell<DevConsole>,
    panel: Option<HtmlElement>,
    readout: Option<Element>,
    fps: Option<HtmlElement>,
    list: Option<Element>,
    progress: Option<Element>,
    sliders: Vec<HtmlInputElement>,
    scale: Option<HtmlInputElement>,
    layout: Cell<PanelLayout>,
    drag: Cell<Option<Drag>>,
    storage: Rc<dyn KeyValueStore>,
}

impl ConsolePanel {
    /// Looks up the panel elements. A page without a console panel still
    /// gets the keyboard toggle, which enables achievements.
    pub fn mount(window: &Window, document: &Document, storage: Rc<dyn KeyValueStore>) -> Self {
        let layout = PanelLayout::load(&*storage, dom::viewport_width(window), dom::viewport_height(window));
        let panel = Self {
            model: RefCell::new(DevConsole::new()),
            panel: dom::by_id(document, "dev-console"),
            readout: document.get_element_by_id("dev-console-readout"),
            fps: dom::by_id(document, "dev-console-fps"),
            list: document.get_element_by_id("dev-console-achievements"),
            progress: document.get_element_by_id("dev-console-progress"),
            sliders: sliders(document),
            scale: dom::by_id(document, "dev-console-scale"),
            layout: Cell::new(layout),
            drag: Cell::new(None),
            storage,
        };
        panel.apply_layout();
        panel
    }

    fn apply_layout(&self) {
        let layout = self.layout.get();
        if let Some(panel) = &self.panel {
            for (name, value) in layout.style_properties() {
                let _ = panel.style().set_property(name, &value);
            }
        }
        if let Some(slider) = &self.scale {
            slider.set_value(&layout.scale.to_string());
            if let Some(label) = slider.next_element_sibling() {
                label.set_text_content(Some(&layout.scale_percent()));
            }
        }
    }

    fn grab(&self, event: &MouseEvent) {
        let tag = dom::target_tag(event).unwrap_or_default();
        let grab = Drag::start(
            &tag,
            event.client_x() as f64,
            event.client_y() as f64,
            self.layout.get().position,
        );
        self.drag.set(grab);
    }

    fn drag_to(&self, event: &MouseEvent) {
        let Some(drag) = self.drag.get() else {
            return;
        };
        let mut layout = self.layout.get();
        layout.position = drag.moved(event.client_x() as f64, event.client_y() as f64);
        self.layout.set(layout);
        self.apply_layout();
    }

    fn release(&self) {
        if self.drag.take().is_none() {
            return;
        }
        if let Err(e) = self.layout.get().save_position(&*self.storage) {
            warn!("could not save console position: {e}");
        }
    }

    fn rescale(&self, value: f64) {
        let mut layout = self.layout.get();
        layout.set_scale(value);
        self.layout.set(layout);
        self.apply_layout();
        if let Err(e) = layout.save_scale(&*self.storage) {
            warn!("could not save console scale: {e}");
        }
    }

    pub fn toggle(&self, page: &Page) {
        let visible = match self.model.borrow_mut().toggle(&page.achievements) {
            Ok(visible) => visible,
            Err(e) => {
                warn!("dev console: {e}");
                return;
            }
        };
        if let Some(panel) = &self.panel {
            let _ = panel.class_list().toggle_with_force("visible", visible);
        }
        if visible {
            self.render_achievements(&page.achievements.records());
        }
        info!("dev console {}", if visible { "opened" } else { "closed" });
    }

    /// Counts the frame and, while open, refreshes the readout.
    pub fn frame(&self, page: &Page, state: &VisualState, now_ms: f64) {
        let mut model = self.model.borrow_mut();
        model.frame(now_ms);
        if !model.is_visible() {
            return;
        }

        let readout = model.readout(state, &page.achievements);
        if let Some(el) = &self.readout {
            el.set_text_content(Some(&readout.lines().join("\n")));
        }
        if let Some(el) = &self.fps {
            el.set_text_content(Some(&readout.fps.to_string()));
            let _ = el
                .style()
                .set_property("color", FpsGrade::of(readout.fps).css_color());
        }
    }

    fn render_achievements(&self, records: &[AchievementRecord]) {
        render_achievements(self.list.as_ref(), self.progress.as_ref(), records);
    }

    /// Keeps the sliders in step with the settings bus and the achievement
    /// list in step with the store.
    pub fn subscribe(&self, page: &Page) {
        let sliders = self.sliders.clone();
        page.settings.subscribe(move |settings| {
            for slider in &sliders {
                let Some(key) = slider.get_attribute(SETTING_ATTR) else {
                    continue;
                };
                if let Some((_, value)) = settings.entries().into_iter().find(|(k, _)| *k == key) {
                    slider.set_value(&value.to_string());
                    if let Some(label) = slider.next_element_sibling() {
                        label.set_text_content(Some(&format!("{value:.1}")));
                    }
                }
            }
        });

        let store: Weak<AchievementStore> = Rc::downgrade(&page.achievements);
        let list = self.list.clone();
        let progress = self.progress.clone();
        page.achievements.subscribe(move |_| {
            if let Some(store) = store.upgrade() {
                render_achievements(list.as_ref(), progress.as_ref(), &store.records());
            }
        });
    }

    /// Installs the toggle gestures and the panel controls.
    pub fn attach(&self, page: &Rc<Page>) -> Result<Vec<Listener>, JsValue> {
        let mut listeners = Vec::new();

        {
            let page = page.clone();
            listeners.push(Listener::new(&page.window.clone(), "keydown", move |event: Event| {
                let Some(key) = event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key) else {
                    return;
                };
                if DevConsole::is_toggle_key(&key) && !dom::is_text_input(&event) {
                    page.console.toggle(&page);
                }
            })?);
        }
        {
            let page = page.clone();
            listeners.push(Listener::new(&page.document.clone(), "touchstart", move |event: Event| {
                let touches = event
                    .dyn_ref::<TouchEvent>()
                    .map_or(0, |e| e.touches().length());
                if touches >= TOGGLE_TOUCHES {
                    page.console.toggle(&page);
                }
            })?);
        }

        if let Some(panel) = &self.panel {
            let page = page.clone();
            listeners.push(Listener::new(panel, "mousedown", move |event: Event| {
                if let Some(event) = event.dyn_ref::<MouseEvent>() {
                    page.console.grab(event);
                }
            })?);
        }
        {
            let page = page.clone();
            listeners.push(Listener::new(&page.document.clone(), "mousemove", move |event: Event| {
                if let Some(event) = event.dyn_ref::<MouseEvent>() {
                    page.console.drag_to(event);
                }
            })?);
        }
        {
            let page = page.clone();
            listeners.push(Listener::new(&page.document.clone(), "mouseup", move |_| {
                page.console.release();
            })?);
        }
        if let Some(slider) = &self.scale {
            let input = slider.clone();
            let page = page.clone();
            listeners.push(Listener::new(slider, "input", move |_| {
                match input.value().trim().parse::<f64>() {
                    Ok(value) => page.console.rescale(value),
                    Err(_) => warn!("ignoring non-numeric console scale"),
                }
            })?);
        }

        for slider in &self.sliders {
            let Some(key) = slider.get_attribute(SETTING_ATTR) else {
                continue;
            };
            let input = slider.clone();
            let page = page.clone();
            listeners.push(Listener::new(slider, "input", move |_| {
                match input.value().trim().parse::<f64>() {
                    Ok(value) => {
                        devconsole::apply_setting(&page.settings, &key, value);
                    }
                    Err(_) => warn!("ignoring non-numeric value for {key}"),
                }
            })?);
        }

        if let Some(button) = page.document.get_element_by_id("reset-settings") {
            let page = page.clone();
            listeners.push(Listener::new(&button, "click", move |_| {
                devconsole::reset_settings(&page.settings);
            })?);
        }
        if let Some(button) = page.document.get_element_by_id("reset-achievements") {
            let page = page.clone();
            listeners.push(Listener::new(&button, "click", move |_| {
                let confirmed = page
                    .window
                    .confirm_with_message("Reset all achievements?")
                    .unwrap_or(false);
                if !confirmed {
                    return;
                }
                if let Err(e) = page.achievements.reset() {
                    warn!("could not reset achievements: {e}");
                }
            })?);
        }

        Ok(listeners)
    }
}

fn sliders(document: &Document) -> Vec<HtmlInputElement> {
    let Ok(nodes) = document.query_selector_all(&format!("input[{SETTING_ATTR}]")) else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<HtmlInputElement>().ok())
        .collect()
}

fn render_achievements(list: Option<&Element>, progress: Option<&Element>, records: &[AchievementRecord]) {
    let unlocked = records.iter().filter(|r| r.unlocked).count();
    if let Some(progress) = progress {
        progress.set_text_content(Some(&format!("{unlocked}/{}", records.len())));
    }
    let Some(list) = list else {
        return;
    };
    let Some(document) = list.owner_document() else {
        return;
    };

    list.set_inner_html("");
    for record in records {
        let Ok(item) = document.create_element("li") else {
            continue;
        };
        let (class, icon) = if record.unlocked {
            ("unlocked", record.icon.as_str())
        } else {
            ("locked", "🔒")
        };
        item.set_class_name(class);
        item.set_text_content(Some(&format!(
            "{icon} {} - {}",
            record.name, record.description
        )));
        let _ = list.append_child(&item);
    }
}
