//! Feeds browser events into the trigger detectors and shows unlocks.

use std::rc::Rc;

use log::{debug, info, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{DeviceMotionEvent, Element, Event, HtmlElement, KeyboardEvent, MouseEvent};

use crate::achievements::{AchievementEvent, AchievementId, REPEAT_VISIT_THRESHOLD};
use crate::triggers::{
    april_fools_forced, burst_particles, Activity, IdleTimer, Konami, MarathonRunner, MouseRush, PerfectlyBalanced,
    RapidClicker, ShakeDetector, SpeedReader, TripleClick, PARTICLE_LIFETIME_MS,
};

use super::app::Page;
use super::dom::{self, Listener};

const TOAST_MS: i32 = 4_000;
const KONAMI_FLASH_MS: i32 = 1_000;
const HERO_HEADING: &str = "#hero h1";

/// Detector state for every event-driven achievement.
#[derive(Debug)]
pub struct EasterEggs {
    triple_click: TripleClick,
    rapid_clicker: RapidClicker,
    idle: IdleTimer,
    konami: Konami,
    shake: ShakeDetector,
    mouse_rush: MouseRush,
    marathon: MarathonRunner,
    speed_reader: SpeedReader,
    balanced: PerfectlyBalanced,
}

impl EasterEggs {
    pub fn new(loaded_at_ms: f64) -> Self {
        Self {
            triple_click: TripleClick::default(),
            rapid_clicker: RapidClicker::default(),
            idle: IdleTimer::default(),
            konami: Konami::default(),
            shake: ShakeDetector::default(),
            mouse_rush: MouseRush::default(),
            marathon: MarathonRunner::default(),
            speed_reader: SpeedReader::new(loaded_at_ms),
            balanced: PerfectlyBalanced::default(),
        }
    }

    /// Time-based checks, run once per animation frame.
    pub fn poll(&mut self, page: &Page, now_ms: f64, scroll_percent: f64) {
        if self.idle.poll(now_ms) {
            info!("💤 Still here?");
            set_idle_cursor(page, true);
            unlock(page, AchievementId::Patience);
        }
        if self.balanced.poll(now_ms, scroll_percent) {
            unlock(page, AchievementId::PerfectlyBalanced);
        }
    }

    /// Moves the marathon baseline to `scroll_top` without counting the jump.
    pub fn rebase_scroll(&mut self, scroll_top: f64) {
        self.marathon.rebase(scroll_top);
    }

    fn activity(&mut self, page: &Page, kind: Activity, now_ms: f64) {
        if self.idle.activity(kind, now_ms) {
            set_idle_cursor(page, false);
        }
    }
}

fn unlock(page: &Page, id: AchievementId) {
    if let Err(e) = page.achievements.unlock(id, dom::now_ms()) {
        warn!("could not record {}: {e}", id.as_str());
    }
}

fn set_idle_cursor(page: &Page, idle: bool) {
    if let Some(body) = page.document.body() {
        let _ = body.class_list().toggle_with_force("idle", idle);
    }
}

fn flash_body(page: &Page, class: &'static str, duration_ms: i32) {
    let Some(body) = page.document.body() else {
        return;
    };
    let _ = body.class_list().add_1(class);
    dom::after(&page.window, duration_ms, move || {
        let _ = body.class_list().remove_1(class);
    });
}

fn on_click(page: &Page, event: &Event, now_ms: f64) {
    let mut eggs = page.eggs.borrow_mut();
    eggs.activity(page, Activity::Interaction, now_ms);

    let on_heading = event
        .target()
        .and_then(|t| t.dyn_into::<Element>().ok())
        .and_then(|el| el.closest(HERO_HEADING).ok().flatten())
        .is_some();
    let triple = on_heading && eggs.triple_click.click(now_ms);
    let rapid = eggs.rapid_clicker.click(now_ms);
    drop(eggs);

    if triple {
        unlock(page, AchievementId::TripleClick);
    }
    if rapid {
        if let Some(click) = event.dyn_ref::<MouseEvent>() {
            burst(page, click.client_x() as f64, click.client_y() as f64);
        }
        unlock(page, AchievementId::RapidClicker);
    }
}

/// Scatters short-lived particles from the click point.
fn burst(page: &Page, x: f64, y: f64) {
    let Some(body) = page.document.body() else {
        return;
    };
    for (angle, delay_s) in burst_particles() {
        let particle = match page
            .document
            .create_element("div")
            .and_then(|el| el.dyn_into::<HtmlElement>().map_err(JsValue::from))
        {
            Ok(el) => el,
            Err(e) => {
                debug!("particle: {e:?}");
                return;
            }
        };
        particle.set_class_name("particle");
        particle.style().set_css_text(&format!(
            "left:{x}px;top:{y}px;--angle:{angle}deg;animation-delay:{delay_s}s"
        ));
        if body.append_child(&particle).is_err() {
            continue;
        }
        dom::after(&page.window, PARTICLE_LIFETIME_MS as i32, move || particle.remove());
    }
}

fn on_key(page: &Page, event: &KeyboardEvent, now_ms: f64) {
    let konami = {
        let mut eggs = page.eggs.borrow_mut();
        eggs.activity(page, Activity::Interaction, now_ms);
        eggs.konami.key(&event.key())
    };
    if konami {
        info!("konami code entered");
        flash_body(page, "konami-flash", KONAMI_FLASH_MS);
        unlock(page, AchievementId::Konami);
    }
}

fn on_motion(page: &Page, event: &DeviceMotionEvent, now_ms: f64) {
    let Some(acceleration) = event.acceleration_including_gravity() else {
        return;
    };
    let shaken = page.eggs.borrow_mut().shake.motion(
        acceleration.x().unwrap_or(0.0),
        acceleration.y().unwrap_or(0.0),
        acceleration.z().unwrap_or(0.0),
        now_ms,
    );
    if shaken {
        shuffle_colors(page);
        unlock(page, AchievementId::Shake);
    }
}

fn on_mouse_move(page: &Page, event: &MouseEvent, now_ms: f64) {
    let rushed = {
        let mut eggs = page.eggs.borrow_mut();
        eggs.activity(page, Activity::Motion, now_ms);
        eggs.mouse_rush
            .moved(event.client_x() as f64, event.client_y() as f64, now_ms)
    };
    if rushed {
        shuffle_colors(page);
        unlock(page, AchievementId::Shake);
    }
}

fn on_scroll(page: &Page, now_ms: f64) {
    let geometry = dom::scroll_geometry(&page.window, &page.document);
    let (marathon, speed_reader) = {
        let mut eggs = page.eggs.borrow_mut();
        eggs.activity(page, Activity::Motion, now_ms);
        // The menu pins the body at the top; that jump is not reading.
        if page.suppression.is_active() {
            return;
        }
        eggs.balanced.scrolled(now_ms);
        (
            eggs.marathon.scrolled(geometry.scroll_top),
            eggs.speed_reader.scrolled(&geometry, now_ms),
        )
    };
    if marathon {
        unlock(page, AchievementId::MarathonRunner);
    }
    if speed_reader {
        unlock(page, AchievementId::SpeedReader);
    }
}

/// Picks a random color variation for the orbs, the reward for shaking the
/// page. Shown only; the saved settings keep their value.
fn shuffle_colors(page: &Page) {
    let variation = (js_sys::Math::random() * 100.0).floor();
    page.settings.override_color_variation(variation);
    page.orbs_dirty.set(true);
}

/// Installs the listeners for every event-driven achievement.
pub fn attach(page: &Rc<Page>) -> Result<Vec<Listener>, JsValue> {
    let mut listeners = Vec::new();
    let window = page.window.clone();
    let document = page.document.clone();

    {
        let page = page.clone();
        listeners.push(Listener::new(&document, "click", move |event| {
            on_click(&page, &event, dom::now_ms());
        })?);
    }
    {
        let page = page.clone();
        listeners.push(Listener::new(&document, "copy", move |_| {
            unlock(&page, AchievementId::CopyCat);
        })?);
    }
    {
        let page = page.clone();
        listeners.push(Listener::new(&window, "keydown", move |event: Event| {
            if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                on_key(&page, event, dom::now_ms());
            }
        })?);
    }
    {
        let page = page.clone();
        listeners.push(Listener::new(&window, "devicemotion", move |event: Event| {
            if let Some(event) = event.dyn_ref::<DeviceMotionEvent>() {
                on_motion(&page, event, dom::now_ms());
            }
        })?);
    }
    {
        let page = page.clone();
        listeners.push(Listener::new(&window, "mousemove", move |event: Event| {
            if let Some(event) = event.dyn_ref::<MouseEvent>() {
                on_mouse_move(&page, event, dom::now_ms());
            }
        })?);
    }
    {
        let page = page.clone();
        listeners.push(Listener::new(&window, "scroll", move |_| {
            on_scroll(&page, dom::now_ms());
        })?);
    }
    for event in ["mousedown", "touchstart"] {
        let page = page.clone();
        listeners.push(Listener::new(&window, event, move |_| {
            page.eggs
                .borrow_mut()
                .activity(&page, Activity::Interaction, dom::now_ms());
        })?);
    }

    Ok(listeners)
}

/// Achievements decided at load time: time of visit, April Fools and
/// repeat visits.
pub fn on_load(page: &Page) {
    let time = dom::visit_time();
    for id in time.achievements() {
        unlock(page, id);
    }

    let forced = page
        .window
        .location()
        .search()
        .map_or(false, |search| april_fools_forced(&search));
    if forced || time.is_april_fools() {
        if let Some(body) = page.document.body() {
            let _ = body.style().set_property("transform", "rotate(180deg)");
        }
        unlock(page, AchievementId::AprilFools);
    }

    match page.achievements.record_visit() {
        Ok(previous) if previous >= REPEAT_VISIT_THRESHOLD => {
            unlock(page, AchievementId::RepeatVisitor);
        }
        Ok(_) => {}
        Err(e) => warn!("could not count visit: {e}"),
    }
}

/// Shows a toast for a few seconds whenever an achievement unlocks.
pub fn subscribe_toast(page: &Page) {
    let Some(toast) = dom::by_id::<HtmlElement>(&page.document, "achievement-toast") else {
        return;
    };
    let window = page.window.clone();
    page.achievements.subscribe(move |event| {
        let AchievementEvent::Unlocked(record) = event else {
            return;
        };
        toast.set_text_content(Some(&format!(
            "{} Achievement unlocked: {} - {}",
            record.icon, record.name, record.description
        )));
        let _ = toast.class_list().add_1("show");

        let toast = toast.clone();
        dom::after(&window, TOAST_MS, move || {
            let _ = toast.class_list().remove_1("show");
        });
    });
}
