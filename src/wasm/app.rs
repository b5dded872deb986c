//! Mounting: builds the shared page state, wires every subscriber and
//! listener, and owns them until `unmount`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{info, warn};
use wasm_bindgen::JsValue;
use web_sys::{Document, Window};

use crate::achievements::AchievementStore;
use crate::color::Gradient;
use crate::config::{SettingsBus, VisualSettings, PALETTE, SECTION_COUNT};
use crate::scroll::{ScrollState, ScrollTracker, SmoothingFilter, Suppression};
use crate::sections::StaggerReveal;
use crate::storage::{KeyValueStore, MemoryStore};
use crate::visual::VisualStore;

use super::background::{self, FrameLoop, Orbs};
use super::console::ConsolePanel;
use super::dom::{self, Listener, LocalStore};
use super::easter_eggs::{self, EasterEggs};
use super::navigation::{self, MobileMenu};

/// Everything the listeners and the frame loop share.
pub struct Page {
    pub window: Window,
    pub document: Document,
    pub gradient: Gradient,
    pub scroll: RefCell<ScrollState>,
    pub tracker: ScrollTracker,
    pub filter: SmoothingFilter,
    pub suppression: Suppression,
    pub visual: VisualStore,
    pub settings: Rc<SettingsBus>,
    pub achievements: Rc<AchievementStore>,
    pub orbs_dirty: Rc<Cell<bool>>,
    pub menu: MobileMenu,
    pub stagger: RefCell<StaggerReveal>,
    pub eggs: RefCell<EasterEggs>,
    pub console: ConsolePanel,
}

/// A mounted page. Dropping it removes every listener and stops the frame
/// loop.
pub struct App {
    page: Rc<Page>,
    _listeners: Vec<Listener>,
    frames: FrameLoop,
}

impl App {
    pub fn mount() -> Result<Self, JsValue> {
        let window = dom::window().map_err(dom::js_error)?;
        let document = dom::document().map_err(dom::js_error)?;

        let storage: Rc<dyn KeyValueStore> = match LocalStore::open(&window) {
            Ok(store) => Rc::new(store),
            Err(e) => {
                warn!("{e}, progress and settings will not persist");
                Rc::new(MemoryStore::new())
            }
        };

        let settings = Rc::new(SettingsBus::new(VisualSettings::load(&*storage)));
        let achievements = Rc::new(AchievementStore::load(storage.clone()));
        let gradient = Gradient::new(&PALETTE, SECTION_COUNT).map_err(dom::js_error)?;
        let visual = VisualStore::new();
        let publisher = visual.publisher().map_err(dom::js_error)?;
        let orbs = Orbs::mount(&document)?;
        let suppression = Suppression::new();

        let page = Rc::new(Page {
            gradient,
            scroll: RefCell::new(ScrollState::default()),
            tracker: ScrollTracker::new(suppression.clone()),
            filter: SmoothingFilter::default(),
            suppression,
            visual,
            settings,
            achievements,
            orbs_dirty: orbs.dirty_flag(),
            menu: MobileMenu::default(),
            stagger: RefCell::new(StaggerReveal::default()),
            eggs: RefCell::new(EasterEggs::new(dom::now_ms())),
            console: ConsolePanel::mount(&window, &document, storage.clone()),
            window,
            document,
        });

        subscribe_style_vars(&page)?;
        subscribe_settings(&page, storage);
        navigation::subscribe(&page);
        easter_eggs::subscribe_toast(&page);
        page.console.subscribe(&page);

        let mut listeners = navigation::attach(&page)?;
        listeners.extend(easter_eggs::attach(&page)?);
        listeners.extend(page.console.attach(&page)?);

        navigation::sync(&page);
        easter_eggs::on_load(&page);

        let frames = {
            let page = page.clone();
            FrameLoop::start(move |_timestamp| {
                background::frame(&page, &publisher, &orbs, dom::now_ms());
            })?
        };

        info!(
            "portfolio mounted: {} sections, {}/{} achievements",
            SECTION_COUNT,
            page.achievements.unlocked_count(),
            page.achievements.total()
        );
        Ok(Self {
            page,
            _listeners: listeners,
            frames,
        })
    }

    pub fn is_animating(&self) -> bool {
        self.frames.is_running()
    }
}

/// Mirrors every published state into the root element's custom properties.
fn subscribe_style_vars(page: &Page) -> Result<(), JsValue> {
    let root = dom::root_element(&page.document).map_err(dom::js_error)?;
    for (name, value) in page.visual.get().style_vars() {
        dom::set_style_var(&root, name, &value);
    }
    page.visual.subscribe(move |state| {
        for (name, value) in state.style_vars() {
            dom::set_style_var(&root, name, &value);
        }
    });
    Ok(())
}

/// Persists settings changes and flags the orbs for a relayout.
fn subscribe_settings(page: &Page, storage: Rc<dyn KeyValueStore>) {
    let dirty = page.orbs_dirty.clone();
    page.settings.subscribe(move |settings| {
        if let Err(e) = settings.save(&*storage) {
            warn!("could not save visual settings: {e}");
        }
        dirty.set(true);
    });
}
