#![cfg(not(target_arch = "wasm32"))]

use std::cell::RefCell;
use std::rc::Rc;

use portfolio_wasm::achievements::{AchievementId, AchievementStore};
use portfolio_wasm::color::{Gradient, Rgb};
use portfolio_wasm::config::{SettingsBus, VisualSettings, PALETTE, SECTION_COUNT};
use portfolio_wasm::devconsole::apply_setting;
use portfolio_wasm::scroll::{ScrollGeometry, ScrollState, ScrollTracker, SmoothingFilter, Suppression};
use portfolio_wasm::sections::{locate_nearest, SectionRect};
use portfolio_wasm::storage::{keys, KeyValueStore, MemoryStore};
use portfolio_wasm::triggers::{Konami, MarathonRunner, KONAMI_CODE, MARATHON_DISTANCE_PX};
use portfolio_wasm::visual::{vars, VisualStore};
use simplelog::{Config, LevelFilter, TestLogger};

const VIEWPORT: f64 = 1_000.0;

fn init_logging() {
    let _ = TestLogger::init(LevelFilter::Debug, Config::default());
}

fn page_at(scroll_top: f64) -> ScrollGeometry {
    ScrollGeometry {
        scroll_top,
        document_height: VIEWPORT * SECTION_COUNT as f64,
        viewport_height: VIEWPORT,
    }
}

fn section_rects(scroll_top: f64) -> Vec<Option<SectionRect>> {
    (0..SECTION_COUNT)
        .map(|i| {
            Some(SectionRect {
                top: i as f64 * VIEWPORT - scroll_top,
                height: VIEWPORT,
            })
        })
        .collect()
}

#[test]
fn scroll_drives_color_and_section() {
    init_logging();
    let gradient = Gradient::new(&PALETTE, SECTION_COUNT).unwrap();
    let tracker = ScrollTracker::new(Suppression::new());
    let filter = SmoothingFilter::default();
    let store = VisualStore::new();
    let publisher = store.publisher().unwrap();

    let mirrored = Rc::new(RefCell::new(Vec::new()));
    {
        let mirrored = mirrored.clone();
        store.subscribe(move |state| *mirrored.borrow_mut() = state.style_vars().to_vec());
    }

    // Halfway down the scrollable distance.
    let geometry = page_at(4_000.0);
    let mut state = ScrollState::default();
    assert!(tracker.on_scroll(&geometry, &mut state));
    assert_eq!(state.target, 50.0);

    if let Some(index) = locate_nearest(&section_rects(geometry.scroll_top), VIEWPORT) {
        store.request_section(index);
    }

    let mut frames = 0;
    while filter.tick(&mut state) {
        publisher.publish(state.current, gradient.interpolate(state.current));
        frames += 1;
        assert!(frames <= 200, "filter did not settle");
    }

    let published = store.get();
    assert_eq!(published.scroll_percent, 50.0);
    assert_eq!(published.color, PALETTE[4]);
    assert_eq!(published.current_section, 4);

    let mirrored = mirrored.borrow();
    assert!(mirrored.contains(&(vars::ORB_R, "244".to_string())));
    assert!(mirrored.contains(&(vars::SCROLL_PROGRESS, "0.5".to_string())));
}

#[test]
fn suppressed_scroll_keeps_draining_toward_last_target() {
    init_logging();
    let suppression = Suppression::new();
    let tracker = ScrollTracker::new(suppression.clone());
    let filter = SmoothingFilter::default();

    let mut state = ScrollState::default();
    tracker.on_scroll(&page_at(8_000.0), &mut state);
    filter.tick(&mut state);

    suppression.set(true);
    assert!(!tracker.on_scroll(&page_at(0.0), &mut state));
    assert_eq!(state.target, 100.0);

    for _ in 0..200 {
        filter.tick(&mut state);
    }
    assert_eq!(state.current, 100.0);

    suppression.set(false);
    assert!(tracker.on_scroll(&page_at(0.0), &mut state));
    assert_eq!(state.target, 0.0);
}

#[test]
fn gradient_is_continuous_across_the_page() {
    let gradient = Gradient::new(&PALETTE, SECTION_COUNT).unwrap();
    let mut previous: Option<Rgb> = None;
    for step in 0..=1_000 {
        let color = gradient.interpolate(step as f64 / 10.0);
        if let Some(prev) = previous {
            for (a, b) in prev.channels().iter().zip(color.channels()) {
                assert!((*a as i16 - b as i16).abs() <= 3, "jump at step {step}");
            }
        }
        previous = Some(color);
    }
    assert_eq!(previous, Some(PALETTE[SECTION_COUNT - 1]));
}

#[test]
fn konami_unlock_survives_reload() {
    init_logging();
    let storage = Rc::new(MemoryStore::new());
    let store = AchievementStore::load(storage.clone());
    store.enable_console().unwrap();

    let mut konami = Konami::default();
    let entered = KONAMI_CODE
        .iter()
        .map(|key| konami.key(key))
        .filter(|done| *done)
        .count();
    assert_eq!(entered, 1);
    assert!(store.unlock(AchievementId::Konami, 1_700_000_000_000.0).unwrap().is_some());

    let reloaded = AchievementStore::load(storage);
    let record = reloaded.get(AchievementId::Konami).unwrap();
    assert!(record.unlocked);
    assert_eq!(record.unlocked_at, Some(1_700_000_000_000.0));
    assert_eq!(reloaded.unlocked_count(), 1);
}

#[test]
fn console_edits_persist_through_the_bus() {
    init_logging();
    let storage = Rc::new(MemoryStore::new());
    let bus = SettingsBus::new(VisualSettings::load(&*storage));
    {
        let storage = storage.clone();
        bus.subscribe(move |settings| settings.save(&*storage).unwrap());
    }

    assert!(apply_setting(&bus, keys::ORB_SIZE, 2.5));
    assert_eq!(storage.get_f64(keys::ORB_SIZE), Some(2.5));

    let reloaded = VisualSettings::load(&*storage);
    assert_eq!(reloaded, bus.current());
}

#[test]
fn menu_pin_and_restore_do_not_count_as_reading() {
    init_logging();
    let suppression = Suppression::new();
    let tracker = ScrollTracker::new(suppression.clone());
    let mut state = ScrollState::default();
    let mut marathon = MarathonRunner::default();

    // Scroll events only reach the distance counter while tracking is live.
    let mut scroll_event = |y: f64, marathon: &mut MarathonRunner| {
        tracker.on_scroll(&page_at(y), &mut state);
        if suppression.is_active() {
            return false;
        }
        marathon.scrolled(y)
    };

    for y in (0..=6).map(|i| i as f64 * 1_000.0) {
        assert!(!scroll_event(y, &mut marathon));
    }
    assert_eq!(marathon.total(), 6_000.0);

    // Opening the menu pins the body, which reports scrollTop 0.
    suppression.set(true);
    assert!(!scroll_event(0.0, &mut marathon));

    // Closing rebases, restores the saved position, then resumes tracking.
    marathon.rebase(6_000.0);
    suppression.set(false);
    assert!(!scroll_event(6_000.0, &mut marathon));
    assert_eq!(marathon.total(), 6_000.0);

    assert!(!scroll_event(8_000.0, &mut marathon));
    assert!(!scroll_event(6_500.0, &mut marathon));
    assert!(scroll_event(6_000.0, &mut marathon));
    assert_eq!(marathon.total(), MARATHON_DISTANCE_PX);
}

#[test]
fn shaken_colors_are_not_saved() {
    init_logging();
    let storage = Rc::new(MemoryStore::new());
    let bus = SettingsBus::new(VisualSettings::load(&*storage));
    {
        let storage = storage.clone();
        bus.subscribe(move |settings| settings.save(&*storage).unwrap());
    }
    let saved = storage.get(keys::COLOR_VARIATION);

    bus.override_color_variation(63.0);
    assert_eq!(bus.effective().color_variation, 63.0);
    assert_eq!(storage.get(keys::COLOR_VARIATION), saved);
    assert_eq!(VisualSettings::load(&*storage), bus.current());
}
