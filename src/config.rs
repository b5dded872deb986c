//! Tunables for the page: animation constants, the section palette and the
//! developer-console settings that are persisted per browser.

use std::cell::{Cell, RefCell};

use log::debug;

use crate::color::Rgb;
use crate::error::Result;
use crate::observe::{SubscriptionId, Subscribers};
use crate::storage::{keys, KeyValueStore};

pub const SECTION_COUNT: usize = 9;

/// Fraction of a section's height that must intersect the viewport before it
/// fades in.
pub const SCROLL_REVEAL_THRESHOLD: f64 = 0.15;
pub const HIDDEN_SECTION_OPACITY: f64 = 0.05;

/// Items marked for staggered entry fade in one after another once this much
/// of their section is visible.
pub const STAGGER_REVEAL_THRESHOLD: f64 = 0.1;
pub const STAGGER_DELAY_MS: f64 = 100.0;

pub const SMOOTH_SCROLL_EASING: f64 = 0.1;
pub const SMOOTH_SCROLL_SNAP_THRESHOLD: f64 = 0.01;

pub const MOBILE_BREAKPOINT_PX: f64 = 768.0;

/// Background color for each section, top to bottom.
pub const PALETTE: [Rgb; SECTION_COUNT] = [
    Rgb::new(192, 132, 252), // hero
    Rgb::new(34, 211, 238),  // who-i-am
    Rgb::new(52, 211, 153),  // tech-journey
    Rgb::new(251, 191, 36),  // notable-work
    Rgb::new(244, 114, 182), // education
    Rgb::new(96, 165, 250),  // work-experience
    Rgb::new(251, 146, 60),  // beyond-code
    Rgb::new(167, 139, 250), // whats-next
    Rgb::new(251, 113, 133), // contact
];

/// Background tuning exposed in the developer console.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualSettings {
    pub orb_brightness: f64,
    pub animation_speed: f64,
    /// Percent, 0-500. Scales the companion hue shifts.
    pub color_variation: f64,
    pub orb_size: f64,
    pub orb_blur: f64,
    pub orb_opacity: f64,
    pub position_variation: f64,
}

impl Default for VisualSettings {
    fn default() -> Self {
        Self {
            orb_brightness: 0.5,
            animation_speed: 3.0,
            color_variation: 40.0,
            orb_size: 1.2,
            orb_blur: 1.0,
            orb_opacity: 2.0,
            position_variation: 1.0,
        }
    }
}

impl VisualSettings {
    /// Reads every setting, falling back to the default for missing or
    /// unparsable values.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let d = Self::default();
        Self {
            orb_brightness: store.get_f64(keys::ORB_BRIGHTNESS).unwrap_or(d.orb_brightness),
            animation_speed: store.get_f64(keys::ANIMATION_SPEED).unwrap_or(d.animation_speed),
            color_variation: store.get_f64(keys::COLOR_VARIATION).unwrap_or(d.color_variation),
            orb_size: store.get_f64(keys::ORB_SIZE).unwrap_or(d.orb_size),
            orb_blur: store.get_f64(keys::ORB_BLUR).unwrap_or(d.orb_blur),
            orb_opacity: store.get_f64(keys::ORB_OPACITY).unwrap_or(d.orb_opacity),
            position_variation: store
                .get_f64(keys::POSITION_VARIATION)
                .unwrap_or(d.position_variation),
        }
        .clamped()
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<()> {
        for (key, value) in self.entries() {
            store.set(key, &value.to_string())?;
        }
        Ok(())
    }

    /// Pins each value into the range its console slider allows.
    pub fn clamped(self) -> Self {
        Self {
            orb_brightness: self.orb_brightness.clamp(0.0, 2.0),
            animation_speed: self.animation_speed.clamp(0.1, 10.0),
            color_variation: self.color_variation.clamp(0.0, 500.0),
            orb_size: self.orb_size.clamp(0.1, 5.0),
            orb_blur: self.orb_blur.clamp(0.1, 5.0),
            orb_opacity: self.orb_opacity.clamp(0.0, 3.0),
            position_variation: self.position_variation.clamp(0.0, 3.0),
        }
    }

    /// Hue-shift multiplier in `[0, 5]`.
    pub fn variation_factor(&self) -> f64 {
        self.color_variation / 100.0
    }

    pub fn entries(&self) -> [(&'static str, f64); 7] {
        [
            (keys::ORB_BRIGHTNESS, self.orb_brightness),
            (keys::ANIMATION_SPEED, self.animation_speed),
            (keys::COLOR_VARIATION, self.color_variation),
            (keys::ORB_SIZE, self.orb_size),
            (keys::ORB_BLUR, self.orb_blur),
            (keys::ORB_OPACITY, self.orb_opacity),
            (keys::POSITION_VARIATION, self.position_variation),
        ]
    }
}

/// Publish/subscribe channel for [`VisualSettings`]. Changes are pushed to
/// subscribers as they happen.
#[derive(Default)]
pub struct SettingsBus {
    current: RefCell<VisualSettings>,
    color_override: Cell<Option<f64>>,
    subscribers: Subscribers<VisualSettings>,
}

impl SettingsBus {
    pub fn new(initial: VisualSettings) -> Self {
        Self {
            current: RefCell::new(initial.clamped()),
            color_override: Cell::new(None),
            subscribers: Subscribers::new(),
        }
    }

    pub fn current(&self) -> VisualSettings {
        *self.current.borrow()
    }

    /// Registers `callback` and immediately hands it the current settings.
    pub fn subscribe(&self, mut callback: impl FnMut(&VisualSettings) + 'static) -> SubscriptionId {
        callback(&self.current());
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// Stores the clamped settings and notifies subscribers if anything changed.
    /// A real change of `color_variation` drops any visual override.
    pub fn publish(&self, settings: VisualSettings) -> bool {
        let settings = settings.clamped();
        let previous = *self.current.borrow();
        if previous == settings {
            return false;
        }
        if previous.color_variation != settings.color_variation {
            self.color_override.set(None);
        }
        *self.current.borrow_mut() = settings;
        debug!("visual settings changed: {settings:?}");
        self.subscribers.notify(&settings);
        true
    }

    /// Shows `color_variation` on screen without publishing or persisting it.
    pub fn override_color_variation(&self, value: f64) {
        self.color_override.set(Some(value.clamp(0.0, 500.0)));
    }

    /// What the page should render: the published settings plus any visual
    /// override.
    pub fn effective(&self) -> VisualSettings {
        let mut settings = self.current();
        if let Some(variation) = self.color_override.get() {
            settings.color_variation = variation;
        }
        settings
    }

    pub fn update(&self, edit: impl FnOnce(&mut VisualSettings)) -> bool {
        let mut next = self.current();
        edit(&mut next);
        self.publish(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_load_defaults_when_empty() {
        let store = MemoryStore::new();
        assert_eq!(VisualSettings::load(&store), VisualSettings::default());
    }

    #[test]
    fn test_save_then_load() {
        let store = MemoryStore::new();
        let settings = VisualSettings {
            orb_size: 2.5,
            color_variation: 120.0,
            ..Default::default()
        };
        settings.save(&store).unwrap();
        assert_eq!(store.get(keys::ORB_SIZE).as_deref(), Some("2.5"));
        assert_eq!(VisualSettings::load(&store), settings);
    }

    #[test]
    fn test_load_ignores_garbage_and_clamps() {
        let store = MemoryStore::new();
        store.set(keys::ORB_BLUR, "fuzzy").unwrap();
        store.set(keys::ANIMATION_SPEED, "99").unwrap();
        let loaded = VisualSettings::load(&store);
        assert_eq!(loaded.orb_blur, 1.0);
        assert_eq!(loaded.animation_speed, 10.0);
    }

    #[test]
    fn test_bus_notifies_on_change_only() {
        let bus = SettingsBus::new(VisualSettings::default());
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        bus.subscribe(move |_| c.set(c.get() + 1));
        assert_eq!(calls.get(), 1);

        assert!(!bus.publish(VisualSettings::default()));
        assert_eq!(calls.get(), 1);

        assert!(bus.update(|s| s.orb_size = 3.0));
        assert_eq!(calls.get(), 2);
        assert_eq!(bus.current().orb_size, 3.0);
    }

    #[test]
    fn test_bus_clamps_published_values() {
        let bus = SettingsBus::new(VisualSettings::default());
        bus.update(|s| s.color_variation = 900.0);
        assert_eq!(bus.current().color_variation, 500.0);
        assert_eq!(bus.current().variation_factor(), 5.0);
    }

    #[test]
    fn test_color_override_is_not_persisted() {
        let store = Rc::new(MemoryStore::new());
        let bus = SettingsBus::new(VisualSettings::default());
        let calls = Rc::new(Cell::new(0));
        {
            let store = store.clone();
            let calls = calls.clone();
            bus.subscribe(move |s| {
                calls.set(calls.get() + 1);
                s.save(&*store).unwrap();
            });
        }

        bus.override_color_variation(77.0);
        assert_eq!(bus.effective().color_variation, 77.0);
        assert_eq!(bus.current().color_variation, 40.0);
        assert_eq!(store.get_f64(keys::COLOR_VARIATION), Some(40.0));
        assert_eq!(calls.get(), 1);

        // Unrelated edits keep the override; a real variation edit replaces it.
        bus.update(|s| s.orb_size = 2.0);
        assert_eq!(bus.effective().color_variation, 77.0);
        bus.update(|s| s.color_variation = 10.0);
        assert_eq!(bus.effective().color_variation, 10.0);
        assert_eq!(store.get_f64(keys::COLOR_VARIATION), Some(10.0));
    }
}
