//! Persistent key-value storage seam.
//!
//! The browser's `localStorage` is consumed as a black box through
//! [`KeyValueStore`]; the wasm layer provides the real adapter and tests use
//! [`MemoryStore`].

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::error::Result;

/// Keys written to persistent storage.
pub mod keys {
    pub const ACHIEVEMENTS: &str = "achievements";
    pub const DEV_CONSOLE_OPENED: &str = "dev_console_opened";
    pub const VISIT_COUNT: &str = "visit_count";

    pub const ORB_BRIGHTNESS: &str = "orb_brightness";
    pub const ANIMATION_SPEED: &str = "animation_speed";
    pub const COLOR_VARIATION: &str = "color_variation";
    pub const ORB_SIZE: &str = "orb_size";
    pub const ORB_BLUR: &str = "orb_blur";
    pub const ORB_OPACITY: &str = "orb_opacity";
    pub const POSITION_VARIATION: &str = "position_variation";

    pub const DEBUG_POSITION: &str = "debug_position";
    pub const DEBUG_SCALE: &str = "debug_scale";
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;

    fn get_flag(&self, key: &str) -> bool {
        self.get(key).as_deref() == Some("true")
    }

    fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key)?.trim().parse().ok().filter(|v: &f64| v.is_finite())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Rc<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// In-memory store; one per page load, lost on reload.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_basic() {
        let store = MemoryStore::new();
        assert!(store.get("a").is_none());

        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").as_deref(), Some("1"));
        assert_eq!(store.len(), 1);

        store.remove("a").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_flag_and_number_helpers() {
        let store = MemoryStore::new();
        assert!(!store.get_flag(keys::DEV_CONSOLE_OPENED));
        store.set(keys::DEV_CONSOLE_OPENED, "true").unwrap();
        assert!(store.get_flag(keys::DEV_CONSOLE_OPENED));

        store.set(keys::ORB_SIZE, " 1.5 ").unwrap();
        assert_eq!(store.get_f64(keys::ORB_SIZE), Some(1.5));
        store.set(keys::ORB_SIZE, "NaN").unwrap();
        assert_eq!(store.get_f64(keys::ORB_SIZE), None);
        store.set(keys::ORB_SIZE, "big").unwrap();
        assert_eq!(store.get_f64(keys::ORB_SIZE), None);
    }

    #[test]
    fn test_rc_store_shares_entries() {
        let store = Rc::new(MemoryStore::new());
        let other = store.clone();
        other.set("k", "v").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("v"));
    }
}
