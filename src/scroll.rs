//! Scroll tracking and per-frame smoothing of the scroll fraction.
//!
//! The tracker writes a raw target on every scroll event; the filter eases a
//! displayed value toward it once per animation frame.

use std::cell::Cell;
use std::rc::Rc;

use crate::config::{SMOOTH_SCROLL_EASING, SMOOTH_SCROLL_SNAP_THRESHOLD};

/// Snapshot of the document's scroll geometry, in CSS pixels.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ScrollGeometry {
    pub scroll_top: f64,
    pub document_height: f64,
    pub viewport_height: f64,
}

impl ScrollGeometry {
    pub fn max_scroll(&self) -> f64 {
        self.document_height - self.viewport_height
    }

    /// Percent of the scrollable distance covered, in `[0, 100]`. Content
    /// shorter than the viewport reports `0`.
    pub fn fraction(&self) -> f64 {
        let max_scroll = self.max_scroll();
        if max_scroll <= 0.0 || !self.scroll_top.is_finite() {
            return 0.0;
        }
        (self.scroll_top / max_scroll.max(1.0)).clamp(0.0, 1.0) * 100.0
    }

    /// `scroll_top` has reached the bottom of the document.
    pub fn at_bottom(&self) -> bool {
        self.scroll_top >= self.max_scroll()
    }
}

/// Shared "tracking paused" signal. The menu owns the writing side; the
/// tracker only reads it.
#[derive(Debug, Clone, Default)]
pub struct Suppression(Rc<Cell<bool>>);

impl Suppression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.0.get()
    }

    pub fn set(&self, active: bool) {
        self.0.set(active);
    }
}

/// Target and displayed scroll fraction, both in `[0, 100]`.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ScrollState {
    pub target: f64,
    pub current: f64,
}

impl ScrollState {
    pub fn is_settled(&self) -> bool {
        self.current == self.target
    }
}

/// Writes `ScrollState::target` from scroll events unless suppressed.
#[derive(Debug, Clone)]
pub struct ScrollTracker {
    suppression: Suppression,
}

impl ScrollTracker {
    pub fn new(suppression: Suppression) -> Self {
        Self { suppression }
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppression.is_active()
    }

    /// Returns `false` when the event was skipped because tracking is
    /// suppressed.
    pub fn on_scroll(&self, geometry: &ScrollGeometry, state: &mut ScrollState) -> bool {
        if self.suppression.is_active() {
            return false;
        }
        state.target = geometry.fraction();
        true
    }
}

/// First-order exponential smoothing with a snap threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingFilter {
    easing: f64,
    snap_threshold: f64,
}

impl Default for SmoothingFilter {
    fn default() -> Self {
        Self::new(SMOOTH_SCROLL_EASING, SMOOTH_SCROLL_SNAP_THRESHOLD)
    }
}

impl SmoothingFilter {
    /// `easing` is clamped into `(0, 1]`; a step of `1` jumps straight to the
    /// target.
    pub fn new(easing: f64, snap_threshold: f64) -> Self {
        Self {
            easing: easing.clamp(f64::EPSILON, 1.0),
            snap_threshold: snap_threshold.max(0.0),
        }
    }

    pub fn easing(&self) -> f64 {
        self.easing
    }

    pub fn snap_threshold(&self) -> f64 {
        self.snap_threshold
    }

    /// Advances `current` one frame toward `target`. Returns whether it moved.
    pub fn tick(&self, state: &mut ScrollState) -> bool {
        let diff = state.target - state.current;
        if diff == 0.0 {
            return false;
        }
        state.current = if diff.abs() < self.snap_threshold {
            state.target
        } else {
            state.current + diff * self.easing
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(scroll_top: f64) -> ScrollGeometry {
        ScrollGeometry {
            scroll_top,
            document_height: 9000.0,
            viewport_height: 1000.0,
        }
    }

    #[test]
    fn test_fraction_basic() {
        assert_eq!(geometry(0.0).fraction(), 0.0);
        assert_eq!(geometry(4000.0).fraction(), 50.0);
        assert_eq!(geometry(8000.0).fraction(), 100.0);
        assert_eq!(geometry(9000.0).fraction(), 100.0);
        assert_eq!(geometry(-30.0).fraction(), 0.0);
    }

    #[test]
    fn test_fraction_short_document_is_zero() {
        let g = ScrollGeometry {
            scroll_top: 0.0,
            document_height: 500.0,
            viewport_height: 800.0,
        };
        assert_eq!(g.fraction(), 0.0);

        let flat = ScrollGeometry {
            scroll_top: 10.0,
            document_height: 800.0,
            viewport_height: 800.0,
        };
        assert_eq!(flat.fraction(), 0.0);
        assert!(!flat.fraction().is_nan());
    }

    #[test]
    fn test_at_bottom() {
        assert!(!geometry(7999.0).at_bottom());
        assert!(geometry(8000.0).at_bottom());
    }

    #[test]
    fn test_tracker_writes_target() {
        let tracker = ScrollTracker::new(Suppression::new());
        let mut state = ScrollState::default();
        assert!(tracker.on_scroll(&geometry(2000.0), &mut state));
        assert_eq!(state.target, 25.0);
        assert_eq!(state.current, 0.0);
    }

    #[test]
    fn test_tracker_skips_while_suppressed() {
        let suppression = Suppression::new();
        let tracker = ScrollTracker::new(suppression.clone());
        let mut state = ScrollState::default();
        tracker.on_scroll(&geometry(2000.0), &mut state);

        suppression.set(true);
        assert!(tracker.is_suppressed());
        assert!(!tracker.on_scroll(&geometry(0.0), &mut state));
        assert_eq!(state.target, 25.0);

        suppression.set(false);
        assert!(tracker.on_scroll(&geometry(0.0), &mut state));
        assert_eq!(state.target, 0.0);
    }

    #[test]
    fn test_filter_idempotent_at_rest() {
        let filter = SmoothingFilter::default();
        let mut state = ScrollState {
            target: 42.0,
            current: 42.0,
        };
        for _ in 0..10 {
            assert!(!filter.tick(&mut state));
        }
        assert_eq!(state.current, 42.0);
    }

    #[test]
    fn test_filter_converges_without_overshoot() {
        let filter = SmoothingFilter::new(0.1, 0.01);
        let mut state = ScrollState {
            target: 50.0,
            current: 0.0,
        };

        let mut ticks = 0;
        while !state.is_settled() {
            let before = state.current;
            filter.tick(&mut state);
            assert!(state.current >= before);
            assert!(state.current <= 50.0);
            ticks += 1;
            assert!(ticks <= 200, "did not converge");
        }
        assert_eq!(state.current, 50.0);
    }

    #[test]
    fn test_filter_snaps_when_close() {
        let filter = SmoothingFilter::new(0.1, 0.01);
        let mut state = ScrollState {
            target: 50.0,
            current: 49.995,
        };
        filter.tick(&mut state);
        assert_eq!(state.current, 50.0);
    }

    #[test]
    fn test_filter_drains_while_suppressed() {
        let suppression = Suppression::new();
        let tracker = ScrollTracker::new(suppression.clone());
        let filter = SmoothingFilter::default();
        let mut state = ScrollState::default();

        tracker.on_scroll(&geometry(8000.0), &mut state);
        suppression.set(true);
        tracker.on_scroll(&geometry(0.0), &mut state);
        for _ in 0..500 {
            filter.tick(&mut state);
        }
        assert_eq!(state.current, 100.0);
    }

    #[test]
    fn test_filter_clamps_easing() {
        let filter = SmoothingFilter::new(4.0, -1.0);
        assert_eq!(filter.easing(), 1.0);
        assert_eq!(filter.snap_threshold(), 0.0);
        let mut state = ScrollState {
            target: 10.0,
            current: 0.0,
        };
        filter.tick(&mut state);
        assert_eq!(state.current, 10.0);
    }
}
