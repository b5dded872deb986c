//! Page sections: the anchor registry, "current section" detection and the
//! small amount of navigation logic shared by the dots, menu and keyboard.

use crate::config::{SCROLL_REVEAL_THRESHOLD, STAGGER_DELAY_MS, STAGGER_REVEAL_THRESHOLD};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    /// Element id of the section's anchor in the page.
    pub id: &'static str,
    /// Label shown in navigation tooltips and the mobile menu.
    pub name: &'static str,
}

pub const SECTIONS: [Section; crate::config::SECTION_COUNT] = [
    Section { id: "hero", name: "Hey There" },
    Section { id: "who-i-am", name: "Who I Am" },
    Section { id: "tech-journey", name: "Tech Stack" },
    Section { id: "notable-work", name: "Notable Work" },
    Section { id: "education", name: "Academic Journey" },
    Section { id: "work-experience", name: "Work Experience" },
    Section { id: "beyond-code", name: "Beyond Code" },
    Section { id: "whats-next", name: "What's Next" },
    Section { id: "contact", name: "Let's Connect" },
];

pub fn index_of(id: &str) -> Option<usize> {
    SECTIONS.iter().position(|s| s.id == id)
}

/// Vertical extent of a section relative to the viewport top, as returned by
/// `getBoundingClientRect`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionRect {
    pub top: f64,
    pub height: f64,
}

impl SectionRect {
    pub fn center(&self) -> f64 {
        self.top + self.height / 2.0
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Share of the section's height inside `[0, viewport_height]`.
    pub fn visible_ratio(&self, viewport_height: f64) -> f64 {
        if self.height <= 0.0 {
            return 0.0;
        }
        let overlap = self.bottom().min(viewport_height) - self.top.max(0.0);
        (overlap / self.height).clamp(0.0, 1.0)
    }

    pub fn is_revealed(&self, viewport_height: f64) -> bool {
        let ratio = self.visible_ratio(viewport_height);
        ratio > 0.0 && ratio >= SCROLL_REVEAL_THRESHOLD
    }
}

/// Index of the section whose center is nearest the viewport center.
///
/// `None` entries (anchors missing from the page) are skipped. Ties keep the
/// lowest index. Returns `None` only when no section is present.
pub fn locate_nearest(rects: &[Option<SectionRect>], viewport_height: f64) -> Option<usize> {
    let middle = viewport_height / 2.0;
    let mut best: Option<(usize, f64)> = None;

    for (index, rect) in rects.iter().enumerate() {
        let Some(rect) = rect else { continue };
        let distance = (rect.center() - middle).abs();
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((index, distance));
        }
    }

    best.map(|(index, _)| index)
}

/// First section whose center lies strictly inside the viewport.
///
/// Simpler than [`locate_nearest`] but can find nothing at scroll extremes
/// (for instance a tall first section scrolled slightly), in which case the
/// caller keeps whatever index it had.
pub fn locate_containing(rects: &[Option<SectionRect>], viewport_height: f64) -> Option<usize> {
    rects.iter().position(|rect| {
        rect.map_or(false, |r| {
            let center = r.center();
            center > 0.0 && center < viewport_height
        })
    })
}

/// Keyboard step requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavIntent {
    Next,
    Previous,
    First,
    Last,
}

impl NavIntent {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowDown" | "PageDown" | " " => Some(Self::Next),
            "ArrowUp" | "PageUp" => Some(Self::Previous),
            "Home" => Some(Self::First),
            "End" => Some(Self::Last),
            _ => None,
        }
    }

    /// Target index from `current`, clamped to `[0, total - 1]`.
    pub fn target(self, current: usize, total: usize) -> usize {
        let last = total.saturating_sub(1);
        match self {
            Self::Next => (current + 1).min(last),
            Self::Previous => current.saturating_sub(1),
            Self::First => 0,
            Self::Last => last,
        }
    }
}

/// The scroll-to-top button is offered everywhere but the first section.
pub fn show_scroll_to_top(current: usize) -> bool {
    current > 0
}

/// Keyboard stepping stays out of the way of focused form fields and buttons,
/// which handle Space and the arrow keys themselves. `tag` is an upper-case
/// element tag name.
pub fn key_navigation_allowed(tag: &str) -> bool {
    !matches!(tag, "INPUT" | "TEXTAREA" | "SELECT" | "BUTTON")
}

pub fn stagger_delay_ms(item: usize) -> f64 {
    item as f64 * STAGGER_DELAY_MS
}

/// Sections whose staggered items have started their entry animation.
/// Each section animates once per page view.
#[derive(Debug, Clone, Default)]
pub struct StaggerReveal {
    shown: [bool; crate::config::SECTION_COUNT],
}

impl StaggerReveal {
    /// True the first time `rect` crosses the entry threshold.
    pub fn reveal(&mut self, index: usize, rect: &SectionRect, viewport_height: f64) -> bool {
        let Some(shown) = self.shown.get_mut(index) else {
            return false;
        };
        if *shown {
            return false;
        }
        let ratio = rect.visible_ratio(viewport_height);
        if ratio > 0.0 && ratio >= STAGGER_REVEAL_THRESHOLD {
            *shown = true;
            return true;
        }
        false
    }

    pub fn is_shown(&self, index: usize) -> bool {
        self.shown.get(index).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: f64 = 900.0;

    /// Nine stacked full-viewport sections with the page scrolled by `scroll`.
    fn stacked(scroll: f64) -> Vec<Option<SectionRect>> {
        (0..SECTIONS.len())
            .map(|i| {
                Some(SectionRect {
                    top: i as f64 * VIEWPORT - scroll,
                    height: VIEWPORT,
                })
            })
            .collect()
    }

    #[test]
    fn test_registry_ids_unique() {
        for (i, s) in SECTIONS.iter().enumerate() {
            assert_eq!(index_of(s.id), Some(i));
        }
        assert_eq!(index_of("footer"), None);
    }

    #[test]
    fn test_nearest_at_section_top() {
        assert_eq!(locate_nearest(&stacked(4.0 * VIEWPORT), VIEWPORT), Some(4));
        assert_eq!(locate_nearest(&stacked(0.0), VIEWPORT), Some(0));
        assert_eq!(locate_nearest(&stacked(8.0 * VIEWPORT), VIEWPORT), Some(8));
    }

    #[test]
    fn test_nearest_switches_past_halfway() {
        assert_eq!(locate_nearest(&stacked(0.4 * VIEWPORT), VIEWPORT), Some(0));
        assert_eq!(locate_nearest(&stacked(0.6 * VIEWPORT), VIEWPORT), Some(1));
    }

    #[test]
    fn test_nearest_tie_prefers_first() {
        assert_eq!(locate_nearest(&stacked(0.5 * VIEWPORT), VIEWPORT), Some(0));
    }

    #[test]
    fn test_nearest_skips_missing() {
        let mut rects = stacked(4.0 * VIEWPORT);
        rects[4] = None;
        assert_eq!(locate_nearest(&rects, VIEWPORT), Some(3));
        assert_eq!(locate_nearest(&[None, None], VIEWPORT), None);
        assert_eq!(locate_nearest(&[], VIEWPORT), None);
    }

    #[test]
    fn test_containing_variant() {
        assert_eq!(locate_containing(&stacked(4.0 * VIEWPORT), VIEWPORT), Some(4));

        // A tall hero scrolled a little: its center is still below the fold.
        let rects = vec![
            Some(SectionRect {
                top: -100.0,
                height: 3000.0,
            }),
            Some(SectionRect {
                top: 2900.0,
                height: 900.0,
            }),
        ];
        assert_eq!(locate_containing(&rects, VIEWPORT), None);
        assert_eq!(locate_nearest(&rects, VIEWPORT), Some(0));
    }

    #[test]
    fn test_visible_ratio_and_reveal() {
        let rect = SectionRect {
            top: 800.0,
            height: 1000.0,
        };
        assert!((rect.visible_ratio(VIEWPORT) - 0.1).abs() < 1e-9);
        assert!(!rect.is_revealed(VIEWPORT));

        let rect = SectionRect {
            top: 700.0,
            height: 1000.0,
        };
        assert!(rect.is_revealed(VIEWPORT));

        let above = SectionRect {
            top: -2000.0,
            height: 900.0,
        };
        assert_eq!(above.visible_ratio(VIEWPORT), 0.0);
        assert!(!above.is_revealed(VIEWPORT));
    }

    #[test]
    fn test_nav_intents() {
        assert_eq!(NavIntent::from_key("PageDown"), Some(NavIntent::Next));
        assert_eq!(NavIntent::from_key(" "), Some(NavIntent::Next));
        assert_eq!(NavIntent::from_key("ArrowUp"), Some(NavIntent::Previous));
        assert_eq!(NavIntent::from_key("x"), None);

        assert_eq!(NavIntent::Next.target(8, 9), 8);
        assert_eq!(NavIntent::Next.target(2, 9), 3);
        assert_eq!(NavIntent::Previous.target(0, 9), 0);
        assert_eq!(NavIntent::Last.target(3, 9), 8);
        assert_eq!(NavIntent::First.target(3, 9), 0);
    }

    #[test]
    fn test_scroll_to_top_visibility() {
        assert!(!show_scroll_to_top(0));
        assert!(show_scroll_to_top(1));
    }

    #[test]
    fn test_key_navigation_skips_focused_controls() {
        assert!(key_navigation_allowed("BODY"));
        assert!(key_navigation_allowed("SECTION"));
        assert!(!key_navigation_allowed("BUTTON"));
        assert!(!key_navigation_allowed("INPUT"));
        assert!(!key_navigation_allowed("TEXTAREA"));
        assert!(!key_navigation_allowed("SELECT"));
    }

    #[test]
    fn test_stagger_reveals_once() {
        let mut stagger = StaggerReveal::default();
        let below = SectionRect { top: 950.0, height: 1_000.0 };
        let entering = SectionRect { top: 850.0, height: 1_000.0 };

        assert!(!stagger.reveal(2, &below, 1_000.0));
        assert!(stagger.reveal(2, &entering, 1_000.0));
        assert!(stagger.is_shown(2));
        assert!(!stagger.reveal(2, &entering, 1_000.0));

        // Scrolling away and back does not replay the animation.
        assert!(!stagger.reveal(2, &below, 1_000.0));
        assert!(!stagger.reveal(2, &entering, 1_000.0));
        assert!(!stagger.reveal(99, &entering, 1_000.0));
    }

    #[test]
    fn test_stagger_delays() {
        assert_eq!(stagger_delay_ms(0), 0.0);
        assert_eq!(stagger_delay_ms(3), 300.0);
    }
}
