//! Layout of the blurred background orbs.
//!
//! Pure geometry and color: the wasm layer turns each [`OrbStyle`] into
//! inline CSS once per frame.

use std::f64::consts::TAU;

use crate::color::{shift_hue, Rgb};
use crate::config::{VisualSettings, MOBILE_BREAKPOINT_PX};

const MOBILE_SIZE_FACTOR: f64 = 0.4;
const MOBILE_RING_RADIUS: f64 = 20.0;
const DESKTOP_JITTER_PERCENT: f64 = 30.0;

/// Static description of one orb.
#[derive(Debug, Clone, Copy)]
struct OrbSpec {
    /// Hue rotation at 100% color variation, degrees.
    hue_shift: f64,
    size_px: f64,
    blur_px: f64,
    opacity: f64,
    duration_s: f64,
    /// Desktop anchor `(top, left)` in percent; `None` pins to the center.
    anchor: Option<(f64, f64)>,
}

const fn orb(
    hue_shift: f64,
    size_px: f64,
    blur_px: f64,
    opacity: f64,
    duration_s: f64,
    anchor: Option<(f64, f64)>,
) -> OrbSpec {
    OrbSpec {
        hue_shift,
        size_px,
        blur_px,
        opacity,
        duration_s,
        anchor,
    }
}

const ORBS: [OrbSpec; 8] = [
    orb(0.0, 800.0, 120.0, 0.25, 45.0, None),
    orb(-90.0, 600.0, 100.0, 0.20, 38.0, Some((25.0, 25.0))),
    orb(90.0, 650.0, 110.0, 0.22, 42.0, Some((75.0, 75.0))),
    orb(-60.0, 500.0, 90.0, 0.18, 40.0, Some((33.0, 66.0))),
    orb(60.0, 550.0, 95.0, 0.19, 36.0, Some((75.0, 33.0))),
    orb(-120.0, 700.0, 115.0, 0.21, 44.0, Some((66.0, 66.0))),
    orb(120.0, 600.0, 105.0, 0.20, 50.0, Some((50.0, 50.0))),
    orb(-90.0, 550.0, 100.0, 0.18, 46.0, Some((66.0, 33.0))),
];

pub const ORB_COUNT: usize = ORBS.len();

/// Resolved style for one orb.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbStyle {
    pub color: Rgb,
    /// Percent of the viewport, applied to the orb's center.
    pub top: f64,
    pub left: f64,
    pub size_px: f64,
    pub blur_px: f64,
    pub brightness: f64,
    pub opacity: f64,
    pub duration_s: f64,
}

impl OrbStyle {
    pub fn css(&self) -> String {
        format!(
            "top:{top}%;left:{left}%;width:{size}px;height:{size}px;\
             background:radial-gradient(circle, {color} 0%, transparent 70%);\
             filter:blur({blur}px) brightness({brightness});opacity:{opacity};\
             animation-duration:{duration}s",
            top = self.top,
            left = self.left,
            size = self.size_px,
            color = self.color,
            blur = self.blur_px,
            brightness = self.brightness,
            opacity = self.opacity,
            duration = self.duration_s,
        )
    }
}

pub fn is_mobile(viewport_width: f64) -> bool {
    viewport_width < MOBILE_BREAKPOINT_PX
}

/// Deterministic pseudo-random value in `[0, 1)` for `seed`.
fn hash01(seed: f64, salt: f64) -> f64 {
    let v = (seed * salt).sin() * 43_758.545_3;
    v - v.floor()
}

fn position(spec: &OrbSpec, seed: usize, mobile: bool, position_variation: f64) -> (f64, f64) {
    let Some((base_top, base_left)) = spec.anchor else {
        return (50.0, 50.0);
    };

    if mobile {
        let angle = seed as f64 / 7.0 * TAU;
        return (
            50.0 + angle.sin() * MOBILE_RING_RADIUS,
            50.0 + angle.cos() * MOBILE_RING_RADIUS,
        );
    }

    let jitter = (position_variation - 1.0) * DESKTOP_JITTER_PERCENT;
    let seed = seed as f64;
    (
        base_top + hash01(seed, 12.9898) * jitter,
        base_left + hash01(seed, 78.233) * jitter,
    )
}

/// Styles for every orb given the frame's base color.
pub fn layout(base: Rgb, settings: &VisualSettings, viewport_width: f64) -> [OrbStyle; ORB_COUNT] {
    let mobile = is_mobile(viewport_width);
    let size_factor = settings.orb_size * if mobile { MOBILE_SIZE_FACTOR } else { 1.0 };
    let variation = settings.variation_factor();

    std::array::from_fn(|i| {
        let spec = &ORBS[i];
        let color = if spec.hue_shift == 0.0 {
            base
        } else {
            shift_hue(base, spec.hue_shift * variation)
        };
        let (top, left) = position(spec, i, mobile, settings.position_variation);
        OrbStyle {
            color,
            top,
            left,
            size_px: spec.size_px * size_factor,
            blur_px: spec.blur_px * settings.orb_blur,
            brightness: settings.orb_brightness,
            opacity: spec.opacity * settings.orb_opacity,
            duration_s: spec.duration_s / settings.animation_speed,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: Rgb = Rgb::new(192, 132, 252);

    #[test]
    fn test_primary_orb_uses_base_color() {
        let styles = layout(BASE, &VisualSettings::default(), 1440.0);
        assert_eq!(styles[0].color, BASE);
        assert_eq!((styles[0].top, styles[0].left), (50.0, 50.0));
        assert_ne!(styles[1].color, BASE);
    }

    #[test]
    fn test_default_variation_keeps_desktop_anchors() {
        let styles = layout(BASE, &VisualSettings::default(), 1440.0);
        assert_eq!((styles[1].top, styles[1].left), (25.0, 25.0));
        assert_eq!((styles[7].top, styles[7].left), (66.0, 33.0));
    }

    #[test]
    fn test_position_jitter_is_deterministic() {
        let settings = VisualSettings {
            position_variation: 2.0,
            ..Default::default()
        };
        let a = layout(BASE, &settings, 1440.0);
        let b = layout(BASE, &settings, 1440.0);
        assert_eq!(a, b);
        for style in &a[1..] {
            assert!(style.top >= 0.0 && style.top <= 110.0);
        }
    }

    #[test]
    fn test_mobile_layout() {
        let settings = VisualSettings {
            position_variation: 3.0,
            ..Default::default()
        };
        let styles = layout(BASE, &settings, 390.0);
        assert!((styles[0].size_px - 384.0).abs() < 1e-9);
        for style in &styles[1..] {
            let d = ((style.top - 50.0).powi(2) + (style.left - 50.0).powi(2)).sqrt();
            assert!((d - 20.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_settings_scale_orbs() {
        let settings = VisualSettings {
            animation_speed: 2.0,
            orb_blur: 0.5,
            orb_opacity: 1.0,
            ..Default::default()
        };
        let styles = layout(BASE, &settings, 1440.0);
        assert_eq!(styles[0].duration_s, 22.5);
        assert_eq!(styles[0].blur_px, 60.0);
        assert_eq!(styles[0].opacity, 0.25);
    }

    #[test]
    fn test_zero_variation_collapses_hues() {
        let settings = VisualSettings {
            color_variation: 0.0,
            ..Default::default()
        };
        let styles = layout(BASE, &settings, 1440.0);
        assert_eq!(styles[1].color, styles[2].color);
    }

    #[test]
    fn test_css_mentions_color() {
        let styles = layout(BASE, &VisualSettings::default(), 1440.0);
        assert!(styles[0].css().contains("rgb(192, 132, 252)"));
    }
}
