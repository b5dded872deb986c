//! Hidden developer console: visibility, live readout and settings edits.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::achievements::AchievementStore;
use crate::config::{SettingsBus, VisualSettings};
use crate::error::Result;
use crate::sections::SECTIONS;
use crate::storage::{keys, KeyValueStore};
use crate::visual::VisualState;

/// Frames per second measured over windows of at least one second.
#[derive(Debug, Clone)]
pub struct FpsMeter {
    window_start: Option<f64>,
    frames: u32,
    fps: u32,
}

impl Default for FpsMeter {
    fn default() -> Self {
        Self {
            window_start: None,
            frames: 0,
            fps: 60,
        }
    }
}

impl FpsMeter {
    /// Counts one frame. Returns the new reading when a window closes.
    pub fn frame(&mut self, now_ms: f64) -> Option<u32> {
        let start = *self.window_start.get_or_insert(now_ms);
        self.frames += 1;
        let elapsed = now_ms - start;
        if elapsed < 1_000.0 {
            return None;
        }
        self.fps = (self.frames as f64 * 1_000.0 / elapsed).round() as u32;
        self.frames = 0;
        self.window_start = Some(now_ms);
        Some(self.fps)
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FpsGrade {
    Poor,
    Fair,
    Good,
}

impl FpsGrade {
    pub fn of(fps: u32) -> Self {
        match fps {
            0..=29 => Self::Poor,
            30..=49 => Self::Fair,
            _ => Self::Good,
        }
    }

    pub fn css_color(self) -> &'static str {
        match self {
            Self::Poor => "#ef4444",
            Self::Fair => "#f59e0b",
            Self::Good => "#10b981",
        }
    }
}

/// What the console panel shows on one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Readout {
    pub scroll_percent: f64,
    pub rgb: [u8; 3],
    pub section: &'static str,
    pub fps: u32,
    pub unlocked: usize,
    pub total: usize,
}

impl Readout {
    pub fn lines(&self) -> Vec<String> {
        let [r, g, b] = self.rgb;
        vec![
            format!("SCROLL: {:.1}%", self.scroll_percent),
            format!("RGB: {r:03} {g:03} {b:03}"),
            format!("SECTION: {}", self.section),
            format!("FPS: {}", self.fps),
            format!("ACHIEVEMENTS: {}/{}", self.unlocked, self.total),
        ]
    }
}

#[derive(Debug, Default)]
pub struct DevConsole {
    visible: bool,
    fps: FpsMeter,
}

impl DevConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_toggle_key(key: &str) -> bool {
        key == "d" || key == "D"
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Flips visibility. Opening the console enables achievements for good.
    pub fn toggle(&mut self, achievements: &AchievementStore) -> Result<bool> {
        self.visible = !self.visible;
        if self.visible {
            let first_time = !achievements.console_enabled();
            achievements.enable_console()?;
            if first_time {
                achievements.log_overview();
            }
        }
        Ok(self.visible)
    }

    pub fn frame(&mut self, now_ms: f64) -> Option<u32> {
        self.fps.frame(now_ms)
    }

    pub fn readout(&self, state: &VisualState, achievements: &AchievementStore) -> Readout {
        Readout {
            scroll_percent: state.scroll_percent,
            rgb: state.color.channels(),
            section: SECTIONS
                .get(state.current_section)
                .map_or("?", |s| s.name),
            fps: self.fps.fps(),
            unlocked: achievements.unlocked_count(),
            total: achievements.total(),
        }
    }
}

/// Returns `settings` with the field stored under `key` replaced by `value`,
/// or `None` for an unknown key.
pub fn edit_setting(settings: VisualSettings, key: &str, value: f64) -> Option<VisualSettings> {
    let mut next = settings;
    let field = match key {
        keys::ORB_BRIGHTNESS => &mut next.orb_brightness,
        keys::ANIMATION_SPEED => &mut next.animation_speed,
        keys::COLOR_VARIATION => &mut next.color_variation,
        keys::ORB_SIZE => &mut next.orb_size,
        keys::ORB_BLUR => &mut next.orb_blur,
        keys::ORB_OPACITY => &mut next.orb_opacity,
        keys::POSITION_VARIATION => &mut next.position_variation,
        _ => return None,
    };
    *field = value;
    Some(next.clamped())
}

pub fn apply_setting(bus: &SettingsBus, key: &str, value: f64) -> bool {
    match edit_setting(bus.current(), key, value) {
        Some(next) => bus.publish(next),
        None => false,
    }
}

pub fn reset_settings(bus: &SettingsBus) -> bool {
    info!("visual settings reset to defaults");
    bus.publish(VisualSettings::default())
}

pub const PANEL_SCALE_MIN: f64 = 0.4;
pub const PANEL_SCALE_MAX: f64 = 1.2;
pub const PANEL_SCALE_DEFAULT: f64 = 1.0;
/// How far a saved panel may sit off the top or left edge and still be
/// restored.
const PANEL_OFFSCREEN_SLACK: f64 = 200.0;

/// Top-left corner of the console panel in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelPosition {
    pub x: f64,
    pub y: f64,
}

impl Default for PanelPosition {
    fn default() -> Self {
        Self { x: 20.0, y: 20.0 }
    }
}

impl PanelPosition {
    /// Whether enough of the panel would remain reachable in a viewport of
    /// this size.
    pub fn fits(&self, viewport_width: f64, viewport_height: f64) -> bool {
        let slack = -PANEL_OFFSCREEN_SLACK;
        self.x.is_finite()
            && self.y.is_finite()
            && (slack..viewport_width).contains(&self.x)
            && (slack..viewport_height).contains(&self.y)
    }
}

/// Where the console panel sits and how large it is drawn. Both survive a
/// reload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelLayout {
    pub position: PanelPosition,
    pub scale: f64,
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self {
            position: PanelPosition::default(),
            scale: PANEL_SCALE_DEFAULT,
        }
    }
}

impl PanelLayout {
    /// Reads the saved layout. A position that would leave the panel out of
    /// reach in the current viewport, or that does not parse, falls back to
    /// the default corner.
    pub fn load(store: &dyn KeyValueStore, viewport_width: f64, viewport_height: f64) -> Self {
        let position = store
            .get(keys::DEBUG_POSITION)
            .and_then(|raw| match serde_json::from_str::<PanelPosition>(&raw) {
                Ok(position) => Some(position),
                Err(e) => {
                    debug!("ignoring saved console position: {e}");
                    None
                }
            })
            .filter(|p| p.fits(viewport_width, viewport_height))
            .unwrap_or_default();
        let scale = store
            .get_f64(keys::DEBUG_SCALE)
            .filter(|s| s.is_finite())
            .map_or(PANEL_SCALE_DEFAULT, clamp_scale);
        Self { position, scale }
    }

    pub fn save_position(&self, store: &dyn KeyValueStore) -> Result<()> {
        store.set(keys::DEBUG_POSITION, &serde_json::to_string(&self.position)?)
    }

    pub fn save_scale(&self, store: &dyn KeyValueStore) -> Result<()> {
        store.set(keys::DEBUG_SCALE, &self.scale.to_string())
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = clamp_scale(scale);
    }

    /// Size label for the scale slider, relative to the 0.8 the panel was
    /// laid out for.
    pub fn scale_percent(&self) -> String {
        format!("{:.0}%", self.scale / 0.8 * 100.0)
    }

    /// Inline style properties that place and size the panel.
    pub fn style_properties(&self) -> [(&'static str, String); 4] {
        [
            ("left", format!("{}px", self.position.x)),
            ("top", format!("{}px", self.position.y)),
            ("transform", format!("scale({})", self.scale)),
            ("transform-origin", "top left".to_string()),
        ]
    }
}

fn clamp_scale(scale: f64) -> f64 {
    scale.clamp(PANEL_SCALE_MIN, PANEL_SCALE_MAX)
}

/// An in-progress drag of the panel by its body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drag {
    offset_x: f64,
    offset_y: f64,
}

impl Drag {
    /// Grabs the panel at pointer `(x, y)`. Presses on buttons and inputs
    /// belong to those controls and never start a drag.
    pub fn start(target_tag: &str, x: f64, y: f64, from: PanelPosition) -> Option<Self> {
        if matches!(target_tag, "BUTTON" | "INPUT") {
            return None;
        }
        Some(Self {
            offset_x: x - from.x,
            offset_y: y - from.y,
        })
    }

    pub fn moved(&self, x: f64, y: f64) -> PanelPosition {
        PanelPosition {
            x: x - self.offset_x,
            y: y - self.offset_y,
        }
    }
}
