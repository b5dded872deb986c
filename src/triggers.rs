//! Detectors for the easter-egg achievements.
//!
//! Each detector is fed timestamps (milliseconds) and positions by the event
//! listeners and answers "did the trigger just fire". None of them touch the
//! DOM or storage.

use std::collections::VecDeque;

use crate::achievements::AchievementId;
use crate::scroll::ScrollGeometry;

pub const TRIPLE_CLICK_RESET_MS: f64 = 500.0;
pub const RAPID_CLICK_WINDOW_MS: f64 = 2_000.0;
pub const RAPID_CLICK_COUNT: usize = 10;
pub const IDLE_AFTER_MS: f64 = 60_000.0;
pub const SHAKE_DELTA: f64 = 30.0;
pub const SHAKE_WINDOW_MS: f64 = 1_000.0;
pub const SHAKE_COUNT: u32 = 3;
pub const MOUSE_RUSH_MIN_STEP_PX: f64 = 100.0;
pub const MOUSE_RUSH_WINDOW_MS: f64 = 1_000.0;
pub const MOUSE_RUSH_MOVES: usize = 8;
pub const MOUSE_RUSH_DISTANCE_PX: f64 = 2_000.0;
pub const MARATHON_DISTANCE_PX: f64 = 10_000.0;
pub const SPEED_READER_LIMIT_MS: f64 = 120_000.0;
pub const BALANCE_DEBOUNCE_MS: f64 = 200.0;
pub const BALANCE_TOLERANCE: f64 = 1.0;
pub const PARTICLE_COUNT: usize = 8;
pub const PARTICLE_STAGGER_S: f64 = 0.05;
pub const PARTICLE_LIFETIME_MS: f64 = 1_000.0;

pub const KONAMI_CODE: [&str; 10] = [
    "ArrowUp",
    "ArrowUp",
    "ArrowDown",
    "ArrowDown",
    "ArrowLeft",
    "ArrowRight",
    "ArrowLeft",
    "ArrowRight",
    "b",
    "a",
];

/// Three clicks on the hero heading with less than 500 ms between them.
#[derive(Debug, Default, Clone)]
pub struct TripleClick {
    count: u32,
    last_ms: Option<f64>,
}

impl TripleClick {
    pub fn click(&mut self, now_ms: f64) -> bool {
        if self.last_ms.map_or(false, |last| now_ms - last > TRIPLE_CLICK_RESET_MS) {
            self.count = 0;
        }
        self.last_ms = Some(now_ms);
        self.count += 1;
        if self.count == 3 {
            self.count = 0;
            return true;
        }
        false
    }
}

/// Ten clicks anywhere inside a sliding two-second window.
#[derive(Debug, Default, Clone)]
pub struct RapidClicker {
    clicks: VecDeque<f64>,
}

impl RapidClicker {
    pub fn click(&mut self, now_ms: f64) -> bool {
        self.clicks.push_back(now_ms);
        while self
            .clicks
            .front()
            .map_or(false, |&t| now_ms - t >= RAPID_CLICK_WINDOW_MS)
        {
            self.clicks.pop_front();
        }
        if self.clicks.len() >= RAPID_CLICK_COUNT {
            self.clicks.clear();
            return true;
        }
        false
    }
}

/// Whether an event counts as deliberate interaction or just activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    /// mousedown, keypress, touchstart, click
    Interaction,
    /// mousemove, scroll
    Motion,
}

/// Goes idle after a minute without activity, but only once the visitor has
/// actually interacted with the page. Polled from the frame loop.
#[derive(Debug, Default, Clone)]
pub struct IdleTimer {
    interacted: bool,
    last_activity_ms: f64,
    idle: bool,
}

impl IdleTimer {
    /// Returns `true` when this activity ends an idle period.
    pub fn activity(&mut self, kind: Activity, now_ms: f64) -> bool {
        if kind == Activity::Interaction {
            self.interacted = true;
        }
        self.last_activity_ms = now_ms;
        std::mem::replace(&mut self.idle, false)
    }

    /// Returns `true` once per idle period, on the transition to idle.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        if !self.interacted || self.idle {
            return false;
        }
        if now_ms - self.last_activity_ms >= IDLE_AFTER_MS {
            self.idle = true;
            return true;
        }
        false
    }

    pub fn is_idle(&self) -> bool {
        self.idle
    }
}

/// Matches the konami sequence, case-insensitively.
#[derive(Debug, Default, Clone)]
pub struct Konami {
    index: usize,
}

impl Konami {
    pub fn key(&mut self, key: &str) -> bool {
        if key.eq_ignore_ascii_case(KONAMI_CODE[self.index]) {
            self.index += 1;
        } else {
            // A wrong key may still be the start of a new attempt.
            self.index = usize::from(key.eq_ignore_ascii_case(KONAMI_CODE[0]));
        }
        if self.index == KONAMI_CODE.len() {
            self.index = 0;
            return true;
        }
        false
    }

    pub fn progress(&self) -> usize {
        self.index
    }
}

/// Device shaken: three large acceleration jumps with under a second between
/// them.
#[derive(Debug, Default, Clone)]
pub struct ShakeDetector {
    last: (f64, f64, f64),
    count: u32,
    last_shake_ms: Option<f64>,
}

impl ShakeDetector {
    pub fn motion(&mut self, x: f64, y: f64, z: f64, now_ms: f64) -> bool {
        let (lx, ly, lz) = self.last;
        self.last = (x, y, z);
        let delta = (x - lx).abs() + (y - ly).abs() + (z - lz).abs();
        if delta <= SHAKE_DELTA {
            return false;
        }

        if self
            .last_shake_ms
            .map_or(false, |t| now_ms - t > SHAKE_WINDOW_MS)
        {
            self.count = 0;
        }
        self.last_shake_ms = Some(now_ms);
        self.count += 1;
        if self.count >= SHAKE_COUNT {
            self.count = 0;
            return true;
        }
        false
    }
}

/// Desktop stand-in for shaking: at least eight long mouse jumps inside one
/// second covering more than 2000 px.
#[derive(Debug, Default, Clone)]
pub struct MouseRush {
    last: Option<(f64, f64)>,
    moves: VecDeque<(f64, f64)>,
}

impl MouseRush {
    pub fn moved(&mut self, x: f64, y: f64, now_ms: f64) -> bool {
        let Some((lx, ly)) = self.last.replace((x, y)) else {
            return false;
        };
        let distance = (x - lx).hypot(y - ly);
        if distance <= MOUSE_RUSH_MIN_STEP_PX {
            return false;
        }

        self.moves.push_back((now_ms, distance));
        self.moves
            .retain(|&(t, _)| now_ms - t < MOUSE_RUSH_WINDOW_MS);
        if self.moves.len() >= MOUSE_RUSH_MOVES {
            let total: f64 = self.moves.iter().map(|&(_, d)| d).sum();
            if total > MOUSE_RUSH_DISTANCE_PX {
                self.moves.clear();
                return true;
            }
        }
        false
    }
}

/// Accumulated scroll distance in either direction; fires once.
#[derive(Debug, Default, Clone)]
pub struct MarathonRunner {
    last_y: Option<f64>,
    total: f64,
    done: bool,
}

impl MarathonRunner {
    pub fn scrolled(&mut self, scroll_top: f64) -> bool {
        if let Some(last) = self.last_y.replace(scroll_top) {
            self.total += (scroll_top - last).abs();
        }
        if !self.done && self.total >= MARATHON_DISTANCE_PX {
            self.done = true;
            return true;
        }
        false
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    /// Moves the reference point to `scroll_top` without counting distance.
    /// Used when the page jumps programmatically, e.g. when the menu restores
    /// the scroll position it pinned.
    pub fn rebase(&mut self, scroll_top: f64) {
        self.last_y = Some(scroll_top);
    }
}

/// Reaching the bottom of the page within two minutes of loading it.
#[derive(Debug, Clone)]
pub struct SpeedReader {
    start_ms: f64,
    done: bool,
}

impl SpeedReader {
    pub fn new(start_ms: f64) -> Self {
        Self {
            start_ms,
            done: false,
        }
    }

    pub fn scrolled(&mut self, geometry: &ScrollGeometry, now_ms: f64) -> bool {
        if self.done || geometry.max_scroll() <= 0.0 || !geometry.at_bottom() {
            return false;
        }
        if now_ms - self.start_ms < SPEED_READER_LIMIT_MS {
            self.done = true;
            return true;
        }
        false
    }
}

/// Scroll resting at 50% (±1) for 200 ms. Scroll events push the check back;
/// the frame loop polls it.
#[derive(Debug, Default, Clone)]
pub struct PerfectlyBalanced {
    due_ms: Option<f64>,
}

impl PerfectlyBalanced {
    pub fn scrolled(&mut self, now_ms: f64) {
        self.due_ms = Some(now_ms + BALANCE_DEBOUNCE_MS);
    }

    pub fn poll(&mut self, now_ms: f64, scroll_percent: f64) -> bool {
        match self.due_ms {
            Some(due) if now_ms >= due => {
                self.due_ms = None;
                (scroll_percent - 50.0).abs() < BALANCE_TOLERANCE
            }
            _ => false,
        }
    }
}

/// Local calendar facts about the visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitTime {
    /// 0-23
    pub hour: u32,
    /// 0 = Sunday
    pub weekday: u32,
    /// 1-12
    pub month: u32,
    pub day: u32,
}

impl VisitTime {
    pub fn is_april_fools(&self) -> bool {
        self.month == 4 && self.day == 1
    }

    /// Achievements earned just by arriving at this time.
    pub fn achievements(&self) -> Vec<AchievementId> {
        let mut earned = Vec::new();
        match self.hour {
            0..=4 => earned.push(AchievementId::NightOwl),
            5..=7 => earned.push(AchievementId::EarlyBird),
            _ => {}
        }
        if self.weekday == 0 || self.weekday == 6 {
            earned.push(AchievementId::Workaholic);
        }
        if self.is_april_fools() {
            earned.push(AchievementId::AprilFools);
        }
        earned
    }
}

/// `(rotation in degrees, animation delay in seconds)` for each particle of
/// the rapid-click burst, spread evenly around the click point.
pub fn burst_particles() -> impl Iterator<Item = (f64, f64)> {
    let step = 360.0 / PARTICLE_COUNT as f64;
    (0..PARTICLE_COUNT).map(move |i| (i as f64 * step, i as f64 * PARTICLE_STAGGER_S))
}

/// `?april_fools=true` in the page's query string forces the joke.
pub fn april_fools_forced(search: &str) -> bool {
    search
        .trim_start_matches('?')
        .split('&')
        .any(|pair| pair == "april_fools=true")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triple_click() {
        let mut t = TripleClick::default();
        assert!(!t.click(0.0));
        assert!(!t.click(200.0));
        assert!(t.click(400.0));
        // counter restarted
        assert!(!t.click(500.0));
    }

    #[test]
    fn test_triple_click_resets_after_pause() {
        let mut t = TripleClick::default();
        t.click(0.0);
        t.click(100.0);
        assert!(!t.click(700.0));
        assert!(!t.click(800.0));
        assert!(t.click(900.0));
    }

    #[test]
    fn test_rapid_clicker_window() {
        let mut r = RapidClicker::default();
        for i in 0..9 {
            assert!(!r.click(i as f64 * 100.0));
        }
        assert!(r.click(950.0));

        let mut slow = RapidClicker::default();
        for i in 0..20 {
            assert!(!slow.click(i as f64 * 250.0));
        }
    }

    #[test]
    fn test_idle_requires_interaction() {
        let mut idle = IdleTimer::default();
        idle.activity(Activity::Motion, 0.0);
        assert!(!idle.poll(120_000.0));

        idle.activity(Activity::Interaction, 120_000.0);
        assert!(!idle.poll(179_999.0));
        assert!(idle.poll(180_000.0));
        assert!(idle.is_idle());
        assert!(!idle.poll(200_000.0));

        assert!(idle.activity(Activity::Motion, 200_001.0));
        assert!(!idle.is_idle());
    }

    #[test]
    fn test_konami() {
        let mut k = Konami::default();
        let fired: Vec<bool> = KONAMI_CODE.iter().map(|key| k.key(key)).collect();
        assert_eq!(fired.iter().filter(|f| **f).count(), 1);
        assert!(fired[9]);
        assert_eq!(k.progress(), 0);
    }

    #[test]
    fn test_konami_case_and_restart() {
        let mut k = Konami::default();
        // an extra ArrowUp restarts the attempt instead of losing it
        for key in ["ArrowUp", "ArrowUp", "ArrowUp"] {
            k.key(key);
        }
        assert_eq!(k.progress(), 1);
        for key in &KONAMI_CODE[1..8] {
            assert!(!k.key(key));
        }
        assert!(!k.key("B"));
        assert!(k.key("A"));

        k.key("ArrowUp");
        k.key("x");
        assert_eq!(k.progress(), 0);
    }

    #[test]
    fn test_shake() {
        let mut s = ShakeDetector::default();
        assert!(!s.motion(20.0, 20.0, 0.0, 0.0));
        assert!(!s.motion(0.0, 0.0, 0.0, 300.0));
        assert!(s.motion(20.0, 20.0, 0.0, 600.0));

        let mut gentle = ShakeDetector::default();
        for i in 0..10 {
            assert!(!gentle.motion(i as f64, 0.0, 0.0, i as f64 * 50.0));
        }
    }

    #[test]
    fn test_shake_window_expires() {
        let mut s = ShakeDetector::default();
        s.motion(40.0, 0.0, 0.0, 0.0);
        s.motion(0.0, 0.0, 0.0, 500.0);
        assert!(!s.motion(40.0, 0.0, 0.0, 2_000.0));
    }

    #[test]
    fn test_mouse_rush() {
        let mut m = MouseRush::default();
        assert!(!m.moved(0.0, 0.0, 0.0));
        let mut fired = false;
        for i in 1..=8 {
            let x = if i % 2 == 0 { 0.0 } else { 300.0 };
            fired = m.moved(x, 0.0, i as f64 * 50.0);
        }
        assert!(fired);

        let mut short = MouseRush::default();
        for i in 0..30 {
            assert!(!short.moved(i as f64 * 50.0, 0.0, i as f64 * 10.0));
        }
    }

    #[test]
    fn test_marathon() {
        let mut m = MarathonRunner::default();
        assert!(!m.scrolled(0.0));
        assert!(!m.scrolled(6_000.0));
        assert!(m.scrolled(2_000.0));
        assert!(!m.scrolled(9_000.0));
        assert_eq!(m.total(), 17_000.0);
    }

    #[test]
    fn test_marathon_ignores_menu_pin_and_restore() {
        let mut m = MarathonRunner::default();
        for step in 0..=40 {
            assert!(!m.scrolled(step as f64 * 100.0));
        }
        assert_eq!(m.total(), 4_000.0);

        // The pinned body reports y = 0 while tracking is suppressed, so that
        // event is never fed. Closing the menu rebases before the restore.
        m.rebase(4_000.0);
        assert!(!m.scrolled(4_000.0));
        assert_eq!(m.total(), 4_000.0);

        for step in 1..=60 {
            m.scrolled(4_000.0 + step as f64 * 100.0);
        }
        assert_eq!(m.total(), 10_000.0);
    }

    #[test]
    fn test_burst_particles() {
        let particles: Vec<_> = burst_particles().collect();
        assert_eq!(particles.len(), PARTICLE_COUNT);
        assert_eq!(particles[0], (0.0, 0.0));
        assert_eq!(particles[2].0, 90.0);
        assert!((particles[7].1 - 0.35).abs() < 1e-12);
    }

    #[test]
    fn test_speed_reader() {
        let bottom = ScrollGeometry {
            scroll_top: 8_000.0,
            document_height: 9_000.0,
            viewport_height: 1_000.0,
        };
        let middle = ScrollGeometry {
            scroll_top: 4_000.0,
            ..bottom
        };

        let mut r = SpeedReader::new(1_000.0);
        assert!(!r.scrolled(&middle, 5_000.0));
        assert!(r.scrolled(&bottom, 60_000.0));
        assert!(!r.scrolled(&bottom, 61_000.0));

        let mut slow = SpeedReader::new(0.0);
        assert!(!slow.scrolled(&bottom, 120_000.0));
    }

    #[test]
    fn test_perfectly_balanced_debounce() {
        let mut b = PerfectlyBalanced::default();
        assert!(!b.poll(0.0, 50.0));

        b.scrolled(1_000.0);
        assert!(!b.poll(1_100.0, 50.0));
        b.scrolled(1_150.0);
        assert!(!b.poll(1_300.0, 50.0));
        assert!(b.poll(1_350.0, 50.4));
        assert!(!b.poll(1_400.0, 50.4));

        b.scrolled(2_000.0);
        assert!(!b.poll(2_200.0, 51.5));
    }

    #[test]
    fn test_visit_time() {
        let night = VisitTime {
            hour: 3,
            weekday: 6,
            month: 4,
            day: 1,
        };
        assert_eq!(
            night.achievements(),
            vec![
                AchievementId::NightOwl,
                AchievementId::Workaholic,
                AchievementId::AprilFools
            ]
        );

        let morning = VisitTime {
            hour: 7,
            weekday: 2,
            month: 10,
            day: 19,
        };
        assert_eq!(morning.achievements(), vec![AchievementId::EarlyBird]);

        let noon = VisitTime { hour: 12, ..morning };
        assert!(noon.achievements().is_empty());
    }

    #[test]
    fn test_april_fools_query() {
        assert!(april_fools_forced("?april_fools=true"));
        assert!(april_fools_forced("?a=1&april_fools=true"));
        assert!(!april_fools_forced("?april_fools=false"));
        assert!(!april_fools_forced(""));
    }
}
