//! Achievement catalogue and its persisted per-browser state.
//!
//! Records live under [`keys::ACHIEVEMENTS`] as a JSON array. Nothing unlocks
//! until the developer console has been opened once on this browser.

use std::cell::RefCell;
use std::rc::Rc;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::observe::{SubscriptionId, Subscribers};
use crate::storage::{keys, KeyValueStore};

/// Visits needed (before the current one) for the repeat-visitor badge.
pub const REPEAT_VISIT_THRESHOLD: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AchievementId {
    TripleClick,
    PerfectlyBalanced,
    Patience,
    RapidClicker,
    CopyCat,
    AprilFools,
    Konami,
    Shake,
    NightOwl,
    EarlyBird,
    Workaholic,
    MarathonRunner,
    SpeedReader,
    RepeatVisitor,
}

impl AchievementId {
    pub const ALL: [AchievementId; 14] = [
        Self::TripleClick,
        Self::PerfectlyBalanced,
        Self::Patience,
        Self::RapidClicker,
        Self::CopyCat,
        Self::AprilFools,
        Self::Konami,
        Self::Shake,
        Self::NightOwl,
        Self::EarlyBird,
        Self::Workaholic,
        Self::MarathonRunner,
        Self::SpeedReader,
        Self::RepeatVisitor,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TripleClick => "triple-click",
            Self::PerfectlyBalanced => "perfectly-balanced",
            Self::Patience => "patience",
            Self::RapidClicker => "rapid-clicker",
            Self::CopyCat => "copy-cat",
            Self::AprilFools => "april-fools",
            Self::Konami => "konami",
            Self::Shake => "shake",
            Self::NightOwl => "night-owl",
            Self::EarlyBird => "early-bird",
            Self::Workaholic => "workaholic",
            Self::MarathonRunner => "marathon-runner",
            Self::SpeedReader => "speed-reader",
            Self::RepeatVisitor => "repeat-visitor",
        }
    }

    pub fn parse(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == id)
    }

    /// `(name, description, icon)`
    fn details(self) -> (&'static str, &'static str, &'static str) {
        match self {
            Self::TripleClick => ("Speed Clicker", "Triple-clicked the logo", "⚡"),
            Self::PerfectlyBalanced => (
                "Perfectly Balanced",
                "Scrolled to exactly 50% of the page",
                "⚖️",
            ),
            Self::Patience => ("Patience is a Virtue", "Stayed idle for 60 seconds", "💤"),
            Self::RapidClicker => ("Click Master", "Clicked 10 times in 2 seconds", "🖱️"),
            Self::CopyCat => ("Copy Cat", "Copied some text", "📋"),
            Self::AprilFools => ("Fooled Ya!", "Visited on April Fools' Day", "🤡"),
            Self::Konami => ("Classic Gamer", "Entered the Konami Code", "🎮"),
            Self::Shake => (
                "Shake It Off",
                "Shook your device or moved mouse rapidly",
                "📱",
            ),
            Self::NightOwl => ("Night Owl", "Visited between midnight and 5 AM", "🦉"),
            Self::EarlyBird => ("Early Bird", "Visited between 5 AM and 8 AM", "🐦"),
            Self::Workaholic => ("Workaholic", "Visited on the weekend", "💼"),
            Self::MarathonRunner => (
                "Marathon Runner",
                "Scrolled a total of 10,000 pixels",
                "🏃",
            ),
            Self::SpeedReader => (
                "Speed Reader",
                "Reached the bottom in under 2 minutes",
                "📚",
            ),
            Self::RepeatVisitor => ("Repeat Visitor", "Visited the site 3+ times", "🔄"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub unlocked: bool,
    /// Milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<f64>,
}

impl AchievementRecord {
    pub fn locked(id: AchievementId) -> Self {
        let (name, description, icon) = id.details();
        Self {
            id: id.as_str().to_string(),
            name: name.to_string(),
            description: description.to_string(),
            icon: icon.to_string(),
            unlocked: false,
            unlocked_at: None,
        }
    }
}

fn defaults() -> Vec<AchievementRecord> {
    AchievementId::ALL.into_iter().map(AchievementRecord::locked).collect()
}

/// Catalogue entries with saved progress folded in. Saved entries for ids the
/// catalogue no longer knows are dropped.
fn merge(saved: Vec<AchievementRecord>) -> Vec<AchievementRecord> {
    AchievementId::ALL
        .into_iter()
        .map(|id| {
            let mut record = AchievementRecord::locked(id);
            if let Some(prev) = saved.iter().find(|r| r.id == id.as_str()) {
                record.unlocked = prev.unlocked;
                record.unlocked_at = prev.unlocked_at.filter(|_| prev.unlocked);
            }
            record
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum AchievementEvent {
    Unlocked(AchievementRecord),
    Reset,
}

pub struct AchievementStore {
    storage: Rc<dyn KeyValueStore>,
    records: RefCell<Vec<AchievementRecord>>,
    events: Subscribers<AchievementEvent>,
}

impl AchievementStore {
    /// Loads saved progress. Corrupt JSON is discarded and the key cleared.
    pub fn load(storage: Rc<dyn KeyValueStore>) -> Self {
        let records = match storage.get(keys::ACHIEVEMENTS) {
            None => defaults(),
            Some(raw) => match serde_json::from_str::<Vec<AchievementRecord>>(&raw) {
                Ok(saved) => merge(saved),
                Err(e) => {
                    warn!("failed to load achievements, resetting: {e}");
                    if let Err(e) = storage.remove(keys::ACHIEVEMENTS) {
                        warn!("could not clear achievements: {e}");
                    }
                    defaults()
                }
            },
        };

        Self {
            storage,
            records: RefCell::new(records),
            events: Subscribers::new(),
        }
    }

    pub fn records(&self) -> Vec<AchievementRecord> {
        self.records.borrow().clone()
    }

    pub fn get(&self, id: AchievementId) -> Option<AchievementRecord> {
        self.records
            .borrow()
            .iter()
            .find(|r| r.id == id.as_str())
            .cloned()
    }

    pub fn is_unlocked(&self, id: AchievementId) -> bool {
        self.get(id).map_or(false, |r| r.unlocked)
    }

    pub fn unlocked_count(&self) -> usize {
        self.records.borrow().iter().filter(|r| r.unlocked).count()
    }

    pub fn total(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn subscribe(&self, callback: impl FnMut(&AchievementEvent) + 'static) -> SubscriptionId {
        self.events.subscribe(callback)
    }

    /// Whether the developer console was ever opened on this browser.
    pub fn console_enabled(&self) -> bool {
        self.storage.get_flag(keys::DEV_CONSOLE_OPENED)
    }

    pub fn enable_console(&self) -> Result<()> {
        if !self.console_enabled() {
            info!("achievement system activated");
        }
        self.storage.set(keys::DEV_CONSOLE_OPENED, "true")
    }

    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_string(&*self.records.borrow())?;
        self.storage.set(keys::ACHIEVEMENTS, &json)
    }

    /// Unlocks `id` at `now_ms`. Returns the record only on the transition
    /// from locked to unlocked; repeated triggers and triggers before the
    /// console was opened return `None`.
    pub fn unlock(&self, id: AchievementId, now_ms: f64) -> Result<Option<AchievementRecord>> {
        if !self.console_enabled() {
            return Ok(None);
        }

        let unlocked = {
            let mut records = self.records.borrow_mut();
            let Some(record) = records.iter_mut().find(|r| r.id == id.as_str()) else {
                return Ok(None);
            };
            if record.unlocked {
                return Ok(None);
            }
            record.unlocked = true;
            record.unlocked_at = Some(now_ms);
            record.clone()
        };

        self.save()?;
        info!(
            "achievement unlocked: {} {} ({})",
            unlocked.icon, unlocked.name, unlocked.description
        );
        self.events.notify(&AchievementEvent::Unlocked(unlocked.clone()));
        Ok(Some(unlocked))
    }

    pub fn reset(&self) -> Result<()> {
        *self.records.borrow_mut() = defaults();
        self.save()?;
        info!("achievements reset");
        self.events.notify(&AchievementEvent::Reset);
        Ok(())
    }

    /// Counts this visit. Returns the number of earlier visits.
    pub fn record_visit(&self) -> Result<u32> {
        let previous = self
            .storage
            .get(keys::VISIT_COUNT)
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(0);
        self.storage
            .set(keys::VISIT_COUNT, &previous.saturating_add(1).to_string())?;
        Ok(previous)
    }

    /// Logs the full list with lock state, shown once the console is enabled.
    pub fn log_overview(&self) {
        info!(
            "🏆 {} achievements available, {} unlocked. Press D to open the dev console.",
            self.total(),
            self.unlocked_count()
        );
        for record in self.records.borrow().iter() {
            let mark = if record.unlocked { "✅" } else { "🔒" };
            info!("{mark} {} {}: {}", record.icon, record.name, record.description);
        }
    }
}
