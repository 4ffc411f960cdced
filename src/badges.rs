//! Badges, XP and level

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// XP needed to reach levels 2 through 10
pub const LEVEL_THRESHOLDS: [u32; 9] = [100, 300, 600, 1000, 1500, 2100, 2800, 3600, 4500];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeKind {
    SleepStreak,
    CheckInStreak,
    SupportiveBuddy,
    ReflexMaster,
    MorningPerson,
    Initiator,
    ConsistentSchedule,
    SocialButterfly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeLevel {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    pub id: String,
    pub kind: BadgeKind,
    pub level: BadgeLevel,
    pub title: String,
    pub description: String,
    pub icon_name: String,
    pub earned_at: DateTime<Utc>,
    /// Whether the "new badge" celebration was shown
    pub displayed: bool,
}

/// Badge definition as awarded, before it is stamped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBadge {
    pub id: String,
    pub kind: BadgeKind,
    pub level: BadgeLevel,
    pub title: String,
    pub description: String,
    pub icon_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum BadgeAction {
    AddBadge(NewBadge),
    MarkBadgeAsDisplayed(String),
    AddXp(u32),
    AddCompletedSimulation(u32),
    Clear,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BadgeState {
    pub earned_badges: Vec<Badge>,
    pub xp_points: u32,
    /// Always `level_for_xp(xp_points)`
    pub level: u32,
    pub completed_simulations: Vec<u32>,
    pub has_new_badge: bool,
}

impl Default for BadgeState {
    fn default() -> Self {
        Self {
            earned_badges: Vec::new(),
            xp_points: 0,
            level: 1,
            completed_simulations: Vec::new(),
            has_new_badge: false,
        }
    }
}

/// Level (1-10) for an XP total
pub fn level_for_xp(xp: u32) -> u32 {
    1 + LEVEL_THRESHOLDS.iter().filter(|&&threshold| xp >= threshold).count() as u32
}

impl BadgeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reduce(&mut self, action: BadgeAction, now: DateTime<Utc>) {
        match action {
            BadgeAction::AddBadge(badge) => {
                self.add_badge(badge, now);
            }
            BadgeAction::MarkBadgeAsDisplayed(id) => self.mark_displayed(&id),
            BadgeAction::AddXp(xp) => self.add_xp(xp),
            BadgeAction::AddCompletedSimulation(id) => self.add_completed_simulation(id),
            BadgeAction::Clear => *self = Self::default(),
        }
    }

    /// Award a badge once; returns false if the id was already earned
    pub fn add_badge(&mut self, badge: NewBadge, now: DateTime<Utc>) -> bool {
        if self.earned_badges.iter().any(|b| b.id == badge.id) {
            return false;
        }
        self.earned_badges.push(Badge {
            id: badge.id,
            kind: badge.kind,
            level: badge.level,
            title: badge.title,
            description: badge.description,
            icon_name: badge.icon_name,
            earned_at: now,
            displayed: false,
        });
        self.has_new_badge = true;
        true
    }

    pub fn mark_displayed(&mut self, id: &str) {
        if let Some(badge) = self.earned_badges.iter_mut().find(|b| b.id == id) {
            badge.displayed = true;
        }
        self.has_new_badge = self.earned_badges.iter().any(|b| !b.displayed);
    }

    pub fn add_xp(&mut self, xp: u32) {
        self.xp_points = self.xp_points.saturating_add(xp);
        self.level = level_for_xp(self.xp_points);
    }

    pub fn add_completed_simulation(&mut self, id: u32) {
        if !self.completed_simulations.contains(&id) {
            self.completed_simulations.push(id);
        }
    }

    /// Recompute `level` and `has_new_badge` from the stored badges and XP
    pub fn refresh_derived(&mut self) {
        self.level = level_for_xp(self.xp_points);
        self.has_new_badge = self.earned_badges.iter().any(|b| !b.displayed);
    }

    pub fn has_completed(&self, simulation_id: u32) -> bool {
        self.completed_simulations.contains(&simulation_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 20, 12, 0, 0).unwrap()
    }

    fn streak_badge() -> NewBadge {
        NewBadge {
            id: "check_in_streak_bronze".into(),
            kind: BadgeKind::CheckInStreak,
            level: BadgeLevel::Bronze,
            title: "Three days in a row".into(),
            description: "Checked in three days running".into(),
            icon_name: "flame".into(),
        }
    }

    #[test]
    fn test_level_thresholds() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(99), 1);
        assert_eq!(level_for_xp(100), 2);
        assert_eq!(level_for_xp(599), 3);
        assert_eq!(level_for_xp(4499), 9);
        assert_eq!(level_for_xp(4500), 10);
        assert_eq!(level_for_xp(100_000), 10);
    }

    #[test]
    fn test_add_xp_updates_level() {
        let mut state = BadgeState::new();
        state.add_xp(50);
        assert_eq!(state.level, 1);
        state.add_xp(75);
        assert_eq!(state.xp_points, 125);
        assert_eq!(state.level, 2);
    }

    #[test]
    fn test_badge_awarded_once() {
        let mut state = BadgeState::new();
        assert!(state.add_badge(streak_badge(), now()));
        assert!(!state.add_badge(streak_badge(), now()));
        assert_eq!(state.earned_badges.len(), 1);
        assert!(state.has_new_badge);

        state.mark_displayed("check_in_streak_bronze");
        assert!(!state.has_new_badge);
    }

    #[test]
    fn test_completed_simulations_deduplicated() {
        let mut state = BadgeState::new();
        state.reduce(BadgeAction::AddCompletedSimulation(2), now());
        state.reduce(BadgeAction::AddCompletedSimulation(2), now());
        assert_eq!(state.completed_simulations, vec![2]);
        assert!(state.has_completed(2));

        state.reduce(BadgeAction::Clear, now());
        assert_eq!(state.level, 1);
        assert!(state.completed_simulations.is_empty());
    }
}
