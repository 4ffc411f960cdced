//! Root application state
//!
//! [`AppState`] composes every slice and is only mutated through
//! [`AppState::dispatch`]. The whole state round-trips through JSON so the
//! host can persist it between launches.

use crate::badges::{BadgeAction, BadgeState};
use crate::buddy::{BuddyAction, BuddyState};
use crate::error::KesherError;
use crate::health::{HealthAction, HealthState};
use crate::notifications::{NotificationAction, NotificationState};
use crate::risk::{self, RiskAssessment};
use crate::training;
use crate::types::{parse_date, CheckIn, Mood, RiskLevel, SleepSample};
use crate::user::{UserAction, UserProfile};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Any mutation of the root state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Action {
    User(UserAction),
    Health(HealthAction),
    Buddy(BuddyAction),
    Notification(NotificationAction),
    Badge(BadgeAction),
    /// Complete a training scenario by id
    CompleteScenario(u32),
}

impl Action {
    fn slice(&self) -> &'static str {
        match self {
            Action::User(_) => "user",
            Action::Health(_) => "health",
            Action::Buddy(_) => "buddy",
            Action::Notification(_) => "notification",
            Action::Badge(_) => "badge",
            Action::CompleteScenario(_) => "training",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    #[serde(default)]
    pub user: UserProfile,
    #[serde(default)]
    pub health: HealthState,
    #[serde(default)]
    pub buddy: BuddyState,
    #[serde(default)]
    pub notifications: NotificationState,
    #[serde(default)]
    pub badges: BadgeState,
}

/// Dashboard view of the state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSummary {
    pub today: NaiveDate,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub risk_level: Option<RiskLevel>,
    pub assessment: RiskAssessment,
    pub latest_mood: Option<Mood>,
    pub unread_notifications: usize,
    pub unread_alerts: usize,
    pub buddies: usize,
    pub xp_points: u32,
    pub level: u32,
    pub has_new_badge: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&mut self, action: Action, now: DateTime<Utc>) -> Result<(), KesherError> {
        debug!(slice = action.slice(), "dispatch");
        match action {
            Action::User(action) => self.user.reduce(action),
            Action::Health(action) => self.health.reduce(action, now),
            Action::Buddy(action) => self.buddy.reduce(action, now),
            Action::Notification(action) => self.notifications.reduce(action, now),
            Action::Badge(action) => self.badges.reduce(action, now),
            Action::CompleteScenario(id) => {
                training::complete_scenario(&mut self.badges, id)?;
            }
        }
        Ok(())
    }

    /// Parse one JSON-encoded [`Action`] and apply it
    pub fn dispatch_json(&mut self, json: &str, now: DateTime<Utc>) -> Result<(), KesherError> {
        let action: Action = serde_json::from_str(json)?;
        self.dispatch(action, now)
    }

    /// Load a snapshot; derived flags are recomputed rather than trusted
    pub fn from_json(json: &str) -> Result<Self, KesherError> {
        let mut state: Self = serde_json::from_str(json)?;
        state.notifications.refresh_unread();
        state.badges.refresh_derived();
        Ok(state)
    }

    pub fn to_json(&self) -> Result<String, KesherError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn summary(&self, today: NaiveDate) -> StateSummary {
        StateSummary {
            today,
            current_streak: self.health.current_streak(today),
            longest_streak: self.health.longest_streak(),
            risk_level: self.health.risk_level,
            assessment: self.health.assessment(today),
            latest_mood: self.health.latest_check_in().map(|c| c.mood),
            unread_notifications: self.notifications.unread_count(),
            unread_alerts: self.buddy.unread_alerts(),
            buddies: self.buddy.buddies.len(),
            xp_points: self.badges.xp_points,
            level: self.badges.level,
            has_new_badge: self.badges.has_new_badge,
        }
    }
}

/// Score JSON-encoded histories without any stored state.
///
/// `check_ins_json` and `sleep_json` are JSON arrays; `today` is `YYYY-MM-DD`.
/// Returns the [`RiskAssessment`] as JSON.
pub fn assess_risk_json(
    check_ins_json: &str,
    sleep_json: &str,
    today: &str,
) -> Result<String, KesherError> {
    let check_ins: Vec<CheckIn> = serde_json::from_str(check_ins_json)?;
    let sleep: Vec<SleepSample> = serde_json::from_str(sleep_json)?;
    let today = parse_date(today)?;
    let assessment = risk::assess(&check_ins, &sleep, today);
    Ok(serde_json::to_string(&assessment)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CheckInDraft;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 20, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_dispatch_routes_to_slices() {
        let mut state = AppState::new();
        state
            .dispatch(
                Action::Health(HealthAction::AddCheckIn(CheckInDraft::new(
                    now().date_naive(),
                    Mood::Okay,
                ))),
                now(),
            )
            .unwrap();
        state.dispatch(Action::CompleteScenario(1), now()).unwrap();

        let summary = state.summary(now().date_naive());
        assert_eq!(summary.current_streak, 1);
        assert_eq!(summary.risk_level, Some(RiskLevel::Low));
        assert_eq!(summary.latest_mood, Some(Mood::Okay));
        assert_eq!(summary.xp_points, 50);
        assert_eq!(summary.level, 1);
    }

    #[test]
    fn test_unknown_scenario_is_error() {
        let mut state = AppState::new();
        let err = state.dispatch(Action::CompleteScenario(42), now()).unwrap_err();
        assert!(matches!(err, KesherError::UnknownScenario(42)));
    }

    #[test]
    fn test_dispatch_json() {
        let mut state = AppState::new();
        state
            .dispatch_json(
                r#"{"type":"health","payload":{"type":"add_check_in","payload":{"date":"2024-06-20","mood":"not_good"}}}"#,
                now(),
            )
            .unwrap();
        assert_eq!(state.health.risk_level, Some(RiskLevel::Moderate));

        let err = state.dispatch_json(r#"{"type":"nope"}"#, now()).unwrap_err();
        assert!(matches!(err, KesherError::JsonError(_)));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut state = AppState::new();
        state
            .dispatch(
                Action::Buddy(BuddyAction::AddPendingInvite(uuid::Uuid::new_v4())),
                now(),
            )
            .unwrap();
        state.dispatch(Action::CompleteScenario(3), now()).unwrap();

        let json = state.to_json().unwrap();
        assert_eq!(AppState::from_json(&json).unwrap(), state);
    }

    #[test]
    fn test_snapshot_flags_recomputed_on_load() {
        let json = r#"{
            "notifications": {
                "notifications": [{
                    "id": "6f1c1f7e-8d2a-4c59-9a53-0d6a3c1f2b10",
                    "kind": "check_in",
                    "title": "t",
                    "message": "m",
                    "timestamp": "2024-06-20T09:00:00Z",
                    "read": false
                }],
                "has_unread": false,
                "permission_granted": true
            },
            "badges": {
                "earned_badges": [],
                "xp_points": 5000,
                "level": 1,
                "completed_simulations": [],
                "has_new_badge": true
            }
        }"#;

        let state = AppState::from_json(json).unwrap();
        assert!(state.notifications.has_unread);
        assert_eq!(state.badges.level, 10);
        assert!(!state.badges.has_new_badge);
    }

    #[test]
    fn test_summary_streak_lapses_after_absence() {
        let mut state = AppState::new();
        for _ in 0..2 {
            state
                .dispatch(
                    Action::Health(HealthAction::AddCheckIn(CheckInDraft::new(
                        now().date_naive(),
                        Mood::Good,
                    ))),
                    now(),
                )
                .unwrap();
        }
        assert_eq!(state.summary(now().date_naive()).current_streak, 2);

        let later = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let summary = state.summary(later);
        assert_eq!(summary.assessment.days_since_last_check_in, Some(10));
        assert_eq!(summary.current_streak, 0);
        assert_eq!(summary.longest_streak, 2);
    }

    #[test]
    fn test_partial_snapshot_loads() {
        let state = AppState::from_json(r#"{"badges":{"earned_badges":[],"xp_points":120,"level":2,"completed_simulations":[1],"has_new_badge":false}}"#).unwrap();
        assert_eq!(state.badges.level, 2);
        assert_eq!(state.health, HealthState::default());
    }

    #[test]
    fn test_assess_risk_json() {
        let check_ins = r#"[{"date":"2024-06-20","timestamp":"2024-06-20T08:00:00Z","mood":"not_good"}]"#;
        let json = assess_risk_json(check_ins, "[]", "2024-06-20").unwrap();
        let assessment: RiskAssessment = serde_json::from_str(&json).unwrap();
        assert_eq!(assessment.level, RiskLevel::Moderate);

        let camel = r#"[{"date":"2024-06-20","timestamp":"2024-06-20T08:00:00Z","mood":"notGood"}]"#;
        let json = assess_risk_json(camel, "[]", "2024-06-20").unwrap();
        let assessment: RiskAssessment = serde_json::from_str(&json).unwrap();
        assert_eq!(assessment.negative_streak, 1);

        assert!(matches!(
            assess_risk_json(check_ins, "[]", "20-06-2024"),
            Err(KesherError::DateParseError(_))
        ));
    }
}
