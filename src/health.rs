//! Health state container
//!
//! Holds the check-in, sleep and steps histories together with the values
//! derived from them (streak counter and risk level). The derived values are
//! recomputed after every mutation that can affect them; the only other way to
//! change the risk level is an explicit override.

use crate::risk::{self, RiskAssessment};
use crate::streak::StreakCounter;
use crate::types::{CheckIn, CheckInDraft, RiskLevel, SleepSample, StepsSample};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Mutations accepted by [`HealthState::reduce`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum HealthAction {
    AddCheckIn(CheckInDraft),
    AddSleepSample(SleepSample),
    AddStepsSample(StepsSample),
    SetRiskLevel(Option<RiskLevel>),
    SetHealthPermission(bool),
    Clear,
}

/// Check-in and sleep history with derived streak and risk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthState {
    /// Sleep samples, one per date
    pub sleep_data: Vec<SleepSample>,
    /// Step samples, one per date
    pub steps_data: Vec<StepsSample>,
    /// Every check-in in submission order
    pub check_ins: Vec<CheckIn>,
    /// Streak derived from the check-ins
    pub streak: StreakCounter,
    /// Derived risk level; unset until the first check-in or sleep sample
    pub risk_level: Option<RiskLevel>,
    pub health_permission_granted: bool,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one action. `now` stamps new records and defines "today".
    pub fn reduce(&mut self, action: HealthAction, now: DateTime<Utc>) {
        match action {
            HealthAction::AddCheckIn(draft) => {
                self.add_check_in(draft, now);
            }
            HealthAction::AddSleepSample(sample) => self.add_sleep_sample(sample, now.date_naive()),
            HealthAction::AddStepsSample(sample) => self.add_steps_sample(sample),
            HealthAction::SetRiskLevel(level) => self.set_risk_level(level),
            HealthAction::SetHealthPermission(granted) => self.health_permission_granted = granted,
            HealthAction::Clear => self.clear(),
        }
    }

    /// Record a check-in, then refresh the streak and risk level
    pub fn add_check_in(&mut self, draft: CheckInDraft, now: DateTime<Utc>) -> &CheckIn {
        let today = now.date_naive();
        let check_in = draft.into_check_in(now);

        self.streak.record(&self.check_ins, check_in.date, today);
        self.check_ins.push(check_in);
        self.refresh_risk(today);

        debug!(
            current_streak = self.streak.current_streak,
            longest_streak = self.streak.longest_streak,
            "check-in recorded"
        );

        &self.check_ins[self.check_ins.len() - 1]
    }

    /// Insert or replace the sample for its date, then refresh the risk level
    pub fn add_sleep_sample(&mut self, sample: SleepSample, today: NaiveDate) {
        match self.sleep_data.iter_mut().find(|s| s.date == sample.date) {
            Some(existing) => *existing = sample,
            None => self.sleep_data.push(sample),
        }
        self.refresh_risk(today);
    }

    /// Insert or replace the steps sample for its date
    pub fn add_steps_sample(&mut self, sample: StepsSample) {
        match self.steps_data.iter_mut().find(|s| s.date == sample.date) {
            Some(existing) => *existing = sample,
            None => self.steps_data.push(sample),
        }
    }

    /// Explicit override; stays until the next check-in or sleep update
    pub fn set_risk_level(&mut self, level: Option<RiskLevel>) {
        self.risk_level = level;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Fresh assessment of the current history (does not touch stored state)
    pub fn assessment(&self, today: NaiveDate) -> RiskAssessment {
        risk::assess(&self.check_ins, &self.sleep_data, today)
    }

    /// Streak as of `today`: 0 once more than one full day passed without a check-in
    pub fn current_streak(&self, today: NaiveDate) -> u32 {
        self.streak.current_as_of(today)
    }

    pub fn longest_streak(&self) -> u32 {
        self.streak.longest_streak
    }

    /// Newest check-in by submission order
    pub fn latest_check_in(&self) -> Option<&CheckIn> {
        self.check_ins.last()
    }

    fn refresh_risk(&mut self, today: NaiveDate) {
        let assessment = self.assessment(today);
        debug!(
            level = %assessment.level,
            points = assessment.points,
            negative_streak = assessment.negative_streak,
            poor_sleep = assessment.poor_sleep_count,
            "risk level recomputed"
        );
        self.risk_level = Some(assessment.level);
    }
}
