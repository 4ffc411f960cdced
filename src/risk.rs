//! Risk scoring
//!
//! Point accumulation over recent check-ins and sleep samples:
//!
//! | Signal                                   | Effect     |
//! |------------------------------------------|------------|
//! | more than 3 days since last check-in     | **high**   |
//! | 2-3 days since last check-in             | +1         |
//! | 5+ newest check-ins negative             | **high**   |
//! | 3-4 newest check-ins negative            | +2         |
//! | 1-2 newest check-ins negative            | +1         |
//! | 3 of the last 3 nights poor              | +2         |
//! | 1-2 of the last 3 nights poor            | +1         |
//!
//! The two **high** rows are overrides: they return before any points are
//! added. Points map to `0 => low, 1 => moderate, 2 => elevated, 3+ => high`.

use crate::types::{CheckIn, RiskLevel, SleepSample};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Absence longer than this many days forces a high risk level
pub const ABSENCE_OVERRIDE_DAYS: i64 = 3;

/// Absence longer than this many days adds a point
pub const ABSENCE_POINT_DAYS: i64 = 1;

/// Negative check-ins in a row that force a high risk level
pub const NEGATIVE_STREAK_OVERRIDE: u32 = 5;

/// Number of most recent nights inspected for poor sleep
pub const SLEEP_WINDOW: usize = 3;

/// Which override short-circuited the scoring, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskOverride {
    ProlongedAbsence,
    NegativeMoodStreak,
}

/// Explanation of a risk level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    /// Whole days since the newest check-in (None without check-ins)
    pub days_since_last_check_in: Option<i64>,
    /// Consecutive newest check-ins with a negative mood
    pub negative_streak: u32,
    /// Poor nights among the most recent samples
    pub poor_sleep_count: u32,
    /// Accumulated points (0 when an override fired)
    pub points: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_reason: Option<RiskOverride>,
}

impl RiskAssessment {
    fn overridden(
        reason: RiskOverride,
        days_since_last_check_in: Option<i64>,
        negative_streak: u32,
    ) -> Self {
        Self {
            level: RiskLevel::High,
            days_since_last_check_in,
            negative_streak,
            poor_sleep_count: 0,
            points: 0,
            override_reason: Some(reason),
        }
    }
}

/// Risk level for the given history as of `today`
pub fn risk_level(check_ins: &[CheckIn], sleep: &[SleepSample], today: NaiveDate) -> RiskLevel {
    assess(check_ins, sleep, today).level
}

/// Score the history and keep the intermediate signals
pub fn assess(check_ins: &[CheckIn], sleep: &[SleepSample], today: NaiveDate) -> RiskAssessment {
    let mut points = 0;
    let mut days_since_last_check_in = None;
    let mut negative_streak = 0;

    let newest_first = sorted_check_ins(check_ins);

    if let Some(latest) = newest_first.first() {
        let days = (today - latest.date).num_days();
        days_since_last_check_in = Some(days);

        if days > ABSENCE_OVERRIDE_DAYS {
            return RiskAssessment::overridden(RiskOverride::ProlongedAbsence, Some(days), 0);
        }
        if days > ABSENCE_POINT_DAYS {
            points += 1;
        }

        negative_streak = newest_first
            .iter()
            .take_while(|c| c.mood.is_negative())
            .count() as u32;

        if negative_streak >= NEGATIVE_STREAK_OVERRIDE {
            return RiskAssessment::overridden(
                RiskOverride::NegativeMoodStreak,
                Some(days),
                negative_streak,
            );
        }
        points += match negative_streak {
            0 => 0,
            1..=2 => 1,
            _ => 2,
        };
    }

    let poor_sleep_count = poor_sleep_count(sleep);
    points += match poor_sleep_count {
        0 => 0,
        c if c as usize >= SLEEP_WINDOW => 2,
        _ => 1,
    };

    RiskAssessment {
        level: RiskLevel::from_points(points),
        days_since_last_check_in,
        negative_streak,
        poor_sleep_count,
        points,
        override_reason: None,
    }
}

/// Newest first by date; same-day entries newest timestamp first
fn sorted_check_ins(check_ins: &[CheckIn]) -> Vec<&CheckIn> {
    let mut sorted: Vec<&CheckIn> = check_ins.iter().collect();
    sorted.sort_by_key(|c| (Reverse(c.date), Reverse(c.timestamp)));
    sorted
}

fn poor_sleep_count(sleep: &[SleepSample]) -> u32 {
    let mut sorted: Vec<&SleepSample> = sleep.iter().collect();
    sorted.sort_by_key(|s| Reverse(s.date));
    sorted
        .into_iter()
        .take(SLEEP_WINDOW)
        .filter(|s| s.is_poor())
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Mood, SleepQuality};
    use chrono::{Days, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 20).unwrap()
    }

    fn days_ago(n: u64) -> NaiveDate {
        today().checked_sub_days(Days::new(n)).unwrap()
    }

    fn check_in(date: NaiveDate, mood: Mood, minute: u32) -> CheckIn {
        CheckIn {
            date,
            timestamp: Utc.with_ymd_and_hms(2024, 6, 1, 8, minute, 0).unwrap(),
            mood,
            note: None,
        }
    }

    fn night(date: NaiveDate, hours: f64) -> SleepSample {
        SleepSample::new(date, hours, None)
    }

    #[test]
    fn test_empty_history_is_low() {
        let assessment = assess(&[], &[], today());
        assert_eq!(assessment.level, RiskLevel::Low);
        assert_eq!(assessment.days_since_last_check_in, None);
        assert_eq!(assessment.points, 0);
    }

    #[test]
    fn test_single_not_good_today_is_moderate() {
        let check_ins = vec![check_in(today(), Mood::NotGood, 0)];
        assert_eq!(risk_level(&check_ins, &[], today()), RiskLevel::Moderate);
    }

    #[test]
    fn test_three_short_nights_without_check_ins_is_elevated() {
        let sleep = vec![night(days_ago(0), 3.0), night(days_ago(1), 3.0), night(days_ago(2), 3.0)];
        let assessment = assess(&[], &sleep, today());
        assert_eq!(assessment.poor_sleep_count, 3);
        assert_eq!(assessment.level, RiskLevel::Elevated);
    }

    #[test]
    fn test_five_bad_check_ins_is_high() {
        let check_ins: Vec<CheckIn> = (0..5)
            .map(|i| check_in(days_ago(i), Mood::Bad, 0))
            .collect();
        let good_sleep = vec![night(days_ago(0), 8.0)];

        let assessment = assess(&check_ins, &good_sleep, today());
        assert_eq!(assessment.level, RiskLevel::High);
        assert_eq!(assessment.override_reason, Some(RiskOverride::NegativeMoodStreak));
    }

    #[test]
    fn test_four_day_absence_is_high_regardless_of_mood() {
        let check_ins = vec![check_in(days_ago(4), Mood::Great, 0)];
        let assessment = assess(&check_ins, &[], today());
        assert_eq!(assessment.level, RiskLevel::High);
        assert_eq!(assessment.days_since_last_check_in, Some(4));
        assert_eq!(assessment.override_reason, Some(RiskOverride::ProlongedAbsence));
    }

    #[test]
    fn test_absence_override_wins_over_negative_streak() {
        let check_ins: Vec<CheckIn> = (4..10)
            .map(|i| check_in(days_ago(i), Mood::Bad, 0))
            .collect();
        let assessment = assess(&check_ins, &[], today());
        assert_eq!(assessment.override_reason, Some(RiskOverride::ProlongedAbsence));
        assert_eq!(assessment.negative_streak, 0);
    }

    #[test]
    fn test_override_ignores_good_sleep_and_skips_points() {
        let check_ins = vec![check_in(days_ago(5), Mood::Great, 0)];
        let sleep = vec![night(days_ago(0), 3.0)];
        let assessment = assess(&check_ins, &sleep, today());
        assert_eq!(assessment.points, 0);
        assert_eq!(assessment.poor_sleep_count, 0);
    }

    #[test]
    fn test_three_day_absence_adds_one_point() {
        let check_ins = vec![check_in(days_ago(3), Mood::Good, 0)];
        assert_eq!(risk_level(&check_ins, &[], today()), RiskLevel::Moderate);

        let check_ins = vec![check_in(days_ago(1), Mood::Good, 0)];
        assert_eq!(risk_level(&check_ins, &[], today()), RiskLevel::Low);
    }

    #[test]
    fn test_negative_streak_stops_at_first_positive() {
        let check_ins = vec![
            check_in(days_ago(0), Mood::Bad, 0),
            check_in(days_ago(1), Mood::NotGood, 0),
            check_in(days_ago(2), Mood::Good, 0),
            check_in(days_ago(3), Mood::Bad, 0),
        ];
        let assessment = assess(&check_ins, &[], today());
        assert_eq!(assessment.negative_streak, 2);
        assert_eq!(assessment.level, RiskLevel::Moderate);
    }

    #[test]
    fn test_three_negative_check_ins_add_two_points() {
        let check_ins: Vec<CheckIn> = (0..3)
            .map(|i| check_in(days_ago(i), Mood::NotGood, 0))
            .collect();
        assert_eq!(risk_level(&check_ins, &[], today()), RiskLevel::Elevated);
    }

    #[test]
    fn test_same_day_newest_timestamp_counts_first() {
        let check_ins = vec![
            check_in(today(), Mood::Bad, 0),
            check_in(today(), Mood::Great, 30),
        ];
        let assessment = assess(&check_ins, &[], today());
        assert_eq!(assessment.negative_streak, 0);
        assert_eq!(assessment.level, RiskLevel::Low);
    }

    #[test]
    fn test_points_accumulate_to_high() {
        let check_ins: Vec<CheckIn> = (2..5)
            .map(|i| check_in(days_ago(i), Mood::Bad, 0))
            .collect();
        let sleep = vec![night(days_ago(0), 7.5)];
        let assessment = assess(&check_ins, &sleep, today());
        // absence (+1) and negative streak of three (+2)
        assert_eq!(assessment.points, 3);
        assert_eq!(assessment.level, RiskLevel::High);
    }

    #[test]
    fn test_only_three_most_recent_nights_count() {
        let sleep = vec![
            night(days_ago(5), 2.0),
            night(days_ago(4), 2.0),
            night(days_ago(0), 8.0),
            night(days_ago(1), 8.0),
            SleepSample::new(days_ago(2), 9.0, Some(SleepQuality::Poor)),
        ];
        let assessment = assess(&[], &sleep, today());
        assert_eq!(assessment.poor_sleep_count, 1);
        assert_eq!(assessment.level, RiskLevel::Moderate);
    }

    #[test]
    fn test_future_dated_check_in_adds_no_absence_point() {
        let tomorrow = today().checked_add_days(Days::new(1)).unwrap();
        let check_ins = vec![check_in(tomorrow, Mood::Good, 0)];
        assert_eq!(risk_level(&check_ins, &[], today()), RiskLevel::Low);
    }
}
