//! Check-in streak tracking
//!
//! The streak is re-derived every time a check-in is appended, by comparing
//! today against the newest check-in that existed *before* the append:
//!
//! - no prior check-in: the first check-in starts the streak at 1
//! - prior check-in today: previous streak + 1 (same-day check-ins keep counting)
//! - prior check-in yesterday: previous streak, unchanged
//! - anything older: the streak resets to 0

use crate::types::CheckIn;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Streak state derived from the check-in history
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakCounter {
    /// Current run of check-in days
    pub current_streak: u32,
    /// Best run ever recorded; never below `current_streak`
    pub longest_streak: u32,
    /// Date of the most recently appended check-in
    pub last_check_in_date: Option<NaiveDate>,
}

impl StreakCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the counter for a check-in dated `check_in_date` that is about to
    /// be appended after `prior`.
    pub fn record(&mut self, prior: &[CheckIn], check_in_date: NaiveDate, today: NaiveDate) {
        self.current_streak = next_streak(prior, self.current_streak, today);
        self.longest_streak = self.longest_streak.max(self.current_streak);
        self.last_check_in_date = Some(check_in_date);
    }

    /// Stored streak, or 0 when the last check-in is older than yesterday
    pub fn current_as_of(&self, today: NaiveDate) -> u32 {
        match (self.last_check_in_date, today.checked_sub_days(Days::new(1))) {
            (Some(last), Some(yesterday)) if last < yesterday => 0,
            _ => self.current_streak,
        }
    }
}

/// Compute the streak after appending today's check-in.
///
/// `prior` is the history before the append; its order does not matter.
pub fn next_streak(prior: &[CheckIn], previous_streak: u32, today: NaiveDate) -> u32 {
    let Some(most_recent) = prior.iter().map(|c| c.date).max() else {
        return 1;
    };

    if most_recent == today {
        return previous_streak + 1;
    }

    if Some(most_recent) == today.checked_sub_days(Days::new(1)) {
        return previous_streak;
    }

    0
}
