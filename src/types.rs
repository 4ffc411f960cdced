//! Core health types for Kesher
//!
//! This module defines the records that feed the check-in tracker and the risk
//! scorer: mood check-ins, sleep samples, step samples and the derived risk level.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Self-reported mood, ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Great,
    Good,
    Okay,
    #[serde(alias = "notGood")]
    NotGood,
    Bad,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Great => "great",
            Mood::Good => "good",
            Mood::Okay => "okay",
            Mood::NotGood => "not_good",
            Mood::Bad => "bad",
        }
    }

    /// Moods that count toward a negative streak
    pub fn is_negative(&self) -> bool {
        matches!(self, Mood::NotGood | Mood::Bad)
    }
}

impl std::str::FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "great" => Ok(Mood::Great),
            "good" => Ok(Mood::Good),
            "okay" => Ok(Mood::Okay),
            "not_good" | "notGood" => Ok(Mood::NotGood),
            "bad" => Ok(Mood::Bad),
            other => Err(format!("unknown mood '{other}'")),
        }
    }
}

/// A submitted daily mood report. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckIn {
    /// Calendar day the check-in belongs to (not unique)
    pub date: NaiveDate,
    /// When the check-in was recorded
    pub timestamp: DateTime<Utc>,
    /// Reported mood
    pub mood: Mood,
    /// Optional free-text note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Check-in as submitted by the user, before it is timestamped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckInDraft {
    pub date: NaiveDate,
    pub mood: Mood,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl CheckInDraft {
    pub fn new(date: NaiveDate, mood: Mood) -> Self {
        Self {
            date,
            mood,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Stamp the draft with its creation instant
    pub fn into_check_in(self, timestamp: DateTime<Utc>) -> CheckIn {
        CheckIn {
            date: self.date,
            timestamp,
            mood: self.mood,
            note: self.note,
        }
    }
}

/// Subjective sleep quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepQuality {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl std::str::FromStr for SleepQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "poor" => Ok(SleepQuality::Poor),
            "fair" => Ok(SleepQuality::Fair),
            "good" => Ok(SleepQuality::Good),
            "excellent" => Ok(SleepQuality::Excellent),
            other => Err(format!("unknown sleep quality '{other}'")),
        }
    }
}

/// Hours below which a night counts as poor sleep
pub const POOR_SLEEP_HOURS: f64 = 4.0;

/// One night of sleep, keyed by date (last write wins)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepSample {
    /// Date this sample represents
    pub date: NaiveDate,
    /// Total hours slept (non-negative)
    pub hours_slept: f64,
    /// Subjective quality, if reported
    #[serde(default)]
    pub quality: Option<SleepQuality>,
    /// Deep sleep duration (minutes)
    #[serde(default)]
    pub deep_sleep_minutes: u32,
    /// REM sleep duration (minutes)
    #[serde(default)]
    pub rem_sleep_minutes: u32,
    /// Light sleep duration (minutes)
    #[serde(default)]
    pub light_sleep_minutes: u32,
    /// Number of wake periods during the night
    #[serde(default)]
    pub wake_periods: u32,
}

impl SleepSample {
    /// Create a sample with only duration and quality filled in
    pub fn new(date: NaiveDate, hours_slept: f64, quality: Option<SleepQuality>) -> Self {
        Self {
            date,
            hours_slept: hours_slept.max(0.0),
            quality,
            deep_sleep_minutes: 0,
            rem_sleep_minutes: 0,
            light_sleep_minutes: 0,
            wake_periods: 0,
        }
    }

    /// Short night or self-reported poor quality
    pub fn is_poor(&self) -> bool {
        self.hours_slept < POOR_SLEEP_HOURS || self.quality == Some(SleepQuality::Poor)
    }
}

/// Daily step count against a goal (last write wins by date)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepsSample {
    pub date: NaiveDate,
    pub count: u32,
    pub goal: u32,
}

/// Four-level risk classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    Elevated,
    High,
}

impl RiskLevel {
    /// Map accumulated risk points to a level
    pub fn from_points(points: u32) -> Self {
        match points {
            0 => RiskLevel::Low,
            1 => RiskLevel::Moderate,
            2 => RiskLevel::Elevated,
            _ => RiskLevel::High,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::Elevated => "elevated",
            RiskLevel::High => "high",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a `YYYY-MM-DD` calendar date
pub fn parse_date(value: &str) -> Result<NaiveDate, crate::error::KesherError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| crate::error::KesherError::DateParseError(format!("{value}: {e}")))
}
