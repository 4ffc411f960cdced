//! Simulated peer-support training scenarios
//!
//! A fixed catalog of practice scenarios. Completing one records it in the
//! badge store and awards its XP; repeat completions earn XP again.

use crate::badges::BadgeState;
use crate::error::KesherError;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Scenario {
    pub id: u32,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub difficulty: Difficulty,
    pub xp_reward: u32,
    /// Expected duration range in minutes
    pub duration_minutes: (u32, u32),
}

pub const SCENARIOS: [Scenario; 3] = [
    Scenario {
        id: 1,
        title: "The quiet friend",
        description: "Responding to a friend who has gone quiet and withdrawn after coming home",
        icon: "person",
        difficulty: Difficulty::Easy,
        xp_reward: 50,
        duration_minutes: (5, 7),
    },
    Scenario {
        id: 2,
        title: "The outburst",
        description: "A friend erupts in anger; practise calming the situation",
        icon: "flame",
        difficulty: Difficulty::Medium,
        xp_reward: 75,
        duration_minutes: (8, 10),
    },
    Scenario {
        id: 3,
        title: "The blank stare",
        description: "Spotting warning signs in a friend who stares at a screen without responding",
        icon: "eye",
        difficulty: Difficulty::Hard,
        xp_reward: 100,
        duration_minutes: (10, 12),
    },
];

pub fn scenario(id: u32) -> Option<&'static Scenario> {
    SCENARIOS.iter().find(|s| s.id == id)
}

/// Catalog entry together with the user's completion state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScenarioProgress {
    pub scenario: &'static Scenario,
    pub completed: bool,
}

pub fn catalog(badges: &BadgeState) -> Vec<ScenarioProgress> {
    SCENARIOS
        .iter()
        .map(|scenario| ScenarioProgress {
            scenario,
            completed: badges.has_completed(scenario.id),
        })
        .collect()
}

/// Mark a scenario completed and award its XP. Returns the XP awarded.
pub fn complete_scenario(badges: &mut BadgeState, id: u32) -> Result<u32, KesherError> {
    let scenario = scenario(id).ok_or(KesherError::UnknownScenario(id))?;
    badges.add_completed_simulation(scenario.id);
    badges.add_xp(scenario.xp_reward);
    info!(scenario = scenario.id, xp = scenario.xp_reward, level = badges.level, "training scenario completed");
    Ok(scenario.xp_reward)
}
