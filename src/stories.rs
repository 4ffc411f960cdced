//! Moral-injury story drafts
//!
//! Stories are composed in a [`StoryDraft`] and handed off on submission;
//! the core does not keep submitted stories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryCategory {
    Friends,
    Family,
    OperationalActivity,
    CommandersDecisions,
    Morality,
    Civilians,
}

impl StoryCategory {
    pub const ALL: [StoryCategory; 6] = [
        StoryCategory::Friends,
        StoryCategory::Family,
        StoryCategory::OperationalActivity,
        StoryCategory::CommandersDecisions,
        StoryCategory::Morality,
        StoryCategory::Civilians,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryDraft {
    pub text: String,
    pub anonymous: bool,
    pub categories: Vec<StoryCategory>,
}

impl Default for StoryDraft {
    fn default() -> Self {
        Self {
            text: String::new(),
            anonymous: true,
            categories: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: Uuid,
    pub text: String,
    pub anonymous: bool,
    pub categories: Vec<StoryCategory>,
    pub submitted_at: DateTime<Utc>,
}

impl StoryDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the category if absent, remove it otherwise
    pub fn toggle_category(&mut self, category: StoryCategory) {
        match self.categories.iter().position(|&c| c == category) {
            Some(index) => {
                self.categories.remove(index);
            }
            None => self.categories.push(category),
        }
    }

    /// Returns `None` (and keeps the draft) when the text is blank.
    pub fn submit(&mut self, now: DateTime<Utc>) -> Option<Story> {
        let text = self.text.trim();
        if text.is_empty() {
            return None;
        }

        let story = Story {
            id: Uuid::new_v4(),
            text: text.to_string(),
            anonymous: self.anonymous,
            categories: self.categories.clone(),
            submitted_at: now,
        };
        *self = Self::default();

        info!(
            anonymous = story.anonymous,
            categories = story.categories.len(),
            "story submitted"
        );
        Some(story)
    }
}
