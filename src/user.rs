//! User profile and preferences

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    He,
    En,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub is_authenticated: bool,
    pub is_onboarded: bool,
    /// `None` follows the system appearance
    #[serde(default)]
    pub prefers_dark_mode: Option<bool>,
    #[serde(default)]
    pub language: Language,
}

/// Partial update; unset fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilePatch {
    pub id: Option<String>,
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub unit: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum UserAction {
    SetUser(UserProfile),
    UpdateUser(ProfilePatch),
    ClearUser,
    SetAuthenticated(bool),
    SetOnboarded(bool),
    SetDarkMode(Option<bool>),
    SetLanguage(Language),
}

impl UserProfile {
    pub fn reduce(&mut self, action: UserAction) {
        match action {
            UserAction::SetUser(profile) => *self = profile,
            UserAction::UpdateUser(patch) => self.apply(patch),
            UserAction::ClearUser => *self = Self::default(),
            UserAction::SetAuthenticated(value) => self.is_authenticated = value,
            UserAction::SetOnboarded(value) => self.is_onboarded = value,
            UserAction::SetDarkMode(value) => self.prefers_dark_mode = value,
            UserAction::SetLanguage(language) => self.language = language,
        }
    }

    pub fn apply(&mut self, patch: ProfilePatch) {
        if let Some(id) = patch.id {
            self.id = id;
        }
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(phone) = patch.phone_number {
            self.phone_number = phone;
        }
        if patch.unit.is_some() {
            self.unit = patch.unit;
        }
        if patch.email.is_some() {
            self.email = patch.email;
        }
    }
}
