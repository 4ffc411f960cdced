//! Buddy directory and messaging
//!
//! Everything here is local and simulated: buddies, the alerts sent to them
//! and per-buddy message logs are plain in-memory lists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sender id used for messages written by the local user
pub const USER_SENDER_ID: &str = "user";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuddyStatus {
    Online,
    #[default]
    Offline,
    Busy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Buddy {
    pub id: Uuid,
    pub name: String,
    pub phone_number: String,
    pub status: BuddyStatus,
    pub last_active: DateTime<Utc>,
    pub is_primary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Validated input of the "add buddy" form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBuddy {
    name: String,
    phone_number: String,
}

impl NewBuddy {
    /// Trims both fields; `None` when either is blank
    pub fn new(name: &str, phone_number: &str) -> Option<Self> {
        let name = name.trim();
        let phone_number = phone_number.trim();
        if name.is_empty() || phone_number.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            phone_number: phone_number.to_string(),
        })
    }

    pub fn into_buddy(self, now: DateTime<Utc>) -> Buddy {
        Buddy {
            id: Uuid::new_v4(),
            name: self.name,
            phone_number: self.phone_number,
            status: BuddyStatus::Offline,
            last_active: now,
            is_primary: false,
            avatar_url: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertResponse {
    Accepted,
    Declined,
}

/// A request asking a buddy to check in with the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuddyAlert {
    pub id: Uuid,
    pub buddy_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub is_read: bool,
    pub responded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<AlertResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuddyMessage {
    pub id: Uuid,
    pub buddy_id: Uuid,
    pub sender_id: String,
    pub timestamp: DateTime<Utc>,
    pub text: String,
    pub is_read: bool,
}

/// The selected buddy and its message log, in append order
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation<'a> {
    pub buddy: &'a Buddy,
    pub messages: Vec<&'a BuddyMessage>,
}

/// Mutations accepted by [`BuddyState::reduce`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum BuddyAction {
    AddBuddy(Buddy),
    RemoveBuddy(Uuid),
    UpdateBuddyStatus { id: Uuid, status: BuddyStatus },
    SetCurrentStatus(BuddyStatus),
    AddAlert { buddy_id: Uuid, message: String },
    MarkAlertAsRead(Uuid),
    RespondToAlert { id: Uuid, response: AlertResponse },
    AddMessage { buddy_id: Uuid, sender_id: String, text: String },
    MarkMessageAsRead(Uuid),
    AddPendingInvite(Uuid),
    RemovePendingInvite(Uuid),
    SetSelectedBuddy(Option<Uuid>),
    Clear,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuddyState {
    pub buddies: Vec<Buddy>,
    pub pending_invites: Vec<Uuid>,
    pub alerts: Vec<BuddyAlert>,
    pub messages: Vec<BuddyMessage>,
    /// Mirrors `current_status != Offline`
    pub is_online: bool,
    pub current_status: BuddyStatus,
    pub selected_buddy_id: Option<Uuid>,
}

impl BuddyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reduce(&mut self, action: BuddyAction, now: DateTime<Utc>) {
        match action {
            BuddyAction::AddBuddy(buddy) => self.add_buddy(buddy),
            BuddyAction::RemoveBuddy(id) => self.remove_buddy(id),
            BuddyAction::UpdateBuddyStatus { id, status } => self.update_buddy_status(id, status, now),
            BuddyAction::SetCurrentStatus(status) => self.set_current_status(status),
            BuddyAction::AddAlert { buddy_id, message } => {
                self.add_alert(buddy_id, message, now);
            }
            BuddyAction::MarkAlertAsRead(id) => self.mark_alert_as_read(id),
            BuddyAction::RespondToAlert { id, response } => self.respond_to_alert(id, response),
            BuddyAction::AddMessage { buddy_id, sender_id, text } => {
                self.add_message(buddy_id, sender_id, text, now);
            }
            BuddyAction::MarkMessageAsRead(id) => self.mark_message_as_read(id),
            BuddyAction::AddPendingInvite(id) => self.add_pending_invite(id),
            BuddyAction::RemovePendingInvite(id) => self.remove_pending_invite(id),
            BuddyAction::SetSelectedBuddy(id) => self.selected_buddy_id = id,
            BuddyAction::Clear => *self = Self::default(),
        }
    }

    /// Insert or replace by id; an accepted buddy is no longer a pending invite
    pub fn add_buddy(&mut self, buddy: Buddy) {
        self.remove_pending_invite(buddy.id);
        match self.buddies.iter_mut().find(|b| b.id == buddy.id) {
            Some(existing) => *existing = buddy,
            None => self.buddies.push(buddy),
        }
    }

    /// Add a buddy from the form; `None` when the form was rejected
    pub fn add_from_form(&mut self, name: &str, phone_number: &str, now: DateTime<Utc>) -> Option<Uuid> {
        let buddy = NewBuddy::new(name, phone_number)?.into_buddy(now);
        let id = buddy.id;
        self.add_buddy(buddy);
        Some(id)
    }

    pub fn remove_buddy(&mut self, id: Uuid) {
        self.buddies.retain(|b| b.id != id);
    }

    pub fn update_buddy_status(&mut self, id: Uuid, status: BuddyStatus, now: DateTime<Utc>) {
        if let Some(buddy) = self.buddies.iter_mut().find(|b| b.id == id) {
            buddy.status = status;
            buddy.last_active = now;
        }
    }

    pub fn set_current_status(&mut self, status: BuddyStatus) {
        self.current_status = status;
        self.is_online = status != BuddyStatus::Offline;
    }

    pub fn add_alert(&mut self, buddy_id: Uuid, message: impl Into<String>, now: DateTime<Utc>) -> Uuid {
        let id = Uuid::new_v4();
        self.alerts.push(BuddyAlert {
            id,
            buddy_id,
            timestamp: now,
            message: message.into(),
            is_read: false,
            responded: false,
            response: None,
        });
        id
    }

    pub fn mark_alert_as_read(&mut self, id: Uuid) {
        if let Some(alert) = self.alerts.iter_mut().find(|a| a.id == id) {
            alert.is_read = true;
        }
    }

    pub fn respond_to_alert(&mut self, id: Uuid, response: AlertResponse) {
        if let Some(alert) = self.alerts.iter_mut().find(|a| a.id == id) {
            alert.responded = true;
            alert.response = Some(response);
        }
    }

    pub fn add_message(
        &mut self,
        buddy_id: Uuid,
        sender_id: impl Into<String>,
        text: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.messages.push(BuddyMessage {
            id,
            buddy_id,
            sender_id: sender_id.into(),
            timestamp: now,
            text: text.into(),
            is_read: false,
        });
        id
    }

    pub fn mark_message_as_read(&mut self, id: Uuid) {
        if let Some(message) = self.messages.iter_mut().find(|m| m.id == id) {
            message.is_read = true;
        }
    }

    pub fn add_pending_invite(&mut self, id: Uuid) {
        if !self.pending_invites.contains(&id) {
            self.pending_invites.push(id);
        }
    }

    pub fn remove_pending_invite(&mut self, id: Uuid) {
        self.pending_invites.retain(|invite| *invite != id);
    }

    pub fn select(&mut self, id: Option<Uuid>) {
        self.selected_buddy_id = id;
    }

    pub fn buddy(&self, id: Uuid) -> Option<&Buddy> {
        self.buddies.iter().find(|b| b.id == id)
    }

    pub fn selected_buddy(&self) -> Option<&Buddy> {
        self.selected_buddy_id.and_then(|id| self.buddy(id))
    }

    /// "Check on them": raise an alert for the buddy and select it.
    ///
    /// Returns the alert id, or `None` for an unknown buddy.
    pub fn check_on(&mut self, buddy_id: Uuid, message: impl Into<String>, now: DateTime<Utc>) -> Option<Uuid> {
        self.buddy(buddy_id)?;
        let alert_id = self.add_alert(buddy_id, message, now);
        self.select(Some(buddy_id));
        Some(alert_id)
    }

    pub fn messages_for(&self, buddy_id: Uuid) -> Vec<&BuddyMessage> {
        self.messages.iter().filter(|m| m.buddy_id == buddy_id).collect()
    }

    /// `None` when nothing (or a removed buddy) is selected; the UI shows a placeholder
    pub fn conversation(&self) -> Option<Conversation<'_>> {
        let buddy = self.selected_buddy()?;
        Some(Conversation {
            buddy,
            messages: self.messages_for(buddy.id),
        })
    }

    /// Send trimmed text to the selected buddy; blank text or no selection is a no-op
    pub fn send_to_selected(&mut self, sender_id: &str, text: &str, now: DateTime<Utc>) -> Option<Uuid> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let buddy_id = self.selected_buddy()?.id;
        Some(self.add_message(buddy_id, sender_id, text, now))
    }

    pub fn unread_alerts(&self) -> usize {
        self.alerts.iter().filter(|a| !a.is_read).count()
    }
}
