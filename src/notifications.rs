//! Notification store
//!
//! Flat list of in-app notifications with read tracking. `has_unread` is
//! recomputed from the entries after every mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    CheckIn,
    BuddySupport,
    SleepAlert,
    SystemMessage,
    Achievement,
}

/// A stored notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
    /// Arbitrary payload for the host (e.g. a buddy id to open)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_performed: Option<bool>,
    /// Instant after which the notification is dropped by `clear_expired`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

/// Notification as raised by the host, before id/timestamp/read are assigned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNotification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl NewNotification {
    pub fn new(kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            data: None,
            expiry: None,
        }
    }

    pub fn expires_at(mut self, expiry: DateTime<Utc>) -> Self {
        self.expiry = Some(expiry);
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Mutations accepted by [`NotificationState::reduce`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum NotificationAction {
    Add(NewNotification),
    MarkAsRead(Uuid),
    MarkAllAsRead,
    Remove(Uuid),
    ClearExpired,
    SetActionPerformed { id: Uuid, performed: bool },
    SetPermissionGranted(bool),
    SetPushToken(Option<String>),
    ClearAll,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationState {
    pub notifications: Vec<Notification>,
    pub has_unread: bool,
    pub permission_granted: bool,
    #[serde(default)]
    pub push_token: Option<String>,
}

impl NotificationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reduce(&mut self, action: NotificationAction, now: DateTime<Utc>) {
        match action {
            NotificationAction::Add(new) => {
                self.add(new, now);
            }
            NotificationAction::MarkAsRead(id) => self.mark_as_read(id),
            NotificationAction::MarkAllAsRead => self.mark_all_as_read(),
            NotificationAction::Remove(id) => self.remove(id),
            NotificationAction::ClearExpired => self.clear_expired(now),
            NotificationAction::SetActionPerformed { id, performed } => {
                self.set_action_performed(id, performed)
            }
            NotificationAction::SetPermissionGranted(granted) => self.permission_granted = granted,
            NotificationAction::SetPushToken(token) => self.push_token = token,
            NotificationAction::ClearAll => self.clear_all(),
        }
    }

    /// Append an unread notification and return its id
    pub fn add(&mut self, new: NewNotification, now: DateTime<Utc>) -> Uuid {
        let id = Uuid::new_v4();
        self.notifications.push(Notification {
            id,
            kind: new.kind,
            title: new.title,
            message: new.message,
            timestamp: now,
            read: false,
            data: new.data,
            action_performed: None,
            expiry: new.expiry,
        });
        self.refresh_unread();
        id
    }

    /// Unknown ids are ignored
    pub fn mark_as_read(&mut self, id: Uuid) {
        if let Some(n) = self.find_mut(id) {
            n.read = true;
        }
        self.refresh_unread();
    }

    pub fn mark_all_as_read(&mut self) {
        for n in &mut self.notifications {
            n.read = true;
        }
        self.refresh_unread();
    }

    pub fn remove(&mut self, id: Uuid) {
        self.notifications.retain(|n| n.id != id);
        self.refresh_unread();
    }

    /// Drop every notification whose expiry is at or before `now`
    pub fn clear_expired(&mut self, now: DateTime<Utc>) {
        self.notifications
            .retain(|n| n.expiry.map_or(true, |expiry| expiry > now));
        self.refresh_unread();
    }

    pub fn set_action_performed(&mut self, id: Uuid, performed: bool) {
        if let Some(n) = self.find_mut(id) {
            n.action_performed = Some(performed);
        }
    }

    pub fn clear_all(&mut self) {
        self.notifications.clear();
        self.refresh_unread();
    }

    pub fn get(&self, id: Uuid) -> Option<&Notification> {
        self.notifications.iter().find(|n| n.id == id)
    }

    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }

    fn find_mut(&mut self, id: Uuid) -> Option<&mut Notification> {
        self.notifications.iter_mut().find(|n| n.id == id)
    }

    /// Recompute `has_unread` from the entries
    pub fn refresh_unread(&mut self) {
        self.has_unread = self.notifications.iter().any(|n| !n.read);
    }
}
