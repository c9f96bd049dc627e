use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Info,
    Warning,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
    pub action_required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub action_required: bool,
    #[serde(default)]
    pub related_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFilter {
    All,
    Unread,
    /// Unread and flagged as needing action.
    Action,
}

impl FeedFilter {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "all" => Some(Self::All),
            "unread" => Some(Self::Unread),
            "action" => Some(Self::Action),
            _ => None,
        }
    }

    fn keeps(self, n: &Notification) -> bool {
        match self {
            Self::All => true,
            Self::Unread => !n.is_read,
            Self::Action => !n.is_read && n.action_required,
        }
    }
}

/// Newest-first list of user alerts. Nothing expires on its own.
#[derive(Debug, Default)]
pub struct NotificationFeed {
    items: Vec<Notification>,
}

impl NotificationFeed {
    pub fn push(&mut self, n: NewNotification) -> String {
        let id = Uuid::new_v4().to_string();
        self.items.insert(
            0,
            Notification {
                id: id.clone(),
                kind: n.kind,
                title: n.title,
                message: n.message,
                timestamp: Utc::now(),
                is_read: false,
                action_required: n.action_required,
                related_id: n.related_id,
            },
        );
        id
    }

    pub fn list(&self, filter: FeedFilter) -> Vec<&Notification> {
        self.items.iter().filter(|n| filter.keeps(n)).collect()
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.is_read).count()
    }

    /// Returns false if no notification has this id.
    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                n.is_read = true;
                true
            }
            None => false,
        }
    }

    pub fn mark_all_read(&mut self) -> usize {
        let mut changed = 0;
        for n in self.items.iter_mut().filter(|n| !n.is_read) {
            n.is_read = true;
            changed += 1;
        }
        changed
    }

    /// Hard delete. Returns false if no notification has this id.
    pub fn dismiss(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }
}
