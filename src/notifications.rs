use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    Like,
    Follow,
    Mention,
    System,
}

/// Who triggered a notification
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Actor {
    pub name: String,
    pub avatar: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub user: Option<Actor>,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
}

#[derive(Default)]
pub struct Notifications {
    items: Vec<Notification>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    /// Newest first, unread
    pub fn push(&mut self, kind: NotificationKind, user: Option<Actor>, content: &str) -> &Notification {
        self.items.insert(
            0,
            Notification {
                id: Uuid::new_v4().to_string(),
                kind,
                user,
                content: content.to_string(),
                timestamp: Utc::now(),
                is_read: false,
            },
        );
        &self.items[0]
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.is_read).count()
    }

    /// Returns false for an unknown id
    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                n.is_read = true;
                true
            }
            None => false,
        }
    }

    pub fn mark_all_read(&mut self) {
        self.items.iter_mut().for_each(|n| n.is_read = true);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unread_tracking() {
        let mut notifications = Notifications::new();
        let actor = Actor {
            name: "Elena Rossi".to_string(),
            avatar: "https://picsum.photos/seed/a2/50/50".to_string(),
        };
        let follow_id = notifications
            .push(NotificationKind::Follow, Some(actor), "started following you.")
            .id
            .clone();
        notifications.push(NotificationKind::System, None, "Welcome!");

        assert_eq!(notifications.unread_count(), 2);
        assert_eq!(notifications.iter().next().unwrap().kind, NotificationKind::System);

        assert!(notifications.mark_read(&follow_id));
        assert!(!notifications.mark_read("missing"));
        assert_eq!(notifications.unread_count(), 1);

        notifications.mark_all_read();
        assert_eq!(notifications.unread_count(), 0);
    }

    #[test]
    fn test_kind_serializes_as_upper_case_type() {
        let mut notifications = Notifications::new();
        let n = notifications.push(NotificationKind::Like, None, "liked your post.");
        let json = serde_json::to_value(n).unwrap();
        assert_eq!(json["type"], "LIKE");
        assert_eq!(json["isRead"], false);
    }
}
