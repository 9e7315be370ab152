use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// what a tracked view points at
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewKind {
    Post,
    Promotion,
}

/// Short-lived visitor identity plus everything already counted in it.
///
/// Persisted as a JSON blob with camelCase keys and epoch-millisecond
/// timestamps. The viewed lists keep insertion order so the oldest entries can
/// be dropped first when storage runs out of room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorSession {
    pub id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub viewed_posts: Vec<String>,
    #[serde(default)]
    pub viewed_promotions: Vec<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_activity: DateTime<Utc>,
}

impl VisitorSession {
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            viewed_posts: Vec::new(),
            viewed_promotions: Vec::new(),
            last_activity: now,
        }
    }

    // valid only while the idle time stays strictly below the threshold
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>, inactivity: TimeDelta) -> bool {
        now - self.last_activity >= inactivity
    }

    #[must_use]
    pub fn has_viewed(&self, kind: ViewKind, entity_id: &str) -> bool {
        self.viewed(kind).iter().any(|id| id == entity_id)
    }

    /// Returns `true` when the entity had not been seen yet in this session.
    pub fn record_view(&mut self, kind: ViewKind, entity_id: &str, now: DateTime<Utc>) -> bool {
        if self.has_viewed(kind, entity_id) {
            return false;
        }
        self.viewed_mut(kind).push(entity_id.to_string());
        self.last_activity = now;
        true
    }

    /// Forgets the oldest entry of the longer viewed list. The newest entry of
    /// a list is never dropped, so `None` means there is nothing left to give up.
    pub fn evict_oldest_view(&mut self) -> Option<(ViewKind, String)> {
        let kind = if self.viewed_posts.len() >= self.viewed_promotions.len() {
            ViewKind::Post
        } else {
            ViewKind::Promotion
        };

        let viewed = self.viewed_mut(kind);
        if viewed.len() < 2 {
            return None;
        }
        Some((kind, viewed.remove(0)))
    }

    fn viewed(&self, kind: ViewKind) -> &[String] {
        match kind {
            ViewKind::Post => &self.viewed_posts,
            ViewKind::Promotion => &self.viewed_promotions,
        }
    }

    fn viewed_mut(&mut self, kind: ViewKind) -> &mut Vec<String> {
        match kind {
            ViewKind::Post => &mut self.viewed_posts,
            ViewKind::Promotion => &mut self.viewed_promotions,
        }
    }
}
