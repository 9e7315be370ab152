use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// engagement events / views, as a percentage
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn percentage_of_views(events: u64, views: u64) -> f64 {
    if views == 0 {
        return 0.0;
    }
    events as f64 / views as f64 * 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostEvent {
    View,
    Like,
    Share,
    Comment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromotionEvent {
    View,
    Click,
    Close,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostAnalytics {
    pub post_id: String,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub unique_views: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub shares: u64,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub engagement_rate: f64,
    pub updated_at: DateTime<Utc>,
}

impl PostAnalytics {
    #[must_use]
    pub fn empty(post_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            post_id: post_id.to_string(),
            views: 0,
            unique_views: 0,
            likes: 0,
            shares: 0,
            comments: 0,
            engagement_rate: 0.0,
            updated_at: now,
        }
    }

    // a view only reaches here once the session tracker said it was new,
    // so it counts towards both totals
    pub fn apply(&mut self, event: PostEvent, now: DateTime<Utc>) {
        match event {
            PostEvent::View => {
                self.views += 1;
                self.unique_views += 1;
            }
            PostEvent::Like => self.likes += 1,
            PostEvent::Share => self.shares += 1,
            PostEvent::Comment => self.comments += 1,
        }
        self.engagement_rate = percentage_of_views(self.likes + self.shares + self.comments, self.views);
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromotionAnalytics {
    pub promotion_id: String,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub unique_views: u64,
    #[serde(default)]
    pub clicks: u64,
    #[serde(default)]
    pub closes: u64,
    #[serde(default)]
    pub click_through_rate: f64,
    pub updated_at: DateTime<Utc>,
}

impl PromotionAnalytics {
    #[must_use]
    pub fn empty(promotion_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            promotion_id: promotion_id.to_string(),
            views: 0,
            unique_views: 0,
            clicks: 0,
            closes: 0,
            click_through_rate: 0.0,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, event: PromotionEvent, now: DateTime<Utc>) {
        match event {
            PromotionEvent::View => {
                self.views += 1;
                self.unique_views += 1;
            }
            PromotionEvent::Click => self.clicks += 1,
            PromotionEvent::Close => self.closes += 1,
        }
        self.click_through_rate = percentage_of_views(self.clicks, self.views);
        self.updated_at = now;
    }
}
