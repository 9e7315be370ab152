use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::{PostAnalytics, PostEvent, PromotionAnalytics, PromotionEvent};
use crate::bounded::{fire_and_forget, run_bounded};
use crate::errors::RemoteError;
use crate::remote::RemoteStore;

// one async lock per aggregate: read-modify-upsert cycles for the same entity
// run one after another instead of overwriting each other
#[derive(Default)]
struct EntityLocks(Mutex<HashMap<String, Arc<AsyncMutex<()>>>>);

impl EntityLocks {
    async fn acquire(&self, entity_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.0.lock().unwrap_or_else(PoisonError::into_inner);
            // nobody holds or waits on these any more
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(entity_id.to_string()).or_default())
        };
        lock.lock_owned().await
    }
}

/// Keeps the remote engagement aggregates up to date.
///
/// Updates for one post or promotion are serialized within this process. Other
/// processes writing the same rows can still interleave with it.
pub struct AnalyticsRecorder<R> {
    remote: Arc<R>,
    post_locks: EntityLocks,
    promotion_locks: EntityLocks,
}

impl<R> AnalyticsRecorder<R>
where
    R: RemoteStore + Sync + 'static,
{
    pub fn new(remote: Arc<R>) -> Self {
        Self {
            remote,
            post_locks: EntityLocks::default(),
            promotion_locks: EntityLocks::default(),
        }
    }

    // read-modify-write against the remote aggregate, creating it on first use
    #[allow(clippy::missing_errors_doc)]
    #[tracing::instrument(name = "Record post event", skip(self))]
    pub async fn record_post_event(&self, post_id: &str, event: PostEvent) -> Result<PostAnalytics, RemoteError> {
        let _guard = self.post_locks.acquire(post_id).await;

        let now = Utc::now();
        let mut analytics = self
            .remote
            .fetch_post_analytics(post_id)
            .await?
            .unwrap_or_else(|| PostAnalytics::empty(post_id, now));

        analytics.apply(event, now);
        self.remote.upsert_post_analytics(&analytics).await?;

        tracing::info!(views = analytics.views, engagement_rate = analytics.engagement_rate, "Post analytics updated");
        Ok(analytics)
    }

    #[allow(clippy::missing_errors_doc)]
    #[tracing::instrument(name = "Record promotion event", skip(self))]
    pub async fn record_promotion_event(
        &self,
        promotion_id: &str,
        event: PromotionEvent,
    ) -> Result<PromotionAnalytics, RemoteError> {
        let _guard = self.promotion_locks.acquire(promotion_id).await;

        let now = Utc::now();
        let mut analytics = self
            .remote
            .fetch_promotion_analytics(promotion_id)
            .await?
            .unwrap_or_else(|| PromotionAnalytics::empty(promotion_id, now));

        analytics.apply(event, now);
        self.remote.upsert_promotion_analytics(&analytics).await?;

        tracing::info!(
            views = analytics.views,
            click_through_rate = analytics.click_through_rate,
            "Promotion analytics updated"
        );
        Ok(analytics)
    }

    // background versions: bounded, never awaited by the caller
    pub fn track_post_event(self: &Arc<Self>, post_id: String, event: PostEvent, limit: Duration) {
        let recorder = Arc::clone(self);
        fire_and_forget("Post analytics update", limit, async move {
            recorder.record_post_event(&post_id, event).await
        });
    }

    pub fn track_promotion_event(self: &Arc<Self>, promotion_id: String, event: PromotionEvent, limit: Duration) {
        let recorder = Arc::clone(self);
        fire_and_forget("Promotion analytics update", limit, async move {
            recorder.record_promotion_event(&promotion_id, event).await
        });
    }

    // an unreachable backend shows up as an empty dashboard rather than an error
    pub async fn list_post_analytics(&self, limit: Duration) -> Vec<PostAnalytics> {
        let remote = Arc::clone(&self.remote);
        run_bounded("List post analytics", limit, async move { remote.list_post_analytics().await })
            .await
            .unwrap_or_default()
    }

    pub async fn list_promotion_analytics(&self, limit: Duration) -> Vec<PromotionAnalytics> {
        let remote = Arc::clone(&self.remote);
        run_bounded("List promotion analytics", limit, async move {
            remote.list_promotion_analytics().await
        })
        .await
        .unwrap_or_default()
    }
}
