//! Port to the hosted backend that owns promotions and analytics aggregates.

mod rest;

pub use rest::RestRemoteStore;

use crate::analytics::{PostAnalytics, PromotionAnalytics};
use crate::errors::RemoteError;
use crate::promotions::Promotion;

#[trait_variant::make(RemoteStore: Send)]
pub trait LocalRemoteStore {
    /// Promotions flagged active, in the order the backend returns them
    async fn fetch_active_promotions(&self) -> Result<Vec<Promotion>, RemoteError>;

    async fn fetch_post_analytics(&self, post_id: &str) -> Result<Option<PostAnalytics>, RemoteError>;

    /// Create-if-absent, otherwise overwrite
    async fn upsert_post_analytics(&self, analytics: &PostAnalytics) -> Result<(), RemoteError>;

    async fn fetch_promotion_analytics(&self, promotion_id: &str) -> Result<Option<PromotionAnalytics>, RemoteError>;

    /// Create-if-absent, otherwise overwrite
    async fn upsert_promotion_analytics(&self, analytics: &PromotionAnalytics) -> Result<(), RemoteError>;

    async fn list_post_analytics(&self) -> Result<Vec<PostAnalytics>, RemoteError>;

    async fn list_promotion_analytics(&self) -> Result<Vec<PromotionAnalytics>, RemoteError>;
}
