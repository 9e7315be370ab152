use reqwest::{Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use super::RemoteStore;
use crate::analytics::{PostAnalytics, PromotionAnalytics};
use crate::configuration::RemoteSettings;
use crate::errors::RemoteError;
use crate::promotions::Promotion;

const PROMOTIONS_TABLE: &str = "promotions";
const POST_ANALYTICS_TABLE: &str = "post_analytics";
const PROMOTION_ANALYTICS_TABLE: &str = "promotion_analytics";

// PostgREST-style client for the hosted backend
// identifiers are validated before they get here (see `EntityId`), so they go into filters as-is
#[derive(Clone)]
pub struct RestRemoteStore {
    http_client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl RestRemoteStore {
    #[allow(clippy::missing_errors_doc)]
    pub fn new(settings: &RemoteSettings) -> Result<Self, RemoteError> {
        let http_client = reqwest::Client::builder()
            .timeout(settings.fetch_timeout())
            .build()?;

        Ok(Self {
            http_client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        })
    }

    fn request(&self, method: Method, table: &str, filters: &str) -> RequestBuilder {
        let url = if filters.is_empty() {
            format!("{}/rest/v1/{table}", self.base_url)
        } else {
            format!("{}/rest/v1/{table}?{filters}", self.base_url)
        };

        self.http_client
            .request(method, url)
            .header("apikey", self.api_key.expose_secret())
            .bearer_auth(self.api_key.expose_secret())
    }

    async fn fetch_rows<T: DeserializeOwned>(&self, table: &str, filters: &str) -> Result<Vec<T>, RemoteError> {
        let response = self.request(Method::GET, table, filters).send().await?;
        decode(response).await
    }

    async fn upsert_row<T: serde::Serialize + Sync>(
        &self,
        table: &str,
        conflict_column: &str,
        row: &T,
    ) -> Result<(), RemoteError> {
        self.request(Method::POST, table, &format!("on_conflict={conflict_column}"))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(row)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<Vec<T>, RemoteError> {
    let body = response.error_for_status()?.text().await?;
    serde_json::from_str(&body).map_err(|e| RemoteError::MalformedPayload(e.into()))
}

// rows are edited by hand in the admin, one bad row must not hide the others
fn decode_each<T: DeserializeOwned>(table: &str, rows: Vec<serde_json::Value>) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.get("id").map(ToString::to_string).unwrap_or_default();
            serde_json::from_value(row)
                .map_err(|e| {
                    tracing::warn!(error.message = %e, table, row_id = %id, "Skipping malformed row");
                })
                .ok()
        })
        .collect()
}

impl RemoteStore for RestRemoteStore {
    #[tracing::instrument(name = "Fetch active promotions", skip(self))]
    async fn fetch_active_promotions(&self) -> Result<Vec<Promotion>, RemoteError> {
        let rows = self
            .fetch_rows(PROMOTIONS_TABLE, "select=*&is_active=eq.true&order=created_at.desc")
            .await?;
        Ok(decode_each(PROMOTIONS_TABLE, rows))
    }

    #[tracing::instrument(name = "Fetch post analytics", skip(self))]
    async fn fetch_post_analytics(&self, post_id: &str) -> Result<Option<PostAnalytics>, RemoteError> {
        let rows = self
            .fetch_rows(POST_ANALYTICS_TABLE, &format!("select=*&post_id=eq.{post_id}&limit=1"))
            .await?;
        Ok(rows.into_iter().next())
    }

    #[tracing::instrument(name = "Upsert post analytics", skip(self, analytics), fields(post_id = %analytics.post_id))]
    async fn upsert_post_analytics(&self, analytics: &PostAnalytics) -> Result<(), RemoteError> {
        self.upsert_row(POST_ANALYTICS_TABLE, "post_id", analytics).await
    }

    #[tracing::instrument(name = "Fetch promotion analytics", skip(self))]
    async fn fetch_promotion_analytics(&self, promotion_id: &str) -> Result<Option<PromotionAnalytics>, RemoteError> {
        let rows = self
            .fetch_rows(
                PROMOTION_ANALYTICS_TABLE,
                &format!("select=*&promotion_id=eq.{promotion_id}&limit=1"),
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    #[tracing::instrument(
        name = "Upsert promotion analytics",
        skip(self, analytics),
        fields(promotion_id = %analytics.promotion_id)
    )]
    async fn upsert_promotion_analytics(&self, analytics: &PromotionAnalytics) -> Result<(), RemoteError> {
        self.upsert_row(PROMOTION_ANALYTICS_TABLE, "promotion_id", analytics).await
    }

    #[tracing::instrument(name = "List post analytics", skip(self))]
    async fn list_post_analytics(&self) -> Result<Vec<PostAnalytics>, RemoteError> {
        self.fetch_rows(POST_ANALYTICS_TABLE, "select=*&order=views.desc").await
    }

    #[tracing::instrument(name = "List promotion analytics", skip(self))]
    async fn list_promotion_analytics(&self) -> Result<Vec<PromotionAnalytics>, RemoteError> {
        self.fetch_rows(PROMOTION_ANALYTICS_TABLE, "select=*&order=views.desc").await
    }
}
