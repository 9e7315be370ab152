use actix_web::{HttpResponse, web};

use crate::analytics::AnalyticsRecorder;
use crate::pagination::{PaginatedResponse, PaginationQuery};
use crate::remote::RemoteStore;
use crate::startup::EngagementConfig;

#[allow(clippy::future_not_send)]
#[tracing::instrument(
    name = "Get post analytics",
    skip(recorder, config),
    fields(page = %query.page, page_size = %query.page_size)
)]
pub async fn get_post_analytics<R>(
    query: web::Query<PaginationQuery>,
    recorder: web::Data<AnalyticsRecorder<R>>,
    config: web::Data<EngagementConfig>,
) -> HttpResponse
where
    R: RemoteStore + Sync + 'static,
{
    let rows = recorder.list_post_analytics(config.fetch_timeout).await;
    tracing::info!("Retrieved {} post analytics rows", rows.len());

    HttpResponse::Ok().json(PaginatedResponse::from_items(rows, &query))
}

#[allow(clippy::future_not_send)]
#[tracing::instrument(
    name = "Get promotion analytics",
    skip(recorder, config),
    fields(page = %query.page, page_size = %query.page_size)
)]
pub async fn get_promotion_analytics<R>(
    query: web::Query<PaginationQuery>,
    recorder: web::Data<AnalyticsRecorder<R>>,
    config: web::Data<EngagementConfig>,
) -> HttpResponse
where
    R: RemoteStore + Sync + 'static,
{
    let rows = recorder.list_promotion_analytics(config.fetch_timeout).await;
    tracing::info!("Retrieved {} promotion analytics rows", rows.len());

    HttpResponse::Ok().json(PaginatedResponse::from_items(rows, &query))
}
