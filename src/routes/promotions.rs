use actix_web::{HttpResponse, web};
use chrono::Utc;

use super::{ViewResponse, parse_entity_id};
use crate::analytics::{AnalyticsRecorder, PromotionEvent};
use crate::bounded::run_bounded;
use crate::errors::ApiError;
use crate::promotions::{FrequencyStore, Promotion, ShowFrequency, select_promotion};
use crate::remote::RemoteStore;
use crate::startup::EngagementConfig;
use crate::storage::{CookieStore, SessionScopedStore};
use crate::visitor::{ViewKind, VisitorTracker};

#[derive(serde::Deserialize, Debug)]
pub struct ActivePromotionQuery {
    #[serde(default = "default_page")]
    page: String,
}

fn default_page() -> String {
    "/".to_string()
}

#[derive(serde::Serialize)]
struct RevealSettings {
    delay_ms: u64,
    scroll_threshold_px: u32,
}

#[derive(serde::Serialize)]
struct ActivePromotionResponse {
    promotion: Option<Promotion>,
    reveal: Option<RevealSettings>,
}

// only consulted when the promotion was not offered by this server in the
// current session, ie. the UI got it from somewhere else
#[derive(serde::Deserialize, Debug)]
pub struct PromotionViewRequest {
    show_frequency: ShowFrequency,
}

#[allow(clippy::future_not_send)]
#[tracing::instrument(
    name = "Select active promotion",
    skip(query, store, remote, config),
    fields(page = %query.page, promotion_id = tracing::field::Empty)
)]
pub async fn get_active_promotion<R>(
    query: web::Query<ActivePromotionQuery>,
    store: CookieStore,
    remote: web::Data<R>,
    config: web::Data<EngagementConfig>,
) -> HttpResponse
where
    R: RemoteStore + Sync + 'static,
{
    let tracker = VisitorTracker::new(&store, config.inactivity);
    let session = tracker.get_or_create_session();
    let identity = tracker.visitor_identity(&session);

    // a slow backend means no popup, never a slow page
    let remote = remote.into_inner();
    let promotions = run_bounded("Fetch active promotions", config.fetch_timeout, async move {
        remote.fetch_active_promotions().await
    })
    .await
    .unwrap_or_default();

    let frequency = FrequencyStore::new(&store, SessionScopedStore::new(&store, session.id));
    let selected = select_promotion(
        &promotions,
        &query.page,
        Utc::now(),
        identity.returning,
        &frequency,
    );

    let response = match selected {
        Some(promotion) => {
            tracing::Span::current().record("promotion_id", tracing::field::display(&promotion.id));
            frequency.remember_offer(promotion);
            let delay = config.reveal.delay_for(&promotion.display_rules);
            ActivePromotionResponse {
                reveal: Some(RevealSettings {
                    delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    scroll_threshold_px: config.reveal.scroll_threshold_px,
                }),
                promotion: Some(promotion.clone()),
            }
        }
        None => ActivePromotionResponse {
            promotion: None,
            reveal: None,
        },
    };

    HttpResponse::Ok().json(response)
}

/// Called by the UI once the popup is actually on screen.
///
/// The display marker follows the frequency of the promotion offered in this
/// session; the request body only fills in for promotions this server never
/// offered. The marker and the viewed-set are written to the visitor cookie
/// before the remote increment is spawned.
#[allow(clippy::future_not_send)]
#[tracing::instrument(
    name = "Record promotion view",
    skip(promotion_id, body, store, recorder, config),
    fields(promotion_id = %promotion_id)
)]
pub async fn record_promotion_view<R>(
    promotion_id: web::Path<String>,
    body: Option<web::Json<PromotionViewRequest>>,
    store: CookieStore,
    recorder: web::Data<AnalyticsRecorder<R>>,
    config: web::Data<EngagementConfig>,
) -> Result<HttpResponse, actix_web::Error>
where
    R: RemoteStore + Sync + 'static,
{
    let promotion_id = parse_entity_id(promotion_id.into_inner())?;

    let tracker = VisitorTracker::new(&store, config.inactivity);
    let mut session = tracker.get_or_create_session();
    let frequency = FrequencyStore::new(&store, SessionScopedStore::new(&store, session.id.clone()));
    let show_frequency = frequency
        .offered_frequency(promotion_id.as_ref())
        .or_else(|| body.map(|b| b.show_frequency))
        .ok_or_else(|| {
            tracing::warn!("Promotion view without an offer or a display frequency");
            ApiError::UnknownFrequency
        })?;
    frequency.mark(promotion_id.as_ref(), show_frequency);

    let counted = tracker.record_view(&mut session, ViewKind::Promotion, promotion_id.as_ref());
    if counted {
        recorder.track_promotion_event(promotion_id.into(), PromotionEvent::View, config.tracking_timeout);
    } else {
        tracing::debug!("Promotion already counted in this session");
    }

    Ok(HttpResponse::Ok().json(ViewResponse { counted }))
}

#[allow(clippy::future_not_send)]
#[tracing::instrument(name = "Record promotion click", skip(recorder, config))]
pub async fn record_promotion_click<R>(
    promotion_id: web::Path<String>,
    recorder: web::Data<AnalyticsRecorder<R>>,
    config: web::Data<EngagementConfig>,
) -> Result<HttpResponse, actix_web::Error>
where
    R: RemoteStore + Sync + 'static,
{
    record_promotion_action(promotion_id.into_inner(), PromotionEvent::Click, &recorder, &config)
}

#[allow(clippy::future_not_send)]
#[tracing::instrument(name = "Record promotion close", skip(recorder, config))]
pub async fn record_promotion_close<R>(
    promotion_id: web::Path<String>,
    recorder: web::Data<AnalyticsRecorder<R>>,
    config: web::Data<EngagementConfig>,
) -> Result<HttpResponse, actix_web::Error>
where
    R: RemoteStore + Sync + 'static,
{
    record_promotion_action(promotion_id.into_inner(), PromotionEvent::Close, &recorder, &config)
}

// explicit visitor actions, reported every time and never awaited
fn record_promotion_action<R>(
    promotion_id: String,
    event: PromotionEvent,
    recorder: &web::Data<AnalyticsRecorder<R>>,
    config: &EngagementConfig,
) -> Result<HttpResponse, actix_web::Error>
where
    R: RemoteStore + Sync + 'static,
{
    let promotion_id = parse_entity_id(promotion_id)?;
    recorder.track_promotion_event(promotion_id.into(), event, config.tracking_timeout);
    Ok(HttpResponse::Accepted().finish())
}
