use actix_web::{HttpRequest, HttpResponse, http::header, web};

use crate::startup::EngagementConfig;
use crate::storage::CookieStore;
use crate::visitor::{FingerprintSignals, VisitorTracker};

// signals only the browser knows; the rest comes from request headers
#[derive(serde::Deserialize, Debug, Default)]
pub struct FingerprintQuery {
    #[serde(default)]
    screen: String,
    #[serde(default)]
    tz_offset: i32,
    #[serde(default)]
    canvas: String,
}

#[derive(serde::Serialize)]
struct VisitorResponse {
    visitor_id: String,
    returning: bool,
    session_id: String,
    fingerprint: String,
}

#[derive(serde::Serialize)]
struct ResetResponse {
    session_id: String,
}

fn header_value(request: &HttpRequest, name: header::HeaderName) -> String {
    request
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[allow(clippy::future_not_send)]
#[tracing::instrument(name = "Describe visitor", skip(query, request, store, config))]
pub async fn get_visitor(
    query: web::Query<FingerprintQuery>,
    request: HttpRequest,
    store: CookieStore,
    config: web::Data<EngagementConfig>,
) -> HttpResponse {
    let tracker = VisitorTracker::new(&store, config.inactivity);
    let session = tracker.get_or_create_session();
    let identity = tracker.visitor_identity(&session);

    let query = query.into_inner();
    let signals = FingerprintSignals {
        user_agent: header_value(&request, header::USER_AGENT),
        language: header_value(&request, header::ACCEPT_LANGUAGE),
        screen_resolution: query.screen,
        timezone_offset_minutes: query.tz_offset,
        canvas_signature: query.canvas,
    };

    HttpResponse::Ok().json(VisitorResponse {
        visitor_id: identity.visitor_id,
        returning: identity.returning,
        session_id: session.id,
        fingerprint: signals.fingerprint(),
    })
}

// manual debug reset, the long-lived visitor id is kept
#[allow(clippy::future_not_send)]
#[tracing::instrument(name = "Reset visitor session", skip(store, config))]
pub async fn reset_visitor(store: CookieStore, config: web::Data<EngagementConfig>) -> HttpResponse {
    let session = VisitorTracker::new(&store, config.inactivity).clear_session();

    HttpResponse::Ok().json(ResetResponse {
        session_id: session.id,
    })
}
