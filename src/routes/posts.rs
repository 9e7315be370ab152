use actix_web::{HttpResponse, web};

use super::{ViewResponse, parse_entity_id};
use crate::analytics::{AnalyticsRecorder, PostEvent};
use crate::remote::RemoteStore;
use crate::startup::EngagementConfig;
use crate::storage::CookieStore;
use crate::visitor::{ViewKind, VisitorTracker};

// explicit reader actions, anything else in the path is a 404
#[derive(serde::Deserialize, Debug, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum PostAction {
    Like,
    Share,
    Comment,
}

impl From<PostAction> for PostEvent {
    fn from(action: PostAction) -> Self {
        match action {
            PostAction::Like => Self::Like,
            PostAction::Share => Self::Share,
            PostAction::Comment => Self::Comment,
        }
    }
}

#[allow(clippy::future_not_send)]
#[tracing::instrument(
    name = "Record post view",
    skip(post_id, store, recorder, config),
    fields(post_id = %post_id)
)]
pub async fn record_post_view<R>(
    post_id: web::Path<String>,
    store: CookieStore,
    recorder: web::Data<AnalyticsRecorder<R>>,
    config: web::Data<EngagementConfig>,
) -> Result<HttpResponse, actix_web::Error>
where
    R: RemoteStore + Sync + 'static,
{
    let post_id = parse_entity_id(post_id.into_inner())?;

    let counted = VisitorTracker::new(&store, config.inactivity).mark_viewed(ViewKind::Post, post_id.as_ref());
    if counted {
        recorder.track_post_event(post_id.into(), PostEvent::View, config.tracking_timeout);
    }

    Ok(HttpResponse::Ok().json(ViewResponse { counted }))
}

#[allow(clippy::future_not_send)]
#[tracing::instrument(name = "Record post action", skip(recorder, config))]
pub async fn record_post_action<R>(
    path: web::Path<(String, PostAction)>,
    recorder: web::Data<AnalyticsRecorder<R>>,
    config: web::Data<EngagementConfig>,
) -> Result<HttpResponse, actix_web::Error>
where
    R: RemoteStore + Sync + 'static,
{
    let (post_id, action) = path.into_inner();
    let post_id = parse_entity_id(post_id)?;

    recorder.track_post_event(post_id.into(), action.into(), config.tracking_timeout);

    Ok(HttpResponse::Accepted().finish())
}
