use actix_cors::Cors;
use actix_session::{SessionMiddleware, config::PersistentSession, storage::CookieSessionStore};
use actix_web::{App, HttpServer, cookie::Key, dev::Server, http, web, web::Data};
use anyhow::Context;
use chrono::TimeDelta;
use secrecy::ExposeSecret;
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;
use tracing_actix_web::TracingLogger;

use crate::analytics::AnalyticsRecorder;
use crate::configuration::{CorsSettings, Settings, VisitorSettings};
use crate::promotions::RevealPolicy;
use crate::remote::RemoteStore;
use crate::routes::{
    get_active_promotion, get_post_analytics, get_promotion_analytics, get_visitor, health_check,
    record_post_action, record_post_view, record_promotion_click, record_promotion_close,
    record_promotion_view, reset_visitor,
};

// knobs shared by every handler
#[derive(Debug, Clone)]
pub struct EngagementConfig {
    pub inactivity: TimeDelta,
    pub reveal: RevealPolicy,
    pub fetch_timeout: Duration,
    pub tracking_timeout: Duration,
}

impl EngagementConfig {
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            inactivity: settings.visitor.inactivity(),
            reveal: settings.promotions.reveal_policy(),
            fetch_timeout: settings.remote.fetch_timeout(),
            tracking_timeout: settings.remote.tracking_timeout(),
        }
    }
}

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    #[allow(clippy::missing_errors_doc)]
    pub fn build<R>(configuration: Settings, remote: R) -> Result<Self, anyhow::Error>
    where
        R: RemoteStore + Sync + 'static,
    {
        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port,
        );

        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();
        let engagement = EngagementConfig::from_settings(&configuration);
        let server = run(
            listener,
            remote,
            engagement,
            &configuration,
        )?;

        Ok(Self { port, server })
    }

    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    #[allow(clippy::missing_errors_doc)]
    // only return when the application is stopped
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

// run the actual server
fn run<R>(
    listener: TcpListener,
    remote: R,
    engagement: EngagementConfig,
    configuration: &Settings,
) -> Result<Server, anyhow::Error>
where
    R: RemoteStore + Sync + 'static,
{
    let remote = Arc::new(remote);
    let recorder = Data::new(AnalyticsRecorder::new(Arc::clone(&remote)));
    let remote = Data::from(remote);
    let engagement = Data::new(engagement);
    let secret_key = Key::try_from(configuration.application.hmac_secret.expose_secret().as_bytes())
        .context("hmac_secret must be at least 64 bytes long")?;
    let visitor = configuration.visitor.clone();
    let cors = configuration.cors.clone();

    let server = HttpServer::new(move || {
        App::new()
            .wrap(visitor_session(&visitor, secret_key.clone()))
            .wrap(TracingLogger::default())
            .wrap(cors_policy(&cors))
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/api/promotions")
                    .route("/active", web::get().to(get_active_promotion::<R>))
                    .route("/{promotion_id}/view", web::post().to(record_promotion_view::<R>))
                    .route("/{promotion_id}/click", web::post().to(record_promotion_click::<R>))
                    .route("/{promotion_id}/close", web::post().to(record_promotion_close::<R>)),
            )
            .service(
                web::scope("/api/posts")
                    .route("/{post_id}/view", web::post().to(record_post_view::<R>))
                    .route("/{post_id}/{action}", web::post().to(record_post_action::<R>)),
            )
            .service(
                web::scope("/api/visitor")
                    .route("", web::get().to(get_visitor))
                    .route("/reset", web::post().to(reset_visitor)),
            )
            .service(
                web::scope("/api/analytics")
                    .route("/posts", web::get().to(get_post_analytics::<R>))
                    .route("/promotions", web::get().to(get_promotion_analytics::<R>)),
            )
            .app_data(remote.clone())
            .app_data(recorder.clone())
            .app_data(engagement.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}

// the visitor's storage lives in a long-lived, encrypted cookie
fn visitor_session(
    settings: &VisitorSettings,
    secret_key: Key,
) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), secret_key)
        .cookie_name(settings.cookie_name.clone())
        .cookie_secure(settings.secure_cookies)
        .session_lifecycle(
            PersistentSession::default()
                .session_ttl(actix_web::cookie::time::Duration::days(settings.cookie_ttl_days)),
        )
        .build()
}

fn cors_policy(settings: &CorsSettings) -> Cors {
    settings
        .allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods(vec!["GET", "POST"])
        .allowed_headers(vec![http::header::ACCEPT, http::header::CONTENT_TYPE])
        .supports_credentials()
        .max_age(settings.max_age)
}
