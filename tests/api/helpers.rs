use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex};
use std::time::Duration;

use blog_engagement::{
    analytics::{PostAnalytics, PromotionAnalytics},
    configuration::get_configuration,
    errors::RemoteError,
    promotions::Promotion,
    remote::RemoteStore,
    startup::Application,
    telemetry::{get_subscriber, init_subscriber},
};

// ensure the `tracing` task is only initialized once using `LazyLock`
static TRACING: LazyLock<()> = LazyLock::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    }
});

#[derive(Default)]
struct RemoteState {
    promotions: Vec<Promotion>,
    post_analytics: HashMap<String, PostAnalytics>,
    promotion_analytics: HashMap<String, PromotionAnalytics>,
}

// stands in for the hosted backend, shared between the app and the test body
#[derive(Clone, Default)]
pub struct FakeRemoteStore {
    state: Arc<Mutex<RemoteState>>,
    promotions_latency: Duration,
}

impl FakeRemoteStore {
    pub fn with_promotions(promotions: Vec<serde_json::Value>) -> Self {
        let remote = Self::default();
        remote.state.lock().unwrap().promotions = promotions
            .into_iter()
            .map(|p| serde_json::from_value(p).expect("Invalid test promotion"))
            .collect();
        remote
    }

    pub fn slow(mut self, latency: Duration) -> Self {
        self.promotions_latency = latency;
        self
    }

    pub fn seed_post_analytics(&self, analytics: PostAnalytics) {
        self.state
            .lock()
            .unwrap()
            .post_analytics
            .insert(analytics.post_id.clone(), analytics);
    }

    pub fn post_analytics(&self, post_id: &str) -> Option<PostAnalytics> {
        self.state.lock().unwrap().post_analytics.get(post_id).cloned()
    }

    pub fn promotion_analytics(&self, promotion_id: &str) -> Option<PromotionAnalytics> {
        self.state
            .lock()
            .unwrap()
            .promotion_analytics
            .get(promotion_id)
            .cloned()
    }
}

impl RemoteStore for FakeRemoteStore {
    async fn fetch_active_promotions(&self) -> Result<Vec<Promotion>, RemoteError> {
        tokio::time::sleep(self.promotions_latency).await;
        let state = self.state.lock().unwrap();
        Ok(state.promotions.iter().filter(|p| p.is_active).cloned().collect())
    }

    async fn fetch_post_analytics(&self, post_id: &str) -> Result<Option<PostAnalytics>, RemoteError> {
        Ok(self.post_analytics(post_id))
    }

    async fn upsert_post_analytics(&self, analytics: &PostAnalytics) -> Result<(), RemoteError> {
        self.seed_post_analytics(analytics.clone());
        Ok(())
    }

    async fn fetch_promotion_analytics(&self, promotion_id: &str) -> Result<Option<PromotionAnalytics>, RemoteError> {
        Ok(self.promotion_analytics(promotion_id))
    }

    async fn upsert_promotion_analytics(&self, analytics: &PromotionAnalytics) -> Result<(), RemoteError> {
        self.state
            .lock()
            .unwrap()
            .promotion_analytics
            .insert(analytics.promotion_id.clone(), analytics.clone());
        Ok(())
    }

    async fn list_post_analytics(&self) -> Result<Vec<PostAnalytics>, RemoteError> {
        let mut rows: Vec<_> = self.state.lock().unwrap().post_analytics.values().cloned().collect();
        rows.sort_by(|a, b| a.post_id.cmp(&b.post_id));
        Ok(rows)
    }

    async fn list_promotion_analytics(&self) -> Result<Vec<PromotionAnalytics>, RemoteError> {
        let mut rows: Vec<_> = self
            .state
            .lock()
            .unwrap()
            .promotion_analytics
            .values()
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.promotion_id.cmp(&b.promotion_id));
        Ok(rows)
    }
}

pub struct TestApp {
    pub address: String,
    pub _port: u16,
    pub remote: FakeRemoteStore,
    pub api_client: reqwest::Client,
}

impl TestApp {
    pub async fn generic_request(&self) -> reqwest::Response {
        self.api_client
            .get(&format!("{}/health_check", &self.address))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_active_promotion(&self, page: &str) -> serde_json::Value {
        self.api_client
            .get(&format!("{}/api/promotions/active?page={}", &self.address, page))
            .send()
            .await
            .expect("Failed to execute request.")
            .json()
            .await
            .expect("Failed to parse active promotion")
    }

    pub async fn post_promotion_view(&self, promotion_id: &str, show_frequency: &str) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/api/promotions/{}/view", &self.address, promotion_id))
            .json(&serde_json::json!({ "show_frequency": show_frequency }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_promotion_view_without_body(&self, promotion_id: &str) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/api/promotions/{}/view", &self.address, promotion_id))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_promotion_action(&self, promotion_id: &str, action: &str) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/api/promotions/{}/{}", &self.address, promotion_id, action))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_post_view(&self, post_id: &str) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/api/posts/{}/view", &self.address, post_id))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_post_action(&self, post_id: &str, action: &str) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/api/posts/{}/{}", &self.address, post_id, action))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_visitor(&self) -> serde_json::Value {
        self.api_client
            .get(&format!("{}/api/visitor?screen=1920x1080&tz_offset=-60", &self.address))
            .header("User-Agent", "test-agent")
            .header("Accept-Language", "en-GB")
            .send()
            .await
            .expect("Failed to execute request.")
            .json()
            .await
            .expect("Failed to parse visitor")
    }

    pub async fn reset_visitor(&self) -> serde_json::Value {
        self.api_client
            .post(&format!("{}/api/visitor/reset", &self.address))
            .send()
            .await
            .expect("Failed to execute request.")
            .json()
            .await
            .expect("Failed to parse reset response")
    }

    pub async fn get_analytics(&self, kind: &str, page: usize, page_size: usize) -> reqwest::Response {
        self.api_client
            .get(&format!(
                "{}/api/analytics/{}?page={}&page_size={}",
                &self.address, kind, page, page_size
            ))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    // background tracking lands shortly after the response, poll for it
    pub async fn wait_for<T>(&self, mut check: impl FnMut(&FakeRemoteStore) -> Option<T>) -> T {
        for _ in 0..100 {
            if let Some(found) = check(&self.remote) {
                return found;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("Background tracking never reached the remote store");
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(FakeRemoteStore::default()).await
}

pub async fn spawn_app_with(remote: FakeRemoteStore) -> TestApp {
    LazyLock::force(&TRACING);

    let configuration = {
        let mut c = get_configuration().expect("Failed to read configuration.");
        c.application.port = 0;
        c
    };

    // launch as background task
    let application =
        Application::build(configuration, remote.clone()).expect("Failed to build application.");

    let application_port = application.port();
    let _ = tokio::spawn(application.run_until_stopped());

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .cookie_store(true)
        .build()
        .unwrap();

    TestApp {
        address: format!("http://127.0.0.1:{}", application_port),
        _port: application_port,
        remote,
        api_client: client,
    }
}

pub fn promotion(id: &str, display_rules: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": format!("Promotion {id}"),
        "message": "Subscribe to the newsletter",
        "button_text": "Subscribe",
        "button_link": "/newsletter",
        "is_active": true,
        "display_rules": display_rules,
    })
}
