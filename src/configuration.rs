use chrono::TimeDelta;
use secrecy::{ExposeSecret, SecretString};
use serde_aux::field_attributes::deserialize_number_from_string;
use std::time::Duration;

use crate::promotions::RevealPolicy;
use crate::visitor::DEFAULT_INACTIVITY_MINUTES;

// base.yaml only carries development secrets, all of them starting with this
const PLACEHOLDER_SECRET_PREFIX: &str = "change-me";

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{other} is not a supported environment. \
                Use either `local` or `production`."
            )),
        }
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub remote: RemoteSettings,
    #[serde(default)]
    pub visitor: VisitorSettings,
    #[serde(default)]
    pub promotions: PromotionSettings,
    pub cors: CorsSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    // signs and encrypts the visitor cookie, must be at least 64 bytes
    pub hmac_secret: SecretString,
}

#[derive(serde::Deserialize, Clone)]
pub struct RemoteSettings {
    pub base_url: String,
    pub api_key: SecretString,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub fetch_timeout_ms: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub tracking_timeout_ms: u64,
}

impl RemoteSettings {
    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    #[must_use]
    pub const fn tracking_timeout(&self) -> Duration {
        Duration::from_millis(self.tracking_timeout_ms)
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct VisitorSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub inactivity_minutes: i64,
    pub cookie_name: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub cookie_ttl_days: i64,
    pub secure_cookies: bool,
}

impl Default for VisitorSettings {
    fn default() -> Self {
        Self {
            inactivity_minutes: DEFAULT_INACTIVITY_MINUTES,
            cookie_name: "blog_visitor".to_string(),
            cookie_ttl_days: 365,
            secure_cookies: true,
        }
    }
}

impl VisitorSettings {
    #[must_use]
    pub fn inactivity(&self) -> TimeDelta {
        TimeDelta::minutes(self.inactivity_minutes)
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct PromotionSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub min_delay_secs: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_delay_secs: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub scroll_threshold_px: u32,
}

impl Default for PromotionSettings {
    fn default() -> Self {
        Self {
            min_delay_secs: 1,
            max_delay_secs: 30,
            scroll_threshold_px: 200,
        }
    }
}

impl PromotionSettings {
    #[must_use]
    pub const fn reveal_policy(&self) -> RevealPolicy {
        RevealPolicy {
            min_delay: Duration::from_secs(self.min_delay_secs),
            max_delay: Duration::from_secs(self.max_delay_secs),
            scroll_threshold_px: self.scroll_threshold_px,
        }
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct CorsSettings {
    pub allowed_origins: Vec<String>,
    pub max_age: usize,
}

#[allow(clippy::missing_errors_doc)]
/// # Panics
/// if the working directory can't be read or `APP_ENVIRONMENT` is unknown
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");
    let configuration_directory = base_path.join("configuration");

    // detect environment
    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .expect("Failed to parse APP_ENVIRONMENT");

    let environment_filename = format!("{}.yaml", environment.as_str());
    let settings = config::Config::builder()
        .add_source(config::File::from(
            configuration_directory.join("base.yaml"),
        ))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let settings = settings.try_deserialize::<Settings>()?;
    settings.check_secrets(&environment)?;
    Ok(settings)
}

impl Settings {
    // production has to get its secrets from APP_APPLICATION__HMAC_SECRET and
    // APP_REMOTE__API_KEY
    fn check_secrets(&self, environment: &Environment) -> Result<(), config::ConfigError> {
        if !matches!(environment, Environment::Production) {
            return Ok(());
        }

        let secrets = [
            ("application.hmac_secret", &self.application.hmac_secret),
            ("remote.api_key", &self.remote.api_key),
        ];
        for (name, secret) in secrets {
            if secret.expose_secret().starts_with(PLACEHOLDER_SECRET_PREFIX) {
                return Err(config::ConfigError::Message(format!(
                    "{name} still holds the development placeholder"
                )));
            }
        }
        Ok(())
    }
}
