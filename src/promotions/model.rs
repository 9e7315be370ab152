use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub const ALL_PAGES: &str = "all";

const fn default_delay_seconds() -> i64 {
    3
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShowFrequency {
    Once,
    #[default]
    Session,
    Always,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetAudience {
    #[default]
    All,
    NewVisitors,
    ReturningVisitors,
}

impl TargetAudience {
    #[must_use]
    pub const fn includes(self, returning_visitor: bool) -> bool {
        match self {
            Self::All => true,
            Self::NewVisitors => !returning_visitor,
            Self::ReturningVisitors => returning_visitor,
        }
    }
}

// stored by the remote as a JSON column, hence the camelCase keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRules {
    #[serde(default)]
    pub pages: Vec<String>,
    #[serde(default = "default_delay_seconds")]
    pub delay_seconds: i64,
    #[serde(default)]
    pub show_frequency: ShowFrequency,
    #[serde(default)]
    pub target_audience: TargetAudience,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<DateTime<Utc>>,
}

impl Default for DisplayRules {
    fn default() -> Self {
        Self {
            pages: Vec::new(),
            delay_seconds: default_delay_seconds(),
            show_frequency: ShowFrequency::default(),
            target_audience: TargetAudience::default(),
            start_date: None,
            end_date: None,
        }
    }
}

impl DisplayRules {
    // no pages at all means every page
    #[must_use]
    pub fn matches_page(&self, page: &str) -> bool {
        self.pages.is_empty() || self.pages.iter().any(|p| p == ALL_PAGES || p == page)
    }

    #[must_use]
    pub fn is_scheduled_at(&self, now: DateTime<Utc>) -> bool {
        let started = self.start_date.is_none_or(|start| start <= now);
        let not_ended = self.end_date.is_none_or(|end| end >= now);
        started && not_ended
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Promotion {
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub button_text: Option<String>,
    #[serde(default)]
    pub button_link: Option<String>,
    pub is_active: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub display_rules: DisplayRules,
}

impl Promotion {
    #[must_use]
    pub fn is_eligible(&self, page: &str, now: DateTime<Utc>) -> bool {
        self.is_active && self.display_rules.matches_page(page) && self.display_rules.is_scheduled_at(now)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// admin forms store either a full timestamp or a bare `YYYY-MM-DD`,
// and an emptied date input comes through as ""
fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_date(value)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date `{value}`"))),
    }
}

fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|date| date.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        })
}
