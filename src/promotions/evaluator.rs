use chrono::{DateTime, Utc};

use super::{Promotion, ShowFrequency};
use crate::storage::KeyValueStore;

pub const ONCE_MARKER_PREFIX: &str = "promotion_shown_once_";
pub const SESSION_MARKER_PREFIX: &str = "promotion_shown_session_";
pub const OFFER_MARKER_PREFIX: &str = "promotion_offered_";

// active, on this page, inside its schedule; input order is kept as-is
#[must_use]
pub fn filter_eligible<'a>(promotions: &'a [Promotion], page: &str, now: DateTime<Utc>) -> Vec<&'a Promotion> {
    promotions
        .iter()
        .filter(|promotion| promotion.is_eligible(page, now))
        .collect()
}

/// Picks the promotion to show on `page`, if any.
///
/// Only the first eligible promotion for this audience is considered. When it
/// has already been shown according to its frequency, nothing is shown: there
/// is no fallback to the next candidate.
pub fn select_promotion<'a, D, S>(
    promotions: &'a [Promotion],
    page: &str,
    now: DateTime<Utc>,
    returning_visitor: bool,
    frequency: &FrequencyStore<D, S>,
) -> Option<&'a Promotion>
where
    D: KeyValueStore,
    S: KeyValueStore,
{
    filter_eligible(promotions, page, now)
        .into_iter()
        .find(|promotion| promotion.display_rules.target_audience.includes(returning_visitor))
        .filter(|promotion| frequency.should_display(promotion))
}

/// Display markers for `once` and `session` promotions.
///
/// `once` markers go to the durable store, `session` markers to the
/// session-scoped one; `always` is never recorded. A store that cannot be read
/// reports "not shown yet".
///
/// Promotions handed out by the server are remembered with their frequency in
/// the session-scoped store, so the marker written when the visitor actually
/// sees one follows the promotion's own rules.
pub struct FrequencyStore<D, S> {
    durable: D,
    session: S,
}

impl<D: KeyValueStore, S: KeyValueStore> FrequencyStore<D, S> {
    pub const fn new(durable: D, session: S) -> Self {
        Self { durable, session }
    }

    #[must_use]
    pub fn should_display(&self, promotion: &Promotion) -> bool {
        !self.is_marked(&promotion.id, promotion.display_rules.show_frequency)
    }

    pub fn mark_displayed(&self, promotion: &Promotion) {
        self.mark(&promotion.id, promotion.display_rules.show_frequency);
    }

    #[must_use]
    pub fn is_marked(&self, promotion_id: &str, frequency: ShowFrequency) -> bool {
        let Some((store, key)) = self.marker(promotion_id, frequency) else {
            return false;
        };

        match store.get(&key) {
            Ok(marker) => marker.is_some(),
            Err(e) => {
                tracing::warn!(error.cause_chain = ?e, promotion_id, "Failed to read display marker");
                false
            }
        }
    }

    pub fn mark(&self, promotion_id: &str, frequency: ShowFrequency) {
        let Some((store, key)) = self.marker(promotion_id, frequency) else {
            return;
        };

        let shown_at = Utc::now().timestamp_millis().to_string();
        if let Err(e) = store.set(&key, &shown_at) {
            tracing::warn!(error.cause_chain = ?e, promotion_id, "Failed to write display marker");
        }
    }

    pub fn remember_offer(&self, promotion: &Promotion) {
        let key = format!("{OFFER_MARKER_PREFIX}{}", promotion.id);
        let frequency = match serde_json::to_string(&promotion.display_rules.show_frequency) {
            Ok(frequency) => frequency,
            Err(e) => {
                tracing::error!(error.message = %e, promotion_id = %promotion.id, "Failed to encode offer");
                return;
            }
        };

        if let Err(e) = self.session.set(&key, &frequency) {
            tracing::warn!(error.cause_chain = ?e, promotion_id = %promotion.id, "Failed to remember offer");
        }
    }

    // frequency of a promotion offered earlier in this session, if any
    #[must_use]
    pub fn offered_frequency(&self, promotion_id: &str) -> Option<ShowFrequency> {
        let raw = match self.session.get(&format!("{OFFER_MARKER_PREFIX}{promotion_id}")) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(error.cause_chain = ?e, promotion_id, "Failed to read offer");
                return None;
            }
        };
        serde_json::from_str(&raw).ok()
    }

    fn marker(&self, promotion_id: &str, frequency: ShowFrequency) -> Option<(&dyn KeyValueStore, String)> {
        let (store, prefix): (&dyn KeyValueStore, &str) = match frequency {
            ShowFrequency::Once => (&self.durable, ONCE_MARKER_PREFIX),
            ShowFrequency::Session => (&self.session, SESSION_MARKER_PREFIX),
            ShowFrequency::Always => return None,
        };
        Some((store, format!("{prefix}{promotion_id}")))
    }
}
