use std::time::Duration;

use super::DisplayRules;

// when a selected promotion should actually pop up: after the clamped delay,
// or once the visitor scrolls past the threshold, whichever comes first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealPolicy {
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub scroll_threshold_px: u32,
}

impl Default for RevealPolicy {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            scroll_threshold_px: 200,
        }
    }
}

impl RevealPolicy {
    #[must_use]
    pub fn delay_for(&self, rules: &DisplayRules) -> Duration {
        let requested = u64::try_from(rules.delay_seconds).unwrap_or(0);
        Duration::from_secs(requested).clamp(self.min_delay, self.max_delay)
    }
}
