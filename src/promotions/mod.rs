mod evaluator;
mod model;
mod reveal;

pub use evaluator::{
    FrequencyStore, OFFER_MARKER_PREFIX, ONCE_MARKER_PREFIX, SESSION_MARKER_PREFIX, filter_eligible, select_promotion,
};
pub use model::{ALL_PAGES, DisplayRules, Promotion, ShowFrequency, TargetAudience};
pub use reveal::RevealPolicy;
