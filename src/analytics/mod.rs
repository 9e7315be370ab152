mod model;
mod recorder;

pub use model::{PostAnalytics, PostEvent, PromotionAnalytics, PromotionEvent, percentage_of_views};
pub use recorder::AnalyticsRecorder;
