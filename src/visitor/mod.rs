mod fingerprint;
mod session;
mod tracker;

pub use fingerprint::{FingerprintSignals, rolling_hash};
pub use session::{ViewKind, VisitorSession};
pub use tracker::{DEFAULT_INACTIVITY_MINUTES, SESSION_KEY, VISITOR_ID_KEY, VisitorIdentity, VisitorTracker};
