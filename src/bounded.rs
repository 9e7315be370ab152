//! Remote calls with a hard time budget.
//!
//! The transport has no cooperative cancellation, so a call that overruns is
//! not aborted: it keeps running on the runtime and whatever it eventually
//! returns is dropped. The caller only ever waits `limit`.

use std::fmt::{Debug, Display};
use std::future::Future;
use std::time::Duration;

use crate::telemetry::spawn_with_tracing;

#[tracing::instrument(name = "Bounded remote call", skip(task))]
pub async fn run_bounded<F, T, E>(label: &'static str, limit: Duration, task: F) -> Option<T>
where
    F: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Debug + Display + Send + 'static,
{
    let handle = spawn_with_tracing(task);

    match tokio::time::timeout(limit, handle).await {
        Ok(Ok(Ok(value))) => Some(value),
        Ok(Ok(Err(e))) => {
            tracing::warn!(error.cause_chain = ?e, error.message = %e, "{} failed", label);
            None
        }
        Ok(Err(e)) => {
            tracing::error!(error.cause_chain = ?e, error.message = %e, "{} task failed to complete", label);
            None
        }
        Err(_) => {
            tracing::warn!("{} timed out, a late result will be ignored", label);
            None
        }
    }
}

// tracking calls annotate something the visitor already did, nobody waits on them
pub fn fire_and_forget<F, T, E>(label: &'static str, limit: Duration, task: F)
where
    F: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Debug + Display + Send + 'static,
{
    spawn_with_tracing(async move {
        run_bounded(label, limit, task).await;
    });
}
