mod analytics;
mod health_check;
mod posts;
mod promotions;
mod visitor;

pub use analytics::*;
pub use health_check::*;
pub use posts::*;
pub use promotions::*;
pub use visitor::*;

use crate::entity_id::EntityId;
use crate::errors::ApiError;

fn parse_entity_id(raw: String) -> Result<EntityId, ApiError> {
    EntityId::try_from(raw).map_err(|e| {
        tracing::warn!("Rejected identifier: {e}");
        ApiError::InvalidId(e)
    })
}

#[derive(serde::Serialize)]
struct ViewResponse {
    counted: bool,
}
