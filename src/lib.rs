pub mod analytics;
pub mod bounded;
pub mod configuration;
pub mod entity_id;
pub mod errors;
pub mod pagination;
pub mod promotions;
pub mod remote;
pub mod routes;
pub mod startup;
pub mod storage;
pub mod telemetry;
pub mod visitor;
