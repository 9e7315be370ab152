mod api;
mod remote;
mod storage;

pub use api::*;
pub use remote::*;
pub use storage::*;
