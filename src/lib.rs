pub mod backup;
pub mod calc;
pub mod db;
pub mod http;
pub mod periods;
pub mod render;
pub mod store;

pub use http::{build_router, AppState};
