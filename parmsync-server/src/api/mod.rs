//! HTTP API handlers for parmsync-server

pub mod buildinfo;
pub mod health;
pub mod params;

pub use buildinfo::get_build_info;
pub use health::health_routes;
pub use params::{get_record, get_schema, set_parameter};
