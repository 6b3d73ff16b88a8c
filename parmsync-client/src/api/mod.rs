//! Local HTTP API for parmsync-client

pub mod health;
pub mod replica;

pub use health::health_routes;
pub use replica::{get_replica, submit_edit};
