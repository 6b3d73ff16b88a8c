//! Build identification and health payloads shared by both services

use serde::Serialize;

pub const GIT_HASH: &str = env!("GIT_HASH");
pub const BUILD_TIMESTAMP: &str = env!("BUILD_TIMESTAMP");
pub const BUILD_PROFILE: &str = env!("BUILD_PROFILE");

/// Identity of one running binary
///
/// `module` and `version` come from the binary's own crate; the rest is
/// fixed when this crate is built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildInfo {
    pub module: String,
    pub version: String,
    pub git_hash: String,
    pub build_timestamp: String,
    pub build_profile: String,
}

impl BuildInfo {
    pub fn new(module: &str, version: &str) -> Self {
        Self {
            module: module.to_string(),
            version: version.to_string(),
            git_hash: GIT_HASH.to_string(),
            build_timestamp: BUILD_TIMESTAMP.to_string(),
            build_profile: BUILD_PROFILE.to_string(),
        }
    }

    /// One-line startup banner
    pub fn banner(&self) -> String {
        format!(
            "Starting {} v{} [{}] built {} ({})",
            self.module, self.version, self.git_hash, self.build_timestamp, self.build_profile
        )
    }

    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            status: "ok".to_string(),
            module: self.module.clone(),
            version: self.version.clone(),
        }
    }
}

/// `GET /health` body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}
