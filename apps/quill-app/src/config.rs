//! Application configuration loaded from environment variables.

use std::env;

use quill_infra::BackendConfig;

#[cfg(feature = "auth")]
use quill_infra::JwtConfig;

use crate::telemetry::TelemetryConfig;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub telemetry: TelemetryConfig,
    /// Populate the in-process backend with sample content on startup.
    pub seed_demo: bool,
    #[cfg(feature = "auth")]
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            backend: BackendConfig::from_env(),
            telemetry: TelemetryConfig::from_env(),
            seed_demo: env::var("QUILL_SEED_DEMO")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            #[cfg(feature = "auth")]
            jwt: JwtConfig::from_env(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            telemetry: TelemetryConfig::default(),
            seed_demo: false,
            #[cfg(feature = "auth")]
            jwt: JwtConfig::default(),
        }
    }
}
