use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_keep_alive_secs() -> u64 {
    15
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Bearer token required by the API. Empty disables authentication.
    #[serde(default)]
    pub user_token: String,
    /// Interval between keep-alive comments on event streams
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user_token: String::new(),
            keep_alive_secs: default_keep_alive_secs(),
        }
    }
}

impl Settings {
    pub fn new() -> crate::Result<Self> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start with defaults
            .add_source(File::with_name("config/default").required(false))
            // Add environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add local configuration file (not tracked by git)
            .add_source(File::with_name("config/local").required(false))
            // Add in settings from environment variables (e.g. REVIEWHUB_USER_TOKEN)
            .add_source(
                Environment::with_prefix("REVIEWHUB")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        Ok(s.try_deserialize()?)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn auth_enabled(&self) -> bool {
        !self.user_token.is_empty()
    }
}
