use std::env;

use anyhow::{Context, Result};
use tether_core::EngineConfig;

/// Server settings, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct WebConfig {
    pub web_host: String,
    pub web_port: u16,
    /// Where triggers POST events. Unset means the page's own URL.
    pub post_url: Option<String>,
    /// Log every evaluated response in the browser console.
    pub debug: bool,
}

impl WebConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let web_port = match lookup("WEB_PORT") {
            Some(port) => port
                .parse()
                .with_context(|| format!("WEB_PORT must be a number, got {port:?}"))?,
            None => 3000,
        };

        Ok(Self {
            web_host: lookup("WEB_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            web_port,
            post_url: lookup("TETHER_POST_URL").filter(|url| !url.is_empty()),
            debug: lookup("TETHER_DEBUG")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true"))
                .unwrap_or(false),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.web_host, self.web_port)
    }

    /// Defaults for every engine a request mounts.
    pub fn engine_config(&self) -> EngineConfig {
        let config = EngineConfig::default().with_debug(self.debug);
        match &self.post_url {
            Some(url) => config.with_post_url(url.clone()),
            None => config,
        }
    }
}
