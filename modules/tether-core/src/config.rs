use serde_json::Value;

/// Per-engine settings. Every engine on a page may carry its own.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Where event triggers POST to. `None` posts back to the page URL.
    pub post_url: Option<String>,
    /// Logs every received code payload in the browser console.
    pub debug: bool,
    /// Name prefix of the per-instance storage array (`<prefix><instance>`).
    pub storage_prefix: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            post_url: None,
            debug: false,
            storage_prefix: "Tether".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn with_post_url(mut self, url: impl Into<String>) -> Self {
        self.post_url = Some(url.into());
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_storage_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.storage_prefix = prefix.into();
        self
    }

    /// JavaScript expression for the trigger URL. A configured URL becomes a
    /// JSON string literal, which JavaScript reads as-is.
    pub(crate) fn post_location(&self) -> String {
        match &self.post_url {
            Some(url) if !url.is_empty() => Value::from(url.as_str()).to_string(),
            _ => "window.location.href".to_string(),
        }
    }
}
