use std::collections::HashMap;
use std::time::Duration;

/// Configuration for HTTP client behavior
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub user_agent: String,
    pub default_headers: HashMap<String, String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("curator-rs/", env!("CARGO_PKG_VERSION")).to_string(),
            default_headers: HashMap::new(),
        }
    }
}
