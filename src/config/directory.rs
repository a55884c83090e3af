use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

pub const BRANDMEISTER_API_BASE: &str = "https://api.brandmeister.network/v2";

/// BrandMeister directory client configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DirectoryConfig {
    /// API base URL; endpoint paths are appended to it.
    /// TOML: `directory.base_url`. Default: `https://api.brandmeister.network/v2`.
    #[serde(default = "default_base_url")]
    pub base_url: Url,

    /// Whole-request timeout in seconds.
    /// TOML: `directory.timeout_secs`. Default: `30`.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Optional upstream HTTP proxy.
    /// TOML: `directory.proxy`. Example: `http://127.0.0.1:1080`.
    #[serde(default)]
    pub proxy: Option<Url>,

    /// User-Agent sent with every directory request.
    /// TOML: `directory.user_agent`.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl DirectoryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Same settings pointed at another base URL.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            proxy: None,
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_url() -> Url {
    Url::parse(BRANDMEISTER_API_BASE).expect("BRANDMEISTER_API_BASE is a valid url")
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("dmr-builder/{}", env!("CARGO_PKG_VERSION"))
}
