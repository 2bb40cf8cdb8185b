//! Service configuration.

use crate::http::HttpClientConfig;

/// Launcher endpoint that serves the app manifest. `{platform}` and
/// `{label}` are substituted from the configuration.
const DEFAULT_MANIFEST_URL: &str = "https://launcher-public-service-prod06.ol.epicgames.com/launcher/api/public/assets/v2/platform/{platform}/namespace/fn/catalogItem/4fe75bbc5a674f4f9b356b5c90567da5/app/Fortnite/label/{label}";

const DEFAULT_PLATFORM: &str = "Windows";
const DEFAULT_LABEL: &str = "Live";

/// Configuration for [`ServiceState`](crate::service::ServiceState).
///
/// The defaults point at the public launcher and CDN endpoints; overrides
/// exist mainly for mirrors and tests.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub manifest_url: String,
    pub platform: String,
    pub label: String,
    /// Base URL for chunk downloads. Derived from the chunk manifest
    /// location when `None`.
    pub chunk_base: Option<String>,
    pub http: HttpClientConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            manifest_url: DEFAULT_MANIFEST_URL.to_string(),
            platform: DEFAULT_PLATFORM.to_string(),
            label: DEFAULT_LABEL.to_string(),
            chunk_base: None,
            http: HttpClientConfig::default(),
        }
    }
}

impl ServiceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_manifest_url(mut self, url: String) -> Self {
        self.manifest_url = url;
        self
    }

    pub fn with_platform(mut self, platform: String) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_label(mut self, label: String) -> Self {
        self.label = label;
        self
    }

    pub fn with_chunk_base(mut self, base: String) -> Self {
        self.chunk_base = Some(base);
        self
    }

    pub fn with_http(mut self, http: HttpClientConfig) -> Self {
        self.http = http;
        self
    }

    /// The app manifest URL with platform and label substituted.
    pub fn resolved_manifest_url(&self) -> String {
        self.manifest_url
            .replace("{platform}", &self.platform)
            .replace("{label}", &self.label)
    }

    /// Label as it appears in app manifest elements, e.g. `Live-Windows`.
    pub fn element_label(&self) -> String {
        format!("{}-{}", self.label, self.platform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServiceConfig::default();
        assert_eq!(config.platform, "Windows");
        assert_eq!(config.label, "Live");
        assert!(config.chunk_base.is_none());
    }

    #[test]
    fn test_resolved_manifest_url() {
        let config = ServiceConfig::new()
            .with_manifest_url("https://example.com/{platform}/{label}".to_string())
            .with_platform("Mac".to_string())
            .with_label("Staging".to_string());

        assert_eq!(config.resolved_manifest_url(), "https://example.com/Mac/Staging");
        assert_eq!(config.element_label(), "Staging-Mac");
    }

    #[test]
    fn test_builder_overrides() {
        let config = ServiceConfig::new()
            .with_chunk_base("https://cdn.example.com/CloudDir".to_string());

        assert_eq!(
            config.chunk_base.as_deref(),
            Some("https://cdn.example.com/CloudDir")
        );
    }
}
