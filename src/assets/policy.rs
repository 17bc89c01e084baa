//! Per-reference asset rule.

use url::Url;

use crate::config::AssetConfig;

/// Decides whether an image reference can be rendered as-is.
#[derive(Debug, Clone)]
pub struct AssetPolicy {
    trusted_hosts: Vec<String>,
    placeholder_paths: Vec<String>,
    fallback_url: String,
}

impl AssetPolicy {
    pub fn new(config: &AssetConfig) -> Self {
        Self {
            trusted_hosts: config
                .trusted_hosts
                .iter()
                .map(|h| h.trim().to_ascii_lowercase())
                .collect(),
            placeholder_paths: config.placeholder_paths.clone(),
            fallback_url: config.fallback_url.clone(),
        }
    }

    pub fn fallback(&self) -> &str {
        &self.fallback_url
    }

    /// A reference is kept only if it is an absolute http(s) URL on a trusted
    /// host that does not point at a known placeholder.
    pub fn is_renderable(&self, reference: &str) -> bool {
        let reference = reference.trim();
        if reference.is_empty() || self.is_placeholder(reference) {
            return false;
        }

        let Ok(url) = Url::parse(reference) else {
            return false;
        };
        if !matches!(url.scheme(), "http" | "https") || self.is_placeholder(url.path()) {
            return false;
        }

        url.host_str()
            .map(|host| self.trusted_hosts.iter().any(|t| t == &host.to_ascii_lowercase()))
            .unwrap_or(false)
    }

    /// The reference itself if renderable, the fallback otherwise.
    pub fn resolve<'a>(&'a self, reference: Option<&'a str>) -> &'a str {
        match reference {
            Some(r) if self.is_renderable(r) => r,
            _ => &self.fallback_url,
        }
    }

    fn is_placeholder(&self, path: &str) -> bool {
        self.placeholder_paths
            .iter()
            .any(|placeholder| path == placeholder || path.ends_with(placeholder.as_str()))
    }
}
