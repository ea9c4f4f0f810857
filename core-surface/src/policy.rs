//! Navigation allowlist

use core_runtime::config::ContentSettings;
use url::Url;

/// Outcome of a navigation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    /// Load in the content surface
    Allow,
    /// Drop the navigation
    Block,
    /// Hand the URL to the external browser instead
    DelegateExternal(String),
}

/// Static allowlist: one content domain in-surface, one help domain handed
/// to the external browser, blank placeholders in-surface, everything else
/// blocked.
///
/// Hosts match exactly or as a parent domain (`cdn.example.com` matches
/// `example.com`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationPolicy {
    content_host: String,
    help_host: String,
}

impl NavigationPolicy {
    pub fn new(content_host: impl Into<String>, help_host: impl Into<String>) -> Self {
        Self {
            content_host: content_host.into().to_ascii_lowercase(),
            help_host: help_host.into().to_ascii_lowercase(),
        }
    }

    pub fn from_settings(settings: &ContentSettings) -> Self {
        Self::new(&settings.content_host, &settings.help_host)
    }

    pub fn decide(&self, requested: &str) -> NavigationDecision {
        let Ok(url) = Url::parse(requested) else {
            return NavigationDecision::Block;
        };

        if url.scheme() == "about" {
            return NavigationDecision::Allow;
        }

        if !matches!(url.scheme(), "http" | "https") {
            return NavigationDecision::Block;
        }

        let Some(host) = url.host_str() else {
            return NavigationDecision::Block;
        };

        if host_matches(host, &self.help_host) {
            NavigationDecision::DelegateExternal(requested.to_string())
        } else if host_matches(host, &self.content_host) {
            NavigationDecision::Allow
        } else {
            NavigationDecision::Block
        }
    }
}

fn host_matches(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}
