//! Query cache configuration.

use std::num::NonZeroUsize;
use std::time::Duration;

const DEFAULT_LIST_TTL: Duration = Duration::from_secs(60);
const DEFAULT_POST_TTL: Duration = Duration::from_secs(300);
const DEFAULT_MAX_ENTRIES: NonZeroUsize = match NonZeroUsize::new(512) {
    Some(limit) => limit,
    None => NonZeroUsize::MIN,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// When false every call fetches; in-flight requests are still shared.
    pub enabled: bool,
    /// Freshness window for post and project listings.
    pub list_ttl: Duration,
    /// Freshness window for single-post lookups.
    pub post_ttl: Duration,
    /// Answer with an expired value while one background refresh runs.
    pub serve_stale: bool,
    /// Keys kept per cache; the least recently used one is evicted beyond it.
    pub max_entries: NonZeroUsize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            list_ttl: DEFAULT_LIST_TTL,
            post_ttl: DEFAULT_POST_TTL,
            serve_stale: true,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            list_ttl: Duration::from_secs(settings.list_ttl_seconds.get()),
            post_ttl: Duration::from_secs(settings.post_ttl_seconds.get()),
            serve_stale: settings.serve_stale,
            max_entries: settings.max_entries,
        }
    }
}

impl CacheConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = CacheConfig::default();
        assert!(config.enabled);
        assert!(config.serve_stale);
        assert_eq!(config.list_ttl, Duration::from_secs(60));
        assert_eq!(config.post_ttl, Duration::from_secs(300));
        assert_eq!(config.max_entries.get(), 512);
    }

    #[test]
    fn disabled_keeps_windows() {
        let config = CacheConfig::disabled();
        assert!(!config.enabled);
        assert_eq!(config.list_ttl, DEFAULT_LIST_TTL);
    }
}
