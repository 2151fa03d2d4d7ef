use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const DEFAULT_API_BASE: &str = "https://api.anthropic.com";
pub const DEFAULT_CLIENT_URL: &str = "http://localhost:3000";
pub const DEFAULT_RATE_LIMIT_MAX: u32 = 100;
pub const DEFAULT_RATE_LIMIT_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Relay settings, read from the process environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub bind: String,
    pub port: u16,
    /// Upstream credential. Without it every summary request answers 500.
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    /// The one origin allowed by CORS.
    pub client_url: String,
    /// Key the rate limiter on `x-forwarded-for` instead of the peer
    /// address. Only safe behind a proxy that overwrites the header.
    pub trust_proxy: bool,
    pub rate_limit_max: u32,
    pub rate_limit_window: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            client_url: DEFAULT_CLIENT_URL.to_string(),
            trust_proxy: false,
            rate_limit_max: DEFAULT_RATE_LIMIT_MAX,
            rate_limit_window: DEFAULT_RATE_LIMIT_WINDOW,
        }
    }
}

impl RelayConfig {
    /// `ANTHROPIC_API_KEY`, `PORT`, `FORMS_MODEL`, `FORMS_API_BASE`,
    /// `FORMS_CLIENT_URL`, `FORMS_TRUST_PROXY`, `FORMS_RATE_LIMIT_MAX`,
    /// `FORMS_RATE_LIMIT_WINDOW_SECS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| get(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            bind: defaults.bind,
            port: get("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            api_key: get("ANTHROPIC_API_KEY"),
            model: get("FORMS_MODEL").unwrap_or(defaults.model),
            api_base: get("FORMS_API_BASE").unwrap_or(defaults.api_base),
            client_url: get("FORMS_CLIENT_URL").unwrap_or(defaults.client_url),
            trust_proxy: get("FORMS_TRUST_PROXY")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.trust_proxy),
            rate_limit_max: get("FORMS_RATE_LIMIT_MAX")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.rate_limit_max),
            rate_limit_window: get("FORMS_RATE_LIMIT_WINDOW_SECS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.rate_limit_window),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let cfg = RelayConfig::from_lookup(lookup(&[]));
        assert_eq!(cfg, RelayConfig::default());
        assert_eq!(cfg.port, 3001);
        assert!(cfg.api_key.is_none());
        assert_eq!(cfg.client_url, "http://localhost:3000");
        assert!(!cfg.trust_proxy);
    }

    #[test]
    fn environment_overrides() {
        let cfg = RelayConfig::from_lookup(lookup(&[
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("PORT", "8080"),
            ("FORMS_MODEL", "claude-test"),
            ("FORMS_CLIENT_URL", "https://forms.example"),
            ("FORMS_TRUST_PROXY", "true"),
            ("FORMS_RATE_LIMIT_MAX", "5"),
            ("FORMS_RATE_LIMIT_WINDOW_SECS", "60"),
        ]));
        assert_eq!(cfg.api_key.as_deref(), Some("sk-test"));
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.model, "claude-test");
        assert_eq!(cfg.client_url, "https://forms.example");
        assert!(cfg.trust_proxy);
        assert_eq!(cfg.rate_limit_max, 5);
        assert_eq!(cfg.rate_limit_window, Duration::from_secs(60));
    }

    #[test]
    fn blank_or_invalid_values_fall_back() {
        let cfg = RelayConfig::from_lookup(lookup(&[
            ("ANTHROPIC_API_KEY", "  "),
            ("PORT", "not-a-port"),
            ("FORMS_CLIENT_URL", " "),
            ("FORMS_TRUST_PROXY", "maybe"),
        ]));
        assert!(cfg.api_key.is_none());
        assert_eq!(cfg.client_url, DEFAULT_CLIENT_URL);
        assert!(!cfg.trust_proxy);
        assert_eq!(cfg.port, DEFAULT_PORT);
    }
}
