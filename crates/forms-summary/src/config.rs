use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_RELAY_URL: &str = "http://localhost:3001";

/// Timing knobs for the coordinator, stored in `.forms/config.json` under key `summary`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Quiet period before a scheduled generation fires.
    pub debounce_ms: u64,
    /// Delay between consecutive project starts in a warm-up pass.
    pub stagger_ms: u64,
    pub poll_interval_ms: u64,
    pub poll_timeout_ms: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            stagger_ms: 200,
            poll_interval_ms: 500,
            poll_timeout_ms: 15_000,
        }
    }
}

impl CoordinatorConfig {
    /// Load from `.forms/config.json` key `summary`.
    /// Returns defaults if the file or key is missing or unparseable.
    pub fn load(config_json: &Path) -> Self {
        read_key(config_json, "summary")
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn stagger(&self) -> Duration {
        Duration::from_millis(self.stagger_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }
}

/// Relay base URL: `FORMS_RELAY_URL` if set, else `relay_url` in config.json,
/// else [`DEFAULT_RELAY_URL`].
pub fn relay_url(config_json: &Path) -> String {
    resolve_relay_url(std::env::var("FORMS_RELAY_URL").ok(), config_json)
}

fn resolve_relay_url(env_value: Option<String>, config_json: &Path) -> String {
    if let Some(url) = env_value.filter(|u| !u.trim().is_empty()) {
        return url;
    }
    read_key(config_json, "relay_url")
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| DEFAULT_RELAY_URL.to_string())
}

fn read_key(config_json: &Path, key: &str) -> Option<serde_json::Value> {
    let content = std::fs::read_to_string(config_json).ok()?;
    let val: serde_json::Value = serde_json::from_str(&content).ok()?;
    val.get(key).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = CoordinatorConfig::load(&tmp.path().join("config.json"));
        assert_eq!(cfg, CoordinatorConfig::default());
        assert_eq!(cfg.debounce(), Duration::from_millis(500));
        assert_eq!(cfg.stagger(), Duration::from_millis(200));
    }

    #[test]
    fn partial_summary_section_keeps_other_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, r#"{"summary": {"debounce_ms": 50}}"#).unwrap();
        let cfg = CoordinatorConfig::load(&path);
        assert_eq!(cfg.debounce_ms, 50);
        assert_eq!(cfg.stagger_ms, 200);
        assert_eq!(cfg.poll_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn garbage_config_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert_eq!(CoordinatorConfig::load(&path), CoordinatorConfig::default());
    }

    #[test]
    fn relay_url_precedence() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        assert_eq!(resolve_relay_url(None, &path), DEFAULT_RELAY_URL);

        std::fs::write(&path, r#"{"relay_url": "http://relay.local:8080"}"#).unwrap();
        assert_eq!(resolve_relay_url(None, &path), "http://relay.local:8080");
        assert_eq!(
            resolve_relay_url(Some("http://env:1".into()), &path),
            "http://env:1"
        );
        assert_eq!(
            resolve_relay_url(Some("  ".into()), &path),
            "http://relay.local:8080"
        );
    }
}
