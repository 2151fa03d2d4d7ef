use std::path::Path;

use forms_store::{write_atomic, FormsPaths, SqliteStore};
use forms_summary::{CoordinatorConfig, DEFAULT_RELAY_URL};

pub fn execute(cwd: &Path) -> anyhow::Result<()> {
    let paths = FormsPaths::discover(cwd);

    if paths.is_initialized() {
        // Make sure the schema exists even if .forms/ was created by hand
        SqliteStore::open_or_create(&paths.db_path)?;
        println!("Already initialized at {}", paths.forms_dir.display());
        return Ok(());
    }

    paths.ensure_layout()?;
    SqliteStore::open_or_create(&paths.db_path)?;

    if !paths.config_json.exists() {
        let config = serde_json::json!({
            "relay_url": DEFAULT_RELAY_URL,
            "summary": CoordinatorConfig::default(),
        });
        let json = serde_json::to_string_pretty(&config)?;
        write_atomic(&paths.config_json, json.as_bytes())?;
    }

    println!("Initialized forms workspace at {}", paths.forms_dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_creates_layout_and_default_config() {
        let tmp = tempfile::tempdir().unwrap();
        execute(tmp.path()).unwrap();

        let paths = FormsPaths::discover(tmp.path());
        assert!(paths.is_initialized());
        assert!(paths.db_path.exists());
        assert_eq!(
            CoordinatorConfig::load(&paths.config_json),
            CoordinatorConfig::default()
        );
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&paths.config_json).unwrap()).unwrap();
        assert_eq!(raw["relay_url"], DEFAULT_RELAY_URL);
    }

    #[test]
    fn init_is_idempotent_and_keeps_config() {
        let tmp = tempfile::tempdir().unwrap();
        execute(tmp.path()).unwrap();
        let paths = FormsPaths::discover(tmp.path());
        std::fs::write(&paths.config_json, r#"{"summary": {"debounce_ms": 10}}"#).unwrap();

        execute(tmp.path()).unwrap();
        assert_eq!(CoordinatorConfig::load(&paths.config_json).debounce_ms, 10);
    }
}
