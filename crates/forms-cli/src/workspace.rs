use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use forms_core::{MediaItem, Project};
use forms_store::{FormsPaths, JournalStore, SqliteStore};
use forms_summary::{CoordinatorConfig, RelayClient, SummaryCoordinator};

/// An opened `.forms/` workspace.
pub struct Workspace {
    pub paths: FormsPaths,
    pub store: Arc<SqliteStore>,
}

impl Workspace {
    /// Find the nearest `.forms/` at or above `cwd` and open its store.
    pub fn open(cwd: &Path) -> anyhow::Result<Self> {
        let root = FormsPaths::find_root(cwd)
            .context("not a forms workspace (run `forms init` first)")?;
        let paths = FormsPaths::discover(root);
        let store = SqliteStore::open_or_create(&paths.db_path)?;
        Ok(Self {
            paths,
            store: Arc::new(store),
        })
    }

    /// Coordinator wired to this store and the configured relay.
    pub fn coordinator(&self) -> anyhow::Result<SummaryCoordinator> {
        let config = CoordinatorConfig::load(&self.paths.config_json);
        let relay = RelayClient::new(&forms_summary::relay_url(&self.paths.config_json))?;
        tracing::debug!(relay = relay.base_url(), "summary relay");
        Ok(SummaryCoordinator::new(
            self.store.clone(),
            Arc::new(relay),
            config,
        ))
    }

    /// Absolute location of an attachment's bytes.
    pub fn media_file(&self, item: &MediaItem) -> std::path::PathBuf {
        self.paths.forms_dir.join(&item.path)
    }

    /// Best-effort removal of attachment files whose records are gone.
    pub fn remove_media_files(&self, items: &[MediaItem]) {
        for item in items {
            let path = self.media_file(item);
            if let Err(e) = std::fs::remove_file(&path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %path.display(), error = %e, "failed to remove media file");
                }
            }
        }
    }

    /// Resolve a project by exact id, else by unique case-insensitive name.
    pub fn project(&self, id_or_name: &str) -> anyhow::Result<Project> {
        if let Some(p) = self.store.project(id_or_name)? {
            return Ok(p);
        }
        let wanted = id_or_name.trim().to_lowercase();
        let mut matches: Vec<Project> = self
            .store
            .projects()?
            .into_iter()
            .filter(|p| p.name.to_lowercase() == wanted)
            .collect();
        match matches.len() {
            0 => anyhow::bail!("no project with id or name '{id_or_name}'"),
            1 => Ok(matches.remove(0)),
            n => anyhow::bail!("{n} projects are named '{id_or_name}'; use the project id"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init(dir: &Path) -> Workspace {
        FormsPaths::discover(dir).ensure_layout().unwrap();
        Workspace::open(dir).unwrap()
    }

    #[test]
    fn open_requires_init() {
        let tmp = tempfile::tempdir().unwrap();
        let err = Workspace::open(tmp.path()).err().unwrap();
        assert!(err.to_string().contains("forms init"));
    }

    #[test]
    fn open_finds_workspace_from_subdirectory() {
        let tmp = tempfile::tempdir().unwrap();
        init(tmp.path());
        let nested = tmp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        let ws = Workspace::open(&nested).unwrap();
        assert_eq!(ws.paths.root, tmp.path());
    }

    #[test]
    fn project_resolves_by_id_or_name() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = init(tmp.path());
        let p = Project::new("Pottery");
        ws.store.create_project(&p).unwrap();

        assert_eq!(ws.project(&p.id).unwrap().id, p.id);
        assert_eq!(ws.project("pottery").unwrap().id, p.id);
        assert!(ws.project("Weaving").is_err());

        ws.store.create_project(&Project::new("POTTERY")).unwrap();
        let err = ws.project("pottery").unwrap_err();
        assert!(err.to_string().contains("use the project id"));
        assert_eq!(ws.project(&p.id).unwrap().name, "Pottery");
    }
}
