use std::path::Path;

use forms_core::{validate, Project};
use forms_store::JournalStore;

use crate::workspace::Workspace;

pub fn add(cwd: &Path, name: &str) -> anyhow::Result<()> {
    let ws = Workspace::open(cwd)?;
    let name = validate::project_name(name)?;
    let project = Project::new(name);
    ws.store.create_project(&project)?;
    println!("Created project \"{}\" ({})", project.name, project.id);
    Ok(())
}

/// Active projects, or every project when `all` is set.
pub fn list(cwd: &Path, all: bool, json: bool) -> anyhow::Result<()> {
    let ws = Workspace::open(cwd)?;
    let coordinator = ws.coordinator()?;
    let projects: Vec<Project> = ws
        .store
        .projects()?
        .into_iter()
        .filter(|p| all || p.is_active)
        .collect();

    let mut rows = Vec::with_capacity(projects.len());
    for project in &projects {
        let entries = ws.store.entries(&project.id)?.len();
        let cached = coordinator.lookup(&project.id)?.is_some();
        rows.push((project, entries, cached));
    }

    if json {
        let out: Vec<serde_json::Value> = rows
            .iter()
            .map(|(p, entries, cached)| {
                serde_json::json!({
                    "id": p.id,
                    "name": p.name,
                    "createdAt": p.created_at,
                    "updatedAt": p.updated_at,
                    "isActive": p.is_active,
                    "entryCount": entries,
                    "hasSummary": cached,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No projects. Create one with `forms project add <name>`.");
        return Ok(());
    }
    for (p, entries, cached) in rows {
        let summary = if cached { "summary cached" } else { "no summary" };
        let archived = if p.is_active { "" } else { "  [archived]" };
        println!(
            "{}  {}  ({entries} entries, {summary}){archived}",
            p.id, p.name
        );
    }
    Ok(())
}

pub fn rename(cwd: &Path, project: &str, name: &str) -> anyhow::Result<()> {
    let ws = Workspace::open(cwd)?;
    let target = ws.project(project)?;
    let name = validate::project_name(name)?;
    ws.store.rename_project(&target.id, name)?;
    println!("Renamed \"{}\" to \"{name}\"", target.name);
    Ok(())
}

/// Hide a project from `list` (`active = false`) or bring it back.
pub fn set_active(cwd: &Path, project: &str, active: bool) -> anyhow::Result<()> {
    let ws = Workspace::open(cwd)?;
    let target = ws.project(project)?;
    ws.store.set_project_active(&target.id, active)?;
    let verb = if active { "Restored" } else { "Archived" };
    println!("{verb} \"{}\"", target.name);
    Ok(())
}

pub fn rm(cwd: &Path, project: &str) -> anyhow::Result<()> {
    let ws = Workspace::open(cwd)?;
    let target = ws.project(project)?;
    let media = ws.store.media_for_project(&target.id)?;
    if ws.store.delete_project(&target.id)? {
        ws.remove_media_files(&media);
        println!("Deleted project \"{}\" ({})", target.name, target.id);
    }
    Ok(())
}
