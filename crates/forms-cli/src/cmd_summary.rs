use std::path::Path;

use forms_store::JournalStore;

use crate::workspace::Workspace;

pub fn show(cwd: &Path, project: &str, cached_only: bool) -> anyhow::Result<()> {
    let ws = Workspace::open(cwd)?;
    let target = ws.project(project)?;
    let coordinator = ws.coordinator()?;

    let summary = if cached_only {
        coordinator.lookup(&target.id)?
    } else {
        tokio::runtime::Runtime::new()?.block_on(coordinator.get_or_generate(&target.id))?
    };

    match summary {
        Some(text) => println!("{text}"),
        None if ws.store.entries(&target.id)?.is_empty() => {
            println!("\"{}\" has no entries to summarize.", target.name)
        }
        None if cached_only => println!("No current summary for \"{}\".", target.name),
        None => println!(
            "Summary for \"{}\" is unavailable right now; try again later.",
            target.name
        ),
    }
    Ok(())
}

pub fn warm(cwd: &Path) -> anyhow::Result<()> {
    let ws = Workspace::open(cwd)?;
    let coordinator = ws.coordinator()?;
    let report = tokio::runtime::Runtime::new()?.block_on(coordinator.warm_all())?;
    if report.skipped {
        println!("A warm-up pass is already running.");
    } else if report.scheduled == 0 {
        println!("All summaries are current.");
    } else {
        println!(
            "Generated {} of {} summaries.",
            report.generated, report.scheduled
        );
    }
    Ok(())
}

pub fn status(cwd: &Path, project: Option<&str>, json: bool) -> anyhow::Result<()> {
    let ws = Workspace::open(cwd)?;
    let coordinator = ws.coordinator()?;
    let projects = match project {
        Some(p) => vec![ws.project(p)?],
        None => ws.store.projects()?,
    };

    let mut rows = Vec::with_capacity(projects.len());
    for p in projects {
        let status = coordinator.status(&p.id)?;
        let last_updated = ws.store.summary(&p.id)?.map(|r| r.last_updated);
        rows.push((p, status, last_updated));
    }

    if json {
        let out: Vec<serde_json::Value> = rows
            .iter()
            .map(|(p, status, last_updated)| {
                serde_json::json!({
                    "id": p.id,
                    "name": p.name,
                    "status": status,
                    "lastUpdated": last_updated,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for (p, status, last_updated) in rows {
        let state = match (status.has_cached, last_updated) {
            (true, Some(ts)) => format!("current (generated {ts})"),
            (false, Some(ts)) => format!("stale (generated {ts})"),
            _ => "none".to_string(),
        };
        println!("{}  {}  summary: {state}", p.id, p.name);
    }
    Ok(())
}

pub fn clear(cwd: &Path, project: Option<&str>, all: bool) -> anyhow::Result<()> {
    let ws = Workspace::open(cwd)?;
    let coordinator = ws.coordinator()?;
    match (project, all) {
        (_, true) => {
            let removed = coordinator.clear_all_caches()?;
            println!("Cleared {removed} cached summaries.");
        }
        (Some(p), false) => {
            let target = ws.project(p)?;
            if coordinator.clear_cache(&target.id)? {
                println!("Cleared summary for \"{}\".", target.name);
            } else {
                println!("\"{}\" had no cached summary.", target.name);
            }
        }
        (None, false) => anyhow::bail!("name a project or pass --all"),
    }
    Ok(())
}
