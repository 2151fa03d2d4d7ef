use std::path::Path;

use anyhow::Context;
use forms_core::{validate, Entry, MediaItem};
use forms_store::JournalStore;
use time::macros::format_description;

use crate::workspace::Workspace;

fn today() -> anyhow::Result<String> {
    let fmt = format_description!("[year]-[month]-[day]");
    Ok(time::OffsetDateTime::now_utc().date().format(&fmt)?)
}

/// Write the project's reflection for a day. A project keeps one entry per
/// date, so an existing entry for that day is rewritten in place.
pub fn add(
    cwd: &Path,
    project: &str,
    reflection: &str,
    date: Option<&str>,
    summarize: bool,
) -> anyhow::Result<()> {
    let ws = Workspace::open(cwd)?;
    let target = ws.project(project)?;
    let reflection = validate::reflection(reflection)?;
    let date = match date {
        Some(d) => validate::entry_date(d)?.to_string(),
        None => today()?,
    };

    match ws.store.entry_by_date(&target.id, &date)? {
        Some(mut existing) => {
            existing.edit(reflection);
            ws.store.put_entry(&existing)?;
            println!(
                "Updated entry {} in \"{}\" for {date}",
                existing.id, target.name
            );
        }
        None => {
            let entry = Entry::new(&target.id, &date, reflection);
            ws.store.put_entry(&entry)?;
            println!("Added entry {} to \"{}\" for {date}", entry.id, target.name);
        }
    }

    if summarize {
        refresh_summary(&ws, &target.id)?;
    }
    Ok(())
}

pub fn edit(
    cwd: &Path,
    id: &str,
    reflection: &str,
    date: Option<&str>,
    summarize: bool,
) -> anyhow::Result<()> {
    let ws = Workspace::open(cwd)?;
    let mut entry = find_entry(&ws, id)?;
    if let Some(d) = date {
        entry.date = validate::entry_date(d)?.to_string();
    }
    entry.edit(validate::reflection(reflection)?);
    ws.store.put_entry(&entry)?;
    println!("Updated entry {}", entry.id);

    if summarize {
        refresh_summary(&ws, &entry.project_id)?;
    }
    Ok(())
}

pub fn rm(cwd: &Path, id: &str) -> anyhow::Result<()> {
    let ws = Workspace::open(cwd)?;
    let media = ws.store.media_for_entry(id)?;
    if !ws.store.delete_entry(id)? {
        anyhow::bail!("no entry with id '{id}'");
    }
    ws.remove_media_files(&media);
    println!("Deleted entry {id}");
    Ok(())
}

pub fn list(cwd: &Path, project: &str, json: bool) -> anyhow::Result<()> {
    let ws = Workspace::open(cwd)?;
    let target = ws.project(project)?;
    let entries = ws.store.entries(&target.id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    if entries.is_empty() {
        println!("\"{}\" has no entries yet.", target.name);
        return Ok(());
    }
    for (i, e) in entries.iter().enumerate() {
        let images = ws.store.media_for_entry(&e.id)?.len();
        let suffix = match images {
            0 => String::new(),
            1 => "  [1 image]".to_string(),
            n => format!("  [{n} images]"),
        };
        println!("Day {} ({})  {}{suffix}", i + 1, e.date, e.id);
        println!("    {}", e.reflection);
    }
    Ok(())
}

// ── Media ──

/// Copy an image into `.forms/media/` and record it against the entry.
pub fn attach(cwd: &Path, id: &str, file: &Path) -> anyhow::Result<()> {
    let ws = Workspace::open(cwd)?;
    let entry = find_entry(&ws, id)?;
    if ws.store.media_for_entry(&entry.id)?.len() >= validate::MAX_IMAGES_PER_ENTRY {
        return Err(validate::ValidationError::TooManyImages.into());
    }

    let file_name = file
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("not a file name: {}", file.display()))?;
    let size = std::fs::metadata(file)
        .with_context(|| format!("cannot read {}", file.display()))?
        .len();
    let mime_type = validate::image_file(file_name, size)?;

    let item = MediaItem::new(&entry.id, file_name, size, mime_type);
    let dest = ws.media_file(&item);
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(file, &dest).with_context(|| format!("cannot copy {}", file.display()))?;
    if let Err(e) = ws.store.save_media(&item) {
        ws.remove_media_files(std::slice::from_ref(&item));
        return Err(e.into());
    }
    println!("Attached {} to entry {} as {}", item.file_name, entry.id, item.id);
    Ok(())
}

pub fn media(cwd: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let ws = Workspace::open(cwd)?;
    let entry = find_entry(&ws, id)?;
    let items = ws.store.media_for_entry(&entry.id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }
    if items.is_empty() {
        println!("Entry {} has no images.", entry.id);
        return Ok(());
    }
    for item in &items {
        println!(
            "{}  {}  {}  {} bytes  {}",
            item.id,
            item.file_name,
            item.mime_type,
            item.file_size,
            ws.media_file(item).display()
        );
    }
    Ok(())
}

pub fn detach(cwd: &Path, media_id: &str) -> anyhow::Result<()> {
    let ws = Workspace::open(cwd)?;
    let item = ws
        .store
        .delete_media(media_id)?
        .with_context(|| format!("no image with id '{media_id}'"))?;
    ws.remove_media_files(std::slice::from_ref(&item));
    println!("Removed {} from entry {}", item.file_name, item.entry_id);
    Ok(())
}

fn find_entry(ws: &Workspace, id: &str) -> anyhow::Result<Entry> {
    ws.store
        .entry(id)?
        .with_context(|| format!("no entry with id '{id}'"))
}

fn refresh_summary(ws: &Workspace, project_id: &str) -> anyhow::Result<()> {
    let coordinator = ws.coordinator()?;
    let summary = tokio::runtime::Runtime::new()?.block_on(coordinator.generate_now(project_id))?;
    match summary {
        Some(text) => println!("Summary: {text}"),
        None => println!("Summary unavailable right now; try `forms summary show` later."),
    }
    Ok(())
}
