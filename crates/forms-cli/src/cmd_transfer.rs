//! `forms export` / `forms import`: the whole journal as one JSON file,
//! attachment bytes included.

use std::collections::BTreeMap;
use std::path::{Component, Path};

use anyhow::Context;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use forms_core::now_rfc3339;
use forms_store::{write_atomic, JournalStore, Snapshot};
use serde::{Deserialize, Serialize};

use crate::workspace::Workspace;

const EXPORT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportFile {
    version: u32,
    exported_at: String,
    #[serde(flatten)]
    journal: Snapshot,
    /// Base64 file contents keyed by media id.
    #[serde(default)]
    media_data: BTreeMap<String, String>,
}

/// Write the journal to `out`, or stdout when `out` is `None`.
pub fn export(cwd: &Path, out: Option<&Path>) -> anyhow::Result<()> {
    let ws = Workspace::open(cwd)?;
    let journal = ws.store.snapshot()?;

    let mut media_data = BTreeMap::new();
    for item in &journal.media {
        match std::fs::read(ws.media_file(item)) {
            Ok(bytes) => {
                media_data.insert(item.id.clone(), BASE64.encode(bytes));
            }
            Err(e) => {
                tracing::warn!(media = %item.id, error = %e, "media file missing; exporting record only")
            }
        }
    }

    let file = ExportFile {
        version: EXPORT_VERSION,
        exported_at: now_rfc3339(),
        journal,
        media_data,
    };
    let json = serde_json::to_string_pretty(&file)?;
    match out {
        Some(path) => {
            write_atomic(path, json.as_bytes())?;
            println!(
                "Exported {} projects, {} entries, {} images to {}",
                file.journal.projects.len(),
                file.journal.entries.len(),
                file.journal.media.len(),
                path.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Replace the journal with the contents of an export file. Refuses to
/// overwrite a non-empty journal unless `force` is set.
pub fn import(cwd: &Path, input: &Path, force: bool) -> anyhow::Result<()> {
    let ws = Workspace::open(cwd)?;
    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("cannot read {}", input.display()))?;
    let file: ExportFile = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a forms export", input.display()))?;
    if file.version != EXPORT_VERSION {
        anyhow::bail!("unsupported export version {}", file.version);
    }

    let mut payloads = Vec::with_capacity(file.journal.media.len());
    for item in &file.journal.media {
        if !is_media_path(&item.path) {
            anyhow::bail!("media {} has an invalid path '{}'", item.id, item.path);
        }
        let bytes = match file.media_data.get(&item.id) {
            Some(data) => Some(
                BASE64
                    .decode(data)
                    .with_context(|| format!("media {} is not valid base64", item.id))?,
            ),
            None => None,
        };
        payloads.push((item, bytes));
    }

    if !force && !ws.store.projects()?.is_empty() {
        anyhow::bail!("journal is not empty; pass --force to replace it");
    }

    let previous = ws.store.snapshot()?.media;
    ws.store.restore(&file.journal)?;
    ws.remove_media_files(&previous);
    for (item, bytes) in payloads {
        match bytes {
            Some(bytes) => write_atomic(&ws.media_file(item), &bytes)?,
            None => tracing::warn!(media = %item.id, "no data for media item"),
        }
    }

    println!(
        "Imported {} projects, {} entries, {} images",
        file.journal.projects.len(),
        file.journal.entries.len(),
        file.journal.media.len()
    );
    Ok(())
}

/// `media/<file>` with no other components.
fn is_media_path(path: &str) -> bool {
    let mut parts = Path::new(path).components();
    matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(Component::Normal(dir)), Some(Component::Normal(_)), None) if dir == "media"
    )
}
