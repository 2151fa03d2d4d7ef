//! SQLite-backed journal store.
//!
//! One `forms.db` file in WAL mode holding projects, entries, media
//! records, and the per-project summary cache.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use forms_core::{now_rfc3339, Entry, MediaItem, Project, SummaryRecord};
use rusqlite::{params, Connection, OptionalExtension};

use crate::{JournalStore, Result, Snapshot, StoreError};

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS projects (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE
);

CREATE TABLE IF NOT EXISTS entries (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    date TEXT NOT NULL,
    reflection TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_entries_project_date ON entries(project_id, date);

CREATE TABLE IF NOT EXISTS media (
    id TEXT PRIMARY KEY,
    entry_id TEXT NOT NULL REFERENCES entries(id) ON DELETE CASCADE,
    file_name TEXT NOT NULL,
    file_size INTEGER NOT NULL,
    mime_type TEXT NOT NULL,
    path TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_media_entry ON media(entry_id, created_at);

CREATE TABLE IF NOT EXISTS summaries (
    project_id TEXT PRIMARY KEY REFERENCES projects(id) ON DELETE CASCADE,
    summary TEXT NOT NULL,
    fingerprint TEXT NOT NULL,
    last_updated TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create `forms.db` with full schema.
    pub fn open_or_create(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(db_path)?;
        tracing::debug!(path = %db_path.display(), "opened journal store");
        Self::init(conn)
    }

    /// In-memory database, same schema.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;
        conn.execute_batch(SCHEMA_SQL)?;
        conn.execute(
            "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('version', '1')",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub(crate) fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("connection lock poisoned".into()))
    }

    // ── Projects ────────────────────────────────────────────────────

    pub fn create_project(&self, project: &Project) -> Result<()> {
        self.conn()?.execute(
            "INSERT INTO projects (id, name, created_at, updated_at, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                project.id,
                project.name,
                project.created_at,
                project.updated_at,
                project.is_active
            ],
        )?;
        Ok(())
    }

    pub fn rename_project(&self, project_id: &str, name: &str) -> Result<()> {
        let changed = self.conn()?.execute(
            "UPDATE projects SET name = ?2, updated_at = ?3 WHERE id = ?1",
            params![project_id, name, now_rfc3339()],
        )?;
        if changed == 0 {
            return Err(not_found("project", project_id));
        }
        Ok(())
    }

    /// Archive (`false`) or restore (`true`) a project.
    pub fn set_project_active(&self, project_id: &str, active: bool) -> Result<()> {
        let changed = self.conn()?.execute(
            "UPDATE projects SET is_active = ?2, updated_at = ?3 WHERE id = ?1",
            params![project_id, active, now_rfc3339()],
        )?;
        if changed == 0 {
            return Err(not_found("project", project_id));
        }
        Ok(())
    }

    /// Delete a project together with its entries and cached summary.
    pub fn delete_project(&self, project_id: &str) -> Result<bool> {
        let changed = self
            .conn()?
            .execute("DELETE FROM projects WHERE id = ?1", params![project_id])?;
        Ok(changed > 0)
    }

    // ── Entries ─────────────────────────────────────────────────────

    /// Insert the entry, or overwrite date/reflection/updated_at if it exists.
    /// Either way the owning project's `updated_at` moves forward.
    ///
    /// A project holds one entry per date; saving a second entry on an
    /// occupied date fails with `StoreError::DateTaken`.
    pub fn put_entry(&self, entry: &Entry) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let exists: Option<String> = tx
            .query_row(
                "SELECT id FROM projects WHERE id = ?1",
                params![entry.project_id],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_none() {
            return Err(not_found("project", &entry.project_id));
        }
        let taken: Option<String> = tx
            .query_row(
                "SELECT id FROM entries WHERE project_id = ?1 AND date = ?2 AND id != ?3",
                params![entry.project_id, entry.date, entry.id],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(existing) = taken {
            return Err(StoreError::DateTaken {
                date: entry.date.clone(),
                existing,
            });
        }
        tx.execute(
            "INSERT INTO entries (id, project_id, date, reflection, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                date = excluded.date,
                reflection = excluded.reflection,
                updated_at = excluded.updated_at",
            params![
                entry.id,
                entry.project_id,
                entry.date,
                entry.reflection,
                entry.created_at,
                entry.updated_at
            ],
        )?;
        touch_project(&tx, &entry.project_id)?;
        tx.commit()?;
        Ok(())
    }

    pub fn entry_by_date(&self, project_id: &str, date: &str) -> Result<Option<Entry>> {
        let entry = self
            .conn()?
            .query_row(
                "SELECT id, project_id, date, reflection, created_at, updated_at
                 FROM entries WHERE project_id = ?1 AND date = ?2",
                params![project_id, date],
                row_to_entry,
            )
            .optional()?;
        Ok(entry)
    }

    pub fn entry(&self, entry_id: &str) -> Result<Option<Entry>> {
        let entry = self
            .conn()?
            .query_row(
                "SELECT id, project_id, date, reflection, created_at, updated_at
                 FROM entries WHERE id = ?1",
                params![entry_id],
                row_to_entry,
            )
            .optional()?;
        Ok(entry)
    }

    /// Delete an entry and its media records.
    pub fn delete_entry(&self, entry_id: &str) -> Result<bool> {
        let changed = self
            .conn()?
            .execute("DELETE FROM entries WHERE id = ?1", params![entry_id])?;
        Ok(changed > 0)
    }

    // ── Media ───────────────────────────────────────────────────────

    /// Record an attachment. The caller has already placed the file at
    /// `item.path`.
    pub fn save_media(&self, item: &MediaItem) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let project_id: Option<String> = tx
            .query_row(
                "SELECT project_id FROM entries WHERE id = ?1",
                params![item.entry_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(project_id) = project_id else {
            return Err(not_found("entry", &item.entry_id));
        };
        tx.execute(
            "INSERT INTO media (id, entry_id, file_name, file_size, mime_type, path, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                item.id,
                item.entry_id,
                item.file_name,
                item.file_size as i64,
                item.mime_type,
                item.path,
                item.created_at
            ],
        )?;
        touch_project(&tx, &project_id)?;
        tx.commit()?;
        Ok(())
    }

    /// Attachments of one entry, oldest first.
    pub fn media_for_entry(&self, entry_id: &str) -> Result<Vec<MediaItem>> {
        self.query_media(
            "SELECT id, entry_id, file_name, file_size, mime_type, path, created_at
             FROM media WHERE entry_id = ?1 ORDER BY created_at, id",
            entry_id,
        )
    }

    /// Attachments of every entry in a project.
    pub fn media_for_project(&self, project_id: &str) -> Result<Vec<MediaItem>> {
        self.query_media(
            "SELECT m.id, m.entry_id, m.file_name, m.file_size, m.mime_type, m.path, m.created_at
             FROM media m JOIN entries e ON e.id = m.entry_id
             WHERE e.project_id = ?1 ORDER BY m.created_at, m.id",
            project_id,
        )
    }

    /// Remove one attachment record, returning it so the caller can drop
    /// the file.
    pub fn delete_media(&self, media_id: &str) -> Result<Option<MediaItem>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let item = tx
            .query_row(
                "SELECT id, entry_id, file_name, file_size, mime_type, path, created_at
                 FROM media WHERE id = ?1",
                params![media_id],
                row_to_media,
            )
            .optional()?;
        let Some(item) = item else {
            return Ok(None);
        };
        tx.execute("DELETE FROM media WHERE id = ?1", params![media_id])?;
        tx.execute(
            "UPDATE projects SET updated_at = ?2
             WHERE id = (SELECT project_id FROM entries WHERE id = ?1)",
            params![item.entry_id, now_rfc3339()],
        )?;
        tx.commit()?;
        Ok(Some(item))
    }

    fn query_media(&self, sql: &str, key: &str) -> Result<Vec<MediaItem>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let items = stmt
            .query_map(params![key], row_to_media)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(items)
    }

    // ── Snapshot ────────────────────────────────────────────────────

    /// Every row in the journal.
    pub fn snapshot(&self) -> Result<Snapshot> {
        let projects = self.projects()?;
        let mut entries = Vec::new();
        let mut media = Vec::new();
        for p in &projects {
            entries.extend(self.entries(&p.id)?);
            media.extend(self.media_for_project(&p.id)?);
        }
        Ok(Snapshot {
            projects,
            entries,
            media,
            summaries: self.summaries()?,
        })
    }

    /// Replace the whole journal with `snapshot`. Nothing changes if any
    /// row is rejected.
    pub fn restore(&self, snapshot: &Snapshot) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute_batch(
            "DELETE FROM media; DELETE FROM summaries; DELETE FROM entries; DELETE FROM projects;",
        )?;
        for p in &snapshot.projects {
            tx.execute(
                "INSERT INTO projects (id, name, created_at, updated_at, is_active)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![p.id, p.name, p.created_at, p.updated_at, p.is_active],
            )?;
        }
        for e in &snapshot.entries {
            tx.execute(
                "INSERT INTO entries (id, project_id, date, reflection, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![e.id, e.project_id, e.date, e.reflection, e.created_at, e.updated_at],
            )
            .map_err(|err| missing_parent(err, "project", &e.project_id))?;
        }
        for m in &snapshot.media {
            tx.execute(
                "INSERT INTO media (id, entry_id, file_name, file_size, mime_type, path, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    m.id,
                    m.entry_id,
                    m.file_name,
                    m.file_size as i64,
                    m.mime_type,
                    m.path,
                    m.created_at
                ],
            )
            .map_err(|err| missing_parent(err, "entry", &m.entry_id))?;
        }
        for r in &snapshot.summaries {
            tx.execute(
                "INSERT INTO summaries (project_id, summary, fingerprint, last_updated)
                 VALUES (?1, ?2, ?3, ?4)",
                params![r.project_id, r.summary, r.fingerprint, r.last_updated],
            )
            .map_err(|err| missing_parent(err, "project", &r.project_id))?;
        }
        tx.commit()?;
        tracing::info!(
            projects = snapshot.projects.len(),
            entries = snapshot.entries.len(),
            media = snapshot.media.len(),
            "journal restored"
        );
        Ok(())
    }
}

fn touch_project(conn: &Connection, project_id: &str) -> Result<()> {
    conn.execute(
        "UPDATE projects SET updated_at = ?2 WHERE id = ?1",
        params![project_id, now_rfc3339()],
    )?;
    Ok(())
}

/// Foreign-key failures become `NotFound` for the referenced row.
fn missing_parent(err: rusqlite::Error, kind: &'static str, id: &str) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
        {
            not_found(kind, id)
        }
        _ => StoreError::Sqlite(err),
    }
}

fn not_found(kind: &'static str, id: &str) -> StoreError {
    StoreError::NotFound {
        kind,
        id: id.to_string(),
    }
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<Entry> {
    Ok(Entry {
        id: row.get(0)?,
        project_id: row.get(1)?,
        date: row.get(2)?,
        reflection: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn row_to_media(row: &rusqlite::Row<'_>) -> rusqlite::Result<MediaItem> {
    Ok(MediaItem {
        id: row.get(0)?,
        entry_id: row.get(1)?,
        file_name: row.get(2)?,
        file_size: row.get::<_, i64>(3)? as u64,
        mime_type: row.get(4)?,
        path: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn row_to_summary(row: &rusqlite::Row<'_>) -> rusqlite::Result<SummaryRecord> {
    Ok(SummaryRecord {
        project_id: row.get(0)?,
        summary: row.get(1)?,
        fingerprint: row.get(2)?,
        last_updated: row.get(3)?,
    })
}

impl JournalStore for SqliteStore {
    fn projects(&self) -> Result<Vec<Project>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, created_at, updated_at, is_active
             FROM projects ORDER BY created_at, id",
        )?;
        let projects = stmt
            .query_map([], |row| {
                Ok(Project {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    created_at: row.get(2)?,
                    updated_at: row.get(3)?,
                    is_active: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(projects)
    }

    fn entries(&self, project_id: &str) -> Result<Vec<Entry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, project_id, date, reflection, created_at, updated_at
             FROM entries WHERE project_id = ?1 ORDER BY date, created_at",
        )?;
        let entries = stmt
            .query_map(params![project_id], row_to_entry)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    fn summary(&self, project_id: &str) -> Result<Option<SummaryRecord>> {
        let record = self
            .conn()?
            .query_row(
                "SELECT project_id, summary, fingerprint, last_updated
                 FROM summaries WHERE project_id = ?1",
                params![project_id],
                row_to_summary,
            )
            .optional()?;
        Ok(record)
    }

    fn save_summary(&self, record: &SummaryRecord) -> Result<()> {
        self.conn()?.execute(
            "INSERT OR REPLACE INTO summaries (project_id, summary, fingerprint, last_updated)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                record.project_id,
                record.summary,
                record.fingerprint,
                record.last_updated
            ],
        )?;
        Ok(())
    }

    fn delete_summary(&self, project_id: &str) -> Result<bool> {
        let changed = self.conn()?.execute(
            "DELETE FROM summaries WHERE project_id = ?1",
            params![project_id],
        )?;
        Ok(changed > 0)
    }

    fn summaries(&self) -> Result<Vec<SummaryRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT project_id, summary, fingerprint, last_updated
             FROM summaries ORDER BY project_id",
        )?;
        let records = stmt
            .query_map([], row_to_summary)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_store() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open_or_create(&dir.path().join("forms.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn project_and_entries_round_trip() {
        let (_dir, store) = tmp_store();
        let project = Project::new("Pottery");
        store.create_project(&project).unwrap();

        let late = Entry::new(&project.id, "2026-03-05", "trimmed feet");
        let early = Entry::new(&project.id, "2026-03-01", "wedged clay");
        store.put_entry(&late).unwrap();
        store.put_entry(&early).unwrap();

        let entries = store.entries(&project.id).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].date, "2026-03-01");
        assert_eq!(entries[1].reflection, "trimmed feet");
        assert_eq!(store.project(&project.id).unwrap().unwrap().name, "Pottery");
    }

    #[test]
    fn put_entry_updates_existing_and_changes_fingerprint() {
        let (_dir, store) = tmp_store();
        let project = Project::new("Sketchbook");
        store.create_project(&project).unwrap();
        let mut entry = Entry::new(&project.id, "2026-03-01", "hands");
        entry.updated_at = "2026-03-01T10:00:00Z".into();
        store.put_entry(&entry).unwrap();
        let before = store.fingerprint(&project.id).unwrap();

        entry.edit("hands, again");
        store.put_entry(&entry).unwrap();

        assert_eq!(store.entries(&project.id).unwrap().len(), 1);
        assert_eq!(
            store.entry(&entry.id).unwrap().unwrap().reflection,
            "hands, again"
        );
        assert_ne!(before, store.fingerprint(&project.id).unwrap());
    }

    #[test]
    fn put_entry_for_unknown_project_is_not_found() {
        let (_dir, store) = tmp_store();
        let entry = Entry::new("prj_missing", "2026-03-01", "orphan");
        let err = store.put_entry(&entry).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { kind: "project", .. }));
    }

    #[test]
    fn summary_upsert_keeps_one_record_per_project() {
        let (_dir, store) = tmp_store();
        let project = Project::new("Garden");
        store.create_project(&project).unwrap();

        store
            .save_summary(&SummaryRecord::new(&project.id, "first", "fp1"))
            .unwrap();
        store
            .save_summary(&SummaryRecord::new(&project.id, "second", "fp2"))
            .unwrap();

        let all = store.summaries().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].summary, "second");
        assert!(store.delete_summary(&project.id).unwrap());
        assert!(!store.delete_summary(&project.id).unwrap());
        assert!(store.summary(&project.id).unwrap().is_none());
    }

    #[test]
    fn delete_project_cascades() {
        let (_dir, store) = tmp_store();
        let project = Project::new("Garden");
        store.create_project(&project).unwrap();
        let entry = Entry::new(&project.id, "2026-03-01", "planted beans");
        store.put_entry(&entry).unwrap();
        let photo = MediaItem::new(&entry.id, "rows.jpg", 2048, "image/jpeg");
        store.save_media(&photo).unwrap();
        store
            .save_summary(&SummaryRecord::new(&project.id, "beans", "fp"))
            .unwrap();

        assert!(store.delete_project(&project.id).unwrap());
        assert!(store.entry(&entry.id).unwrap().is_none());
        assert!(store.media_for_entry(&entry.id).unwrap().is_empty());
        assert!(store.delete_media(&photo.id).unwrap().is_none());
        assert!(store.summary(&project.id).unwrap().is_none());
        assert!(store.projects().unwrap().is_empty());
    }

    #[test]
    fn one_entry_per_project_per_date() {
        let (_dir, store) = tmp_store();
        let project = Project::new("Pottery");
        let other = Project::new("Garden");
        store.create_project(&project).unwrap();
        store.create_project(&other).unwrap();
        let first = Entry::new(&project.id, "2026-03-01", "threw bowls");
        store.put_entry(&first).unwrap();

        let second = Entry::new(&project.id, "2026-03-01", "threw mugs");
        let err = store.put_entry(&second).unwrap_err();
        assert!(matches!(err, StoreError::DateTaken { ref existing, .. } if *existing == first.id));
        store
            .put_entry(&Entry::new(&other.id, "2026-03-01", "dug beds"))
            .unwrap();

        let found = store.entry_by_date(&project.id, "2026-03-01").unwrap().unwrap();
        assert_eq!(found.id, first.id);
        assert!(store.entry_by_date(&project.id, "2026-03-02").unwrap().is_none());
        assert_eq!(store.entries(&project.id).unwrap().len(), 1);
    }

    #[test]
    fn saving_entries_and_media_bumps_project_updated_at() {
        let (_dir, store) = tmp_store();
        let mut project = Project::new("Pottery");
        project.updated_at = "2000-01-01T00:00:00Z".into();
        store.create_project(&project).unwrap();

        let entry = Entry::new(&project.id, "2026-03-01", "threw bowls");
        store.put_entry(&entry).unwrap();
        let after_entry = store.project(&project.id).unwrap().unwrap().updated_at;
        assert!(after_entry.as_str() > "2000-01-01T00:00:00Z");

        store
            .conn()
            .unwrap()
            .execute(
                "UPDATE projects SET updated_at = '2000-01-01T00:00:00Z' WHERE id = ?1",
                params![project.id],
            )
            .unwrap();
        let photo = MediaItem::new(&entry.id, "bowl.png", 10, "image/png");
        store.save_media(&photo).unwrap();
        let after_media = store.project(&project.id).unwrap().unwrap().updated_at;
        assert!(after_media.as_str() > "2000-01-01T00:00:00Z");
    }

    #[test]
    fn media_attach_list_and_remove() {
        let (_dir, store) = tmp_store();
        let project = Project::new("Sketchbook");
        store.create_project(&project).unwrap();
        let entry = Entry::new(&project.id, "2026-03-01", "hands");
        store.put_entry(&entry).unwrap();

        let a = MediaItem::new(&entry.id, "left.png", 100, "image/png");
        let b = MediaItem::new(&entry.id, "right.gif", 200, "image/gif");
        store.save_media(&a).unwrap();
        store.save_media(&b).unwrap();
        let listed = store.media_for_entry(&entry.id).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[1].file_size, 200);
        assert_eq!(store.media_for_project(&project.id).unwrap().len(), 2);

        assert_eq!(store.delete_media(&a.id).unwrap().unwrap().path, a.path);
        assert_eq!(store.media_for_entry(&entry.id).unwrap(), vec![b]);

        let orphan = MediaItem::new("ent_missing", "x.png", 1, "image/png");
        assert!(matches!(
            store.save_media(&orphan).unwrap_err(),
            StoreError::NotFound { kind: "entry", .. }
        ));

        assert!(store.delete_entry(&entry.id).unwrap());
        assert!(store.media_for_project(&project.id).unwrap().is_empty());
    }

    #[test]
    fn archive_and_restore_project() {
        let (_dir, store) = tmp_store();
        let project = Project::new("Garden");
        store.create_project(&project).unwrap();

        store.set_project_active(&project.id, false).unwrap();
        assert!(!store.project(&project.id).unwrap().unwrap().is_active);
        store.set_project_active(&project.id, true).unwrap();
        assert!(store.project(&project.id).unwrap().unwrap().is_active);
        assert!(store.set_project_active("prj_nope", false).is_err());
    }

    #[test]
    fn snapshot_restores_into_another_store() {
        let (_dir, source) = tmp_store();
        let project = Project::new("Pottery");
        source.create_project(&project).unwrap();
        let entry = Entry::new(&project.id, "2026-03-01", "threw bowls");
        source.put_entry(&entry).unwrap();
        source
            .save_media(&MediaItem::new(&entry.id, "bowl.png", 10, "image/png"))
            .unwrap();
        source
            .save_summary(&SummaryRecord::new(&project.id, "You threw bowls.", "fp"))
            .unwrap();
        let snapshot = source.snapshot().unwrap();

        let target = SqliteStore::open_in_memory().unwrap();
        target.create_project(&Project::new("Leftover")).unwrap();
        target.restore(&snapshot).unwrap();
        assert_eq!(target.snapshot().unwrap(), snapshot);

        let mut broken = snapshot.clone();
        broken.entries.push(Entry::new("prj_missing", "2026-03-02", "orphan"));
        let err = target.restore(&broken).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { kind: "project", .. }));
        assert_eq!(target.snapshot().unwrap(), snapshot);
    }

    #[test]
    fn rename_missing_project_fails() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.rename_project("prj_nope", "x").is_err());
    }
}
