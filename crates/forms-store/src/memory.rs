use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use forms_core::{Entry, Project, SummaryRecord};

use crate::{JournalStore, Result, StoreError};

#[derive(Default)]
struct State {
    projects: Vec<Project>,
    entries: Vec<Entry>,
    summaries: HashMap<String, SummaryRecord>,
}

/// In-process store. Used by tests and by callers that only need a
/// throwaway journal.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
    fail_writes: AtomicBool,
    summary_writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, `save_summary` and `delete_summary` fail with
    /// `StoreError::Unavailable`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `save_summary` calls.
    pub fn summary_writes(&self) -> usize {
        self.summary_writes.load(Ordering::SeqCst)
    }

    pub fn create_project(&self, project: &Project) -> Result<()> {
        self.write()?.projects.push(project.clone());
        Ok(())
    }

    pub fn put_entry(&self, entry: &Entry) -> Result<()> {
        let mut state = self.write()?;
        if !state.projects.iter().any(|p| p.id == entry.project_id) {
            return Err(StoreError::NotFound {
                kind: "project",
                id: entry.project_id.clone(),
            });
        }
        match state.entries.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => *existing = entry.clone(),
            None => state.entries.push(entry.clone()),
        }
        Ok(())
    }

    pub fn entry_by_date(&self, project_id: &str, date: &str) -> Result<Option<Entry>> {
        Ok(self
            .read()?
            .entries
            .iter()
            .find(|e| e.project_id == project_id && e.date == date)
            .cloned())
    }

    pub fn delete_entry(&self, entry_id: &str) -> Result<bool> {
        let mut state = self.write()?;
        let before = state.entries.len();
        state.entries.retain(|e| e.id != entry_id);
        Ok(state.entries.len() != before)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| StoreError::Unavailable("state lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| StoreError::Unavailable("state lock poisoned".into()))
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".into()));
        }
        Ok(())
    }
}

impl JournalStore for MemoryStore {
    fn projects(&self) -> Result<Vec<Project>> {
        Ok(self.read()?.projects.clone())
    }

    fn entries(&self, project_id: &str) -> Result<Vec<Entry>> {
        let mut entries: Vec<Entry> = self
            .read()?
            .entries
            .iter()
            .filter(|e| e.project_id == project_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));
        Ok(entries)
    }

    fn summary(&self, project_id: &str) -> Result<Option<SummaryRecord>> {
        Ok(self.read()?.summaries.get(project_id).cloned())
    }

    fn save_summary(&self, record: &SummaryRecord) -> Result<()> {
        self.check_writable()?;
        self.write()?
            .summaries
            .insert(record.project_id.clone(), record.clone());
        self.summary_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn delete_summary(&self, project_id: &str) -> Result<bool> {
        self.check_writable()?;
        Ok(self.write()?.summaries.remove(project_id).is_some())
    }

    fn summaries(&self) -> Result<Vec<SummaryRecord>> {
        let mut records: Vec<SummaryRecord> = self.read()?.summaries.values().cloned().collect();
        records.sort_by(|a, b| a.project_id.cmp(&b.project_id));
        Ok(records)
    }
}
