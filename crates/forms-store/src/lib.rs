pub mod error;
pub mod memory;
pub mod paths;
pub mod snapshot;
pub mod sqlite;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use paths::{write_atomic, FormsPaths};
pub use snapshot::Snapshot;
pub use sqlite::SqliteStore;

use forms_core::{content_fingerprint, Entry, Project, SummaryRecord};

/// Read side of the journal plus the summary cache.
///
/// Implementations must be cheap enough to call from async code without
/// offloading; every method is a local lookup.
pub trait JournalStore: Send + Sync {
    fn projects(&self) -> Result<Vec<Project>>;

    fn project(&self, project_id: &str) -> Result<Option<Project>> {
        Ok(self.projects()?.into_iter().find(|p| p.id == project_id))
    }

    /// Entries of one project, oldest date first.
    fn entries(&self, project_id: &str) -> Result<Vec<Entry>>;

    fn summary(&self, project_id: &str) -> Result<Option<SummaryRecord>>;

    /// Insert or replace the record for `record.project_id`.
    fn save_summary(&self, record: &SummaryRecord) -> Result<()>;

    /// Returns whether a record existed.
    fn delete_summary(&self, project_id: &str) -> Result<bool>;

    fn summaries(&self) -> Result<Vec<SummaryRecord>>;

    /// Fingerprint of the project's current entry set. Overrides must agree
    /// with `content_fingerprint` over `entries`.
    fn fingerprint(&self, project_id: &str) -> Result<String> {
        Ok(content_fingerprint(&self.entries(project_id)?))
    }
}
