use serde::{Deserialize, Serialize};

/// Project ID format: `prj_<ulid>`
pub type ProjectId = String;

/// Entry ID format: `ent_<ulid>`
pub type EntryId = String;

pub fn new_project_id() -> ProjectId {
    format!("prj_{}", ulid::Ulid::new().to_string().to_lowercase())
}

pub fn new_entry_id() -> EntryId {
    format!("ent_{}", ulid::Ulid::new().to_string().to_lowercase())
}

/// Media ID format: `med_<ulid>`
pub type MediaId = String;

pub fn new_media_id() -> MediaId {
    format!("med_{}", ulid::Ulid::new().to_string().to_lowercase())
}

/// Current UTC time as RFC 3339, with sub-second precision so that two
/// saves within the same second still produce distinct timestamps.
pub fn now_rfc3339() -> String {
    let now = time::OffsetDateTime::now_utc();
    now.format(&time::format_description::well_known::Rfc3339)
        .expect("RFC3339 formatting should not fail")
}

/// A journaled project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Project {
    pub fn new(name: &str) -> Self {
        let now = now_rfc3339();
        Self {
            id: new_project_id(),
            name: name.to_string(),
            created_at: now.clone(),
            updated_at: now,
            is_active: true,
        }
    }
}

/// One dated reflection belonging to a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: EntryId,
    pub project_id: ProjectId,
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    pub reflection: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Entry {
    pub fn new(project_id: &str, date: &str, reflection: &str) -> Self {
        let now = now_rfc3339();
        Self {
            id: new_entry_id(),
            project_id: project_id.to_string(),
            date: date.to_string(),
            reflection: reflection.to_string(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Replace the reflection text and bump `updated_at`.
    pub fn edit(&mut self, reflection: &str) {
        self.reflection = reflection.to_string();
        self.updated_at = now_rfc3339();
    }
}

/// An image attached to an entry. `path` is relative to the `.forms/`
/// directory; the bytes themselves live on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: MediaId,
    pub entry_id: EntryId,
    pub file_name: String,
    pub file_size: u64,
    pub mime_type: String,
    pub path: String,
    pub created_at: String,
}

impl MediaItem {
    pub fn new(entry_id: &str, file_name: &str, file_size: u64, mime_type: &str) -> Self {
        let id = new_media_id();
        Self {
            path: format!("media/{id}-{file_name}"),
            id,
            entry_id: entry_id.to_string(),
            file_name: file_name.to_string(),
            file_size,
            mime_type: mime_type.to_string(),
            created_at: now_rfc3339(),
        }
    }
}

/// Cached summary for one project. At most one record per `project_id`.
///
/// `fingerprint` is compared for equality only; a record whose fingerprint
/// differs from the project's current one is stale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRecord {
    pub project_id: ProjectId,
    pub summary: String,
    pub fingerprint: String,
    pub last_updated: String,
}

impl SummaryRecord {
    pub fn new(project_id: &str, summary: &str, fingerprint: &str) -> Self {
        Self {
            project_id: project_id.to_string(),
            summary: summary.to_string(),
            fingerprint: fingerprint.to_string(),
            last_updated: now_rfc3339(),
        }
    }

    pub fn is_valid_for(&self, fingerprint: &str) -> bool {
        self.fingerprint == fingerprint
    }
}

/// Point-in-time view of a project's summary state.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStatus {
    pub has_cached: bool,
    pub is_generating: bool,
    pub is_debouncing: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_carry_prefix() {
        assert!(new_project_id().starts_with("prj_"));
        assert!(new_entry_id().starts_with("ent_"));
        assert_ne!(new_entry_id(), new_entry_id());
        assert!(new_media_id().starts_with("med_"));
    }

    #[test]
    fn entry_edit_bumps_updated_at() {
        let mut entry = Entry::new("prj_1", "2026-03-01", "first pass");
        entry.updated_at = "2026-03-01T00:00:00Z".to_string();
        entry.edit("second pass");
        assert_eq!(entry.reflection, "second pass");
        assert_ne!(entry.updated_at, "2026-03-01T00:00:00Z");
        assert!(!entry.created_at.is_empty());
    }

    #[test]
    fn record_validity_is_fingerprint_equality() {
        let record = SummaryRecord::new("prj_1", "You are making steady progress.", "abc");
        assert!(record.is_valid_for("abc"));
        assert!(!record.is_valid_for("abd"));
    }

    #[test]
    fn project_serializes_camel_case() {
        let project = Project::new("Pottery");
        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["name"], "Pottery");
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["isActive"], true);
    }

    #[test]
    fn media_path_is_unique_per_item() {
        let a = MediaItem::new("ent_1", "kiln.png", 42, "image/png");
        let b = MediaItem::new("ent_1", "kiln.png", 42, "image/png");
        assert!(a.path.starts_with("media/med_"));
        assert!(a.path.ends_with("-kiln.png"));
        assert_ne!(a.path, b.path);
    }
}
