use forms_core::{Entry, MediaItem, Project, SummaryRecord};
use serde::{Deserialize, Serialize};

/// Every row of a journal, in the shape `forms export` writes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub projects: Vec<Project>,
    pub entries: Vec<Entry>,
    #[serde(default)]
    pub media: Vec<MediaItem>,
    #[serde(default)]
    pub summaries: Vec<SummaryRecord>,
}
