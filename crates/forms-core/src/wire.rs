//! JSON bodies exchanged between the summary client and the relay.

use serde::{Deserialize, Serialize};

use crate::types::Entry;

/// The part of an entry the language model sees.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntryForSummary {
    pub date: String,
    pub reflection: String,
}

impl From<&Entry> for EntryForSummary {
    fn from(entry: &Entry) -> Self {
        Self {
            date: entry.date.clone(),
            reflection: entry.reflection.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSummaryRequest {
    pub project_name: String,
    pub entries: Vec<EntryForSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSummaryResponse {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub entry_count: usize,
    #[serde(default)]
    pub generated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: String,
}
