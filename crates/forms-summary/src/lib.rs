pub mod client;
pub mod config;
pub mod coordinator;

pub use client::{MockSummarizer, RelayClient, SummarizeError, Summarizer};
pub use config::{relay_url, CoordinatorConfig, DEFAULT_RELAY_URL};
pub use coordinator::{SummaryCoordinator, WarmReport};
