use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use forms_core::wire::{ErrorBody, GenerateSummaryRequest, GenerateSummaryResponse};
use forms_core::EntryForSummary;

#[derive(Debug, thiserror::Error)]
pub enum SummarizeError {
    #[error("no entries to summarize")]
    NoEntries,
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("relay returned {code}: {message}")]
    Status { code: u16, message: String },
    #[error("malformed reply: {0}")]
    Malformed(String),
}

/// The summarization backend. One call, no retry contract.
#[async_trait::async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(
        &self,
        project_name: &str,
        entries: &[EntryForSummary],
    ) -> Result<String, SummarizeError>;
}

const TIMEOUT: Duration = Duration::from_secs(30);

/// Talks to the relay's `POST /api/generate-summary`.
pub struct RelayClient {
    http: reqwest::Client,
    base_url: String,
}

impl RelayClient {
    pub fn new(base_url: &str) -> Result<Self, SummarizeError> {
        let http = reqwest::Client::builder().timeout(TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait::async_trait]
impl Summarizer for RelayClient {
    async fn summarize(
        &self,
        project_name: &str,
        entries: &[EntryForSummary],
    ) -> Result<String, SummarizeError> {
        if entries.is_empty() {
            return Err(SummarizeError::NoEntries);
        }

        let body = GenerateSummaryRequest {
            project_name: project_name.to_string(),
            entries: entries.to_vec(),
        };
        let resp = self
            .http
            .post(format!("{}/api/generate-summary", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = match resp.json::<ErrorBody>().await {
                Ok(b) if !b.error.is_empty() => b.error,
                _ => format!("server error: {status}"),
            };
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(SummarizeError::RateLimited(message));
            }
            return Err(SummarizeError::Status {
                code: status.as_u16(),
                message,
            });
        }

        let data: GenerateSummaryResponse = resp
            .json()
            .await
            .map_err(|e| SummarizeError::Malformed(e.to_string()))?;
        match data.summary.map(|s| s.trim().to_string()) {
            Some(s) if !s.is_empty() => Ok(s),
            _ => Err(SummarizeError::Malformed(
                "response has no summary".to_string(),
            )),
        }
    }
}

/// Scripted summarizer for tests. Pops queued replies first, then answers
/// with a canned sentence. Projects named via `fail_for` always fail.
#[derive(Default)]
pub struct MockSummarizer {
    calls: AtomicUsize,
    delay: Duration,
    replies: Mutex<VecDeque<Result<String, SummarizeError>>>,
    failing: Mutex<HashSet<String>>,
    seen: Mutex<Vec<String>>,
}

impl MockSummarizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call sleeps this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn push_reply(&self, reply: Result<String, SummarizeError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn fail_for(&self, project_name: &str) {
        self.failing.lock().unwrap().insert(project_name.to_string());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Project names in call order.
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(
        &self,
        project_name: &str,
        entries: &[EntryForSummary],
    ) -> Result<String, SummarizeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(project_name.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.failing.lock().unwrap().contains(project_name) {
            return Err(SummarizeError::Status {
                code: 500,
                message: "(mock) upstream failure".into(),
            });
        }
        if let Some(reply) = self.replies.lock().unwrap().pop_front() {
            return reply;
        }
        Ok(format!(
            "(mock) {project_name}: {} entries of steady progress.",
            entries.len()
        ))
    }
}
