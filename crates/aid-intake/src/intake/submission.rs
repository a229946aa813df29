use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::ApplicationDraft;

/// Acknowledgement returned by the backend for a submitted application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub id: String,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("submission rejected: {0}")]
    Rejected(String),
    #[error("submission backend unavailable: {0}")]
    Unavailable(String),
}

/// Backend that accepts the merged draft once the last step validates.
#[async_trait]
pub trait SubmissionGateway: Send + Sync {
    async fn submit(&self, draft: &ApplicationDraft) -> Result<SubmissionReceipt, SubmissionError>;
}

/// Stand-in backend: waits a fixed delay, then accepts everything.
#[derive(Debug)]
pub struct MockSubmissionGateway {
    delay: Duration,
    sequence: AtomicU64,
}

impl MockSubmissionGateway {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            sequence: AtomicU64::new(1),
        }
    }
}

impl Default for MockSubmissionGateway {
    fn default() -> Self {
        Self::new(Duration::from_millis(800))
    }
}

#[async_trait]
impl SubmissionGateway for MockSubmissionGateway {
    async fn submit(&self, _draft: &ApplicationDraft) -> Result<SubmissionReceipt, SubmissionError> {
        tokio::time::sleep(self.delay).await;
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        let receipt = SubmissionReceipt {
            id: format!("app-{id:06}"),
            submitted_at: Utc::now(),
        };
        info!(receipt = %receipt.id, "application accepted by mock backend");
        Ok(receipt)
    }
}
