use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::broadcaster::Hub;
use super::global;

/// An event kind that has its own process-wide hub.
pub trait HubEvent: Clone + Send + Sync + 'static {
    /// Stream event name used when the event leaves the process.
    const KIND: &'static str;
    /// Per-subscriber queue capacity of this kind's hub.
    const CAPACITY: usize;

    /// The process-wide hub for this kind.
    fn global() -> &'static Hub<Self>;
}

// ============================================================================
// Review events
// ============================================================================

/// Status of a review job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Analyzing,
    Completed,
    Failed,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Analyzing => "analyzing",
            ReviewStatus::Completed => "completed",
            ReviewStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown review status: {0}")]
pub struct UnknownReviewStatus(pub String);

impl FromStr for ReviewStatus {
    type Err = UnknownReviewStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(ReviewStatus::Pending),
            "analyzing" => Ok(ReviewStatus::Analyzing),
            "completed" => Ok(ReviewStatus::Completed),
            "failed" => Ok(ReviewStatus::Failed),
            _ => Err(UnknownReviewStatus(s.to_string())),
        }
    }
}

/// Status change of one review job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewEvent {
    review_id: u64,
    project_id: u64,
    commit_hash: String,
    status: ReviewStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ReviewEvent {
    /// Build a review event. `score` is only kept for completed reviews and
    /// `error` only for failed ones.
    pub fn new(
        review_id: u64,
        project_id: u64,
        commit_hash: impl Into<String>,
        status: ReviewStatus,
        score: Option<f64>,
        error: Option<String>,
    ) -> Self {
        Self {
            review_id,
            project_id,
            commit_hash: commit_hash.into(),
            status,
            score: score.filter(|_| status == ReviewStatus::Completed),
            error: error.filter(|_| status == ReviewStatus::Failed),
        }
    }

    pub fn completed(
        review_id: u64,
        project_id: u64,
        commit_hash: impl Into<String>,
        score: f64,
    ) -> Self {
        Self::new(
            review_id,
            project_id,
            commit_hash,
            ReviewStatus::Completed,
            Some(score),
            None,
        )
    }

    pub fn failed(
        review_id: u64,
        project_id: u64,
        commit_hash: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self::new(
            review_id,
            project_id,
            commit_hash,
            ReviewStatus::Failed,
            None,
            Some(error.into()),
        )
    }

    pub fn review_id(&self) -> u64 {
        self.review_id
    }

    pub fn project_id(&self) -> u64 {
        self.project_id
    }

    pub fn commit_hash(&self) -> &str {
        &self.commit_hash
    }

    pub fn status(&self) -> ReviewStatus {
        self.status
    }

    pub fn score(&self) -> Option<f64> {
        self.score
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl HubEvent for ReviewEvent {
    const KIND: &'static str = "review";
    const CAPACITY: usize = 100;

    fn global() -> &'static Hub<Self> {
        global::review_hub()
    }
}

// ============================================================================
// Import events
// ============================================================================

/// Completion of a commit import for one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportEvent {
    project_id: u64,
    project_name: String,
    imported: u64,
    skipped: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ImportEvent {
    pub fn new(
        project_id: u64,
        project_name: impl Into<String>,
        imported: u64,
        skipped: u64,
        error: Option<String>,
    ) -> Self {
        Self {
            project_id,
            project_name: project_name.into(),
            imported,
            skipped,
            error,
        }
    }

    pub fn project_id(&self) -> u64 {
        self.project_id
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn imported(&self) -> u64 {
        self.imported
    }

    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

impl HubEvent for ImportEvent {
    const KIND: &'static str = "import";
    const CAPACITY: usize = 10;

    fn global() -> &'static Hub<Self> {
        global::import_hub()
    }
}
