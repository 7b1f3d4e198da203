//! Publishing helpers for producers that should not hold a hub reference.

use super::events::{HubEvent, ImportEvent, ReviewEvent, ReviewStatus};

/// Publish `event` on the process-wide hub of its kind.
pub fn publish<E: HubEvent>(event: E) {
    E::global().publish(event);
}

/// Report a review job status change.
pub fn publish_review(
    review_id: u64,
    project_id: u64,
    commit_hash: impl Into<String>,
    status: ReviewStatus,
    score: Option<f64>,
    error: Option<String>,
) {
    publish(ReviewEvent::new(
        review_id,
        project_id,
        commit_hash,
        status,
        score,
        error,
    ));
}

/// Report the end of a commit import.
pub fn publish_import(
    project_id: u64,
    project_name: impl Into<String>,
    imported: u64,
    skipped: u64,
    error: Option<String>,
) {
    publish(ImportEvent::new(
        project_id,
        project_name,
        imported,
        skipped,
        error,
    ));
}
