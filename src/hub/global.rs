//! Process-wide hubs, one per event kind.
//!
//! Each hub is built on first access; concurrent first accesses still
//! construct exactly one instance. The server's composition root takes these
//! same handles and injects them into request state, so handlers and the
//! convenience publishers always share a registry.

use std::sync::LazyLock;

use tracing::info;

use super::broadcaster::Hub;
use super::events::{HubEvent, ImportEvent, ReviewEvent};

static REVIEW_HUB: LazyLock<Hub<ReviewEvent>> = LazyLock::new(|| {
    info!(capacity = ReviewEvent::CAPACITY, "initializing review hub");
    Hub::for_kind()
});

static IMPORT_HUB: LazyLock<Hub<ImportEvent>> = LazyLock::new(|| {
    info!(capacity = ImportEvent::CAPACITY, "initializing import hub");
    Hub::for_kind()
});

/// The hub carrying review-job status changes
pub fn review_hub() -> &'static Hub<ReviewEvent> {
    &REVIEW_HUB
}

/// The hub carrying commit-import completions
pub fn import_hub() -> &'static Hub<ImportEvent> {
    &IMPORT_HUB
}
