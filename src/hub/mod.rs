//! In-process event broadcast hubs.
//!
//! Background workers publish review status changes and import completions;
//! streaming handlers subscribe with a per-connection identity, read until
//! their queue closes, then unsubscribe. Delivery is best-effort: a full
//! subscriber queue drops the event for that subscriber only.

mod broadcaster;
mod events;
mod global;
mod publish;
mod subscription;

pub use broadcaster::Hub;
pub use events::{HubEvent, ImportEvent, ReviewEvent, ReviewStatus, UnknownReviewStatus};
pub use global::{import_hub, review_hub};
pub use publish::{publish, publish_import, publish_review};
pub use subscription::Subscription;
