//! Core functionality for the linked-views platform
//!
//! This crate provides the session-side building blocks: axis partitions
//! with bin snapping, regions of interest, subset states, and the shared
//! session with its change-notification queues.

pub mod axis;
pub mod error;
pub mod roi;
pub mod session;
pub mod subset;

// Re-export commonly used types
pub use axis::AxisPartition;
pub use error::SelectionError;
pub use roi::Roi;
pub use session::{
    Attribute, AttributeId, ChangeKind, ChangeNotification, Session, SessionHandle, SourceId,
    SourceKind, SourceRef, Subscription, SubscriptionId,
};
pub use subset::SubsetState;
