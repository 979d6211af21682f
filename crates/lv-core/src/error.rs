//! Error types for the selection pipeline

use thiserror::Error;

/// Failures surfaced by the selection-to-subset pipeline.
///
/// These are local errors returned to the UI caller; the session is never
/// mutated on any of them, and none is retried automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// Axis partition is empty, not strictly increasing, or not finite.
    #[error("axis partition is empty or not strictly increasing")]
    InvalidPartition,

    /// Region of interest could not be reduced to a 1-D interval.
    #[error("region of interest cannot be reduced to an interval")]
    InvalidSelection,

    /// Attribute reference missing or not resolvable at selection time.
    #[error("attribute reference is missing or unresolved")]
    UnresolvedAttribute,
}
