//! Subset states: persisted range predicates over one attribute

use serde::{Deserialize, Serialize};

use crate::error::SelectionError;
use crate::session::AttributeId;

/// A logical predicate `attribute in [lo, hi]`, inclusive at both ends.
///
/// Inclusive bounds match the snapped edges exactly, since edges are
/// themselves valid boundary values. Once published, the state is owned by
/// the session; layers reference the subset source, never the state itself.
///
/// The predicate is defined over all records of the underlying data, not
/// just currently-visible ones; visibility filtering is a per-layer display
/// concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsetState {
    /// The attribute the predicate binds to.
    pub attribute: AttributeId,

    /// Inclusive lower bound.
    pub lo: f64,

    /// Inclusive upper bound.
    pub hi: f64,
}

impl SubsetState {
    /// Build the range predicate for a snapped interval.
    ///
    /// Fails when the attribute reference is absent. Has no side effects:
    /// publishing the result to the session is the caller's responsibility.
    pub fn range(
        attribute: Option<AttributeId>,
        lo: f64,
        hi: f64,
    ) -> Result<Self, SelectionError> {
        let attribute = attribute.ok_or(SelectionError::UnresolvedAttribute)?;
        Ok(Self { attribute, lo, hi })
    }

    /// Whether a value satisfies the predicate.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lo && value <= self.hi
    }
}
