//! Axis partitions and bin snapping

use serde::{Deserialize, Serialize};

use crate::error::SelectionError;

/// An ordered set of bin edges defining a fixed partition of one axis.
///
/// Edges are strictly increasing and immutable once constructed, so every
/// selection operation snaps against a consistent set of boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisPartition {
    edges: Vec<f64>,
}

impl AxisPartition {
    /// Validate and build a partition from raw edge values.
    ///
    /// Rejects empty, non-finite, or non-increasing edge lists.
    pub fn new(edges: Vec<f64>) -> Result<Self, SelectionError> {
        if edges.is_empty() {
            return Err(SelectionError::InvalidPartition);
        }
        if edges.iter().any(|e| !e.is_finite()) {
            return Err(SelectionError::InvalidPartition);
        }
        if edges.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(SelectionError::InvalidPartition);
        }
        Ok(Self { edges })
    }

    /// The bin edges, in increasing order.
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Lowest edge value.
    pub fn min_edge(&self) -> f64 {
        self.edges[0]
    }

    /// Highest edge value.
    pub fn max_edge(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }

    /// Snap a raw interval onto the nearest enclosing edges.
    ///
    /// An endpoint inside the partition's domain moves outward to the
    /// nearest edge: the largest edge at or below `lo`, the smallest edge
    /// at or above `hi`. An endpoint outside the domain is left untouched,
    /// so a selection may extend past the binned range. A degenerate
    /// `lo == hi` input still yields a valid interval; whether a zero-width
    /// selection is meaningful is the caller's call.
    ///
    /// Pure and deterministic; the partition is never mutated.
    pub fn snap(&self, lo: f64, hi: f64) -> (f64, f64) {
        let first = self.min_edge();
        let last = self.max_edge();

        let mut snapped_lo = lo;
        if lo >= first && lo <= last {
            for &edge in self.edges.iter().rev() {
                if edge <= lo {
                    snapped_lo = edge;
                    break;
                }
            }
        }

        let mut snapped_hi = hi;
        if hi >= first && hi <= last {
            for &edge in &self.edges {
                if edge >= hi {
                    snapped_hi = edge;
                    break;
                }
            }
        }

        (snapped_lo, snapped_hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_edges() -> AxisPartition {
        AxisPartition::new(vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap()
    }

    #[test]
    fn test_snap_inside_domain() {
        let edges = unit_edges();
        assert_eq!(edges.snap(1.4, 3.6), (1.0, 4.0));
    }

    #[test]
    fn test_snap_below_domain_keeps_lo() {
        let edges = unit_edges();
        assert_eq!(edges.snap(-2.0, 1.4), (-2.0, 2.0));
    }

    #[test]
    fn test_snap_above_domain_keeps_hi() {
        let edges = unit_edges();
        assert_eq!(edges.snap(4.2, 7.0), (4.0, 7.0));
    }

    #[test]
    fn test_snap_idempotent_on_edges() {
        let edges = unit_edges();
        let (lo, hi) = edges.snap(1.4, 3.6);
        assert_eq!(edges.snap(lo, hi), (lo, hi));
    }

    #[test]
    fn test_snap_degenerate_interval() {
        let edges = unit_edges();
        // Zero-width input widens to the enclosing bin.
        assert_eq!(edges.snap(2.5, 2.5), (2.0, 3.0));
        // Zero-width input on an edge stays zero-width.
        assert_eq!(edges.snap(3.0, 3.0), (3.0, 3.0));
    }

    #[test]
    fn test_rejects_empty_partition() {
        assert_eq!(
            AxisPartition::new(vec![]).unwrap_err(),
            SelectionError::InvalidPartition
        );
    }

    #[test]
    fn test_rejects_non_increasing_partition() {
        assert_eq!(
            AxisPartition::new(vec![0.0, 2.0, 1.0]).unwrap_err(),
            SelectionError::InvalidPartition
        );
        assert_eq!(
            AxisPartition::new(vec![0.0, 0.0, 1.0]).unwrap_err(),
            SelectionError::InvalidPartition
        );
    }

    #[test]
    fn test_rejects_non_finite_edges() {
        assert_eq!(
            AxisPartition::new(vec![0.0, f64::NAN, 1.0]).unwrap_err(),
            SelectionError::InvalidPartition
        );
    }
}
